//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs, then
//! converts into the immutable `EngineConfig` handed to the engine.
//! Every section is optional; missing keys fall back to the defaults.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::engine::{EngineConfig, EngineProfile, ProfileWeights, StakeConfig};
use crate::strategy::StrategyKind;
use crate::types::CategoryLabels;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSection,
    pub stake: StakeConfig,
    pub labels: CategoryLabels,
    pub input: InputConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EngineSection {
    pub profile: EngineProfile,
    /// Replaces the profile's strategy list when set.
    pub strategies: Option<Vec<StrategyKind>>,
    /// Per-profile overrides merged over the preset weights, under
    /// `[engine.weights.basic]` and `[engine.weights.advanced]`.
    pub weights: ProfileWeights,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub history_path: String,
    pub default_bet: Decimal,
    /// Where to write the prediction JSON, if anywhere.
    pub output_path: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            history_path: "history.json".to_string(),
            default_bet: dec!(100),
            output_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Switch profile. An explicit strategy list is dropped when the
    /// profile changes.
    pub fn select_profile(&mut self, profile: EngineProfile) {
        if profile != self.engine.profile {
            self.engine.profile = profile;
            self.engine.strategies = None;
        }
    }

    /// Build and validate the engine configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let profile = self.engine.profile;
        let config = EngineConfig {
            strategies: self
                .engine
                .strategies
                .clone()
                .unwrap_or_else(|| profile.strategies()),
            weights: self.engine.weights.resolve(profile),
            weight_overrides: self.engine.weights.clone(),
            stake: self.stake.clone(),
            labels: self.labels.clone(),
        };
        config
            .validate()
            .with_context(|| format!("Invalid engine configuration (profile {profile})"))?;
        Ok(config)
    }
}
