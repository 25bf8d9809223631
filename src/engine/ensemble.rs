//! Weighted-vote aggregation of strategy results.
//!
//! Each strategy adds `weight × confidence` to the tally of the category it
//! predicts. The raw confidence is the winning share of the total mass,
//! scaled by a bounded correction factor from global entropy and volatility
//! and capped at `CONFIDENCE_CEILING`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::strategy::StrategyKind;
use crate::types::{AugurError, PredictedCategory, StrategyResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Final confidence never exceeds this.
pub const CONFIDENCE_CEILING: f64 = 0.95;

pub const MIN_CORRECTION: f64 = 0.7;
pub const MAX_CORRECTION: f64 = 1.3;

const LOW_ENTROPY: f64 = 1.0;
const HIGH_ENTROPY: f64 = 1.8;
const LOW_VOLATILITY: f64 = 0.3;
const HIGH_VOLATILITY: f64 = 0.8;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Fixed strategy weights. Need not sum to 1; the aggregator normalises.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnsembleWeights(BTreeMap<StrategyKind, f64>);

impl EnsembleWeights {
    pub fn new(weights: impl IntoIterator<Item = (StrategyKind, f64)>) -> Self {
        Self(weights.into_iter().collect())
    }

    /// Weights of the five-strategy profile.
    pub fn basic() -> Self {
        Self::new([
            (StrategyKind::Streak, 0.30),
            (StrategyKind::Frequency, 0.25),
            (StrategyKind::Pattern, 0.20),
            (StrategyKind::Martingale, 0.15),
            (StrategyKind::TimeWindow, 0.10),
        ])
    }

    /// Weights of the seven-strategy profile.
    pub fn advanced() -> Self {
        Self::new([
            (StrategyKind::Streak, 0.25),
            (StrategyKind::Frequency, 0.20),
            (StrategyKind::Pattern, 0.15),
            (StrategyKind::Martingale, 0.10),
            (StrategyKind::TimeWindow, 0.08),
            (StrategyKind::Variance, 0.12),
            (StrategyKind::Momentum, 0.10),
        ])
    }

    pub fn get(&self, kind: StrategyKind) -> Option<f64> {
        self.0.get(&kind).copied()
    }

    /// Override (or add) a single weight.
    pub fn set(&mut self, kind: StrategyKind, weight: f64) {
        self.0.insert(kind, weight);
    }

    /// Reject negative or non-finite weights, enabled or not.
    pub fn check_values(&self) -> Result<(), AugurError> {
        for (kind, &weight) in &self.0 {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AugurError::InvalidConfiguration(format!(
                    "weight for strategy '{kind}' must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    /// Merge `overrides` over these weights.
    pub fn merge(&mut self, overrides: &EnsembleWeights) {
        self.0.extend(overrides.0.iter().map(|(k, w)| (*k, *w)));
    }

    /// Check every weight and that each enabled strategy has one.
    pub fn validate(&self, enabled: &[StrategyKind]) -> Result<(), AugurError> {
        self.check_values()?;
        if enabled.is_empty() {
            return Err(AugurError::InvalidConfiguration(
                "no strategies enabled".to_string(),
            ));
        }
        let mut base = 0.0;
        for kind in enabled {
            base += self.get(*kind).ok_or_else(|| {
                AugurError::InvalidConfiguration(format!("missing weight for strategy '{kind}'"))
            })?;
        }
        if base <= 0.0 {
            return Err(AugurError::InvalidConfiguration(
                "enabled strategy weights sum to zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One strategy's contribution to the vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVote {
    pub strategy: StrategyKind,
    pub weight: f64,
    pub result: StrategyResult,
}

impl StrategyVote {
    /// Weighted mass this vote adds to its category.
    pub fn mass(&self) -> f64 {
        self.weight * self.result.confidence
    }
}

/// Aggregated decision of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleOutcome {
    pub predicted: PredictedCategory,
    pub tally_a: f64,
    pub tally_b: f64,
    pub raw_confidence: f64,
    pub correction_factor: f64,
    /// Final confidence in [0, `CONFIDENCE_CEILING`].
    pub confidence: f64,
}

/// Bounded multiplier from global entropy and volatility.
pub fn correction_factor(entropy: f64, volatility: f64) -> f64 {
    let mut factor: f64 = 1.0;

    if entropy < LOW_ENTROPY {
        factor *= 1.1;
    }
    if entropy > HIGH_ENTROPY {
        factor *= 0.9;
    }

    if volatility < LOW_VOLATILITY {
        factor *= 1.05;
    }
    if volatility > HIGH_VOLATILITY {
        factor *= 0.95;
    }

    factor.clamp(MIN_CORRECTION, MAX_CORRECTION)
}

/// Combine strategy votes into one prediction. A tied tally goes to A.
pub fn aggregate(votes: &[StrategyVote], entropy: f64, volatility: f64) -> EnsembleOutcome {
    let mut tally_a = 0.0;
    let mut tally_b = 0.0;
    for vote in votes {
        match vote.result.predicted {
            PredictedCategory::CategoryA => tally_a += vote.mass(),
            PredictedCategory::CategoryB => tally_b += vote.mass(),
        }
    }

    let total = tally_a + tally_b;
    let (predicted, winning) = if tally_a >= tally_b {
        (PredictedCategory::CategoryA, tally_a)
    } else {
        (PredictedCategory::CategoryB, tally_b)
    };
    let raw_confidence = if total > 0.0 { winning / total } else { 0.0 };
    let correction_factor = correction_factor(entropy, volatility);
    let confidence = (raw_confidence * correction_factor).clamp(0.0, CONFIDENCE_CEILING);

    debug!(
        predicted = %predicted,
        tally_a = format!("{tally_a:.4}"),
        tally_b = format!("{tally_b:.4}"),
        raw = format!("{:.1}%", raw_confidence * 100.0),
        factor = format!("{correction_factor:.3}"),
        confidence = format!("{:.1}%", confidence * 100.0),
        "Ensemble vote"
    );

    EnsembleOutcome {
        predicted,
        tally_a,
        tally_b,
        raw_confidence,
        correction_factor,
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
