//! Side-by-side run of the basic and advanced profiles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EngineConfig, EngineProfile, PredictionEngine, PredictionResult};
use crate::types::{
    AugurError, DisplayProbabilities, GameRecord, PredictedCategory, TechnicalIndicators,
};

/// Headline figures of one profile's prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub profile: EngineProfile,
    pub strategies: usize,
    pub predicted: PredictedCategory,
    pub predicted_label: String,
    pub confidence: f64,
    pub confidence_percent: u8,
    pub primary_stake: Decimal,
    pub hedge_stake: Decimal,
}

impl ProfileSummary {
    fn from_result(profile: EngineProfile, result: &PredictionResult) -> Self {
        Self {
            profile,
            strategies: result.votes.len(),
            predicted: result.predicted,
            predicted_label: result.predicted_label.clone(),
            confidence: result.confidence,
            confidence_percent: result.confidence_percent,
            primary_stake: result.stake_plan.primary_stake,
            hedge_stake: result.stake_plan.hedge_stake,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileComparison {
    pub basic: ProfileSummary,
    pub advanced: ProfileSummary,
    pub agree: bool,
    pub recommendation: String,
    pub probabilities: DisplayProbabilities,
    pub indicators: TechnicalIndicators,
}

/// Predict with both profiles, sharing the stake and label settings of
/// `base`. The advanced profile is recommended only when strictly more
/// confident.
pub fn compare_profiles(
    base: &EngineConfig,
    history: &[GameRecord],
    bet: Decimal,
    now: DateTime<Utc>,
) -> Result<ProfileComparison, AugurError> {
    let basic = PredictionEngine::new(base.with_profile(EngineProfile::Basic))?
        .predict_at(history, bet, now)?;
    let advanced = PredictionEngine::new(base.with_profile(EngineProfile::Advanced))?
        .predict_at(history, bet, now)?;

    let basic_summary = ProfileSummary::from_result(EngineProfile::Basic, &basic);
    let advanced_summary = ProfileSummary::from_result(EngineProfile::Advanced, &advanced);

    let recommendation = if advanced.confidence > basic.confidence {
        format!(
            "Use the advanced profile: {} at {}% vs {} at {}%",
            advanced.predicted_label,
            advanced.confidence_percent,
            basic.predicted_label,
            basic.confidence_percent
        )
    } else {
        format!(
            "Use the basic profile: {} at {}% vs {} at {}%",
            basic.predicted_label,
            basic.confidence_percent,
            advanced.predicted_label,
            advanced.confidence_percent
        )
    };

    debug!(
        basic = %basic_summary.predicted,
        advanced = %advanced_summary.predicted,
        recommendation = %recommendation,
        "Profiles compared"
    );

    Ok(ProfileComparison {
        agree: basic.predicted == advanced.predicted,
        basic: basic_summary,
        advanced: advanced_summary,
        recommendation,
        probabilities: advanced.probabilities,
        indicators: advanced.indicators,
    })
}
