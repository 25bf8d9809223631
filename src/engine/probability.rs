//! Display probabilities and headline indicators.

use crate::analysis::{sequence, StatisticsSnapshot};
use crate::types::{
    DisplayProbabilities, OutcomeCategory, PredictedCategory, TechnicalIndicators, Trend,
};

const FAVORED_NUDGE: f64 = 1.1;
const UNFAVORED_NUDGE: f64 = 0.95;

/// Observed frequency per category, nudged toward the trend.
///
/// Presentation only: values are clamped to 100 and need not sum to 100.
pub fn display_probabilities(snapshot: &StatisticsSnapshot) -> DisplayProbabilities {
    let total = snapshot.total_records.max(1) as f64;
    let base = |category: OutcomeCategory| snapshot.distribution.get(category).count as f64 / total;

    let (nudge_a, nudge_b) = match snapshot.trend {
        Trend::Neutral => (1.0, 1.0),
        Trend::Favors(PredictedCategory::CategoryA) => (FAVORED_NUDGE, UNFAVORED_NUDGE),
        Trend::Favors(PredictedCategory::CategoryB) => (UNFAVORED_NUDGE, FAVORED_NUDGE),
    };

    DisplayProbabilities {
        neutral: to_percent(base(OutcomeCategory::Neutral)),
        category_a: to_percent(base(OutcomeCategory::CategoryA) * nudge_a),
        category_b: to_percent(base(OutcomeCategory::CategoryB) * nudge_b),
    }
}

fn to_percent(p: f64) -> u32 {
    (p * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Volatility, entropy, momentum and trend over the whole history.
pub fn technical_indicators(categories: &[OutcomeCategory]) -> TechnicalIndicators {
    TechnicalIndicators {
        volatility: sequence::volatility(categories),
        entropy: sequence::entropy(categories),
        momentum: sequence::momentum(categories),
        trend: sequence::trend(categories),
    }
}
