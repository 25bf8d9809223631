//! Statistical analysis of the outcome history.
//!
//! Produces the read-only `StatisticsSnapshot` shared by every strategy
//! during a prediction call.

pub mod patterns;
pub mod sequence;

use serde::{Deserialize, Serialize};

use crate::types::{self, AugurError, GameRecord, OutcomeCategory, Trend};
use patterns::PatternReport;
use sequence::{CategoryCounts, Streak, ValueFrequency};

/// Number of newest records used for the snapshot trend label.
pub const TREND_WINDOW: usize = 10;

/// Number of newest records echoed back as the recent pattern.
pub const RECENT_PATTERN_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Count and rounded percentage of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub neutral: CategoryShare,
    pub category_a: CategoryShare,
    pub category_b: CategoryShare,
}

impl Distribution {
    fn from_counts(counts: &CategoryCounts) -> Self {
        let total = counts.total();
        let share = |count| CategoryShare {
            count,
            percent: sequence::percent(count, total),
        };
        Self {
            neutral: share(counts.neutral),
            category_a: share(counts.category_a),
            category_b: share(counts.category_b),
        }
    }

    pub fn get(&self, category: OutcomeCategory) -> CategoryShare {
        match category {
            OutcomeCategory::Neutral => self.neutral,
            OutcomeCategory::CategoryA => self.category_a,
            OutcomeCategory::CategoryB => self.category_b,
        }
    }
}

/// Aggregate statistics over a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_records: usize,
    pub distribution: Distribution,
    pub variance: f64,
    pub entropy: f64,
    pub volatility: f64,
    /// Trend over the `TREND_WINDOW` newest records.
    pub trend: Trend,
    pub momentum: f64,
    pub current_streak: Option<Streak>,
    pub streaks: Vec<Streak>,
    pub longest_streak: usize,
    pub hot_values: Vec<ValueFrequency>,
    pub cold_values: Vec<ValueFrequency>,
    /// N-grams and cycles over the pattern window.
    pub patterns: PatternReport,
    pub recent_pattern: Vec<OutcomeCategory>,
}

/// Compute the statistics snapshot for a newest-first history.
///
/// Fails only on an empty history; every other metric degrades to a
/// neutral value when its window is short.
pub fn analyze(history: &[GameRecord]) -> Result<StatisticsSnapshot, AugurError> {
    if history.is_empty() {
        return Err(AugurError::InsufficientHistory {
            required: 1,
            available: 0,
        });
    }

    let categories = types::categories(history);
    let values = types::secondary_values(history);
    let counts = CategoryCounts::count(&categories);
    let streaks = sequence::historical_streaks(&categories);

    Ok(StatisticsSnapshot {
        total_records: categories.len(),
        distribution: Distribution::from_counts(&counts),
        variance: sequence::variance(&categories),
        entropy: sequence::entropy(&categories),
        volatility: sequence::volatility(&categories),
        trend: sequence::trend(&categories[..categories.len().min(TREND_WINDOW)]),
        momentum: sequence::momentum(&categories),
        current_streak: sequence::current_streak(&categories),
        longest_streak: streaks.iter().map(|s| s.length).max().unwrap_or(0),
        streaks,
        hot_values: sequence::hot_values(&values),
        cold_values: sequence::cold_values(&values),
        patterns: patterns::mine(&categories),
        recent_pattern: categories.iter().take(RECENT_PATTERN_LEN).copied().collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
