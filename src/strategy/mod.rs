//! Strategy layer: seven independent scorers over the outcome history.
//!
//! Each scorer is a pure function of a `StrategyContext` and returns a
//! `StrategyResult`. The ensemble decides how much each one counts.

pub mod scorers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::patterns::PatternReport;
use crate::analysis::StatisticsSnapshot;
use crate::types::{self, CategoryLabels, GameRecord, OutcomeCategory, StrategyResult};

// ---------------------------------------------------------------------------
// Strategy kinds
// ---------------------------------------------------------------------------

/// Identifier of a scoring strategy. Also the key of the weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Streak,
    Frequency,
    Pattern,
    Martingale,
    TimeWindow,
    Variance,
    Momentum,
}

impl StrategyKind {
    /// All strategies in evaluation order.
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Streak,
        StrategyKind::Frequency,
        StrategyKind::Pattern,
        StrategyKind::Martingale,
        StrategyKind::TimeWindow,
        StrategyKind::Variance,
        StrategyKind::Momentum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Streak => "streak",
            StrategyKind::Frequency => "frequency",
            StrategyKind::Pattern => "pattern",
            StrategyKind::Martingale => "martingale",
            StrategyKind::TimeWindow => "time_window",
            StrategyKind::Variance => "variance",
            StrategyKind::Momentum => "momentum",
        }
    }

    /// Score the context with this strategy.
    pub fn evaluate(self, ctx: &StrategyContext<'_>) -> StrategyResult {
        match self {
            StrategyKind::Streak => scorers::streak(ctx),
            StrategyKind::Frequency => scorers::frequency(ctx),
            StrategyKind::Pattern => scorers::pattern(ctx),
            StrategyKind::Martingale => scorers::martingale(ctx),
            StrategyKind::TimeWindow => scorers::time_window(ctx),
            StrategyKind::Variance => scorers::variance(ctx),
            StrategyKind::Momentum => scorers::momentum(ctx),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "streak" => Ok(StrategyKind::Streak),
            "frequency" => Ok(StrategyKind::Frequency),
            "pattern" => Ok(StrategyKind::Pattern),
            "martingale" | "alternation" => Ok(StrategyKind::Martingale),
            "time_window" | "time_interval" => Ok(StrategyKind::TimeWindow),
            "variance" => Ok(StrategyKind::Variance),
            "momentum" => Ok(StrategyKind::Momentum),
            _ => Err(anyhow::anyhow!("Unknown strategy: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a scorer may read. Built once per prediction call.
pub struct StrategyContext<'a> {
    pub history: &'a [GameRecord],
    pub categories: Vec<OutcomeCategory>,
    pub snapshot: &'a StatisticsSnapshot,
    /// Mined once by `analyze`.
    pub patterns: &'a PatternReport,
    pub labels: &'a CategoryLabels,
    /// Reference instant for the time-window strategy.
    pub now: DateTime<Utc>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        history: &'a [GameRecord],
        snapshot: &'a StatisticsSnapshot,
        labels: &'a CategoryLabels,
        now: DateTime<Utc>,
    ) -> Self {
        let categories = types::categories(history);
        Self {
            history,
            categories,
            snapshot,
            patterns: &snapshot.patterns,
            labels,
            now,
        }
    }

    /// The `n` newest categories (fewer if the history is short).
    pub fn recent(&self, n: usize) -> &[OutcomeCategory] {
        &self.categories[..self.categories.len().min(n)]
    }

    pub fn last(&self) -> Option<OutcomeCategory> {
        self.categories.first().copied()
    }

    pub fn label(&self, category: OutcomeCategory) -> &str {
        self.labels.label(category)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
