//! Shared types for the AUGUR engine.
//!
//! These types form the data model used across all modules.
//! They carry no behaviour beyond validation and display so that the
//! analysis, strategy, and engine modules can depend on them freely.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest legal secondary value (roll) of a game record.
pub const MAX_SECONDARY_VALUE: u8 = 14;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Outcome class of a single game.
///
/// `Neutral` only ever appears in raw history and statistics; the ensemble
/// predicts one of the two active categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Neutral,
    CategoryA,
    CategoryB,
}

impl OutcomeCategory {
    /// All categories in code order.
    pub const ALL: [OutcomeCategory; 3] = [
        OutcomeCategory::Neutral,
        OutcomeCategory::CategoryA,
        OutcomeCategory::CategoryB,
    ];

    /// Numeric code used by the upstream feed (0, 1, 2).
    pub fn code(self) -> u8 {
        match self {
            OutcomeCategory::Neutral => 0,
            OutcomeCategory::CategoryA => 1,
            OutcomeCategory::CategoryB => 2,
        }
    }

    /// Decode a feed color code.
    pub fn from_code(code: u8) -> Result<Self, AugurError> {
        match code {
            0 => Ok(OutcomeCategory::Neutral),
            1 => Ok(OutcomeCategory::CategoryA),
            2 => Ok(OutcomeCategory::CategoryB),
            other => Err(AugurError::InvalidRecord(format!(
                "unknown color code {other}"
            ))),
        }
    }

    /// The active category this outcome corresponds to, if any.
    pub fn as_predicted(self) -> Option<PredictedCategory> {
        match self {
            OutcomeCategory::Neutral => None,
            OutcomeCategory::CategoryA => Some(PredictedCategory::CategoryA),
            OutcomeCategory::CategoryB => Some(PredictedCategory::CategoryB),
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeCategory::Neutral => write!(f, "NEUTRAL"),
            OutcomeCategory::CategoryA => write!(f, "CATEGORY_A"),
            OutcomeCategory::CategoryB => write!(f, "CATEGORY_B"),
        }
    }
}

/// A category the ensemble is allowed to predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedCategory {
    CategoryA,
    CategoryB,
}

impl PredictedCategory {
    /// The other active category.
    pub fn opposite(self) -> Self {
        match self {
            PredictedCategory::CategoryA => PredictedCategory::CategoryB,
            PredictedCategory::CategoryB => PredictedCategory::CategoryA,
        }
    }

    /// Bet against `last`: B after A, A after anything else.
    pub fn reversal_of(last: Option<OutcomeCategory>) -> Self {
        match last {
            Some(OutcomeCategory::CategoryA) => PredictedCategory::CategoryB,
            _ => PredictedCategory::CategoryA,
        }
    }

    /// Bet on `last` repeating; a neutral outcome maps to A.
    pub fn continuation_of(last: OutcomeCategory) -> Self {
        last.as_predicted().unwrap_or(PredictedCategory::CategoryA)
    }

    pub fn category(self) -> OutcomeCategory {
        match self {
            PredictedCategory::CategoryA => OutcomeCategory::CategoryA,
            PredictedCategory::CategoryB => OutcomeCategory::CategoryB,
        }
    }
}

impl From<PredictedCategory> for OutcomeCategory {
    fn from(p: PredictedCategory) -> Self {
        p.category()
    }
}

impl fmt::Display for PredictedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// Display names for the three categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryLabels {
    pub neutral: String,
    pub category_a: String,
    pub category_b: String,
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self {
            neutral: "WHITE".to_string(),
            category_a: "RED".to_string(),
            category_b: "BLACK".to_string(),
        }
    }
}

impl CategoryLabels {
    pub fn label(&self, category: OutcomeCategory) -> &str {
        match category {
            OutcomeCategory::Neutral => &self.neutral,
            OutcomeCategory::CategoryA => &self.category_a,
            OutcomeCategory::CategoryB => &self.category_b,
        }
    }
}

/// Direction of the recent distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Neutral,
    Favors(PredictedCategory),
}

impl Trend {
    pub fn is_neutral(&self) -> bool {
        matches!(self, Trend::Neutral)
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Neutral => write!(f, "neutral"),
            Trend::Favors(p) => write!(f, "favors {p}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game records
// ---------------------------------------------------------------------------

/// One observed game outcome. Histories are ordered newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeedRecord", into = "FeedRecord")]
pub struct GameRecord {
    category: OutcomeCategory,
    secondary_value: u8,
    occurred_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(
        category: OutcomeCategory,
        secondary_value: u8,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, AugurError> {
        if secondary_value > MAX_SECONDARY_VALUE {
            return Err(AugurError::InvalidRecord(format!(
                "secondary value {secondary_value} outside 0..={MAX_SECONDARY_VALUE}"
            )));
        }
        Ok(Self {
            category,
            secondary_value,
            occurred_at,
        })
    }

    pub fn category(&self) -> OutcomeCategory {
        self.category
    }

    pub fn secondary_value(&self) -> u8 {
        self.secondary_value
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roll={} at {}",
            self.category,
            self.secondary_value,
            self.occurred_at.to_rfc3339(),
        )
    }
}

/// Wire shape of a record as delivered by the upstream game feed.
/// Unknown fields (ids, seeds) are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedRecord {
    pub color: u8,
    pub roll: u8,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FeedRecord> for GameRecord {
    type Error = AugurError;

    fn try_from(raw: FeedRecord) -> Result<Self, Self::Error> {
        GameRecord::new(OutcomeCategory::from_code(raw.color)?, raw.roll, raw.created_at)
    }
}

impl From<GameRecord> for FeedRecord {
    fn from(record: GameRecord) -> Self {
        FeedRecord {
            color: record.category.code(),
            roll: record.secondary_value,
            created_at: record.occurred_at,
        }
    }
}

/// Category sequence of a history, preserving newest-first order.
pub fn categories(history: &[GameRecord]) -> Vec<OutcomeCategory> {
    history.iter().map(GameRecord::category).collect()
}

/// Secondary values of a history, preserving newest-first order.
pub fn secondary_values(history: &[GameRecord]) -> Vec<u8> {
    history.iter().map(GameRecord::secondary_value).collect()
}

// ---------------------------------------------------------------------------
// Strategy output
// ---------------------------------------------------------------------------

/// Verdict of a single scoring strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub predicted: PredictedCategory,
    /// Always within [0, 1].
    pub confidence: f64,
    pub rationale: String,
}

impl StrategyResult {
    /// Build a result, clamping the confidence into [0, 1].
    /// Non-finite confidences collapse to 0.
    pub fn new(predicted: PredictedCategory, confidence: f64, rationale: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            predicted,
            confidence,
            rationale: rationale.into(),
        }
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conf={:.0}% ({})",
            self.predicted,
            self.confidence * 100.0,
            self.rationale,
        )
    }
}

// ---------------------------------------------------------------------------
// Stake plan
// ---------------------------------------------------------------------------

/// Qualitative risk attached to a stake plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Moderate => write!(f, "MODERATE"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Rounded percentage split between the two stakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSplit {
    pub primary_percent: u32,
    pub hedge_percent: u32,
}

/// Division of a wager between the predicted category and a neutral hedge.
///
/// `primary_stake + hedge_stake == total_stake`, both multiples of the
/// rounding unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakePlan {
    pub total_stake: Decimal,
    pub primary_stake: Decimal,
    pub hedge_stake: Decimal,
    /// Hedge fraction chosen before rounding.
    pub hedge_fraction: f64,
    pub split: StakeSplit,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

impl fmt::Display for StakePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "primary={} ({}%) hedge={} ({}%) risk={}",
            self.primary_stake,
            self.split.primary_percent,
            self.hedge_stake,
            self.split.hedge_percent,
            self.risk_level,
        )
    }
}

// ---------------------------------------------------------------------------
// Presentation estimates
// ---------------------------------------------------------------------------

/// Per-category display percentages. Not calibrated and not guaranteed
/// to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayProbabilities {
    pub neutral: u32,
    pub category_a: u32,
    pub category_b: u32,
}

/// Headline indicators computed over the whole history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    /// Fraction of adjacent changes, 0–1.
    pub volatility: f64,
    /// Shannon entropy in bits.
    pub entropy: f64,
    pub momentum: f64,
    pub trend: Trend,
}

impl fmt::Display for TechnicalIndicators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "volatility={:.1}% entropy={:.2} momentum={:.2} trend={}",
            self.volatility * 100.0,
            self.entropy,
            self.momentum,
            self.trend,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for AUGUR.
#[derive(Debug, thiserror::Error)]
pub enum AugurError {
    #[error("Insufficient history: need at least {required} records, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid game record: {0}")]
    InvalidRecord(String),

    #[error("Invalid bet amount {amount}: must be a positive multiple of {unit}")]
    InvalidBetAmount { amount: Decimal, unit: Decimal },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
