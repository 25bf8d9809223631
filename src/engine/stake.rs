//! Stake allocation between the predicted category and a neutral hedge.
//!
//! The hedge share grows as confidence falls and volatility rises, is
//! clamped to a configured band, and is rounded down to the betting unit.

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::debug;

use crate::types::{
    AugurError, CategoryLabels, OutcomeCategory, PredictedCategory, RiskLevel, StakePlan,
    StakeSplit, Trend,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Stake allocation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    /// Hedge share before adjustments.
    pub base_pct: f64,
    /// Added hedge share per unit of missing confidence.
    pub confidence_adjustment_rate: f64,
    /// Added hedge share per unit of volatility.
    pub volatility_adjustment_rate: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    /// Both stakes are multiples of this.
    pub rounding_unit: Decimal,
    /// Hedge floor applied when a trend is detected.
    pub min_trend_hedge: Decimal,
    /// Hedge shares above this are HIGH risk.
    pub high_risk_threshold: f64,
    /// Hedge shares above this are MODERATE risk.
    pub moderate_risk_threshold: f64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            base_pct: 0.15,
            confidence_adjustment_rate: 0.15,
            volatility_adjustment_rate: 0.10,
            min_pct: 0.05,
            max_pct: 0.30,
            rounding_unit: dec!(10),
            min_trend_hedge: dec!(10),
            high_risk_threshold: 0.25,
            moderate_risk_threshold: 0.15,
        }
    }
}

impl StakeConfig {
    pub fn validate(&self) -> Result<(), AugurError> {
        let fractions = [
            ("base_pct", self.base_pct),
            ("confidence_adjustment_rate", self.confidence_adjustment_rate),
            ("volatility_adjustment_rate", self.volatility_adjustment_rate),
            ("min_pct", self.min_pct),
            ("max_pct", self.max_pct),
            ("high_risk_threshold", self.high_risk_threshold),
            ("moderate_risk_threshold", self.moderate_risk_threshold),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AugurError::InvalidConfiguration(format!(
                    "stake.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.min_pct > self.max_pct {
            return Err(AugurError::InvalidConfiguration(format!(
                "stake.min_pct ({}) exceeds stake.max_pct ({})",
                self.min_pct, self.max_pct
            )));
        }
        if self.rounding_unit <= Decimal::ZERO {
            return Err(AugurError::InvalidConfiguration(
                "stake.rounding_unit must be positive".to_string(),
            ));
        }
        if self.min_trend_hedge < Decimal::ZERO || !(self.min_trend_hedge % self.rounding_unit).is_zero() {
            return Err(AugurError::InvalidConfiguration(format!(
                "stake.min_trend_hedge ({}) must be a non-negative multiple of {}",
                self.min_trend_hedge, self.rounding_unit
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Allocator
// ---------------------------------------------------------------------------

pub struct StakeAllocator {
    config: StakeConfig,
}

impl StakeAllocator {
    pub fn new(config: StakeConfig) -> Self {
        Self { config }
    }

    /// Access the stake configuration.
    pub fn config(&self) -> &StakeConfig {
        &self.config
    }

    /// Hedge share of the wager before rounding.
    ///
    /// hedge = clamp(base + (1 − confidence)·rate_c + volatility·rate_v, min, max)
    pub fn hedge_fraction(&self, confidence: f64, volatility: f64) -> f64 {
        let c = &self.config;
        let confidence = confidence.clamp(0.0, 1.0);
        let volatility = volatility.clamp(0.0, 1.0);
        (c.base_pct
            + (1.0 - confidence) * c.confidence_adjustment_rate
            + volatility * c.volatility_adjustment_rate)
            .clamp(c.min_pct, c.max_pct)
    }

    pub fn risk_level(&self, hedge_fraction: f64) -> RiskLevel {
        if hedge_fraction > self.config.high_risk_threshold {
            RiskLevel::High
        } else if hedge_fraction > self.config.moderate_risk_threshold {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Split `total` between the predicted category and the neutral hedge.
    ///
    /// `primary_stake + hedge_stake == total` always holds; with a total that
    /// is a multiple of the rounding unit both stakes are too.
    pub fn allocate(
        &self,
        total: Decimal,
        predicted: PredictedCategory,
        confidence: f64,
        volatility: f64,
        trend: Trend,
        labels: &CategoryLabels,
    ) -> StakePlan {
        let unit = self.config.rounding_unit;
        let total = total.max(Decimal::ZERO);
        let fraction = self.hedge_fraction(confidence, volatility);

        let share = Decimal::from_f64(fraction).unwrap_or(Decimal::ZERO).round_dp(6);
        let mut hedge = (total * share / unit).floor() * unit;
        if !trend.is_neutral() {
            hedge = hedge.max(self.config.min_trend_hedge);
        }
        let hedge = hedge.min(total);
        let primary = total - hedge;

        let risk_level = self.risk_level(fraction);
        let split = StakeSplit {
            primary_percent: percent_of(primary, total),
            hedge_percent: percent_of(hedge, total),
        };

        debug!(
            total = %total,
            hedge_fraction = format!("{:.1}%", fraction * 100.0),
            primary = %primary,
            hedge = %hedge,
            risk = %risk_level,
            "Stake allocated"
        );

        StakePlan {
            total_stake: total,
            primary_stake: primary,
            hedge_stake: hedge,
            hedge_fraction: fraction,
            split,
            risk_level,
            recommendation: format!(
                "Bet {primary} on {}, {hedge} on {} as a hedge (risk {risk_level})",
                labels.label(predicted.category()),
                labels.label(OutcomeCategory::Neutral),
            ),
        }
    }
}

fn percent_of(part: Decimal, total: Decimal) -> u32 {
    if total.is_zero() {
        return 0;
    }
    (part / total * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Reject wagers that are not a positive multiple of `unit`.
pub fn validate_bet_amount(amount: Decimal, unit: Decimal) -> Result<(), AugurError> {
    if amount < unit || unit <= Decimal::ZERO || !(amount % unit).is_zero() {
        return Err(AugurError::InvalidBetAmount { amount, unit });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
