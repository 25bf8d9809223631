//! Prediction engine: analysis, strategies, ensemble, stake.
//!
//! One pipeline serves both profiles; a profile only decides which
//! strategies vote and with what weight.

pub mod compare;
pub mod ensemble;
pub mod probability;
pub mod stake;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::analysis::{self, StatisticsSnapshot};
use crate::strategy::{StrategyContext, StrategyKind};
use crate::types::{
    AugurError, CategoryLabels, DisplayProbabilities, GameRecord, OutcomeCategory,
    PredictedCategory, StakePlan, TechnicalIndicators, Trend,
};

pub use compare::{compare_profiles, ProfileComparison, ProfileSummary};
pub use ensemble::{EnsembleOutcome, EnsembleWeights, StrategyVote};
pub use stake::{validate_bet_amount, StakeAllocator, StakeConfig};

const RATIONALE_STREAK: usize = 3;
const RATIONALE_VOLATILITY: f64 = 0.7;
const RATIONALE_IMBALANCE: u32 = 20;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for the time-window strategy.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Preset strategy set and weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineProfile {
    /// Streak, frequency, pattern, martingale and time-window.
    Basic,
    /// All seven strategies.
    #[default]
    Advanced,
}

impl EngineProfile {
    pub fn strategies(self) -> Vec<StrategyKind> {
        match self {
            EngineProfile::Basic => StrategyKind::ALL[..5].to_vec(),
            EngineProfile::Advanced => StrategyKind::ALL.to_vec(),
        }
    }

    pub fn weights(self) -> EnsembleWeights {
        match self {
            EngineProfile::Basic => EnsembleWeights::basic(),
            EngineProfile::Advanced => EnsembleWeights::advanced(),
        }
    }
}

impl fmt::Display for EngineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineProfile::Basic => write!(f, "basic"),
            EngineProfile::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for EngineProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(EngineProfile::Basic),
            "advanced" => Ok(EngineProfile::Advanced),
            _ => Err(anyhow::anyhow!("Unknown engine profile: {s}")),
        }
    }
}

/// Weight overrides keyed by profile. Each table only applies while its
/// profile is selected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileWeights {
    pub basic: Option<EnsembleWeights>,
    pub advanced: Option<EnsembleWeights>,
}

impl ProfileWeights {
    pub fn get(&self, profile: EngineProfile) -> Option<&EnsembleWeights> {
        match profile {
            EngineProfile::Basic => self.basic.as_ref(),
            EngineProfile::Advanced => self.advanced.as_ref(),
        }
    }

    /// Preset weights of `profile` with its overrides merged in.
    pub fn resolve(&self, profile: EngineProfile) -> EnsembleWeights {
        let mut weights = profile.weights();
        if let Some(overrides) = self.get(profile) {
            weights.merge(overrides);
        }
        weights
    }

    pub fn validate(&self) -> Result<(), AugurError> {
        [&self.basic, &self.advanced]
            .into_iter()
            .flatten()
            .try_for_each(EnsembleWeights::check_values)
    }
}

/// Immutable engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Enabled strategies in evaluation order.
    pub strategies: Vec<StrategyKind>,
    pub weights: EnsembleWeights,
    /// Re-applied by `with_profile`.
    pub weight_overrides: ProfileWeights,
    pub stake: StakeConfig,
    pub labels: CategoryLabels,
}

impl EngineConfig {
    pub fn for_profile(profile: EngineProfile) -> Self {
        Self {
            strategies: profile.strategies(),
            weights: profile.weights(),
            weight_overrides: ProfileWeights::default(),
            stake: StakeConfig::default(),
            labels: CategoryLabels::default(),
        }
    }

    /// Same stake, labels and overrides; strategies and weights of `profile`.
    pub fn with_profile(&self, profile: EngineProfile) -> Self {
        Self {
            strategies: profile.strategies(),
            weights: self.weight_overrides.resolve(profile),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), AugurError> {
        self.weight_overrides.validate()?;
        self.weights.validate(&self.strategies)?;
        self.stake.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_profile(EngineProfile::default())
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Complete output of one prediction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted: PredictedCategory,
    pub predicted_label: String,
    /// Final confidence in [0, 0.95].
    pub confidence: f64,
    pub confidence_percent: u8,
    pub votes: Vec<StrategyVote>,
    pub ensemble: EnsembleOutcome,
    pub stake_plan: StakePlan,
    pub snapshot: StatisticsSnapshot,
    pub rationale: String,
    pub probabilities: DisplayProbabilities,
    pub indicators: TechnicalIndicators,
    pub generated_at: DateTime<Utc>,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}% | {} | {}",
            self.predicted_label, self.confidence_percent, self.stake_plan, self.indicators
        )
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct PredictionEngine {
    config: EngineConfig,
    allocator: StakeAllocator,
    clock: Box<dyn Clock>,
}

impl PredictionEngine {
    /// Build an engine reading the system clock.
    pub fn new(config: EngineConfig) -> Result<Self, AugurError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Box<dyn Clock>) -> Result<Self, AugurError> {
        config.validate()?;
        let allocator = StakeAllocator::new(config.stake.clone());
        Ok(Self {
            config,
            allocator,
            clock,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Predict using the engine clock as "now".
    pub fn predict(
        &self,
        history: &[GameRecord],
        bet: Decimal,
    ) -> Result<PredictionResult, AugurError> {
        self.predict_at(history, bet, self.clock.now())
    }

    /// Predict at an explicit instant. Deterministic for a given input.
    ///
    /// `history` is newest-first. `bet` is expected to be a positive multiple
    /// of the rounding unit; see [`validate_bet_amount`].
    pub fn predict_at(
        &self,
        history: &[GameRecord],
        bet: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, AugurError> {
        let snapshot = analysis::analyze(history)?;
        let labels = &self.config.labels;

        let (votes, indicators) = {
            let ctx = StrategyContext::new(history, &snapshot, labels, now);
            let votes: Vec<StrategyVote> = self
                .config
                .strategies
                .iter()
                .map(|&strategy| {
                    let result = strategy.evaluate(&ctx);
                    let weight = self.config.weights.get(strategy).unwrap_or(0.0);
                    debug!(
                        strategy = %strategy,
                        predicted = %result.predicted,
                        confidence = format!("{:.2}", result.confidence),
                        weight,
                        rationale = %result.rationale,
                        "Strategy vote"
                    );
                    StrategyVote {
                        strategy,
                        weight,
                        result,
                    }
                })
                .collect();
            (votes, probability::technical_indicators(&ctx.categories))
        };

        let ensemble = ensemble::aggregate(&votes, snapshot.entropy, snapshot.volatility);
        let stake_plan = self.allocator.allocate(
            bet,
            ensemble.predicted,
            ensemble.confidence,
            snapshot.volatility,
            snapshot.trend,
            labels,
        );

        Ok(PredictionResult {
            predicted: ensemble.predicted,
            predicted_label: labels.label(ensemble.predicted.category()).to_string(),
            confidence: ensemble.confidence,
            confidence_percent: (ensemble.confidence * 100.0).round() as u8,
            rationale: rationale(&snapshot, labels),
            probabilities: probability::display_probabilities(&snapshot),
            votes,
            ensemble,
            stake_plan,
            snapshot,
            indicators,
            generated_at: now,
        })
    }

    /// Compare both profiles using the engine clock as "now".
    pub fn compare_profiles(
        &self,
        history: &[GameRecord],
        bet: Decimal,
    ) -> Result<ProfileComparison, AugurError> {
        self.compare_profiles_at(history, bet, self.clock.now())
    }

    /// Run both profiles over the same input with this engine's stake,
    /// label and weight-override settings.
    pub fn compare_profiles_at(
        &self,
        history: &[GameRecord],
        bet: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ProfileComparison, AugurError> {
        compare_profiles(&self.config, history, bet, now)
    }
}

/// Human-readable summary of the notable signals in a snapshot.
pub fn rationale(snapshot: &StatisticsSnapshot, labels: &CategoryLabels) -> String {
    let mut reasons = Vec::new();

    if let Some(streak) = snapshot.current_streak {
        if streak.length >= RATIONALE_STREAK {
            reasons.push(format!(
                "Streak of {} {} points to a reversal",
                streak.length,
                labels.label(streak.category)
            ));
        }
    }

    if snapshot.volatility > RATIONALE_VOLATILITY {
        reasons.push(format!(
            "High volatility ({:.0}%) suggests unpredictability",
            snapshot.volatility * 100.0
        ));
    }

    if !snapshot.patterns.cycles.is_empty() {
        reasons.push(format!(
            "{} cyclic patterns detected",
            snapshot.patterns.cycles.len()
        ));
    }

    if let Trend::Favors(p) = snapshot.trend {
        reasons.push(format!("Current trend favors {}", labels.label(p.category())));
    }

    let a = snapshot.distribution.category_a.percent;
    let b = snapshot.distribution.category_b.percent;
    if a.abs_diff(b) > RATIONALE_IMBALANCE {
        let (under, low, high) = if a < b {
            (OutcomeCategory::CategoryA, a, b)
        } else {
            (OutcomeCategory::CategoryB, b, a)
        };
        reasons.push(format!(
            "{} is under-represented ({low}% vs {high}%)",
            labels.label(under)
        ));
    }

    if reasons.is_empty() {
        "Analysis based on multiple indicators with no dominant signal".to_string()
    } else {
        reasons.join(". ")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutcomeCategory::{CategoryA as A, CategoryB as B};
    use crate::types::RiskLevel;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    // ---- helpers ----

    fn make_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()
    }

    /// Newest-first history, one record per minute ending at `make_now()`.
    fn make_history(cats: &[OutcomeCategory]) -> Vec<GameRecord> {
        cats.iter()
            .enumerate()
            .map(|(i, c)| {
                let value = match c {
                    OutcomeCategory::Neutral => 0,
                    OutcomeCategory::CategoryA => 1 + (i % 7) as u8,
                    OutcomeCategory::CategoryB => 8 + (i % 7) as u8,
                };
                GameRecord::new(*c, value, make_now() - Duration::minutes(i as i64)).unwrap()
            })
            .collect()
    }

    fn make_engine() -> PredictionEngine {
        PredictionEngine::new(EngineConfig::default()).unwrap()
    }

    // ---- configuration ----

    #[test]
    fn test_profiles() {
        assert_eq!(EngineProfile::Basic.strategies().len(), 5);
        assert!(!EngineProfile::Basic.strategies().contains(&StrategyKind::Variance));
        assert_eq!(EngineProfile::Advanced.strategies().len(), 7);
        assert_eq!(EngineProfile::default(), EngineProfile::Advanced);
        assert_eq!("BASIC".parse::<EngineProfile>().unwrap(), EngineProfile::Basic);
    }

    #[test]
    fn test_missing_weight_rejected() {
        let config = EngineConfig {
            weights: EnsembleWeights::basic(),
            ..EngineConfig::for_profile(EngineProfile::Advanced)
        };
        let err = PredictionEngine::new(config).err().unwrap();
        assert!(matches!(err, AugurError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_with_profile_keeps_labels() {
        let mut base = EngineConfig::default();
        base.labels.category_a = "HEADS".to_string();
        let basic = base.with_profile(EngineProfile::Basic);
        assert_eq!(basic.labels.category_a, "HEADS");
        assert_eq!(basic.strategies.len(), 5);
    }

    // ---- prediction ----

    #[test]
    fn test_empty_history_fails() {
        let err = make_engine().predict_at(&[], dec!(100), make_now()).unwrap_err();
        assert!(matches!(
            err,
            AugurError::InsufficientHistory {
                required: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn test_uniform_history() {
        let history = make_history(&[A; 10]);
        let result = make_engine().predict_at(&history, dec!(50), make_now()).unwrap();

        assert_eq!(result.predicted, PredictedCategory::CategoryB);
        assert_eq!(result.predicted_label, "BLACK");
        assert_eq!(result.votes.len(), 7);
        let streak = &result.votes[0];
        assert_eq!(streak.strategy, StrategyKind::Streak);
        assert_eq!(streak.result.predicted, PredictedCategory::CategoryB);
        assert!((streak.result.confidence - 0.8).abs() < 1e-12);

        assert!((result.ensemble.correction_factor - 1.1 * 1.05).abs() < 1e-12);
        assert!((result.ensemble.raw_confidence - 0.495 / 0.699).abs() < 1e-9);
        assert_eq!(result.confidence_percent, 82);
        assert!(result.confidence <= 0.95);

        // trend favors A, so the hedge floor applies
        assert_eq!(result.stake_plan.hedge_stake, dec!(10));
        assert_eq!(result.stake_plan.primary_stake, dec!(40));
        assert_eq!(result.stake_plan.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn test_alternating_history() {
        let cats: Vec<OutcomeCategory> = (0..20).map(|i| if i % 2 == 0 { A } else { B }).collect();
        let history = make_history(&cats);
        let result = make_engine().predict_at(&history, dec!(100), make_now()).unwrap();

        assert_eq!(result.snapshot.current_streak.unwrap().length, 1);
        assert_eq!(result.snapshot.volatility, 1.0);
        let martingale = result
            .votes
            .iter()
            .find(|v| v.strategy == StrategyKind::Martingale)
            .unwrap();
        assert_eq!(martingale.result.predicted, PredictedCategory::CategoryB);

        assert_eq!(result.predicted, PredictedCategory::CategoryB);
        assert_eq!(result.confidence_percent, 58);
        assert_eq!(result.stake_plan.hedge_stake, dec!(30));
        assert_eq!(result.stake_plan.primary_stake, dec!(70));
        assert_eq!(result.stake_plan.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_predict_reads_engine_clock() {
        let mut clock = MockClock::new();
        clock.expect_now().times(1).returning(make_now);
        let engine = PredictionEngine::with_clock(EngineConfig::default(), Box::new(clock)).unwrap();

        let history = make_history(&[A, B, B, A, A, A, B]);
        let via_clock = engine.predict(&history, dec!(100)).unwrap();
        let explicit = engine.predict_at(&history, dec!(100), make_now()).unwrap();
        assert_eq!(via_clock, explicit);
        assert_eq!(via_clock.generated_at, make_now());
    }

    #[test]
    fn test_compare_reads_engine_clock() {
        let mut clock = MockClock::new();
        clock.expect_now().times(1).returning(make_now);
        let engine = PredictionEngine::with_clock(EngineConfig::default(), Box::new(clock)).unwrap();

        let history = make_history(&[A, B, B, A, A, A, B]);
        let via_clock = engine.compare_profiles(&history, dec!(100)).unwrap();
        let explicit = engine.compare_profiles_at(&history, dec!(100), make_now()).unwrap();
        assert_eq!(via_clock, explicit);
    }

    #[test]
    fn test_with_profile_applies_only_its_overrides() {
        let mut base = EngineConfig::default();
        base.weight_overrides.advanced =
            Some(EnsembleWeights::new([(StrategyKind::Streak, 0.9)]));
        base.weight_overrides.basic =
            Some(EnsembleWeights::new([(StrategyKind::Pattern, 0.4)]));

        let basic = base.with_profile(EngineProfile::Basic);
        assert_eq!(basic.weights.get(StrategyKind::Streak), Some(0.30));
        assert_eq!(basic.weights.get(StrategyKind::Pattern), Some(0.4));
        assert!(basic.validate().is_ok());

        let advanced = base.with_profile(EngineProfile::Advanced);
        assert_eq!(advanced.weights.get(StrategyKind::Streak), Some(0.9));
        assert_eq!(advanced.weights.get(StrategyKind::Pattern), Some(0.15));
    }

    #[test]
    fn test_negative_override_for_other_profile_rejected() {
        let mut config = EngineConfig::for_profile(EngineProfile::Basic);
        config.weight_overrides.advanced =
            Some(EnsembleWeights::new([(StrategyKind::Variance, -1.0)]));
        let err = PredictionEngine::new(config).err().unwrap();
        assert!(matches!(err, AugurError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_basic_profile_votes_five() {
        let engine = PredictionEngine::new(EngineConfig::for_profile(EngineProfile::Basic)).unwrap();
        let history = make_history(&[A, B, A, A, B]);
        let result = engine.predict_at(&history, dec!(20), make_now()).unwrap();
        assert_eq!(result.votes.len(), 5);
        assert_eq!(
            result.stake_plan.primary_stake + result.stake_plan.hedge_stake,
            dec!(20)
        );
    }

    // ---- rationale ----

    #[test]
    fn test_rationale_collects_reasons() {
        let snapshot = analysis::analyze(&make_history(&[A; 10])).unwrap();
        let text = rationale(&snapshot, &CategoryLabels::default());
        assert!(text.starts_with("Streak of 10 RED points to a reversal"));
        assert!(text.contains("Current trend favors RED"));
        assert!(text.contains("BLACK is under-represented (0% vs 100%)"));
        assert!(!text.contains("volatility"));
    }

    #[test]
    fn test_rationale_fallback() {
        let snapshot = analysis::analyze(&make_history(&[A, A, B, B])).unwrap();
        let text = rationale(&snapshot, &CategoryLabels::default());
        assert_eq!(text, "Analysis based on multiple indicators with no dominant signal");
    }
}
