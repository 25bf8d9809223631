//! End-to-end prediction scenarios.
//!
//! Drives the public engine API with fixed histories and a fixed "now"
//! so every expectation is deterministic.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use augur::analysis;
use augur::engine::{
    validate_bet_amount, EngineConfig, EngineProfile, EnsembleWeights, PredictionEngine,
};
use augur::strategy::StrategyKind;
use augur::types::{
    AugurError, CategoryLabels, GameRecord, OutcomeCategory, PredictedCategory, RiskLevel, Trend,
};

use augur::types::OutcomeCategory::{CategoryA as A, CategoryB as B, Neutral as N};

// ---- helpers ----

fn make_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()
}

/// Newest-first history spaced `spacing_secs` apart, ending at `make_now()`.
fn make_history(cats: &[OutcomeCategory], spacing_secs: i64) -> Vec<GameRecord> {
    cats.iter()
        .enumerate()
        .map(|(i, c)| {
            let roll = match c {
                N => 0,
                A => 1 + (i % 7) as u8,
                B => 8 + (i % 7) as u8,
            };
            GameRecord::new(*c, roll, make_now() - Duration::seconds(spacing_secs * i as i64))
                .unwrap()
        })
        .collect()
}

fn alternating(n: usize) -> Vec<OutcomeCategory> {
    (0..n).map(|i| if i % 2 == 0 { A } else { B }).collect()
}

fn engine() -> PredictionEngine {
    PredictionEngine::new(EngineConfig::default()).unwrap()
}

// ---- scenarios ----

#[test]
fn test_alternating_twenty() {
    let history = make_history(&alternating(20), 60);
    let result = engine().predict_at(&history, dec!(100), make_now()).unwrap();

    let snapshot = &result.snapshot;
    assert_eq!(snapshot.current_streak.unwrap().length, 1);
    assert!((snapshot.volatility - 1.0).abs() < 1e-12);
    assert_eq!(snapshot.trend, Trend::Neutral);

    let vote = |kind: StrategyKind| {
        result
            .votes
            .iter()
            .find(|v| v.strategy == kind)
            .map(|v| v.result.clone())
            .unwrap()
    };
    // martingale reverses the newest record
    assert_eq!(vote(StrategyKind::Martingale).predicted, PredictedCategory::CategoryB);
    // frequency is tied, so it sits on its floor
    assert!((vote(StrategyKind::Frequency).confidence - 0.4).abs() < 1e-12);

    assert_eq!(result.predicted, PredictedCategory::CategoryB);
    assert!((result.ensemble.correction_factor - 0.95).abs() < 1e-12);
    assert_eq!(result.confidence_percent, 58);

    // hedge share hits the 30% cap and rounds to a whole unit
    let plan = &result.stake_plan;
    assert_eq!(plan.hedge_stake, dec!(30));
    assert_eq!(plan.primary_stake, dec!(70));
    assert_eq!(plan.risk_level, RiskLevel::High);
    assert!(result.rationale.contains("High volatility (100%)"));
}

#[test]
fn test_ten_identical() {
    let history = make_history(&[A; 10], 60);
    let result = engine().predict_at(&history, dec!(50), make_now()).unwrap();

    assert_eq!(result.snapshot.current_streak.unwrap().length, 10);
    assert_eq!(result.snapshot.variance, 0.0);
    assert_eq!(result.snapshot.entropy, 0.0);

    let streak = &result.votes[0];
    assert_eq!(streak.strategy, StrategyKind::Streak);
    assert_eq!(streak.result.predicted, PredictedCategory::CategoryB);
    assert!((streak.result.confidence - 0.8).abs() < 1e-12);

    assert!((result.ensemble.correction_factor - 1.155).abs() < 1e-12);
    assert!(result.confidence <= 0.95);
    assert_eq!(result.predicted, PredictedCategory::CategoryB);

    assert_eq!(result.stake_plan.primary_stake + result.stake_plan.hedge_stake, dec!(50));
    assert_eq!(result.stake_plan.hedge_stake, dec!(10));
    assert_eq!(result.probabilities.category_a, 100);
    assert_eq!(result.probabilities.category_b, 0);
}

#[test]
fn test_single_record_degrades_gracefully() {
    let history = make_history(&[N], 60);
    let result = engine().predict_at(&history, dec!(10), make_now()).unwrap();

    assert_eq!(result.snapshot.total_records, 1);
    assert_eq!(result.snapshot.volatility, 0.0);
    assert_eq!(result.indicators.momentum, 0.0);
    assert_eq!(result.votes.len(), 7);
    assert_eq!(result.stake_plan.primary_stake + result.stake_plan.hedge_stake, dec!(10));
}

#[test]
fn test_predict_is_deterministic() {
    let history = make_history(&[A, B, N, B, B, A, A, A, B, N, A, B, B, A], 45);
    let engine = engine();
    let first = engine.predict_at(&history, dec!(120), make_now()).unwrap();
    let second = engine.predict_at(&history, dec!(120), make_now()).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_time_window_follows_now() {
    // Newest five are B, the rest A; records are 10 minutes apart.
    let mut cats = vec![B; 5];
    cats.extend([A; 10]);
    let history = make_history(&cats, 600);
    let engine = engine();

    let time_vote = |now| {
        engine
            .predict_at(&history, dec!(100), now)
            .unwrap()
            .votes
            .into_iter()
            .find(|v| v.strategy == StrategyKind::TimeWindow)
            .unwrap()
    };

    // Only B records fall in the last 30 minutes: predict A.
    assert_eq!(time_vote(make_now()).result.predicted, PredictedCategory::CategoryA);
    // Far in the future nothing is in the window: the tie goes to B.
    assert_eq!(
        time_vote(make_now() + Duration::days(1)).result.predicted,
        PredictedCategory::CategoryB
    );
}

// ---- profiles & configuration ----

#[test]
fn test_profile_comparison() {
    let history = make_history(&alternating(20), 60);
    let cmp = engine().compare_profiles_at(&history, dec!(100), make_now()).unwrap();

    assert_eq!(cmp.basic.strategies, 5);
    assert_eq!(cmp.advanced.strategies, 7);
    if cmp.advanced.confidence > cmp.basic.confidence {
        assert!(cmp.recommendation.starts_with("Use the advanced profile"));
    } else {
        assert!(cmp.recommendation.starts_with("Use the basic profile"));
    }
}

#[test]
fn test_custom_labels_flow_through() {
    let config = EngineConfig {
        labels: CategoryLabels {
            neutral: "GREEN".to_string(),
            category_a: "HEADS".to_string(),
            category_b: "TAILS".to_string(),
        },
        ..EngineConfig::for_profile(EngineProfile::Basic)
    };
    let engine = PredictionEngine::new(config).unwrap();
    let result = engine.predict_at(&make_history(&[A; 6], 60), dec!(40), make_now()).unwrap();

    assert_eq!(result.predicted_label, "TAILS");
    assert!(result.stake_plan.recommendation.contains("on GREEN"));
    assert!(result.rationale.contains("Streak of 6 HEADS"));
}

#[test]
fn test_invalid_configuration_rejected() {
    let mut weights = EnsembleWeights::advanced();
    weights.set(StrategyKind::Pattern, -0.5);
    let config = EngineConfig {
        weights,
        ..EngineConfig::default()
    };
    let err = PredictionEngine::new(config).err().unwrap();
    assert!(matches!(err, AugurError::InvalidConfiguration(_)));

    let config = EngineConfig {
        strategies: Vec::new(),
        ..EngineConfig::default()
    };
    assert!(PredictionEngine::new(config).is_err());
}

#[test]
fn test_empty_history_is_an_error() {
    let err = engine().predict_at(&[], dec!(100), make_now()).unwrap_err();
    assert!(matches!(
        err,
        AugurError::InsufficientHistory {
            required: 1,
            available: 0
        }
    ));
    assert!(analysis::analyze(&[]).is_err());
}

#[test]
fn test_bet_validation() {
    assert!(validate_bet_amount(dec!(10), dec!(10)).is_ok());
    let err = validate_bet_amount(dec!(25), dec!(10)).unwrap_err();
    assert!(matches!(err, AugurError::InvalidBetAmount { .. }));
}

#[test]
fn test_feed_json_to_prediction() {
    let feed = r#"[
        {"color": 1, "roll": 3, "created_at": "2024-06-01T19:59:00Z"},
        {"color": 1, "roll": 5, "created_at": "2024-06-01T19:58:00Z"},
        {"color": 2, "roll": 11, "created_at": "2024-06-01T19:57:00Z"},
        {"color": 0, "roll": 0, "created_at": "2024-06-01T19:56:00Z"}
    ]"#;
    let history: Vec<GameRecord> = serde_json::from_str(feed).unwrap();
    let result = engine().predict_at(&history, dec!(30), make_now()).unwrap();

    assert_eq!(result.snapshot.recent_pattern, vec![A, A, B, N]);
    assert_eq!(result.snapshot.hot_values.len(), 4);

    let bad = r#"[{"color": 1, "roll": 15, "created_at": "2024-06-01T19:59:00Z"}]"#;
    assert!(serde_json::from_str::<Vec<GameRecord>>(bad).is_err());
}
