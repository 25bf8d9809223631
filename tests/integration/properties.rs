//! Property tests for the analysis, ensemble and stake invariants.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use augur::analysis::{self, sequence};
use augur::engine::{EngineConfig, EngineProfile, PredictionEngine, StakeAllocator, StakeConfig};
use augur::types::{CategoryLabels, GameRecord, OutcomeCategory, PredictedCategory, Trend};

fn arb_category() -> impl Strategy<Value = OutcomeCategory> {
    prop_oneof![
        Just(OutcomeCategory::Neutral),
        Just(OutcomeCategory::CategoryA),
        Just(OutcomeCategory::CategoryB),
    ]
}

fn arb_trend() -> impl Strategy<Value = Trend> {
    prop_oneof![
        Just(Trend::Neutral),
        Just(Trend::Favors(PredictedCategory::CategoryA)),
        Just(Trend::Favors(PredictedCategory::CategoryB)),
    ]
}

fn arb_history(max: usize) -> impl Strategy<Value = Vec<GameRecord>> {
    prop::collection::vec((arb_category(), 0u8..=14, 0i64..120), 1..max).prop_map(|rows| {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        let mut elapsed = 0;
        rows.into_iter()
            .map(|(category, roll, gap)| {
                elapsed += gap;
                GameRecord::new(category, roll, t0 - Duration::seconds(elapsed)).unwrap()
            })
            .collect()
    })
}

// ── Distribution percentages sum to 100 within rounding ─────────────────

proptest! {
    #[test]
    fn distribution_sums_to_hundred(history in arb_history(80)) {
        let snapshot = analysis::analyze(&history).unwrap();
        let d = snapshot.distribution;
        let sum = d.neutral.percent + d.category_a.percent + d.category_b.percent;
        prop_assert!((98..=102).contains(&sum), "sum was {}", sum);
        prop_assert_eq!(
            d.neutral.count + d.category_a.count + d.category_b.count,
            history.len()
        );
    }
}

// ── Entropy stays within [0, log2 3] ─────────────────────────────────────

proptest! {
    #[test]
    fn entropy_bounded(cats in prop::collection::vec(arb_category(), 0..100)) {
        let e = sequence::entropy(&cats);
        prop_assert!(e >= 0.0);
        prop_assert!(e <= 3f64.log2() + 1e-9);
    }
}

// ── Stake conservation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn stake_conserved(
        units in 1i64..500,
        confidence in 0.0f64..=1.0,
        volatility in 0.0f64..=1.0,
        trend in arb_trend(),
    ) {
        let total = Decimal::from(units * 10);
        let allocator = StakeAllocator::new(StakeConfig::default());
        let plan = allocator.allocate(
            total,
            PredictedCategory::CategoryA,
            confidence,
            volatility,
            trend,
            &CategoryLabels::default(),
        );

        prop_assert_eq!(plan.primary_stake + plan.hedge_stake, total);
        prop_assert!(plan.primary_stake >= Decimal::ZERO);
        prop_assert!(plan.hedge_stake >= Decimal::ZERO);
        prop_assert!((plan.primary_stake % Decimal::TEN).is_zero());
        prop_assert!((plan.hedge_stake % Decimal::TEN).is_zero());
    }
}

// ── Final confidence in [0, 0.95] for both profiles ─────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn confidence_within_ceiling(history in arb_history(60), units in 1i64..50) {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        for profile in [EngineProfile::Basic, EngineProfile::Advanced] {
            let engine = PredictionEngine::new(EngineConfig::for_profile(profile)).unwrap();
            let result = engine.predict_at(&history, Decimal::from(units * 10), now).unwrap();

            prop_assert!(result.confidence >= 0.0);
            prop_assert!(result.confidence <= 0.95);
            prop_assert!(result.confidence_percent <= 95);
            for vote in &result.votes {
                prop_assert!((0.0..=1.0).contains(&vote.result.confidence));
            }
        }
    }
}
