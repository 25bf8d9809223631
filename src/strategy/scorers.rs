//! The seven scoring strategies.
//!
//! All of them fall back to a neutral default rather than failing when
//! their window is shorter than they would like.

use chrono::Duration;

use super::StrategyContext;
use crate::analysis::sequence::{self, CategoryCounts};
use crate::types::{OutcomeCategory, PredictedCategory, StrategyResult};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Cap shared by the bounded scorers.
pub const MAX_SCORER_CONFIDENCE: f64 = 0.8;

/// Streaks at least this long are bet against.
pub const REVERSAL_STREAK: usize = 3;

/// Records inspected by the alternation scorer.
pub const MARTINGALE_WINDOW: usize = 5;

/// Wall-clock span of the time-window scorer.
pub const TIME_WINDOW_MINUTES: i64 = 30;

/// Records inspected by the variance scorer.
pub const VARIANCE_WINDOW: usize = 15;
pub const LOW_VARIANCE: f64 = 0.5;
pub const HIGH_VARIANCE: f64 = 1.2;

/// Records inspected by the momentum scorer.
pub const MOMENTUM_SCORER_WINDOW: usize = 10;
pub const STRONG_MOMENTUM: f64 = 0.3;

// ---------------------------------------------------------------------------
// Scorers
// ---------------------------------------------------------------------------

/// Bet against long runs, ride fresh ones.
pub fn streak(ctx: &StrategyContext<'_>) -> StrategyResult {
    match ctx.snapshot.current_streak {
        Some(s) if s.length >= REVERSAL_STREAK => StrategyResult::new(
            PredictedCategory::reversal_of(Some(s.category)),
            (0.5 + 0.1 * s.length as f64).min(MAX_SCORER_CONFIDENCE),
            format!(
                "Streak of {} {} suggests a reversal",
                s.length,
                ctx.label(s.category)
            ),
        ),
        Some(s) if s.length == 1 => StrategyResult::new(
            PredictedCategory::continuation_of(s.category),
            0.6,
            format!("Single {} may continue", ctx.label(s.category)),
        ),
        Some(s) => StrategyResult::new(
            PredictedCategory::CategoryA,
            0.5,
            format!("Streak of {} {} is inconclusive", s.length, ctx.label(s.category)),
        ),
        None => StrategyResult::new(PredictedCategory::CategoryA, 0.5, "No streak"),
    }
}

/// Bet on the less frequent active category over the whole history.
pub fn frequency(ctx: &StrategyContext<'_>) -> StrategyResult {
    let counts = CategoryCounts::count(&ctx.categories);
    let total = counts.total();
    let gap = if total == 0 {
        0.0
    } else {
        counts.category_a.abs_diff(counts.category_b) as f64 / total as f64
    };
    StrategyResult::new(
        counts.underdog(),
        (0.4 + gap).min(MAX_SCORER_CONFIDENCE),
        format!(
            "Frequency: {} {}, {} {}; backing the less frequent",
            ctx.label(OutcomeCategory::CategoryA),
            counts.category_a,
            ctx.label(OutcomeCategory::CategoryB),
            counts.category_b,
        ),
    )
}

/// Follow the strongest n-gram, unless a periodic cycle is more convincing.
pub fn pattern(ctx: &StrategyContext<'_>) -> StrategyResult {
    let mut predicted = PredictedCategory::CategoryA;
    let mut confidence: f64 = 0.5;

    if let Some(gram) = ctx.patterns.strongest_ngram() {
        predicted = PredictedCategory::continuation_of(gram.next);
        confidence = 0.5 + gram.strength * 0.3;
    }

    if let Some(cycle) = ctx.patterns.strongest_cycle() {
        if cycle.confidence > confidence {
            predicted = PredictedCategory::continuation_of(cycle.next);
            confidence = cycle.confidence;
        }
    }

    StrategyResult::new(
        predicted,
        confidence.min(MAX_SCORER_CONFIDENCE),
        format!(
            "Patterns: {} n-grams, {} cycles detected",
            ctx.patterns.ngrams.len(),
            ctx.patterns.cycles.len()
        ),
    )
}

/// Expect alternation to continue: bet against the latest outcome.
pub fn martingale(ctx: &StrategyContext<'_>) -> StrategyResult {
    let recent = ctx.recent(MARTINGALE_WINDOW);
    let alternations = recent
        .windows(2)
        .filter(|w| {
            w[0] != w[1] && w[0] != OutcomeCategory::Neutral && w[1] != OutcomeCategory::Neutral
        })
        .count();
    let last = ctx.last();

    StrategyResult::new(
        PredictedCategory::reversal_of(last),
        0.4 + 0.3 * (alternations as f64 / MARTINGALE_WINDOW as f64),
        format!(
            "Alternation: last outcome {}, {} alternations in the last {}",
            last.map_or("none", |c| ctx.label(c)),
            alternations,
            recent.len(),
        ),
    )
}

/// Bet on the less frequent active category within the last half hour.
pub fn time_window(ctx: &StrategyContext<'_>) -> StrategyResult {
    let horizon = Duration::minutes(TIME_WINDOW_MINUTES);
    let recent: Vec<OutcomeCategory> = ctx
        .history
        .iter()
        .filter(|r| ctx.now - r.occurred_at() <= horizon)
        .map(|r| r.category())
        .collect();
    let counts = CategoryCounts::count(&recent);

    StrategyResult::new(
        counts.underdog(),
        0.5,
        format!(
            "Last {TIME_WINDOW_MINUTES} min: {} {}, {} {}",
            ctx.label(OutcomeCategory::CategoryA),
            counts.category_a,
            ctx.label(OutcomeCategory::CategoryB),
            counts.category_b,
        ),
    )
}

/// Low dispersion: follow the dominant category. High dispersion: reverse.
pub fn variance(ctx: &StrategyContext<'_>) -> StrategyResult {
    let recent = ctx.recent(VARIANCE_WINDOW);
    let variance = sequence::variance(recent);

    let (predicted, confidence, regime) = if variance < LOW_VARIANCE {
        (CategoryCounts::count(recent).dominant(), 0.7, "low dispersion")
    } else if variance > HIGH_VARIANCE {
        (PredictedCategory::reversal_of(ctx.last()), 0.6, "high dispersion")
    } else {
        (PredictedCategory::CategoryA, 0.5, "moderate dispersion")
    };

    StrategyResult::new(
        predicted,
        confidence,
        format!("Variance {variance:.2}: {regime}"),
    )
}

/// Ride strong momentum; otherwise expect a reversal.
pub fn momentum(ctx: &StrategyContext<'_>) -> StrategyResult {
    let momentum = sequence::momentum(ctx.recent(MOMENTUM_SCORER_WINDOW));

    if momentum.abs() > STRONG_MOMENTUM {
        let predicted = if momentum > 0.0 {
            PredictedCategory::CategoryA
        } else {
            PredictedCategory::CategoryB
        };
        StrategyResult::new(
            predicted,
            (0.6 + momentum.abs() * 0.2).min(MAX_SCORER_CONFIDENCE),
            format!("Momentum {momentum:.2}: strong trend"),
        )
    } else {
        StrategyResult::new(
            PredictedCategory::reversal_of(ctx.last()),
            0.55,
            format!("Momentum {momentum:.2}: possible reversal"),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
