//! Sequence statistics over a newest-first category history.
//!
//! Every function here is total: short or empty inputs degrade to neutral
//! values instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::types::{OutcomeCategory, PredictedCategory, Trend, MAX_SECONDARY_VALUE};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// One active category must outnumber the other by more than this ratio
/// before a trend is reported.
pub const TREND_RATIO: f64 = 1.3;

/// Size of each of the two momentum comparison windows.
pub const MOMENTUM_WINDOW: usize = 5;

/// Length of the hot and cold secondary-value rankings.
pub const RANKING_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Occurrences of each category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub neutral: usize,
    pub category_a: usize,
    pub category_b: usize,
}

impl CategoryCounts {
    pub fn count(categories: &[OutcomeCategory]) -> Self {
        let mut counts = Self::default();
        for category in categories {
            match category {
                OutcomeCategory::Neutral => counts.neutral += 1,
                OutcomeCategory::CategoryA => counts.category_a += 1,
                OutcomeCategory::CategoryB => counts.category_b += 1,
            }
        }
        counts
    }

    pub fn get(&self, category: OutcomeCategory) -> usize {
        match category {
            OutcomeCategory::Neutral => self.neutral,
            OutcomeCategory::CategoryA => self.category_a,
            OutcomeCategory::CategoryB => self.category_b,
        }
    }

    pub fn total(&self) -> usize {
        self.neutral + self.category_a + self.category_b
    }

    /// The less frequent active category; a tie goes to B.
    pub fn underdog(&self) -> PredictedCategory {
        if self.category_a < self.category_b {
            PredictedCategory::CategoryA
        } else {
            PredictedCategory::CategoryB
        }
    }

    /// The more frequent active category; a tie goes to B.
    pub fn dominant(&self) -> PredictedCategory {
        if self.category_a > self.category_b {
            PredictedCategory::CategoryA
        } else {
            PredictedCategory::CategoryB
        }
    }
}

/// `round(count / total * 100)`, 0 for an empty window.
pub fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Dispersion
// ---------------------------------------------------------------------------

/// Population variance of the category codes (0, 1, 2).
///
/// The codes are nominal, so this is a dispersion proxy over category
/// identity rather than a measurement of any cardinal quantity.
pub fn variance(categories: &[OutcomeCategory]) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }
    let n = categories.len() as f64;
    let mean = categories.iter().map(|c| f64::from(c.code())).sum::<f64>() / n;
    categories
        .iter()
        .map(|c| (f64::from(c.code()) - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Shannon entropy of the empirical category distribution, in bits.
/// Ranges from 0 (single category) to log2(3).
pub fn entropy(categories: &[OutcomeCategory]) -> f64 {
    if categories.is_empty() {
        return 0.0;
    }
    let counts = CategoryCounts::count(categories);
    let n = categories.len() as f64;
    OutcomeCategory::ALL
        .iter()
        .map(|c| counts.get(*c))
        .filter(|&count| count > 0)
        .map(|count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Fraction of adjacent positions whose categories differ.
pub fn volatility(categories: &[OutcomeCategory]) -> f64 {
    if categories.len() < 2 {
        return 0.0;
    }
    let changes = categories.windows(2).filter(|w| w[0] != w[1]).count();
    changes as f64 / (categories.len() - 1) as f64
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which active category, if any, dominates the window.
pub fn trend(categories: &[OutcomeCategory]) -> Trend {
    let counts = CategoryCounts::count(categories);
    let a = counts.category_a as f64;
    let b = counts.category_b as f64;
    if a > b * TREND_RATIO {
        Trend::Favors(PredictedCategory::CategoryA)
    } else if b > a * TREND_RATIO {
        Trend::Favors(PredictedCategory::CategoryB)
    } else {
        Trend::Neutral
    }
}

/// Share of A in the latest five records minus its share in the five
/// before them. Positive favours A. Zero when either window is empty.
pub fn momentum(categories: &[OutcomeCategory]) -> f64 {
    let recent = &categories[..categories.len().min(MOMENTUM_WINDOW)];
    let older_end = categories.len().min(MOMENTUM_WINDOW * 2);
    let older = &categories[recent.len()..older_end];
    if recent.is_empty() || older.is_empty() {
        return 0.0;
    }
    share_of_a(recent) - share_of_a(older)
}

fn share_of_a(window: &[OutcomeCategory]) -> f64 {
    let a = window
        .iter()
        .filter(|c| **c == OutcomeCategory::CategoryA)
        .count();
    a as f64 / window.len() as f64
}

// ---------------------------------------------------------------------------
// Streaks
// ---------------------------------------------------------------------------

/// A maximal run of identical categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub category: OutcomeCategory,
    pub length: usize,
    /// Index of the newest record of the run.
    pub position: usize,
}

/// The run starting at the newest record. `None` only for an empty history.
pub fn current_streak(categories: &[OutcomeCategory]) -> Option<Streak> {
    let first = *categories.first()?;
    let length = categories.iter().take_while(|c| **c == first).count();
    Some(Streak {
        category: first,
        length,
        position: 0,
    })
}

/// All maximal runs of length two or more, newest first.
pub fn historical_streaks(categories: &[OutcomeCategory]) -> Vec<Streak> {
    let mut streaks = Vec::new();
    let mut start = 0;
    while start < categories.len() {
        let category = categories[start];
        let length = categories[start..]
            .iter()
            .take_while(|c| **c == category)
            .count();
        if length >= 2 {
            streaks.push(Streak {
                category,
                length,
                position: start,
            });
        }
        start += length;
    }
    streaks
}

// ---------------------------------------------------------------------------
// Secondary values
// ---------------------------------------------------------------------------

/// A secondary value and how often it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFrequency {
    pub value: u8,
    pub frequency: usize,
}

fn value_frequencies(values: &[u8]) -> Vec<ValueFrequency> {
    let mut counts = [0usize; MAX_SECONDARY_VALUE as usize + 1];
    for v in values {
        if let Some(slot) = counts.get_mut(*v as usize) {
            *slot += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .map(|(value, &frequency)| ValueFrequency {
            value: value as u8,
            frequency,
        })
        .collect()
}

/// Most frequently observed values. Ties keep ascending value order.
pub fn hot_values(values: &[u8]) -> Vec<ValueFrequency> {
    let mut observed: Vec<_> = value_frequencies(values)
        .into_iter()
        .filter(|v| v.frequency > 0)
        .collect();
    observed.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    observed.truncate(RANKING_LIMIT);
    observed
}

/// Least frequent values across the whole legal range, so unseen values
/// rank first with frequency 0.
pub fn cold_values(values: &[u8]) -> Vec<ValueFrequency> {
    let mut all = value_frequencies(values);
    all.sort_by(|a, b| a.frequency.cmp(&b.frequency));
    all.truncate(RANKING_LIMIT);
    all
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
