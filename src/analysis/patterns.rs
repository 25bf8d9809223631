//! Pattern miner: repeating n-grams and periodic cycles.
//!
//! Both techniques look only at the most recent `PATTERN_WINDOW` records.
//! The miner proposes hypotheses; strategies decide what to do with them.

use serde::{Deserialize, Serialize};

use crate::types::OutcomeCategory;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of newest records the miner inspects.
pub const PATTERN_WINDOW: usize = 15;

pub const MIN_GRAM: usize = 2;
pub const MAX_GRAM: usize = 4;

/// A gram must be seen at least this often to be kept.
pub const MIN_GRAM_OCCURRENCES: usize = 2;

pub const MIN_CYCLE: usize = 3;
pub const MAX_CYCLE: usize = 8;

/// Cycles must score strictly above this to be kept.
pub const CYCLE_CONFIDENCE_FLOOR: f64 = 0.6;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A repeating subsequence and the category that most often follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NGramPattern {
    pub gram: Vec<OutcomeCategory>,
    pub next: OutcomeCategory,
    /// Share of occurrences followed by `next`.
    pub strength: f64,
    pub occurrences: usize,
}

/// A hypothesised periodic repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub length: usize,
    pub pattern: Vec<OutcomeCategory>,
    /// Matching segments over compared segments.
    pub confidence: f64,
    pub next: OutcomeCategory,
}

/// Combined miner output, each list ranked strongest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub ngrams: Vec<NGramPattern>,
    pub cycles: Vec<Cycle>,
}

impl PatternReport {
    pub fn strongest_ngram(&self) -> Option<&NGramPattern> {
        self.ngrams.first()
    }

    pub fn strongest_cycle(&self) -> Option<&Cycle> {
        self.cycles.first()
    }
}

/// Run both techniques over the recent window of `categories`.
pub fn mine(categories: &[OutcomeCategory]) -> PatternReport {
    let window = &categories[..categories.len().min(PATTERN_WINDOW)];
    PatternReport {
        ngrams: mine_ngrams(window),
        cycles: detect_cycles(window),
    }
}

// ---------------------------------------------------------------------------
// N-grams
// ---------------------------------------------------------------------------

#[derive(Default)]
struct GramTally {
    occurrences: usize,
    followers: [usize; 3],
}

/// Grams of length `n` seen at least twice, in first-seen order.
pub fn find_ngrams(categories: &[OutcomeCategory], n: usize) -> Vec<NGramPattern> {
    if n == 0 || categories.len() <= n {
        return Vec::new();
    }

    // Linear lookup keeps first-seen order; windows are tiny.
    let mut tallies: Vec<(&[OutcomeCategory], GramTally)> = Vec::new();
    for start in 0..categories.len() - n {
        let gram = &categories[start..start + n];
        let follower = categories[start + n];
        let idx = match tallies.iter().position(|(g, _)| *g == gram) {
            Some(idx) => idx,
            None => {
                tallies.push((gram, GramTally::default()));
                tallies.len() - 1
            }
        };
        let tally = &mut tallies[idx].1;
        tally.occurrences += 1;
        tally.followers[follower.code() as usize] += 1;
    }

    tallies
        .into_iter()
        .filter(|(_, t)| t.occurrences >= MIN_GRAM_OCCURRENCES)
        .map(|(gram, t)| {
            let next = most_frequent_follower(&t.followers);
            NGramPattern {
                gram: gram.to_vec(),
                next,
                strength: t.followers[next.code() as usize] as f64 / t.occurrences as f64,
                occurrences: t.occurrences,
            }
        })
        .collect()
}

/// Argmax over follower counts; ties go to the higher code.
fn most_frequent_follower(followers: &[usize; 3]) -> OutcomeCategory {
    let mut best = OutcomeCategory::Neutral;
    for category in [OutcomeCategory::CategoryA, OutcomeCategory::CategoryB] {
        if followers[category.code() as usize] >= followers[best.code() as usize] {
            best = category;
        }
    }
    best
}

/// All grams of length 2..=4, ranked by strength. Equal strengths keep
/// shorter grams and earlier first sightings ahead.
pub fn mine_ngrams(categories: &[OutcomeCategory]) -> Vec<NGramPattern> {
    let mut patterns: Vec<NGramPattern> = (MIN_GRAM..=MAX_GRAM)
        .flat_map(|n| find_ngrams(categories, n))
        .collect();
    patterns.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    patterns
}

// ---------------------------------------------------------------------------
// Cycles
// ---------------------------------------------------------------------------

/// Score a single candidate period.
///
/// The first `length` records form the reference; subsequent
/// non-overlapping segments are compared to it, stopping before the final
/// segment. The predicted follower is the record `length` places from the
/// far end of the window.
pub fn find_cycle(categories: &[OutcomeCategory], length: usize) -> Cycle {
    let len = categories.len();
    let pattern = categories[..len.min(length)].to_vec();

    let mut matches = 0usize;
    let mut checks = 0usize;
    if length > 0 && len > length {
        let mut start = length;
        while start < len - length {
            checks += 1;
            if categories[start..start + length] == pattern[..] {
                matches += 1;
            }
            start += length;
        }
    }

    let confidence = if checks > 0 {
        matches as f64 / checks as f64
    } else {
        0.0
    };
    let next = if length > 0 && len >= length {
        categories[len - length]
    } else {
        OutcomeCategory::CategoryA
    };

    Cycle {
        length,
        pattern,
        confidence,
        next,
    }
}

/// Candidate periods 3..=8 scoring above the floor, strongest first.
pub fn detect_cycles(categories: &[OutcomeCategory]) -> Vec<Cycle> {
    let mut cycles: Vec<Cycle> = (MIN_CYCLE..=MAX_CYCLE)
        .map(|length| find_cycle(categories, length))
        .filter(|c| c.confidence > CYCLE_CONFIDENCE_FLOOR)
        .collect();
    cycles.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    cycles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
