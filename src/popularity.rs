//! Popularity estimation and stable ranking.
//!
//! The estimator aggregates observed likes per service out of an interest
//! matrix (raw or imputed). `Unknown` cells are excluded from the counts, not
//! treated as dislikes. All functions here are pure.

use crate::{InterestMatrix, TrueInterests};

/// Per-service count of `Known(true)` cells.
pub fn popularity_counts(m: &InterestMatrix) -> Vec<u32> {
    let mut counts = vec![0u32; m.services()];
    for consumer in 0..m.consumers() {
        for (service, cell) in m.row(consumer).iter().enumerate() {
            if cell.is_liked() {
                counts[service] += 1;
            }
        }
    }
    counts
}

/// Per-service count of `Unknown` cells.
///
/// Feeds the optimistic upper-bound policy: every unseen viewer is assumed to
/// like the service.
pub fn unknown_counts(m: &InterestMatrix) -> Vec<u32> {
    let mut counts = vec![0u32; m.services()];
    for consumer in 0..m.consumers() {
        for (service, cell) in m.row(consumer).iter().enumerate() {
            if !cell.is_known() {
                counts[service] += 1;
            }
        }
    }
    counts
}

/// Fraction of cells carrying an observation; 0.0 for an empty matrix.
pub fn availability_ratio(m: &InterestMatrix) -> f64 {
    if m.total_cells() == 0 {
        return 0.0;
    }
    m.known_cells() as f64 / m.total_cells() as f64
}

/// Service indices ordered by descending score, ties broken by ascending index.
///
/// Scores are integer counts, so ties are exact and the ordering is fully
/// deterministic. Every selection path in this crate ranks through here.
pub fn rank_descending(scores: &[u32]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]).then(a.cmp(&b)));
    ranked
}

/// Per-service count of true likes in the ground truth.
pub fn true_popularity_counts(truth: &TrueInterests) -> Vec<u32> {
    let mut counts = vec![0u32; truth.services()];
    for consumer in 0..truth.consumers() {
        for (service, &liked) in truth.row(consumer).iter().enumerate() {
            if liked {
                counts[service] += 1;
            }
        }
    }
    counts
}

/// The should-distribute benchmark: the `capacity` services with the highest
/// true like-count, ties broken by ascending service index.
///
/// Computed once per (category, group) from the ground truth and shared
/// read-only across every step.
pub fn oracle_set(truth: &TrueInterests, capacity: usize) -> Vec<usize> {
    let counts = true_popularity_counts(truth);
    let mut top = rank_descending(&counts);
    top.truncate(capacity);
    top
}
