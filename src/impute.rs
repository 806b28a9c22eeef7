//! Similarity-based imputation: a minimal collaborative filter.
//!
//! Every `Unknown` cell is filled by copying the value held by the most
//! similar other consumer. Similarity is the fraction of services on which two
//! consumers hold equal *observed* values; `Unknown` matches nothing,
//! including another `Unknown`. The result is a transient per-step view: it is
//! recomputed fresh from the observed layer every step and never persisted as
//! belief state.
//!
//! Group-scoped imputation needs no separate code path: running [`impute`] on
//! a group's row slice restricts both the similarity computation and the donor
//! pool to that group.

use crate::{Interest, InterestMatrix};

/// Dense consumer × consumer similarity table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimilarityMatrix {
    consumers: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Number of consumers (both dimensions).
    pub fn consumers(&self) -> usize {
        self.consumers
    }

    /// Similarity between consumers `i` and `j`.
    ///
    /// Symmetric; `get(i, i)` is 0.0 by definition (self is excluded from the
    /// donor pool, never scored as a perfect match).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.consumers + j]
    }
}

/// Fraction of services on which two rows hold equal `Known` values.
fn row_agreement(a: &[Interest], b: &[Interest]) -> f64 {
    let services = a.len();
    if services == 0 {
        return 0.0;
    }
    let equal_known = a
        .iter()
        .zip(b)
        .filter(|(x, y)| x.is_known() && x == y)
        .count();
    equal_known as f64 / services as f64
}

/// Compute the pairwise similarity table for an interest matrix.
pub fn jaccard_similarities(m: &InterestMatrix) -> SimilarityMatrix {
    let n = m.consumers();
    let mut values = vec![0.0; n * n];
    for i in 0..n {
        // Symmetric, so fill both triangles from one pass.
        for j in (i + 1)..n {
            let s = row_agreement(m.row(i), m.row(j));
            values[i * n + j] = s;
            values[j * n + i] = s;
        }
    }
    SimilarityMatrix {
        consumers: n,
        values,
    }
}

/// The donor for consumer `i`: the lowest-indexed other consumer with maximal
/// similarity. `None` only when there is no other consumer.
///
/// A maximal similarity of 0.0 (very sparse data) still selects
/// deterministically rather than erroring.
fn best_donor(sims: &SimilarityMatrix, i: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for j in 0..sims.consumers() {
        if j == i {
            continue;
        }
        let s = sims.get(i, j);
        match best {
            Some((_, bs)) if s <= bs => {}
            _ => best = Some((j, s)),
        }
    }
    best.map(|(j, _)| j)
}

/// Fill every `Unknown` cell from the most similar other consumer.
///
/// `Known` cells pass through unchanged; the input is not mutated. When the
/// donor's own cell is `Unknown`, the cell stays `Unknown` — downstream
/// equality metrics then treat it as never matching the ground truth. (The
/// alternative, cascading to the next-most-similar donor, is deliberately not
/// done; see the crate documentation.)
pub fn impute(m: &InterestMatrix) -> InterestMatrix {
    let sims = jaccard_similarities(m);
    let mut out = m.clone();
    for i in 0..m.consumers() {
        if m.row(i).iter().all(|c| c.is_known()) {
            continue;
        }
        let Some(donor) = best_donor(&sims, i) else {
            continue; // single-consumer population: nothing to copy from
        };
        for s in 0..m.services() {
            if !out.get(i, s).is_known() {
                out.set(i, s, m.get(donor, s));
            }
        }
    }
    out
}
