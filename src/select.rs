//! Selection policies: which services to push this step.
//!
//! Four interchangeable strategies behind one enum, all sharing the stable
//! ranking rule from [`crate::popularity::rank_descending`] (descending score,
//! ties by ascending service index) and all returning exactly `capacity`
//! distinct services.
//!
//! The ε-greedy family splits the budget: the top `floor(K·(1−ε))` ranked
//! services are exploited, and the remaining slots are sampled uniformly
//! **without replacement** from the services ranked below the cutoff. (The
//! with-replacement draw this design descends from could silently shrink the
//! distributed set; sampling without replacement keeps the fixed-cardinality
//! contract.)
//!
//! Policies are fed raw availability counts or imputed counts identically;
//! they are side-effect-free apart from drawing from the caller's RNG.

use crate::popularity::rank_descending;
use rand::rngs::StdRng;

/// A content-selection strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionPolicy {
    /// Always the top `capacity` services by popularity count.
    TopK,
    /// Exploit the top ranks, explore the tail with a fixed ε.
    EpsilonGreedy {
        /// Exploration fraction in `[0, 1]`. Non-finite or out-of-range
        /// values are clamped.
        epsilon: f64,
    },
    /// ε-greedy with `ε = 1 − availability ratio`, recomputed every step, so
    /// exploration shrinks as knowledge accumulates.
    DecayingEpsilonGreedy,
    /// Rank by popularity count plus the still-unknown cell count: the
    /// optimistic assumption that every unseen viewer likes the service.
    UpperPopularityBound,
}

impl SelectionPolicy {
    /// Whether this policy draws from the RNG.
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            SelectionPolicy::EpsilonGreedy { .. } | SelectionPolicy::DecayingEpsilonGreedy
        )
    }
}

/// Per-step inputs shared by all policies.
#[derive(Debug, Clone, Copy)]
pub struct PolicyInputs<'a> {
    /// Per-service popularity counts (raw or imputed).
    pub popularity: &'a [u32],
    /// Per-service `Unknown` cell counts from the same matrix the popularity
    /// counts were taken from.
    pub unknown: &'a [u32],
    /// Availability ratio of the observed layer at this step; drives the
    /// decaying-ε schedule.
    pub availability_ratio: f64,
}

fn clamp_epsilon(epsilon: f64) -> f64 {
    if epsilon.is_finite() {
        epsilon.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Split the ranking into exploit picks and uniform tail samples.
fn epsilon_greedy_pick(
    ranked: &[usize],
    capacity: usize,
    epsilon: f64,
    rng: &mut StdRng,
) -> Vec<usize> {
    let epsilon = clamp_epsilon(epsilon);
    let exploit_len = ((capacity as f64) * (1.0 - epsilon)).floor() as usize;
    let exploit_len = exploit_len.min(capacity);

    let mut chosen: Vec<usize> = ranked[..exploit_len].to_vec();
    let tail = &ranked[exploit_len..];
    let explore_len = (capacity - exploit_len).min(tail.len());
    if explore_len > 0 {
        for pos in rand::seq::index::sample(rng, tail.len(), explore_len) {
            chosen.push(tail[pos]);
        }
    }
    chosen
}

/// Choose exactly `capacity` distinct services.
///
/// The result is in pick order: exploited ranks first (best score first), then
/// any explored samples. Callers treat it as a set.
pub fn select_services(
    policy: SelectionPolicy,
    inputs: PolicyInputs<'_>,
    capacity: usize,
    rng: &mut StdRng,
) -> Vec<usize> {
    let capacity = capacity.min(inputs.popularity.len());
    match policy {
        SelectionPolicy::TopK => {
            let mut ranked = rank_descending(inputs.popularity);
            ranked.truncate(capacity);
            ranked
        }
        SelectionPolicy::UpperPopularityBound => {
            let bounds: Vec<u32> = inputs
                .popularity
                .iter()
                .zip(inputs.unknown)
                .map(|(&p, &u)| p + u)
                .collect();
            let mut ranked = rank_descending(&bounds);
            ranked.truncate(capacity);
            ranked
        }
        SelectionPolicy::EpsilonGreedy { epsilon } => {
            let ranked = rank_descending(inputs.popularity);
            epsilon_greedy_pick(&ranked, capacity, epsilon, rng)
        }
        SelectionPolicy::DecayingEpsilonGreedy => {
            let ranked = rank_descending(inputs.popularity);
            let epsilon = 1.0 - inputs.availability_ratio;
            epsilon_greedy_pick(&ranked, capacity, epsilon, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn inputs<'a>(popularity: &'a [u32], unknown: &'a [u32], ratio: f64) -> PolicyInputs<'a> {
        PolicyInputs {
            popularity,
            unknown,
            availability_ratio: ratio,
        }
    }

    fn distinct(v: &[usize]) -> bool {
        let mut s = v.to_vec();
        s.sort_unstable();
        s.dedup();
        s.len() == v.len()
    }

    #[test]
    fn top_k_takes_highest_counts_with_index_tiebreak() {
        let mut rng = StdRng::seed_from_u64(0);
        let pop = [2, 1, 1, 2];
        let unk = [0, 0, 0, 0];
        let chosen = select_services(SelectionPolicy::TopK, inputs(&pop, &unk, 1.0), 2, &mut rng);
        assert_eq!(chosen, vec![0, 3]);
    }

    #[test]
    fn upper_bound_prefers_heavily_unknown_services() {
        let mut rng = StdRng::seed_from_u64(0);
        let pop = [3, 0, 2, 0];
        let unk = [0, 4, 0, 1];
        // Bounds: [3, 4, 2, 1] → services 1 then 0.
        let chosen = select_services(
            SelectionPolicy::UpperPopularityBound,
            inputs(&pop, &unk, 1.0),
            2,
            &mut rng,
        );
        assert_eq!(chosen, vec![1, 0]);
    }

    #[test]
    fn epsilon_zero_reduces_to_top_k() {
        let mut rng = StdRng::seed_from_u64(7);
        let pop = [5, 4, 3, 2, 1];
        let unk = [0; 5];
        let chosen = select_services(
            SelectionPolicy::EpsilonGreedy { epsilon: 0.0 },
            inputs(&pop, &unk, 1.0),
            3,
            &mut rng,
        );
        assert_eq!(chosen, vec![0, 1, 2]);
    }

    #[test]
    fn epsilon_one_samples_entirely_from_the_ranking() {
        let pop = [9, 7, 5, 3];
        let unk = [0; 4];
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_services(
                SelectionPolicy::EpsilonGreedy { epsilon: 1.0 },
                inputs(&pop, &unk, 1.0),
                2,
                &mut rng,
            );
            assert_eq!(chosen.len(), 2);
            assert!(distinct(&chosen));
            assert!(chosen.iter().all(|&s| s < 4));
        }
    }

    #[test]
    fn exploration_samples_without_replacement() {
        let pop = [10, 9, 8, 7, 6, 5];
        let unk = [0; 6];
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let chosen = select_services(
                SelectionPolicy::EpsilonGreedy { epsilon: 0.5 },
                inputs(&pop, &unk, 1.0),
                4,
                &mut rng,
            );
            // floor(4 * 0.5) = 2 exploit picks + 2 tail samples, all distinct.
            assert_eq!(chosen.len(), 4);
            assert!(distinct(&chosen));
            assert_eq!(&chosen[..2], &[0, 1]);
            assert!(chosen[2..].iter().all(|&s| s >= 2));
        }
    }

    #[test]
    fn decaying_epsilon_explores_nothing_at_full_knowledge() {
        let mut rng = StdRng::seed_from_u64(3);
        let pop = [4, 3, 2, 1];
        let unk = [0; 4];
        let chosen = select_services(
            SelectionPolicy::DecayingEpsilonGreedy,
            inputs(&pop, &unk, 1.0),
            2,
            &mut rng,
        );
        assert_eq!(chosen, vec![0, 1]);
    }

    #[test]
    fn non_finite_epsilon_is_clamped_to_exploitation() {
        let mut rng = StdRng::seed_from_u64(11);
        let pop = [4, 3, 2, 1];
        let unk = [0; 4];
        let chosen = select_services(
            SelectionPolicy::EpsilonGreedy { epsilon: f64::NAN },
            inputs(&pop, &unk, 1.0),
            2,
            &mut rng,
        );
        assert_eq!(chosen, vec![0, 1]);
    }

    #[test]
    fn same_seed_same_choice() {
        let pop = [1, 2, 3, 4, 5, 6, 7, 8];
        let unk = [0; 8];
        let pick = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            select_services(
                SelectionPolicy::EpsilonGreedy { epsilon: 0.75 },
                inputs(&pop, &unk, 0.25),
                4,
                &mut rng,
            )
        };
        assert_eq!(pick(42), pick(42));
    }
}
