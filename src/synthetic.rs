//! Synthetic population generator.
//!
//! Produces a clustered ground truth plus a partially masked initial
//! snapshot. Consumers are split into equal contiguous groups and the
//! service catalog into equal contiguous blocks, one block per group. Each
//! consumer's liked services are drawn from a normal distribution centered
//! on their group's block, so groups have distinct but overlapping tastes
//! and a larger spread blurs the group structure.
//!
//! Two patches keep the population non-degenerate: every consumer truly
//! likes at least one service, and every consumer's initial snapshot knows
//! at least one liked service. Without the second patch a consumer would
//! contribute nothing to any popularity estimate until a disclosure happens
//! to reach them.

use crate::{ConfigError, Interest, InterestMatrix, TrueInterests};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Parameters for [`generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PopulationSpec {
    /// Total consumer population; must split evenly into `groups`.
    pub consumers: usize,
    /// Service catalog size; must split evenly into `groups` blocks.
    pub services: usize,
    /// Number of interest groups.
    pub groups: usize,
    /// Standard deviation of the per-group interest distribution, in service
    /// index units. Larger values spread a group's likes further outside its
    /// own block.
    pub interest_std: f64,
    /// Probability that a cell is masked in the initial snapshot, in `[0, 1)`.
    pub unknown_ratio: f64,
    /// Generator seed; independent of any simulation stream.
    pub seed: u64,
}

impl Default for PopulationSpec {
    /// The reference scenario: 100 consumers, 20 services, 2 groups, spread
    /// of one tenth of the catalog, 10% masked.
    fn default() -> Self {
        Self {
            consumers: 100,
            services: 20,
            groups: 2,
            interest_std: 2.0,
            unknown_ratio: 0.1,
            seed: 0,
        }
    }
}

impl PopulationSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.consumers == 0 || self.services == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.groups == 0 || self.consumers % self.groups != 0 {
            return Err(ConfigError::UnevenGroups {
                consumers: self.consumers,
                groups: self.groups,
            });
        }
        if self.services % self.groups != 0 {
            return Err(ConfigError::UnevenServiceBlocks {
                services: self.services,
                groups: self.groups,
            });
        }
        if !self.interest_std.is_finite() || self.interest_std < 0.0 {
            return Err(ConfigError::BadInterestStd {
                std: self.interest_std,
            });
        }
        if !(0.0..1.0).contains(&self.unknown_ratio) {
            return Err(ConfigError::RatioOutOfRange {
                ratio: self.unknown_ratio,
            });
        }
        Ok(())
    }
}

/// Generate a ground truth and its masked initial snapshot.
pub fn generate(spec: &PopulationSpec) -> Result<(TrueInterests, InterestMatrix), ConfigError> {
    spec.validate()?;
    let normal = Normal::new(0.0, spec.interest_std)
        .map_err(|_| ConfigError::BadInterestStd {
            std: spec.interest_std,
        })?;
    let mut rng = StdRng::seed_from_u64(spec.seed);

    let group_consumers = spec.consumers / spec.groups;
    let block = spec.services / spec.groups;
    let mut cells = vec![false; spec.consumers * spec.services];

    for g in 0..spec.groups {
        let first_service = g * block;
        let center = (first_service + first_service + block) as f64 / 2.0;
        for consumer in g * group_consumers..(g + 1) * group_consumers {
            // One draw per block slot; draws falling outside the catalog are
            // discarded, so a consumer may end up liking fewer services.
            for _ in 0..block {
                let index = (center + normal.sample(&mut rng)).floor();
                if index >= 0.0 && index < spec.services as f64 {
                    cells[consumer * spec.services + index as usize] = true;
                }
            }
        }
    }

    // Every consumer must truly like at least one service; fall back to a
    // uniform pick inside the consumer's own block.
    for consumer in 0..spec.consumers {
        let row = &mut cells[consumer * spec.services..(consumer + 1) * spec.services];
        if row.iter().all(|&liked| !liked) {
            let g = consumer / group_consumers;
            let service = rng.random_range(g * block..(g + 1) * block);
            row[service] = true;
        }
    }

    let truth = TrueInterests::from_vec(spec.consumers, spec.services, cells)?;

    let mut initial = InterestMatrix::fully_known(&truth);
    for consumer in 0..spec.consumers {
        for service in 0..spec.services {
            if rng.random::<f64>() < spec.unknown_ratio {
                initial.set(consumer, service, Interest::Unknown);
            }
        }
    }

    // Every consumer must start with at least one known like: un-mask the
    // first truly liked cell of any row whose known likes were all hidden.
    for consumer in 0..spec.consumers {
        let has_known_like = initial.row(consumer).iter().any(|c| c.is_liked());
        if !has_known_like {
            for service in 0..spec.services {
                if truth.get(consumer, service) {
                    initial.set(consumer, service, Interest::Known(true));
                    break;
                }
            }
        }
    }

    Ok((truth, initial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_specs() {
        let ok = PopulationSpec::default();
        assert!(generate(&ok).is_ok());

        let mut s = ok;
        s.groups = 3;
        assert!(matches!(
            generate(&s),
            Err(ConfigError::UnevenGroups { .. })
        ));

        let mut s = ok;
        s.services = 21;
        assert!(matches!(
            generate(&s),
            Err(ConfigError::UnevenServiceBlocks { .. })
        ));

        let mut s = ok;
        s.interest_std = -1.0;
        assert!(matches!(
            generate(&s),
            Err(ConfigError::BadInterestStd { .. })
        ));

        let mut s = ok;
        s.unknown_ratio = 1.0;
        assert!(matches!(
            generate(&s),
            Err(ConfigError::RatioOutOfRange { .. })
        ));
    }

    #[test]
    fn every_consumer_likes_something() {
        let (truth, _) = generate(&PopulationSpec::default()).unwrap();
        for consumer in 0..truth.consumers() {
            assert!(
                truth.row(consumer).iter().any(|&liked| liked),
                "consumer {consumer} likes nothing"
            );
        }
    }

    #[test]
    fn every_consumer_starts_with_a_known_like() {
        let spec = PopulationSpec {
            unknown_ratio: 0.8,
            ..PopulationSpec::default()
        };
        let (_, initial) = generate(&spec).unwrap();
        for consumer in 0..initial.consumers() {
            assert!(
                initial.row(consumer).iter().any(|c| c.is_liked()),
                "consumer {consumer} starts blind"
            );
        }
    }

    #[test]
    fn snapshot_never_contradicts_the_truth() {
        let (truth, initial) = generate(&PopulationSpec::default()).unwrap();
        for consumer in 0..truth.consumers() {
            for service in 0..truth.services() {
                if let Interest::Known(v) = initial.get(consumer, service) {
                    assert_eq!(v, truth.get(consumer, service));
                }
            }
        }
    }

    #[test]
    fn zero_ratio_masks_nothing() {
        let spec = PopulationSpec {
            unknown_ratio: 0.0,
            ..PopulationSpec::default()
        };
        let (truth, initial) = generate(&spec).unwrap();
        assert_eq!(initial, InterestMatrix::fully_known(&truth));
    }

    #[test]
    fn tight_spread_keeps_likes_inside_the_group_block() {
        let spec = PopulationSpec {
            interest_std: 0.0,
            ..PopulationSpec::default()
        };
        let (truth, _) = generate(&spec).unwrap();
        // With zero spread every draw floors to the block center.
        let block = spec.services / spec.groups;
        let group_consumers = spec.consumers / spec.groups;
        for consumer in 0..spec.consumers {
            let g = consumer / group_consumers;
            for (service, &liked) in truth.row(consumer).iter().enumerate() {
                if liked {
                    assert!(service >= g * block && service < (g + 1) * block);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_population() {
        let spec = PopulationSpec::default();
        assert_eq!(generate(&spec).unwrap(), generate(&spec).unwrap());
    }
}
