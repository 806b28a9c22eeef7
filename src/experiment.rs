//! The standard thirteen-category comparison and its driver.
//!
//! [`standard_categories`] enumerates every combination the comparison
//! covers: one static baseline, then the four policies crossed with raw
//! population estimates (`c2*`), imputed population estimates (`c3*`), and
//! imputed per-group estimates (`c4*`). [`Experiment`] runs them all against
//! one shared ground truth and one shared initial snapshot, each category on
//! its own derived RNG stream, and returns one [`CategoryResult`] per
//! category in declaration order.

use crate::sim::{run_category_with_partition, validate_inputs};
use crate::{
    CategoryConfig, CategoryResult, ConfigError, EstimateSource, GroupPartition, InterestMatrix,
    Scope, SelectionPolicy, SimConfig, StepRecord, TrueInterests,
};

/// The four policies in suffix order `a..d`.
fn policy_suite(epsilon: f64) -> [(char, SelectionPolicy); 4] {
    [
        ('a', SelectionPolicy::TopK),
        ('b', SelectionPolicy::EpsilonGreedy { epsilon }),
        ('c', SelectionPolicy::DecayingEpsilonGreedy),
        ('d', SelectionPolicy::UpperPopularityBound),
    ]
}

/// The standard category set.
///
/// `unknown_interests_ratio` doubles as the fixed ε of the `*b` categories, so
/// a sparser initial snapshot buys proportionally more exploration.
///
/// - `c1`: static top-K baseline on the raw snapshot; no disclosure ever.
/// - `c2a`–`c2d`: adaptive, raw population estimates.
/// - `c3a`–`c3d`: adaptive, imputed population estimates.
/// - `c4a`–`c4d`: adaptive, imputed per-group estimates.
pub fn standard_categories(unknown_interests_ratio: f64) -> Vec<CategoryConfig> {
    let mut categories = Vec::with_capacity(13);
    categories.push(CategoryConfig {
        name: "c1".to_string(),
        policy: SelectionPolicy::TopK,
        source: EstimateSource::Raw,
        scope: Scope::Population,
        adaptive: false,
    });
    let families = [
        ("c2", EstimateSource::Raw, Scope::Population),
        ("c3", EstimateSource::Imputed, Scope::Population),
        ("c4", EstimateSource::Imputed, Scope::PerGroup),
    ];
    for (prefix, source, scope) in families {
        for (suffix, policy) in policy_suite(unknown_interests_ratio) {
            categories.push(CategoryConfig {
                name: format!("{prefix}{suffix}"),
                policy,
                source,
                scope,
                adaptive: true,
            });
        }
    }
    categories
}

/// A fully validated experiment: configuration, ground truth, and the initial
/// observed snapshot shared by every category.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: SimConfig,
    partition: GroupPartition,
    truth: TrueInterests,
    initial: InterestMatrix,
}

impl Experiment {
    /// Build an experiment, checking every scalar and shape constraint up
    /// front so the run itself cannot fail.
    pub fn new(
        config: SimConfig,
        truth: TrueInterests,
        initial: InterestMatrix,
    ) -> Result<Self, ConfigError> {
        validate_inputs(&config, &truth, &initial)?;
        let partition = config.partition()?;
        Ok(Self {
            config,
            partition,
            truth,
            initial,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The ground-truth interests.
    pub fn truth(&self) -> &TrueInterests {
        &self.truth
    }

    /// The shared initial snapshot.
    pub fn initial(&self) -> &InterestMatrix {
        &self.initial
    }

    /// Run the standard thirteen categories.
    pub fn run(&self) -> Vec<CategoryResult> {
        self.run_with_observer(|_| {})
    }

    /// Run the standard thirteen categories, invoking `observer` once per
    /// (category, group-instance, step).
    pub fn run_with_observer<F>(&self, mut observer: F) -> Vec<CategoryResult>
    where
        F: FnMut(StepRecord<'_>),
    {
        standard_categories(self.config.unknown_interests_ratio)
            .iter()
            .map(|category| self.run_one(category, &mut observer))
            .collect()
    }

    /// Run a single, possibly non-standard, category against this
    /// experiment's shared inputs.
    pub fn run_category<F>(&self, category: &CategoryConfig, observer: &mut F) -> CategoryResult
    where
        F: FnMut(StepRecord<'_>),
    {
        self.run_one(category, observer)
    }

    fn run_one<F>(&self, category: &CategoryConfig, observer: &mut F) -> CategoryResult
    where
        F: FnMut(StepRecord<'_>),
    {
        run_category_with_partition(
            &self.config,
            category,
            &self.truth,
            &self.initial,
            self.partition,
            observer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_has_thirteen_categories_in_order() {
        let cats = standard_categories(0.1);
        let names: Vec<&str> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "c1", "c2a", "c2b", "c2c", "c2d", "c3a", "c3b", "c3c", "c3d", "c4a", "c4b",
                "c4c", "c4d",
            ]
        );
        assert!(cats.iter().skip(1).all(|c| c.adaptive));
        assert!(!cats[0].adaptive);
    }

    #[test]
    fn fixed_epsilon_tracks_the_unknown_ratio() {
        let cats = standard_categories(0.25);
        let c2b = cats.iter().find(|c| c.name == "c2b").unwrap();
        assert_eq!(
            c2b.policy,
            SelectionPolicy::EpsilonGreedy { epsilon: 0.25 }
        );
    }

    #[test]
    fn grouped_family_is_imputed_and_per_group() {
        for c in standard_categories(0.1) {
            if c.name.starts_with("c4") {
                assert_eq!(c.source, EstimateSource::Imputed);
                assert_eq!(c.scope, Scope::PerGroup);
            }
        }
    }

    #[test]
    fn new_rejects_bad_shapes() {
        let truth =
            TrueInterests::from_vec(2, 2, vec![true, false, false, true]).unwrap();
        let initial = InterestMatrix::unknown(2, 2);
        let config = SimConfig {
            consumers: 4,
            services: 2,
            groups: 2,
            network_capacity: 1,
            duration: 1,
            unknown_interests_ratio: 0.0,
            seed: 0,
        };
        assert!(matches!(
            Experiment::new(config, truth, initial),
            Err(ConfigError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn run_is_deterministic_for_a_fixed_seed() {
        let truth = TrueInterests::from_vec(
            4,
            4,
            vec![
                true, false, false, false, //
                true, true, false, false, //
                false, false, true, true, //
                false, false, false, true,
            ],
        )
        .unwrap();
        let initial = InterestMatrix::fully_known(&truth);
        let config = SimConfig {
            consumers: 4,
            services: 4,
            groups: 2,
            network_capacity: 2,
            duration: 4,
            unknown_interests_ratio: 0.5,
            seed: 77,
        };
        let a = Experiment::new(config, truth.clone(), initial.clone())
            .unwrap()
            .run();
        let b = Experiment::new(config, truth, initial).unwrap().run();
        assert_eq!(a, b);
    }
}
