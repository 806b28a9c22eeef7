//! The distribution stepper: estimate → (impute) → select → disclose.
//!
//! One [`SimulationState`] value exists per (category, group) instance — there
//! is no ambient shared workspace. Each call to [`step_once`] consumes the
//! state's current observed layer and mutates it in place, so step `t+1`
//! always sees step `t`'s disclosures. Categories and group instances share
//! only read-only data (the ground truth and the oracle sets) and can safely
//! run in any order.
//!
//! Determinism: every instance owns a seeded `StdRng` derived from the
//! experiment seed, the category name, and the group lane, so runs are
//! reproducible and categories never perturb each other's random streams.

use crate::metrics::aggregate_groups;
use crate::{
    availability_ratio, impute, oracle_set, popularity_counts, select_services, unknown_counts,
    CategoryResult, ConfigError, GroupPartition, GroupSeries, InterestMatrix, PolicyInputs,
    RunSeries, SelectionPolicy, StepMetrics, StepRecord, TrueInterests,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Scalar experiment configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total consumer population.
    pub consumers: usize,
    /// Size of the service catalog.
    pub services: usize,
    /// Number of equal-size interest groups.
    pub groups: usize,
    /// Services distributed per step (`1..=services`).
    pub network_capacity: usize,
    /// Number of simulated steps (`>= 1`).
    pub duration: usize,
    /// Probability that a cell was masked in the initial snapshot, in
    /// `[0, 1)`. Doubles as the fixed ε of the ε-greedy categories.
    pub unknown_interests_ratio: f64,
    /// Experiment seed; every instance derives its own stream from it.
    pub seed: u64,
}

impl Default for SimConfig {
    /// The reference scenario: 100 consumers, 20 services, 2 groups,
    /// capacity 2, 100 steps, 10% masked.
    fn default() -> Self {
        Self {
            consumers: 100,
            services: 20,
            groups: 2,
            network_capacity: 2,
            duration: 100,
            unknown_interests_ratio: 0.1,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Fail-fast validation of every scalar constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.consumers == 0 || self.services == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.groups == 0 || self.consumers % self.groups != 0 {
            return Err(ConfigError::UnevenGroups {
                consumers: self.consumers,
                groups: self.groups,
            });
        }
        if self.network_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.network_capacity > self.services {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.network_capacity,
                services: self.services,
            });
        }
        if !(0.0..1.0).contains(&self.unknown_interests_ratio) {
            return Err(ConfigError::RatioOutOfRange {
                ratio: self.unknown_interests_ratio,
            });
        }
        if self.duration < 1 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// The group partition implied by `consumers` / `groups`.
    pub fn partition(&self) -> Result<GroupPartition, ConfigError> {
        GroupPartition::new(self.consumers, self.groups)
    }
}

/// Where a category takes its popularity estimates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimateSource {
    /// Counts straight from the observed layer.
    Raw,
    /// Counts from the collaboratively imputed view, recomputed each step.
    Imputed,
}

/// Whether a category runs once over the whole population or independently
/// per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// One instance over all consumers, scored against every group's oracle.
    Population,
    /// One independent instance per group, each scored against its own
    /// oracle; no cross-group state sharing.
    PerGroup,
}

/// One parameterization of the pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryConfig {
    /// Identifier used in results and observer records, e.g. `"c2b"`.
    pub name: String,
    /// Selection strategy.
    pub policy: SelectionPolicy,
    /// Raw or imputed estimates.
    pub source: EstimateSource,
    /// Population-wide or per-group instances.
    pub scope: Scope,
    /// When false, the disclosure step is skipped entirely: the observed
    /// layer never changes and the run is a no-learning control.
    pub adaptive: bool,
}

impl CategoryConfig {
    /// Whether this category runs the collaborative filter each step.
    pub fn collaborative(&self) -> bool {
        self.source == EstimateSource::Imputed
    }
}

/// Mutable state owned by one (category, group) instance.
#[derive(Debug, Clone)]
pub struct SimulationState {
    available: InterestMatrix,
    rng: StdRng,
    step: usize,
}

impl SimulationState {
    /// Start an instance from an initial observed snapshot.
    pub fn new(initial: InterestMatrix, seed: u64) -> Self {
        Self {
            available: initial,
            rng: StdRng::seed_from_u64(seed),
            step: 0,
        }
    }

    /// The current observed layer.
    pub fn available(&self) -> &InterestMatrix {
        &self.available
    }

    /// Number of steps executed so far.
    pub fn step_index(&self) -> usize {
        self.step
    }
}

/// Everything one step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// The step's recorded metrics.
    pub metrics: StepMetrics,
    /// The services distributed this step, in pick order. Exactly
    /// `network_capacity` distinct indices.
    pub distributed: Vec<usize>,
}

/// Execute one time step for one instance.
///
/// `oracles` holds the oracle sets in scope: every group's set for a
/// population-scope instance, the instance's own set for a per-group one.
/// The instance-level overlap is the mean over those sets (each contributes
/// the same `capacity` oracle slots, so the mean is the weighted aggregate).
pub fn step_once(
    category: &CategoryConfig,
    state: &mut SimulationState,
    truth: &TrueInterests,
    oracles: &[Vec<usize>],
    capacity: usize,
) -> StepOutcome {
    let availability = availability_ratio(&state.available);

    let (popularity, unknown, imputation_accuracy) = match category.source {
        EstimateSource::Raw => (
            popularity_counts(&state.available),
            unknown_counts(&state.available),
            None,
        ),
        EstimateSource::Imputed => {
            let imputed = impute(&state.available);
            let accuracy = imputed.truth_agreement(truth);
            (
                popularity_counts(&imputed),
                unknown_counts(&imputed),
                Some(accuracy),
            )
        }
    };

    let distributed = select_services(
        category.policy,
        PolicyInputs {
            popularity: &popularity,
            unknown: &unknown,
            availability_ratio: availability,
        },
        capacity,
        &mut state.rng,
    );

    let oracle_overlap = if oracles.is_empty() || capacity == 0 {
        0.0
    } else {
        oracles
            .iter()
            .map(|oracle| {
                let hits = oracle.iter().filter(|s| distributed.contains(s)).count();
                hits as f64 / capacity as f64
            })
            .sum::<f64>()
            / oracles.len() as f64
    };

    if category.adaptive {
        state.available.disclose(&distributed, truth);
    }
    state.step += 1;

    StepOutcome {
        metrics: StepMetrics {
            availability,
            imputation_accuracy,
            oracle_overlap,
        },
        distributed,
    }
}

/// Derive a per-instance RNG seed from the experiment seed, the category
/// name, and a group lane. FNV-1a over the label with a SplitMix64 finisher:
/// cheap, stable across platforms, and keeps instance streams independent.
pub(crate) fn stream_seed(seed: u64, label: &str, lane: u64) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in label.as_bytes() {
        h ^= u64::from(*b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h ^= lane.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let mut z = seed ^ h;
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn run_instance<F>(
    category: &CategoryConfig,
    truth: &TrueInterests,
    initial: &InterestMatrix,
    oracles: &[Vec<usize>],
    capacity: usize,
    duration: usize,
    seed: u64,
    group: Option<usize>,
    observer: &mut F,
) -> RunSeries
where
    F: FnMut(StepRecord<'_>),
{
    let mut state = SimulationState::new(initial.clone(), seed);
    let mut series = RunSeries::with_capacity(duration, category.collaborative());
    for step in 0..duration {
        let outcome = step_once(category, &mut state, truth, oracles, capacity);
        series.push(outcome.metrics);
        observer(StepRecord {
            category: &category.name,
            group,
            step,
            metrics: outcome.metrics,
        });
    }
    series
}

/// Shape agreement between the configuration and the supplied matrices.
pub(crate) fn validate_inputs(
    config: &SimConfig,
    truth: &TrueInterests,
    initial: &InterestMatrix,
) -> Result<(), ConfigError> {
    config.validate()?;
    if truth.consumers() != config.consumers || truth.services() != config.services {
        return Err(ConfigError::ShapeMismatch {
            consumers: config.consumers,
            services: config.services,
            actual_consumers: truth.consumers(),
            actual_services: truth.services(),
        });
    }
    if initial.consumers() != config.consumers || initial.services() != config.services {
        return Err(ConfigError::ShapeMismatch {
            consumers: config.consumers,
            services: config.services,
            actual_consumers: initial.consumers(),
            actual_services: initial.services(),
        });
    }
    Ok(())
}

/// Run one category end to end, validating inputs first.
pub fn run_category<F>(
    config: &SimConfig,
    category: &CategoryConfig,
    truth: &TrueInterests,
    initial: &InterestMatrix,
    observer: &mut F,
) -> Result<CategoryResult, ConfigError>
where
    F: FnMut(StepRecord<'_>),
{
    validate_inputs(config, truth, initial)?;
    let partition = config.partition()?;
    Ok(run_category_with_partition(
        config, category, truth, initial, partition, observer,
    ))
}

pub(crate) fn run_category_with_partition<F>(
    config: &SimConfig,
    category: &CategoryConfig,
    truth: &TrueInterests,
    initial: &InterestMatrix,
    partition: GroupPartition,
    observer: &mut F,
) -> CategoryResult
where
    F: FnMut(StepRecord<'_>),
{
    let capacity = config.network_capacity;
    match category.scope {
        Scope::Population => {
            let oracles: Vec<Vec<usize>> = (0..partition.groups())
                .map(|g| oracle_set(&truth.slice_rows(partition.rows(g)), capacity))
                .collect();
            let seed = stream_seed(config.seed, &category.name, 0);
            let aggregate = run_instance(
                category,
                truth,
                initial,
                &oracles,
                capacity,
                config.duration,
                seed,
                None,
                observer,
            );
            CategoryResult {
                name: category.name.clone(),
                aggregate,
                groups: Vec::new(),
            }
        }
        Scope::PerGroup => {
            let mut groups = Vec::with_capacity(partition.groups());
            for g in 0..partition.groups() {
                let rows = partition.rows(g);
                let truth_g = truth.slice_rows(rows.clone());
                let initial_g = initial.slice_rows(rows);
                let oracles = vec![oracle_set(&truth_g, capacity)];
                let seed = stream_seed(config.seed, &category.name, g as u64 + 1);
                let series = run_instance(
                    category,
                    &truth_g,
                    &initial_g,
                    &oracles,
                    capacity,
                    config.duration,
                    seed,
                    Some(g),
                    observer,
                );
                groups.push(GroupSeries { group: g, series });
            }
            let aggregate = aggregate_groups(&groups, config.duration);
            CategoryResult {
                name: category.name.clone(),
                aggregate,
                groups,
            }
        }
    }
}
