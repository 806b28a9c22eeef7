//! Deterministic simulator for popularity-driven content distribution.
//!
//! A fixed consumer population holds binary interests in a service catalog.
//! The distribution system only sees a partially observed copy of those
//! interests; each simulated step it estimates service popularity from what
//! it can see, pushes a capacity-limited set of services, and (for adaptive
//! categories) learns the true interests of everyone it reached. The point
//! of the crate is to compare selection strategies — greedy top-K, ε-greedy
//! exploration, a decaying-ε schedule, and an optimistic upper popularity
//! bound — with and without collaborative imputation of the unknown cells,
//! population-wide and per interest group, against an omniscient oracle.
//!
//! Everything is deterministic for a fixed seed: stochastic policies draw
//! from per-instance `StdRng` streams derived from the experiment seed, and
//! every tie in every ranking breaks by ascending service index.
//!
//! # Example
//!
//! ```
//! use popsim::{generate, Experiment, PopulationSpec, SimConfig};
//!
//! let spec = PopulationSpec::default();
//! let (truth, initial) = generate(&spec)?;
//! let config = SimConfig {
//!     duration: 10,
//!     ..SimConfig::default()
//! };
//! let results = Experiment::new(config, truth, initial)?.run();
//! assert_eq!(results.len(), 13);
//!
//! // The static baseline never learns, so its availability is flat.
//! let baseline = &results[0];
//! assert_eq!(baseline.name, "c1");
//! assert_eq!(baseline.aggregate.availability[0],
//!            baseline.aggregate.availability[9]);
//! # Ok::<(), popsim::ConfigError>(())
//! ```

#![forbid(unsafe_code)]

mod error;
mod experiment;
mod impute;
mod interest;
mod metrics;
mod popularity;
mod select;
mod sim;
mod synthetic;

pub use error::ConfigError;
pub use experiment::{standard_categories, Experiment};
pub use impute::{impute, jaccard_similarities, SimilarityMatrix};
pub use interest::{GroupPartition, Interest, InterestMatrix, TrueInterests};
pub use metrics::{CategoryResult, GroupSeries, RunSeries, StepMetrics, StepRecord};
pub use popularity::{
    availability_ratio, oracle_set, popularity_counts, rank_descending, true_popularity_counts,
    unknown_counts,
};
pub use select::{select_services, PolicyInputs, SelectionPolicy};
pub use sim::{
    run_category, step_once, CategoryConfig, EstimateSource, Scope, SimConfig, SimulationState,
    StepOutcome,
};
pub use synthetic::{generate, PopulationSpec};
