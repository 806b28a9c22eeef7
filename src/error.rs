//! Configuration and shape errors.
//!
//! All validation is fail-fast: a bad configuration is reported to the caller
//! before any simulation state is built. Degenerate *data* (all-unknown rows,
//! all-zero similarities) is not an error; those cases are handled explicitly
//! by the estimator and the imputer.

/// Error returned by configuration validation and matrix constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The consumer population cannot be split into equal groups.
    #[error("number of consumers ({consumers}) is not divisible by number of groups ({groups})")]
    UnevenGroups { consumers: usize, groups: usize },

    /// The service catalog cannot be split into equal per-group blocks.
    #[error("number of services ({services}) is not divisible by number of groups ({groups})")]
    UnevenServiceBlocks { services: usize, groups: usize },

    /// More services would be pushed per step than exist in the catalog.
    #[error("network capacity ({capacity}) exceeds number of services ({services})")]
    CapacityTooLarge { capacity: usize, services: usize },

    /// A step must distribute at least one service.
    #[error("network capacity must be at least 1")]
    ZeroCapacity,

    /// The masking probability must leave knowledge partially observable.
    #[error("unknown interests ratio ({ratio}) must be in [0, 1)")]
    RatioOutOfRange { ratio: f64 },

    /// A run must have at least one step.
    #[error("duration must be at least 1")]
    ZeroDuration,

    /// The population must be non-empty in both dimensions.
    #[error("population must have at least one consumer and one service")]
    EmptyPopulation,

    /// A flat cell buffer does not match the declared matrix shape.
    #[error("cell buffer length {len} does not match shape {consumers}x{services}")]
    BadCellCount {
        consumers: usize,
        services: usize,
        len: usize,
    },

    /// Two matrices that must share a shape do not.
    #[error("matrix shape {actual_consumers}x{actual_services} does not match expected {consumers}x{services}")]
    ShapeMismatch {
        consumers: usize,
        services: usize,
        actual_consumers: usize,
        actual_services: usize,
    },

    /// The synthetic generator needs a finite, non-negative spread.
    #[error("interest distribution std ({std}) must be finite and non-negative")]
    BadInterestStd { std: f64 },
}
