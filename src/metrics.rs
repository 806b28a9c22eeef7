//! Per-step metric records and their accumulated time series.
//!
//! The stepper emits one [`StepRecord`] per step; the collector accumulates
//! them into [`RunSeries`] of length `duration`. Grouped categories carry one
//! series per group plus a population-weighted aggregate. Everything here is
//! pure accumulation — the reporting/plotting layer consumes these read-only.

/// The scalars produced by one simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepMetrics {
    /// Fraction of (consumer, service) cells with a known value, measured at
    /// the start of the step.
    pub availability: f64,
    /// Fraction of cells (known + imputed) equal to the ground truth.
    /// `None` for non-collaborative categories.
    pub imputation_accuracy: Option<f64>,
    /// `|distributed ∩ oracle| / capacity`, averaged over the oracle sets in
    /// scope. Always in `[0, 1]`.
    pub oracle_overlap: f64,
}

/// A per-step event handed to an optional observer.
///
/// The core functions identically with no observer attached; this is a side
/// channel for progress reporting, never a control-flow dependency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord<'a> {
    /// Category identifier, e.g. `"c3b"`.
    pub category: &'a str,
    /// Group index for per-group instances, `None` for population scope.
    pub group: Option<usize>,
    /// Step index, `0..duration`.
    pub step: usize,
    /// The step's metrics.
    pub metrics: StepMetrics,
}

/// Metric time series for one (category, scope-instance) run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSeries {
    /// AvailabilityRatio\[t\].
    pub availability: Vec<f64>,
    /// ImputationAccuracy\[t\]; `None` for non-collaborative categories.
    pub imputation_accuracy: Option<Vec<f64>>,
    /// OracleOverlap\[t\].
    pub oracle_overlap: Vec<f64>,
}

impl RunSeries {
    pub(crate) fn with_capacity(duration: usize, collaborative: bool) -> Self {
        Self {
            availability: Vec::with_capacity(duration),
            imputation_accuracy: collaborative.then(|| Vec::with_capacity(duration)),
            oracle_overlap: Vec::with_capacity(duration),
        }
    }

    pub(crate) fn push(&mut self, m: StepMetrics) {
        self.availability.push(m.availability);
        if let (Some(series), Some(acc)) = (self.imputation_accuracy.as_mut(), m.imputation_accuracy)
        {
            series.push(acc);
        }
        self.oracle_overlap.push(m.oracle_overlap);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.oracle_overlap.len()
    }

    /// Whether no steps have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.oracle_overlap.is_empty()
    }
}

/// The series produced by one group's independent instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSeries {
    /// Group index.
    pub group: usize,
    /// The group's own series.
    pub series: RunSeries,
}

/// Results for one category: the aggregate series plus, for grouped
/// categories, each group's series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryResult {
    /// Category identifier, e.g. `"c4d"`.
    pub name: String,
    /// Aggregate series. For population-scope categories this is the run's
    /// own series; for grouped categories it is the population-weighted
    /// aggregate across groups.
    pub aggregate: RunSeries,
    /// Per-group series; empty for population-scope categories.
    pub groups: Vec<GroupSeries>,
}

/// Population-weighted aggregate across equal-size group instances.
///
/// Availability and accuracy weight each group by its cell count
/// (group size × services); with equal-size groups that weighting collapses
/// to the plain mean, which then equals the overall ratio across all
/// consumers. Overlap weights each group by its `capacity` oracle slots —
/// also the plain mean.
pub(crate) fn aggregate_groups(groups: &[GroupSeries], duration: usize) -> RunSeries {
    let n = groups.len();
    if n == 0 {
        return RunSeries::default();
    }
    let collaborative = groups
        .iter()
        .all(|g| g.series.imputation_accuracy.is_some());
    let mut out = RunSeries::with_capacity(duration, collaborative);
    for t in 0..duration {
        let mean = |f: &dyn Fn(&RunSeries) -> f64| {
            groups.iter().map(|g| f(&g.series)).sum::<f64>() / n as f64
        };
        out.availability.push(mean(&|s| s.availability[t]));
        out.oracle_overlap.push(mean(&|s| s.oracle_overlap[t]));
        if let Some(acc) = out.imputation_accuracy.as_mut() {
            let v = groups
                .iter()
                .map(|g| g.series.imputation_accuracy.as_ref().map_or(0.0, |a| a[t]))
                .sum::<f64>()
                / n as f64;
            acc.push(v);
        }
    }
    out
}
