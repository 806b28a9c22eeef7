//! Interest matrices: immutable ground truth and the mutable observed layer.
//!
//! The ground truth ([`TrueInterests`]) is generated externally and never
//! changes during a run. The observed layer ([`InterestMatrix`]) holds a
//! tri-state [`Interest`] per (consumer, service) cell and only ever gains
//! information: once a cell is `Known(v)` it never reverts to `Unknown` and
//! never changes value — [`InterestMatrix::disclose`] reasserts true values,
//! it cannot retract or correct.

use crate::ConfigError;
use std::ops::Range;

/// Tri-state knowledge about one (consumer, service) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interest {
    /// The system has no observation for this cell.
    Unknown,
    /// The system observed whether the consumer likes the service.
    Known(bool),
}

impl Interest {
    /// Whether the cell carries an observation.
    pub fn is_known(self) -> bool {
        matches!(self, Interest::Known(_))
    }

    /// Whether the cell is an observed like.
    pub fn is_liked(self) -> bool {
        self == Interest::Known(true)
    }

    /// Whether the cell agrees with a ground-truth value.
    ///
    /// `Unknown` agrees with nothing, so unresolved cells count against
    /// equality-based accuracy metrics.
    pub fn matches_truth(self, truth: bool) -> bool {
        self == Interest::Known(truth)
    }
}

/// Immutable binary ground truth, consumers × services.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrueInterests {
    consumers: usize,
    services: usize,
    cells: Vec<bool>,
}

impl TrueInterests {
    /// Build from a row-major cell buffer.
    pub fn from_vec(
        consumers: usize,
        services: usize,
        cells: Vec<bool>,
    ) -> Result<Self, ConfigError> {
        if cells.len() != consumers * services {
            return Err(ConfigError::BadCellCount {
                consumers,
                services,
                len: cells.len(),
            });
        }
        Ok(Self {
            consumers,
            services,
            cells,
        })
    }

    /// Number of consumers (rows).
    pub fn consumers(&self) -> usize {
        self.consumers
    }

    /// Number of services (columns).
    pub fn services(&self) -> usize {
        self.services
    }

    /// Ground-truth value for one cell.
    pub fn get(&self, consumer: usize, service: usize) -> bool {
        self.cells[consumer * self.services + service]
    }

    /// One consumer's row.
    pub fn row(&self, consumer: usize) -> &[bool] {
        let start = consumer * self.services;
        &self.cells[start..start + self.services]
    }

    /// Copy of a contiguous block of consumer rows (used for per-group runs).
    pub fn slice_rows(&self, rows: Range<usize>) -> TrueInterests {
        let start = rows.start * self.services;
        let end = rows.end * self.services;
        TrueInterests {
            consumers: rows.len(),
            services: self.services,
            cells: self.cells[start..end].to_vec(),
        }
    }

    /// Row-major view of all cells.
    pub fn row_major(&self) -> &[bool] {
        &self.cells
    }
}

/// Mutable tri-state observed layer, consumers × services.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterestMatrix {
    consumers: usize,
    services: usize,
    cells: Vec<Interest>,
}

impl InterestMatrix {
    /// Build from a row-major cell buffer.
    pub fn from_vec(
        consumers: usize,
        services: usize,
        cells: Vec<Interest>,
    ) -> Result<Self, ConfigError> {
        if cells.len() != consumers * services {
            return Err(ConfigError::BadCellCount {
                consumers,
                services,
                len: cells.len(),
            });
        }
        Ok(Self {
            consumers,
            services,
            cells,
        })
    }

    /// A matrix with every cell `Unknown`.
    pub fn unknown(consumers: usize, services: usize) -> Self {
        Self {
            consumers,
            services,
            cells: vec![Interest::Unknown; consumers * services],
        }
    }

    /// A fully disclosed copy of the ground truth (no `Unknown` cells).
    pub fn fully_known(truth: &TrueInterests) -> Self {
        Self {
            consumers: truth.consumers(),
            services: truth.services(),
            cells: truth
                .row_major()
                .iter()
                .map(|&v| Interest::Known(v))
                .collect(),
        }
    }

    /// Number of consumers (rows).
    pub fn consumers(&self) -> usize {
        self.consumers
    }

    /// Number of services (columns).
    pub fn services(&self) -> usize {
        self.services
    }

    /// One cell.
    pub fn get(&self, consumer: usize, service: usize) -> Interest {
        self.cells[consumer * self.services + service]
    }

    /// Overwrite one cell. Callers are responsible for the monotonicity
    /// invariant; prefer [`InterestMatrix::disclose`] for simulation writes.
    pub fn set(&mut self, consumer: usize, service: usize, value: Interest) {
        self.cells[consumer * self.services + service] = value;
    }

    /// One consumer's row.
    pub fn row(&self, consumer: usize) -> &[Interest] {
        let start = consumer * self.services;
        &self.cells[start..start + self.services]
    }

    /// Count of cells carrying an observation.
    pub fn known_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_known()).count()
    }

    /// Total cell count (consumers × services).
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Copy of a contiguous block of consumer rows (used for per-group runs).
    pub fn slice_rows(&self, rows: Range<usize>) -> InterestMatrix {
        let start = rows.start * self.services;
        let end = rows.end * self.services;
        InterestMatrix {
            consumers: rows.len(),
            services: self.services,
            cells: self.cells[start..end].to_vec(),
        }
    }

    /// Reveal ground truth for the given services to every consumer.
    ///
    /// Idempotent: already-known cells are reasserted to the same true value,
    /// so knowledge only ever grows.
    pub fn disclose(&mut self, services: &[usize], truth: &TrueInterests) {
        for consumer in 0..self.consumers {
            for &service in services {
                self.set(consumer, service, Interest::Known(truth.get(consumer, service)));
            }
        }
    }

    /// Fraction of cells equal to the ground truth.
    ///
    /// `Unknown` cells never match, so an undisclosed or unresolved cell
    /// counts against accuracy.
    pub fn truth_agreement(&self, truth: &TrueInterests) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let matching = self
            .cells
            .iter()
            .zip(truth.row_major())
            .filter(|(cell, &t)| cell.matches_truth(t))
            .count();
        matching as f64 / self.cells.len() as f64
    }
}

/// Equal-size contiguous partition of the consumer population into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupPartition {
    consumers: usize,
    groups: usize,
}

impl GroupPartition {
    /// Build a partition, rejecting uneven splits.
    pub fn new(consumers: usize, groups: usize) -> Result<Self, ConfigError> {
        if consumers == 0 || groups == 0 || consumers % groups != 0 {
            return Err(ConfigError::UnevenGroups { consumers, groups });
        }
        Ok(Self { consumers, groups })
    }

    /// Number of groups.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Consumers per group.
    pub fn group_size(&self) -> usize {
        self.consumers / self.groups
    }

    /// The consumer-row range owned by group `g`.
    pub fn rows(&self, g: usize) -> Range<usize> {
        let size = self.group_size();
        g * size..(g + 1) * size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truth_2x3() -> TrueInterests {
        TrueInterests::from_vec(2, 3, vec![true, false, true, false, true, false]).unwrap()
    }

    #[test]
    fn from_vec_rejects_bad_cell_count() {
        let err = TrueInterests::from_vec(2, 3, vec![true; 5]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BadCellCount {
                consumers: 2,
                services: 3,
                len: 5
            }
        );
    }

    #[test]
    fn fully_known_matches_truth_everywhere() {
        let truth = truth_2x3();
        let m = InterestMatrix::fully_known(&truth);
        assert_eq!(m.known_cells(), 6);
        assert!((m.truth_agreement(&truth) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disclose_only_adds_information() {
        let truth = truth_2x3();
        let mut m = InterestMatrix::unknown(2, 3);
        m.disclose(&[1], &truth);
        assert_eq!(m.get(0, 1), Interest::Known(false));
        assert_eq!(m.get(1, 1), Interest::Known(true));
        assert_eq!(m.get(0, 0), Interest::Unknown);

        // Re-disclosing is idempotent.
        let before = m.clone();
        m.disclose(&[1], &truth);
        assert_eq!(m, before);
    }

    #[test]
    fn truth_agreement_penalizes_unknowns() {
        let truth = truth_2x3();
        let mut m = InterestMatrix::unknown(2, 3);
        assert_eq!(m.truth_agreement(&truth), 0.0);
        m.disclose(&[0, 1, 2], &truth);
        assert!((m.truth_agreement(&truth) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn slice_rows_copies_the_block() {
        let truth = truth_2x3();
        let bottom = truth.slice_rows(1..2);
        assert_eq!(bottom.consumers(), 1);
        assert_eq!(bottom.row(0), &[false, true, false]);
    }

    #[test]
    fn partition_rejects_uneven_split() {
        assert!(GroupPartition::new(10, 3).is_err());
        assert!(GroupPartition::new(0, 2).is_err());
        let p = GroupPartition::new(10, 2).unwrap();
        assert_eq!(p.group_size(), 5);
        assert_eq!(p.rows(1), 5..10);
    }
}
