// partition.rs - Column-to-partition assignment driving alignment splitting

use crate::error::{AlnError, Result};

/// Maps each alignment column (0-based) to a partition index.
///
/// Input to [`Alignment::split`](crate::data::Alignment::split). The declared
/// column count must match the alignment length and at least two partitions
/// must be present for a split to make sense.
#[derive(Debug, Clone)]
pub struct PartitionSet {
    assignments: Vec<usize>,
    n_partitions: usize,
}

impl PartitionSet {
    /// Build a partition set from per-column partition indices.
    /// Fails if `assignments` is empty or a partition index leaves an
    /// earlier partition empty (indices must cover 0..=max).
    pub fn from_assignments(assignments: Vec<usize>) -> Result<Self> {
        if assignments.is_empty() {
            return Err(AlnError::InvalidArgument(
                "partition set must cover at least one column".to_string(),
            ));
        }
        let n_partitions = assignments.iter().max().copied().unwrap_or(0) + 1;
        for p in 0..n_partitions {
            if !assignments.contains(&p) {
                return Err(AlnError::InvalidArgument(format!(
                    "partition {} has no assigned column",
                    p
                )));
            }
        }
        Ok(Self {
            assignments,
            n_partitions,
        })
    }

    pub fn n_partitions(&self) -> usize {
        self.n_partitions
    }

    /// Declared alignment length.
    pub fn ali_length(&self) -> usize {
        self.assignments.len()
    }

    /// Partition index of the given column.
    pub fn partition(&self, pos: usize) -> usize {
        self.assignments[pos]
    }
}
