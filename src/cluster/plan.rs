//! Static partitioning of a sequence across the process group.

use std::ops::Range;

/// The assignment of contiguous index ranges to ranks, fixed for the
/// lifetime of a process group.
///
/// Every rank computes the same plan from `(len, workers)` alone, so the
/// group never has to exchange it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    counts: Vec<usize>,
    displs: Vec<usize>,
}

impl PartitionPlan {
    /// Split `len` elements into `workers` contiguous ranges.
    ///
    /// Rank `i` owns `[len * i / workers, len * (i + 1) / workers)`. The
    /// ranges cover the sequence exactly, never overlap, and no two differ
    /// in size by more than one element.
    ///
    /// # Panics
    ///
    /// Panics when `workers` is zero.
    pub fn balanced(len: usize, workers: usize) -> Self {
        assert!(workers > 0, "Partitioning requires at least one worker");

        let mut counts = Vec::with_capacity(workers);
        let mut displs = Vec::with_capacity(workers);

        for rank in 0..workers {
            let start = len * rank / workers;
            let end = len * (rank + 1) / workers;
            counts.push(end - start);
            displs.push(start);
        }

        Self { counts, displs }
    }

    /// The number of ranks the plan distributes over.
    pub fn worker_count(&self) -> usize {
        self.counts.len()
    }

    /// The total number of elements covered by the plan.
    pub fn total_len(&self) -> usize {
        self.counts.iter().sum()
    }

    /// The number of elements rank `rank` owns.
    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    /// The offset at which rank `rank`'s shard starts.
    pub fn offset(&self, rank: usize) -> usize {
        self.displs[rank]
    }

    /// The index range rank `rank` owns.
    pub fn range(&self, rank: usize) -> Range<usize> {
        self.displs[rank]..self.displs[rank] + self.counts[rank]
    }
}
