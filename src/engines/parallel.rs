//! The task parallel merge sort engine.
//!
//! Runs the same recursion as the sequential engine, but forks the two
//! halves as tasks on a work stealing pool and joins before merging. The
//! join waits on exactly the two child tasks, so independent subtrees never
//! serialize against each other.

use crate::engines::{merging, sequential};

/// Slices at most this long skip task creation and run the sequential
/// engine, keeping per-task scheduling overhead off small subproblems.
pub const SEQUENTIAL_THRESHOLD: usize = 1000;

/// Sort `values` in place using fork-join tasks on `pool`.
///
/// The call tree runs under [`rayon::ThreadPool::install`]: one pool thread
/// initiates the top-level call and the remaining threads steal tasks from
/// it. When the pool is saturated, forked tasks simply run inline on the
/// forking thread, so progress never depends on a free worker.
pub fn sort(pool: &rayon::ThreadPool, values: &mut [i32]) {
    if values.len() < 2 {
        return;
    }

    let mut scratch = vec![0; values.len()];
    pool.install(|| task_sort(values, &mut scratch));
}

/// Fork-join recursion. Slice and scratch are split at the same point, so
/// each child task owns a disjoint pair of ranges.
fn task_sort(slice: &mut [i32], scratch: &mut [i32]) {
    if slice.len() <= SEQUENTIAL_THRESHOLD {
        sequential::merge_sort(slice, scratch);
        return;
    }

    let middle = slice.len() / 2;
    {
        let (left, right) = slice.split_at_mut(middle);
        let (left_scratch, right_scratch) = scratch.split_at_mut(middle);

        // The join returns once both children are done, which is exactly the
        // ordering the merge below needs
        rayon::join(
            || task_sort(left, left_scratch),
            || task_sort(right, right_scratch),
        );
    }

    merging::merge_adjacent(slice, middle, scratch);
}
