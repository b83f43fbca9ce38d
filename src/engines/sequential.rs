//! The sequential top-down merge sort engine.

use crate::engines::merging;

/// Sort `values` in place by recursive halving.
pub fn sort(values: &mut [i32]) {
    if values.len() < 2 {
        return;
    }

    // Conservatively allocate one scratch buffer up front, reused by every
    // merge down the recursion
    let mut scratch = vec![0; values.len()];
    merge_sort(values, &mut scratch);
}

/// The recursion behind [`sort`], also the leaf case of the task parallel
/// engine. `scratch` needs at least the length of `slice`.
pub(crate) fn merge_sort(slice: &mut [i32], scratch: &mut [i32]) {
    debug_assert!(scratch.len() >= slice.len());

    if slice.len() < 2 {
        return;
    }

    let middle = slice.len() / 2;
    {
        let (left, right) = slice.split_at_mut(middle);
        merge_sort(left, scratch);
        merge_sort(right, scratch);
    }

    merging::merge_adjacent(slice, middle, scratch);
}
