//! The stable merge primitive shared by every engine.

/// Merge the two sorted runs `slice[..split]` and `slice[split..]` in place.
///
/// `scratch` temporarily holds the left run and needs room for at least
/// `split` elements. Equal elements keep their relative order: ties are
/// taken from the left run.
pub fn merge_adjacent(slice: &mut [i32], split: usize, scratch: &mut [i32]) {
    assert!(split <= slice.len(), "Split point needs to be in bounds");

    if split == 0 || split == slice.len() {
        // One of the runs is empty, nothing to do
        return;
    }

    assert!(scratch.len() >= split, "Scratch needs room for the left run");

    let left = &mut scratch[..split];
    left.copy_from_slice(&slice[..split]);

    let mut i = 0; // next element of the left run, now in scratch
    let mut j = split; // next element of the right run, still in slice
    let mut k = 0; // next output position

    while i < left.len() && j < slice.len() {
        if left[i] <= slice[j] {
            slice[k] = left[i];
            i += 1;
        } else {
            slice[k] = slice[j];
            j += 1;
        }
        k += 1;
    }

    // Whatever remains of the left run slots in behind; a leftover right run
    // is already in its final position.
    slice[k..j].copy_from_slice(&left[i..]);
}
