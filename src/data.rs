use std::ops::RangeInclusive;

use rand::{distr::Distribution, rngs::StdRng};

/// The inclusive range input values are drawn from.
pub const VALUE_RANGE: RangeInclusive<i32> = 0..=10_000;

/// Sample `size` values uniformly from [`VALUE_RANGE`].
pub fn uniform_values(size: usize, rng: &mut StdRng) -> Vec<i32> {
    rand::distr::Uniform::new_inclusive(*VALUE_RANGE.start(), *VALUE_RANGE.end())
        .unwrap()
        .sample_iter(rng)
        .take(size)
        .collect()
}
