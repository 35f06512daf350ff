use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

// @module: Chunk size bounds and selection

/// Smallest chunk read and written in one iteration (bytes)
pub const MIN_CHUNK_SIZE: usize = 512;

/// Largest chunk read and written in one iteration (bytes)
pub const MAX_CHUNK_SIZE: usize = 2048;

/// Closed range every chunk size is drawn from
pub const CHUNK_SIZE_RANGE: RangeInclusive<usize> = MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE;

/// Picks the size of the next chunk from an inclusive range.
///
/// Any `FnMut(RangeInclusive<usize>) -> usize` is a selector, which lets
/// callers script the exact sequence of chunk sizes.
pub trait SizeSelector {
    fn select(&mut self, range: RangeInclusive<usize>) -> usize;
}

impl<F> SizeSelector for F
where
    F: FnMut(RangeInclusive<usize>) -> usize,
{
    fn select(&mut self, range: RangeInclusive<usize>) -> usize {
        self(range)
    }
}

/// Uniform random selector, inclusive on both ends
pub struct RandomSizeSelector {
    rng: StdRng,
}

impl RandomSizeSelector {
    // @creates: Selector seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    // @creates: Selector with a reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, entropy-backed otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomSizeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeSelector for RandomSizeSelector {
    fn select(&mut self, range: RangeInclusive<usize>) -> usize {
        self.rng.random_range(range)
    }
}

/// Pull a selector's answer back into the chunk range
pub fn clamp_chunk_size(size: usize) -> usize {
    size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}
