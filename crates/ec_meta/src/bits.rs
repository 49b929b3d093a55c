//! # Bit Blocks
//!
//! Backing storage shape for membership bitsets. Each registry picks a
//! fixed-size word array wide enough for all of its components and tags, so
//! a bitset never touches the heap.

use std::fmt::Debug;
use std::hash::Hash;

/// Number of 64-bit words needed to hold `bits` bits.
#[inline]
#[must_use]
pub const fn words_for(bits: usize) -> usize {
    bits.div_ceil(64)
}

/// Fixed-size word storage for a membership bitset.
///
/// Implemented for every `[u64; N]`. Registries declare
/// `type Words = [u64; words_for(WIDTH)]`.
pub trait BitBlock: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// All bits cleared.
    fn zeroed() -> Self;

    /// The words, lowest bits first.
    fn words(&self) -> &[u64];

    /// Mutable view of the words.
    fn words_mut(&mut self) -> &mut [u64];
}

impl<const N: usize> BitBlock for [u64; N] {
    #[inline]
    fn zeroed() -> Self {
        [0; N]
    }

    #[inline]
    fn words(&self) -> &[u64] {
        self
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [u64] {
        self
    }
}
