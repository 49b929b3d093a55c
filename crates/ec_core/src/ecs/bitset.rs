//! # Membership Bitset
//!
//! One bit per declared component followed by one bit per declared tag.
//! The word array is sized by the registry, so a bitset is `Copy` and never
//! allocates.
//!
//! ```text
//! Registry { components: [Position, Velocity], tags: [Frozen] }
//!
//! bit:      0         1         2
//!        Position  Velocity  Frozen
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use ec_meta::{BitBlock, ComponentOf, Registry, TagOf, TypeSet};

/// Fixed-width bit vector over the members of registry `R`.
pub struct Bitset<R: Registry> {
    words: R::Words,
    _registry: PhantomData<fn() -> R>,
}

impl<R: Registry> Bitset<R> {
    /// Creates a bitset with every bit cleared.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: R::Words::zeroed(),
            _registry: PhantomData,
        }
    }

    /// Creates a bitset with exactly the bits of the types in `S` set.
    ///
    /// This is how a query signature becomes a bitmask.
    #[must_use]
    pub fn of<S: TypeSet<R>>() -> Self {
        let mut bitset = Self::new();
        S::for_each_index(|index| bitset.set(index, true));
        bitset
    }

    /// Number of meaningful bits.
    #[inline]
    #[must_use]
    pub const fn width() -> usize {
        R::WIDTH
    }

    /// Reads bit `index`. Bits beyond the width read as `false`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        if index >= R::WIDTH {
            return false;
        }
        (self.words.words()[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Writes bit `index`. Writes beyond the width are ignored.
    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        debug_assert!(index < R::WIDTH, "bit {index} out of width {}", R::WIDTH);
        if index >= R::WIDTH {
            return;
        }
        let mask = 1u64 << (index % 64);
        let word = &mut self.words.words_mut()[index / 64];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Reads the bit of component `C`.
    #[inline]
    #[must_use]
    pub fn has_component<C: ComponentOf<R>>(&self) -> bool {
        self.get(C::INDEX)
    }

    /// Writes the bit of component `C`.
    #[inline]
    pub fn set_component<C: ComponentOf<R>>(&mut self, value: bool) {
        self.set(C::INDEX, value);
    }

    /// Reads the bit of tag `T`.
    #[inline]
    #[must_use]
    pub fn has_tag<T: TagOf<R>>(&self) -> bool {
        self.get(T::INDEX)
    }

    /// Writes the bit of tag `T`.
    #[inline]
    pub fn set_tag<T: TagOf<R>>(&mut self, value: bool) {
        self.set(T::INDEX, value);
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.words = R::Words::zeroed();
    }

    /// Inverts every bit within the width.
    pub fn flip(&mut self) {
        for word in self.words.words_mut() {
            *word = !*word;
        }
        self.clear_padding();
    }

    /// Returns `true` if every bit set in `query` is also set here.
    ///
    /// Equivalent to `(self & query) == query`.
    #[inline]
    #[must_use]
    pub fn contains(&self, query: &Self) -> bool {
        self.words
            .words()
            .iter()
            .zip(query.words.words())
            .all(|(&mine, &wanted)| mine & wanted == wanted)
    }

    /// Number of bits set.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .words()
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum()
    }

    /// Returns `true` if no bit is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.words().iter().all(|&word| word == 0)
    }

    /// Iterates over the indices of set bits, lowest first.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..R::WIDTH).filter(move |&index| self.get(index))
    }

    fn clear_padding(&mut self) {
        let used = R::WIDTH % 64;
        if used != 0 {
            if let Some(last) = self.words.words_mut().last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }
}

impl<R: Registry> Default for Bitset<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registry> Clone for Bitset<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Registry> Copy for Bitset<R> {}

impl<R: Registry> PartialEq for Bitset<R> {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
    }
}

impl<R: Registry> Eq for Bitset<R> {}

impl<R: Registry> fmt::Debug for Bitset<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: String = (0..R::WIDTH)
            .map(|index| if self.get(index) { '1' } else { '0' })
            .collect();
        f.debug_tuple("Bitset").field(&bits).finish()
    }
}

impl<R: Registry> BitAnd for Bitset<R> {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self &= rhs;
        self
    }
}

impl<R: Registry> BitAndAssign for Bitset<R> {
    fn bitand_assign(&mut self, rhs: Self) {
        for (word, other) in self.words.words_mut().iter_mut().zip(rhs.words.words()) {
            *word &= other;
        }
    }
}

impl<R: Registry> BitOr for Bitset<R> {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self |= rhs;
        self
    }
}

impl<R: Registry> BitOrAssign for Bitset<R> {
    fn bitor_assign(&mut self, rhs: Self) {
        for (word, other) in self.words.words_mut().iter_mut().zip(rhs.words.words()) {
            *word |= other;
        }
    }
}
