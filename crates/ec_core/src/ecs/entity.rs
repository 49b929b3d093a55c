//! # Entity Records
//!
//! Entities are plain table indices. Each table slot holds:
//! - An alive flag (soft deletion clears it)
//! - A data slot: the index into every component column
//! - The membership bitset
//!
//! IDs are stable only between calls to `cleanup()`.

use std::fmt;

use ec_meta::Registry;

use super::bitset::Bitset;

/// Index of an entity in the entity table.
///
/// Compaction renumbers live entities, so an `EntityId` is only valid until
/// the next `cleanup()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(usize);

impl EntityId {
    /// Creates an ID from a table index.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for EntityId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// One slot of the entity table.
///
/// Compaction moves whole records, so the data slot travels with the
/// entity and component columns are never rewritten.
pub struct EntityRecord<R: Registry> {
    pub(crate) alive: bool,
    pub(crate) data_slot: usize,
    pub(crate) membership: Bitset<R>,
}

impl<R: Registry> EntityRecord<R> {
    /// Creates a dead slot whose data lives at `data_slot`.
    #[inline]
    #[must_use]
    pub fn vacant(data_slot: usize) -> Self {
        Self {
            alive: false,
            data_slot,
            membership: Bitset::new(),
        }
    }

    /// Whether this slot holds a live entity.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Index into the component columns.
    #[inline]
    #[must_use]
    pub fn data_slot(&self) -> usize {
        self.data_slot
    }

    /// Attached components and tags.
    #[inline]
    #[must_use]
    pub fn membership(&self) -> &Bitset<R> {
        &self.membership
    }
}

impl<R: Registry> Clone for EntityRecord<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Registry> Copy for EntityRecord<R> {}

impl<R: Registry> fmt::Debug for EntityRecord<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("alive", &self.alive)
            .field("data_slot", &self.data_slot)
            .field("membership", &self.membership)
            .finish()
    }
}
