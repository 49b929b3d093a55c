//! # Entity Table
//!
//! Growable array of [`EntityRecord`]s indexed by [`EntityId`].
//!
//! ```text
//! index:   0     1     2     3     4   | 5     6     7
//! alive:   Y     n     Y     n     Y   | n     n     n
//!          <------- len (5) -------->  <- spare capacity ->
//! ```
//!
//! Deleting only clears the alive flag. [`EntityTable::compact`] moves live
//! records into the dead slots from the back so that `[0, len)` holds
//! exactly the live entities.

use ec_meta::Registry;

use super::entity::{EntityId, EntityRecord};

/// Outcome of a compaction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactionReport {
    /// Dead slots removed from the active range.
    pub reclaimed: usize,
    /// Live entities after compaction (the new table length).
    pub live: usize,
}

/// Entity records plus the active-range length.
pub struct EntityTable<R: Registry> {
    records: Vec<EntityRecord<R>>,
    len: usize,
}

impl<R: Registry> EntityTable<R> {
    /// Creates a table with `capacity` vacant slots.
    ///
    /// Slot `i` starts with data slot `i`.
    ///
    /// # Arguments
    /// * `capacity` - Number of slots to pre-allocate
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: (0..capacity).map(EntityRecord::vacant).collect(),
            len: 0,
        }
    }

    /// Length of the active range `[0, len)`, live and soft-deleted.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the active range is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Number of live entities in the active range.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.active().iter().filter(|record| record.alive).count()
    }

    /// Returns `true` if `id` is within the active range, dead or alive.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        id.index() < self.len
    }

    /// Returns `true` if `id` is within the active range and alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.contains(id) && self.records[id.index()].alive
    }

    /// The record at `id`, or `None` if beyond capacity.
    ///
    /// # Arguments
    /// * `id` - Slot to read; may lie past the active range
    #[inline]
    #[must_use]
    pub fn record(&self, id: EntityId) -> Option<&EntityRecord<R>> {
        self.records.get(id.index())
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord<R>> {
        self.records.get_mut(id.index())
    }

    /// The record at `id` if it is a live entity.
    #[inline]
    pub(crate) fn live_record_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord<R>> {
        if !self.contains(id) {
            return None;
        }
        self.record_mut(id).filter(|record| record.alive)
    }

    /// Records in the active range.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &[EntityRecord<R>] {
        &self.records[..self.len]
    }

    /// Returns `true` if every slot is in the active range.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.records.len()
    }

    /// Grows to `capacity` slots. New slot `i` gets data slot `i`.
    ///
    /// # Arguments
    /// * `capacity` - Target slot count; smaller values are ignored
    pub fn grow_to(&mut self, capacity: usize) {
        let current = self.records.len();
        if capacity > current {
            self.records.extend((current..capacity).map(EntityRecord::vacant));
        }
    }

    /// Brings the first slot past the active range to life.
    ///
    /// The new entity keeps the data slot parked in that record and starts
    /// with an empty membership.
    ///
    /// # Returns
    ///
    /// The new ID, or `None` if the table is full.
    pub fn spawn(&mut self) -> Option<EntityId> {
        let record = self.records.get_mut(self.len)?;
        record.alive = true;
        record.membership.reset();
        let id = EntityId::new(self.len);
        self.len += 1;
        Some(id)
    }

    /// Marks `id` dead. No-op if `id` is outside the active range.
    ///
    /// # Arguments
    /// * `id` - Entity to kill
    ///
    /// # Returns
    ///
    /// `true` if a live entity was killed.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.live_record_mut(id) {
            Some(record) => {
                record.alive = false;
                true
            }
            None => false,
        }
    }

    /// Reclaims soft-deleted slots with a two-pointer swap pass.
    ///
    /// `rhs` walks backward over dead records, `lhs` walks forward over live
    /// ones; each dead `lhs` is swapped with the live `rhs`. Whole records
    /// move, data slots included, so component columns are untouched.
    /// Every dead record that leaves the active range has its bitset reset.
    ///
    /// Afterwards `[0, len)` contains exactly the live entities.
    /// O(len) regardless of the number of component types.
    pub fn compact(&mut self) -> CompactionReport {
        let before = self.len;
        if before == 0 {
            return CompactionReport::default();
        }

        let mut lhs = 0;
        let mut rhs = before - 1;

        loop {
            while !self.records[rhs].alive {
                self.records[rhs].membership.reset();
                if rhs == 0 {
                    self.len = 0;
                    return CompactionReport {
                        reclaimed: before,
                        live: 0,
                    };
                }
                rhs -= 1;
            }

            if lhs >= rhs {
                break;
            }

            if self.records[lhs].alive {
                lhs += 1;
            } else {
                self.records.swap(lhs, rhs);
                self.records[rhs].membership.reset();
                lhs += 1;
                rhs -= 1;
            }
        }

        self.len = rhs + 1;
        CompactionReport {
            reclaimed: before - self.len,
            live: self.len,
        }
    }
}
