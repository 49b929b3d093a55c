//! # Deferred Matchers
//!
//! Stored (signature, callback) pairs replayed on demand, typically once per
//! tick. The query bitset and the typed column access are fixed when the
//! matcher is registered; each replay scans the table as it is at that
//! moment.

use std::fmt;

use ec_meta::Registry;

use super::signature::{run_matching, MatchFn, Signature};
use super::storage::ComponentColumns;
use super::table::EntityTable;
use crate::error::{EcsError, EcsResult};

/// Handle to a registered deferred matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(u64);

impl MatcherId {
    /// Raw handle value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matcher({})", self.0)
    }
}

type ErasedMatcher<R> =
    Box<dyn FnMut(&EntityTable<R>, &mut ComponentColumns<R>) -> EcsResult<usize>>;

struct Entry<R: Registry> {
    id: MatcherId,
    signature: &'static str,
    run: ErasedMatcher<R>,
}

/// Deferred matchers in registration order.
pub struct MatcherRegistry<R: Registry> {
    entries: Vec<Entry<R>>,
    next_id: u64,
}

impl<R: Registry> Default for MatcherRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registry> MatcherRegistry<R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of registered matchers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered handles, in replay order.
    pub fn ids(&self) -> impl Iterator<Item = MatcherId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Stores `callback` to be replayed against entities matching `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if `S` names a component twice,
    /// [`EcsError::SignatureOrder`] if `S` lists components out of
    /// declaration order.
    pub fn register<S, F>(&mut self, callback: F) -> EcsResult<MatcherId>
    where
        S: Signature<R> + 'static,
        F: MatchFn<R, S::Components> + 'static,
    {
        S::validate()?;

        let query = S::bitset();
        let mut callback = callback;
        let run: ErasedMatcher<R> = Box::new(
            move |entities: &EntityTable<R>, columns: &mut ComponentColumns<R>| {
                run_matching::<R, S::Components, F>(entities, columns, &query, &mut callback)
            },
        );

        let id = MatcherId(self.next_id);
        self.next_id += 1;
        let signature = std::any::type_name::<S>();
        self.entries.push(Entry { id, signature, run });

        tracing::debug!(matcher = %id, signature, "Registered deferred matcher");
        Ok(id)
    }

    /// Replays every matcher in registration order.
    ///
    /// # Returns
    ///
    /// Total callback invocations across all matchers.
    ///
    /// # Errors
    ///
    /// The first error raised by a matcher; later matchers are not run.
    pub fn call_all(
        &mut self,
        entities: &EntityTable<R>,
        columns: &mut ComponentColumns<R>,
    ) -> EcsResult<usize> {
        let mut total = 0;
        for entry in &mut self.entries {
            let visited = (entry.run)(entities, columns)?;
            tracing::trace!(matcher = %entry.id, visited, "Replayed deferred matcher");
            total += visited;
        }
        Ok(total)
    }

    /// Replays a single matcher.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownMatcher`] if `id` is not registered.
    pub fn call_one(
        &mut self,
        id: MatcherId,
        entities: &EntityTable<R>,
        columns: &mut ComponentColumns<R>,
    ) -> EcsResult<usize> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(EcsError::UnknownMatcher(id.get()))?;
        let visited = (entry.run)(entities, columns)?;
        tracing::trace!(matcher = %id, visited, "Replayed deferred matcher");
        Ok(visited)
    }

    /// Unregisters a matcher. The order of the rest is kept.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownMatcher`] if `id` is not registered.
    pub fn remove(&mut self, id: MatcherId) -> EcsResult<()> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(EcsError::UnknownMatcher(id.get()))?;
        let entry = self.entries.remove(position);
        tracing::debug!(matcher = %id, signature = entry.signature, "Removed deferred matcher");
        Ok(())
    }

    /// Unregisters every matcher. Handles are never reused.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(count = self.entries.len(), "Cleared deferred matchers");
        }
        self.entries.clear();
    }
}
