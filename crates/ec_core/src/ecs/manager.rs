//! # Manager
//!
//! Owns the entity table, the component columns and the deferred matchers
//! for one registry.
//!
//! Entity operations follow a soft-fail policy: adding or removing
//! components and tags on a dead or out-of-range entity does nothing.
//! Raw component access (`get_entity_data`) checks neither liveness nor
//! membership; pair it with `has_component` when ownership matters.

use ec_meta::{ComponentOf, Registry, TagOf};

use super::entity::{EntityId, EntityRecord};
use super::matcher::{MatcherId, MatcherRegistry};
use super::signature::{run_matching, MatchFn, Signature};
use super::storage::ComponentColumns;
use super::table::{CompactionReport, EntityTable};
use crate::config::ManagerConfig;
use crate::error::{EcsError, EcsResult};

/// Entity and component store for registry `R`.
///
/// # Example
///
/// ```rust,ignore
/// let mut manager = Manager::<Game>::new();
///
/// let id = manager.add_entity();
/// manager.add_component(id, Position { x: 1.0, y: 2.0 });
/// manager.add_tag::<Frozen>(id);
///
/// manager.for_matching_signature::<(Position,), _>(|_: EntityId, pos: &mut Position| {
///     pos.x += 1.0;
/// })?;
/// ```
pub struct Manager<R: Registry> {
    entities: EntityTable<R>,
    columns: ComponentColumns<R>,
    matchers: MatcherRegistry<R>,
    config: ManagerConfig,
}

impl<R: Registry> Default for Manager<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Registry> Manager<R> {
    /// Creates a manager with the default capacity and growth.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(ManagerConfig::default())
    }

    /// Creates a manager with the given sizing policy.
    ///
    /// # Arguments
    /// * `config` - Initial capacity and growth step; validated first
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if the config fails validation.
    pub fn with_config(config: ManagerConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ManagerConfig) -> Self {
        tracing::debug!(
            components = R::COMPONENT_COUNT,
            tags = R::TAG_COUNT,
            capacity = config.initial_capacity,
            "Created entity manager"
        );
        Self {
            entities: EntityTable::new(config.initial_capacity),
            columns: ComponentColumns::new(config.initial_capacity),
            matchers: MatcherRegistry::new(),
            config,
        }
    }

    /// The sizing policy in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Current size: entities in `[0, len)`, including soft-deleted ones not
    /// yet reclaimed by [`Manager::cleanup`].
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the current size is zero.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Allocated entity slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Number of live entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.entities.alive_count()
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Adds a live entity with no components or tags.
    ///
    /// Grows the table and every component column by `grow_amount` when
    /// full. Growth may move component buffers.
    pub fn add_entity(&mut self) -> EntityId {
        loop {
            if let Some(id) = self.entities.spawn() {
                return id;
            }
            self.grow();
        }
    }

    fn grow(&mut self) {
        let from = self.entities.capacity();
        let to = from + self.config.grow_amount;
        self.entities.grow_to(to);
        self.columns.grow_to(to);
        tracing::debug!(from, to, "Grew entity table");
    }

    /// Marks `id` dead. Its slot is reclaimed by the next [`Manager::cleanup`].
    ///
    /// No-op if `id` is dead or out of range.
    ///
    /// # Arguments
    /// * `id` - Entity to delete
    pub fn delete_entity(&mut self, id: EntityId) {
        self.entities.kill(id);
    }

    /// Returns `true` if `id` is within the current size, dead or alive.
    ///
    /// # Arguments
    /// * `id` - Entity to look up
    #[inline]
    #[must_use]
    pub fn has_entity(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Returns `true` if `id` is within the current size and alive.
    ///
    /// # Arguments
    /// * `id` - Entity to look up
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Read-only view of the record at `id`.
    ///
    /// Any slot below capacity can be inspected, including slots beyond the
    /// current size.
    ///
    /// # Arguments
    /// * `id` - Slot to inspect; any index below capacity
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfRange`] if `id` is beyond capacity.
    pub fn entity_info(&self, id: EntityId) -> EcsResult<&EntityRecord<R>> {
        self.entities.record(id).ok_or(EcsError::EntityOutOfRange {
            id: id.index(),
            capacity: self.entities.capacity(),
        })
    }

    /// Reclaims soft-deleted entities.
    ///
    /// Afterwards `[0, len)` holds exactly the live entities. Live entities
    /// may be renumbered; their component values move with them.
    /// **Every previously returned `EntityId` is invalidated.**
    pub fn cleanup(&mut self) -> CompactionReport {
        let report = self.entities.compact();
        if report.reclaimed > 0 {
            tracing::debug!(
                reclaimed = report.reclaimed,
                live = report.live,
                "Compacted entity table"
            );
        }
        report
    }

    // =========================================================================
    // Components and tags
    // =========================================================================

    /// Stores `component` for `id` and sets its membership bit.
    ///
    /// Overwrites any previous value. No-op if `id` is not alive.
    ///
    /// # Arguments
    /// * `id` - Entity receiving the component
    /// * `component` - Value stored in the entity's data slot
    pub fn add_component<C: ComponentOf<R>>(&mut self, id: EntityId, component: C) {
        self.add_component_with(id, || component);
    }

    /// As [`Manager::add_component`], constructing the value only if `id` is
    /// alive.
    ///
    /// # Arguments
    /// * `id` - Entity receiving the component
    /// * `make` - Builds the value; not called for dead or out-of-range ids
    pub fn add_component_with<C, F>(&mut self, id: EntityId, make: F)
    where
        C: ComponentOf<R>,
        F: FnOnce() -> C,
    {
        let Some(record) = self.entities.live_record_mut(id) else {
            return;
        };
        let slot = record.data_slot;
        if let Some(column) = self.columns.column_mut::<C>() {
            if column.set(slot, make()) {
                record.membership.set_component::<C>(true);
            }
        }
    }

    /// Clears the membership bit of `C`. The stored value is left in place.
    ///
    /// No-op if `id` is not alive.
    ///
    /// # Arguments
    /// * `id` - Entity losing the component
    pub fn remove_component<C: ComponentOf<R>>(&mut self, id: EntityId) {
        if let Some(record) = self.entities.live_record_mut(id) {
            record.membership.set_component::<C>(false);
        }
    }

    /// Returns `true` if the membership bit of `C` is set for `id`.
    ///
    /// Soft-deleted entities keep their bits until [`Manager::cleanup`].
    ///
    /// # Arguments
    /// * `id` - Entity to test; `false` if beyond capacity
    #[inline]
    #[must_use]
    pub fn has_component<C: ComponentOf<R>>(&self, id: EntityId) -> bool {
        self.entities
            .record(id)
            .is_some_and(|record| record.membership.has_component::<C>())
    }

    /// Sets the membership bit of tag `T`. No-op if `id` is not alive.
    ///
    /// # Arguments
    /// * `id` - Entity to tag
    pub fn add_tag<T: TagOf<R>>(&mut self, id: EntityId) {
        if let Some(record) = self.entities.live_record_mut(id) {
            record.membership.set_tag::<T>(true);
        }
    }

    /// Clears the membership bit of tag `T`. No-op if `id` is not alive.
    ///
    /// # Arguments
    /// * `id` - Entity to untag
    pub fn remove_tag<T: TagOf<R>>(&mut self, id: EntityId) {
        if let Some(record) = self.entities.live_record_mut(id) {
            record.membership.set_tag::<T>(false);
        }
    }

    /// Returns `true` if the membership bit of tag `T` is set for `id`.
    ///
    /// # Arguments
    /// * `id` - Entity to test; `false` if beyond capacity
    #[inline]
    #[must_use]
    pub fn has_tag<T: TagOf<R>>(&self, id: EntityId) -> bool {
        self.entities
            .record(id)
            .is_some_and(|record| record.membership.has_tag::<T>())
    }

    /// The stored `C` at `id`'s data slot, mutably.
    ///
    /// Checks neither liveness nor membership: the value may be a default or
    /// a stale leftover. Returns `None` only if `id` is beyond capacity.
    ///
    /// # Arguments
    /// * `id` - Entity whose data slot is read
    pub fn get_entity_data<C: ComponentOf<R>>(&mut self, id: EntityId) -> Option<&mut C> {
        let slot = self.entities.record(id)?.data_slot;
        self.columns.column_mut::<C>()?.get_mut(slot)
    }

    /// Same as [`Manager::get_entity_data`].
    pub fn get_entity_component<C: ComponentOf<R>>(&mut self, id: EntityId) -> Option<&mut C> {
        self.get_entity_data(id)
    }

    /// Shared-reference form of [`Manager::get_entity_data`].
    #[must_use]
    pub fn entity_data<C: ComponentOf<R>>(&self, id: EntityId) -> Option<&C> {
        let slot = self.entities.record(id)?.data_slot;
        self.columns.column::<C>()?.get(slot)
    }

    // =========================================================================
    // Matching
    // =========================================================================

    /// Calls `callback` for every live entity whose membership contains the
    /// bits of `S`, in ascending ID order.
    ///
    /// The callback receives the entity ID and `&mut` to each component of
    /// `S`, in declaration order. Tags only filter.
    ///
    /// # Arguments
    /// * `callback` - Called once per matching entity
    ///
    /// # Returns
    ///
    /// The number of entities visited.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if `S` names a component twice,
    /// [`EcsError::SignatureOrder`] if `S` lists components out of
    /// declaration order. Nothing is visited in either case.
    pub fn for_matching_signature<S, F>(&mut self, mut callback: F) -> EcsResult<usize>
    where
        S: Signature<R>,
        F: MatchFn<R, S::Components>,
    {
        S::validate()?;
        let query = S::bitset();
        run_matching::<R, S::Components, F>(&self.entities, &mut self.columns, &query, &mut callback)
    }

    /// Stores `callback` to run against entities matching `S` on every
    /// [`Manager::call_for_matching_functions`].
    ///
    /// # Arguments
    /// * `callback` - Called once per matching entity on each replay
    ///
    /// # Returns
    ///
    /// The id to replay or remove this matcher with.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if `S` names a component twice,
    /// [`EcsError::SignatureOrder`] if `S` lists components out of
    /// declaration order. Nothing is stored in either case.
    pub fn add_for_matching_function<S, F>(&mut self, callback: F) -> EcsResult<MatcherId>
    where
        S: Signature<R> + 'static,
        F: MatchFn<R, S::Components> + 'static,
    {
        self.matchers.register::<S, F>(callback)
    }

    /// Runs every stored matcher, in registration order, against the
    /// current entities.
    ///
    /// # Returns
    ///
    /// Total callback invocations.
    ///
    /// # Errors
    ///
    /// The first error a matcher raises.
    pub fn call_for_matching_functions(&mut self) -> EcsResult<usize> {
        self.matchers.call_all(&self.entities, &mut self.columns)
    }

    /// Runs one stored matcher.
    ///
    /// # Arguments
    /// * `id` - Id returned by [`Manager::add_for_matching_function`]
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownMatcher`] if `id` is not registered.
    pub fn call_for_matching_function(&mut self, id: MatcherId) -> EcsResult<usize> {
        self.matchers.call_one(id, &self.entities, &mut self.columns)
    }

    /// Removes one stored matcher.
    ///
    /// # Arguments
    /// * `id` - Id returned by [`Manager::add_for_matching_function`]
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownMatcher`] if `id` is not registered.
    pub fn remove_for_matching_function(&mut self, id: MatcherId) -> EcsResult<()> {
        self.matchers.remove(id)
    }

    /// Removes every stored matcher.
    pub fn clear_for_matching_functions(&mut self) {
        self.matchers.clear();
    }

    /// Number of stored matchers.
    #[inline]
    #[must_use]
    pub fn for_matching_function_count(&self) -> usize {
        self.matchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Label(String);

    struct Hidden;

    ec_meta::registry! {
        struct Game {
            components: [Position, Label],
            tags: [Hidden],
        }
    }

    fn small() -> Manager<Game> {
        Manager::with_config(ManagerConfig {
            initial_capacity: 2,
            grow_amount: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_new_manager_defaults() {
        let manager = Manager::<Game>::new();
        assert_eq!(manager.capacity(), 256);
        assert_eq!(manager.config().grow_amount, 256);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_with_config_rejects_zero_growth() {
        let result = Manager::<Game>::with_config(ManagerConfig {
            initial_capacity: 4,
            grow_amount: 0,
        });
        assert!(matches!(result, Err(EcsError::InvalidConfig(_))));
    }

    #[test]
    fn test_add_entity_grows_by_increment() {
        let mut manager = small();
        let ids: Vec<_> = (0..4).map(|_| manager.add_entity()).collect();

        assert_eq!(ids, (0..4).map(EntityId::new).collect::<Vec<_>>());
        assert_eq!(manager.capacity(), 5);
        assert_eq!(manager.len(), 4);
        assert!(ids.iter().all(|&id| manager.is_alive(id)));
    }

    #[test]
    fn test_zero_initial_capacity_grows_on_first_add() {
        let mut manager = Manager::<Game>::with_config(ManagerConfig {
            initial_capacity: 0,
            grow_amount: 1,
        })
        .unwrap();
        let id = manager.add_entity();
        manager.add_component(id, Label("only".into()));
        assert_eq!(manager.entity_data::<Label>(id), Some(&Label("only".into())));
    }

    #[test]
    fn test_components_soft_fail_on_dead() {
        let mut manager = small();
        let id = manager.add_entity();
        manager.delete_entity(id);

        manager.add_component(id, Position { x: 1.0, y: 1.0 });
        manager.add_tag::<Hidden>(id);
        assert!(!manager.has_component::<Position>(id));
        assert!(!manager.has_tag::<Hidden>(id));

        manager.add_component(EntityId::new(1000), Position::default());
        manager.delete_entity(EntityId::new(1000));
    }

    #[test]
    fn test_add_component_with_is_lazy() {
        let mut manager = small();
        let id = manager.add_entity();
        manager.delete_entity(id);

        let mut built = false;
        manager.add_component_with(id, || {
            built = true;
            Label("never".into())
        });
        assert!(!built);
    }

    #[test]
    fn test_remove_component_keeps_value() {
        let mut manager = small();
        let id = manager.add_entity();
        manager.add_component(id, Label("stale".into()));
        manager.remove_component::<Label>(id);

        assert!(!manager.has_component::<Label>(id));
        assert_eq!(manager.entity_data::<Label>(id), Some(&Label("stale".into())));
    }

    #[test]
    fn test_get_entity_data_is_unchecked() {
        let mut manager = small();
        let id = manager.add_entity();

        let pos = manager.get_entity_data::<Position>(id).unwrap();
        pos.x = 9.0;
        assert!(!manager.has_component::<Position>(id));
        assert_eq!(manager.get_entity_component::<Position>(id).unwrap().x, 9.0);

        // Beyond the current size but within capacity.
        assert!(manager.entity_data::<Position>(EntityId::new(1)).is_some());
        assert!(manager.entity_data::<Position>(EntityId::new(2)).is_none());
    }

    #[test]
    fn test_entity_info_bounds() {
        let mut manager = small();
        let id = manager.add_entity();
        manager.add_tag::<Hidden>(id);

        let info = manager.entity_info(id).unwrap();
        assert!(info.is_alive());
        assert_eq!(info.data_slot(), 0);
        assert!(info.membership().has_tag::<Hidden>());

        assert!(manager.entity_info(EntityId::new(1)).is_ok());
        assert_eq!(
            manager.entity_info(EntityId::new(2)).unwrap_err(),
            EcsError::EntityOutOfRange { id: 2, capacity: 2 }
        );
    }

    #[test]
    fn test_cleanup_report() {
        let mut manager = small();
        let a = manager.add_entity();
        let b = manager.add_entity();
        manager.add_component(b, Label("b".into()));
        manager.delete_entity(a);

        let report = manager.cleanup();
        assert_eq!(report, CompactionReport { reclaimed: 1, live: 1 });
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.entity_data::<Label>(EntityId::new(0)), Some(&Label("b".into())));
    }

    #[test]
    fn test_for_matching_signature_tag_filter() {
        let mut manager = small();
        let shown = manager.add_entity();
        let hidden = manager.add_entity();
        manager.add_component(shown, Position::default());
        manager.add_component(hidden, Position::default());
        manager.add_tag::<Hidden>(hidden);

        let mut seen = Vec::new();
        let visited = manager
            .for_matching_signature::<crate::WithTags<(Position,), (Hidden,)>, _>(
                |id: EntityId, _: &mut Position| seen.push(id),
            )
            .unwrap();
        assert_eq!(visited, 1);
        assert_eq!(seen, vec![hidden]);
    }

    #[test]
    fn test_deferred_matchers_lifecycle() {
        let mut manager = small();
        let id = manager.add_entity();
        manager.add_component(id, Position::default());

        let matcher = manager
            .add_for_matching_function::<(Position,), _>(|_: EntityId, pos: &mut Position| {
                pos.y += 1.0;
            })
            .unwrap();
        assert_eq!(manager.for_matching_function_count(), 1);

        assert_eq!(manager.call_for_matching_functions().unwrap(), 1);
        assert_eq!(manager.call_for_matching_function(matcher).unwrap(), 1);
        assert_eq!(manager.entity_data::<Position>(id).unwrap().y, 2.0);

        manager.remove_for_matching_function(matcher).unwrap();
        assert_eq!(manager.call_for_matching_functions().unwrap(), 0);

        manager.add_for_matching_function::<(), _>(|_: EntityId| {}).unwrap();
        manager.clear_for_matching_functions();
        assert_eq!(manager.for_matching_function_count(), 0);
    }
}
