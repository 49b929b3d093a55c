//! # Component Storage
//!
//! Dense, growable storage for a single component type, plus the
//! per-registry set of columns.
//!
//! The storage uses a dense array strategy:
//! - One slot per entity data slot, filled with `Default::default()`
//! - Access is O(1) via data slot
//! - Slots are never cleared on removal; the membership bit decides whether
//!   a value is meaningful
//!
//! Growing a column may move its buffer. References into a column must not
//! be held across a call that adds entities.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::slice::GetDisjointMutError;

use ec_meta::{ComponentOf, ComponentSet, ComponentVisitor, Registry};

use crate::error::{EcsError, EcsResult};

/// Dense storage for a single component type.
///
/// # Example
///
/// ```rust
/// use ec_core::ComponentStorage;
///
/// let mut storage: ComponentStorage<u32> = ComponentStorage::new(4);
/// storage.set(2, 7);
/// assert_eq!(storage.get(2), Some(&7));
/// ```
#[derive(Debug, Clone)]
pub struct ComponentStorage<C> {
    data: Vec<C>,
}

impl<C: Default> ComponentStorage<C> {
    /// Creates storage with `capacity` default-initialized slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, C::default);
        Self { data }
    }

    /// Grows to `capacity` slots. Never shrinks.
    pub fn grow_to(&mut self, capacity: usize) {
        if capacity > self.data.len() {
            self.data.resize_with(capacity, C::default);
        }
    }
}

impl<C> ComponentStorage<C> {
    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Gets the value in `slot`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&C> {
        self.data.get(slot)
    }

    /// Gets the value in `slot` mutably, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut C> {
        self.data.get_mut(slot)
    }

    /// Overwrites the value in `slot`.
    ///
    /// # Returns
    ///
    /// `true` if the value was stored, `false` if `slot` was out of bounds.
    #[inline]
    pub fn set(&mut self, slot: usize, component: C) -> bool {
        if let Some(existing) = self.data.get_mut(slot) {
            *existing = component;
            true
        } else {
            false
        }
    }

    /// All slots.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// All slots, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }
}

/// Type-erased view of a [`ComponentStorage`], so columns of different types
/// can live in one list.
pub trait ErasedStorage: Any {
    /// Grows to `capacity` slots. Never shrinks.
    fn grow_to(&mut self, capacity: usize);

    /// Number of slots.
    fn capacity(&self) -> usize;

    /// Type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete storage.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete storage.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Default + 'static> ErasedStorage for ComponentStorage<C> {
    fn grow_to(&mut self, capacity: usize) {
        ComponentStorage::grow_to(self, capacity);
    }

    fn capacity(&self) -> usize {
        ComponentStorage::capacity(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One [`ComponentStorage`] per declared component of `R`, in declaration
/// order, all with the same capacity.
pub struct ComponentColumns<R: Registry> {
    columns: Vec<Box<dyn ErasedStorage>>,
    capacity: usize,
    _registry: PhantomData<fn() -> R>,
}

struct ColumnBuilder {
    capacity: usize,
    columns: Vec<Box<dyn ErasedStorage>>,
}

impl<R: Registry> ComponentVisitor<R> for ColumnBuilder {
    fn visit<C: ComponentOf<R>>(&mut self) {
        debug_assert_eq!(self.columns.len(), C::INDEX, "components out of declaration order");
        self.columns.push(Box::new(ComponentStorage::<C>::new(self.capacity)));
    }
}

impl<R: Registry> ComponentColumns<R> {
    /// Creates a column for every declared component with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut builder = ColumnBuilder {
            capacity,
            columns: Vec::with_capacity(R::COMPONENT_COUNT),
        };
        <R::Components as ComponentSet<R>>::for_each_component(&mut builder);
        Self {
            columns: builder.columns,
            capacity,
            _registry: PhantomData,
        }
    }

    /// Slots per column.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the registry declares no components.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Grows every column to `capacity` slots. Never shrinks.
    pub fn grow_to(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        for column in &mut self.columns {
            column.grow_to(capacity);
        }
        self.capacity = capacity;
    }

    /// The storage of component `C`.
    #[must_use]
    pub fn column<C: ComponentOf<R>>(&self) -> Option<&ComponentStorage<C>> {
        self.columns.get(C::INDEX)?.as_any().downcast_ref()
    }

    /// The storage of component `C`, mutably.
    pub fn column_mut<C: ComponentOf<R>>(&mut self) -> Option<&mut ComponentStorage<C>> {
        self.columns.get_mut(C::INDEX)?.as_any_mut().downcast_mut()
    }

    /// Type names of the stored components, in declaration order.
    pub fn component_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.component_name())
    }

    /// Borrows `N` distinct columns at once.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if an index repeats,
    /// [`EcsError::UnknownComponent`] if an index has no column.
    pub(crate) fn disjoint_mut<const N: usize>(
        &mut self,
        indices: [usize; N],
    ) -> EcsResult<[&mut Box<dyn ErasedStorage>; N]> {
        self.columns.get_disjoint_mut(indices).map_err(|e| match e {
            GetDisjointMutError::OverlappingIndices => EcsError::OverlappingSignature,
            _ => EcsError::UnknownComponent {
                index: indices.into_iter().max().unwrap_or_default(),
            },
        })
    }
}

/// Downcasts an erased column to the storage of `C`.
///
/// # Errors
///
/// [`EcsError::StorageMismatch`] if the column stores another type.
pub(crate) fn downcast_column<C: Default + 'static>(
    column: &mut Box<dyn ErasedStorage>,
) -> EcsResult<&mut ComponentStorage<C>> {
    column
        .as_any_mut()
        .downcast_mut()
        .ok_or(EcsError::StorageMismatch {
            component: type_name::<C>(),
        })
}
