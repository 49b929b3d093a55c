//! # Type Sets
//!
//! Tuples of registry members, used as compile-time sets.
//!
//! - [`TypeSet`]: any members (components and tags mixed)
//! - [`ComponentSet`]: components only, visitable one type at a time
//! - [`TagSet`]: tags only
//!
//! Implemented for tuples of up to 16 elements. `()` is the empty set.

use crate::registry::{ComponentOf, Member, Registry, TagOf};

/// A compile-time set of members of `R`.
pub trait TypeSet<R: Registry> {
    /// Number of elements.
    const LEN: usize;

    /// Calls `f` with the bit index of every element, in tuple order.
    fn for_each_index<Visit: FnMut(usize)>(f: Visit);

    /// Returns `true` if some element has bit index `index`.
    #[must_use]
    fn contains_index(index: usize) -> bool {
        let mut found = false;
        Self::for_each_index(|i| found |= i == index);
        found
    }

    /// Returns `true` if `T` is an element of this set.
    #[must_use]
    fn contains<T: Member<R>>() -> bool {
        Self::contains_index(T::INDEX)
    }

    /// Returns `true` if every element of this set is also in `S`.
    ///
    /// The empty set is a subset of everything.
    #[must_use]
    fn is_subset_of<S: TypeSet<R>>() -> bool {
        let mut all = true;
        Self::for_each_index(|i| all &= S::contains_index(i));
        all
    }
}

/// Receives each component type of a [`ComponentSet`] in turn.
pub trait ComponentVisitor<R: Registry> {
    /// Called once per component type.
    fn visit<C: ComponentOf<R>>(&mut self);
}

/// A type set whose elements are all components.
pub trait ComponentSet<R: Registry>: TypeSet<R> {
    /// Visits every component type, in tuple order.
    fn for_each_component<V: ComponentVisitor<R>>(visitor: &mut V);
}

/// A type set whose elements are all tags.
pub trait TagSet<R: Registry>: TypeSet<R> {}

/// Slot index of `T` in `R`.
#[inline]
#[must_use]
pub fn index_of<R: Registry, T: Member<R>>() -> usize {
    T::INDEX
}

/// Returns `true` if `T` is an element of `S`.
#[inline]
#[must_use]
pub fn contains<R: Registry, T: Member<R>, S: TypeSet<R>>() -> bool {
    S::contains::<T>()
}

/// Returns `true` if every element of `A` is in `B`.
#[inline]
#[must_use]
pub fn is_subset_of<R: Registry, A: TypeSet<R>, B: TypeSet<R>>() -> bool {
    A::is_subset_of::<B>()
}

/// Visits every component type of `S` with `visitor`.
#[inline]
pub fn for_each_type<R: Registry, S: ComponentSet<R>, V: ComponentVisitor<R>>(visitor: &mut V) {
    S::for_each_component(visitor);
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_type_sets {
    ($($T:ident),*) => {
        impl<R: Registry, $($T: Member<R>),*> TypeSet<R> for ($($T,)*) {
            const LEN: usize = count!($($T)*);

            #[inline]
            #[allow(unused_mut, unused_variables)]
            fn for_each_index<Visit: FnMut(usize)>(mut f: Visit) {
                $(f(<$T as Member<R>>::INDEX);)*
            }
        }

        impl<R: Registry, $($T: ComponentOf<R>),*> ComponentSet<R> for ($($T,)*) {
            #[inline]
            #[allow(unused_variables)]
            fn for_each_component<V: ComponentVisitor<R>>(visitor: &mut V) {
                $(visitor.visit::<$T>();)*
            }
        }

        impl<R: Registry, $($T: TagOf<R>),*> TagSet<R> for ($($T,)*) {}
    };
}

impl_type_sets!();
impl_type_sets!(A);
impl_type_sets!(A, B);
impl_type_sets!(A, B, C);
impl_type_sets!(A, B, C, D);
impl_type_sets!(A, B, C, D, E);
impl_type_sets!(A, B, C, D, E, F);
impl_type_sets!(A, B, C, D, E, F, G);
impl_type_sets!(A, B, C, D, E, F, G, H);
impl_type_sets!(A, B, C, D, E, F, G, H, I);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K, L);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K, L, M);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K, L, M, N);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O);
impl_type_sets!(A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P);
