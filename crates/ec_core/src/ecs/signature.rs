//! # Query Signatures
//!
//! A signature names the components an entity must have (passed to the
//! callback) and the tags it must have (filters only).
//!
//! ```text
//! (Position, Velocity)                        -> components only
//! WithTags<(Position, Velocity), (Frozen,)>   -> components + tag filter
//! WithTags<(), (Frozen,)>                     -> tag filter only
//! ```
//!
//! The component part is split from the tag part in the type, so narrowing
//! a signature to its components costs nothing at runtime.
//!
//! Components must be listed in declaration order. Callbacks receive the
//! entity ID followed by one `&mut` per component, in that order:
//!
//! ```rust,ignore
//! manager.for_matching_signature::<(Position, Velocity), _>(
//!     |id: EntityId, pos: &mut Position, vel: &mut Velocity| { ... },
//! )?;
//! ```

use std::marker::PhantomData;

use ec_meta::{ComponentOf, ComponentSet, Registry, TagSet, TypeSet};

use super::bitset::Bitset;
use super::entity::EntityId;
use super::storage::{downcast_column, ComponentColumns, ComponentStorage};
use super::table::EntityTable;
use crate::error::{EcsError, EcsResult};

/// A component set whose columns can be borrowed together.
///
/// Implemented for tuples of up to 8 components.
pub trait ComponentQuery<R: Registry>: ComponentSet<R> {
    /// One `&mut ComponentStorage<C>` per component, in tuple order.
    type Columns<'a>;

    /// Borrows the column of every component at once.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if a component repeats.
    fn borrow_columns(columns: &mut ComponentColumns<R>) -> EcsResult<Self::Columns<'_>>;
}

/// A callback that can be invoked for entities matching query `Q`.
///
/// Implemented for every `FnMut(EntityId, &mut C1, ..., &mut Cn)` whose
/// component types match `Q`.
pub trait MatchFn<R: Registry, Q: ComponentQuery<R>> {
    /// Invokes the callback with the components stored at `slot`.
    ///
    /// # Returns
    ///
    /// `false` if `slot` is beyond a column, in which case nothing was called.
    fn call(&mut self, id: EntityId, columns: &mut Q::Columns<'_>, slot: usize) -> bool;
}

/// A query: the components handed to the callback plus the tags required.
pub trait Signature<R: Registry> {
    /// Components, in declaration order (callback argument order).
    type Components: ComponentQuery<R>;

    /// Tags the entity must carry.
    type Tags: TagSet<R>;

    /// Bitset with exactly the signature's bits set.
    #[must_use]
    fn bitset() -> Bitset<R> {
        Bitset::of::<Self::Components>() | Bitset::of::<Self::Tags>()
    }

    /// Checks that components are listed once each, in declaration order.
    ///
    /// Callbacks receive components in the order the signature lists them,
    /// so only declaration order is accepted.
    ///
    /// # Errors
    ///
    /// [`EcsError::OverlappingSignature`] if a component repeats, otherwise
    /// [`EcsError::SignatureOrder`] if a component follows one declared
    /// after it.
    fn validate() -> EcsResult<()> {
        let mut seen = Bitset::<R>::new();
        let mut overlapping = false;
        let mut misplaced = None;
        let mut previous = None;
        <Self::Components as TypeSet<R>>::for_each_index(|index| {
            overlapping |= seen.get(index);
            seen.set(index, true);
            if misplaced.is_none() && previous.is_some_and(|last| index < last) {
                misplaced = Some(index);
            }
            previous = Some(index);
        });
        if overlapping {
            return Err(EcsError::OverlappingSignature);
        }
        match misplaced {
            Some(component) => Err(EcsError::SignatureOrder { component }),
            None => Ok(()),
        }
    }
}

/// Signature with components `C` and required tags `T`.
pub struct WithTags<C, T>(PhantomData<fn() -> (C, T)>);

impl<R, C, T> Signature<R> for WithTags<C, T>
where
    R: Registry,
    C: ComponentQuery<R>,
    T: TagSet<R>,
{
    type Components = C;
    type Tags = T;
}

impl<R: Registry> ComponentQuery<R> for () {
    type Columns<'a> = ();

    fn borrow_columns(_columns: &mut ComponentColumns<R>) -> EcsResult<Self::Columns<'_>> {
        Ok(())
    }
}

impl<R: Registry, Func: FnMut(EntityId)> MatchFn<R, ()> for Func {
    #[inline]
    fn call(&mut self, id: EntityId, _columns: &mut (), _slot: usize) -> bool {
        self(id);
        true
    }
}

impl<R: Registry> Signature<R> for () {
    type Components = ();
    type Tags = ();
}

macro_rules! impl_queries {
    ($($T:ident $column:ident),+) => {
        impl<R: Registry, $($T: ComponentOf<R>),+> ComponentQuery<R> for ($($T,)+) {
            type Columns<'a> = ($(&'a mut ComponentStorage<$T>,)+);

            fn borrow_columns(columns: &mut ComponentColumns<R>) -> EcsResult<Self::Columns<'_>> {
                let [$($column),+] = columns.disjoint_mut([$(<$T as ec_meta::Member<R>>::INDEX),+])?;
                Ok(($(downcast_column::<$T>($column)?,)+))
            }
        }

        impl<R, $($T,)+ Func> MatchFn<R, ($($T,)+)> for Func
        where
            R: Registry,
            $($T: ComponentOf<R>,)+
            Func: FnMut(EntityId, $(&mut $T),+),
        {
            #[inline]
            fn call(
                &mut self,
                id: EntityId,
                columns: &mut ($(&mut ComponentStorage<$T>,)+),
                slot: usize,
            ) -> bool {
                let ($($column,)+) = columns;
                if let ($(Some($column),)+) = ($($column.get_mut(slot),)+) {
                    self(id, $($column),+);
                    true
                } else {
                    false
                }
            }
        }

        impl<R: Registry, $($T: ComponentOf<R>),+> Signature<R> for ($($T,)+) {
            type Components = Self;
            type Tags = ();
        }
    };
}

impl_queries!(A a);
impl_queries!(A a, B b);
impl_queries!(A a, B b, C c);
impl_queries!(A a, B b, C c, D d);
impl_queries!(A a, B b, C c, D d, E e);
impl_queries!(A a, B b, C c, D d, E e, F f);
impl_queries!(A a, B b, C c, D d, E e, F f, G g);
impl_queries!(A a, B b, C c, D d, E e, F f, G g, H h);

/// Scans the active range once, calling `callback` for every live entity
/// whose membership contains `query`.
///
/// Entities are visited in ascending ID order. The bound is the table length
/// at entry.
///
/// # Returns
///
/// The number of entities the callback was invoked for.
///
/// # Errors
///
/// As [`ComponentQuery::borrow_columns`].
pub(crate) fn run_matching<R, Q, F>(
    entities: &EntityTable<R>,
    columns: &mut ComponentColumns<R>,
    query: &Bitset<R>,
    callback: &mut F,
) -> EcsResult<usize>
where
    R: Registry,
    Q: ComponentQuery<R>,
    F: MatchFn<R, Q>,
{
    let mut borrowed = Q::borrow_columns(columns)?;
    let mut visited = 0;

    for (index, record) in entities.active().iter().enumerate() {
        if !record.alive || !record.membership.contains(query) {
            continue;
        }
        if callback.call(EntityId::new(index), &mut borrowed, record.data_slot) {
            visited += 1;
        }
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Position(i32);
    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Velocity(i32);
    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Health(u32);
    struct Frozen;
    struct Boss;

    ec_meta::registry! {
        struct Game {
            components: [Position, Velocity, Health],
            tags: [Frozen, Boss],
        }
    }

    fn setup(memberships: &[Bitset<Game>]) -> (EntityTable<Game>, ComponentColumns<Game>) {
        let mut table = EntityTable::new(memberships.len());
        let mut columns = ComponentColumns::new(memberships.len());
        for (index, membership) in memberships.iter().enumerate() {
            let id = table.spawn().unwrap();
            table.record_mut(id).unwrap().membership = *membership;
            let value = i32::try_from(index).unwrap();
            columns.column_mut::<Position>().unwrap().set(index, Position(value));
            columns.column_mut::<Velocity>().unwrap().set(index, Velocity(value * 10));
        }
        (table, columns)
    }

    #[test]
    fn test_signature_bitsets() {
        let plain = <(Position, Velocity) as Signature<Game>>::bitset();
        assert_eq!(plain.iter_ones().collect::<Vec<_>>(), vec![0, 1]);

        let tagged = <WithTags<(Velocity,), (Boss,)> as Signature<Game>>::bitset();
        assert_eq!(tagged.iter_ones().collect::<Vec<_>>(), vec![1, 4]);

        assert!(<() as Signature<Game>>::bitset().is_empty());
    }

    #[test]
    fn test_validate_rejects_repeated_component() {
        assert!(<(Position, Velocity) as Signature<Game>>::validate().is_ok());
        assert_eq!(
            <(Position, Position) as Signature<Game>>::validate(),
            Err(EcsError::OverlappingSignature)
        );
        assert!(<WithTags<(Health,), (Frozen, Frozen)> as Signature<Game>>::validate().is_ok());
    }

    #[test]
    fn test_validate_requires_declaration_order() {
        assert!(<(Position, Health) as Signature<Game>>::validate().is_ok());
        assert!(<(Position, Velocity, Health) as Signature<Game>>::validate().is_ok());
        assert!(<WithTags<(Velocity,), (Boss, Frozen)> as Signature<Game>>::validate().is_ok());

        assert_eq!(
            <(Velocity, Position) as Signature<Game>>::validate(),
            Err(EcsError::SignatureOrder { component: 0 })
        );
        assert_eq!(
            <(Position, Health, Velocity) as Signature<Game>>::validate(),
            Err(EcsError::SignatureOrder { component: 1 })
        );
        assert_eq!(
            <(Velocity, Position, Velocity) as Signature<Game>>::validate(),
            Err(EcsError::OverlappingSignature)
        );
    }

    #[test]
    fn test_borrow_columns_overlap() {
        let mut columns = ComponentColumns::<Game>::new(2);
        assert!(<(Position, Health) as ComponentQuery<Game>>::borrow_columns(&mut columns).is_ok());
        assert!(matches!(
            <(Velocity, Velocity) as ComponentQuery<Game>>::borrow_columns(&mut columns),
            Err(EcsError::OverlappingSignature)
        ));
    }

    #[test]
    fn test_run_matching_superset() {
        let (table, mut columns) = setup(&[
            Bitset::of::<(Position,)>(),
            Bitset::of::<(Position, Velocity)>(),
            Bitset::of::<(Position, Velocity, Frozen)>(),
        ]);

        let query = <(Position, Velocity) as Signature<Game>>::bitset();
        let mut seen = Vec::new();
        let mut callback = |id: EntityId, pos: &mut Position, vel: &mut Velocity| {
            seen.push((id.index(), pos.0, vel.0));
        };
        let visited =
            run_matching::<Game, (Position, Velocity), _>(&table, &mut columns, &query, &mut callback)
                .unwrap();

        assert_eq!(visited, 2);
        assert_eq!(seen, vec![(1, 1, 10), (2, 2, 20)]);
    }

    #[test]
    fn test_run_matching_skips_dead() {
        let (mut table, mut columns) = setup(&[
            Bitset::of::<(Position,)>(),
            Bitset::of::<(Position,)>(),
            Bitset::of::<(Position,)>(),
        ]);
        table.kill(EntityId::new(1));

        let query = <(Position,) as Signature<Game>>::bitset();
        let mut ids = Vec::new();
        let mut callback = |id: EntityId, _: &mut Position| ids.push(id.index());
        run_matching::<Game, (Position,), _>(&table, &mut columns, &query, &mut callback).unwrap();

        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_run_matching_writes_through() {
        let (table, mut columns) = setup(&[Bitset::of::<(Position, Velocity)>()]);

        let query = <(Position, Velocity) as Signature<Game>>::bitset();
        let mut callback = |_: EntityId, pos: &mut Position, vel: &mut Velocity| pos.0 += vel.0;
        run_matching::<Game, (Position, Velocity), _>(&table, &mut columns, &query, &mut callback)
            .unwrap();
        run_matching::<Game, (Position, Velocity), _>(&table, &mut columns, &query, &mut callback)
            .unwrap();

        assert_eq!(columns.column::<Position>().unwrap().get(0), Some(&Position(0)));

        let (table, mut columns) = setup(&[Bitset::new(), Bitset::of::<(Position, Velocity)>()]);
        run_matching::<Game, (Position, Velocity), _>(&table, &mut columns, &query, &mut callback)
            .unwrap();
        assert_eq!(columns.column::<Position>().unwrap().get(1), Some(&Position(11)));
    }

    #[test]
    fn test_run_matching_tag_only() {
        let (table, mut columns) = setup(&[
            Bitset::of::<(Boss,)>(),
            Bitset::of::<(Frozen,)>(),
            Bitset::of::<(Frozen, Boss)>(),
        ]);

        let query = <WithTags<(), (Boss,)> as Signature<Game>>::bitset();
        let mut ids = Vec::new();
        let mut callback = |id: EntityId| ids.push(id.index());
        let visited = run_matching::<Game, (), _>(&table, &mut columns, &query, &mut callback).unwrap();

        assert_eq!(visited, 2);
        assert_eq!(ids, vec![0, 2]);
    }
}
