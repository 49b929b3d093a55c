//! # Registry Declaration
//!
//! [`Registry`] describes one closed set of component and tag types.
//! [`Member`] gives every declared type its slot. Both are normally
//! implemented by the [`registry!`](crate::registry) macro.

use crate::bits::BitBlock;
use crate::type_set::{ComponentSet, TagSet};

/// A closed list of component types followed by a closed list of tag types.
pub trait Registry: Sized + 'static {
    /// Component types, in declaration order.
    type Components: ComponentSet<Self>;

    /// Tag types, in declaration order.
    type Tags: TagSet<Self>;

    /// Word storage for a membership bitset of [`Registry::WIDTH`] bits.
    type Words: BitBlock;

    /// Number of declared component types.
    const COMPONENT_COUNT: usize;

    /// Number of declared tag types.
    const TAG_COUNT: usize;

    /// Total bit width: components first, then tags.
    const WIDTH: usize = Self::COMPONENT_COUNT + Self::TAG_COUNT;
}

/// A type declared in registry `R`.
pub trait Member<R: Registry>: 'static {
    /// Global bit index of this type.
    ///
    /// Components use `[0, COMPONENT_COUNT)`, tags use
    /// `[COMPONENT_COUNT, WIDTH)`.
    const INDEX: usize;
}

/// A component of registry `R`.
///
/// Components are default-constructible: storage slots are filled with
/// `Default::default()` when the entity table grows.
pub trait ComponentOf<R: Registry>: Member<R> + Default {}

/// A tag of registry `R`. Tags carry no data.
pub trait TagOf<R: Registry>: Member<R> {}

/// Declares a registry type and assigns every listed type its slot.
///
/// ```rust
/// #[derive(Default)]
/// pub struct Health(u32);
/// pub struct Player;
///
/// ec_meta::registry! {
///     pub struct Sim {
///         components: [Health],
///         tags: [Player],
///     }
/// }
/// ```
///
/// The generated struct derives `Clone`, `Copy`, `Debug`, `Default`,
/// `PartialEq`, `Eq` and `Hash`. A type may be listed only once across both
/// lists. Listed types must be at least as visible as the registry struct,
/// since they appear in its `Registry` impl.
#[macro_export]
macro_rules! registry {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            components: [$($component:ty),* $(,)?],
            tags: [$($tag:ty),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::Registry for $name {
            type Components = ($($component,)*);
            type Tags = ($($tag,)*);
            type Words = [u64; $crate::words_for(
                $crate::__count!($($component)*) + $crate::__count!($($tag)*)
            )];
            const COMPONENT_COUNT: usize = $crate::__count!($($component)*);
            const TAG_COUNT: usize = $crate::__count!($($tag)*);
        }

        $crate::__members!($name, ComponentOf, 0usize; $($component),*);
        $crate::__members!($name, TagOf, $crate::__count!($($component)*); $($tag),*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __count {
    () => { 0usize };
    ($head:tt $($tail:tt)*) => { 1usize + $crate::__count!($($tail)*) };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __members {
    ($registry:ident, $kind:ident, $index:expr; ) => {};
    ($registry:ident, $kind:ident, $index:expr; $head:ty $(, $rest:ty)*) => {
        impl $crate::Member<$registry> for $head {
            const INDEX: usize = $index;
        }
        impl $crate::$kind<$registry> for $head {}
        $crate::__members!($registry, $kind, $index + 1; $($rest),*);
    };
}
