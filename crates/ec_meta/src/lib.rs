//! # EC Meta
//!
//! The closed type registry consumed by the EC storage engine.
//!
//! An application declares its component types and tag types exactly once:
//!
//! ```rust
//! #[derive(Default)]
//! pub struct Position { x: f32, y: f32 }
//! #[derive(Default)]
//! pub struct Velocity { x: f32, y: f32 }
//! pub struct Frozen;
//!
//! ec_meta::registry! {
//!     /// Everything the simulation knows about.
//!     pub struct Game {
//!         components: [Position, Velocity],
//!         tags: [Frozen],
//!     }
//! }
//!
//! use ec_meta::{index_of, Registry, TypeSet};
//!
//! assert_eq!(index_of::<Game, Position>(), 0);
//! assert_eq!(index_of::<Game, Frozen>(), 2);
//! assert_eq!(Game::WIDTH, 3);
//! assert!(<(Velocity,) as TypeSet<Game>>::is_subset_of::<(Position, Velocity)>());
//! ```
//!
//! ## Slot Layout
//!
//! ```text
//! bit:   0 .. COMPONENT_COUNT            COMPONENT_COUNT .. WIDTH
//!        [ components, declaration order ][ tags, declaration order ]
//! ```
//!
//! The mapping is a bijection fixed at compile time. The storage engine only
//! ever sees the resulting indices, never the mechanism.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

mod bits;
mod registry;
mod type_set;

pub use bits::{words_for, BitBlock};
pub use registry::{ComponentOf, Member, Registry, TagOf};
pub use type_set::{
    contains, for_each_type, index_of, is_subset_of, ComponentSet, ComponentVisitor, TagSet,
    TypeSet,
};
