//! # EC Core
//!
//! Entity/component storage and signature matching engine.
//!
//! - Entities are created, soft-deleted and reclaimed in bulk by `cleanup`
//! - Each declared component type lives in its own dense column
//! - A membership bitset per entity drives superset queries
//! - Queries run immediately or are stored and replayed each tick
//!
//! ## Example
//!
//! ```rust
//! use ec_core::{registry, EntityId, Manager, WithTags};
//!
//! #[derive(Debug, Default, Clone, Copy, PartialEq)]
//! struct Position(f32);
//! #[derive(Debug, Default, Clone, Copy, PartialEq)]
//! struct Velocity(f32);
//! struct Frozen;
//!
//! registry! {
//!     struct Game {
//!         components: [Position, Velocity],
//!         tags: [Frozen],
//!     }
//! }
//!
//! let mut manager = Manager::<Game>::new();
//! let moving = manager.add_entity();
//! manager.add_component(moving, Position(0.0));
//! manager.add_component(moving, Velocity(2.0));
//!
//! let frozen = manager.add_entity();
//! manager.add_component(frozen, Position(5.0));
//! manager.add_component(frozen, Velocity(2.0));
//! manager.add_tag::<Frozen>(frozen);
//!
//! let moved = manager
//!     .for_matching_signature::<(Position, Velocity), _>(
//!         |_: EntityId, pos: &mut Position, vel: &mut Velocity| pos.0 += vel.0,
//!     )
//!     .unwrap();
//! assert_eq!(moved, 2);
//!
//! let frozen_count = manager
//!     .for_matching_signature::<WithTags<(), (Frozen,)>, _>(|_: EntityId| {})
//!     .unwrap();
//! assert_eq!(frozen_count, 1);
//!
//! manager.delete_entity(moving);
//! manager.cleanup();
//! assert_eq!(manager.len(), 1);
//! assert_eq!(manager.entity_data::<Position>(EntityId::new(0)), Some(&Position(7.0)));
//! ```
//!
//! ## Entity ID Stability
//!
//! `cleanup` renumbers live entities. IDs obtained before a cleanup must not
//! be used after it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::{ManagerConfig, DEFAULT_GROW_AMOUNT, DEFAULT_INITIAL_CAPACITY};
pub use ec_meta::{registry, ComponentOf, Member, Registry, TagOf, TypeSet};
pub use ecs::{
    Bitset, CompactionReport, ComponentColumns, ComponentQuery, ComponentStorage, EntityId,
    EntityRecord, EntityTable, ErasedStorage, MatchFn, Manager, MatcherId, MatcherRegistry,
    Signature, WithTags,
};
pub use error::{EcsError, EcsResult};
