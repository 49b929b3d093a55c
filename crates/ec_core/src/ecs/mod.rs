//! # Entity Component Storage
//!
//! Slot-indexed entity table over dense per-type component columns.
//!
//! ## Design Philosophy
//!
//! - Entity IDs are plain table indices, stable until the next cleanup
//! - Each entity record carries a data slot; compaction moves records, never
//!   component values
//! - Deletion is soft; compaction reclaims slots in one pass
//! - Queries are bitset superset tests over the live prefix of the table

mod bitset;
mod entity;
mod manager;
mod matcher;
mod signature;
mod storage;
mod table;

pub use bitset::Bitset;
pub use entity::{EntityId, EntityRecord};
pub use manager::Manager;
pub use matcher::{MatcherId, MatcherRegistry};
pub use signature::{ComponentQuery, MatchFn, Signature, WithTags};
pub use storage::{ComponentColumns, ComponentStorage, ErasedStorage};
pub use table::{CompactionReport, EntityTable};
