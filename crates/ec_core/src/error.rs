//! # Error Types
//!
//! Entity mutations never fail: operations on dead or out-of-range entities
//! are silent no-ops. Errors are reserved for lookups that exist to learn
//! validity, for malformed query signatures and for configuration.

use thiserror::Error;

/// Errors that can occur in the storage engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity index beyond the table's capacity.
    #[error("entity {id} out of range: capacity {capacity}")]
    EntityOutOfRange {
        /// The requested entity index.
        id: usize,
        /// Current table capacity.
        capacity: usize,
    },

    /// A signature names the same component more than once.
    #[error("signature names the same component more than once")]
    OverlappingSignature,

    /// A signature lists its components out of declaration order.
    #[error("signature components must follow declaration order: {component} is out of place")]
    SignatureOrder {
        /// Slot index of the first component listed after a later-declared one.
        component: usize,
    },

    /// A component index has no storage column.
    #[error("no component storage at index {index}")]
    UnknownComponent {
        /// The component slot index.
        index: usize,
    },

    /// The storage column at a component's index holds a different type.
    #[error("storage column does not hold component {component}")]
    StorageMismatch {
        /// Type name of the requested component.
        component: &'static str,
    },

    /// No deferred matcher registered under this id.
    #[error("matcher not found: {0}")]
    UnknownMatcher(u64),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration {path}: {reason}")]
    ConfigRead {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },
}

/// Result type for storage engine operations.
pub type EcsResult<T> = Result<T, EcsError>;
