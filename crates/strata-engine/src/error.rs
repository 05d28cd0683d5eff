//! Error types returned by the cache.

use thiserror::Error;

use crate::device::AllocationError;

/// Errors surfaced by [`GeometryCache`](crate::cache::GeometryCache).
///
/// All are reported synchronously to the immediate caller. A failed create
/// leaves no trace in the table, so retrying is safe.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CacheError {
    /// Mesh data has no `primitive` field.
    #[error("geometry {key:?} has no `primitive` field")]
    MissingPrimitive { key: String },

    /// Primitive name outside the recognized set.
    #[error("geometry {key:?}: unsupported primitive {name:?}")]
    UnsupportedPrimitive { key: String, name: String },

    /// Device allocation failed, after eviction where that could help.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Operation needs an active canvas and none is set.
    #[error("no canvas is active")]
    NoActiveCanvas,

    /// Push of a key that is unknown or was evicted. Callers must check
    /// `exists` and recreate before pushing.
    #[error("geometry {key:?} does not exist on the active canvas")]
    MissingGeometry { key: String },
}

pub type Result<T> = std::result::Result<T, CacheError>;
