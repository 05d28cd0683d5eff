//! Strata engine crate.
//!
//! GPU-resident geometry buffer cache: mesh data in, device vertex/index
//! buffers out, keyed per canvas, evicted least-recently-used first under
//! memory pressure. A per-traversal render stack lets index-only geometry
//! inherit vertex data from an ancestor.

pub mod cache;
pub mod device;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod render;
pub mod time;

pub mod logging;

pub use cache::{CacheConfig, CacheStats, ContextOf, GeometryCache, LifecycleEvent};
pub use error::CacheError;
pub use geometry::{MeshData, Primitive};
pub use render::{GeometryBinder, RenderContext, ResolvedGeometry};
