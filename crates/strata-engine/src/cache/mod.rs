//! The geometry cache.
//!
//! Ties the pieces together: per-canvas tables, creation with rollback,
//! render-stack pushes with vertex inheritance, LRU eviction, and the
//! lifecycle transitions driven by the traversal orchestrator.

mod config;
mod geometry_cache;
mod lifecycle;
mod tables;

pub use config::CacheConfig;
pub use geometry_cache::{CacheStats, ContextOf, GeometryCache};
pub use lifecycle::LifecycleEvent;
