//! Geometry records and per-canvas tables.
//!
//! Responsibilities:
//! - describe incoming mesh data and its primitive type
//! - hold the device buffers of one geometry (`GeometryRecord`)
//! - map resource keys to records per canvas, including key allocation
//! - roll back partially-built buffer sets on failure

mod mesh;
mod pending;
mod primitive;
mod record;
mod table;

pub use mesh::MeshData;
pub(crate) use pending::PendingBuffers;
pub use primitive::{ParsePrimitiveError, Primitive};
pub use record::{GeometryBuffers, GeometryRecord};
pub use table::{BufferOf, GeometryTable, SlotState};
