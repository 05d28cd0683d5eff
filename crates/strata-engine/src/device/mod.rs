//! Device layer.
//!
//! This module is responsible for:
//! - the `GpuDevice` allocation contract and its two backends (wgpu, host memory)
//! - the `DeviceBuffer` handle with explicit, idempotent destruction
//! - canvases: device + presence check, partitioning geometry per surface

mod backend;
mod buffer;
mod canvas;
mod error;
mod gpu;
mod host;
mod init;

pub use backend::GpuDevice;
pub use buffer::{BufferDescriptor, BufferHandle, BufferKind, DeviceBuffer, UsageHint};
pub use canvas::{Canvas, CanvasId, CanvasLease, CanvasPresence, DeviceCanvas};
pub use error::AllocationError;
pub use gpu::WgpuDevice;
pub use host::{HostBuffer, HostDevice, HostDeviceStats};
pub use init::DeviceInit;
