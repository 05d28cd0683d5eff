use core::cell::Cell;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use super::{AllocationError, BufferDescriptor, BufferKind, DeviceInit, GpuDevice, UsageHint};

/// wgpu-backed geometry device.
///
/// Owns the logical device and queue. Buffer bytes are tracked against an
/// optional budget so over-budget uploads surface as
/// [`AllocationError::OutOfMemory`].
pub struct WgpuDevice {
    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Byte budget for live buffers.
    budget: Option<u64>,

    /// Bytes currently allocated through this device.
    in_use: Cell<u64>,
}

impl WgpuDevice {
    /// Wraps an existing device/queue pair.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, memory_budget: Option<u64>) -> Self {
        Self {
            device,
            queue,
            budget: memory_budget,
            in_use: Cell::new(0),
        }
    }

    /// Creates a device without a surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new_headless(init: DeviceInit) -> Result<Self> {
        let DeviceInit {
            power_preference,
            required_features,
            required_limits,
            memory_budget,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("strata-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("headless device on {:?}", adapter.get_info().name);

        Ok(Self::new(device, queue, memory_budget))
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Bytes held by live geometry buffers.
    pub fn bytes_in_use(&self) -> u64 {
        self.in_use.get()
    }
}

fn buffer_usages(kind: BufferKind, usage: UsageHint) -> wgpu::BufferUsages {
    let base = if kind.is_index() {
        wgpu::BufferUsages::INDEX
    } else {
        wgpu::BufferUsages::VERTEX
    };
    match usage {
        UsageHint::Static => base,
        UsageHint::Dynamic => base | wgpu::BufferUsages::COPY_DST,
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;

    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<wgpu::Buffer, AllocationError> {
        let size = desc.contents.len() as u64;

        let limit = self.device.limits().max_buffer_size;
        if size > limit {
            return Err(AllocationError::TooLarge {
                label: desc.label.to_string(),
                size,
                limit,
            });
        }

        if let Some(budget) = self.budget {
            if self.in_use.get() + size > budget {
                return Err(AllocationError::OutOfMemory {
                    label: desc.label.to_string(),
                    size,
                });
            }
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: desc.contents,
                usage: buffer_usages(desc.kind, desc.usage),
            });

        self.in_use.set(self.in_use.get() + buffer.size());
        Ok(buffer)
    }

    fn destroy_buffer(&self, buffer: wgpu::Buffer) {
        self.in_use.set(self.in_use.get().saturating_sub(buffer.size()));
        buffer.destroy();
    }
}
