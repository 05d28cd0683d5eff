use core::cell::Cell;

use super::{AllocationError, BufferDescriptor, BufferKind, GpuDevice};

/// Buffer living in host memory.
#[derive(Debug)]
pub struct HostBuffer {
    id: u64,
    kind: BufferKind,
    bytes: Box<[u8]>,
}

impl HostBuffer {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Allocation counters for a [`HostDevice`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct HostDeviceStats {
    pub created: usize,
    pub destroyed: usize,
    pub failed: usize,
    pub bytes_in_use: u64,
}

impl HostDeviceStats {
    #[inline]
    pub fn live(&self) -> usize {
        self.created - self.destroyed
    }
}

/// CPU-memory device backend.
///
/// Behaves like a device with a fixed memory budget: allocations that would
/// exceed it fail with [`AllocationError::OutOfMemory`]. Failure injection
/// (`fail_after`) makes every allocation past the n-th fail until cleared.
#[derive(Debug, Default)]
pub struct HostDevice {
    budget: Option<u64>,
    next_id: Cell<u64>,
    stats: Cell<HostDeviceStats>,
    fail_after: Cell<Option<usize>>,
}

impl HostDevice {
    /// Unlimited device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Device that can hold at most `bytes` of live buffer data.
    pub fn with_budget(bytes: u64) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    /// Lets `n` more allocations succeed, then fails every following one.
    pub fn fail_after(&self, n: usize) {
        self.fail_after.set(Some(n));
    }

    pub fn clear_failures(&self) {
        self.fail_after.set(None);
    }

    pub fn stats(&self) -> HostDeviceStats {
        self.stats.get()
    }

    fn out_of_memory(&self, desc: &BufferDescriptor<'_>) -> AllocationError {
        let mut stats = self.stats.get();
        stats.failed += 1;
        self.stats.set(stats);
        AllocationError::OutOfMemory {
            label: desc.label.to_string(),
            size: desc.contents.len() as u64,
        }
    }
}

impl GpuDevice for HostDevice {
    type Buffer = HostBuffer;

    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<HostBuffer, AllocationError> {
        match self.fail_after.get() {
            Some(0) => return Err(self.out_of_memory(desc)),
            Some(n) => self.fail_after.set(Some(n - 1)),
            None => {}
        }

        let size = desc.contents.len() as u64;
        let mut stats = self.stats.get();
        if let Some(budget) = self.budget {
            if stats.bytes_in_use + size > budget {
                return Err(self.out_of_memory(desc));
            }
        }

        stats.created += 1;
        stats.bytes_in_use += size;
        self.stats.set(stats);

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        log::trace!("host alloc #{id}: {} ({} bytes)", desc.label, size);

        Ok(HostBuffer {
            id,
            kind: desc.kind,
            bytes: desc.contents.into(),
        })
    }

    fn destroy_buffer(&self, buffer: HostBuffer) {
        let mut stats = self.stats.get();
        stats.destroyed += 1;
        stats.bytes_in_use -= buffer.bytes.len() as u64;
        self.stats.set(stats);
        log::trace!("host free #{}", buffer.id);
    }
}
