use std::rc::Rc;

use crate::device::{BufferKind, DeviceBuffer, GpuDevice};

use super::GeometryBuffers;

/// Buffers allocated by an in-progress create call.
///
/// Dropping the guard without [`commit`](Self::commit) destroys every buffer
/// it holds, so a failed create never leaks device memory.
pub(crate) struct PendingBuffers<'d, D: GpuDevice> {
    device: &'d D,
    label: &'d str,
    buffers: GeometryBuffers<D::Buffer>,
}

impl<'d, D: GpuDevice> PendingBuffers<'d, D> {
    pub(crate) fn new(device: &'d D, label: &'d str) -> Self {
        Self {
            device,
            label,
            buffers: GeometryBuffers::default(),
        }
    }

    pub(crate) fn push(&mut self, kind: BufferKind, buffer: DeviceBuffer<D::Buffer>) {
        debug_assert_eq!(buffer.kind(), kind);
        let slot = self.buffers.slot_mut(kind);
        debug_assert!(slot.is_none(), "{kind} buffer allocated twice");
        *slot = Some(Rc::new(buffer));
    }

    /// Hands the buffers over; nothing is destroyed.
    pub(crate) fn commit(mut self) -> GeometryBuffers<D::Buffer> {
        std::mem::take(&mut self.buffers)
    }
}

impl<D: GpuDevice> Drop for PendingBuffers<'_, D> {
    fn drop(&mut self) {
        if self.buffers.is_empty() {
            return;
        }
        let released = self.buffers.destroy(self.device);
        log::warn!("{}: rolled back {released} partially allocated buffers", self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{BufferDescriptor, HostBuffer, HostDevice, UsageHint};

    fn alloc(device: &HostDevice, kind: BufferKind) -> DeviceBuffer<HostBuffer> {
        let values = [0.0f32; 6];
        let storage = device
            .create_buffer(&BufferDescriptor {
                label: "pending",
                kind,
                usage: UsageHint::Static,
                contents: bytemuck::cast_slice(&values),
            })
            .unwrap();
        DeviceBuffer::new(kind, 6, UsageHint::Static, storage)
    }

    #[test]
    fn dropping_rolls_back() {
        let device = HostDevice::new();
        {
            let mut pending = PendingBuffers::new(&device, "geo");
            pending.push(BufferKind::Vertex, alloc(&device, BufferKind::Vertex));
            pending.push(BufferKind::Uv, alloc(&device, BufferKind::Uv));
        }
        let stats = device.stats();
        assert_eq!(stats.created, 2);
        assert_eq!(stats.destroyed, 2);
        assert_eq!(stats.bytes_in_use, 0);
    }

    #[test]
    fn commit_keeps_buffers() {
        let device = HostDevice::new();
        let mut pending = PendingBuffers::new(&device, "geo");
        pending.push(BufferKind::Vertex, alloc(&device, BufferKind::Vertex));
        let buffers = pending.commit();

        assert!(buffers.vertex.is_some());
        assert_eq!(device.stats().destroyed, 0);
    }
}
