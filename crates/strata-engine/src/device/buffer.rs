use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use super::GpuDevice;

/// Which mesh attribute a buffer carries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    Vertex,
    Normal,
    Uv,
    Uv2,
    Index,
}

impl BufferKind {
    /// Number of scalar values grouped into one element.
    ///
    /// Index buffers use 3 regardless of primitive type (indices are grouped
    /// per triangle). Draw collaborators that need the exact index count
    /// should use [`DeviceBuffer::value_count`].
    #[inline]
    pub const fn item_size(self) -> u32 {
        match self {
            Self::Vertex | Self::Normal | Self::Index => 3,
            Self::Uv | Self::Uv2 => 2,
        }
    }

    #[inline]
    pub const fn is_index(self) -> bool {
        matches!(self, Self::Index)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Normal => "normal",
            Self::Uv => "uv",
            Self::Uv2 => "uv2",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected update frequency of a buffer's contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum UsageHint {
    /// Uploaded once, drawn many times.
    #[default]
    Static,
    /// Rewritten from the CPU between draws.
    Dynamic,
}

/// Allocation request handed to a [`GpuDevice`].
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub usage: UsageHint,
    pub contents: &'a [u8],
}

/// Shared handle to a device buffer.
///
/// Records own their buffers; resolved views that inherit vertex data hold
/// extra references to the ancestor's handles.
pub type BufferHandle<B> = Rc<DeviceBuffer<B>>;

/// A single typed device buffer with explicit, idempotent destruction.
///
/// The underlying storage is released at most once: either through
/// [`destroy`](Self::destroy) (device teardown) or by dropping the last
/// handle after the device context is gone.
pub struct DeviceBuffer<B> {
    kind: BufferKind,
    value_count: u32,
    usage: UsageHint,
    storage: RefCell<Option<B>>,
}

impl<B> DeviceBuffer<B> {
    pub fn new(kind: BufferKind, value_count: u32, usage: UsageHint, storage: B) -> Self {
        Self {
            kind,
            value_count,
            usage,
            storage: RefCell::new(Some(storage)),
        }
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn usage(&self) -> UsageHint {
        self.usage
    }

    #[inline]
    pub fn item_size(&self) -> u32 {
        self.kind.item_size()
    }

    /// Number of scalar values uploaded.
    #[inline]
    pub fn value_count(&self) -> u32 {
        self.value_count
    }

    /// Number of `item_size` groups (`value_count / item_size`, truncated).
    #[inline]
    pub fn element_count(&self) -> u32 {
        self.value_count / self.item_size()
    }

    pub fn is_destroyed(&self) -> bool {
        self.storage.borrow().is_none()
    }

    /// Runs `f` against the live storage; `None` once destroyed.
    pub fn with_storage<R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        self.storage.borrow().as_ref().map(f)
    }

    /// Releases the storage through `device`.
    ///
    /// Returns `false` if the buffer was already destroyed.
    pub fn destroy<D>(&self, device: &D) -> bool
    where
        D: GpuDevice<Buffer = B> + ?Sized,
    {
        let Some(storage) = self.storage.borrow_mut().take() else {
            return false;
        };
        device.destroy_buffer(storage);
        true
    }
}

impl<B> fmt::Debug for DeviceBuffer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("kind", &self.kind)
            .field("value_count", &self.value_count)
            .field("usage", &self.usage)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GpuDevice, HostBuffer, HostDevice};

    fn alloc(device: &HostDevice, kind: BufferKind, values: &[f32]) -> DeviceBuffer<HostBuffer> {
        let storage = device
            .create_buffer(&BufferDescriptor {
                label: "test",
                kind,
                usage: UsageHint::Static,
                contents: bytemuck::cast_slice(values),
            })
            .unwrap();
        DeviceBuffer::new(kind, values.len() as u32, UsageHint::Static, storage)
    }

    #[test]
    fn item_sizes() {
        assert_eq!(BufferKind::Vertex.item_size(), 3);
        assert_eq!(BufferKind::Normal.item_size(), 3);
        assert_eq!(BufferKind::Uv.item_size(), 2);
        assert_eq!(BufferKind::Uv2.item_size(), 2);
        assert_eq!(BufferKind::Index.item_size(), 3);
    }

    #[test]
    fn element_count_groups_values() {
        let device = HostDevice::new();
        let buf = alloc(&device, BufferKind::Uv, &[0.0; 8]);
        assert_eq!(buf.value_count(), 8);
        assert_eq!(buf.element_count(), 4);
    }

    #[test]
    fn destroy_is_idempotent() {
        let device = HostDevice::new();
        let buf = alloc(&device, BufferKind::Vertex, &[1.0, 2.0, 3.0]);

        assert!(buf.destroy(&device));
        assert!(buf.is_destroyed());
        assert!(!buf.destroy(&device));
        assert_eq!(device.stats().destroyed, 1);
        assert!(buf.with_storage(|_| ()).is_none());
    }
}
