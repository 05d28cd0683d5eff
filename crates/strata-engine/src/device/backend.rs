use super::{AllocationError, BufferDescriptor};

/// Device-side buffer allocator.
///
/// Implementations report allocation failures instead of panicking so the
/// memory-pressure protocol can evict and retry. Methods take `&self`; the
/// cache is single-threaded and backends use interior mutability for
/// bookkeeping.
pub trait GpuDevice {
    /// Backend buffer object.
    type Buffer;

    /// Allocates a buffer initialized with `desc.contents`.
    fn create_buffer(&self, desc: &BufferDescriptor<'_>) -> Result<Self::Buffer, AllocationError>;

    /// Releases a buffer. Called at most once per buffer.
    fn destroy_buffer(&self, buffer: Self::Buffer);
}
