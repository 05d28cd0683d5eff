use thiserror::Error;

/// Failure to allocate a device buffer.
///
/// `OutOfMemory` is the only variant an allocation scope retries after
/// evicting; everything else is a hard failure for the request.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AllocationError {
    #[error("out of device memory allocating {label} ({size} bytes)")]
    OutOfMemory { label: String, size: u64 },

    #[error("buffer {label} ({size} bytes) exceeds the device limit of {limit} bytes")]
    TooLarge { label: String, size: u64, limit: u64 },
}

impl AllocationError {
    /// Whether freeing memory elsewhere could make a retry succeed.
    #[inline]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}
