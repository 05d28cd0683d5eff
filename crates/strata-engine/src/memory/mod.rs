//! Memory-pressure protocol.
//!
//! Device allocations run inside an `AllocationScope`. When the device
//! reports out-of-memory, the scope asks evictors to free one unit each and
//! retries. This module does not decide when memory is low; it only defines
//! how allocation and eviction interact.

mod scope;

pub use scope::{AllocationScope, DirectScope, Evictor, RetryScope};
