//! Logical time used for recency tracking.
//!
//! The cache never reads a wall clock. An external signal (usually the frame
//! loop) advances a `LogicalClock`, and every record remembers the logical
//! time of its last use.

mod logical_clock;

pub use logical_clock::{LogicalClock, LogicalTime};
