use core::fmt;

use crate::device::Canvas;
use crate::time::LogicalTime;

/// Inbound notifications driving the cache's lifecycle.
///
/// The orchestrator owning the traversal feeds these to
/// [`GeometryCache::handle`](super::GeometryCache::handle) in order.
pub enum LifecycleEvent<C> {
    /// A new traversal starts: active canvas and render stack are cleared.
    TraversalStarted,
    /// The canvas becomes active; its table is created on first activation.
    CanvasActivated(C),
    /// The active canvas is released. Its table is kept.
    CanvasDeactivated,
    /// Destroy everything and discard every table.
    Reset,
    /// New logical time for recency tracking.
    TimeUpdated(LogicalTime),
}

impl<C: Canvas> fmt::Debug for LifecycleEvent<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraversalStarted => f.write_str("TraversalStarted"),
            Self::CanvasActivated(c) => write!(f, "CanvasActivated({})", c.id()),
            Self::CanvasDeactivated => f.write_str("CanvasDeactivated"),
            Self::Reset => f.write_str("Reset"),
            Self::TimeUpdated(t) => write!(f, "TimeUpdated({t})"),
        }
    }
}
