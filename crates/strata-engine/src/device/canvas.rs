use core::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::GpuDevice;

static NEXT_CANVAS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique canvas identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CanvasId(pub u64);

impl CanvasId {
    /// Allocates a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_CANVAS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas#{}", self.0)
    }
}

/// A rendering surface paired with the device its buffers live on.
///
/// Handles are cheap to clone. `exists()` turns false once the underlying
/// surface is gone; after that the cache never calls into `device()` for this
/// canvas again.
pub trait Canvas: Clone {
    type Device: GpuDevice;

    fn id(&self) -> CanvasId;

    /// Whether the underlying surface/context still exists.
    fn exists(&self) -> bool;

    fn device(&self) -> &Self::Device;
}

/// Ownership token for a live surface.
///
/// Whoever owns the real surface holds the lease. Dropping it marks every
/// [`CanvasPresence`] derived from it as vanished.
#[derive(Debug)]
pub struct CanvasLease {
    id: CanvasId,
    alive: Rc<()>,
}

impl CanvasLease {
    pub fn new() -> Self {
        Self {
            id: CanvasId::next(),
            alive: Rc::new(()),
        }
    }

    #[inline]
    pub fn id(&self) -> CanvasId {
        self.id
    }

    pub fn presence(&self) -> CanvasPresence {
        CanvasPresence {
            id: self.id,
            alive: Rc::downgrade(&self.alive),
        }
    }
}

impl Default for CanvasLease {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak view of a [`CanvasLease`].
#[derive(Debug, Clone)]
pub struct CanvasPresence {
    id: CanvasId,
    alive: Weak<()>,
}

impl CanvasPresence {
    #[inline]
    pub fn id(&self) -> CanvasId {
        self.id
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// Canvas backed by a shared device and a lease-driven presence check.
pub struct DeviceCanvas<D> {
    presence: CanvasPresence,
    device: Rc<D>,
}

impl<D> DeviceCanvas<D> {
    pub fn new(presence: CanvasPresence, device: Rc<D>) -> Self {
        Self { presence, device }
    }
}

impl<D> Clone for DeviceCanvas<D> {
    fn clone(&self) -> Self {
        Self {
            presence: self.presence.clone(),
            device: Rc::clone(&self.device),
        }
    }
}

impl<D> fmt::Debug for DeviceCanvas<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCanvas")
            .field("id", &self.presence.id())
            .field("exists", &self.presence.exists())
            .finish()
    }
}

impl<D: GpuDevice> Canvas for DeviceCanvas<D> {
    type Device = D;

    #[inline]
    fn id(&self) -> CanvasId {
        self.presence.id()
    }

    #[inline]
    fn exists(&self) -> bool {
        self.presence.exists()
    }

    #[inline]
    fn device(&self) -> &D {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostDevice;

    #[test]
    fn ids_are_unique() {
        let a = CanvasLease::new();
        let b = CanvasLease::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dropping_lease_vanishes_canvas() {
        let lease = CanvasLease::new();
        let canvas = DeviceCanvas::new(lease.presence(), Rc::new(HostDevice::new()));
        let copy = canvas.clone();

        assert!(canvas.exists());
        drop(lease);
        assert!(!canvas.exists());
        assert!(!copy.exists());
    }
}
