use std::collections::HashMap;

use crate::device::{Canvas, GpuDevice};

use super::GeometryRecord;

/// Buffer type stored by tables for canvas `C`.
pub type BufferOf<C> = <<C as Canvas>::Device as GpuDevice>::Buffer;

/// Table entry. `Evicted` keeps the key reserved and distinguishes
/// "evicted since last use" from "never created".
enum Slot<B> {
    Live(GeometryRecord<B>),
    Evicted,
}

/// What a table knows about a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotState {
    Live,
    Evicted,
    Unknown,
}

/// Per-canvas mapping from resource key to geometry.
///
/// Created on first activation of its canvas and kept across deactivations;
/// only a global reset discards it.
pub struct GeometryTable<C: Canvas> {
    canvas: C,
    slots: HashMap<String, Slot<BufferOf<C>>>,
    next_auto_key: u64,
}

impl<C: Canvas> GeometryTable<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            slots: HashMap::new(),
            next_auto_key: 0,
        }
    }

    #[inline]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn state(&self, key: &str) -> SlotState {
        match self.slots.get(key) {
            Some(Slot::Live(_)) => SlotState::Live,
            Some(Slot::Evicted) => SlotState::Evicted,
            None => SlotState::Unknown,
        }
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.state(key) == SlotState::Live
    }

    pub fn get(&self, key: &str) -> Option<&GeometryRecord<BufferOf<C>>> {
        match self.slots.get(key)? {
            Slot::Live(record) => Some(record),
            Slot::Evicted => None,
        }
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut GeometryRecord<BufferOf<C>>> {
        match self.slots.get_mut(key)? {
            Slot::Live(record) => Some(record),
            Slot::Evicted => None,
        }
    }

    /// Live records in unspecified order.
    pub fn records(&self) -> impl Iterator<Item = &GeometryRecord<BufferOf<C>>> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Live(record) => Some(record),
            Slot::Evicted => None,
        })
    }

    pub fn live_count(&self) -> usize {
        self.records().count()
    }

    pub fn evicted_count(&self) -> usize {
        self.slots.len() - self.live_count()
    }

    /// Returns `<prefix><n>` for the smallest `n` at or above the table's
    /// cursor that is not already a key (live or evicted). Does not insert.
    pub fn allocate_key(&mut self, prefix: &str) -> String {
        let mut n = self.next_auto_key;
        loop {
            let key = format!("{prefix}{n}");
            n += 1;
            if !self.slots.contains_key(&key) {
                self.next_auto_key = n;
                return key;
            }
        }
    }

    /// Inserts `record`, returning the live record it replaces, if any.
    pub(crate) fn insert(
        &mut self,
        record: GeometryRecord<BufferOf<C>>,
    ) -> Option<GeometryRecord<BufferOf<C>>> {
        match self.slots.insert(record.key().to_string(), Slot::Live(record)) {
            Some(Slot::Live(old)) => Some(old),
            _ => None,
        }
    }

    /// Destroys the record's buffers and leaves an `Evicted` marker.
    ///
    /// Returns `false` if `key` is not live.
    pub(crate) fn evict(&mut self, key: &str) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        let Slot::Live(record) = std::mem::replace(slot, Slot::Evicted) else {
            return false;
        };
        let released = record.buffers().destroy(self.canvas.device());
        log::debug!(
            "evicted {key:?} on {} ({released} buffers, last used {})",
            self.canvas.id(),
            record.last_used()
        );
        true
    }

    /// Marks every live record evicted without calling the device.
    ///
    /// Used once the canvas is gone: its context can no longer be touched.
    /// Returns the number of records dropped.
    pub(crate) fn forget_all(&mut self) -> usize {
        let mut dropped = 0;
        for slot in self.slots.values_mut() {
            if matches!(slot, Slot::Live(_)) {
                *slot = Slot::Evicted;
                dropped += 1;
            }
        }
        dropped
    }

    /// Tears down every record, through the device if the canvas still
    /// exists. Returns the number of records released.
    pub(crate) fn destroy_all(&mut self) -> usize {
        if !self.canvas.exists() {
            let dropped = self.forget_all();
            self.slots.clear();
            return dropped;
        }

        let device = self.canvas.device();
        let mut released = 0;
        for (_, slot) in self.slots.drain() {
            if let Slot::Live(record) = slot {
                record.buffers().destroy(device);
                released += 1;
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::device::{
        BufferDescriptor, BufferKind, CanvasLease, DeviceBuffer, DeviceCanvas, HostDevice,
        UsageHint,
    };
    use crate::geometry::GeometryBuffers;
    use crate::time::LogicalTime;

    type TestCanvas = DeviceCanvas<HostDevice>;

    fn canvas() -> (CanvasLease, TestCanvas) {
        let lease = CanvasLease::new();
        let canvas = DeviceCanvas::new(lease.presence(), Rc::new(HostDevice::new()));
        (lease, canvas)
    }

    fn record(table: &GeometryTable<TestCanvas>, key: &str) -> GeometryRecord<BufferOf<TestCanvas>> {
        let values = [0.0f32; 9];
        let storage = table
            .canvas()
            .device()
            .create_buffer(&BufferDescriptor {
                label: key,
                kind: BufferKind::Vertex,
                usage: UsageHint::Static,
                contents: bytemuck::cast_slice(&values),
            })
            .unwrap();
        let buffers = GeometryBuffers {
            vertex: Some(Rc::new(DeviceBuffer::new(
                BufferKind::Vertex,
                9,
                UsageHint::Static,
                storage,
            ))),
            ..GeometryBuffers::default()
        };
        GeometryRecord::new(key.to_string(), None, LogicalTime::ZERO, table.canvas().id(), buffers)
    }

    #[test]
    fn allocated_keys_skip_existing_ones() {
        let (_lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);

        let r = record(&table, "g_0");
        table.insert(r);
        let r = record(&table, "g_2");
        table.insert(r);

        let a = table.allocate_key("g_");
        assert_eq!(a, "g_1");
        let r = record(&table, &a);
        table.insert(r);
        assert_eq!(table.allocate_key("g_"), "g_3");
    }

    #[test]
    fn allocated_keys_skip_evicted_markers() {
        let (_lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);
        let r = record(&table, "k0");
        table.insert(r);
        assert!(table.evict("k0"));

        assert_eq!(table.state("k0"), SlotState::Evicted);
        assert_ne!(table.allocate_key("k"), "k0");
    }

    #[test]
    fn evict_destroys_buffers_once() {
        let (_lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);
        let r = record(&table, "a");
        table.insert(r);

        assert!(table.evict("a"));
        assert!(!table.evict("a"));
        assert!(!table.contains("a"));
        assert_eq!(table.canvas().device().stats().destroyed, 1);
        assert_eq!(table.evicted_count(), 1);
    }

    #[test]
    fn insert_returns_replaced_record() {
        let (_lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);
        let r = record(&table, "a");
        assert!(table.insert(r).is_none());
        let r = record(&table, "a");
        let old = table.insert(r).unwrap();
        assert_eq!(old.key(), "a");
        assert_eq!(table.live_count(), 1);
    }

    #[test]
    fn destroy_all_skips_device_when_canvas_vanished() {
        let (lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);
        let r = record(&table, "a");
        table.insert(r);
        let r = record(&table, "b");
        table.insert(r);

        drop(lease);
        assert_eq!(table.destroy_all(), 2);
        assert_eq!(table.canvas().device().stats().destroyed, 0);
        assert_eq!(table.state("a"), SlotState::Unknown);
    }

    #[test]
    fn destroy_all_releases_through_device() {
        let (_lease, canvas) = canvas();
        let mut table = GeometryTable::new(canvas);
        let r = record(&table, "a");
        table.insert(r);

        assert_eq!(table.destroy_all(), 1);
        assert_eq!(table.canvas().device().stats().destroyed, 1);
        assert_eq!(table.live_count(), 0);
    }
}
