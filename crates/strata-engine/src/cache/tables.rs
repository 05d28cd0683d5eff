use std::collections::BTreeMap;

use crate::device::{Canvas, CanvasId};
use crate::geometry::GeometryTable;
use crate::memory::Evictor;

/// All per-canvas tables, keyed by canvas.
///
/// Ordered by canvas id so scans (and eviction tie-breaks) are deterministic.
pub(crate) struct CanvasTables<C: Canvas> {
    tables: BTreeMap<CanvasId, GeometryTable<C>>,
}

impl<C: Canvas> CanvasTables<C> {
    pub(crate) fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    pub(crate) fn get(&self, id: CanvasId) -> Option<&GeometryTable<C>> {
        self.tables.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: CanvasId) -> Option<&mut GeometryTable<C>> {
        self.tables.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &GeometryTable<C>> {
        self.tables.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns the canvas's table, creating it on first activation.
    pub(crate) fn activate(&mut self, canvas: C) -> CanvasId {
        let id = canvas.id();
        self.tables.entry(id).or_insert_with(|| {
            log::debug!("created geometry table for {id}");
            GeometryTable::new(canvas)
        });
        id
    }

    /// Clears the entries of every canvas that no longer exists.
    ///
    /// No device call is made for them. Returns the number of records dropped.
    pub(crate) fn reclaim_vanished(&mut self) -> usize {
        let mut total = 0;
        for (id, table) in &mut self.tables {
            if table.canvas().exists() {
                continue;
            }
            let dropped = table.forget_all();
            if dropped > 0 {
                log::info!("{id} vanished; dropped {dropped} geometry records without teardown");
            }
            total += dropped;
        }
        total
    }

    /// Destroys every record and discards every table.
    pub(crate) fn destroy_all(&mut self) -> usize {
        let mut released = 0;
        for (_, mut table) in std::mem::take(&mut self.tables) {
            released += table.destroy_all();
        }
        released
    }

    /// Evicts the least recently used record across all live canvases.
    ///
    /// Ties on `last_used` go to the lowest canvas id, then the smallest key.
    pub(crate) fn evict_least_recent(&mut self) -> bool {
        self.reclaim_vanished();

        let victim = self
            .tables
            .iter()
            .filter(|(_, table)| table.canvas().exists())
            .flat_map(|(&id, table)| table.records().map(move |r| (r.last_used(), id, r.key())))
            .min()
            .map(|(_, id, key)| (id, key.to_string()));

        let Some((id, key)) = victim else {
            log::debug!("eviction requested but no geometry is evictable");
            return false;
        };
        self.tables.get_mut(&id).is_some_and(|table| table.evict(&key))
    }
}

impl<C: Canvas> Evictor for CanvasTables<C> {
    fn try_evict_one(&mut self) -> bool {
        self.evict_least_recent()
    }
}
