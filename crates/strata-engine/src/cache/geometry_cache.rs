use crate::device::{
    AllocationError, BufferDescriptor, BufferKind, Canvas, CanvasId, DeviceBuffer, GpuDevice,
    UsageHint,
};
use crate::error::{CacheError, Result};
use crate::geometry::{
    BufferOf, GeometryRecord, GeometryTable, MeshData, PendingBuffers, Primitive, SlotState,
};
use crate::memory::{AllocationScope, Evictor};
use crate::render::{GeometryBinder, RenderContext};
use crate::time::{LogicalClock, LogicalTime};

use super::tables::CanvasTables;
use super::{CacheConfig, LifecycleEvent};

/// Render context matching a cache over canvas `C`.
pub type ContextOf<C> = RenderContext<BufferOf<C>>;

/// Snapshot of cache occupancy.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub canvases: usize,
    pub live_records: usize,
    pub evicted_markers: usize,
    pub live_buffers: usize,
}

/// GPU-resident geometry buffer cache.
///
/// Turns mesh data into device buffers, keeps them per canvas under a
/// resource key, and gives memory back least-recently-used first when an
/// allocation scope asks for it.
///
/// Traversal state (active canvas, render stack) lives in a
/// [`RenderContext`] passed to each call; the cache itself only holds the
/// tables and the logical clock.
///
/// Dropping the cache destroys every buffer whose canvas still exists.
pub struct GeometryCache<C: Canvas> {
    config: CacheConfig,
    clock: LogicalClock,
    tables: CanvasTables<C>,
}

impl<C: Canvas> GeometryCache<C> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            clock: LogicalClock::new(),
            tables: CanvasTables::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current logical time.
    #[inline]
    pub fn now(&self) -> LogicalTime {
        self.clock.now()
    }

    /// Table of `canvas`, if it was ever activated since the last reset.
    pub fn table(&self, canvas: CanvasId) -> Option<&GeometryTable<C>> {
        self.tables.get(canvas)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Dispatches one lifecycle notification.
    pub fn handle(&mut self, ctx: &mut ContextOf<C>, event: LifecycleEvent<C>) {
        log::trace!("lifecycle: {event:?}");
        match event {
            LifecycleEvent::TraversalStarted => self.begin_traversal(ctx),
            LifecycleEvent::CanvasActivated(canvas) => self.activate_canvas(ctx, canvas),
            LifecycleEvent::CanvasDeactivated => self.deactivate_canvas(ctx),
            LifecycleEvent::Reset => self.reset(ctx),
            LifecycleEvent::TimeUpdated(t) => {
                self.set_time(t);
            }
        }
    }

    /// Clears the active canvas and the render stack.
    pub fn begin_traversal(&mut self, ctx: &mut ContextOf<C>) {
        ctx.begin_traversal();
    }

    /// Makes `canvas` active, creating its table on first activation.
    pub fn activate_canvas(&mut self, ctx: &mut ContextOf<C>, canvas: C) {
        if !canvas.exists() {
            log::warn!("activating {} whose surface no longer exists", canvas.id());
        }
        let id = self.tables.activate(canvas);
        ctx.set_active_canvas(id);
    }

    /// Releases the active canvas; its table stays for the next activation.
    pub fn deactivate_canvas(&mut self, ctx: &mut ContextOf<C>) {
        ctx.deactivate_canvas();
    }

    /// Destroys every record on every canvas and discards all tables.
    ///
    /// Device teardown is skipped for canvases that no longer exist.
    pub fn reset(&mut self, ctx: &mut ContextOf<C>) {
        let canvases = self.tables.len();
        let released = self.tables.destroy_all();
        ctx.begin_traversal();
        log::info!("geometry cache reset: released {released} records across {canvases} canvases");
    }

    /// Applies a logical time signal. Returns `false` if it was ignored for
    /// moving backwards.
    pub fn set_time(&mut self, t: LogicalTime) -> bool {
        self.clock.update(t)
    }

    /// Advances logical time by one unit.
    pub fn tick(&mut self) -> LogicalTime {
        self.clock.tick()
    }

    // ── lookup ────────────────────────────────────────────────────────────

    /// Whether `key` is live in the active canvas's table.
    ///
    /// `false` after eviction, and for every key once the canvas's surface
    /// is gone: the caller must recreate the geometry before pushing it
    /// again.
    pub fn exists(&self, ctx: &ContextOf<C>, key: &str) -> bool {
        self.live_table(ctx).is_some_and(|t| t.contains(key))
    }

    /// Whether `key` was created on the active canvas and is gone since,
    /// either evicted or lost with the canvas's surface.
    pub fn was_evicted(&self, ctx: &ContextOf<C>, key: &str) -> bool {
        self.active_table(ctx).is_some_and(|t| match t.state(key) {
            SlotState::Evicted => true,
            SlotState::Live => !t.canvas().exists(),
            SlotState::Unknown => false,
        })
    }

    pub fn get(&self, ctx: &ContextOf<C>, key: &str) -> Option<&GeometryRecord<BufferOf<C>>> {
        self.live_table(ctx)?.get(key)
    }

    fn active_table(&self, ctx: &ContextOf<C>) -> Option<&GeometryTable<C>> {
        self.tables.get(ctx.active_canvas()?)
    }

    /// Active table, unless its canvas has vanished.
    fn live_table(&self, ctx: &ContextOf<C>) -> Option<&GeometryTable<C>> {
        self.active_table(ctx).filter(|t| t.canvas().exists())
    }

    // ── creation ──────────────────────────────────────────────────────────

    /// Uploads `mesh` to the active canvas's device and stores it under `key`
    /// (or a generated key). Returns the key.
    ///
    /// Device allocations go through `scope`, which may evict other geometry
    /// to make room. On any failure, buffers already allocated by this call
    /// are destroyed and the table is left untouched. Creating over an
    /// existing key replaces that record once the new buffers are in place.
    pub fn create<S: AllocationScope>(
        &mut self,
        ctx: &ContextOf<C>,
        key: Option<&str>,
        mesh: &MeshData,
        scope: &mut S,
    ) -> Result<String> {
        let canvas_id = ctx.active_canvas().ok_or(CacheError::NoActiveCanvas)?;
        let table = self
            .tables
            .get_mut(canvas_id)
            .ok_or(CacheError::NoActiveCanvas)?;

        let key = match key {
            Some(k) => k.to_string(),
            None => table.allocate_key(&self.config.auto_key_prefix),
        };
        let canvas = table.canvas().clone();

        let Some(primitive_name) = mesh.primitive.as_deref() else {
            return Err(CacheError::MissingPrimitive { key });
        };
        let indices = mesh.indices();
        let primitive = match primitive_name.parse::<Primitive>() {
            Ok(p) => Some(p),
            Err(err) if indices.is_some() => {
                return Err(CacheError::UnsupportedPrimitive { key, name: err.0 });
            }
            // Never drawn, so the primitive is irrelevant.
            Err(_) => None,
        };

        let device = canvas.device();
        let usage = self.config.buffer_usage;
        let mut pending = PendingBuffers::new(device, &key);

        for kind in [BufferKind::Vertex, BufferKind::Normal, BufferKind::Uv, BufferKind::Uv2] {
            let Some(values) = mesh.attribute(kind) else { continue };
            let buffer = allocate(
                &mut self.tables,
                scope,
                device,
                &key,
                kind,
                usage,
                bytemuck::cast_slice(values),
                values.len(),
            )?;
            pending.push(kind, buffer);
        }

        if let Some(indices) = indices {
            let buffer = allocate(
                &mut self.tables,
                scope,
                device,
                &key,
                BufferKind::Index,
                usage,
                bytemuck::cast_slice(indices),
                indices.len(),
            )?;
            pending.push(BufferKind::Index, buffer);
        }

        let Some(table) = self.tables.get_mut(canvas_id) else {
            return Err(CacheError::NoActiveCanvas);
        };
        let buffers = pending.commit();
        let buffer_count = buffers.len();
        let record = GeometryRecord::new(key.clone(), primitive, self.clock.now(), canvas_id, buffers);

        if let Some(old) = table.insert(record) {
            old.buffers().destroy(device);
            log::debug!("replaced geometry {key:?} on {canvas_id}");
        }
        log::debug!("created geometry {key:?} on {canvas_id} ({buffer_count} buffers)");

        Ok(key)
    }

    // ── render stack ──────────────────────────────────────────────────────

    /// Pushes `key` onto the render stack.
    ///
    /// Refreshes the record's recency, resolves vertex inheritance and, if
    /// the geometry has an index buffer, hands the resolved view to `binder`.
    /// Index-less geometry is pushed only so descendants can inherit from it.
    ///
    /// Records of a vanished canvas are dropped first and reported missing.
    pub fn push<G>(&mut self, ctx: &mut ContextOf<C>, key: &str, binder: &mut G) -> Result<()>
    where
        G: GeometryBinder<BufferOf<C>> + ?Sized,
    {
        let canvas_id = ctx.active_canvas().ok_or(CacheError::NoActiveCanvas)?;
        let now = self.clock.now();
        self.tables.reclaim_vanished();
        let record = self
            .tables
            .get_mut(canvas_id)
            .and_then(|t| t.get_mut(key))
            .ok_or_else(|| CacheError::MissingGeometry {
                key: key.to_string(),
            })?;

        record.touch(now);
        let view = ctx.stack().resolve(record);

        if view.is_drawable() {
            if !view.has_vertex_data() {
                log::warn!("{key:?} drawn with no vertex data on the render stack");
            }
            binder.set_current_geometry(&view);
        }

        ctx.stack_mut().push(view);
        Ok(())
    }

    /// Pops the innermost geometry. Returns `false` if the stack was empty.
    pub fn pop(&mut self, ctx: &mut ContextOf<C>) -> bool {
        ctx.pop().is_some()
    }

    // ── eviction ──────────────────────────────────────────────────────────

    /// Destroys the least recently used geometry across every canvas whose
    /// surface still exists.
    ///
    /// Records of vanished canvases are dropped (without device calls) but
    /// never count as an eviction. Returns `false` if nothing was evictable.
    pub fn try_evict_one(&mut self) -> bool {
        self.tables.evict_least_recent()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            canvases: self.tables.len(),
            ..CacheStats::default()
        };
        for table in self.tables.iter() {
            stats.live_records += table.live_count();
            stats.evicted_markers += table.evicted_count();
            stats.live_buffers += table.records().map(|r| r.buffers().len()).sum::<usize>();
        }
        stats
    }
}

impl<C: Canvas> Default for GeometryCache<C> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<C: Canvas> Evictor for GeometryCache<C> {
    fn try_evict_one(&mut self) -> bool {
        GeometryCache::try_evict_one(self)
    }
}

impl<C: Canvas> Drop for GeometryCache<C> {
    fn drop(&mut self) {
        self.tables.destroy_all();
    }
}

/// Allocates one device buffer under `scope`, offering `tables` for eviction.
#[allow(clippy::too_many_arguments)]
fn allocate<C, S>(
    tables: &mut CanvasTables<C>,
    scope: &mut S,
    device: &C::Device,
    key: &str,
    kind: BufferKind,
    usage: UsageHint,
    contents: &[u8],
    value_count: usize,
) -> std::result::Result<DeviceBuffer<BufferOf<C>>, AllocationError>
where
    C: Canvas,
    S: AllocationScope,
{
    let label = format!("{key}:{kind}");
    let value_count = checked_value_count(&label, value_count, contents.len())?;
    let desc = BufferDescriptor {
        label: &label,
        kind,
        usage,
        contents,
    };
    let storage = scope.allocate(tables, &label, || device.create_buffer(&desc))?;
    Ok(DeviceBuffer::new(kind, value_count, usage, storage))
}

/// Values per buffer are counted in `u32`; larger attributes are rejected
/// before anything is allocated.
fn checked_value_count(
    label: &str,
    value_count: usize,
    byte_len: usize,
) -> std::result::Result<u32, AllocationError> {
    u32::try_from(value_count).map_err(|_| AllocationError::TooLarge {
        label: label.to_string(),
        size: byte_len as u64,
        limit: u64::from(u32::MAX) * 4,
    })
}
