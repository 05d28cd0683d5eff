use core::fmt;
use std::rc::Rc;

use crate::device::{BufferHandle, BufferKind, CanvasId, GpuDevice};
use crate::time::LogicalTime;

use super::Primitive;

/// The five buffer slots of a geometry.
///
/// Cloning shares the handles; it never copies device memory.
pub struct GeometryBuffers<B> {
    pub vertex: Option<BufferHandle<B>>,
    pub normal: Option<BufferHandle<B>>,
    pub uv: Option<BufferHandle<B>>,
    pub uv2: Option<BufferHandle<B>>,
    pub index: Option<BufferHandle<B>>,
}

impl<B> GeometryBuffers<B> {
    pub fn get(&self, kind: BufferKind) -> Option<&BufferHandle<B>> {
        match kind {
            BufferKind::Vertex => self.vertex.as_ref(),
            BufferKind::Normal => self.normal.as_ref(),
            BufferKind::Uv => self.uv.as_ref(),
            BufferKind::Uv2 => self.uv2.as_ref(),
            BufferKind::Index => self.index.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: BufferKind) -> &mut Option<BufferHandle<B>> {
        match kind {
            BufferKind::Vertex => &mut self.vertex,
            BufferKind::Normal => &mut self.normal,
            BufferKind::Uv => &mut self.uv,
            BufferKind::Uv2 => &mut self.uv2,
            BufferKind::Index => &mut self.index,
        }
    }

    /// Present buffers, vertex package first, index last.
    pub fn iter(&self) -> impl Iterator<Item = &BufferHandle<B>> {
        [&self.vertex, &self.normal, &self.uv, &self.uv2, &self.index]
            .into_iter()
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces vertex, normal, uv and uv2 with `from`'s, as one package.
    pub(crate) fn inherit_vertex_package(&mut self, from: &GeometryBuffers<B>) {
        self.vertex = from.vertex.clone();
        self.normal = from.normal.clone();
        self.uv = from.uv.clone();
        self.uv2 = from.uv2.clone();
    }

    /// Destroys every present buffer through `device`.
    ///
    /// Already-destroyed handles are skipped. Returns the number of buffers
    /// actually released.
    pub(crate) fn destroy<D>(&self, device: &D) -> usize
    where
        D: GpuDevice<Buffer = B> + ?Sized,
    {
        self.iter().filter(|b| b.destroy(device)).count()
    }

    /// Pointer identity of each slot with `other`'s.
    pub(crate) fn same_slot(&self, other: &Self, kind: BufferKind) -> bool {
        match (self.get(kind), other.get(kind)) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<B> Default for GeometryBuffers<B> {
    fn default() -> Self {
        Self {
            vertex: None,
            normal: None,
            uv: None,
            uv2: None,
            index: None,
        }
    }
}

impl<B> Clone for GeometryBuffers<B> {
    fn clone(&self) -> Self {
        Self {
            vertex: self.vertex.clone(),
            normal: self.normal.clone(),
            uv: self.uv.clone(),
            uv2: self.uv2.clone(),
            index: self.index.clone(),
        }
    }
}

impl<B> fmt::Debug for GeometryBuffers<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|b| b.kind()))
            .finish()
    }
}

/// A cached geometry: device buffers plus bookkeeping.
///
/// A record without an index buffer is never drawn; it only supplies vertex
/// data to descendants on the render stack.
pub struct GeometryRecord<B> {
    key: String,
    primitive: Option<Primitive>,
    last_used: LogicalTime,
    canvas: CanvasId,
    buffers: GeometryBuffers<B>,
}

impl<B> GeometryRecord<B> {
    pub(crate) fn new(
        key: String,
        primitive: Option<Primitive>,
        now: LogicalTime,
        canvas: CanvasId,
        buffers: GeometryBuffers<B>,
    ) -> Self {
        Self {
            key,
            primitive,
            last_used: now,
            canvas,
            buffers,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolved primitive. Only guaranteed for records with an index buffer.
    #[inline]
    pub fn primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    #[inline]
    pub fn last_used(&self) -> LogicalTime {
        self.last_used
    }

    #[inline]
    pub fn canvas(&self) -> CanvasId {
        self.canvas
    }

    #[inline]
    pub fn buffers(&self) -> &GeometryBuffers<B> {
        &self.buffers
    }

    #[inline]
    pub fn owns_vertex_data(&self) -> bool {
        self.buffers.vertex.is_some()
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.buffers.index.is_some()
    }

    pub(crate) fn touch(&mut self, now: LogicalTime) {
        if now > self.last_used {
            self.last_used = now;
        }
    }
}

impl<B> fmt::Debug for GeometryRecord<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryRecord")
            .field("key", &self.key)
            .field("primitive", &self.primitive)
            .field("last_used", &self.last_used)
            .field("canvas", &self.canvas)
            .field("buffers", &self.buffers)
            .finish()
    }
}
