use core::fmt;

use crate::geometry::{GeometryBuffers, GeometryRecord, Primitive};

/// Geometry as it will be drawn: a record's own primitive and index buffer,
/// with vertex data possibly inherited from an ancestor on the stack.
///
/// Views are transient. They are never stored in a table.
pub struct ResolvedGeometry<B> {
    key: String,
    primitive: Option<Primitive>,
    buffers: GeometryBuffers<B>,
    vertex_source: Option<String>,
}

impl<B> ResolvedGeometry<B> {
    /// Key of the record this view was resolved for.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    #[inline]
    pub fn buffers(&self) -> &GeometryBuffers<B> {
        &self.buffers
    }

    /// Key of the record whose vertex package this view uses.
    ///
    /// Equal to [`key`](Self::key) unless the package was inherited; `None`
    /// when no vertex data was found.
    #[inline]
    pub fn vertex_source(&self) -> Option<&str> {
        self.vertex_source.as_deref()
    }

    #[inline]
    pub fn is_inherited(&self) -> bool {
        self.vertex_source.as_deref().is_some_and(|s| s != self.key)
    }

    #[inline]
    pub fn has_vertex_data(&self) -> bool {
        self.buffers.vertex.is_some()
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.buffers.index.is_some()
    }
}

impl<B> Clone for ResolvedGeometry<B> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            primitive: self.primitive,
            buffers: self.buffers.clone(),
            vertex_source: self.vertex_source.clone(),
        }
    }
}

impl<B> fmt::Debug for ResolvedGeometry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedGeometry")
            .field("key", &self.key)
            .field("primitive", &self.primitive)
            .field("buffers", &self.buffers)
            .field("vertex_source", &self.vertex_source)
            .finish()
    }
}

/// Resolved views active in the current traversal. The top is the innermost.
pub struct RenderStack<B> {
    entries: Vec<ResolvedGeometry<B>>,
}

impl<B> RenderStack<B> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn top(&self) -> Option<&ResolvedGeometry<B>> {
        self.entries.last()
    }

    /// Entries from the bottom (outermost) to the top.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedGeometry<B>> {
        self.entries.iter()
    }

    /// Builds the view for `record` against the current stack.
    ///
    /// A record that owns vertex data resolves to itself. Otherwise the
    /// vertex, normal, uv and uv2 buffers come as one package from the
    /// nearest entry (top first) that has vertex data; primitive and index
    /// buffer always stay the record's own. With no such entry the view has
    /// no vertex buffer.
    pub fn resolve(&self, record: &GeometryRecord<B>) -> ResolvedGeometry<B> {
        let mut view = ResolvedGeometry {
            key: record.key().to_string(),
            primitive: record.primitive(),
            buffers: record.buffers().clone(),
            vertex_source: None,
        };

        if record.owns_vertex_data() {
            view.vertex_source = Some(view.key.clone());
            return view;
        }

        if let Some(ancestor) = self.entries.iter().rev().find(|e| e.has_vertex_data()) {
            view.buffers.inherit_vertex_package(&ancestor.buffers);
            view.vertex_source = ancestor.vertex_source.clone();
        }
        view
    }

    pub fn push(&mut self, view: ResolvedGeometry<B>) {
        self.entries.push(view);
    }

    /// Removes the top entry. `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<ResolvedGeometry<B>> {
        self.entries.pop()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<B> Default for RenderStack<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::device::{
        BufferDescriptor, BufferKind, CanvasId, DeviceBuffer, GpuDevice, HostBuffer, HostDevice,
        UsageHint,
    };
    use crate::time::LogicalTime;

    fn buffer(device: &HostDevice, kind: BufferKind) -> Rc<DeviceBuffer<HostBuffer>> {
        let values = [0.0f32; 6];
        let storage = device
            .create_buffer(&BufferDescriptor {
                label: kind.as_str(),
                kind,
                usage: UsageHint::Static,
                contents: bytemuck::cast_slice(&values),
            })
            .unwrap();
        Rc::new(DeviceBuffer::new(kind, 6, UsageHint::Static, storage))
    }

    fn record(
        device: &HostDevice,
        key: &str,
        kinds: &[BufferKind],
        primitive: Option<Primitive>,
    ) -> GeometryRecord<HostBuffer> {
        let mut buffers = GeometryBuffers::default();
        for &kind in kinds {
            *buffers.slot_mut(kind) = Some(buffer(device, kind));
        }
        GeometryRecord::new(key.to_string(), primitive, LogicalTime::ZERO, CanvasId(0), buffers)
    }

    use BufferKind::{Index, Normal, Uv, Uv2, Vertex};

    #[test]
    fn owner_resolves_to_itself() {
        let device = HostDevice::new();
        let stack = RenderStack::new();
        let rec = record(&device, "a", &[Vertex, Index], Some(Primitive::Triangles));

        let view = stack.resolve(&rec);
        assert_eq!(view.vertex_source(), Some("a"));
        assert!(!view.is_inherited());
        assert!(Rc::ptr_eq(
            view.buffers().vertex.as_ref().unwrap(),
            rec.buffers().vertex.as_ref().unwrap()
        ));
    }

    #[test]
    fn child_inherits_from_nearest_owner() {
        let device = HostDevice::new();
        let mut stack = RenderStack::new();

        let outer = record(&device, "outer", &[Vertex, Uv], None);
        let inner = record(&device, "inner", &[Vertex, Normal], None);
        stack.push(stack.resolve(&outer));
        stack.push(stack.resolve(&inner));

        let child = record(&device, "child", &[Index], Some(Primitive::Lines));
        let view = stack.resolve(&child);

        assert_eq!(view.vertex_source(), Some("inner"));
        assert!(view.is_inherited());
        assert_eq!(view.primitive(), Some(Primitive::Lines));
        assert!(Rc::ptr_eq(
            view.buffers().vertex.as_ref().unwrap(),
            inner.buffers().vertex.as_ref().unwrap()
        ));
        assert!(Rc::ptr_eq(
            view.buffers().index.as_ref().unwrap(),
            child.buffers().index.as_ref().unwrap()
        ));
        // The package is atomic: outer's uv is not mixed in.
        assert!(view.buffers().uv.is_none());
        assert!(view.buffers().normal.is_some());
    }

    #[test]
    fn inherited_package_overrides_own_attributes() {
        let device = HostDevice::new();
        let mut stack = RenderStack::new();
        let parent = record(&device, "parent", &[Vertex], None);
        stack.push(stack.resolve(&parent));

        let child = record(&device, "child", &[Uv2, Index], Some(Primitive::Points));
        let view = stack.resolve(&child);
        assert!(view.buffers().uv2.is_none());
    }

    #[test]
    fn package_passes_through_inheriting_entries() {
        let device = HostDevice::new();
        let mut stack = RenderStack::new();
        let root = record(&device, "root", &[Vertex], None);
        stack.push(stack.resolve(&root));
        let mid = record(&device, "mid", &[Normal], None);
        stack.push(stack.resolve(&mid));

        let leaf = record(&device, "leaf", &[Index], Some(Primitive::Triangles));
        let view = stack.resolve(&leaf);
        assert_eq!(view.vertex_source(), Some("root"));
        // mid's own normals were replaced by root's (absent) package.
        assert!(view.buffers().normal.is_none());
    }

    #[test]
    fn no_owner_means_no_vertex_buffer() {
        let device = HostDevice::new();
        let stack = RenderStack::new();
        let child = record(&device, "child", &[Uv, Index], Some(Primitive::Triangles));

        let view = stack.resolve(&child);
        assert!(!view.has_vertex_data());
        assert!(view.vertex_source().is_none());
        assert!(view.buffers().uv.is_some());
    }

    #[test]
    fn pop_returns_top() {
        let device = HostDevice::new();
        let mut stack = RenderStack::new();
        let a = record(&device, "a", &[Vertex], None);
        let b = record(&device, "b", &[Index], Some(Primitive::Triangles));
        stack.push(stack.resolve(&a));
        stack.push(stack.resolve(&b));

        assert_eq!(stack.pop().unwrap().key(), "b");
        assert_eq!(stack.top().unwrap().key(), "a");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn pop_on_empty_stack_is_none() {
        let mut stack = RenderStack::<HostBuffer>::new();
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }
}
