use crate::device::BufferKind;
use crate::geometry::GeometryBuffers;

use super::ResolvedGeometry;

/// Draw hand-off: receives every drawable view pushed on the render stack.
///
/// Only views with an index buffer are handed over. Suppressing redundant
/// binds when the same view is handed over repeatedly is the binder's job;
/// [`BindState`] does the bookkeeping.
pub trait GeometryBinder<B> {
    fn set_current_geometry(&mut self, geometry: &ResolvedGeometry<B>);
}

impl<B, F> GeometryBinder<B> for F
where
    F: FnMut(&ResolvedGeometry<B>),
{
    fn set_current_geometry(&mut self, geometry: &ResolvedGeometry<B>) {
        self(geometry)
    }
}

/// Slots whose buffer differs from the previously bound view.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct BindingChanges {
    pub vertex: bool,
    pub normal: bool,
    pub uv: bool,
    pub uv2: bool,
    pub index: bool,
}

impl BindingChanges {
    const ALL: Self = Self {
        vertex: true,
        normal: true,
        uv: true,
        uv2: true,
        index: true,
    };

    #[inline]
    pub fn any(&self) -> bool {
        self.vertex || self.normal || self.uv || self.uv2 || self.index
    }

    pub fn contains(&self, kind: BufferKind) -> bool {
        match kind {
            BufferKind::Vertex => self.vertex,
            BufferKind::Normal => self.normal,
            BufferKind::Uv => self.uv,
            BufferKind::Uv2 => self.uv2,
            BufferKind::Index => self.index,
        }
    }
}

/// Tracks the buffers last bound by a binder.
///
/// Comparison is by handle identity, so two views of the same geometry (or
/// two children sharing one inherited vertex package) re-bind only what
/// actually differs.
pub struct BindState<B> {
    bound: Option<GeometryBuffers<B>>,
}

impl<B> BindState<B> {
    pub fn new() -> Self {
        Self { bound: None }
    }

    /// Records `view` as bound and reports what changed.
    pub fn update(&mut self, view: &ResolvedGeometry<B>) -> BindingChanges {
        let next = view.buffers();
        let changes = match &self.bound {
            None => BindingChanges::ALL,
            Some(prev) => BindingChanges {
                vertex: !prev.same_slot(next, BufferKind::Vertex),
                normal: !prev.same_slot(next, BufferKind::Normal),
                uv: !prev.same_slot(next, BufferKind::Uv),
                uv2: !prev.same_slot(next, BufferKind::Uv2),
                index: !prev.same_slot(next, BufferKind::Index),
            },
        };
        self.bound = Some(next.clone());
        changes
    }

    /// Forgets the bound state, e.g. at the start of a render pass.
    pub fn invalidate(&mut self) {
        self.bound = None;
    }
}

impl<B> Default for BindState<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::device::{
        BufferDescriptor, CanvasId, DeviceBuffer, GpuDevice, HostBuffer, HostDevice, UsageHint,
    };
    use crate::geometry::{GeometryRecord, Primitive};
    use crate::render::RenderStack;
    use crate::time::LogicalTime;

    fn record(device: &HostDevice, key: &str, kinds: &[BufferKind]) -> GeometryRecord<HostBuffer> {
        let mut buffers = GeometryBuffers::default();
        for &kind in kinds {
            let storage = device
                .create_buffer(&BufferDescriptor {
                    label: key,
                    kind,
                    usage: UsageHint::Static,
                    contents: &[0; 12],
                })
                .unwrap();
            *buffers.slot_mut(kind) = Some(Rc::new(DeviceBuffer::new(kind, 3, UsageHint::Static, storage)));
        }
        GeometryRecord::new(key.into(), Some(Primitive::Triangles), LogicalTime::ZERO, CanvasId(0), buffers)
    }

    #[test]
    fn first_bind_changes_everything() {
        let device = HostDevice::new();
        let view = RenderStack::new().resolve(&record(&device, "a", &[BufferKind::Vertex, BufferKind::Index]));
        let mut state = BindState::new();
        assert_eq!(state.update(&view), BindingChanges::ALL);
    }

    #[test]
    fn same_view_rebinds_nothing() {
        let device = HostDevice::new();
        let view = RenderStack::new().resolve(&record(&device, "a", &[BufferKind::Vertex, BufferKind::Index]));
        let mut state = BindState::new();
        state.update(&view);
        assert!(!state.update(&view.clone()).any());

        state.invalidate();
        assert!(state.update(&view).any());
    }

    #[test]
    fn siblings_share_the_inherited_package() {
        let device = HostDevice::new();
        let mut stack = RenderStack::new();
        let parent = record(&device, "parent", &[BufferKind::Vertex, BufferKind::Uv]);
        stack.push(stack.resolve(&parent));

        let left = stack.resolve(&record(&device, "left", &[BufferKind::Index]));
        let right = stack.resolve(&record(&device, "right", &[BufferKind::Index]));

        let mut state = BindState::new();
        state.update(&left);
        let changes = state.update(&right);
        assert!(changes.index);
        assert!(!changes.vertex && !changes.uv && !changes.normal && !changes.uv2);
        assert!(changes.contains(BufferKind::Index));
    }

    #[test]
    fn closures_are_binders() {
        let device = HostDevice::new();
        let view = RenderStack::new().resolve(&record(&device, "a", &[BufferKind::Index]));
        let mut seen = Vec::new();
        let mut binder = |g: &ResolvedGeometry<HostBuffer>| seen.push(g.key().to_string());
        binder.set_current_geometry(&view);
        assert_eq!(seen, ["a"]);
    }
}
