use crate::device::CanvasId;

use super::{RenderStack, ResolvedGeometry};

/// Traversal-scoped state: the active canvas and the render stack.
///
/// One context lives for one traversal (it is cleared at traversal start).
/// Geometry tables live in the cache and outlast it.
pub struct RenderContext<B> {
    canvas: Option<CanvasId>,
    stack: RenderStack<B>,
}

impl<B> RenderContext<B> {
    pub fn new() -> Self {
        Self {
            canvas: None,
            stack: RenderStack::new(),
        }
    }

    /// Canvas whose table create/exists/push operate on.
    #[inline]
    pub fn active_canvas(&self) -> Option<CanvasId> {
        self.canvas
    }

    #[inline]
    pub fn stack(&self) -> &RenderStack<B> {
        &self.stack
    }

    #[inline]
    pub(crate) fn stack_mut(&mut self) -> &mut RenderStack<B> {
        &mut self.stack
    }

    /// Clears the active canvas and the render stack.
    pub fn begin_traversal(&mut self) {
        self.canvas = None;
        self.stack.clear();
    }

    pub(crate) fn set_active_canvas(&mut self, canvas: CanvasId) {
        self.canvas = Some(canvas);
    }

    /// Drops the active canvas. Its table stays in the cache.
    pub fn deactivate_canvas(&mut self) {
        self.canvas = None;
    }

    /// Removes the innermost geometry. `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<ResolvedGeometry<B>> {
        self.stack.pop()
    }
}

impl<B> Default for RenderContext<B> {
    fn default() -> Self {
        Self::new()
    }
}
