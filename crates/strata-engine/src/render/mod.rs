//! Render stack and draw hand-off.
//!
//! Scene traversal pushes geometry as it descends and pops it on the way
//! back up. Each push resolves vertex inheritance against the stack and,
//! for drawable geometry, hands the resolved view to a `GeometryBinder`.

mod binder;
mod ctx;
mod stack;

pub use binder::{BindState, BindingChanges, GeometryBinder};
pub use ctx::RenderContext;
pub use stack::{RenderStack, ResolvedGeometry};
