use crate::device::BufferKind;

/// Scene-described mesh data, as handed over by scene nodes.
///
/// Attributes are flat scalar sequences (`x y z x y z ...` for positions and
/// normals, `u v u v ...` for texture coordinates). Empty sequences are
/// treated like absent ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Option<Vec<f32>>,
    pub normals: Option<Vec<f32>>,
    pub uv: Option<Vec<f32>>,
    pub uv2: Option<Vec<f32>>,
    pub indices: Option<Vec<u32>>,
    /// One of the primitive names understood by [`Primitive`](super::Primitive).
    pub primitive: Option<String>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primitive(mut self, primitive: impl Into<String>) -> Self {
        self.primitive = Some(primitive.into());
        self
    }

    pub fn with_positions(mut self, values: Vec<f32>) -> Self {
        self.positions = Some(values);
        self
    }

    pub fn with_normals(mut self, values: Vec<f32>) -> Self {
        self.normals = Some(values);
        self
    }

    pub fn with_uv(mut self, values: Vec<f32>) -> Self {
        self.uv = Some(values);
        self
    }

    pub fn with_uv2(mut self, values: Vec<f32>) -> Self {
        self.uv2 = Some(values);
        self
    }

    pub fn with_indices(mut self, values: Vec<u32>) -> Self {
        self.indices = Some(values);
        self
    }

    /// Non-empty float attribute for `kind`. Always `None` for `Index`.
    pub fn attribute(&self, kind: BufferKind) -> Option<&[f32]> {
        let values = match kind {
            BufferKind::Vertex => self.positions.as_deref(),
            BufferKind::Normal => self.normals.as_deref(),
            BufferKind::Uv => self.uv.as_deref(),
            BufferKind::Uv2 => self.uv2.as_deref(),
            BufferKind::Index => None,
        };
        values.filter(|v| !v.is_empty())
    }

    /// Non-empty index sequence.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref().filter(|v| !v.is_empty())
    }
}
