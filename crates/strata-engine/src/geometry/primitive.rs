use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Draw primitive of an indexed geometry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    pub const ALL: [Primitive; 7] = [
        Self::Points,
        Self::Lines,
        Self::LineLoop,
        Self::LineStrip,
        Self::Triangles,
        Self::TriangleStrip,
        Self::TriangleFan,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::LineLoop => "line_loop",
            Self::LineStrip => "line_strip",
            Self::Triangles => "triangles",
            Self::TriangleStrip => "triangle_strip",
            Self::TriangleFan => "triangle_fan",
        }
    }

    /// wgpu topology for this primitive.
    ///
    /// Line loops and triangle fans have no wgpu equivalent; callers must
    /// expand them before drawing.
    pub const fn topology(self) -> Option<wgpu::PrimitiveTopology> {
        match self {
            Self::Points => Some(wgpu::PrimitiveTopology::PointList),
            Self::Lines => Some(wgpu::PrimitiveTopology::LineList),
            Self::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
            Self::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
            Self::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
            Self::LineLoop | Self::TriangleFan => None,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive name outside the recognized set.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("unrecognized primitive {0:?}")]
pub struct ParsePrimitiveError(pub String);

impl FromStr for Primitive {
    type Err = ParsePrimitiveError;

    /// Accepts the snake-case names (`"triangle_strip"`) in any letter case,
    /// with `-` or `_` as separator, so GL-style `"TRIANGLE_STRIP"` and
    /// `"triangle-strip"` parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| ParsePrimitiveError(s.to_string()))
    }
}
