//! Stroke and page wire types.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::PersistenceError;
use crate::tool::{CompositeOp, Tool};

/// One continuous pointer gesture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: SmolStr,
    pub tool: Tool,
    /// Flat `[x0, y0, x1, y1, ...]` in the canvas's original coordinate space.
    pub points: Vec<f64>,
    pub color: SmolStr,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Stroke {
    pub fn composite(&self) -> CompositeOp {
        self.tool.composite()
    }

    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }

    /// Iterate `(x, y)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.chunks_exact(2).map(|p| (p[0], p[1]))
    }
}

/// All strokes of one page; replaced wholesale on save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasData {
    pub lines: Vec<Stroke>,
    /// Milliseconds since the Unix epoch of the last change.
    pub version: i64,
}

impl CanvasData {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}
