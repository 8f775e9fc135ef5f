//! Drawing tools and their default styles.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Highlighter,
    Eraser,
}

impl Tool {
    /// How strokes drawn with this tool combine with what is underneath.
    pub fn composite(self) -> CompositeOp {
        match self {
            Tool::Pen | Tool::Highlighter => CompositeOp::SourceOver,
            Tool::Eraser => CompositeOp::DestinationOut,
        }
    }

    /// Whether a user colour override applies. The eraser's colour is
    /// irrelevant since it only removes pixels.
    pub fn takes_color(self) -> bool {
        !matches!(self, Tool::Eraser)
    }
}

/// Canvas 2D composite operations used by the tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeOp {
    SourceOver,
    /// Removes existing pixels where the stroke is drawn.
    DestinationOut,
}

impl CompositeOp {
    /// Value for `CanvasRenderingContext2D.globalCompositeOperation`.
    pub fn as_css(self) -> &'static str {
        match self {
            CompositeOp::SourceOver => "source-over",
            CompositeOp::DestinationOut => "destination-out",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStyle {
    pub color: SmolStr,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl ToolStyle {
    pub fn new(color: &str, stroke_width: f64, opacity: f64) -> Self {
        Self {
            color: SmolStr::new(color),
            stroke_width,
            opacity,
        }
    }

    /// Thin, opaque, dark.
    pub fn pen() -> Self {
        Self::new("#1f2937", 2.0, 1.0)
    }

    /// Thick, translucent, yellow.
    pub fn highlighter() -> Self {
        Self::new("#fde047", 20.0, 0.4)
    }

    /// Thick and opaque; composited with destination-out.
    pub fn eraser() -> Self {
        Self::new("#000000", 24.0, 1.0)
    }
}
