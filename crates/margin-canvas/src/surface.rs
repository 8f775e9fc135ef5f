//! Platform seams for the drawing fast path.
//!
//! The surface is written to directly while a stroke is in progress. It is a
//! view only: persistence and undo read the committed stroke list, never the
//! surface.

use crate::stroke::Stroke;

/// A raster surface the canvas draws onto.
pub trait DrawingSurface {
    /// Start drawing `stroke` (style and first point).
    fn begin_stroke(&mut self, stroke: &Stroke);

    /// Append flat `[x, y, ...]` points to the stroke in progress.
    fn extend_stroke(&mut self, points: &[f64]);

    fn end_stroke(&mut self);

    /// Wipe and repaint the committed strokes.
    fn redraw(&mut self, lines: &[Stroke]);

    /// Change the backing size. Stroke coordinates are not rescaled.
    fn resize(&mut self, width: f64, height: f64);
}

/// Requests a callback at the next display refresh. The host routes that
/// callback to `StrokeCanvas::on_frame`.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}
