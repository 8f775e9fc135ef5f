//! 2D canvas drawing surface.

use margin_canvas::{CompositeOp, DrawingSurface, Stroke};
use margin_core::PlatformError;
use wasm_bindgen::JsCast;

pub struct CanvasSurface {
    canvas: web_sys::HtmlCanvasElement,
    ctx: web_sys::CanvasRenderingContext2d,
    /// End of the segment drawn last, where the next extend continues from.
    last: Option<(f64, f64)>,
}

impl CanvasSurface {
    pub fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, PlatformError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| PlatformError(format!("{e:?}")))?
            .ok_or_else(|| PlatformError::from("2d context unavailable"))?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()
            .map_err(|_| PlatformError::from("not a 2d context"))?;
        Ok(Self {
            canvas,
            ctx,
            last: None,
        })
    }

    pub fn canvas(&self) -> &web_sys::HtmlCanvasElement {
        &self.canvas
    }

    fn apply_style(&self, stroke: &Stroke) {
        let ctx = &self.ctx;
        if let Err(e) = ctx.set_global_composite_operation(stroke.composite().as_css()) {
            tracing::warn!("composite operation rejected: {:?}", e);
        }
        ctx.set_stroke_style_str(&stroke.color);
        ctx.set_line_width(stroke.stroke_width);
        ctx.set_global_alpha(stroke.opacity);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
    }

    fn reset_style(&self) {
        let _ = self
            .ctx
            .set_global_composite_operation(CompositeOp::SourceOver.as_css());
        self.ctx.set_global_alpha(1.0);
    }

    fn draw_full(&self, stroke: &Stroke) {
        let mut pairs = stroke.pairs();
        let Some((x, y)) = pairs.next() else {
            return;
        };
        self.apply_style(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(x, y);
        // A tap still leaves a dot.
        self.ctx.line_to(x, y);
        for (x, y) in pairs {
            self.ctx.line_to(x, y);
        }
        self.ctx.stroke();
        self.reset_style();
    }
}

impl DrawingSurface for CanvasSurface {
    fn begin_stroke(&mut self, stroke: &Stroke) {
        let Some(first) = stroke.pairs().next() else {
            return;
        };
        self.apply_style(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(first.0, first.1);
        self.ctx.line_to(first.0, first.1);
        self.ctx.stroke();
        self.last = Some(first);
    }

    fn extend_stroke(&mut self, points: &[f64]) {
        let Some((x0, y0)) = self.last else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(x0, y0);
        for p in points.chunks_exact(2) {
            self.ctx.line_to(p[0], p[1]);
            self.last = Some((p[0], p[1]));
        }
        self.ctx.stroke();
    }

    fn end_stroke(&mut self) {
        self.last = None;
        self.reset_style();
    }

    fn redraw(&mut self, lines: &[Stroke]) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        for stroke in lines {
            self.draw_full(stroke);
        }
    }

    fn resize(&mut self, width: f64, height: f64) {
        // Setting the size also clears the bitmap; the canvas redraws after.
        self.canvas.set_width(width.max(0.0).round() as u32);
        self.canvas.set_height(height.max(0.0).round() as u32);
        tracing::debug!(width, height, "canvas resized");
    }
}
