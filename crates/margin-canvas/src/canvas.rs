//! The stroke canvas.
//!
//! Two write paths. Pointer moves go into a pending buffer that is flushed to
//! the [`DrawingSurface`] at most once per frame. The committed stroke list,
//! which persistence and undo read, changes once per finished stroke.

use margin_core::{Clock, Point, SystemClock};
use smol_str::{SmolStr, format_smolstr};

use crate::config::CanvasConfig;
use crate::stroke::{CanvasData, Stroke};
use crate::surface::{DrawingSurface, FrameScheduler};
use crate::tool::Tool;

/// Receives the full committed stroke list after every change.
pub trait CanvasListener {
    fn on_change(&mut self, lines: &[Stroke], version: i64);
}

impl<F: FnMut(&[Stroke], i64)> CanvasListener for F {
    fn on_change(&mut self, lines: &[Stroke], version: i64) {
        self(lines, version)
    }
}

pub struct StrokeCanvas<S, F, C = SystemClock> {
    surface: S,
    scheduler: F,
    clock: C,
    config: CanvasConfig,
    tool: Tool,
    color_override: Option<SmolStr>,
    read_only: bool,
    lines: Vec<Stroke>,
    /// Stroke in progress. Holds every point so far; not part of `lines`.
    active: Option<Stroke>,
    /// Points received since the last frame, not yet drawn.
    pending: Vec<f64>,
    frame_requested: bool,
    version: i64,
    minted: u64,
}

impl<S: DrawingSurface, F: FrameScheduler> StrokeCanvas<S, F, SystemClock> {
    pub fn new(surface: S, scheduler: F, config: CanvasConfig) -> Self {
        Self::with_clock(surface, scheduler, SystemClock, config)
    }
}

impl<S: DrawingSurface, F: FrameScheduler, C: Clock> StrokeCanvas<S, F, C> {
    pub fn with_clock(surface: S, scheduler: F, clock: C, config: CanvasConfig) -> Self {
        Self {
            surface,
            scheduler,
            clock,
            config,
            tool: Tool::default(),
            color_override: None,
            read_only: false,
            lines: Vec::new(),
            active: None,
            pending: Vec::new(),
            frame_requested: false,
            version: 0,
            minted: 0,
        }
    }

    pub fn lines(&self) -> &[Stroke] {
        &self.lines
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Takes effect from the next stroke.
    pub fn set_tool(&mut self, tool: Tool) {
        tracing::debug!(?tool, "tool selected");
        self.tool = tool;
    }

    /// Replace the pen/highlighter colour. `None` restores the tool default.
    pub fn set_color(&mut self, color: Option<&str>) {
        self.color_override = color.map(SmolStr::new);
    }

    /// Entering read-only mode drops any stroke in progress.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only && self.abandon_stroke() {
            self.surface.redraw(&self.lines);
        }
    }

    pub fn pointer_down(&mut self, at: Point) {
        if self.read_only {
            return;
        }
        if self.active.is_some() {
            tracing::trace!("pointer down during stroke ignored");
            return;
        }
        let style = self.config.style_for(self.tool);
        let color = match &self.color_override {
            Some(color) if self.tool.takes_color() => color.clone(),
            _ => style.color.clone(),
        };
        self.minted += 1;
        let stroke = Stroke {
            id: format_smolstr!("stroke-{}-{}", self.clock.now_millis(), self.minted),
            tool: self.tool,
            points: vec![at.x, at.y],
            color,
            stroke_width: style.stroke_width,
            opacity: style.opacity,
        };
        tracing::trace!(id = %stroke.id, tool = ?stroke.tool, "stroke started");
        self.surface.begin_stroke(&stroke);
        self.active = Some(stroke);
    }

    pub fn pointer_move(&mut self, at: Point) {
        let Some(stroke) = &mut self.active else {
            return;
        };
        stroke.points.extend([at.x, at.y]);
        self.pending.extend([at.x, at.y]);
        if !self.frame_requested {
            self.frame_requested = true;
            self.scheduler.request_frame();
        }
    }

    /// Display refresh: draw the points buffered since the last frame.
    pub fn on_frame(&mut self) {
        self.frame_requested = false;
        self.flush_pending();
    }

    /// Finish the stroke in progress. A stray up with no preceding down is
    /// ignored. Returns whether a stroke was committed.
    pub fn pointer_up(&mut self, listener: &mut impl CanvasListener) -> bool {
        self.flush_pending();
        let Some(stroke) = self.active.take() else {
            return false;
        };
        self.surface.end_stroke();
        tracing::debug!(id = %stroke.id, points = stroke.point_count(), "stroke committed");
        self.lines.push(stroke);
        self.changed(listener);
        true
    }

    /// Remove the most recent stroke.
    pub fn undo(&mut self, listener: &mut impl CanvasListener) -> Option<Stroke> {
        let removed = self.lines.pop();
        self.surface.redraw(&self.lines);
        self.changed(listener);
        removed
    }

    pub fn clear(&mut self, listener: &mut impl CanvasListener) {
        self.lines.clear();
        self.abandon_stroke();
        self.surface.redraw(&self.lines);
        self.changed(listener);
    }

    /// Resize the surface. Stroke coordinates stay in their original space.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface.resize(width, height);
        self.surface.redraw(&self.lines);
    }

    /// Replace the strokes with stored data. Does not notify.
    pub fn load(&mut self, data: CanvasData) {
        tracing::debug!(lines = data.lines.len(), version = data.version, "canvas loaded");
        self.lines = data.lines;
        self.version = data.version;
        self.abandon_stroke();
        self.surface.redraw(&self.lines);
    }

    pub fn to_canvas_data(&self) -> CanvasData {
        CanvasData {
            lines: self.lines.clone(),
            version: self.version,
        }
    }

    /// Drop any stroke in progress without committing it. Returns whether
    /// there was one.
    fn abandon_stroke(&mut self) -> bool {
        self.pending.clear();
        if self.active.take().is_none() {
            return false;
        }
        self.surface.end_stroke();
        true
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() || self.active.is_none() {
            self.pending.clear();
            return;
        }
        self.surface.extend_stroke(&self.pending);
        self.pending.clear();
    }

    fn changed(&mut self, listener: &mut impl CanvasListener) {
        // Strictly increasing even if the wall clock stalls or steps back.
        self.version = self.clock.now_millis().max(self.version + 1);
        listener.on_change(&self.lines, self.version);
    }
}
