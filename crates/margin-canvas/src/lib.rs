//! margin-canvas: freehand stroke canvas over annotated content.
//!
//! - `StrokeCanvas` - tools, frame-batched fast path, committed stroke list
//! - `CanvasData` - the per-page persistence unit
//! - `CanvasPersistence` - fetch on page change, debounced auto-save,
//!   flush on teardown
//!
//! Drawing and scheduling go through the `DrawingSurface` and
//! `FrameScheduler` traits; margin-browser implements them over a 2D canvas.

pub mod canvas;
pub mod config;
pub mod debounce;
pub mod error;
pub mod persistence;
pub mod stroke;
pub mod surface;
pub mod tool;

pub use canvas::{CanvasListener, StrokeCanvas};
pub use config::CanvasConfig;
pub use debounce::Debouncer;
pub use error::PersistenceError;
pub use persistence::{
    CanvasApi, CanvasKey, CanvasPersistence, CanvasRecord, LoadState, LocalTask,
    SaveCanvasRequest, SaveStatus, Spawner, TargetType, Visibility,
};
pub use stroke::{CanvasData, Stroke};
pub use surface::{DrawingSurface, FrameScheduler};
pub use tool::{CompositeOp, Tool, ToolStyle};
