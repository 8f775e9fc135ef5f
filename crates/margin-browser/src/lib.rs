//! Browser DOM layer for margin.
//!
//! Implements the platform traits of margin-core and margin-canvas with
//! `web-sys`. Assumes a `wasm32-unknown-unknown` target.
//!
//! - `selection`: window selection mapped onto a container's text
//! - `surface`: 2D canvas drawing, eraser via `destination-out`
//! - `frame`: `requestAnimationFrame` scheduling and local task spawning
//! - `binding`: pointer listeners and autosave timers for a mounted canvas
//!
//! Re-exports both core crates so consumers only depend on this one.

pub use margin_canvas;
pub use margin_core;

pub mod binding;
pub mod frame;
pub mod selection;
pub mod surface;

pub use binding::{
    BrowserCanvas, BrowserPersistence, PointerBinding, arm_autosave, mount_canvas,
};
pub use frame::{AnimationFrameScheduler, LocalSpawner};
pub use selection::DomSelectionProvider;
pub use surface::CanvasSurface;

/// Install panic reporting and a console tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    console_error_panic_hook::set_once();

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
