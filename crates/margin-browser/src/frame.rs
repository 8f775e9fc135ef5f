//! `requestAnimationFrame` scheduling and local task spawning.

use std::rc::Rc;

use margin_canvas::{FrameScheduler, LocalTask, Spawner};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Calls `on_frame` at the next display refresh after each request.
///
/// The canvas only requests a frame when none is outstanding, so there is at
/// most one pending callback at a time.
#[derive(Clone)]
pub struct AnimationFrameScheduler {
    on_frame: Rc<dyn Fn()>,
}

impl AnimationFrameScheduler {
    pub fn new(on_frame: impl Fn() + 'static) -> Self {
        Self {
            on_frame: Rc::new(on_frame),
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let on_frame = Rc::clone(&self.on_frame);
        let closure = Closure::once(move || on_frame());
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            tracing::warn!("requestAnimationFrame failed: {:?}", e);
            return;
        }
        closure.forget();
    }
}

/// Runs persistence tasks on the browser event loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSpawner;

impl Spawner for LocalSpawner {
    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
