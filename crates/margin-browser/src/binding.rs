//! Wiring a canvas element to a `StrokeCanvas` and its persistence.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use margin_canvas::{CanvasApi, CanvasConfig, CanvasPersistence, StrokeCanvas};
use margin_core::{PlatformError, Point};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use crate::frame::{AnimationFrameScheduler, LocalSpawner};
use crate::surface::CanvasSurface;

pub type BrowserCanvas = StrokeCanvas<CanvasSurface, AnimationFrameScheduler>;
pub type BrowserPersistence<A> = CanvasPersistence<A, LocalSpawner>;

/// Build a canvas over `element` whose frame callbacks reach back into it.
pub fn mount_canvas(
    element: web_sys::HtmlCanvasElement,
    config: CanvasConfig,
) -> Result<Rc<RefCell<BrowserCanvas>>, PlatformError> {
    let surface = CanvasSurface::new(element)?;
    Ok(Rc::new_cyclic(|weak: &Weak<RefCell<BrowserCanvas>>| {
        let weak = weak.clone();
        let scheduler = AnimationFrameScheduler::new(move || {
            if let Some(canvas) = weak.upgrade() {
                canvas.borrow_mut().on_frame();
            }
        });
        RefCell::new(StrokeCanvas::new(surface, scheduler, config))
    }))
}

/// Set a timeout for the persistence's debounce deadline, if one is pending.
///
/// Each change arms its own timeout. A timeout that fires early because a
/// later change moved the deadline finds nothing due and does nothing.
pub fn arm_autosave<A: CanvasApi>(persistence: &Rc<RefCell<BrowserPersistence<A>>>) {
    let Some(deadline) = persistence.borrow().deadline() else {
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };
    let delay = deadline.saturating_duration_since(Instant::now()).as_millis() as i32;
    let weak = Rc::downgrade(persistence);
    let closure = Closure::once(move || {
        if let Some(persistence) = weak.upgrade() {
            persistence.borrow_mut().poll(Instant::now());
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        delay.saturating_add(1),
    ) {
        tracing::warn!("setTimeout failed: {:?}", e);
        return;
    }
    closure.forget();
}

type PointerHandler = Closure<dyn FnMut(web_sys::PointerEvent)>;

/// Pointer listeners on the canvas element. Removed on drop.
pub struct PointerBinding {
    target: web_sys::EventTarget,
    handlers: Vec<(&'static str, PointerHandler)>,
}

impl PointerBinding {
    pub fn attach<A: CanvasApi>(
        canvas: Rc<RefCell<BrowserCanvas>>,
        persistence: Rc<RefCell<BrowserPersistence<A>>>,
    ) -> Result<Self, PlatformError> {
        let element = canvas.borrow().surface().canvas().clone();
        let target: web_sys::EventTarget = element.clone().into();
        let mut binding = Self {
            target,
            handlers: Vec::new(),
        };

        let down_canvas = Rc::clone(&canvas);
        binding.listen("pointerdown", move |evt: web_sys::PointerEvent| {
            evt.prevent_default();
            let _ = element.set_pointer_capture(evt.pointer_id());
            down_canvas.borrow_mut().pointer_down(point(&evt));
        })?;

        let move_canvas = Rc::clone(&canvas);
        binding.listen("pointermove", move |evt: web_sys::PointerEvent| {
            move_canvas.borrow_mut().pointer_move(point(&evt));
        })?;

        for event in ["pointerup", "pointercancel"] {
            let canvas = Rc::clone(&canvas);
            let persistence = Rc::clone(&persistence);
            binding.listen(event, move |_evt: web_sys::PointerEvent| {
                let committed = canvas
                    .borrow_mut()
                    .pointer_up(&mut *persistence.borrow_mut());
                if committed {
                    arm_autosave(&persistence);
                }
            })?;
        }
        Ok(binding)
    }

    fn listen(
        &mut self,
        event: &'static str,
        handler: impl FnMut(web_sys::PointerEvent) + 'static,
    ) -> Result<(), PlatformError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::PointerEvent)>);
        self.target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| PlatformError(format!("{e:?}")))?;
        self.handlers.push((event, closure));
        Ok(())
    }
}

impl Drop for PointerBinding {
    fn drop(&mut self) {
        for (event, closure) in &self.handlers {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

fn point(evt: &web_sys::PointerEvent) -> Point {
    Point::new(evt.offset_x() as f64, evt.offset_y() as f64)
}
