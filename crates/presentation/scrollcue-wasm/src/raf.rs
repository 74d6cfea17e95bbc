//! `requestAnimationFrame` frame source.
//!
//! [`FrameLoop`] calls its callback once per animation frame with the elapsed
//! seconds since the previous frame and the rAF timestamp in milliseconds.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

/// Longest step handed to the core; longer gaps (background tabs, debugger
/// pauses) are clamped.
const MAX_FRAME_SECS: f64 = 0.1;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);

    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;
}

type FrameClosure = Closure<dyn FnMut(f64)>;

pub struct FrameLoop {
    inner: Rc<FrameInner>,
}

struct FrameInner {
    closure: RefCell<Option<FrameClosure>>,
    callback: RefCell<Box<dyn FnMut(f32, f64)>>,
    last_ms: Cell<Option<f64>>,
    running: Cell<bool>,
    raf_id: Cell<i32>,
}

impl FrameLoop {
    /// A stopped loop; call [`start`](Self::start) to begin.
    pub fn new(callback: impl FnMut(f32, f64) + 'static) -> Self {
        Self {
            inner: Rc::new(FrameInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                last_ms: Cell::new(None),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);
        self.inner.last_ms.set(None);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |now_ms: f64| {
            if !inner.running.get() {
                return;
            }
            let dt = inner
                .last_ms
                .get()
                .map_or(0.0, |last| ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_SECS));
            inner.last_ms.set(Some(now_ms));

            inner.callback.borrow_mut()(dt as f32, now_ms);

            if inner.running.get() {
                if let Some(ref closure) = *inner.closure.borrow() {
                    inner
                        .raf_id
                        .set(request_animation_frame(closure.as_ref().unchecked_ref()));
                }
            }
        }) as Box<dyn FnMut(f64)>);

        self.inner
            .raf_id
            .set(request_animation_frame(closure.as_ref().unchecked_ref()));
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_animation_frame(self.inner.raf_id.get());
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        // Breaks the closure -> inner reference cycle.
        self.inner.closure.borrow_mut().take();
    }
}
