//! wasm-bindgen adapter: drives `scrollcue-core` from a live page.
//!
//! ```js
//! const site = new ScrollcueSite({ navbar: { threshold: 80 } });
//! document.addEventListener("DOMContentLoaded", () => site.start());
//! ```

use scrollcue_core::{Capability, Config, Presentation};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

mod apply;
mod dom;
mod events;
mod observer;
mod raf;
mod site;

use dom::DomDocument;
use events::Listeners;
use raf::FrameLoop;
use site::{dispatch, env_signals, Shared, Site};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn init_logging() {
    // A second site on the same page finds the logger already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
pub struct ScrollcueSite {
    site: Shared,
    listeners: Listeners,
    frames: Option<FrameLoop>,
}

#[wasm_bindgen]
impl ScrollcueSite {
    /// Create a site controller. Pass a partial config object, or
    /// undefined/null for defaults. Nothing touches the page until `start`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ScrollcueSite, JsError> {
        console_error_panic_hook::set_once();
        init_logging();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("no document"))?;
        let capability = if observer::is_supported(&window) {
            Capability::Native
        } else {
            log::info!("IntersectionObserver unavailable; polling layout on scroll");
            Capability::Geometric
        };
        let core = Presentation::new(cfg, capability)
            .map_err(|e| JsError::new(&format!("config error: {e}")))?;

        Ok(ScrollcueSite {
            site: Site::shared(core, DomDocument::new(window, document)),
            listeners: Listeners::default(),
            frames: None,
        })
    }

    /// Document-ready: classify the device, register every animation and
    /// begin the frame loop. Calling it again is a no-op.
    pub fn start(&mut self) -> Result<(), JsError> {
        if self.frames.is_some() {
            return Ok(());
        }
        let weak = std::rc::Rc::downgrade(&self.site);
        let env = env_signals(self.site.borrow().dom.window());
        let mut failure = None;
        dispatch(&weak, |s| match s.core.start(&s.dom, env) {
            Ok(out) => out.clone(),
            Err(err) => {
                failure = Some(err);
                Default::default()
            }
        });
        if let Some(err) = failure {
            return Err(JsError::new(&format!("start error: {err}")));
        }

        events::wire(&weak, &mut self.listeners);
        let frame_site = weak.clone();
        let frames = FrameLoop::new(move |dt, now_ms| {
            dispatch(&frame_site, |s| s.core.update(dt, now_ms, &s.dom).clone());
        });
        frames.start();
        self.frames = Some(frames);
        Ok(())
    }

    /// Remove every listener, observer, timeline and overlay. Idempotent.
    pub fn teardown(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.stop();
        }
        self.listeners.clear();
        let weak = std::rc::Rc::downgrade(&self.site);
        dispatch(&weak, |s| s.core.teardown().clone());
    }

    /// Active device tier, e.g. `"mobile"`.
    #[wasm_bindgen(getter)]
    pub fn tier(&self) -> String {
        self.site.borrow().core.tier().name().to_string()
    }

    #[wasm_bindgen(getter, js_name = isTornDown)]
    pub fn is_torn_down(&self) -> bool {
        self.site.borrow().core.is_torn_down()
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.frames.as_ref().is_some_and(FrameLoop::is_running)
    }

    /// Live visibility subscriptions in the core.
    #[wasm_bindgen(getter, js_name = subscriptionCount)]
    pub fn subscription_count(&self) -> usize {
        self.site.borrow().core.watcher().len()
    }

    /// Native observer subscriptions currently mirrored on the page.
    #[wasm_bindgen(getter, js_name = observedCount)]
    pub fn observed_count(&self) -> usize {
        self.site.borrow().observers.len()
    }

    #[wasm_bindgen(getter, js_name = listenerCount)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The effective configuration as a plain object.
    pub fn config(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.site.borrow().core.config())
            .map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
