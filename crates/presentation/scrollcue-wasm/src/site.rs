//! Shared page state and the dispatch path every browser callback takes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use scrollcue_core::{EnvSignals, Outputs, Presentation};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::apply::{apply_changes, PendingPlay};
use crate::dom::DomDocument;
use crate::observer::{EntryHandler, Observers};

pub(crate) struct Site {
    pub core: Presentation,
    pub dom: DomDocument,
    pub observers: Observers,
}

pub(crate) type Shared = Rc<RefCell<Site>>;
pub(crate) type WeakSite = Weak<RefCell<Site>>;

impl Site {
    /// Wrap `core` and route native observer callbacks back into it.
    pub fn shared(core: Presentation, dom: DomDocument) -> Shared {
        Rc::new_cyclic(|weak: &WeakSite| {
            let weak = weak.clone();
            let handler: EntryHandler = Rc::new(move |key: &str, entries: js_sys::Array| {
                dispatch(&weak, |s| {
                    let entries = s.observers.translate(key, &entries, &s.dom);
                    s.core.on_intersections(&entries, &s.dom).clone()
                });
            });
            RefCell::new(Site {
                core,
                dom,
                observers: Observers::new(handler),
            })
        })
    }

    /// Apply `outputs` and mirror pending observer work.
    fn flush(&mut self, outputs: &Outputs) -> Vec<PendingPlay> {
        let plays = apply_changes(&self.dom, &outputs.changes);
        for event in &outputs.events {
            log::debug!("scrollcue event: {event:?}");
        }
        let ops = self.core.drain_native_ops();
        self.observers.mirror(ops, &self.dom);
        plays
    }
}

/// Run `f` against the site, apply what it returns and settle any play
/// requests. `None` when the site is gone or already borrowed.
pub(crate) fn dispatch(
    site: &WeakSite,
    f: impl FnOnce(&mut Site) -> Outputs,
) -> Option<Outputs> {
    let shared = site.upgrade()?;
    let (outputs, plays) = {
        let Ok(mut s) = shared.try_borrow_mut() else {
            log::warn!("re-entrant page event dropped");
            return None;
        };
        let outputs = f(&mut s);
        let plays = s.flush(&outputs);
        (outputs, plays)
    };
    settle(site, plays);
    Some(outputs)
}

fn settle(site: &WeakSite, plays: Vec<PendingPlay>) {
    for PendingPlay { media, promise } in plays {
        let Some(promise) = promise else {
            dispatch(site, |s| s.core.on_video_play(false, media.playback_rate()).clone());
            continue;
        };
        let ok_site = site.clone();
        let resolved = Closure::once(move |_: JsValue| {
            dispatch(&ok_site, |s| {
                s.core.on_video_play(true, media.playback_rate()).clone()
            });
        });
        let err_site = site.clone();
        let rejected = Closure::once(move |_: JsValue| {
            dispatch(&err_site, |s| s.core.on_video_play(false, 0.0).clone());
        });
        let _ = promise.then2(&resolved, &rejected);
        // One settlement per play request; the closures live until then.
        resolved.forget();
        rejected.forget();
    }
}

/// Device and page signals for tier classification.
pub(crate) fn env_signals(window: &Window) -> EnvSignals {
    let length = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    let prefers_reduced_motion = window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|m| m.matches());
    let navigator = window.navigator();
    let cores = navigator.hardware_concurrency();
    let device_memory_gb = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|gb| gb as f32);
    EnvSignals {
        viewport_width: length(window.inner_width()),
        viewport_height: length(window.inner_height()),
        prefers_reduced_motion,
        hardware_concurrency: (cores > 0.0).then_some(cores as u32),
        device_memory_gb,
        user_agent: navigator.user_agent().unwrap_or_default(),
        hidden: window.document().is_some_and(|d| d.hidden()),
    }
}
