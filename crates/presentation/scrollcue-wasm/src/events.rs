//! Browser event listeners feeding the core.

use scrollcue_core::{LifecycleEvent, MediaEvent, Point};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Event, EventTarget, HtmlInputElement, HtmlMediaElement, MouseEvent};

use crate::raf::performance_now;
use crate::site::{dispatch, env_signals, WeakSite};

type Listener = Closure<dyn FnMut(Event)>;

/// Registered listeners; removed on [`Listeners::clear`] or drop.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(EventTarget, &'static str, Listener)>,
}

impl Listeners {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, target: &EventTarget, kind: &'static str, f: impl FnMut(Event) + 'static) {
        let listener = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(matches!(kind, "scroll" | "mousemove"));
        if let Err(err) = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            listener.as_ref().unchecked_ref(),
            &options,
        ) {
            log::warn!("listener {kind} not attached: {err:?}");
            return;
        }
        self.entries.push((target.clone(), kind, listener));
    }

    pub fn clear(&mut self) {
        for (target, kind, listener) in self.entries.drain(..) {
            let _ = target.remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        self.clear();
    }
}

fn pointer_of(event: &Event) -> Point {
    event
        .dyn_ref::<MouseEvent>()
        .map(|m| Point {
            x: m.client_x() as f32,
            y: m.client_y() as f32,
        })
        .unwrap_or_default()
}

/// Attach every page listener the core needs.
pub(crate) fn wire(site: &WeakSite, listeners: &mut Listeners) {
    let Some(shared) = site.upgrade() else {
        return;
    };
    let s = shared.borrow();
    let window = s.dom.window().clone();
    let document = s.dom.document().clone();
    let config = s.core.config().clone();

    {
        let site = site.clone();
        listeners.add(&window, "scroll", move |_| {
            dispatch(&site, |s| {
                let y = s.dom.scroll_y();
                s.core.on_scroll(y, &s.dom).clone()
            });
        });
    }

    let lifecycle = |event_of: fn(&web_sys::Document) -> LifecycleEvent| {
        let site = site.clone();
        let window = window.clone();
        let document = document.clone();
        move |_: Event| {
            let event = event_of(&document);
            let env = env_signals(&window);
            dispatch(&site, |s| {
                s.core
                    .on_lifecycle(event, performance_now(), &env, &s.dom)
                    .clone()
            });
        }
    };
    listeners.add(&window, "load", lifecycle(|_| LifecycleEvent::Load));
    listeners.add(&window, "resize", lifecycle(|_| LifecycleEvent::Resize));
    listeners.add(
        &window,
        "orientationchange",
        lifecycle(|_| LifecycleEvent::OrientationChange),
    );
    listeners.add(&window, "beforeunload", lifecycle(|_| LifecycleEvent::Unload));
    listeners.add(
        &document,
        "visibilitychange",
        lifecycle(|d| LifecycleEvent::VisibilityChanged { hidden: d.hidden() }),
    );

    let pointer_targets = [
        config.magnetic.selector.as_str(),
        config.hover.row_selector.as_str(),
        config.hover.image_selector.as_str(),
    ]
    .join(", ");
    for element in s.dom.select(&pointer_targets) {
        let id = s.dom.id_of(&element);
        {
            let site = site.clone();
            listeners.add(&element, "mouseenter", move |_| {
                dispatch(&site, |s| s.core.on_pointer_enter(id, &s.dom).clone());
            });
        }
        {
            let site = site.clone();
            listeners.add(&element, "mousemove", move |e| {
                let pointer = pointer_of(&e);
                dispatch(&site, |s| s.core.on_pointer_move(id, pointer, &s.dom).clone());
            });
        }
        {
            let site = site.clone();
            listeners.add(&element, "mouseleave", move |_| {
                dispatch(&site, |s| s.core.on_pointer_leave(id, &s.dom).clone());
            });
        }
    }

    for element in s.dom.select(&config.magnetic.selector) {
        let id = s.dom.id_of(&element);
        let site = site.clone();
        listeners.add(&element, "click", move |e| {
            let pointer = pointer_of(&e);
            dispatch(&site, |s| {
                let (core, dom) = (&mut s.core, &mut s.dom);
                core.on_click(id, pointer, dom).clone()
            });
        });
    }

    for link in s.dom.select("a[href^='#']") {
        let site = site.clone();
        let href = link.get_attribute("href").unwrap_or_default();
        listeners.add(&link, "click", move |e| {
            let scrolled = dispatch(&site, |s| s.core.on_anchor_click(&href, &s.dom).clone())
                .is_some_and(|out| {
                    out.changes
                        .iter()
                        .any(|c| matches!(c, scrollcue_core::Change::ScrollTo { .. }))
                });
            if scrolled {
                e.prevent_default();
            }
        });
    }

    if let Some(form) = s.dom.select(&config.newsletter.form_selector).into_iter().next() {
        let site = site.clone();
        let document = document.clone();
        let input_selector = config.newsletter.input_selector.clone();
        listeners.add(&form, "submit", move |e| {
            e.prevent_default();
            let value = document
                .query_selector(&input_selector)
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();
            dispatch(&site, |s| s.core.on_submit(&value, &s.dom).clone());
        });
    }

    let video = s
        .dom
        .select(&config.video.selector)
        .into_iter()
        .next()
        .and_then(|el| el.dyn_into::<HtmlMediaElement>().ok());
    if let Some(video) = video {
        for (kind, event) in [
            ("loadedmetadata", MediaEvent::LoadedMetadata),
            ("canplay", MediaEvent::CanPlay),
            ("play", MediaEvent::Play),
            ("ratechange", MediaEvent::RateChange),
        ] {
            let site = site.clone();
            let media = video.clone();
            listeners.add(&video, kind, move |_| {
                let rate = media.playback_rate();
                dispatch(&site, |s| s.core.on_media_event(event, rate).clone());
            });
        }
    }
}
