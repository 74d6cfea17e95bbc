//! Native `IntersectionObserver`s mirroring the core watcher.
//!
//! Subscriptions with equal [`ObserveOptions::key`] share one observer. Each
//! observer reports entries per target element; they are fanned back out to
//! every subscription on that element. A subscription joining an element that
//! is already observed gets its own initial entry.

use std::rc::Rc;

use hashbrown::HashMap;

use scrollcue_core::{
    Document, ElementId, EntryPosition, IntersectionEntry, NativeOp, ObserveOptions,
    SubscriptionId,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::dom::DomDocument;

/// Receives raw entries together with the key of the observer that saw them.
pub type EntryHandler = Rc<dyn Fn(&str, js_sys::Array)>;

type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct Group {
    observer: IntersectionObserver,
    _closure: ObserverClosure,
    members: HashMap<ElementId, Vec<SubscriptionId>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Join {
    /// First subscription on the element.
    Observe,
    /// The element is already observed for another subscription.
    Reobserve,
}

fn join(
    members: &mut HashMap<ElementId, Vec<SubscriptionId>>,
    element: ElementId,
    subscription: SubscriptionId,
) -> Join {
    let list = members.entry(element).or_default();
    let join = if list.is_empty() {
        Join::Observe
    } else {
        Join::Reobserve
    };
    list.push(subscription);
    join
}

/// `true` when the page exposes `IntersectionObserver`.
pub fn is_supported(window: &web_sys::Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

pub struct Observers {
    handler: EntryHandler,
    groups: HashMap<String, Group>,
    keys: HashMap<SubscriptionId, String>,
}

impl Observers {
    pub fn new(handler: EntryHandler) -> Self {
        Self {
            handler,
            groups: HashMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Subscriptions currently mirrored.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn mirror(&mut self, ops: Vec<NativeOp>, dom: &DomDocument) {
        for op in ops {
            match op {
                NativeOp::Observe {
                    subscription,
                    element,
                    options,
                } => self.observe(subscription, element, &options, dom),
                NativeOp::Unobserve {
                    subscription,
                    element,
                } => self.unobserve(subscription, element, dom),
                NativeOp::DisconnectAll => self.disconnect_all(),
            }
        }
    }

    fn observe(
        &mut self,
        subscription: SubscriptionId,
        element: ElementId,
        options: &ObserveOptions,
        dom: &DomDocument,
    ) {
        let Some(target) = dom.element(element) else {
            return;
        };
        let key = options.key(dom.viewport().height);
        if !self.groups.contains_key(&key) {
            match self.create_group(&key, options, dom) {
                Ok(group) => {
                    self.groups.insert(key.clone(), group);
                }
                Err(err) => {
                    log::warn!("IntersectionObserver({key}) failed: {err:?}");
                    return;
                }
            }
        }
        let Some(group) = self.groups.get_mut(&key) else {
            return;
        };
        if join(&mut group.members, element, subscription) == Join::Reobserve {
            // Observing an observed target is a no-op; cycling it makes the
            // browser deliver an initial entry for the new subscription.
            group.observer.unobserve(&target);
        }
        group.observer.observe(&target);
        self.keys.insert(subscription, key);
    }

    fn create_group(
        &self,
        key: &str,
        options: &ObserveOptions,
        dom: &DomDocument,
    ) -> Result<Group, JsValue> {
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin.to_css(dom.viewport().height));
        init.set_threshold(&JsValue::from_f64(f64::from(options.threshold)));

        let handler = Rc::clone(&self.handler);
        let owned_key = key.to_string();
        let closure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                handler(&owned_key, entries);
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)?;
        Ok(Group {
            observer,
            _closure: closure,
            members: HashMap::new(),
        })
    }

    fn unobserve(&mut self, subscription: SubscriptionId, element: ElementId, dom: &DomDocument) {
        let Some(key) = self.keys.remove(&subscription) else {
            return;
        };
        let Some(group) = self.groups.get_mut(&key) else {
            return;
        };
        let Some(members) = group.members.get_mut(&element) else {
            return;
        };
        members.retain(|s| *s != subscription);
        if members.is_empty() {
            group.members.remove(&element);
            if let Some(target) = dom.element(element) {
                group.observer.unobserve(&target);
            }
        }
    }

    pub fn disconnect_all(&mut self) {
        for group in self.groups.values() {
            group.observer.disconnect();
        }
        self.groups.clear();
        self.keys.clear();
    }

    /// Turn one observer callback into per-subscription entries.
    pub fn translate(
        &self,
        key: &str,
        entries: &js_sys::Array,
        dom: &DomDocument,
    ) -> Vec<IntersectionEntry> {
        let Some(group) = self.groups.get(key) else {
            return Vec::new();
        };
        let viewport_height = f64::from(dom.viewport().height);
        let mut out = Vec::new();
        for raw in entries.iter() {
            let Ok(entry) = raw.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let element = dom.id_of(&entry.target());
            let Some(subscriptions) = group.members.get(&element) else {
                continue;
            };
            let position = position_of(&entry, viewport_height);
            let ratio = entry.intersection_ratio() as f32;
            out.extend(subscriptions.iter().map(|subscription| IntersectionEntry {
                subscription: *subscription,
                ratio,
                position,
            }));
        }
        out
    }
}

fn position_of(entry: &IntersectionObserverEntry, viewport_height: f64) -> EntryPosition {
    if entry.is_intersecting() {
        return EntryPosition::Inside;
    }
    let root_bottom = entry
        .root_bounds()
        .map_or(viewport_height, |bounds| bounds.bottom());
    if entry.bounding_client_rect().top() >= root_bottom {
        EntryPosition::Before
    } else {
        EntryPosition::After
    }
}

impl Drop for Observers {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_subscriptions_cycle_the_target() {
        let mut members = HashMap::new();
        assert_eq!(join(&mut members, ElementId(1), SubscriptionId(1)), Join::Observe);
        assert_eq!(join(&mut members, ElementId(1), SubscriptionId(2)), Join::Reobserve);
        assert_eq!(join(&mut members, ElementId(2), SubscriptionId(3)), Join::Observe);
        assert_eq!(members[&ElementId(1)], vec![SubscriptionId(1), SubscriptionId(2)]);
    }
}
