//! Viewport intersection watcher.
//!
//! Subscriptions pair an element with observation options. Visibility changes
//! come either from the host's native observer (`deliver`) or from a
//! geometric pass over bounding rectangles (`poll`) when the host has none.
//! Either way the watcher reports [`Crossing`]s: subscriptions whose
//! visibility flipped since the previous report.
//!
//! Unsubscribing while a batch is being handled is deferred to
//! [`Watcher::finish_batch`], so callers can drop subscriptions from inside
//! their crossing handlers.

use std::fmt;
use std::str::FromStr;

use hashbrown::{HashMap, HashSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ScrollcueError;
use crate::host::Document;
use crate::ids::{ElementId, IdAllocator, SubscriptionId};
use crate::value::Rect;

/// One side of a root margin.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Length {
    Px(f32),
    /// Percentage of the viewport height.
    Percent(f32),
    /// Bottom margin that puts the observation edge at this many pixels from
    /// the viewport top.
    LineFromTop(f32),
}

impl Length {
    /// Margin in pixels; positive grows the observation box.
    pub fn resolve(&self, viewport_height: f32) -> f32 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(p) => p / 100.0 * viewport_height,
            Length::LineFromTop(px) => px - viewport_height,
        }
    }

    pub fn to_css(&self, viewport_height: f32) -> String {
        match *self {
            Length::Px(px) => format!("{px}px"),
            Length::Percent(p) => format!("{p}%"),
            Length::LineFromTop(_) => format!("{}px", self.resolve(viewport_height)),
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

/// Vertical root margin. Horizontal margins are always zero on this site.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: Length,
    pub bottom: Length,
}

impl RootMargin {
    /// The same margin on every side, e.g. `"50px"`.
    pub fn uniform(length: Length) -> Self {
        Self {
            top: length,
            bottom: length,
        }
    }

    pub fn to_css(&self, viewport_height: f32) -> String {
        format!(
            "{} 0px {} 0px",
            self.top.to_css(viewport_height),
            self.bottom.to_css(viewport_height)
        )
    }
}

fn parse_length(token: &str) -> Option<Length> {
    if let Some(px) = token.strip_suffix("px") {
        return px.parse().ok().map(Length::Px);
    }
    if let Some(p) = token.strip_suffix('%') {
        return p.parse().ok().map(Length::Percent);
    }
    if token == "0" {
        return Some(Length::Px(0.0));
    }
    None
}

impl FromStr for RootMargin {
    type Err = ScrollcueError;

    /// CSS shorthand with one to four values; left and right are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollcueError::InvalidRootMargin {
            text: s.to_string(),
        };
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;
        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, _] => Ok(Self::uniform(*vertical)),
            [top, _, bottom] | [top, _, bottom, _] => Ok(Self {
                top: *top,
                bottom: *bottom,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |l: &Length| match *l {
            Length::Px(px) => format!("{px}px"),
            Length::Percent(p) => format!("{p}%"),
            Length::LineFromTop(px) => format!("line({px}px)"),
        };
        write!(f, "{} 0px {} 0px", side(&self.top), side(&self.bottom))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObserveOptions {
    pub root_margin: RootMargin,
    /// Fraction of the element that must be inside the box.
    pub threshold: f32,
}

impl ObserveOptions {
    /// Box shrunk from the bottom by `margin` of the viewport height.
    pub fn reveal(margin: f32, threshold: f32) -> Self {
        Self {
            root_margin: RootMargin {
                top: Length::Px(0.0),
                bottom: Length::Percent(-margin * 100.0),
            },
            threshold,
        }
    }

    /// Host-side grouping key: subscriptions with equal keys can share one
    /// native observer.
    pub fn key(&self, viewport_height: f32) -> String {
        format!(
            "{}|{}",
            self.root_margin.to_css(viewport_height),
            self.threshold
        )
    }

    /// Observation box in viewport coordinates: (top, bottom).
    fn root_box(&self, viewport_height: f32) -> (f32, f32) {
        let top = -self.root_margin.top.resolve(viewport_height);
        let bottom = viewport_height + self.root_margin.bottom.resolve(viewport_height);
        (top, bottom)
    }

    /// Geometric intersection of `rect` with the observation box.
    pub fn measure(&self, rect: &Rect, viewport_height: f32) -> (f32, EntryPosition) {
        let (root_top, root_bottom) = self.root_box(viewport_height);
        if rect.top >= root_bottom {
            return (0.0, EntryPosition::Before);
        }
        if rect.bottom() <= root_top {
            return (0.0, EntryPosition::After);
        }
        let visible = rect.bottom().min(root_bottom) - rect.top.max(root_top);
        let ratio = if rect.height > 0.0 {
            (visible / rect.height).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (ratio, EntryPosition::Inside)
    }
}

/// Where an element sits relative to the observation box.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum EntryPosition {
    /// Below the box: not scrolled to yet.
    Before,
    Inside,
    /// Above the box: scrolled past.
    After,
}

/// A visibility report for one subscription.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub subscription: SubscriptionId,
    pub ratio: f32,
    pub position: EntryPosition,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossing {
    pub subscription: SubscriptionId,
    pub element: ElementId,
    pub entered: bool,
    pub position: EntryPosition,
}

/// How visibility reaches the watcher.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Capability {
    /// Host observer delivers entries.
    #[default]
    Native,
    /// No host observer; rectangles are polled.
    Geometric,
}

/// Work the host must mirror on its native observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NativeOp {
    Observe {
        subscription: SubscriptionId,
        element: ElementId,
        options: ObserveOptions,
    },
    Unobserve {
        subscription: SubscriptionId,
        element: ElementId,
    },
    DisconnectAll,
}

#[derive(Debug)]
struct Subscription {
    element: ElementId,
    options: ObserveOptions,
    visible: Option<bool>,
}

impl Subscription {
    fn is_visible(&self, ratio: f32, position: EntryPosition) -> bool {
        position == EntryPosition::Inside
            && (self.options.threshold <= 0.0 || ratio >= self.options.threshold)
    }
}

/// One-time load check: the element's top is above the line at
/// `1 - margin` of the viewport and its bottom is below the viewport top.
pub fn initially_visible(rect: &Rect, viewport_height: f32, margin: f32) -> bool {
    rect.top < viewport_height * (1.0 - margin) && rect.bottom() > 0.0
}

#[derive(Debug, Default)]
pub struct Watcher {
    ids: IdAllocator,
    subs: IndexMap<SubscriptionId, Subscription>,
    by_element: HashMap<ElementId, Vec<SubscriptionId>>,
    pending_removal: HashSet<SubscriptionId>,
    native_ops: Vec<NativeOp>,
    in_batch: bool,
    limit_callbacks: bool,
    capability: Capability,
}

impl Watcher {
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            ..Self::default()
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Switch to geometric polling, e.g. after the host reports no native
    /// observer. Existing subscriptions are kept.
    pub fn set_capability(&mut self, capability: Capability) {
        self.capability = capability;
    }

    pub fn set_limit_callbacks(&mut self, limit: bool) {
        self.limit_callbacks = limit;
    }

    pub fn limit_callbacks(&self) -> bool {
        self.limit_callbacks
    }

    pub fn observe(&mut self, element: ElementId, options: ObserveOptions) -> SubscriptionId {
        let id = self.ids.alloc_subscription();
        self.subs.insert(
            id,
            Subscription {
                element,
                options,
                visible: None,
            },
        );
        self.by_element.entry(element).or_default().push(id);
        if self.capability == Capability::Native {
            self.native_ops.push(NativeOp::Observe {
                subscription: id,
                element,
                options,
            });
        }
        id
    }

    /// Stop observing. Inside a batch the removal is applied by
    /// [`Watcher::finish_batch`]. Unknown ids are ignored.
    pub fn unobserve(&mut self, id: SubscriptionId) {
        if self.in_batch {
            if self.subs.contains_key(&id) {
                self.pending_removal.insert(id);
            }
            return;
        }
        self.remove_now(id);
    }

    fn remove_now(&mut self, id: SubscriptionId) {
        let Some(sub) = self.subs.shift_remove(&id) else {
            return;
        };
        if let Some(list) = self.by_element.get_mut(&sub.element) {
            list.retain(|s| *s != id);
            if list.is_empty() {
                self.by_element.remove(&sub.element);
            }
        }
        if self.capability == Capability::Native {
            self.native_ops.push(NativeOp::Unobserve {
                subscription: id,
                element: sub.element,
            });
        }
    }

    pub fn is_observed(&self, id: SubscriptionId) -> bool {
        self.subs.contains_key(&id) && !self.pending_removal.contains(&id)
    }

    pub fn element_of(&self, id: SubscriptionId) -> Option<ElementId> {
        self.subs.get(&id).map(|s| s.element)
    }

    pub fn subscriptions_of(&self, element: ElementId) -> &[SubscriptionId] {
        self.by_element
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.subs.len() - self.pending_removal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume host entries and return visibility crossings, in entry order.
    /// Opens a batch; call [`Watcher::finish_batch`] after handling.
    pub fn deliver(&mut self, entries: &[IntersectionEntry]) -> Vec<Crossing> {
        self.in_batch = true;
        let collapsed: Vec<IntersectionEntry>;
        let entries = if self.limit_callbacks {
            let mut last: IndexMap<SubscriptionId, IntersectionEntry> = IndexMap::new();
            for e in entries {
                last.insert(e.subscription, *e);
            }
            collapsed = last.into_values().collect();
            collapsed.as_slice()
        } else {
            entries
        };

        let mut crossings = Vec::new();
        for entry in entries {
            if self.pending_removal.contains(&entry.subscription) {
                continue;
            }
            let Some(sub) = self.subs.get_mut(&entry.subscription) else {
                continue;
            };
            let visible = sub.is_visible(entry.ratio, entry.position);
            let previous = sub.visible.replace(visible);
            let crossed = match previous {
                None => visible,
                Some(prev) => prev != visible,
            };
            if crossed {
                crossings.push(Crossing {
                    subscription: entry.subscription,
                    element: sub.element,
                    entered: visible,
                    position: entry.position,
                });
            }
        }
        crossings
    }

    /// Measure every subscription against the current layout and deliver.
    pub fn poll(&mut self, doc: &dyn Document) -> Vec<Crossing> {
        let vh = doc.viewport().height;
        let entries: Vec<IntersectionEntry> = self
            .subs
            .iter()
            .filter_map(|(id, sub)| {
                let rect = doc.rect(sub.element)?;
                let (ratio, position) = sub.options.measure(&rect, vh);
                Some(IntersectionEntry {
                    subscription: *id,
                    ratio,
                    position,
                })
            })
            .collect();
        self.deliver(&entries)
    }

    /// Close the current batch and apply deferred removals.
    pub fn finish_batch(&mut self) {
        self.in_batch = false;
        let pending: Vec<SubscriptionId> = self.pending_removal.drain().collect();
        for id in pending {
            self.remove_now(id);
        }
    }

    /// Forget every subscription; the host disconnects its observers.
    pub fn clear(&mut self) -> usize {
        let count = self.subs.len();
        self.subs.clear();
        self.by_element.clear();
        self.pending_removal.clear();
        self.in_batch = false;
        self.native_ops.clear();
        if self.capability == Capability::Native {
            self.native_ops.push(NativeOp::DisconnectAll);
        }
        count
    }

    /// Native observer work accumulated since the last drain.
    pub fn drain_native_ops(&mut self) -> Vec<NativeOp> {
        std::mem::take(&mut self.native_ops)
    }
}
