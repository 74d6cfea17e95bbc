//! In-memory page implementing [`Document`].
//!
//! Elements carry document-space boxes; scrolling shifts every bounding
//! rectangle. Applied [`Change`]s are recorded so tests can assert on the
//! resulting page state.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use scrollcue_core::host::{Document, OverlaySpec};
use scrollcue_core::outputs::{Change, MediaCommand};
use scrollcue_core::value::{Property, Rect, Viewport};
use scrollcue_core::watcher::{IntersectionEntry, NativeOp, ObserveOptions};
use scrollcue_core::ElementId;

/// Declarative element used by builders and JSON page fixtures.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// Document-space top edge.
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    /// Stylesheet opacity before any inline style.
    pub opacity: Option<f32>,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            width: 100.0,
            height: 100.0,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Document-space top and height.
    pub fn at(mut self, top: f32, height: f32) -> Self {
        self.top = top;
        self.height = height;
        self
    }

    pub fn size(mut self, left: f32, width: f32) -> Self {
        self.left = left;
        self.width = width;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PageSpec {
    pub viewport: Viewport,
    #[serde(default)]
    pub scroll_y: f32,
    pub elements: Vec<ElementSpec>,
}

#[derive(Clone, Debug)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    top: f32,
    left: f32,
    width: f32,
    height: f32,
    base_opacity: f32,
    styles: HashMap<Property, f32>,
    removed: bool,
}

/// One compound selector: `tag.class#id[attr=value]`.
#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(text: &str) -> Compound {
        let mut c = Compound::default();
        let mut rest = text;
        let tag_end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
        if tag_end > 0 && &rest[..tag_end] != "*" {
            c.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
        while let Some(first) = rest.chars().next() {
            match first {
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    let inner = &rest[1..end];
                    let attr = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    c.attributes.push(attr);
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                '.' | '#' => {
                    let body = &rest[1..];
                    let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if first == '.' {
                        c.classes.push(name);
                    } else {
                        c.id = Some(name);
                    }
                    rest = &body[end..];
                }
                _ => break,
            }
        }
        c
    }

    fn matches(&self, node: &Node) -> bool {
        self.tag.as_ref().map_or(true, |t| node.tag == *t)
            && self.id.as_ref().map_or(true, |id| node.id.as_ref() == Some(id))
            && self.classes.iter().all(|c| node.classes.contains(c))
            && self.attributes.iter().all(|(name, value)| match value {
                Some(v) => node.attributes.get(name) == Some(v),
                None => node.attributes.contains_key(name),
            })
    }
}

/// Comma-separated groups of descendant chains.
struct Selector {
    groups: Vec<Vec<Compound>>,
}

impl Selector {
    fn parse(text: &str) -> Selector {
        let groups = text
            .split(',')
            .map(|group| group.split_whitespace().map(Compound::parse).collect::<Vec<_>>())
            .filter(|chain| !chain.is_empty())
            .collect();
        Selector { groups }
    }
}

#[derive(Debug, Default)]
pub struct FakeDocument {
    nodes: Vec<Node>,
    viewport: Viewport,
    scroll_y: f32,
    alerts: Vec<String>,
    media: Vec<(ElementId, MediaCommand)>,
    scroll_requests: Vec<f32>,
}

impl FakeDocument {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Viewport { width, height },
            ..Self::default()
        }
    }

    pub fn from_spec(spec: &PageSpec) -> Self {
        let mut doc = FakeDocument::new(spec.viewport.width, spec.viewport.height);
        doc.scroll_y = spec.scroll_y;
        for element in &spec.elements {
            doc.insert_under(None, element);
        }
        doc
    }

    /// Insert a top-level element and its children.
    pub fn insert(&mut self, spec: ElementSpec) -> ElementId {
        self.insert_under(None, &spec)
    }

    pub fn insert_child(&mut self, parent: ElementId, spec: ElementSpec) -> ElementId {
        self.insert_under(Some(parent), &spec)
    }

    fn insert_under(&mut self, parent: Option<ElementId>, spec: &ElementSpec) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node {
            tag: spec.tag.to_ascii_lowercase(),
            id: spec.id.clone(),
            classes: spec.classes.clone(),
            attributes: spec.attributes.clone(),
            text: spec.text.clone(),
            parent,
            top: spec.top,
            left: spec.left,
            width: spec.width,
            height: spec.height,
            base_opacity: spec.opacity.unwrap_or(1.0),
            styles: HashMap::new(),
            removed: false,
        });
        for child in &spec.children {
            self.insert_under(Some(id), child);
        }
        id
    }

    fn node(&self, element: ElementId) -> Option<&Node> {
        self.nodes
            .get(element.0 as usize)
            .filter(|n| !n.removed)
    }

    fn node_mut(&mut self, element: ElementId) -> Option<&mut Node> {
        self.nodes
            .get_mut(element.0 as usize)
            .filter(|n| !n.removed)
    }

    fn is_live(&self, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(e) = cursor {
            match self.node(e) {
                Some(n) => cursor = n.parent,
                None => return false,
            }
        }
        true
    }

    fn matches_chain(&self, element: ElementId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        let Some(node) = self.node(element) else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        let mut remaining = ancestors;
        let mut cursor = node.parent;
        while let Some((wanted, rest)) = remaining.split_last() {
            let Some(e) = cursor else {
                return false;
            };
            let Some(n) = self.node(e) else {
                return false;
            };
            if wanted.matches(n) {
                remaining = rest;
            }
            cursor = n.parent;
        }
        true
    }

    fn matches(&self, element: ElementId, selector: &Selector) -> bool {
        selector
            .groups
            .iter()
            .any(|chain| self.matches_chain(element, chain))
    }

    fn is_descendant(&self, element: ElementId, ancestor: ElementId) -> bool {
        let mut cursor = self.node(element).and_then(|n| n.parent);
        while let Some(e) = cursor {
            if e == ancestor {
                return true;
            }
            cursor = self.node(e).and_then(|n| n.parent);
        }
        false
    }

    fn live_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.nodes.len() as u32)
            .map(ElementId)
            .filter(|e| self.is_live(*e))
    }

    pub fn len(&self) -> usize {
        self.live_ids().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.first(&format!("#{id}"))
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: f32) {
        self.scroll_y = y.max(0.0);
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    /// Move an element in document space, e.g. after a layout shift.
    pub fn set_top(&mut self, element: ElementId, top: f32) {
        if let Some(n) = self.node_mut(element) {
            n.top = top;
        }
    }

    /// Stylesheet opacity, e.g. the `opacity: 0` of an unrevealed element.
    pub fn set_base_opacity(&mut self, element: ElementId, opacity: f32) {
        if let Some(n) = self.node_mut(element) {
            n.base_opacity = opacity;
        }
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|n| n.text.as_str())
    }

    /// Inline style value last written for `property`.
    pub fn style(&self, element: ElementId, property: &Property) -> Option<f32> {
        self.node(element)
            .and_then(|n| n.styles.get(property).copied())
    }

    pub fn is_removed(&self, element: ElementId) -> bool {
        !self.is_live(element)
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn media_log(&self) -> &[(ElementId, MediaCommand)] {
        &self.media
    }

    pub fn scroll_requests(&self) -> &[f32] {
        &self.scroll_requests
    }

    /// Apply changes the way a host would. Writes to removed elements are
    /// dropped.
    pub fn apply(&mut self, changes: &[Change]) {
        for change in changes {
            match change {
                Change::Style {
                    element,
                    property,
                    value,
                } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.styles.insert(property.clone(), *value);
                    }
                }
                Change::ClearStyle { element } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.styles.clear();
                    }
                }
                Change::AddClass { element, class } => {
                    if let Some(n) = self.node_mut(*element) {
                        if !n.classes.contains(class) {
                            n.classes.push(class.clone());
                        }
                    }
                }
                Change::RemoveClass { element, class } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.classes.retain(|c| c != class);
                    }
                }
                Change::SetText { element, text } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.text = text.clone();
                    }
                }
                Change::SetAttribute {
                    element,
                    name,
                    value,
                } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.attributes.insert(name.clone(), value.clone());
                    }
                }
                Change::RemoveAttribute { element, name } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.attributes.remove(name);
                    }
                }
                Change::Remove { element } => {
                    if let Some(n) = self.node_mut(*element) {
                        n.removed = true;
                    }
                }
                Change::ScrollTo { top } => {
                    self.scroll_requests.push(*top);
                    self.scroll_to(*top);
                }
                Change::Media { element, command } => {
                    self.media.push((*element, command.clone()));
                }
                Change::Alert { message } => self.alerts.push(message.clone()),
            }
        }
    }
}

impl Document for FakeDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let selector = Selector::parse(selector);
        self.live_ids()
            .filter(|e| self.matches(*e, &selector))
            .collect()
    }

    fn query_within(&self, scope: ElementId, selector: &str) -> Vec<ElementId> {
        let selector = Selector::parse(selector);
        self.live_ids()
            .filter(|e| self.is_descendant(*e, scope) && self.matches(*e, &selector))
            .collect()
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let selector = Selector::parse(selector);
        let mut cursor = Some(element);
        while let Some(e) = cursor {
            let node = self.node(e)?;
            if self.matches(e, &selector) {
                return Some(e);
            }
            cursor = node.parent;
        }
        None
    }

    fn rect(&self, element: ElementId) -> Option<Rect> {
        if !self.is_live(element) {
            return None;
        }
        let n = self.node(element)?;
        Some(Rect::new(n.left, n.top - self.scroll_y, n.width, n.height))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn computed_opacity(&self, element: ElementId) -> Option<f32> {
        let n = self.node(element)?;
        Some(
            n.styles
                .get(&Property::Opacity)
                .copied()
                .unwrap_or(n.base_opacity),
        )
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn offset_top(&self, element: ElementId) -> Option<f32> {
        self.node(element).map(|n| n.top)
    }

    fn create_overlay(&mut self, parent: ElementId, spec: &OverlaySpec) -> Option<ElementId> {
        let p = self.node(parent)?;
        let (top, left) = (p.top + spec.top, p.left + spec.left);
        let overlay = ElementSpec::new("span")
            .class(&spec.class)
            .at(top, spec.size)
            .size(left, spec.size);
        Some(self.insert_under(Some(parent), &overlay))
    }
}

/// Stand-in for the browser's intersection observers: mirrors the core's
/// [`NativeOp`]s and reports entries measured against the current layout.
#[derive(Debug, Default)]
pub struct FakeObservers {
    observed: Vec<(scrollcue_core::SubscriptionId, ElementId, ObserveOptions)>,
}

impl FakeObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mirror(&mut self, ops: &[NativeOp]) {
        for op in ops {
            match op {
                NativeOp::Observe {
                    subscription,
                    element,
                    options,
                } => self.observed.push((*subscription, *element, *options)),
                NativeOp::Unobserve { subscription, .. } => {
                    self.observed.retain(|(s, _, _)| s != subscription)
                }
                NativeOp::DisconnectAll => self.observed.clear(),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// One entry per observed subscription, in observation order.
    pub fn entries(&self, doc: &FakeDocument) -> Vec<IntersectionEntry> {
        let vh = doc.viewport().height;
        self.observed
            .iter()
            .filter_map(|(subscription, element, options)| {
                let rect = doc.rect(*element)?;
                let (ratio, position) = options.measure(&rect, vh);
                Some(IntersectionEntry {
                    subscription: *subscription,
                    ratio,
                    position,
                })
            })
            .collect()
    }
}
