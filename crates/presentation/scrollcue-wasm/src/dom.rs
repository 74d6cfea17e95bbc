//! `Document` over the live DOM.
//!
//! Elements get an [`ElementId`] the first time a query returns them; the id
//! is stamped on the node as `data-scrollcue-id` so later queries resolve to
//! the same id.

use std::cell::RefCell;

use hashbrown::HashMap;
use scrollcue_core::{Document, ElementId, OverlaySpec, Rect, Viewport};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, NodeList, Window};

const ID_ATTR: &str = "data-scrollcue-id";

/// Transform components written by the core, composed into one `transform`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TransformState {
    pub x: f32,
    pub y: f32,
    pub y_percent: f32,
    pub scale: f32,
    pub rotation: f32,
    pub rotation_y: f32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            y_percent: 0.0,
            scale: 1.0,
            rotation: 0.0,
            rotation_y: 0.0,
        }
    }
}

impl TransformState {
    pub fn to_css(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0px) translateY({}%) rotate({}deg) rotateY({}deg) scale({})",
            self.x, self.y, self.y_percent, self.rotation, self.rotation_y, self.scale
        )
    }
}

pub struct DomDocument {
    window: Window,
    document: web_sys::Document,
    elements: RefCell<Vec<Element>>,
    pub(crate) transforms: RefCell<HashMap<ElementId, TransformState>>,
}

impl DomDocument {
    pub fn new(window: Window, document: web_sys::Document) -> Self {
        Self {
            window,
            document,
            elements: RefCell::new(Vec::new()),
            transforms: RefCell::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Id for `element`, stamping a fresh one on first sight.
    pub fn id_of(&self, element: &Element) -> ElementId {
        if let Some(id) = element
            .get_attribute(ID_ATTR)
            .and_then(|s| s.parse::<u32>().ok())
        {
            let known = self
                .elements
                .borrow()
                .get(id as usize)
                .is_some_and(|e| e == element);
            if known {
                return ElementId(id);
            }
        }
        let mut elements = self.elements.borrow_mut();
        let id = elements.len() as u32;
        elements.push(element.clone());
        if let Err(err) = element.set_attribute(ID_ATTR, &id.to_string()) {
            log::warn!("could not tag element {id}: {err:?}");
        }
        ElementId(id)
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0 as usize).cloned()
    }

    pub fn html_element(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }

    /// Elements matching `selector`, straight from the DOM.
    pub fn select(&self, selector: &str) -> Vec<Element> {
        match self.document.query_selector_all(selector) {
            Ok(list) => elements_of(&list),
            Err(err) => {
                log::debug!("selector {selector:?} rejected: {err:?}");
                Vec::new()
            }
        }
    }

    pub fn scroll_y(&self) -> f32 {
        self.window.scroll_y().unwrap_or(0.0) as f32
    }

    /// Drop per-element state after a node leaves the page.
    pub(crate) fn forget(&self, id: ElementId) {
        self.transforms.borrow_mut().remove(&id);
    }
}

fn elements_of(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn window_length(value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>) -> f32 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
}

impl Document for DomDocument {
    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.select(selector).iter().map(|e| self.id_of(e)).collect()
    }

    fn query_within(&self, scope: ElementId, selector: &str) -> Vec<ElementId> {
        let Some(scope) = self.element(scope) else {
            return Vec::new();
        };
        match scope.query_selector_all(selector) {
            Ok(list) => elements_of(&list).iter().map(|e| self.id_of(e)).collect(),
            Err(err) => {
                log::debug!("selector {selector:?} rejected: {err:?}");
                Vec::new()
            }
        }
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let found = self.element(element)?.closest(selector).ok()??;
        Some(self.id_of(&found))
    }

    fn rect(&self, element: ElementId) -> Option<Rect> {
        let element = self.element(element)?;
        if !element.is_connected() {
            return None;
        }
        let r = element.get_bounding_client_rect();
        Some(Rect::new(
            r.left() as f32,
            r.top() as f32,
            r.width() as f32,
            r.height() as f32,
        ))
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: window_length(self.window.inner_width()),
            height: window_length(self.window.inner_height()),
        }
    }

    fn computed_opacity(&self, element: ElementId) -> Option<f32> {
        let element = self.element(element)?;
        let style = self.window.get_computed_style(&element).ok()??;
        style.get_property_value("opacity").ok()?.trim().parse().ok()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn offset_top(&self, element: ElementId) -> Option<f32> {
        Some(self.html_element(element)?.offset_top() as f32)
    }

    fn create_overlay(&mut self, parent: ElementId, spec: &OverlaySpec) -> Option<ElementId> {
        let parent = self.element(parent)?;
        let overlay = self
            .document
            .create_element("span")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        overlay.set_class_name(&spec.class);
        let style = overlay.style();
        for (name, value) in [
            ("position", "absolute".to_string()),
            ("pointer-events", "none".to_string()),
            ("width", format!("{}px", spec.size)),
            ("height", format!("{}px", spec.size)),
            ("left", format!("{}px", spec.left)),
            ("top", format!("{}px", spec.top)),
        ] {
            if let Err(err) = style.set_property(name, &value) {
                log::debug!("overlay style {name} failed: {err:?}");
            }
        }
        parent.append_child(&overlay).ok()?;
        Some(self.id_of(&overlay))
    }
}
