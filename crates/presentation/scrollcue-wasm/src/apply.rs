//! Writes core [`Change`]s to the DOM.

use scrollcue_core::{Change, ElementId, MediaCommand, Property};
use wasm_bindgen::JsCast;
use web_sys::{HtmlMediaElement, ScrollBehavior, ScrollToOptions};

use crate::dom::DomDocument;

/// A `play()` request whose promise the caller must settle.
pub struct PendingPlay {
    pub media: HtmlMediaElement,
    pub promise: Option<js_sys::Promise>,
}

/// Apply `changes` in order. DOM errors are logged and skipped.
pub fn apply_changes(dom: &DomDocument, changes: &[Change]) -> Vec<PendingPlay> {
    let mut plays = Vec::new();
    for change in changes {
        if let Some(play) = apply_one(dom, change) {
            plays.push(play);
        }
    }
    plays
}

fn apply_one(dom: &DomDocument, change: &Change) -> Option<PendingPlay> {
    match change {
        Change::Style {
            element,
            property,
            value,
        } => set_style(dom, *element, property, *value),
        Change::ClearStyle { element } => {
            dom.forget(*element);
            if let Some(el) = dom.html_element(*element) {
                let style = el.style();
                let _ = style.remove_property("transform");
                let _ = style.remove_property("opacity");
            }
        }
        Change::AddClass { element, class } => {
            if let Some(el) = dom.element(*element) {
                if let Err(err) = el.class_list().add_1(class) {
                    log::debug!("add class {class} failed: {err:?}");
                }
            }
        }
        Change::RemoveClass { element, class } => {
            if let Some(el) = dom.element(*element) {
                let _ = el.class_list().remove_1(class);
            }
        }
        Change::SetText { element, text } => {
            if let Some(el) = dom.element(*element) {
                el.set_text_content(Some(text));
            }
        }
        Change::SetAttribute {
            element,
            name,
            value,
        } => {
            if let Some(el) = dom.element(*element) {
                let _ = el.set_attribute(name, value);
            }
        }
        Change::RemoveAttribute { element, name } => {
            if let Some(el) = dom.element(*element) {
                let _ = el.remove_attribute(name);
            }
        }
        Change::Remove { element } => {
            dom.forget(*element);
            if let Some(el) = dom.element(*element) {
                el.remove();
            }
        }
        Change::ScrollTo { top } => {
            let options = ScrollToOptions::new();
            options.set_top(f64::from(*top));
            options.set_behavior(ScrollBehavior::Smooth);
            dom.window().scroll_to_with_scroll_to_options(&options);
        }
        Change::Media { element, command } => return media(dom, *element, command),
        Change::Alert { message } => {
            if let Err(err) = dom.window().alert_with_message(message) {
                log::warn!("alert failed: {err:?}");
            }
        }
    }
    None
}

fn set_style(dom: &DomDocument, element: ElementId, property: &Property, value: f32) {
    let Some(el) = dom.html_element(element) else {
        return;
    };
    let style = el.style();
    let result = match property {
        Property::Opacity => style.set_property("opacity", &value.to_string()),
        Property::CssVar { name, unit } => {
            style.set_property(name, &format!("{value}{}", unit.suffix()))
        }
        transform => {
            let css = {
                let mut transforms = dom.transforms.borrow_mut();
                let t = transforms.entry(element).or_default();
                match transform {
                    Property::X => t.x = value,
                    Property::Y => t.y = value,
                    Property::YPercent => t.y_percent = value,
                    Property::Scale => t.scale = value,
                    Property::Rotation => t.rotation = value,
                    Property::RotationY => t.rotation_y = value,
                    Property::Opacity | Property::CssVar { .. } => {}
                }
                t.to_css()
            };
            style.set_property("transform", &css)
        }
    };
    if let Err(err) = result {
        log::debug!("style {property:?} on {element:?} failed: {err:?}");
    }
}

fn media(dom: &DomDocument, element: ElementId, command: &MediaCommand) -> Option<PendingPlay> {
    let media = dom.element(element)?.dyn_into::<HtmlMediaElement>().ok()?;
    match command {
        MediaCommand::SetMuted(muted) => media.set_muted(*muted),
        MediaCommand::SetPlaybackRate(rate) => media.set_playback_rate(*rate),
        MediaCommand::Play => {
            let promise = media.play().ok();
            return Some(PendingPlay { media, promise });
        }
    }
    None
}
