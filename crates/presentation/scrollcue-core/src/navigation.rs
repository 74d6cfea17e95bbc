//! Navbar scrolled state and in-page anchor scrolling.

use crate::config::{AnchorConfig, NavbarConfig};
use crate::host::Document;
use crate::ids::ElementId;
use crate::outputs::Change;

#[derive(Debug)]
pub struct Navbar {
    config: NavbarConfig,
    scrolled: Option<bool>,
}

impl Navbar {
    pub fn new(config: NavbarConfig) -> Self {
        Self {
            config,
            scrolled: None,
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.unwrap_or(false)
    }

    /// Class change for the navbar at `scroll_y`, only when the state flips.
    pub fn on_scroll(&mut self, scroll_y: f32, doc: &dyn Document) -> Option<Change> {
        let element = doc.query_all(&self.config.selector).into_iter().next()?;
        let scrolled = scroll_y > self.config.threshold;
        if self.scrolled == Some(scrolled) {
            return None;
        }
        self.scrolled = Some(scrolled);
        let class = self.config.scrolled_class.clone();
        Some(if scrolled {
            Change::AddClass { element, class }
        } else {
            Change::RemoveClass { element, class }
        })
    }
}

/// Smooth-scroll target for an in-page link, or `None` when the click should
/// keep its default behaviour (bare `#`, unknown target).
pub fn anchor_target(href: &str, doc: &dyn Document, config: &AnchorConfig) -> Option<Change> {
    if href.len() < 2 || !href.starts_with('#') {
        return None;
    }
    let target: ElementId = doc.query_all(href).into_iter().next()?;
    let top = doc.offset_top(target)? - config.offset;
    Some(Change::ScrollTo { top })
}
