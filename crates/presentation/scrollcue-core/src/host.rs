//! Host seams: how the core reads the page and the runtime environment.
//!
//! The core never writes to the page through this trait (writes are
//! [`Change`](crate::outputs::Change)s); the one exception is creating a
//! transient overlay element, whose id is needed before its animation can be
//! scheduled.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::value::{Rect, Viewport};

/// Read access to the page plus transient element creation.
///
/// Selectors are compounds of tag, class, id and attribute parts, optionally
/// joined by descendant combinators and grouped with commas. A selector that
/// matches nothing returns an empty list.
pub trait Document {
    /// Matches in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;

    /// Matches among the descendants of `scope`, in document order.
    fn query_within(&self, scope: ElementId, selector: &str) -> Vec<ElementId>;

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId>;

    /// Bounding client rectangle; `None` once the element is gone.
    fn rect(&self, element: ElementId) -> Option<Rect>;

    fn viewport(&self) -> Viewport;

    /// Computed opacity after styles apply.
    fn computed_opacity(&self, element: ElementId) -> Option<f32>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Distance from the document top, in pixels.
    fn offset_top(&self, element: ElementId) -> Option<f32>;

    /// Append a transient, absolutely positioned child to `parent`.
    fn create_overlay(&mut self, parent: ElementId, spec: &OverlaySpec) -> Option<ElementId>;
}

/// Geometry of a transient overlay, relative to its parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub class: String,
    pub size: f32,
    pub left: f32,
    pub top: f32,
}

/// Runtime signals read when classifying the device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSignals {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub prefers_reduced_motion: bool,
    /// `navigator.hardwareConcurrency`; absent on some browsers.
    pub hardware_concurrency: Option<u32>,
    /// `navigator.deviceMemory` in gigabytes; absent on most browsers.
    pub device_memory_gb: Option<f32>,
    pub user_agent: String,
    /// Page visibility (`document.hidden`).
    pub hidden: bool,
}

impl Default for EnvSignals {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            prefers_reduced_motion: false,
            hardware_concurrency: Some(8),
            device_memory_gb: Some(8.0),
            user_agent: String::new(),
            hidden: false,
        }
    }
}

impl EnvSignals {
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }
}
