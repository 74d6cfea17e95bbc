//! Output contracts from the core.
//!
//! Outputs carry the page mutations produced by one call, keyed by element,
//! plus a separate list of semantic events. The host applies the changes in
//! order and may forward the events to diagnostics.

use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, TimelineId, TriggerId};
use crate::policy::PolicyTier;
use crate::value::Property;

/// Commands for a media element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MediaCommand {
    SetMuted(bool),
    Play,
    SetPlaybackRate(f64),
}

/// One page mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Change {
    Style {
        element: ElementId,
        property: Property,
        value: f32,
    },
    /// Drop all inline transform and opacity values.
    ClearStyle {
        element: ElementId,
    },
    AddClass {
        element: ElementId,
        class: String,
    },
    RemoveClass {
        element: ElementId,
        class: String,
    },
    SetText {
        element: ElementId,
        text: String,
    },
    SetAttribute {
        element: ElementId,
        name: String,
        value: String,
    },
    RemoveAttribute {
        element: ElementId,
        name: String,
    },
    /// Detach a transient element from the page.
    Remove {
        element: ElementId,
    },
    /// Smooth-scroll the window to `top`.
    ScrollTo {
        top: f32,
    },
    Media {
        element: ElementId,
        command: MediaCommand,
    },
    /// Blocking dialog.
    Alert {
        message: String,
    },
}

impl Change {
    /// Element the change writes to, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Change::Style { element, .. }
            | Change::ClearStyle { element }
            | Change::AddClass { element, .. }
            | Change::RemoveClass { element, .. }
            | Change::SetText { element, .. }
            | Change::SetAttribute { element, .. }
            | Change::RemoveAttribute { element, .. }
            | Change::Remove { element }
            | Change::Media { element, .. } => Some(*element),
            Change::ScrollTo { .. } | Change::Alert { .. } => None,
        }
    }
}

/// Discrete semantic signals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    TierChanged {
        from: PolicyTier,
        to: PolicyTier,
    },
    TriggerFired {
        trigger: TriggerId,
        name: String,
        elements: Vec<ElementId>,
    },
    TriggerReversed {
        trigger: TriggerId,
        name: String,
    },
    TimelineCompleted {
        timeline: TimelineId,
    },
    TimelineReversed {
        timeline: TimelineId,
    },
    Refreshed,
    Paused,
    Resumed,
    TornDown {
        subscriptions: usize,
        timelines: usize,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: Outputs) {
        self.changes.extend(other.changes);
        self.events.extend(other.events);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
