//! Page lifecycle: debounced layout events, visibility and unload.
//!
//! Timers are plain deadlines polled from the tick loop, one per handler.
//! Re-triggering a pending debouncer pushes its deadline back.

use serde::{Deserialize, Serialize};

use crate::config::LifecycleConfig;

/// Host page events the lifecycle manager reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Window `load`: fonts and images have settled.
    Load,
    Resize,
    OrientationChange,
    VisibilityChanged { hidden: bool },
    /// `beforeunload`.
    Unload,
}

/// What the presentation should do now.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LifecycleAction {
    /// Refresh boundaries and force-reveal elements still at opacity 0.
    LoadFallback,
    /// Re-derive the policy tier, refresh, rebuild the tech-specs section.
    Reconfigure,
    Pause,
    Resume,
    Teardown,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Debouncer {
    wait_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one.
    pub fn trigger(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.wait_ms);
    }

    /// True once the quiet period has elapsed; clears the deadline.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(d) if now_ms >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[derive(Debug)]
pub struct Lifecycle {
    resize: Debouncer,
    orientation: Debouncer,
    torn_down: bool,
}

impl Lifecycle {
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            resize: Debouncer::new(config.resize_debounce_ms),
            orientation: Debouncer::new(config.orientation_debounce_ms),
            torn_down: false,
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Immediate actions for `event`. Debounced events return nothing here
    /// and surface later from [`Lifecycle::poll`].
    pub fn handle(&mut self, event: LifecycleEvent, now_ms: f64) -> Option<LifecycleAction> {
        if self.torn_down {
            return None;
        }
        match event {
            LifecycleEvent::Load => Some(LifecycleAction::LoadFallback),
            LifecycleEvent::Resize => {
                self.resize.trigger(now_ms);
                None
            }
            LifecycleEvent::OrientationChange => {
                self.orientation.trigger(now_ms);
                None
            }
            LifecycleEvent::VisibilityChanged { hidden: true } => Some(LifecycleAction::Pause),
            LifecycleEvent::VisibilityChanged { hidden: false } => Some(LifecycleAction::Resume),
            LifecycleEvent::Unload => {
                self.torn_down = true;
                self.resize.cancel();
                self.orientation.cancel();
                Some(LifecycleAction::Teardown)
            }
        }
    }

    /// Debounced actions due at `now_ms`. Resize and orientation settling in
    /// the same tick reconfigure once.
    pub fn poll(&mut self, now_ms: f64) -> Option<LifecycleAction> {
        if self.torn_down {
            return None;
        }
        let resized = self.resize.poll(now_ms);
        let rotated = self.orientation.poll(now_ms);
        (resized || rotated).then_some(LifecycleAction::Reconfigure)
    }

    pub fn has_pending(&self) -> bool {
        self.resize.is_pending() || self.orientation.is_pending()
    }
}
