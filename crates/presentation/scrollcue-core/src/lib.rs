//! Scrollcue core (host-agnostic)
//!
//! Scroll-triggered reveal orchestration for a marketing page. The core reads
//! the page through the [`Document`] trait, keeps every subscription, trigger
//! and timeline itself, and answers each host event with [`Outputs`]: page
//! changes to apply plus semantic events.

pub mod config;
pub mod ease;
pub mod effects;
pub mod engine;
pub mod error;
pub mod forms;
pub mod host;
pub mod ids;
pub mod lifecycle;
pub mod navigation;
pub mod offset;
pub mod outputs;
pub mod policy;
pub mod presentation;
pub mod registry;
pub mod site;
pub mod timeline;
pub mod trigger;
pub mod value;
pub mod video;
pub mod watcher;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use ease::Ease;
pub use effects::Effects;
pub use engine::{Direction, Engine};
pub use error::{Result, ScrollcueError, ValidationError};
pub use host::{Document, EnvSignals, OverlaySpec};
pub use ids::{ElementId, ScrubberId, SubscriptionId, TimelineId, TriggerId};
pub use lifecycle::{Debouncer, Lifecycle, LifecycleAction, LifecycleEvent};
pub use navigation::{anchor_target, Navbar};
pub use offset::{Line, ScrollOffset};
pub use outputs::{Change, CoreEvent, MediaCommand, Outputs};
pub use policy::{classify, Policy, PolicyThresholds, PolicyTier, TierSettings};
pub use presentation::Presentation;
pub use registry::{Registry, TriggerState, WatchedElement};
pub use timeline::{Position, Step, Targets, Timeline, TimelineBuilder};
pub use trigger::{AnimationRecipe, CounterSpec, RepeatPolicy, ScrubSpec, Trigger, TriggerAction};
pub use value::{CssUnit, Point, Property, Props, Rect, Viewport};
pub use video::{MediaEvent, VideoController};
pub use watcher::{
    Capability, Crossing, EntryPosition, IntersectionEntry, NativeOp, ObserveOptions, RootMargin,
    Watcher,
};
