//! Declarative triggers: what to run when elements reach a scroll offset.

use serde::{Deserialize, Serialize};

use crate::ease::Ease;
use crate::ids::ElementId;
use crate::offset::ScrollOffset;
use crate::timeline::{Position, Step, Targets, TimelineBuilder};
use crate::value::{PropertyDelta, Props};
use crate::watcher::ObserveOptions;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RepeatPolicy {
    /// Fire once per element, then stop observing it.
    #[default]
    OnceForward,
    /// Play on enter, reverse when the element returns before its start.
    ReverseOnLeave,
}

/// A parameterized transition, immutable once declared.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationRecipe {
    pub props: Props,
    pub duration: f32,
    pub ease: Ease,
    /// Delay between consecutive elements of one batch.
    pub stagger: Option<f32>,
    pub repeat: RepeatPolicy,
}

impl AnimationRecipe {
    pub fn new(props: Props, duration: f32, ease: Ease) -> Self {
        Self {
            props,
            duration,
            ease,
            stagger: None,
            repeat: RepeatPolicy::OnceForward,
        }
    }

    pub fn stagger(mut self, stagger: f32) -> Self {
        self.stagger = Some(stagger);
        self
    }

    pub fn repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    /// Timeline step running this recipe on `targets`.
    pub fn step(&self, targets: impl Into<Targets>) -> Step {
        Step::tween(targets, self.props.clone(), self.duration, self.ease)
            .stagger(self.stagger.unwrap_or(0.0))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterSpec {
    /// Attribute holding the integer target.
    pub attribute: String,
    pub duration: f32,
    pub ease: Ease,
}

impl Default for CounterSpec {
    fn default() -> Self {
        Self {
            attribute: "data-counter".into(),
            duration: 2.0,
            ease: Ease::POWER2_OUT,
        }
    }
}

/// Scroll-bound mapping from trigger progress to property values.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrubSpec {
    pub props: Props,
    /// Catch-up lag in seconds.
    pub lag: f32,
    /// Odd-indexed elements get mirrored target values.
    pub alternate: bool,
}

impl ScrubSpec {
    /// Props for the `index`-th matched element.
    pub fn props_for(&self, index: usize) -> Props {
        if !self.alternate || index % 2 == 0 {
            return self.props.clone();
        }
        let flip = |v: Option<f32>| v.map(|v| -v);
        Props(
            self.props
                .iter()
                .map(|(p, d)| {
                    (
                        p.clone(),
                        PropertyDelta {
                            from: flip(d.from),
                            to: flip(d.to),
                        },
                    )
                })
                .collect(),
        )
    }
}

#[derive(Clone, Debug)]
pub enum TriggerAction {
    /// Batched reveal of the entering elements.
    Reveal(AnimationRecipe),
    /// Multi-step timeline; selectors resolve when the trigger fires.
    Sequence(TimelineBuilder),
    Counter(CounterSpec),
    AddClass(String),
    Scrub(ScrubSpec),
}

impl TriggerAction {
    pub fn kind(&self) -> &'static str {
        match self {
            TriggerAction::Reveal(_) => "reveal",
            TriggerAction::Sequence(_) => "sequence",
            TriggerAction::Counter(_) => "counter",
            TriggerAction::AddClass(_) => "add-class",
            TriggerAction::Scrub(_) => "scrub",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Trigger {
    pub name: String,
    /// Grouped selector, e.g. `".timeline-item, .engine-card, .card"`.
    pub selector: String,
    pub action: TriggerAction,
    pub start: ScrollOffset,
    pub end: Option<ScrollOffset>,
    pub repeat: RepeatPolicy,
    /// Explicit observation options; derived from `start` when absent.
    pub observe: Option<ObserveOptions>,
    /// Group name for [`Registry::kill_scope`](crate::registry::Registry::kill_scope).
    pub scope: Option<String>,
}

impl Trigger {
    pub fn new(name: &str, selector: &str, action: TriggerAction, start: ScrollOffset) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            action,
            start,
            end: None,
            repeat: RepeatPolicy::OnceForward,
            observe: None,
            scope: None,
        }
    }

    /// Batched reveal; inherits the recipe's repeat policy.
    pub fn reveal(name: &str, selector: &str, recipe: AnimationRecipe, start: ScrollOffset) -> Self {
        let repeat = recipe.repeat;
        Self::new(name, selector, TriggerAction::Reveal(recipe), start).repeat(repeat)
    }

    pub fn end(mut self, end: ScrollOffset) -> Self {
        self.end = Some(end);
        self
    }

    pub fn repeat(mut self, repeat: RepeatPolicy) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn observe_with(mut self, options: ObserveOptions) -> Self {
        self.observe = Some(options);
        self
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn observe_options(&self) -> ObserveOptions {
        self.observe.unwrap_or_else(|| self.start.observe_options())
    }

    pub fn is_scrub(&self) -> bool {
        matches!(self.action, TriggerAction::Scrub(_))
    }

    /// Builder for the timeline this trigger plays for `elements`, or `None`
    /// for actions that do not animate.
    pub(crate) fn timeline_for(
        &self,
        elements: &[ElementId],
        counters: &[(ElementId, i64)],
    ) -> Option<TimelineBuilder> {
        match &self.action {
            TriggerAction::Reveal(recipe) => {
                Some(TimelineBuilder::new().step(recipe.step(elements.to_vec())))
            }
            TriggerAction::Sequence(builder) => Some(builder.clone()),
            TriggerAction::Counter(spec) => Some(counters.iter().fold(
                TimelineBuilder::new(),
                |tl, (element, target)| {
                    tl.step_at(
                        Step::counter(*element, *target, spec.duration, spec.ease),
                        Position::Absolute(0.0),
                    )
                },
            )),
            TriggerAction::AddClass(_) | TriggerAction::Scrub(_) => None,
        }
    }
}

/// Leading integer of a counter attribute; `None` when there is none.
pub fn parse_counter_target(text: &str) -> Option<i64> {
    let t = text.trim();
    let end = t
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    t[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Property;

    #[test]
    fn counter_targets_parse_leading_integer() {
        assert_eq!(parse_counter_target("1500"), Some(1500));
        assert_eq!(parse_counter_target(" 250+ "), Some(250));
        assert_eq!(parse_counter_target("12px"), Some(12));
        assert_eq!(parse_counter_target("abc"), None);
        assert_eq!(parse_counter_target(""), None);
        assert_eq!(parse_counter_target("-"), None);
    }

    #[test]
    fn alternate_scrub_mirrors_odd_elements() {
        let spec = ScrubSpec {
            props: Props::new().to(Property::Y, -30.0),
            lag: 2.0,
            alternate: true,
        };
        let even = spec.props_for(0);
        let odd = spec.props_for(1);
        assert_eq!(even.0[&Property::Y].to, Some(-30.0));
        assert_eq!(odd.0[&Property::Y].to, Some(30.0));
    }

    #[test]
    fn reveal_inherits_recipe_repeat() {
        let recipe = AnimationRecipe::new(Props::new().from(Property::Opacity, 0.0), 1.0, Ease::None)
            .repeat(RepeatPolicy::ReverseOnLeave);
        let t = Trigger::reveal("r", ".x", recipe, ScrollOffset::top_at(85.0));
        assert_eq!(t.repeat, RepeatPolicy::ReverseOnLeave);
        assert_eq!(t.action.kind(), "reveal");
    }

    #[test]
    fn default_options_follow_start_offset() {
        let t = Trigger::new(
            "c",
            "[data-counter]",
            TriggerAction::Counter(CounterSpec::default()),
            ScrollOffset::top_at(80.0),
        );
        assert_eq!(t.observe_options(), ScrollOffset::top_at(80.0).observe_options());
        let custom = ObserveOptions::reveal(0.1, 0.15);
        assert_eq!(t.observe_with(custom).observe_options(), custom);
    }
}
