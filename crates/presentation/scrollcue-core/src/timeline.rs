//! Timeline builder.
//!
//! A timeline is an ordered list of steps with relative start offsets. Each
//! step is placed against the current end of the timeline: `Sequential`
//! appends, `Relative(-0.6)` overlaps the previous end by 0.6 s (GSAP's
//! `"-=0.6"`), `Absolute(t)` pins the step. Targets are resolved when the
//! timeline is built, so selectors that match nothing yield empty steps that
//! still occupy their time slot and keep later offsets stable.

use crate::ease::Ease;
use crate::host::Document;
use crate::ids::ElementId;
use crate::outputs::Change;
use crate::value::Props;

/// What a step animates.
#[derive(Clone, Debug, PartialEq)]
pub enum Targets {
    Selector(String),
    Within { scope: ElementId, selector: String },
    Elements(Vec<ElementId>),
}

impl Targets {
    pub fn selector(s: impl Into<String>) -> Self {
        Targets::Selector(s.into())
    }

    pub fn resolve(&self, doc: &dyn Document) -> Vec<ElementId> {
        match self {
            Targets::Selector(s) => doc.query_all(s),
            Targets::Within { scope, selector } => doc.query_within(*scope, selector),
            Targets::Elements(list) => list.clone(),
        }
    }
}

impl From<ElementId> for Targets {
    fn from(value: ElementId) -> Self {
        Targets::Elements(vec![value])
    }
}

impl From<Vec<ElementId>> for Targets {
    fn from(value: Vec<ElementId>) -> Self {
        Targets::Elements(value)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Position {
    #[default]
    Sequential,
    /// Offset from the current end; negative overlaps.
    Relative(f32),
    Absolute(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    Tween(Props),
    /// Integer display counting from `from` to `to`.
    Counter { from: f32, to: i64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub targets: Targets,
    pub kind: StepKind,
    pub duration: f32,
    pub ease: Ease,
    /// Delay between consecutive targets.
    pub stagger: f32,
    pub position: Position,
}

impl Step {
    pub fn tween(targets: impl Into<Targets>, props: Props, duration: f32, ease: Ease) -> Self {
        Self {
            targets: targets.into(),
            kind: StepKind::Tween(props),
            duration,
            ease,
            stagger: 0.0,
            position: Position::Sequential,
        }
    }

    pub fn counter(element: ElementId, to: i64, duration: f32, ease: Ease) -> Self {
        Self {
            targets: Targets::from(element),
            kind: StepKind::Counter { from: 0.0, to },
            duration,
            ease,
            stagger: 0.0,
            position: Position::Sequential,
        }
    }

    pub fn stagger(mut self, stagger: f32) -> Self {
        self.stagger = stagger.max(0.0);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTween {
    pub element: ElementId,
    pub props: Props,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
}

impl ScheduledTween {
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledCounter {
    pub element: ElementId,
    pub from: f32,
    pub to: i64,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledCall {
    pub at: f32,
    pub changes: Vec<Change>,
}

/// A built, target-resolved timeline ready for the engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    pub tweens: Vec<ScheduledTween>,
    pub counters: Vec<ScheduledCounter>,
    pub calls: Vec<ScheduledCall>,
    /// Emitted once when the timeline first completes forward.
    pub on_complete: Vec<Change>,
    pub duration: f32,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty() && self.counters.is_empty() && self.calls.is_empty()
    }

    /// Elements any tween of this timeline writes to.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.tweens
            .iter()
            .map(|t| t.element)
            .chain(self.counters.iter().map(|c| c.element))
    }
}

#[derive(Clone, Debug)]
enum Entry {
    Step(Step),
    Call(Position, Vec<Change>),
    AddClass(Position, Targets, String),
}

#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    delay: f32,
    entries: Vec<Entry>,
    on_complete: Vec<Change>,
    on_complete_class: Vec<(Targets, String)>,
}

fn add_class_changes(doc: &dyn Document, targets: &Targets, class: &str) -> Vec<Change> {
    targets
        .resolve(doc)
        .into_iter()
        .map(|element| Change::AddClass {
            element,
            class: class.to_string(),
        })
        .collect()
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift every step by `delay` seconds.
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.entries.push(Entry::Step(step));
        self
    }

    pub fn step_at(self, step: Step, position: Position) -> Self {
        self.step(step.at(position))
    }

    /// Zero-length entry emitting `changes` when playback crosses it.
    pub fn call(mut self, position: Position, changes: Vec<Change>) -> Self {
        self.entries.push(Entry::Call(position, changes));
        self
    }

    /// Call adding `class` to targets resolved at build time.
    pub fn add_class(mut self, position: Position, targets: Targets, class: &str) -> Self {
        self.entries
            .push(Entry::AddClass(position, targets, class.to_string()));
        self
    }

    pub fn on_complete(mut self, changes: Vec<Change>) -> Self {
        self.on_complete.extend(changes);
        self
    }

    pub fn on_complete_add_class(mut self, targets: Targets, class: &str) -> Self {
        self.on_complete_class.push((targets, class.to_string()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn place(position: Position, end: f32) -> f32 {
        match position {
            Position::Sequential => end,
            Position::Relative(offset) => (end + offset).max(0.0),
            Position::Absolute(t) => t.max(0.0),
        }
    }

    /// Resolve targets and lay out absolute start times.
    pub fn build(&self, doc: &dyn Document) -> Timeline {
        let mut timeline = Timeline {
            on_complete: self.on_complete.clone(),
            ..Timeline::default()
        };
        for (targets, class) in &self.on_complete_class {
            timeline
                .on_complete
                .extend(add_class_changes(doc, targets, class));
        }
        let mut end = 0.0f32;
        for entry in &self.entries {
            match entry {
                Entry::Step(step) => {
                    let start = Self::place(step.position, end);
                    let targets = step.targets.resolve(doc);
                    let spread = step.stagger * targets.len().saturating_sub(1) as f32;
                    for (i, element) in targets.into_iter().enumerate() {
                        let t0 = self.delay + start + step.stagger * i as f32;
                        match &step.kind {
                            StepKind::Tween(props) => timeline.tweens.push(ScheduledTween {
                                element,
                                props: props.clone(),
                                start: t0,
                                duration: step.duration,
                                ease: step.ease,
                            }),
                            StepKind::Counter { from, to } => {
                                timeline.counters.push(ScheduledCounter {
                                    element,
                                    from: *from,
                                    to: *to,
                                    start: t0,
                                    duration: step.duration,
                                    ease: step.ease,
                                })
                            }
                        }
                    }
                    end = end.max(start + spread + step.duration);
                }
                Entry::Call(position, changes) => {
                    let at = Self::place(*position, end);
                    timeline.calls.push(ScheduledCall {
                        at: self.delay + at,
                        changes: changes.clone(),
                    });
                    end = end.max(at);
                }
                Entry::AddClass(position, targets, class) => {
                    let at = Self::place(*position, end);
                    timeline.calls.push(ScheduledCall {
                        at: self.delay + at,
                        changes: add_class_changes(doc, targets, class),
                    });
                    end = end.max(at);
                }
            }
        }
        timeline.duration = self.delay + end;
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OverlaySpec;
    use crate::value::{Property, Rect, Viewport};

    /// Resolves `.a`, `.b`, `.c` to fixed lists; everything else is empty.
    struct Lookup;

    impl Document for Lookup {
        fn query_all(&self, selector: &str) -> Vec<ElementId> {
            match selector {
                ".a" => vec![ElementId(1)],
                ".b" => vec![ElementId(2)],
                ".c" => vec![ElementId(3), ElementId(4), ElementId(5)],
                _ => Vec::new(),
            }
        }
        fn query_within(&self, _: ElementId, selector: &str) -> Vec<ElementId> {
            self.query_all(selector)
        }
        fn closest(&self, _: ElementId, _: &str) -> Option<ElementId> {
            None
        }
        fn rect(&self, _: ElementId) -> Option<Rect> {
            None
        }
        fn viewport(&self) -> Viewport {
            Viewport::default()
        }
        fn computed_opacity(&self, _: ElementId) -> Option<f32> {
            None
        }
        fn attribute(&self, _: ElementId, _: &str) -> Option<String> {
            None
        }
        fn offset_top(&self, _: ElementId) -> Option<f32> {
            None
        }
        fn create_overlay(&mut self, _: ElementId, _: &OverlaySpec) -> Option<ElementId> {
            None
        }
    }

    fn fade() -> Props {
        Props::new().from(Property::Opacity, 0.0)
    }

    #[test]
    fn overlaps_follow_relative_offsets() {
        let tl = TimelineBuilder::new()
            .delay(0.3)
            .step(Step::tween(Targets::selector(".a"), fade(), 1.0, Ease::POWER3_OUT))
            .step_at(
                Step::tween(Targets::selector(".b"), fade(), 0.8, Ease::POWER2_OUT),
                Position::Relative(-0.6),
            )
            .build(&Lookup);
        assert_eq!(tl.tweens.len(), 2);
        assert!((tl.tweens[0].start - 0.3).abs() < 1e-6);
        assert!((tl.tweens[1].start - 0.7).abs() < 1e-6);
        assert!((tl.duration - 1.5).abs() < 1e-6);
    }

    #[test]
    fn stagger_spreads_targets() {
        let tl = TimelineBuilder::new()
            .step(Step::tween(Targets::selector(".c"), fade(), 0.6, Ease::None).stagger(0.1))
            .build(&Lookup);
        let starts: Vec<f32> = tl.tweens.iter().map(|t| t.start).collect();
        assert_eq!(starts.len(), 3);
        assert!((starts[1] - 0.1).abs() < 1e-6);
        assert!((starts[2] - 0.2).abs() < 1e-6);
        assert!((tl.duration - 0.8).abs() < 1e-6);
    }

    #[test]
    fn missing_targets_keep_their_slot() {
        let tl = TimelineBuilder::new()
            .step(Step::tween(Targets::selector(".missing"), fade(), 1.0, Ease::None))
            .step(Step::tween(Targets::selector(".a"), fade(), 1.0, Ease::None))
            .build(&Lookup);
        assert_eq!(tl.tweens.len(), 1);
        assert_eq!(tl.tweens[0].start, 1.0);
    }

    #[test]
    fn calls_are_zero_length_and_ordered() {
        let tl = TimelineBuilder::new()
            .step(Step::tween(Targets::selector(".a"), fade(), 1.0, Ease::None))
            .call(
                Position::Sequential,
                vec![Change::AddClass {
                    element: ElementId(1),
                    class: "animate-in".into(),
                }],
            )
            .build(&Lookup);
        assert_eq!(tl.calls.len(), 1);
        assert_eq!(tl.calls[0].at, 1.0);
        assert_eq!(tl.duration, 1.0);
    }

    #[test]
    fn class_calls_resolve_targets_at_build() {
        let tl = TimelineBuilder::new()
            .step(Step::tween(Targets::selector(".a"), fade(), 1.0, Ease::None))
            .add_class(Position::Sequential, Targets::selector(".b"), "animate-in")
            .on_complete_add_class(Targets::selector(".c"), "animate-in")
            .build(&Lookup);
        assert_eq!(
            tl.calls[0].changes,
            vec![Change::AddClass {
                element: ElementId(2),
                class: "animate-in".into()
            }]
        );
        assert_eq!(tl.on_complete.len(), 3);
    }

    #[test]
    fn negative_offsets_clamp_at_zero() {
        let tl = TimelineBuilder::new()
            .step_at(
                Step::tween(Targets::selector(".a"), fade(), 1.0, Ease::None),
                Position::Relative(-5.0),
            )
            .build(&Lookup);
        assert_eq!(tl.tweens[0].start, 0.0);
    }
}
