//! Engine: plays built timelines and scroll-bound scrubbers, producing
//! per-tick [`Change`]s.
//!
//! Methods:
//! - play / play_retained, play_forward, reverse, kill (`TimelineNotFound`
//!   once the timeline is gone), kill_all
//! - add_scrubber, set_scrub_target
//! - set_time_scale (the policy speed multiplier), pause / resume
//! - update(dt) → &Outputs
//!
//! Changes produced outside `update` (immediate renders of from-values,
//! `set`) are buffered and delivered by the next `update` or by
//! [`Engine::drain_changes`].

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::ease::Ease;
use crate::error::{Result, ScrollcueError};
use crate::ids::{ElementId, IdAllocator, ScrubberId, TimelineId};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::timeline::Timeline;
use crate::value::{Property, Props};

const MIN_TIME_SCALE: f32 = 0.01;
const SCRUB_EPSILON: f32 = 1e-4;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug)]
struct Channel {
    property: Property,
    from: f32,
    to: f32,
    live: bool,
}

#[derive(Debug)]
struct ActiveTween {
    element: ElementId,
    channels: Vec<Channel>,
    start: f32,
    duration: f32,
    ease: Ease,
}

impl ActiveTween {
    fn progress(&self, time: f32) -> f32 {
        if self.duration <= 0.0 {
            return if time >= self.start { 1.0 } else { 0.0 };
        }
        ((time - self.start) / self.duration).clamp(0.0, 1.0)
    }

    fn touched(&self, lo: f32, hi: f32) -> bool {
        hi >= self.start && lo <= self.start + self.duration
    }
}

#[derive(Debug)]
struct ActiveCounter {
    element: ElementId,
    from: f32,
    to: i64,
    start: f32,
    duration: f32,
    ease: Ease,
    shown: Option<i64>,
}

impl ActiveCounter {
    /// Rounded display value, kept between the start and the target. The
    /// target itself only shows on completion.
    fn display(&self, time: f32) -> i64 {
        let p = if self.duration <= 0.0 {
            1.0
        } else {
            ((time - self.start) / self.duration).clamp(0.0, 1.0)
        };
        let target = self.to as f32;
        let value = self.from + (target - self.from) * self.ease.apply(p);
        let lo = self.from.min(target).round() as i64;
        let hi = self.from.max(target).round() as i64;
        let shown = (value.round() as i64).clamp(lo, hi);
        if p < 1.0 && shown == self.to && lo != hi {
            let toward = if target > self.from { 1 } else { -1 };
            return shown - toward;
        }
        shown
    }
}

#[derive(Debug)]
struct Playback {
    tweens: Vec<ActiveTween>,
    counters: Vec<ActiveCounter>,
    calls: Vec<(f32, Vec<Change>)>,
    on_complete: Vec<Change>,
    duration: f32,
    time: f32,
    direction: Direction,
    settled: bool,
    completed_once: bool,
    retained: bool,
}

#[derive(Debug)]
struct Scrubber {
    element: ElementId,
    channels: Vec<Channel>,
    lag: f32,
    current: f32,
    target: f32,
}

#[derive(Debug)]
pub struct Engine {
    ids: IdAllocator,
    playbacks: IndexMap<TimelineId, Playback>,
    scrubbers: IndexMap<ScrubberId, Scrubber>,
    values: HashMap<(ElementId, Property), f32>,
    pending: Vec<Change>,
    pending_events: Vec<CoreEvent>,
    time_scale: f32,
    paused: bool,
    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            ids: IdAllocator::new(),
            playbacks: IndexMap::new(),
            scrubbers: IndexMap::new(),
            values: HashMap::new(),
            pending: Vec::new(),
            pending_events: Vec::new(),
            time_scale: 1.0,
            paused: false,
            outputs: Outputs::default(),
        }
    }

    /// Global time scale. Durations are effectively divided by it.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Last value written for `property` of `element`.
    pub fn current(&self, element: ElementId, property: &Property) -> Option<f32> {
        self.values.get(&(element, property.clone())).copied()
    }

    fn write(&mut self, element: ElementId, property: Property, value: f32) {
        self.values.insert((element, property.clone()), value);
        self.pending.push(Change::Style {
            element,
            property,
            value,
        });
    }

    /// Set properties immediately (GSAP `set`).
    pub fn set(&mut self, element: ElementId, values: &[(Property, f32)]) {
        for (property, value) in values {
            self.write(element, property.clone(), *value);
        }
    }

    /// Queue a non-style change with the engine's output stream.
    pub fn push_change(&mut self, change: Change) {
        self.pending.push(change);
    }

    fn resolve_channels(&self, element: ElementId, props: &Props) -> Vec<Channel> {
        props
            .iter()
            .map(|(property, delta)| {
                let (from, to) = delta.resolve(property, self.current(element, property));
                Channel {
                    property: property.clone(),
                    from,
                    to,
                    live: true,
                }
            })
            .collect()
    }

    /// Kill older channels writing the same element/property.
    fn overwrite(&mut self, keys: &[(ElementId, Property)]) {
        for pb in self.playbacks.values_mut() {
            for tw in &mut pb.tweens {
                for ch in &mut tw.channels {
                    if ch.live && keys.iter().any(|(e, p)| *e == tw.element && *p == ch.property) {
                        ch.live = false;
                    }
                }
            }
        }
    }

    /// Render every explicit from-value of `timeline` without playing it.
    /// The earliest step wins when several write the same property.
    pub fn prime(&mut self, timeline: &Timeline) {
        let mut seen: Vec<(ElementId, &Property)> = Vec::new();
        for t in &timeline.tweens {
            for (property, delta) in t.props.iter() {
                let Some(from) = delta.from else {
                    continue;
                };
                if seen.contains(&(t.element, property)) {
                    continue;
                }
                seen.push((t.element, property));
                self.write(t.element, property.clone(), from);
            }
        }
    }

    fn start(&mut self, timeline: Timeline, retained: bool) -> TimelineId {
        let id = self.ids.alloc_timeline();
        let keys: Vec<(ElementId, Property)> = timeline
            .tweens
            .iter()
            .flat_map(|t| t.props.iter().map(move |(p, _)| (t.element, p.clone())))
            .collect();
        self.overwrite(&keys);

        let mut tweens = Vec::with_capacity(timeline.tweens.len());
        for t in &timeline.tweens {
            let channels = self.resolve_channels(t.element, &t.props);
            tweens.push(ActiveTween {
                element: t.element,
                channels,
                start: t.start,
                duration: t.duration,
                ease: t.ease,
            });
        }
        self.prime(&timeline);

        let counters = timeline
            .counters
            .iter()
            .map(|c| ActiveCounter {
                element: c.element,
                from: c.from,
                to: c.to,
                start: c.start,
                duration: c.duration,
                ease: c.ease,
                shown: None,
            })
            .collect();
        let calls = timeline.calls.into_iter().map(|c| (c.at, c.changes)).collect();

        self.playbacks.insert(
            id,
            Playback {
                tweens,
                counters,
                calls,
                on_complete: timeline.on_complete,
                duration: timeline.duration,
                time: 0.0,
                direction: Direction::Forward,
                settled: false,
                completed_once: false,
                retained,
            },
        );
        id
    }

    /// Play a one-shot timeline; it is dropped once it completes.
    pub fn play(&mut self, timeline: Timeline) -> TimelineId {
        self.start(timeline, false)
    }

    /// Play a timeline that stays addressable for `reverse`/`play_forward`.
    pub fn play_retained(&mut self, timeline: Timeline) -> TimelineId {
        self.start(timeline, true)
    }

    fn retained_mut(&mut self, id: TimelineId) -> Result<&mut Playback> {
        self.playbacks
            .get_mut(&id)
            .ok_or(ScrollcueError::TimelineNotFound { id })
    }

    /// Resume a retained timeline towards its end.
    pub fn play_forward(&mut self, id: TimelineId) -> Result<()> {
        let pb = self.retained_mut(id)?;
        pb.direction = Direction::Forward;
        pb.settled = pb.time >= pb.duration && pb.completed_once;
        Ok(())
    }

    /// Run a retained timeline back towards its start.
    pub fn reverse(&mut self, id: TimelineId) -> Result<()> {
        let pb = self.retained_mut(id)?;
        pb.direction = Direction::Reverse;
        pb.settled = pb.time <= 0.0;
        Ok(())
    }

    /// Stop a timeline where it is. One-shot timelines are gone once they
    /// complete, so killing them afterwards reports `TimelineNotFound`.
    pub fn kill(&mut self, id: TimelineId) -> Result<()> {
        self.playbacks
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(ScrollcueError::TimelineNotFound { id })
    }

    /// Drop every timeline and scrubber and discard buffered output.
    /// Returns the number of timelines dropped.
    pub fn kill_all(&mut self) -> usize {
        let count = self.playbacks.len();
        self.playbacks.clear();
        self.scrubbers.clear();
        self.pending.clear();
        self.pending_events.clear();
        self.outputs.clear();
        count
    }

    /// Stop every channel writing to `element`.
    pub fn kill_tweens_of(&mut self, element: ElementId) {
        for pb in self.playbacks.values_mut() {
            for tw in pb.tweens.iter_mut().filter(|t| t.element == element) {
                for ch in &mut tw.channels {
                    ch.live = false;
                }
            }
        }
        self.scrubbers.retain(|_, s| s.element != element);
    }

    /// Forget cached values of a removed element.
    pub fn forget(&mut self, element: ElementId) {
        self.values.retain(|(e, _), _| *e != element);
    }

    pub fn is_active(&self, id: TimelineId) -> bool {
        self.playbacks.get(&id).is_some_and(|pb| !pb.settled)
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.playbacks.contains_key(&id)
    }

    pub fn timeline_time(&self, id: TimelineId) -> Option<f32> {
        self.playbacks.get(&id).map(|pb| pb.time)
    }

    pub fn direction(&self, id: TimelineId) -> Option<Direction> {
        self.playbacks.get(&id).map(|pb| pb.direction)
    }

    pub fn timeline_count(&self) -> usize {
        self.playbacks.len()
    }

    /// Whether anything would change on the next tick.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
            && self.playbacks.values().all(|pb| pb.settled)
            && self
                .scrubbers
                .values()
                .all(|s| (s.target - s.current).abs() <= SCRUB_EPSILON)
    }

    /// Scroll-bound mapping of `props` with a catch-up lag in seconds.
    pub fn add_scrubber(&mut self, element: ElementId, props: &Props, lag: f32) -> ScrubberId {
        let id = self.ids.alloc_scrubber();
        let channels = self.resolve_channels(element, props);
        self.scrubbers.insert(
            id,
            Scrubber {
                element,
                channels,
                lag: lag.max(0.0),
                current: 0.0,
                target: 0.0,
            },
        );
        id
    }

    pub fn set_scrub_target(&mut self, id: ScrubberId, progress: f32) {
        if let Some(s) = self.scrubbers.get_mut(&id) {
            s.target = progress.clamp(0.0, 1.0);
        }
    }

    pub fn scrub_progress(&self, id: ScrubberId) -> Option<f32> {
        self.scrubbers.get(&id).map(|s| s.current)
    }

    /// Drop a scrubber and write its properties back to their resting values.
    pub fn remove_scrubber(&mut self, id: ScrubberId) -> bool {
        let Some(scrubber) = self.scrubbers.shift_remove(&id) else {
            return false;
        };
        for channel in scrubber.channels {
            self.write(scrubber.element, channel.property, channel.from);
        }
        true
    }

    /// Buffered changes produced since the last update.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.pending)
    }

    pub fn drain_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Advance by `dt` seconds of wall time.
    pub fn update(&mut self, dt: f32) -> &Outputs {
        self.outputs.clear();
        self.outputs.changes.append(&mut self.pending);
        self.outputs.events.append(&mut self.pending_events);
        if self.paused {
            return &self.outputs;
        }

        let step = dt.max(0.0) * self.time_scale;
        let mut finished: Vec<TimelineId> = Vec::new();
        let mut removed: Vec<ElementId> = Vec::new();

        for (id, pb) in self.playbacks.iter_mut() {
            if pb.settled {
                continue;
            }
            let prev = pb.time;
            pb.time = match pb.direction {
                Direction::Forward => (prev + step).min(pb.duration),
                Direction::Reverse => (prev - step).max(0.0),
            };
            let (lo, hi) = if prev <= pb.time {
                (prev, pb.time)
            } else {
                (pb.time, prev)
            };

            for tw in &pb.tweens {
                if !tw.touched(lo, hi) {
                    continue;
                }
                let eased = tw.ease.apply(tw.progress(pb.time));
                for ch in tw.channels.iter().filter(|c| c.live) {
                    let value = ch.from + (ch.to - ch.from) * eased;
                    self.values.insert((tw.element, ch.property.clone()), value);
                    self.outputs.changes.push(Change::Style {
                        element: tw.element,
                        property: ch.property.clone(),
                        value,
                    });
                }
            }

            if pb.direction == Direction::Forward {
                for c in &mut pb.counters {
                    if hi < c.start {
                        continue;
                    }
                    let shown = c.display(pb.time);
                    if c.shown != Some(shown) {
                        c.shown = Some(shown);
                        self.outputs.changes.push(Change::SetText {
                            element: c.element,
                            text: shown.to_string(),
                        });
                    }
                }
                for (at, changes) in &pb.calls {
                    let crossed = if prev == 0.0 { *at <= hi } else { *at > lo && *at <= hi };
                    if crossed {
                        self.outputs.changes.extend(changes.iter().cloned());
                    }
                }
            }

            match pb.direction {
                Direction::Forward if pb.time >= pb.duration => {
                    pb.settled = true;
                    if !pb.completed_once {
                        pb.completed_once = true;
                        for change in &pb.on_complete {
                            if let Change::Remove { element } = change {
                                removed.push(*element);
                            }
                            self.outputs.changes.push(change.clone());
                        }
                    }
                    self.outputs
                        .events
                        .push(CoreEvent::TimelineCompleted { timeline: *id });
                    if !pb.retained {
                        finished.push(*id);
                    }
                }
                Direction::Reverse if pb.time <= 0.0 => {
                    pb.settled = true;
                    self.outputs
                        .events
                        .push(CoreEvent::TimelineReversed { timeline: *id });
                }
                _ => {}
            }
        }

        for id in finished {
            self.playbacks.shift_remove(&id);
        }
        for element in removed {
            self.values.retain(|(e, _), _| *e != element);
        }

        for s in self.scrubbers.values_mut() {
            let gap = s.target - s.current;
            if gap.abs() <= SCRUB_EPSILON {
                continue;
            }
            let k = if s.lag <= 0.0 { 1.0 } else { (dt / s.lag).min(1.0) };
            s.current += gap * k;
            if (s.target - s.current).abs() <= SCRUB_EPSILON {
                s.current = s.target;
            }
            for ch in &s.channels {
                let value = ch.from + (ch.to - ch.from) * s.current;
                self.values.insert((s.element, ch.property.clone()), value);
                self.outputs.changes.push(Change::Style {
                    element: s.element,
                    property: ch.property.clone(),
                    value,
                });
            }
        }

        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{ScheduledCall, ScheduledCounter, ScheduledTween};

    fn fade_in(element: ElementId, start: f32, duration: f32) -> ScheduledTween {
        ScheduledTween {
            element,
            props: Props::new().from(Property::Opacity, 0.0),
            start,
            duration,
            ease: Ease::None,
        }
    }

    fn opacity_of(out: &Outputs, element: ElementId) -> Option<f32> {
        out.changes.iter().rev().find_map(|c| match c {
            Change::Style {
                element: e,
                property: Property::Opacity,
                value,
            } if *e == element => Some(*value),
            _ => None,
        })
    }

    #[test]
    fn from_values_render_immediately() {
        let mut eng = Engine::new();
        eng.play(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.5, 1.0)],
            duration: 1.5,
            ..Timeline::default()
        });
        let changes = eng.drain_changes();
        assert_eq!(
            changes,
            vec![Change::Style {
                element: ElementId(1),
                property: Property::Opacity,
                value: 0.0
            }]
        );
    }

    #[test]
    fn one_shot_completes_and_is_dropped() {
        let mut eng = Engine::new();
        let id = eng.play(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        let out = eng.update(0.5);
        assert!((opacity_of(out, ElementId(1)).unwrap() - 0.5).abs() < 1e-6);
        let out = eng.update(0.6);
        assert_eq!(opacity_of(out, ElementId(1)), Some(1.0));
        assert!(out
            .events
            .contains(&CoreEvent::TimelineCompleted { timeline: id }));
        assert!(!eng.contains(id));
    }

    #[test]
    fn time_scale_divides_durations() {
        let mut eng = Engine::new();
        eng.set_time_scale(0.5);
        let id = eng.play_retained(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        eng.update(1.0);
        assert!((eng.timeline_time(id).unwrap() - 0.5).abs() < 1e-6);
        eng.update(1.0);
        assert!(!eng.is_active(id));
    }

    #[test]
    fn reverse_runs_back_to_start() {
        let mut eng = Engine::new();
        let id = eng.play_retained(Timeline {
            tweens: vec![fade_in(ElementId(3), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        eng.update(0.4);
        eng.reverse(id).unwrap();
        let out = eng.update(1.0);
        assert_eq!(opacity_of(out, ElementId(3)), Some(0.0));
        assert!(out
            .events
            .contains(&CoreEvent::TimelineReversed { timeline: id }));
        assert!(eng.contains(id));
        eng.play_forward(id).unwrap();
        assert!(eng.is_active(id));
    }

    #[test]
    fn unknown_timelines_are_reported() {
        let mut eng = Engine::new();
        let id = eng.play(Timeline {
            tweens: vec![fade_in(ElementId(3), 0.0, 0.5)],
            duration: 0.5,
            ..Timeline::default()
        });
        eng.update(1.0);
        assert!(!eng.contains(id));
        let missing = Err(ScrollcueError::TimelineNotFound { id });
        assert_eq!(eng.reverse(id), missing);
        assert_eq!(eng.play_forward(id), missing);
        assert_eq!(eng.kill(id), missing);

        let kept = eng.play_retained(Timeline {
            tweens: vec![fade_in(ElementId(3), 0.0, 0.5)],
            duration: 0.5,
            ..Timeline::default()
        });
        assert_eq!(eng.kill(kept), Ok(()));
        assert!(!eng.contains(kept));
    }

    #[test]
    fn newer_tween_overwrites_older_channel() {
        let mut eng = Engine::new();
        eng.play(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        eng.update(0.2);
        eng.play(Timeline {
            tweens: vec![ScheduledTween {
                element: ElementId(1),
                props: Props::new().to(Property::Opacity, 0.5),
                start: 0.0,
                duration: 1.0,
                ease: Ease::None,
            }],
            duration: 1.0,
            ..Timeline::default()
        });
        let out = eng.update(1.0);
        let writes: Vec<f32> = out
            .changes
            .iter()
            .filter_map(|c| match c {
                Change::Style { value, .. } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(writes, vec![0.5]);
    }

    #[test]
    fn counter_shows_target_only_at_completion() {
        let mut eng = Engine::new();
        eng.play(Timeline {
            counters: vec![ScheduledCounter {
                element: ElementId(9),
                from: 0.0,
                to: 10,
                start: 0.0,
                duration: 1.0,
                ease: Ease::POWER2_OUT,
            }],
            duration: 1.0,
            ..Timeline::default()
        });
        let mut shown = Vec::new();
        for _ in 0..20 {
            for c in &eng.update(0.06).changes {
                if let Change::SetText { text, .. } = c {
                    shown.push(text.parse::<i64>().unwrap());
                }
            }
        }
        assert_eq!(shown.iter().filter(|v| **v == 10).count(), 1);
        assert_eq!(*shown.last().unwrap(), 10);
        assert!(shown.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn negative_counter_counts_down_to_its_target() {
        let mut eng = Engine::new();
        eng.play(Timeline {
            counters: vec![ScheduledCounter {
                element: ElementId(9),
                from: 0.0,
                to: -5,
                start: 0.0,
                duration: 1.0,
                ease: Ease::POWER2_OUT,
            }],
            duration: 1.0,
            ..Timeline::default()
        });
        let mut shown = Vec::new();
        for _ in 0..20 {
            for c in &eng.update(0.06).changes {
                if let Change::SetText { text, .. } = c {
                    shown.push(text.parse::<i64>().unwrap());
                }
            }
        }
        assert_eq!(shown.iter().filter(|v| **v == -5).count(), 1);
        assert_eq!(*shown.last().unwrap(), -5);
        assert!(shown.iter().all(|v| (-5..=0).contains(v)));
        assert!(shown.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn removed_scrubber_returns_to_rest() {
        let mut eng = Engine::new();
        let id = eng.add_scrubber(
            ElementId(4),
            &Props::new().from_to(Property::YPercent, 0.0, -10.0),
            1.0,
        );
        eng.set_scrub_target(id, 1.0);
        eng.update(2.0);
        assert_eq!(eng.current(ElementId(4), &Property::YPercent), Some(-10.0));

        assert!(eng.remove_scrubber(id));
        assert!(!eng.remove_scrubber(id));
        assert_eq!(eng.current(ElementId(4), &Property::YPercent), Some(0.0));
        assert!(eng.drain_changes().contains(&Change::Style {
            element: ElementId(4),
            property: Property::YPercent,
            value: 0.0,
        }));
    }

    #[test]
    fn calls_fire_once_forward() {
        let mut eng = Engine::new();
        let add = Change::AddClass {
            element: ElementId(2),
            class: "animate-in".into(),
        };
        eng.play(Timeline {
            calls: vec![ScheduledCall {
                at: 0.5,
                changes: vec![add.clone()],
            }],
            duration: 1.0,
            ..Timeline::default()
        });
        let mut seen = 0;
        for _ in 0..10 {
            seen += eng.update(0.2).changes.iter().filter(|c| **c == add).count();
        }
        assert_eq!(seen, 1);
    }

    #[test]
    fn scrubber_chases_target_with_lag() {
        let mut eng = Engine::new();
        let id = eng.add_scrubber(ElementId(4), &Props::new().to(Property::Y, -30.0), 1.0);
        eng.set_scrub_target(id, 1.0);
        eng.update(0.5);
        assert!((eng.scrub_progress(id).unwrap() - 0.5).abs() < 1e-6);
        eng.update(1.0);
        assert_eq!(eng.scrub_progress(id), Some(1.0));
        assert_eq!(eng.current(ElementId(4), &Property::Y), Some(-30.0));
    }

    #[test]
    fn paused_engine_holds_time() {
        let mut eng = Engine::new();
        let id = eng.play_retained(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        eng.pause();
        eng.update(0.5);
        assert_eq!(eng.timeline_time(id), Some(0.0));
        eng.resume();
        eng.update(0.5);
        assert_eq!(eng.timeline_time(id), Some(0.5));
    }

    #[test]
    fn kill_all_discards_everything() {
        let mut eng = Engine::new();
        eng.play(Timeline {
            tweens: vec![fade_in(ElementId(1), 0.0, 1.0)],
            duration: 1.0,
            ..Timeline::default()
        });
        assert_eq!(eng.kill_all(), 1);
        assert!(eng.update(0.5).changes.is_empty());
        assert!(eng.is_idle());
    }
}
