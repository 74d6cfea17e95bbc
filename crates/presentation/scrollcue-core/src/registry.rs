//! Trigger registry.
//!
//! Binds declared [`Trigger`]s to watcher subscriptions and runs their actions
//! when the watcher reports crossings. Each trigger moves through
//! `Unarmed → Armed → Fired` (fire-once) or `Armed ⇄ Playing / Reversed`
//! (reversible). Elements entering in the same batch are handled together so
//! reveal recipes can stagger them.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{Result, ScrollcueError};
use crate::host::Document;
use crate::ids::{ElementId, IdAllocator, ScrubberId, SubscriptionId, TimelineId, TriggerId};
use crate::offset::ScrollOffset;
use crate::outputs::{Change, CoreEvent};
use crate::trigger::{parse_counter_target, RepeatPolicy, Trigger, TriggerAction};
use crate::watcher::{Crossing, EntryPosition, Watcher};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TriggerState {
    /// Registered, nothing matched yet.
    Unarmed,
    /// Observing at least one element.
    Armed,
    /// Fire-once trigger whose elements have all fired.
    Fired,
    Playing,
    Reversed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedElement {
    pub element: ElementId,
    pub trigger: TriggerId,
    pub subscription: Option<SubscriptionId>,
    pub fired: bool,
    /// Retained timeline of a reversible trigger.
    pub timeline: Option<TimelineId>,
    pub scrubber: Option<ScrubberId>,
}

#[derive(Debug)]
struct Registered {
    trigger: Trigger,
    state: TriggerState,
    watched: Vec<WatchedElement>,
}

#[derive(Debug, Default)]
pub struct Registry {
    ids: IdAllocator,
    triggers: IndexMap<TriggerId, Registered>,
    by_subscription: HashMap<SubscriptionId, (TriggerId, usize)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the trigger's selector and start watching every match.
    /// Scrub triggers get engine scrubbers instead of subscriptions.
    pub fn register(
        &mut self,
        trigger: Trigger,
        doc: &dyn Document,
        watcher: &mut Watcher,
        engine: &mut Engine,
    ) -> TriggerId {
        let id = self.ids.alloc_trigger();
        let elements = doc.query_all(&trigger.selector);
        let options = trigger.observe_options();
        let mut watched = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let mut w = WatchedElement {
                element,
                trigger: id,
                subscription: None,
                fired: false,
                timeline: None,
                scrubber: None,
            };
            if let TriggerAction::Scrub(spec) = &trigger.action {
                w.scrubber = Some(engine.add_scrubber(element, &spec.props_for(index), spec.lag));
            } else {
                let sub = watcher.observe(element, options);
                self.by_subscription.insert(sub, (id, index));
                w.subscription = Some(sub);
            }
            watched.push(w);
        }
        let state = if watched.is_empty() {
            TriggerState::Unarmed
        } else {
            TriggerState::Armed
        };
        log::debug!(
            "registered trigger '{}' ({}) on {} element(s)",
            trigger.name,
            trigger.action.kind(),
            watched.len()
        );
        self.triggers.insert(
            id,
            Registered {
                trigger,
                state,
                watched,
            },
        );
        let reg = &self.triggers[&id];
        let scrub = reg.trigger.is_scrub();
        // Sequences hide their from-states until they fire.
        if let TriggerAction::Sequence(builder) = &reg.trigger.action {
            if !reg.watched.is_empty() {
                engine.prime(&builder.build(doc));
            }
        }
        if scrub {
            self.update_scrub(id, doc, engine);
        }
        id
    }

    pub fn state(&self, id: TriggerId) -> Option<TriggerState> {
        self.triggers.get(&id).map(|r| r.state)
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(&id).map(|r| &r.trigger)
    }

    pub fn watched(&self, id: TriggerId) -> &[WatchedElement] {
        self.triggers
            .get(&id)
            .map(|r| r.watched.as_slice())
            .unwrap_or(&[])
    }

    pub fn find(&self, name: &str) -> Option<TriggerId> {
        self.triggers
            .iter()
            .find(|(_, r)| r.trigger.name == name)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Run trigger actions for one watcher batch. The caller closes the batch
    /// with [`Watcher::finish_batch`] afterwards.
    pub fn handle(
        &mut self,
        crossings: &[Crossing],
        doc: &dyn Document,
        watcher: &mut Watcher,
        engine: &mut Engine,
    ) -> Vec<CoreEvent> {
        let mut grouped: IndexMap<TriggerId, Vec<(usize, &Crossing)>> = IndexMap::new();
        for c in crossings {
            if let Some((tid, index)) = self.by_subscription.get(&c.subscription) {
                grouped.entry(*tid).or_default().push((*index, c));
            }
        }

        let mut events = Vec::new();
        for (tid, list) in grouped {
            let Some(reg) = self.triggers.get_mut(&tid) else {
                continue;
            };
            match reg.trigger.repeat {
                RepeatPolicy::OnceForward => {
                    let batch: Vec<usize> = list
                        .iter()
                        .filter(|(i, c)| c.entered && !reg.watched[*i].fired)
                        .map(|(i, _)| *i)
                        .collect();
                    events.extend(self.fire_indices(tid, &batch, doc, watcher, engine));
                }
                RepeatPolicy::ReverseOnLeave => {
                    for (i, c) in list {
                        let w = &mut reg.watched[i];
                        if c.entered {
                            let resumed =
                                w.timeline.is_some_and(|t| engine.play_forward(t).is_ok());
                            if !resumed {
                                if let Some(timeline) = run_action(&reg.trigger, &[w.element], doc) {
                                    w.timeline = Some(engine.play_retained(timeline));
                                }
                                if let TriggerAction::AddClass(class) = &reg.trigger.action {
                                    engine.push_change(Change::AddClass {
                                        element: w.element,
                                        class: class.clone(),
                                    });
                                }
                            }
                            w.fired = true;
                            reg.state = TriggerState::Playing;
                            events.push(CoreEvent::TriggerFired {
                                trigger: tid,
                                name: reg.trigger.name.clone(),
                                elements: vec![w.element],
                            });
                        } else if c.position == EntryPosition::Before && w.fired {
                            if let Some(Err(err)) = w.timeline.map(|t| engine.reverse(t)) {
                                log::debug!("reverse skipped: {err}");
                            }
                            if let TriggerAction::AddClass(class) = &reg.trigger.action {
                                engine.push_change(Change::RemoveClass {
                                    element: w.element,
                                    class: class.clone(),
                                });
                            }
                            reg.state = TriggerState::Reversed;
                            events.push(CoreEvent::TriggerReversed {
                                trigger: tid,
                                name: reg.trigger.name.clone(),
                            });
                        }
                    }
                }
            }
        }
        events
    }

    /// Fire a fire-once trigger for the watched elements at `indices`,
    /// unobserving them. Already-fired elements are skipped.
    fn fire_indices(
        &mut self,
        tid: TriggerId,
        indices: &[usize],
        doc: &dyn Document,
        watcher: &mut Watcher,
        engine: &mut Engine,
    ) -> Option<CoreEvent> {
        let reg = self.triggers.get_mut(&tid)?;
        let mut elements = Vec::with_capacity(indices.len());
        for &i in indices {
            let w = &mut reg.watched[i];
            if w.fired {
                continue;
            }
            w.fired = true;
            if let Some(sub) = w.subscription.take() {
                watcher.unobserve(sub);
                self.by_subscription.remove(&sub);
            }
            elements.push(w.element);
        }
        if elements.is_empty() {
            return None;
        }
        if let Some(timeline) = run_action(&reg.trigger, &elements, doc) {
            engine.play(timeline);
        }
        if let TriggerAction::AddClass(class) = &reg.trigger.action {
            for element in &elements {
                engine.push_change(Change::AddClass {
                    element: *element,
                    class: class.clone(),
                });
            }
        }
        reg.state = if reg.watched.iter().all(|w| w.fired) {
            TriggerState::Fired
        } else {
            TriggerState::Armed
        };
        log::debug!(
            "trigger '{}' fired for {} element(s)",
            reg.trigger.name,
            elements.len()
        );
        Some(CoreEvent::TriggerFired {
            trigger: tid,
            name: reg.trigger.name.clone(),
            elements,
        })
    }

    /// Fire a fire-once trigger for `elements` outside any watcher batch,
    /// e.g. from a load-time visibility check. Elements the trigger does not
    /// watch, or that already fired, are ignored.
    pub fn fire_elements(
        &mut self,
        tid: TriggerId,
        elements: &[ElementId],
        doc: &dyn Document,
        watcher: &mut Watcher,
        engine: &mut Engine,
    ) -> Option<CoreEvent> {
        let reg = self.triggers.get(&tid)?;
        if reg.trigger.repeat != RepeatPolicy::OnceForward {
            return None;
        }
        let indices: Vec<usize> = reg
            .watched
            .iter()
            .enumerate()
            .filter(|(_, w)| elements.contains(&w.element))
            .map(|(i, _)| i)
            .collect();
        self.fire_indices(tid, &indices, doc, watcher, engine)
    }

    fn update_scrub(&mut self, id: TriggerId, doc: &dyn Document, engine: &mut Engine) {
        let Some(reg) = self.triggers.get(&id) else {
            return;
        };
        let vh = doc.viewport().height;
        let start = reg.trigger.start;
        let end = reg.trigger.end.unwrap_or(start);
        for w in &reg.watched {
            let (Some(sid), Some(rect)) = (w.scrubber, doc.rect(w.element)) else {
                continue;
            };
            engine.set_scrub_target(sid, ScrollOffset::progress(&start, &end, &rect, vh));
        }
    }

    /// Re-evaluate scroll-bound triggers against the current layout.
    pub fn on_scroll(&mut self, doc: &dyn Document, engine: &mut Engine) {
        let ids: Vec<TriggerId> = self
            .triggers
            .iter()
            .filter(|(_, r)| r.trigger.is_scrub())
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            self.update_scrub(id, doc, engine);
        }
    }

    /// Re-measure boundaries: scrub targets, and a geometric pass when the
    /// watcher has no native source.
    pub fn refresh(
        &mut self,
        doc: &dyn Document,
        watcher: &mut Watcher,
        engine: &mut Engine,
    ) -> Vec<CoreEvent> {
        self.on_scroll(doc, engine);
        let mut events = Vec::new();
        if watcher.capability() == crate::watcher::Capability::Geometric {
            let crossings = watcher.poll(doc);
            events = self.handle(&crossings, doc, watcher, engine);
            watcher.finish_batch();
        }
        events.push(CoreEvent::Refreshed);
        events
    }

    fn drop_registered(reg: &Registered, watcher: &mut Watcher, engine: &mut Engine) {
        for w in &reg.watched {
            if let Some(sub) = w.subscription {
                watcher.unobserve(sub);
            }
            // A one-shot timeline has already left the engine once it completed.
            if let Some(t) = w.timeline {
                let _ = engine.kill(t);
            }
            if let Some(s) = w.scrubber {
                engine.remove_scrubber(s);
            }
        }
    }

    /// Remove one trigger, stopping its timelines and observation.
    pub fn kill(&mut self, id: TriggerId, watcher: &mut Watcher, engine: &mut Engine) -> Result<()> {
        let reg = self
            .triggers
            .shift_remove(&id)
            .ok_or(ScrollcueError::TriggerNotFound { id })?;
        Self::drop_registered(&reg, watcher, engine);
        self.by_subscription.retain(|_, (tid, _)| *tid != id);
        Ok(())
    }

    /// Remove every trigger registered under `scope`.
    pub fn kill_scope(&mut self, scope: &str, watcher: &mut Watcher, engine: &mut Engine) -> usize {
        let doomed: Vec<TriggerId> = self
            .triggers
            .iter()
            .filter(|(_, r)| r.trigger.scope.as_deref() == Some(scope))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            if let Err(err) = self.kill(*id, watcher, engine) {
                log::debug!("scope '{scope}': {err}");
            }
        }
        if !doomed.is_empty() {
            log::debug!("killed {} trigger(s) in scope '{scope}'", doomed.len());
        }
        doomed.len()
    }

    /// Forget every trigger and stop observing. Returns the number of
    /// subscriptions dropped.
    pub fn teardown(&mut self, watcher: &mut Watcher) -> usize {
        self.triggers.clear();
        self.by_subscription.clear();
        watcher.clear()
    }
}

/// Build the timeline a trigger plays for `elements`.
fn run_action(
    trigger: &Trigger,
    elements: &[ElementId],
    doc: &dyn Document,
) -> Option<crate::timeline::Timeline> {
    let counters: Vec<(ElementId, i64)> = match &trigger.action {
        TriggerAction::Counter(spec) => elements
            .iter()
            .map(|e| {
                let raw = doc.attribute(*e, &spec.attribute).unwrap_or_default();
                let target = parse_counter_target(&raw).unwrap_or_else(|| {
                    log::warn!("counter {e:?} has no integer target in {raw:?}; using 0");
                    0
                });
                (*e, target)
            })
            .collect(),
        _ => Vec::new(),
    };
    let timeline = trigger.timeline_for(elements, &counters)?.build(doc);
    (!timeline.is_empty()).then_some(timeline)
}
