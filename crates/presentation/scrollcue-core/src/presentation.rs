//! Presentation: owns every component and routes host events through them.
//!
//! Every entry point returns the [`Outputs`] the host must apply. After
//! teardown all entry points return empty outputs.

use crate::config::Config;
use crate::effects::Effects;
use crate::engine::Engine;
use crate::error::{Result, ScrollcueError};
use crate::forms;
use crate::host::{Document, EnvSignals};
use crate::ids::ElementId;
use crate::lifecycle::{Lifecycle, LifecycleAction, LifecycleEvent};
use crate::navigation::{anchor_target, Navbar};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::policy::{is_mobile, Policy, PolicyTier};
use crate::registry::Registry;
use crate::site;
use crate::value::{Point, Property};
use crate::video::{MediaEvent, VideoController};
use crate::watcher::{initially_visible, Capability, IntersectionEntry, NativeOp, Watcher};

#[derive(Debug)]
pub struct Presentation {
    config: Config,
    policy: Policy,
    env: EnvSignals,
    watcher: Watcher,
    registry: Registry,
    engine: Engine,
    effects: Effects,
    lifecycle: Lifecycle,
    navbar: Navbar,
    video: VideoController,
    started: bool,
    torn_down: bool,
    outputs: Outputs,
}

impl Presentation {
    pub fn new(config: Config, capability: Capability) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: Policy::new(config.policy.clone()),
            env: EnvSignals::default(),
            watcher: Watcher::new(capability),
            registry: Registry::new(),
            engine: Engine::new(),
            effects: Effects::new(
                config.magnetic.clone(),
                config.ripple.clone(),
                config.hover.clone(),
            ),
            lifecycle: Lifecycle::new(&config.lifecycle),
            navbar: Navbar::new(config.navbar.clone()),
            video: VideoController::new(config.video.clone()),
            config,
            started: false,
            torn_down: false,
            outputs: Outputs::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tier(&self) -> PolicyTier {
        self.policy.tier()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Native observer work for the host to mirror.
    pub fn drain_native_ops(&mut self) -> Vec<NativeOp> {
        self.watcher.drain_native_ops()
    }

    fn begin(&mut self) -> bool {
        self.outputs.clear();
        !self.torn_down
    }

    fn finish(&mut self) -> &Outputs {
        self.outputs.changes.append(&mut self.engine.drain_changes());
        self.outputs.events.append(&mut self.engine.drain_events());
        &self.outputs
    }

    fn is_desktop(&self) -> bool {
        self.env.viewport_width > self.config.hover.desktop_min_width
    }

    /// Push the tier's settings into the engine, watcher and effects.
    /// Push the active tier's settings into the engine, watcher and effects.
    /// Complex sections are only reset when the tier was just entered.
    fn apply_tier(&mut self, doc: &dyn Document, entered: bool) {
        let settings = self.policy.settings();
        self.engine.set_time_scale(settings.speed_multiplier);
        self.watcher.set_limit_callbacks(settings.limit_callbacks);
        self.effects.set_viewport_width(self.env.viewport_width);
        self.effects
            .set_enabled(settings.pointer_effects, doc, &mut self.engine);
        if entered && settings.neutralize_complex {
            for element in doc.query_all(site::COMPLEX) {
                self.engine.kill_tweens_of(element);
                self.engine.forget(element);
                self.engine.push_change(Change::ClearStyle { element });
                self.engine.set(element, &[(Property::Opacity, 1.0)]);
            }
        }
    }

    fn recompute_tier(&mut self, doc: &dyn Document, initial: bool) {
        let previous = self.policy.recompute(&self.env);
        if let Some(previous) = previous {
            log::info!(
                "policy tier {} -> {}",
                previous.name(),
                self.policy.tier().name()
            );
            self.outputs.push_event(CoreEvent::TierChanged {
                from: previous,
                to: self.policy.tier(),
            });
        }
        self.apply_tier(doc, initial || previous.is_some());
    }

    fn register_tech_specs(&mut self, doc: &dyn Document) {
        let mobile = is_mobile(&self.env, self.policy.thresholds());
        for trigger in site::tech_specs_triggers(doc, mobile, self.is_desktop()) {
            self.registry
                .register(trigger, doc, &mut self.watcher, &mut self.engine);
        }
    }

    fn run_geometric_pass(&mut self, doc: &dyn Document) {
        if self.watcher.capability() != Capability::Geometric {
            return;
        }
        let crossings = self.watcher.poll(doc);
        let events = self
            .registry
            .handle(&crossings, doc, &mut self.watcher, &mut self.engine);
        self.watcher.finish_batch();
        self.outputs.events.extend(events);
    }

    /// Force the reveal class onto elements for which `pick` holds.
    fn force_reveal(&mut self, doc: &dyn Document, pick: impl Fn(&dyn Document, ElementId) -> bool) {
        let Some(tid) = self.registry.find(site::REVEAL_CLASS_TRIGGER) else {
            return;
        };
        let elements: Vec<ElementId> = self
            .registry
            .watched(tid)
            .iter()
            .filter(|w| !w.fired && pick(doc, w.element))
            .map(|w| w.element)
            .collect();
        if elements.is_empty() {
            return;
        }
        if let Some(ev) =
            self.registry
                .fire_elements(tid, &elements, doc, &mut self.watcher, &mut self.engine)
        {
            self.outputs.push_event(ev);
        }
    }

    /// Document-ready: classify the device, register every trigger, start
    /// the hero and the background video.
    pub fn start(&mut self, doc: &dyn Document, env: EnvSignals) -> Result<&Outputs> {
        if self.torn_down {
            return Err(ScrollcueError::TornDown);
        }
        self.outputs.clear();
        if self.started {
            return Ok(self.finish());
        }
        self.started = true;
        self.env = env;
        self.recompute_tier(doc, true);

        for trigger in site::page_triggers(doc, &self.config.reveal) {
            self.registry
                .register(trigger, doc, &mut self.watcher, &mut self.engine);
        }
        self.register_tech_specs(doc);

        let margin = self.config.reveal.visibility_margin;
        self.force_reveal(doc, |d, e| {
            let vh = d.viewport().height;
            d.rect(e).is_some_and(|r| initially_visible(&r, vh, margin))
        });

        if let Some(hero) = site::hero_timeline(doc) {
            self.engine.play(hero);
        }
        let video = self.video.start(doc);
        self.outputs.changes.extend(video);
        self.run_geometric_pass(doc);
        if self.env.hidden {
            self.engine.pause();
            self.outputs.push_event(CoreEvent::Paused);
        }
        log::debug!(
            "presentation started: {} trigger(s), {} subscription(s), tier {}",
            self.registry.len(),
            self.watcher.len(),
            self.policy.tier().name()
        );
        Ok(self.finish())
    }

    /// Entries from the host's native observers.
    pub fn on_intersections(&mut self, entries: &[IntersectionEntry], doc: &dyn Document) -> &Outputs {
        if self.begin() {
            let crossings = self.watcher.deliver(entries);
            let events = self
                .registry
                .handle(&crossings, doc, &mut self.watcher, &mut self.engine);
            self.watcher.finish_batch();
            self.outputs.events.extend(events);
        }
        self.finish()
    }

    pub fn on_scroll(&mut self, scroll_y: f32, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            if let Some(change) = self.navbar.on_scroll(scroll_y, doc) {
                self.outputs.push_change(change);
            }
            self.registry.on_scroll(doc, &mut self.engine);
            self.run_geometric_pass(doc);
        }
        self.finish()
    }

    pub fn on_pointer_enter(&mut self, target: ElementId, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            self.effects.pointer_enter(target, doc, &mut self.engine);
        }
        self.finish()
    }

    pub fn on_pointer_move(&mut self, target: ElementId, pointer: Point, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            self.effects
                .pointer_move(target, pointer, doc, &mut self.engine);
        }
        self.finish()
    }

    pub fn on_pointer_leave(&mut self, target: ElementId, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            self.effects.pointer_leave(target, doc, &mut self.engine);
        }
        self.finish()
    }

    pub fn on_click(&mut self, target: ElementId, pointer: Point, doc: &mut dyn Document) -> &Outputs {
        if self.begin() {
            self.effects.click(target, pointer, doc, &mut self.engine);
        }
        self.finish()
    }

    /// In-page link click. Outputs hold a `ScrollTo` when the host should
    /// prevent the default navigation.
    pub fn on_anchor_click(&mut self, href: &str, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            if let Some(change) = anchor_target(href, doc, &self.config.anchors) {
                self.outputs.push_change(change);
            }
        }
        self.finish()
    }

    /// Newsletter submit with the current input value.
    pub fn on_submit(&mut self, value: &str, doc: &dyn Document) -> &Outputs {
        if self.begin() {
            let input = doc
                .query_all(&self.config.newsletter.input_selector)
                .into_iter()
                .next();
            if let Some(input) = input {
                let (result, changes) =
                    forms::submit_newsletter(input, value, &self.config.newsletter);
                if let Err(err) = result {
                    log::debug!("newsletter rejected: {err}");
                }
                self.outputs.changes.extend(changes);
            }
        }
        self.finish()
    }

    pub fn on_media_event(&mut self, event: MediaEvent, current_rate: f64) -> &Outputs {
        if self.begin() {
            if let Some(change) = self.video.on_media_event(event, current_rate) {
                self.outputs.push_change(change);
            }
        }
        self.finish()
    }

    /// Outcome of the video's play request.
    pub fn on_video_play(&mut self, started: bool, current_rate: f64) -> &Outputs {
        if self.begin() {
            let change = if started {
                self.video.play_resolved(current_rate)
            } else {
                self.video.play_rejected()
            };
            if let Some(change) = change {
                self.outputs.push_change(change);
            }
        }
        self.finish()
    }

    pub fn on_lifecycle(
        &mut self,
        event: LifecycleEvent,
        now_ms: f64,
        env: &EnvSignals,
        doc: &dyn Document,
    ) -> &Outputs {
        if self.begin() {
            self.env = env.clone();
            if let Some(action) = self.lifecycle.handle(event, now_ms) {
                self.run(action, doc);
            }
        }
        self.finish()
    }

    fn run(&mut self, action: LifecycleAction, doc: &dyn Document) {
        match action {
            LifecycleAction::LoadFallback => {
                let events = self
                    .registry
                    .refresh(doc, &mut self.watcher, &mut self.engine);
                self.outputs.events.extend(events);
                self.force_reveal(doc, |d, e| d.computed_opacity(e) == Some(0.0));
            }
            LifecycleAction::Reconfigure => {
                self.recompute_tier(doc, false);
                self.registry.kill_scope(
                    site::TECH_SPECS_SCOPE,
                    &mut self.watcher,
                    &mut self.engine,
                );
                self.register_tech_specs(doc);
                let events = self
                    .registry
                    .refresh(doc, &mut self.watcher, &mut self.engine);
                self.outputs.events.extend(events);
            }
            LifecycleAction::Pause => {
                self.engine.pause();
                self.outputs.push_event(CoreEvent::Paused);
            }
            LifecycleAction::Resume => {
                self.engine.resume();
                self.outputs.push_event(CoreEvent::Resumed);
            }
            LifecycleAction::Teardown => self.teardown_inner(),
        }
    }

    /// Advance one frame: settle debounced lifecycle work, then tick the
    /// engine by `dt` seconds.
    pub fn update(&mut self, dt: f32, now_ms: f64, doc: &dyn Document) -> &Outputs {
        if !self.begin() {
            return &self.outputs;
        }
        if let Some(action) = self.lifecycle.poll(now_ms) {
            self.run(action, doc);
        }
        let mut changes = self.engine.drain_changes();
        self.outputs.changes.append(&mut changes);
        let tick = self.engine.update(dt);
        self.outputs.changes.extend(tick.changes.iter().cloned());
        self.outputs.events.extend(tick.events.iter().cloned());
        &self.outputs
    }

    fn teardown_inner(&mut self) {
        if self.torn_down {
            return;
        }
        self.outputs
            .changes
            .extend(self.effects.teardown(&self.engine));
        let subscriptions = self.registry.teardown(&mut self.watcher);
        let timelines = self.engine.kill_all();
        self.torn_down = true;
        log::info!("presentation torn down: {subscriptions} subscription(s), {timelines} timeline(s)");
        self.outputs.push_event(CoreEvent::TornDown {
            subscriptions,
            timelines,
        });
    }

    /// Unobserve everything, kill every timeline and drop pending timers.
    /// Idempotent.
    pub fn teardown(&mut self) -> &Outputs {
        self.outputs.clear();
        if !self.torn_down {
            self.lifecycle.handle(LifecycleEvent::Unload, 0.0);
            self.teardown_inner();
        }
        &self.outputs
    }
}
