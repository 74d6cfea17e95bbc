#![allow(dead_code)]

use scrollcue_core::{
    Capability, Change, Config, CoreEvent, ElementId, EnvSignals, LifecycleEvent, Outputs, Point,
    Presentation,
};
use scrollcue_test_fixtures::{FakeDocument, FakeObservers};

pub const FRAME: f32 = 1.0 / 60.0;

/// A presentation wired to an in-memory page, applying every output the way
/// the browser adapter would.
pub struct Harness {
    pub p: Presentation,
    pub doc: FakeDocument,
    pub obs: FakeObservers,
    pub env: EnvSignals,
    pub now_ms: f64,
    pub log: Vec<Change>,
    pub events: Vec<CoreEvent>,
}

impl Harness {
    pub fn start(doc: FakeDocument) -> Self {
        let env = EnvSignals::default().with_viewport(doc_width(&doc), doc_height(&doc));
        Self::start_with(doc, env, Config::default(), Capability::Native)
    }

    pub fn start_env(doc: FakeDocument, env: EnvSignals) -> Self {
        Self::start_with(doc, env, Config::default(), Capability::Native)
    }

    pub fn start_with(
        doc: FakeDocument,
        env: EnvSignals,
        config: Config,
        capability: Capability,
    ) -> Self {
        let p = Presentation::new(config, capability).expect("valid config");
        let mut h = Self {
            p,
            doc,
            obs: FakeObservers::new(),
            env: env.clone(),
            now_ms: 0.0,
            log: Vec::new(),
            events: Vec::new(),
        };
        let out = h.p.start(&h.doc, env).expect("start").clone();
        h.absorb(out);
        h
    }

    pub fn absorb(&mut self, out: Outputs) {
        self.doc.apply(&out.changes);
        self.log.extend(out.changes);
        self.events.extend(out.events);
        let ops = self.p.drain_native_ops();
        self.obs.mirror(&ops);
    }

    /// Deliver what the native observers currently see.
    pub fn observe(&mut self) {
        if self.p.watcher().capability() != Capability::Native {
            return;
        }
        let entries = self.obs.entries(&self.doc);
        let out = self.p.on_intersections(&entries, &self.doc).clone();
        self.absorb(out);
    }

    pub fn scroll(&mut self, y: f32) {
        self.doc.scroll_to(y);
        let out = self.p.on_scroll(y, &self.doc).clone();
        self.absorb(out);
        self.observe();
    }

    pub fn tick(&mut self, dt: f32) {
        self.now_ms += f64::from(dt) * 1000.0;
        let out = self.p.update(dt, self.now_ms, &self.doc).clone();
        self.absorb(out);
    }

    pub fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as usize;
        for _ in 0..frames {
            self.tick(FRAME);
        }
    }

    pub fn lifecycle(&mut self, event: LifecycleEvent) {
        let env = self.env.clone();
        let out = self
            .p
            .on_lifecycle(event, self.now_ms, &env, &self.doc)
            .clone();
        self.absorb(out);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.doc.set_viewport(width, height);
        self.env = self.env.clone().with_viewport(width, height);
        self.lifecycle(LifecycleEvent::Resize);
    }

    pub fn click(&mut self, target: ElementId, pointer: Point) {
        let out = self.p.on_click(target, pointer, &mut self.doc).clone();
        self.absorb(out);
    }

    pub fn teardown(&mut self) -> Outputs {
        let out = self.p.teardown().clone();
        self.absorb(out.clone());
        out
    }

    pub fn class_adds(&self, element: ElementId, class: &str) -> usize {
        self.log
            .iter()
            .filter(|c| matches!(c, Change::AddClass { element: e, class: k } if *e == element && k == class))
            .count()
    }

    pub fn texts_of(&self, element: ElementId) -> Vec<String> {
        self.log
            .iter()
            .filter_map(|c| match c {
                Change::SetText { element: e, text } if *e == element => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fired(&self, name: &str) -> Vec<Vec<ElementId>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::TriggerFired { name: n, elements, .. } if n == name => {
                    Some(elements.clone())
                }
                _ => None,
            })
            .collect()
    }
}

fn doc_width(doc: &FakeDocument) -> f32 {
    use scrollcue_core::Document;
    doc.viewport().width
}

fn doc_height(doc: &FakeDocument) -> f32 {
    use scrollcue_core::Document;
    doc.viewport().height
}
