mod common;

use approx::assert_abs_diff_eq;
use common::Harness;
use scrollcue_core::{
    site, Capability, Change, Config, EnvSignals, LifecycleEvent, Property, TriggerState,
};
use scrollcue_test_fixtures::{ElementSpec, FakeDocument};

fn single(spec: ElementSpec) -> (FakeDocument, scrollcue_core::ElementId) {
    let mut doc = FakeDocument::new(1280.0, 800.0);
    let e = doc.insert(spec);
    (doc, e)
}

#[test]
fn reveal_class_is_added_exactly_once() {
    let (doc, e) = single(ElementSpec::new("div").attr("data-animate", "").at(2000.0, 200.0));
    let mut h = Harness::start(doc);
    assert!(!h.doc.has_class(e, "is-visible"));
    assert_eq!(h.obs.len(), 1);

    h.scroll(1500.0);
    assert!(h.doc.has_class(e, "is-visible"));
    assert_eq!(h.class_adds(e, "is-visible"), 1);
    // Fired elements stop being observed.
    assert!(h.obs.is_empty());

    h.scroll(0.0);
    h.scroll(1500.0);
    h.scroll(400.0);
    h.scroll(1600.0);
    h.run_for(0.5);
    assert_eq!(h.class_adds(e, "is-visible"), 1);

    let tid = h.p.registry().find(site::REVEAL_CLASS_TRIGGER).unwrap();
    assert_eq!(h.p.registry().state(tid), Some(TriggerState::Fired));
}

#[test]
fn margin_keeps_bottom_strip_hidden() {
    // Top edge at 740 px of an 800 px viewport: inside the viewport, below the
    // 90% line.
    let (doc, e) = single(ElementSpec::new("div").attr("data-animate", "").at(740.0, 200.0));
    let mut h = Harness::start(doc);
    h.observe();
    assert!(!h.doc.has_class(e, "is-visible"));

    h.scroll(100.0);
    assert!(h.doc.has_class(e, "is-visible"));
}

#[test]
fn elements_visible_at_start_are_revealed_immediately() {
    let (doc, e) = single(ElementSpec::new("div").attr("data-animate", "").at(300.0, 200.0));
    let mut h = Harness::start(doc);
    assert!(h.doc.has_class(e, "is-visible"));
    // The first observer report for the same element changes nothing.
    h.observe();
    assert_eq!(h.class_adds(e, "is-visible"), 1);
}

#[test]
fn load_fallback_forces_transparent_elements_visible() {
    let mut doc = FakeDocument::new(1280.0, 800.0);
    let hidden = doc.insert(
        ElementSpec::new("div")
            .attr("data-animate", "")
            .opacity(0.0)
            .at(3000.0, 200.0),
    );
    let opaque = doc.insert(ElementSpec::new("div").attr("data-animate", "").at(3400.0, 200.0));
    let mut h = Harness::start(doc);
    assert!(!h.doc.has_class(hidden, "is-visible"));

    h.lifecycle(LifecycleEvent::Load);
    assert!(h.doc.has_class(hidden, "is-visible"));
    assert!(!h.doc.has_class(opaque, "is-visible"));
    assert!(h
        .events
        .iter()
        .any(|e| matches!(e, scrollcue_core::CoreEvent::Refreshed)));

    // Scrolling to it later does not add the class a second time.
    h.scroll(2800.0);
    assert_eq!(h.class_adds(hidden, "is-visible"), 1);
    assert!(h.doc.has_class(opaque, "is-visible"));
}

#[test]
fn grouped_entries_share_one_staggered_batch() {
    let mut doc = FakeDocument::new(1280.0, 800.0);
    let cards: Vec<_> = (0..3)
        .map(|i| {
            doc.insert(
                ElementSpec::new("div")
                    .class("card")
                    .at(2000.0, 300.0)
                    .size(i as f32 * 400.0, 380.0),
            )
        })
        .collect();
    let mut h = Harness::start(doc);
    h.scroll(1700.0);

    let batches = h.fired("cards");
    assert_eq!(batches, vec![cards.clone()]);
    // From-values render before the first tick.
    for card in &cards {
        assert_eq!(h.doc.style(*card, &Property::Opacity), Some(0.0));
    }

    h.tick(0.05);
    assert!(h.doc.style(cards[0], &Property::Opacity).unwrap() > 0.0);
    assert_eq!(h.doc.style(cards[1], &Property::Opacity), Some(0.0));
    assert_eq!(h.doc.style(cards[2], &Property::Opacity), Some(0.0));

    h.tick(0.1);
    assert!(h.doc.style(cards[1], &Property::Opacity).unwrap() > 0.0);
    assert_eq!(h.doc.style(cards[2], &Property::Opacity), Some(0.0));

    h.run_for(1.5);
    for card in &cards {
        assert_abs_diff_eq!(h.doc.style(*card, &Property::Opacity).unwrap(), 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(h.doc.style(*card, &Property::Y).unwrap(), 0.0, epsilon = 1e-3);
    }
}

#[test]
fn counter_reaches_target_once_at_the_end() {
    let (doc, e) = single(
        ElementSpec::new("span")
            .attr("data-counter", "1500")
            .text("0")
            .at(2000.0, 60.0),
    );
    let mut h = Harness::start(doc);
    h.scroll(1700.0);
    assert_eq!(h.fired("counters").len(), 1);

    let mut elapsed = 0.0f32;
    let mut first_final = None;
    while elapsed < 2.5 {
        h.tick(common::FRAME);
        elapsed += common::FRAME;
        if first_final.is_none() && h.doc.text(e) == Some("1500") {
            first_final = Some(elapsed);
        }
    }

    let shown = h.texts_of(e);
    assert!(!shown.is_empty());
    let values: Vec<i64> = shown.iter().map(|t| t.parse().unwrap()).collect();
    assert!(values.iter().all(|v| *v >= 0));
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(values.iter().filter(|v| **v == 1500).count(), 1);
    assert_eq!(*values.last().unwrap(), 1500);
    assert!(first_final.unwrap() >= 2.0 - 1e-3);
}

#[test]
fn negative_counter_reaches_its_target() {
    let (doc, e) = single(
        ElementSpec::new("span")
            .attr("data-counter", "-5")
            .text("0")
            .at(2000.0, 60.0),
    );
    let mut h = Harness::start(doc);
    h.scroll(1700.0);
    h.run_for(2.5);

    assert_eq!(h.doc.text(e), Some("-5"));
    let values: Vec<i64> = h.texts_of(e).iter().map(|t| t.parse().unwrap()).collect();
    assert_eq!(values.iter().filter(|v| **v == -5).count(), 1);
    assert!(values.iter().all(|v| (-5..=0).contains(v)));
}

#[test]
fn counter_without_target_counts_to_zero() {
    let (doc, e) = single(ElementSpec::new("span").attr("data-counter", "n/a").at(2000.0, 60.0));
    let mut h = Harness::start(doc);
    h.scroll(1700.0);
    h.run_for(2.5);
    assert_eq!(h.doc.text(e), Some("0"));
}

#[test]
fn geometric_watcher_reveals_on_scroll() {
    let (doc, e) = single(ElementSpec::new("div").attr("data-animate", "").at(2000.0, 200.0));
    let env = EnvSignals::default();
    let mut h = Harness::start_with(doc, env, Config::default(), Capability::Geometric);
    assert!(h.obs.is_empty());

    h.scroll(900.0);
    assert!(!h.doc.has_class(e, "is-visible"));
    h.scroll(1500.0);
    assert!(h.doc.has_class(e, "is-visible"));
    h.scroll(0.0);
    h.scroll(1500.0);
    assert_eq!(h.class_adds(e, "is-visible"), 1);
    assert!(h.p.watcher().is_empty());
}

#[test]
fn configured_class_and_margin_are_used() {
    let config: Config = scrollcue_test_fixtures::configs::load("slow-reveal").unwrap();
    assert_eq!(config.reveal.visible_class, "in-view");
    assert_eq!(config.anchors.offset, 70.0);

    // 20% margin: the line sits at 640 px.
    let (doc, e) = single(ElementSpec::new("div").attr("data-animate", "").at(660.0, 400.0));
    let env = EnvSignals::default();
    let mut h = Harness::start_with(doc, env, config, Capability::Native);
    h.observe();
    assert!(!h.doc.has_class(e, "in-view"));

    h.scroll(200.0);
    assert!(h.doc.has_class(e, "in-view"));
    assert!(!h.log.iter().any(|c| matches!(c, Change::AddClass { class, .. } if class == "is-visible")));
}
