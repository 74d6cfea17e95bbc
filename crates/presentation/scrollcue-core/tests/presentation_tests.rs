mod common;

use approx::assert_abs_diff_eq;
use common::Harness;
use scrollcue_core::{
    Capability, Change, Config, CoreEvent, EnvSignals, LifecycleEvent, MediaCommand, MediaEvent,
    Document, Point, PolicyTier, Presentation, Property, ScrollcueError,
};
use scrollcue_test_fixtures::{pages, ElementSpec, FakeDocument};

fn home() -> Harness {
    Harness::start(pages::load("home").unwrap())
}

#[test]
fn reduced_motion_slows_time_and_pins_pointer_transforms() {
    let doc = pages::load("home").unwrap();
    let env = EnvSignals {
        prefers_reduced_motion: true,
        ..EnvSignals::default()
    };
    let mut h = Harness::start_env(doc, env);
    assert_eq!(h.p.tier(), PolicyTier::ReducedMotion);
    assert_abs_diff_eq!(h.p.engine().time_scale(), 0.3);
    assert!(!h.p.effects().is_enabled());

    // The hero owns the hero button's scale; the form button is untouched.
    let cta = h.doc.first(".cta-button").unwrap();
    assert_eq!(h.doc.style(cta, &Property::X), Some(0.0));
    assert_eq!(h.doc.style(cta, &Property::Scale), Some(1.0));
    let btn = h.doc.first(".hero-content .btn").unwrap();

    // Complex reveal targets rest fully visible.
    for item in h.doc.query_all(".timeline-item, .engine-card") {
        assert_eq!(h.doc.style(item, &Property::Opacity), Some(1.0));
    }

    let rect = h.doc.rect(btn).unwrap();
    let out = h.p.on_pointer_enter(btn, &h.doc).clone();
    assert!(out.changes.is_empty());
    let out = h
        .p
        .on_pointer_move(btn, Point { x: rect.right(), y: rect.top }, &h.doc)
        .clone();
    assert!(out.changes.is_empty());
}

#[test]
fn reduced_motion_reset_is_not_repeated_on_resize() {
    let doc = pages::load("home").unwrap();
    let env = EnvSignals {
        prefers_reduced_motion: true,
        ..EnvSignals::default()
    };
    let mut h = Harness::start_env(doc, env);
    let items = h.doc.query_all(".timeline-item");
    assert!(!items.is_empty());
    let clears = |log: &[Change]| {
        log.iter()
            .filter(|c| matches!(c, Change::ClearStyle { element } if items.contains(element)))
            .count()
    };
    assert!(clears(&h.log) >= items.len());

    let (before, seen) = (h.log.len(), h.events.len());
    h.resize(1280.0, 800.0);
    h.run_for(0.5);
    h.resize(1280.0, 800.0);
    h.run_for(0.5);
    assert_eq!(h.p.tier(), PolicyTier::ReducedMotion);
    assert_eq!(clears(&h.log[before..]), 0);
    assert!(h.events[seen..].contains(&CoreEvent::Refreshed));
    assert!(!h.events[seen..]
        .iter()
        .any(|e| matches!(e, CoreEvent::TierChanged { .. })));
}

#[test]
fn hidden_page_starts_paused_until_visible() {
    let doc = pages::load("home").unwrap();
    let env = EnvSignals {
        hidden: true,
        ..EnvSignals::default()
    };
    let mut h = Harness::start_env(doc, env);
    assert!(h.p.engine().is_paused());
    assert!(h.events.contains(&CoreEvent::Paused));

    let h1 = h.doc.first(".hero-content h1").unwrap();
    h.run_for(3.0);
    assert_eq!(h.doc.style(h1, &Property::Y), Some(50.0));

    h.env.hidden = false;
    h.lifecycle(LifecycleEvent::VisibilityChanged { hidden: false });
    assert!(!h.p.engine().is_paused());
    assert!(h.events.contains(&CoreEvent::Resumed));
    h.run_for(3.0);
    assert_abs_diff_eq!(h.doc.style(h1, &Property::Y).unwrap(), 0.0, epsilon = 1e-3);
}

#[test]
fn magnetic_button_follows_pointer_and_settles() {
    let mut h = home();
    let btn = h.doc.first(".hero-content .btn").unwrap();
    let rect = h.doc.rect(btn).unwrap();

    let out = h.p.on_pointer_enter(btn, &h.doc).clone();
    h.absorb(out);
    let out = h
        .p
        .on_pointer_move(btn, Point { x: rect.right(), y: rect.bottom() }, &h.doc)
        .clone();
    h.absorb(out);
    h.run_for(0.5);
    // Half the strength at the corner.
    assert_abs_diff_eq!(h.doc.style(btn, &Property::X).unwrap(), 10.0, epsilon = 1e-3);
    assert_abs_diff_eq!(h.doc.style(btn, &Property::Y).unwrap(), 10.0, epsilon = 1e-3);
    assert_abs_diff_eq!(h.doc.style(btn, &Property::Scale).unwrap(), 1.05, epsilon = 1e-4);

    let out = h.p.on_pointer_leave(btn, &h.doc).clone();
    h.absorb(out);
    h.run_for(1.0);
    assert_abs_diff_eq!(h.doc.style(btn, &Property::X).unwrap(), 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(h.doc.style(btn, &Property::Scale).unwrap(), 1.0, epsilon = 1e-4);
}

#[test]
fn rapid_clicks_leave_no_ripples_behind() {
    let mut h = home();
    let btn = h.doc.first(".hero-content .btn").unwrap();
    let rect = h.doc.rect(btn).unwrap();
    let center = rect.center();

    for i in 0..5 {
        h.click(btn, center);
        assert_eq!(h.doc.query_all(".btn-ripple").len(), i + 1);
        h.tick(0.05);
    }
    assert_eq!(h.p.effects().live_ripples(h.p.engine()), 5);

    h.run_for(1.0);
    assert!(h.doc.query_all(".btn-ripple").is_empty());
    assert_eq!(h.p.effects().live_ripples(h.p.engine()), 0);
    let removals = h
        .log
        .iter()
        .filter(|c| matches!(c, Change::Remove { .. }))
        .count();
    assert_eq!(removals, 5);
}

#[test]
fn teardown_mid_ripple_removes_the_overlay() {
    let mut h = home();
    let btn = h.doc.first(".hero-content .btn").unwrap();
    let center = h.doc.rect(btn).unwrap().center();
    h.click(btn, center);
    h.tick(0.1);
    assert_eq!(h.doc.query_all(".btn-ripple").len(), 1);

    h.teardown();
    assert!(h.doc.query_all(".btn-ripple").is_empty());
}

#[test]
fn teardown_during_reverse_stops_everything() {
    let mut h = home();
    let tid = h.p.registry().find("engine").unwrap();
    // Section top 2500: the 70% line is reached below 1940.
    h.scroll(2000.0);
    assert_eq!(h.fired("engine").len(), 1);
    h.run_for(1.0);

    h.scroll(1000.0);
    assert!(h
        .events
        .iter()
        .any(|e| matches!(e, CoreEvent::TriggerReversed { trigger, .. } if *trigger == tid)));
    h.run_for(0.2);
    let timeline = h.p.registry().watched(tid)[0].timeline.unwrap();
    assert!(h.p.engine().is_active(timeline));

    let out = h.teardown();
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, CoreEvent::TornDown { .. })));
    assert!(h.p.is_torn_down());
    assert_eq!(h.p.engine().timeline_count(), 0);
    assert!(h.p.engine().is_idle());
    assert!(h.p.watcher().is_empty());
    assert!(h.p.registry().is_empty());
    assert!(h.obs.is_empty());

    let before = h.log.len();
    h.run_for(1.0);
    h.scroll(2000.0);
    h.lifecycle(LifecycleEvent::Resize);
    h.run_for(0.5);
    assert_eq!(h.log.len(), before);

    // Idempotent.
    assert!(h.p.teardown().is_empty());
    assert_eq!(h.p.start(&h.doc, EnvSignals::default()).unwrap_err(), ScrollcueError::TornDown);
}

#[test]
fn unload_tears_down() {
    let mut h = home();
    h.lifecycle(LifecycleEvent::Unload);
    assert!(h.p.is_torn_down());
    assert!(h
        .events
        .iter()
        .any(|e| matches!(e, CoreEvent::TornDown { .. })));
}

#[test]
fn resize_is_debounced_and_reclassifies() {
    let mut h = home();
    assert_eq!(h.p.tier(), PolicyTier::Default);

    h.resize(900.0, 800.0);
    h.tick(0.1);
    h.resize(600.0, 800.0);
    h.tick(0.2);
    assert_eq!(h.p.tier(), PolicyTier::Default);
    assert!(!h.events.iter().any(|e| matches!(e, CoreEvent::Refreshed)));

    h.tick(0.1);
    assert_eq!(h.p.tier(), PolicyTier::Mobile);
    assert_abs_diff_eq!(h.p.engine().time_scale(), 0.6);
    let refreshes = h
        .events
        .iter()
        .filter(|e| matches!(e, CoreEvent::Refreshed))
        .count();
    assert_eq!(refreshes, 1);
    assert!(h.events.iter().any(|e| matches!(
        e,
        CoreEvent::TierChanged {
            from: PolicyTier::Default,
            to: PolicyTier::Mobile
        }
    )));
}

#[test]
fn hidden_tab_pauses_the_engine() {
    let mut h = home();
    let h1 = h.doc.first(".hero-content h1").unwrap();
    h.run_for(0.5);
    let opacity = h.doc.style(h1, &Property::Opacity);

    h.lifecycle(LifecycleEvent::VisibilityChanged { hidden: true });
    assert!(h.p.engine().is_paused());
    h.run_for(1.0);
    assert_eq!(h.doc.style(h1, &Property::Opacity), opacity);

    h.lifecycle(LifecycleEvent::VisibilityChanged { hidden: false });
    h.run_for(3.0);
    assert_abs_diff_eq!(h.doc.style(h1, &Property::Opacity).unwrap(), 1.0, epsilon = 1e-4);
    assert!(h.events.contains(&CoreEvent::Paused));
    assert!(h.events.contains(&CoreEvent::Resumed));
}

#[test]
fn hero_renders_hidden_then_plays_in() {
    let mut h = home();
    let h1 = h.doc.first(".hero-content h1").unwrap();
    let btn = h.doc.first(".hero-content .btn").unwrap();
    assert_eq!(h.doc.style(h1, &Property::Opacity), Some(0.0));
    assert_eq!(h.doc.style(h1, &Property::Y), Some(50.0));
    assert_eq!(h.doc.style(btn, &Property::Scale), Some(0.9));

    h.run_for(3.0);
    assert_abs_diff_eq!(h.doc.style(h1, &Property::Y).unwrap(), 0.0, epsilon = 1e-3);
    assert_abs_diff_eq!(h.doc.style(btn, &Property::Scale).unwrap(), 1.0, epsilon = 1e-3);
}

#[test]
fn engine_section_is_hidden_until_it_plays() {
    let mut h = home();
    let h3 = h.doc.first(".engine-specs h3").unwrap();
    let items = h.doc.query_all(".engine-specs .spec-item");
    assert_eq!(items.len(), 3);
    assert_eq!(h.doc.style(h3, &Property::X), Some(-50.0));
    for item in &items {
        assert_eq!(h.doc.style(*item, &Property::Opacity), Some(0.0));
    }

    h.scroll(2000.0);
    h.run_for(2.5);
    assert_abs_diff_eq!(h.doc.style(h3, &Property::X).unwrap(), 0.0, epsilon = 1e-3);
    for item in &items {
        assert_abs_diff_eq!(h.doc.style(*item, &Property::Opacity).unwrap(), 1.0, epsilon = 1e-4);
    }

    // Leaving upward plays it back to the hidden state.
    h.scroll(1000.0);
    h.run_for(2.5);
    assert_abs_diff_eq!(h.doc.style(h3, &Property::X).unwrap(), -50.0, epsilon = 1e-3);

    // And entering again plays it forward without rebuilding.
    let tid = h.p.registry().find("engine").unwrap();
    let timeline = h.p.registry().watched(tid)[0].timeline;
    h.scroll(2000.0);
    h.run_for(2.5);
    assert_eq!(h.p.registry().watched(tid)[0].timeline, timeline);
    assert_abs_diff_eq!(h.doc.style(h3, &Property::X).unwrap(), 0.0, epsilon = 1e-3);
}

#[test]
fn history_items_drift_in_alternating_directions() {
    let mut h = home();
    let items = h.doc.query_all(".timeline-item");
    h.scroll(1500.0);
    h.run_for(5.0);
    let first = h.doc.style(items[0], &Property::Y).unwrap();
    let second = h.doc.style(items[1], &Property::Y).unwrap();
    assert!(first < -5.0, "first item y = {first}");
    assert!(second > 5.0, "second item y = {second}");
    assert!(first >= -30.0 && second <= 30.0);
}

#[test]
fn navbar_toggles_scrolled_class_on_threshold() {
    let mut h = home();
    let nav = h.doc.first(".navbar").unwrap();
    h.scroll(40.0);
    assert!(!h.doc.has_class(nav, "scrolled"));
    h.scroll(60.0);
    assert!(h.doc.has_class(nav, "scrolled"));
    h.scroll(400.0);
    assert_eq!(h.class_adds(nav, "scrolled"), 1);
    h.scroll(10.0);
    assert!(!h.doc.has_class(nav, "scrolled"));
}

#[test]
fn anchor_clicks_scroll_below_the_navbar() {
    let mut h = home();
    let out = h.p.on_anchor_click("#history", &h.doc).clone();
    assert_eq!(out.changes, vec![Change::ScrollTo { top: 1430.0 }]);
    h.absorb(out);
    assert_eq!(h.doc.scroll_requests(), &[1430.0]);

    assert!(h.p.on_anchor_click("#", &h.doc).is_empty());
    assert!(h.p.on_anchor_click("#missing", &h.doc).is_empty());
    assert!(h.p.on_anchor_click("/contato", &h.doc).is_empty());
}

#[test]
fn newsletter_alerts_without_sending() {
    let mut h = home();
    let input = h.doc.by_id("email").unwrap();

    let out = h.p.on_submit("not-an-address", &h.doc).clone();
    h.absorb(out);
    assert_eq!(h.doc.alerts(), &["Por favor, insira um e-mail válido.".to_string()]);
    assert_eq!(
        h.doc.attribute(input, "aria-invalid").as_deref(),
        Some("true")
    );

    let out = h.p.on_submit("ana@example.com", &h.doc).clone();
    h.absorb(out);
    assert_eq!(h.doc.alerts().last().unwrap(), "Inscrição realizada com sucesso!");
    assert_eq!(h.doc.attribute(input, "aria-invalid"), None);
}

#[test]
fn background_video_is_muted_slowed_and_has_a_fallback() {
    let mut h = home();
    let video = h.doc.by_id("bgVideo").unwrap();
    assert_eq!(
        h.doc.media_log(),
        &[(video, MediaCommand::SetMuted(true)), (video, MediaCommand::Play)]
    );

    let out = h.p.on_media_event(MediaEvent::LoadedMetadata, 1.0).clone();
    assert_eq!(
        out.changes,
        vec![Change::Media {
            element: video,
            command: MediaCommand::SetPlaybackRate(0.65)
        }]
    );
    assert!(h.p.on_media_event(MediaEvent::RateChange, 0.65).is_empty());

    let out = h.p.on_video_play(false, 1.0).clone();
    h.absorb(out);
    assert!(h.doc.has_class(video, "video-fallback"));
}

#[test]
fn tech_specs_rebuild_on_layout_change() {
    let mut h = Harness::start(pages::load("tech-specs").unwrap());
    assert!(h.p.registry().find("tech-specs").is_some());
    assert!(h.p.registry().find("tech-specs-parallax").is_some());
    let before = h.p.registry().len();

    h.resize(600.0, 800.0);
    h.tick(0.3);
    assert!(h.p.registry().find("tech-specs").is_some());
    assert!(h.p.registry().find("tech-specs-rows").is_some());
    assert!(h.p.registry().find("tech-specs-parallax").is_none());
    assert_eq!(h.p.registry().len(), before - 1);
}

#[test]
fn tech_specs_parallax_rests_at_zero_after_rebuild() {
    let mut h = Harness::start(pages::load("tech-specs").unwrap());
    let section = h.doc.first(".tech-specs-section").unwrap();
    h.scroll(1750.0);
    h.run_for(6.0);
    assert!(h.doc.style(section, &Property::YPercent).unwrap() < -5.0);

    h.resize(1200.0, 800.0);
    h.run_for(0.5);
    assert!(h.p.registry().find("tech-specs-parallax").is_some());

    h.scroll(0.0);
    h.run_for(6.0);
    assert_abs_diff_eq!(h.doc.style(section, &Property::YPercent).unwrap(), 0.0, epsilon = 1e-2);
}

#[test]
fn tech_specs_parallax_is_undone_on_narrow_screens() {
    let mut h = Harness::start(pages::load("tech-specs").unwrap());
    let section = h.doc.first(".tech-specs-section").unwrap();
    h.scroll(1750.0);
    h.run_for(6.0);
    assert!(h.doc.style(section, &Property::YPercent).unwrap() < -5.0);

    h.resize(600.0, 800.0);
    h.run_for(0.5);
    assert!(h.p.registry().find("tech-specs-parallax").is_none());
    assert_eq!(h.doc.style(section, &Property::YPercent), Some(0.0));
}

#[test]
fn tech_specs_rows_gain_animate_in_after_playing() {
    let mut h = Harness::start(pages::load("tech-specs").unwrap());
    let rows = h.doc.query_all(".spec-row");
    let image = h.doc.first(".tech-specs-image").unwrap();
    h.scroll(900.0);
    h.run_for(4.0);
    assert!(rows.iter().all(|r| h.doc.has_class(*r, "animate-in")));
    assert!(h.doc.has_class(image, "animate-in"));
}

#[test]
fn tech_specs_line_grows_through_css_variable() {
    let mut h = Harness::start(pages::load("tech-specs").unwrap());
    let title = h.doc.first(".tech-specs-section .section-title").unwrap();
    let line = Property::css_var("--line-width", scrollcue_core::CssUnit::Percent);
    assert_eq!(h.doc.style(title, &line), Some(0.0));
    h.scroll(900.0);
    h.run_for(4.0);
    assert_abs_diff_eq!(h.doc.style(title, &line).unwrap(), 100.0, epsilon = 1e-2);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.reveal.visibility_margin = 1.5;
    let err = Presentation::new(config, Capability::Native).unwrap_err();
    assert_eq!(err.category(), "config");
}

#[test]
fn pages_without_sections_are_quiet() {
    let doc = FakeDocument::new(1280.0, 800.0);
    let mut h = Harness::start(doc);
    assert!(h.log.is_empty());
    h.scroll(500.0);
    h.run_for(0.5);
    h.lifecycle(LifecycleEvent::Load);
    assert!(h.log.is_empty());
    assert!(h.obs.is_empty());
}

#[test]
fn small_screens_skip_hover_lift() {
    let mut doc = FakeDocument::new(700.0, 800.0);
    let row = doc.insert(ElementSpec::new("div").class("spec-row").at(100.0, 50.0));
    let env = EnvSignals::default().with_viewport(700.0, 800.0);
    let mut h = Harness::start_env(doc, env);
    assert_eq!(h.p.tier(), PolicyTier::Mobile);
    assert!(h.p.on_pointer_enter(row, &h.doc).is_empty());
}
