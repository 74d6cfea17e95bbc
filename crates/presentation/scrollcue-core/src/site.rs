//! The marketing page's declarative animation table.
//!
//! Selectors, recipes, offsets and timelines live here; the rest of the crate
//! is page-agnostic.

use crate::config::RevealConfig;
use crate::ease::Ease;
use crate::host::Document;
use crate::offset::{Line, ScrollOffset};
use crate::timeline::{Position, Step, Targets, Timeline, TimelineBuilder};
use crate::trigger::{AnimationRecipe, CounterSpec, RepeatPolicy, ScrubSpec, Trigger, TriggerAction};
use crate::value::{CssUnit, Property, Props};
use crate::watcher::{Length, ObserveOptions, RootMargin};

pub const HERO: &str = ".hero-content";
pub const SECTION_TITLES: &str = ".section-title";
pub const CARDS: &str = ".timeline-item, .engine-card, .card";
pub const IMAGES: &str = "img, .image-container";
pub const HISTORY: &str = "#history";
pub const TIMELINE_ITEMS: &str = ".timeline-item";
pub const ENGINE: &str = "#engine";
pub const COUNTERS: &str = "[data-counter]";
pub const HEAVY: &str = ".heavy-animation";
/// Elements pinned to their resting state under reduced motion.
pub const COMPLEX: &str = ".timeline-item, .engine-card";

/// Name of the `[data-animate]` visibility-class trigger.
pub const REVEAL_CLASS_TRIGGER: &str = "reveal-class";

pub const TECH_SPECS: &str = ".tech-specs-section";
pub const TECH_SPECS_SCOPE: &str = "tech-specs";
pub const ANIMATE_IN: &str = "animate-in";

fn top_bottom() -> ScrollOffset {
    ScrollOffset::new(0.0, Line::Fraction(1.0))
}

fn bottom_top() -> ScrollOffset {
    ScrollOffset::new(1.0, Line::Fraction(0.0))
}

fn fade() -> Props {
    Props::new().from(Property::Opacity, 0.0)
}

/// Hero entrance, played once on start. `None` without a hero block.
pub fn hero_timeline(doc: &dyn Document) -> Option<Timeline> {
    let hero = doc.query_all(HERO).into_iter().next()?;
    let first = |selector: &str| -> Targets {
        doc.query_within(hero, selector)
            .into_iter()
            .take(1)
            .collect::<Vec<_>>()
            .into()
    };
    let timeline = TimelineBuilder::new()
        .delay(0.3)
        .step(Step::tween(
            first("h1"),
            fade().from(Property::Y, 50.0),
            1.0,
            Ease::POWER3_OUT,
        ))
        .step_at(
            Step::tween(first("p"), fade().from(Property::Y, 30.0), 0.8, Ease::POWER2_OUT),
            Position::Relative(-0.6),
        )
        .step_at(
            Step::tween(
                first(".btn"),
                fade().from(Property::Y, 20.0).from(Property::Scale, 0.9),
                0.6,
                Ease::back_out(1.7),
            ),
            Position::Relative(-0.4),
        )
        .build(doc);
    Some(timeline)
}

/// Page-wide scroll triggers. Section-specific entries are only declared
/// when their section exists.
pub fn page_triggers(doc: &dyn Document, reveal: &RevealConfig) -> Vec<Trigger> {
    let mut triggers = vec![
        Trigger::reveal(
            "section-titles",
            SECTION_TITLES,
            AnimationRecipe::new(fade().from(Property::Y, 60.0), 1.0, Ease::POWER3_OUT).stagger(0.15),
            ScrollOffset::top_at(85.0),
        ),
        Trigger::reveal(
            "cards",
            CARDS,
            AnimationRecipe::new(
                fade().from(Property::Y, 40.0).from(Property::Scale, 0.95),
                0.8,
                Ease::POWER2_OUT,
            )
            .stagger(0.1),
            ScrollOffset::top_at(90.0),
        ),
        Trigger::reveal(
            "images",
            IMAGES,
            AnimationRecipe::new(fade().from(Property::Scale, 1.1), 1.2, Ease::POWER2_OUT).stagger(0.2),
            ScrollOffset::top_at(85.0),
        ),
        Trigger::new(
            REVEAL_CLASS_TRIGGER,
            &reveal.selector,
            TriggerAction::AddClass(reveal.visible_class.clone()),
            ScrollOffset::top_at((1.0 - reveal.visibility_margin) * 100.0),
        )
        .observe_with(ObserveOptions::reveal(reveal.visibility_margin, reveal.threshold)),
        Trigger::new(
            "counters",
            COUNTERS,
            TriggerAction::Counter(CounterSpec::default()),
            ScrollOffset::top_at(80.0),
        ),
        Trigger::reveal(
            "heavy-animations",
            HEAVY,
            AnimationRecipe::new(
                fade().from(Property::Scale, 0.8).from(Property::Rotation, 10.0),
                1.5,
                Ease::elastic_out(1.0, 0.3),
            ),
            ScrollOffset::top_at(100.0),
        )
        .observe_with(ObserveOptions {
            root_margin: RootMargin::uniform(Length::Px(50.0)),
            threshold: 0.1,
        }),
    ];

    if !doc.query_all(HISTORY).is_empty() {
        triggers.push(
            Trigger::new(
                "history-parallax",
                TIMELINE_ITEMS,
                TriggerAction::Scrub(ScrubSpec {
                    props: Props::new().to(Property::Y, -30.0),
                    lag: 2.0,
                    alternate: true,
                }),
                top_bottom(),
            )
            .end(bottom_top()),
        );
    }

    if !doc.query_all(ENGINE).is_empty() {
        let sequence = TimelineBuilder::new()
            .step(Step::tween(
                Targets::selector(".engine-specs h3"),
                fade().from(Property::X, -50.0),
                0.8,
                Ease::POWER2_OUT,
            ))
            .step_at(
                Step::tween(
                    Targets::selector(".engine-specs .spec-item"),
                    fade().from(Property::Y, 30.0),
                    0.6,
                    Ease::POWER2_OUT,
                )
                .stagger(0.1),
                Position::Relative(-0.4),
            )
            .step_at(
                Step::tween(
                    Targets::selector(".engine-image"),
                    fade()
                        .from(Property::Scale, 0.8)
                        .from(Property::Rotation, 5.0),
                    1.0,
                    Ease::back_out(1.7),
                ),
                Position::Relative(-0.6),
            );
        triggers.push(
            Trigger::new(
                "engine",
                ENGINE,
                TriggerAction::Sequence(sequence),
                ScrollOffset::top_at(70.0),
            )
            .end(ScrollOffset::new(1.0, Line::Fraction(0.3)))
            .repeat(RepeatPolicy::ReverseOnLeave),
        );
    }

    triggers
}

/// Tech-specs section triggers, rebuilt on every layout change. `mobile`
/// selects the shorter, flatter variants.
pub fn tech_specs_triggers(doc: &dyn Document, mobile: bool, desktop: bool) -> Vec<Trigger> {
    if doc.query_all(TECH_SPECS).is_empty() {
        return Vec::new();
    }
    let pick = |m: f32, d: f32| if mobile { m } else { d };
    let title = Targets::selector(".tech-specs-section .section-title");

    let main = TimelineBuilder::new()
        .step(Step::tween(
            title.clone(),
            Props::new()
                .from_to(Property::Opacity, 0.0, 1.0)
                .from_to(Property::Y, pick(30.0, 50.0), 0.0)
                .from_to(Property::Scale, 0.8, 1.0),
            pick(0.8, 1.2),
            Ease::POWER3_OUT,
        ))
        .step_at(
            Step::tween(
                title,
                Props::new().from_to(Property::css_var("--line-width", CssUnit::Percent), 0.0, 100.0),
                0.8,
                Ease::POWER2_OUT,
            ),
            Position::Relative(-0.5),
        )
        .step_at(
            Step::tween(
                Targets::selector(".tech-specs-table"),
                Props::new()
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::X, pick(-30.0, -50.0), 0.0)
                    .from_to(Property::RotationY, pick(0.0, -15.0), 0.0),
                pick(0.8, 1.0),
                Ease::POWER3_OUT,
            ),
            Position::Relative(-0.3),
        )
        .step_at(
            Step::tween(
                Targets::selector(".specs-header"),
                Props::new()
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::Y, -20.0, 0.0),
                0.6,
                Ease::POWER2_OUT,
            ),
            Position::Relative(-0.5),
        )
        .step_at(
            Step::tween(
                Targets::selector(".tech-specs-image"),
                Props::new()
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::X, pick(30.0, 50.0), 0.0)
                    .from_to(Property::Scale, 0.9, 1.0)
                    .from_to(Property::RotationY, pick(0.0, 15.0), 0.0),
                pick(0.8, 1.2),
                Ease::POWER3_OUT,
            ),
            Position::Relative(-0.8),
        )
        .add_class(Position::Sequential, Targets::selector(".tech-specs-image"), ANIMATE_IN);

    let rows = TimelineBuilder::new()
        .step(
            Step::tween(
                Targets::selector(".spec-row"),
                Props::new()
                    .from_to(Property::Opacity, 0.0, 1.0)
                    .from_to(Property::X, -30.0, 0.0)
                    .from_to(Property::Scale, 0.95, 1.0),
                0.6,
                Ease::POWER2_OUT,
            )
            .stagger(0.1),
        )
        .on_complete_add_class(Targets::selector(".spec-row"), ANIMATE_IN);

    let mut triggers = vec![
        Trigger::new(
            "tech-specs",
            TECH_SPECS,
            TriggerAction::Sequence(main),
            ScrollOffset::top_at(80.0),
        )
        .end(ScrollOffset::new(1.0, Line::Fraction(0.2)))
        .repeat(RepeatPolicy::ReverseOnLeave)
        .scope(TECH_SPECS_SCOPE),
        Trigger::new(
            "tech-specs-rows",
            ".specs-body",
            TriggerAction::Sequence(rows),
            ScrollOffset::top_at(85.0),
        )
        .repeat(RepeatPolicy::ReverseOnLeave)
        .scope(TECH_SPECS_SCOPE),
    ];
    if desktop {
        triggers.push(
            Trigger::new(
                "tech-specs-parallax",
                TECH_SPECS,
                TriggerAction::Scrub(ScrubSpec {
                    props: Props::new().from_to(Property::YPercent, 0.0, -10.0),
                    lag: 1.0,
                    alternate: false,
                }),
                top_bottom(),
            )
            .end(bottom_top())
            .scope(TECH_SPECS_SCOPE),
        );
    }
    triggers
}
