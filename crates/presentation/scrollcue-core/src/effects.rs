//! Pointer-driven effects: magnetic buttons, click ripples and hover lift.
//!
//! Handlers receive the element the host saw the event on and walk up to the
//! nearest effect target, so events on a button's inner label still count.

use hashbrown::HashSet;

use crate::config::{HoverConfig, MagneticConfig, RippleConfig};
use crate::ease::Ease;
use crate::engine::Engine;
use crate::host::{Document, OverlaySpec};
use crate::ids::{ElementId, TimelineId};
use crate::outputs::Change;
use crate::timeline::{ScheduledTween, Timeline};
use crate::value::{Point, Property, Props};

fn tween(element: ElementId, props: Props, duration: f32, ease: Ease) -> Timeline {
    Timeline {
        tweens: vec![ScheduledTween {
            element,
            props,
            start: 0.0,
            duration,
            ease,
        }],
        duration,
        ..Timeline::default()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum HoverKind {
    Row,
    Image,
}

#[derive(Debug)]
pub struct Effects {
    magnetic: MagneticConfig,
    ripple: RippleConfig,
    hover: HoverConfig,
    enabled: bool,
    viewport_width: f32,
    hovered: HashSet<ElementId>,
    ripples: Vec<(ElementId, TimelineId)>,
}

impl Effects {
    pub fn new(magnetic: MagneticConfig, ripple: RippleConfig, hover: HoverConfig) -> Self {
        Self {
            magnetic,
            ripple,
            hover,
            enabled: true,
            viewport_width: f32::INFINITY,
            hovered: HashSet::new(),
            ripples: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    fn is_desktop(&self) -> bool {
        self.viewport_width > self.hover.desktop_min_width
    }

    /// Toggle pointer transforms. Disabling pins every magnetic element back
    /// to its resting offset and scale; the listeners stay attached but inert.
    pub fn set_enabled(&mut self, enabled: bool, doc: &dyn Document, engine: &mut Engine) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            return;
        }
        self.hovered.clear();
        for element in doc.query_all(&self.magnetic.selector) {
            engine.kill_tweens_of(element);
            engine.set(
                element,
                &[(Property::X, 0.0), (Property::Y, 0.0), (Property::Scale, 1.0)],
            );
        }
    }

    fn magnetic_target(&self, doc: &dyn Document, target: ElementId) -> Option<ElementId> {
        doc.closest(target, &self.magnetic.selector)
    }

    fn hover_target(&self, doc: &dyn Document, target: ElementId) -> Option<(ElementId, HoverKind)> {
        if let Some(row) = doc.closest(target, &self.hover.row_selector) {
            return Some((row, HoverKind::Row));
        }
        doc.closest(target, &self.hover.image_selector)
            .map(|img| (img, HoverKind::Image))
    }

    pub fn pointer_enter(&mut self, target: ElementId, doc: &dyn Document, engine: &mut Engine) {
        if !self.enabled {
            return;
        }
        if let Some(button) = self.magnetic_target(doc, target) {
            if self.hovered.insert(button) {
                engine.play(tween(
                    button,
                    Props::new().to(Property::Scale, self.magnetic.hover_scale),
                    self.magnetic.follow_duration,
                    Ease::POWER2_OUT,
                ));
            }
            return;
        }
        if !self.is_desktop() {
            return;
        }
        if let Some((element, kind)) = self.hover_target(doc, target) {
            let (props, duration) = match kind {
                HoverKind::Row => (
                    Props::new()
                        .to(Property::Scale, self.hover.row_scale)
                        .to(Property::X, self.hover.row_x),
                    self.hover.row_duration,
                ),
                HoverKind::Image => (
                    Props::new()
                        .to(Property::Scale, self.hover.image_scale)
                        .to(Property::RotationY, self.hover.image_rotation_y),
                    self.hover.image_duration,
                ),
            };
            engine.play(tween(element, props, duration, Ease::POWER2_OUT));
        }
    }

    /// Pull a hovered magnetic button toward the pointer.
    pub fn pointer_move(
        &mut self,
        target: ElementId,
        pointer: Point,
        doc: &dyn Document,
        engine: &mut Engine,
    ) {
        if !self.enabled {
            return;
        }
        let Some(button) = self.magnetic_target(doc, target) else {
            return;
        };
        if !self.hovered.contains(&button) {
            return;
        }
        let Some(rect) = doc.rect(button) else {
            return;
        };
        let rel = rect.relative(pointer);
        let s = self.magnetic.strength;
        engine.play(tween(
            button,
            Props::new()
                .to(Property::X, rel.x * s)
                .to(Property::Y, rel.y * s),
            self.magnetic.follow_duration,
            Ease::POWER2_OUT,
        ));
    }

    pub fn pointer_leave(&mut self, target: ElementId, doc: &dyn Document, engine: &mut Engine) {
        if !self.enabled {
            return;
        }
        if let Some(button) = self.magnetic_target(doc, target) {
            if !self.hovered.remove(&button) {
                return;
            }
            engine.play(tween(
                button,
                Props::new().to(Property::X, 0.0).to(Property::Y, 0.0),
                self.magnetic.settle_duration,
                Ease::elastic_out(1.0, 0.3),
            ));
            engine.play(tween(
                button,
                Props::new().to(Property::Scale, 1.0),
                self.magnetic.follow_duration,
                Ease::POWER2_OUT,
            ));
            return;
        }
        if !self.is_desktop() {
            return;
        }
        if let Some((element, kind)) = self.hover_target(doc, target) {
            let (props, duration) = match kind {
                HoverKind::Row => (
                    Props::new().to(Property::Scale, 1.0).to(Property::X, 0.0),
                    self.hover.row_duration,
                ),
                HoverKind::Image => (
                    Props::new()
                        .to(Property::Scale, 1.0)
                        .to(Property::RotationY, 0.0),
                    self.hover.image_duration,
                ),
            };
            engine.play(tween(element, props, duration, Ease::POWER2_OUT));
        }
    }

    /// Spawn a ripple at `pointer` inside the clicked button. The ripple is
    /// removed when its animation completes.
    pub fn click(
        &mut self,
        target: ElementId,
        pointer: Point,
        doc: &mut dyn Document,
        engine: &mut Engine,
    ) -> Option<ElementId> {
        let button = self.magnetic_target(doc, target)?;
        let rect = doc.rect(button)?;
        let size = rect.width.max(rect.height) * self.ripple.size_factor;
        let spec = OverlaySpec {
            class: self.ripple.class.clone(),
            size,
            left: pointer.x - rect.left - size / 2.0,
            top: pointer.y - rect.top - size / 2.0,
        };
        let Some(ripple) = doc.create_overlay(button, &spec) else {
            log::debug!("ripple overlay could not be created on {button:?}");
            return None;
        };
        let mut timeline = tween(
            ripple,
            Props::new()
                .from_to(Property::Scale, 0.0, 1.0)
                .from_to(Property::Opacity, self.ripple.start_opacity, 0.0),
            self.ripple.duration,
            Ease::POWER2_OUT,
        );
        timeline.on_complete.push(Change::Remove { element: ripple });
        let id = engine.play(timeline);
        self.ripples.retain(|(_, t)| engine.contains(*t));
        self.ripples.push((ripple, id));
        Some(ripple)
    }

    /// Ripples whose animation has not finished yet.
    pub fn live_ripples(&self, engine: &Engine) -> usize {
        self.ripples
            .iter()
            .filter(|(_, t)| engine.contains(*t))
            .count()
    }

    /// Remove changes for ripples still animating. Call before the engine
    /// is cleared, so no overlay outlives teardown.
    pub fn teardown(&mut self, engine: &Engine) -> Vec<Change> {
        self.hovered.clear();
        self.ripples
            .drain(..)
            .filter(|(_, t)| engine.contains(*t))
            .map(|(element, _)| Change::Remove { element })
            .collect()
    }
}
