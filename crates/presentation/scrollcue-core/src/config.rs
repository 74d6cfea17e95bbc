//! Presentation configuration.
//!
//! Every section deserializes with defaults, so hosts may pass a partial
//! object (or nothing at all).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrollcueError};
use crate::policy::PolicyThresholds;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reveal: RevealConfig,
    pub lifecycle: LifecycleConfig,
    pub navbar: NavbarConfig,
    pub anchors: AnchorConfig,
    pub magnetic: MagneticConfig,
    pub ripple: RippleConfig,
    pub hover: HoverConfig,
    pub video: VideoConfig,
    pub newsletter: NewsletterConfig,
    pub policy: PolicyThresholds,
}

/// Visibility-class reveals (`[data-animate]`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub visible_class: String,
    /// Fraction of the viewport height trimmed from the bottom of the
    /// observation box; also the margin of the initial visibility check.
    pub visibility_margin: f32,
    pub threshold: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: "[data-animate]".into(),
            visible_class: "is-visible".into(),
            visibility_margin: 0.10,
            threshold: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub resize_debounce_ms: f64,
    pub orientation_debounce_ms: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 250.0,
            orientation_debounce_ms: 300.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    pub selector: String,
    pub scrolled_class: String,
    /// Scroll offset in pixels past which the navbar is "scrolled".
    pub threshold: f32,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            selector: ".navbar".into(),
            scrolled_class: "scrolled".into(),
            threshold: 50.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Fixed header height subtracted from the target's offset.
    pub offset: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { offset: 70.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagneticConfig {
    pub selector: String,
    /// Maximum pull in pixels at the button edge.
    pub strength: f32,
    pub hover_scale: f32,
    pub follow_duration: f32,
    pub settle_duration: f32,
}

impl Default for MagneticConfig {
    fn default() -> Self {
        Self {
            selector: ".btn, .cta-button".into(),
            strength: 20.0,
            hover_scale: 1.05,
            follow_duration: 0.3,
            settle_duration: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub class: String,
    /// Ripple diameter relative to the larger button side.
    pub size_factor: f32,
    pub start_opacity: f32,
    pub duration: f32,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            class: "btn-ripple".into(),
            size_factor: 1.5,
            start_opacity: 0.6,
            duration: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Hover lift only runs on viewports wider than this.
    pub desktop_min_width: f32,
    pub row_selector: String,
    pub row_scale: f32,
    pub row_x: f32,
    pub row_duration: f32,
    pub image_selector: String,
    pub image_scale: f32,
    pub image_rotation_y: f32,
    pub image_duration: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            desktop_min_width: 768.0,
            row_selector: ".spec-row".into(),
            row_scale: 1.02,
            row_x: 5.0,
            row_duration: 0.3,
            image_selector: ".tech-specs-image img".into(),
            image_scale: 1.05,
            image_rotation_y: 5.0,
            image_duration: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub selector: String,
    pub playback_rate: f64,
    /// Class added to the video when autoplay is rejected.
    pub fallback_class: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            selector: "#bgVideo".into(),
            playback_rate: 0.65,
            fallback_class: "video-fallback".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    pub form_selector: String,
    pub input_selector: String,
    pub invalid_message: String,
    pub success_message: String,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            form_selector: "#newsletterForm".into(),
            input_selector: "#email".into(),
            invalid_message: "Por favor, insira um e-mail válido.".into(),
            success_message: "Inscrição realizada com sucesso!".into(),
        }
    }
}

fn check(ok: bool, field: &str, value: impl ToString) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ScrollcueError::invalid_config(field, value))
    }
}

impl Config {
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reject values that cannot drive the page sensibly.
    pub fn validate(&self) -> Result<()> {
        let m = self.reveal.visibility_margin;
        check((0.0..1.0).contains(&m), "reveal.visibility_margin", m)?;
        let t = self.reveal.threshold;
        check((0.0..=1.0).contains(&t), "reveal.threshold", t)?;
        check(
            self.lifecycle.resize_debounce_ms >= 0.0,
            "lifecycle.resize_debounce_ms",
            self.lifecycle.resize_debounce_ms,
        )?;
        check(
            self.lifecycle.orientation_debounce_ms >= 0.0,
            "lifecycle.orientation_debounce_ms",
            self.lifecycle.orientation_debounce_ms,
        )?;
        check(
            self.magnetic.strength.is_finite(),
            "magnetic.strength",
            self.magnetic.strength,
        )?;
        check(
            self.ripple.duration > 0.0,
            "ripple.duration",
            self.ripple.duration,
        )?;
        check(
            self.ripple.size_factor > 0.0,
            "ripple.size_factor",
            self.ripple.size_factor,
        )?;
        check(
            self.video.playback_rate > 0.0,
            "video.playback_rate",
            self.video.playback_rate,
        )?;
        let p = &self.policy;
        check(
            p.small_screen_max_width <= p.mobile_max_width,
            "policy.small_screen_max_width",
            p.small_screen_max_width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "navbar": { "threshold": 80 }, "video": {} }"#).unwrap();
        assert_eq!(cfg.navbar.threshold, 80.0);
        assert_eq!(cfg.navbar.scrolled_class, "scrolled");
        assert_eq!(cfg.video.playback_rate, 0.65);
        assert_eq!(cfg.reveal.visibility_margin, 0.10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let mut cfg = Config::default();
        cfg.reveal.threshold = 1.5;
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid config: reveal.threshold = 1.5");

        let mut cfg = Config::default();
        cfg.video.playback_rate = 0.0;
        assert!(cfg.validate().is_err());
    }
}
