//! Responsive policy selection.
//!
//! The runtime is classified into one [`PolicyTier`]; the first matching rule
//! wins: reduced motion, small screen, mobile, low-end device, default. The
//! tier's [`TierSettings`] scale every animation (the speed multiplier divides
//! durations) and switch pointer effects on or off.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::host::EnvSignals;

static MOBILE_UA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Android|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("valid regex")
});

static CONSTRAINED_UA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Android.*Chrome/[.0-9]*\s").expect("valid regex"));

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PolicyTier {
    ReducedMotion,
    SmallScreen,
    Mobile,
    LowEndDevice,
    Default,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Global time scale; durations are divided by it.
    pub speed_multiplier: f32,
    pub limit_callbacks: bool,
    /// Magnetic and hover transforms respond to the pointer.
    pub pointer_effects: bool,
    /// Complex reveal targets are pinned to their resting state.
    pub neutralize_complex: bool,
}

impl PolicyTier {
    pub fn settings(self) -> TierSettings {
        let (speed_multiplier, pointer_effects, neutralize_complex) = match self {
            PolicyTier::ReducedMotion => (0.3, false, true),
            PolicyTier::SmallScreen => (0.5, false, false),
            PolicyTier::Mobile => (0.6, true, false),
            PolicyTier::LowEndDevice => (0.7, true, false),
            PolicyTier::Default => (1.0, true, false),
        };
        TierSettings {
            speed_multiplier,
            limit_callbacks: true,
            pointer_effects,
            neutralize_complex,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PolicyTier::ReducedMotion => "reduced-motion",
            PolicyTier::SmallScreen => "small-screen",
            PolicyTier::Mobile => "mobile",
            PolicyTier::LowEndDevice => "low-end-device",
            PolicyTier::Default => "default",
        }
    }
}

/// Classification cut-offs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyThresholds {
    pub small_screen_max_width: f32,
    pub mobile_max_width: f32,
    pub low_end_max_cores: u32,
    pub low_end_max_memory_gb: f32,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            small_screen_max_width: 480.0,
            mobile_max_width: 768.0,
            low_end_max_cores: 2,
            low_end_max_memory_gb: 2.0,
        }
    }
}

pub fn is_small_screen(env: &EnvSignals, t: &PolicyThresholds) -> bool {
    env.viewport_width <= t.small_screen_max_width
}

pub fn is_mobile(env: &EnvSignals, t: &PolicyThresholds) -> bool {
    env.viewport_width <= t.mobile_max_width || MOBILE_UA.is_match(&env.user_agent)
}

pub fn is_low_end_device(env: &EnvSignals, t: &PolicyThresholds) -> bool {
    env.hardware_concurrency
        .is_some_and(|cores| cores <= t.low_end_max_cores)
        || env
            .device_memory_gb
            .is_some_and(|gb| gb <= t.low_end_max_memory_gb)
        || CONSTRAINED_UA.is_match(&env.user_agent)
}

pub fn classify(env: &EnvSignals, t: &PolicyThresholds) -> PolicyTier {
    if env.prefers_reduced_motion {
        PolicyTier::ReducedMotion
    } else if is_small_screen(env, t) {
        PolicyTier::SmallScreen
    } else if is_mobile(env, t) {
        PolicyTier::Mobile
    } else if is_low_end_device(env, t) {
        PolicyTier::LowEndDevice
    } else {
        PolicyTier::Default
    }
}

/// The single process-wide policy object. Components receive its settings
/// explicitly; nothing reads it ambiently.
#[derive(Clone, Debug)]
pub struct Policy {
    thresholds: PolicyThresholds,
    tier: PolicyTier,
    settings: TierSettings,
}

impl Policy {
    pub fn new(thresholds: PolicyThresholds) -> Self {
        Self {
            thresholds,
            tier: PolicyTier::Default,
            settings: PolicyTier::Default.settings(),
        }
    }

    pub fn tier(&self) -> PolicyTier {
        self.tier
    }

    pub fn settings(&self) -> TierSettings {
        self.settings
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.settings.speed_multiplier
    }

    pub fn thresholds(&self) -> &PolicyThresholds {
        &self.thresholds
    }

    /// Classify `env` and apply the result. Returns the previous tier when
    /// the tier changed.
    pub fn recompute(&mut self, env: &EnvSignals) -> Option<PolicyTier> {
        let tier = classify(env, &self.thresholds);
        let previous = self.tier;
        self.apply(tier);
        (previous != tier).then_some(previous)
    }

    pub fn apply(&mut self, tier: PolicyTier) {
        self.tier = tier;
        self.settings = tier.settings();
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::new(PolicyThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
    const ANDROID_CHROME: &str =
        "Mozilla/5.0 (Linux; Android 13) AppleWebKit/537.36 Chrome/120.0.0.0 Mobile Safari/537.36";

    fn desktop() -> EnvSignals {
        EnvSignals::default()
    }

    #[test]
    fn reduced_motion_overrides_everything() {
        let env = EnvSignals {
            prefers_reduced_motion: true,
            viewport_width: 320.0,
            user_agent: IPHONE.into(),
            ..desktop()
        };
        let tier = classify(&env, &PolicyThresholds::default());
        assert_eq!(tier, PolicyTier::ReducedMotion);
        let s = tier.settings();
        assert_eq!(s.speed_multiplier, 0.3);
        assert!(!s.pointer_effects);
    }

    #[test]
    fn width_breakpoints_are_inclusive() {
        let t = PolicyThresholds::default();
        assert_eq!(classify(&desktop().with_viewport(480.0, 800.0), &t), PolicyTier::SmallScreen);
        assert_eq!(classify(&desktop().with_viewport(481.0, 800.0), &t), PolicyTier::Mobile);
        assert_eq!(classify(&desktop().with_viewport(768.0, 800.0), &t), PolicyTier::Mobile);
        assert_eq!(classify(&desktop().with_viewport(769.0, 800.0), &t), PolicyTier::Default);
    }

    #[test]
    fn mobile_user_agent_on_wide_viewport() {
        let env = EnvSignals {
            user_agent: IPHONE.into(),
            ..desktop()
        };
        assert_eq!(classify(&env, &PolicyThresholds::default()), PolicyTier::Mobile);
    }

    #[test]
    fn low_end_signals() {
        let t = PolicyThresholds::default();
        let cores = EnvSignals {
            hardware_concurrency: Some(2),
            ..desktop()
        };
        assert_eq!(classify(&cores, &t), PolicyTier::LowEndDevice);
        let memory = EnvSignals {
            device_memory_gb: Some(1.0),
            ..desktop()
        };
        assert_eq!(classify(&memory, &t), PolicyTier::LowEndDevice);
        let unknown = EnvSignals {
            hardware_concurrency: None,
            device_memory_gb: None,
            ..desktop()
        };
        assert_eq!(classify(&unknown, &t), PolicyTier::Default);
    }

    #[test]
    fn android_chrome_is_mobile_first() {
        let env = EnvSignals {
            user_agent: ANDROID_CHROME.into(),
            ..desktop()
        };
        let t = PolicyThresholds::default();
        assert!(is_low_end_device(&env, &t));
        assert_eq!(classify(&env, &t), PolicyTier::Mobile);
    }

    #[test]
    fn recompute_reports_changes_only() {
        let mut p = Policy::default();
        assert_eq!(p.recompute(&desktop()), None);
        assert_eq!(
            p.recompute(&desktop().with_viewport(400.0, 700.0)),
            Some(PolicyTier::Default)
        );
        assert_eq!(p.tier(), PolicyTier::SmallScreen);
        assert_eq!(p.speed_multiplier(), 0.5);
        assert_eq!(p.recompute(&desktop().with_viewport(420.0, 700.0)), None);
    }
}
