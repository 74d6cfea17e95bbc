//! Decorative background video: muted autoplay held at a slow playback rate,
//! with a static fallback when the browser refuses to autoplay.

use serde::{Deserialize, Serialize};

use crate::config::VideoConfig;
use crate::host::Document;
use crate::ids::ElementId;
use crate::outputs::{Change, MediaCommand};

/// Media element events that may reset the playback rate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    LoadedMetadata,
    CanPlay,
    Play,
    RateChange,
}

#[derive(Debug)]
pub struct VideoController {
    config: VideoConfig,
    element: Option<ElementId>,
    blocked: bool,
}

impl VideoController {
    pub fn new(config: VideoConfig) -> Self {
        Self {
            config,
            element: None,
            blocked: false,
        }
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Mute and request playback. No video on the page means no changes.
    pub fn start(&mut self, doc: &dyn Document) -> Vec<Change> {
        let Some(element) = doc.query_all(&self.config.selector).into_iter().next() else {
            return Vec::new();
        };
        self.element = Some(element);
        vec![
            Change::Media {
                element,
                command: MediaCommand::SetMuted(true),
            },
            Change::Media {
                element,
                command: MediaCommand::Play,
            },
        ]
    }

    fn hold_rate(&self, current_rate: f64) -> Option<Change> {
        let element = self.element?;
        let desired = self.config.playback_rate;
        ((current_rate - desired).abs() > f64::EPSILON).then_some(Change::Media {
            element,
            command: MediaCommand::SetPlaybackRate(desired),
        })
    }

    /// The play request resolved.
    pub fn play_resolved(&mut self, current_rate: f64) -> Option<Change> {
        self.blocked = false;
        self.hold_rate(current_rate)
    }

    /// The play request was rejected (autoplay policy).
    pub fn play_rejected(&mut self) -> Option<Change> {
        let element = self.element?;
        if self.blocked {
            return None;
        }
        self.blocked = true;
        log::debug!("background video autoplay rejected; showing fallback");
        Some(Change::AddClass {
            element,
            class: self.config.fallback_class.clone(),
        })
    }

    /// Re-apply the desired rate after any event that may have reset it.
    pub fn on_media_event(&mut self, _event: MediaEvent, current_rate: f64) -> Option<Change> {
        self.hold_rate(current_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(element: ElementId) -> VideoController {
        let mut v = VideoController::new(VideoConfig::default());
        v.element = Some(element);
        v
    }

    #[test]
    fn rate_is_reapplied_only_when_it_drifts() {
        let mut v = controller_with(ElementId(3));
        assert_eq!(
            v.on_media_event(MediaEvent::LoadedMetadata, 1.0),
            Some(Change::Media {
                element: ElementId(3),
                command: MediaCommand::SetPlaybackRate(0.65)
            })
        );
        assert_eq!(v.on_media_event(MediaEvent::RateChange, 0.65), None);
    }

    #[test]
    fn rejection_adds_fallback_once() {
        let mut v = controller_with(ElementId(3));
        assert!(matches!(v.play_rejected(), Some(Change::AddClass { .. })));
        assert!(v.is_blocked());
        assert_eq!(v.play_rejected(), None);
    }

    #[test]
    fn missing_video_is_silent() {
        let mut v = VideoController::new(VideoConfig::default());
        assert_eq!(v.play_rejected(), None);
        assert_eq!(v.on_media_event(MediaEvent::Play, 1.0), None);
    }
}
