//! Error types for the orchestration core.
//!
//! None of these reach the page visitor. A missing element is not an error at
//! all (selectors that match nothing are silent no-ops), and capability gaps
//! are recovered where they are detected. What remains are faults in the
//! declarative tables or the host configuration.

use serde::{Deserialize, Serialize};

use crate::ids::{TimelineId, TriggerId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ScrollcueError {
    /// Scroll offset text such as `"top 85%"` could not be parsed
    #[error("Invalid scroll offset: {text:?}")]
    InvalidOffset { text: String },

    /// Easing name is not one of the supported curves
    #[error("Unknown ease: {name:?}")]
    UnknownEase { name: String },

    /// Root margin text such as `"0px 0px -10% 0px"` could not be parsed
    #[error("Invalid root margin: {text:?}")]
    InvalidRootMargin { text: String },

    #[error("Trigger not found: {id:?}")]
    TriggerNotFound { id: TriggerId },

    #[error("Timeline not found: {id:?}")]
    TimelineNotFound { id: TimelineId },

    /// Configuration value outside its accepted range
    #[error("Invalid config: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    /// The presentation was used after teardown
    #[error("Presentation already torn down")]
    TornDown,
}

impl ScrollcueError {
    pub fn invalid_config(field: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Category name used in log lines.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidOffset { .. } | Self::UnknownEase { .. } | Self::InvalidRootMargin { .. } => {
                "declaration"
            }
            Self::TriggerNotFound { .. } | Self::TimelineNotFound { .. } => "lookup",
            Self::InvalidConfig { .. } => "config",
            Self::TornDown => "lifecycle",
        }
    }
}

/// Newsletter form feedback; the only failure a visitor ever sees.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("invalid e-mail address")]
    InvalidEmail,
}

pub type Result<T> = std::result::Result<T, ScrollcueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_categories() {
        let err = ScrollcueError::InvalidOffset {
            text: "middle".into(),
        };
        assert_eq!(err.to_string(), "Invalid scroll offset: \"middle\"");
        assert_eq!(err.category(), "declaration");
        assert_eq!(ScrollcueError::TornDown.category(), "lifecycle");
        let cfg = ScrollcueError::invalid_config("reveal.threshold", 1.5);
        assert_eq!(cfg.to_string(), "Invalid config: reveal.threshold = 1.5");
    }
}
