//! Tunable interaction constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Interaction settings for a [`Canvas`](crate::Canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Handle grab tolerance in screen pixels.
    pub handle_tolerance: f64,
    /// Freehand strokes with fewer samples than this grow instead of scaling
    /// when resized.
    pub freehand_resize_threshold: usize,
    /// Opacity applied to elements marked by the eraser before release.
    pub erase_feedback_opacity: f64,
    /// Smallest side of a resized freehand stroke, in scene units.
    pub min_freehand_size: f64,
    /// Smallest side of a resized text box, in scene units.
    pub min_text_size: f64,
    /// Maximum number of history snapshots kept (0 = unbounded).
    pub max_history: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            handle_tolerance: 10.0,
            freehand_resize_threshold: 11,
            erase_feedback_opacity: 0.5,
            min_freehand_size: 0.1,
            min_text_size: 10.0,
            max_history: 0,
        }
    }
}

impl CanvasConfig {
    /// Parse overrides from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.handle_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "handleTolerance",
                reason: format!("must be non-negative, got {}", self.handle_tolerance),
            });
        }
        if !(0.0..=1.0).contains(&self.erase_feedback_opacity) {
            return Err(ConfigError::Invalid {
                field: "eraseFeedbackOpacity",
                reason: format!("must be within 0..=1, got {}", self.erase_feedback_opacity),
            });
        }
        if !(self.min_freehand_size > 0.0) || !(self.min_text_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "minSize",
                reason: "minimum sizes must be positive".to_string(),
            });
        }
        Ok(())
    }
}
