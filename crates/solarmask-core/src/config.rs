//! Model location, tensor geometry, and fallback settings.
//!
//! All fields have defaults, so a page can ship a partial JSON block
//! that only overrides what it needs (typically `model_url`).

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Where the converted TensorFlow.js model's `model.json` is served.
pub const DEFAULT_MODEL_URL: &str = "/tfjs_model/model.json";

/// TensorFlow.js bundle injected when the page did not include it.
pub const DEFAULT_TFJS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/@tensorflow/tfjs@latest/dist/tf.min.js";

/// Placeholder image service used in demo mode.
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://picsum.photos";

/// Errors produced when reading a [`ModelConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON could not be parsed into a config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for model acquisition and prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// URL of the model's `model.json`.
    pub model_url: String,

    /// URL of the TensorFlow.js bundle.
    pub tfjs_script_url: String,

    /// Spatial size the model expects. Uploaded images are resized
    /// to exactly this before inference.
    pub input_size: Dimensions,

    /// Artificial processing delay for demo-mode predictions.
    pub fallback_delay_ms: u32,

    /// Base URL of the placeholder image service.
    pub placeholder_base: String,

    /// Size requested from the placeholder service.
    pub placeholder_size: Dimensions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_owned(),
            tfjs_script_url: DEFAULT_TFJS_SCRIPT_URL.to_owned(),
            input_size: Dimensions::new(180, 180),
            fallback_delay_ms: 1500,
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_owned(),
            placeholder_size: Dimensions::new(800, 600),
        }
    }
}

impl ModelConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a URL is blank or a size
    /// has a zero axis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_url.trim().is_empty() {
            return Err(ConfigError::Invalid("model_url is empty".into()));
        }
        if self.tfjs_script_url.trim().is_empty() {
            return Err(ConfigError::Invalid("tfjs_script_url is empty".into()));
        }
        if self.placeholder_base.trim().is_empty() {
            return Err(ConfigError::Invalid("placeholder_base is empty".into()));
        }
        if self.input_size.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "input_size must be non-zero, got {}",
                self.input_size
            )));
        }
        if self.placeholder_size.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "placeholder_size must be non-zero, got {}",
                self.placeholder_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.input_size, Dimensions::new(180, 180));
        assert_eq!(config.fallback_delay_ms, 1500);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            ModelConfig::from_json(r#"{"model_url": "https://example.org/m/model.json"}"#)
                .unwrap();
        assert_eq!(config.model_url, "https://example.org/m/model.json");
        assert_eq!(config.placeholder_size, Dimensions::new(800, 600));
    }

    #[test]
    fn zero_input_size_rejected() {
        let result =
            ModelConfig::from_json(r#"{"input_size": {"width": 0, "height": 180}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn blank_model_url_rejected() {
        let result = ModelConfig::from_json(r#"{"model_url": "   "}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let result = ModelConfig::from_json("{model_url:");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
