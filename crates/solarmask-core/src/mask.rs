//! Predicted masks and demo-mode placeholders.
//!
//! A mask is either rendered from real model output or, when no model
//! is available, a placeholder image fetched from an external service.
//! The placeholder URL is a pure function of its seed and the config:
//!
//! ```text
//! <placeholder_base>/seed/<seed>/<width>/<height>
//! ```

use crate::config::ModelConfig;
use crate::types::Dimensions;

/// A displayable mask for the current upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictedMask {
    /// Rendered from model output (a `data:` URL of the encoded canvas).
    Rendered {
        /// Image source URL.
        url: String,
        /// Pixel size of the rendered output.
        dimensions: Dimensions,
    },
    /// Demo-mode stand-in served by the placeholder service.
    Placeholder {
        /// Image source URL.
        url: String,
        /// Seed the URL was derived from.
        seed: u64,
        /// Size requested from the service.
        dimensions: Dimensions,
    },
}

impl PredictedMask {
    /// Build the placeholder mask for `seed`.
    #[must_use]
    pub fn placeholder(seed: u64, config: &ModelConfig) -> Self {
        Self::Placeholder {
            url: placeholder_url(seed, config),
            seed,
            dimensions: config.placeholder_size,
        }
    }

    /// Image source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Rendered { url, .. } | Self::Placeholder { url, .. } => url,
        }
    }

    /// Pixel size of the mask.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        match self {
            Self::Rendered { dimensions, .. } | Self::Placeholder { dimensions, .. } => *dimensions,
        }
    }

    /// Returns `true` for demo-mode masks.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Placeholder service URL for `seed`.
#[must_use]
pub fn placeholder_url(seed: u64, config: &ModelConfig) -> String {
    let base = config.placeholder_base.trim_end_matches('/');
    let Dimensions { width, height } = config.placeholder_size;
    format!("{base}/seed/{seed}/{width}/{height}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_url_format() {
        let config = ModelConfig::default();
        assert_eq!(
            placeholder_url(42, &config),
            "https://picsum.photos/seed/42/800/600"
        );
    }

    #[test]
    fn placeholder_is_deterministic_per_seed() {
        let config = ModelConfig::default();
        assert_eq!(
            PredictedMask::placeholder(7, &config),
            PredictedMask::placeholder(7, &config)
        );
        assert_ne!(
            PredictedMask::placeholder(7, &config).url(),
            PredictedMask::placeholder(8, &config).url()
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let config = ModelConfig {
            placeholder_base: "https://img.example/".into(),
            placeholder_size: Dimensions::new(64, 32),
            ..ModelConfig::default()
        };
        assert_eq!(
            placeholder_url(u64::MAX, &config),
            format!("https://img.example/seed/{}/64/32", u64::MAX)
        );
    }

    #[test]
    fn accessors() {
        let rendered = PredictedMask::Rendered {
            url: "data:image/png;base64,AAAA".into(),
            dimensions: Dimensions::new(180, 180),
        };
        assert!(!rendered.is_placeholder());
        assert_eq!(rendered.dimensions(), Dimensions::new(180, 180));

        let placeholder = PredictedMask::placeholder(1, &ModelConfig::default());
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.dimensions(), Dimensions::new(800, 600));
    }
}
