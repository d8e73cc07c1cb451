//! Shared types for the solarmask workflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can pass pixel data
/// around without depending on `image` directly.
pub use image::RgbaImage;

/// Image or tensor spatial size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors raised while acquiring a model or running a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The inference capability or the model artifact could not be loaded.
    #[error("could not load model: {0}")]
    Acquisition(String),

    /// The model's forward pass failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// A buffer's element count does not match its declared shape.
    #[error("tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape the data was supposed to have.
        expected: Vec<usize>,
        /// Shape implied by the data actually supplied.
        actual: Vec<usize>,
    },

    /// The model produced a tensor that cannot be rendered as an image.
    #[error("unsupported model output shape {0:?}")]
    UnsupportedOutputShape(Vec<usize>),

    /// The source image has no pixels (e.g. not yet decoded).
    #[error("source image is empty")]
    EmptyImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(180, 120).to_string(), "180x120");
    }

    #[test]
    fn empty_when_either_axis_zero() {
        assert!(Dimensions::new(0, 10).is_empty());
        assert!(Dimensions::new(10, 0).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }

    #[test]
    fn pixel_count() {
        assert_eq!(Dimensions::new(180, 120).pixel_count(), 21_600);
    }

    #[test]
    fn error_messages_carry_context() {
        let e = ModelError::ShapeMismatch {
            expected: vec![1, 2],
            actual: vec![3],
        };
        assert_eq!(
            e.to_string(),
            "tensor shape mismatch: expected [1, 2], got [3]"
        );
        assert_eq!(
            ModelError::Acquisition("404".into()).to_string(),
            "could not load model: 404"
        );
    }
}
