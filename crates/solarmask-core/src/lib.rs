//! solarmask-core: Pure upload/predict logic (sans-IO).
//!
//! Turns an uploaded image into a predicted mask through:
//! resize + normalize -> model forward pass -> denormalize -> render,
//! and tracks the upload page's state (current image, mask, loading
//! flag, model readiness, status line).
//!
//! This crate has **no I/O dependencies** -- the model is reached
//! through the [`SegmentationModel`] trait and pixels arrive as
//! in-memory images. All browser interaction lives in `solarmask-io`.

pub mod config;
pub mod mask;
pub mod postprocess;
pub mod preprocess;
pub mod runner;
pub mod tensor;
pub mod types;
pub mod workflow;

pub use config::{ConfigError, ModelConfig};
pub use mask::PredictedMask;
pub use runner::{SegmentationModel, predict_mask};
pub use tensor::{Tensor, TensorLedger};
pub use types::{Dimensions, ModelError, RgbaImage};
pub use workflow::{
    Completion, ModelState, Phase, PredictMode, PredictTicket, SelectedFile, Selection,
    UploadWorkflow, UploadedImage,
};
