//! One prediction: preprocess → infer → postprocess.
//!
//! The model itself is an external capability behind
//! [`SegmentationModel`]. Everything around the forward pass is pure
//! and runs identically in the browser and in native tests.
//!
//! Every tensor created along the way (input, raw output, denormalized
//! output) is owned by this function's stack frame, so it is released
//! when the function returns, whether the prediction succeeded or
//! failed part-way.

use crate::config::ModelConfig;
use crate::postprocess;
use crate::preprocess;
use crate::tensor::{Tensor, TensorLedger};
use crate::types::{ModelError, RgbaImage};

/// An image-to-image segmentation model.
pub trait SegmentationModel {
    /// Run one forward pass on a `[1, H, W, 3]` input in `[0, 1]`.
    ///
    /// Implementations allocate their output from
    /// [`input.ledger()`](Tensor::ledger) and must release any
    /// buffers of their own before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Inference`] (or another variant) if the
    /// forward pass fails.
    fn infer(&self, input: &Tensor) -> Result<Tensor, ModelError>;
}

/// Predict a mask for `image`.
///
/// The returned mask has the model's output spatial size, which for
/// image-to-image models equals `config.input_size`.
///
/// # Errors
///
/// Propagates any [`ModelError`] from preprocessing, inference, or
/// rendering. All intermediate tensors are released either way.
pub fn predict_mask<M: SegmentationModel + ?Sized>(
    model: &M,
    image: &RgbaImage,
    config: &ModelConfig,
    ledger: &TensorLedger,
) -> Result<RgbaImage, ModelError> {
    let input = preprocess::image_to_input(image, config.input_size, ledger)?;
    let output = model.infer(&input)?;
    input.dispose();

    let output = output.squeeze_batch()?;
    let pixels = postprocess::denormalize(&output);
    output.dispose();

    let mask = postprocess::render_mask(&pixels)?;
    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        tensors = ledger.total_allocated(),
        "mask rendered"
    );
    Ok(mask)
}
