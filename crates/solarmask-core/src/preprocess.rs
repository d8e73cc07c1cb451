//! Image → model input tensor.
//!
//! The model expects a batch of one RGB image at a fixed spatial size,
//! channels last, with values in `[0, 1]`:
//!
//! ```text
//! shape = [1, height, width, 3]
//! value = channel / 255.0
//! ```
//!
//! Resizing is bilinear. The alpha channel is discarded.

use image::imageops::{self, FilterType};

use crate::tensor::{Tensor, TensorLedger};
use crate::types::{Dimensions, ModelError, RgbaImage};

/// Number of color channels fed to the model.
pub const INPUT_CHANNELS: usize = 3;

/// Convert an RGBA image into a normalized `[1, H, W, 3]` tensor of
/// size `target`.
///
/// # Errors
///
/// Returns [`ModelError::EmptyImage`] if the image or `target` has a
/// zero axis.
pub fn image_to_input(
    image: &RgbaImage,
    target: Dimensions,
    ledger: &TensorLedger,
) -> Result<Tensor, ModelError> {
    if Dimensions::of(image).is_empty() || target.is_empty() {
        return Err(ModelError::EmptyImage);
    }

    let resized;
    let source = if Dimensions::of(image) == target {
        image
    } else {
        resized = imageops::resize(image, target.width, target.height, FilterType::Triangle);
        &resized
    };

    let mut data = Vec::with_capacity(target.pixel_count() * INPUT_CHANNELS);
    for pixel in source.pixels() {
        let [r, g, b, _a] = pixel.0;
        data.push(f32::from(r) / 255.0);
        data.push(f32::from(g) / 255.0);
        data.push(f32::from(b) / 255.0);
    }

    ledger.tensor(
        vec![
            1,
            target.height as usize,
            target.width as usize,
            INPUT_CHANNELS,
        ],
        data,
    )
}
