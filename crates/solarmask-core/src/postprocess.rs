//! Model output tensor → displayable RGBA mask.
//!
//! The model emits values in `[0, 1]`. They are scaled back to
//! `[0, 255]` and rounded ([`denormalize`]), then laid out as pixels
//! ([`render_mask`]). Accepted layouts after the batch axis has been
//! squeezed:
//!
//! | shape        | rendered as          |
//! |--------------|----------------------|
//! | `[H, W]`     | gray, opaque         |
//! | `[H, W, 1]`  | gray, opaque         |
//! | `[H, W, 3]`  | RGB, opaque          |
//! | `[H, W, 4]`  | RGBA                 |
//!
//! Extra leading unit axes are squeezed away first when the shape does
//! not already fit, so channels-first single-channel output
//! (`[1, H, W]`) renders as gray.

use image::Rgba;

use crate::tensor::Tensor;
use crate::types::{Dimensions, ModelError, RgbaImage};

/// Scale `[0, 1]` values to rounded `[0, 255]` channel values.
///
/// Returns a new tensor; the input is left untouched. Out-of-range and
/// NaN values are clamped when the mask is rendered.
#[must_use]
pub fn denormalize(output: &Tensor) -> Tensor {
    output.map(|v| (v * 255.0).round())
}

/// Spatial size and channel count of a squeezed output tensor.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedOutputShape`] for any layout not
/// listed in the module docs, or when a spatial axis does not fit in
/// `u32`.
pub fn mask_layout(shape: &[usize]) -> Result<(Dimensions, usize), ModelError> {
    let unsupported = || ModelError::UnsupportedOutputShape(shape.to_vec());
    let (h, w, channels) = match *shape {
        [h, w] => (h, w, 1),
        [h, w, c @ (1 | 3 | 4)] => (h, w, c),
        [1, ref rest @ ..] if rest.len() >= 2 => {
            return mask_layout(rest).map_err(|_| unsupported());
        }
        _ => return Err(unsupported()),
    };
    let height = u32::try_from(h).map_err(|_| unsupported())?;
    let width = u32::try_from(w).map_err(|_| unsupported())?;
    let dims = Dimensions::new(width, height);
    if dims.is_empty() {
        return Err(unsupported());
    }
    Ok((dims, channels))
}

/// Lay out a denormalized tensor as an RGBA image.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedOutputShape`] if the tensor's
/// shape is not a renderable layout.
pub fn render_mask(pixels: &Tensor) -> Result<RgbaImage, ModelError> {
    let (dims, channels) = mask_layout(pixels.shape())?;
    let data = pixels.data();
    let mut mask = RgbaImage::new(dims.width, dims.height);
    for (out, px) in mask.pixels_mut().zip(data.chunks_exact(channels)) {
        *out = match *px {
            [v] => {
                let g = to_channel(v);
                Rgba([g, g, g, u8::MAX])
            }
            [r, g, b] => Rgba([to_channel(r), to_channel(g), to_channel(b), u8::MAX]),
            [r, g, b, a] => Rgba([to_channel(r), to_channel(g), to_channel(b), to_channel(a)]),
            _ => return Err(ModelError::UnsupportedOutputShape(pixels.shape().to_vec())),
        };
    }
    Ok(mask)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f32) -> u8 {
    // `as` maps NaN to 0 after the clamp leaves it untouched.
    v.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tensor::TensorLedger;

    #[test]
    fn denormalize_scales_and_rounds() {
        let ledger = TensorLedger::new();
        let t = ledger.tensor(vec![4], vec![0.0, 0.5, 0.999, 1.0]).unwrap();
        let d = denormalize(&t);
        assert_eq!(d.data(), &[0.0, 128.0, 255.0, 255.0]);
        assert_eq!(ledger.live(), 2);
    }

    #[test]
    fn single_channel_renders_gray() {
        let ledger = TensorLedger::new();
        let t = ledger
            .tensor(vec![1, 2, 1], vec![0.0, 200.0])
            .unwrap();
        let img = render_mask(&t).unwrap();
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn rank_two_is_single_channel() {
        assert_eq!(
            mask_layout(&[180, 120]).unwrap(),
            (Dimensions::new(120, 180), 1)
        );
    }

    #[test]
    fn rgb_and_rgba_layouts() {
        let ledger = TensorLedger::new();
        let rgb = ledger.tensor(vec![1, 1, 3], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(render_mask(&rgb).unwrap().get_pixel(0, 0).0, [1, 2, 3, 255]);
        let rgba = ledger
            .tensor(vec![1, 1, 4], vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert_eq!(render_mask(&rgba).unwrap().get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_values_clamp() {
        let ledger = TensorLedger::new();
        let t = ledger
            .tensor(vec![1, 3], vec![-40.0, 300.0, f32::NAN])
            .unwrap();
        let img = render_mask(&t).unwrap();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
        assert_eq!(img.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn leading_unit_axes_are_squeezed() {
        assert_eq!(
            mask_layout(&[1, 180, 120]).unwrap(),
            (Dimensions::new(120, 180), 1)
        );
        assert_eq!(
            mask_layout(&[1, 1, 6, 5, 3]).unwrap(),
            (Dimensions::new(5, 6), 3)
        );
    }

    #[test]
    fn channels_last_wins_over_squeezing() {
        // One row of two gray pixels, not a 2x1 image.
        assert_eq!(mask_layout(&[1, 2, 1]).unwrap(), (Dimensions::new(2, 1), 1));
    }

    #[test]
    fn unsupported_shapes_rejected() {
        for shape in [&[5][..], &[2, 2, 2], &[2, 1, 2, 2], &[1, 1, 2, 2, 2], &[0, 4]] {
            assert!(
                matches!(
                    mask_layout(shape),
                    Err(ModelError::UnsupportedOutputShape(ref s)) if s == shape
                ),
                "shape {shape:?} should be rejected",
            );
        }
    }
}
