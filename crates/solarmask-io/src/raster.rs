//! Image elements, offscreen canvases, and object URLs.
//!
//! Reads the pixels of a rendered `<img>` through an offscreen canvas,
//! renders RGBA masks back into a canvas to get a `data:` URL, and
//! turns uploaded file bytes into `blob:` URLs for display.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use solarmask_core::RgbaImage;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{BlobPropertyBag, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Errors that can occur while moving pixels between the DOM and Rust.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// A required element or global is missing.
    #[error("missing {0}")]
    Missing(String),

    /// The image element failed to load its source.
    #[error("image failed to load")]
    LoadFailed,

    /// Pixel data did not match the reported size.
    #[error("pixel buffer does not match {width}x{height}")]
    BadPixelBuffer {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<RasterError> for solarmask_core::ModelError {
    fn from(err: RasterError) -> Self {
        Self::Inference(err.to_string())
    }
}

fn document() -> Result<web_sys::Document, RasterError> {
    web_sys::window()
        .ok_or_else(|| RasterError::Missing("global window".into()))?
        .document()
        .ok_or_else(|| RasterError::Missing("document".into()))
}

/// Look up an `<img>` element by id.
///
/// # Errors
///
/// Returns [`RasterError::Missing`] if there is no element with that id
/// or it is not an `<img>`.
pub fn image_element(id: &str) -> Result<HtmlImageElement, RasterError> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| RasterError::Missing(format!("element #{id}")))?
        .dyn_into::<HtmlImageElement>()
        .map_err(|_| RasterError::Missing(format!("<img> #{id}")))
}

/// Wait until `img` has finished loading its source.
///
/// Returns immediately when the element is already complete, otherwise
/// awaits its `load` (or `error`) event.
///
/// # Errors
///
/// Returns [`RasterError::LoadFailed`] if the element fires `error`, or
/// is complete but has no decoded pixels (broken source).
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn wait_until_loaded(img: &HtmlImageElement) -> Result<(), RasterError> {
    if !img.complete() {
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            img.set_onload(Some(&resolve));
            img.set_onerror(Some(&reject));
        });
        let outcome = JsFuture::from(promise).await;
        img.set_onload(None);
        img.set_onerror(None);
        if outcome.is_err() {
            return Err(RasterError::LoadFailed);
        }
    }
    if img.natural_width() == 0 || img.natural_height() == 0 {
        return Err(RasterError::LoadFailed);
    }
    Ok(())
}

/// Create a detached canvas of the given size and its 2D context.
fn offscreen_canvas(
    width: u32,
    height: u32,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), RasterError> {
    let canvas = document()?
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|e| RasterError::JsError(format!("failed to cast canvas: {e:?}")))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| RasterError::Missing("2d canvas context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| RasterError::JsError(format!("failed to cast context: {e:?}")))?;
    Ok((canvas, context))
}

/// Read the pixels of a loaded `<img>` at its natural size.
///
/// # Errors
///
/// Returns [`RasterError`] if the canvas cannot be created or the pixel
/// data cannot be read.
pub fn read_pixels(img: &HtmlImageElement) -> Result<RgbaImage, RasterError> {
    let (width, height) = (img.natural_width(), img.natural_height());
    let (_canvas, context) = offscreen_canvas(width, height)?;
    context.draw_image_with_html_image_element(img, 0.0, 0.0)?;
    let data = context
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?
        .data();
    RgbaImage::from_raw(width, height, data.0)
        .ok_or(RasterError::BadPixelBuffer { width, height })
}

/// Render an RGBA image into an offscreen canvas and return the
/// canvas's PNG `data:` URL.
///
/// # Errors
///
/// Returns [`RasterError`] if any canvas call fails.
pub fn image_to_data_url(image: &RgbaImage) -> Result<String, RasterError> {
    let (width, height) = image.dimensions();
    let (canvas, context) = offscreen_canvas(width, height)?;
    let data = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(image.as_raw().as_slice()),
        width,
        height,
    )?;
    context.put_image_data(&data, 0.0, 0.0)?;
    Ok(canvas.to_data_url()?)
}

/// Wrap file bytes in a Blob and return an object URL for `<img src>`.
///
/// The returned URL must be revoked via [`revoke_object_url`] when no
/// longer needed to avoid memory leaks.
///
/// # Errors
///
/// Returns [`RasterError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_object_url(bytes: &[u8], mime: &str) -> Result<String, RasterError> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Revoke an object URL previously created by [`bytes_to_object_url`].
///
/// Best-effort: failures are silently ignored since the URL may have
/// already been revoked.
pub fn revoke_object_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}
