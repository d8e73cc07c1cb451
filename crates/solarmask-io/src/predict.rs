//! Browser side of a prediction.
//!
//! Runs the path chosen by a [`PredictTicket`]:
//!
//! - **Model**: wait for the uploaded `<img>` to finish loading, read its
//!   pixels, run [`predict_mask`], and render the result into an
//!   offscreen canvas to get a `data:` URL.
//! - **Fallback** (demo mode): wait `fallback_delay_ms`, then return a
//!   placeholder mask for a random seed.
//!
//! The caller hands the result to
//! [`UploadWorkflow::finish_predict`](solarmask_core::UploadWorkflow::finish_predict),
//! which clears the loading flag whatever the outcome.

use gloo_timers::future::TimeoutFuture;
use solarmask_core::{
    Dimensions, ModelConfig, ModelError, PredictMode, PredictTicket, PredictedMask, TensorLedger,
    predict_mask,
};
use web_time::Instant;

use crate::raster;
use crate::tfjs::TfjsModel;

/// Id of the `<img>` element showing the current upload.
pub const UPLOADED_IMAGE_ID: &str = "uploaded-image";

/// Run the prediction described by `ticket`.
///
/// A ticket in [`PredictMode::Model`] with no model available falls
/// back to demo mode.
///
/// # Errors
///
/// Returns [`ModelError`] if the image cannot be read or inference
/// fails. Demo-mode predictions do not fail.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn run_prediction(
    ticket: &PredictTicket,
    model: Option<&TfjsModel>,
    config: &ModelConfig,
) -> Result<PredictedMask, ModelError> {
    match (ticket.mode(), model) {
        (PredictMode::Model, Some(model)) => model_mask(model, config).await,
        (PredictMode::Model, None) => {
            tracing::warn!("model mode without a model handle, using fallback");
            Ok(fallback_mask(config).await)
        }
        (PredictMode::Fallback, _) => Ok(fallback_mask(config).await),
    }
}

#[allow(clippy::future_not_send)]
async fn model_mask(model: &TfjsModel, config: &ModelConfig) -> Result<PredictedMask, ModelError> {
    let img = raster::image_element(UPLOADED_IMAGE_ID)?;
    raster::wait_until_loaded(&img).await?;
    let pixels = raster::read_pixels(&img)?;

    let started = Instant::now();
    let ledger = TensorLedger::new();
    let outcome = predict_mask(model, &pixels, config, &ledger);
    tracing::debug!(
        elapsed = ?started.elapsed(),
        live_rust_tensors = ledger.live(),
        live_js_tensors = ?model.live_tensors(),
        ok = outcome.is_ok(),
        "inference finished"
    );
    let mask = outcome?;

    Ok(PredictedMask::Rendered {
        url: raster::image_to_data_url(&mask)?,
        dimensions: Dimensions::of(&mask),
    })
}

/// Demo-mode mask: a placeholder for a fresh random seed, after the
/// configured delay.
#[allow(clippy::future_not_send)]
pub async fn fallback_mask(config: &ModelConfig) -> PredictedMask {
    TimeoutFuture::new(config.fallback_delay_ms).await;
    PredictedMask::placeholder(random_seed(), config)
}

/// Random placeholder seed. Falls back to the clock when the platform
/// RNG is unavailable; the seed only picks a stock image.
fn random_seed() -> u64 {
    getrandom::u64().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "platform RNG unavailable, seeding from clock");
        clock_seed()
    })
}

#[expect(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
