//! Upload → predict state machine.
//!
//! [`UploadWorkflow`] owns everything the upload page displays: the
//! current upload, its mask, the loading flag, the model's state, and
//! the status line. It performs no I/O. The browser layer calls
//! [`select_image`](UploadWorkflow::select_image),
//! [`begin_predict`](UploadWorkflow::begin_predict) and
//! [`finish_predict`](UploadWorkflow::finish_predict) around its async
//! work and re-renders from the accessors.
//!
//! ```text
//! Idle ──select──▶ ImageSelected ──begin──▶ Predicting ──finish(Ok)──▶ MaskReady
//!                        ▲                       │
//!                        └──────finish(Err)──────┘
//! any state ──select──▶ ImageSelected (mask cleared)
//! ```
//!
//! Selecting during a prediction moves straight to `ImageSelected`; the
//! loading flag stays set until the superseded run finishes, so a second
//! prediction cannot start alongside it.
//!
//! Each accepted upload gets a new generation number. A prediction
//! carries the generation it was started for, and its result is
//! discarded if the user picked another image in the meantime, so a
//! mask never outlives the image it was computed from.

use std::fmt;

use crate::mask::PredictedMask;
use crate::types::ModelError;

/// Status line while the model is being acquired.
pub const STATUS_LOADING: &str = "Loading model…";

/// Status line once the model is usable.
pub const STATUS_READY: &str = "Model ready!";

/// Status line after model acquisition failed.
#[must_use]
pub fn acquisition_failed_status(reason: &str) -> String {
    format!("Error: {reason}, using fallback.")
}

/// Status line after a prediction failed.
#[must_use]
pub fn prediction_failed_status(err: &ModelError) -> String {
    format!("Error: prediction failed: {err}")
}

/// Returns `true` if `mime` names an image type (`image/*`).
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Lifecycle of the external inference capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    /// Acquisition in progress.
    Loading,
    /// Model usable for predictions.
    Ready,
    /// Acquisition failed; predictions use the placeholder for the
    /// rest of the session.
    Failed(String),
}

/// How a prediction is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictMode {
    /// Real inference.
    Model,
    /// Demo mode: placeholder mask after an artificial delay.
    Fallback,
}

impl PredictMode {
    /// Short label for the UI badge.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Fallback => "Demo mode",
        }
    }
}

impl fmt::Display for PredictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the page is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing uploaded yet.
    Idle,
    /// An image is shown with no mask.
    ImageSelected,
    /// A prediction is in flight.
    Predicting,
    /// A mask for the current image is shown.
    MaskReady,
}

/// A file the user picked, already exposed as a displayable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// MIME type as reported by the picker.
    pub mime: String,
    /// Displayable URL (usually a `blob:` object URL).
    pub url: String,
}

/// The image currently shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// File name as reported by the picker.
    pub name: String,
    /// MIME type.
    pub mime: String,
    /// Displayable URL.
    pub url: String,
    /// Incremented on every accepted selection.
    pub generation: u64,
}

/// Outcome of [`UploadWorkflow::select_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Not an image; state unchanged.
    Ignored,
    /// Now showing the new image. `replaced` is the previous upload, if
    /// any, so its URL can be revoked.
    Accepted {
        /// The upload that was displaced.
        replaced: Option<UploadedImage>,
    },
}

/// Permission to run one prediction, returned by
/// [`UploadWorkflow::begin_predict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictTicket {
    generation: u64,
    mode: PredictMode,
}

impl PredictTicket {
    /// Which path the prediction should take.
    #[must_use]
    pub const fn mode(&self) -> PredictMode {
        self.mode
    }

    /// Generation of the upload the prediction is for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of [`UploadWorkflow::finish_predict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The mask is now shown.
    Applied,
    /// The prediction failed; the status line says why.
    Failed,
    /// A newer upload replaced the one this prediction was for; the
    /// result was dropped.
    Stale,
}

/// State of the upload page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadWorkflow {
    image: Option<UploadedImage>,
    mask: Option<PredictedMask>,
    /// Generation of the upload the in-flight prediction was started for.
    pending: Option<u64>,
    model: ModelState,
    status: String,
    generation: u64,
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWorkflow {
    /// Fresh page: no upload, model loading.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: None,
            mask: None,
            pending: None,
            model: ModelState::Loading,
            status: STATUS_LOADING.to_owned(),
            generation: 0,
        }
    }

    /// Current upload.
    #[must_use]
    pub const fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    /// Mask for the current upload.
    #[must_use]
    pub const fn mask(&self) -> Option<&PredictedMask> {
        self.mask.as_ref()
    }

    /// `true` while a prediction is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Model lifecycle state.
    #[must_use]
    pub const fn model_state(&self) -> &ModelState {
        &self.model
    }

    /// Human-readable status line.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Path the next prediction will take.
    #[must_use]
    pub const fn mode(&self) -> PredictMode {
        match self.model {
            ModelState::Ready => PredictMode::Model,
            ModelState::Loading | ModelState::Failed(_) => PredictMode::Fallback,
        }
    }

    /// Whether the predict trigger should be enabled.
    #[must_use]
    pub const fn can_predict(&self) -> bool {
        self.image.is_some() && self.pending.is_none()
    }

    /// Current phase.
    ///
    /// A prediction still running for a replaced upload does not count:
    /// the new upload is `ImageSelected` straight away.
    #[must_use]
    pub fn phase(&self) -> Phase {
        let Some(image) = &self.image else {
            return Phase::Idle;
        };
        if self.pending == Some(image.generation) {
            Phase::Predicting
        } else if self.mask.is_some() {
            Phase::MaskReady
        } else {
            Phase::ImageSelected
        }
    }

    /// Record the outcome of model acquisition.
    ///
    /// Only the first outcome is kept; acquisition happens once per
    /// page mount.
    pub fn model_settled(&mut self, outcome: Result<(), &ModelError>) {
        if self.model != ModelState::Loading {
            tracing::warn!(state = ?self.model, "model state already settled; ignoring");
            return;
        }
        match outcome {
            Ok(()) => {
                tracing::info!("model ready");
                self.model = ModelState::Ready;
                self.status = STATUS_READY.to_owned();
            }
            Err(err) => {
                tracing::error!(error = %err, "model acquisition failed, using fallback");
                let reason = err.to_string();
                self.status = acquisition_failed_status(&reason);
                self.model = ModelState::Failed(reason);
            }
        }
    }

    /// Show a newly picked file.
    ///
    /// Non-image files are ignored silently. Accepted files replace the
    /// current upload and clear its mask, from any phase.
    pub fn select_image(&mut self, file: SelectedFile) -> Selection {
        if !is_image_mime(&file.mime) {
            tracing::debug!(name = %file.name, mime = %file.mime, "ignoring non-image file");
            return Selection::Ignored;
        }

        self.generation += 1;
        self.mask = None;
        let replaced = self.image.replace(UploadedImage {
            name: file.name,
            mime: file.mime,
            url: file.url,
            generation: self.generation,
        });
        tracing::debug!(generation = self.generation, "image selected");
        Selection::Accepted { replaced }
    }

    /// Start a prediction for the current upload.
    ///
    /// Returns `None` (and changes nothing) when there is no upload or
    /// a prediction is already in flight.
    pub fn begin_predict(&mut self) -> Option<PredictTicket> {
        let image = self.image.as_ref()?;
        if self.pending.is_some() {
            return None;
        }
        self.pending = Some(image.generation);
        let ticket = PredictTicket {
            generation: image.generation,
            mode: self.mode(),
        };
        tracing::debug!(generation = ticket.generation, mode = %ticket.mode, "prediction started");
        Some(ticket)
    }

    /// Finish the prediction started with `ticket`.
    ///
    /// Always clears the loading flag.
    pub fn finish_predict(
        &mut self,
        ticket: PredictTicket,
        result: Result<PredictedMask, ModelError>,
    ) -> Completion {
        self.pending = None;

        let current = self.image.as_ref().map(|image| image.generation);
        if current != Some(ticket.generation) {
            tracing::debug!(
                requested = ticket.generation,
                current = ?current,
                "discarding prediction for a replaced image"
            );
            return Completion::Stale;
        }

        match result {
            Ok(mask) => {
                self.mask = Some(mask);
                Completion::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, "prediction failed");
                self.status = prediction_failed_status(&err);
                Completion::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::types::Dimensions;

    fn file(name: &str, mime: &str) -> SelectedFile {
        SelectedFile {
            name: name.into(),
            mime: mime.into(),
            url: format!("blob:test/{name}"),
        }
    }

    fn rendered() -> PredictedMask {
        PredictedMask::Rendered {
            url: "data:image/png;base64,AAAA".into(),
            dimensions: Dimensions::new(180, 180),
        }
    }

    #[test]
    fn starts_idle_and_loading_model() {
        let wf = UploadWorkflow::new();
        assert_eq!(wf.phase(), Phase::Idle);
        assert_eq!(wf.model_state(), &ModelState::Loading);
        assert_eq!(wf.status(), STATUS_LOADING);
        assert!(!wf.can_predict());
    }

    #[test]
    fn mime_check() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/JPEG"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(""));
        assert!(!is_image_mime("imag"));
    }

    #[test]
    fn non_image_leaves_state_unchanged() {
        let mut wf = UploadWorkflow::new();
        wf.select_image(file("cat.png", "image/png"));
        let before = wf.clone();
        assert_eq!(
            wf.select_image(file("notes.txt", "text/plain")),
            Selection::Ignored
        );
        assert_eq!(wf, before);
    }

    #[test]
    fn image_selection_clears_mask() {
        let mut wf = UploadWorkflow::new();
        wf.select_image(file("a.png", "image/png"));
        let ticket = wf.begin_predict().unwrap();
        wf.finish_predict(ticket, Ok(rendered()));
        assert_eq!(wf.phase(), Phase::MaskReady);

        let selection = wf.select_image(file("b.jpg", "image/jpeg"));
        assert!(matches!(
            &selection,
            Selection::Accepted { replaced: Some(prev) } if prev.name == "a.png"
        ));
        assert!(wf.mask().is_none());
        assert_eq!(wf.image().unwrap().name, "b.jpg");
        assert_eq!(wf.phase(), Phase::ImageSelected);
    }

    #[test]
    fn predict_without_image_is_noop() {
        let mut wf = UploadWorkflow::new();
        let before = wf.clone();
        assert!(wf.begin_predict().is_none());
        assert_eq!(wf, before);
    }

    #[test]
    fn second_predict_while_loading_is_refused() {
        let mut wf = UploadWorkflow::new();
        wf.select_image(file("a.png", "image/png"));
        let first = wf.begin_predict();
        assert!(first.is_some());
        assert!(wf.is_loading());
        assert_eq!(wf.phase(), Phase::Predicting);
        assert!(!wf.can_predict());
        assert!(wf.begin_predict().is_none());
    }

    #[test]
    fn fallback_prediction_yields_placeholder() {
        let mut wf = UploadWorkflow::new();
        wf.model_settled(Err(&ModelError::Acquisition("404 Not Found".into())));
        wf.select_image(file("cat.png", "image/png"));
        assert!(wf.mask().is_none());

        let ticket = wf.begin_predict().unwrap();
        assert_eq!(ticket.mode(), PredictMode::Fallback);
        let mask = PredictedMask::placeholder(12345, &ModelConfig::default());
        assert_eq!(wf.finish_predict(ticket, Ok(mask)), Completion::Applied);

        assert!(!wf.is_loading());
        let url = wf.mask().unwrap().url();
        assert!(!url.is_empty());
        assert!(url.ends_with("/seed/12345/800/600"), "got {url}");
    }

    #[test]
    fn ready_model_selects_model_mode() {
        let mut wf = UploadWorkflow::new();
        wf.model_settled(Ok(()));
        assert_eq!(wf.status(), STATUS_READY);
        assert_eq!(wf.mode(), PredictMode::Model);
        wf.select_image(file("sun.png", "image/png"));
        let ticket = wf.begin_predict().unwrap();
        assert_eq!(ticket.mode(), PredictMode::Model);
        wf.finish_predict(ticket, Ok(rendered()));
        assert_eq!(wf.mask().unwrap().dimensions(), Dimensions::new(180, 180));
        assert!(!wf.is_loading());
    }

    #[test]
    fn failed_acquisition_is_permanent_and_surfaced() {
        let mut wf = UploadWorkflow::new();
        wf.model_settled(Err(&ModelError::Acquisition("network down".into())));
        assert!(wf.status().contains("Error"));
        assert!(wf.status().ends_with("using fallback."));
        wf.model_settled(Ok(()));
        assert!(matches!(wf.model_state(), ModelState::Failed(_)));
        assert_eq!(wf.mode(), PredictMode::Fallback);
    }

    #[test]
    fn prediction_failure_resets_flag_and_reports() {
        let mut wf = UploadWorkflow::new();
        wf.model_settled(Ok(()));
        wf.select_image(file("sun.png", "image/png"));
        let ticket = wf.begin_predict().unwrap();
        let outcome = wf.finish_predict(ticket, Err(ModelError::Inference("oom".into())));
        assert_eq!(outcome, Completion::Failed);
        assert!(!wf.is_loading());
        assert!(wf.mask().is_none());
        assert_eq!(wf.phase(), Phase::ImageSelected);
        assert!(wf.status().starts_with("Error: prediction failed"));
        // Can retry.
        assert!(wf.can_predict());
    }

    #[test]
    fn result_for_replaced_image_is_discarded() {
        let mut wf = UploadWorkflow::new();
        wf.select_image(file("a.png", "image/png"));
        let ticket = wf.begin_predict().unwrap();
        wf.select_image(file("b.png", "image/png"));
        // The new upload is selectable at once; the old run still holds the flag.
        assert_eq!(wf.phase(), Phase::ImageSelected);
        assert!(wf.is_loading());
        assert!(!wf.can_predict());

        assert_eq!(wf.finish_predict(ticket, Ok(rendered())), Completion::Stale);
        assert!(wf.mask().is_none());
        assert!(!wf.is_loading());
        assert_eq!(wf.phase(), Phase::ImageSelected);
    }

    #[test]
    fn scenario_cat_then_notes() {
        let mut wf = UploadWorkflow::new();
        wf.model_settled(Err(&ModelError::Acquisition("unavailable".into())));

        wf.select_image(file("cat.png", "image/png"));
        assert!(wf.mask().is_none());

        let ticket = wf.begin_predict().unwrap();
        let mask = PredictedMask::placeholder(987_654_321, &ModelConfig::default());
        wf.finish_predict(ticket, Ok(mask));
        let url = wf.mask().unwrap().url().to_owned();
        let tail: Vec<&str> = url.rsplit('/').take(4).collect();
        assert_eq!(tail[0], "600");
        assert_eq!(tail[1], "800");
        assert!(tail[2].parse::<u64>().is_ok());
        assert_eq!(tail[3], "seed");

        let before = wf.image().cloned();
        wf.select_image(file("notes.txt", "text/plain"));
        assert_eq!(wf.image().cloned(), before);
        assert_eq!(wf.mask().unwrap().url(), url);
    }
}
