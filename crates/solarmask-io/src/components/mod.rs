//! Dioxus UI components for solarmask.
//!
//! Provides the navigation bar, image picker, predict button,
//! side-by-side image display, and model status panel.

mod image_display;
mod model_info;
mod navbar;
mod predict_button;
mod upload;

pub use image_display::ImageDisplay;
pub use model_info::ModelInfo;
pub use navbar::{NavBar, Page};
pub use predict_button::PredictButton;
pub use upload::{ImagePicker, PickedFile, mime_from_extension, resolve_mime};
