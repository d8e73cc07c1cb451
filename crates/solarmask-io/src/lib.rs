//! solarmask-io: Browser I/O and Dioxus component library.
//!
//! Loads the TensorFlow.js model, moves pixels between `<img>`/canvas
//! elements and Rust, runs predictions against the uploaded image,
//! routes `tracing` output to the browser console, and provides the
//! UI components for the solarmask web application.

pub mod components;
pub mod config;
pub mod logging;
pub mod predict;
pub mod raster;
pub mod tfjs;

pub use components::{ImageDisplay, ImagePicker, ModelInfo, NavBar, Page, PickedFile, PredictButton};
pub use predict::run_prediction;
pub use tfjs::TfjsModel;
