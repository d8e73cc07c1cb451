//! Model status line and deployment note.

use dioxus::prelude::*;
use solarmask_core::{ModelState, PredictMode};

/// Props for the [`ModelInfo`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ModelInfoProps {
    /// Current model readiness.
    state: ModelState,
    /// Status line to show.
    status: String,
    /// Which path the next prediction would take.
    mode: PredictMode,
}

/// Shows the model status, the prediction mode, and how the model is
/// expected to be deployed.
#[component]
pub fn ModelInfo(props: ModelInfoProps) -> Element {
    let status_class = match props.state {
        ModelState::Loading => "status",
        ModelState::Ready => "status status-ok",
        ModelState::Failed(_) => "status status-error",
    };
    let mode = props.mode.label();

    rsx! {
        div { class: "model-info",
            p { class: "{status_class}", "{props.status}" }
            p { class: "mode", "Mode: {mode}" }
            details { class: "note",
                summary { "Deploying the model" }
                p {
                    "Convert the trained Keras model with "
                    code { "tensorflowjs_converter --input_format keras model.h5 tfjs_model/" }
                    " and serve the output directory next to this page. The page loads "
                    code { "tfjs_model/model.json" }
                    " and expects a 180×180 RGB input."
                }
            }
        }
    }
}
