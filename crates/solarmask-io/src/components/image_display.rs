//! Side-by-side view of the upload and its predicted mask.

use dioxus::prelude::*;
use solarmask_core::{PredictedMask, UploadedImage};

use crate::predict::UPLOADED_IMAGE_ID;

/// Props for the [`ImageDisplay`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageDisplayProps {
    /// The current upload.
    image: UploadedImage,
    /// The mask for the current upload, if one has been predicted.
    mask: Option<PredictedMask>,
}

/// Two panels: the uploaded image and the predicted mask.
///
/// The uploaded `<img>` carries [`UPLOADED_IMAGE_ID`] so the prediction
/// can read its pixels. Placeholder masks are labelled as demo output.
#[component]
pub fn ImageDisplay(props: ImageDisplayProps) -> Element {
    let image = &props.image;

    rsx! {
        div { class: "panels",
            div { class: "panel",
                h3 { class: "panel-title", "Uploaded Image" }
                img {
                    id: UPLOADED_IMAGE_ID,
                    class: "panel-image",
                    src: "{image.url}",
                    alt: "{image.name}",
                }
            }

            div { class: "panel",
                h3 { class: "panel-title", "Predicted Flare Mask" }
                if let Some(ref mask) = props.mask {
                    img {
                        class: "panel-image fade-in",
                        src: "{mask.url()}",
                        alt: "Predicted flare mask",
                    }
                    if mask.is_placeholder() {
                        p { class: "badge", "Demo mode: placeholder image, not a model prediction" }
                    } else {
                        p { class: "caption", "{mask.dimensions()}" }
                    }
                } else {
                    div { class: "panel-empty", "No prediction yet" }
                }
            }
        }
    }
}
