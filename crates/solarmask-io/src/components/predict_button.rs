//! The "Predict Flare Mask" button.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdLoaderCircle, LdSun};

/// Props for the [`PredictButton`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PredictButtonProps {
    /// A prediction is in flight.
    loading: bool,
    /// Whether a click would start a prediction.
    enabled: bool,
    /// Called on click.
    on_predict: EventHandler<()>,
}

/// Starts a prediction; shows a spinner while one is in flight.
#[component]
pub fn PredictButton(props: PredictButtonProps) -> Element {
    rsx! {
        button {
            class: "button button-secondary",
            disabled: !props.enabled,
            onclick: move |_| props.on_predict.call(()),

            if props.loading {
                span { class: "spin",
                    Icon { width: 18, height: 18, icon: LdLoaderCircle }
                }
                "Predicting…"
            } else {
                Icon { width: 18, height: 18, icon: LdSun }
                "Predict Flare Mask"
            }
        }
    }
}
