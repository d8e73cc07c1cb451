use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdArrowRight;
use solarmask_core::workflow::is_image_mime;
use solarmask_core::{ModelConfig, SelectedFile, Selection, UploadWorkflow};
use solarmask_io::config::page_config;
use solarmask_io::raster;
use solarmask_io::{
    ImageDisplay, ImagePicker, ModelInfo, NavBar, Page, PickedFile, PredictButton, TfjsModel,
    run_prediction,
};

fn main() {
    let level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    solarmask_io::logging::init(level);
    dioxus::launch(app);
}

/// Root application component: navigation plus the current page.
fn app() -> Element {
    let mut page = use_signal(Page::default);

    let body = match page() {
        Page::Home => rsx! {
            Home { on_start: move |()| page.set(Page::Upload) }
        },
        Page::Upload => rsx! { UploadPage {} },
        Page::About => rsx! { About {} },
    };

    rsx! {
        style { dangerous_inner_html: include_str!("../assets/main.css") }

        div { class: "app",
            NavBar {
                current: page(),
                on_navigate: move |p| page.set(p),
            }

            main { class: "content", {body} }
        }
    }
}

/// Landing page.
#[component]
fn Home(on_start: EventHandler<()>) -> Element {
    rsx! {
        section { class: "hero",
            h1 { class: "hero-title", "Solar Flare Detector" }
            p { class: "hero-subtitle",
                "Upload an image of the Sun and get a predicted flare mask, computed in your browser."
            }
            button {
                class: "button button-primary",
                onclick: move |_| on_start.call(()),
                "Get Started"
                Icon { width: 18, height: 18, icon: LdArrowRight }
            }
        }
    }
}

/// Project background.
#[component]
fn About() -> Element {
    rsx! {
        section { class: "card",
            h2 { "About" }
            p {
                "Solar flares are sudden bursts of radiation from the Sun's surface. "
                "This tool runs a segmentation model trained on solar imagery to "
                "highlight flare regions in an uploaded image."
            }
            p {
                "Inference happens entirely in the browser through TensorFlow.js; "
                "images never leave your machine. When the model cannot be loaded "
                "the page runs in demo mode and shows a placeholder image instead."
            }
        }
    }
}

/// Upload an image and predict its flare mask.
///
/// Acquires the model once per mount. Until it is ready, or if it
/// fails, predictions run in demo mode.
#[component]
fn UploadPage() -> Element {
    let mut workflow = use_signal(UploadWorkflow::new);
    let config = use_signal(page_config);
    let mut model = use_signal(|| Option::<Rc<TfjsModel>>::None);

    // --- Model acquisition ---
    use_future(move || async move {
        let cfg: ModelConfig = config.peek().clone();
        match TfjsModel::load(&cfg).await {
            Ok(loaded) => {
                model.set(Some(Rc::new(loaded)));
                workflow.write().model_settled(Ok(()));
            }
            Err(e) => workflow.write().model_settled(Err(&e)),
        }
    });

    // Release the current upload's object URL when leaving the page.
    use_drop(move || {
        if let Ok(state) = workflow.try_peek()
            && let Some(image) = state.image()
        {
            raster::revoke_object_url(&image.url);
        }
    });

    // --- File selection handler ---
    let on_pick = move |picked: PickedFile| {
        if !is_image_mime(&picked.mime) {
            tracing::debug!(name = %picked.name, mime = %picked.mime, "ignoring non-image file");
            return;
        }
        let url = match raster::bytes_to_object_url(&picked.bytes, &picked.mime) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "could not create object URL");
                return;
            }
        };
        let selection = workflow.write().select_image(SelectedFile {
            name: picked.name,
            mime: picked.mime,
            url,
        });
        if let Selection::Accepted {
            replaced: Some(previous),
        } = selection
        {
            raster::revoke_object_url(&previous.url);
        }
    };

    // --- Predict handler ---
    let on_predict = move |()| {
        let Some(ticket) = workflow.write().begin_predict() else {
            return;
        };
        let handle = model.peek().clone();
        let cfg = config.peek().clone();

        spawn(async move {
            // Yield so the spinner paints before inference blocks the thread.
            gloo_timers::future::TimeoutFuture::new(0).await;

            let result = run_prediction(&ticket, handle.as_deref(), &cfg).await;
            workflow.write().finish_predict(ticket, result);
        });
    };

    let state = workflow.read();

    rsx! {
        section { class: "upload",
            h1 { class: "hero-title", "Solar Flare Detector" }

            ModelInfo {
                state: state.model_state().clone(),
                status: state.status().to_owned(),
                mode: state.mode(),
            }

            div { class: "actions",
                ImagePicker { on_pick: on_pick }
                if state.image().is_some() {
                    PredictButton {
                        loading: state.is_loading(),
                        enabled: state.can_predict(),
                        on_predict: on_predict,
                    }
                }
            }

            if let Some(image) = state.image() {
                ImageDisplay {
                    image: image.clone(),
                    mask: state.mask().cloned(),
                }
            } else {
                p { class: "placeholder-text", "Upload a solar image to get started" }
            }
        }
    }
}
