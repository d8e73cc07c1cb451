//! Image picker with drag-and-drop.
//!
//! Forwards every picked file, image or not, with its MIME type. The
//! upload workflow decides what to accept, so a non-image file is
//! ignored silently rather than reported here.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;

/// A file chosen in the picker or dropped on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// File name.
    pub name: String,
    /// MIME type reported by the browser, or guessed from the extension.
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// The MIME type the browser reported, or one guessed from the file
/// name when it reported none.
#[must_use]
pub fn resolve_mime(reported: Option<&str>, name: &str) -> String {
    match reported.map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_owned(),
        _ => mime_from_extension(name).to_owned(),
    }
}

/// Guess a MIME type from a file name's extension.
///
/// Browsers leave the content type empty for some dropped files.
#[must_use]
pub fn mime_from_extension(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map_or("", |(_, ext)| ext);
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Props for the [`ImagePicker`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImagePickerProps {
    /// Called with the first picked file.
    on_pick: EventHandler<PickedFile>,
}

/// A drop zone with a "Choose Solar Image" button.
#[component]
pub fn ImagePicker(props: ImagePickerProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut read_error = use_signal(|| Option::<String>::None);

    // Shared by the picker and drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        let mime = resolve_mime(file.content_type().as_deref(), &name);
        match file.read_bytes().await {
            Ok(bytes) => {
                read_error.set(None);
                props.on_pick.call(PickedFile {
                    name,
                    mime,
                    bytes: bytes.to_vec(),
                });
            }
            Err(e) => {
                tracing::warn!(%name, error = %e, "failed to read picked file");
                read_error.set(Some(format!("Failed to read file: {e}")));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "picker dragging"
    } else {
        "picker"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            label {
                class: "button button-primary",
                input {
                    r#type: "file",
                    accept: "image/*",
                    class: "visually-hidden",
                    onchange: handle_files,
                }
                Icon { width: 18, height: 18, icon: LdUpload }
                "Choose Solar Image"
            }

            if let Some(ref err) = read_error() {
                p { class: "error-text", "{err}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_guess_is_case_insensitive() {
        assert_eq!(mime_from_extension("SUN.PNG"), "image/png");
        assert_eq!(mime_from_extension("flare.jpeg"), "image/jpeg");
    }

    #[test]
    fn reported_type_wins_over_extension() {
        assert_eq!(resolve_mime(Some("image/avif"), "flare.avif"), "image/avif");
        assert_eq!(resolve_mime(Some("image/tiff"), "sun.tiff"), "image/tiff");
        assert_eq!(resolve_mime(Some("image/svg+xml"), "logo.svg"), "image/svg+xml");
        // A mislabelled extension does not override the browser.
        assert_eq!(resolve_mime(Some("text/plain"), "notes.png"), "text/plain");
    }

    #[test]
    fn missing_or_blank_type_falls_back_to_extension() {
        assert_eq!(resolve_mime(None, "SUN.PNG"), "image/png");
        assert_eq!(resolve_mime(Some(""), "flare.webp"), "image/webp");
        assert_eq!(resolve_mime(Some("  "), "notes.txt"), "text/plain");
        assert_eq!(resolve_mime(None, "photo.jfif"), "image/jpeg");
        assert_eq!(resolve_mime(None, "img.ico"), "image/x-icon");
        assert_eq!(resolve_mime(None, "archive.zip"), "application/octet-stream");
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(mime_from_extension("notes.txt"), "text/plain");
        assert_eq!(mime_from_extension("README"), "application/octet-stream");
        assert_eq!(mime_from_extension("archive.tar.gz"), "application/octet-stream");
    }
}
