//! Page-supplied configuration.
//!
//! A page may embed overrides for [`ModelConfig`] as JSON:
//!
//! ```html
//! <script type="application/json" id="solarmask-config">
//!   { "model_url": "https://cdn.example.org/flare/model.json" }
//! </script>
//! ```
//!
//! A missing block means defaults. An unparsable or invalid block is
//! logged and also falls back to defaults, so a typo never takes the
//! page down.

use solarmask_core::ModelConfig;

/// Id of the `<script type="application/json">` config block.
pub const CONFIG_ELEMENT_ID: &str = "solarmask-config";

/// Read the page's config block, falling back to defaults.
#[must_use]
pub fn page_config() -> ModelConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());

    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        tracing::debug!("no page config, using defaults");
        return ModelConfig::default();
    };

    match ModelConfig::from_json(&text) {
        Ok(config) => {
            tracing::info!(model_url = %config.model_url, "loaded page config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring page config");
            ModelConfig::default()
        }
    }
}
