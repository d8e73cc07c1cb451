//! TensorFlow.js bridge.
//!
//! The model runs inside the TensorFlow.js library loaded on the page
//! (the global `tf`). This module reaches it through `js_sys::Reflect`
//! rather than static bindings so a missing or blocked script surfaces
//! as an error instead of a link failure.
//!
//! Contract used:
//!
//! | call                         | purpose                      |
//! |------------------------------|------------------------------|
//! | `tf.loadLayersModel(url)`    | acquire the model (async)    |
//! | `tf.tensor(values, shape)`   | upload an input buffer       |
//! | `model.predict(x)`           | one forward pass (sync)      |
//! | `t.shape`, `t.dataSync()`    | read an output back          |
//! | `t.dispose()`                | release a JS-side buffer     |
//!
//! Every JS tensor is held by a [`JsTensor`] guard that disposes it on
//! drop, so both success and failure paths release GPU/CPU memory.

use solarmask_core::{ModelConfig, ModelError, SegmentationModel, Tensor};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

/// Render a thrown JS value as a readable message.
fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Call `target[name](...args)`.
fn call_method(target: &JsValue, name: &str, args: &js_sys::Array) -> Result<JsValue, JsValue> {
    let func: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(name))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("{name} is not a function")))?;
    js_sys::Reflect::apply(&func, target, args)
}

/// Call `target.dispose()`, logging a failure.
fn dispose(target: &JsValue, what: &str) {
    if let Err(e) = call_method(target, "dispose", &js_sys::Array::new()) {
        tracing::warn!(error = %describe(&e), "failed to dispose {what}");
    }
}

/// The `tf` global, if the library has been loaded.
fn tf_global() -> Option<JsValue> {
    let window = web_sys::window()?;
    let tf = js_sys::Reflect::get(&window, &JsValue::from_str("tf")).ok()?;
    tf.is_object().then_some(tf)
}

/// Return the `tf` global, injecting the library's `<script>` tag and
/// waiting for it when the page did not include it.
///
/// # Errors
///
/// Returns [`ModelError::Acquisition`] if the script cannot be added,
/// fails to load, or loads without defining `tf`.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn ensure_tfjs(script_url: &str) -> Result<JsValue, ModelError> {
    if let Some(tf) = tf_global() {
        return Ok(tf);
    }

    tracing::info!(url = script_url, "injecting TensorFlow.js");
    let acquisition = |what: &str, e: &JsValue| {
        ModelError::Acquisition(format!("{what}: {}", describe(e)))
    };

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| ModelError::Acquisition("no document".into()))?;
    let script = document
        .create_element("script")
        .map_err(|e| acquisition("failed to create script", &e))?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| ModelError::Acquisition("failed to cast script element".into()))?;
    script.set_src(script_url);
    script.set_async(true);

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    let head = document
        .head()
        .ok_or_else(|| ModelError::Acquisition("no document head".into()))?;
    head.append_child(&script)
        .map_err(|e| acquisition("failed to append script", &e))?;

    JsFuture::from(promise)
        .await
        .map_err(|_| ModelError::Acquisition("TensorFlow.js failed to load".into()))?;
    script.set_onload(None);
    script.set_onerror(None);

    tf_global().ok_or_else(|| {
        ModelError::Acquisition("TensorFlow.js loaded but `tf` is undefined".into())
    })
}

/// Convert a JS number to a tensor dimension.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_dimension(d: f64) -> Option<usize> {
    (d.is_finite() && d >= 0.0 && d.fract() == 0.0).then_some(d as usize)
}

#[expect(clippy::cast_precision_loss)]
fn dimension_to_js(d: usize) -> f64 {
    d as f64
}

/// A JS tensor that is disposed when dropped.
struct JsTensor(JsValue);

impl JsTensor {
    fn shape(&self) -> Result<Vec<usize>, ModelError> {
        let shape = js_sys::Reflect::get(&self.0, &JsValue::from_str("shape"))
            .map_err(|e| ModelError::Inference(describe(&e)))?;
        let shape: js_sys::Array = shape
            .dyn_into()
            .map_err(|_| ModelError::Inference("output has no shape".into()))?;
        shape
            .iter()
            .map(|dim| {
                dim.as_f64()
                    .and_then(to_dimension)
                    .ok_or_else(|| ModelError::Inference(format!("bad dimension {dim:?}")))
            })
            .collect()
    }

    fn to_vec(&self) -> Result<Vec<f32>, ModelError> {
        let data = call_method(&self.0, "dataSync", &js_sys::Array::new())
            .map_err(|e| ModelError::Inference(describe(&e)))?;
        Ok(js_sys::Float32Array::new(&data).to_vec())
    }
}

impl Drop for JsTensor {
    fn drop(&mut self) {
        dispose(&self.0, "tensor");
    }
}

/// A layers model loaded through TensorFlow.js.
pub struct TfjsModel {
    tf: JsValue,
    model: JsValue,
}

impl TfjsModel {
    /// Load the model at `config.model_url`, loading TensorFlow.js first
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Acquisition`] if the library or the model
    /// cannot be loaded.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        let tf = ensure_tfjs(&config.tfjs_script_url).await?;
        tracing::info!(url = %config.model_url, "loading model");

        let promise = call_method(
            &tf,
            "loadLayersModel",
            &js_sys::Array::of1(&JsValue::from_str(&config.model_url)),
        )
        .map_err(|e| ModelError::Acquisition(describe(&e)))?;
        let promise: js_sys::Promise = promise
            .dyn_into()
            .map_err(|_| ModelError::Acquisition("loadLayersModel did not return a promise".into()))?;
        let model = JsFuture::from(promise)
            .await
            .map_err(|e| ModelError::Acquisition(describe(&e)))?;

        Ok(Self { tf, model })
    }

    /// Number of tensors TensorFlow.js currently holds, if reported.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn live_tensors(&self) -> Option<u32> {
        let memory = call_method(&self.tf, "memory", &js_sys::Array::new()).ok()?;
        let count = js_sys::Reflect::get(&memory, &JsValue::from_str("numTensors")).ok()?;
        count.as_f64().map(|n| n as u32)
    }
}

impl SegmentationModel for TfjsModel {
    fn infer(&self, input: &Tensor) -> Result<Tensor, ModelError> {
        let inference = |e: JsValue| ModelError::Inference(describe(&e));

        let shape: js_sys::Array = input
            .shape()
            .iter()
            .map(|&d| JsValue::from_f64(dimension_to_js(d)))
            .collect();
        let values = js_sys::Float32Array::from(input.data());

        let x = JsTensor(
            call_method(&self.tf, "tensor", &js_sys::Array::of2(&values, &shape))
                .map_err(inference)?,
        );
        let y = call_method(&self.model, "predict", &js_sys::Array::of1(&x.0)).map_err(inference)?;

        if js_sys::Array::is_array(&y) {
            // Multi-output models are not supported; release every head.
            let heads: Vec<JsTensor> = js_sys::Array::from(&y).iter().map(JsTensor).collect();
            return Err(ModelError::Inference(format!(
                "model returned {} outputs, expected 1",
                heads.len()
            )));
        }
        let y = JsTensor(y);

        input.ledger().tensor(y.shape()?, y.to_vec()?)
    }
}

impl Drop for TfjsModel {
    fn drop(&mut self) {
        dispose(&self.model, "model");
    }
}
