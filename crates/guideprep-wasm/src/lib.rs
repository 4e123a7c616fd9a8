use guideprep_core::config::Config;
use guideprep_core::ImageLoader;
use js_sys::{Function, Uint8Array};
use std::io;
use wasm_bindgen::prelude::*;

/// Preprocess a user guide. `options` mirrors the TOML config layout
/// (`{ toc: { container_id: "Nav" }, images: { scope: "document" } }`).
/// `loader(src)` must return a `Uint8Array` or throw; without it every
/// image is annotated as failed.
#[wasm_bindgen]
pub fn preprocess(html: &str, options: JsValue, loader: Option<Function>) -> Result<String, JsError> {
    let config: Config = if options.is_undefined() || options.is_null() {
        Config::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsError::new(&e.to_string()))?
    };

    let loader = JsImageLoader { callback: loader };
    guideprep_core::preprocess_with_loader(html, &config, &loader)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Encode raw bytes as a data URI, as the image inliner does.
#[wasm_bindgen(js_name = dataUri)]
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    guideprep_core::data_uri(mime_type, bytes)
}

struct JsImageLoader {
    callback: Option<Function>,
}

impl ImageLoader for JsImageLoader {
    fn load(&self, src: &str) -> io::Result<Vec<u8>> {
        let func = self
            .callback
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no image loader provided"))?;

        let result = func
            .call1(&JsValue::NULL, &JsValue::from_str(src))
            .map_err(|e| io::Error::other(js_message(&e)))?;
        if !result.is_instance_of::<Uint8Array>() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{src}: loader did not return a Uint8Array"),
            ));
        }
        Ok(Uint8Array::new(&result).to_vec())
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "image loader threw".to_string())
}
