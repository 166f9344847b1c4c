/// Conversions across the JS boundary
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

use crate::error::HostError;

/// Serialize to plain JS objects. Maps become objects rather than ES `Map`s,
/// which `chrome.*` APIs and structured clone expect.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, HostError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HostError::Serialization(e.to_string()))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, HostError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| HostError::Serialization(e.to_string()))
}

/// `null` and `undefined` both mean "nothing there"
pub fn is_nullish(value: &JsValue) -> bool {
    value.is_null() || value.is_undefined()
}

/// Best-effort text for a rejected promise value
pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
