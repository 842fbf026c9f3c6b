//! Host Page Configuration
//!
//! Reads the globals an embedding host may define before the app loads.

use js_sys::{Reflect, JSON};
use wasm_bindgen::JsValue;
use wishlist_sync::HostValues;

const APP_ID: &str = "__app_id";
const SERVICE_CONFIG: &str = "__firebase_config";
const AUTH_TOKEN: &str = "__initial_auth_token";

/// Snapshot of the host globals; missing or non-string values are `None`
pub fn read_host_values() -> HostValues {
    let global: JsValue = js_sys::global().into();
    HostValues {
        app_id: read(&global, APP_ID).and_then(|v| v.as_string()),
        service_config: read(&global, SERVICE_CONFIG).and_then(json_text),
        auth_token: read(&global, AUTH_TOKEN).and_then(|v| v.as_string()),
    }
}

fn read(global: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(global, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

/// The service config is usually JSON text; an object literal is accepted too
fn json_text(value: JsValue) -> Option<String> {
    if let Some(text) = value.as_string() {
        return Some(text);
    }
    match JSON::stringify(&value) {
        Ok(text) => text.as_string(),
        Err(_) => {
            log::warn!("{} is neither text nor a plain object", SERVICE_CONFIG);
            None
        }
    }
}
