//! Host Backend Bridge
//!
//! Bindings to the glue object the host page installs as
//! `window.wishlistBackend`. It wraps the hosted identity service and
//! document store:
//!
//! - `init(config)` configures the SDK; throws when it cannot
//! - `signInWithToken(token)` / `signInAnonymously()` resolve to `{ uid }`
//! - `watchAuthState(cb)` calls `cb({ uid } | null)`, returns an unsubscribe fn
//! - `subscribe(path, onSnapshot, onError)` calls `onSnapshot` with an array of
//!   documents (`{ id, ...fields }`, timestamps as epoch milliseconds), returns
//!   an unsubscribe fn
//! - `insert(path, fields)` resolves to the new document id; the glue sets
//!   `dateAdded` to the server timestamp
//! - `update(path, id, fields)` sets `dateUpdated` the same way
//! - `remove(path, id)`

mod collection;
mod identity;

use std::rc::Rc;

use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wishlist_sync::{Backend, InitializationError, SessionConfig};

pub use collection::HostCollection;
pub use identity::HostIdentity;

const GLUE: &str = "wishlistBackend";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = init)]
    fn backend_init(config: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = signInWithToken)]
    async fn sign_in_with_token(token: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = signInAnonymously)]
    async fn sign_in_anonymously() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = watchAuthState)]
    fn watch_auth_state(on_change: &Closure<dyn FnMut(JsValue)>) -> Result<Function, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = subscribe)]
    fn subscribe(
        path: &str,
        on_snapshot: &Closure<dyn FnMut(JsValue)>,
        on_error: &Closure<dyn FnMut(JsValue)>,
    ) -> Result<Function, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = insert)]
    async fn insert(path: &str, fields: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = update)]
    async fn update(path: &str, id: &str, fields: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "wishlistBackend"], js_name = remove)]
    async fn remove(path: &str, id: &str) -> Result<JsValue, JsValue>;
}

/// Initialize the hosted services and build the backend handles
pub fn connect(config: &SessionConfig) -> Result<Backend, InitializationError> {
    let global: JsValue = js_sys::global().into();
    let glue = Reflect::get(&global, &JsValue::from_str(GLUE)).unwrap_or(JsValue::UNDEFINED);
    if !glue.is_object() {
        return Err(InitializationError(format!("window.{} is not installed", GLUE)));
    }

    let service_config = to_js(&config.service_config)
        .map_err(|e| InitializationError(format!("service configuration: {}", e)))?;
    backend_init(service_config).map_err(|e| InitializationError(describe(&e)))?;

    log::info!("Connected to the hosted backend for app {}", config.app_id);
    Ok(Backend::new(Rc::new(HostIdentity), Rc::new(HostCollection)))
}

/// Serialize with `null` for `None`; the document store rejects `undefined`
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Human-readable text for a thrown JS value
fn describe(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

/// A live host subscription: its unsubscribe fn and the callbacks it calls
struct Subscription {
    unsubscribe: Function,
    _callbacks: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl Subscription {
    /// Unsubscribe first; the callbacks must outlive the registration
    fn release(self) {
        if let Err(e) = self.unsubscribe.call0(&JsValue::NULL) {
            log::warn!("Unsubscribe failed: {}", describe(&e));
        }
    }
}
