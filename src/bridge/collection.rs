//! Hosted document store

use async_trait::async_trait;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wishlist_sync::gateway::SnapshotStream;
use wishlist_sync::{CollectionGateway, CollectionPath, EventStream, ItemFields, StoreError, WishlistItem};

use super::{describe, to_js, Subscription};

pub struct HostCollection;

fn unavailable(error: JsValue) -> StoreError {
    StoreError::Unavailable(describe(&error))
}

/// Decode a snapshot, skipping documents that do not parse
fn decode_snapshot(docs: JsValue) -> Result<Vec<WishlistItem>, StoreError> {
    let docs = docs
        .dyn_into::<Array>()
        .map_err(|_| StoreError::Malformed("snapshot is not an array".to_string()))?;

    let mut items = Vec::with_capacity(docs.length() as usize);
    for doc in docs.iter() {
        match serde_wasm_bindgen::from_value::<WishlistItem>(doc) {
            Ok(item) => items.push(item),
            Err(e) => log::warn!("Skipping unreadable wishlist document: {}", e),
        }
    }
    Ok(items)
}

#[async_trait(?Send)]
impl CollectionGateway for HostCollection {
    fn subscribe(&self, path: &CollectionPath) -> Result<SnapshotStream, StoreError> {
        let (sender, mut stream) = EventStream::detached();

        let on_snapshot = {
            let sender = sender.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |docs: JsValue| {
                let _ = sender.unbounded_send(decode_snapshot(docs));
            })
        };
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |error: JsValue| {
            let _ = sender.unbounded_send(Err(unavailable(error)));
        });

        let unsubscribe = super::subscribe(&path.to_string(), &on_snapshot, &on_error).map_err(unavailable)?;
        let subscription = Subscription {
            unsubscribe,
            _callbacks: vec![on_snapshot, on_error],
        };
        stream.set_cancel_hook(move || subscription.release());
        Ok(stream)
    }

    async fn insert(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError> {
        let fields = to_js(fields).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let id = super::insert(&path.to_string(), fields).await.map_err(unavailable)?;
        id.as_string()
            .ok_or_else(|| StoreError::Malformed("insert did not return a document id".to_string()))
    }

    async fn update(&self, path: &CollectionPath, id: &str, fields: &ItemFields) -> Result<(), StoreError> {
        let fields = to_js(fields).map_err(|e| StoreError::Malformed(e.to_string()))?;
        super::update(&path.to_string(), id, fields).await.map_err(unavailable)?;
        Ok(())
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        super::remove(&path.to_string(), id).await.map_err(unavailable)?;
        Ok(())
    }
}
