//! Hosted identity service

use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wishlist_sync::gateway::AuthStateStream;
use wishlist_sync::{AuthError, EventStream, Identity, IdentityProvider};

use super::{describe, Subscription};

pub struct HostIdentity;

fn to_identity(user: JsValue) -> Result<Identity, AuthError> {
    serde_wasm_bindgen::from_value(user).map_err(|e| AuthError(format!("unreadable user: {}", e)))
}

#[async_trait(?Send)]
impl IdentityProvider for HostIdentity {
    async fn sign_in_with_token(&self, token: &str) -> Result<Identity, AuthError> {
        let user = super::sign_in_with_token(token)
            .await
            .map_err(|e| AuthError(describe(&e)))?;
        to_identity(user)
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let user = super::sign_in_anonymously()
            .await
            .map_err(|e| AuthError(describe(&e)))?;
        to_identity(user)
    }

    fn watch_auth_state(&self) -> AuthStateStream {
        let (sender, mut stream) = EventStream::detached();

        let on_change = Closure::<dyn FnMut(JsValue)>::new(move |user: JsValue| {
            let identity = if user.is_null() || user.is_undefined() {
                None
            } else {
                match to_identity(user) {
                    Ok(identity) => Some(identity),
                    Err(e) => {
                        log::warn!("Ignoring auth state change: {}", e);
                        return;
                    }
                }
            };
            let _ = sender.unbounded_send(identity);
        });

        match super::watch_auth_state(&on_change) {
            Ok(unsubscribe) => {
                let subscription = Subscription { unsubscribe, _callbacks: vec![on_change] };
                stream.set_cancel_hook(move || subscription.release());
            }
            Err(e) => {
                // Without a watcher the session never signs in; end the stream
                log::error!("Could not watch auth state: {}", describe(&e));
                stream.cancel();
            }
        }
        stream
    }
}
