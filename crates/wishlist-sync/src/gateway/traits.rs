//! Gateway Contracts
//!
//! What the controller consumes from the hosted identity service and the
//! document store. The UI runs on a single cooperative event loop, so the
//! futures here are not `Send`.

use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, ItemFields, StoreError};
use super::path::CollectionPath;
use super::stream::{AuthStateStream, SnapshotStream};

/// A signed-in user as reported by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

/// Identity service: token or anonymous sign-in plus a state watcher
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Sign in with a pre-issued token
    async fn sign_in_with_token(&self, token: &str) -> Result<Identity, AuthError>;

    /// Sign in as a fresh anonymous user
    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError>;

    /// Watch sign-in state. Fires once right away with the current user.
    fn watch_auth_state(&self) -> AuthStateStream;
}

/// Document store operations on one user's collection.
///
/// The store stamps `dateAdded` on insert and `dateUpdated` on update.
#[async_trait(?Send)]
pub trait CollectionGateway {
    /// Live listener. Delivers the full collection now and after every change.
    fn subscribe(&self, path: &CollectionPath) -> Result<SnapshotStream, StoreError>;

    /// Add a document, returning its new id
    async fn insert(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError>;

    /// Partial update of an existing document
    async fn update(&self, path: &CollectionPath, id: &str, fields: &ItemFields) -> Result<(), StoreError>;

    /// Delete a document
    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError>;
}

/// Handles to an initialized backend, built once at startup and handed to
/// the controller
#[derive(Clone)]
pub struct Backend {
    pub identity: Rc<dyn IdentityProvider>,
    pub collection: Rc<dyn CollectionGateway>,
}

impl Backend {
    pub fn new(identity: Rc<dyn IdentityProvider>, collection: Rc<dyn CollectionGateway>) -> Self {
        Self { identity, collection }
    }
}
