//! In-Memory Backend
//!
//! Process-local identity service and document store with the same observable
//! behavior as the hosted ones: the auth watcher fires immediately, listeners
//! get a snapshot on subscribe and after every write, and server timestamps
//! only move forward. Failures can be switched on to exercise degraded paths.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::channel::mpsc::UnboundedSender;

use crate::domain::{AuthError, ItemFields, StoreError, WishlistItem};
use super::path::CollectionPath;
use super::stream::{AuthStateStream, EventStream, SnapshotStream};
use super::traits::{CollectionGateway, Identity, IdentityProvider};

// ========================
// Identity
// ========================

#[derive(Default)]
struct IdentityState {
    current: Option<Identity>,
    tokens: HashMap<String, Identity>,
    watchers: Vec<UnboundedSender<Option<Identity>>>,
    failing: bool,
    refusing_watchers: bool,
    anonymous_sign_ins: u32,
    token_sign_ins: u32,
}

/// In-memory identity service
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    state: Rc<RefCell<IdentityState>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service that already holds a session for `identity`
    pub fn signed_in(identity: Identity) -> Self {
        let service = Self::new();
        service.state.borrow_mut().current = Some(identity);
        service
    }

    /// Register a token that signs in as `identity`
    pub fn accept_token(&self, token: &str, identity: Identity) {
        self.state.borrow_mut().tokens.insert(token.to_string(), identity);
    }

    /// Make every sign-in attempt fail
    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    /// Switch the active session and tell the watchers
    pub fn switch_user(&self, identity: Identity) {
        self.set_current(Some(identity));
    }

    pub fn sign_out(&self) {
        self.set_current(None);
    }

    pub fn current(&self) -> Option<Identity> {
        self.state.borrow().current.clone()
    }

    pub fn anonymous_sign_ins(&self) -> u32 {
        self.state.borrow().anonymous_sign_ins
    }

    pub fn token_sign_ins(&self) -> u32 {
        self.state.borrow().token_sign_ins
    }

    /// Watchers whose stream is still alive
    pub fn watcher_count(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.watchers.retain(|watcher| !watcher.is_closed());
        state.watchers.len()
    }

    /// Hand out auth streams that end without an event
    pub fn refuse_watchers(&self, refuse: bool) {
        self.state.borrow_mut().refusing_watchers = refuse;
    }

    fn set_current(&self, identity: Option<Identity>) {
        let mut state = self.state.borrow_mut();
        state.current = identity.clone();
        state
            .watchers
            .retain(|watcher| watcher.unbounded_send(identity.clone()).is_ok());
    }
}

#[async_trait(?Send)]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_token(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = {
            let mut state = self.state.borrow_mut();
            state.token_sign_ins += 1;
            if state.failing {
                return Err(AuthError("identity service unreachable".to_string()));
            }
            state
                .tokens
                .get(token)
                .cloned()
                .ok_or_else(|| AuthError("invalid custom token".to_string()))?
        };
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, AuthError> {
        let identity = {
            let mut state = self.state.borrow_mut();
            state.anonymous_sign_ins += 1;
            if state.failing {
                return Err(AuthError("identity service unreachable".to_string()));
            }
            Identity::new(format!("anon-{}", state.anonymous_sign_ins))
        };
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    fn watch_auth_state(&self) -> AuthStateStream {
        let (sender, stream) = EventStream::detached();
        let mut state = self.state.borrow_mut();
        if state.refusing_watchers {
            return stream;
        }
        let _ = sender.unbounded_send(state.current.clone());
        state.watchers.push(sender);
        stream
    }
}

// ========================
// Collection
// ========================

type SnapshotSender = UnboundedSender<Result<Vec<WishlistItem>, StoreError>>;

#[derive(Default)]
struct CollectionState {
    documents: HashMap<String, Vec<WishlistItem>>,
    listeners: Vec<(String, SnapshotSender)>,
    failing_writes: bool,
    failing_subscribe: bool,
    next_id: u64,
    last_stamp: Option<DateTime<Utc>>,
}

impl CollectionState {
    /// Server clock; strictly increasing across calls
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn broadcast(&mut self, key: &str) {
        let snapshot = self.documents.get(key).cloned().unwrap_or_default();
        self.listeners.retain(|(path, listener)| {
            path != key || listener.unbounded_send(Ok(snapshot.clone())).is_ok()
        });
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.failing_writes {
            Err(StoreError::Unavailable("write rejected by backend".to_string()))
        } else {
            Ok(())
        }
    }
}

/// In-memory document store
#[derive(Clone, Default)]
pub struct MemoryCollection {
    state: Rc<RefCell<CollectionState>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put documents in place as-is (ids and timestamps included)
    pub fn seed(&self, path: &CollectionPath, items: Vec<WishlistItem>) {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        state.documents.entry(key.clone()).or_default().extend(items);
        state.broadcast(&key);
    }

    /// Stored documents in insertion order
    pub fn documents(&self, path: &CollectionPath) -> Vec<WishlistItem> {
        self.state
            .borrow()
            .documents
            .get(&path.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Make insert/update/remove fail
    pub fn set_failing_writes(&self, failing: bool) {
        self.state.borrow_mut().failing_writes = failing;
    }

    /// Make new subscriptions fail
    pub fn set_failing_subscribe(&self, failing: bool) {
        self.state.borrow_mut().failing_subscribe = failing;
    }

    /// Push a listener error to everyone watching `path`
    pub fn fail_listeners(&self, path: &CollectionPath, error: StoreError) {
        let key = path.to_string();
        self.state.borrow_mut().listeners.retain(|(listened, listener)| {
            listened != &key || listener.unbounded_send(Err(error.clone())).is_ok()
        });
    }

    /// Live listeners on `path`
    pub fn listener_count(&self, path: &CollectionPath) -> usize {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        state.listeners.retain(|(_, listener)| !listener.is_closed());
        state.listeners.iter().filter(|(listened, _)| listened == &key).count()
    }
}

#[async_trait(?Send)]
impl CollectionGateway for MemoryCollection {
    fn subscribe(&self, path: &CollectionPath) -> Result<SnapshotStream, StoreError> {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        if state.failing_subscribe {
            return Err(StoreError::Unavailable("listener rejected by backend".to_string()));
        }

        let (sender, stream) = EventStream::detached();
        let snapshot = state.documents.get(&key).cloned().unwrap_or_default();
        let _ = sender.unbounded_send(Ok(snapshot));
        state.listeners.push((key, sender));
        Ok(stream)
    }

    async fn insert(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError> {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        state.check_writable()?;

        state.next_id += 1;
        let id = format!("doc-{}", state.next_id);
        let stamp = state.stamp();
        let item = WishlistItem::new(id.clone(), fields.clone(), Some(stamp));
        state.documents.entry(key.clone()).or_default().push(item);
        state.broadcast(&key);
        Ok(id)
    }

    async fn update(&self, path: &CollectionPath, id: &str, fields: &ItemFields) -> Result<(), StoreError> {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        state.check_writable()?;

        let stamp = state.stamp();
        let item = state
            .documents
            .get_mut(&key)
            .and_then(|items| items.iter_mut().find(|item| item.id == id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        item.apply(fields.clone(), stamp);
        state.broadcast(&key);
        Ok(())
    }

    async fn remove(&self, path: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let key = path.to_string();
        let mut state = self.state.borrow_mut();
        state.check_writable()?;

        // Deleting a missing document is not an error for the hosted store either
        if let Some(items) = state.documents.get_mut(&key) {
            items.retain(|item| item.id != id);
        }
        state.broadcast(&key);
        Ok(())
    }
}
