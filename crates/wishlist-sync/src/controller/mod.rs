//! Session & Collection Sync Controller
//!
//! Owns the session lifecycle:
//!
//! ```text
//! Unauthenticated -> Authenticating -> Subscribed
//!                          |
//!                          +-> Degraded (no backend, or sign-in failed)
//! ```
//!
//! While subscribed, the collection listener is the single source of truth
//! for the item list. Writes go to the collection; when that is not possible
//! they fall back to the local list. Failures are logged and recorded in
//! `last_error`, never returned to the caller.

mod state;

#[cfg(test)]
mod tests;

use std::cell::{Cell, RefCell};
use std::future;

use futures::channel::mpsc::UnboundedSender;
use futures::channel::oneshot;
use futures::{pin_mut, select, FutureExt, StreamExt};

use crate::config::{AuthMode, SessionConfig};
use crate::domain::{
    AuthError, DraftError, InitializationError, ItemDraft, StoreError, SyncError, WishlistItem,
};
use crate::gateway::{Backend, CollectionPath, EventStream, Identity, SnapshotStream};

pub use state::{SessionPhase, SessionSnapshot};

/// Question shown before an item is deleted
pub const DELETE_PROMPT: &str = "Are you sure you want to remove this item from your wishlist?";

/// Blocking yes/no prompt
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Result of a create/edit/delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Accepted by the collection; the listener will reflect it
    Saved,
    /// Applied to the local list only
    LocalOnly,
    /// Draft failed validation; nothing changed
    Rejected(DraftError),
    /// User answered no to the confirmation
    Declined,
    /// No item with that id
    Missing,
}

impl WriteOutcome {
    /// The change is visible to the user (remotely or locally)
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Saved | WriteOutcome::LocalOnly)
    }
}

enum LoopEvent {
    Shutdown,
    Auth(Option<Option<Identity>>),
    Snapshot(Option<Result<Vec<WishlistItem>, StoreError>>),
}

/// Drives one wishlist session
pub struct SyncController {
    config: SessionConfig,
    backend: Option<Backend>,
    state: RefCell<SessionSnapshot>,
    observers: RefCell<Vec<UnboundedSender<SessionSnapshot>>>,
    shutdown: RefCell<Option<oneshot::Sender<()>>>,
    torn_down: Cell<bool>,
}

impl SyncController {
    /// Create a controller. A failed backend puts it straight into degraded mode.
    pub fn new(config: SessionConfig, backend: Result<Backend, InitializationError>) -> Self {
        let mut state = SessionSnapshot::default();
        let backend = match backend {
            Ok(backend) => Some(backend),
            Err(e) => {
                log::error!("{}; wishlist changes will not be saved", e);
                state.last_error = Some(e.into());
                None
            }
        };

        Self {
            config,
            backend,
            state: RefCell::new(state),
            observers: RefCell::new(Vec::new()),
            shutdown: RefCell::new(None),
            torn_down: Cell::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ========================
    // Lifecycle
    // ========================

    /// Run the session until `teardown()`.
    ///
    /// Signs in, keeps the collection listener bound to the current user and
    /// applies every snapshot. The auth watcher and the listener are released
    /// when this returns.
    pub async fn run(&self) {
        if self.torn_down.get() {
            return;
        }
        let Some(backend) = self.backend.clone() else {
            log::warn!("No backend available; running with a local-only wishlist");
            self.update(|s| {
                s.phase = SessionPhase::Degraded;
                s.loading = false;
            });
            return;
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        *self.shutdown.borrow_mut() = Some(shutdown_tx);
        let mut shutdown = shutdown_rx.fuse();

        self.update(|s| s.phase = SessionPhase::Authenticating);
        let mut auth_events = backend.identity.watch_auth_state();
        let mut listener: Option<SnapshotStream> = None;

        loop {
            let event = {
                let next_snapshot = next_snapshot(&mut listener).fuse();
                pin_mut!(next_snapshot);
                select! {
                    _ = shutdown => LoopEvent::Shutdown,
                    auth = auth_events.next() => LoopEvent::Auth(auth),
                    snapshot = next_snapshot => LoopEvent::Snapshot(snapshot),
                    complete => LoopEvent::Shutdown,
                }
            };

            match event {
                LoopEvent::Shutdown => break,
                LoopEvent::Auth(Some(Some(identity))) => {
                    self.bind(&backend, identity, &mut listener);
                }
                LoopEvent::Auth(Some(None)) => {
                    if let Some(mut previous) = listener.take() {
                        log::info!("Signed out; closing wishlist listener");
                        previous.cancel();
                    }
                    self.update(|s| {
                        s.phase = SessionPhase::Authenticating;
                        s.user_id = None;
                        s.items.clear();
                        s.loading = true;
                    });
                    match self.sign_in(&backend).await {
                        Ok(identity) => self.bind(&backend, identity, &mut listener),
                        Err(e) => self.sign_in_failed(e),
                    }
                }
                LoopEvent::Auth(None) => {
                    log::debug!("Auth state watcher closed");
                    if self.phase() == SessionPhase::Authenticating {
                        self.sign_in_failed(AuthError("auth state watcher closed".to_string()));
                    }
                }
                LoopEvent::Snapshot(Some(Ok(items))) => {
                    log::debug!("Snapshot with {} items", items.len());
                    self.update(|s| s.replace_items(items));
                }
                LoopEvent::Snapshot(Some(Err(e))) => {
                    log::error!("Wishlist listener failed, showing an empty list: {}", e);
                    listener = None;
                    self.update(|s| {
                        s.items.clear();
                        s.loading = false;
                        s.last_error = Some(e.into());
                    });
                }
                LoopEvent::Snapshot(None) => {
                    log::warn!("Wishlist listener closed by the backend");
                    listener = None;
                    self.update(|s| s.loading = false);
                }
            }
        }

        drop(listener);
        drop(auth_events);
        log::info!("Sync session stopped");
    }

    /// Stop `run()` and close every change stream
    pub fn teardown(&self) {
        self.torn_down.set(true);
        if let Some(shutdown) = self.shutdown.borrow_mut().take() {
            let _ = shutdown.send(());
        }
        self.observers.borrow_mut().clear();
    }

    async fn sign_in(&self, backend: &Backend) -> Result<Identity, AuthError> {
        match &self.config.auth {
            AuthMode::Token(token) => {
                log::info!("Signing in with host token");
                backend.identity.sign_in_with_token(token).await
            }
            AuthMode::Anonymous => {
                log::info!("Signing in anonymously");
                backend.identity.sign_in_anonymously().await
            }
        }
    }

    fn sign_in_failed(&self, error: AuthError) {
        log::error!("Authentication failed; continuing without live data: {}", error);
        self.update(|s| {
            s.phase = SessionPhase::Degraded;
            s.user_id = None;
            s.loading = false;
            s.last_error = Some(error.into());
        });
    }

    /// Point the listener at `identity`'s collection, cancelling the old one first
    fn bind(&self, backend: &Backend, identity: Identity, listener: &mut Option<SnapshotStream>) {
        let same_user = self.state.borrow().user_id.as_deref() == Some(identity.uid.as_str());
        if same_user && listener.is_some() {
            return;
        }
        if let Some(mut previous) = listener.take() {
            previous.cancel();
        }

        let path = CollectionPath::new(self.config.app_id.as_str(), identity.uid.as_str());
        log::info!("Signed in as {}; listening on {}", identity.uid, path);

        let failure = match backend.collection.subscribe(&path) {
            Ok(stream) => {
                *listener = Some(stream);
                None
            }
            Err(e) => {
                log::error!("Could not open wishlist listener: {}", e);
                Some(e)
            }
        };
        self.update(|s| {
            if !same_user {
                s.items.clear();
            }
            s.phase = SessionPhase::Subscribed;
            s.user_id = Some(identity.uid);
            s.loading = failure.is_none();
            if let Some(e) = failure {
                s.last_error = Some(e.into());
            }
        });
    }

    // ========================
    // Operations
    // ========================

    /// Create an item from form input
    pub async fn add_item(&self, draft: &ItemDraft) -> WriteOutcome {
        let fields = match draft.validate() {
            Ok(fields) => fields,
            Err(e) => {
                log::debug!("Add rejected: {}", e);
                return WriteOutcome::Rejected(e);
            }
        };

        let Some((backend, path)) = self.remote_target() else {
            let id = self.update(|s| s.insert_local(fields));
            log::warn!("Not connected; item {} kept locally only", id);
            return WriteOutcome::LocalOnly;
        };

        match backend.collection.insert(&path, &fields).await {
            Ok(id) => {
                log::info!("Added item {}", id);
                WriteOutcome::Saved
            }
            Err(e) => {
                log::error!("Error adding item, keeping it locally: {}", e);
                self.update(|s| {
                    s.insert_local(fields);
                    s.last_error = Some(e.into());
                });
                WriteOutcome::LocalOnly
            }
        }
    }

    /// Replace an item's editable fields
    pub async fn edit_item(&self, id: &str, draft: &ItemDraft) -> WriteOutcome {
        let fields = match draft.validate() {
            Ok(fields) => fields,
            Err(e) => {
                log::debug!("Edit of {} rejected: {}", id, e);
                return WriteOutcome::Rejected(e);
            }
        };
        if self.item(id).is_none() {
            log::warn!("Edit of unknown item {}", id);
            return WriteOutcome::Missing;
        }

        let Some((backend, path)) = self.remote_target() else {
            self.update(|s| s.edit_local(id, fields));
            log::warn!("Not connected; edit of {} kept locally only", id);
            return WriteOutcome::LocalOnly;
        };

        match backend.collection.update(&path, id, &fields).await {
            Ok(()) => {
                log::info!("Updated item {}", id);
                WriteOutcome::Saved
            }
            Err(e) => {
                log::error!("Error editing item {}, keeping the edit locally: {}", id, e);
                self.update(|s| {
                    s.edit_local(id, fields);
                    s.last_error = Some(e.into());
                });
                WriteOutcome::LocalOnly
            }
        }
    }

    /// Delete an item after the user confirms. Never blocked by backend failure.
    pub async fn delete_item(&self, id: &str, confirm: &dyn Confirm) -> WriteOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return WriteOutcome::Declined;
        }

        let Some((backend, path)) = self.remote_target() else {
            let removed = self.update(|s| s.remove_local(id));
            log::warn!("Not connected; item {} removed locally only", id);
            return if removed { WriteOutcome::LocalOnly } else { WriteOutcome::Missing };
        };

        match backend.collection.remove(&path, id).await {
            Ok(()) => {
                log::info!("Deleted item {}", id);
                WriteOutcome::Saved
            }
            Err(e) => {
                log::error!("Error deleting item {}, removing it locally: {}", id, e);
                self.update(|s| {
                    s.remove_local(id);
                    s.last_error = Some(e.into());
                });
                WriteOutcome::LocalOnly
            }
        }
    }

    /// Backend and collection path, when writes can go to the collection
    fn remote_target(&self) -> Option<(Backend, CollectionPath)> {
        let backend = self.backend.as_ref()?;
        let state = self.state.borrow();
        if state.phase != SessionPhase::Subscribed {
            return None;
        }
        let user_id = state.user_id.as_deref()?;
        Some((backend.clone(), CollectionPath::new(self.config.app_id.as_str(), user_id)))
    }

    // ========================
    // State access
    // ========================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<WishlistItem> {
        self.state.borrow().items.clone()
    }

    pub fn item(&self, id: &str) -> Option<WishlistItem> {
        self.state.borrow().item(id).cloned()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.borrow().user_id.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<SyncError> {
        self.state.borrow().last_error.clone()
    }

    /// Session snapshots: the current one right away, then one per change.
    /// Ends on `teardown()`.
    pub fn changes(&self) -> EventStream<SessionSnapshot> {
        let (sender, stream) = EventStream::detached();
        if !self.torn_down.get() {
            let _ = sender.unbounded_send(self.snapshot());
            self.observers.borrow_mut().push(sender);
        }
        stream
    }

    fn update<R>(&self, change: impl FnOnce(&mut SessionSnapshot) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.borrow_mut();
            let result = change(&mut state);
            (result, state.clone())
        };
        self.observers
            .borrow_mut()
            .retain(|observer| observer.unbounded_send(snapshot.clone()).is_ok());
        result
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn next_snapshot(
    listener: &mut Option<SnapshotStream>,
) -> Option<Result<Vec<WishlistItem>, StoreError>> {
    match listener {
        Some(stream) => stream.next().await,
        None => future::pending().await,
    }
}
