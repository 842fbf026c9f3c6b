//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The sync
//! controller owns the data; this store mirrors its snapshots for rendering
//! and owns the view selector.

use leptos::prelude::*;
use reactive_stores::Store;
use wishlist_sync::{SessionPhase, SessionSnapshot, ViewState, WishlistItem};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Newest first, as delivered by the controller
    pub items: Vec<WishlistItem>,
    /// Signed-in user, shown in the header
    pub user_id: Option<String>,
    pub loading: bool,
    pub phase: SessionPhase,
    /// Which screen is showing
    pub view: ViewState,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Mirror a controller snapshot; leaves detail/edit if the item vanished
pub fn store_apply_snapshot(store: &AppStore, snapshot: SessionSnapshot) {
    if !snapshot.loading {
        store.view().write().reconcile(&snapshot.items);
    }
    store.items().set(snapshot.items);
    store.user_id().set(snapshot.user_id);
    store.loading().set(snapshot.loading);
    store.phase().set(snapshot.phase);
}

/// Run a view transition
pub fn store_update_view(store: &AppStore, change: impl FnOnce(&mut ViewState)) {
    change(&mut *store.view().write());
}

/// The item the detail and edit views are about (tracked)
pub fn store_selected_item(store: &AppStore) -> Option<WishlistItem> {
    let selected = store.view().with(|view| view.selected.clone())?;
    store.items().with(|items| items.iter().find(|item| item.id == selected).cloned())
}
