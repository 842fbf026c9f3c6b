//! Application Context
//!
//! Shared handles provided via Leptos Context API: the sync controller and
//! the store, plus the user actions that tie them together.

use std::rc::Rc;

use leptos::prelude::*;
use wishlist_sync::{ItemDraft, SyncController, WriteOutcome};

use crate::store::{store_update_view, AppStore};

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Session controller (not Send, so kept in local storage)
    controller: StoredValue<Rc<SyncController>, LocalStorage>,
    pub store: AppStore,
    /// False when data may not persist on this host
    pub in_host_environment: bool,
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

/// Blocking browser confirm dialog; a missing window counts as "no"
fn browser_confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}

impl AppContext {
    pub fn new(controller: Rc<SyncController>, store: AppStore, in_host_environment: bool) -> Self {
        Self {
            controller: StoredValue::new_local(controller),
            store,
            in_host_environment,
        }
    }

    fn controller(&self) -> Rc<SyncController> {
        self.controller.get_value()
    }

    /// Stop the session; safe after the owner is gone
    pub fn teardown(&self) {
        let _ = self.controller.try_with_value(|controller| controller.teardown());
    }

    // ========================
    // Navigation
    // ========================

    pub fn select(&self, id: &str) {
        store_update_view(&self.store, |view| view.select(id));
    }

    pub fn back(&self) {
        store_update_view(&self.store, |view| view.back());
    }

    pub fn open_add(&self) {
        store_update_view(&self.store, |view| view.open_add());
    }

    pub fn open_edit(&self) {
        store_update_view(&self.store, |view| view.open_edit());
    }

    pub fn close_form(&self) {
        store_update_view(&self.store, |view| view.close_form());
    }

    // ========================
    // Writes
    // ========================

    /// Create an item; closes the form once it is applied
    pub async fn add(&self, draft: ItemDraft) -> WriteOutcome {
        let outcome = self.controller().add_item(&draft).await;
        if outcome.is_applied() {
            self.close_form();
        }
        outcome
    }

    /// Save an edit; back to the detail page once it is applied
    pub async fn save_edit(&self, id: String, draft: ItemDraft) -> WriteOutcome {
        let outcome = self.controller().edit_item(&id, &draft).await;
        match outcome {
            WriteOutcome::Saved | WriteOutcome::LocalOnly => {
                store_update_view(&self.store, |view| view.edit_saved());
            }
            WriteOutcome::Missing => self.back(),
            _ => {}
        }
        outcome
    }

    /// Ask, then delete; leaves the detail page of a removed item
    pub async fn remove(&self, id: String) -> WriteOutcome {
        let outcome = self.controller().delete_item(&id, &browser_confirm).await;
        if outcome.is_applied() || outcome == WriteOutcome::Missing {
            store_update_view(&self.store, |view| view.item_removed(&id));
        }
        outcome
    }
}
