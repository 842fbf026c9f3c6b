//! Wishlist Frontend App
//!
//! Builds the session from the host configuration, keeps the store in step
//! with the controller and switches between the list, detail and form views.

use std::rc::Rc;

use futures::StreamExt;
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use wishlist_sync::{SessionConfig, SyncController, ViewMode};

use crate::bridge;
use crate::components::{DetailPage, FloatingButton, Header, ItemCard, ItemForm};
use crate::config;
use crate::context::AppContext;
use crate::store::{store_apply_snapshot, store_selected_item, AppState, AppStateStoreFields};

#[component]
pub fn App() -> impl IntoView {
    let config = SessionConfig::from_host(config::read_host_values());
    let in_host_environment = config.in_host_environment;
    if !in_host_environment {
        log::warn!("No host app id; wishlist data will not be saved permanently");
    }
    let backend = bridge::connect(&config);
    let controller = Rc::new(SyncController::new(config, backend));

    let store = Store::new(AppState::new());
    provide_context(store);
    let ctx = AppContext::new(controller.clone(), store, in_host_environment);
    provide_context(ctx);

    // Mirror every controller snapshot into the store
    let mut changes = controller.changes();
    spawn_local(async move {
        while let Some(snapshot) = changes.next().await {
            store_apply_snapshot(&store, snapshot);
        }
    });
    spawn_local(async move { controller.run().await });

    on_cleanup(move || ctx.teardown());

    view! {
        <Show
            when=move || !store.loading().get()
            fallback=|| view! { <div class="loading-screen">"Loading Wishlist..."</div> }
        >
            <div class="wishlist-app">
                <Header />
                <main class="wishlist-content">
                    {move || match store.view().get().mode {
                        ViewMode::List => view! { <ItemGrid /> }.into_any(),
                        ViewMode::Detail => store_selected_item(&store)
                            .map(|item| view! { <DetailPage item=item /> })
                            .into_any(),
                        ViewMode::Add => view! { <ItemForm /> }.into_any(),
                        ViewMode::Edit => store_selected_item(&store)
                            .map(|item| view! { <ItemForm editing=item /> })
                            .into_any(),
                    }}
                </main>
                <Show when=move || store.view().get().shows_add_control()>
                    <FloatingButton />
                </Show>
            </div>
        </Show>
    }
}

/// List view: one card per item, newest first
#[component]
fn ItemGrid() -> impl IntoView {
    let store = crate::store::use_app_store();

    view! {
        <div class="item-grid">
            <Show
                when=move || !store.items().get().is_empty()
                fallback=|| view! {
                    <p class="empty-message">
                        "Your wishlist is empty! Add some items using the '+' button."
                    </p>
                }
            >
                <For
                    each=move || store.items().get()
                    key=|item| (item.id.clone(), item.date_updated)
                    let:item
                >
                    <ItemCard item=item />
                </For>
            </Show>
        </div>
    }
}
