//! Header Component
//!
//! Title, signed-in user and the persistence warning.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::AppStateStoreFields;

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    view! {
        <header class="wishlist-header">
            <h1>"PERSONAL WISHLIST"</h1>
            <p class="user-id">
                "User ID: "
                {move || store.user_id().get().unwrap_or_else(|| "not signed in".to_string())}
            </p>
            <p class="hint">"Click the + button to add an item or click an item to view/edit."</p>
            <Show when=move || !ctx.in_host_environment>
                <p class="persistence-warning">
                    "WARNING: Data will NOT be saved permanently on this host."
                </p>
            </Show>
        </header>
    }
}
