//! Floating Add Button

use leptos::prelude::*;

use crate::context::use_app_context;

/// Opens the add form; hidden while a form is showing
#[component]
pub fn FloatingButton() -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <button class="floating-add-btn" aria-label="Add new item" on:click=move |_| ctx.open_add()>
            "+"
        </button>
    }
}
