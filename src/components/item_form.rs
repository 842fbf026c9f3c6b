//! Item Form Component
//!
//! Add and edit form. Required fields are enforced by the browser and again
//! by the controller.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wishlist_sync::{ItemDraft, WishlistItem, WriteOutcome};

use crate::context::use_app_context;

/// Form for a new item, or for `editing` when given
#[component]
pub fn ItemForm(#[prop(optional)] editing: Option<WishlistItem>) -> impl IntoView {
    let ctx = use_app_context();

    let editing_id = editing.as_ref().map(|item| item.id.clone());
    let is_edit = editing_id.is_some();
    let draft = RwSignal::new(editing.as_ref().map(ItemDraft::from_item).unwrap_or_default());
    let (submitting, set_submitting) = signal(false);
    let (problem, set_problem) = signal::<Option<String>>(None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let current = draft.get_untracked();
        let editing_id = editing_id.clone();
        set_problem.set(None);
        set_submitting.set(true);

        spawn_local(async move {
            let outcome = match editing_id {
                Some(id) => ctx.save_edit(id, current).await,
                None => ctx.add(current).await,
            };
            // The form is usually gone by now; these are no-ops then
            if let WriteOutcome::Rejected(e) = outcome {
                let _ = set_problem.try_set(Some(e.to_string()));
            }
            let _ = set_submitting.try_set(false);
        });
    };

    let text_input = move |kind: &'static str,
                           placeholder: &'static str,
                           required: bool,
                           read: fn(&ItemDraft) -> String,
                           write: fn(&mut ItemDraft, String)| {
        view! {
            <input
                type=kind
                placeholder=placeholder
                required=required
                prop:value=move || draft.with(read)
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    draft.update(|d| write(d, value));
                }
            />
        }
    };

    view! {
        <div class="item-form-panel">
            <h2>{if is_edit { "EDIT ITEM" } else { "ADD NEW ITEM" }}</h2>
            <form class="item-form" on:submit=on_submit>
                {text_input("text", "Item Name (e.g., Slim Fit Jeans)", true,
                    |d| d.name.clone(), |d, v| d.name = v)}
                {text_input("text", "Brand (e.g., Levi's)", false,
                    |d| d.brand.clone(), |d, v| d.brand = v)}
                <input
                    type="number"
                    step="any"
                    min="0"
                    placeholder="Price (e.g., 89.99)"
                    prop:value=move || draft.with(|d| d.price.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        draft.update(|d| d.price = value);
                    }
                />
                {text_input("url", "External Purchase Link (REQUIRED)", true,
                    |d| d.purchase_link.clone(), |d, v| d.purchase_link = v)}
                {text_input("url", "Image URL (Optional)", false,
                    |d| d.image_url.clone(), |d, v| d.image_url = v)}
                <textarea
                    placeholder="Description and Notes"
                    rows="4"
                    prop:value=move || draft.with(|d| d.description.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        draft.update(|d| d.description = value);
                    }
                ></textarea>

                {move || problem.get().map(|message| view! { <p class="form-problem">{message}</p> })}

                <div class="form-actions">
                    <button type="button" class="cancel-btn" on:click=move |_| ctx.close_form()>
                        "Cancel"
                    </button>
                    <button type="submit" class="submit-btn" disabled=move || submitting.get()>
                        {move || match (submitting.get(), is_edit) {
                            (true, _) => "SAVING...",
                            (false, true) => "SAVE CHANGES",
                            (false, false) => "ADD ITEM",
                        }}
                    </button>
                </div>
            </form>
        </div>
    }
}
