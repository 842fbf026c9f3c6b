//! Detail Page Component
//!
//! Full view of one item with buy, edit and delete actions.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wishlist_sync::WishlistItem;

use crate::components::ItemImage;
use crate::context::use_app_context;
use crate::format::{price_label, ImageSize};

#[component]
pub fn DetailPage(item: WishlistItem) -> impl IntoView {
    let ctx = use_app_context();

    let link = item.purchase_link.clone();
    let buy_now = move |_| {
        // Opens in a new tab; the wishlist stays where it is
        if let Err(e) = window().open_with_url_and_target(&link, "_blank") {
            log::warn!("Could not open purchase link: {:?}", e);
        }
    };

    let id = item.id.clone();
    let remove = move |_| {
        let id = id.clone();
        spawn_local(async move {
            let outcome = ctx.remove(id).await;
            log::debug!("Delete finished: {:?}", outcome);
        });
    };

    let name = item.name.clone();
    let brand = item.brand.clone().unwrap_or_default();
    let description = item.description.clone().unwrap_or_default();
    let price = price_label(item.price);

    view! {
        <div class="detail-page">
            <button class="back-btn" on:click=move |_| ctx.back()>
                "← BACK TO WISHLIST"
            </button>
            <div class="detail-grid">
                <div class="detail-image">
                    <ItemImage item=item size=ImageSize::Detail />
                </div>
                <div class="detail-info">
                    <h1>{name}</h1>
                    <h2>{brand}</h2>
                    <p class="detail-price">{price}</p>
                    <h3>"DESCRIPTION / NOTES"</h3>
                    <p class="detail-description">{description}</p>
                    <div class="detail-actions">
                        <button class="buy-btn" on:click=buy_now>"BUY NOW"</button>
                    </div>
                    <div class="detail-actions">
                        <button class="edit-btn" on:click=move |_| ctx.open_edit()>"EDIT"</button>
                        <button class="delete-btn" on:click=remove>"DELETE"</button>
                    </div>
                </div>
            </div>
        </div>
    }
}
