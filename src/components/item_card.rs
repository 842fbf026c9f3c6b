//! Item Card Component
//!
//! One tile in the list grid. Clicking it opens the detail page.

use leptos::prelude::*;
use wishlist_sync::WishlistItem;

use crate::components::ItemImage;
use crate::context::use_app_context;
use crate::format::{price_label, ImageSize};

#[component]
pub fn ItemCard(item: WishlistItem) -> impl IntoView {
    let ctx = use_app_context();
    let id = item.id.clone();
    let name = item.name.clone();
    let brand = item.brand.clone().unwrap_or_default();
    let price = price_label(item.price);

    view! {
        <div class="item-card" on:click=move |_| ctx.select(&id)>
            <div class="item-card-image">
                <ItemImage item=item size=ImageSize::Card />
            </div>
            <div class="item-card-body">
                <h3 class="item-name">{name}</h3>
                <p class="item-brand">{brand}</p>
                <p class="item-price">{price}</p>
            </div>
        </div>
    }
}
