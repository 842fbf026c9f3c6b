//! Item Image Component
//!
//! Shows the item's image and swaps in a generated placeholder when there is
//! none or it fails to load.

use leptos::prelude::*;
use wishlist_sync::WishlistItem;

use crate::format::{image_source, placeholder_url, ImageSize};

#[component]
pub fn ItemImage(item: WishlistItem, size: ImageSize) -> impl IntoView {
    let placeholder = placeholder_url(&item.name, size);
    let source = image_source(&item, size);
    let (failed, set_failed) = signal(false);

    view! {
        <img
            src=move || if failed.get() { placeholder.clone() } else { source.clone() }
            alt=item.name
            // A failing placeholder only sets the flag again
            on:error=move |_| set_failed.set(true)
        />
    }
}
