//! Display Formatting
//!
//! Price labels and generated placeholder images.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use wishlist_sync::WishlistItem;

/// Where an item image is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// List grid card
    Card,
    /// Detail page
    Detail,
}

impl ImageSize {
    fn dimensions(self) -> &'static str {
        match self {
            ImageSize::Card => "300x400",
            ImageSize::Detail => "600x800",
        }
    }
}

/// Placeholder image labelled with the start of the item name
pub fn placeholder_url(name: &str, size: ImageSize) -> String {
    let label: String = name.trim().chars().take(10).collect();
    let label = if label.is_empty() { "Item".to_string() } else { label };
    format!(
        "https://placehold.co/{}/1c1917/f5f5f4?text={}",
        size.dimensions(),
        utf8_percent_encode(&label, NON_ALPHANUMERIC)
    )
}

/// The item's own image, or its placeholder
pub fn image_source(item: &WishlistItem, size: ImageSize) -> String {
    item.image()
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_url(&item.name, size))
}

/// `$12.50`, or `N/A` when no price was given
pub fn price_label(price: f64) -> String {
    if price > 0.0 {
        format!("${:.2}", price)
    } else {
        "N/A".to_string()
    }
}
