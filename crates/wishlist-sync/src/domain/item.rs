//! Wishlist Item Entity
//!
//! One document in a user's wishlist collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::draft::ItemFields;

/// A wishlist entry as stored in the user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Document id, assigned by the store (or synthesized locally)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Non-negative price, 0 when unknown
    #[serde(default)]
    pub price: f64,
    pub purchase_link: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Server timestamp set on creation
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date_added: Option<DateTime<Utc>>,
    /// Server timestamp set on every edit
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub date_updated: Option<DateTime<Utc>>,
}

impl WishlistItem {
    /// Build an item from validated fields
    pub fn new(id: String, fields: ItemFields, date_added: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            name: fields.name,
            brand: fields.brand,
            price: fields.price,
            purchase_link: fields.purchase_link,
            image_url: fields.image_url,
            description: fields.description,
            date_added,
            date_updated: None,
        }
    }

    /// Overwrite the editable fields, keeping identity and creation time
    pub fn apply(&mut self, fields: ItemFields, date_updated: DateTime<Utc>) {
        self.name = fields.name;
        self.brand = fields.brand;
        self.price = fields.price;
        self.purchase_link = fields.purchase_link;
        self.image_url = fields.image_url;
        self.description = fields.description;
        self.date_updated = Some(date_updated);
    }

    /// Image URL if one was given (blank strings from older documents count as absent)
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Newest first; items without a creation timestamp go last.
///
/// Stable, so items sharing a timestamp keep their relative order.
pub fn sort_newest_first(items: &mut [WishlistItem]) {
    // `None < Some(_)`, so comparing b to a puts missing timestamps at the end
    items.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}
