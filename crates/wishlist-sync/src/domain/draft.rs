//! Item Drafts
//!
//! Raw form input for the add and edit forms, and its validated form.

use serde::{Deserialize, Serialize};

use super::error::DraftError;
use super::item::WishlistItem;

/// Form text exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub brand: String,
    pub price: String,
    pub purchase_link: String,
    pub image_url: String,
    pub description: String,
}

/// Validated, coerced item fields sent to the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub name: String,
    pub brand: Option<String>,
    pub price: f64,
    pub purchase_link: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl ItemDraft {
    /// Prefill a draft from an existing item (edit form)
    pub fn from_item(item: &WishlistItem) -> Self {
        Self {
            name: item.name.clone(),
            brand: item.brand.clone().unwrap_or_default(),
            price: if item.price > 0.0 { item.price.to_string() } else { String::new() },
            purchase_link: item.purchase_link.clone(),
            image_url: item.image_url.clone().unwrap_or_default(),
            description: item.description.clone().unwrap_or_default(),
        }
    }

    /// Check required fields and coerce the rest.
    ///
    /// Name and purchase link must be non-blank. Blank optional fields become
    /// `None`; price falls back to 0 when it cannot be read as a number.
    pub fn validate(&self) -> Result<ItemFields, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }
        let purchase_link = self.purchase_link.trim();
        if purchase_link.is_empty() {
            return Err(DraftError::MissingPurchaseLink);
        }

        Ok(ItemFields {
            name: name.to_string(),
            brand: optional(&self.brand),
            price: parse_price(&self.price),
            purchase_link: purchase_link.to_string(),
            image_url: optional(&self.image_url),
            description: optional(&self.description),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Lenient price parse.
///
/// Reads the longest numeric prefix (`"89.99 USD"` is 89.99, `"1e3"` is 1000).
/// Anything unreadable, non-finite or negative is 0.
pub fn parse_price(input: &str) -> f64 {
    let text = input.trim();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &text[digits_start..end] == "." {
        return 0.0;
    }
    // Optional exponent, only taken when it is complete
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => 0.0,
    }
}
