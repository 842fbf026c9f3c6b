//! Domain Layer
//!
//! Wishlist entities, form drafts and the error taxonomy.
//! No I/O lives here.

mod draft;
mod error;
mod item;

pub use draft::{parse_price, ItemDraft, ItemFields};
pub use error::{AuthError, DraftError, InitializationError, StoreError, SyncError};
pub use item::{sort_newest_first, WishlistItem};
