//! Wishlist Sync Core
//!
//! Layered like the rest of the app:
//! - domain: wishlist items, form drafts, error taxonomy
//! - gateway: identity and collection contracts, event streams, in-memory backend
//! - controller: session lifecycle and the in-memory item cache
//! - view: list/detail/add/edit view selector

pub mod config;
pub mod controller;
pub mod domain;
pub mod gateway;
pub mod view;

pub use config::{AuthMode, HostValues, SessionConfig};
pub use controller::{Confirm, SessionPhase, SessionSnapshot, SyncController, WriteOutcome};
pub use domain::{
    AuthError, DraftError, InitializationError, ItemDraft, ItemFields, StoreError, SyncError,
    WishlistItem,
};
pub use gateway::{Backend, CollectionGateway, CollectionPath, EventStream, Identity, IdentityProvider};
pub use view::{ViewMode, ViewState};
