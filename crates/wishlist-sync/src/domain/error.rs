//! Error Taxonomy
//!
//! Every failure is caught where it happens, logged, and turned into a state
//! transition. These types only travel as far as the log and `last_error`.

use thiserror::Error;

/// The hosted backend could not be constructed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backend failed to initialize: {0}")]
pub struct InitializationError(pub String);

/// Token or anonymous sign-in failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sign-in failed: {0}")]
pub struct AuthError(pub String);

/// A subscribe/insert/update/delete call against the collection failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed document data: {0}")]
    Malformed(String),
}

/// Rejection reasons for add/edit form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("item name is required")]
    MissingName,
    #[error("purchase link is required")]
    MissingPurchaseLink,
}

/// Any backend failure the controller has absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
