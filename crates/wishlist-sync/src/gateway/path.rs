//! Collection Path
//!
//! Per-user wishlist collections live under the application id.

use std::fmt;

/// Location of one user's wishlist collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub app_id: String,
    pub user_id: String,
}

impl CollectionPath {
    pub fn new(app_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifacts/{}/users/{}/wishlist", self.app_id, self.user_id)
    }
}
