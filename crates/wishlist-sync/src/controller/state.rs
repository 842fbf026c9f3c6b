//! Session State
//!
//! The controller's in-memory view of the session: lifecycle phase, the
//! signed-in user and the derived item cache.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{sort_newest_first, ItemFields, SyncError, WishlistItem};

/// Lifecycle phase of the sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Unauthenticated,
    Authenticating,
    /// Signed in; the collection listener owns the item list
    Subscribed,
    /// No backend or no identity; writes only touch the local list
    Degraded,
}

/// Everything the UI needs to render the session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub user_id: Option<String>,
    /// Newest first
    pub items: Vec<WishlistItem>,
    pub loading: bool,
    /// Most recent absorbed backend failure
    pub last_error: Option<SyncError>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            user_id: None,
            items: Vec::new(),
            loading: true,
            last_error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn item(&self, id: &str) -> Option<&WishlistItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Full replace from a listener snapshot
    pub(crate) fn replace_items(&mut self, mut items: Vec<WishlistItem>) {
        sort_newest_first(&mut items);
        self.items = items;
        self.loading = false;
    }

    /// Local-only create. Returns the synthesized id.
    ///
    /// The stamp never falls behind the newest item, so the new entry is the
    /// head of the sorted list.
    pub(crate) fn insert_local(&mut self, fields: ItemFields) -> String {
        let newest = self.items.iter().filter_map(|item| item.date_added).max();
        let stamp = not_before(Utc::now(), newest);

        let mut token = stamp.timestamp_millis();
        while self.item(&token.to_string()).is_some() {
            token += 1;
        }
        let id = token.to_string();

        self.items.insert(0, WishlistItem::new(id.clone(), fields, Some(stamp)));
        id
    }

    /// Local-only edit. False when the item is not in the list.
    pub(crate) fn edit_local(&mut self, id: &str, fields: ItemFields) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                let stamp = not_before(Utc::now(), item.date_added);
                item.apply(fields, stamp);
                true
            }
            None => false,
        }
    }

    /// Local-only delete. False when nothing matched.
    pub(crate) fn remove_local(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}

/// `now`, or one millisecond past `floor` when the clock is behind it
fn not_before(now: DateTime<Utc>, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match floor {
        Some(floor) if now <= floor => floor + Duration::milliseconds(1),
        _ => now,
    }
}
