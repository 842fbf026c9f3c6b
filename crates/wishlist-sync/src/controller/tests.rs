//! Sync Controller Tests
//!
//! Runs the session loop next to the test body against the in-memory backend.

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::rc::Rc;

    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use serde_json::json;

    use crate::config::{AuthMode, SessionConfig};
    use crate::controller::{SessionPhase, SyncController, WriteOutcome, DELETE_PROMPT};
    use crate::domain::{DraftError, InitializationError, ItemDraft, StoreError, SyncError, WishlistItem};
    use crate::gateway::memory::{MemoryCollection, MemoryIdentity};
    use crate::gateway::{Backend, CollectionPath, Identity};

    const APP: &str = "test-app";

    struct Harness {
        identity: MemoryIdentity,
        store: MemoryCollection,
        controller: SyncController,
    }

    impl Harness {
        fn new(auth: AuthMode) -> Self {
            Self::with_identity(MemoryIdentity::new(), auth)
        }

        fn with_identity(identity: MemoryIdentity, auth: AuthMode) -> Self {
            let store = MemoryCollection::new();
            let backend = Backend::new(Rc::new(identity.clone()), Rc::new(store.clone()));
            let controller = SyncController::new(config(auth), Ok(backend));
            Self { identity, store, controller }
        }

        fn path(&self) -> CollectionPath {
            let uid = self.controller.user_id().expect("signed in");
            CollectionPath::new(APP, uid)
        }

        /// Run `body` while the session loop is live, then tear down
        async fn drive(&self, body: impl Future<Output = ()>) {
            let body = async {
                settle().await;
                body.await;
                self.controller.teardown();
            };
            futures::join!(self.controller.run(), body);
        }
    }

    fn config(auth: AuthMode) -> SessionConfig {
        SessionConfig {
            app_id: APP.to_string(),
            auth,
            service_config: json!({}),
            in_host_environment: true,
        }
    }

    /// Let queued auth and snapshot events reach the controller
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn draft(name: &str, link: &str, price: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            purchase_link: link.to_string(),
            price: price.to_string(),
            ..Default::default()
        }
    }

    fn stored(id: &str, millis: Option<i64>) -> WishlistItem {
        let fields = draft(id, "http://x", "").validate().unwrap();
        let added = millis.map(|m| Utc.timestamp_millis_opt(m).unwrap());
        WishlistItem::new(id.to_string(), fields, added)
    }

    fn ids(controller: &SyncController) -> Vec<String> {
        controller.items().into_iter().map(|item| item.id).collect()
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    // ========================
    // Lifecycle
    // ========================

    #[tokio::test]
    async fn test_anonymous_sign_in_subscribes() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            assert_eq!(h.controller.phase(), SessionPhase::Subscribed);
            assert_eq!(h.controller.user_id().as_deref(), Some("anon-1"));
            assert!(!h.controller.is_loading());
            assert_eq!(h.store.listener_count(&h.path()), 1);
            assert_eq!(h.identity.anonymous_sign_ins(), 1);
        })
        .await;
    }

    #[tokio::test]
    async fn test_token_sign_in_when_configured() {
        let h = Harness::new(AuthMode::Token("host-token".to_string()));
        h.identity.accept_token("host-token", Identity::new("u-token"));
        h.drive(async {
            assert_eq!(h.controller.user_id().as_deref(), Some("u-token"));
            assert_eq!(h.identity.token_sign_ins(), 1);
            assert_eq!(h.identity.anonymous_sign_ins(), 0);
        })
        .await;
    }

    #[tokio::test]
    async fn test_existing_session_skips_sign_in() {
        let identity = MemoryIdentity::signed_in(Identity::new("returning"));
        let h = Harness::with_identity(identity, AuthMode::Anonymous);
        h.drive(async {
            assert_eq!(h.controller.user_id().as_deref(), Some("returning"));
            assert_eq!(h.identity.anonymous_sign_ins(), 0);
        })
        .await;
    }

    #[tokio::test]
    async fn test_sign_in_failure_degrades_without_subscribing() {
        let h = Harness::new(AuthMode::Anonymous);
        h.identity.set_failing(true);
        h.drive(async {
            assert_eq!(h.controller.phase(), SessionPhase::Degraded);
            assert!(!h.controller.is_loading());
            assert!(h.controller.items().is_empty());
            assert_eq!(h.controller.user_id(), None);
            assert_eq!(h.store.listener_count(&CollectionPath::new(APP, "anon-1")), 0);
            assert!(matches!(h.controller.last_error(), Some(SyncError::Auth(_))));
        })
        .await;
    }

    #[tokio::test]
    async fn test_closed_watcher_degrades() {
        let h = Harness::new(AuthMode::Anonymous);
        h.identity.refuse_watchers(true);
        h.drive(async {
            assert_eq!(h.controller.phase(), SessionPhase::Degraded);
            assert!(!h.controller.is_loading());
            assert_eq!(h.identity.anonymous_sign_ins(), 0);
        })
        .await;
    }

    #[tokio::test]
    async fn test_missing_backend_degrades_immediately() {
        let controller = SyncController::new(
            config(AuthMode::Anonymous),
            Err(InitializationError("no service configuration".to_string())),
        );
        controller.run().await;

        assert_eq!(controller.phase(), SessionPhase::Degraded);
        assert!(!controller.is_loading());
        assert!(matches!(controller.last_error(), Some(SyncError::Initialization(_))));
    }

    #[tokio::test]
    async fn test_user_switch_rebinds_listener() {
        let h = Harness::new(AuthMode::Anonymous);
        let other = CollectionPath::new(APP, "u-2");
        h.store.seed(&other, vec![stored("theirs", Some(10))]);

        h.drive(async {
            let first = h.path();
            h.store.seed(&first, vec![stored("mine", Some(10))]);
            settle().await;
            assert_eq!(ids(&h.controller), ["mine"]);

            h.identity.switch_user(Identity::new("u-2"));
            settle().await;

            assert_eq!(h.controller.user_id().as_deref(), Some("u-2"));
            assert_eq!(ids(&h.controller), ["theirs"]);
            assert_eq!(h.store.listener_count(&first), 0);
            assert_eq!(h.store.listener_count(&other), 1);
        })
        .await;
    }

    #[tokio::test]
    async fn test_sign_out_signs_back_in() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            let first = h.path();
            h.identity.sign_out();
            settle().await;

            assert_eq!(h.controller.user_id().as_deref(), Some("anon-2"));
            assert_eq!(h.store.listener_count(&first), 0);
            assert_eq!(h.store.listener_count(&h.path()), 1);
        })
        .await;
    }

    #[tokio::test]
    async fn test_teardown_releases_watcher_and_listener() {
        let h = Harness::new(AuthMode::Anonymous);
        let mut path = None;
        h.drive(async {
            path = Some(h.path());
            assert_eq!(h.identity.watcher_count(), 1);
        })
        .await;

        assert_eq!(h.identity.watcher_count(), 0);
        assert_eq!(h.store.listener_count(&path.unwrap()), 0);
    }

    #[tokio::test]
    async fn test_listener_error_shows_empty_list() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            let path = h.path();
            h.store.seed(&path, vec![stored("a", Some(1))]);
            settle().await;
            assert_eq!(h.controller.items().len(), 1);

            h.store.fail_listeners(&path, StoreError::Unavailable("quota".to_string()));
            settle().await;

            assert!(h.controller.items().is_empty());
            assert!(!h.controller.is_loading());
            assert!(matches!(h.controller.last_error(), Some(SyncError::Store(_))));
        })
        .await;
    }

    #[tokio::test]
    async fn test_subscribe_failure_stops_loading() {
        let h = Harness::new(AuthMode::Anonymous);
        h.store.set_failing_subscribe(true);
        h.drive(async {
            assert_eq!(h.controller.phase(), SessionPhase::Subscribed);
            assert!(!h.controller.is_loading());
            assert!(h.controller.items().is_empty());
        })
        .await;
    }

    // ========================
    // Snapshots
    // ========================

    #[tokio::test]
    async fn test_snapshot_sorted_newest_first() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(100)), stored("b", Some(200))]);
            settle().await;
            assert_eq!(ids(&h.controller), ["b", "a"]);
        })
        .await;
    }

    #[tokio::test]
    async fn test_snapshot_missing_timestamps_last() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(
                &h.path(),
                vec![stored("undated", None), stored("old", Some(5)), stored("new", Some(50))],
            );
            settle().await;
            assert_eq!(ids(&h.controller), ["new", "old", "undated"]);
        })
        .await;
    }

    #[tokio::test]
    async fn test_changes_stream_reports_session() {
        let h = Harness::new(AuthMode::Anonymous);
        let mut changes = h.controller.changes();
        h.drive(async {}).await;

        let mut seen = Vec::new();
        while let Some(snapshot) = changes.next().await {
            seen.push(snapshot);
        }
        assert!(seen[0].loading);
        let last = seen.last().unwrap();
        assert_eq!(last.phase, SessionPhase::Subscribed);
        assert!(!last.loading);
    }

    // ========================
    // Add
    // ========================

    #[tokio::test]
    async fn test_add_lands_at_head() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(100)), stored("b", Some(200))]);
            settle().await;

            let outcome = h.controller.add_item(&draft("Shoes", "http://x", "59.90")).await;
            settle().await;

            assert_eq!(outcome, WriteOutcome::Saved);
            let items = h.controller.items();
            assert_eq!(items.len(), 3);
            assert_eq!(items[0].name, "Shoes");
            assert_eq!(items[0].price, 59.9);
            assert!(items[0].date_added.is_some());
        })
        .await;
    }

    #[tokio::test]
    async fn test_add_rejects_missing_name_or_link() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            let before = h.controller.items().len();

            let no_name = h.controller.add_item(&draft("", "http://x", "1")).await;
            let no_link = h.controller.add_item(&draft("Shoes", "", "1")).await;
            settle().await;

            assert_eq!(no_name, WriteOutcome::Rejected(DraftError::MissingName));
            assert_eq!(no_link, WriteOutcome::Rejected(DraftError::MissingPurchaseLink));
            assert_eq!(h.controller.items().len(), before);
            assert!(h.store.documents(&h.path()).is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn test_add_failure_keeps_item_locally() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.set_failing_writes(true);
            let outcome = h.controller.add_item(&draft("Shoes", "http://x", "")).await;

            assert_eq!(outcome, WriteOutcome::LocalOnly);
            let items = h.controller.items();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "Shoes");
            assert!(items[0].id.parse::<i64>().is_ok());
            assert!(matches!(h.controller.last_error(), Some(SyncError::Store(_))));
        })
        .await;
    }

    #[tokio::test]
    async fn test_degraded_adds_stack_at_head() {
        let controller = SyncController::new(
            config(AuthMode::Anonymous),
            Err(InitializationError("offline".to_string())),
        );
        controller.run().await;

        controller.add_item(&draft("first", "http://x", "")).await;
        let outcome = controller.add_item(&draft("second", "http://x", "")).await;

        assert_eq!(outcome, WriteOutcome::LocalOnly);
        let items = controller.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "second");
        assert_ne!(items[0].id, items[1].id);
    }

    // ========================
    // Edit
    // ========================

    #[tokio::test]
    async fn test_edit_round_trip() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.controller.add_item(&draft("Jeans", "http://shop", "40")).await;
            settle().await;
            let id = h.controller.items()[0].id.clone();

            let mut changed = draft("Slim Jeans", "http://shop/slim", "not a price");
            changed.brand = "Levi's".to_string();
            let outcome = h.controller.edit_item(&id, &changed).await;
            settle().await;

            assert_eq!(outcome, WriteOutcome::Saved);
            let item = h.controller.item(&id).unwrap();
            assert_eq!(item.name, "Slim Jeans");
            assert_eq!(item.brand.as_deref(), Some("Levi's"));
            assert_eq!(item.purchase_link, "http://shop/slim");
            assert_eq!(item.price, 0.0);
            assert!(item.date_updated.unwrap() > item.date_added.unwrap());
        })
        .await;
    }

    #[tokio::test]
    async fn test_edit_failure_mirrors_locally() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(100))]);
            settle().await;
            h.store.set_failing_writes(true);

            let outcome = h.controller.edit_item("a", &draft("Renamed", "http://x", "12")).await;

            assert_eq!(outcome, WriteOutcome::LocalOnly);
            let item = h.controller.item("a").unwrap();
            assert_eq!(item.name, "Renamed");
            assert_eq!(item.price, 12.0);
            assert!(item.date_updated.unwrap() > item.date_added.unwrap());
        })
        .await;
    }

    #[tokio::test]
    async fn test_edit_unknown_or_invalid() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(100))]);
            settle().await;

            let missing = h.controller.edit_item("zzz", &draft("x", "http://x", "")).await;
            let invalid = h.controller.edit_item("a", &draft("", "http://x", "")).await;

            assert_eq!(missing, WriteOutcome::Missing);
            assert_eq!(invalid, WriteOutcome::Rejected(DraftError::MissingName));
            assert_eq!(h.controller.item("a").unwrap().name, "a");
        })
        .await;
    }

    // ========================
    // Delete
    // ========================

    #[tokio::test]
    async fn test_delete_declined_keeps_list() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(1)), stored("b", Some(2))]);
            settle().await;

            let outcome = h.controller.delete_item("a", &no).await;
            settle().await;

            assert_eq!(outcome, WriteOutcome::Declined);
            assert_eq!(ids(&h.controller), ["b", "a"]);
            assert_eq!(h.store.documents(&h.path()).len(), 2);
        })
        .await;
    }

    #[tokio::test]
    async fn test_delete_confirmed_removes_only_match() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(
                &h.path(),
                vec![stored("a", Some(1)), stored("b", Some(2)), stored("c", Some(3))],
            );
            settle().await;

            let asked = std::cell::RefCell::new(String::new());
            let confirm = |message: &str| {
                *asked.borrow_mut() = message.to_string();
                true
            };
            let outcome = h.controller.delete_item("b", &confirm).await;
            settle().await;

            assert_eq!(outcome, WriteOutcome::Saved);
            assert_eq!(asked.borrow().as_str(), DELETE_PROMPT);
            assert_eq!(ids(&h.controller), ["c", "a"]);
        })
        .await;
    }

    #[tokio::test]
    async fn test_delete_failure_still_removes_locally() {
        let h = Harness::new(AuthMode::Anonymous);
        h.drive(async {
            h.store.seed(&h.path(), vec![stored("a", Some(1)), stored("b", Some(2))]);
            settle().await;
            h.store.set_failing_writes(true);

            let outcome = h.controller.delete_item("a", &yes).await;

            assert_eq!(outcome, WriteOutcome::LocalOnly);
            assert_eq!(ids(&h.controller), ["b"]);
            assert_eq!(h.store.documents(&h.path()).len(), 2);
        })
        .await;
    }

    #[tokio::test]
    async fn test_degraded_delete_filters_locally() {
        let controller = SyncController::new(
            config(AuthMode::Anonymous),
            Err(InitializationError("offline".to_string())),
        );
        controller.run().await;
        controller.add_item(&draft("keep", "http://x", "")).await;
        controller.add_item(&draft("drop", "http://x", "")).await;
        let id = controller.items()[0].id.clone();

        assert_eq!(controller.delete_item(&id, &no).await, WriteOutcome::Declined);
        assert_eq!(controller.delete_item(&id, &yes).await, WriteOutcome::LocalOnly);
        assert_eq!(controller.delete_item(&id, &yes).await, WriteOutcome::Missing);

        let names: Vec<_> = controller.items().into_iter().map(|item| item.name).collect();
        assert_eq!(names, ["keep"]);
    }
}
