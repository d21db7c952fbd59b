/// In-memory notification feed and the center that wires it to the hub and
/// the REST read-receipt endpoint.
pub mod normalize;

use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::api::NotificationApi;
use crate::http::{best_effort, ApiClient};
use crate::hub::HubConnection;
use crate::models::Notification;

/// Most-recent-first notification list shared between the hub event task and
/// any number of observers. Mutation happens behind one lock; observers get
/// whole snapshots over a watch channel instead of reaching into the list.
#[derive(Debug)]
pub struct NotificationFeed {
    entries: RwLock<Vec<Notification>>,
    tx: watch::Sender<Vec<Notification>>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        NotificationFeed {
            entries: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Normalizes a push payload and prepends each record the feed has not
    /// seen yet, one at a time in arrival order, so the last element of an
    /// array batch ends up at the front. A record whose id is already held is
    /// discarded whole. Returns the number of accepted records.
    pub async fn ingest(&self, raw: &serde_json::Value) -> usize {
        let records = normalize::normalize(raw);
        if records.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write().await;
        let mut accepted = 0;
        for record in records {
            if entries.iter().any(|n| n.id == record.id) {
                debug!("duplicate notification {} discarded", record.id);
                continue;
            }
            entries.insert(0, record);
            accepted += 1;
        }

        if accepted > 0 {
            self.tx.send_replace(entries.clone());
        }
        accepted
    }

    /// Removes one entry by id. Unknown ids are a no-op, so acknowledging
    /// twice is harmless.
    pub async fn acknowledge(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|n| n.id != id);
        let removed = entries.len() != before;
        if removed {
            self.tx.send_replace(entries.clone());
        }
        removed
    }

    /// Everything in the feed counts as unread; reads remove entries.
    pub async fn unread_count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn snapshot(&self) -> Vec<Notification> {
        self.entries.read().await.clone()
    }

    /// Watch channel carrying the current snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.tx.subscribe()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        NotificationFeed::new()
    }
}

/// Couples the feed, the hub connection, and the read-receipt endpoint into
/// the one handle an embedding keeps.
pub struct NotificationCenter {
    feed: Arc<NotificationFeed>,
    api: NotificationApi,
    hub: HubConnection,
}

impl NotificationCenter {
    pub fn new(hub_url: &str, client: ApiClient) -> Self {
        let feed = Arc::new(NotificationFeed::new());
        let hub = HubConnection::new(hub_url, client.session().clone(), feed.clone());
        NotificationCenter {
            feed,
            api: NotificationApi::new(client),
            hub,
        }
    }

    pub fn feed(&self) -> &Arc<NotificationFeed> {
        &self.feed
    }

    pub fn hub(&self) -> &HubConnection {
        &self.hub
    }

    /// Connects the hub when a token is stored; without one this is a no-op
    /// and the hub stays idle until the next call after sign-in.
    pub async fn start(&self) {
        self.hub.start().await;
    }

    /// Read receipt plus local removal. The backend call is fire-and-forget;
    /// the entry leaves the feed no matter what the server said, so the
    /// operator never re-reads a notification because the network flaked.
    pub async fn mark_read(&self, id: &str) {
        best_effort("mark notification read", self.api.mark_read(id)).await;
        self.feed.acknowledge(id).await;
    }

    pub async fn stop(&self) {
        self.hub.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_ingest_prepends_newest_first() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": "a" })).await;
        feed.ingest(&json!({ "id": "b" })).await;

        let ids: Vec<_> = feed
            .snapshot()
            .await
            .iter()
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(feed.unread_count().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_discarded() {
        let feed = NotificationFeed::new();
        assert_eq!(feed.ingest(&json!({ "id": 42, "title": "first" })).await, 1);
        assert_eq!(
            feed.ingest(&json!({ "id": 42, "title": "second" })).await,
            0
        );

        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        // the held entry wins; the duplicate never replaces it
        assert_eq!(snapshot[0].title, "first");
    }

    #[tokio::test]
    async fn test_array_batch_prepends_each_element() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": "old" })).await;
        let accepted = feed
            .ingest(&json!([{ "id": "x" }, { "id": "y" }]))
            .await;

        // each element is prepended in turn, so the batch lands reversed
        assert_eq!(accepted, 2);
        let ids: Vec<_> = feed
            .snapshot()
            .await
            .iter()
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(ids, vec!["y", "x", "old"]);
    }

    #[tokio::test]
    async fn test_duplicate_inside_one_batch() {
        let feed = NotificationFeed::new();
        let accepted = feed
            .ingest(&json!([{ "id": "dup" }, { "id": "dup" }]))
            .await;
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn test_acknowledge_removes_exactly_one_entry() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": 7 })).await;
        feed.ingest(&json!({ "id": 42 })).await;

        assert!(feed.acknowledge("42").await);
        let ids: Vec<_> = feed
            .snapshot()
            .await
            .iter()
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(ids, vec!["7"]);
        assert_eq!(feed.unread_count().await, 1);

        // unknown ids are a no-op, acknowledging twice included
        assert!(!feed.acknowledge("42").await);
        assert!(!feed.acknowledge("never-seen").await);
        assert_eq!(feed.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_event_without_id_still_lands_once() {
        let feed = NotificationFeed::new();
        let accepted = feed.ingest(&json!({ "title": "X", "message": "Y" })).await;

        assert_eq!(accepted, 1);
        assert_eq!(feed.unread_count().await, 1);
        assert!(feed.snapshot().await[0].id.starts_with("notif-"));
    }

    #[tokio::test]
    async fn test_acknowledged_id_can_return_when_pushed_again() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": 42 })).await;
        feed.acknowledge("42").await;

        assert_eq!(feed.ingest(&json!({ "id": 42 })).await, 1);
        assert_eq!(feed.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_leaves_feed_untouched() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": "keep" })).await;

        assert_eq!(feed.ingest(&json!("junk")).await, 0);
        assert_eq!(feed.ingest(&json!(null)).await, 0);
        assert_eq!(feed.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_watch_subscriber_sees_changes() {
        let feed = NotificationFeed::new();
        let mut rx = feed.subscribe();

        feed.ingest(&json!({ "id": "w-1" })).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);

        feed.acknowledge("w-1").await;
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_late_subscriber_reads_the_current_snapshot() {
        let feed = NotificationFeed::new();
        feed.ingest(&json!({ "id": "early" })).await;

        // a receiver created after the fact still starts from the live list
        let rx = feed.subscribe();
        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(rx.borrow()[0].id, "early");
    }
}
