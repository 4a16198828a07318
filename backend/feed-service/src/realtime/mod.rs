/// Real-time broadcast of post mutations.
///
/// A process-wide registry of WebSocket subscribers on the single
/// `posts` channel. Mutating handlers publish after a successful
/// commit; delivery is fire-and-forget and decoupled from the HTTP
/// response.
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

use crate::models::PostWithCreator;

pub mod session;

/// Name of the broadcast channel mutation events go out on.
pub const POSTS_CHANNEL: &str = "posts";

/// Mutation event broadcast to connected clients.
///
/// Serializes as `{"action":"create","post":{...}}` — the shape clients
/// already consume. Deletion intentionally emits no event; the original
/// API never broadcast deletes and clients rely on that.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PostEvent {
    Create { post: PostWithCreator },
    Update { post: PostWithCreator },
}

/// Unique identifier for a WebSocket subscriber, used for precise
/// cleanup when a connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Registry of live subscribers to the `posts` channel.
#[derive(Default, Clone)]
pub struct PostBroadcaster {
    inner: Arc<RwLock<Vec<Subscriber>>>,
}

impl PostBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; returns its id and the message channel.
    pub async fn subscribe(&self) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            "added subscriber {:?} to {}, total: {}",
            subscriber_id,
            POSTS_CHANNEL,
            guard.len()
        );

        (subscriber_id, rx)
    }

    /// Remove a subscriber. Must be called when its connection closes.
    pub async fn unsubscribe(&self, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;
        guard.retain(|s| s.id != subscriber_id);
    }

    /// Publish an event to every subscriber, pruning dead senders.
    ///
    /// A bus with no subscribers is not an error.
    pub async fn publish(&self, event: &PostEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("failed to serialize post event: {}", e);
                return;
            }
        };

        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|subscriber| subscriber.sender.send(payload.clone()).is_ok());

        if guard.len() != before {
            tracing::debug!(
                "broadcast on {}: {} dead senders cleaned up, {} active",
                POSTS_CHANNEL,
                before - guard.len(),
                guard.len()
            );
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreatorSummary;
    use chrono::Utc;

    fn sample_post() -> PostWithCreator {
        PostWithCreator {
            id: Uuid::new_v4(),
            title: "First post".into(),
            content: "Hello world".into(),
            image_url: "uploads/cat.png".into(),
            creator: CreatorSummary {
                id: Uuid::new_v4(),
                name: "ada".into(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let bus = PostBroadcaster::new();
        let (_id_a, mut rx_a) = bus.subscribe().await;
        let (_id_b, mut rx_b) = bus.subscribe().await;

        bus.publish(&PostEvent::Create { post: sample_post() }).await;

        let frame_a = rx_a.recv().await.unwrap();
        let frame_b = rx_b.recv().await.unwrap();
        assert_eq!(frame_a, frame_b);

        let value: serde_json::Value = serde_json::from_str(&frame_a).unwrap();
        assert_eq!(value["action"], "create");
        assert_eq!(value["post"]["creator"]["name"], "ada");
    }

    #[tokio::test]
    async fn update_event_is_tagged_update() {
        let bus = PostBroadcaster::new();
        let (_id, mut rx) = bus.subscribe().await;

        bus.publish(&PostEvent::Update { post: sample_post() }).await;

        let value: serde_json::Value =
            serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(value["action"], "update");
        assert!(value["post"]["imageUrl"].is_string());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_fine() {
        let bus = PostBroadcaster::new();
        bus.publish(&PostEvent::Create { post: sample_post() }).await;
        assert_eq!(bus.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn unsubscribe_removes_the_subscriber() {
        let bus = PostBroadcaster::new();
        let (id, _rx) = bus.subscribe().await;
        assert_eq!(bus.subscriber_count().await, 1);

        bus.unsubscribe(id).await;
        assert_eq!(bus.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_receiver_is_pruned_on_publish() {
        let bus = PostBroadcaster::new();
        let (_id, rx) = bus.subscribe().await;
        drop(rx);

        bus.publish(&PostEvent::Create { post: sample_post() }).await;
        assert_eq!(bus.subscriber_count().await, 0);
    }
}
