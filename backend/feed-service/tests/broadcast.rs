//! End-to-end checks of the post event bus as handlers use it:
//! subscribe, mutate, receive the serialized frame.
use chrono::Utc;
use uuid::Uuid;

use feed_service::models::{CreatorSummary, PostWithCreator};
use feed_service::realtime::{PostBroadcaster, PostEvent};

fn post(title: &str, creator_name: &str) -> PostWithCreator {
    PostWithCreator {
        id: Uuid::new_v4(),
        title: title.to_string(),
        content: "integration test content".to_string(),
        image_url: "uploads/test.png".to_string(),
        creator: CreatorSummary {
            id: Uuid::new_v4(),
            name: creator_name.to_string(),
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn create_frame_matches_the_client_contract() {
    let bus = PostBroadcaster::new();
    let (_id, mut rx) = bus.subscribe().await;

    bus.publish(&PostEvent::Create {
        post: post("Fresh post", "ada"),
    })
    .await;

    let frame: serde_json::Value =
        serde_json::from_str(&rx.recv().await.expect("frame")).expect("valid json");

    assert_eq!(frame["action"], "create");
    assert_eq!(frame["post"]["title"], "Fresh post");
    assert_eq!(frame["post"]["creator"]["name"], "ada");
    // camelCase wire shape
    assert!(frame["post"]["imageUrl"].is_string());
    assert!(frame["post"]["createdAt"].is_string());
    assert!(frame["post"].get("image_url").is_none());
}

#[tokio::test]
async fn subscribers_see_events_published_after_they_join() {
    let bus = PostBroadcaster::new();

    bus.publish(&PostEvent::Create {
        post: post("Before join", "ada"),
    })
    .await;

    let (_id, mut rx) = bus.subscribe().await;
    bus.publish(&PostEvent::Update {
        post: post("After join", "ada"),
    })
    .await;

    let frame: serde_json::Value =
        serde_json::from_str(&rx.recv().await.expect("frame")).expect("valid json");
    assert_eq!(frame["action"], "update");
    assert_eq!(frame["post"]["title"], "After join");

    // Nothing buffered from before the subscription
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn events_fan_out_in_publish_order() {
    let bus = PostBroadcaster::new();
    let (_id, mut rx) = bus.subscribe().await;

    bus.publish(&PostEvent::Create {
        post: post("first", "ada"),
    })
    .await;
    bus.publish(&PostEvent::Update {
        post: post("second", "ada"),
    })
    .await;

    let first: serde_json::Value =
        serde_json::from_str(&rx.recv().await.expect("frame")).expect("valid json");
    let second: serde_json::Value =
        serde_json::from_str(&rx.recv().await.expect("frame")).expect("valid json");

    assert_eq!(first["action"], "create");
    assert_eq!(second["action"], "update");
}

#[tokio::test]
async fn a_closed_subscriber_does_not_break_the_rest() {
    let bus = PostBroadcaster::new();
    let (_gone_id, gone_rx) = bus.subscribe().await;
    let (_live_id, mut live_rx) = bus.subscribe().await;
    drop(gone_rx);

    bus.publish(&PostEvent::Create {
        post: post("still delivered", "ada"),
    })
    .await;

    let frame: serde_json::Value =
        serde_json::from_str(&live_rx.recv().await.expect("frame")).expect("valid json");
    assert_eq!(frame["post"]["title"], "still delivered");
    assert_eq!(bus.subscriber_count().await, 1);
}
