//! Database-backed checks of the feed listing and the paired writes
//! into `users.posts`. These need a running Postgres; they skip when
//! `DATABASE_URL` is not set so the rest of the suite stays
//! self-contained.
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use uuid::Uuid;

use feed_service::db::user_repo;
use feed_service::realtime::PostBroadcaster;
use feed_service::services::{PostService, ITEMS_PER_PAGE};

async fn test_pool() -> Option<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

#[tokio::test]
async fn feed_ordering_and_paired_writes_round_trip() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set, skipping persistence test");
        return;
    };
    let service = PostService::new(pool.clone(), PostBroadcaster::new());

    let email = format!("{}@example.com", Uuid::new_v4());
    let user = user_repo::create_user(&pool, &email, "ada", "stored-hash")
        .await
        .expect("create user");

    let before = service.feed_page(1).await.expect("feed").total_items;

    let mut ids = Vec::new();
    for n in 1..=5 {
        let post = service
            .create_post(
                user.id,
                &format!("post number {n}"),
                "body long enough",
                "uploads/persistence-test.png",
            )
            .await
            .expect("create post");
        ids.push(post.id);
        // created_at must strictly increase between posts
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // Page 1 is the two newest posts, newest first, with the creator
    // populated; the total counts every post in the table.
    let page = service.feed_page(1).await.expect("feed");
    assert_eq!(page.total_items, before + 5);
    assert_eq!(page.posts.len() as i64, ITEMS_PER_PAGE);
    assert_eq!(page.posts[0].id, ids[4]);
    assert_eq!(page.posts[1].id, ids[3]);
    assert_eq!(page.posts[0].creator.name, "ada");

    // The owner's posts array holds each created id exactly once, even
    // after a retried append.
    user_repo::append_post(&pool, user.id, ids[0])
        .await
        .expect("retry append");
    let owner = user_repo::find_by_id(&pool, user.id)
        .await
        .expect("find user")
        .expect("user exists");
    for id in &ids {
        assert_eq!(owner.posts.iter().filter(|p| *p == id).count(), 1);
    }

    // Deleting removes the row and the array entry together.
    service
        .delete_post(user.id, ids[4])
        .await
        .expect("delete post");
    let owner = user_repo::find_by_id(&pool, user.id)
        .await
        .expect("find user")
        .expect("user exists");
    assert!(!owner.posts.contains(&ids[4]));

    let page = service.feed_page(1).await.expect("feed");
    assert_eq!(page.total_items, before + 4);
    assert_eq!(page.posts[0].id, ids[3]);
}

#[tokio::test]
async fn far_out_pages_are_empty_not_errors() {
    let Some(pool) = test_pool().await else {
        eprintln!("DATABASE_URL not set, skipping persistence test");
        return;
    };
    let service = PostService::new(pool.clone(), PostBroadcaster::new());

    let page = service.feed_page(i64::MAX).await.expect("feed");
    assert!(page.posts.is_empty());
}
