/// Post service - feed pagination, post lifecycle and ownership rules.
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::permissions;
use crate::models::{CreatorSummary, PostWithCreator};
use crate::realtime::{PostBroadcaster, PostEvent};
use crate::services::storage;

/// Fixed page size of the feed listing.
pub const ITEMS_PER_PAGE: i64 = 2;

/// Offset for a 1-based page number; pages below 1 clamp to the first,
/// and an absurdly large page saturates instead of overflowing.
pub fn page_offset(page: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(ITEMS_PER_PAGE)
}

/// One page of the feed plus the total post count.
#[derive(Debug)]
pub struct FeedPage {
    pub posts: Vec<PostWithCreator>,
    pub total_items: i64,
}

pub struct PostService {
    pool: PgPool,
    events: PostBroadcaster,
}

impl PostService {
    pub fn new(pool: PgPool, events: PostBroadcaster) -> Self {
        Self { pool, events }
    }

    /// Fetch one page of posts, newest first, with creators populated.
    pub async fn feed_page(&self, page: i64) -> Result<FeedPage> {
        let total_items = post_repo::count_posts(&self.pool).await?;
        let posts =
            post_repo::list_page(&self.pool, ITEMS_PER_PAGE, page_offset(page)).await?;

        Ok(FeedPage { posts, total_items })
    }

    /// Fetch a single post by id
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostWithCreator> {
        post_repo::find_post_with_creator(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))
    }

    /// Create a post owned by `creator_id` and broadcast it.
    ///
    /// The post insert and the append to the owner's posts list are two
    /// separate statements, not a transaction; a crash between them
    /// leaves a post whose id is missing from `users.posts`.
    pub async fn create_post(
        &self,
        creator_id: Uuid,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<PostWithCreator> {
        let post =
            post_repo::insert_post(&self.pool, title, content, image_url, creator_id).await?;

        let user = user_repo::find_by_id(&self.pool, creator_id)
            .await?
            .ok_or_else(|| {
                AppError::UnprocessableEntity("no user found for post creator".to_string())
            })?;
        user_repo::append_post(&self.pool, user.id, post.id).await?;

        let populated = PostWithCreator::from_post(
            post,
            CreatorSummary {
                id: user.id,
                name: user.name,
            },
        );

        self.events
            .publish(&PostEvent::Create {
                post: populated.clone(),
            })
            .await;

        Ok(populated)
    }

    /// Update title, content and image of a post the requester owns.
    ///
    /// Existence is checked before ownership so a missing post is a
    /// 404, never a dereference of nothing. A changed image path
    /// deletes the previous file from disk.
    pub async fn update_post(
        &self,
        requester: Uuid,
        post_id: Uuid,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<PostWithCreator> {
        let existing = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
        permissions::check_post_ownership(requester, &existing)?;

        if image_url != existing.image_url {
            storage::delete_image(&existing.image_url).await;
        }

        let updated =
            post_repo::update_post(&self.pool, post_id, title, content, image_url).await?;

        let creator_name = user_repo::find_by_id(&self.pool, updated.creator)
            .await?
            .map(|u| u.name)
            .unwrap_or_default();
        let populated = PostWithCreator::from_post(
            updated,
            CreatorSummary {
                id: existing.creator,
                name: creator_name,
            },
        );

        self.events
            .publish(&PostEvent::Update {
                post: populated.clone(),
            })
            .await;

        Ok(populated)
    }

    /// Delete a post the requester owns, its image file, and the id in
    /// the owner's posts list. No event is broadcast for deletions.
    pub async fn delete_post(&self, requester: Uuid, post_id: Uuid) -> Result<()> {
        let existing = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
        permissions::check_post_ownership(requester, &existing)?;

        storage::delete_image(&existing.image_url).await;
        post_repo::delete_post(&self.pool, post_id).await?;
        user_repo::remove_post(&self.pool, requester, post_id).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(page_offset(1), 0);
    }

    #[test]
    fn each_page_skips_two_more() {
        assert_eq!(page_offset(2), 2);
        assert_eq!(page_offset(3), 4);
        assert_eq!(page_offset(10), 18);
    }

    #[test]
    fn pages_below_one_clamp_to_the_first() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(-3), 0);
    }

    #[test]
    fn extreme_page_numbers_saturate_instead_of_overflowing() {
        // A query string can carry any i64; the offset must stay
        // non-negative so Postgres just returns an empty page.
        assert_eq!(page_offset(i64::MAX), i64::MAX);
        assert!(page_offset(i64::MAX - 1) > 0);
        assert_eq!(page_offset(i64::MIN), 0);
    }
}
