/// Data models for the feed service.
///
/// Response types serialize in camelCase to preserve the wire contract
/// the frontend already depends on (`imageUrl`, `createdAt`, ...).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user-authored content item owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    /// Owning user id. Not enforced by the storage layer; the paired
    /// write into `users.posts` keeps the two sides consistent.
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account record. Users are created through signup only; the feed
/// endpoints never delete them.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    /// Ids of the posts this user owns, appended on create and removed
    /// on delete.
    pub posts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Minimal creator view embedded in feed responses and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: Uuid,
    pub name: String,
}

/// A post with its creator populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithCreator {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: CreatorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostWithCreator {
    pub fn from_post(post: Post, creator: CreatorSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_in_camel_case() {
        let post = Post {
            id: Uuid::new_v4(),
            title: "First post".into(),
            content: "Hello world".into(),
            image_url: "uploads/cat.png".into(),
            creator: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn populated_post_nests_creator_summary() {
        let creator = CreatorSummary {
            id: Uuid::new_v4(),
            name: "ada".into(),
        };
        let post = Post {
            id: Uuid::new_v4(),
            title: "First post".into(),
            content: "Hello world".into(),
            image_url: "uploads/cat.png".into(),
            creator: creator.id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let populated = PostWithCreator::from_post(post, creator.clone());
        let json = serde_json::to_value(&populated).unwrap();
        assert_eq!(json["creator"]["name"], "ada");
        assert_eq!(json["creator"]["id"], serde_json::json!(creator.id));
    }
}
