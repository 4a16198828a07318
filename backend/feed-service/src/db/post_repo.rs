use crate::models::{CreatorSummary, Post, PostWithCreator};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Count all posts
pub async fn count_posts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM posts")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Fetch one page of posts, newest first, with the creator populated.
///
/// Posts whose creator row is missing are still listed (LEFT JOIN); the
/// storage layer does not enforce the reference.
pub async fn list_page(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostWithCreator>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, p.title, p.content, p.image_url, p.creator,
               p.created_at, p.updated_at,
               COALESCE(u.name, '') AS creator_name
        FROM posts p
        LEFT JOIN users u ON u.id = p.creator
        ORDER BY p.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_post_with_creator).collect())
}

/// Find a post by id
pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, image_url, creator, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Find a post by id with its creator populated
pub async fn find_post_with_creator(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Option<PostWithCreator>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT p.id, p.title, p.content, p.image_url, p.creator,
               p.created_at, p.updated_at,
               COALESCE(u.name, '') AS creator_name
        FROM posts p
        LEFT JOIN users u ON u.id = p.creator
        WHERE p.id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(row_to_post_with_creator))
}

/// Insert a new post
pub async fn insert_post(
    pool: &PgPool,
    title: &str,
    content: &str,
    image_url: &str,
    creator: Uuid,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, image_url, creator)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, content, image_url, creator, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(image_url)
    .bind(creator)
    .fetch_one(pool)
    .await
}

/// Update title, content and image of an existing post
pub async fn update_post(
    pool: &PgPool,
    post_id: Uuid,
    title: &str,
    content: &str,
    image_url: &str,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $1, content = $2, image_url = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING id, title, content, image_url, creator, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(image_url)
    .bind(post_id)
    .fetch_one(pool)
    .await
}

/// Delete a post row, returning whether a row was removed
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_post_with_creator(row: &sqlx::postgres::PgRow) -> PostWithCreator {
    PostWithCreator {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        creator: CreatorSummary {
            id: row.get("creator"),
            name: row.get("creator_name"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
