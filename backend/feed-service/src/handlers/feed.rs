/// Feed handlers - HTTP endpoints for post operations.
///
/// Mutations take multipart bodies (`title`, `content` and an `image`
/// part that is either an uploaded file or, on update, a text field
/// carrying the previously stored path).
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CreatorSummary, PostWithCreator};
use crate::services::{storage, PostService};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedResponse {
    message: String,
    posts: Vec<PostWithCreator>,
    total_items: i64,
}

#[derive(Debug, Serialize)]
struct PostResponse {
    message: String,
    post: PostWithCreator,
}

#[derive(Debug, Serialize)]
struct CreatePostResponse {
    message: String,
    post: PostWithCreator,
    creator: CreatorSummary,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Title/content rules shared by create and update.
#[derive(Debug, Validate)]
struct PostInput {
    #[validate(length(min = 5, message = "title must be at least 5 characters"))]
    title: String,
    #[validate(length(min = 5, message = "content must be at least 5 characters"))]
    content: String,
}

/// Multipart fields collected from a create/update request.
#[derive(Debug, Default)]
struct PostForm {
    title: String,
    content: String,
    /// Path of a freshly uploaded image file, already on disk
    uploaded: Option<String>,
    /// Previously stored path submitted as a plain text `image` field
    submitted_image: Option<String>,
}

/// Get one page of the feed
/// GET /feed/posts?page=N
pub async fn get_posts(
    service: web::Data<PostService>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let feed = service.feed_page(page).await?;

    Ok(HttpResponse::Ok().json(FeedResponse {
        message: "Posts fetched successfully".to_string(),
        posts: feed.posts,
        total_items: feed.total_items,
    }))
}

/// Create a new post
/// POST /feed/post
pub async fn create_post(
    service: web::Data<PostService>,
    config: web::Data<Config>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, Path::new(&config.media.upload_dir)).await?;
    let input = validate_input(&form).await?;

    let image_url = form
        .uploaded
        .ok_or_else(|| AppError::Validation("image not provided".to_string()))?;

    let post = service
        .create_post(user_id.0, &input.title, &input.content, &image_url)
        .await?;
    let creator = post.creator.clone();

    Ok(HttpResponse::Created().json(CreatePostResponse {
        message: "Post created successfully".to_string(),
        post,
        creator,
    }))
}

/// Get a single post by id
/// GET /feed/post/{post_id}
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(PostResponse {
        message: "Post fetched successfully".to_string(),
        post,
    }))
}

/// Update a post the caller owns
/// PUT /feed/post/{post_id}
pub async fn update_post(
    service: web::Data<PostService>,
    config: web::Data<Config>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, Path::new(&config.media.upload_dir)).await?;
    let input = validate_input(&form).await?;

    // Keeps the delivered contract: a request with no usable image is a
    // 404, and it fails before any persistence write.
    let image_url = resolve_image_url(form.uploaded, form.submitted_image)
        .ok_or_else(|| AppError::NotFound("no image provided for post".to_string()))?;

    let post = service
        .update_post(user_id.0, *post_id, &input.title, &input.content, &image_url)
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse {
        message: "Post updated successfully".to_string(),
        post,
    }))
}

/// Delete a post the caller owns
/// DELETE /feed/post/{post_id}
pub async fn delete_post(
    service: web::Data<PostService>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_post(user_id.0, *post_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}

/// The image for an update is the new upload when present, else the
/// previously submitted path; empty strings resolve to nothing.
fn resolve_image_url(uploaded: Option<String>, submitted: Option<String>) -> Option<String> {
    uploaded.or(submitted).filter(|path| !path.is_empty())
}

/// Validate title/content, cleaning up an already-saved upload when the
/// request turns out to be invalid.
async fn validate_input(form: &PostForm) -> Result<PostInput> {
    let input = PostInput {
        title: form.title.trim().to_string(),
        content: form.content.trim().to_string(),
    };

    if let Err(errors) = input.validate() {
        if let Some(path) = &form.uploaded {
            storage::delete_image(path).await;
        }
        return Err(errors.into());
    }

    Ok(input)
}

async fn read_post_form(mut payload: Multipart, upload_dir: &Path) -> Result<PostForm> {
    let mut form = PostForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?;
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "title" => form.title = read_text(&mut field).await?,
            "content" => form.content = read_text(&mut field).await?,
            "image" => {
                let is_file = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .is_some();
                if is_file {
                    form.uploaded = Some(storage::save_image(upload_dir, &mut field).await?);
                } else {
                    form.submitted_image = Some(read_text(&mut field).await?);
                }
            }
            _ => drain(&mut field).await?,
        }
    }

    Ok(form)
}

async fn read_text(field: &mut Field) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data =
            chunk.map_err(|e| AppError::Validation(format!("failed to read field: {e}")))?;
        buf.extend_from_slice(&data);
    }

    String::from_utf8(buf)
        .map_err(|_| AppError::Validation("field must be valid UTF-8".to_string()))
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::Validation(format!("failed to read field: {e}")))?;
    }
    Ok(())
}
