/// Ownership checks for post mutations.
///
/// Only the creator of a post may update or delete it.
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Post;

/// Check that a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> Result<(), AppError> {
    if post.creator == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "not authorized to perform this operation".to_string(),
        ))
    }
}
