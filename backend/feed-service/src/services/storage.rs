/// Image storage on local disk.
///
/// Uploaded files land under the configured upload directory with a
/// generated name; deletion is best-effort and never fails a request.
use actix_multipart::Field;
use futures_util::StreamExt;
use std::path::Path;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Persist an uploaded image field to disk, returning the stored path.
///
/// Rejects parts that do not carry an image content type.
pub async fn save_image(upload_dir: &Path, field: &mut Field) -> Result<String> {
    let is_image = field
        .content_type()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false);
    if !is_image {
        return Err(AppError::Validation(
            "uploaded file must be an image".to_string(),
        ));
    }

    let original = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or("image");
    let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original));
    let path = upload_dir.join(&file_name);

    let mut file = fs::File::create(&path).await?;
    while let Some(chunk) = field.next().await {
        let data =
            chunk.map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        file.write_all(&data).await?;
    }
    file.flush().await?;

    Ok(path.to_string_lossy().into_owned())
}

/// Remove an image file at the given path.
///
/// A missing file is not an error; any other failure is logged and
/// swallowed so a stale file never fails the surrounding request.
pub async fn delete_image(path: &str) {
    if path.is_empty() {
        return;
    }

    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!("deleted image {}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to delete image {}: {}", path, e),
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_name("cat_photo-1.png"), "cat_photo-1.png");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("../etc/passwd"), "..-etc-passwd");
        assert_eq!(sanitize_file_name("a b/c"), "a-b-c");
    }

    #[tokio::test]
    async fn delete_image_removes_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, b"png").await.unwrap();

        delete_image(path.to_str().unwrap()).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn delete_image_tolerates_a_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        // Must not panic or error
        delete_image(path.to_str().unwrap()).await;
    }

    #[tokio::test]
    async fn delete_image_ignores_empty_paths() {
        delete_image("").await;
    }
}
