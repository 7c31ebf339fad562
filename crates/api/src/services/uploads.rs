//! Banner image storage on the local filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Only JPEG and PNG banners are stored.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    /// The upload had no bytes.
    #[error("empty upload")]
    Empty,
    /// Writing to disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// File extension for an accepted image content type.
#[must_use]
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// Writes uploaded banners under one directory with generated file names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The directory files are written to (and served from).
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store an image and return its generated file name.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` for anything but JPEG/PNG,
    /// `UploadError::Empty` for a zero-byte body, and `UploadError::Io` if
    /// the file can't be written.
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let extension = image_extension(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_owned()))?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "banner stored");
        Ok(file_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> UploadStore {
        UploadStore::new(std::env::temp_dir().join(format!("storekeep-uploads-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_save_png() {
        let store = temp_store();
        let name = store.save("image/png", b"\x89PNG fake").await.unwrap();

        assert!(name.ends_with(".png"));
        let written = tokio::fs::read(store.dir().join(&name)).await.unwrap();
        assert_eq!(written, b"\x89PNG fake");

        tokio::fs::remove_dir_all(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_gif() {
        let store = temp_store();
        let result = store.save("image/gif", b"GIF89a").await;
        assert!(matches!(result, Err(UploadError::UnsupportedType(t)) if t == "image/gif"));
    }

    #[tokio::test]
    async fn test_rejects_empty() {
        let store = temp_store();
        assert!(matches!(store.save("image/jpeg", b"").await, Err(UploadError::Empty)));
    }
}
