//! Uploaded media storage.
//!
//! Files land under the configured media root with UUID names, grouped by
//! collection (`products/`, `sliders/`, `users/`...). The storefront binary
//! serves the root at `/storage`, so public URLs are
//! `{storefront_url}/storage/{relative path}`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when storing media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded file has an unsupported extension.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// The upload is empty.
    #[error("empty upload")]
    Empty,
}

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Disk-backed media store.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create a media store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist an uploaded file under a collection, returning the relative
    /// path stored in the database (e.g. `products/3f2b….png`).
    ///
    /// # Errors
    ///
    /// Returns an error for empty uploads, unsupported extensions, or
    /// filesystem failures.
    pub async fn put(
        &self,
        collection: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        let extension = extension_of(original_name)
            .ok_or_else(|| MediaError::UnsupportedType(original_name.to_string()))?;

        let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
        let dir = self.root.join(collection);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        Ok(format!("{collection}/{file_name}"))
    }

    /// Delete a previously stored file; missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns filesystem errors other than not-found.
    pub async fn delete(&self, relative_path: &str) -> Result<(), MediaError> {
        // Refuse anything that escapes the media root.
        if relative_path.contains("..") || Path::new(relative_path).is_absolute() {
            tracing::warn!(path = %relative_path, "Refusing suspicious media path");
            return Ok(());
        }

        match tokio::fs::remove_file(self.root.join(relative_path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e)),
        }
    }
}

/// Validated lowercase extension of an uploaded file name.
fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("banner.webp").as_deref(), Some("webp"));
        assert_eq!(extension_of("script.exe"), None);
        assert_eq!(extension_of("no-extension"), None);
    }

    #[tokio::test]
    async fn test_put_and_delete_roundtrip() {
        let dir = std::env::temp_dir().join(format!("treggio-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir);

        let path = store.put("products", "cover.png", b"fake-png").await.unwrap();
        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".png"));
        assert!(dir.join(&path).exists());

        store.delete(&path).await.unwrap();
        assert!(!dir.join(&path).exists());

        // Deleting again is fine.
        store.delete(&path).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_put_rejects_empty_and_unsupported() {
        let dir = std::env::temp_dir().join(format!("treggio-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir);

        assert!(matches!(
            store.put("products", "cover.png", b"").await,
            Err(MediaError::Empty)
        ));
        assert!(matches!(
            store.put("products", "cover.exe", b"x").await,
            Err(MediaError::UnsupportedType(_))
        ));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_delete_refuses_traversal() {
        let dir = std::env::temp_dir().join(format!("treggio-media-{}", Uuid::new_v4()));
        let store = MediaStore::new(&dir);
        // Must not error, must not touch anything outside the root.
        store.delete("../etc/passwd").await.unwrap();
    }
}
