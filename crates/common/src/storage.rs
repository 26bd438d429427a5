//! Storage for uploaded registration documents.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the storage root).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: format!("{:x}", md5::compute(data)),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Build a storage key for a document field, e.g. `sellers/gstFile/1718000000000_01j...pdf`.
///
/// The client-supplied name only contributes its extension.
#[must_use]
pub fn document_key(namespace: &str, field: &str, original_name: &str) -> String {
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    format!(
        "{}/{}/{}_{}.{}",
        namespace,
        field,
        chrono::Utc::now().timestamp_millis(),
        ulid::Ulid::new().to_string().to_lowercase(),
        extension
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_keeps_extension() {
        let key = document_key("sellers", "gstFile", "GST Certificate.PDF");
        assert!(key.starts_with("sellers/gstFile/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn test_document_key_rejects_odd_extension() {
        assert!(document_key("sellers", "photoId", "scan").ends_with(".bin"));
        assert!(document_key("sellers", "photoId", "x.p/../df").ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_local_storage_upload_and_delete() {
        let dir = std::env::temp_dir().join(format!("marketplace-storage-{}", ulid::Ulid::new()));
        let storage = LocalStorage::new(dir.clone(), "/uploads/".to_string());

        let file = storage
            .upload("sellers/logo/a.png", b"png-bytes", "image/png")
            .await
            .unwrap();

        assert_eq!(file.url, "/uploads/sellers/logo/a.png");
        assert_eq!(file.size, 9);
        assert!(dir.join("sellers/logo/a.png").exists());

        storage.delete("sellers/logo/a.png").await.unwrap();
        assert!(!dir.join("sellers/logo/a.png").exists());
        // Deleting twice is fine.
        storage.delete("sellers/logo/a.png").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }
}
