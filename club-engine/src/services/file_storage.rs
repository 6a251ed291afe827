//! Attachment storage (Hobbs photos, fuel receipts)
//!
//! Content-addressed: the file name is the SHA256 of its bytes, so uploading
//! the same photo twice yields the same reference.

use crate::core::Config;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL prefix of references handed back to callers
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("File is empty")]
    Empty,

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FileStorageError> for shared::error::AppError {
    fn from(err: FileStorageError) -> Self {
        use shared::error::{AppError, ErrorCode};
        let code = match &err {
            FileStorageError::Empty => ErrorCode::EmptyFile,
            FileStorageError::TooLarge { .. } => ErrorCode::FileTooLarge,
            FileStorageError::Io(_) => ErrorCode::FileStorageFailed,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store the bytes and return an opaque reference URL
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, FileStorageError>;
}

/// Files under a local directory, served as `/uploads/<sha256>.<ext>`
pub struct LocalFileStorage {
    dir: PathBuf,
    max_bytes: usize,
}

impl LocalFileStorage {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// `UPLOAD_DIR` + `MAX_UPLOAD_BYTES`
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.upload_dir, config.max_upload_bytes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Lower-case alphanumeric extension of the original name, `bin` otherwise
fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, FileStorageError> {
        if bytes.is_empty() {
            return Err(FileStorageError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(FileStorageError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let hash = hex::encode(Sha256::digest(bytes));
        let name = format!("{hash}.{}", extension(file_name));
        let path = self.dir.join(&name);
        let url = format!("{UPLOAD_URL_PREFIX}/{name}");

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(hash = %hash, "Upload already stored, reusing");
            return Ok(url);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        // tmp + rename, a crash never leaves a truncated file under the final name
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        tokio::fs::write(&tmp_path, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        tracing::info!(hash = %hash, size = bytes.len(), "Upload stored");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_uses_upload_limits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_work_dir(dir.path().to_string_lossy().to_string());
        config.max_upload_bytes = 4;
        let storage = LocalFileStorage::from_config(&config);
        assert_eq!(storage.dir(), config.upload_dir.as_path());

        let err = storage.store("fuel.pdf", b"12345").await.unwrap_err();
        assert!(matches!(err, FileStorageError::TooLarge { size: 5, max: 4 }));

        let url = storage.store("fuel.pdf", b"1234").await.unwrap();
        let name = url.trim_start_matches("/uploads/");
        assert!(config.upload_dir.join(name).exists());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("hobbs.JPG"), "jpg");
        assert_eq!(extension("receipt.final.pdf"), "pdf");
        assert_eq!(extension("noext"), "bin");
        assert_eq!(extension("weird.p/g"), "bin");
    }

    #[tokio::test]
    async fn test_same_bytes_same_reference() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), 1024);

        let first = storage.store("a.jpg", b"hobbs 102.5").await.unwrap();
        let second = storage.store("b.jpg", b"hobbs 102.5").await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("/uploads/"));
        assert!(first.ends_with(".jpg"));

        let name = first.trim_start_matches("/uploads/");
        let stored = tokio::fs::read(dir.path().join(name)).await.unwrap();
        assert_eq!(stored, b"hobbs 102.5");
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), 4);

        assert!(matches!(
            storage.store("a.jpg", b"").await,
            Err(FileStorageError::Empty)
        ));
        assert!(matches!(
            storage.store("a.jpg", b"12345").await,
            Err(FileStorageError::TooLarge { size: 5, max: 4 })
        ));
    }
}
