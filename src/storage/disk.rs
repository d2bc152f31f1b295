//! Local-filesystem storage backend (portable, tokio::fs based)

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{Storage, StorageError};

/// `Storage` implementation rooted at a local directory
///
/// Entry paths are resolved relative to the root. Paths containing parent
/// components are rejected before touching the filesystem.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir));
        if escapes || path.contains('\0') {
            return Err(StorageError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    fn map_io(path: &str, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound {
                path: path.to_string(),
            }
        } else {
            StorageError::Io(err)
        }
    }
}

#[async_trait]
impl Storage for DiskStorage {
    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await.unwrap_or(false))
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let full = self.resolve(path)?;
        let data = tokio::fs::read(&full)
            .await
            .map_err(|e| Self::map_io(path, e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, path: &str, data: Bytes) -> Result<(), StorageError> {
        let full = self.resolve(path)?;

        // Create parent directory if needed
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to temp file, then atomically rename
        let temp_path = full.with_extension("tmp");
        tokio::fs::write(&temp_path, &data).await?;
        tokio::fs::rename(&temp_path, &full).await?;

        Ok(())
    }

    async fn last_modified(&self, path: &str) -> Result<i64, StorageError> {
        let full = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| Self::map_io(path, e))?;
        let modified = metadata.modified().map_err(|e| Self::map_io(path, e))?;
        let secs = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(secs)
    }

    async fn mime_type(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        if !tokio::fs::try_exists(&full).await.unwrap_or(false) {
            return Err(StorageError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(mime_guess::from_path(&full)
            .first_or_octet_stream()
            .essence_str()
            .to_string())
    }

    async fn size(&self, path: &str) -> Result<u64, StorageError> {
        let full = self.resolve(path)?;
        let metadata = tokio::fs::metadata(&full)
            .await
            .map_err(|e| Self::map_io(path, e))?;
        Ok(metadata.len())
    }
}
