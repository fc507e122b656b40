//! Filesystem resource backend.
//!
//! Content is stored one file per content id in a sharded directory tree so that no
//! single directory grows unbounded.

use crate::{BackendKind, Resource, ResourceBackend, StoredContent, validate_content_id};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;
use vellum_core::{CHUNK_SIZE, ContentId, ContentStream};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

/// Filesystem storage backend.
///
/// Stores content in a sharded structure keyed by the SHA-256 of the content id:
/// `{base_path}/{sha[0:2]}/{sha[2:4]}/{content_id}`
///
/// # Example Structure
///
/// ```text
/// /var/vellum/content/
/// ├── 0c/
/// │   └── 9a/
/// │       └── 5b1f6e3a-...  (bytes for id 5b1f6e3a-...)
/// └── e4/
///     └── 07/
///         └── report.pdf
/// ```
///
/// # Features
///
/// - **Atomic writes**: each write goes to a uniquely named temp file that is renamed
///   over the target, so readers see the old or the new bytes, never a mix
/// - **Streaming reads**: files are read in fixed-size chunks
/// - **Idempotent deletes**: removing a missing file succeeds
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the filesystem path for a content id.
    ///
    /// Structure: `{base}/{sha[0:2]}/{sha[2:4]}/{content_id}`
    fn path_for(&self, content_id: &ContentId) -> StorageResult<PathBuf> {
        validate_content_id(content_id)?;
        let hash = format!("{:x}", Sha256::digest(content_id.as_str().as_bytes()));
        Ok(self
            .base_path
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(content_id.as_str()))
    }

    /// Stream `body` into `temp_path`, returning the number of bytes written.
    async fn write_temp(temp_path: &Path, mut body: ContentStream) -> StorageResult<u64> {
        let mut file = tokio::fs::File::create(temp_path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        let mut length = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "{}: {}",
                    temp_path.display(),
                    e
                )))
            })?;
            length += chunk.len() as u64;
        }

        file.sync_all().await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "sync {}: {}",
                temp_path.display(),
                e
            )))
        })?;

        Ok(length)
    }
}

#[async_trait::async_trait]
impl ResourceBackend for FileSystemStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Filesystem
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        let path = self.path_for(content_id)?;

        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(content_id.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;
        let length = file.metadata().await.ok().map(|m| m.len());

        tracing::debug!(path = %path.display(), length, "Opened content file");

        let display = path.display().to_string();
        let body = futures::stream::try_unfold(file, move |mut file| {
            let display = display.clone();
            async move {
                let mut buf = vec![0u8; CHUNK_SIZE];
                match file.read(&mut buf).await {
                    Ok(0) => Ok(None),
                    Ok(read) => {
                        buf.truncate(read);
                        Ok(Some((buf, file)))
                    }
                    Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        display, e
                    )))),
                }
            }
        });

        Ok(Resource::new(content_id.clone(), length, Box::pin(body)))
    }

    #[tracing::instrument(skip(self, body))]
    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        let content_id = content_id.cloned().unwrap_or_else(ContentId::generate);
        let path = self.path_for(&content_id)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Leading dot keeps temp names out of the content id space. The name does not
        // embed the id, so the longest valid id still fits within NAME_MAX.
        let temp_path = path.with_file_name(format!(".{}.tmp", Uuid::new_v4().simple()));
        let length = match Self::write_temp(&temp_path, body).await {
            Ok(length) => length,
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))));
        }

        tracing::info!(
            content_id = %content_id,
            path = %path.display(),
            length,
            "Stored content file"
        );

        Ok(StoredContent { content_id, length })
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        let path = self.path_for(content_id)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted content file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Content file already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))),
        }
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        let path = self.path_for(content_id)?;
        tokio::fs::try_exists(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }
}
