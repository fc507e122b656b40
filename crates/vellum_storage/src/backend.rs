//! Backend trait and resource handles.

use std::fmt;
use vellum_core::{ContentId, ContentStream, collect_stream};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

/// Which storage medium a backend writes to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum BackendKind {
    /// Local filesystem
    #[display("filesystem")]
    #[serde(rename = "filesystem")]
    Filesystem,
    /// Process memory
    #[display("memory")]
    #[serde(rename = "memory")]
    Memory,
    /// HTTP object storage
    #[display("object")]
    #[serde(rename = "object")]
    ObjectStorage,
    /// Search-cluster document storage
    #[display("indexed")]
    #[serde(rename = "indexed")]
    IndexedStorage,
}

/// Open handle on stored bytes.
///
/// Owns the underlying stream; dropping the handle releases it whether or not the
/// body was read.
pub struct Resource {
    content_id: ContentId,
    length: Option<u64>,
    body: ContentStream,
}

impl Resource {
    /// Wrap an open stream.
    pub fn new(content_id: ContentId, length: Option<u64>, body: ContentStream) -> Self {
        Self {
            content_id,
            length,
            body,
        }
    }

    /// Id of the content this handle reads.
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    /// Length in bytes when the backend knows it up front.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Take the body stream.
    pub fn into_stream(self) -> ContentStream {
        self.body
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error the body stream yields.
    pub async fn into_bytes(self) -> StorageResult<Vec<u8>> {
        collect_stream(self.body).await
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("content_id", &self.content_id)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Outcome of a completed write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredContent {
    /// Id the bytes are stored under; freshly generated on first write
    pub content_id: ContentId,
    /// Number of bytes written
    pub length: u64,
}

/// Trait for pluggable byte storage.
///
/// Implementations must be safe to share across concurrent requests and are
/// responsible for whatever internal locking their medium needs.
#[async_trait::async_trait]
pub trait ResourceBackend: Send + Sync {
    /// Storage medium, for logging and capability reporting.
    fn kind(&self) -> BackendKind;

    /// Open the bytes stored under `content_id` for sequential reading.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored under the id, `Unavailable` (or another
    /// retryable kind) if the medium could not be read.
    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource>;

    /// Store `body`, replacing whatever was stored under `content_id`.
    ///
    /// With no id a new one is generated. Readers never observe a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the body stream fails or the medium rejects the write;
    /// previously stored bytes are left intact.
    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent>;

    /// Remove the bytes stored under `content_id`. Unknown ids are not an error.
    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()>;

    /// Whether bytes are stored under `content_id`.
    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool>;
}

/// Reject ids that could escape a directory or break a URL path segment.
///
/// Accepted ids are non-empty, at most 255 characters of ASCII letters, digits,
/// `-`, `_` and `.`, and do not start with `.`.
///
/// # Errors
///
/// Returns `InvalidContentId` for anything else.
pub fn validate_content_id(content_id: &ContentId) -> StorageResult<()> {
    let id = content_id.as_str();
    let valid = !id.is_empty()
        && id.len() <= 255
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidContentId(
            id.to_string(),
        )))
    }
}
