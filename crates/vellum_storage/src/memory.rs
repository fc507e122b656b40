//! In-memory resource backend.

use crate::{BackendKind, Resource, ResourceBackend, StoredContent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vellum_core::{CHUNK_SIZE, ContentId, ContentStream, collect_stream};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

/// Process-local storage backend.
///
/// Each id maps to an immutable shared buffer. A write collects the incoming stream
/// before taking the lock and then swaps the buffer in, so readers holding the
/// previous buffer keep streaming it undisturbed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<ContentId, Arc<Vec<u8>>>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Nothing stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ResourceBackend for MemoryStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        let data = self
            .entries
            .read()
            .await
            .get(content_id)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(content_id.to_string())))?;

        let length = data.len() as u64;
        let chunk_count = data.len().div_ceil(CHUNK_SIZE);
        let body = futures::stream::iter((0..chunk_count).map(move |i| {
            let start = i * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(data.len());
            Ok::<_, StorageError>(data[start..end].to_vec())
        }));

        Ok(Resource::new(content_id.clone(), Some(length), Box::pin(body)))
    }

    #[tracing::instrument(skip(self, body))]
    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        let content_id = content_id.cloned().unwrap_or_else(ContentId::generate);
        let data = collect_stream(body).await?;
        let length = data.len() as u64;

        self.entries
            .write()
            .await
            .insert(content_id.clone(), Arc::new(data));

        tracing::debug!(content_id = %content_id, length, "Stored content in memory");
        Ok(StoredContent { content_id, length })
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        let removed = self.entries.write().await.remove(content_id).is_some();
        tracing::debug!(removed, "Deleted content from memory");
        Ok(())
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        Ok(self.entries.read().await.contains_key(content_id))
    }
}
