//! Indexed document-store resource backend.

use crate::http::{build_client, default_timeout_secs, status_error, transport_error};
use crate::{BackendKind, Resource, ResourceBackend, StoredContent, validate_content_id};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vellum_core::{CHUNK_SIZE, ContentId, ContentStream};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

/// Connection settings for an indexed document store.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct IndexedStorageConfig {
    /// Base URL of the search cluster
    endpoint: String,
    /// Index holding one document per content id
    index: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,
    /// Decoded bytes per chunk document
    #[serde(default = "default_chunk_bytes")]
    #[builder(default = "default_chunk_bytes()")]
    chunk_bytes: usize,
}

fn default_chunk_bytes() -> usize {
    CHUNK_SIZE
}

impl IndexedStorageConfig {
    /// Creates a new config builder.
    pub fn builder() -> IndexedStorageConfigBuilder {
        IndexedStorageConfigBuilder::default()
    }
}

/// Manifest document, stored under the content id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    content_id: String,
    length: u64,
    chunks: u64,
    generation: String,
}

/// One base64-encoded slice of a write generation.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkDocument {
    content_id: String,
    generation: String,
    index: u64,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct GetDocumentResponse<T> {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<T>,
}

/// Backend storing content as documents in a search index.
///
/// Each content id has a manifest at `{endpoint}/{index}/_doc/{content_id}` naming a
/// write generation and its chunk count. The bytes live in chunk documents
/// `{content_id}~{generation}~{n}`, base64-encoded. `~` never appears in a valid
/// content id, so chunk documents cannot collide with manifests.
///
/// A write uploads its chunks under a fresh generation, then replaces the manifest,
/// then removes the previous generation's chunks. Readers follow one manifest, so
/// they see a whole version. Reads fetch one chunk at a time. Manifest writes ask
/// the index to refresh before acknowledging.
#[derive(Debug, Clone)]
pub struct IndexedStorage {
    config: IndexedStorageConfig,
    client: reqwest::Client,
}

impl IndexedStorage {
    /// Create a backend for the configured index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the endpoint or index is empty or the chunk size is
    /// zero.
    #[tracing::instrument(skip(config), fields(endpoint = %config.endpoint, index = %config.index))]
    pub fn new(config: IndexedStorageConfig) -> StorageResult<Self> {
        if config.endpoint.trim().is_empty() || config.index.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                "indexed storage needs an endpoint and an index".to_string(),
            )));
        }
        if config.chunk_bytes == 0 {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                "indexed storage chunk size must be positive".to_string(),
            )));
        }
        let client = build_client(config.timeout_secs)?;
        tracing::info!(chunk_bytes = config.chunk_bytes, "Created indexed storage");
        Ok(Self { config, client })
    }

    /// Backend configuration.
    pub fn config(&self) -> &IndexedStorageConfig {
        &self.config
    }

    fn document_url(&self, document_id: &str) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index,
            document_id
        )
    }

    fn manifest_url(&self, content_id: &ContentId) -> StorageResult<String> {
        validate_content_id(content_id)?;
        Ok(self.document_url(content_id.as_str()))
    }

    fn chunk_url(&self, content_id: &str, generation: &str, index: u64) -> String {
        self.document_url(&format!("{}~{}~{}", content_id, generation, index))
    }

    /// Fetch a document source; `None` when the index has no such document.
    async fn fetch<T: DeserializeOwned>(
        client: &reqwest::Client,
        url: &str,
    ) -> StorageResult<Option<T>> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(url, status));
        }

        let document: GetDocumentResponse<T> = response
            .json()
            .await
            .map_err(|e| transport_error(url, e))?;
        match document {
            GetDocumentResponse {
                found: true,
                source: Some(source),
            } => Ok(Some(source)),
            _ => Ok(None),
        }
    }

    async fn put<T: Serialize>(&self, url: &str, document: &T, refresh: bool) -> StorageResult<()> {
        let mut request = self.client.put(url).json(document);
        if refresh {
            request = request.query(&[("refresh", "true")]);
        }
        let response = request.send().await.map_err(|e| transport_error(url, e))?;
        if !response.status().is_success() {
            return Err(status_error(url, response.status()));
        }
        Ok(())
    }

    /// Delete a document, treating an absent one as deleted.
    async fn remove(&self, url: &str, refresh: bool) -> StorageResult<()> {
        let mut request = self.client.delete(url);
        if refresh {
            request = request.query(&[("refresh", "true")]);
        }
        let response = request.send().await.map_err(|e| transport_error(url, e))?;
        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(status_error(url, status))
        }
    }

    async fn put_chunk(
        &self,
        content_id: &str,
        generation: &str,
        index: u64,
        bytes: &[u8],
    ) -> StorageResult<()> {
        let document = ChunkDocument {
            content_id: content_id.to_string(),
            generation: generation.to_string(),
            index,
            data: STANDARD.encode(bytes),
        };
        self.put(&self.chunk_url(content_id, generation, index), &document, false)
            .await
    }

    /// Upload `body` as chunk documents of one generation, returning the total
    /// length. `chunks` counts the chunks started, including one that failed.
    async fn upload_chunks(
        &self,
        content_id: &str,
        generation: &str,
        mut body: ContentStream,
        chunks: &mut u64,
    ) -> StorageResult<u64> {
        let chunk_bytes = self.config.chunk_bytes;
        let mut pending: Vec<u8> = Vec::with_capacity(chunk_bytes);
        let mut length = 0u64;

        while let Some(piece) = body.next().await {
            let piece = piece?;
            length += piece.len() as u64;
            pending.extend_from_slice(&piece);
            while pending.len() >= chunk_bytes {
                let rest = pending.split_off(chunk_bytes);
                *chunks += 1;
                self.put_chunk(content_id, generation, *chunks - 1, &pending)
                    .await?;
                pending = rest;
            }
        }
        if !pending.is_empty() {
            *chunks += 1;
            self.put_chunk(content_id, generation, *chunks - 1, &pending)
                .await?;
        }
        Ok(length)
    }

    /// Remove the chunks of a generation no manifest points to any more.
    async fn discard_generation(&self, content_id: &str, generation: &str, chunks: u64) {
        for index in 0..chunks {
            let url = self.chunk_url(content_id, generation, index);
            if let Err(e) = self.remove(&url, false).await {
                tracing::warn!(url = %url, error = %e, "Left orphaned chunk document");
            }
        }
    }
}

#[async_trait::async_trait]
impl ResourceBackend for IndexedStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::IndexedStorage
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        let url = self.manifest_url(content_id)?;
        let Some(manifest) = Self::fetch::<Manifest>(&self.client, &url).await? else {
            return Err(StorageError::new(StorageErrorKind::NotFound(
                content_id.to_string(),
            )));
        };
        tracing::debug!(
            url = %url,
            length = manifest.length,
            chunks = manifest.chunks,
            "Loaded content manifest"
        );

        let length = manifest.length;
        let storage = self.clone();
        let body = futures::stream::try_unfold(0u64, move |index| {
            let storage = storage.clone();
            let manifest = manifest.clone();
            async move {
                if index >= manifest.chunks {
                    return Ok::<_, StorageError>(None);
                }
                let url = storage.chunk_url(&manifest.content_id, &manifest.generation, index);
                let chunk = Self::fetch::<ChunkDocument>(&storage.client, &url)
                    .await?
                    .ok_or_else(|| {
                        StorageError::new(StorageErrorKind::Unavailable(format!(
                            "{}: chunk document missing",
                            url
                        )))
                    })?;
                let bytes = STANDARD.decode(chunk.data.as_bytes()).map_err(|e| {
                    StorageError::new(StorageErrorKind::Unavailable(format!(
                        "{}: undecodable chunk: {}",
                        url, e
                    )))
                })?;
                Ok(Some((bytes, index + 1)))
            }
        });

        Ok(Resource::new(content_id.clone(), Some(length), Box::pin(body)))
    }

    #[tracing::instrument(skip(self, body))]
    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        let content_id = content_id.cloned().unwrap_or_else(ContentId::generate);
        let url = self.manifest_url(&content_id)?;
        let previous = Self::fetch::<Manifest>(&self.client, &url).await?;

        let generation = Uuid::new_v4().simple().to_string();
        let mut chunks = 0u64;
        let length = match self
            .upload_chunks(content_id.as_str(), &generation, body, &mut chunks)
            .await
        {
            Ok(length) => length,
            Err(e) => {
                self.discard_generation(content_id.as_str(), &generation, chunks)
                    .await;
                return Err(e);
            }
        };

        let manifest = Manifest {
            content_id: content_id.to_string(),
            length,
            chunks,
            generation,
        };
        self.put(&url, &manifest, true).await?;

        if let Some(previous) = previous {
            self.discard_generation(&previous.content_id, &previous.generation, previous.chunks)
                .await;
        }

        tracing::info!(content_id = %content_id, url = %url, length, chunks, "Indexed content");
        Ok(StoredContent { content_id, length })
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        let url = self.manifest_url(content_id)?;
        let Some(manifest) = Self::fetch::<Manifest>(&self.client, &url).await? else {
            tracing::debug!(url = %url, "Content already absent");
            return Ok(());
        };

        self.remove(&url, true).await?;
        self.discard_generation(&manifest.content_id, &manifest.generation, manifest.chunks)
            .await;
        tracing::info!(url = %url, chunks = manifest.chunks, "Deleted content");
        Ok(())
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        let url = self.manifest_url(content_id)?;
        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(status_error(&url, status)),
        }
    }
}
