//! HTTP object-storage resource backend.

use crate::http::{build_client, default_timeout_secs, response_stream, status_error, transport_error};
use crate::{BackendKind, Resource, ResourceBackend, StoredContent, validate_content_id};
use serde::{Deserialize, Serialize};
use vellum_core::{ContentId, ContentStream, collect_stream};
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

/// Connection settings for an object store.
///
/// Objects are addressed path-style: `{endpoint}/{bucket}/{prefix}{content_id}`.
/// Credentials and request signing are the deployment's concern (a signing proxy,
/// a bucket policy or presigned gateway); this backend speaks plain HTTP verbs.
///
/// # Example
///
/// ```
/// use vellum_storage::ObjectStorageConfig;
///
/// let config = ObjectStorageConfig::builder()
///     .endpoint("http://localhost:9000")
///     .bucket("content")
///     .prefix("documents/")
///     .build()
///     .unwrap();
/// assert_eq!(*config.timeout_secs(), 30);
/// ```
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
pub struct ObjectStorageConfig {
    /// Base URL of the object store
    endpoint: String,
    /// Bucket holding the objects
    bucket: String,
    /// Key prefix prepended to every content id
    #[serde(default)]
    #[builder(default)]
    prefix: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,
}

impl ObjectStorageConfig {
    /// Creates a new config builder.
    pub fn builder() -> ObjectStorageConfigBuilder {
        ObjectStorageConfigBuilder::default()
    }
}

/// Object-storage backend.
///
/// - `GET` streams the object body; `404` is `NotFound`
/// - `PUT` replaces the object in one request, which object stores apply atomically
/// - `DELETE` treats `404` as success
/// - `HEAD` answers [`ResourceBackend::exists`]
///
/// Connection failures, timeouts and any other status are `Unavailable`.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    config: ObjectStorageConfig,
    client: reqwest::Client,
}

impl ObjectStorage {
    /// Create a backend for the configured bucket.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the endpoint or bucket is empty.
    #[tracing::instrument(skip(config), fields(endpoint = %config.endpoint, bucket = %config.bucket))]
    pub fn new(config: ObjectStorageConfig) -> StorageResult<Self> {
        if config.endpoint.trim().is_empty() || config.bucket.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                "object storage needs an endpoint and a bucket".to_string(),
            )));
        }
        let client = build_client(config.timeout_secs)?;
        tracing::info!("Created object storage");
        Ok(Self { config, client })
    }

    /// Backend configuration.
    pub fn config(&self) -> &ObjectStorageConfig {
        &self.config
    }

    fn url_for(&self, content_id: &ContentId) -> StorageResult<String> {
        validate_content_id(content_id)?;
        Ok(format!(
            "{}/{}/{}{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            self.config.prefix,
            content_id
        ))
    }
}

#[async_trait::async_trait]
impl ResourceBackend for ObjectStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStorage
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        let url = self.url_for(content_id)?;
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::new(StorageErrorKind::NotFound(
                content_id.to_string(),
            )));
        }
        if !status.is_success() {
            return Err(status_error(&url, status));
        }

        let length = response.content_length();
        tracing::debug!(url = %url, length, "Opened object");
        Ok(Resource::new(
            content_id.clone(),
            length,
            response_stream(url, response),
        ))
    }

    #[tracing::instrument(skip(self, body))]
    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        let content_id = content_id.cloned().unwrap_or_else(ContentId::generate);
        let url = self.url_for(&content_id)?;

        // Object stores want a declared length on PUT, so the body is buffered.
        let data = collect_stream(body).await?;
        let length = data.len() as u64;

        let response = self
            .client
            .put(&url)
            .body(data)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        if !response.status().is_success() {
            return Err(status_error(&url, response.status()));
        }

        tracing::info!(content_id = %content_id, url = %url, length, "Stored object");
        Ok(StoredContent { content_id, length })
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        let url = self.url_for(content_id)?;
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(url = %url, %status, "Deleted object");
            Ok(())
        } else {
            Err(status_error(&url, status))
        }
    }

    #[tracing::instrument(skip(self, content_id), fields(content_id = %content_id))]
    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        let url = self.url_for(content_id)?;
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
