//! Shared plumbing for the HTTP-backed stores.

use futures::StreamExt;
use std::time::Duration;
use vellum_core::ContentStream;
use vellum_error::{StorageError, StorageErrorKind, StorageResult};

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

/// Client with a whole-request deadline; a deadline hit surfaces as `Unavailable`.
pub(crate) fn build_client(timeout_secs: u64) -> StorageResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| {
            StorageError::new(StorageErrorKind::Unavailable(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })
}

pub(crate) fn transport_error(url: &str, e: reqwest::Error) -> StorageError {
    tracing::warn!(url, error = %e, "Storage request failed");
    StorageError::new(StorageErrorKind::Unavailable(format!("{}: {}", url, e)))
}

pub(crate) fn status_error(url: &str, status: reqwest::StatusCode) -> StorageError {
    tracing::warn!(url, %status, "Storage request rejected");
    StorageError::new(StorageErrorKind::Unavailable(format!(
        "{} returned {}",
        url, status
    )))
}

/// Forward a response body chunk by chunk.
pub(crate) fn response_stream(url: String, response: reqwest::Response) -> ContentStream {
    response
        .bytes_stream()
        .map(move |chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| transport_error(&url, e))
        })
        .boxed()
}
