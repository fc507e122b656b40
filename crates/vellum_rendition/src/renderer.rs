//! Renderer trait and closure adapter.

use vellum_core::{ContentStream, MediaType, collect_stream, stream_from_bytes};
use vellum_error::{RenditionError, RenditionErrorKind};

/// Converts a source stream into the requested media type.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    /// Render `source` as `target`.
    ///
    /// `target` is concrete whenever the request allowed it. Returning `Ok(None)`
    /// means the renderer declined; the caller moves on as it would for an error.
    ///
    /// # Errors
    ///
    /// Returns `ConversionFailed` if the source cannot be converted.
    async fn render(
        &self,
        source: ContentStream,
        target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError>;
}

/// Renderer backed by a synchronous function over the whole source buffer.
///
/// Suited to small documents; the source is read fully before the function runs.
pub struct FnRenderer<F> {
    convert: F,
}

impl<F> FnRenderer<F>
where
    F: Fn(Vec<u8>, &MediaType) -> Result<Vec<u8>, RenditionError> + Send + Sync,
{
    /// Wrap a conversion function.
    pub fn new(convert: F) -> Self {
        Self { convert }
    }
}

#[async_trait::async_trait]
impl<F> Renderer for FnRenderer<F>
where
    F: Fn(Vec<u8>, &MediaType) -> Result<Vec<u8>, RenditionError> + Send + Sync,
{
    async fn render(
        &self,
        source: ContentStream,
        target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError> {
        let bytes = collect_stream(source).await.map_err(|e| {
            RenditionError::new(RenditionErrorKind::ConversionFailed(format!(
                "reading source: {}",
                e
            )))
        })?;
        let output = (self.convert)(bytes, target)?;
        Ok(Some(stream_from_bytes(output)))
    }
}
