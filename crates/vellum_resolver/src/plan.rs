//! Resolution outcomes.

use std::fmt;
use vellum_core::{ContentId, ContentStream, MediaType, collect_stream};
use vellum_error::StorageResult;

/// Where the bytes of a plan come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOrigin {
    /// The stored bytes, unchanged
    Stored,
    /// A rendition computed from stored bytes of type `source`
    Rendition {
        /// Media type of the stored bytes the rendition was computed from
        source: MediaType,
    },
}

/// Resolved answer for one request: a stream and the media type it represents.
///
/// Owned by the request that asked for it. Dropping the plan releases the
/// underlying backend stream whether or not it was read.
pub struct ResourcePlan {
    content_id: ContentId,
    media_type: MediaType,
    origin: PlanOrigin,
    length: Option<u64>,
    body: ContentStream,
}

impl ResourcePlan {
    pub(crate) fn new(
        content_id: ContentId,
        media_type: MediaType,
        origin: PlanOrigin,
        length: Option<u64>,
        body: ContentStream,
    ) -> Self {
        Self {
            content_id,
            media_type,
            origin,
            length,
            body,
        }
    }

    /// Id of the stored content the plan was resolved from.
    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    /// Media type to report for the body.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// Stored bytes or a rendition.
    pub fn origin(&self) -> &PlanOrigin {
        &self.origin
    }

    /// Whether the body is a computed rendition.
    pub fn is_rendition(&self) -> bool {
        matches!(self.origin, PlanOrigin::Rendition { .. })
    }

    /// Body length when known up front. Always `None` for renditions.
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

impl fmt::Debug for ResourcePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePlan")
            .field("content_id", &self.content_id)
            .field("media_type", &self.media_type)
            .field("origin", &self.origin)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Outcome of a resolution.
#[derive(Debug)]
pub enum Resolution {
    /// A resource satisfies the request
    Resolved(ResourcePlan),
    /// The subject does not carry content
    NotApplicable,
    /// Content is declared but nothing stored or renderable satisfies the request
    NotFound,
}

impl Resolution {
    /// A plan was produced.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// The plan, if any.
    pub fn into_plan(self) -> Option<ResourcePlan> {
        match self {
            Resolution::Resolved(plan) => Some(plan),
            _ => None,
        }
    }
}
