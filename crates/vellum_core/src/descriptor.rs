//! Content descriptors.

use crate::{ContentId, MediaType};
use serde::{Deserialize, Serialize};

/// The content-bearing view of an entity or of one of its nested properties.
///
/// A descriptor with no content id means the owner is declared to carry content but
/// nothing has been stored yet. A descriptor with no media type cannot be resolved.
///
/// # Examples
///
/// ```
/// use vellum_core::{ContentDescriptor, ContentId, MediaType};
///
/// let descriptor = ContentDescriptor::new()
///     .with_content_id(ContentId::new("abc"))
///     .with_media_type("image/png".parse::<MediaType>().unwrap())
///     .with_length(2048);
/// assert_eq!(descriptor.content_id().map(ContentId::as_str), Some("abc"));
/// assert!(descriptor.has_content());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_id: Option<ContentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<u64>,
}

impl ContentDescriptor {
    /// Descriptor with nothing stored and no declared type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content id.
    pub fn with_content_id(mut self, content_id: ContentId) -> Self {
        self.content_id = Some(content_id);
        self
    }

    /// Set the declared media type.
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Set the declared length in bytes.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    /// Stable content id, present once content has been written.
    pub fn content_id(&self) -> Option<&ContentId> {
        self.content_id.as_ref()
    }

    /// Declared media type of the stored bytes.
    pub fn media_type(&self) -> Option<&MediaType> {
        self.media_type.as_ref()
    }

    /// Declared length of the stored bytes.
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Content has been written at least once.
    pub fn has_content(&self) -> bool {
        self.content_id.is_some()
    }

    /// Record a completed write.
    ///
    /// The content id is taken only if none was assigned yet; an existing id is
    /// never replaced. Returns `false` when `content_id` disagrees with the id
    /// already on record, in which case nothing changes.
    pub fn record_write(&mut self, content_id: ContentId, media_type: MediaType, length: u64) -> bool {
        match &self.content_id {
            Some(existing) if *existing != content_id => {
                tracing::warn!(
                    existing = %existing,
                    offered = %content_id,
                    "Refusing to replace an assigned content id"
                );
                return false;
            }
            Some(_) => {}
            None => self.content_id = Some(content_id),
        }
        self.media_type = Some(media_type);
        self.length = Some(length);
        true
    }

    /// Forget the stored bytes' type and length, keeping the content id.
    pub fn clear_content(&mut self) {
        self.media_type = None;
        self.length = None;
    }
}
