//! Content references exposed to the link layer.

use vellum_core::{ContentId, MediaType};

/// Where one piece of an entity's content lives.
///
/// Carries identifiers only; building URLs from them is the link layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentReference {
    /// Field names leading to the content; empty for the entity's own content
    pub property: Vec<&'static str>,
    /// Name of the store that owns the bytes
    pub store: String,
    /// Stable content id
    pub content_id: ContentId,
    /// Declared media type, if any
    pub media_type: Option<MediaType>,
}

impl ContentReference {
    /// Dotted property path, e.g. `attachments.preview`; empty for the root.
    pub fn property_path(&self) -> String {
        self.property.join(".")
    }
}
