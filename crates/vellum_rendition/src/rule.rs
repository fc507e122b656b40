//! Rendition rules.

use crate::{FnRenderer, Renderer};
use std::fmt;
use std::sync::Arc;
use vellum_core::{ContentStream, MediaType};
use vellum_error::{RenditionError, RenditionErrorKind};

/// One conversion a store offers: `consumes` → any of `produces`.
#[derive(Clone)]
pub struct RenditionRule {
    consumes: MediaType,
    produces: Vec<MediaType>,
    renderer: Arc<dyn Renderer>,
}

impl RenditionRule {
    /// Create a rule.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRule` if `produces` is empty.
    pub fn new(
        consumes: MediaType,
        produces: Vec<MediaType>,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, RenditionError> {
        if produces.is_empty() {
            return Err(RenditionError::new(RenditionErrorKind::InvalidRule(
                format!("rule consuming {} produces nothing", consumes),
            )));
        }
        Ok(Self {
            consumes: consumes.without_quality(),
            produces: produces.iter().map(MediaType::without_quality).collect(),
            renderer,
        })
    }

    /// Rule producing exactly one media type; cannot fail.
    pub fn with_renderer(
        consumes: MediaType,
        produces: MediaType,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            consumes: consumes.without_quality(),
            produces: vec![produces.without_quality()],
            renderer,
        }
    }

    /// Create a rule from a synchronous conversion function.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRule` if `produces` is empty.
    pub fn from_fn<F>(
        consumes: MediaType,
        produces: Vec<MediaType>,
        convert: F,
    ) -> Result<Self, RenditionError>
    where
        F: Fn(Vec<u8>, &MediaType) -> Result<Vec<u8>, RenditionError> + Send + Sync + 'static,
    {
        Self::new(consumes, produces, Arc::new(FnRenderer::new(convert)))
    }

    /// Pattern the stored type must fall under.
    pub fn consumes(&self) -> &MediaType {
        &self.consumes
    }

    /// Patterns this rule can produce, in declaration order.
    pub fn produces(&self) -> &[MediaType] {
        &self.produces
    }

    /// Whether the rule converts `source` into something acceptable as `target`.
    pub fn matches(&self, source: &MediaType, target: &MediaType) -> bool {
        self.consumes.includes(source)
            && self.produces.iter().any(|p| p.is_compatible_with(target))
    }

    /// The media type a rendition for `requested` will be labelled with.
    ///
    /// A concrete request is used as is. For a wildcard request the first concrete
    /// produced type it covers is chosen, falling back to the request itself.
    pub fn target_for(&self, requested: &MediaType) -> MediaType {
        if requested.is_concrete() {
            return requested.without_quality();
        }
        self.produces
            .iter()
            .find(|p| p.is_concrete() && requested.includes(p))
            .cloned()
            .unwrap_or_else(|| requested.without_quality())
    }

    /// Run the renderer, turning a declined render into `NoOutput`.
    ///
    /// # Errors
    ///
    /// Returns whatever the renderer reports, or `NoOutput` if it produced nothing.
    #[tracing::instrument(skip(self, source, target), fields(consumes = %self.consumes, target = %target))]
    pub async fn render(
        &self,
        source: ContentStream,
        target: &MediaType,
    ) -> Result<ContentStream, RenditionError> {
        match self.renderer.render(source, target).await? {
            Some(stream) => Ok(stream),
            None => Err(RenditionError::new(RenditionErrorKind::NoOutput(
                target.to_string(),
            ))),
        }
    }
}

impl fmt::Debug for RenditionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenditionRule")
            .field("consumes", &self.consumes)
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}
