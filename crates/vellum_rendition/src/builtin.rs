//! Built-in renderers.

use crate::{Renderer, RenditionRule};
use std::sync::Arc;
use vellum_core::{ContentStream, MediaType, collect_stream, stream_from_bytes};
use vellum_error::{RenditionError, RenditionErrorKind};

/// Renders `text/plain` as an HTML page with the escaped text in a `<pre>` block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextToHtml;

impl PlainTextToHtml {
    /// `text/plain` → `text/html` rule using this renderer.
    pub fn rule() -> RenditionRule {
        RenditionRule::with_renderer(
            MediaType::text_plain(),
            MediaType::text_html(),
            Arc::new(Self),
        )
    }

    /// Escape `text` and wrap it in a minimal document.
    pub fn to_html(text: &str) -> String {
        let mut html = String::with_capacity(text.len() + 64);
        html.push_str("<!DOCTYPE html>\n<html><body><pre>");
        for c in text.chars() {
            match c {
                '&' => html.push_str("&amp;"),
                '<' => html.push_str("&lt;"),
                '>' => html.push_str("&gt;"),
                '"' => html.push_str("&quot;"),
                '\'' => html.push_str("&#39;"),
                c => html.push(c),
            }
        }
        html.push_str("</pre></body></html>\n");
        html
    }
}

#[async_trait::async_trait]
impl Renderer for PlainTextToHtml {
    async fn render(
        &self,
        source: ContentStream,
        _target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError> {
        let bytes = collect_stream(source).await.map_err(|e| {
            RenditionError::new(RenditionErrorKind::ConversionFailed(format!(
                "reading text: {}",
                e
            )))
        })?;
        let html = Self::to_html(&String::from_utf8_lossy(&bytes));
        Ok(Some(stream_from_bytes(html.into_bytes())))
    }
}
