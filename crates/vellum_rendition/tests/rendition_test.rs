//! Tests for rendition rules and registry.

use futures::StreamExt;
use std::sync::Arc;
use vellum_core::{ContentStream, MediaType, collect_stream, stream_from_bytes};
use vellum_rendition::{
    PlainTextToHtml, Renderer, RenditionError, RenditionErrorKind, RenditionRegistryBuilder,
    RenditionRule,
};

fn mt(value: &str) -> MediaType {
    value.parse().unwrap()
}

fn uppercase_rule(produces: &[&str]) -> RenditionRule {
    RenditionRule::from_fn(
        mt("text/plain"),
        produces.iter().map(|p| mt(p)).collect(),
        |bytes, _target| Ok(bytes.to_ascii_uppercase()),
    )
    .unwrap()
}

struct Declining;

#[async_trait::async_trait]
impl Renderer for Declining {
    async fn render(
        &self,
        _source: ContentStream,
        _target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError> {
        Ok(None)
    }
}

#[test]
fn test_rule_requires_produced_types() {
    let err = RenditionRule::from_fn(mt("text/plain"), Vec::new(), |b, _| Ok(b)).unwrap_err();
    assert!(matches!(err.kind(), RenditionErrorKind::InvalidRule(_)));
}

#[test]
fn test_rule_matching_uses_pattern_inclusion() {
    let rule = RenditionRule::from_fn(mt("text/*"), vec![mt("text/*")], |b, _| Ok(b)).unwrap();

    assert!(rule.matches(&mt("text/plain"), &mt("text/html")));
    assert!(rule.matches(&mt("text/markdown"), &mt("*/*")));
    assert!(!rule.matches(&mt("image/png"), &mt("text/html")));
    assert!(!rule.matches(&mt("text/plain"), &mt("application/json")));
}

#[test]
fn test_target_for_wildcard_request() {
    let rule = uppercase_rule(&["text/*", "text/html", "application/xhtml+xml"]);

    assert_eq!(rule.target_for(&mt("text/html;q=0.8")), mt("text/html"));
    assert_eq!(rule.target_for(&mt("text/*")), mt("text/html"));
    assert_eq!(rule.target_for(&mt("*/*")), mt("text/html"));
    assert_eq!(rule.target_for(&mt("image/*")), mt("image/*"));
}

#[test]
fn test_first_registered_rule_wins() {
    let registry = RenditionRegistryBuilder::new()
        .register("notes", uppercase_rule(&["text/*"]))
        .register("notes", PlainTextToHtml::rule())
        .build();

    let rule = registry
        .find_rule("notes", &mt("text/plain"), &mt("text/html"))
        .unwrap();
    assert_eq!(rule.produces(), &[mt("text/*")]);
    assert_eq!(registry.rules_for("notes").len(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_rules_are_scoped_to_store() {
    let registry = RenditionRegistryBuilder::new()
        .register("notes", PlainTextToHtml::rule())
        .build();

    assert!(registry
        .find_rule("images", &mt("text/plain"), &mt("text/html"))
        .is_none());
    assert!(registry.rules_for("images").is_empty());
}

#[tokio::test]
async fn test_fn_rule_renders() {
    let rule = uppercase_rule(&["text/x-shout"]);
    let output = rule
        .render(stream_from_bytes(b"quiet".to_vec()), &mt("text/x-shout"))
        .await
        .unwrap();
    assert_eq!(collect_stream(output).await.unwrap(), b"QUIET");
}

#[tokio::test]
async fn test_plain_text_to_html() {
    let rule = PlainTextToHtml::rule();
    let output = rule
        .render(stream_from_bytes(b"1 < 2".to_vec()), &mt("text/html"))
        .await
        .unwrap();
    let html = String::from_utf8(collect_stream(output).await.unwrap()).unwrap();
    assert!(html.contains("<pre>1 &lt; 2</pre>"));
}

#[tokio::test]
async fn test_declined_render_is_no_output() {
    let rule = RenditionRule::new(mt("text/plain"), vec![mt("text/html")], Arc::new(Declining))
        .unwrap();
    let err = match rule
        .render(stream_from_bytes(b"x".to_vec()), &mt("text/html"))
        .await
    {
        Ok(_) => panic!("declining renderer produced output"),
        Err(e) => e,
    };
    assert!(matches!(err.kind(), RenditionErrorKind::NoOutput(_)));
}

#[tokio::test]
async fn test_failing_source_is_conversion_failure() {
    let failing: ContentStream = futures::stream::iter(vec![Err(
        vellum_error::StorageError::new(vellum_error::StorageErrorKind::Unavailable(
            "disk gone".to_string(),
        )),
    )])
    .boxed();

    let err = match PlainTextToHtml::rule()
        .render(failing, &mt("text/html"))
        .await
    {
        Ok(_) => panic!("render succeeded on a failing source"),
        Err(e) => e,
    };
    assert!(matches!(err.kind(), RenditionErrorKind::ConversionFailed(_)));
}
