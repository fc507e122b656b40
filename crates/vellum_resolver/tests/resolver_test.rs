//! Tests for the resolution engine.

use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vellum_core::{
    ContentDescriptor, ContentEntity, ContentField, ContentId, ContentSchema, ContentStream,
    ContentSubject, MediaType, PropertyValue, collect_stream, stream_from_bytes,
};
use vellum_error::{RenditionError, RenditionErrorKind, StorageError, StorageErrorKind};
use vellum_registry::{StoreHandle, StoreRegistry};
use vellum_rendition::{
    PlainTextToHtml, Renderer, RenditionRegistry, RenditionRegistryBuilder, RenditionRule,
};
use vellum_resolver::{PlanOrigin, Resolution, Resolver};
use vellum_storage::{
    BackendKind, FileSystemStorage, MemoryStorage, Resource, ResourceBackend, StorageResult,
    StoredContent,
};

// Fixtures

#[derive(Default)]
struct Blob {
    content: ContentDescriptor,
}

impl ContentSubject for Blob {
    fn descriptor(&self) -> Option<ContentDescriptor> {
        Some(self.content.clone())
    }
}

impl ContentEntity for Blob {}

/// Entity that carries no content at all.
struct Plain;

impl ContentSubject for Plain {}

impl ContentEntity for Plain {}

struct Scan {
    descriptor: ContentDescriptor,
}

impl ContentSubject for Scan {
    fn descriptor(&self) -> Option<ContentDescriptor> {
        Some(self.descriptor.clone())
    }
}

impl ContentEntity for Scan {}

struct Claim {
    form: Option<Scan>,
    evidence: Vec<Scan>,
}

impl ContentSubject for Claim {
    fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
        match name {
            "form" => self
                .form
                .as_ref()
                .map(|s| PropertyValue::Single(s as &dyn ContentSubject)),
            "evidence" => Some(PropertyValue::Many(
                self.evidence.iter().map(|s| s as &dyn ContentSubject).collect(),
            )),
            _ => None,
        }
    }
}

impl ContentEntity for Claim {
    fn schema() -> ContentSchema {
        ContentSchema::new()
            .field(ContentField::single::<Scan>("form"))
            .field(ContentField::collection::<Scan>("evidence"))
    }
}

/// Backend wrapper counting every call.
#[derive(Default)]
struct CountingBackend {
    inner: MemoryStorage,
    calls: AtomicUsize,
}

impl CountingBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ResourceBackend for CountingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_resource(content_id).await
    }

    async fn set_resource(
        &self,
        content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_resource(content_id, body).await
    }

    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_resource(content_id).await
    }

    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(content_id).await
    }
}

/// Backend whose reads always fail the given way.
struct BrokenBackend(StorageErrorKind);

#[async_trait::async_trait]
impl ResourceBackend for BrokenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStorage
    }

    async fn get_resource(&self, _content_id: &ContentId) -> StorageResult<Resource> {
        Err(StorageError::new(self.0.clone()))
    }

    async fn set_resource(
        &self,
        _content_id: Option<&ContentId>,
        _body: ContentStream,
    ) -> StorageResult<StoredContent> {
        Err(StorageError::new(self.0.clone()))
    }

    async fn delete_resource(&self, _content_id: &ContentId) -> StorageResult<()> {
        Err(StorageError::new(self.0.clone()))
    }

    async fn exists(&self, _content_id: &ContentId) -> StorageResult<bool> {
        Err(StorageError::new(self.0.clone()))
    }
}

/// Backend that files every write under a fresh id.
#[derive(Default)]
struct RenamingBackend {
    inner: MemoryStorage,
}

#[async_trait::async_trait]
impl ResourceBackend for RenamingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn get_resource(&self, content_id: &ContentId) -> StorageResult<Resource> {
        self.inner.get_resource(content_id).await
    }

    async fn set_resource(
        &self,
        _content_id: Option<&ContentId>,
        body: ContentStream,
    ) -> StorageResult<StoredContent> {
        self.inner.set_resource(None, body).await
    }

    async fn delete_resource(&self, content_id: &ContentId) -> StorageResult<()> {
        self.inner.delete_resource(content_id).await
    }

    async fn exists(&self, content_id: &ContentId) -> StorageResult<bool> {
        self.inner.exists(content_id).await
    }
}

struct FailingRenderer;

#[async_trait::async_trait]
impl Renderer for FailingRenderer {
    async fn render(
        &self,
        _source: ContentStream,
        _target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError> {
        Err(RenditionError::new(RenditionErrorKind::ConversionFailed(
            "converter crashed".to_string(),
        )))
    }
}

struct DecliningRenderer;

#[async_trait::async_trait]
impl Renderer for DecliningRenderer {
    async fn render(
        &self,
        _source: ContentStream,
        _target: &MediaType,
    ) -> Result<Option<ContentStream>, RenditionError> {
        Ok(None)
    }
}

fn mt(value: &str) -> MediaType {
    value.parse().unwrap()
}

fn accept(values: &[&str]) -> Vec<MediaType> {
    values.iter().map(|v| mt(v)).collect()
}

fn resolver_with(
    backend: Arc<dyn ResourceBackend>,
    renditions: RenditionRegistry,
) -> (Resolver, Arc<StoreHandle>) {
    let mut stores = StoreRegistry::builder();
    stores
        .register(StoreHandle::for_entity::<Blob>("blobs", backend))
        .unwrap();
    let resolver = Resolver::new(Arc::new(stores.build()), Arc::new(renditions));
    let store = Arc::clone(resolver.stores().lookup::<Blob>().unwrap());
    (resolver, store)
}

async fn stored_blob(resolver: &Resolver, store: &StoreHandle, media_type: &str, body: &[u8]) -> Blob {
    let mut blob = Blob::default();
    resolver
        .store_content(store, &mut blob.content, mt(media_type), stream_from_bytes(body.to_vec()))
        .await
        .unwrap();
    blob
}

fn html_renditions() -> RenditionRegistry {
    RenditionRegistryBuilder::new()
        .register("blobs", PlainTextToHtml::rule())
        .build()
}

async fn body_of(resolution: Resolution) -> (MediaType, PlanOrigin, Vec<u8>) {
    let plan = resolution.into_plan().expect("expected a resolved plan");
    let media_type = plan.media_type().clone();
    let origin = plan.origin().clone();
    (media_type, origin, plan.into_bytes().await.unwrap())
}

// Applicability

#[tokio::test]
async fn test_subject_without_descriptor_is_not_applicable() {
    let backend = Arc::new(CountingBackend::default());
    let (resolver, store) = resolver_with(backend.clone(), RenditionRegistry::empty());

    let resolution = resolver.resolve(&store, &Plain, &accept(&["*/*"])).await.unwrap();
    assert!(matches!(resolution, Resolution::NotApplicable));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_descriptor_without_media_type_is_not_applicable() {
    let backend = Arc::new(CountingBackend::default());
    let (resolver, store) = resolver_with(backend.clone(), RenditionRegistry::empty());
    let blob = Blob {
        content: ContentDescriptor::new().with_content_id(ContentId::new("abc")),
    };

    let resolution = resolver.resolve(&store, &blob, &accept(&["*/*"])).await.unwrap();
    assert!(matches!(resolution, Resolution::NotApplicable));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_missing_content_id_is_not_found_without_backend_call() {
    let backend = Arc::new(CountingBackend::default());
    let (resolver, store) = resolver_with(backend.clone(), html_renditions());
    let blob = Blob {
        content: ContentDescriptor::new().with_media_type(mt("text/plain")),
    };

    let resolution = resolver
        .resolve(&store, &blob, &accept(&["text/html", "*/*"]))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_entity_type_without_store_is_not_applicable() {
    let (resolver, _store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let scan = Scan {
        descriptor: ContentDescriptor::new()
            .with_content_id(ContentId::new("abc"))
            .with_media_type(mt("image/png")),
    };

    let resolution = resolver.resolve_entity(&scan, &accept(&["*/*"])).await.unwrap();
    assert!(matches!(resolution, Resolution::NotApplicable));
}

// Direct matches

#[tokio::test]
async fn test_wildcard_accept_matches_stored_png() {
    let (resolver, store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let blob = stored_blob(&resolver, &store, "image/png", b"\x89PNG").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["image/*"]))
        .await
        .unwrap();
    let (media_type, origin, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("image/png"));
    assert_eq!(origin, PlanOrigin::Stored);
    assert_eq!(bytes, b"\x89PNG");
}

#[tokio::test]
async fn test_direct_match_returns_last_written_bytes() {
    let (resolver, store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let mut blob = stored_blob(&resolver, &store, "text/plain", b"first").await;
    let id = blob.content.content_id().cloned().unwrap();

    resolver
        .store_content(
            &store,
            &mut blob.content,
            mt("text/plain"),
            stream_from_bytes(b"second".to_vec()),
        )
        .await
        .unwrap();
    assert_eq!(blob.content.content_id(), Some(&id));
    assert_eq!(blob.content.length(), Some(6));

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/plain"]))
        .await
        .unwrap();
    let plan = resolution.into_plan().unwrap();
    assert_eq!(plan.content_id(), &id);
    assert_eq!(plan.length(), Some(6));
    assert_eq!(plan.into_bytes().await.unwrap(), b"second");
}

#[tokio::test]
async fn test_direct_match_reached_first_beats_rendition() {
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), html_renditions());
    let blob = stored_blob(&resolver, &store, "text/plain", b"hello").await;

    // text/plain outranks text/html on quality, so the stored bytes win.
    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/html;q=0.5", "text/plain"]))
        .await
        .unwrap();
    let (media_type, origin, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("text/plain"));
    assert_eq!(origin, PlanOrigin::Stored);
    assert_eq!(bytes, b"hello");
}

#[tokio::test]
async fn test_preferred_rendition_beats_later_direct_match() {
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), html_renditions());
    let blob = stored_blob(&resolver, &store, "text/plain", b"hello").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/html", "text/plain;q=0.5"]))
        .await
        .unwrap();
    let (media_type, origin, _) = body_of(resolution).await;
    assert_eq!(media_type, mt("text/html"));
    assert_eq!(
        origin,
        PlanOrigin::Rendition {
            source: mt("text/plain")
        }
    );
}

// Renditions

#[tokio::test]
async fn test_rendition_for_unmatched_type() {
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), html_renditions());
    let blob = stored_blob(&resolver, &store, "text/plain", b"<b>").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/html"]))
        .await
        .unwrap();
    let plan = resolution.into_plan().unwrap();
    assert!(plan.is_rendition());
    assert_eq!(plan.media_type(), &mt("text/html"));
    assert_eq!(plan.content_id(), blob.content.content_id().unwrap());
    assert_eq!(plan.length(), None);

    let html = String::from_utf8(plan.into_bytes().await.unwrap()).unwrap();
    assert!(html.contains("<pre>&lt;b&gt;</pre>"));
}

#[tokio::test]
async fn test_no_rendition_when_store_disables_them() {
    let mut stores = StoreRegistry::builder();
    stores
        .register(
            StoreHandle::for_entity::<Blob>("blobs", Arc::new(MemoryStorage::new()))
                .with_renditions(false),
        )
        .unwrap();
    let resolver = Resolver::new(Arc::new(stores.build()), Arc::new(html_renditions()));
    let store = Arc::clone(resolver.stores().lookup::<Blob>().unwrap());
    let blob = stored_blob(&resolver, &store, "text/plain", b"hello").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/html"]))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
}

#[tokio::test]
async fn test_failed_rendition_continues_scan() {
    let renditions = RenditionRegistryBuilder::new()
        .register(
            "blobs",
            RenditionRule::new(mt("text/plain"), vec![mt("text/html")], Arc::new(FailingRenderer))
                .unwrap(),
        )
        .register(
            "blobs",
            RenditionRule::new(
                mt("text/plain"),
                vec![mt("application/pdf")],
                Arc::new(DecliningRenderer),
            )
            .unwrap(),
        )
        .build();
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), renditions);
    let blob = stored_blob(&resolver, &store, "text/plain", b"fallback").await;

    let resolution = resolver
        .resolve_entity(
            &blob,
            &accept(&["text/html", "application/pdf;q=0.9", "text/*;q=0.1"]),
        )
        .await
        .unwrap();
    let (media_type, origin, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("text/plain"));
    assert_eq!(origin, PlanOrigin::Stored);
    assert_eq!(bytes, b"fallback");
}

#[tokio::test]
async fn test_all_renditions_failing_is_not_found() {
    let renditions = RenditionRegistryBuilder::new()
        .register(
            "blobs",
            RenditionRule::new(mt("text/plain"), vec![mt("text/html")], Arc::new(FailingRenderer))
                .unwrap(),
        )
        .build();
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), renditions);
    let blob = stored_blob(&resolver, &store, "text/plain", b"x").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["text/html", "image/png"]))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
}

// Ordering

#[tokio::test]
async fn test_quality_orders_candidates_regardless_of_input_order() {
    let renditions = RenditionRegistryBuilder::new()
        .register(
            "blobs",
            RenditionRule::from_fn(mt("text/plain"), vec![mt("application/json")], |bytes, _| {
                Ok(format!("{:?}", String::from_utf8_lossy(&bytes)).into_bytes())
            })
            .unwrap(),
        )
        .register("blobs", PlainTextToHtml::rule())
        .build();
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), renditions);
    let blob = stored_blob(&resolver, &store, "text/plain", b"x").await;

    for order in [
        ["application/json;q=0.5", "text/html;q=0.9"],
        ["text/html;q=0.9", "application/json;q=0.5"],
    ] {
        let resolution = resolver.resolve_entity(&blob, &accept(&order)).await.unwrap();
        let (media_type, _, _) = body_of(resolution).await;
        assert_eq!(media_type, mt("text/html"), "order {:?}", order);
    }
}

#[tokio::test]
async fn test_zero_quality_is_never_served() {
    let (resolver, store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let blob = stored_blob(&resolver, &store, "image/png", b"png").await;

    let resolution = resolver
        .resolve_entity(&blob, &accept(&["image/png;q=0"]))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
}

#[tokio::test]
async fn test_empty_accept_list_is_not_found() {
    let (resolver, store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let blob = stored_blob(&resolver, &store, "image/png", b"png").await;

    let resolution = resolver.resolve_entity(&blob, &[]).await.unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
}

// Backend failures

#[tokio::test]
async fn test_missing_bytes_are_not_found() {
    let (resolver, _store) =
        resolver_with(Arc::new(MemoryStorage::new()), RenditionRegistry::empty());
    let blob = Blob {
        content: ContentDescriptor::new()
            .with_content_id(ContentId::new("never-written"))
            .with_media_type(mt("image/png")),
    };

    let resolution = resolver.resolve_entity(&blob, &accept(&["*/*"])).await.unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
}

#[tokio::test]
async fn test_backend_failure_is_unavailable() {
    for kind in [
        StorageErrorKind::Unavailable("connection reset".to_string()),
        StorageErrorKind::FileRead("permission denied".to_string()),
    ] {
        let (resolver, _store) = resolver_with(
            Arc::new(BrokenBackend(kind)),
            RenditionRegistry::empty(),
        );
        let blob = Blob {
            content: ContentDescriptor::new()
                .with_content_id(ContentId::new("abc"))
                .with_media_type(mt("image/png")),
        };

        let err = resolver
            .resolve_entity(&blob, &accept(&["image/png"]))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::Unavailable(_)));
        assert!(err.is_retryable());
    }
}

// Idempotence and concurrency

#[tokio::test]
async fn test_repeated_resolution_is_identical() {
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), html_renditions());
    let blob = stored_blob(&resolver, &store, "text/plain", b"same every time").await;

    let mut results = Vec::new();
    for _ in 0..3 {
        let resolution = resolver
            .resolve_entity(&blob, &accept(&["text/html"]))
            .await
            .unwrap();
        results.push(body_of(resolution).await);
    }
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_and_readers_see_whole_content() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let backend: Arc<dyn ResourceBackend> =
        Arc::new(FileSystemStorage::new(temp_dir.path()).unwrap());
    let (resolver, store) = resolver_with(backend, RenditionRegistry::empty());

    let payload = |i: usize| vec![(i % 251) as u8; 100_000 + i];

    let mut committed = Vec::new();
    for i in 0..8 {
        committed.push((i, stored_blob(&resolver, &store, "application/octet-stream", &payload(i)).await));
    }
    let committed = Arc::new(committed);

    let mut tasks = Vec::new();
    for i in 8..16 {
        let resolver = resolver.clone();
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let blob = stored_blob(&resolver, &store, "application/octet-stream", &payload(i)).await;
            assert_eq!(blob.content.length(), Some(payload(i).len() as u64));
        }));
    }
    for reader in 0..16 {
        let resolver = resolver.clone();
        let committed = Arc::clone(&committed);
        tasks.push(tokio::spawn(async move {
            let (i, blob) = &committed[reader % committed.len()];
            let resolution = resolver
                .resolve_entity(blob, &[MediaType::all()])
                .await
                .unwrap();
            let bytes = resolution.into_plan().unwrap().into_bytes().await.unwrap();
            assert_eq!(bytes, payload(*i));
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
}

// Properties

fn claim_with_scans() -> Claim {
    let scan = |id: &str, media_type: &str| Scan {
        descriptor: ContentDescriptor::new()
            .with_content_id(ContentId::new(id))
            .with_media_type(mt(media_type)),
    };
    Claim {
        form: Some(scan("form-1", "application/pdf")),
        evidence: vec![scan("photo-1", "image/jpeg"), scan("photo-2", "image/png")],
    }
}

async fn scan_resolver() -> Resolver {
    let scans = MemoryStorage::new();
    for (id, body) in [("form-1", "form"), ("photo-1", "jpeg"), ("photo-2", "png")] {
        scans
            .set_resource(
                Some(&ContentId::new(id)),
                stream_from_bytes(body.as_bytes().to_vec()),
            )
            .await
            .unwrap();
    }
    let mut stores = StoreRegistry::builder();
    stores
        .register(StoreHandle::for_entity::<Claim>("claims", Arc::new(MemoryStorage::new())))
        .unwrap()
        .register(StoreHandle::for_entity::<Scan>("scans", Arc::new(scans)))
        .unwrap();
    Resolver::new(Arc::new(stores.build()), Arc::new(RenditionRegistry::empty()))
}

#[tokio::test]
async fn test_resolve_single_property() {
    let resolver = scan_resolver().await;
    let claim = claim_with_scans();

    let resolution = resolver
        .resolve_property(&claim, "form", None, &accept(&["application/pdf"]))
        .await
        .unwrap();
    let (media_type, _, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("application/pdf"));
    assert_eq!(bytes, b"form");
}

#[tokio::test]
async fn test_resolve_collection_element_by_id() {
    let resolver = scan_resolver().await;
    let claim = claim_with_scans();

    let resolution = resolver
        .resolve_property(
            &claim,
            "evidence",
            Some(&ContentId::new("photo-2")),
            &accept(&["image/*"]),
        )
        .await
        .unwrap();
    let (media_type, _, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("image/png"));
    assert_eq!(bytes, b"png");

    let missing = resolver
        .resolve_property(
            &claim,
            "evidence",
            Some(&ContentId::new("photo-9")),
            &accept(&["image/*"]),
        )
        .await
        .unwrap();
    assert!(matches!(missing, Resolution::NotFound));
}

#[tokio::test]
async fn test_resolve_property_edge_cases() {
    let resolver = scan_resolver().await;
    let claim = Claim {
        form: None,
        evidence: Vec::new(),
    };

    let undeclared = resolver
        .resolve_property(&claim, "signature", None, &accept(&["*/*"]))
        .await
        .unwrap();
    assert!(matches!(undeclared, Resolution::NotApplicable));

    let unset = resolver
        .resolve_property(&claim, "form", None, &accept(&["*/*"]))
        .await
        .unwrap();
    assert!(matches!(unset, Resolution::NotFound));

    let no_selector = resolver
        .resolve_property(&claim_with_scans(), "evidence", None, &accept(&["*/*"]))
        .await
        .unwrap();
    assert!(matches!(no_selector, Resolution::NotFound));
}

#[tokio::test]
async fn test_resolve_property_of_parent_without_store() {
    let scans = MemoryStorage::new();
    scans
        .set_resource(
            Some(&ContentId::new("form-1")),
            stream_from_bytes(b"form".to_vec()),
        )
        .await
        .unwrap();
    let mut stores = StoreRegistry::builder();
    stores
        .register(StoreHandle::for_entity::<Scan>("scans", Arc::new(scans)))
        .unwrap();
    let resolver = Resolver::new(Arc::new(stores.build()), Arc::new(RenditionRegistry::empty()));
    let claim = claim_with_scans();

    let resolution = resolver
        .resolve_property(&claim, "form", None, &accept(&["application/pdf"]))
        .await
        .unwrap();
    let (media_type, _, bytes) = body_of(resolution).await;
    assert_eq!(media_type, mt("application/pdf"));
    assert_eq!(bytes, b"form");

    assert_eq!(resolver.stores().content_references(&claim).len(), 3);
}

// Writes

#[tokio::test]
async fn test_store_content_rejects_changed_id() {
    let (resolver, store) =
        resolver_with(Arc::new(RenamingBackend::default()), RenditionRegistry::empty());
    let mut descriptor = ContentDescriptor::new().with_content_id(ContentId::new("kept"));

    let err = resolver
        .store_content(
            &store,
            &mut descriptor,
            mt("image/png"),
            stream_from_bytes(b"png".to_vec()),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        StorageErrorKind::ContentIdMismatch { recorded, .. } if recorded == "kept"
    ));
    assert!(!err.is_retryable());
    assert_eq!(descriptor.content_id(), Some(&ContentId::new("kept")));
    assert!(descriptor.media_type().is_none());
}

#[tokio::test]
async fn test_unset_content_keeps_id() {
    let backend = Arc::new(CountingBackend::default());
    let (resolver, store) = resolver_with(backend.clone(), RenditionRegistry::empty());
    let mut blob = stored_blob(&resolver, &store, "image/png", b"png").await;
    let id = blob.content.content_id().cloned().unwrap();

    resolver.unset_content(&store, &mut blob.content).await.unwrap();
    assert_eq!(blob.content.content_id(), Some(&id));
    assert!(blob.content.media_type().is_none());
    assert!(!backend.inner.exists(&id).await.unwrap());

    // Without a media type the blob no longer resolves.
    let resolution = resolver.resolve_entity(&blob, &accept(&["*/*"])).await.unwrap();
    assert!(matches!(resolution, Resolution::NotApplicable));
}

#[tokio::test]
async fn test_rendition_stream_is_chunked() {
    let (resolver, store) = resolver_with(Arc::new(MemoryStorage::new()), html_renditions());
    let text = "line\n".repeat(40_000);
    let blob = stored_blob(&resolver, &store, "text/plain", text.as_bytes()).await;

    let plan = resolver
        .resolve_entity(&blob, &accept(&["text/html"]))
        .await
        .unwrap()
        .into_plan()
        .unwrap();
    let chunks: Vec<_> = plan.into_stream().collect().await;
    assert!(chunks.len() > 1);
    let html = collect_stream(futures::stream::iter(chunks).boxed()).await.unwrap();
    assert!(html.starts_with(b"<!DOCTYPE html>"));
}
