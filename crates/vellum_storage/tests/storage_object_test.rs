//! Tests for object storage backend against a mock server.

use vellum_core::{ContentId, stream_from_bytes};
use vellum_storage::{
    BackendKind, ObjectStorage, ObjectStorageConfig, ResourceBackend, StorageErrorKind,
};
use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn storage_for(server_uri: &str) -> ObjectStorage {
    let config = ObjectStorageConfig::builder()
        .endpoint(server_uri)
        .bucket("content")
        .prefix("docs/")
        .timeout_secs(5u64)
        .build()
        .unwrap();
    ObjectStorage::new(config).unwrap()
}

#[test]
fn test_config_defaults() {
    let config: ObjectStorageConfig = serde_json::from_str(
        r#"{"endpoint": "http://localhost:9000", "bucket": "content"}"#,
    )
    .unwrap();
    assert_eq!(config.prefix(), "");
    assert_eq!(*config.timeout_secs(), 30);
}

#[test]
fn test_missing_bucket_is_rejected() {
    let config = ObjectStorageConfig::builder()
        .endpoint("http://localhost:9000")
        .bucket("")
        .build()
        .unwrap();
    let err = ObjectStorage::new(config).unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::InvalidPath(_)));
}

#[tokio::test]
async fn test_get_streams_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/docs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"object bytes".to_vec()))
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    assert_eq!(storage.kind(), BackendKind::ObjectStorage);

    let resource = storage.get_resource(&ContentId::new("abc")).await.unwrap();
    assert_eq!(resource.length(), Some(12));
    assert_eq!(resource.into_bytes().await.unwrap(), b"object bytes");
}

#[tokio::test]
async fn test_get_missing_object_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    let err = storage.get_resource(&ContentId::new("gone")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    let err = storage.get_resource(&ContentId::new("abc")).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::Unavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_put_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/content/docs/upload"))
        .and(body_bytes(b"payload".to_vec()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    let id = ContentId::new("upload");
    let stored = storage
        .set_resource(Some(&id), stream_from_bytes(b"payload".to_vec()))
        .await
        .unwrap();
    assert_eq!(stored.content_id, id);
    assert_eq!(stored.length, 7);
}

#[tokio::test]
async fn test_delete_tolerates_missing_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    storage.delete_resource(&ContentId::new("gone")).await.unwrap();
}

#[tokio::test]
async fn test_exists_uses_head() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/content/docs/present"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/content/docs/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let storage = storage_for(&server.uri());
    assert!(storage.exists(&ContentId::new("present")).await.unwrap());
    assert!(!storage.exists(&ContentId::new("absent")).await.unwrap());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let storage = storage_for(&uri);
    let err = storage.get_resource(&ContentId::new("abc")).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::Unavailable(_)));
}
