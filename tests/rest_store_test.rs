//! REST store wire format against a mock tracking server.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use shotsync::hierarchy::ThumbnailUploader;
use shotsync::resolver::{EntityResolver, Origin};
use shotsync::store::RestStore;
use shotsync_common::{
    EntityRef, EntityStore, NaturalKey, Record, ResolveError, ScopeFilter, StoreError,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store(server: &MockServer) -> RestStore {
    RestStore::new(
        &server.uri(),
        Some("secret-token".to_string()),
        Duration::from_secs(5),
        50,
    )
    .unwrap()
}

#[tokio::test]
async fn test_find_sends_filter_triples() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Shot/_search"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({
            "filters": [
                ["project", "is", {"type": "Project", "id": 65}],
                ["code", "is", "SH010"]
            ],
            "fields": ["code"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"type": "Shot", "id": 12, "code": "SH010"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filters = vec![
        ScopeFilter::is("project", EntityRef::new("Project", 65)),
        ScopeFilter::is("code", "SH010"),
    ];
    let records = store(&server)
        .find("Shot", &filters, &["code".to_string()])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get_string("id"), "12");
}

#[tokio::test]
async fn test_resolver_creates_through_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Episode/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Episode"))
        .and(body_json(json!({
            "code": "FER_101",
            "project": {"type": "Project", "id": 65}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"type": "Episode", "id": 7, "code": "FER_101"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = EntityResolver::new(Arc::new(store(&server)));
    let key = NaturalKey::new(
        "Episode",
        vec![ScopeFilter::is("project", EntityRef::new("Project", 65))],
        "FER_101",
    );

    let (record, origin) = resolver.resolve_key(&key).await.unwrap();
    assert_eq!(origin, Origin::Created);
    assert_eq!(record.get_string("id"), "7");

    // Served from the session cache; the mocks verify single calls on drop.
    let (_, origin) = resolver.resolve_key(&key).await.unwrap();
    assert_eq!(origin, Origin::Cached);
}

#[tokio::test]
async fn test_error_status_surfaces_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Shot/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = EntityResolver::new(Arc::new(store(&server)));
    let err = resolver.resolve("Shot", &[], "SH010").await.unwrap_err();

    assert_matches!(
        err,
        ResolveError::Store(StoreError::Status { status: 503, ref body, .. })
            if body == "maintenance"
    );
    assert_eq!(err.to_string(), "find returned 503: maintenance");
}

#[tokio::test]
async fn test_malformed_response_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Shot/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .mount(&server)
        .await;

    let err = store(&server).find("Shot", &[], &[]).await.unwrap_err();
    assert_matches!(err, StoreError::Decode(_));
}

#[tokio::test]
async fn test_thumbnail_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/entity/Shot/12/_upload/image"))
        .and(body_json(json!({"path": "/plates/SH010.mov"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 3}})))
        .expect(1)
        .mount(&server)
        .await;

    let shot = Record::new().with("type", "Shot").with("id", 12);
    store(&server)
        .upload(&shot, "/plates/SH010.mov")
        .await
        .unwrap();

    let err = store(&server)
        .upload(&Record::new(), "/plates/SH010.mov")
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Decode(_));
}
