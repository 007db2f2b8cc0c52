//! Integration tests for [`HttpFetcher`] against a mock feed endpoint:
//! query encoding, credentials, status mapping and response shapes.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine::{
    AccessToken, ContentFetcher, FeedManager, HttpFetcher, LoadOutcome, PageRequest, TagSet,
    Visibility, VitrineError,
};

fn request(visibility: Visibility, page: u32, tags: &[&str]) -> PageRequest {
    PageRequest {
        visibility,
        page,
        tags: TagSet::new(tags),
        token: None,
    }
}

fn fetcher_for(server: &MockServer) -> HttpFetcher {
    HttpFetcher::new(format!("{}/api/feed", server.uri())).unwrap()
}

// =============================================================================
// Request encoding
// =============================================================================

#[tokio::test]
async fn sends_filter_page_and_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .and(query_param("filter", "public"))
        .and(query_param("page", "2"))
        .and(query_param("tags", "cats,dogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "id": "1", "url": "https://cdn.test/1.png" }],
            "hasMore": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let page = fetcher
        .fetch_page(&request(Visibility::Public, 2, &["Dogs", "cats"]))
        .await
        .unwrap();
    assert_eq!(page.images.len(), 1);
    assert!(page.has_more);
}

#[tokio::test]
async fn omits_tags_when_none_selected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .and(query_param_is_missing("tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let page = fetcher
        .fetch_page(&request(Visibility::Public, 0, &[]))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more);
}

#[tokio::test]
async fn sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("filter", "private"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "images": [{ "id": 9, "imageUrl": "https://cdn.test/9.png" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let mut req = request(Visibility::Private, 0, &[]);
    req.token = Some(AccessToken::new("secret-token"));
    let page = fetcher.fetch_page(&req).await.unwrap();
    assert_eq!(page.images[0].id, "9");
    // No signal on page 0: optimistic
    assert!(page.has_more);
}

// =============================================================================
// Status mapping
// =============================================================================

#[tokio::test]
async fn unauthorized_maps_to_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_page(&request(Visibility::Private, 0, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, VitrineError::AuthRequired));
}

#[tokio::test]
async fn forbidden_maps_to_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_page(&request(Visibility::Private, 0, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, VitrineError::AuthRequired));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_page(&request(Visibility::Public, 0, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, VitrineError::Api { status: 503, .. }));
}

#[tokio::test]
async fn non_json_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_page(&request(Visibility::Public, 0, &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, VitrineError::Json(_)));
}

// =============================================================================
// Response shapes
// =============================================================================

#[tokio::test]
async fn pagination_container_signal_is_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "id": "a", "url": "u" }],
            "pagination": { "hasMore": true, "page": 4 }
        })))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let page = fetcher
        .fetch_page(&request(Visibility::Public, 4, &[]))
        .await
        .unwrap();
    assert!(page.has_more);
}

#[tokio::test]
async fn later_page_without_signal_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "url": "u" },
            { "id": "b", "url": "u" }
        ])))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let page = fetcher
        .fetch_page(&request(Visibility::Public, 1, &[]))
        .await
        .unwrap();
    assert_eq!(page.images.len(), 2);
    assert!(!page.has_more);
}

// =============================================================================
// End to end through the manager
// =============================================================================

#[tokio::test]
async fn manager_pages_through_http_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "id": "a", "url": "u" }, { "id": "b", "url": "u" }],
            "data": { "hasMore": true }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [{ "id": "b", "url": "u" }, { "id": "c", "url": "u" }],
            "hasMore": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feed = FeedManager::builder()
        .fetcher(Arc::new(fetcher_for(&server)))
        .build()
        .unwrap();

    assert!(feed.load_initial().await.is_loaded());
    let more = feed.on_scroll_near_end().await;
    assert_eq!(more.images().len(), 1);
    assert!(!feed.has_more());
    assert!(matches!(
        feed.on_scroll_near_end().await,
        LoadOutcome::Skipped(_)
    ));

    let ids: Vec<_> = feed.current_images().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn builder_endpoint_creates_http_fetcher() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let feed = FeedManager::builder()
        .endpoint(format!("{}/api/feed", server.uri()))
        .build()
        .unwrap();
    assert!(matches!(feed.load_initial().await, LoadOutcome::NoResults));
}
