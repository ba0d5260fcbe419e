//! # Tests Module
//!
//! Integration tests for the opensearch-twitter service.
//!
//! ## Test Categories
//!
//! ### Client Tests
//! - Bearer token acquisition and caching
//! - Token re-acquisition after a 401
//! - Search and user timeline request parameters
//!
//! ### Collection Tests
//! - Query building, mapping and pagination end-to-end
//! - Upstream failures surfaced as errors
//!
//! ### Endpoint Tests
//! - Atom, JSON and HTML search responses
//! - Description document, health check and unknown collections
//!
//! ## Test Environment
//!
//! A small axum server bound to `127.0.0.1:0` stands in for the Twitter API,
//! so no test needs network access or real credentials.

use crate::{
    build_router,
    config::TwitterConfig,
    handlers::{handle_health, AppState},
    oauth::build_basic_auth_header,
    twitter::{Account, TwitterClient},
    TwitterCollection, TwitterError,
};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const CONSUMER_KEY: &str = "test-key";
const CONSUMER_SECRET: &str = "test-secret";
const FIXTURE_SIZE: usize = 12;

/// Recorded state of the mock Twitter API.
#[derive(Default)]
struct MockTwitter {
    token_requests: AtomicUsize,
    /// Answer 401 to any data request made with the first issued token
    reject_first_token: bool,
    /// Answer 500 to every data request
    fail: bool,
    search_requests: Mutex<Vec<HashMap<String, String>>>,
    timeline_requests: Mutex<Vec<HashMap<String, String>>>,
}

impl MockTwitter {
    fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    fn last_search(&self) -> HashMap<String, String> {
        self.search_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no search request recorded")
    }

    fn last_timeline(&self) -> HashMap<String, String> {
        self.timeline_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no timeline request recorded")
    }

    /// Checks the bearer header of a data request.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !auth.starts_with("Bearer token-") {
            return Err((StatusCode::FORBIDDEN, "missing bearer token").into_response());
        }
        if self.reject_first_token && auth == "Bearer token-1" {
            return Err((StatusCode::UNAUTHORIZED, r#"{"errors":[{"code":89}]}"#).into_response());
        }
        if self.fail {
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response());
        }
        Ok(())
    }
}

/// Number of statuses the mock returns: `count` when given, like the real
/// API, otherwise `available`.
fn requested(params: &HashMap<String, String>, available: usize) -> usize {
    params
        .get("count")
        .and_then(|c| c.parse::<usize>().ok())
        .map_or(available, |count| count.min(available))
}

/// Builds `count` status objects from `ESA_EO`, ids `100`, `101`, ...
fn fixture_statuses(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                "id": 100 + i,
                "id_str": (100 + i).to_string(),
                "text": format!("Tweet {} about #EGU17 with @terradue", i),
                "user": {
                    "name": "ESA EO",
                    "screen_name": "ESA_EO",
                    "profile_image_url_https": "https://pbs.twimg.com/esa.png"
                },
                "entities": {"hashtags": [{"text": "EGU17"}], "user_mentions": null},
                "lang": "en"
            })
        })
        .collect()
}

async fn mock_token(
    State(mock): State<Arc<MockTwitter>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != build_basic_auth_header(CONSUMER_KEY, CONSUMER_SECRET)
        || body != "grant_type=client_credentials"
    {
        return (StatusCode::FORBIDDEN, "bad client credentials").into_response();
    }
    let n = mock.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"token_type": "bearer", "access_token": format!("token-{}", n)})).into_response()
}

async fn mock_search(
    State(mock): State<Arc<MockTwitter>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let returned = requested(&params, FIXTURE_SIZE);
    mock.search_requests.lock().unwrap().push(params);
    if let Err(response) = mock.authorize(&headers) {
        return response;
    }
    Json(json!({
        "statuses": fixture_statuses(returned),
        "search_metadata": {"count": returned, "completed_in": 0.01}
    }))
    .into_response()
}

async fn mock_timeline(
    State(mock): State<Arc<MockTwitter>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let returned = requested(&params, 3);
    mock.timeline_requests.lock().unwrap().push(params);
    if let Err(response) = mock.authorize(&headers) {
        return response;
    }
    Json(Value::Array(fixture_statuses(returned))).into_response()
}

/// Starts the mock Twitter API and returns its base URL.
async fn spawn_mock_twitter(mock: Arc<MockTwitter>) -> String {
    let app = Router::new()
        .route("/oauth2/token", post(mock_token))
        .route("/1.1/search/tweets.json", get(mock_search))
        .route("/1.1/statuses/user_timeline.json", get(mock_timeline))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn client_for(mock: Arc<MockTwitter>) -> TwitterClient {
    let api_url = spawn_mock_twitter(mock).await;
    let config = TwitterConfig::new(CONSUMER_KEY, CONSUMER_SECRET).with_api_url(api_url);
    TwitterClient::new(&config).unwrap()
}

fn default_accounts() -> Vec<Account> {
    vec![
        Account::new("ESA_EO").with_tags(vec!["EGU17".to_string()]),
        Account::new("terradue"),
    ]
}

async fn collection_for(mock: Arc<MockTwitter>, accounts: Vec<Account>) -> TwitterCollection {
    TwitterCollection::new(
        "tweet",
        "http://localhost:3000",
        accounts,
        client_for(mock).await,
    )
}

/// Creates the application router backed by the mock Twitter API.
async fn create_test_app(mock: Arc<MockTwitter>) -> Router {
    let collection = collection_for(mock, default_accounts()).await;
    build_router(Arc::new(AppState { collection }))
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn get_response(app: Router, uri: &str, accept: Option<&str>) -> (StatusCode, HeaderMap, String) {
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Tests that the bearer token is exchanged once and reused across calls.
#[tokio::test]
async fn test_bearer_token_is_cached() {
    let mock = Arc::new(MockTwitter::default());
    let client = client_for(mock.clone()).await;

    client.search("from:ESA_EO", None).await.unwrap();
    client.search("from:terradue", None).await.unwrap();
    client.user_timeline("ESA_EO", None, Some(5)).await.unwrap();

    assert_eq!(mock.token_requests(), 1);
}

/// Tests that simultaneous first calls on a fresh client share one token exchange.
#[tokio::test]
async fn test_concurrent_first_calls_fetch_one_token() {
    let mock = Arc::new(MockTwitter::default());
    let client = client_for(mock.clone()).await;

    let (first, second, timeline) = tokio::join!(
        client.search("from:ESA_EO", None),
        client.search("from:terradue", Some(3)),
        client.user_timeline("ESA_EO", None, None),
    );

    assert_eq!(first.unwrap().statuses.len(), FIXTURE_SIZE);
    assert_eq!(second.unwrap().statuses.len(), 3);
    assert_eq!(timeline.unwrap().len(), 3);
    assert_eq!(mock.token_requests(), 1);
    assert_eq!(mock.search_requests.lock().unwrap().len(), 2);
}

/// Tests that a 401 discards the token, fetches a new one and retries once.
#[tokio::test]
async fn test_unauthorized_reacquires_token_and_retries() {
    let mock = Arc::new(MockTwitter {
        reject_first_token: true,
        ..Default::default()
    });
    let client = client_for(mock.clone()).await;

    let response = client.search("from:ESA_EO", None).await.unwrap();

    assert_eq!(response.statuses.len(), FIXTURE_SIZE);
    assert_eq!(mock.token_requests(), 2);
    assert_eq!(mock.search_requests.lock().unwrap().len(), 2);
    assert_eq!(client.bearer_token().await.unwrap(), "token-2");
}

/// Tests that wrong credentials surface as an API error on the token exchange.
#[tokio::test]
async fn test_bad_credentials_fail_token_exchange() {
    let api_url = spawn_mock_twitter(Arc::new(MockTwitter::default())).await;
    let config = TwitterConfig::new("wrong", "credentials").with_api_url(api_url);
    let client = TwitterClient::new(&config).unwrap();

    let err = client.search("from:ESA_EO", None).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

/// Tests the query string sent to the search endpoint.
#[tokio::test]
async fn test_search_sends_query_and_count() {
    let mock = Arc::new(MockTwitter::default());
    let client = client_for(mock.clone()).await;

    client
        .search("\"sea ice\" AND from:ESA_EO AND #EGU17", Some(15))
        .await
        .unwrap();

    let sent = mock.last_search();
    assert_eq!(sent["q"], "\"sea ice\" AND from:ESA_EO AND #EGU17");
    assert_eq!(sent["count"], "15");
}

/// Tests that a search through the collection combines every configured account.
#[tokio::test]
async fn test_collection_search_combines_accounts() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), default_accounts()).await;

    let feed = collection.query(&HashMap::new()).await.unwrap();

    assert_eq!(
        mock.last_search()["q"],
        "from:ESA_EO AND #EGU17 OR from:terradue"
    );
    assert!(!mock.last_search().contains_key("count"));
    assert_eq!(feed.total_count, FIXTURE_SIZE);
    assert_eq!(feed.items.len(), FIXTURE_SIZE);

    let first = &feed.items[0];
    assert_eq!(first.identifier, "100");
    assert_eq!(first.author, "ESA_EO");
    assert_eq!(first.title, "ESA EO");
    assert_eq!(first.url, "http://twitter.com/ESA_EO/status/100");
    assert_eq!(first.published_at.to_rfc3339(), "2018-10-10T20:19:24+00:00");
    assert!(first
        .content
        .contains("<a href=\"http://twitter.com/hashtag/EGU17\">#EGU17</a>"));
}

/// Tests the author allow-list and free text through the collection.
#[tokio::test]
async fn test_collection_search_with_author_filter() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), default_accounts()).await;

    collection
        .query(&params(&[("q", "volcano"), ("author", " terradue ")]))
        .await
        .unwrap();

    assert_eq!(mock.last_search()["q"], "\"volcano\" AND from:terradue");
}

/// Tests that pages are cut from the fetched tweets only.
///
/// `count` is both sent upstream and used as the page size, so a second page
/// is empty: only `count` tweets were ever fetched.
#[tokio::test]
async fn test_collection_second_page_is_empty() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), default_accounts()).await;

    let feed = collection
        .query(&params(&[("count", "5"), ("startPage", "2")]))
        .await
        .unwrap();

    assert_eq!(mock.last_search()["count"], "5");
    assert_eq!(feed.total_count, 5);
    assert_eq!(feed.items_per_page, 5);
    assert!(feed.items.is_empty());
}

/// Tests that `startIndex` windows within the fetched tweets.
#[tokio::test]
async fn test_collection_start_index_windows_fetched_items() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), default_accounts()).await;

    let feed = collection
        .query(&params(&[("count", "5"), ("startIndex", "3")]))
        .await
        .unwrap();

    assert_eq!(feed.total_count, 5);
    assert_eq!(feed.start_index, 3);
    let ids: Vec<&str> = feed.items.iter().map(|i| i.identifier.as_str()).collect();
    assert_eq!(ids, ["102", "103", "104"]);
}

/// Tests that a page past the end is empty but still reports the fetched total.
#[tokio::test]
async fn test_collection_page_past_end_is_empty() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock, default_accounts()).await;

    let feed = collection
        .query(&params(&[("startIndex", "50")]))
        .await
        .unwrap();

    assert!(feed.items.is_empty());
    assert_eq!(feed.total_count, FIXTURE_SIZE);
}

/// Tests that a timeline request defaults to ten tweets and ignores the accounts.
#[tokio::test]
async fn test_collection_timeline_defaults_count() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), default_accounts()).await;

    let feed = collection
        .query(&params(&[("searchtype", "timeline"), ("author", "ESA_EO")]))
        .await
        .unwrap();

    let sent = mock.last_timeline();
    assert_eq!(sent["screen_name"], "ESA_EO");
    assert_eq!(sent["count"], "10");
    assert!(!sent.contains_key("q"));
    assert!(mock.search_requests.lock().unwrap().is_empty());
    assert_eq!(feed.total_count, 3);
}

/// Tests that `scn` stands in for `author` and `q` is forwarded on timelines.
#[tokio::test]
async fn test_collection_timeline_with_screen_name_alias() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), Vec::new()).await;

    collection
        .query(&params(&[
            ("searchtype", "timeline"),
            ("scn", "@terradue"),
            ("q", "EGU17"),
            ("count", "3"),
        ]))
        .await
        .unwrap();

    let sent = mock.last_timeline();
    assert_eq!(sent["screen_name"], "terradue");
    assert_eq!(sent["q"], "EGU17");
    assert_eq!(sent["count"], "3");
}

/// Tests that an empty account list never reaches the API.
#[tokio::test]
async fn test_collection_without_accounts_is_empty() {
    let mock = Arc::new(MockTwitter::default());
    let collection = collection_for(mock.clone(), Vec::new()).await;

    let feed = collection.query(&HashMap::new()).await.unwrap();

    assert_eq!(feed.total_count, 0);
    assert!(feed.items.is_empty());
    assert_eq!(mock.token_requests(), 0);
}

/// Tests that an upstream failure is an error, not an empty result.
#[tokio::test]
async fn test_collection_upstream_failure_is_error() {
    let mock = Arc::new(MockTwitter {
        fail: true,
        ..Default::default()
    });
    let collection = collection_for(mock, default_accounts()).await;

    let err = collection.query(&HashMap::new()).await.unwrap_err();

    assert!(matches!(err, TwitterError::Api { status: 500, .. }));
}

/// Tests the health endpoint handler directly.
#[tokio::test]
async fn test_handle_health() {
    let Json(body) = handle_health().await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "opensearch-twitter");
}

/// Tests the GET /health endpoint via HTTP request.
#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, _, body) = get_response(app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({"status": "healthy", "service": "opensearch-twitter"}));
}

/// Tests that the root endpoint points at the description document.
#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, _, body) = get_response(app, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("http://localhost:3000/tweet/description"));
}

/// Tests that the search endpoint returns Atom by default.
#[tokio::test]
async fn test_search_endpoint_atom() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, headers, body) = get_response(app, "/tweet/search?count=5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type(&headers).starts_with("application/atom+xml"));
    assert!(body.contains("<os:totalResults>5</os:totalResults>"));
    assert!(body.contains("<os:itemsPerPage>5</os:itemsPerPage>"));
    assert_eq!(body.matches("<entry>").count(), 5);
    assert!(body.contains("<id>http://localhost:3000/tweet/search?count=5</id>"));
}

/// Tests the JSON rendering selected with the `format` parameter.
#[tokio::test]
async fn test_search_endpoint_json() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, headers, body) =
        get_response(app, "/tweet/search?format=json&count=6&startIndex=5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type(&headers).starts_with("application/json"));
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["totalCount"], 6);
    assert_eq!(json["itemsPerPage"], 6);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["identifier"], "104");
    assert_eq!(json["items"][0]["authorImageUrl"], "https://pbs.twimg.com/esa.png");
    assert_eq!(json["items"][1]["url"], "http://twitter.com/ESA_EO/status/105");
}

/// Tests the HTML rendering selected through the Accept header.
#[tokio::test]
async fn test_search_endpoint_html_from_accept() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, headers, body) = get_response(
        app,
        "/tweet/search?count=3",
        Some("text/html,application/xhtml+xml"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type(&headers).starts_with("text/html"));
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert_eq!(body.matches("class=\"tweet\"").count(), 3);
}

/// Tests that an upstream failure is reported as 502 Bad Gateway.
#[tokio::test]
async fn test_search_endpoint_upstream_failure() {
    let app = create_test_app(Arc::new(MockTwitter {
        fail: true,
        ..Default::default()
    }))
    .await;
    let (status, _, body) = get_response(app, "/tweet/search", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Failed to fetch tweets");
}

/// Tests that an unknown collection identifier is a 404.
#[tokio::test]
async fn test_unknown_collection_returns_not_found() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let (status, _, body) = get_response(app.clone(), "/nope/search", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "error");

    let (status, _, _) = get_response(app, "/nope/description", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Tests the OpenSearch description endpoint.
#[tokio::test]
async fn test_description_endpoint() {
    let mock = Arc::new(MockTwitter::default());
    let app = create_test_app(mock.clone()).await;
    let (status, headers, body) = get_response(app, "/tweet/description", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        content_type(&headers),
        "application/opensearchdescription+xml"
    );
    assert!(body.contains("<OpenSearchDescription"));
    assert!(body.contains("type=\"application/atom+xml\""));
    assert!(body.contains("type=\"application/json\""));
    assert!(body.contains("type=\"text/html\""));
    assert!(body.contains("http://localhost:3000/tweet/search?"));
    assert_eq!(mock.token_requests(), 0);
}

/// Tests that unsupported methods are rejected.
#[tokio::test]
async fn test_search_endpoint_rejects_post() {
    let app = create_test_app(Arc::new(MockTwitter::default())).await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tweet/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
