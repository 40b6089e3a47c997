//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process with
//! mock upstreams injected, so every endpoint can be exercised without
//! network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gamerank_core::{
    testing::{MockCandidateSource, MockStore},
    CandidateSource, Config, Enricher, StoreApi, StoreEnricher,
};

/// Re-export fixtures for test convenience
pub use gamerank_core::testing::fixtures;

/// Test fixture with an in-process router over mock upstreams.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_first_batch() {
///     let fixture = TestFixture::new().await;
///     fixture.source.set_pages(vec![vec![fixtures::candidate("1", "A")]]).await;
///
///     let response = fixture.post("/api/v1/rankings/next", json!({})).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure pages and failures
    pub source: Arc<MockCandidateSource>,
    /// Mock store - configure items and failures
    pub store: Arc<MockStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the default config.
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    /// Create a test fixture with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let source = Arc::new(MockCandidateSource::new());
        let store = Arc::new(MockStore::new());
        let enricher: Arc<dyn Enricher> = Arc::new(StoreEnricher::new(
            Arc::clone(&store) as Arc<dyn StoreApi>
        ));

        let state = Arc::new(gamerank_server::state::AppState::new(
            config,
            Arc::clone(&source) as Arc<dyn CandidateSource>,
            enricher,
        ));
        let router = gamerank_server::api::create_router(state);

        Self {
            router,
            source,
            store,
        }
    }

    /// Seed one catalog page of eligible items, `(id, name, critic, positive, negative)`.
    pub async fn seed_page(&self, items: &[(&str, &str, f64, u64, u64)]) {
        let mut page = Vec::new();
        for (id, name, critic, positive, negative) in items {
            self.store
                .add_item(fixtures::item(id, name, *critic, *positive, *negative))
                .await;
            page.push(fixtures::candidate(id, name));
        }
        self.source.set_pages(vec![page]).await;
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
