//! Steam storefront client.
//!
//! Reads `appdetails` (name, artwork, metacritic score) and `appreviews`
//! (review tally). Unknown apps come back as `success: false` rather than a
//! 404, and are surfaced as `StoreError::NotFound`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ItemDetails, ReviewTally, StoreApi, StoreError};
use crate::metrics::record_upstream;
use crate::relay::{RelayConfig, UpstreamRequest};

const SERVICE: &str = "steam_store";

/// Storefront client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL (default: https://store.steampowered.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://store.steampowered.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Steam storefront API client.
pub struct SteamStoreClient {
    client: Client,
    base_url: String,
    relay: Option<RelayConfig>,
}

impl SteamStoreClient {
    /// Create a new storefront client.
    pub fn new(config: StoreConfig, relay: Option<RelayConfig>) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            relay,
        })
    }

    fn details_request(&self, id: &str) -> UpstreamRequest {
        UpstreamRequest::new(format!("{}/api/appdetails", self.base_url)).param("appids", id)
    }

    fn reviews_request(&self, id: &str) -> UpstreamRequest {
        UpstreamRequest::new(format!("{}/appreviews/{}", self.base_url, id))
            .param("json", 1)
            .param("language", "all")
            .param("purchase_type", "all")
            .param("num_per_page", 0)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/app/{}", self.base_url, id)
    }

    fn resolve(&self, request: &UpstreamRequest) -> Result<Url, StoreError> {
        request
            .resolve(self.relay.as_ref())
            .map_err(|e| StoreError::InvalidRequest(e.to_string()))
    }

    async fn get(&self, url: Url, id: &str) -> Result<Response, StoreError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if status == 429 {
            return Err(StoreError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }

    async fn details(&self, id: &str) -> Result<ItemDetails, StoreError> {
        let url = self.resolve(&self.details_request(id))?;
        debug!("Store details: id={}", id);

        let mut envelope: HashMap<String, AppDetailsEnvelope> =
            self.get(url, id).await?.json().await.map_err(|e| {
                StoreError::ParseError(format!("Failed to parse appdetails response: {}", e))
            })?;

        let data = envelope
            .remove(id)
            .filter(|entry| entry.success)
            .and_then(|entry| entry.data)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(ItemDetails {
            id: id.to_string(),
            name: data.name,
            critic_score: data.metacritic.and_then(|m| m.score),
            image_url: data.header_image.filter(|u| !u.is_empty()),
            item_url: self.item_url(id),
        })
    }

    async fn reviews(&self, id: &str) -> Result<ReviewTally, StoreError> {
        let url = self.resolve(&self.reviews_request(id))?;
        debug!("Store reviews: id={}", id);

        let response: AppReviewsResponse = self.get(url, id).await?.json().await.map_err(|e| {
            StoreError::ParseError(format!("Failed to parse appreviews response: {}", e))
        })?;

        if response.success != 1 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let summary = response.query_summary.ok_or_else(|| {
            StoreError::ParseError(format!("appreviews for {} has no query_summary", id))
        })?;

        Ok(ReviewTally {
            positive: summary.total_positive,
            negative: summary.total_negative,
        })
    }
}

#[async_trait]
impl StoreApi for SteamStoreClient {
    async fn fetch_details(&self, id: &str) -> Result<ItemDetails, StoreError> {
        let start = Instant::now();
        let result = self.details(id).await;
        record_upstream(SERVICE, "details", start, result.is_ok());
        result
    }

    async fn fetch_review_tally(&self, id: &str) -> Result<ReviewTally, StoreError> {
        let start = Instant::now();
        let result = self.reviews(id).await;
        record_upstream(SERVICE, "reviews", start, result.is_ok());
        result
    }
}

// ============================================================================
// Storefront API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct AppDetailsEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: String,
    #[serde(default)]
    header_image: Option<String>,
    #[serde(default)]
    metacritic: Option<Metacritic>,
}

#[derive(Debug, Deserialize)]
struct Metacritic {
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AppReviewsResponse {
    success: i64,
    #[serde(default)]
    query_summary: Option<QuerySummary>,
}

#[derive(Debug, Deserialize)]
struct QuerySummary {
    #[serde(default)]
    total_positive: u64,
    #[serde(default)]
    total_negative: u64,
}
