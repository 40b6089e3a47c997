//! SteamSpy catalog client.
//!
//! `request=all` pages are 0-indexed on the wire and hold up to 1000 apps,
//! ordered by owner count. The response is a JSON object keyed by app id, so
//! key order is the listing order.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{CandidateRef, CandidateSource, CatalogError};
use crate::metrics::record_upstream;
use crate::relay::{RelayConfig, UpstreamRequest};

const SERVICE: &str = "steamspy";

/// SteamSpy client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamSpyConfig {
    /// Base URL (default: https://steamspy.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://steamspy.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for SteamSpyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// SteamSpy API client.
pub struct SteamSpyClient {
    client: Client,
    base_url: String,
    relay: Option<RelayConfig>,
}

impl SteamSpyClient {
    /// Create a new SteamSpy client.
    pub fn new(config: SteamSpyConfig, relay: Option<RelayConfig>) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            relay,
        })
    }

    fn listing_request(&self) -> UpstreamRequest {
        UpstreamRequest::new(format!("{}/api.php", self.base_url))
    }

    async fn fetch_listing(
        &self,
        request: UpstreamRequest,
        operation: &str,
    ) -> Result<Vec<CandidateRef>, CatalogError> {
        let url = request
            .resolve(self.relay.as_ref())
            .map_err(|e| CatalogError::InvalidRequest(e.to_string()))?;

        debug!("SteamSpy {}: {}", operation, url);

        let start = Instant::now();
        let result = self.send(url).await;
        record_upstream(SERVICE, operation, start, result.is_ok());
        result
    }

    async fn send(&self, url: reqwest::Url) -> Result<Vec<CandidateRef>, CatalogError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == 429 {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let listing: Map<String, Value> = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse SteamSpy listing: {}", e))
        })?;

        Ok(parse_listing(listing))
    }
}

#[async_trait]
impl CandidateSource for SteamSpyClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn fetch_page(&self, page_number: u32) -> Result<Vec<CandidateRef>, CatalogError> {
        let request = self
            .listing_request()
            .param("request", "all")
            .param("page", page_number.saturating_sub(1));

        self.fetch_listing(request, "page").await
    }

    async fn top_slice(&self, n: usize) -> Result<Vec<CandidateRef>, CatalogError> {
        let request = self.listing_request().param("request", "top100in2weeks");

        let mut listing = self.fetch_listing(request, "top").await?;
        listing.truncate(n);
        Ok(listing)
    }
}

// ============================================================================
// SteamSpy API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SteamSpyEntry {
    appid: Option<u64>,
    #[serde(default)]
    name: Option<String>,
}

fn parse_listing(listing: Map<String, Value>) -> Vec<CandidateRef> {
    listing
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<SteamSpyEntry>(value) {
            Ok(entry) => Some(CandidateRef {
                id: entry.appid.map(|id| id.to_string()).unwrap_or(key),
                name: entry.name.filter(|n| !n.trim().is_empty()),
            }),
            Err(e) => {
                debug!("Skipping malformed SteamSpy entry {}: {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_keeps_order() {
        let listing: Map<String, Value> = serde_json::from_str(
            r#"{
                "570": {"appid": 570, "name": "Dota 2"},
                "10": {"appid": 10, "name": "Counter-Strike"},
                "440": {"appid": 440, "name": "Team Fortress 2"}
            }"#,
        )
        .unwrap();

        let ids: Vec<String> = parse_listing(listing).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["570", "10", "440"]);
    }

    #[test]
    fn test_parse_listing_blank_name_and_missing_appid() {
        let listing: Map<String, Value> =
            serde_json::from_str(r#"{"42": {"name": ""}, "7": "garbage"}"#).unwrap();

        let candidates = parse_listing(listing);
        assert_eq!(candidates, vec![CandidateRef::new("42")]);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = SteamSpyClient::new(
            SteamSpyConfig {
                base_url: "http://localhost:9000/".to_string(),
                timeout_secs: 5,
            },
            None,
        )
        .unwrap();
        assert_eq!(
            client.listing_request().endpoint,
            "http://localhost:9000/api.php"
        );
    }
}
