//! Outbound request construction.
//!
//! Upstream calls are described as an endpoint plus a parameter list and only
//! turned into a URL at the edge. An optional relay (a pass-through proxy that
//! takes the target URL as its last query parameter) is applied there too, so
//! call sites never know whether one is configured.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An upstream request that could not be turned into a URL.
#[derive(Debug, Error)]
#[error("Invalid upstream URL '{url}': {reason}")]
pub struct InvalidUrl {
    pub url: String,
    pub reason: String,
}

/// Pass-through relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayConfig {
    /// Prefix the percent-encoded target URL is appended to,
    /// e.g. `https://relay.example/?url=`.
    pub url_prefix: String,
}

/// A structured upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Absolute endpoint URL without query string.
    pub endpoint: String,
    /// Query parameters in the order they should appear.
    pub params: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Create a request for an endpoint with no parameters.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// The direct upstream URL.
    pub fn target_url(&self) -> Result<Url, InvalidUrl> {
        let parsed = if self.params.is_empty() {
            Url::parse(&self.endpoint)
        } else {
            Url::parse_with_params(&self.endpoint, &self.params)
        };
        parsed.map_err(|e| InvalidUrl {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    /// The URL to actually send, routed through `relay` when one is set.
    pub fn resolve(&self, relay: Option<&RelayConfig>) -> Result<Url, InvalidUrl> {
        let target = self.target_url()?;
        let Some(relay) = relay else {
            return Ok(target);
        };

        let relayed = format!(
            "{}{}",
            relay.url_prefix,
            urlencoding::encode(target.as_str())
        );
        Url::parse(&relayed).map_err(|e| InvalidUrl {
            url: relayed,
            reason: e.to_string(),
        })
    }
}
