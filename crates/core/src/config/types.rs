use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::catalog::SteamSpyConfig;
use crate::enrichment::StoreConfig;
use crate::relay::RelayConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: SteamSpyConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub relay: Option<RelayConfig>,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// How the aggregator pulls candidates from the catalog.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Page-by-page, one bounded batch per request.
    #[default]
    Incremental,
    /// One bulk slice enriched concurrently and ranked once.
    Bulk,
}

/// What `batch_size` counts in an incremental batch.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Up to `batch_size` enrichment attempts; ineligible items still count.
    #[default]
    Attempts,
    /// Keep consuming until `batch_size` records are accepted or the catalog runs dry.
    Successes,
}

/// Ranking / aggregation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub mode: RankingMode,
    /// Default batch size for `load_next_batch` when the caller gives none.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub batch_policy: BatchPolicy,
    /// Page fetch cap for a single success-bounded batch.
    #[serde(default = "default_max_pages_per_batch")]
    pub max_pages_per_batch: u32,
    /// Number of candidates taken from the bulk listing.
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,
    /// Concurrent enrichment calls in bulk mode.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            mode: RankingMode::default(),
            batch_size: default_batch_size(),
            batch_policy: BatchPolicy::default(),
            max_pages_per_batch: default_max_pages_per_batch(),
            bulk_size: default_bulk_size(),
            bulk_concurrency: default_bulk_concurrency(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_max_pages_per_batch() -> u32 {
    5
}

fn default_bulk_size() -> usize {
    100
}

fn default_bulk_concurrency() -> usize {
    8
}

/// Fallback search budgets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Maximum catalog pages scanned on a local miss.
    #[serde(default = "default_page_budget")]
    pub page_budget: u32,
    /// Maximum fallback matches returned.
    #[serde(default = "default_result_budget")]
    pub result_budget: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_budget: default_page_budget(),
            result_budget: default_result_budget(),
        }
    }
}

fn default_page_budget() -> u32 {
    5
}

fn default_result_budget() -> usize {
    10
}

/// Sanitized config for API responses (relay target hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub catalog: SteamSpyConfig,
    pub store: StoreConfig,
    pub relay_configured: bool,
    pub ranking: RankingConfig,
    pub search: SearchConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            catalog: config.catalog.clone(),
            store: config.store.clone(),
            relay_configured: config.relay.is_some(),
            ranking: config.ranking.clone(),
            search: config.search.clone(),
        }
    }
}
