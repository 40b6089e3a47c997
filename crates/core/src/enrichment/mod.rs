//! Per-item enrichment.
//!
//! Enrichment turns a candidate id into an `EnrichedRecord` by reading two
//! independent attribute sets from the store: item details (critic score,
//! name, artwork) and the review tally. Any failure is reported per item and
//! never aborts the caller's batch.

mod client;
mod steam_store;
mod types;

pub use client::StoreEnricher;
pub use steam_store::{SteamStoreClient, StoreConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a single store read.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The store does not know the item, or reported it unsuccessful.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// The two store reads enrichment needs.
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Fetch item details.
    async fn fetch_details(&self, id: &str) -> Result<ItemDetails, StoreError>;

    /// Fetch the positive/negative review tally.
    async fn fetch_review_tally(&self, id: &str) -> Result<ReviewTally, StoreError>;
}

/// Turns a candidate id into an enrichment outcome.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Enrich one item. Never fails; failures are outcomes.
    async fn enrich(&self, id: &str) -> EnrichmentOutcome;
}
