//! Candidate discovery from a paginated external catalog.
//!
//! A `CandidateSource` hands out pages of candidate identifiers. Sources that
//! only offer one bulk ranked listing implement `top_slice` and may report an
//! empty listing for every page past the first.

mod steamspy;
mod types;

pub use steamspy::{SteamSpyClient, SteamSpyConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Page-level failures. These abort the batch that requested the page.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

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

/// A lazily paged catalog of candidates.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Name of this source for logging.
    fn name(&self) -> &str;

    /// Fetch one page (1-based). An empty page means the catalog is exhausted.
    async fn fetch_page(&self, page_number: u32) -> Result<Vec<CandidateRef>, CatalogError>;

    /// Fetch the first n entries of the source's bulk ranked listing.
    async fn top_slice(&self, n: usize) -> Result<Vec<CandidateRef>, CatalogError>;

    /// Fetch the first page.
    async fn first_page(&self) -> Result<Vec<CandidateRef>, CatalogError> {
        self.fetch_page(1).await
    }

    /// Fetch the page following the one `cursor` points at.
    async fn next_page(
        &self,
        cursor: &PaginationCursor,
    ) -> Result<Vec<CandidateRef>, CatalogError> {
        self.fetch_page(cursor.page_number + 1).await
    }
}
