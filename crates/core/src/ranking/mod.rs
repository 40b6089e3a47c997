//! Global ranking over incrementally discovered items.
//!
//! The `Aggregator` owns the ranked list and the pagination cursor for one
//! session; the `SearchIndex` reads them and may scan further catalog pages on
//! its own without touching either.

mod aggregator;
mod ranked_list;
mod search;
mod types;

pub use aggregator::Aggregator;
pub use ranked_list::RankedList;
pub use search::SearchIndex;
pub use types::*;

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors surfaced by aggregation.
#[derive(Debug, Error)]
pub enum RankingError {
    /// A catalog page could not be fetched; the batch was rolled back.
    #[error("Batch failed: {0}")]
    BatchFailure(#[from] CatalogError),
}
