//! Testing utilities and mock implementations of the upstream seams.
//!
//! The mocks stand in for the paginated catalog and the store, so aggregation
//! and search can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use gamerank_core::testing::{fixtures, MockCandidateSource, MockStore};
//!
//! let source = MockCandidateSource::new();
//! source.set_pages(vec![vec![fixtures::candidate("620", "Portal 2")]]).await;
//!
//! let store = MockStore::new();
//! store.add_item(fixtures::item("620", "Portal 2", 95.0, 120, 30)).await;
//! ```

mod mock_catalog;
mod mock_store;

pub use mock_catalog::MockCandidateSource;
pub use mock_store::{MockStore, StoreItem};

/// Test fixtures and helper functions.
pub mod fixtures {
    use super::StoreItem;
    use crate::catalog::CandidateRef;
    use crate::enrichment::{EnrichedRecord, ItemDetails, ReviewTally};

    /// A catalog candidate carrying a name.
    pub fn candidate(id: &str, name: &str) -> CandidateRef {
        CandidateRef::named(id, name)
    }

    /// A store item with a critic score and the given review tally.
    pub fn item(id: &str, name: &str, critic_score: f64, positive: u64, negative: u64) -> StoreItem {
        StoreItem {
            details: ItemDetails {
                id: id.to_string(),
                name: name.to_string(),
                critic_score: Some(critic_score),
                image_url: Some(format!("https://cdn.example.com/{}/header.jpg", id)),
                item_url: format!("https://store.example.com/app/{}", id),
            },
            tally: ReviewTally { positive, negative },
        }
    }

    /// A store item the critics never scored.
    pub fn unscored_item(id: &str, name: &str, positive: u64, negative: u64) -> StoreItem {
        let mut item = item(id, name, 0.0, positive, negative);
        item.details.critic_score = None;
        item
    }

    /// An enriched record named after its id.
    pub fn record(id: &str, critic_score: f64, user_score: f64) -> EnrichedRecord {
        EnrichedRecord {
            id: id.to_string(),
            name: id.to_string(),
            critic_score,
            user_score,
            composite: critic_score + user_score,
            image_url: None,
            item_url: format!("https://store.example.com/app/{}", id),
        }
    }
}
