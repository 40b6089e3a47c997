//! Mock store for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::enrichment::{ItemDetails, ReviewTally, StoreApi, StoreError};

/// Both attribute sets the store holds for one item.
#[derive(Debug, Clone)]
pub struct StoreItem {
    pub details: ItemDetails,
    pub tally: ReviewTally,
}

/// Mock implementation of the StoreApi trait.
///
/// Unknown ids answer `NotFound`. Failure injection is per id and per read,
/// and every read is counted so tests can assert what was fetched.
#[derive(Debug, Default)]
pub struct MockStore {
    items: Arc<RwLock<HashMap<String, StoreItem>>>,
    failing_details: Arc<RwLock<HashSet<String>>>,
    failing_reviews: Arc<RwLock<HashSet<String>>>,
    detail_calls: Arc<RwLock<HashMap<String, usize>>>,
    review_calls: Arc<RwLock<HashMap<String, usize>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_item(&self, item: StoreItem) {
        self.items
            .write()
            .await
            .insert(item.details.id.clone(), item);
    }

    /// Make detail reads for `id` fail with a server error.
    pub async fn fail_details_for(&self, id: &str) {
        self.failing_details.write().await.insert(id.to_string());
    }

    /// Make review reads for `id` fail with a server error.
    pub async fn fail_reviews_for(&self, id: &str) {
        self.failing_reviews.write().await.insert(id.to_string());
    }

    pub async fn detail_calls(&self, id: &str) -> usize {
        self.detail_calls.read().await.get(id).copied().unwrap_or(0)
    }

    pub async fn review_calls(&self, id: &str) -> usize {
        self.review_calls.read().await.get(id).copied().unwrap_or(0)
    }

    async fn lookup(
        &self,
        id: &str,
        calls: &RwLock<HashMap<String, usize>>,
        failing: &RwLock<HashSet<String>>,
    ) -> Result<StoreItem, StoreError> {
        *calls.write().await.entry(id.to_string()).or_insert(0) += 1;

        if failing.read().await.contains(id) {
            return Err(StoreError::ApiError {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        self.items
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl StoreApi for MockStore {
    async fn fetch_details(&self, id: &str) -> Result<ItemDetails, StoreError> {
        self.lookup(id, &self.detail_calls, &self.failing_details)
            .await
            .map(|item| item.details)
    }

    async fn fetch_review_tally(&self, id: &str) -> Result<ReviewTally, StoreError> {
        self.lookup(id, &self.review_calls, &self.failing_reviews)
            .await
            .map(|item| item.tally)
    }
}
