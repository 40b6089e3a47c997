//! Mock paginated catalog for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{CandidateRef, CandidateSource, CatalogError};

/// Mock implementation of the CandidateSource trait.
///
/// Pages are served 1-based from the configured list; any page past the end
/// is empty, which is how a real catalog signals exhaustion.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockCandidateSource::new();
/// source.set_pages(vec![
///     vec![fixtures::candidate("1", "Portal")],
///     vec![fixtures::candidate("2", "Portal 2")],
/// ]).await;
/// source.fail_page(2).await;
///
/// assert!(source.fetch_page(2).await.is_err());
/// assert_eq!(source.page_requests().await, vec![2]);
/// ```
#[derive(Debug, Default)]
pub struct MockCandidateSource {
    pages: Arc<RwLock<Vec<Vec<CandidateRef>>>>,
    top: Arc<RwLock<Vec<CandidateRef>>>,
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    fail_top: Arc<RwLock<bool>>,
    /// Every page number requested, failed requests included.
    requests: Arc<RwLock<Vec<u32>>>,
}

impl MockCandidateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the paged catalog. `pages[0]` is page 1.
    pub async fn set_pages(&self, pages: Vec<Vec<CandidateRef>>) {
        *self.pages.write().await = pages;
    }

    /// Set the bulk listing returned by `top_slice`.
    pub async fn set_top(&self, top: Vec<CandidateRef>) {
        *self.top.write().await = top;
    }

    /// Make every fetch of `page_number` fail until `heal_page` is called.
    pub async fn fail_page(&self, page_number: u32) {
        self.failing_pages.write().await.insert(page_number);
    }

    pub async fn heal_page(&self, page_number: u32) {
        self.failing_pages.write().await.remove(&page_number);
    }

    /// Make `top_slice` fail.
    pub async fn fail_top(&self) {
        *self.fail_top.write().await = true;
    }

    /// Page numbers requested so far, in order.
    pub async fn page_requests(&self) -> Vec<u32> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl CandidateSource for MockCandidateSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, page_number: u32) -> Result<Vec<CandidateRef>, CatalogError> {
        self.requests.write().await.push(page_number);

        if self.failing_pages.read().await.contains(&page_number) {
            return Err(CatalogError::ApiError {
                status: 503,
                message: format!("page {} unavailable", page_number),
            });
        }

        let pages = self.pages.read().await;
        Ok(page_number
            .checked_sub(1)
            .and_then(|index| pages.get(index as usize))
            .cloned()
            .unwrap_or_default())
    }

    async fn top_slice(&self, n: usize) -> Result<Vec<CandidateRef>, CatalogError> {
        if *self.fail_top.read().await {
            return Err(CatalogError::ApiError {
                status: 503,
                message: "listing unavailable".to_string(),
            });
        }
        Ok(self.top.read().await.iter().take(n).cloned().collect())
    }
}
