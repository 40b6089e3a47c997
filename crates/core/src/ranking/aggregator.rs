//! Incremental aggregation: candidates -> enrichment -> ranked list.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{BatchReport, RankedList, RankingError, SessionInfo};
use crate::catalog::{CandidateRef, CandidateSource, CatalogError, PaginationCursor};
use crate::config::{BatchPolicy, RankingConfig};
use crate::enrichment::{Enricher, EnrichmentOutcome};
use crate::metrics::{BATCHES_TOTAL, RANKED_RECORDS};

/// State that a failed batch must restore.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    candidates_len: usize,
    cursor: PaginationCursor,
    pages_fetched: u32,
    exhausted: bool,
}

/// Owns the ranked list and pagination state of one session.
///
/// All mutation goes through `reset`, `load_next_batch` and `load_all`.
/// Candidates are enriched strictly in catalog order in incremental mode, so
/// composite ties rank by discovery order. Bulk mode (`load_all`) enriches
/// concurrently and ties are broken by completion order instead.
pub struct Aggregator {
    source: Arc<dyn CandidateSource>,
    enricher: Arc<dyn Enricher>,
    config: RankingConfig,
    ranked: RankedList,
    /// Every candidate materialized this session, in catalog order.
    candidates: Vec<CandidateRef>,
    seen: HashSet<String>,
    cursor: PaginationCursor,
    pages_fetched: u32,
    /// The paged catalog returned an empty page.
    exhausted: bool,
    /// The session was populated by `load_all`.
    bulk: bool,
    session_id: Uuid,
    started_at: DateTime<Utc>,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        enricher: Arc<dyn Enricher>,
        config: RankingConfig,
    ) -> Self {
        Self {
            source,
            enricher,
            config,
            ranked: RankedList::new(),
            candidates: Vec::new(),
            seen: HashSet::new(),
            cursor: PaginationCursor::default(),
            pages_fetched: 0,
            exhausted: false,
            bulk: false,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// Discard all session state and start a new session.
    pub fn reset(&mut self) {
        self.ranked.clear();
        self.candidates.clear();
        self.seen.clear();
        self.cursor = PaginationCursor::default();
        self.pages_fetched = 0;
        self.exhausted = false;
        self.bulk = false;
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        RANKED_RECORDS.set(0);
        debug!("Aggregator reset, session {}", self.session_id);
    }

    pub fn ranked(&self) -> &RankedList {
        &self.ranked
    }

    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    /// Materialized candidates not yet consumed.
    pub fn pending_candidates(&self) -> &[CandidateRef] {
        &self.candidates[self.cursor.next_index.min(self.candidates.len())..]
    }

    /// The first catalog page this session has not materialized, if the
    /// catalog may have one.
    pub fn next_unfetched_page(&self) -> Option<u32> {
        if self.bulk || self.pages_fetched == 0 {
            Some(1)
        } else if self.exhausted {
            None
        } else {
            Some(self.cursor.page_number + 1)
        }
    }

    /// Whether another incremental batch could add records.
    pub fn has_more(&self) -> bool {
        !self.bulk && (!self.pending_candidates().is_empty() || !self.exhausted)
    }

    pub fn session(&self) -> SessionInfo {
        SessionInfo {
            id: self.session_id,
            started_at: self.started_at,
            pages_fetched: self.pages_fetched,
            candidates_seen: self.candidates.len(),
            ranked: self.ranked.len(),
        }
    }

    /// Consume the next batch of candidates.
    ///
    /// Under `BatchPolicy::Attempts`, at most one page is fetched (only when
    /// no materialized candidate is left) and `batch_size` counts enrichment
    /// attempts, so ineligible items shrink the batch. Under
    /// `BatchPolicy::Successes`, pages are fetched as needed (up to
    /// `max_pages_per_batch`) until `batch_size` records are accepted.
    ///
    /// A page fetch failure rolls the whole batch back: the ranked list,
    /// cursor and consumption pointer are exactly as before the call.
    pub async fn load_next_batch(&mut self, batch_size: usize) -> Result<BatchReport, RankingError> {
        let policy = self.config.batch_policy;
        let mut report = BatchReport::new(Some(policy), batch_size);
        let checkpoint = self.checkpoint();
        let mut accepted = Vec::new();

        while batch_size > 0 {
            let filled = match policy {
                BatchPolicy::Attempts => report.attempted() >= batch_size,
                BatchPolicy::Successes => accepted.len() >= batch_size,
            };
            if filled {
                break;
            }

            if self.cursor.next_index >= self.candidates.len() {
                if self.exhausted || self.bulk {
                    break;
                }
                let may_fetch = match policy {
                    BatchPolicy::Attempts => report.pages_fetched.is_empty() && report.outcomes.is_empty(),
                    BatchPolicy::Successes => {
                        (report.pages_fetched.len() as u32) < self.config.max_pages_per_batch
                    }
                };
                if !may_fetch {
                    break;
                }

                match self.materialize_next_page().await {
                    Ok(page_number) => {
                        report.pages_fetched.push(page_number);
                        continue;
                    }
                    Err(e) => {
                        self.restore(checkpoint);
                        error!("Batch aborted, catalog page fetch failed: {}", e);
                        BATCHES_TOTAL
                            .with_label_values(&["incremental", "failed"])
                            .inc();
                        return Err(RankingError::BatchFailure(e));
                    }
                }
            }

            let candidate = self.candidates[self.cursor.next_index].clone();
            self.cursor.next_index += 1;

            let outcome = self.enricher.enrich(&candidate.id).await;
            report.record(&candidate.id, &outcome);
            if let EnrichmentOutcome::Enriched(record) = outcome {
                accepted.push(record);
            }
        }

        report.added = accepted.len();
        let ranked = self.ranked.extend_and_rerank(accepted);
        report.ranked_total = self.ranked.len();
        report.has_more = self.has_more();

        RANKED_RECORDS.set(self.ranked.len() as i64);
        BATCHES_TOTAL
            .with_label_values(&["incremental", if ranked { "ranked" } else { "empty" }])
            .inc();
        info!(
            "Batch done: attempted={}, added={}, ranked_total={}, has_more={}",
            report.attempted(),
            report.added,
            report.ranked_total,
            report.has_more
        );

        Ok(report)
    }

    /// Replace the session with the source's bulk listing, enriched
    /// concurrently and ranked once.
    ///
    /// On a listing failure the current session is left untouched.
    pub async fn load_all(&mut self, limit: usize) -> Result<BatchReport, RankingError> {
        let listing = match self.source.top_slice(limit).await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Bulk load aborted, catalog listing failed: {}", e);
                BATCHES_TOTAL.with_label_values(&["bulk", "failed"]).inc();
                return Err(RankingError::BatchFailure(e));
            }
        };

        self.reset();
        self.bulk = true;
        self.pages_fetched = 1;
        for candidate in listing {
            if self.seen.insert(candidate.id.clone()) {
                self.candidates.push(candidate);
            }
        }
        self.cursor.next_index = self.candidates.len();

        let enricher = Arc::clone(&self.enricher);
        let results: Vec<(String, EnrichmentOutcome)> = stream::iter(self.candidates.clone())
            .map(|candidate| {
                let enricher = Arc::clone(&enricher);
                async move {
                    let outcome = enricher.enrich(&candidate.id).await;
                    (candidate.id, outcome)
                }
            })
            .buffer_unordered(self.config.bulk_concurrency.max(1))
            .collect()
            .await;

        let mut report = BatchReport::new(None, limit);
        report.pages_fetched.push(1);
        let mut accepted = Vec::new();
        for (id, outcome) in results {
            report.record(&id, &outcome);
            if let Some(record) = outcome.into_record() {
                accepted.push(record);
            }
        }

        report.added = accepted.len();
        self.ranked.extend_and_rerank(accepted);
        report.ranked_total = self.ranked.len();
        report.has_more = false;

        RANKED_RECORDS.set(self.ranked.len() as i64);
        BATCHES_TOTAL.with_label_values(&["bulk", "ranked"]).inc();
        info!(
            "Bulk load done: candidates={}, ranked={}",
            report.attempted(),
            report.ranked_total
        );

        Ok(report)
    }

    async fn materialize_next_page(&mut self) -> Result<u32, CatalogError> {
        let (page_number, page) = if self.pages_fetched == 0 {
            (1, self.source.first_page().await?)
        } else {
            (
                self.cursor.page_number + 1,
                self.source.next_page(&self.cursor).await?,
            )
        };

        self.pages_fetched += 1;
        self.cursor.page_number = page_number;
        if page.is_empty() {
            self.exhausted = true;
        }

        let before = self.candidates.len();
        for candidate in page {
            if self.seen.insert(candidate.id.clone()) {
                self.candidates.push(candidate);
            }
        }
        debug!(
            "Materialized page {} from {}: {} new candidates",
            page_number,
            self.source.name(),
            self.candidates.len() - before
        );

        Ok(page_number)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            candidates_len: self.candidates.len(),
            cursor: self.cursor,
            pages_fetched: self.pages_fetched,
            exhausted: self.exhausted,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        for dropped in self.candidates.drain(checkpoint.candidates_len..) {
            self.seen.remove(&dropped.id);
        }
        self.cursor = checkpoint.cursor;
        self.pages_fetched = checkpoint.pages_fetched;
        self.exhausted = checkpoint.exhausted;
    }
}
