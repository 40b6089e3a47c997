//! Text search over the ranked list with a bounded catalog fallback.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{Aggregator, RankedList, RankedRecord, SearchResolution, SearchResults};
use crate::catalog::{CandidateRef, CandidateSource};
use crate::config::SearchConfig;
use crate::enrichment::{EnrichedRecord, Enricher, EnrichmentOutcome};
use crate::metrics::{SEARCH_FALLBACK_PAGES, SEARCH_REQUESTS};

/// Answers name queries against an aggregator's session.
///
/// The index only reads aggregator state. A fallback scan walks catalog pages
/// with its own page counter and never inserts what it finds.
pub struct SearchIndex {
    source: Arc<dyn CandidateSource>,
    enricher: Arc<dyn Enricher>,
    config: SearchConfig,
}

/// Mutable state of one fallback scan.
struct FallbackScan<'a> {
    needle: &'a str,
    ranked: &'a RankedList,
    seen: HashSet<String>,
    matches: Vec<EnrichedRecord>,
    result_budget: usize,
}

impl FallbackScan<'_> {
    fn full(&self) -> bool {
        self.matches.len() >= self.result_budget
    }

    /// Returns true once the result budget is met.
    async fn consider(&mut self, enricher: &dyn Enricher, candidate: &CandidateRef) -> bool {
        if self.full() {
            return true;
        }
        if self.ranked.contains(&candidate.id) || !self.seen.insert(candidate.id.clone()) {
            return false;
        }
        // Skip the store round-trip when the catalog name already rules it out.
        if let Some(name) = &candidate.name {
            if !name.to_lowercase().contains(self.needle) {
                return false;
            }
        }

        match enricher.enrich(&candidate.id).await {
            EnrichmentOutcome::Enriched(record) => {
                if record.name_matches(self.needle) {
                    self.matches.push(record);
                }
            }
            EnrichmentOutcome::Ineligible(reason) => {
                debug!("Search skipped {}: {}", candidate.id, reason);
            }
            EnrichmentOutcome::TransportFailure(message) => {
                warn!("Search skipped {} after store failure: {}", candidate.id, message);
            }
        }
        self.full()
    }
}

impl SearchIndex {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        enricher: Arc<dyn Enricher>,
        config: SearchConfig,
    ) -> Self {
        Self {
            source,
            enricher,
            config,
        }
    }

    /// Search the aggregator's ranked list by display name.
    ///
    /// An empty query returns the whole list. Local matches keep their ranks
    /// and need no network call. Only when nothing matches locally are
    /// further candidates scanned, first the aggregator's unconsumed ones and
    /// then up to `page_budget` unfetched pages, stopping at `result_budget`
    /// matches. Fallback hits are ranked as if inserted into the list.
    pub async fn search(&self, aggregator: &Aggregator, query: &str) -> SearchResults {
        let needle = query.trim().to_lowercase();
        let ranked = aggregator.ranked();

        if needle.is_empty() {
            return self.finish(SearchResults {
                query: needle,
                resolution: SearchResolution::Unfiltered,
                hits: ranked.records().to_vec(),
                pages_scanned: 0,
                scan_error: None,
            });
        }

        let local: Vec<RankedRecord> = ranked
            .iter()
            .filter(|r| r.record.name_matches(&needle))
            .cloned()
            .collect();
        if !local.is_empty() {
            return self.finish(SearchResults {
                query: needle,
                resolution: SearchResolution::Local,
                hits: local,
                pages_scanned: 0,
                scan_error: None,
            });
        }

        let mut scan = FallbackScan {
            needle: &needle,
            ranked,
            seen: HashSet::new(),
            matches: Vec::new(),
            result_budget: self.config.result_budget,
        };
        let mut pages_scanned = 0;
        let mut scan_error = None;

        for candidate in aggregator.pending_candidates() {
            if scan.consider(self.enricher.as_ref(), candidate).await {
                break;
            }
        }

        if let Some(first_page) = aggregator.next_unfetched_page() {
            let mut page_number = first_page;
            while !scan.full() && pages_scanned < self.config.page_budget {
                let page = match self.source.fetch_page(page_number).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!("Search fallback stopped at page {}: {}", page_number, e);
                        scan_error = Some(e.to_string());
                        break;
                    }
                };
                pages_scanned += 1;
                if page.is_empty() {
                    break;
                }
                for candidate in &page {
                    if scan.consider(self.enricher.as_ref(), candidate).await {
                        break;
                    }
                }
                page_number += 1;
            }
        }

        SEARCH_FALLBACK_PAGES.observe(pages_scanned as f64);
        debug!(
            "Search fallback for {:?}: {} matches over {} pages",
            needle,
            scan.matches.len(),
            pages_scanned
        );

        let hits = ranked.rank_within(scan.matches);
        self.finish(SearchResults {
            query: needle,
            resolution: SearchResolution::Fallback,
            hits,
            pages_scanned,
            scan_error,
        })
    }

    fn finish(&self, results: SearchResults) -> SearchResults {
        SEARCH_REQUESTS
            .with_label_values(&[results.resolution.as_str()])
            .inc();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::enrichment::{StoreApi, StoreEnricher};
    use crate::testing::{fixtures, MockCandidateSource, MockStore};

    struct Setup {
        source: Arc<MockCandidateSource>,
        store: Arc<MockStore>,
        aggregator: Aggregator,
        index: SearchIndex,
    }

    fn setup(config: SearchConfig) -> Setup {
        let source = Arc::new(MockCandidateSource::new());
        let store = Arc::new(MockStore::new());
        let enricher: Arc<dyn Enricher> = Arc::new(StoreEnricher::new(
            Arc::clone(&store) as Arc<dyn StoreApi>
        ));
        let aggregator = Aggregator::new(
            Arc::clone(&source) as Arc<dyn CandidateSource>,
            Arc::clone(&enricher),
            RankingConfig::default(),
        );
        let index = SearchIndex::new(
            Arc::clone(&source) as Arc<dyn CandidateSource>,
            enricher,
            config,
        );
        Setup {
            source,
            store,
            aggregator,
            index,
        }
    }

    async fn seed_first_page(s: &mut Setup) {
        s.source
            .set_pages(vec![
                vec![
                    fixtures::candidate("1", "Portal 2"),
                    fixtures::candidate("2", "Half-Life"),
                ],
                vec![
                    fixtures::candidate("3", "Portal"),
                    fixtures::candidate("4", "Dota 2"),
                ],
            ])
            .await;
        s.store.add_item(fixtures::item("1", "Portal 2", 95.0, 9, 1)).await;
        s.store.add_item(fixtures::item("2", "Half-Life", 96.0, 19, 1)).await;
        s.store.add_item(fixtures::item("3", "Portal", 90.0, 1, 0)).await;
        s.store.add_item(fixtures::item("4", "Dota 2", 90.0, 8, 2)).await;
        s.aggregator.load_next_batch(10).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_query_returns_full_list() {
        let mut s = setup(SearchConfig::default());
        seed_first_page(&mut s).await;

        let results = s.index.search(&s.aggregator, "   ").await;
        assert_eq!(results.resolution, SearchResolution::Unfiltered);
        assert_eq!(results.hits, s.aggregator.ranked().records().to_vec());
    }

    #[tokio::test]
    async fn test_local_match_keeps_rank_without_network() {
        let mut s = setup(SearchConfig::default());
        seed_first_page(&mut s).await;
        let requests_before = s.source.page_requests().await.len();

        let results = s.index.search(&s.aggregator, "  PORTAL ").await;
        assert_eq!(results.resolution, SearchResolution::Local);
        assert_eq!(results.query, "portal");
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].record.id, "1");
        assert_eq!(results.hits[0].rank, 2);
        assert_eq!(s.source.page_requests().await.len(), requests_before);
    }

    #[tokio::test]
    async fn test_fallback_ranks_relative_without_inserting() {
        let mut s = setup(SearchConfig::default());
        seed_first_page(&mut s).await;
        let before = s.aggregator.ranked().records().to_vec();

        let results = s.index.search(&s.aggregator, "dota").await;
        assert_eq!(results.resolution, SearchResolution::Fallback);
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].record.id, "4");
        // 170 sits behind Half-Life (191) and Portal 2 (185).
        assert_eq!(results.hits[0].rank, 3);
        assert_eq!(s.aggregator.ranked().records(), before.as_slice());
        assert_eq!(s.aggregator.cursor().page_number, 1);
    }

    #[tokio::test]
    async fn test_fallback_skips_name_mismatch_without_enriching() {
        let mut s = setup(SearchConfig::default());
        seed_first_page(&mut s).await;

        s.index.search(&s.aggregator, "dota").await;
        assert_eq!(s.store.detail_calls("3").await, 0);
        assert_eq!(s.store.detail_calls("4").await, 1);
    }

    #[tokio::test]
    async fn test_fallback_respects_page_budget() {
        let s = setup(SearchConfig {
            page_budget: 2,
            result_budget: 10,
        });
        s.source
            .set_pages(
                (1..=6)
                    .map(|i| vec![fixtures::candidate(&i.to_string(), "Filler")])
                    .collect(),
            )
            .await;

        let results = s.index.search(&s.aggregator, "nothing").await;
        assert!(results.hits.is_empty());
        assert_eq!(results.pages_scanned, 2);
        assert_eq!(s.source.page_requests().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fallback_stops_at_result_budget() {
        let s = setup(SearchConfig {
            page_budget: 5,
            result_budget: 2,
        });
        let page: Vec<_> = (1..=5)
            .map(|i| fixtures::candidate(&i.to_string(), &format!("Racer {}", i)))
            .collect();
        for i in 1..=5 {
            s.store
                .add_item(fixtures::item(&i.to_string(), &format!("Racer {}", i), 70.0, 1, 0))
                .await;
        }
        s.source.set_pages(vec![page]).await;

        let results = s.index.search(&s.aggregator, "racer").await;
        assert_eq!(results.hits.len(), 2);
        assert_eq!(s.store.detail_calls("3").await, 0);
    }

    #[tokio::test]
    async fn test_fallback_swallows_item_failures() {
        let s = setup(SearchConfig::default());
        s.source
            .set_pages(vec![vec![
                fixtures::candidate("1", "Broken Sword"),
                fixtures::candidate("2", "Sword Art"),
            ]])
            .await;
        s.store.add_item(fixtures::item("1", "Broken Sword", 80.0, 1, 0)).await;
        s.store.add_item(fixtures::item("2", "Sword Art", 60.0, 1, 1)).await;
        s.store.fail_details_for("1").await;

        let results = s.index.search(&s.aggregator, "sword").await;
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].record.id, "2");
        assert!(results.scan_error.is_none());
    }

    #[tokio::test]
    async fn test_fallback_page_failure_keeps_partial_hits() {
        let s = setup(SearchConfig::default());
        s.source
            .set_pages(vec![
                vec![fixtures::candidate("1", "Sword One")],
                vec![fixtures::candidate("2", "Sword Two")],
            ])
            .await;
        s.store.add_item(fixtures::item("1", "Sword One", 80.0, 1, 0)).await;
        s.source.fail_page(2).await;

        let results = s.index.search(&s.aggregator, "sword").await;
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.pages_scanned, 1);
        assert!(results.scan_error.is_some());
    }

    #[tokio::test]
    async fn test_nameless_candidates_match_on_display_name() {
        let s = setup(SearchConfig::default());
        s.source
            .set_pages(vec![vec![CandidateRef::new("7"), CandidateRef::new("8")]])
            .await;
        s.store.add_item(fixtures::item("7", "Stardew Valley", 89.0, 9, 1)).await;
        s.store.add_item(fixtures::item("8", "Terraria", 83.0, 9, 1)).await;

        let results = s.index.search(&s.aggregator, "valley").await;
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].record.id, "7");
        assert_eq!(results.hits[0].rank, 1);
    }

    #[tokio::test]
    async fn test_exhausted_catalog_is_not_rescanned() {
        let mut s = setup(SearchConfig::default());
        s.source
            .set_pages(vec![vec![fixtures::candidate("1", "Only")]])
            .await;
        s.store.add_item(fixtures::item("1", "Only", 80.0, 1, 0)).await;
        s.aggregator.load_next_batch(10).await.unwrap();
        s.aggregator.load_next_batch(10).await.unwrap();
        assert!(!s.aggregator.has_more());
        let requests_before = s.source.page_requests().await.len();

        let results = s.index.search(&s.aggregator, "missing").await;
        assert!(results.hits.is_empty());
        assert_eq!(results.pages_scanned, 0);
        assert_eq!(s.source.page_requests().await.len(), requests_before);
    }
}
