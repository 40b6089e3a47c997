//! Store-backed enricher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{EnrichedRecord, Enricher, EnrichmentOutcome, IneligibleReason, StoreApi, StoreError};
use crate::metrics::ENRICHMENT_OUTCOMES;

/// Combines the store's detail and review reads into one outcome.
///
/// Both reads are issued for every call: there is no cache and no retry.
pub struct StoreEnricher {
    store: Arc<dyn StoreApi>,
}

impl StoreEnricher {
    pub fn new(store: Arc<dyn StoreApi>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Enricher for StoreEnricher {
    async fn enrich(&self, id: &str) -> EnrichmentOutcome {
        let (details, tally) = futures::join!(
            self.store.fetch_details(id),
            self.store.fetch_review_tally(id)
        );

        let outcome = match (details, tally) {
            (Err(e), _) | (_, Err(e)) => outcome_for_error(e),
            (Ok(details), Ok(tally)) => match EnrichedRecord::from_parts(details, tally) {
                Ok(record) => EnrichmentOutcome::Enriched(record),
                Err(reason) => EnrichmentOutcome::Ineligible(reason),
            },
        };

        match &outcome {
            EnrichmentOutcome::Enriched(record) => {
                debug!("Enriched {} ({}): composite={}", id, record.name, record.composite)
            }
            EnrichmentOutcome::Ineligible(reason) => debug!("Item {} ineligible: {}", id, reason),
            EnrichmentOutcome::TransportFailure(message) => {
                warn!("Enrichment failed for item {}: {}", id, message)
            }
        }
        ENRICHMENT_OUTCOMES
            .with_label_values(&[outcome.label()])
            .inc();

        outcome
    }
}

fn outcome_for_error(error: StoreError) -> EnrichmentOutcome {
    match error {
        StoreError::NotFound(_) => EnrichmentOutcome::Ineligible(IneligibleReason::UnknownItem),
        other => EnrichmentOutcome::TransportFailure(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockStore};

    fn enricher(store: &Arc<MockStore>) -> StoreEnricher {
        StoreEnricher::new(Arc::clone(store) as Arc<dyn StoreApi>)
    }

    #[tokio::test]
    async fn test_enrich_success() {
        let store = Arc::new(MockStore::new());
        store.add_item(fixtures::item("620", "Portal 2", 95.0, 120, 30)).await;

        let outcome = enricher(&store).enrich("620").await;
        let record = outcome.into_record().unwrap();
        assert_eq!(record.name, "Portal 2");
        assert_eq!(record.user_score, 80.0);
        assert_eq!(record.composite, 175.0);
    }

    #[tokio::test]
    async fn test_enrich_unknown_item_is_ineligible() {
        let store = Arc::new(MockStore::new());

        let outcome = enricher(&store).enrich("404").await;
        assert_eq!(
            outcome,
            EnrichmentOutcome::Ineligible(IneligibleReason::UnknownItem)
        );
    }

    #[tokio::test]
    async fn test_enrich_missing_critic_score_is_ineligible() {
        let store = Arc::new(MockStore::new());
        store.add_item(fixtures::unscored_item("1", "Indie Thing", 50, 5)).await;

        let outcome = enricher(&store).enrich("1").await;
        assert_eq!(
            outcome,
            EnrichmentOutcome::Ineligible(IneligibleReason::MissingCriticScore)
        );
    }

    #[tokio::test]
    async fn test_enrich_zero_reviews_is_ineligible() {
        let store = Arc::new(MockStore::new());
        store.add_item(fixtures::item("2", "Nobody Played", 90.0, 0, 0)).await;

        let outcome = enricher(&store).enrich("2").await;
        assert_eq!(
            outcome,
            EnrichmentOutcome::Ineligible(IneligibleReason::NoReviews)
        );
    }

    #[tokio::test]
    async fn test_enrich_transport_failure_is_reported() {
        let store = Arc::new(MockStore::new());
        store.add_item(fixtures::item("3", "Flaky", 80.0, 10, 10)).await;
        store.fail_reviews_for("3").await;

        let outcome = enricher(&store).enrich("3").await;
        assert!(matches!(outcome, EnrichmentOutcome::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_enrich_repeats_both_reads() {
        let store = Arc::new(MockStore::new());
        store.add_item(fixtures::item("620", "Portal 2", 95.0, 120, 30)).await;
        let enricher = enricher(&store);

        enricher.enrich("620").await;
        enricher.enrich("620").await;

        assert_eq!(store.detail_calls("620").await, 2);
        assert_eq!(store.review_calls("620").await, 2);
    }
}
