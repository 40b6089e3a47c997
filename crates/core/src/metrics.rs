//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Enrichment outcomes and batch results
//! - Ranked list size
//! - Search resolution and fallback scan depth
//! - Upstream services (catalog, store details, store reviews)

use std::time::Instant;

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Aggregation Metrics
// =============================================================================

/// Per-item enrichment outcomes.
pub static ENRICHMENT_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gamerank_enrichment_outcomes_total",
            "Enrichment attempts by outcome",
        ),
        &["outcome"], // "enriched", "ineligible", "transport_failure"
    )
    .unwrap()
});

/// Batches by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamerank_batches_total", "Aggregation batches by result"),
        &["mode", "result"], // result: "ranked", "empty", "failed"
    )
    .unwrap()
});

/// Records currently in the ranked list.
pub static RANKED_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamerank_ranked_records",
        "Number of records in the current ranked list",
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests by how they were resolved.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamerank_search_requests_total", "Search requests by resolution"),
        &["resolution"], // "unfiltered", "local", "fallback"
    )
    .unwrap()
});

/// Catalog pages scanned per fallback search.
pub static SEARCH_FALLBACK_PAGES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "gamerank_search_fallback_pages",
            "Catalog pages scanned per fallback search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0]),
    )
    .unwrap()
});

// =============================================================================
// Upstream Service Metrics
// =============================================================================

/// Upstream request duration.
pub static UPSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamerank_upstream_duration_seconds",
            "Duration of upstream service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// Upstream requests total.
pub static UPSTREAM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gamerank_upstream_requests_total",
            "Total upstream service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record one upstream call.
pub fn record_upstream(service: &str, operation: &str, start: Instant, ok: bool) {
    UPSTREAM_DURATION
        .with_label_values(&[service, operation])
        .observe(start.elapsed().as_secs_f64());
    UPSTREAM_REQUESTS
        .with_label_values(&[service, operation, if ok { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Aggregation
        Box::new(ENRICHMENT_OUTCOMES.clone()),
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(RANKED_RECORDS.clone()),
        // Search
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_FALLBACK_PAGES.clone()),
        // Upstream
        Box::new(UPSTREAM_DURATION.clone()),
        Box::new(UPSTREAM_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_upstream_counts_by_status() {
        let before = UPSTREAM_REQUESTS
            .with_label_values(&["test-service", "op", "error"])
            .get();

        record_upstream("test-service", "op", Instant::now(), false);

        let after = UPSTREAM_REQUESTS
            .with_label_values(&["test-service", "op", "error"])
            .get();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_all_metrics_registers_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
