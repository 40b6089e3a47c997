//! Types produced by aggregation and search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BatchPolicy;
use crate::enrichment::{EnrichedRecord, EnrichmentOutcome, IneligibleReason};

/// An enriched record with its position in a ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedRecord {
    /// 1-based rank. Only valid until the next aggregation step.
    pub rank: u32,
    #[serde(flatten)]
    pub record: EnrichedRecord,
}

/// What happened to one candidate during a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemOutcome {
    pub id: String,
    pub outcome: ItemDisposition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemDisposition {
    Enriched,
    Ineligible { reason: IneligibleReason },
    TransportFailure { message: String },
}

impl From<&EnrichmentOutcome> for ItemDisposition {
    fn from(outcome: &EnrichmentOutcome) -> Self {
        match outcome {
            EnrichmentOutcome::Enriched(_) => Self::Enriched,
            EnrichmentOutcome::Ineligible(reason) => Self::Ineligible { reason: *reason },
            EnrichmentOutcome::TransportFailure(message) => Self::TransportFailure {
                message: message.clone(),
            },
        }
    }
}

/// Summary of one `load_next_batch` / `load_all` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    /// `None` for bulk loads, which enrich the whole listing.
    pub policy: Option<BatchPolicy>,
    pub requested: usize,
    /// Catalog pages materialized by this batch.
    pub pages_fetched: Vec<u32>,
    /// Every attempted candidate, in attempt order.
    pub outcomes: Vec<ItemOutcome>,
    /// Records added to the ranked list.
    pub added: usize,
    /// Ranked list size after the batch.
    pub ranked_total: usize,
    pub has_more: bool,
}

impl BatchReport {
    pub(crate) fn new(policy: Option<BatchPolicy>, requested: usize) -> Self {
        Self {
            policy,
            requested,
            pages_fetched: Vec::new(),
            outcomes: Vec::new(),
            added: 0,
            ranked_total: 0,
            has_more: false,
        }
    }

    pub(crate) fn record(&mut self, id: &str, outcome: &EnrichmentOutcome) {
        self.outcomes.push(ItemOutcome {
            id: id.to_string(),
            outcome: outcome.into(),
        });
    }

    /// Enrichment attempts made.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Ids excluded from the ranking and why.
    pub fn excluded(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome != ItemDisposition::Enriched)
    }
}

/// The current aggregation session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub pages_fetched: u32,
    pub candidates_seen: usize,
    pub ranked: usize,
}

/// How a search was answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchResolution {
    /// Empty query: the full ranked list.
    Unfiltered,
    /// Matches found in the ranked list, with their existing ranks.
    Local,
    /// No local match; hits come from scanning further catalog pages.
    Fallback,
}

impl SearchResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unfiltered => "unfiltered",
            Self::Local => "local",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    /// Normalized (trimmed, lowercased) query.
    pub query: String,
    pub resolution: SearchResolution,
    /// Hits in ascending rank order. Fallback ranks are relative to the
    /// ranked list and were not inserted into it.
    pub hits: Vec<RankedRecord>,
    /// Catalog pages fetched by the fallback scan.
    pub pages_scanned: u32,
    /// Set when the fallback scan stopped on a catalog failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
}
