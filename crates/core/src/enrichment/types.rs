//! Types for item enrichment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::{composite_score, review_percentage};

/// Store detail for one item, as far as ranking cares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemDetails {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Critic score (0-100), if the store has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic_score: Option<f64>,
    /// Header / cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Canonical store page.
    pub item_url: String,
}

/// Positive/negative review counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewTally {
    pub positive: u64,
    pub negative: u64,
}

/// A fully enriched, rankable item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    pub id: String,
    pub name: String,
    /// Critic score (criterion A).
    pub critic_score: f64,
    /// Positive review percentage (criterion B).
    pub user_score: f64,
    /// `critic_score + user_score`.
    pub composite: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub item_url: String,
}

impl EnrichedRecord {
    /// Build a record from both attribute sets.
    ///
    /// Both criteria must be defined; partial data never yields a record.
    pub fn from_parts(details: ItemDetails, tally: ReviewTally) -> Result<Self, IneligibleReason> {
        let critic_score = details
            .critic_score
            .ok_or(IneligibleReason::MissingCriticScore)?;
        let user_score = review_percentage(&tally).ok_or(IneligibleReason::NoReviews)?;

        Ok(Self {
            id: details.id,
            name: details.name,
            critic_score,
            user_score,
            composite: composite_score(critic_score, user_score),
            image_url: details.image_url,
            item_url: details.item_url,
        })
    }

    /// Case-insensitive substring match on the display name.
    ///
    /// `needle` must already be lowercased.
    pub fn name_matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Why a candidate cannot produce a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// The store does not know the id or reported it unsuccessful.
    UnknownItem,
    /// No critic score to combine.
    MissingCriticScore,
    /// Zero reviews, so the percentage is undefined.
    NoReviews,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownItem => write!(f, "unknown_item"),
            Self::MissingCriticScore => write!(f, "missing_critic_score"),
            Self::NoReviews => write!(f, "no_reviews"),
        }
    }
}

/// Result of one enrichment attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Enriched(EnrichedRecord),
    /// Expected exclusion; not an error.
    Ineligible(IneligibleReason),
    /// An upstream call failed. Treated like `Ineligible` for batching.
    TransportFailure(String),
}

impl EnrichmentOutcome {
    /// Metric / report label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Enriched(_) => "enriched",
            Self::Ineligible(_) => "ineligible",
            Self::TransportFailure(_) => "transport_failure",
        }
    }

    pub fn into_record(self) -> Option<EnrichedRecord> {
        match self {
            Self::Enriched(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(critic_score: Option<f64>) -> ItemDetails {
        ItemDetails {
            id: "620".to_string(),
            name: "Portal 2".to_string(),
            critic_score,
            image_url: Some("https://cdn.example/620.jpg".to_string()),
            item_url: "https://store.example/app/620".to_string(),
        }
    }

    #[test]
    fn test_from_parts_computes_composite() {
        let record = EnrichedRecord::from_parts(
            details(Some(85.0)),
            ReviewTally {
                positive: 120,
                negative: 30,
            },
        )
        .unwrap();

        assert_eq!(record.critic_score, 85.0);
        assert_eq!(record.user_score, 80.0);
        assert_eq!(record.composite, 165.0);
        assert_eq!(record.composite, record.critic_score + record.user_score);
    }

    #[test]
    fn test_from_parts_missing_critic_score() {
        let result = EnrichedRecord::from_parts(
            details(None),
            ReviewTally {
                positive: 10,
                negative: 1,
            },
        );
        assert_eq!(result, Err(IneligibleReason::MissingCriticScore));
    }

    #[test]
    fn test_from_parts_zero_reviews_regardless_of_critic_score() {
        let result = EnrichedRecord::from_parts(
            details(Some(99.0)),
            ReviewTally {
                positive: 0,
                negative: 0,
            },
        );
        assert_eq!(result, Err(IneligibleReason::NoReviews));
    }

    #[test]
    fn test_name_matches_is_case_insensitive() {
        let record = EnrichedRecord::from_parts(
            details(Some(95.0)),
            ReviewTally {
                positive: 1,
                negative: 0,
            },
        )
        .unwrap();
        assert!(record.name_matches("portal"));
        assert!(record.name_matches("al 2"));
        assert!(!record.name_matches("half-life"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(
            EnrichmentOutcome::Ineligible(IneligibleReason::NoReviews).label(),
            "ineligible"
        );
        assert_eq!(
            EnrichmentOutcome::TransportFailure("boom".to_string()).label(),
            "transport_failure"
        );
        assert_eq!(IneligibleReason::MissingCriticScore.to_string(), "missing_critic_score");
    }
}
