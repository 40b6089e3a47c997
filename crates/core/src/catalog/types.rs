//! Catalog-side types.

use serde::{Deserialize, Serialize};

/// A catalog item before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateRef {
    /// Opaque catalog identifier.
    pub id: String,
    /// Catalog-level name, when the listing carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CandidateRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// How far candidate consumption has progressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Most recently materialized page (1-based).
    pub page_number: u32,
    /// Next candidate to consume within all materialized candidates.
    pub next_index: usize,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page_number: 1,
            next_index: 0,
        }
    }
}
