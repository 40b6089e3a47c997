//! The canonical ranked list.

use std::cmp::Ordering;

use super::RankedRecord;
use crate::enrichment::EnrichedRecord;

/// Records sorted by composite descending with dense ranks 1..N.
///
/// Ties keep insertion order: the sort is stable and new records are always
/// appended behind existing ones before re-ranking.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    entries: Vec<RankedRecord>,
}

fn by_composite_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in rank order.
    pub fn records(&self) -> &[RankedRecord] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedRecord> {
        self.entries.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.record.id == id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append records and re-rank. Returns false, leaving the list untouched,
    /// when there is nothing to add.
    pub(crate) fn extend_and_rerank(&mut self, records: Vec<EnrichedRecord>) -> bool {
        if records.is_empty() {
            return false;
        }

        self.entries
            .extend(records.into_iter().map(|record| RankedRecord { rank: 0, record }));
        self.entries
            .sort_by(|a, b| by_composite_desc(a.record.composite, b.record.composite));
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = position as u32 + 1;
        }
        true
    }

    /// Rank `candidates` as if they were appended to this list, without
    /// modifying it. Returned in ascending rank order.
    pub fn rank_within(&self, candidates: Vec<EnrichedRecord>) -> Vec<RankedRecord> {
        // (composite, index into candidates) with existing records first.
        let mut merged: Vec<(f64, Option<usize>)> = self
            .entries
            .iter()
            .map(|e| (e.record.composite, None))
            .chain(
                candidates
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.composite, Some(i))),
            )
            .collect();
        merged.sort_by(|a, b| by_composite_desc(a.0, b.0));

        let mut ranks = vec![0u32; candidates.len()];
        for (position, (_, candidate)) in merged.iter().enumerate() {
            if let Some(i) = candidate {
                ranks[*i] = position as u32 + 1;
            }
        }

        let mut ranked: Vec<RankedRecord> = candidates
            .into_iter()
            .zip(ranks)
            .map(|(record, rank)| RankedRecord { rank, record })
            .collect();
        ranked.sort_by_key(|r| r.rank);
        ranked
    }
}
