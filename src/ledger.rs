//! Winner history
//!
//! Append-only log of past winners, grouped by the spin (batch) that
//! produced them. Only ever cleared as a whole.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::Entry;

/// Groups all records produced by one spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "batch-{}", self.0)
    }
}

/// Unique id of a single history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

/// One winner captured at settle time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub record_id: RecordId,
    /// Snapshot of the entry as it was when it won
    pub entry: Entry,
    /// Unix timestamp (ms) when the spin settled
    pub captured_at: f64,
    pub batch_id: BatchId,
}

/// History ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryLedger {
    /// Records in append order (oldest first)
    records: Vec<HistoryRecord>,
    /// Next record id (survives `clear`)
    next_record_id: u64,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record per winner, all sharing `batch_id`
    pub fn record(&mut self, winners: &[Entry], batch_id: BatchId, captured_at: f64) {
        self.records.reserve(winners.len());
        for entry in winners {
            self.next_record_id += 1;
            self.records.push(HistoryRecord {
                record_id: RecordId(self.next_record_id),
                entry: entry.clone(),
                captured_at,
                batch_id,
            });
        }
        log::info!(
            "Recorded {} winner(s) for {} ({} total)",
            winners.len(),
            batch_id,
            self.records.len()
        );
    }

    /// Drop every record at once
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records newest first (append order reversed)
    pub fn list(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().rev()
    }

    /// Records of one batch, in the order they were drawn
    pub fn batch(&self, batch_id: BatchId) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter().filter(move |r| r.batch_id == batch_id)
    }

    /// Number of distinct batches
    pub fn batch_count(&self) -> usize {
        // Batches are appended contiguously, so counting boundaries is enough
        self.records
            .windows(2)
            .filter(|pair| pair[0].batch_id != pair[1].batch_id)
            .count()
            + usize::from(!self.records.is_empty())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest-first JSON array for the host's history panel
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let newest_first: Vec<&HistoryRecord> = self.list().collect();
        serde_json::to_string(&newest_first)
    }
}
