//! Batch statistics
//!
//! Counters are bumped by the orchestrator as records are processed and
//! frozen into a [`BatchSummary`] once the batch finishes.

use crate::db::StoreCounts;
use crate::models::SourceKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one processed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Committed, article row created
    Created,
    /// Committed, article already stored
    Existing,
    /// Required field missing
    Malformed,
    /// Transaction rolled back on a constraint violation
    Failed,
}

/// Final report of one `ingest_batch` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub source: SourceKind,
    pub records_seen: usize,
    pub records_ingested: usize,
    pub articles_created: usize,
    pub articles_existing: usize,
    pub skipped_malformed: usize,
    pub skipped_failed: usize,
    /// Authors in the store after the batch
    pub distinct_authors: i64,
    /// Categories in the store after the batch
    pub distinct_categories: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Records that did not make it into the store
    pub fn skipped(&self) -> usize {
        self.skipped_malformed + self.skipped_failed
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} records from {}: {} new, {} existing, {} malformed, {} failed",
            self.records_seen,
            self.source,
            self.articles_created,
            self.articles_existing,
            self.skipped_malformed,
            self.skipped_failed
        )
    }
}

/// Running counters for a batch in progress
#[derive(Debug, Clone)]
pub struct BatchStatistics {
    source: SourceKind,
    started_at: DateTime<Utc>,
    records_seen: usize,
    articles_created: usize,
    articles_existing: usize,
    skipped_malformed: usize,
    skipped_failed: usize,
}

impl BatchStatistics {
    pub fn start(source: SourceKind) -> Self {
        Self {
            source,
            started_at: Utc::now(),
            records_seen: 0,
            articles_created: 0,
            articles_existing: 0,
            skipped_malformed: 0,
            skipped_failed: 0,
        }
    }

    pub fn record(&mut self, outcome: RecordOutcome) {
        self.records_seen += 1;
        match outcome {
            RecordOutcome::Created => self.articles_created += 1,
            RecordOutcome::Existing => self.articles_existing += 1,
            RecordOutcome::Malformed => self.skipped_malformed += 1,
            RecordOutcome::Failed => self.skipped_failed += 1,
        }
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }

    /// Whether a progress line is due after the current record
    pub fn progress_due(&self, interval: usize) -> bool {
        interval > 0 && self.records_seen > 0 && self.records_seen % interval == 0
    }

    pub fn progress_string(&self, total: usize) -> String {
        format!(
            "Processed {} of {} records ({} new, {} skipped)",
            self.records_seen,
            total,
            self.articles_created,
            self.skipped_malformed + self.skipped_failed
        )
    }

    pub fn finish(self, counts: StoreCounts) -> BatchSummary {
        BatchSummary {
            source: self.source,
            records_seen: self.records_seen,
            records_ingested: self.articles_created + self.articles_existing,
            articles_created: self.articles_created,
            articles_existing: self.articles_existing,
            skipped_malformed: self.skipped_malformed,
            skipped_failed: self.skipped_failed,
            distinct_authors: counts.authors,
            distinct_categories: counts.categories,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
