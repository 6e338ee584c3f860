//! Service modules for batch ingestion

pub mod ingest_orchestrator;
pub mod statistics;

pub use ingest_orchestrator::IngestOrchestrator;
pub use statistics::{BatchStatistics, BatchSummary, RecordOutcome};
