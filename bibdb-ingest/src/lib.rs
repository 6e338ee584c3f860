//! bibdb-ingest library interface
//!
//! Normalizes harvested arXiv and Scopus records into one canonical article
//! shape and ingests them idempotently into the relational store.

pub mod db;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod services;

pub use crate::db::{Store, StoreCounts};
pub use crate::error::{IngestError, IngestResult};
pub use crate::models::{AuthorRef, CanonicalArticle, RawRecord, SourceKind};
pub use crate::normalizer::FieldNormalizer;
pub use crate::services::{BatchSummary, IngestOrchestrator};
