//! Ingestion Orchestrator
//!
//! Drives raw records one at a time through normalizer, extractor and store.
//! Each record's writes form a single transaction; a constraint violation
//! rolls the record back and the batch moves on, any other storage failure
//! aborts the batch.

use crate::db::{self, ArticleUpsert, Store};
use crate::error::{IngestError, IngestResult};
use crate::models::{CanonicalArticle, RawRecord, SourceKind};
use crate::normalizer::FieldNormalizer;
use crate::services::statistics::{BatchStatistics, BatchSummary, RecordOutcome};
use bibdb_common::config::{IngestSettings, SentinelConfig, TomlConfig};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Natural key → surrogate id maps
///
/// Only ever holds ids of committed rows.
#[derive(Debug, Default)]
struct KeyCache {
    authors: HashMap<String, Uuid>,
    categories: HashMap<String, Uuid>,
}

impl KeyCache {
    fn merge(&mut self, pending: KeyCache) {
        self.authors.extend(pending.authors);
        self.categories.extend(pending.categories);
    }

    fn len(&self) -> usize {
        self.authors.len() + self.categories.len()
    }
}

/// Batch ingestion driver bound to one store
pub struct IngestOrchestrator {
    store: Store,
    settings: IngestSettings,
    sentinels: SentinelConfig,
    cache: KeyCache,
}

impl IngestOrchestrator {
    pub fn new(store: Store, settings: IngestSettings, sentinels: SentinelConfig) -> Self {
        Self {
            store,
            settings,
            sentinels,
            cache: KeyCache::default(),
        }
    }

    pub fn from_config(store: Store, config: &TomlConfig) -> Self {
        Self::new(store, config.ingest.clone(), config.sentinels.clone())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Number of natural keys currently cached
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    /// Ingest one batch of raw records from `source`
    ///
    /// Malformed records and records whose transaction hits a constraint
    /// violation are skipped and counted. Any other storage error is returned
    /// and ends the batch; records committed before it stay committed.
    pub async fn ingest_batch(
        &mut self,
        records: &[RawRecord],
        source: SourceKind,
    ) -> IngestResult<BatchSummary> {
        let normalizer = FieldNormalizer::for_source(source, &self.sentinels);
        let mut stats = BatchStatistics::start(source);
        let total = records.len();

        info!(source = %source, records = total, "Starting ingestion batch");

        for (index, raw) in records.iter().enumerate() {
            let outcome = self.process_record(&normalizer, index, raw).await?;
            stats.record(outcome);

            if stats.progress_due(self.settings.progress_interval) {
                info!(source = %source, "{}", stats.progress_string(total));
            }
        }

        self.store.recompute_author_metadata().await?;

        let summary = stats.finish(self.store.counts().await?);
        info!(source = %source, "Batch complete: {}", summary.display_string());

        Ok(summary)
    }

    async fn process_record(
        &mut self,
        normalizer: &FieldNormalizer,
        index: usize,
        raw: &RawRecord,
    ) -> IngestResult<RecordOutcome> {
        match self.ingest_record(normalizer, raw).await {
            Ok((source_id, upsert)) if upsert.was_new => {
                debug!(source_id = %source_id, "Article stored");
                Ok(RecordOutcome::Created)
            }
            Ok((source_id, _)) => {
                debug!(source_id = %source_id, "Article already stored");
                Ok(RecordOutcome::Existing)
            }
            Err(e) if e.is_record_local() => {
                warn!(record = index, "Skipping record: {}", e);
                match e {
                    IngestError::MalformedRecord { .. } => Ok(RecordOutcome::Malformed),
                    _ => Ok(RecordOutcome::Failed),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn ingest_record(
        &mut self,
        normalizer: &FieldNormalizer,
        raw: &RawRecord,
    ) -> IngestResult<(String, ArticleUpsert)> {
        let article = normalizer.normalize(raw)?;
        let upsert = self.store_article(&article).await?;
        Ok((article.source_id, upsert))
    }

    /// Write one article and its links in a single transaction
    async fn store_article(&mut self, article: &CanonicalArticle) -> IngestResult<ArticleUpsert> {
        let mut pending = KeyCache::default();
        let mut tx = self.store.begin().await?;

        match self.write_article(&mut tx, article, &mut pending).await {
            Ok(upsert) => {
                tx.commit().await?;
                if self.settings.cache_natural_keys {
                    self.cache.merge(pending);
                }
                Ok(upsert)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn write_article(
        &self,
        conn: &mut SqliteConnection,
        article: &CanonicalArticle,
        pending: &mut KeyCache,
    ) -> IngestResult<ArticleUpsert> {
        let upsert = db::upsert_article(conn, article).await?;

        // A stored article keeps the links it was created with
        if !upsert.was_new {
            return Ok(upsert);
        }

        for (position, author) in article.author_list.iter().enumerate() {
            // An affiliation may still need filling in, so only bare names use the cache
            let cached = match author.affiliation {
                Some(_) => None,
                None => self.cached_author(&author.name, pending),
            };
            let author_id = match cached {
                Some(id) => id,
                None => {
                    let id = db::resolve_author(conn, &author.name, author.affiliation.as_deref())
                        .await?;
                    pending.authors.insert(author.name.clone(), id);
                    id
                }
            };

            let linked =
                db::link_article_author(conn, upsert.article_id, author_id, position as i64).await?;
            if !linked {
                debug!(
                    source_id = %article.source_id,
                    author = %author.name,
                    "Author listed twice, keeping first position"
                );
            }
        }

        for code in &article.category_list {
            let category_id = match self.cached_category(code, pending) {
                Some(id) => id,
                None => {
                    let id = db::resolve_category(conn, code).await?;
                    pending.categories.insert(code.clone(), id);
                    id
                }
            };

            db::link_article_category(conn, upsert.article_id, category_id).await?;
        }

        Ok(upsert)
    }

    fn cached_author(&self, name: &str, pending: &KeyCache) -> Option<Uuid> {
        pending
            .authors
            .get(name)
            .or_else(|| self.cache.authors.get(name))
            .copied()
    }

    fn cached_category(&self, code: &str, pending: &KeyCache) -> Option<Uuid> {
        pending
            .categories
            .get(code)
            .or_else(|| self.cache.categories.get(code))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_cache_filled_after_commit() {
        let store = Store::open_in_memory().await.unwrap();
        let mut orchestrator =
            IngestOrchestrator::new(store, IngestSettings::default(), SentinelConfig::default());

        let records = vec![record(json!({
            "arxiv_id": "2401.00001",
            "title": "Cached",
            "authors": "A. Smith; B. Lee",
            "categories": "cs.AI|cs.LG",
        }))];

        orchestrator.ingest_batch(&records, SourceKind::Arxiv).await.unwrap();
        assert_eq!(orchestrator.cached_keys(), 4);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let store = Store::open_in_memory().await.unwrap();
        let settings = IngestSettings {
            cache_natural_keys: false,
            ..IngestSettings::default()
        };
        let mut orchestrator = IngestOrchestrator::new(store, settings, SentinelConfig::default());

        let records = vec![
            record(json!({ "arxiv_id": "1", "title": "One", "authors": "A. Smith" })),
            record(json!({ "arxiv_id": "2", "title": "Two", "authors": "A. Smith" })),
        ];

        let summary = orchestrator.ingest_batch(&records, SourceKind::Arxiv).await.unwrap();
        assert_eq!(orchestrator.cached_keys(), 0);
        assert_eq!(summary.articles_created, 2);
        assert_eq!(summary.distinct_authors, 1);
    }

    #[tokio::test]
    async fn test_repeated_author_keeps_first_position() {
        let store = Store::open_in_memory().await.unwrap();
        let mut orchestrator = IngestOrchestrator::new(
            store.clone(),
            IngestSettings::default(),
            SentinelConfig::default(),
        );

        let records = vec![record(json!({
            "arxiv_id": "2401.00009",
            "title": "Echo",
            "authors": "X; Y; X",
        }))];

        let summary = orchestrator.ingest_batch(&records, SourceKind::Arxiv).await.unwrap();
        assert_eq!(summary.records_ingested, 1);

        let authors = store.article_authors("2401.00009").await.unwrap();
        assert_eq!(authors, vec![("X".to_string(), 0), ("Y".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_cached_author_gains_affiliation() {
        let store = Store::open_in_memory().await.unwrap();
        let mut orchestrator = IngestOrchestrator::new(
            store.clone(),
            IngestSettings::default(),
            SentinelConfig::default(),
        );

        let records = vec![
            record(json!({ "arxiv_id": "1", "title": "One", "authors": "B. Lee" })),
            record(json!({
                "arxiv_id": "2",
                "title": "Two",
                "authors": [{ "name": "B. Lee", "affiliation": "CMU" }],
            })),
        ];

        orchestrator.ingest_batch(&records, SourceKind::Arxiv).await.unwrap();

        let lee = store.author("B. Lee").await.unwrap().unwrap();
        assert_eq!(lee.affiliation.as_deref(), Some("CMU"));
        assert_eq!(lee.article_count, 2);
    }

    #[tokio::test]
    async fn test_storage_failure_aborts_batch() {
        let store = Store::open_in_memory().await.unwrap();
        let mut orchestrator = IngestOrchestrator::new(
            store.clone(),
            IngestSettings::default(),
            SentinelConfig::default(),
        );
        store.pool().close().await;

        let records = vec![
            record(json!({ "title": "Skipped before storage" })),
            record(json!({ "arxiv_id": "3", "title": "Three" })),
        ];
        let result = orchestrator.ingest_batch(&records, SourceKind::Arxiv).await;

        assert!(matches!(result, Err(IngestError::Storage(_))));
    }
}
