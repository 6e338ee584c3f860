//! Relational store for ingested articles
//!
//! Per-table operations live in the submodules and take a plain
//! `&mut SqliteConnection`, so the same call works on a pooled connection or
//! inside a transaction. [`Store`] owns the pool and adds the batch-level
//! queries.

pub mod articles;
pub mod authors;
pub mod categories;

pub use articles::{load_article_by_source_id, upsert_article, ArticleRow, ArticleUpsert};
pub use authors::{
    link_article_author, load_author_by_name, recompute_author_metadata, resolve_author, AuthorRow,
};
pub use categories::{link_article_category, load_category_id, resolve_category};

use crate::error::IngestResult;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tracing::debug;

/// Row counts of every table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub articles: i64,
    pub authors: i64,
    pub categories: i64,
    pub article_authors: i64,
    pub article_categories: i64,
}

/// Handle to an opened store
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the store at `path`
    pub async fn open(path: &Path) -> IngestResult<Self> {
        let pool = bibdb_common::db::init_database(path).await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory store
    pub async fn open_in_memory() -> IngestResult<Self> {
        let pool = bibdb_common::db::init_memory_database().await?;
        Ok(Self { pool })
    }

    /// Wrap a pool whose schema is already created
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Begin a transaction covering one record's mutations
    pub async fn begin(&self) -> IngestResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Store the linked-article count on every author
    pub async fn recompute_author_metadata(&self) -> IngestResult<u64> {
        let mut conn = self.pool.acquire().await?;
        let updated = authors::recompute_author_metadata(&mut conn).await?;
        debug!("Recomputed article counts for {} authors", updated);
        Ok(updated)
    }

    /// Row counts of all five tables
    pub async fn counts(&self) -> IngestResult<StoreCounts> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM articles),
                (SELECT COUNT(*) FROM authors),
                (SELECT COUNT(*) FROM categories),
                (SELECT COUNT(*) FROM article_authors),
                (SELECT COUNT(*) FROM article_categories)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreCounts {
            articles: row.0,
            authors: row.1,
            categories: row.2,
            article_authors: row.3,
            article_categories: row.4,
        })
    }

    /// Link rows whose article, author or category does not exist
    pub async fn dangling_link_count(&self) -> IngestResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM article_authors l
                 WHERE NOT EXISTS (SELECT 1 FROM articles a WHERE a.guid = l.article_id)
                    OR NOT EXISTS (SELECT 1 FROM authors u WHERE u.guid = l.author_id))
              + (SELECT COUNT(*) FROM article_categories l
                 WHERE NOT EXISTS (SELECT 1 FROM articles a WHERE a.guid = l.article_id)
                    OR NOT EXISTS (SELECT 1 FROM categories c WHERE c.guid = l.category_id))
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Load one article by `source_id`
    pub async fn article(&self, source_id: &str) -> IngestResult<Option<ArticleRow>> {
        let mut conn = self.pool.acquire().await?;
        Ok(articles::load_article_by_source_id(&mut conn, source_id).await?)
    }

    /// Load one author by name
    pub async fn author(&self, name: &str) -> IngestResult<Option<AuthorRow>> {
        let mut conn = self.pool.acquire().await?;
        Ok(authors::load_author_by_name(&mut conn, name).await?)
    }

    /// Every author as `(name, affiliation, article_count)`, sorted by name
    pub async fn author_summaries(&self) -> IngestResult<Vec<(String, Option<String>, i64)>> {
        let rows: Vec<(String, Option<String>, i64)> = sqlx::query_as(
            "SELECT name, affiliation, article_count FROM authors ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Author names of an article ordered by position
    pub async fn article_authors(&self, source_id: &str) -> IngestResult<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT u.name, l.position
            FROM article_authors l
            JOIN articles a ON a.guid = l.article_id
            JOIN authors u ON u.guid = l.author_id
            WHERE a.source_id = ?
            ORDER BY l.position
            "#,
        )
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Category codes linked to an article, sorted
    pub async fn article_categories(&self, source_id: &str) -> IngestResult<Vec<String>> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.code
            FROM article_categories l
            JOIN articles a ON a.guid = l.article_id
            JOIN categories c ON c.guid = l.category_id
            WHERE a.source_id = ?
            ORDER BY c.code
            "#,
        )
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    /// Close the pool, flushing the WAL
    pub async fn close(self) {
        self.pool.close().await;
    }
}
