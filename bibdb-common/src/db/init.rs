//! Database initialization
//!
//! Opens (or creates) the SQLite store and makes sure the relational schema
//! exists. Every `CREATE` is idempotent, so opening an existing store is safe.
//!
//! Natural keys are protected by `UNIQUE` constraints and every link column
//! carries a foreign key; the constraints are the single source of truth for
//! deduplication and referential integrity.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Table names in dependency order (entities before links)
pub const TABLES: [&str; 5] = [
    "articles",
    "authors",
    "categories",
    "article_authors",
    "article_categories",
];

/// Initialize database connection and create tables if needed
///
/// Failure to open or create the file is reported as
/// [`Error::StorageUnavailable`].
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    if db_path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("database path is empty".to_string()));
    }

    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::StorageUnavailable(format!("{}: {}", parent.display(), e))
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    // Single writer: one connection keeps every statement on the same handle
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| Error::StorageUnavailable(format!("{}: {}", db_path.display(), e)))?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory store with the full schema
///
/// The pool never recycles its single connection, since dropping it would
/// discard the database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| Error::StorageUnavailable(format!("in-memory database: {}", e)))?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_articles_table(pool).await?;
    create_authors_table(pool).await?;
    create_categories_table(pool).await?;

    // Linking tables
    create_article_authors_table(pool).await?;
    create_article_categories_table(pool).await?;

    Ok(())
}

async fn create_articles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            guid TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            source_id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            abstract TEXT NOT NULL,
            published_at TEXT,
            updated_at TEXT,
            domain TEXT NOT NULL DEFAULT '',
            doi TEXT NOT NULL,
            comment TEXT NOT NULL,
            journal_ref TEXT NOT NULL,
            pdf_url TEXT,
            primary_category TEXT,
            categories TEXT NOT NULL DEFAULT '',
            author_count INTEGER NOT NULL DEFAULT 0,
            first_author TEXT NOT NULL,
            last_author TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_authors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            affiliation TEXT,
            article_count INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_article_authors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_authors (
            article_id TEXT NOT NULL REFERENCES articles(guid),
            author_id TEXT NOT NULL REFERENCES authors(guid),
            position INTEGER NOT NULL CHECK (position >= 0),
            PRIMARY KEY (article_id, author_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_article_authors_author ON article_authors(author_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_article_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS article_categories (
            article_id TEXT NOT NULL REFERENCES articles(guid),
            category_id TEXT NOT NULL REFERENCES categories(guid),
            PRIMARY KEY (article_id, category_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_article_categories_category ON article_categories(category_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
