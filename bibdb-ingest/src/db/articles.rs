//! Article database operations
//!
//! Articles are keyed by `source_id`; inserting an existing key is a no-op
//! that hands back the stored surrogate id.

use crate::models::CanonicalArticle;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Outcome of an article upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleUpsert {
    pub article_id: Uuid,
    pub was_new: bool,
}

/// Article row as stored
#[derive(Debug, Clone)]
pub struct ArticleRow {
    pub guid: Uuid,
    pub source: String,
    pub source_id: String,
    pub title: String,
    pub abstract_text: String,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub domain: String,
    pub doi: String,
    pub comment: String,
    pub journal_ref: String,
    pub pdf_url: Option<String>,
    pub primary_category: Option<String>,
    pub categories: String,
    pub author_count: i64,
    pub first_author: String,
    pub last_author: String,
}

/// Insert an article unless its `source_id` is already stored
pub async fn upsert_article(
    conn: &mut SqliteConnection,
    article: &CanonicalArticle,
) -> Result<ArticleUpsert, sqlx::Error> {
    let guid = Uuid::new_v4();

    let result = sqlx::query(
        r#"
        INSERT INTO articles (
            guid, source, source_id, title, abstract, published_at, updated_at,
            domain, doi, comment, journal_ref, pdf_url, primary_category,
            categories, author_count, first_author, last_author
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(source_id) DO NOTHING
        "#,
    )
    .bind(guid.to_string())
    .bind(article.source.as_str())
    .bind(&article.source_id)
    .bind(&article.title)
    .bind(&article.abstract_text)
    .bind(&article.published_at)
    .bind(&article.updated_at)
    .bind(&article.domain_or_venue)
    .bind(&article.doi)
    .bind(&article.comment)
    .bind(&article.journal_ref)
    .bind(&article.pdf_url)
    .bind(&article.primary_category)
    .bind(article.categories_joined())
    .bind(article.author_count() as i64)
    .bind(article.first_author())
    .bind(article.last_author())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(ArticleUpsert {
            article_id: guid,
            was_new: true,
        });
    }

    let existing: String = sqlx::query_scalar("SELECT guid FROM articles WHERE source_id = ?")
        .bind(&article.source_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(ArticleUpsert {
        article_id: parse_guid(&existing)?,
        was_new: false,
    })
}

/// Load article by its natural key
pub async fn load_article_by_source_id(
    conn: &mut SqliteConnection,
    source_id: &str,
) -> Result<Option<ArticleRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT guid, source, source_id, title, abstract, published_at, updated_at,
               domain, doi, comment, journal_ref, pdf_url, primary_category,
               categories, author_count, first_author, last_author
        FROM articles
        WHERE source_id = ?
        "#,
    )
    .bind(source_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");

            Ok(Some(ArticleRow {
                guid: parse_guid(&guid_str)?,
                source: row.get("source"),
                source_id: row.get("source_id"),
                title: row.get("title"),
                abstract_text: row.get("abstract"),
                published_at: row.get("published_at"),
                updated_at: row.get("updated_at"),
                domain: row.get("domain"),
                doi: row.get("doi"),
                comment: row.get("comment"),
                journal_ref: row.get("journal_ref"),
                pdf_url: row.get("pdf_url"),
                primary_category: row.get("primary_category"),
                categories: row.get("categories"),
                author_count: row.get("author_count"),
                first_author: row.get("first_author"),
                last_author: row.get("last_author"),
            }))
        }
        None => Ok(None),
    }
}

/// Surrogate ids are stored as text; a malformed one means a corrupted row
pub(crate) fn parse_guid(text: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(text).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
