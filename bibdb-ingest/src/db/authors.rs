//! Author database operations
//!
//! Authors are deduplicated by exact name. Once an author has an
//! affiliation, later sightings never overwrite it.

use super::articles::parse_guid;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

/// Author row as stored
#[derive(Debug, Clone)]
pub struct AuthorRow {
    pub guid: Uuid,
    pub name: String,
    pub affiliation: Option<String>,
    pub article_count: i64,
}

/// Get-or-create an author by name
///
/// A stored affiliation is never replaced; a missing one is filled from the
/// first sighting that carries one.
pub async fn resolve_author(
    conn: &mut SqliteConnection,
    name: &str,
    affiliation: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let guid: String = sqlx::query_scalar(
        r#"
        INSERT INTO authors (guid, name, affiliation)
        VALUES (?, ?, ?)
        ON CONFLICT(name) DO UPDATE
            SET affiliation = COALESCE(authors.affiliation, excluded.affiliation)
        RETURNING guid
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(affiliation)
    .fetch_one(&mut *conn)
    .await?;

    parse_guid(&guid)
}

/// Load author by name
pub async fn load_author_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<AuthorRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, affiliation, article_count
        FROM authors
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");

            Ok(Some(AuthorRow {
                guid: parse_guid(&guid_str)?,
                name: row.get("name"),
                affiliation: row.get("affiliation"),
                article_count: row.get("article_count"),
            }))
        }
        None => Ok(None),
    }
}

/// Link article to author at a list position
///
/// Returns `false` when the pair was already linked; the stored position is
/// left untouched in that case.
pub async fn link_article_author(
    conn: &mut SqliteConnection,
    article_id: Uuid,
    author_id: Uuid,
    position: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO article_authors (article_id, author_id, position)
        VALUES (?, ?, ?)
        ON CONFLICT(article_id, author_id) DO NOTHING
        "#,
    )
    .bind(article_id.to_string())
    .bind(author_id.to_string())
    .bind(position)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Store the number of linked articles on every author
pub async fn recompute_author_metadata(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE authors
        SET article_count = (
            SELECT COUNT(*) FROM article_authors WHERE article_authors.author_id = authors.guid
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_author_get_or_create() {
        let pool = bibdb_common::db::init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = resolve_author(&mut conn, "A. Smith", Some("MIT")).await.unwrap();
        let again = resolve_author(&mut conn, "A. Smith", Some("Stanford")).await.unwrap();
        let other = resolve_author(&mut conn, "B. Lee", None).await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);

        let loaded = load_author_by_name(&mut conn, "A. Smith")
            .await
            .unwrap()
            .expect("author not found");
        assert_eq!(loaded.guid, first);
        // First affiliation wins
        assert_eq!(loaded.affiliation.as_deref(), Some("MIT"));
    }

    #[tokio::test]
    async fn test_missing_affiliation_filled_later() {
        let pool = bibdb_common::db::init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let bare = resolve_author(&mut conn, "B. Lee", None).await.unwrap();
        let with_affiliation = resolve_author(&mut conn, "B. Lee", Some("CMU")).await.unwrap();
        let bare_again = resolve_author(&mut conn, "B. Lee", None).await.unwrap();

        assert_eq!(bare, with_affiliation);
        assert_eq!(bare, bare_again);

        let loaded = load_author_by_name(&mut conn, "B. Lee").await.unwrap().unwrap();
        assert_eq!(loaded.affiliation.as_deref(), Some("CMU"));
    }

    #[tokio::test]
    async fn test_link_requires_existing_article() {
        let pool = bibdb_common::db::init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let author = resolve_author(&mut conn, "Lone", None).await.unwrap();
        let result = link_article_author(&mut conn, Uuid::new_v4(), author, 0).await;

        assert!(result.is_err(), "link to a missing article was accepted");
    }
}
