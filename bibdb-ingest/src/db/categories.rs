//! Category database operations

use super::articles::parse_guid;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Get-or-create a category by code
pub async fn resolve_category(conn: &mut SqliteConnection, code: &str) -> Result<Uuid, sqlx::Error> {
    let guid = Uuid::new_v4();

    let result = sqlx::query("INSERT INTO categories (guid, code) VALUES (?, ?) ON CONFLICT(code) DO NOTHING")
        .bind(guid.to_string())
        .bind(code)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 1 {
        return Ok(guid);
    }

    let existing: String = sqlx::query_scalar("SELECT guid FROM categories WHERE code = ?")
        .bind(code)
        .fetch_one(&mut *conn)
        .await?;

    parse_guid(&existing)
}

/// Load category id by code
pub async fn load_category_id(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let guid: Option<String> = sqlx::query_scalar("SELECT guid FROM categories WHERE code = ?")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

    guid.as_deref().map(parse_guid).transpose()
}

/// Link article to category; `false` when already linked
pub async fn link_article_category(
    conn: &mut SqliteConnection,
    article_id: Uuid,
    category_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO article_categories (article_id, category_id)
        VALUES (?, ?)
        ON CONFLICT(article_id, category_id) DO NOTHING
        "#,
    )
    .bind(article_id.to_string())
    .bind(category_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_category_get_or_create() {
        let pool = bibdb_common::db::init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = resolve_category(&mut conn, "cs.AI").await.unwrap();
        let again = resolve_category(&mut conn, "cs.AI").await.unwrap();
        let other = resolve_category(&mut conn, "cs.LG").await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(load_category_id(&mut conn, "cs.AI").await.unwrap(), Some(first));
        assert_eq!(load_category_id(&mut conn, "cs.CV").await.unwrap(), None);
    }
}
