//! Full-text search over member name, role and organ

use serde::Serialize;
use sqlx::{Row, SqlitePool};

use extrateto_common::slug::remove_accents;

use crate::error::SyncResult;

/// Default number of search hits
pub const DEFAULT_SEARCH_LIMIT: i64 = 8;

/// Queries shorter than this return no hits
const MIN_QUERY_CHARS: usize = 2;

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub nome: String,
    pub cargo: String,
    pub orgao: String,
    pub estado: String,
    pub remuneracao_total: f64,
}

/// Rebuild the search index from `membros` (idempotent)
pub async fn rebuild_index(pool: &SqlitePool) -> SyncResult<()> {
    sqlx::query("INSERT INTO membros_fts(membros_fts) VALUES('rebuild')")
        .execute(pool)
        .await?;
    tracing::debug!("Rebuilt search index");
    Ok(())
}

/// Accent- and punctuation-free form of a search query
fn normalize_query(query: &str) -> String {
    remove_accents(query)
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
}

/// Prefix query for FTS5: `"João Silva"` becomes `joao* silva*`
pub fn build_match_query(query: &str) -> Option<String> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return None;
    }

    let terms: Vec<String> = normalize_query(query)
        .split_whitespace()
        .map(|term| format!("{}*", term))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

async fn index_exists(pool: &SqlitePool) -> SyncResult<bool> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'membros_fts'")
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Search members by name, role or organ, highest total first
///
/// Falls back to a substring scan when the search index table is missing.
pub async fn search_members(pool: &SqlitePool, query: &str, limit: i64) -> SyncResult<Vec<SearchHit>> {
    let Some(match_query) = build_match_query(query) else {
        return Ok(Vec::new());
    };

    let rows = if index_exists(pool).await? {
        sqlx::query(
            r#"
            SELECT m.id, m.nome, m.cargo, m.orgao, m.estado, m.remuneracao_total
            FROM membros_fts fts
            JOIN membros m ON m.id = fts.rowid
            WHERE membros_fts MATCH ?
            ORDER BY m.remuneracao_total DESC
            LIMIT ?
            "#,
        )
        .bind(&match_query)
        .bind(limit)
        .fetch_all(pool)
        .await?
    } else {
        tracing::debug!("Search index missing, using substring scan");
        let like = format!("%{}%", normalize_query(query.trim()).trim());
        sqlx::query(
            r#"
            SELECT id, nome, cargo, orgao, estado, remuneracao_total
            FROM membros
            WHERE nome LIKE ?1 OR cargo LIKE ?1 OR orgao LIKE ?1
            ORDER BY remuneracao_total DESC
            LIMIT ?2
            "#,
        )
        .bind(like)
        .bind(limit)
        .fetch_all(pool)
        .await?
    };

    rows.iter()
        .map(|row| -> SyncResult<SearchHit> {
            Ok(SearchHit {
                id: row.try_get("id")?,
                nome: row.try_get("nome")?,
                cargo: row.try_get("cargo")?,
                orgao: row.try_get("orgao")?,
                estado: row.try_get("estado")?,
                remuneracao_total: row.try_get("remuneracao_total")?,
            })
        })
        .collect()
}
