//! SQLite persistence
//!
//! Owns the schema: `membros` (one row per member-month), `historico_mensal`
//! (monthly history side table), `sync_log` (append-only audit trail) and the
//! external-content FTS5 index `membros_fts` keyed to `membros.id`.

pub mod membros;
pub mod search;
pub mod sync_log;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::SyncResult;

/// SQLite busy timeout; longer waits are handled by `retry_on_lock`
const BUSY_TIMEOUT_MS: u64 = 250;

/// Open (creating if needed) the database and ensure the schema exists
pub async fn init_database_pool(db_path: &Path) -> SyncResult<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(extrateto_common::Error::from)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table, index and the search index if absent (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> SyncResult<()> {
    create_membros_table(pool).await?;
    create_historico_table(pool).await?;
    create_sync_log_table(pool).await?;
    create_search_index(pool).await?;
    Ok(())
}

async fn create_membros_table(pool: &SqlitePool) -> SyncResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS membros (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            cargo TEXT NOT NULL,
            orgao TEXT NOT NULL,
            estado TEXT NOT NULL,
            remuneracao_base REAL NOT NULL DEFAULT 0,
            verbas_indenizatorias REAL NOT NULL DEFAULT 0,
            direitos_eventuais REAL NOT NULL DEFAULT 0,
            direitos_pessoais REAL NOT NULL DEFAULT 0,
            remuneracao_total REAL NOT NULL DEFAULT 0,
            acima_teto REAL NOT NULL DEFAULT 0,
            percentual_acima_teto REAL NOT NULL DEFAULT 0,
            mes_referencia TEXT NOT NULL,
            ano_referencia INTEGER NOT NULL,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_membros_estado ON membros(estado)",
        "CREATE INDEX IF NOT EXISTS idx_membros_orgao ON membros(orgao)",
        "CREATE INDEX IF NOT EXISTS idx_membros_remuneracao ON membros(remuneracao_total DESC)",
        "CREATE INDEX IF NOT EXISTS idx_membros_acima_teto ON membros(acima_teto DESC)",
        "CREATE INDEX IF NOT EXISTS idx_membros_mes ON membros(mes_referencia)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

async fn create_historico_table(pool: &SqlitePool) -> SyncResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS historico_mensal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            membro_id INTEGER NOT NULL REFERENCES membros(id),
            mes TEXT NOT NULL,
            remuneracao_base REAL NOT NULL DEFAULT 0,
            remuneracao_total REAL NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_historico_membro ON historico_mensal(membro_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_sync_log_table(pool: &SqlitePool) -> SyncResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            orgao TEXT NOT NULL,
            mes_referencia TEXT NOT NULL,
            total_membros INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            error_message TEXT,
            synced_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_search_index(pool: &SqlitePool) -> SyncResult<()> {
    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS membros_fts USING fts5(
            nome, cargo, orgao,
            content='membros',
            content_rowid='id'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_schema_created_and_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("extrateto.db");

        let pool = init_database_pool(&db_path).await.unwrap();
        create_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type IN ('table') AND name IN \
             ('membros', 'historico_mensal', 'sync_log', 'membros_fts') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["historico_mensal", "membros", "membros_fts", "sync_log"]);
    }
}
