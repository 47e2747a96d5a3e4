//! Append-only sync audit trail

use chrono::NaiveDateTime;
use sqlx::{Row, SqlitePool};

use extrateto_common::models::SyncLogEntry;
use extrateto_common::{MesReferencia, SyncStatus};

use crate::error::SyncResult;

/// Record one organ-month sync attempt
pub async fn append(
    pool: &SqlitePool,
    orgao: &str,
    mes: MesReferencia,
    total_membros: i64,
    status: SyncStatus,
    error_message: Option<&str>,
) -> SyncResult<i64> {
    let id = sqlx::query(
        "INSERT INTO sync_log (orgao, mes_referencia, total_membros, status, error_message) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(orgao)
    .bind(mes.to_string())
    .bind(total_membros)
    .bind(status.as_str())
    .bind(error_message)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Audit rows for a month in insertion order, or every row when `mes` is `None`
pub async fn list(pool: &SqlitePool, mes: Option<MesReferencia>) -> SyncResult<Vec<SyncLogEntry>> {
    let rows = match mes {
        Some(mes) => {
            sqlx::query(
                "SELECT id, orgao, mes_referencia, total_membros, status, error_message, synced_at \
                 FROM sync_log WHERE mes_referencia = ? ORDER BY id",
            )
            .bind(mes.to_string())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, orgao, mes_referencia, total_membros, status, error_message, synced_at \
                 FROM sync_log ORDER BY id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter()
        .map(|row| -> SyncResult<SyncLogEntry> {
            let mes: String = row.try_get("mes_referencia")?;
            let status: String = row.try_get("status")?;
            Ok(SyncLogEntry {
                id: row.try_get("id")?,
                orgao: row.try_get("orgao")?,
                mes_referencia: mes.parse()?,
                total_membros: row.try_get("total_membros")?,
                status: status.parse()?,
                error_message: row.try_get("error_message")?,
                synced_at: row.try_get::<Option<NaiveDateTime>, _>("synced_at").ok().flatten(),
            })
        })
        .collect()
}
