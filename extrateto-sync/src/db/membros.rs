//! Member-month table operations
//!
//! Writes for one organ-month happen in a single transaction together with
//! their `historico_mensal` rows, so a failed batch leaves nothing behind.

use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use extrateto_common::{CompensationRecord, MesReferencia};

use crate::error::SyncResult;

/// Column list used by every query returning full records
pub const RECORD_COLUMNS: &str = "id, nome, cargo, orgao, estado, remuneracao_base, \
     verbas_indenizatorias, direitos_eventuais, direitos_pessoais, remuneracao_total, \
     acima_teto, percentual_acima_teto, mes_referencia, ano_referencia, created_at";

/// Map a `membros` row into a typed record
pub fn record_from_row(row: &SqliteRow) -> SyncResult<CompensationRecord> {
    let cargo: String = row.try_get("cargo")?;
    let mes: String = row.try_get("mes_referencia")?;

    Ok(CompensationRecord {
        id: row.try_get("id")?,
        nome: row.try_get("nome")?,
        cargo: cargo.parse()?,
        orgao: row.try_get("orgao")?,
        estado: row.try_get("estado")?,
        remuneracao_base: row.try_get("remuneracao_base")?,
        verbas_indenizatorias: row.try_get("verbas_indenizatorias")?,
        direitos_eventuais: row.try_get("direitos_eventuais")?,
        direitos_pessoais: row.try_get("direitos_pessoais")?,
        remuneracao_total: row.try_get("remuneracao_total")?,
        acima_teto: row.try_get("acima_teto")?,
        percentual_acima_teto: row.try_get("percentual_acima_teto")?,
        mes_referencia: mes.parse()?,
        ano_referencia: row.try_get("ano_referencia")?,
        created_at: row.try_get::<Option<NaiveDateTime>, _>("created_at").ok().flatten(),
    })
}

/// Insert one organ-month's records atomically; returns rows written
pub async fn insert_batch(pool: &SqlitePool, records: &[CompensationRecord]) -> SyncResult<u64> {
    let mut tx = pool.begin().await?;
    insert_records(&mut *tx, records).await?;
    tx.commit().await?;

    Ok(records.len() as u64)
}

/// Replace a month's records in one transaction; returns rows written
///
/// Nothing changes if any insert fails.
pub async fn replace_month(pool: &SqlitePool, mes: MesReferencia, records: &[CompensationRecord]) -> SyncResult<u64> {
    let mut tx = pool.begin().await?;
    delete_month_rows(&mut *tx, &mes.to_string()).await?;
    insert_records(&mut *tx, records).await?;
    tx.commit().await?;

    Ok(records.len() as u64)
}

async fn insert_records(conn: &mut SqliteConnection, records: &[CompensationRecord]) -> SyncResult<()> {
    for record in records {
        let mes = record.mes_referencia.to_string();

        let membro_id = sqlx::query(
            r#"
            INSERT INTO membros (
                nome, cargo, orgao, estado,
                remuneracao_base, verbas_indenizatorias, direitos_eventuais, direitos_pessoais,
                remuneracao_total, acima_teto, percentual_acima_teto,
                mes_referencia, ano_referencia
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.nome)
        .bind(record.cargo.as_str())
        .bind(&record.orgao)
        .bind(&record.estado)
        .bind(record.remuneracao_base)
        .bind(record.verbas_indenizatorias)
        .bind(record.direitos_eventuais)
        .bind(record.direitos_pessoais)
        .bind(record.remuneracao_total)
        .bind(record.acima_teto)
        .bind(record.percentual_acima_teto)
        .bind(&mes)
        .bind(record.ano_referencia)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO historico_mensal (membro_id, mes, remuneracao_base, remuneracao_total) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(membro_id)
        .bind(&mes)
        .bind(record.remuneracao_base)
        .bind(record.remuneracao_total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Number of records stored for a month
pub async fn count_month(pool: &SqlitePool, mes: MesReferencia) -> SyncResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membros WHERE mes_referencia = ?")
        .bind(mes.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Whether any record exists for a month
pub async fn month_exists(pool: &SqlitePool, mes: MesReferencia) -> SyncResult<bool> {
    Ok(count_month(pool, mes).await? > 0)
}

/// Delete every record of a month and its history rows; returns member rows deleted
pub async fn delete_month(pool: &SqlitePool, mes: MesReferencia) -> SyncResult<u64> {
    let mut tx = pool.begin().await?;
    let deleted = delete_month_rows(&mut *tx, &mes.to_string()).await?;
    tx.commit().await?;

    Ok(deleted)
}

async fn delete_month_rows(conn: &mut SqliteConnection, mes: &str) -> SyncResult<u64> {
    sqlx::query(
        "DELETE FROM historico_mensal WHERE membro_id IN \
         (SELECT id FROM membros WHERE mes_referencia = ?)",
    )
    .bind(mes)
    .execute(&mut *conn)
    .await?;

    let deleted = sqlx::query("DELETE FROM membros WHERE mes_referencia = ?")
        .bind(mes)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Wipe all member data, history and the audit log, then rebuild the empty index
pub async fn wipe_all(pool: &SqlitePool) -> SyncResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM historico_mensal").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM membros").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM sync_log").execute(&mut *tx).await?;
    tx.commit().await?;

    super::search::rebuild_index(pool).await?;
    tracing::info!("Wiped all member data and the sync log");
    Ok(())
}

/// All records of a month, highest total first
pub async fn records_for_month(pool: &SqlitePool, mes: MesReferencia) -> SyncResult<Vec<CompensationRecord>> {
    let sql = format!(
        "SELECT {} FROM membros WHERE mes_referencia = ? ORDER BY remuneracao_total DESC, id ASC",
        RECORD_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(mes.to_string()).fetch_all(pool).await?;
    rows.iter().map(record_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_schema;
    use extrateto_common::models::{CategoryTotals, MemberAggregate};
    use extrateto_common::Cargo;

    async fn memory_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    fn record(nome: &str, base: f64, mes: MesReferencia) -> CompensationRecord {
        let aggregate = MemberAggregate {
            nome: nome.to_string(),
            cargo: Cargo::Juiz,
            orgao: "TJ-SP".to_string(),
            estado: "SP".to_string(),
            totals: CategoryTotals {
                remuneracao_base: base,
                ..Default::default()
            },
        };
        CompensationRecord::from_aggregate(&aggregate, mes, 46_366.19)
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let pool = memory_pool().await;
        let mes = MesReferencia::new(2025, 6).unwrap();

        let written = insert_batch(&pool, &[record("Ana", 50_000.0, mes), record("Beto", 30_000.0, mes)])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let records = records_for_month(&pool, mes).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nome, "Ana");
        assert_eq!(records[0].cargo, Cargo::Juiz);
        assert!(records[0].id.is_some());
        assert!((records[0].acima_teto - 3_633.81).abs() < 0.01);

        let historico: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM historico_mensal")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(historico, 2);
    }

    #[tokio::test]
    async fn test_delete_month_removes_history_and_keeps_other_months() {
        let pool = memory_pool().await;
        let junho = MesReferencia::new(2025, 6).unwrap();
        let julho = junho.next();

        insert_batch(&pool, &[record("Ana", 1.0, junho)]).await.unwrap();
        insert_batch(&pool, &[record("Ana", 2.0, julho)]).await.unwrap();

        assert_eq!(delete_month(&pool, junho).await.unwrap(), 1);
        assert!(!month_exists(&pool, junho).await.unwrap());
        assert_eq!(count_month(&pool, julho).await.unwrap(), 1);

        let historico: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM historico_mensal")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(historico, 1);
    }

    #[tokio::test]
    async fn test_replace_month_keeps_old_rows_when_insert_fails() {
        let pool = memory_pool().await;
        let mes = MesReferencia::new(2025, 6).unwrap();
        insert_batch(&pool, &[record("Ana", 1.0, mes)]).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_carla BEFORE INSERT ON membros WHEN NEW.nome = 'Carla' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = replace_month(&pool, mes, &[record("Beto", 2.0, mes), record("Carla", 3.0, mes)]).await;
        assert!(result.is_err());

        let records = records_for_month(&pool, mes).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nome, "Ana");
        let historico: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM historico_mensal")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(historico, 1);

        assert_eq!(replace_month(&pool, mes, &[record("Beto", 2.0, mes)]).await.unwrap(), 1);
        assert_eq!(records_for_month(&pool, mes).await.unwrap()[0].nome, "Beto");
    }

    #[tokio::test]
    async fn test_wipe_all_clears_everything() {
        let pool = memory_pool().await;
        let mes = MesReferencia::new(2025, 6).unwrap();
        insert_batch(&pool, &[record("Ana", 1.0, mes)]).await.unwrap();
        sqlx::query("INSERT INTO sync_log (orgao, mes_referencia, status) VALUES ('TJ-SP', '2025-06', 'success')")
            .execute(&pool)
            .await
            .unwrap();

        wipe_all(&pool).await.unwrap();

        let remaining: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM membros) + (SELECT COUNT(*) FROM sync_log) \
             + (SELECT COUNT(*) FROM historico_mensal)",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 0);
    }
}
