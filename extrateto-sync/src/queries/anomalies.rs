//! Month-over-month compensation jumps
//!
//! Each member's months (partitioned by name and organ, in chronological
//! order) are compared with the immediately preceding available month. The
//! prior year is included so January can be compared with December.

use serde::Serialize;
use sqlx::{Row, SqlitePool};

use extrateto_common::config::AnomalyConfig;
use extrateto_common::MesReferencia;

use crate::error::{SyncError, SyncResult};

/// One flagged transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomalia {
    pub nome: String,
    pub cargo: String,
    pub orgao: String,
    pub estado: String,
    pub mes_anterior: MesReferencia,
    pub mes_atual: MesReferencia,
    pub total_anterior: f64,
    pub total_atual: f64,
    pub variacao_abs: f64,
    pub variacao_pct: f64,
}

/// Transitions landing in `year` whose total jumped by more than
/// `min_percent` over a prior month of at least `config.floor`
///
/// Largest absolute jump first, at most `config.max_results` rows.
pub async fn find_anomalies(
    pool: &SqlitePool,
    year: i32,
    min_percent: f64,
    config: &AnomalyConfig,
) -> SyncResult<Vec<Anomalia>> {
    if !min_percent.is_finite() || min_percent < 0.0 {
        return Err(SyncError::InvalidInput(format!(
            "Anomaly threshold must be a non-negative percentage, got {}",
            min_percent
        )));
    }
    let multiplier = 1.0 + min_percent / 100.0;

    let rows = sqlx::query(
        r#"
        WITH ordered AS (
            SELECT
                nome, cargo, orgao, estado,
                mes_referencia,
                remuneracao_total,
                LAG(mes_referencia) OVER (PARTITION BY nome, orgao ORDER BY mes_referencia) AS mes_anterior,
                LAG(remuneracao_total) OVER (PARTITION BY nome, orgao ORDER BY mes_referencia) AS total_anterior
            FROM membros
            WHERE ano_referencia IN (?1, ?2)
        )
        SELECT
            nome, cargo, orgao, estado,
            mes_anterior,
            mes_referencia AS mes_atual,
            total_anterior,
            remuneracao_total AS total_atual,
            remuneracao_total - total_anterior AS variacao_abs,
            ((remuneracao_total - total_anterior) / total_anterior) * 100 AS variacao_pct
        FROM ordered
        WHERE mes_anterior IS NOT NULL
          AND total_anterior >= ?3
          AND substr(mes_referencia, 1, 4) = ?4
          AND remuneracao_total > total_anterior * ?5
        ORDER BY variacao_abs DESC
        LIMIT ?6
        "#,
    )
    .bind(year)
    .bind(year - 1)
    .bind(config.floor)
    .bind(format!("{:04}", year))
    .bind(multiplier)
    .bind(config.max_results)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> SyncResult<Anomalia> {
            let mes_anterior: String = row.try_get("mes_anterior")?;
            let mes_atual: String = row.try_get("mes_atual")?;
            Ok(Anomalia {
                nome: row.try_get("nome")?,
                cargo: row.try_get("cargo")?,
                orgao: row.try_get("orgao")?,
                estado: row.try_get("estado")?,
                mes_anterior: mes_anterior.parse()?,
                mes_atual: mes_atual.parse()?,
                total_anterior: row.try_get("total_anterior")?,
                total_atual: row.try_get("total_atual")?,
                variacao_abs: row.try_get("variacao_abs")?,
                variacao_pct: row.try_get("variacao_pct")?,
            })
        })
        .collect()
}
