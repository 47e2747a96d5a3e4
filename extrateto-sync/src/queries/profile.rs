//! Member profile assembly
//!
//! Members are addressed by URL-safe slugs of organ and name, matched against
//! stored values so case, accents and punctuation do not matter.

use serde::Serialize;
use sqlx::SqlitePool;

use extrateto_common::slug::slugify;
use extrateto_common::{Cargo, CompensationRecord, MesReferencia};

use crate::db::membros::{record_from_row, RECORD_COLUMNS};
use crate::error::SyncResult;

/// One month of a member's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricoEntry {
    pub mes: MesReferencia,
    pub label: String,
    pub remuneracao_base: f64,
    pub remuneracao_total: f64,
    pub acima_teto: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProfile {
    pub nome: String,
    pub cargo: Cargo,
    pub orgao: String,
    pub estado: String,
    /// Record of the most recent month present for the member
    pub atual: CompensationRecord,
    /// Oldest month first
    pub historico: Vec<HistoricoEntry>,
    pub total_acima_teto_acumulado: f64,
    pub media_remuneracao: f64,
    pub pico_mes: MesReferencia,
    pub pico_valor: f64,
    /// 1-based rank by total among the organ's members in the current month
    pub ranking_orgao: i64,
    pub total_membros_orgao: i64,
}

fn resolve_slug(candidates: Vec<String>, slug: &str) -> Option<String> {
    let wanted = slugify(slug);
    candidates.into_iter().find(|candidate| slugify(candidate) == wanted)
}

/// Find the stored organ code for an organ slug ("tj-sp" → "TJ-SP")
pub async fn resolve_orgao(pool: &SqlitePool, orgao_slug: &str) -> SyncResult<Option<String>> {
    let orgaos: Vec<String> = sqlx::query_scalar("SELECT DISTINCT orgao FROM membros")
        .fetch_all(pool)
        .await?;
    Ok(resolve_slug(orgaos, orgao_slug))
}

/// Assemble a member's profile, or `None` when no stored member matches
pub async fn member_profile(
    pool: &SqlitePool,
    orgao_slug: &str,
    nome_slug: &str,
) -> SyncResult<Option<MemberProfile>> {
    let Some(orgao) = resolve_orgao(pool, orgao_slug).await? else {
        return Ok(None);
    };

    let nomes: Vec<String> = sqlx::query_scalar("SELECT DISTINCT nome FROM membros WHERE orgao = ?")
        .bind(&orgao)
        .fetch_all(pool)
        .await?;
    let Some(nome) = resolve_slug(nomes, nome_slug) else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {} FROM membros WHERE nome = ? AND orgao = ? ORDER BY mes_referencia ASC, id ASC",
        RECORD_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(&nome).bind(&orgao).fetch_all(pool).await?;
    let records = rows.iter().map(record_from_row).collect::<SyncResult<Vec<_>>>()?;

    let Some(atual) = records.last().cloned() else {
        return Ok(None);
    };

    let mut pico = &records[0];
    for record in &records {
        if record.remuneracao_total > pico.remuneracao_total {
            pico = record;
        }
    }
    let (pico_mes, pico_valor) = (pico.mes_referencia, pico.remuneracao_total);

    let total_acima_teto_acumulado: f64 = records.iter().map(|r| r.acima_teto).sum();
    let media_remuneracao = records.iter().map(|r| r.remuneracao_total).sum::<f64>() / records.len() as f64;

    let mes_atual = atual.mes_referencia.to_string();
    let acima: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM membros WHERE orgao = ? AND mes_referencia = ? AND remuneracao_total > ?",
    )
    .bind(&orgao)
    .bind(&mes_atual)
    .bind(atual.remuneracao_total)
    .fetch_one(pool)
    .await?;
    let total_membros_orgao: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM membros WHERE orgao = ? AND mes_referencia = ?")
            .bind(&orgao)
            .bind(&mes_atual)
            .fetch_one(pool)
            .await?;

    let historico = records
        .iter()
        .map(|r| HistoricoEntry {
            mes: r.mes_referencia,
            label: r.mes_referencia.label(),
            remuneracao_base: r.remuneracao_base,
            remuneracao_total: r.remuneracao_total,
            acima_teto: r.acima_teto,
        })
        .collect();

    Ok(Some(MemberProfile {
        nome,
        cargo: atual.cargo,
        orgao,
        estado: atual.estado.clone(),
        historico,
        total_acima_teto_acumulado,
        media_remuneracao,
        pico_mes,
        pico_valor,
        ranking_orgao: acima + 1,
        total_membros_orgao,
        atual,
    }))
}
