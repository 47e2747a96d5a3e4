//! Per-organ fetch and aggregate
//!
//! Retrieves one organ's month through an [`OrgaoSource`], checks the payload,
//! decodes it and folds it into one aggregate per member.

use std::time::Duration;

use extrateto_common::csv;
use extrateto_common::MesReferencia;

use super::aggregator::{aggregate, Aggregation};
use super::contracheque::linhas;
use super::dadosjusbr_client::OrgaoSource;
use crate::error::FetchError;

/// Bodies shorter than this are treated as missing data, not as a CSV
pub const MIN_PAYLOAD_BYTES: usize = 50;

/// Fetch, decode and aggregate one organ-month, bounded by `timeout`
pub async fn fetch_orgao(
    source: &dyn OrgaoSource,
    orgao_id: &str,
    mes: MesReferencia,
    timeout: Duration,
) -> Result<Aggregation, FetchError> {
    let body = tokio::time::timeout(timeout, source.fetch_csv(orgao_id, mes))
        .await
        .map_err(|_| FetchError::Timeout {
            orgao: orgao_id.to_string(),
            secs: timeout.as_secs(),
        })??;

    decode_payload(orgao_id, &body)
}

/// Validate and aggregate a raw CSV payload
pub fn decode_payload(orgao_id: &str, body: &str) -> Result<Aggregation, FetchError> {
    if body.len() < MIN_PAYLOAD_BYTES {
        return Err(FetchError::PayloadTooShort {
            orgao: orgao_id.to_string(),
            len: body.len(),
        });
    }

    let table = csv::decode(body);
    if table.is_empty() {
        return Err(FetchError::NoRows {
            orgao: orgao_id.to_string(),
        });
    }

    let (linhas, sem_nome) = linhas(&table);
    if sem_nome > 0 {
        tracing::debug!(orgao = %orgao_id, rows = sem_nome, "Skipped rows without member name");
    }

    let aggregation = aggregate(orgao_id, &linhas);
    let d = &aggregation.diagnostics;
    if d.has_fallbacks() {
        tracing::warn!(
            orgao = %orgao_id,
            valores_invalidos = d.valores_invalidos,
            valores_truncados = d.valores_truncados,
            valores_negativos = d.valores_negativos,
            rubricas_desconhecidas = d.rubricas_desconhecidas,
            categorias_desconhecidas = d.categorias_desconhecidas,
            estados_padrao = d.estados_padrao,
            "Best-effort fallbacks applied while aggregating"
        );
    }

    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const HEADER: &str = "nome,cargo,lotacao,categoria_contracheque,desambiguacao_macro,valor";

    #[test]
    fn test_short_payload_rejected() {
        let err = decode_payload("tjac", "nome,valor\n").unwrap_err();
        assert!(matches!(err, FetchError::PayloadTooShort { len: 11, .. }));
    }

    #[test]
    fn test_header_only_payload_has_no_rows() {
        let body = format!("{}\n\n", HEADER);
        let err = decode_payload("tjac", &body).unwrap_err();
        assert!(err.is_empty_month());
    }

    #[test]
    fn test_payload_aggregates_members() {
        let body = format!(
            "{}\nAna,Juiz,,base,,\"30.000,00\"\nAna,Juiz,,outras,alimentacao,\"5.000,00\"\nBeto,Juiz,,base,,2000000\n",
            HEADER
        );
        let result = decode_payload("tjsp", &body).unwrap();
        assert_eq!(result.membros.len(), 2);
        assert_eq!(result.membros[1].totals.remuneracao_base, 20_000.0);
    }

    struct Stalled;

    #[async_trait]
    impl OrgaoSource for Stalled {
        async fn fetch_csv(&self, _orgao_id: &str, _mes: MesReferencia) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_stalled_fetch_times_out() {
        let mes = MesReferencia::new(2025, 6).unwrap();
        let err = fetch_orgao(&Stalled, "tjac", mes, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }
}
