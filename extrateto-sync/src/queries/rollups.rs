//! State and organ rollups over a set of member records

use serde::Serialize;
use std::collections::BTreeMap;

use extrateto_common::normalize::orgao::is_federal_code;
use extrateto_common::CompensationRecord;

/// Shown instead of a state for the federal prosecutorial branches
pub const FEDERAL_LABEL: &str = "Federal";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateStats {
    pub estado: String,
    pub total_membros: usize,
    pub membros_acima_teto: usize,
    pub total_acima_teto: f64,
    pub media_remuneracao: f64,
    pub maior_remuneracao: f64,
    /// Share of members above the ceiling, in percent
    pub percentual_acima_teto: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgaoStats {
    pub orgao: String,
    /// Member state, or "Federal" for federal branches
    pub estado: String,
    pub total_membros: usize,
    pub membros_acima_teto: usize,
    pub total_acima_teto: f64,
    pub media_remuneracao: f64,
    /// Mean excess among members above the ceiling
    pub media_acima_teto: f64,
    pub maior_remuneracao: f64,
    pub percentual_acima_teto: f64,
    /// Highest total first
    pub membros: Vec<CompensationRecord>,
}

#[derive(Debug, Default)]
struct Tally {
    membros: usize,
    acima: usize,
    total_acima: f64,
    soma: f64,
    maior: f64,
}

impl Tally {
    fn add(&mut self, record: &CompensationRecord) {
        self.membros += 1;
        self.soma += record.remuneracao_total;
        self.maior = self.maior.max(record.remuneracao_total);
        if record.acima_teto > 0.0 {
            self.acima += 1;
            self.total_acima += record.acima_teto;
        }
    }

    fn media(&self) -> f64 {
        if self.membros == 0 {
            0.0
        } else {
            self.soma / self.membros as f64
        }
    }

    fn percentual(&self) -> f64 {
        if self.membros == 0 {
            0.0
        } else {
            self.acima as f64 / self.membros as f64 * 100.0
        }
    }
}

/// Rollup per state, ordered by state code
pub fn stats_by_estado(records: &[CompensationRecord]) -> Vec<StateStats> {
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        tallies.entry(record.estado.as_str()).or_default().add(record);
    }

    tallies
        .into_iter()
        .map(|(estado, t)| StateStats {
            estado: estado.to_string(),
            total_membros: t.membros,
            membros_acima_teto: t.acima,
            total_acima_teto: t.total_acima,
            media_remuneracao: t.media(),
            maior_remuneracao: t.maior,
            percentual_acima_teto: t.percentual(),
        })
        .collect()
}

/// Rollup per organ, ordered by organ code
pub fn stats_by_orgao(records: &[CompensationRecord]) -> Vec<OrgaoStats> {
    let mut groups: BTreeMap<&str, (Tally, Vec<&CompensationRecord>)> = BTreeMap::new();
    for record in records {
        let (tally, membros) = groups.entry(record.orgao.as_str()).or_default();
        tally.add(record);
        membros.push(record);
    }

    groups
        .into_iter()
        .map(|(orgao, (t, membros))| {
            let estado = if is_federal_code(orgao) {
                FEDERAL_LABEL.to_string()
            } else {
                membros.first().map(|m| m.estado.clone()).unwrap_or_default()
            };
            let mut membros: Vec<CompensationRecord> = membros.into_iter().cloned().collect();
            membros.sort_by(|a, b| b.remuneracao_total.total_cmp(&a.remuneracao_total));

            OrgaoStats {
                orgao: orgao.to_string(),
                estado,
                total_membros: t.membros,
                membros_acima_teto: t.acima,
                total_acima_teto: t.total_acima,
                media_remuneracao: t.media(),
                media_acima_teto: if t.acima > 0 { t.total_acima / t.acima as f64 } else { 0.0 },
                maior_remuneracao: t.maior,
                percentual_acima_teto: t.percentual(),
                membros,
            }
        })
        .collect()
}
