//! Per-member aggregation of payroll line items
//!
//! Folds every line item of one organ-month into one [`MemberAggregate`] per
//! exact member name. Names are not fuzzy-matched: homonyms collapse into one
//! record and spelling variants stay separate, as upstream publishes no
//! stable member identifier.

use std::collections::HashMap;

use extrateto_common::models::{CategoryTotals, MemberAggregate};
use extrateto_common::normalize::categoria::{match_outras, Bucket, Categoria, FALLBACK_BUCKET};
use extrateto_common::normalize::{classify_cargo, map_orgao_id, resolve_estado};

use super::contracheque::LinhaContracheque;

/// Counters for every best-effort fallback taken while aggregating
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationDiagnostics {
    /// Line items read
    pub linhas: usize,
    /// Values that could not be parsed and counted as zero
    pub valores_invalidos: usize,
    /// Values read only up to a numeric prefix
    pub valores_truncados: usize,
    /// Negative line items dropped
    pub valores_negativos: usize,
    /// `outras` tags placed in the fallback bucket
    pub rubricas_desconhecidas: usize,
    /// Discount line items skipped
    pub descontos_ignorados: usize,
    /// Line items with an unknown discriminator, skipped
    pub categorias_desconhecidas: usize,
    /// Members whose state defaulted to "DF"
    pub estados_padrao: usize,
}

impl AggregationDiagnostics {
    pub fn has_fallbacks(&self) -> bool {
        self.valores_invalidos > 0
            || self.valores_truncados > 0
            || self.valores_negativos > 0
            || self.rubricas_desconhecidas > 0
            || self.categorias_desconhecidas > 0
            || self.estados_padrao > 0
    }
}

/// Aggregated members in first-seen order, plus diagnostics
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub membros: Vec<MemberAggregate>,
    pub diagnostics: AggregationDiagnostics,
}

/// Aggregate an organ's line items into one record per member name
///
/// Role and state are resolved from the member's first line item; later
/// rows only add to the running totals.
pub fn aggregate(orgao_id: &str, linhas: &[LinhaContracheque]) -> Aggregation {
    let orgao = map_orgao_id(orgao_id);
    let mut membros: Vec<MemberAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut diagnostics = AggregationDiagnostics::default();

    for linha in linhas {
        diagnostics.linhas += 1;

        let position = match index.get(&linha.nome) {
            Some(position) => *position,
            None => {
                let estado = resolve_estado(orgao_id, &linha.lotacao);
                if estado.fallback {
                    diagnostics.estados_padrao += 1;
                }
                membros.push(MemberAggregate {
                    nome: linha.nome.clone(),
                    cargo: classify_cargo(&linha.cargo, orgao_id),
                    orgao: orgao.clone(),
                    estado: estado.estado,
                    totals: CategoryTotals::default(),
                });
                index.insert(linha.nome.clone(), membros.len() - 1);
                membros.len() - 1
            }
        };

        if linha.valor.is_unparseable() {
            diagnostics.valores_invalidos += 1;
        } else if linha.valor.is_truncated() {
            diagnostics.valores_truncados += 1;
        }
        let valor = linha.valor.value();
        if valor < 0.0 {
            diagnostics.valores_negativos += 1;
            continue;
        }

        let totals = &mut membros[position].totals;
        match &linha.categoria {
            Categoria::Base => totals.remuneracao_base += valor,
            Categoria::Outras => {
                let bucket = match_outras(&linha.macro_tag).unwrap_or_else(|| {
                    diagnostics.rubricas_desconhecidas += 1;
                    FALLBACK_BUCKET
                });
                match bucket {
                    Bucket::Indenizatorias => totals.verbas_indenizatorias += valor,
                    Bucket::Eventuais => totals.direitos_eventuais += valor,
                    Bucket::Pessoais => totals.direitos_pessoais += valor,
                }
            }
            Categoria::Descontos => diagnostics.descontos_ignorados += 1,
            Categoria::Other(_) => diagnostics.categorias_desconhecidas += 1,
        }
    }

    Aggregation { membros, diagnostics }
}
