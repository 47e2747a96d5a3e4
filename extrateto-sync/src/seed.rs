//! Deterministic placeholder data for non-production use
//!
//! Generates a fixed set of members for 2025-06 from a seeded Park–Miller
//! generator, so every run produces the same dataset.

use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;

use extrateto_common::models::{CategoryTotals, MemberAggregate};
use extrateto_common::normalize::orgao::estado_from_id;
use extrateto_common::normalize::{is_federal, map_orgao_id, ORGAOS};
use extrateto_common::{Cargo, CeilingSchedule, CompensationRecord, MesReferencia};

use crate::db::{membros, search};
use crate::error::SyncResult;

pub const SEED_MEMBERS: usize = 200;
pub const SEED_YEAR: i32 = 2025;
pub const SEED_MONTH: u32 = 6;

const FIRST_NAMES: &[&str] = &[
    "José", "Maria", "João", "Ana", "Carlos", "Fernanda", "Paulo", "Juliana", "Marcos", "Luciana",
    "Roberto", "Patrícia", "Fernando", "Adriana", "Ricardo", "Cláudia", "Antônio", "Márcia", "Luiz",
    "Cristina", "Pedro", "Sandra", "Francisco", "Rosana", "Rafael", "Renata", "Marcelo", "Simone",
    "Eduardo", "Andréa", "Sérgio", "Vanessa", "Alexandre", "Tatiana", "Daniel", "Fabiana",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Santos", "Oliveira", "Souza", "Lima", "Pereira", "Ferreira", "Costa", "Rodrigues",
    "Almeida", "Nascimento", "Araújo", "Carvalho", "Ribeiro", "Gomes", "Martins", "Barbosa", "Rocha",
    "Correia", "Dias", "Moreira", "Nunes", "Vieira", "Monteiro", "Cardoso", "Campos", "Teixeira",
];

/// Park–Miller minimal standard generator
struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Uniform in [0, 1)
    fn next(&mut self) -> f64 {
        self.state = (self.state * 16_807) % 2_147_483_647;
        (self.state - 1) as f64 / 2_147_483_646.0
    }

    fn between(&mut self, min: f64, max: f64) -> f64 {
        (min + self.next() * (max - min)).round()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let index = ((self.next() * items.len() as f64) as usize).min(items.len() - 1);
        items[index]
    }
}

fn cargo_for(orgao_id: &str, rng: &mut SeededRandom) -> Cargo {
    if orgao_id.starts_with("mp") {
        if rng.next() > 0.5 {
            Cargo::Promotor
        } else {
            Cargo::Procurador
        }
    } else if rng.next() > 0.4 {
        Cargo::Desembargador
    } else {
        Cargo::Juiz
    }
}

fn totals_for(rng: &mut SeededRandom) -> CategoryTotals {
    let tier = rng.next();
    let (base, indenizatorias, eventuais, pessoais) = if tier < 0.05 {
        ((33_000.0, 39_293.0), (60_000.0, 140_000.0), (20_000.0, 60_000.0), (15_000.0, 35_000.0))
    } else if tier < 0.20 {
        ((33_000.0, 39_293.0), (35_000.0, 70_000.0), (10_000.0, 30_000.0), (8_000.0, 22_000.0))
    } else if tier < 0.55 {
        ((30_000.0, 39_293.0), (15_000.0, 40_000.0), (3_000.0, 15_000.0), (5_000.0, 15_000.0))
    } else if tier < 0.80 {
        ((30_000.0, 39_293.0), (5_000.0, 15_000.0), (1_000.0, 5_000.0), (2_000.0, 8_000.0))
    } else {
        ((25_000.0, 35_000.0), (0.0, 8_000.0), (0.0, 3_000.0), (0.0, 5_000.0))
    };

    CategoryTotals {
        remuneracao_base: rng.between(base.0, base.1),
        verbas_indenizatorias: rng.between(indenizatorias.0, indenizatorias.1),
        direitos_eventuais: rng.between(eventuais.0, eventuais.1),
        direitos_pessoais: rng.between(pessoais.0, pessoais.1),
    }
}

/// The placeholder dataset, highest total first
pub fn generate(mes: MesReferencia, ceilings: &CeilingSchedule) -> Vec<CompensationRecord> {
    let ceiling = ceilings.for_year(mes.year());
    let mut rng = SeededRandom::new(42);
    let mut used = HashSet::new();
    let mut records = Vec::with_capacity(SEED_MEMBERS);

    while records.len() < SEED_MEMBERS {
        let first = rng.pick(FIRST_NAMES);
        let middle = rng.pick(LAST_NAMES);
        let last = rng.pick(LAST_NAMES);
        let nome = if middle == last {
            format!("{} {} de {}", first, middle, rng.pick(LAST_NAMES))
        } else {
            format!("{} {} {}", first, middle, last)
        };
        if !used.insert(nome.clone()) {
            continue;
        }

        let orgao_id = rng.pick(ORGAOS);
        let estado = if is_federal(orgao_id) {
            "DF".to_string()
        } else {
            estado_from_id(orgao_id)
        };
        let aggregate = MemberAggregate {
            nome,
            cargo: cargo_for(orgao_id, &mut rng),
            orgao: map_orgao_id(orgao_id),
            estado,
            totals: totals_for(&mut rng),
        };
        records.push(CompensationRecord::from_aggregate(&aggregate, mes, ceiling));
    }

    records.sort_by(|a, b| b.remuneracao_total.total_cmp(&a.remuneracao_total));
    records
}

/// Replace the placeholder month with the generated dataset and rebuild the index
pub async fn seed_database(pool: &SqlitePool, ceilings: &CeilingSchedule) -> SyncResult<u64> {
    let mes = MesReferencia::new(SEED_YEAR, SEED_MONTH)?;
    let records = generate(mes, ceilings);

    let written = membros::replace_month(pool, mes, &records).await?;
    search::rebuild_index(pool).await?;

    info!(membros = written, mes = %mes, "Seeded placeholder data");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let schedule = CeilingSchedule::default();
        let mes = MesReferencia::new(SEED_YEAR, SEED_MONTH).unwrap();
        let first = generate(mes, &schedule);
        let second = generate(mes, &schedule);

        assert_eq!(first.len(), SEED_MEMBERS);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_records_are_consistent() {
        let schedule = CeilingSchedule::default();
        let mes = MesReferencia::new(SEED_YEAR, SEED_MONTH).unwrap();
        for record in generate(mes, &schedule) {
            assert_eq!(record.mes_referencia.to_string(), "2025-06");
            assert!((record.totals().sum() - record.remuneracao_total).abs() < 1e-6);
            assert!(record.acima_teto >= 0.0);
            assert_eq!(record.acima_teto > 0.0, record.remuneracao_total > 46_366.19);
        }
    }
}
