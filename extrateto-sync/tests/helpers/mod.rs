//! Shared test helpers
//!
//! Temporary databases, an in-process [`OrgaoSource`] serving fixture CSV
//! bodies, and record builders for seeding read-side tests.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use extrateto_common::models::{CategoryTotals, MemberAggregate};
use extrateto_common::{Cargo, CeilingSchedule, CompensationRecord, MesReferencia};
use extrateto_sync::db::{self, membros};
use extrateto_sync::{FetchError, OrgaoSource};

pub const CSV_HEADER: &str = "nome,cargo,lotacao,categoria_contracheque,desambiguacao_macro,valor";

/// Create a temporary on-disk database with the full schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("data").join("extrateto.db");
    let pool = db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

pub fn mes(year: i32, month: u32) -> MesReferencia {
    MesReferencia::new(year, month).expect("valid month")
}

/// CSV body from (nome, categoria, macro, valor) line items
pub fn csv_body(linhas: &[(&str, &str, &str, &str)]) -> String {
    let mut body = String::from(CSV_HEADER);
    for (nome, categoria, macro_tag, valor) in linhas {
        body.push('\n');
        body.push_str(&format!(
            "{},Juiz de Direito,,{},{},\"{}\"",
            nome, categoria, macro_tag, valor
        ));
    }
    body.push('\n');
    body
}

#[derive(Clone)]
pub enum Fixture {
    Csv(String),
    HttpStatus(u16),
}

/// Serves fixed responses per organ id; unknown organs get a header-only body
#[derive(Default)]
pub struct FixtureSource {
    responses: Mutex<HashMap<String, Fixture>>,
    calls: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_csv(self, orgao_id: &str, body: String) -> Self {
        self.set(orgao_id, Fixture::Csv(body));
        self
    }

    pub fn with_status(self, orgao_id: &str, status: u16) -> Self {
        self.set(orgao_id, Fixture::HttpStatus(status));
        self
    }

    pub fn set(&self, orgao_id: &str, fixture: Fixture) {
        self.responses.lock().unwrap().insert(orgao_id.to_string(), fixture);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrgaoSource for FixtureSource {
    async fn fetch_csv(&self, orgao_id: &str, _mes: MesReferencia) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fixture = self.responses.lock().unwrap().get(orgao_id).cloned();
        match fixture {
            Some(Fixture::Csv(body)) => Ok(body),
            Some(Fixture::HttpStatus(status)) => Err(FetchError::HttpStatus {
                orgao: orgao_id.to_string(),
                status,
            }),
            None => Ok(format!("{}\n", CSV_HEADER)),
        }
    }
}

/// Stored record with only a base salary, priced against the default schedule
pub fn record(nome: &str, orgao: &str, estado: &str, mes: MesReferencia, base: f64) -> CompensationRecord {
    record_with(nome, orgao, estado, mes, CategoryTotals {
        remuneracao_base: base,
        ..CategoryTotals::default()
    })
}

pub fn record_with(
    nome: &str,
    orgao: &str,
    estado: &str,
    mes: MesReferencia,
    totals: CategoryTotals,
) -> CompensationRecord {
    let aggregate = MemberAggregate {
        nome: nome.to_string(),
        cargo: Cargo::Juiz,
        orgao: orgao.to_string(),
        estado: estado.to_string(),
        totals,
    };
    let ceiling = CeilingSchedule::default().for_year(mes.year());
    CompensationRecord::from_aggregate(&aggregate, mes, ceiling)
}

pub async fn insert(pool: &SqlitePool, records: &[CompensationRecord]) -> Result<()> {
    membros::insert_batch(pool, records).await?;
    Ok(())
}
