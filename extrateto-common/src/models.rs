//! Domain models shared by the sync pipeline and the read side

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ceiling::CeilingBreakdown;
use crate::{Error, Result};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

// ============================================================================
// Reference month
// ============================================================================

/// Reference month (mês de referência) of a compensation record
///
/// Field order matters: the derived `Ord` sorts chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MesReferencia {
    year: i32,
    month: u32,
}

impl MesReferencia {
    /// Create a reference month, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidInput(format!(
                "Invalid month: {}. Must be between 1 and 12.",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Reference month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Human label used by the presentation layer, e.g. "Jun/2024"
    pub fn label(&self) -> String {
        format!("{}/{}", MONTH_LABELS[(self.month - 1) as usize], self.year)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The month `n` months before this one
    pub fn months_back(&self, n: u32) -> Self {
        (0..n).fold(*self, |mes, _| mes.previous())
    }

    /// Every month from `start` to `end`, inclusive, earliest first
    pub fn range_inclusive(start: Self, end: Self) -> Vec<Self> {
        let mut months = Vec::new();
        let mut current = start;
        while current <= end {
            months.push(current);
            current = current.next();
        }
        months
    }

    /// All twelve months of a year
    pub fn year_months(year: i32) -> Vec<Self> {
        (1..=12).map(|month| Self { year, month }).collect()
    }
}

impl fmt::Display for MesReferencia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MesReferencia {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput(format!("Invalid reference month '{}', expected YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for MesReferencia {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MesReferencia {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Role category
// ============================================================================

/// Role category (cargo), a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cargo {
    #[serde(rename = "Juiz(a)")]
    Juiz,
    #[serde(rename = "Desembargador(a)")]
    Desembargador,
    #[serde(rename = "Ministro(a)")]
    Ministro,
    #[serde(rename = "Promotor(a)")]
    Promotor,
    #[serde(rename = "Procurador(a)")]
    Procurador,
    #[serde(rename = "Defensor(a) Público(a)")]
    DefensorPublico,
}

impl Cargo {
    pub const ALL: [Cargo; 6] = [
        Cargo::Juiz,
        Cargo::Desembargador,
        Cargo::Ministro,
        Cargo::Promotor,
        Cargo::Procurador,
        Cargo::DefensorPublico,
    ];

    /// Display name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Cargo::Juiz => "Juiz(a)",
            Cargo::Desembargador => "Desembargador(a)",
            Cargo::Ministro => "Ministro(a)",
            Cargo::Promotor => "Promotor(a)",
            Cargo::Procurador => "Procurador(a)",
            Cargo::DefensorPublico => "Defensor(a) Público(a)",
        }
    }
}

impl fmt::Display for Cargo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cargo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cargo::ALL
            .into_iter()
            .find(|cargo| cargo.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown cargo: {}", s)))
    }
}

// ============================================================================
// Compensation
// ============================================================================

/// The four gross compensation categories of one member-month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub remuneracao_base: f64,
    pub verbas_indenizatorias: f64,
    pub direitos_eventuais: f64,
    pub direitos_pessoais: f64,
}

impl CategoryTotals {
    pub fn sum(&self) -> f64 {
        self.remuneracao_base + self.verbas_indenizatorias + self.direitos_eventuais + self.direitos_pessoais
    }
}

/// One member's folded line items for one organ-month, before ceiling derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAggregate {
    pub nome: String,
    pub cargo: Cargo,
    /// Canonical organ display code, e.g. "TJ-SP"
    pub orgao: String,
    /// Two-letter state code ("DF" for federal bodies)
    pub estado: String,
    pub totals: CategoryTotals,
}

/// Canonical compensation record: one row per (nome, orgao, mes_referencia)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationRecord {
    /// Row identity, `None` until persisted
    pub id: Option<i64>,
    pub nome: String,
    pub cargo: Cargo,
    pub orgao: String,
    pub estado: String,
    pub remuneracao_base: f64,
    pub verbas_indenizatorias: f64,
    pub direitos_eventuais: f64,
    pub direitos_pessoais: f64,
    pub remuneracao_total: f64,
    pub acima_teto: f64,
    pub percentual_acima_teto: f64,
    pub mes_referencia: MesReferencia,
    pub ano_referencia: i32,
    pub created_at: Option<NaiveDateTime>,
}

impl CompensationRecord {
    /// Build a record from an aggregate, deriving totals against `ceiling`
    pub fn from_aggregate(aggregate: &MemberAggregate, mes: MesReferencia, ceiling: f64) -> Self {
        let derived = CeilingBreakdown::compute(&aggregate.totals, ceiling);
        Self {
            id: None,
            nome: aggregate.nome.clone(),
            cargo: aggregate.cargo,
            orgao: aggregate.orgao.clone(),
            estado: aggregate.estado.clone(),
            remuneracao_base: aggregate.totals.remuneracao_base,
            verbas_indenizatorias: aggregate.totals.verbas_indenizatorias,
            direitos_eventuais: aggregate.totals.direitos_eventuais,
            direitos_pessoais: aggregate.totals.direitos_pessoais,
            remuneracao_total: derived.total,
            acima_teto: derived.acima_teto,
            percentual_acima_teto: derived.percentual_acima_teto,
            mes_referencia: mes,
            ano_referencia: mes.year(),
            created_at: None,
        }
    }

    pub fn totals(&self) -> CategoryTotals {
        CategoryTotals {
            remuneracao_base: self.remuneracao_base,
            verbas_indenizatorias: self.verbas_indenizatorias,
            direitos_eventuais: self.direitos_eventuais,
            direitos_pessoais: self.direitos_pessoais,
        }
    }
}

// ============================================================================
// Sync audit log
// ============================================================================

/// Outcome of one organ-month sync attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Empty,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Empty => "empty",
            SyncStatus::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(SyncStatus::Success),
            "empty" => Ok(SyncStatus::Empty),
            "error" => Ok(SyncStatus::Error),
            other => Err(Error::InvalidInput(format!("Unknown sync status: {}", other))),
        }
    }
}

/// Append-only audit row for one organ-month sync attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: i64,
    pub orgao: String,
    pub mes_referencia: MesReferencia,
    pub total_membros: i64,
    pub status: SyncStatus,
    pub error_message: Option<String>,
    pub synced_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mes_referencia_parse_and_display() {
        let mes: MesReferencia = "2024-06".parse().unwrap();
        assert_eq!(mes.year(), 2024);
        assert_eq!(mes.month(), 6);
        assert_eq!(mes.to_string(), "2024-06");
        assert_eq!(mes.label(), "Jun/2024");
    }

    #[test]
    fn test_mes_referencia_rejects_bad_input() {
        assert!("2024-13".parse::<MesReferencia>().is_err());
        assert!("2024-6".parse::<MesReferencia>().is_err());
        assert!("junho".parse::<MesReferencia>().is_err());
        assert!(MesReferencia::new(2024, 0).is_err());
    }

    #[test]
    fn test_mes_referencia_navigation() {
        let jan = MesReferencia::new(2025, 1).unwrap();
        assert_eq!(jan.previous().to_string(), "2024-12");
        assert_eq!(jan.previous().next(), jan);
        assert_eq!(jan.months_back(3).to_string(), "2024-10");
    }

    #[test]
    fn test_range_is_chronological_and_inclusive() {
        let start = MesReferencia::new(2024, 11).unwrap();
        let end = MesReferencia::new(2025, 2).unwrap();
        let months: Vec<String> = MesReferencia::range_inclusive(start, end)
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_cargo_round_trips_through_display_name() {
        for cargo in Cargo::ALL {
            assert_eq!(cargo.as_str().parse::<Cargo>().unwrap(), cargo);
        }
        assert!("Servidor".parse::<Cargo>().is_err());
    }

    #[test]
    fn test_record_from_aggregate_derives_ceiling_values() {
        let aggregate = MemberAggregate {
            nome: "Maria Souza".to_string(),
            cargo: Cargo::Desembargador,
            orgao: "TJ-SP".to_string(),
            estado: "SP".to_string(),
            totals: CategoryTotals {
                remuneracao_base: 40_000.0,
                verbas_indenizatorias: 10_000.0,
                direitos_eventuais: 0.0,
                direitos_pessoais: 0.0,
            },
        };
        let mes = MesReferencia::new(2025, 6).unwrap();
        let record = CompensationRecord::from_aggregate(&aggregate, mes, 46_000.0);

        assert_eq!(record.remuneracao_total, 50_000.0);
        assert_eq!(record.acima_teto, 4_000.0);
        assert_eq!(record.ano_referencia, 2025);
        assert!(record.id.is_none());
    }
}
