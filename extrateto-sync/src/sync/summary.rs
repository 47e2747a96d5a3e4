//! Sync run summaries

use serde::Serialize;
use std::fmt;

use extrateto_common::{MesReferencia, SyncStatus};

/// Outcome of one organ within a month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgaoOutcome {
    pub orgao_id: String,
    /// Display code written to the audit log, e.g. "TJ-SP"
    pub orgao: String,
    pub status: SyncStatus,
    pub membros: u64,
    pub error_message: Option<String>,
}

/// Totals for one synced month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub mes: MesReferencia,
    pub total_membros: u64,
    /// Organs with at least one member written
    pub successful: usize,
    pub failed: usize,
    pub empty: usize,
    pub total_orgaos: usize,
    pub outcomes: Vec<OrgaoOutcome>,
}

impl MonthSummary {
    pub fn new(mes: MesReferencia) -> Self {
        Self {
            mes,
            total_membros: 0,
            successful: 0,
            failed: 0,
            empty: 0,
            total_orgaos: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: OrgaoOutcome) {
        self.total_orgaos += 1;
        match outcome.status {
            SyncStatus::Success => {
                self.successful += 1;
                self.total_membros += outcome.membros;
            }
            SyncStatus::Empty => self.empty += 1,
            SyncStatus::Error => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn failures(&self) -> impl Iterator<Item = &OrgaoOutcome> {
        self.outcomes.iter().filter(|o| o.status == SyncStatus::Error)
    }
}

impl fmt::Display for MonthSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resumo {} ({})", self.mes, self.mes.label())?;
        writeln!(f, "  Membros: {}", self.total_membros)?;
        writeln!(f, "  Órgãos com dados: {}/{}", self.successful, self.total_orgaos)?;
        writeln!(f, "  Órgãos sem dados: {}", self.empty)?;
        write!(f, "  Órgãos com erro: {}", self.failed)?;
        for failure in self.failures() {
            write!(
                f,
                "\n    {}: {}",
                failure.orgao,
                failure.error_message.as_deref().unwrap_or("erro desconhecido")
            )?;
        }
        Ok(())
    }
}

/// What happened to one requested month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MonthOutcome {
    /// Records already present and the run was not forced
    AlreadySynced { mes: MesReferencia, existing: i64 },
    Completed(MonthSummary),
}

impl MonthOutcome {
    pub fn mes(&self) -> MesReferencia {
        match self {
            MonthOutcome::AlreadySynced { mes, .. } => *mes,
            MonthOutcome::Completed(summary) => summary.mes,
        }
    }
}

impl fmt::Display for MonthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthOutcome::AlreadySynced { mes, existing } => write!(
                f,
                "{} já sincronizado ({} registros), use --force para sobrescrever",
                mes, existing
            ),
            MonthOutcome::Completed(summary) => fmt::Display::fmt(summary, f),
        }
    }
}

/// Totals across every month of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub months: Vec<MonthOutcome>,
}

impl RunSummary {
    pub fn total_membros(&self) -> u64 {
        self.completed().map(|s| s.total_membros).sum()
    }

    pub fn failed(&self) -> usize {
        self.completed().map(|s| s.failed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.months
            .iter()
            .filter(|m| matches!(m, MonthOutcome::AlreadySynced { .. }))
            .count()
    }

    pub fn completed(&self) -> impl Iterator<Item = &MonthSummary> {
        self.months.iter().filter_map(|m| match m {
            MonthOutcome::Completed(summary) => Some(summary),
            MonthOutcome::AlreadySynced { .. } => None,
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} meses, {} membros, {} meses pulados, {} falhas de órgão",
            self.months.len(),
            self.total_membros(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(orgao: &str, status: SyncStatus, membros: u64) -> OrgaoOutcome {
        OrgaoOutcome {
            orgao_id: orgao.to_lowercase().replace('-', ""),
            orgao: orgao.to_string(),
            status,
            membros,
            error_message: (status == SyncStatus::Error).then(|| "HTTP 500".to_string()),
        }
    }

    #[test]
    fn test_month_tally() {
        let mes = MesReferencia::new(2025, 6).unwrap();
        let mut summary = MonthSummary::new(mes);
        summary.record(outcome("TJ-AC", SyncStatus::Success, 40));
        summary.record(outcome("TJ-AL", SyncStatus::Error, 0));
        summary.record(outcome("TJ-AM", SyncStatus::Empty, 0));

        assert_eq!(summary.total_membros, 40);
        assert_eq!((summary.successful, summary.failed, summary.empty), (1, 1, 1));
        assert_eq!(summary.total_orgaos, 3);

        let text = summary.to_string();
        assert!(text.contains("Órgãos com dados: 1/3"));
        assert!(text.contains("TJ-AL: HTTP 500"));
    }

    #[test]
    fn test_run_totals_skip_already_synced() {
        let junho = MesReferencia::new(2025, 6).unwrap();
        let mut summary = MonthSummary::new(junho.next());
        summary.record(outcome("TJ-AC", SyncStatus::Success, 10));

        let run = RunSummary {
            months: vec![
                MonthOutcome::AlreadySynced { mes: junho, existing: 99 },
                MonthOutcome::Completed(summary),
            ],
        };
        assert_eq!(run.total_membros(), 10);
        assert_eq!(run.skipped(), 1);
        assert_eq!(run.failed(), 0);
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let mes = MesReferencia::new(2025, 6).unwrap();
        let skipped = MonthOutcome::AlreadySynced { mes, existing: 12 };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["result"], "already_synced");
        assert_eq!(json["mes"], "2025-06");

        let completed = serde_json::to_value(MonthOutcome::Completed(MonthSummary::new(mes))).unwrap();
        assert_eq!(completed["result"], "completed");
        assert_eq!(completed["total_orgaos"], 0);
    }
}
