//! Sync orchestrator
//!
//! Walks (organ, month) work items: months strictly one after another, organs
//! of a month in fixed-size concurrent batches with a pause between batches.
//! One organ's failure never aborts its siblings; it becomes an audit row.

use futures::future::join_all;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use extrateto_common::config::TomlConfig;
use extrateto_common::normalize::{map_orgao_id, ORGAOS};
use extrateto_common::{CeilingSchedule, CompensationRecord, MesReferencia, SyncStatus};

use crate::db::{membros, search, sync_log};
use crate::error::SyncResult;
use crate::services::{fetch_orgao, OrgaoSource};
use crate::sync::summary::{MonthOutcome, MonthSummary, OrgaoOutcome, RunSummary};
use crate::utils::retry_on_lock;

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Concurrent organ fetches per batch
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// Upper bound for one organ's fetch and read
    pub fetch_timeout: Duration,
    pub max_lock_wait_ms: u64,
    pub ceilings: CeilingSchedule,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay: Duration::from_millis(500),
            fetch_timeout: Duration::from_secs(60),
            max_lock_wait_ms: 5000,
            ceilings: CeilingSchedule::default(),
        }
    }
}

impl SyncSettings {
    pub fn from_config(config: &TomlConfig) -> SyncResult<Self> {
        Ok(Self {
            batch_size: config.sync.batch_size.max(1),
            batch_delay: Duration::from_millis(config.sync.batch_delay_ms),
            fetch_timeout: Duration::from_secs(config.source.request_timeout_secs),
            max_lock_wait_ms: config.sync.max_lock_wait_ms,
            ceilings: config.ceiling_schedule()?,
        })
    }
}

/// Drives month syncs against an [`OrgaoSource`] and the database
pub struct SyncOrchestrator {
    pool: SqlitePool,
    source: Arc<dyn OrgaoSource>,
    settings: SyncSettings,
    orgaos: Vec<String>,
}

impl SyncOrchestrator {
    /// Orchestrator over the full organ catalogue
    pub fn new(pool: SqlitePool, source: Arc<dyn OrgaoSource>, settings: SyncSettings) -> Self {
        Self {
            pool,
            source,
            settings,
            orgaos: ORGAOS.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Restrict the run to the given organ ids, in the given order
    pub fn with_orgaos<I, S>(mut self, orgaos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orgaos = orgaos.into_iter().map(Into::into).collect();
        self
    }

    pub fn orgaos(&self) -> &[String] {
        &self.orgaos
    }

    /// Sync several months in order, then rebuild the search index once
    pub async fn sync_months(&self, months: &[MesReferencia], force: bool) -> SyncResult<RunSummary> {
        let mut run = RunSummary::default();

        for mes in months {
            run.months.push(self.sync_month(*mes, force).await?);
        }

        search::rebuild_index(&self.pool).await?;
        info!(
            months = run.months.len(),
            membros = run.total_membros(),
            failed = run.failed(),
            "Sync run finished, search index rebuilt"
        );

        Ok(run)
    }

    /// Sync every organ for one month
    ///
    /// Skips a month that already has records unless `force` is set, in
    /// which case the month's records are deleted first.
    pub async fn sync_month(&self, mes: MesReferencia, force: bool) -> SyncResult<MonthOutcome> {
        let existing = membros::count_month(&self.pool, mes).await?;
        if existing > 0 {
            if !force {
                info!(mes = %mes, existing, "Month already synced, skipping");
                return Ok(MonthOutcome::AlreadySynced { mes, existing });
            }
            let deleted = membros::delete_month(&self.pool, mes).await?;
            info!(mes = %mes, deleted, "Forced re-sync, removed existing records");
        }

        let ceiling = self.settings.ceilings.for_year(mes.year());
        info!(mes = %mes, ceiling, orgaos = self.orgaos.len(), "Syncing month");

        let mut summary = MonthSummary::new(mes);
        let batch_size = self.settings.batch_size.max(1);
        let batches: Vec<&[String]> = self.orgaos.chunks(batch_size).collect();

        for (index, batch) in batches.iter().enumerate() {
            let results = join_all(batch.iter().map(|id| self.sync_orgao(id, mes, ceiling))).await;
            for result in results {
                summary.record(result?);
            }

            if index + 1 < batches.len() && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        info!(
            mes = %mes,
            membros = summary.total_membros,
            successful = summary.successful,
            failed = summary.failed,
            empty = summary.empty,
            "Month sync complete"
        );

        Ok(MonthOutcome::Completed(summary))
    }

    /// Fetch, store and audit one organ-month
    ///
    /// Fetch and insert failures are contained in the returned outcome; only
    /// a failure writing the audit row is returned as an error.
    async fn sync_orgao(&self, orgao_id: &str, mes: MesReferencia, ceiling: f64) -> SyncResult<OrgaoOutcome> {
        let orgao = map_orgao_id(orgao_id);

        let (status, written, error_message) =
            match fetch_orgao(self.source.as_ref(), orgao_id, mes, self.settings.fetch_timeout).await {
                Ok(aggregation) if aggregation.membros.is_empty() => {
                    debug!(orgao = %orgao_id, mes = %mes, "No members decoded");
                    (SyncStatus::Empty, 0, None)
                }
                Ok(aggregation) => {
                    let records: Vec<CompensationRecord> = aggregation
                        .membros
                        .iter()
                        .map(|m| CompensationRecord::from_aggregate(m, mes, ceiling))
                        .collect();
                    let pool = &self.pool;
                    let records = &records;
                    match retry_on_lock("insert organ batch", self.settings.max_lock_wait_ms, || {
                        membros::insert_batch(pool, records)
                    })
                    .await
                    {
                        Ok(written) => (SyncStatus::Success, written, None),
                        Err(e) => {
                            error!(orgao = %orgao_id, mes = %mes, error = %e, "Insert failed, batch rolled back");
                            (SyncStatus::Error, 0, Some(e.to_string()))
                        }
                    }
                }
                Err(e) if e.is_empty_month() => {
                    debug!(orgao = %orgao_id, mes = %mes, "No data rows upstream");
                    (SyncStatus::Empty, 0, None)
                }
                Err(e) => {
                    warn!(
                        orgao = %orgao_id,
                        mes = %mes,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Organ fetch failed"
                    );
                    (SyncStatus::Error, 0, Some(e.to_string()))
                }
            };

        let pool = &self.pool;
        let orgao_ref = orgao.as_str();
        let message = error_message.as_deref();
        retry_on_lock("append sync log", self.settings.max_lock_wait_ms, || {
            sync_log::append(pool, orgao_ref, mes, written as i64, status, message)
        })
        .await?;

        if status == SyncStatus::Success {
            info!(orgao = %orgao_id, mes = %mes, membros = written, "Organ synced");
        }

        Ok(OrgaoOutcome {
            orgao_id: orgao_id.to_string(),
            orgao,
            status,
            membros: written,
            error_message,
        })
    }
}
