//! Command-line arguments and run planning
//!
//! Arguments are turned into a [`SyncPlan`] and validated before any network
//! or database activity.

use chrono::NaiveDate;
use clap::Parser;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use extrateto_common::MesReferencia;

use crate::error::{SyncError, SyncResult};

/// Years accepted on the command line
pub const VALID_YEARS: RangeInclusive<i32> = 2018..=2030;

/// Recent months often lack upstream data, so the default looks this far back
pub const DEFAULT_MONTHS_BACK: u32 = 3;

/// Command-line arguments for extrateto-sync
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "extrateto-sync")]
#[command(about = "Sync Brazilian judiciary payroll data from DadosJusBr into SQLite")]
#[command(version)]
pub struct Args {
    /// Year to sync (all 12 months unless --month is given)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month to sync (1-12), within --year or the default year
    #[arg(long)]
    pub month: Option<u32>,

    /// Sync every month from the start year (or --year) to the current month
    #[arg(long)]
    pub all: bool,

    /// Overwrite months that already have data
    #[arg(long)]
    pub force: bool,

    /// Wipe all data, history and the sync log
    #[arg(long, conflicts_with = "seed")]
    pub fresh: bool,

    /// Load deterministic placeholder data (non-production)
    #[arg(long)]
    pub seed: bool,

    /// Root folder holding the database
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// What a run will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    Fresh,
    Seed,
    Months { months: Vec<MesReferencia>, force: bool },
}

fn validate_year(year: i32) -> SyncResult<i32> {
    if VALID_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(SyncError::InvalidInput(format!(
            "Invalid year: {}. Must be between {} and {}.",
            year,
            VALID_YEARS.start(),
            VALID_YEARS.end()
        )))
    }
}

impl Args {
    /// Resolve the arguments into a plan relative to `today`
    ///
    /// `start_year` is where `--all` begins when no `--year` is given.
    pub fn plan(&self, today: NaiveDate, start_year: i32) -> SyncResult<SyncPlan> {
        if self.fresh {
            return Ok(SyncPlan::Fresh);
        }
        if self.seed {
            return Ok(SyncPlan::Seed);
        }

        let current = MesReferencia::from_date(today);
        let default = current.months_back(DEFAULT_MONTHS_BACK);
        let year = validate_year(self.year.unwrap_or(default.year()))?;

        let months = if let Some(month) = self.month {
            vec![MesReferencia::new(year, month)?]
        } else if self.all {
            let start_year = if self.year.is_some() { year } else { validate_year(start_year)? };
            let start = MesReferencia::new(start_year, 1)?;
            let months = MesReferencia::range_inclusive(start, current);
            if months.is_empty() {
                return Err(SyncError::InvalidInput(format!(
                    "Start year {} is after the current month {}",
                    start_year, current
                )));
            }
            months
        } else if self.year.is_some() {
            MesReferencia::year_months(year)
        } else {
            vec![default]
        };

        Ok(SyncPlan::Months {
            months,
            force: self.force,
        })
    }
}
