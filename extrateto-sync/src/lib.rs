//! # extrateto-sync
//!
//! Ingestion and read side of the ExtraTeto payroll pipeline:
//! - `services`: DadosJusBr download, line-item decoding and per-member aggregation
//! - `db`: SQLite schema, batch persistence, audit log and full-text search
//! - `sync`: the month/organ orchestrator and its run summaries
//! - `queries`: read queries and the cached read facade
//! - `seed`: deterministic placeholder data
//! - `cli`: argument parsing and run planning

pub mod cli;
pub mod db;
pub mod error;
pub mod queries;
pub mod seed;
pub mod services;
pub mod sync;
pub mod utils;

pub use cli::{Args, SyncPlan};
pub use error::{FetchError, SyncError, SyncResult};
pub use queries::ReadApi;
pub use services::{DadosJusBrClient, OrgaoSource};
pub use sync::{MonthOutcome, RunSummary, SyncOrchestrator, SyncSettings};
