//! Sync orchestration and run summaries

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{SyncOrchestrator, SyncSettings};
pub use summary::{MonthOutcome, MonthSummary, OrgaoOutcome, RunSummary};
