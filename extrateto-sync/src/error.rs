//! Error types for extrateto-sync
//!
//! Per-organ fetch failures are contained by the orchestrator and turned into
//! audit rows; `SyncError` is what remains fatal to a whole run.

use thiserror::Error;

/// Failure fetching or decoding one organ's month
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-2xx status
    #[error("HTTP {status} for {orgao}")]
    HttpStatus { orgao: String, status: u16 },

    /// Connection, TLS or body read failure
    #[error("Network error for {orgao}: {message}")]
    Network { orgao: String, message: String },

    /// No response within the per-fetch bound
    #[error("Timed out after {secs}s fetching {orgao}")]
    Timeout { orgao: String, secs: u64 },

    /// Body present but below the plausibility threshold
    #[error("Empty response for {orgao} ({len} bytes)")]
    PayloadTooShort { orgao: String, len: usize },

    /// Payload decoded to zero data rows
    #[error("No data rows for {orgao}")]
    NoRows { orgao: String },
}

impl FetchError {
    /// True when the organ genuinely has no data for the month
    pub fn is_empty_month(&self) -> bool {
        matches!(self, FetchError::NoRows { .. })
    }

    /// Whether a later re-sync attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !self.is_empty_month()
    }

    pub fn orgao(&self) -> &str {
        match self {
            FetchError::HttpStatus { orgao, .. }
            | FetchError::Network { orgao, .. }
            | FetchError::Timeout { orgao, .. }
            | FetchError::PayloadTooShort { orgao, .. }
            | FetchError::NoRows { orgao } => orgao,
        }
    }
}

/// Errors that abort a sync run or a read query
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Common(#[from] extrateto_common::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for sync and query operations
pub type SyncResult<T> = Result<T, SyncError>;
