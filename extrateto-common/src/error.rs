//! Error type shared by the ExtraTeto crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure (config file, database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed value: month, role, status or ceiling table
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
