//! Service modules for the ingestion side
//!
//! - `dadosjusbr_client`: upstream CSV download
//! - `contracheque`: typed payroll line items from a decoded table
//! - `aggregator`: per-member fold of line items
//! - `fetcher`: fetch + decode + aggregate for one organ-month

pub mod aggregator;
pub mod contracheque;
pub mod dadosjusbr_client;
pub mod fetcher;

pub use aggregator::{aggregate, Aggregation, AggregationDiagnostics};
pub use contracheque::LinhaContracheque;
pub use dadosjusbr_client::{DadosJusBrClient, OrgaoSource};
pub use fetcher::{decode_payload, fetch_orgao};
