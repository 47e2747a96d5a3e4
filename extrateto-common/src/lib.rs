//! # ExtraTeto Common Library
//!
//! Shared code for the ExtraTeto payroll pipeline including:
//! - Domain models (compensation records, reference months, roles)
//! - Field normalizers (currency, role, organ, state, pay-component category)
//! - Delimited-text decoding
//! - Ceiling calculation
//! - Configuration loading
//! - Slug normalization and the TTL read cache

pub mod cache;
pub mod ceiling;
pub mod config;
pub mod csv;
pub mod error;
pub mod models;
pub mod normalize;
pub mod slug;

pub use ceiling::{CeilingBreakdown, CeilingSchedule};
pub use error::{Error, Result};
pub use models::{Cargo, CompensationRecord, MemberAggregate, MesReferencia, SyncStatus};
