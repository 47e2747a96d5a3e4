//! Read-side queries over committed data

pub mod anomalies;
pub mod members;
pub mod profile;
pub mod read_api;
pub mod rollups;

pub use anomalies::{find_anomalies, Anomalia};
pub use members::{
    available_months, available_years, has_data, latest_month, members_by_year, members_for_month, query_members,
    MemberFilters, MonthOption, Page, SortKey, YearlyMember,
};
pub use profile::{member_profile, HistoricoEntry, MemberProfile};
pub use read_api::ReadApi;
pub use rollups::{stats_by_estado, stats_by_orgao, OrgaoStats, StateStats};
