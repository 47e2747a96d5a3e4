//! Cached read facade for the presentation layer
//!
//! Repeated calls with the same query signature inside the TTL window are
//! served from a [`TtlCache`] instead of the database.

use sqlx::SqlitePool;
use std::sync::Arc;

use extrateto_common::cache::{Clock, SystemClock, TtlCache};
use extrateto_common::config::{AnomalyConfig, CacheConfig};
use extrateto_common::{CompensationRecord, MesReferencia};

use super::anomalies::{find_anomalies, Anomalia};
use super::members::{self, MemberFilters, MonthOption, Page, YearlyMember};
use super::profile::{member_profile, MemberProfile};
use super::rollups::{stats_by_estado, stats_by_orgao, OrgaoStats, StateStats};
use crate::db::search::{search_members, SearchHit};
use crate::error::SyncResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    Members(Option<MesReferencia>),
    Months,
    Years,
    ByYear(i32),
    /// Threshold stored as raw bits so the key stays hashable
    Anomalies { year: i32, min_percent_bits: u64 },
    Profile { orgao: String, nome: String },
}

#[derive(Debug, Clone)]
enum Cached {
    Members(Arc<Vec<CompensationRecord>>),
    Months(Arc<Vec<MonthOption>>),
    Years(Arc<Vec<i32>>),
    ByYear(Arc<Vec<YearlyMember>>),
    Anomalies(Arc<Vec<Anomalia>>),
    Profile(Option<Arc<MemberProfile>>),
}

pub struct ReadApi {
    pool: SqlitePool,
    anomalies: AnomalyConfig,
    cache: TtlCache<QueryKey, Cached>,
}

impl ReadApi {
    pub fn new(pool: SqlitePool, cache: &CacheConfig, anomalies: AnomalyConfig) -> Self {
        Self::with_clock(pool, cache, anomalies, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: SqlitePool, cache: &CacheConfig, anomalies: AnomalyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            anomalies,
            cache: TtlCache::with_clock(cache.ttl(), cache.capacity, clock),
        }
    }

    /// Drop every cached result
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Members of `mes`, or of the latest month when `None`
    pub async fn members_for_month(&self, mes: Option<MesReferencia>) -> SyncResult<Arc<Vec<CompensationRecord>>> {
        let key = QueryKey::Members(mes);
        if let Some(Cached::Members(hit)) = self.cache.get(&key) {
            return Ok(hit);
        }
        let value = Arc::new(members::members_for_month(&self.pool, mes).await?);
        self.cache.insert(key, Cached::Members(value.clone()));
        Ok(value)
    }

    pub async fn available_months(&self) -> SyncResult<Arc<Vec<MonthOption>>> {
        if let Some(Cached::Months(hit)) = self.cache.get(&QueryKey::Months) {
            return Ok(hit);
        }
        let value = Arc::new(members::available_months(&self.pool).await?);
        self.cache.insert(QueryKey::Months, Cached::Months(value.clone()));
        Ok(value)
    }

    pub async fn available_years(&self) -> SyncResult<Arc<Vec<i32>>> {
        if let Some(Cached::Years(hit)) = self.cache.get(&QueryKey::Years) {
            return Ok(hit);
        }
        let value = Arc::new(members::available_years(&self.pool).await?);
        self.cache.insert(QueryKey::Years, Cached::Years(value.clone()));
        Ok(value)
    }

    pub async fn members_by_year(&self, year: i32) -> SyncResult<Arc<Vec<YearlyMember>>> {
        let key = QueryKey::ByYear(year);
        if let Some(Cached::ByYear(hit)) = self.cache.get(&key) {
            return Ok(hit);
        }
        let value = Arc::new(members::members_by_year(&self.pool, year).await?);
        self.cache.insert(key, Cached::ByYear(value.clone()));
        Ok(value)
    }

    /// Anomalies for `year`; `None` uses the configured default threshold
    pub async fn anomalies(&self, year: i32, min_percent: Option<f64>) -> SyncResult<Arc<Vec<Anomalia>>> {
        let min_percent = min_percent.unwrap_or(self.anomalies.default_min_percent);
        let key = QueryKey::Anomalies {
            year,
            min_percent_bits: min_percent.to_bits(),
        };
        if let Some(Cached::Anomalies(hit)) = self.cache.get(&key) {
            return Ok(hit);
        }
        let value = Arc::new(find_anomalies(&self.pool, year, min_percent, &self.anomalies).await?);
        self.cache.insert(key, Cached::Anomalies(value.clone()));
        Ok(value)
    }

    pub async fn member_profile(&self, orgao_slug: &str, nome_slug: &str) -> SyncResult<Option<Arc<MemberProfile>>> {
        let key = QueryKey::Profile {
            orgao: orgao_slug.to_string(),
            nome: nome_slug.to_string(),
        };
        if let Some(Cached::Profile(hit)) = self.cache.get(&key) {
            return Ok(hit);
        }
        let value = member_profile(&self.pool, orgao_slug, nome_slug).await?.map(Arc::new);
        self.cache.insert(key, Cached::Profile(value.clone()));
        Ok(value)
    }

    pub async fn stats_by_estado(&self, mes: Option<MesReferencia>) -> SyncResult<Vec<StateStats>> {
        Ok(stats_by_estado(&self.members_for_month(mes).await?))
    }

    pub async fn stats_by_orgao(&self, mes: Option<MesReferencia>) -> SyncResult<Vec<OrgaoStats>> {
        Ok(stats_by_orgao(&self.members_for_month(mes).await?))
    }

    pub async fn query_members(&self, filters: &MemberFilters) -> SyncResult<Page<CompensationRecord>> {
        members::query_members(&self.pool, filters).await
    }

    pub async fn search(&self, query: &str, limit: i64) -> SyncResult<Vec<SearchHit>> {
        search_members(&self.pool, query, limit).await
    }

    pub async fn has_data(&self) -> SyncResult<bool> {
        members::has_data(&self.pool).await
    }
}
