//! Member listings: by month, by year, filtered pages, available periods

use serde::Serialize;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;

use extrateto_common::models::CategoryTotals;
use extrateto_common::{Cargo, CompensationRecord, MesReferencia};

use crate::db::membros::{record_from_row, records_for_month, RECORD_COLUMNS};
use crate::error::{SyncError, SyncResult};

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 200;

/// Whether the store holds any member record
pub async fn has_data(pool: &SqlitePool) -> SyncResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membros").fetch_one(pool).await?;
    Ok(count > 0)
}

/// Most recent month with records
pub async fn latest_month(pool: &SqlitePool) -> SyncResult<Option<MesReferencia>> {
    let mes: Option<String> = sqlx::query_scalar("SELECT MAX(mes_referencia) FROM membros")
        .fetch_one(pool)
        .await?;
    Ok(mes.map(|m| m.parse::<MesReferencia>()).transpose()?)
}

/// Records of `mes`, or of the latest month when `None`; highest total first
pub async fn members_for_month(pool: &SqlitePool, mes: Option<MesReferencia>) -> SyncResult<Vec<CompensationRecord>> {
    let mes = match mes {
        Some(mes) => mes,
        None => match latest_month(pool).await? {
            Some(mes) => mes,
            None => return Ok(Vec::new()),
        },
    };
    records_for_month(pool, mes).await
}

/// A month choice: `value` "2024-06", `label` "Jun/2024"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub value: MesReferencia,
    pub label: String,
}

/// Months with data, newest first
pub async fn available_months(pool: &SqlitePool) -> SyncResult<Vec<MonthOption>> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT mes_referencia FROM membros ORDER BY mes_referencia DESC")
            .fetch_all(pool)
            .await?;

    rows.iter()
        .map(|raw| -> SyncResult<MonthOption> {
            let value: MesReferencia = raw.parse()?;
            Ok(MonthOption {
                value,
                label: value.label(),
            })
        })
        .collect()
}

/// Years with data, newest first
pub async fn available_years(pool: &SqlitePool) -> SyncResult<Vec<i32>> {
    let years: Vec<i32> =
        sqlx::query_scalar("SELECT DISTINCT ano_referencia FROM membros ORDER BY ano_referencia DESC")
            .fetch_all(pool)
            .await?;
    Ok(years)
}

/// One member's totals summed over a year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyMember {
    pub nome: String,
    pub cargo: Cargo,
    pub orgao: String,
    pub estado: String,
    pub totals: CategoryTotals,
    pub remuneracao_total: f64,
    pub acima_teto: f64,
    /// Mean of the monthly percentages
    pub percentual_acima_teto: f64,
    /// Months with a record in the year
    pub meses: i64,
}

/// Per (nome, orgao) sums across `year`, highest total first
pub async fn members_by_year(pool: &SqlitePool, year: i32) -> SyncResult<Vec<YearlyMember>> {
    let rows = sqlx::query(
        r#"
        SELECT
            nome, MAX(cargo) AS cargo, orgao, MAX(estado) AS estado,
            SUM(remuneracao_base) AS remuneracao_base,
            SUM(verbas_indenizatorias) AS verbas_indenizatorias,
            SUM(direitos_eventuais) AS direitos_eventuais,
            SUM(direitos_pessoais) AS direitos_pessoais,
            SUM(remuneracao_total) AS remuneracao_total,
            SUM(acima_teto) AS acima_teto,
            AVG(percentual_acima_teto) AS percentual_acima_teto,
            COUNT(*) AS meses
        FROM membros
        WHERE ano_referencia = ?
        GROUP BY nome, orgao
        ORDER BY remuneracao_total DESC, nome ASC
        "#,
    )
    .bind(year)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> SyncResult<YearlyMember> {
            let cargo: String = row.try_get("cargo")?;
            Ok(YearlyMember {
                nome: row.try_get("nome")?,
                cargo: cargo.parse()?,
                orgao: row.try_get("orgao")?,
                estado: row.try_get("estado")?,
                totals: CategoryTotals {
                    remuneracao_base: row.try_get("remuneracao_base")?,
                    verbas_indenizatorias: row.try_get("verbas_indenizatorias")?,
                    direitos_eventuais: row.try_get("direitos_eventuais")?,
                    direitos_pessoais: row.try_get("direitos_pessoais")?,
                },
                remuneracao_total: row.try_get("remuneracao_total")?,
                acima_teto: row.try_get("acima_teto")?,
                percentual_acima_teto: row.try_get("percentual_acima_teto")?,
                meses: row.try_get("meses")?,
            })
        })
        .collect()
}

/// Sort order of a filtered listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    MaiorRemuneracao,
    MaiorAcimaTeto,
    MaiorPercentual,
    NomeAz,
    Orgao,
}

impl SortKey {
    fn order_by(&self) -> &'static str {
        match self {
            SortKey::MaiorRemuneracao => "remuneracao_total DESC",
            SortKey::MaiorAcimaTeto => "acima_teto DESC",
            SortKey::MaiorPercentual => "percentual_acima_teto DESC",
            SortKey::NomeAz => "nome ASC",
            SortKey::Orgao => "orgao ASC",
        }
    }
}

impl FromStr for SortKey {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maior_remuneracao" => Ok(SortKey::MaiorRemuneracao),
            "maior_acima_teto" => Ok(SortKey::MaiorAcimaTeto),
            "maior_percentual" => Ok(SortKey::MaiorPercentual),
            "nome_az" => Ok(SortKey::NomeAz),
            "orgao" => Ok(SortKey::Orgao),
            other => Err(SyncError::InvalidInput(format!("Unknown sort key: {}", other))),
        }
    }
}

/// Filters for [`query_members`]; unset fields do not filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberFilters {
    pub estado: Option<String>,
    pub orgao: Option<String>,
    pub cargo: Option<Cargo>,
    /// Substring of the member name
    pub nome: Option<String>,
    /// Only members above the ceiling
    pub acima_teto: bool,
    pub salario_min: Option<f64>,
    pub salario_max: Option<f64>,
    pub mes: Option<MesReferencia>,
    pub sort: SortKey,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl Default for MemberFilters {
    fn default() -> Self {
        Self {
            estado: None,
            orgao: None,
            cargo: None,
            nome: None,
            acima_teto: false,
            salario_min: None,
            salario_max: None,
            mes: None,
            sort: SortKey::default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl MemberFilters {
    /// Page clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Limit defaulted when zero and capped
    pub fn limit(&self) -> u32 {
        if self.limit == 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            self.limit.min(MAX_PAGE_LIMIT)
        }
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;
        let mut clause = |builder: &mut QueryBuilder<'_, Sqlite>| {
            builder.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some(estado) = &self.estado {
            clause(builder);
            builder.push("estado = ").push_bind(estado.clone());
        }
        if let Some(orgao) = &self.orgao {
            clause(builder);
            builder.push("orgao = ").push_bind(orgao.clone());
        }
        if let Some(cargo) = self.cargo {
            clause(builder);
            builder.push("cargo = ").push_bind(cargo.as_str());
        }
        if let Some(nome) = &self.nome {
            clause(builder);
            builder.push("nome LIKE ").push_bind(format!("%{}%", nome));
        }
        if self.acima_teto {
            clause(builder);
            builder.push("acima_teto >= 0.01");
        }
        if let Some(min) = self.salario_min {
            clause(builder);
            builder.push("remuneracao_total >= ").push_bind(min);
        }
        if let Some(max) = self.salario_max {
            clause(builder);
            builder.push("remuneracao_total <= ").push_bind(max);
        }
        if let Some(mes) = self.mes {
            clause(builder);
            builder.push("mes_referencia = ").push_bind(mes.to_string());
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

/// Filtered, sorted, paginated member records
pub async fn query_members(pool: &SqlitePool, filters: &MemberFilters) -> SyncResult<Page<CompensationRecord>> {
    let page = filters.page();
    let limit = filters.limit();
    let offset = i64::from(page - 1) * i64::from(limit);

    let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM membros", RECORD_COLUMNS));
    filters.push_where(&mut select);
    select
        .push(" ORDER BY ")
        .push(filters.sort.order_by())
        .push(", id ASC LIMIT ")
        .push_bind(i64::from(limit))
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = select.build().fetch_all(pool).await?;
    let data = rows.iter().map(record_from_row).collect::<SyncResult<Vec<_>>>()?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM membros");
    filters.push_where(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let limit_i64 = i64::from(limit);
    Ok(Page {
        data,
        total,
        page,
        limit,
        total_pages: (total + limit_i64 - 1) / limit_i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_page_and_limit_bounds() {
        let mut filters = MemberFilters::default();
        assert_eq!((filters.page(), filters.limit()), (1, 50));

        filters.page = 0;
        filters.limit = 1000;
        assert_eq!((filters.page(), filters.limit()), (1, 200));

        filters.limit = 0;
        assert_eq!(filters.limit(), 50);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("nome_az".parse::<SortKey>().unwrap(), SortKey::NomeAz);
        assert_eq!("maior_percentual".parse::<SortKey>().unwrap(), SortKey::MaiorPercentual);
        assert!("aleatorio".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_where_clause_shape() {
        let filters = MemberFilters {
            estado: Some("SP".to_string()),
            acima_teto: true,
            salario_min: Some(40_000.0),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM membros");
        filters.push_where(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM membros WHERE estado = ? AND acima_teto >= 0.01 AND remuneracao_total >= ?"
        );
    }
}
