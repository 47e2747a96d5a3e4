//! Ceiling (teto constitucional) calculation
//!
//! The ceiling is a legally defined reference salary that changes over time,
//! so the calculator never embeds a value: callers pass the ceiling that
//! applies to the period being computed, usually via [`CeilingSchedule`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::CategoryTotals;
use crate::{Error, Result};

/// Derived values of one member-month against a ceiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CeilingBreakdown {
    /// Sum of the four categories
    pub total: f64,
    /// `max(0, total - ceiling)`
    pub acima_teto: f64,
    /// `100 * acima_teto / ceiling` when above the ceiling, else 0
    pub percentual_acima_teto: f64,
}

impl CeilingBreakdown {
    pub fn compute(totals: &CategoryTotals, ceiling: f64) -> Self {
        let total = totals.sum();
        let acima_teto = (total - ceiling).max(0.0);
        let percentual_acima_teto = if acima_teto > 0.0 {
            (acima_teto / ceiling) * 100.0
        } else {
            0.0
        };

        Self {
            total,
            acima_teto,
            percentual_acima_teto,
        }
    }
}

/// Ceiling values by the year they took effect
#[derive(Debug, Clone, PartialEq)]
pub struct CeilingSchedule {
    by_year: BTreeMap<i32, f64>,
}

impl CeilingSchedule {
    /// Build a schedule, rejecting empty or non-positive entries
    pub fn new(by_year: BTreeMap<i32, f64>) -> Result<Self> {
        if by_year.is_empty() {
            return Err(Error::Config("Ceiling schedule must have at least one year".to_string()));
        }
        if let Some((year, value)) = by_year.iter().find(|(_, value)| **value <= 0.0) {
            return Err(Error::Config(format!(
                "Ceiling for {} must be positive, got {}",
                year, value
            )));
        }
        Ok(Self { by_year })
    }

    /// Ceiling in force for `year`
    ///
    /// Uses the latest entry not after `year`; years before the first entry
    /// fall back to the earliest known ceiling.
    pub fn for_year(&self, year: i32) -> f64 {
        self.by_year
            .range(..=year)
            .next_back()
            .or_else(|| self.by_year.iter().next())
            .map(|(_, value)| *value)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &BTreeMap<i32, f64> {
        &self.by_year
    }
}

impl Default for CeilingSchedule {
    fn default() -> Self {
        Self {
            by_year: BTreeMap::from([(2023, 41_650.92), (2024, 44_008.52), (2025, 46_366.19)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(base: f64, ind: f64, ev: f64, pess: f64) -> CategoryTotals {
        CategoryTotals {
            remuneracao_base: base,
            verbas_indenizatorias: ind,
            direitos_eventuais: ev,
            direitos_pessoais: pess,
        }
    }

    #[test]
    fn test_below_ceiling_has_no_excess() {
        let result = CeilingBreakdown::compute(&totals(30_000.0, 5_000.0, 0.0, 0.0), 46_366.19);
        assert_eq!(result.total, 35_000.0);
        assert_eq!(result.acima_teto, 0.0);
        assert_eq!(result.percentual_acima_teto, 0.0);
    }

    #[test]
    fn test_exactly_at_ceiling_has_no_excess() {
        let result = CeilingBreakdown::compute(&totals(40_000.0, 0.0, 0.0, 0.0), 40_000.0);
        assert_eq!(result.acima_teto, 0.0);
        assert_eq!(result.percentual_acima_teto, 0.0);
    }

    #[test]
    fn test_above_ceiling_excess_and_percentage() {
        let result = CeilingBreakdown::compute(&totals(40_000.0, 20_000.0, 15_000.0, 5_000.0), 40_000.0);
        assert_eq!(result.total, 80_000.0);
        assert_eq!(result.acima_teto, 40_000.0);
        assert!((result.percentual_acima_teto - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_excess_matches_formula_over_a_grid() {
        let ceiling = 46_366.19;
        for base in [0.0, 10_000.0, 46_366.19, 90_000.0] {
            for extra in [0.0, 1.5, 25_000.0] {
                let t = totals(base, extra, extra / 2.0, extra / 4.0);
                let sum = t.sum();
                let result = CeilingBreakdown::compute(&t, ceiling);
                assert_eq!(result.acima_teto, (sum - ceiling).max(0.0));
                if sum > ceiling {
                    let expected = 100.0 * (sum - ceiling) / ceiling;
                    assert!((result.percentual_acima_teto - expected).abs() < 1e-9);
                } else {
                    assert_eq!(result.percentual_acima_teto, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_schedule_picks_latest_year_not_after_target() {
        let schedule = CeilingSchedule::default();
        assert_eq!(schedule.for_year(2024), 44_008.52);
        assert_eq!(schedule.for_year(2025), 46_366.19);
        assert_eq!(schedule.for_year(2027), 46_366.19);
        assert_eq!(schedule.for_year(2019), 41_650.92);
    }

    #[test]
    fn test_schedule_rejects_invalid_entries() {
        assert!(CeilingSchedule::new(BTreeMap::new()).is_err());
        assert!(CeilingSchedule::new(BTreeMap::from([(2024, 0.0)])).is_err());
    }
}
