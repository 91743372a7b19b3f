//! Post-aggregation consistency validation.
//!
//! A pure pass over the assembled statistic groups that annotates the
//! metrics with findings. Findings are data, not control flow: the
//! numbers are reported as-is and never blocked or altered.

use std::fmt::Write as _;

use gridstats_aggregate_models::CellMetrics;

/// Employment rates below this are implausible for a populated cell and
/// usually indicate inconsistent source counts.
const MIN_PLAUSIBLE_EMPLOYMENT_RATE: f64 = 0.50;

/// Annotates the metrics with consistency findings.
///
/// Checks the employment accounting identity (employed can never exceed
/// the labor force), plausibility of the employment rate, and whether
/// the income median and mean are suspiciously identical (a sign the
/// mean was computed as a proxy for the median upstream).
pub fn validate(metrics: &mut CellMetrics) {
    let mut note = String::new();

    let employment = &metrics.employment;
    let labor_force = employment.labor_force;
    let employed = employment.employed;

    #[allow(clippy::cast_precision_loss)]
    let employment_rate = employed as f64 / (labor_force as f64).max(1.0);

    if employed > labor_force && labor_force > 0 {
        metrics.validation.employment_mismatch = true;
        let _ = write!(
            note,
            "Employment data error: employed ({employed}) exceeds labor force ({labor_force}). "
        );
        log::warn!("employment mismatch: employed {employed} > labor force {labor_force}");
    }

    if employment_rate > 0.0 && employment_rate < MIN_PLAUSIBLE_EMPLOYMENT_RATE {
        metrics.validation.employment_mismatch = true;
        let _ = write!(
            note,
            "Low employment rate: {:.1}% (typically above {:.0}%). ",
            employment_rate * 100.0,
            MIN_PLAUSIBLE_EMPLOYMENT_RATE * 100.0
        );
        log::warn!("implausibly low employment rate: {employment_rate:.3}");
    }

    let median = metrics.income.median;
    let mean = metrics.income.mean;
    if median > 0 && mean > 0 && median.abs_diff(mean) < 1 {
        metrics.validation.income_suspicious = true;
        let _ = write!(
            note,
            "Income data flagged: median ({median}) equals mean ({mean}). "
        );
        log::warn!("suspicious income data: median {median} equals mean {mean}");
    }

    metrics.validation.validation_note = note.trim_end().to_string();
}

#[cfg(test)]
mod tests {
    use gridstats_aggregate_models::{EmploymentStats, IncomeStats};

    use super::*;

    fn metrics_with_employment(labor_force: u64, employed: u64, unemployed: u64) -> CellMetrics {
        CellMetrics {
            employment: EmploymentStats {
                labor_force,
                employed,
                unemployed,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn consistent_employment_passes() {
        let mut metrics = metrics_with_employment(600, 550, 50);
        validate(&mut metrics);
        assert!(!metrics.validation.employment_mismatch);
        assert!(metrics.validation.validation_note.is_empty());
    }

    #[test]
    fn employed_exceeding_labor_force_is_flagged() {
        let mut metrics = metrics_with_employment(600, 650, 0);
        validate(&mut metrics);
        assert!(metrics.validation.employment_mismatch);
        assert!(metrics.validation.validation_note.contains("650"));
        assert!(metrics.validation.validation_note.contains("600"));
    }

    #[test]
    fn low_employment_rate_is_flagged() {
        let mut metrics = metrics_with_employment(1000, 300, 700);
        validate(&mut metrics);
        assert!(metrics.validation.employment_mismatch);
        assert!(metrics.validation.validation_note.contains("30.0%"));
    }

    #[test]
    fn zero_employment_is_not_flagged() {
        let mut metrics = metrics_with_employment(0, 0, 0);
        validate(&mut metrics);
        assert!(!metrics.validation.employment_mismatch);
    }

    #[test]
    fn identical_median_and_mean_is_suspicious() {
        let mut metrics = CellMetrics {
            income: IncomeStats {
                median: 75_000,
                mean: 75_000,
                ..Default::default()
            },
            ..Default::default()
        };
        validate(&mut metrics);
        assert!(metrics.validation.income_suspicious);
    }

    #[test]
    fn distinct_median_and_mean_pass() {
        let mut metrics = CellMetrics {
            income: IncomeStats {
                median: 75_000,
                mean: 82_000,
                ..Default::default()
            },
            ..Default::default()
        };
        validate(&mut metrics);
        assert!(!metrics.validation.income_suspicious);
        assert!(metrics.validation.validation_note.is_empty());
    }

    #[test]
    fn findings_never_alter_reported_values() {
        let mut metrics = metrics_with_employment(600, 650, 0);
        metrics.income.median = 50_000;
        metrics.income.mean = 50_000;
        validate(&mut metrics);

        assert_eq!(metrics.employment.employed, 650);
        assert_eq!(metrics.employment.labor_force, 600);
        assert_eq!(metrics.income.median, 50_000);
        assert!(metrics.validation.employment_mismatch);
        assert!(metrics.validation.income_suspicious);
    }
}
