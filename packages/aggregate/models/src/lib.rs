#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated cell statistic types.
//!
//! One struct per statistic group, every numeric leaf a concrete value
//! defaulting to zero. A serialized [`CellMetrics`] always has the same
//! shape — no key is ever absent — so the "always full shape, never
//! partial" contract is carried by the type system instead of by
//! convention. Instances are produced by the aggregator, annotated once
//! by the validator, and immutable afterwards.

use serde::{Deserialize, Serialize};

/// Population counts by age group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    /// Ages 0-4.
    pub age_0_4: u64,
    /// Ages 5-14.
    pub age_5_14: u64,
    /// Ages 15-24.
    pub age_15_24: u64,
    /// Ages 25-44.
    pub age_25_44: u64,
    /// Ages 45-64.
    pub age_45_64: u64,
    /// Ages 65 and over.
    pub age_65_plus: u64,
}

/// Population statistics for the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationStats {
    /// Total population redistributed onto the cell.
    pub total: u64,
    /// Population per km² of nominal cell area.
    pub density_per_km2: f64,
    /// Breakdown by age group.
    pub age: AgeDistribution,
}

/// Average household size, overall and by tenure.
///
/// Tenure-specific population is not published at block-group level, so
/// the owner/renter subsets report 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSize {
    /// Population per household across all tenures.
    pub overall: f64,
    /// Owner-occupied subset (0 when unavailable).
    pub owner: f64,
    /// Renter-occupied subset (0 when unavailable).
    pub renter: f64,
}

/// Household statistics for the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdStats {
    /// Total households.
    pub total: u64,
    /// Average household sizes.
    pub avg_size: HouseholdSize,
}

/// Household counts by income bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBrackets {
    /// Under $10k.
    pub lt_10k: u64,
    /// $10k to $15k.
    pub from_10_to_15k: u64,
    /// $15k to $25k.
    pub from_15_to_25k: u64,
    /// $25k to $35k.
    pub from_25_to_35k: u64,
    /// $35k to $50k.
    pub from_35_to_50k: u64,
    /// $50k to $75k.
    pub from_50_to_75k: u64,
    /// $75k to $100k.
    pub from_75_to_100k: u64,
    /// $100k to $125k.
    pub from_100_to_125k: u64,
    /// $125k to $150k.
    pub from_125_to_150k: u64,
    /// $150k to $200k.
    pub from_150_to_200k: u64,
    /// $200k and over.
    pub gte_200k: u64,
}

/// Household income statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStats {
    /// Median household income in dollars, interpolated from brackets.
    pub median: u64,
    /// Mean household income in dollars.
    pub mean: u64,
    /// Bracket distribution.
    pub brackets: IncomeBrackets,
}

/// Employment statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentStats {
    /// Civilian labor force.
    pub labor_force: u64,
    /// Employed persons.
    pub employed: u64,
    /// Unemployed persons.
    pub unemployed: u64,
    /// Employed / labor force.
    pub employment_rate: f64,
    /// Unemployed / labor force.
    pub unemployment_rate: f64,
}

/// Educational attainment tiers.
///
/// Derived from a fixed proportional split of the attainment universe,
/// not from per-tier source tables — `estimated` is always true when the
/// counts are nonzero so callers can tell modeled numbers from measured
/// ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationStats {
    /// High school or less.
    pub hs_or_less: u64,
    /// Some college, no degree.
    pub some_college: u64,
    /// Bachelor's degree or higher.
    pub ba_plus: u64,
    /// True when the tiers come from the documented fixed split.
    pub estimated: bool,
}

/// Housing tenure counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenureStats {
    /// Owner-occupied units.
    pub owner: u64,
    /// Renter-occupied units.
    pub renter: u64,
}

/// Housing unit counts by units-in-structure class.
///
/// The structure-type table is not published for recent ACS vintages;
/// counts come from a documented fixed split of total units and carry
/// `estimated: true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitsInStructure {
    /// Single-family detached.
    pub one_detached: u64,
    /// Two-unit structures.
    pub two_units: u64,
    /// Three- and four-unit structures.
    pub three_to_four: u64,
    /// Five- to nine-unit structures.
    pub five_to_nine: u64,
    /// Ten- to nineteen-unit structures.
    pub ten_to_nineteen: u64,
    /// Twenty or more units.
    pub twenty_plus: u64,
    /// True when the classes come from the documented fixed split.
    pub estimated: bool,
}

/// Housing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingStats {
    /// Total housing units.
    pub units_total: u64,
    /// Occupied units.
    pub occupied: u64,
    /// Vacant units.
    pub vacant: u64,
    /// Tenure breakdown.
    pub tenure: TenureStats,
    /// Units-in-structure breakdown.
    pub units_in_structure: UnitsInStructure,
}

/// Share of renter households burdened by gross rent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentBurden {
    /// Percent of renters paying over 30% of income.
    pub gt_30: f64,
    /// Percent of renters paying over 50% of income.
    pub gt_50: f64,
}

/// Housing cost statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostStats {
    /// Median gross rent in dollars.
    pub median_gross_rent: u64,
    /// Median home value in dollars.
    pub median_home_value: u64,
    /// Rent burden percentages.
    pub rent_burden_pct: RentBurden,
}

/// Jobs by monthly earnings band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsBands {
    /// $1,250/month or less.
    pub e1: u64,
    /// $1,251 to $3,333/month.
    pub e2: u64,
    /// $3,334/month or more.
    pub e3: u64,
}

/// Jobs by NAICS sector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsBySector {
    /// Agriculture, forestry, fishing and hunting.
    pub naics_11: u64,
    /// Mining, quarrying, and oil and gas extraction.
    pub naics_21: u64,
}

/// Workplace job statistics for the cell's state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsWorkplace {
    /// Total jobs.
    pub total_jobs: u64,
    /// Jobs by earnings band.
    pub earnings_bands: EarningsBands,
    /// Jobs by sector.
    pub by_sector: JobsBySector,
}

/// Qualitative land-use classification from population density.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandUseContext {
    /// Over 15,000 people/km².
    #[serde(rename = "High-density residential/urban core")]
    HighDensityUrbanCore,
    /// Over 8,000 people/km².
    #[serde(rename = "Medium-high density residential")]
    MediumHighDensity,
    /// Over 3,000 people/km².
    #[serde(rename = "Medium density residential/mixed use")]
    MediumDensity,
    /// Over 1,000 people/km².
    #[serde(rename = "Low-medium density residential")]
    LowMediumDensity,
    /// Everything below.
    #[default]
    #[serde(rename = "Low density residential/commercial/institutional")]
    LowDensity,
}

impl LandUseContext {
    /// The human-readable label for this classification.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighDensityUrbanCore => "High-density residential/urban core",
            Self::MediumHighDensity => "Medium-high density residential",
            Self::MediumDensity => "Medium density residential/mixed use",
            Self::LowMediumDensity => "Low-medium density residential",
            Self::LowDensity => "Low density residential/commercial/institutional",
        }
    }
}

/// Consistency validator findings. Informational only — flags never
/// block or alter the returned numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFlags {
    /// Employment identity violated or implausible employment rate.
    pub employment_mismatch: bool,
    /// Median and mean income suspiciously equal.
    pub income_suspicious: bool,
    /// Concatenation of every triggered finding, empty when clean.
    pub validation_note: String,
}

/// The complete aggregated statistics for one query cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellMetrics {
    /// Population group.
    pub population: PopulationStats,
    /// Household group.
    pub households: HouseholdStats,
    /// Income group.
    pub income: IncomeStats,
    /// Employment group.
    pub employment: EmploymentStats,
    /// Education group.
    pub education: EducationStats,
    /// Housing group.
    pub housing: HousingStats,
    /// Costs group.
    pub costs: CostStats,
    /// Workplace jobs group.
    pub jobs_workplace: JobsWorkplace,
    /// Total block-group area covered by the cell, km².
    pub covered_area_km2: f64,
    /// Nominal cell area, km².
    pub nominal_area_km2: f64,
    /// Covered / nominal. May exceed 1 (overlapping source polygons,
    /// projection rounding) and is reported as-is.
    pub coverage_ratio: f64,
    /// Qualitative land-use classification.
    pub land_use_context: LandUseContext,
    /// Validator findings.
    pub validation: ValidationFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_have_all_zero_leaves() {
        let metrics = CellMetrics::default();
        assert_eq!(metrics.population.total, 0);
        assert_eq!(metrics.income.brackets.gte_200k, 0);
        assert!(metrics.costs.rent_burden_pct.gt_30.abs() < f64::EPSILON);
        assert_eq!(metrics.land_use_context, LandUseContext::LowDensity);
        assert!(!metrics.validation.employment_mismatch);
        assert!(metrics.validation.validation_note.is_empty());
    }

    #[test]
    fn serialized_shape_is_always_full() {
        let json = serde_json::to_value(CellMetrics::default()).unwrap();
        for group in [
            "population",
            "households",
            "income",
            "employment",
            "education",
            "housing",
            "costs",
            "jobsWorkplace",
            "validation",
        ] {
            assert!(json.get(group).is_some(), "missing group {group}");
        }
        assert_eq!(json["population"]["age"].as_object().unwrap().len(), 6);
        assert_eq!(json["income"]["brackets"].as_object().unwrap().len(), 11);
        assert_eq!(json["income"]["brackets"]["lt10k"], serde_json::json!(0));
    }

    #[test]
    fn land_use_serializes_as_label() {
        let json = serde_json::to_value(LandUseContext::MediumDensity).unwrap();
        assert_eq!(json, "Medium density residential/mixed use");
        assert_eq!(
            LandUseContext::default().label(),
            "Low density residential/commercial/institutional"
        );
    }

    #[test]
    fn coverage_ratio_over_one_is_representable() {
        let metrics = CellMetrics {
            coverage_ratio: 1.08,
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!((json["coverageRatio"].as_f64().unwrap() - 1.08).abs() < 1e-12);
    }
}
