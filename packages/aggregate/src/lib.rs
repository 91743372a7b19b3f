#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Area-weighted aggregation of block group statistics onto a query cell.
//!
//! Counts are redistributed by density × covered area: each block
//! group's raw count becomes a per-km² density over its own total area,
//! multiplied by the area of it that falls inside the cell, then summed
//! across block groups. Unevenly sized block groups therefore contribute
//! in proportion to their actual overlap footprint rather than their
//! attribute share, which is the correct areal-interpolation semantics
//! for counts assumed uniformly distributed within each source area.
//!
//! Per-area published medians (rent, home value) are instead blended by
//! overlap-fraction weighted average, and the income median is
//! interpolated from the aggregated bracket distribution.

pub mod brackets;
pub mod validate;

use gridstats_acs::FieldRecord;
use gridstats_aggregate_models::{
    AgeDistribution, CellMetrics, CostStats, EducationStats, EmploymentStats, HouseholdSize,
    HouseholdStats, HousingStats, IncomeBrackets, IncomeStats, LandUseContext, PopulationStats,
    RentBurden, TenureStats, UnitsInStructure,
};

pub use brackets::{TOP_BRACKET_CAP_USD, quantile_from_brackets};
pub use validate::validate;

/// Population density thresholds (people/km²) for the land-use
/// classification, checked in order. Densities at or below the last
/// threshold fall through to [`LandUseContext::LowDensity`].
pub const DENSITY_THRESHOLDS: [(f64, LandUseContext); 4] = [
    (15_000.0, LandUseContext::HighDensityUrbanCore),
    (8_000.0, LandUseContext::MediumHighDensity),
    (3_000.0, LandUseContext::MediumDensity),
    (1_000.0, LandUseContext::LowMediumDensity),
];

/// Fixed education split applied to the attainment universe when the
/// full per-tier tables are unavailable: bachelor's or higher / some
/// college / high school or less. A documented estimate, not measured.
pub const EDUCATION_SPLIT: (f64, f64, f64) = (0.45, 0.25, 0.30);

/// Fixed units-in-structure split of total units, in class order
/// (1-detached, 2, 3-4, 5-9, 10-19, 20+). The structure-type table is
/// not published for recent ACS vintages; a documented estimate.
pub const UNITS_IN_STRUCTURE_SPLIT: [f64; 6] = [0.35, 0.10, 0.10, 0.15, 0.15, 0.15];

/// B01001 fields folded into each output age group.
const AGE_0_4: &[&str] = &["male_0_4", "female_0_4"];
const AGE_5_14: &[&str] = &["male_5_9", "male_10_14", "female_5_9", "female_10_14"];
const AGE_15_24: &[&str] = &[
    "male_15_17",
    "male_18_19",
    "male_20",
    "male_21",
    "male_22_24",
    "female_15_17",
    "female_18_19",
    "female_20",
    "female_21",
    "female_22_24",
];
const AGE_25_44: &[&str] = &[
    "male_25_29",
    "male_30_34",
    "male_35_39",
    "male_40_44",
    "female_25_29",
    "female_30_34",
    "female_35_39",
    "female_40_44",
];
const AGE_45_64: &[&str] = &[
    "male_45_49",
    "male_50_54",
    "male_55_59",
    "male_60_61",
    "male_62_64",
    "female_45_49",
    "female_50_54",
    "female_55_59",
    "female_60_61",
    "female_62_64",
];
const AGE_65_PLUS: &[&str] = &[
    "male_65_66",
    "male_67_69",
    "male_70_74",
    "male_75_79",
    "male_80_84",
    "male_85_plus",
    "female_65_66",
    "female_67_69",
    "female_70_74",
    "female_75_79",
    "female_80_84",
    "female_85_plus",
];

/// One block group's contribution to the cell: its overlap weight and
/// raw field values, resolved upstream. Owned by a single request.
#[derive(Debug, Clone)]
pub struct AreaRecord {
    /// The block group's GEOID.
    pub geoid: String,
    /// Covered area / total area, in (0, 1].
    pub fraction: f64,
    /// Absolute covered area in km².
    pub covered_area_km2: f64,
    /// Raw tabulated field values.
    pub fields: FieldRecord,
}

impl AreaRecord {
    /// The block group's total area, recovered from the overlap weight.
    #[must_use]
    pub fn total_area_km2(&self) -> f64 {
        if self.fraction > 0.0 {
            self.covered_area_km2 / self.fraction
        } else {
            0.0
        }
    }
}

/// Redistributes the sum of `fields` onto the cell by density × covered
/// area.
#[must_use]
pub fn redistributed_sum(records: &[AreaRecord], fields: &[&str]) -> f64 {
    records
        .iter()
        .map(|record| {
            let total_area = record.total_area_km2();
            if total_area > 0.0 {
                record.fields.sum(fields) / total_area * record.covered_area_km2
            } else {
                0.0
            }
        })
        .sum()
}

/// Redistributes a single field onto the cell by density × covered area.
#[must_use]
pub fn redistributed_total(records: &[AreaRecord], field: &str) -> f64 {
    redistributed_sum(records, &[field])
}

/// Overlap-fraction weighted average of a field across block groups.
///
/// Used for per-area published medians, which cannot be redistributed as
/// counts. Returns 0 when the weights sum to 0.
#[must_use]
pub fn weighted_average(records: &[AreaRecord], field: &str) -> f64 {
    let total_weight: f64 = records.iter().map(|r| r.fraction).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted_sum: f64 = records
        .iter()
        .map(|r| r.fields.get(field) * r.fraction)
        .sum();

    weighted_sum / total_weight
}

/// Classifies a population density into a land-use context label.
#[must_use]
pub fn classify_land_use(density_per_km2: f64) -> LandUseContext {
    for (threshold, context) in DENSITY_THRESHOLDS {
        if density_per_km2 > threshold {
            return context;
        }
    }
    LandUseContext::LowDensity
}

/// Rounds a redistributed count to a reportable integer.
fn round_count(value: f64) -> u64 {
    if value > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            value.round() as u64
        }
    } else {
        0
    }
}

/// Aggregates block group records into the cell statistics.
///
/// Zero records produce the all-zero metrics with the lowest-density
/// land-use label — the same full shape as a populated result. The
/// returned metrics carry default validation flags; run
/// [`validate`] afterwards to annotate them.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn aggregate_cell(records: &[AreaRecord], nominal_area_km2: f64) -> CellMetrics {
    let covered_area_km2: f64 = records.iter().map(|r| r.covered_area_km2).sum();
    let coverage_ratio = if nominal_area_km2 > 0.0 {
        covered_area_km2 / nominal_area_km2
    } else {
        0.0
    };

    if records.is_empty() {
        log::warn!("no contributing block groups; returning all-zero metrics");
        return CellMetrics {
            nominal_area_km2,
            ..Default::default()
        };
    }

    // ── Counts redistributed by density × covered area ────────────────
    let population = redistributed_total(records, "total_population");
    let households = redistributed_total(records, "total_households");
    let aggregate_income = redistributed_total(records, "aggregate_household_income");
    let labor_force = redistributed_total(records, "civilian_labor_force");
    let employed = redistributed_total(records, "employed");
    let unemployed = redistributed_total(records, "unemployed");
    let education_universe = redistributed_total(records, "total_education_population");
    let units_total = redistributed_total(records, "total_housing_units");
    let occupied = redistributed_total(records, "occupied_housing_units");
    let vacant = redistributed_total(records, "vacant_housing_units");
    let owner = redistributed_total(records, "owner_occupied");
    let renter = redistributed_total(records, "renter_occupied");

    let age = AgeDistribution {
        age_0_4: round_count(redistributed_sum(records, AGE_0_4)),
        age_5_14: round_count(redistributed_sum(records, AGE_5_14)),
        age_15_24: round_count(redistributed_sum(records, AGE_15_24)),
        age_25_44: round_count(redistributed_sum(records, AGE_25_44)),
        age_45_64: round_count(redistributed_sum(records, AGE_45_64)),
        age_65_plus: round_count(redistributed_sum(records, AGE_65_PLUS)),
    };

    // ── Income brackets and the interpolated median ──────────────────
    let bracket_counts: Vec<f64> = brackets::INCOME_BRACKET_SPECS
        .iter()
        .map(|spec| redistributed_sum(records, spec.fields))
        .collect();

    let distribution: Vec<(f64, f64, f64)> = brackets::INCOME_BRACKET_SPECS
        .iter()
        .zip(&bracket_counts)
        .map(|(spec, count)| (spec.low, spec.high, *count))
        .collect();

    let median_income = quantile_from_brackets(&distribution, 0.5);
    let mean_income = aggregate_income / households.max(1.0);

    let income_brackets = IncomeBrackets {
        lt_10k: round_count(bracket_counts[0]),
        from_10_to_15k: round_count(bracket_counts[1]),
        from_15_to_25k: round_count(bracket_counts[2]),
        from_25_to_35k: round_count(bracket_counts[3]),
        from_35_to_50k: round_count(bracket_counts[4]),
        from_50_to_75k: round_count(bracket_counts[5]),
        from_75_to_100k: round_count(bracket_counts[6]),
        from_100_to_125k: round_count(bracket_counts[7]),
        from_125_to_150k: round_count(bracket_counts[8]),
        from_150_to_200k: round_count(bracket_counts[9]),
        gte_200k: round_count(bracket_counts[10]),
    };

    // ── Derived rates and splits ─────────────────────────────────────
    let employment_rate = employed / labor_force.max(1.0);
    let unemployment_rate = unemployed / labor_force.max(1.0);

    let (ba_share, some_college_share, hs_share) = EDUCATION_SPLIT;
    let education = EducationStats {
        ba_plus: round_count(education_universe * ba_share),
        some_college: round_count(education_universe * some_college_share),
        hs_or_less: round_count(education_universe * hs_share),
        estimated: education_universe > 0.0,
    };

    let units_in_structure = UnitsInStructure {
        one_detached: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[0]),
        two_units: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[1]),
        three_to_four: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[2]),
        five_to_nine: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[3]),
        ten_to_nineteen: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[4]),
        twenty_plus: round_count(units_total * UNITS_IN_STRUCTURE_SPLIT[5]),
        estimated: units_total > 0.0,
    };

    let rent_burden_total = redistributed_total(records, "total_rent_burden");
    let burden_30_plus = redistributed_sum(
        records,
        &[
            "rent_burden_30_35",
            "rent_burden_35_40",
            "rent_burden_40_50",
            "rent_burden_50_plus",
        ],
    );
    let burden_50_plus = redistributed_total(records, "rent_burden_50_plus");
    let rent_burden_pct = if rent_burden_total > 0.0 {
        RentBurden {
            gt_30: burden_30_plus / rent_burden_total * 100.0,
            gt_50: burden_50_plus / rent_burden_total * 100.0,
        }
    } else {
        RentBurden::default()
    };

    let density_per_km2 = if nominal_area_km2 > 0.0 {
        population / nominal_area_km2
    } else {
        0.0
    };

    CellMetrics {
        population: PopulationStats {
            total: round_count(population),
            density_per_km2,
            age,
        },
        households: HouseholdStats {
            total: round_count(households),
            avg_size: HouseholdSize {
                overall: population / households.max(1.0),
                // Tenure-specific population is not published at this
                // geography, so the subsets stay at 0.
                owner: 0.0,
                renter: 0.0,
            },
        },
        income: IncomeStats {
            median: round_count(median_income),
            mean: round_count(mean_income),
            brackets: income_brackets,
        },
        employment: EmploymentStats {
            labor_force: round_count(labor_force),
            employed: round_count(employed),
            unemployed: round_count(unemployed),
            employment_rate,
            unemployment_rate,
        },
        education,
        housing: HousingStats {
            units_total: round_count(units_total),
            occupied: round_count(occupied),
            vacant: round_count(vacant),
            tenure: TenureStats {
                owner: round_count(owner),
                renter: round_count(renter),
            },
            units_in_structure,
        },
        costs: CostStats {
            median_gross_rent: round_count(weighted_average(records, "median_gross_rent")),
            median_home_value: round_count(weighted_average(records, "median_home_value")),
            rent_burden_pct,
        },
        jobs_workplace: Default::default(),
        covered_area_km2,
        nominal_area_km2,
        coverage_ratio,
        land_use_context: classify_land_use(density_per_km2),
        validation: Default::default(),
    }
}
