//! ACS 5-year variable inventory.
//!
//! Maps Census Data API variable IDs to the friendly field names used by
//! the aggregator. Grouped by source table; [`all_variables`] flattens
//! the groups into the fetch list.

/// Population and household totals (B01003, B11001).
pub const TOTALS: &[(&str, &str)] = &[
    ("B01003_001E", "total_population"),
    ("B11001_001E", "total_households"),
];

/// Age by sex cells from B01001.
pub const AGE_BY_SEX: &[(&str, &str)] = &[
    ("B01001_003E", "male_0_4"),
    ("B01001_004E", "male_5_9"),
    ("B01001_005E", "male_10_14"),
    ("B01001_006E", "male_15_17"),
    ("B01001_007E", "male_18_19"),
    ("B01001_008E", "male_20"),
    ("B01001_009E", "male_21"),
    ("B01001_010E", "male_22_24"),
    ("B01001_011E", "male_25_29"),
    ("B01001_012E", "male_30_34"),
    ("B01001_013E", "male_35_39"),
    ("B01001_014E", "male_40_44"),
    ("B01001_015E", "male_45_49"),
    ("B01001_016E", "male_50_54"),
    ("B01001_017E", "male_55_59"),
    ("B01001_018E", "male_60_61"),
    ("B01001_019E", "male_62_64"),
    ("B01001_020E", "male_65_66"),
    ("B01001_021E", "male_67_69"),
    ("B01001_022E", "male_70_74"),
    ("B01001_023E", "male_75_79"),
    ("B01001_024E", "male_80_84"),
    ("B01001_025E", "male_85_plus"),
    ("B01001_027E", "female_0_4"),
    ("B01001_028E", "female_5_9"),
    ("B01001_029E", "female_10_14"),
    ("B01001_030E", "female_15_17"),
    ("B01001_031E", "female_18_19"),
    ("B01001_032E", "female_20"),
    ("B01001_033E", "female_21"),
    ("B01001_034E", "female_22_24"),
    ("B01001_035E", "female_25_29"),
    ("B01001_036E", "female_30_34"),
    ("B01001_037E", "female_35_39"),
    ("B01001_038E", "female_40_44"),
    ("B01001_039E", "female_45_49"),
    ("B01001_040E", "female_50_54"),
    ("B01001_041E", "female_55_59"),
    ("B01001_042E", "female_60_61"),
    ("B01001_043E", "female_62_64"),
    ("B01001_044E", "female_65_66"),
    ("B01001_045E", "female_67_69"),
    ("B01001_046E", "female_70_74"),
    ("B01001_047E", "female_75_79"),
    ("B01001_048E", "female_80_84"),
    ("B01001_049E", "female_85_plus"),
];

/// Published income medians and aggregates (B19013, B19025).
pub const INCOME: &[(&str, &str)] = &[
    ("B19013_001E", "median_household_income"),
    ("B19025_001E", "aggregate_household_income"),
];

/// Household income brackets from B19001.
pub const INCOME_BRACKETS: &[(&str, &str)] = &[
    ("B19001_002E", "income_lt_10k"),
    ("B19001_003E", "income_10_15k"),
    ("B19001_004E", "income_15_20k"),
    ("B19001_005E", "income_20_25k"),
    ("B19001_006E", "income_25_30k"),
    ("B19001_007E", "income_30_35k"),
    ("B19001_008E", "income_35_40k"),
    ("B19001_009E", "income_40_45k"),
    ("B19001_010E", "income_45_50k"),
    ("B19001_011E", "income_50_60k"),
    ("B19001_012E", "income_60_75k"),
    ("B19001_013E", "income_75_100k"),
    ("B19001_014E", "income_100_125k"),
    ("B19001_015E", "income_125_150k"),
    ("B19001_016E", "income_150_200k"),
    ("B19001_017E", "income_200k_plus"),
];

/// Employment status universe from B23025.
pub const EMPLOYMENT: &[(&str, &str)] = &[
    ("B23025_001E", "civilian_labor_force"),
    ("B23025_002E", "employed"),
    ("B23025_003E", "unemployed"),
    ("B23025_004E", "armed_forces"),
    ("B23025_005E", "not_in_labor_force"),
];

/// Educational attainment subset of B15003. The full attainment ladder
/// is not fetched; the aggregator derives the lower tiers with a
/// documented fixed split.
pub const EDUCATION: &[(&str, &str)] = &[
    ("B15003_001E", "total_education_population"),
    ("B15003_022E", "bachelors_degree"),
    ("B15003_023E", "masters_degree"),
    ("B15003_024E", "professional_degree"),
    ("B15003_025E", "doctorate_degree"),
];

/// Housing occupancy and tenure (B25002, B25003).
pub const HOUSING: &[(&str, &str)] = &[
    ("B25002_001E", "total_housing_units"),
    ("B25002_002E", "occupied_housing_units"),
    ("B25002_003E", "vacant_housing_units"),
    ("B25003_001E", "total_tenure_units"),
    ("B25003_002E", "owner_occupied"),
    ("B25003_003E", "renter_occupied"),
];

/// Housing costs and values (B25064, B25077).
pub const COSTS: &[(&str, &str)] = &[
    ("B25064_001E", "median_gross_rent"),
    ("B25077_001E", "median_home_value"),
];

/// Gross rent as a percentage of household income, from B25070.
pub const RENT_BURDEN: &[(&str, &str)] = &[
    ("B25070_001E", "total_rent_burden"),
    ("B25070_007E", "rent_burden_30_35"),
    ("B25070_008E", "rent_burden_35_40"),
    ("B25070_009E", "rent_burden_40_50"),
    ("B25070_010E", "rent_burden_50_plus"),
];

/// All variable groups fetched for every block group.
pub const GROUPS: &[&[(&str, &str)]] = &[
    TOTALS,
    AGE_BY_SEX,
    INCOME,
    INCOME_BRACKETS,
    EMPLOYMENT,
    EDUCATION,
    HOUSING,
    COSTS,
    RENT_BURDEN,
];

/// Flattens the variable groups into one fetch list of
/// (variable ID, field name) pairs.
#[must_use]
pub fn all_variables() -> Vec<(&'static str, &'static str)> {
    GROUPS.iter().flat_map(|group| group.iter().copied()).collect()
}

/// Looks up the friendly field name for a variable ID.
#[must_use]
pub fn field_name(variable: &str) -> Option<&'static str> {
    GROUPS
        .iter()
        .flat_map(|group| group.iter())
        .find(|(var, _)| *var == variable)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn variable_ids_are_unique() {
        let all = all_variables();
        let unique: BTreeSet<&str> = all.iter().map(|(var, _)| *var).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn field_names_are_unique() {
        let all = all_variables();
        let unique: BTreeSet<&str> = all.iter().map(|(_, name)| *name).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn covers_the_full_age_table() {
        // 23 male + 23 female cells from B01001.
        assert_eq!(AGE_BY_SEX.len(), 46);
    }

    #[test]
    fn resolves_field_names() {
        assert_eq!(field_name("B01003_001E"), Some("total_population"));
        assert_eq!(field_name("B19001_017E"), Some("income_200k_plus"));
        assert_eq!(field_name("B99999_001E"), None);
    }
}
