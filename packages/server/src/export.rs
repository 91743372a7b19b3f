//! Vertical CSV export of a cell statistics response.
//!
//! Produces a two-column `Field,Value` layout with blank separator rows
//! between statistic groups — one row per leaf, readable in any
//! spreadsheet without transposition.

use gridstats_server_models::CellStatsResponse;

/// Renders the response as a vertical `Field,Value` CSV document.
///
/// # Errors
///
/// Returns [`csv::Error`] if a record fails to serialize (not expected
/// for in-memory writes).
#[allow(clippy::too_many_lines)]
pub fn response_to_csv(response: &CellStatsResponse) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let metrics = &response.metrics;

    let mut row = |field: &str, value: String| -> Result<(), csv::Error> {
        writer.write_record([field, value.as_str()])
    };

    row("Field", "Value".to_string())?;
    row(
        "Address",
        response.input.address.clone().unwrap_or_default(),
    )?;
    row("Latitude", format!("{:.6}", response.input.lat))?;
    row("Longitude", format!("{:.6}", response.input.lon))?;
    row("Cell Size (km)", response.input.cell_km.to_string())?;
    row("ACS Year", response.input.acs_year.to_string())?;
    row("Estimation Method", format!("{:?}", response.estimation.method))?;
    row("", String::new())?;

    row("POPULATION", String::new())?;
    row("Total Population", metrics.population.total.to_string())?;
    row(
        "Population Density (per km2)",
        format!("{:.1}", metrics.population.density_per_km2),
    )?;
    row("Land Use Context", metrics.land_use_context.label().to_string())?;
    let age = &metrics.population.age;
    row("Age 0-4", age.age_0_4.to_string())?;
    row("Age 5-14", age.age_5_14.to_string())?;
    row("Age 15-24", age.age_15_24.to_string())?;
    row("Age 25-44", age.age_25_44.to_string())?;
    row("Age 45-64", age.age_45_64.to_string())?;
    row("Age 65+", age.age_65_plus.to_string())?;
    row("", String::new())?;

    row("HOUSEHOLDS", String::new())?;
    row("Total Households", metrics.households.total.to_string())?;
    row(
        "Avg Household Size",
        format!("{:.2}", metrics.households.avg_size.overall),
    )?;
    row("", String::new())?;

    row("INCOME", String::new())?;
    row("Median Income", metrics.income.median.to_string())?;
    row("Mean Income", metrics.income.mean.to_string())?;
    row("", String::new())?;

    row("EMPLOYMENT", String::new())?;
    row("Labor Force", metrics.employment.labor_force.to_string())?;
    row("Employed", metrics.employment.employed.to_string())?;
    row("Unemployed", metrics.employment.unemployed.to_string())?;
    row(
        "Employment Rate",
        format!("{:.1}%", metrics.employment.employment_rate * 100.0),
    )?;
    row("", String::new())?;

    row("EDUCATION (estimated)", String::new())?;
    row("High School or Less", metrics.education.hs_or_less.to_string())?;
    row("Some College", metrics.education.some_college.to_string())?;
    row("Bachelor's or Higher", metrics.education.ba_plus.to_string())?;
    row("", String::new())?;

    row("HOUSING", String::new())?;
    row("Total Housing Units", metrics.housing.units_total.to_string())?;
    row("Occupied Units", metrics.housing.occupied.to_string())?;
    row("Vacant Units", metrics.housing.vacant.to_string())?;
    row("Owner Occupied", metrics.housing.tenure.owner.to_string())?;
    row("Renter Occupied", metrics.housing.tenure.renter.to_string())?;
    row("", String::new())?;

    row("COSTS", String::new())?;
    row("Median Gross Rent", metrics.costs.median_gross_rent.to_string())?;
    row("Median Home Value", metrics.costs.median_home_value.to_string())?;
    row(
        "Rent Burden >30%",
        format!("{:.1}%", metrics.costs.rent_burden_pct.gt_30),
    )?;
    row(
        "Rent Burden >50%",
        format!("{:.1}%", metrics.costs.rent_burden_pct.gt_50),
    )?;
    row("", String::new())?;

    row("INCOME BRACKETS", String::new())?;
    let brackets = &metrics.income.brackets;
    row("Less than $10k", brackets.lt_10k.to_string())?;
    row("$10k - $15k", brackets.from_10_to_15k.to_string())?;
    row("$15k - $25k", brackets.from_15_to_25k.to_string())?;
    row("$25k - $35k", brackets.from_25_to_35k.to_string())?;
    row("$35k - $50k", brackets.from_35_to_50k.to_string())?;
    row("$50k - $75k", brackets.from_50_to_75k.to_string())?;
    row("$75k - $100k", brackets.from_75_to_100k.to_string())?;
    row("$100k - $125k", brackets.from_100_to_125k.to_string())?;
    row("$125k - $150k", brackets.from_125_to_150k.to_string())?;
    row("$150k - $200k", brackets.from_150_to_200k.to_string())?;
    row("$200k+", brackets.gte_200k.to_string())?;
    row("", String::new())?;

    row("JOBS (WORKPLACE)", String::new())?;
    row("Total Jobs", metrics.jobs_workplace.total_jobs.to_string())?;
    row("", String::new())?;

    row("Coverage Ratio", format!("{:.3}", metrics.coverage_ratio))?;
    row(
        "Validation Note",
        metrics.validation.validation_note.clone(),
    )?;

    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use gridstats_aggregate_models::CellMetrics;
    use gridstats_server_models::{
        AreaInfo, CellStatsRequest, EstimationInfo, EstimationMethod, InputEcho, SourcesInfo,
        WorkplaceSource,
    };

    use super::*;

    fn response() -> CellStatsResponse {
        let mut metrics = CellMetrics::default();
        metrics.population.total = 1250;
        metrics.income.median = 75_000;
        metrics.costs.rent_burden_pct.gt_30 = 38.5;

        let request = CellStatsRequest {
            address: Some("1600 Pennsylvania Ave NW".to_string()),
            lat: None,
            lon: None,
            cell_km: 1.0,
            acs_year: 2023,
            include_workplace: false,
            workplace_year: None,
        };

        CellStatsResponse {
            input: InputEcho {
                address: request.address.clone(),
                lat: 38.9072,
                lon: -77.0369,
                cell_km: request.cell_km,
                acs_year: request.acs_year,
                include_workplace: false,
                workplace_year: None,
            },
            area: AreaInfo::polygon(1.0),
            sources: SourcesInfo {
                acs_dataset: "acs/acs5".to_string(),
                acs_year: 2023,
                area_lookup_layer: "tigerWMS_Current/MapServer/10".to_string(),
                geocoder_benchmark: "Public_AR_Current".to_string(),
                workplace: WorkplaceSource {
                    enabled: false,
                    year: 2022,
                },
            },
            estimation: EstimationInfo {
                method: EstimationMethod::BlockGroupIntersection,
                notes: String::new(),
            },
            metrics,
        }
    }

    #[test]
    fn renders_field_value_rows() {
        let csv = response_to_csv(&response()).unwrap();
        assert!(csv.starts_with("Field,Value\n"));
        assert!(csv.contains("Total Population,1250\n"));
        assert!(csv.contains("Median Income,75000\n"));
        assert!(csv.contains("Rent Burden >30%,38.5%\n"));
        assert!(csv.contains("Address,1600 Pennsylvania Ave NW\n"));
    }

    #[test]
    fn zero_response_still_renders_every_section() {
        let mut response = response();
        response.metrics = CellMetrics::default();
        let csv = response_to_csv(&response).unwrap();

        for section in [
            "POPULATION",
            "HOUSEHOLDS",
            "INCOME",
            "EMPLOYMENT",
            "HOUSING",
            "COSTS",
            "INCOME BRACKETS",
        ] {
            assert!(csv.contains(section), "missing section {section}");
        }
        assert!(csv.contains("$200k+,0\n"));
    }
}
