//! Request orchestration: coordinates → cell → block groups → tables →
//! aggregation → validation → response.
//!
//! All collaborator clients are constructed once at startup, bundled in
//! [`Collaborators`], and injected here — the pipeline holds no global
//! state. Per-block-group table failures drop that block group and the
//! request proceeds; only geocoding and area-lookup failures surface to
//! the caller, since no meaningful cell exists without them.

use std::path::PathBuf;

use gridstats_acs::{ACS_DATASET, CensusClient};
use gridstats_aggregate::{AreaRecord, aggregate_cell, validate};
use gridstats_aggregate_models::{CellMetrics, EarningsBands, JobsBySector, JobsWorkplace};
use gridstats_geocoder::GeocodeError;
use gridstats_geography::{AreaLookupError, query_block_groups};
use gridstats_geography_models::{BlockGroup, GeoKey};
use gridstats_geometry::{ProjectionError, build_cell, nominal_area_km2};
use gridstats_lodes::{DEFAULT_LODES_YEAR, LodesClient, WorkplaceStats};
use gridstats_server_models::{
    AreaInfo, CellStatsRequest, CellStatsResponse, EstimationInfo, EstimationMethod, InputEcho,
    SourcesInfo, WorkplaceSource,
};
use thiserror::Error;

/// Errors surfaced from the cell statistics pipeline.
#[derive(Debug, Error)]
pub enum CellStatsError {
    /// The request failed validation.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// The violated constraint.
        message: String,
    },

    /// Address geocoding failed — no coordinates, no cell.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// The spatial lookup failed entirely.
    #[error(transparent)]
    AreaLookup(#[from] AreaLookupError),

    /// Cell construction failed (programming-invariant violation for
    /// validated inputs).
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// The collaborator clients used by the pipeline, owned by the
/// request-handling layer.
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Shared HTTP client.
    pub http: reqwest::Client,
    /// Census geocoder base URL.
    pub geocoder_base: String,
    /// Geocoder benchmark.
    pub geocoder_benchmark: String,
    /// TIGERweb block group layer base URL.
    pub tigerweb_base: String,
    /// Census Data API client.
    pub census: CensusClient,
    /// LODES workplace data client.
    pub lodes: LodesClient,
}

impl Collaborators {
    /// Builds the collaborator bundle from the environment: the Census
    /// API key from `CENSUS_API_KEY` and the workplace flat-file cache
    /// from `GRIDSTATS_CACHE_DIR` (defaulting to the system temp dir).
    #[must_use]
    pub fn from_env(http: reqwest::Client) -> Self {
        let census = CensusClient::from_env(http.clone());
        let cache_dir = std::env::var("GRIDSTATS_CACHE_DIR").map_or_else(
            |_| std::env::temp_dir().join("gridstats_lodes"),
            PathBuf::from,
        );
        let lodes = LodesClient::new(http.clone(), cache_dir);

        Self {
            http,
            geocoder_base: gridstats_geocoder::CENSUS_GEOCODER_BASE.to_string(),
            geocoder_benchmark: gridstats_geocoder::DEFAULT_BENCHMARK.to_string(),
            tigerweb_base: gridstats_geography::TIGERWEB_BASE_URL.to_string(),
            census,
            lodes,
        }
    }
}

/// Computes the aggregated statistics for one query cell.
///
/// The aggregation math itself is synchronous and side-effect-free; the
/// async boundary exists only for the collaborator I/O this function
/// orchestrates.
///
/// # Errors
///
/// Returns [`CellStatsError`] for invalid requests, geocoding failures,
/// and total area-lookup failures. Statistical-layer failures degrade to
/// an explicit no-coverage response instead of erroring.
#[allow(clippy::future_not_send)]
pub async fn compute_cell_stats(
    collab: &Collaborators,
    request: &CellStatsRequest,
) -> Result<CellStatsResponse, CellStatsError> {
    request
        .validate()
        .map_err(|message| CellStatsError::InvalidRequest { message })?;

    let (lat, lon) = resolve_coordinates(collab, request).await?;

    let cell = build_cell(lat, lon, request.cell_km)?;
    let nominal_area = nominal_area_km2(&cell);

    let block_groups = query_block_groups(&collab.http, &collab.tigerweb_base, &cell).await?;
    if block_groups.is_empty() {
        log::warn!("no block groups intersect the query cell at ({lat}, {lon})");
        return Ok(no_coverage_response(
            collab,
            request,
            lat,
            lon,
            nominal_area,
            "no Census block groups intersect the query cell",
        ));
    }

    let keys: Vec<GeoKey> = block_groups.iter().map(|bg| bg.key.clone()).collect();
    let mut records_by_geoid = collab.census.fetch_records(request.acs_year, &keys).await;

    let mut area_records = Vec::with_capacity(block_groups.len());
    for bg in &block_groups {
        let geoid = bg.geoid();
        if let Some(fields) = records_by_geoid.remove(&geoid) {
            area_records.push(AreaRecord {
                geoid,
                fraction: bg.weight.fraction,
                covered_area_km2: bg.weight.covered_area_km2,
                fields,
            });
        } else {
            log::warn!("no field record for block group {geoid}, excluding it");
        }
    }

    if area_records.is_empty() {
        log::warn!("statistical tables unavailable for every intersecting block group");
        return Ok(no_coverage_response(
            collab,
            request,
            lat,
            lon,
            nominal_area,
            "statistical tables unavailable for every intersecting block group",
        ));
    }

    let contributing = area_records.len();
    let mut metrics = aggregate_cell(&area_records, nominal_area);
    validate(&mut metrics);

    if request.include_workplace {
        metrics.jobs_workplace =
            fetch_workplace(collab, &block_groups, request.workplace_year).await;
    }

    let notes = format!(
        "area-weighted aggregation over {contributing} intersecting block groups; \
         education tiers and units-in-structure counts are fixed-split estimates; \
         cost medians are overlap-weighted blends of per-area medians"
    );

    Ok(assemble_response(
        collab,
        request,
        lat,
        lon,
        nominal_area,
        metrics,
        EstimationMethod::BlockGroupIntersection,
        notes,
    ))
}

/// Resolves the query center, geocoding when an address was given.
#[allow(clippy::future_not_send)]
async fn resolve_coordinates(
    collab: &Collaborators,
    request: &CellStatsRequest,
) -> Result<(f64, f64), CellStatsError> {
    if let Some(address) = &request.address {
        let coords = gridstats_geocoder::geocode_oneline(
            &collab.http,
            &collab.geocoder_base,
            &collab.geocoder_benchmark,
            address,
        )
        .await?;
        return Ok(coords);
    }

    match (request.lat, request.lon) {
        (Some(lat), Some(lon)) => Ok((lat, lon)),
        _ => Err(CellStatsError::InvalidRequest {
            message: "either address or both lat/lon must be provided".to_string(),
        }),
    }
}

/// Fetches workplace statistics for the cell's state, degrading to
/// all-zero stats on failure.
#[allow(clippy::future_not_send)]
async fn fetch_workplace(
    collab: &Collaborators,
    block_groups: &[BlockGroup],
    year: Option<u16>,
) -> JobsWorkplace {
    let Some(first) = block_groups.first() else {
        return JobsWorkplace::default();
    };

    match collab.lodes.workplace_stats(&first.key.state, year).await {
        Ok(stats) => to_jobs_workplace(&stats),
        Err(e) => {
            log::warn!("workplace stats unavailable, reporting zeros: {e}");
            JobsWorkplace::default()
        }
    }
}

/// Maps the LODES client's stats shape onto the response group.
fn to_jobs_workplace(stats: &WorkplaceStats) -> JobsWorkplace {
    let band = |key: &str| stats.earnings_bands.get(key).copied().unwrap_or(0);
    let sector = |key: &str| stats.by_sector.get(key).copied().unwrap_or(0);

    JobsWorkplace {
        total_jobs: stats.total_jobs,
        earnings_bands: EarningsBands {
            e1: band("E1"),
            e2: band("E2"),
            e3: band("E3"),
        },
        by_sector: JobsBySector {
            naics_11: sector("NAICS11"),
            naics_21: sector("NAICS21"),
        },
    }
}

/// The explicit degraded mode: all-zero metrics in the full response
/// shape, labeled as such.
fn no_coverage_response(
    collab: &Collaborators,
    request: &CellStatsRequest,
    lat: f64,
    lon: f64,
    nominal_area: f64,
    notes: &str,
) -> CellStatsResponse {
    let metrics = CellMetrics {
        nominal_area_km2: nominal_area,
        ..Default::default()
    };
    assemble_response(
        collab,
        request,
        lat,
        lon,
        nominal_area,
        metrics,
        EstimationMethod::NoCoverage,
        notes.to_string(),
    )
}

/// Shapes the pipeline output into the published response structure.
#[allow(clippy::too_many_arguments)]
fn assemble_response(
    collab: &Collaborators,
    request: &CellStatsRequest,
    lat: f64,
    lon: f64,
    nominal_area: f64,
    metrics: CellMetrics,
    method: EstimationMethod,
    notes: String,
) -> CellStatsResponse {
    CellStatsResponse {
        input: InputEcho {
            address: request.address.clone(),
            lat,
            lon,
            cell_km: request.cell_km,
            acs_year: request.acs_year,
            include_workplace: request.include_workplace,
            workplace_year: request.workplace_year,
        },
        area: AreaInfo::polygon(nominal_area),
        sources: SourcesInfo {
            acs_dataset: ACS_DATASET.to_string(),
            acs_year: request.acs_year,
            area_lookup_layer: "tigerWMS_Current/MapServer/10".to_string(),
            geocoder_benchmark: collab.geocoder_benchmark.clone(),
            workplace: WorkplaceSource {
                enabled: request.include_workplace,
                year: request.workplace_year.unwrap_or(DEFAULT_LODES_YEAR),
            },
        },
        estimation: EstimationInfo { method, notes },
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn collaborators() -> Collaborators {
        Collaborators::from_env(reqwest::Client::new())
    }

    fn coords_request() -> CellStatsRequest {
        CellStatsRequest {
            address: None,
            lat: Some(38.9072),
            lon: Some(-77.0369),
            cell_km: 1.0,
            acs_year: 2023,
            include_workplace: false,
            workplace_year: None,
        }
    }

    #[test]
    fn no_coverage_response_keeps_the_full_shape() {
        let response = no_coverage_response(
            &collaborators(),
            &coords_request(),
            38.9072,
            -77.0369,
            1.0,
            "no Census block groups intersect the query cell",
        );

        assert_eq!(response.estimation.method, EstimationMethod::NoCoverage);
        assert_eq!(response.metrics.population.total, 0);
        assert!(!response.metrics.validation.employment_mismatch);
        assert!(!response.metrics.validation.income_suspicious);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metrics"]["income"]["brackets"]["lt10k"], 0);
        assert_eq!(json["metrics"]["housing"]["tenure"]["owner"], 0);
        assert_eq!(
            json["metrics"]["landUseContext"],
            "Low density residential/commercial/institutional"
        );
    }

    #[test]
    fn jobs_mapping_covers_bands_and_sectors() {
        let mut stats = WorkplaceStats::zero();
        stats.total_jobs = 200;
        stats.earnings_bands = BTreeMap::from([
            ("E1".to_string(), 50),
            ("E2".to_string(), 80),
            ("E3".to_string(), 70),
        ]);
        stats.by_sector =
            BTreeMap::from([("NAICS11".to_string(), 5), ("NAICS21".to_string(), 3)]);

        let jobs = to_jobs_workplace(&stats);
        assert_eq!(jobs.total_jobs, 200);
        assert_eq!(jobs.earnings_bands.e1, 50);
        assert_eq!(jobs.earnings_bands.e3, 70);
        assert_eq!(jobs.by_sector.naics_11, 5);
        assert_eq!(jobs.by_sector.naics_21, 3);
    }

    #[test]
    fn assembled_response_echoes_the_request() {
        let request = CellStatsRequest {
            include_workplace: true,
            workplace_year: Some(2021),
            ..coords_request()
        };
        let response = assemble_response(
            &collaborators(),
            &request,
            38.9072,
            -77.0369,
            1.0,
            CellMetrics::default(),
            EstimationMethod::BlockGroupIntersection,
            "notes".to_string(),
        );

        assert!((response.input.cell_km - 1.0).abs() < f64::EPSILON);
        assert_eq!(response.input.acs_year, 2023);
        assert!(response.input.include_workplace);
        assert_eq!(response.sources.workplace.year, 2021);
        assert_eq!(response.area.kind, "Polygon");
        assert_eq!(response.sources.acs_dataset, "acs/acs5");
    }
}
