#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the gridstats server.

use gridstats_aggregate_models::CellMetrics;
use serde::{Deserialize, Serialize};

/// Smallest accepted cell side length in km.
pub const MIN_CELL_KM: f64 = 0.1;

/// Largest accepted cell side length in km.
pub const MAX_CELL_KM: f64 = 10.0;

/// Earliest supported ACS 5-year vintage.
pub const MIN_ACS_YEAR: u16 = 2010;

/// Latest supported ACS 5-year vintage.
pub const MAX_ACS_YEAR: u16 = 2023;

const fn default_cell_km() -> f64 {
    1.0
}

const fn default_acs_year() -> u16 {
    MAX_ACS_YEAR
}

/// Request body for `POST /api/cell_stats`.
///
/// The query location is either a one-line `address` or both `lat` and
/// `lon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStatsRequest {
    /// One-line address to geocode.
    #[serde(default)]
    pub address: Option<String>,
    /// Center latitude (WGS84).
    #[serde(default)]
    pub lat: Option<f64>,
    /// Center longitude (WGS84).
    #[serde(default)]
    pub lon: Option<f64>,
    /// Cell side length in km.
    #[serde(default = "default_cell_km")]
    pub cell_km: f64,
    /// ACS 5-year vintage.
    #[serde(default = "default_acs_year")]
    pub acs_year: u16,
    /// Whether to include workplace job statistics.
    #[serde(default)]
    pub include_workplace: bool,
    /// Workplace data year (defaults to the latest available).
    #[serde(default)]
    pub workplace_year: Option<u16>,
}

impl CellStatsRequest {
    /// Checks the request for a usable location and in-range parameters.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        let has_coords = self.lat.is_some() && self.lon.is_some();
        if self.address.is_none() && !has_coords {
            return Err("either address or both lat/lon must be provided".to_string());
        }

        if let Some(lat) = self.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("lat {lat} outside [-90, 90]"));
            }
        }
        if let Some(lon) = self.lon {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("lon {lon} outside [-180, 180]"));
            }
        }

        if !(MIN_CELL_KM..=MAX_CELL_KM).contains(&self.cell_km) {
            return Err(format!(
                "cellKm {} outside [{MIN_CELL_KM}, {MAX_CELL_KM}]",
                self.cell_km
            ));
        }

        if !(MIN_ACS_YEAR..=MAX_ACS_YEAR).contains(&self.acs_year) {
            return Err(format!(
                "acsYear {} outside [{MIN_ACS_YEAR}, {MAX_ACS_YEAR}]",
                self.acs_year
            ));
        }

        Ok(())
    }
}

/// Echo of the resolved request inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEcho {
    /// Address as given, if any.
    pub address: Option<String>,
    /// Resolved center latitude.
    pub lat: f64,
    /// Resolved center longitude.
    pub lon: f64,
    /// Cell side length in km.
    pub cell_km: f64,
    /// ACS vintage used.
    pub acs_year: u16,
    /// Whether workplace statistics were requested.
    pub include_workplace: bool,
    /// Workplace data year, if pinned.
    pub workplace_year: Option<u16>,
}

/// Geometry summary of the query cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaInfo {
    /// Geometry type of the cell (always "Polygon").
    #[serde(rename = "type")]
    pub kind: String,
    /// Nominal cell area in km².
    pub area_km2: f64,
    /// Coordinate reference system of the cell ring.
    pub crs: String,
}

impl AreaInfo {
    /// Builds the standard cell geometry summary.
    #[must_use]
    pub fn polygon(area_km2: f64) -> Self {
        Self {
            kind: "Polygon".to_string(),
            area_km2,
            crs: "EPSG:4326".to_string(),
        }
    }
}

/// Workplace data source summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkplaceSource {
    /// Whether workplace statistics were requested.
    pub enabled: bool,
    /// Year used for workplace statistics.
    pub year: u16,
}

/// Upstream data sources consulted for the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesInfo {
    /// Statistical dataset path.
    pub acs_dataset: String,
    /// ACS vintage.
    pub acs_year: u16,
    /// Spatial lookup layer.
    pub area_lookup_layer: String,
    /// Geocoder benchmark.
    pub geocoder_benchmark: String,
    /// Workplace source summary.
    pub workplace: WorkplaceSource,
}

/// Which estimation path produced the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Full areal interpolation over intersecting block groups.
    BlockGroupIntersection,
    /// No block group contributed — every metric is zero. An explicit
    /// degraded mode, never synthesized numbers.
    NoCoverage,
}

/// Estimation metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationInfo {
    /// Which estimation path produced the metrics.
    pub method: EstimationMethod,
    /// Human-readable notes, including flagged approximations.
    pub notes: String,
}

/// Response body for `POST /api/cell_stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStatsResponse {
    /// Echo of the resolved inputs.
    pub input: InputEcho,
    /// Cell geometry summary.
    pub area: AreaInfo,
    /// Upstream sources consulted.
    pub sources: SourcesInfo,
    /// Estimation metadata.
    pub estimation: EstimationInfo,
    /// The aggregated statistics.
    pub metrics: CellMetrics,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// `GET /api/version` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    /// Crate version.
    pub version: String,
    /// API version label.
    pub api_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn accepts_coordinates_or_address() {
        assert!(coords_request().validate().is_ok());

        let address = CellStatsRequest {
            address: Some("1600 Pennsylvania Ave NW, Washington, DC".to_string()),
            lat: None,
            lon: None,
            ..coords_request()
        };
        assert!(address.validate().is_ok());
    }

    #[test]
    fn rejects_missing_location() {
        let request = CellStatsRequest {
            address: None,
            lat: None,
            lon: None,
            ..coords_request()
        };
        assert!(request.validate().is_err());

        let only_lat = CellStatsRequest {
            lon: None,
            ..coords_request()
        };
        assert!(only_lat.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let bad_lat = CellStatsRequest {
            lat: Some(95.0),
            ..coords_request()
        };
        assert!(bad_lat.validate().is_err());

        let bad_cell = CellStatsRequest {
            cell_km: 50.0,
            ..coords_request()
        };
        assert!(bad_cell.validate().is_err());

        let bad_year = CellStatsRequest {
            acs_year: 2005,
            ..coords_request()
        };
        assert!(bad_year.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let request: CellStatsRequest =
            serde_json::from_str(r#"{"lat": 38.9, "lon": -77.0}"#).unwrap();
        assert!((request.cell_km - 1.0).abs() < f64::EPSILON);
        assert_eq!(request.acs_year, 2023);
        assert!(!request.include_workplace);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn area_info_carries_fixed_labels() {
        let area = AreaInfo::polygon(1.0);
        let json = serde_json::to_value(&area).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["crs"], "EPSG:4326");
    }

    #[test]
    fn estimation_method_serializes_snake_case() {
        let json = serde_json::to_value(EstimationMethod::BlockGroupIntersection).unwrap();
        assert_eq!(json, "block_group_intersection");
        let json = serde_json::to_value(EstimationMethod::NoCoverage).unwrap();
        assert_eq!(json, "no_coverage");
    }
}
