#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census Data API client for ACS 5-year block group tables.
//!
//! Fetches the variable inventory in [`variables`] for a batch of block
//! groups, chunking variable lists at the API's 50-per-request limit and
//! grouping geographies by state/county/tract so one geography clause
//! serves many variable chunks. Chunk failures are logged and skipped —
//! a transiently missing tract must not fail the whole batch.

pub mod record;
pub mod variables;

use std::collections::BTreeMap;

use futures::StreamExt as _;
use gridstats_geography_models::GeoKey;
use thiserror::Error;

pub use record::{FieldRecord, parse_count};

/// Default Census Data API endpoint.
pub const CENSUS_API_BASE: &str = "https://api.census.gov/data";

/// ACS dataset path used for every table fetch.
pub const ACS_DATASET: &str = "acs/acs5";

/// Maximum variables per request (Census Data API limit).
pub const VARIABLE_CHUNK_SIZE: usize = 50;

/// Maximum concurrent table requests in flight.
const MAX_CONCURRENT_FETCHES: usize = 4;

/// Errors from the statistical table service.
#[derive(Debug, Error)]
pub enum TableFetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] gridstats_fetch::FetchError),

    /// The response was not the expected header-row + data-rows array.
    #[error("malformed table response: {message}")]
    Malformed {
        /// Description of the malformed shape.
        message: String,
    },
}

/// Client for the Census Data API.
///
/// Constructed once at startup and injected into the request pipeline —
/// never a process-wide singleton. The API key is optional; keyless
/// requests are rate limited by the service.
#[derive(Debug, Clone)]
pub struct CensusClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CensusClient {
    /// Creates a client against the given API base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::warn!("no Census API key configured; requests may be rate limited");
        }
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Creates a client against the production endpoint, reading the API
    /// key from the `CENSUS_API_KEY` environment variable.
    #[must_use]
    pub fn from_env(http: reqwest::Client) -> Self {
        Self::new(http, CENSUS_API_BASE, std::env::var("CENSUS_API_KEY").ok())
    }

    /// Fetches the full variable inventory for a batch of block groups.
    ///
    /// Returns a map from GEOID to [`FieldRecord`]. Geographies are
    /// grouped by (state, county, tract); the variable list is chunked at
    /// [`VARIABLE_CHUNK_SIZE`]; chunk requests run concurrently, bounded
    /// at a small in-flight limit. A failed chunk logs a warning and is
    /// skipped, so block groups it would have filled simply end up with
    /// fewer (or zero) fields — partial success, never total failure.
    pub async fn fetch_records(&self, year: u16, keys: &[GeoKey]) -> BTreeMap<String, FieldRecord> {
        let variables = variables::all_variables();
        let requests = self.build_requests(year, keys, &variables);

        let mut results: BTreeMap<String, FieldRecord> = BTreeMap::new();

        let mut responses = futures::stream::iter(requests.into_iter().map(|url| {
            let http = self.http.clone();
            async move {
                let outcome = gridstats_fetch::send_json(|| http.get(&url)).await;
                (url, outcome)
            }
        }))
        .buffer_unordered(MAX_CONCURRENT_FETCHES);

        while let Some((url, outcome)) = responses.next().await {
            match outcome {
                Ok(body) => {
                    if let Err(e) = merge_table_response(&body, &mut results) {
                        log::warn!("skipping malformed table response from {url}: {e}");
                    }
                }
                Err(e) => {
                    log::warn!("table fetch failed, skipping chunk: {e}");
                }
            }
        }

        log::info!(
            "fetched field records for {} of {} block groups",
            results.len(),
            keys.len()
        );

        results
    }

    /// Builds one request URL per (tract group × variable chunk).
    fn build_requests(
        &self,
        year: u16,
        keys: &[GeoKey],
        variables: &[(&str, &str)],
    ) -> Vec<String> {
        // Group block-group codes under their (state, county, tract) so a
        // single geography clause serves every variable chunk.
        let mut tract_groups: BTreeMap<(String, String, String), Vec<String>> = BTreeMap::new();
        for key in keys {
            tract_groups
                .entry((key.state.clone(), key.county.clone(), key.tract.clone()))
                .or_default()
                .push(key.block_group.clone());
        }

        let mut urls = Vec::new();

        for ((state, county, tract), mut block_groups) in tract_groups {
            block_groups.sort();
            block_groups.dedup();
            let bg_list = block_groups.join(",");

            for chunk in variables.chunks(VARIABLE_CHUNK_SIZE) {
                let get_list = chunk
                    .iter()
                    .map(|(var, _)| *var)
                    .collect::<Vec<_>>()
                    .join(",");

                let mut url = format!(
                    "{base}/{year}/{dataset}?get={get_list}\
                     &for=block%20group:{bg_list}\
                     &in=state:{state}%20county:{county}%20tract:{tract}",
                    base = self.base_url,
                    dataset = ACS_DATASET,
                );
                if let Some(key) = &self.api_key {
                    url.push_str("&key=");
                    url.push_str(key);
                }
                urls.push(url);
            }
        }

        urls
    }
}

/// Merges one table response (header row + data rows) into the results
/// map, keyed by GEOID.
///
/// # Errors
///
/// Returns [`TableFetchError::Malformed`] if the response is not an
/// array of rows with the geography columns present.
fn merge_table_response(
    body: &serde_json::Value,
    results: &mut BTreeMap<String, FieldRecord>,
) -> Result<(), TableFetchError> {
    let rows = body
        .as_array()
        .ok_or_else(|| TableFetchError::Malformed {
            message: "response is not an array".to_string(),
        })?;

    let [header, data @ ..] = rows.as_slice() else {
        return Err(TableFetchError::Malformed {
            message: "response has no header row".to_string(),
        });
    };

    let header: Vec<&str> = header
        .as_array()
        .ok_or_else(|| TableFetchError::Malformed {
            message: "header row is not an array".to_string(),
        })?
        .iter()
        .map(|v| v.as_str().unwrap_or_default())
        .collect();

    let geo_column = |name: &str| -> Result<usize, TableFetchError> {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| TableFetchError::Malformed {
                message: format!("missing geography column {name}"),
            })
    };

    let state_idx = geo_column("state")?;
    let county_idx = geo_column("county")?;
    let tract_idx = geo_column("tract")?;
    let bg_idx = geo_column("block group")?;

    for row in data {
        let Some(cells) = row.as_array() else {
            continue;
        };

        let cell_str = |idx: usize| cells.get(idx).and_then(|v| v.as_str()).unwrap_or_default();
        let geoid = format!(
            "{}{}{}{}",
            cell_str(state_idx),
            cell_str(county_idx),
            cell_str(tract_idx),
            cell_str(bg_idx)
        );
        if geoid.is_empty() {
            continue;
        }

        let record = results.entry(geoid).or_default();
        for (idx, column) in header.iter().enumerate() {
            if let Some(field) = variables::field_name(column) {
                if let Some(cell) = cells.get(idx) {
                    record.insert(field, parse_count(cell));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn key(state: &str, county: &str, tract: &str, bg: &str) -> GeoKey {
        GeoKey {
            state: state.to_string(),
            county: county.to_string(),
            tract: tract.to_string(),
            block_group: bg.to_string(),
        }
    }

    #[test]
    fn chunks_variables_and_groups_tracts() {
        let client = CensusClient::new(reqwest::Client::new(), "https://example.test/data", None);
        let keys = vec![
            key("11", "001", "005800", "1"),
            key("11", "001", "005800", "2"),
            key("11", "001", "005900", "1"),
        ];
        let variables = variables::all_variables();
        let urls = client.build_requests(2023, &keys, &variables);

        let chunks_per_tract = variables.len().div_ceil(VARIABLE_CHUNK_SIZE);
        assert_eq!(urls.len(), 2 * chunks_per_tract);
        assert!(urls.iter().any(|u| u.contains("block%20group:1,2")));
        assert!(
            urls.iter()
                .all(|u| u.contains("in=state:11%20county:001%20tract:")),
        );
    }

    #[test]
    fn appends_api_key_when_configured() {
        let client = CensusClient::new(
            reqwest::Client::new(),
            "https://example.test/data",
            Some("secret".to_string()),
        );
        let keys = vec![key("11", "001", "005800", "1")];
        let urls = client.build_requests(2023, &keys, &[("B01003_001E", "total_population")]);
        assert!(urls.iter().all(|u| u.ends_with("&key=secret")));
    }

    #[test]
    fn merges_header_row_response() {
        let body = json!([
            ["B01003_001E", "B11001_001E", "state", "county", "tract", "block group"],
            ["1250", "480", "11", "001", "005800", "2"],
            ["900", "", "11", "001", "005800", "3"]
        ]);
        let mut results = BTreeMap::new();
        merge_table_response(&body, &mut results).unwrap();

        assert_eq!(results.len(), 2);
        let first = &results["110010058002"];
        assert!((first.get("total_population") - 1250.0).abs() < f64::EPSILON);
        assert!((first.get("total_households") - 480.0).abs() < f64::EPSILON);

        // Empty cell coerces to 0, not an error.
        let second = &results["110010058003"];
        assert!(second.get("total_households").abs() < f64::EPSILON);
    }

    #[test]
    fn merges_chunks_for_the_same_geoid() {
        let mut results = BTreeMap::new();
        merge_table_response(
            &json!([
                ["B01003_001E", "state", "county", "tract", "block group"],
                ["1250", "11", "001", "005800", "2"]
            ]),
            &mut results,
        )
        .unwrap();
        merge_table_response(
            &json!([
                ["B23025_001E", "state", "county", "tract", "block group"],
                ["600", "11", "001", "005800", "2"]
            ]),
            &mut results,
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        let record = &results["110010058002"];
        assert!((record.get("total_population") - 1250.0).abs() < f64::EPSILON);
        assert!((record.get("civilian_labor_force") - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_responses() {
        let mut results = BTreeMap::new();
        assert!(merge_table_response(&json!({"error": "nope"}), &mut results).is_err());
        assert!(merge_table_response(&json!([]), &mut results).is_err());
        assert!(
            merge_table_response(&json!([["B01003_001E", "state"]]), &mut results).is_err(),
            "header without geography columns"
        );
    }

    #[test]
    fn negative_sentinel_cells_coerce_to_zero() {
        let body = json!([
            ["B19013_001E", "state", "county", "tract", "block group"],
            ["-666666666", "11", "001", "005800", "2"]
        ]);
        let mut results = BTreeMap::new();
        merge_table_response(&body, &mut results).unwrap();
        assert!(results["110010058002"].get("median_household_income").abs() < f64::EPSILON);
    }
}
