#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! US Census Bureau geocoder client.
//!
//! Resolves a one-line address to WGS84 coordinates via the free Census
//! geocoding service (no API key required):
//! `GET /geocoder/locations/onelineaddress`.
//!
//! See <https://geocoding.geo.census.gov/geocoder/Geocoding_Services_API.html>

use thiserror::Error;

/// Default Census geocoder endpoint.
pub const CENSUS_GEOCODER_BASE: &str = "https://geocoding.geo.census.gov/geocoder";

/// Default geocoding benchmark.
pub const DEFAULT_BENCHMARK: &str = "Public_AR_Current";

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] gridstats_fetch::FetchError),

    /// Response parsing failed.
    #[error("parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No match was found for the address.
    #[error("no geocoder match for address: {address}")]
    NoMatch {
        /// The address that failed to resolve.
        address: String,
    },
}

/// Geocodes a one-line address, returning `(latitude, longitude)`.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request fails, the response is
/// malformed, or the service finds no match — a cell cannot be computed
/// without coordinates, so none of these are swallowed.
#[allow(clippy::future_not_send)]
pub async fn geocode_oneline(
    client: &reqwest::Client,
    base_url: &str,
    benchmark: &str,
    address: &str,
) -> Result<(f64, f64), GeocodeError> {
    let url = format!("{base_url}/locations/onelineaddress");
    let params = [
        ("address", address),
        ("benchmark", benchmark),
        ("format", "json"),
    ];

    let body = gridstats_fetch::send_json(|| client.get(&url).query(&params)).await?;
    let (lat, lon) = parse_oneline_response(&body)?.ok_or_else(|| GeocodeError::NoMatch {
        address: address.to_string(),
    })?;

    log::info!("geocoded '{address}' to ({lat}, {lon})");
    Ok((lat, lon))
}

/// Parses the JSON response from the one-line-address endpoint.
///
/// Returns `Ok(None)` when the service responded correctly but matched
/// nothing.
fn parse_oneline_response(body: &serde_json::Value) -> Result<Option<(f64, f64)>, GeocodeError> {
    let matches = body["result"]["addressMatches"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing addressMatches array".to_string(),
        })?;

    let Some(first) = matches.first() else {
        return Ok(None);
    };

    let x = first["coordinates"]["x"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing x coordinate".to_string(),
        })?;
    let y = first["coordinates"]["y"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "missing y coordinate".to_string(),
        })?;

    // The geocoder returns x=longitude, y=latitude.
    Ok(Some((y, x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_match() {
        let body = serde_json::json!({
            "result": {
                "addressMatches": [{
                    "coordinates": { "x": -76.927_487, "y": 38.846_016 },
                    "matchedAddress": "4600 SILVER HILL RD, WASHINGTON, DC, 20233"
                }]
            }
        });
        let (lat, lon) = parse_oneline_response(&body).unwrap().unwrap();
        assert!((lat - 38.846_016).abs() < 1e-6);
        assert!((lon - -76.927_487).abs() < 1e-6);
    }

    #[test]
    fn no_match_is_none() {
        let body = serde_json::json!({
            "result": { "addressMatches": [] }
        });
        assert!(parse_oneline_response(&body).unwrap().is_none());
    }

    #[test]
    fn malformed_response_is_parse_error() {
        let body = serde_json::json!({ "result": {} });
        assert!(matches!(
            parse_oneline_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn missing_coordinates_is_parse_error() {
        let body = serde_json::json!({
            "result": { "addressMatches": [{ "matchedAddress": "somewhere" }] }
        });
        assert!(matches!(
            parse_oneline_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
