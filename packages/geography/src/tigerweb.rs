//! `TIGERweb` `ArcGIS` REST client for Census block groups.
//!
//! Issues a spatial-intersects query against the current-vintage block
//! group layer with the query cell as an Esri JSON polygon, and parses
//! the `GeoJSON` feature response into [`BlockGroup`]s with resolved
//! overlap weights.

use geo::{MultiPolygon, Polygon};
use gridstats_geography_models::{BlockGroup, GeoKey};

use crate::{AreaLookupError, resolve_overlap};

/// Current-vintage Census block group layer.
pub const TIGERWEB_BASE_URL: &str =
    "https://tigerweb.geo.census.gov/arcgis/rest/services/TIGERweb/tigerWMS_Current/MapServer/10";

/// Maximum number of features requested per query. A query cell spans at
/// most a few dozen block groups, so one page always suffices.
const MAX_RECORD_COUNT: u32 = 1000;

/// Browser-like User-Agent to avoid WAF blocks on `TIGERweb`.
const TIGERWEB_USER_AGENT: &str = "Mozilla/5.0 (compatible; GridStats/1.0; +https://github.com)";

/// Builds a `reqwest::Client` configured for `TIGERweb` requests. Every
/// request carries a bounded timeout so no pipeline step can block
/// indefinitely.
///
/// # Errors
///
/// Returns [`AreaLookupError`] if the client cannot be built.
pub fn build_tigerweb_client() -> Result<reqwest::Client, AreaLookupError> {
    reqwest::Client::builder()
        .user_agent(TIGERWEB_USER_AGENT)
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .map_err(|e| AreaLookupError::Service {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Queries `TIGERweb` for block groups intersecting the query cell.
///
/// Block groups whose resolved overlap fraction is zero are discarded —
/// they have no observable contribution to the cell. An empty result is
/// valid, not an error.
///
/// # Errors
///
/// Returns [`AreaLookupError`] if the HTTP request fails or the service
/// returns an error object or a response without features.
#[allow(clippy::future_not_send)]
pub async fn query_block_groups(
    client: &reqwest::Client,
    base_url: &str,
    cell: &Polygon<f64>,
) -> Result<Vec<BlockGroup>, AreaLookupError> {
    let geometry = polygon_to_esri_json(cell);
    let url = format!("{base_url}/query");

    let params = [
        ("f", "geojson".to_string()),
        ("where", "1=1".to_string()),
        ("geometry", geometry.to_string()),
        ("geometryType", "esriGeometryPolygon".to_string()),
        ("inSR", "4326".to_string()),
        ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ("outFields", "GEOID,STATE,COUNTY,TRACT,BLKGRP".to_string()),
        ("returnGeometry", "true".to_string()),
        ("maxRecordCount", MAX_RECORD_COUNT.to_string()),
    ];

    let body = gridstats_fetch::send_json(|| client.get(&url).query(&params)).await?;

    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown TIGERweb error");
        return Err(AreaLookupError::Service {
            message: message.to_string(),
        });
    }

    let block_groups = parse_block_groups(&body, cell)?;
    log::info!("found {} intersecting block groups", block_groups.len());

    Ok(block_groups)
}

/// Converts the cell polygon to an Esri JSON geometry object.
fn polygon_to_esri_json(polygon: &Polygon<f64>) -> serde_json::Value {
    let ring: Vec<[f64; 2]> = polygon.exterior().0.iter().map(|c| [c.x, c.y]).collect();

    serde_json::json!({
        "rings": [ring],
        "spatialReference": { "wkid": 4326 },
    })
}

/// Parses a `GeoJSON` feature collection into block groups with resolved
/// overlap weights.
///
/// Individual features with missing attributes or unparseable geometry
/// are logged and skipped; a response without a `features` array is an
/// error.
fn parse_block_groups(
    body: &serde_json::Value,
    cell: &Polygon<f64>,
) -> Result<Vec<BlockGroup>, AreaLookupError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| AreaLookupError::Service {
            message: "no features array in TIGERweb response".to_string(),
        })?;

    let mut block_groups = Vec::new();

    for feature in features {
        let props = &feature["properties"];
        let key = GeoKey {
            state: string_prop(props, "STATE"),
            county: string_prop(props, "COUNTY"),
            tract: string_prop(props, "TRACT"),
            block_group: string_prop(props, "BLKGRP"),
        };

        let Some(geometry) = parse_feature_geometry(&feature["geometry"]) else {
            log::warn!("skipping block group {} with bad geometry", key.geoid());
            continue;
        };

        let weight = resolve_overlap(&geometry, cell);
        if weight.fraction <= 0.0 {
            continue;
        }

        block_groups.push(BlockGroup {
            key,
            geometry,
            weight,
        });
    }

    Ok(block_groups)
}

fn string_prop(props: &serde_json::Value, name: &str) -> String {
    props
        .get(name)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parses a `GeoJSON` geometry value into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn parse_feature_geometry(value: &serde_json::Value) -> Option<MultiPolygon<f64>> {
    let geometry: geojson::Geometry = serde_json::from_value(value.clone()).ok()?;
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        _ => None,
    }
}
