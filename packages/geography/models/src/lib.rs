#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census block group and geographic key types.
//!
//! A block group is the smallest geography for which ACS statistics are
//! published. These types are created from a TIGERweb response for one
//! query cell, live for the duration of that request, and are never
//! persisted or shared across requests.

pub mod fips;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Composite geographic key for one block group: the state, county,
/// tract, and block-group FIPS codes that together identify it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoKey {
    /// Two-digit state FIPS code.
    pub state: String,
    /// Three-digit county FIPS code.
    pub county: String,
    /// Six-digit tract code.
    pub tract: String,
    /// One-digit block group code.
    pub block_group: String,
}

impl GeoKey {
    /// The globally-unique GEOID: state + county + tract + block group.
    #[must_use]
    pub fn geoid(&self) -> String {
        format!(
            "{}{}{}{}",
            self.state, self.county, self.tract, self.block_group
        )
    }
}

/// How much of a block group's surface falls inside the query cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapWeight {
    /// Covered area / total area of the block group, in [0, 1].
    /// Zero-area block groups yield 0, never a division by zero.
    pub fraction: f64,
    /// Absolute intersection area in km², computed in a planar projection.
    pub covered_area_km2: f64,
}

impl OverlapWeight {
    /// Recovers the block group's total area from the weight.
    ///
    /// Uses `covered / fraction`, valid whenever `fraction > 0`; returns
    /// 0 otherwise.
    #[must_use]
    pub fn total_area_km2(&self) -> f64 {
        if self.fraction > 0.0 {
            self.covered_area_km2 / self.fraction
        } else {
            0.0
        }
    }
}

/// One Census block group returned by the area lookup for a query cell.
///
/// The geometry is immutable once fetched and owned exclusively by the
/// in-flight request.
#[derive(Debug, Clone)]
pub struct BlockGroup {
    /// Composite geographic key.
    pub key: GeoKey,
    /// Boundary geometry in geographic (lon/lat) coordinates.
    pub geometry: MultiPolygon<f64>,
    /// Overlap relationship with the query cell. Always `fraction > 0`
    /// for block groups handed to the aggregator.
    pub weight: OverlapWeight,
}

impl BlockGroup {
    /// The globally-unique GEOID for this block group.
    #[must_use]
    pub fn geoid(&self) -> String {
        self.key.geoid()
    }
}

#[cfg(test)]
mod tests {
    use geo::{Coord, LineString, Polygon};

    use super::*;

    fn block_group(state: &str, county: &str, tract: &str, bg: &str) -> BlockGroup {
        let ring = LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.01, y: 0.0 },
            Coord { x: 0.01, y: 0.01 },
            Coord { x: 0.0, y: 0.01 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        BlockGroup {
            key: GeoKey {
                state: state.to_string(),
                county: county.to_string(),
                tract: tract.to_string(),
                block_group: bg.to_string(),
            },
            geometry: MultiPolygon::new(vec![Polygon::new(ring, Vec::new())]),
            weight: OverlapWeight {
                fraction: 0.5,
                covered_area_km2: 1.0,
            },
        }
    }

    #[test]
    fn geoid_concatenates_codes() {
        let bg = block_group("11", "001", "005800", "2");
        assert_eq!(bg.geoid(), "110010058002");
    }

    #[test]
    fn total_area_recovered_from_weight() {
        let weight = OverlapWeight {
            fraction: 0.25,
            covered_area_km2: 0.5,
        };
        assert!((weight.total_area_km2() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_fraction_yields_zero_total_area() {
        let weight = OverlapWeight {
            fraction: 0.0,
            covered_area_km2: 0.0,
        };
        assert!(weight.total_area_km2().abs() < f64::EPSILON);
    }

    #[test]
    fn weight_survives_cloning_with_the_block_group() {
        let bg = block_group("11", "001", "005800", "1");
        let copy = bg.clone();
        assert!((copy.weight.fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(copy.key, bg.key);
    }
}
