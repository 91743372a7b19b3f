#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grid cell construction and projection-aware polygon area math.
//!
//! All intersection-accurate work happens in a locally selected UTM zone:
//! geographic polygons are projected to planar meters, clipped there, and
//! areas come back in km². The fast flat-Earth approximation in
//! [`nominal_area_km2`] is only ever used for the whole cell's nominal
//! area, never for intersections.

pub mod projection;

use geo::{Area, BooleanOps, BoundingRect, Coord, CoordsIter, LineString, MultiPolygon, Polygon};
use thiserror::Error;

pub use projection::{UtmProjection, utm_zone};

/// Meters per degree of latitude, approximately constant.
const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Errors from projection and cell construction.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Latitude or longitude outside the valid geographic range.
    #[error("coordinates out of range: lat={lat}, lon={lon}")]
    OutOfRange {
        /// The offending latitude.
        lat: f64,
        /// The offending longitude.
        lon: f64,
    },

    /// The projection transform produced a non-finite value. Should not
    /// occur for in-range inputs; indicates a programming error.
    #[error("projection transform produced non-finite coordinates")]
    Transform,
}

/// Builds a square grid cell centered at the given coordinates.
///
/// The center is projected into its UTM zone, a square with half-side
/// `side_km * 500` meters is constructed around it, and the corners are
/// projected back to geographic coordinates. The result is a closed
/// 5-point ring (last coordinate equals the first) in lon/lat order.
///
/// # Errors
///
/// Returns [`ProjectionError::OutOfRange`] for latitudes outside
/// [-90, 90] or longitudes outside [-180, 180], and
/// [`ProjectionError::Transform`] if the transform yields non-finite
/// values (never expected for in-range inputs).
pub fn build_cell(
    center_lat: f64,
    center_lon: f64,
    side_km: f64,
) -> Result<Polygon<f64>, ProjectionError> {
    if !(-90.0..=90.0).contains(&center_lat) || !(-180.0..=180.0).contains(&center_lon) {
        return Err(ProjectionError::OutOfRange {
            lat: center_lat,
            lon: center_lon,
        });
    }

    let proj = UtmProjection::for_point(center_lat, center_lon);
    let (cx, cy) = proj.forward(center_lon, center_lat);
    let half = side_km * 500.0;

    let corners = [
        (cx - half, cy - half),
        (cx + half, cy - half),
        (cx + half, cy + half),
        (cx - half, cy + half),
        (cx - half, cy - half),
    ];

    let mut ring = Vec::with_capacity(corners.len());
    for (x, y) in corners {
        let (lon, lat) = proj.inverse(x, y);
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::Transform);
        }
        ring.push(Coord { x: lon, y: lat });
    }

    log::debug!("built {side_km}km cell centered at ({center_lat}, {center_lon})");

    Ok(Polygon::new(LineString::new(ring), Vec::new()))
}

/// Fast approximate polygon area from its geographic bounding box.
///
/// Uses a flat-Earth degree-to-meter conversion (111.32 km per degree of
/// latitude, longitude scaled by the cosine of the center latitude). Only
/// acceptable for small areas — a few hundred km² at most — and never
/// used for intersection-area computation.
#[must_use]
pub fn nominal_area_km2(polygon: &Polygon<f64>) -> f64 {
    let Some(rect) = polygon.bounding_rect() else {
        return 0.0;
    };

    let lat_center = f64::midpoint(rect.min().y, rect.max().y);
    let meters_per_degree_lon = METERS_PER_DEGREE_LAT * lat_center.to_radians().cos();

    let width_m = (rect.max().x - rect.min().x) * meters_per_degree_lon;
    let height_m = (rect.max().y - rect.min().y) * METERS_PER_DEGREE_LAT;

    width_m * height_m / 1e6
}

/// Planar area of a geographic polygon in km².
///
/// The polygon is projected into the UTM zone selected from its first
/// exterior coordinate and the area is taken in that planar system.
/// Returns 0 (with a warning) if the geometry is empty or the transform
/// produces non-finite coordinates.
#[must_use]
pub fn planar_area_km2(geometry: &MultiPolygon<f64>) -> f64 {
    let Some(reference) = geometry.coords_iter().next() else {
        return 0.0;
    };

    let proj = UtmProjection::for_point(reference.y, reference.x);
    let Some(projected) = project_multipolygon(proj, geometry) else {
        log::warn!("planar area transform failed, treating area as 0");
        return 0.0;
    };

    projected.unsigned_area() / 1e6
}

/// Accurate intersection area of two geographic polygons in km².
///
/// Both polygons are projected into the UTM zone selected from a
/// reference point of `a`, clipped in that planar system, and the
/// intersection area is returned in km². Disjoint geometries yield 0;
/// transform failures log a warning and yield 0 rather than propagating.
#[must_use]
pub fn intersection_area_km2(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> f64 {
    let Some(reference) = a.coords_iter().next() else {
        return 0.0;
    };

    let proj = UtmProjection::for_point(reference.y, reference.x);

    let Some(a_planar) = project_multipolygon(proj, a) else {
        log::warn!("intersection transform failed for first polygon, treating overlap as 0");
        return 0.0;
    };
    let b_multi = MultiPolygon::new(vec![b.clone()]);
    let Some(b_planar) = project_multipolygon(proj, &b_multi) else {
        log::warn!("intersection transform failed for second polygon, treating overlap as 0");
        return 0.0;
    };

    a_planar.intersection(&b_planar).unsigned_area() / 1e6
}

/// Projects every coordinate of a multipolygon into the given UTM zone.
///
/// Returns `None` if any projected coordinate is non-finite.
fn project_multipolygon(
    proj: UtmProjection,
    geometry: &MultiPolygon<f64>,
) -> Option<MultiPolygon<f64>> {
    let mut polygons = Vec::with_capacity(geometry.0.len());

    for polygon in &geometry.0 {
        let exterior = project_ring(proj, polygon.exterior())?;
        let mut interiors = Vec::with_capacity(polygon.interiors().len());
        for interior in polygon.interiors() {
            interiors.push(project_ring(proj, interior)?);
        }
        polygons.push(Polygon::new(exterior, interiors));
    }

    Some(MultiPolygon::new(polygons))
}

fn project_ring(proj: UtmProjection, ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut coords = Vec::with_capacity(ring.0.len());
    for coord in &ring.0 {
        let (x, y) = proj.forward(coord.x, coord.y);
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        coords.push(Coord { x, y });
    }
    Some(LineString::new(coords))
}
