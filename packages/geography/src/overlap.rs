//! Overlap weight resolution between a block group and the query cell.

use geo::{MultiPolygon, Polygon};
use gridstats_geography_models::OverlapWeight;
use gridstats_geometry::{intersection_area_km2, planar_area_km2};

/// Computes how much of a block group's surface the query cell covers.
///
/// The covered area is the planar intersection of the two geometries;
/// the fraction divides it by the block group's own planar area. A
/// zero-area block group yields fraction 0 rather than dividing by zero.
#[must_use]
pub fn resolve_overlap(geometry: &MultiPolygon<f64>, cell: &Polygon<f64>) -> OverlapWeight {
    let covered_area_km2 = intersection_area_km2(geometry, cell);
    let total_area_km2 = planar_area_km2(geometry);

    let fraction = if total_area_km2 > 0.0 {
        covered_area_km2 / total_area_km2
    } else {
        0.0
    };

    OverlapWeight {
        fraction,
        covered_area_km2,
    }
}

#[cfg(test)]
mod tests {
    use gridstats_geometry::build_cell;

    use super::*;

    #[test]
    fn fully_contained_area_has_fraction_one() {
        let cell = build_cell(38.9072, -77.0369, 3.0).unwrap();
        let inner = build_cell(38.9072, -77.0369, 1.0).unwrap();
        let weight = resolve_overlap(&MultiPolygon::new(vec![inner]), &cell);

        assert!((weight.fraction - 1.0).abs() < 1e-6, "{}", weight.fraction);
        assert!((weight.covered_area_km2 - 1.0).abs() < 0.01);
    }

    #[test]
    fn disjoint_area_has_fraction_zero() {
        let cell = build_cell(38.9072, -77.0369, 1.0).unwrap();
        let far = build_cell(39.2, -77.0369, 1.0).unwrap();
        let weight = resolve_overlap(&MultiPolygon::new(vec![far]), &cell);

        assert!(weight.fraction.abs() < f64::EPSILON);
        assert!(weight.covered_area_km2.abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_stays_within_unit_interval() {
        // Partial overlap: area shifted half a cell east.
        let cell = build_cell(38.9072, -77.0369, 1.0).unwrap();
        let shifted = build_cell(38.9072, -77.0311, 1.0).unwrap();
        let weight = resolve_overlap(&MultiPolygon::new(vec![shifted]), &cell);

        assert!(weight.fraction > 0.0 && weight.fraction <= 1.0 + 1e-9);
        assert!(weight.covered_area_km2 > 0.0);
        assert!(weight.covered_area_km2 < 1.0);
    }

    #[test]
    fn total_area_round_trips_through_weight() {
        let cell = build_cell(38.9072, -77.0369, 1.0).unwrap();
        let shifted = build_cell(38.9072, -77.0311, 1.0).unwrap();
        let geometry = MultiPolygon::new(vec![shifted]);

        let weight = resolve_overlap(&geometry, &cell);
        let total = planar_area_km2(&geometry);

        assert!(weight.fraction > 0.0);
        assert!((weight.total_area_km2() - total).abs() < 1e-6);
    }

    #[test]
    fn empty_geometry_yields_zero_weight() {
        let cell = build_cell(38.9072, -77.0369, 1.0).unwrap();
        let weight = resolve_overlap(&MultiPolygon::new(Vec::new()), &cell);

        assert!(weight.fraction.abs() < f64::EPSILON);
        assert!(weight.covered_area_km2.abs() < f64::EPSILON);
    }
}
