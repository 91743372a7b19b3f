//! WGS84 transverse Mercator (UTM) forward and inverse transforms.
//!
//! Implemented directly from the standard series expansions (Snyder,
//! "Map Projections — A Working Manual", USGS PP 1395) so the geometry
//! crate carries no native projection dependency. Accuracy is well under
//! a meter within a zone, which is far below the block-group boundary
//! resolution this pipeline consumes.

/// WGS84 semi-major axis in meters.
const A: f64 = 6_378_137.0;
/// WGS84 flattening.
const F: f64 = 1.0 / 298.257_223_563;
/// UTM central scale factor.
const K0: f64 = 0.9996;
/// UTM false easting in meters.
const FALSE_EASTING: f64 = 500_000.0;
/// UTM false northing for the southern hemisphere in meters.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Returns the UTM zone number for a longitude.
///
/// Zones are 6 degrees wide starting at -180, clamped to [1, 60] so
/// out-of-range inputs still select a usable zone.
#[must_use]
pub fn utm_zone(longitude: f64) -> u8 {
    let zone = ((longitude + 180.0) / 6.0).floor() as i32 + 1;
    zone.clamp(1, 60) as u8
}

/// A UTM projection fixed to one zone and hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmProjection {
    zone: u8,
    south: bool,
}

impl UtmProjection {
    /// Selects the projection zone from a reference point.
    ///
    /// The zone comes from the longitude (6-degree partitioning) and the
    /// hemisphere from the sign of the latitude.
    #[must_use]
    pub fn for_point(latitude: f64, longitude: f64) -> Self {
        Self {
            zone: utm_zone(longitude),
            south: latitude < 0.0,
        }
    }

    /// The zone's central meridian in degrees.
    #[must_use]
    fn central_meridian(self) -> f64 {
        f64::from(self.zone) * 6.0 - 183.0
    }

    /// Projects geographic coordinates (degrees) to UTM easting/northing
    /// (meters).
    #[must_use]
    pub fn forward(self, longitude: f64, latitude: f64) -> (f64, f64) {
        let e2 = F * (2.0 - F);
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let phi = latitude.to_radians();
        let dlam = (longitude - self.central_meridian()).to_radians();

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a_term = dlam * cos_phi;

        // Meridional arc length from the equator.
        let m = A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

        let a2 = a_term * a_term;
        let a3 = a2 * a_term;
        let a4 = a3 * a_term;
        let a5 = a4 * a_term;
        let a6 = a5 * a_term;

        let easting = K0
            * n
            * (a_term
                + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
            + FALSE_EASTING;

        let mut northing = K0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

        if self.south {
            northing += FALSE_NORTHING_SOUTH;
        }

        (easting, northing)
    }

    /// Projects UTM easting/northing (meters) back to geographic
    /// coordinates (degrees).
    #[must_use]
    pub fn inverse(self, easting: f64, northing: f64) -> (f64, f64) {
        let e2 = F * (2.0 - F);
        let ep2 = e2 / (1.0 - e2);
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let x = easting - FALSE_EASTING;
        let y = if self.south {
            northing - FALSE_NORTHING_SOUTH
        } else {
            northing
        };

        let m = y / K0;
        let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let sqrt_1me2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        // Footpoint latitude.
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let n1 = A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let r1 = A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = x / (n1 * K0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let dlam = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

        let latitude = phi.to_degrees();
        let longitude = self.central_meridian() + dlam.to_degrees();

        (longitude, latitude)
    }
}
