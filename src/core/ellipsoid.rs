//! Reference ellipsoids

use nalgebra::Vector3;

/// Reference ellipsoid described by its semi-major axis and flattening
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (meters)
    pub semi_major_axis: f64,
    /// Flattening
    pub flattening: f64,
}

impl Ellipsoid {
    /// WGS84, used by GNSS receivers and UTM
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        flattening: 1.0 / 298.257_223_563,
    };

    /// GRS80, used by the Japanese plane-rectangular system (JGD2011)
    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major_axis: 6_378_137.0,
        flattening: 1.0 / 298.257_222_101,
    };

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.flattening)
    }

    pub fn eccentricity_squared(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Third flattening n = f / (2 - f)
    pub fn third_flattening(&self) -> f64 {
        self.flattening / (2.0 - self.flattening)
    }

    /// Radius of curvature in the prime vertical at a latitude in radians
    pub fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        self.semi_major_axis / (1.0 - self.eccentricity_squared() * lat_rad.sin().powi(2)).sqrt()
    }

    /// Geodetic (degrees, degrees, meters) to Earth-centered Earth-fixed
    pub fn geodetic_to_ecef(&self, latitude: f64, longitude: f64, altitude: f64) -> Vector3<f64> {
        let lat_rad = latitude.to_radians();
        let lon_rad = longitude.to_radians();
        let n = self.prime_vertical_radius(lat_rad);
        let e2 = self.eccentricity_squared();

        Vector3::new(
            (n + altitude) * lat_rad.cos() * lon_rad.cos(),
            (n + altitude) * lat_rad.cos() * lon_rad.sin(),
            (n * (1.0 - e2) + altitude) * lat_rad.sin(),
        )
    }

    /// Earth-centered Earth-fixed to geodetic (degrees, degrees, meters)
    ///
    /// Starts from Bowring's parametric latitude and refines the latitude by
    /// fixed-point iteration; converges to sub-millimeter height within a few
    /// rounds anywhere outside the Earth's core.
    pub fn ecef_to_geodetic(&self, ecef: &Vector3<f64>) -> (f64, f64, f64) {
        let a = self.semi_major_axis;
        let b = self.semi_minor_axis();
        let e2 = self.eccentricity_squared();
        let ep2 = (a * a - b * b) / (b * b);

        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
        let lon = ecef.y.atan2(ecef.x);

        let theta = (ecef.z * a).atan2(p * b);
        let mut lat = (ecef.z + ep2 * b * theta.sin().powi(3))
            .atan2(p - e2 * a * theta.cos().powi(3));

        for _ in 0..4 {
            let n = self.prime_vertical_radius(lat);
            let height = if lat.cos().abs() > 1e-12 {
                p / lat.cos() - n
            } else {
                ecef.z.abs() - b
            };
            lat = ecef.z.atan2(p * (1.0 - e2 * n / (n + height)));
        }

        let n = self.prime_vertical_radius(lat);
        let height = if lat.cos().abs() > 1e-12 {
            p / lat.cos() - n
        } else {
            ecef.z.abs() - b
        };

        (lat.to_degrees(), lon.to_degrees(), height)
    }
}
