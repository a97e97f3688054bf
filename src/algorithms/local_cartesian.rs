//! Local Cartesian (east-north-up) projection about a geodetic origin

use nalgebra::{Matrix3, Vector3};

use crate::core::{Ellipsoid, GeodeticPoint, LocalCartesianPosition};

/// Tangent-plane frame anchored at a geodetic origin on WGS84
///
/// The ECEF origin and rotation are computed once per origin, so one
/// instance can project any number of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCartesian {
    origin: GeodeticPoint,
    origin_ecef: Vector3<f64>,
    /// Rotation from ECEF deltas to east-north-up
    enu_matrix: Matrix3<f64>,
}

impl LocalCartesian {
    pub fn new(origin: GeodeticPoint) -> Self {
        let lat_rad = origin.latitude.to_radians();
        let lon_rad = origin.longitude.to_radians();
        let (sin_lat, cos_lat) = lat_rad.sin_cos();
        let (sin_lon, cos_lon) = lon_rad.sin_cos();

        #[rustfmt::skip]
        let enu_matrix = Matrix3::new(
            -sin_lon,           cos_lon,            0.0,
            -sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat,
            cos_lat * cos_lon,  cos_lat * sin_lon,  sin_lat,
        );

        Self {
            origin,
            origin_ecef: Ellipsoid::WGS84.geodetic_to_ecef(
                origin.latitude,
                origin.longitude,
                origin.altitude,
            ),
            enu_matrix,
        }
    }

    pub fn origin(&self) -> &GeodeticPoint {
        &self.origin
    }

    /// East-north-up offset of `point` from the origin (m)
    pub fn forward(&self, point: &GeodeticPoint) -> Vector3<f64> {
        let ecef =
            Ellipsoid::WGS84.geodetic_to_ecef(point.latitude, point.longitude, point.altitude);
        self.enu_matrix * (ecef - self.origin_ecef)
    }

    /// Geodetic point at an east-north-up offset from the origin
    pub fn reverse(&self, enu: &Vector3<f64>) -> GeodeticPoint {
        let ecef = self.origin_ecef + self.enu_matrix.transpose() * enu;
        let (latitude, longitude, altitude) = Ellipsoid::WGS84.ecef_to_geodetic(&ecef);
        GeodeticPoint::new(latitude, longitude, altitude)
    }
}

/// Project a geodetic sample into the tangent plane of `origin`
pub fn to_local_cartesian(point: &GeodeticPoint, origin: &GeodeticPoint) -> LocalCartesianPosition {
    let frame = LocalCartesian::new(*origin);
    let enu = frame.forward(point);
    tracing::trace!(east = enu.x, north = enu.y, up = enu.z, "local cartesian");

    LocalCartesianPosition {
        origin: *frame.origin(),
        x: enu.x,
        y: enu.y,
        z: enu.z,
        geodetic: *point,
    }
}
