//! Plane-rectangular projection for numbered regional zones

use std::sync::LazyLock;

use super::transverse_mercator::TransverseMercator;
use crate::core::{ConvertError, ConvertResult, Ellipsoid, GeodeticPoint, PlanePosition};
use crate::geoid::{orthometric_height, GeoidModel};

/// Zone-based planar projector
///
/// Implementations return coordinates in their native axis order: `x`
/// northward and `y` eastward from the zone origin, as survey systems
/// conventionally do.
pub trait PlaneProjector: Send + Sync {
    /// Native (x north, y east) coordinates of a point in `zone` (m)
    fn project(&self, zone: u8, latitude: f64, longitude: f64) -> ConvertResult<(f64, f64)>;

    /// Zone numbers this projector defines
    fn zones(&self) -> std::ops::RangeInclusive<u8>;
}

/// Scale factor on the central meridian of every Japanese plane zone
const JAPAN_PLANE_SCALE_FACTOR: f64 = 0.9999;

/// Origins (latitude, longitude) of zones I through XIX, in degrees
const JAPAN_PLANE_ORIGINS: [(f64, f64); 19] = [
    (33.0, 129.5),
    (33.0, 131.0),
    (36.0, 132.0 + 10.0 / 60.0),
    (33.0, 133.5),
    (36.0, 134.0 + 20.0 / 60.0),
    (36.0, 136.0),
    (36.0, 137.0 + 10.0 / 60.0),
    (36.0, 138.5),
    (36.0, 139.0 + 50.0 / 60.0),
    (40.0, 140.0 + 50.0 / 60.0),
    (44.0, 140.25),
    (44.0, 142.25),
    (44.0, 144.25),
    (26.0, 142.0),
    (26.0, 127.5),
    (26.0, 124.0),
    (26.0, 131.0),
    (20.0, 136.0),
    (26.0, 154.0),
];

static JAPAN_PLANE_PROJECTION: LazyLock<TransverseMercator> =
    LazyLock::new(|| TransverseMercator::new(Ellipsoid::GRS80, JAPAN_PLANE_SCALE_FACTOR));

/// The Japanese plane-rectangular coordinate system (zones 1 to 19)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JapanPlaneRectangular;

impl JapanPlaneRectangular {
    pub fn origin(zone: u8) -> ConvertResult<(f64, f64)> {
        zone.checked_sub(1)
            .and_then(|index| JAPAN_PLANE_ORIGINS.get(index as usize))
            .copied()
            .ok_or(ConvertError::InvalidPlaneZone { zone })
    }
}

impl PlaneProjector for JapanPlaneRectangular {
    fn project(&self, zone: u8, latitude: f64, longitude: f64) -> ConvertResult<(f64, f64)> {
        let (origin_lat, origin_lon) = Self::origin(zone)?;
        let projection = &*JAPAN_PLANE_PROJECTION;

        let point = projection.forward(origin_lon, latitude, longitude);
        let origin = projection.forward(origin_lon, origin_lat, origin_lon);
        Ok((point.y - origin.y, point.x))
    }

    fn zones(&self) -> std::ops::RangeInclusive<u8> {
        1..=JAPAN_PLANE_ORIGINS.len() as u8
    }
}

/// Horizontal plane coordinates as (easting, northing)
pub fn plane_horizontal(
    projector: &dyn PlaneProjector,
    zone: u8,
    latitude: f64,
    longitude: f64,
) -> ConvertResult<(f64, f64)> {
    let (north, east) = projector.project(zone, latitude, longitude)?;
    Ok((east, north))
}

/// Geodetic sample to a plane-rectangular position
///
/// `x` holds the projector's `y` output and `y` its `x` output.
pub fn to_plane(
    point: &GeodeticPoint,
    zone: u8,
    projector: &dyn PlaneProjector,
    geoid: &dyn GeoidModel,
) -> ConvertResult<PlanePosition> {
    let (x, y) = plane_horizontal(projector, zone, point.latitude, point.longitude)?;
    let z = orthometric_height(geoid, point)?;
    tracing::trace!(zone, x, y, z, "plane");

    Ok(PlanePosition {
        zone,
        x,
        y,
        z,
        geodetic: *point,
    })
}
