//! Universal Transverse Mercator projection

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::transverse_mercator::{normalize_degrees, TransverseMercator};
use crate::core::{
    ConvertError, ConvertResult, Ellipsoid, GeodeticPoint, UtmPosition, UTM_FALSE_EASTING,
    UTM_FALSE_NORTHING_SOUTH, UTM_MAX_LATITUDE, UTM_MIN_LATITUDE, UTM_SCALE_FACTOR,
};
use crate::geoid::{orthometric_height, GeoidModel};

/// Furthest a point may sit from the central meridian of a forced zone (degrees)
const MAX_ZONE_LONGITUDE_SPAN: f64 = 9.0;

static UTM_PROJECTION: LazyLock<TransverseMercator> =
    LazyLock::new(|| TransverseMercator::new(Ellipsoid::WGS84, UTM_SCALE_FACTOR));

/// Horizontal UTM coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmCoordinate {
    pub zone: u8,
    pub northup: bool,
    pub easting: f64,
    pub northing: f64,
}

/// Latitude band index, -10 ('C') through 9 ('X')
pub(crate) fn latitude_band(latitude: f64) -> i32 {
    let ilat = latitude.floor() as i32;
    ((ilat + 80).div_euclid(8) - 10).clamp(-10, 9)
}

/// Central meridian of a UTM zone (degrees)
pub fn central_meridian(zone: u8) -> f64 {
    6.0 * zone as f64 - 183.0
}

/// Standard zone for a point, including the Norway and Svalbard exceptions
pub fn standard_zone(latitude: f64, longitude: f64) -> ConvertResult<u8> {
    check_latitude(latitude)?;

    let ilon = normalize_degrees(longitude).floor() as i32;
    let mut zone = (ilon + 186) / 6;
    let band = latitude_band(latitude);

    if band == 7 && zone == 31 && ilon >= 3 {
        zone = 32;
    } else if band == 9 && (0..42).contains(&ilon) {
        zone = 2 * ((ilon + 183) / 12) + 1;
    }

    Ok(zone.clamp(1, 60) as u8)
}

/// Project into the standard zone for the point's own longitude
pub fn forward(latitude: f64, longitude: f64) -> ConvertResult<UtmCoordinate> {
    let zone = standard_zone(latitude, longitude)?;
    project(zone, latitude, longitude)
}

/// Project into a caller-chosen zone
///
/// Used to keep consecutive samples in one zone across a zone boundary. The
/// zone must lie close enough to the point for the projection to stay
/// accurate.
pub fn forward_in_zone(latitude: f64, longitude: f64, zone: u8) -> ConvertResult<UtmCoordinate> {
    check_latitude(latitude)?;
    if !(1..=60).contains(&zone) {
        return Err(ConvertError::InvalidUtmZone {
            zone,
            reason: "zone must be between 1 and 60",
        });
    }
    if normalize_degrees(longitude - central_meridian(zone)).abs() > MAX_ZONE_LONGITUDE_SPAN {
        return Err(ConvertError::InvalidUtmZone {
            zone,
            reason: "point is too far from the zone's central meridian",
        });
    }
    project(zone, latitude, longitude)
}

/// Inverse projection, returning latitude/longitude in degrees
pub fn reverse(coordinate: &UtmCoordinate) -> ConvertResult<(f64, f64)> {
    if !(1..=60).contains(&coordinate.zone) {
        return Err(ConvertError::InvalidUtmZone {
            zone: coordinate.zone,
            reason: "zone must be between 1 and 60",
        });
    }
    let false_northing = if coordinate.northup { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
    Ok(UTM_PROJECTION.reverse(
        central_meridian(coordinate.zone),
        coordinate.easting - UTM_FALSE_EASTING,
        coordinate.northing - false_northing,
    ))
}

/// Exact meridian convergence of the UTM projection at a point (radians)
pub fn grid_convergence(latitude: f64, longitude: f64) -> ConvertResult<f64> {
    let zone = standard_zone(latitude, longitude)?;
    Ok(UTM_PROJECTION
        .forward(central_meridian(zone), latitude, longitude)
        .convergence)
}

/// Geodetic sample to UTM with the height taken from `geoid`
pub fn to_utm(point: &GeodeticPoint, geoid: &dyn GeoidModel) -> ConvertResult<UtmPosition> {
    let coordinate = forward(point.latitude, point.longitude)?;
    with_height(coordinate, point, geoid)
}

/// Geodetic sample to UTM in a locked zone
pub fn to_utm_in_zone(
    point: &GeodeticPoint,
    zone: u8,
    geoid: &dyn GeoidModel,
) -> ConvertResult<UtmPosition> {
    let coordinate = forward_in_zone(point.latitude, point.longitude, zone)?;
    with_height(coordinate, point, geoid)
}

fn with_height(
    coordinate: UtmCoordinate,
    point: &GeodeticPoint,
    geoid: &dyn GeoidModel,
) -> ConvertResult<UtmPosition> {
    let height = orthometric_height(geoid, point)?;
    tracing::trace!(
        zone = coordinate.zone,
        easting = coordinate.easting,
        northing = coordinate.northing,
        height,
        "utm"
    );

    Ok(UtmPosition {
        zone: coordinate.zone,
        northup: coordinate.northup,
        easting: coordinate.easting,
        northing: coordinate.northing,
        height,
        geodetic: *point,
    })
}

fn project(zone: u8, latitude: f64, longitude: f64) -> ConvertResult<UtmCoordinate> {
    let point = UTM_PROJECTION.forward(central_meridian(zone), latitude, longitude);
    let northup = latitude >= 0.0;
    let false_northing = if northup { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };

    Ok(UtmCoordinate {
        zone,
        northup,
        easting: point.x + UTM_FALSE_EASTING,
        northing: point.y + false_northing,
    })
}

fn check_latitude(latitude: f64) -> ConvertResult<()> {
    if !(UTM_MIN_LATITUDE..UTM_MAX_LATITUDE).contains(&latitude) {
        return Err(ConvertError::OutsideUtmDomain { latitude });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoid::FixedUndulation;

    #[test]
    fn test_zone_selection() {
        assert_eq!(standard_zone(37.77, -122.42).unwrap(), 10);
        assert_eq!(standard_zone(51.48, 0.0).unwrap(), 31);
        assert_eq!(standard_zone(35.6812, 139.7671).unwrap(), 54);
        assert_eq!(standard_zone(-33.86, 151.21).unwrap(), 56);
        assert_eq!(standard_zone(10.0, 180.0).unwrap(), 1);
        assert_eq!(standard_zone(10.0, 179.9).unwrap(), 60);
    }

    #[test]
    fn test_zone_exceptions() {
        // Bergen lies in 32V although its longitude belongs to zone 31
        assert_eq!(standard_zone(60.39, 5.32).unwrap(), 32);
        assert_eq!(standard_zone(60.39, 2.5).unwrap(), 31);
        // Svalbard
        assert_eq!(standard_zone(78.22, 15.65).unwrap(), 33);
        assert_eq!(standard_zone(78.0, 8.0).unwrap(), 31);
        assert_eq!(standard_zone(78.0, 25.0).unwrap(), 35);
        assert_eq!(standard_zone(79.0, 40.0).unwrap(), 37);
    }

    #[test]
    fn test_latitude_bands() {
        assert_eq!(latitude_band(-80.0), -10);
        assert_eq!(latitude_band(-0.5), -1);
        assert_eq!(latitude_band(0.0), 0);
        assert_eq!(latitude_band(35.6812), 4);
        assert_eq!(latitude_band(83.9), 9);
    }

    #[test]
    fn test_forward_reference_point() {
        let utm = forward(33.3, 44.4).unwrap();
        assert_eq!(utm.zone, 38);
        assert!(utm.northup);
        assert!((utm.easting - 444_140.54).abs() < 0.01);
        assert!((utm.northing - 3_684_706.36).abs() < 0.01);
    }

    #[test]
    fn test_southern_hemisphere_false_northing() {
        let utm = forward(-33.86, 151.21).unwrap();
        assert!(!utm.northup);
        assert!(utm.northing > 6_000_000.0 && utm.northing < 10_000_000.0);

        let (lat, lon) = reverse(&utm).unwrap();
        assert!((lat + 33.86).abs() < 1e-9);
        assert!((lon - 151.21).abs() < 1e-9);
    }

    #[test]
    fn test_outside_domain() {
        assert!(matches!(forward(84.0, 10.0), Err(ConvertError::OutsideUtmDomain { .. })));
        assert!(matches!(forward(-80.5, 10.0), Err(ConvertError::OutsideUtmDomain { .. })));
        assert!(forward(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_forward_in_zone() {
        // Just east of the 53/54 boundary, kept in zone 53
        let locked = forward_in_zone(35.0, 138.1, 53).unwrap();
        assert_eq!(locked.zone, 53);
        assert!(locked.easting > 500_000.0 + 250_000.0);

        let standard = forward(35.0, 138.1).unwrap();
        assert_eq!(standard.zone, 54);

        assert!(matches!(
            forward_in_zone(35.0, 138.1, 40),
            Err(ConvertError::InvalidUtmZone { zone: 40, .. })
        ));
        assert!(forward_in_zone(35.0, 138.1, 0).is_err());
    }

    #[test]
    fn test_to_utm_uses_geoid_height() {
        let point = GeodeticPoint::new(35.6812, 139.7671, 30.0);
        let utm = to_utm(&point, &FixedUndulation::new(36.5)).unwrap();

        assert_eq!(utm.zone, 54);
        assert!(utm.northup);
        assert!((utm.easting - 388_433.37).abs() < 0.01);
        assert!((utm.northing - 3_949_290.01).abs() < 0.01);
        assert!((utm.height + 6.5).abs() < 1e-9);
        assert_eq!(utm.geodetic, point);
    }

    #[test]
    fn test_grid_convergence_west_of_central_meridian() {
        let gamma = grid_convergence(35.6812, 139.7671).unwrap();
        assert!((gamma + 0.012_552).abs() < 1e-5);
    }
}
