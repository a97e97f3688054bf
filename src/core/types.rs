//! Core data types for the conversion engine

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithms::mgrs::MgrsReference;

/// Geodetic position on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Height above the ellipsoid in meters
    pub altitude: f64,
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Same point moved north by `offset_deg` degrees of latitude
    pub fn offset_latitude(&self, offset_deg: f64) -> Self {
        Self {
            latitude: self.latitude + offset_deg,
            ..*self
        }
    }
}

/// Coordinate systems a position can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinateSystem {
    Utm,
    Mgrs,
    Plane,
    LocalCartesian,
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSystem::Utm => "UTM",
            CoordinateSystem::Mgrs => "MGRS",
            CoordinateSystem::Plane => "PLANE",
            CoordinateSystem::LocalCartesian => "LOCAL_CARTESIAN",
        };
        f.write_str(name)
    }
}

/// Vertical datum for the z component of projected positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightType {
    /// Height above the geoid
    #[default]
    Orthometric,
    /// Height above the ellipsoid, as delivered by the receiver
    Ellipsoidal,
}

/// MGRS grid resolution, from 10 km down to 100 µm
///
/// The discriminant is the number of digits used for each of the easting and
/// northing blocks of the grid reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MgrsPrecision {
    TenKilometers = 1,
    OneKilometer = 2,
    HundredMeters = 3,
    TenMeters = 4,
    OneMeter = 5,
    HundredMillimeters = 6,
    TenMillimeters = 7,
    OneMillimeter = 8,
    HundredMicrometers = 9,
}

impl MgrsPrecision {
    pub const ALL: [MgrsPrecision; 9] = [
        MgrsPrecision::TenKilometers,
        MgrsPrecision::OneKilometer,
        MgrsPrecision::HundredMeters,
        MgrsPrecision::TenMeters,
        MgrsPrecision::OneMeter,
        MgrsPrecision::HundredMillimeters,
        MgrsPrecision::TenMillimeters,
        MgrsPrecision::OneMillimeter,
        MgrsPrecision::HundredMicrometers,
    ];

    /// Digits per easting/northing block
    pub fn digits(self) -> usize {
        self as usize
    }

    /// Meters represented by one unit of the least significant digit
    pub fn meters_per_digit(self) -> f64 {
        10f64.powi(5 - self as i32)
    }

    pub fn from_digits(digits: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.digits() == digits)
    }
}

impl TryFrom<u8> for MgrsPrecision {
    type Error = String;

    fn try_from(digits: u8) -> Result<Self, Self::Error> {
        Self::from_digits(digits as usize)
            .ok_or_else(|| format!("MGRS precision must be 1-9 digits, got {}", digits))
    }
}

impl From<MgrsPrecision> for u8 {
    fn from(precision: MgrsPrecision) -> Self {
        precision as u8
    }
}

/// UTM position: zone, hemisphere, easting and northing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtmPosition {
    pub zone: u8,
    /// True in the northern hemisphere
    pub northup: bool,
    pub easting: f64,
    pub northing: f64,
    /// Orthometric or ellipsoidal height, per the converter's height type
    pub height: f64,
    pub geodetic: GeodeticPoint,
}

/// MGRS position: offsets inside a 100 km grid square
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MgrsPosition {
    pub reference: MgrsReference,
    pub northup: bool,
    /// Easting inside the grid square, truncated to the precision (m)
    pub x: f64,
    /// Northing inside the grid square, truncated to the precision (m)
    pub y: f64,
    /// Height carried over from the UTM position
    pub z: f64,
    pub geodetic: GeodeticPoint,
}

impl MgrsPosition {
    pub fn zone(&self) -> u8 {
        self.reference.zone
    }
}

/// Plane-rectangular position
///
/// `x` is the easting and `y` the northing: the projector's native axes
/// (x north, y east) are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanePosition {
    pub zone: u8,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub geodetic: GeodeticPoint,
}

/// East-north-up offset from a local origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalCartesianPosition {
    pub origin: GeodeticPoint,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub geodetic: GeodeticPoint,
}

/// A geodetic sample expressed in exactly one coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "coordinate_system", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    Utm(UtmPosition),
    Mgrs(MgrsPosition),
    Plane(PlanePosition),
    LocalCartesian(LocalCartesianPosition),
}

impl Position {
    pub fn coordinate_system(&self) -> CoordinateSystem {
        match self {
            Position::Utm(_) => CoordinateSystem::Utm,
            Position::Mgrs(_) => CoordinateSystem::Mgrs,
            Position::Plane(_) => CoordinateSystem::Plane,
            Position::LocalCartesian(_) => CoordinateSystem::LocalCartesian,
        }
    }

    /// The geodetic input this position was computed from
    pub fn geodetic(&self) -> &GeodeticPoint {
        match self {
            Position::Utm(p) => &p.geodetic,
            Position::Mgrs(p) => &p.geodetic,
            Position::Plane(p) => &p.geodetic,
            Position::LocalCartesian(p) => &p.geodetic,
        }
    }

    /// Horizontal coordinates as (east-like, north-like)
    pub fn planar(&self) -> (f64, f64) {
        match self {
            Position::Utm(p) => (p.easting, p.northing),
            Position::Mgrs(p) => (p.x, p.y),
            Position::Plane(p) => (p.x, p.y),
            Position::LocalCartesian(p) => (p.x, p.y),
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            Position::Utm(p) => p.height,
            Position::Mgrs(p) => p.z,
            Position::Plane(p) => p.z,
            Position::LocalCartesian(p) => p.z,
        }
    }
}
