//! Conversion error types

use std::fmt;

use super::types::CoordinateSystem;

/// Errors surfaced by the conversion engine
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Geoid model could not be located or read
    GeoidUnavailable { name: String, reason: String },
    /// Geoid grid file exists but is not a usable grid
    GeoidFormat { path: String, detail: String },
    /// Query point lies outside the geoid grid
    OutsideGeoidDomain { latitude: f64, longitude: f64 },
    /// Latitude not covered by any UTM zone
    OutsideUtmDomain { latitude: f64 },
    /// UTM zone number outside 1..=60 or too far from the point
    InvalidUtmZone { zone: u8, reason: &'static str },
    /// UTM coordinate outside the lettered 100 km squares of its zone
    OutsideMgrsGrid { easting: f64, northing: f64 },
    /// MGRS reference that does not decompose into header and digit blocks
    MalformedMgrs { reference: String, detail: String },
    /// Plane zone the projector does not define
    InvalidPlaneZone { zone: u8 },
    /// Convergence requested for a system other than PLANE or MGRS
    UnsupportedConvergenceSystem { system: CoordinateSystem },
    /// Local Cartesian conversion requested without an origin
    MissingOrigin,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::GeoidUnavailable { name, reason } => {
                write!(f, "geoid model '{}' unavailable: {}", name, reason)
            }
            ConvertError::GeoidFormat { path, detail } => {
                write!(f, "invalid geoid grid '{}': {}", path, detail)
            }
            ConvertError::OutsideGeoidDomain { latitude, longitude } => {
                write!(f, "point ({}, {}) is outside the geoid grid", latitude, longitude)
            }
            ConvertError::OutsideUtmDomain { latitude } => {
                write!(f, "latitude {} is outside the UTM domain [-80, 84)", latitude)
            }
            ConvertError::InvalidUtmZone { zone, reason } => {
                write!(f, "invalid UTM zone {}: {}", zone, reason)
            }
            ConvertError::OutsideMgrsGrid { easting, northing } => {
                write!(f, "UTM coordinate ({}, {}) has no MGRS grid square", easting, northing)
            }
            ConvertError::MalformedMgrs { reference, detail } => {
                write!(f, "malformed MGRS reference '{}': {}", reference, detail)
            }
            ConvertError::InvalidPlaneZone { zone } => {
                write!(f, "plane zone {} is not defined", zone)
            }
            ConvertError::UnsupportedConvergenceSystem { system } => {
                write!(f, "meridian convergence is not available for {}", system)
            }
            ConvertError::MissingOrigin => {
                write!(f, "local cartesian conversion requires an origin")
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Result type for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_value() {
        let err = ConvertError::InvalidPlaneZone { zone: 42 };
        assert_eq!(err.to_string(), "plane zone 42 is not defined");

        let err = ConvertError::UnsupportedConvergenceSystem { system: CoordinateSystem::Utm };
        assert!(err.to_string().contains("UTM"));
    }
}
