//! Geoid height service
//!
//! Converts ellipsoidal heights into orthometric heights using a geoid
//! undulation model. Models are loaded once and shared read-only, typically
//! behind an `Arc<dyn GeoidModel>`.

pub mod fixed;
pub mod grid;

pub use fixed::FixedUndulation;
pub use grid::GeoidGrid;

use crate::core::{ConvertResult, GeodeticPoint};

/// Default geoid model name, resolved to `<name>.pgm` on the geoid search path
pub const DEFAULT_GEOID_MODEL: &str = "egm2008-1";

/// Source of geoid undulation (geoid height above the ellipsoid)
pub trait GeoidModel: Send + Sync {
    /// Undulation in meters at a latitude/longitude in degrees
    fn undulation(&self, latitude: f64, longitude: f64) -> ConvertResult<f64>;

    /// Model identifier for logs and diagnostics
    fn name(&self) -> &str;
}

/// Height above the geoid for a geodetic point
pub fn orthometric_height(geoid: &dyn GeoidModel, point: &GeodeticPoint) -> ConvertResult<f64> {
    let undulation = geoid.undulation(point.latitude, point.longitude)?;
    Ok(point.altitude - undulation)
}
