//! GNSS coordinate conversion
//!
//! Converts geodetic receiver positions into UTM, MGRS, plane-rectangular
//! and local Cartesian coordinates, with geoid-referenced heights and the
//! meridian convergence needed to re-reference headings to true north.

pub mod core;
pub mod geoid;
pub mod algorithms;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{
    ConvertError, ConvertResult, CoordinateSystem, GeodeticPoint, HeightType, MgrsPrecision,
    Position,
};
pub use crate::geoid::{FixedUndulation, GeoidGrid, GeoidModel};
pub use crate::algorithms::{
    ConvergenceEstimator, EulerAngles, JapanPlaneRectangular, MgrsReference, PlaneProjector,
};
pub use crate::api::{ConvertedPose, ConverterSettings, CoordinateConverter};
pub use crate::utils::{ConfigError, ConverterConfig};
