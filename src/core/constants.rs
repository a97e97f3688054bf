//! Projection constants and engine defaults

/// UTM central scale factor
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting (m)
pub const UTM_FALSE_EASTING: f64 = 500_000.0;

/// UTM false northing applied in the southern hemisphere (m)
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Southern limit of UTM coverage (degrees)
pub const UTM_MIN_LATITUDE: f64 = -80.0;

/// Northern limit of UTM coverage, exclusive (degrees)
pub const UTM_MAX_LATITUDE: f64 = 84.0;

/// Side of an MGRS 100 km grid square (m)
pub const MGRS_SQUARE_SIZE: f64 = 100_000.0;

/// Latitude perturbation used to estimate meridian convergence (degrees, ~1.11 km)
pub const CONVERGENCE_LATITUDE_OFFSET_DEG: f64 = 0.01;

/// Grid-north perturbation used to estimate meridian convergence (m)
pub const CONVERGENCE_GRID_OFFSET_M: f64 = 1000.0;
