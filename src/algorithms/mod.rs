//! Projection and attitude algorithms

pub mod attitude;
pub mod convergence;
pub mod local_cartesian;
pub mod mgrs;
pub mod plane;
pub mod transverse_mercator;
pub mod utm;

pub use attitude::{apply_meridian_convergence, quaternion_to_rpy, rpy_to_quaternion, EulerAngles};
pub use convergence::ConvergenceEstimator;
pub use local_cartesian::{to_local_cartesian, LocalCartesian};
pub use mgrs::{to_mgrs, utm_to_mgrs, MgrsReference};
pub use plane::{to_plane, JapanPlaneRectangular, PlaneProjector};
pub use transverse_mercator::TransverseMercator;
pub use utm::{to_utm, to_utm_in_zone, UtmCoordinate};
