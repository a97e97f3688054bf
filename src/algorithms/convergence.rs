//! Meridian convergence by finite differences
//!
//! A projected position is compared with two neighbours: one obtained by
//! re-projecting the sample nudged northward in latitude (true north), and
//! one obtained by nudging the projected northing (grid north). The signed
//! angle from the grid-north displacement to the true-north displacement is
//! the convergence, positive when grid north lies clockwise of true north.
//! Samples too close to the northern edge of the projection take their
//! true-north neighbour to the south instead.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::mgrs::MgrsReference;
use super::plane::{plane_horizontal, PlaneProjector};
use super::utm;
use crate::core::{
    ConvertError, ConvertResult, MgrsPosition, MgrsPrecision, PlanePosition, Position,
    CONVERGENCE_GRID_OFFSET_M, CONVERGENCE_LATITUDE_OFFSET_DEG, MGRS_SQUARE_SIZE,
    UTM_MAX_LATITUDE,
};

/// Finite-difference estimator of the grid-north / true-north angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceEstimator {
    /// Northward latitude step for the true-north neighbour (degrees)
    pub latitude_offset_deg: f64,
    /// Northing step for the grid-north neighbour (m)
    pub grid_offset_m: f64,
}

impl Default for ConvergenceEstimator {
    fn default() -> Self {
        Self {
            latitude_offset_deg: CONVERGENCE_LATITUDE_OFFSET_DEG,
            grid_offset_m: CONVERGENCE_GRID_OFFSET_M,
        }
    }
}

impl ConvergenceEstimator {
    /// Convergence (radians) at the sample a PLANE or MGRS position was computed from
    ///
    /// `projector` is only consulted for PLANE positions and must be the one
    /// that produced them.
    pub fn estimate(
        &self,
        position: &Position,
        projector: &dyn PlaneProjector,
    ) -> ConvertResult<f64> {
        let (origin, (shifted, step)) = match position {
            Position::Plane(plane) => ([plane.x, plane.y], self.shifted_plane(plane, projector)?),
            Position::Mgrs(mgrs) => ([mgrs.x, mgrs.y], self.shifted_mgrs(mgrs)?),
            other => {
                return Err(ConvertError::UnsupportedConvergenceSystem {
                    system: other.coordinate_system(),
                })
            }
        };

        let grid_north = Vector2::new(0.0, self.grid_offset_m);
        let mut true_north = Vector2::from(shifted) - Vector2::from(origin);
        if matches!(position, Position::Mgrs(_)) {
            true_north = true_north.map(unwrap_square);
        }
        // A southward neighbour points along true south
        true_north *= step.signum();

        let convergence = grid_north.perp(&true_north).atan2(grid_north.dot(&true_north));
        tracing::trace!(
            system = %position.coordinate_system(),
            convergence,
            "meridian convergence"
        );
        Ok(convergence)
    }

    /// Signed latitude step that keeps the neighbour below `northern_limit`
    fn latitude_step(&self, latitude: f64, northern_limit: f64) -> f64 {
        if latitude + self.latitude_offset_deg >= northern_limit {
            -self.latitude_offset_deg
        } else {
            self.latitude_offset_deg
        }
    }

    fn shifted_plane(
        &self,
        plane: &PlanePosition,
        projector: &dyn PlaneProjector,
    ) -> ConvertResult<([f64; 2], f64)> {
        let step = self.latitude_step(plane.geodetic.latitude, 90.0);
        let shifted = plane.geodetic.offset_latitude(step);
        let (x, y) = plane_horizontal(projector, plane.zone, shifted.latitude, shifted.longitude)?;
        Ok(([x, y], step))
    }

    /// Neighbour kept in the sample's own zone at millimeter resolution
    fn shifted_mgrs(&self, mgrs: &MgrsPosition) -> ConvertResult<([f64; 2], f64)> {
        let step = self.latitude_step(mgrs.geodetic.latitude, UTM_MAX_LATITUDE);
        let shifted = mgrs.geodetic.offset_latitude(step);
        let coordinate = utm::forward_in_zone(shifted.latitude, shifted.longitude, mgrs.zone())?;
        let reference =
            MgrsReference::encode(&coordinate, shifted.latitude, MgrsPrecision::OneMillimeter)?;
        Ok(([reference.easting_m(), reference.northing_m()], step))
    }
}

/// Undo a jump across a 100 km square edge between two in-square offsets
fn unwrap_square(delta: f64) -> f64 {
    delta - MGRS_SQUARE_SIZE * (delta / MGRS_SQUARE_SIZE).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::local_cartesian::to_local_cartesian;
    use crate::algorithms::mgrs::to_mgrs;
    use crate::algorithms::plane::{to_plane, JapanPlaneRectangular};
    use crate::core::{CoordinateSystem, GeodeticPoint};
    use crate::geoid::FixedUndulation;

    fn mgrs_convergence(latitude: f64, longitude: f64) -> f64 {
        let point = GeodeticPoint::new(latitude, longitude, 0.0);
        let precision = MgrsPrecision::HundredMicrometers;
        let mgrs = to_mgrs(&point, &FixedUndulation::ellipsoidal(), precision).unwrap();
        ConvergenceEstimator::default()
            .estimate(&Position::Mgrs(mgrs), &JapanPlaneRectangular)
            .unwrap()
    }

    fn plane_convergence(latitude: f64, longitude: f64, zone: u8) -> f64 {
        let point = GeodeticPoint::new(latitude, longitude, 0.0);
        let plane = to_plane(&point, zone, &JapanPlaneRectangular, &FixedUndulation::ellipsoidal())
            .unwrap();
        ConvergenceEstimator::default()
            .estimate(&Position::Plane(plane), &JapanPlaneRectangular)
            .unwrap()
    }

    #[test]
    fn test_zero_on_central_meridian_at_equator() {
        assert!(mgrs_convergence(0.0, 141.0).abs() < 1e-6);
    }

    #[test]
    fn test_sign_flips_across_central_meridian() {
        let west = mgrs_convergence(10.0, 140.0);
        let east = mgrs_convergence(10.0, 142.0);
        assert!((west + 0.003_032).abs() < 1e-5);
        assert!((east - 0.003_032).abs() < 1e-5);

        let west = plane_convergence(36.0, 139.5, 9);
        let east = plane_convergence(36.0, 140.0 + 10.0 / 60.0, 9);
        assert!(west < 0.0 && east > 0.0);
        assert!((west + east).abs() < 1e-6);
    }

    #[test]
    fn test_close_to_exact_convergence() {
        let exact = utm::grid_convergence(35.6812, 139.7671).unwrap();
        assert!((mgrs_convergence(35.6812, 139.7671) - exact).abs() < 1e-4);

        // Exact zone IX value at 36N 139.5E
        assert!((plane_convergence(36.0, 139.5, 9) + 0.003_419_6).abs() < 1e-4);
    }

    #[test]
    fn test_square_roll_over_is_unwrapped() {
        // Crosses the equator, where the northing jumps from ~1e7 to ~0
        let southern = mgrs_convergence(-0.005, 36.8);
        assert!(southern.abs() < 0.05);

        let exact = utm::grid_convergence(-0.005, 36.8).unwrap();
        assert!((southern - exact).abs() < 1e-3);
    }

    #[test]
    fn test_steps_south_at_northern_edge() {
        // 83.995 + 0.01 lies beyond the last MGRS band
        let exact = utm::grid_convergence(83.995, 141.5).unwrap();
        let gamma = mgrs_convergence(83.995, 141.5);
        assert!(gamma > 0.0);
        assert!((gamma - exact).abs() < 1e-4);

        let below = mgrs_convergence(83.9, 141.5);
        assert!((gamma - below).abs() < 1e-3);
    }

    #[test]
    fn test_unsupported_systems() {
        let point = GeodeticPoint::new(35.0, 139.0, 0.0);
        let local = Position::LocalCartesian(to_local_cartesian(&point, &point));
        assert_eq!(
            ConvergenceEstimator::default().estimate(&local, &JapanPlaneRectangular),
            Err(ConvertError::UnsupportedConvergenceSystem {
                system: CoordinateSystem::LocalCartesian
            })
        );
    }

    #[test]
    fn test_offsets_are_tunable() {
        let point = GeodeticPoint::new(36.0, 139.5, 0.0);
        let plane = to_plane(&point, 9, &JapanPlaneRectangular, &FixedUndulation::ellipsoidal())
            .unwrap();
        let coarse = ConvergenceEstimator {
            latitude_offset_deg: 0.05,
            grid_offset_m: 10.0,
        };
        let gamma = coarse
            .estimate(&Position::Plane(plane), &JapanPlaneRectangular)
            .unwrap();
        assert!((gamma + 0.003_42).abs() < 1e-4);
    }
}
