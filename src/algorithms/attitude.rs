//! Roll/pitch/yaw helpers for applying the convergence correction to a heading

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// Euler angles in radians, composed as yaw, then pitch, then roll
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }
}

/// q = Rz(yaw) * Ry(pitch) * Rx(roll)
pub fn rpy_to_quaternion(angles: &EulerAngles) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(angles.roll, angles.pitch, angles.yaw)
}

/// Euler angles read off the rotation matrix of `q`
///
/// Near pitch = ±90° roll and yaw are not separable and the split between
/// them is arbitrary.
pub fn quaternion_to_rpy(q: &UnitQuaternion<f64>) -> EulerAngles {
    let rotation = q.to_rotation_matrix();
    let c = rotation.matrix();

    EulerAngles {
        roll: c[(2, 1)].atan2(c[(2, 2)]),
        pitch: (-c[(2, 0)]).clamp(-1.0, 1.0).asin(),
        yaw: c[(1, 0)].atan2(c[(0, 0)]),
    }
}

/// Re-reference a heading from grid north to true north
///
/// `q` is an attitude whose yaw is measured counter-clockwise from grid east.
/// `convergence` is the bearing of grid north clockwise from true north
/// (radians), as produced by the convergence estimator. True north then lies
/// at yaw `π/2 + convergence` in the grid frame, so the correction subtracts
/// it. Roll and pitch are preserved.
pub fn apply_meridian_convergence(
    q: &UnitQuaternion<f64>,
    convergence: f64,
) -> UnitQuaternion<f64> {
    let mut angles = quaternion_to_rpy(q);
    angles.yaw -= convergence;
    rpy_to_quaternion(&angles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity() {
        let angles = quaternion_to_rpy(&UnitQuaternion::identity());
        assert_eq!(angles, EulerAngles::default());
    }

    #[test]
    fn test_pure_yaw() {
        let q = rpy_to_quaternion(&EulerAngles::new(0.0, 0.0, FRAC_PI_2));
        let east = q * nalgebra::Vector3::x();
        assert!((east.y - 1.0).abs() < 1e-12);

        let back = quaternion_to_rpy(&q);
        assert!((back.yaw - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_convergence_only_touches_yaw() {
        let q = rpy_to_quaternion(&EulerAngles::new(0.1, -0.2, 1.0));
        let corrected = quaternion_to_rpy(&apply_meridian_convergence(&q, -0.0125));

        assert!((corrected.roll - 0.1).abs() < 1e-12);
        assert!((corrected.pitch + 0.2).abs() < 1e-12);
        assert!((corrected.yaw - 1.0125).abs() < 1e-12);
    }

    #[test]
    fn test_gimbal_lock_does_not_produce_nan() {
        let q = rpy_to_quaternion(&EulerAngles::new(0.3, FRAC_PI_2, 0.2));
        let angles = quaternion_to_rpy(&q);
        assert!(angles.roll.is_finite() && angles.pitch.is_finite() && angles.yaw.is_finite());
        assert!((angles.pitch - FRAC_PI_2).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn test_euler_round_trip(
            roll in -PI + 1e-6..PI - 1e-6,
            pitch in -80f64.to_radians()..80f64.to_radians(),
            yaw in -PI + 1e-6..PI - 1e-6,
        ) {
            let back = quaternion_to_rpy(&rpy_to_quaternion(&EulerAngles::new(roll, pitch, yaw)));
            prop_assert!((back.roll - roll).abs() < 1e-9);
            prop_assert!((back.pitch - pitch).abs() < 1e-9);
            prop_assert!((back.yaw - yaw).abs() < 1e-9);
        }
    }
}
