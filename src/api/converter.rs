//! Configured conversion façade
//!
//! Routes each geodetic sample through exactly one projector, fills in the
//! requested vertical datum, and optionally corrects an attitude for
//! meridian convergence.

use std::sync::Arc;

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::algorithms::attitude::apply_meridian_convergence;
use crate::algorithms::convergence::ConvergenceEstimator;
use crate::algorithms::local_cartesian::to_local_cartesian;
use crate::algorithms::mgrs::utm_to_mgrs;
use crate::algorithms::plane::{to_plane, JapanPlaneRectangular, PlaneProjector};
use crate::algorithms::utm::{to_utm, to_utm_in_zone};
use crate::core::{
    ConvertError, ConvertResult, CoordinateSystem, GeodeticPoint, HeightType, MgrsPrecision,
    Position, UtmPosition,
};
use crate::geoid::{FixedUndulation, GeoidModel};

static ELLIPSOIDAL: FixedUndulation = FixedUndulation::ellipsoidal();

/// Per-converter parameters, named after the driver's `coordinate_convert.*` keys
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Target coordinate system
    pub coordinate: CoordinateSystem,
    pub height_type: HeightType,
    /// Plane-rectangular zone for PLANE output
    pub plane_zone: u8,
    pub mgrs_precision: MgrsPrecision,
    /// Rotate the heading of converted poses from grid north to true north
    pub correct_meridian_convergence: bool,
    /// Origin for LOCAL_CARTESIAN output
    pub local_origin: Option<GeodeticPoint>,
    /// Keep UTM/MGRS output in this zone instead of following the longitude
    pub lock_utm_zone: Option<u8>,
    pub convergence: ConvergenceEstimator,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            coordinate: CoordinateSystem::Plane,
            height_type: HeightType::Orthometric,
            plane_zone: 7,
            mgrs_precision: MgrsPrecision::HundredMicrometers,
            correct_meridian_convergence: true,
            local_origin: None,
            lock_utm_zone: None,
            convergence: ConvergenceEstimator::default(),
        }
    }
}

/// One converted sample with its (optionally corrected) orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedPose {
    pub position: Position,
    /// Convergence applied to the orientation, when correction is enabled (radians)
    pub meridian_convergence: Option<f64>,
    pub orientation: UnitQuaternion<f64>,
}

/// Stateless converter sharing a geoid model and plane projector across calls
#[derive(Clone)]
pub struct CoordinateConverter {
    settings: ConverterSettings,
    geoid: Arc<dyn GeoidModel>,
    plane_projector: Arc<dyn PlaneProjector>,
}

impl CoordinateConverter {
    /// Converter with the Japanese plane-rectangular system as plane delegate
    pub fn new(settings: ConverterSettings, geoid: Arc<dyn GeoidModel>) -> Self {
        tracing::debug!(
            coordinate = %settings.coordinate,
            height_type = ?settings.height_type,
            geoid = geoid.name(),
            "coordinate converter ready"
        );
        Self {
            settings,
            geoid,
            plane_projector: Arc::new(JapanPlaneRectangular),
        }
    }

    pub fn with_plane_projector(mut self, projector: Arc<dyn PlaneProjector>) -> Self {
        self.plane_projector = projector;
        self
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Express a geodetic sample in the configured coordinate system
    pub fn convert(&self, point: &GeodeticPoint) -> ConvertResult<Position> {
        let vertical = self.vertical_model();

        let position = match self.settings.coordinate {
            CoordinateSystem::Utm => Position::Utm(self.utm(point, vertical)?),
            CoordinateSystem::Mgrs => {
                let utm = self.utm(point, vertical)?;
                Position::Mgrs(utm_to_mgrs(&utm, self.settings.mgrs_precision)?)
            }
            CoordinateSystem::Plane => Position::Plane(to_plane(
                point,
                self.settings.plane_zone,
                self.plane_projector.as_ref(),
                vertical,
            )?),
            CoordinateSystem::LocalCartesian => {
                let origin = self.settings.local_origin.ok_or(ConvertError::MissingOrigin)?;
                Position::LocalCartesian(to_local_cartesian(point, &origin))
            }
        };

        Ok(position)
    }

    /// Grid-north / true-north angle for a PLANE or MGRS position (radians)
    pub fn meridian_convergence(&self, position: &Position) -> ConvertResult<f64> {
        self.settings
            .convergence
            .estimate(position, self.plane_projector.as_ref())
    }

    /// Convert a sample and re-reference its orientation to true north if enabled
    pub fn convert_pose(
        &self,
        point: &GeodeticPoint,
        orientation: &UnitQuaternion<f64>,
    ) -> ConvertResult<ConvertedPose> {
        let position = self.convert(point)?;

        if !self.settings.correct_meridian_convergence {
            return Ok(ConvertedPose {
                position,
                meridian_convergence: None,
                orientation: *orientation,
            });
        }

        let convergence = self.meridian_convergence(&position)?;
        Ok(ConvertedPose {
            position,
            meridian_convergence: Some(convergence),
            orientation: apply_meridian_convergence(orientation, convergence),
        })
    }

    fn utm(&self, point: &GeodeticPoint, vertical: &dyn GeoidModel) -> ConvertResult<UtmPosition> {
        match self.settings.lock_utm_zone {
            Some(zone) => to_utm_in_zone(point, zone, vertical),
            None => to_utm(point, vertical),
        }
    }

    fn vertical_model(&self) -> &dyn GeoidModel {
        match self.settings.height_type {
            HeightType::Orthometric => self.geoid.as_ref(),
            HeightType::Ellipsoidal => &ELLIPSOIDAL,
        }
    }
}

impl std::fmt::Debug for CoordinateConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateConverter")
            .field("settings", &self.settings)
            .field("geoid", &self.geoid.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::attitude::{quaternion_to_rpy, rpy_to_quaternion, EulerAngles};

    fn converter(settings: ConverterSettings) -> CoordinateConverter {
        CoordinateConverter::new(settings, Arc::new(FixedUndulation::new(36.5)))
    }

    fn tokyo() -> GeodeticPoint {
        GeodeticPoint::new(35.6812, 139.7671, 30.0)
    }

    #[test]
    fn test_default_settings() {
        let settings = ConverterSettings::default();
        assert_eq!(settings.coordinate, CoordinateSystem::Plane);
        assert_eq!(settings.height_type, HeightType::Orthometric);
        assert_eq!(settings.plane_zone, 7);
        assert_eq!(settings.mgrs_precision, MgrsPrecision::HundredMicrometers);
        assert!(settings.correct_meridian_convergence);
    }

    #[test]
    fn test_convert_routes_to_configured_system() {
        for system in [
            CoordinateSystem::Utm,
            CoordinateSystem::Mgrs,
            CoordinateSystem::Plane,
            CoordinateSystem::LocalCartesian,
        ] {
            let converter = converter(ConverterSettings {
                coordinate: system,
                plane_zone: 9,
                local_origin: Some(GeodeticPoint::new(35.68, 139.76, 0.0)),
                ..ConverterSettings::default()
            });
            let position = converter.convert(&tokyo()).unwrap();
            assert_eq!(position.coordinate_system(), system);
            assert_eq!(position.geodetic(), &tokyo());
        }
    }

    #[test]
    fn test_height_type() {
        let orthometric = converter(ConverterSettings {
            coordinate: CoordinateSystem::Utm,
            ..ConverterSettings::default()
        });
        assert!((orthometric.convert(&tokyo()).unwrap().height() + 6.5).abs() < 1e-9);

        let ellipsoidal = converter(ConverterSettings {
            coordinate: CoordinateSystem::Utm,
            height_type: HeightType::Ellipsoidal,
            ..ConverterSettings::default()
        });
        assert_eq!(ellipsoidal.convert(&tokyo()).unwrap().height(), 30.0);
    }

    #[test]
    fn test_local_cartesian_requires_origin() {
        let converter = converter(ConverterSettings {
            coordinate: CoordinateSystem::LocalCartesian,
            ..ConverterSettings::default()
        });
        assert_eq!(converter.convert(&tokyo()), Err(ConvertError::MissingOrigin));
    }

    #[test]
    fn test_locked_zone() {
        let converter = converter(ConverterSettings {
            coordinate: CoordinateSystem::Mgrs,
            lock_utm_zone: Some(53),
            ..ConverterSettings::default()
        });
        match converter.convert(&GeodeticPoint::new(35.0, 138.1, 0.0)).unwrap() {
            Position::Mgrs(mgrs) => assert_eq!(mgrs.zone(), 53),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_convert_pose_corrects_yaw() {
        let converter = converter(ConverterSettings {
            coordinate: CoordinateSystem::Mgrs,
            ..ConverterSettings::default()
        });
        let orientation = rpy_to_quaternion(&EulerAngles::new(0.0, 0.0, 0.5));
        let pose = converter.convert_pose(&tokyo(), &orientation).unwrap();

        let gamma = pose.meridian_convergence.unwrap();
        assert!((gamma + 0.012_55).abs() < 1e-4);
        assert!((quaternion_to_rpy(&pose.orientation).yaw - (0.5 - gamma)).abs() < 1e-12);
    }

    #[test]
    fn test_convert_pose_without_correction() {
        let converter = converter(ConverterSettings {
            coordinate: CoordinateSystem::Utm,
            correct_meridian_convergence: false,
            ..ConverterSettings::default()
        });
        let orientation = rpy_to_quaternion(&EulerAngles::new(0.1, 0.2, 0.3));
        let pose = converter.convert_pose(&tokyo(), &orientation).unwrap();
        assert_eq!(pose.meridian_convergence, None);
        assert_eq!(pose.orientation, orientation);
    }

    #[test]
    fn test_convergence_rejected_for_utm() {
        let converter = converter(ConverterSettings {
            coordinate: CoordinateSystem::Utm,
            ..ConverterSettings::default()
        });
        assert_eq!(
            converter.convert_pose(&tokyo(), &UnitQuaternion::identity()),
            Err(ConvertError::UnsupportedConvergenceSystem {
                system: CoordinateSystem::Utm
            })
        );
    }
}
