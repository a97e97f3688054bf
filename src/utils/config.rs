use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::algorithms::plane::{JapanPlaneRectangular, PlaneProjector};
use crate::api::{ConverterSettings, CoordinateConverter};
use crate::core::{ConvertResult, CoordinateSystem, HeightType, MgrsPrecision};
use crate::geoid::{FixedUndulation, GeoidGrid, GeoidModel, DEFAULT_GEOID_MODEL};

/// Where geoid undulations come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoidConfig {
    /// Model name resolved to `<name>.pgm` on the geoid search path
    pub name: String,
    /// Explicit grid file, overriding the search path
    pub path: Option<PathBuf>,
    /// Constant undulation instead of a grid (m)
    pub fixed_undulation: Option<f64>,
}

impl Default for GeoidConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_GEOID_MODEL.to_string(),
            path: None,
            fixed_undulation: None,
        }
    }
}

/// Complete converter configuration as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub coordinate_convert: ConverterSettings,
    pub geoid: GeoidConfig,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Missing required parameter
    MissingParameter { parameter: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl ConverterConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: ConverterConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        tracing::debug!(
            path = %path_str,
            coordinate = %config.coordinate_convert.coordinate,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    /// Check parameter ranges and combinations
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.coordinate_convert;
        let plane_zones = JapanPlaneRectangular.zones();

        if !plane_zones.contains(&settings.plane_zone) {
            return Err(ConfigError::InvalidParameter {
                parameter: "coordinate_convert.plane_zone".to_string(),
                value: settings.plane_zone.to_string(),
                reason: format!(
                    "Plane zone must be between {} and {}",
                    plane_zones.start(),
                    plane_zones.end()
                ),
            });
        }

        if let Some(zone) = settings.lock_utm_zone {
            if !(1..=60).contains(&zone) {
                return Err(ConfigError::InvalidParameter {
                    parameter: "coordinate_convert.lock_utm_zone".to_string(),
                    value: zone.to_string(),
                    reason: "UTM zone must be between 1 and 60".to_string(),
                });
            }
        }

        match settings.local_origin {
            None if settings.coordinate == CoordinateSystem::LocalCartesian => {
                return Err(ConfigError::MissingParameter {
                    parameter: "coordinate_convert.local_origin".to_string(),
                });
            }
            Some(origin) if !origin.latitude.is_finite()
                || !origin.longitude.is_finite()
                || !origin.altitude.is_finite()
                || origin.latitude.abs() > 90.0 =>
            {
                return Err(ConfigError::InvalidParameter {
                    parameter: "coordinate_convert.local_origin".to_string(),
                    value: format!("{:?}", origin),
                    reason: "Origin must be a finite point with |latitude| <= 90".to_string(),
                });
            }
            _ => {}
        }

        let estimator = &settings.convergence;
        for (parameter, value) in [
            ("coordinate_convert.convergence.latitude_offset_deg", estimator.latitude_offset_deg),
            ("coordinate_convert.convergence.grid_offset_m", estimator.grid_offset_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                    reason: "Offset must be positive and finite".to_string(),
                });
            }
        }

        if settings.correct_meridian_convergence
            && !matches!(settings.coordinate, CoordinateSystem::Plane | CoordinateSystem::Mgrs)
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "coordinate_convert.correct_meridian_convergence".to_string(),
                value: "true".to_string(),
                reason: format!(
                    "Meridian convergence is only available for PLANE and MGRS, not {}",
                    settings.coordinate
                ),
            });
        }

        if settings.correct_meridian_convergence
            && settings.coordinate == CoordinateSystem::Mgrs
            && settings.mgrs_precision < MgrsPrecision::OneMillimeter
        {
            return Err(ConfigError::InvalidParameter {
                parameter: "coordinate_convert.mgrs_precision".to_string(),
                value: u8::from(settings.mgrs_precision).to_string(),
                reason: "Meridian convergence needs MGRS precision of at least 8 digits"
                    .to_string(),
            });
        }

        if let Some(undulation) = self.geoid.fixed_undulation {
            if !undulation.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "geoid.fixed_undulation".to_string(),
                    value: undulation.to_string(),
                    reason: "Undulation must be finite".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Geoid model for orthometric heights
    ///
    /// Ellipsoidal output never reads a grid.
    pub fn load_geoid(&self) -> ConvertResult<Arc<dyn GeoidModel>> {
        if self.coordinate_convert.height_type == HeightType::Ellipsoidal {
            return Ok(Arc::new(FixedUndulation::ellipsoidal()));
        }
        if let Some(undulation) = self.geoid.fixed_undulation {
            return Ok(Arc::new(FixedUndulation::new(undulation)));
        }
        let grid = match &self.geoid.path {
            Some(path) => GeoidGrid::open(path)?,
            None => GeoidGrid::open_named(&self.geoid.name)?,
        };
        Ok(Arc::new(grid))
    }

    /// Converter with the configured settings and geoid
    pub fn build_converter(&self) -> ConvertResult<CoordinateConverter> {
        let geoid = self.load_geoid()?;
        Ok(CoordinateConverter::new(self.coordinate_convert, geoid))
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid parameter '{}' = '{}': {}", parameter, value, reason)
            }
            ConfigError::MissingParameter { parameter } => {
                write!(f, "Missing required parameter: {}", parameter)
            }
            ConfigError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
            ConfigError::SerializationError { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
