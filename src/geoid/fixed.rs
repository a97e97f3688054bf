//! Constant-undulation geoid model

use super::GeoidModel;
use crate::core::{ConvertError, ConvertResult};

/// Geoid model returning the same undulation everywhere
///
/// A zero undulation turns orthometric heights into ellipsoidal heights,
/// which is how the converter serves `HeightType::Ellipsoidal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedUndulation {
    undulation: f64,
}

impl FixedUndulation {
    pub const fn new(undulation: f64) -> Self {
        Self { undulation }
    }

    /// Model that leaves ellipsoidal heights untouched
    pub const fn ellipsoidal() -> Self {
        Self::new(0.0)
    }
}

impl GeoidModel for FixedUndulation {
    fn undulation(&self, latitude: f64, longitude: f64) -> ConvertResult<f64> {
        if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 {
            return Err(ConvertError::OutsideGeoidDomain { latitude, longitude });
        }
        Ok(self.undulation)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_undulation() {
        let model = FixedUndulation::new(12.5);
        assert_eq!(model.undulation(10.0, 200.0).unwrap(), 12.5);
        assert_eq!(FixedUndulation::ellipsoidal().undulation(-90.0, 0.0).unwrap(), 0.0);
        assert!(model.undulation(f64::NAN, 0.0).is_err());
    }
}
