//! Conversion API
//!
//! `CoordinateConverter` is the entry point for callers that have resolved
//! their configuration into `ConverterSettings`.

pub mod converter;

pub use converter::{ConvertedPose, ConverterSettings, CoordinateConverter};
