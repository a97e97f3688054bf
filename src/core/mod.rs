//! Core types, constants and errors for the conversion engine

pub mod constants;
pub mod ellipsoid;
pub mod error;
pub mod types;

pub use constants::*;
pub use ellipsoid::Ellipsoid;
pub use error::{ConvertError, ConvertResult};
pub use types::*;
