//! Configuration loading

pub mod config;

pub use config::{ConfigError, ConverterConfig, GeoidConfig};
