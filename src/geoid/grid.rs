//! Gridded geoid models in GeographicLib's PGM format
//!
//! The grid file is a binary PGM (`P5`) with 16-bit big-endian samples. The
//! header carries `# Offset` and `# Scale` comments; the undulation of a
//! sample is `offset + scale * raw`. Rows run from 90°N to 90°S and columns
//! from 0°E eastward, with the 90°S row included, so a grid of `width`
//! columns has `width / 2 + 1` rows.
//!
//! Interpolation is bilinear between the four surrounding nodes.
//! GeographicLib defaults to cubic interpolation, so values between nodes
//! can differ from its output by a few millimetres on the 1' grids.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::GeoidModel;
use crate::core::{ConvertError, ConvertResult};

const GEOID_PATH_ENV: &str = "GEOGRAPHICLIB_GEOID_PATH";
const DATA_PATH_ENV: &str = "GEOGRAPHICLIB_DATA";
const DEFAULT_GEOID_DIRS: [&str; 2] = [
    "/usr/local/share/GeographicLib/geoids",
    "/usr/share/GeographicLib/geoids",
];

/// Geoid undulation grid held in memory, interpolated bilinearly
#[derive(Debug, Clone)]
pub struct GeoidGrid {
    name: String,
    width: usize,
    height: usize,
    /// Degrees between adjacent samples
    resolution: f64,
    offset: f64,
    scale: f64,
    /// Raw big-endian samples, row-major
    samples: Vec<u8>,
}

impl GeoidGrid {
    /// Load `<name>.pgm` from the GeographicLib geoid search path
    pub fn open_named(name: &str) -> ConvertResult<Self> {
        Self::open_in(name, &Self::search_dirs())
    }

    /// Load `<name>.pgm` from the first of `dirs` that contains it
    pub fn open_in(name: &str, dirs: &[PathBuf]) -> ConvertResult<Self> {
        let file_name = format!("{}.pgm", name);
        let path = dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ConvertError::GeoidUnavailable {
                name: name.to_string(),
                reason: format!(
                    "{} not found in {}",
                    file_name,
                    dirs.iter()
                        .map(|d| d.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;

        let mut grid = Self::open(&path)?;
        grid.name = name.to_string();
        Ok(grid)
    }

    /// Load a grid file from an explicit path
    pub fn open<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let bytes = fs::read(path).map_err(|e| ConvertError::GeoidUnavailable {
            name: path_str.clone(),
            reason: e.to_string(),
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| path_str.clone());

        let grid = Self::from_pgm(name, bytes).map_err(|detail| ConvertError::GeoidFormat {
            path: path_str,
            detail,
        })?;

        tracing::info!(
            geoid = %grid.name,
            width = grid.width,
            height = grid.height,
            resolution_deg = grid.resolution,
            "loaded geoid grid"
        );

        Ok(grid)
    }

    /// Directories searched by [`GeoidGrid::open_named`], in order
    pub fn search_dirs() -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Ok(path) = env::var(GEOID_PATH_ENV) {
            if !path.is_empty() {
                dirs.push(PathBuf::from(path));
            }
        }
        if let Ok(path) = env::var(DATA_PATH_ENV) {
            if !path.is_empty() {
                dirs.push(Path::new(&path).join("geoids"));
            }
        }
        dirs.extend(DEFAULT_GEOID_DIRS.iter().map(PathBuf::from));
        dirs
    }

    fn from_pgm(name: String, mut bytes: Vec<u8>) -> Result<Self, String> {
        let mut cursor = 0;
        let magic = next_line(&bytes, &mut cursor).ok_or("empty file")?;
        if magic.trim() != "P5" {
            return Err(format!("expected P5 magic, found '{}'", magic.trim()));
        }

        let mut offset = None;
        let mut scale = None;
        let mut numbers: Vec<usize> = Vec::with_capacity(3);

        while numbers.len() < 3 {
            let line = next_line(&bytes, &mut cursor).ok_or("truncated header")?;
            if let Some(comment) = line.strip_prefix('#') {
                let mut parts = comment.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("Offset"), Some(value)) => {
                        let parsed = value.parse::<f64>();
                        offset = Some(parsed.map_err(|e| format!("bad Offset: {}", e))?);
                    }
                    (Some("Scale"), Some(value)) => {
                        let parsed = value.parse::<f64>();
                        scale = Some(parsed.map_err(|e| format!("bad Scale: {}", e))?);
                    }
                    _ => {}
                }
                continue;
            }
            for token in line.split_whitespace() {
                let value = token
                    .parse::<usize>()
                    .map_err(|e| format!("bad header value '{}': {}", token, e))?;
                numbers.push(value);
            }
        }

        if numbers.len() != 3 {
            return Err("header must hold exactly width, height and maxval".to_string());
        }
        let (width, height, max_value) = (numbers[0], numbers[1], numbers[2]);

        let offset = offset.ok_or("missing '# Offset' header")?;
        let scale = scale.ok_or("missing '# Scale' header")?;
        if max_value != u16::MAX as usize {
            return Err(format!("expected 16-bit samples, maxval is {}", max_value));
        }
        let columns = height
            .checked_sub(1)
            .and_then(|rows| rows.checked_mul(2))
            .ok_or("grid dimensions overflow")?;
        if width < 2 || height < 2 || columns != width {
            return Err(format!("{}x{} grid does not cover the globe", width, height));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|cells| cells.checked_mul(2))
            .ok_or("grid dimensions overflow")?;
        let found = bytes.len() - cursor;
        if found != expected {
            return Err(format!("expected {} sample bytes, found {}", expected, found));
        }
        bytes.drain(..cursor);
        let samples = bytes;

        Ok(Self {
            name,
            width,
            height,
            resolution: 360.0 / width as f64,
            offset,
            scale,
            samples,
        })
    }

    /// Grid spacing in degrees
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    fn raw(&self, row: usize, col: usize) -> f64 {
        let index = (row * self.width + col) * 2;
        u16::from_be_bytes([self.samples[index], self.samples[index + 1]]) as f64
    }
}

impl GeoidModel for GeoidGrid {
    fn undulation(&self, latitude: f64, longitude: f64) -> ConvertResult<f64> {
        if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 {
            return Err(ConvertError::OutsideGeoidDomain { latitude, longitude });
        }

        let row = (90.0 - latitude) / self.resolution;
        let col = longitude.rem_euclid(360.0) / self.resolution;

        let r0 = (row.floor() as usize).min(self.height - 2);
        let c0 = (col.floor() as usize).min(self.width - 1);
        let c1 = (c0 + 1) % self.width;
        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let north = self.raw(r0, c0) * (1.0 - fc) + self.raw(r0, c1) * fc;
        let south = self.raw(r0 + 1, c0) * (1.0 - fc) + self.raw(r0 + 1, c1) * fc;
        let value = north * (1.0 - fr) + south * fr;

        Ok(self.offset + self.scale * value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Next newline-terminated header line, advancing `cursor` past the newline
fn next_line<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<&'a str> {
    if *cursor >= bytes.len() {
        return None;
    }
    let start = *cursor;
    let end = bytes[start..].iter().position(|&b| b == b'\n')? + start;
    *cursor = end + 1;
    std::str::from_utf8(&bytes[start..end]).ok()
}
