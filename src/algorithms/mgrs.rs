//! Military Grid Reference System encoding
//!
//! A reference such as `54SUE8843349290` is a 5-character header (two-digit
//! UTM zone, latitude band, 100 km column and row letters) followed by the
//! easting and northing inside the 100 km square, each truncated to the
//! same number of digits. Encoding produces an [`MgrsReference`] directly;
//! the string form is only rendered or parsed at the edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::utm::{self, central_meridian, latitude_band, to_utm, UtmCoordinate};
use crate::core::{
    ConvertError, ConvertResult, GeodeticPoint, MgrsPosition, MgrsPrecision, UtmPosition,
    MGRS_SQUARE_SIZE, UTM_MAX_LATITUDE, UTM_MIN_LATITUDE,
};
use crate::geoid::GeoidModel;

const LATITUDE_BANDS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";
const COLUMN_LETTERS: [&[u8; 8]; 3] = [b"ABCDEFGH", b"JKLMNPQR", b"STUVWXYZ"];
const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";
/// Row letters restart every 2000 km; even-numbered zones start 5 letters in
const EVEN_ZONE_ROW_SHIFT: i64 = 5;
const NORTHING_CYCLE: f64 = 2_000_000.0;
/// Margin below a band's central-meridian northing where its squares may start
const BAND_NORTHING_SLACK: f64 = 100_000.0;

/// Grid zone designator length: two zone digits, band, column, row
pub const MGRS_HEADER_LEN: usize = 5;

/// Encoding works in integer micrometers so 100 µm digits stay exact
const MICROMETERS_PER_METER: f64 = 1e6;
const SQUARE_MICROMETERS: i64 = 100_000 * 1_000_000;

/// Structured MGRS grid reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MgrsReference {
    pub zone: u8,
    pub band: char,
    /// 100 km column letter
    pub column: char,
    /// 100 km row letter
    pub row: char,
    /// Easting digit block as an integer
    pub easting: u64,
    /// Northing digit block as an integer
    pub northing: u64,
    pub precision: MgrsPrecision,
}

impl MgrsReference {
    /// Encode a UTM coordinate; `latitude` selects the latitude band
    pub fn encode(
        utm: &UtmCoordinate,
        latitude: f64,
        precision: MgrsPrecision,
    ) -> ConvertResult<Self> {
        if !(1..=60).contains(&utm.zone) {
            return Err(ConvertError::InvalidUtmZone {
                zone: utm.zone,
                reason: "zone must be between 1 and 60",
            });
        }
        if !(UTM_MIN_LATITUDE..UTM_MAX_LATITUDE).contains(&latitude) {
            return Err(ConvertError::OutsideUtmDomain { latitude });
        }

        let outside = || ConvertError::OutsideMgrsGrid {
            easting: utm.easting,
            northing: utm.northing,
        };
        if !utm.easting.is_finite() || !utm.northing.is_finite() || utm.northing < 0.0 {
            return Err(outside());
        }

        let ix = (utm.easting * MICROMETERS_PER_METER).floor() as i64;
        let iy = (utm.northing * MICROMETERS_PER_METER).floor() as i64;
        let column_index = ix.div_euclid(SQUARE_MICROMETERS);
        let row_index = iy.div_euclid(SQUARE_MICROMETERS);
        if !(1..=8).contains(&column_index) {
            return Err(outside());
        }

        let zone_index = (utm.zone - 1) as usize;
        let column = COLUMN_LETTERS[zone_index % 3][(column_index - 1) as usize] as char;
        let shift = if zone_index % 2 == 1 { EVEN_ZONE_ROW_SHIFT } else { 0 };
        let row = ROW_LETTERS[(row_index + shift).rem_euclid(20) as usize] as char;
        let band = LATITUDE_BANDS[(latitude_band(latitude) + 10) as usize] as char;

        let divisor = 10i64.pow(11 - precision.digits() as u32);
        let easting = (ix - column_index * SQUARE_MICROMETERS) / divisor;
        let northing = (iy - row_index * SQUARE_MICROMETERS) / divisor;

        Ok(Self {
            zone: utm.zone,
            band,
            column,
            row,
            easting: easting as u64,
            northing: northing as u64,
            precision,
        })
    }

    /// Easting inside the 100 km square (m)
    pub fn easting_m(&self) -> f64 {
        self.easting as f64 * self.precision.meters_per_digit()
    }

    /// Northing inside the 100 km square (m)
    pub fn northing_m(&self) -> f64 {
        self.northing as f64 * self.precision.meters_per_digit()
    }

    /// True for bands N through X
    pub fn is_northern(&self) -> bool {
        self.band >= 'N'
    }

    /// UTM coordinate of the south-west corner of the referenced cell
    pub fn to_utm(&self) -> ConvertResult<UtmCoordinate> {
        let malformed = |detail: &str| ConvertError::MalformedMgrs {
            reference: self.to_string(),
            detail: detail.to_string(),
        };

        if !(1..=60).contains(&self.zone) {
            return Err(malformed("zone must be between 1 and 60"));
        }
        let zone_index = (self.zone - 1) as usize;
        let band_index = letter_index(LATITUDE_BANDS, self.band)
            .ok_or_else(|| malformed("unknown latitude band"))?;
        let column_index = letter_index(COLUMN_LETTERS[zone_index % 3], self.column)
            .ok_or_else(|| malformed("column letter not used in this zone"))?;
        let row_letter = letter_index(ROW_LETTERS, self.row)
            .ok_or_else(|| malformed("unknown row letter"))? as i64;

        let shift = if zone_index % 2 == 1 { EVEN_ZONE_ROW_SHIFT } else { 0 };
        let row_in_cycle = (row_letter - shift).rem_euclid(20);

        let easting = (column_index + 1) as f64 * MGRS_SQUARE_SIZE + self.easting_m();
        let base_northing = row_in_cycle as f64 * MGRS_SQUARE_SIZE + self.northing_m();

        // The band's southern edge fixes which 2000 km cycle the row belongs to
        let band_south = -80.0 + 8.0 * band_index as f64;
        let band_floor =
            utm::forward_in_zone(band_south, central_meridian(self.zone), self.zone)?.northing;
        let cycles = ((band_floor - BAND_NORTHING_SLACK - base_northing) / NORTHING_CYCLE)
            .ceil()
            .max(0.0);

        Ok(UtmCoordinate {
            zone: self.zone,
            northup: self.is_northern(),
            easting,
            northing: base_northing + cycles * NORTHING_CYCLE,
        })
    }
}

impl fmt::Display for MgrsReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.precision.digits();
        write!(
            f,
            "{:02}{}{}{}{:0width$}{:0width$}",
            self.zone,
            self.band,
            self.column,
            self.row,
            self.easting,
            self.northing,
            width = width
        )
    }
}

impl FromStr for MgrsReference {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reference = s.trim().to_ascii_uppercase();
        let malformed = |detail: String| ConvertError::MalformedMgrs {
            reference: reference.clone(),
            detail,
        };

        let bytes = reference.as_bytes();
        if !reference.is_ascii() || bytes.len() < MGRS_HEADER_LEN {
            return Err(malformed(format!(
                "expected a {}-character grid zone header",
                MGRS_HEADER_LEN
            )));
        }

        let (header, digits) = bytes.split_at(MGRS_HEADER_LEN);
        if !header[0].is_ascii_digit() || !header[1].is_ascii_digit() {
            return Err(malformed("header must start with a two-digit zone".to_string()));
        }
        let zone = (header[0] - b'0') * 10 + (header[1] - b'0');
        if !(1..=60).contains(&zone) {
            return Err(malformed(format!("zone {} is out of range", zone)));
        }

        let band = header[2] as char;
        let column = header[3] as char;
        let row = header[4] as char;
        if letter_index(LATITUDE_BANDS, band).is_none() {
            return Err(malformed(format!("unknown latitude band '{}'", band)));
        }
        if letter_index(COLUMN_LETTERS[(zone as usize - 1) % 3], column).is_none() {
            return Err(malformed(format!("column '{}' is not used in zone {}", column, zone)));
        }
        if letter_index(ROW_LETTERS, row).is_none() {
            return Err(malformed(format!("unknown row letter '{}'", row)));
        }

        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(malformed("coordinate blocks must be digits".to_string()));
        }
        if digits.len() % 2 != 0 {
            return Err(malformed(format!("{} digits cannot split into two blocks", digits.len())));
        }
        let block_len = digits.len() / 2;
        let precision = MgrsPrecision::from_digits(block_len)
            .ok_or_else(|| malformed(format!("unsupported precision of {} digits", block_len)))?;

        let (easting, northing) = digits.split_at(digits.len() / 2);
        let parse_block = |block: &[u8]| -> Result<u64, ConvertError> {
            std::str::from_utf8(block)
                .ok()
                .and_then(|text| text.parse::<u64>().ok())
                .ok_or_else(|| malformed("unreadable digit block".to_string()))
        };

        Ok(Self {
            zone,
            band,
            column,
            row,
            easting: parse_block(easting)?,
            northing: parse_block(northing)?,
            precision,
        })
    }
}

impl From<&UtmPosition> for UtmCoordinate {
    fn from(position: &UtmPosition) -> Self {
        Self {
            zone: position.zone,
            northup: position.northup,
            easting: position.easting,
            northing: position.northing,
        }
    }
}

/// Re-express a UTM position as MGRS at the requested precision
///
/// The height is carried over unchanged from the UTM position.
pub fn utm_to_mgrs(utm: &UtmPosition, precision: MgrsPrecision) -> ConvertResult<MgrsPosition> {
    let reference = MgrsReference::encode(&utm.into(), utm.geodetic.latitude, precision)?;
    tracing::trace!(%reference, "mgrs");

    Ok(MgrsPosition {
        reference,
        northup: utm.northup,
        x: reference.easting_m(),
        y: reference.northing_m(),
        z: utm.height,
        geodetic: utm.geodetic,
    })
}

/// Geodetic sample to MGRS by way of UTM
pub fn to_mgrs(
    point: &GeodeticPoint,
    geoid: &dyn GeoidModel,
    precision: MgrsPrecision,
) -> ConvertResult<MgrsPosition> {
    let utm = to_utm(point, geoid)?;
    utm_to_mgrs(&utm, precision)
}

fn letter_index(letters: &[u8], letter: char) -> Option<usize> {
    letters.iter().position(|&l| l as char == letter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoid::FixedUndulation;

    fn encode(latitude: f64, longitude: f64, precision: MgrsPrecision) -> MgrsReference {
        let utm = utm::forward(latitude, longitude).unwrap();
        MgrsReference::encode(&utm, latitude, precision).unwrap()
    }

    #[test]
    fn test_reference_encodings() {
        let cases = [
            (33.3, 44.4, "38SMB4414084706"),
            (35.6812, 139.7671, "54SUE8843349290"),
            (-33.8568, 151.2153, "56HLH3490052288"),
            (40.689247, -74.044502, "18TWL8073504700"),
        ];
        for (lat, lon, expected) in cases {
            assert_eq!(encode(lat, lon, MgrsPrecision::OneMeter).to_string(), expected);
        }
    }

    #[test]
    fn test_precision_truncates_digits() {
        let km = encode(35.6812, 139.7671, MgrsPrecision::OneKilometer);
        assert_eq!(km.to_string(), "54SUE8849");
        assert_eq!(km.easting_m(), 88_000.0);
        assert_eq!(km.northing_m(), 49_000.0);

        let mm = encode(35.6812, 139.7671, MgrsPrecision::OneMillimeter);
        assert_eq!(mm.to_string(), "54SUE8843337449290013");
        assert!((mm.easting_m() - 88_433.374).abs() < 1e-9);
        assert!((mm.northing_m() - 49_290.013).abs() < 1e-9);
    }

    #[test]
    fn test_zero_padding_near_square_edge() {
        let reference = encode(0.00001, 36.8, MgrsPrecision::OneMeter);
        assert_eq!(reference.to_string(), "37NBA5513400001");
        assert_eq!(reference.northing, 1);
    }

    #[test]
    fn test_parse_reference() {
        let reference: MgrsReference = "54SUE8843349290".parse().unwrap();
        assert_eq!(reference.zone, 54);
        assert_eq!(reference.band, 'S');
        assert_eq!(reference.column, 'U');
        assert_eq!(reference.row, 'E');
        assert_eq!(reference.precision, MgrsPrecision::OneMeter);
        assert_eq!(reference.easting_m(), 88_433.0);
        assert_eq!(reference.northing_m(), 49_290.0);

        let lower: MgrsReference = " 38smb441847 ".parse().unwrap();
        assert_eq!(lower.precision, MgrsPrecision::HundredMeters);
        assert_eq!(lower.easting_m(), 44_100.0);
        assert_eq!(lower.northing_m(), 84_700.0);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let malformed = [
            "54SU",
            "4QFJ12345678",
            "54SUE123",
            "54SUE12A4",
            "61SUE1234",
            "54IUE1234",
            "54SAE1234",
            "54SUE",
        ];
        for bad in malformed {
            assert!(
                matches!(bad.parse::<MgrsReference>(), Err(ConvertError::MalformedMgrs { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_decode_recovers_utm() {
        let samples = [
            (35.6812, 139.7671),
            (-33.8568, 151.2153),
            (-0.0001, 36.8),
            (71.5, -8.0),
            (-79.5, 100.0),
        ];
        for &(lat, lon) in &samples {
            let utm = utm::forward(lat, lon).unwrap();
            let reference = MgrsReference::encode(&utm, lat, MgrsPrecision::OneMeter).unwrap();
            let decoded = reference.to_utm().unwrap();

            assert_eq!(decoded.zone, utm.zone);
            assert_eq!(decoded.northup, utm.northup);
            let (de, dn) = (utm.easting - decoded.easting, utm.northing - decoded.northing);
            assert!(de > -1e-6 && de < 1.0, "easting off by {}", de);
            assert!(dn > -1e-6 && dn < 1.0, "northing off by {}", dn);
        }
    }

    #[test]
    fn test_encode_rejects_off_grid_easting() {
        let utm = UtmCoordinate {
            zone: 54,
            northup: true,
            easting: 50_000.0,
            northing: 3_900_000.0,
        };
        assert!(matches!(
            MgrsReference::encode(&utm, 35.0, MgrsPrecision::OneMeter),
            Err(ConvertError::OutsideMgrsGrid { .. })
        ));
    }

    #[test]
    fn test_utm_to_mgrs_keeps_height_and_geodetic() {
        let point = GeodeticPoint::new(35.6812, 139.7671, 30.0);
        let geoid = FixedUndulation::new(36.5);
        let utm = to_utm(&point, &geoid).unwrap();
        let mgrs = utm_to_mgrs(&utm, MgrsPrecision::OneMeter).unwrap();

        assert_eq!(mgrs.zone(), 54);
        assert!(mgrs.northup);
        assert_eq!(mgrs.x, 88_433.0);
        assert_eq!(mgrs.y, 49_290.0);
        assert_eq!(mgrs.z, utm.height);
        assert_eq!(mgrs.geodetic, point);

        let direct = to_mgrs(&point, &geoid, MgrsPrecision::OneMeter).unwrap();
        assert_eq!(direct, mgrs);
    }
}
