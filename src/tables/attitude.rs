// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spacecraft attitude (pointing RA/Dec/roll) as a function of time.

use crate::io::{ColumnReader, IoError};

use super::cursor::{interpolate_angle_deg, interpolate_linear, DomainError, LinearCursor};

/// HDU name attitude is read from, parameterized by telescope module.
fn hdu_name(tm: u8) -> String {
    format!("CORRATT{tm}")
}

/// `TIME`/`RA`/`DEC`/`ROLL` samples for one telescope module, with a cached
/// cursor for fast repeated interpolation.
#[derive(Clone, Debug)]
pub struct AttitudeTable {
    time: Vec<f64>,
    ra: Vec<f64>,
    dec: Vec<f64>,
    roll: Vec<f64>,
    cursor: LinearCursor,
}

impl AttitudeTable {
    pub fn read(reader: &mut dyn ColumnReader, tm: u8) -> Result<Self, IoError> {
        let hdu = hdu_name(tm);
        let time = reader.read_f64(&hdu, "TIME")?;
        let ra = reader.read_f64(&hdu, "RA")?;
        let dec = reader.read_f64(&hdu, "DEC")?;
        let roll = reader.read_f64(&hdu, "ROLL")?;

        for (name, col) in [("RA", &ra), ("DEC", &dec), ("ROLL", &roll)] {
            if col.len() != time.len() {
                return Err(IoError::ColumnLengthMismatch(name.to_string(), col.len(), time.len()));
            }
        }

        Ok(Self {
            time,
            ra,
            dec,
            roll,
            cursor: LinearCursor::new(),
        })
    }

    /// Interpolated `(ra, dec, roll)`, all degrees, at time `t` (MET
    /// seconds).
    pub fn interpolate(&mut self, t: f64) -> Result<(f64, f64, f64), DomainError> {
        let idx = self.cursor.seek(&self.time, t)?;
        let ra = interpolate_linear(&self.time, &self.ra, idx, t);
        let dec = interpolate_linear(&self.time, &self.dec, idx, t);
        let roll = interpolate_angle_deg(&self.time, &self.roll, idx, t);
        Ok((ra, dec, roll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::column::fake::FakeColumnReader;

    fn fixture() -> FakeColumnReader {
        let mut fake = FakeColumnReader::default();
        let hdu = hdu_name(1);
        fake.f64_cols.insert((hdu.clone(), "TIME".into()), vec![0.0, 10.0, 20.0]);
        fake.f64_cols.insert((hdu.clone(), "RA".into()), vec![100.0, 101.0, 102.0]);
        fake.f64_cols.insert((hdu.clone(), "DEC".into()), vec![-10.0, -10.0, -10.0]);
        fake.f64_cols.insert((hdu, "ROLL".into()), vec![0.0, 0.0, 0.0]);
        fake
    }

    #[test]
    fn interpolates_linearly_between_samples() {
        let mut fake = fixture();
        let mut att = AttitudeTable::read(&mut fake, 1).unwrap();
        let (ra, dec, roll) = att.interpolate(5.0).unwrap();
        assert!((ra - 100.5).abs() < 1e-9);
        assert_eq!(dec, -10.0);
        assert_eq!(roll, 0.0);
    }

    #[test]
    fn out_of_range_time_is_an_error() {
        let mut fake = fixture();
        let mut att = AttitudeTable::read(&mut fake, 1).unwrap();
        assert!(att.interpolate(100.0).is_err());
    }

    #[test]
    fn roll_interpolates_across_the_180_wrap() {
        let mut fake = FakeColumnReader::default();
        let hdu = hdu_name(1);
        fake.f64_cols.insert((hdu.clone(), "TIME".into()), vec![0.0, 10.0]);
        fake.f64_cols.insert((hdu.clone(), "RA".into()), vec![100.0, 100.0]);
        fake.f64_cols.insert((hdu.clone(), "DEC".into()), vec![-10.0, -10.0]);
        fake.f64_cols.insert((hdu, "ROLL".into()), vec![179.0, -179.0]);

        let mut att = AttitudeTable::read(&mut fake, 1).unwrap();
        let (_, _, roll) = att.interpolate(5.0).unwrap();
        assert!((roll.abs() - 180.0).abs() < 1e-6, "expected +-180, got {roll}");
    }
}
