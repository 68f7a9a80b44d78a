// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dead-time correction factor as a function of time.

use crate::io::{ColumnReader, IoError};

use super::cursor::{interpolate_linear, DomainError, LinearCursor};

fn hdu_name(tm: u8) -> String {
    format!("DEADCOR{tm}")
}

/// `TIME`/`DEADC` samples, interpolated the same way as [`super::attitude::AttitudeTable`].
#[derive(Clone, Debug)]
pub struct DeadCorTable {
    time: Vec<f64>,
    deadc: Vec<f64>,
    cursor: LinearCursor,
}

impl DeadCorTable {
    pub fn read(reader: &mut dyn ColumnReader, tm: u8) -> Result<Self, IoError> {
        let hdu = hdu_name(tm);
        let time = reader.read_f64(&hdu, "TIME")?;
        let deadc = reader.read_f64(&hdu, "DEADC")?;
        if deadc.len() != time.len() {
            return Err(IoError::ColumnLengthMismatch("DEADC".to_string(), deadc.len(), time.len()));
        }
        Ok(Self {
            time,
            deadc,
            cursor: LinearCursor::new(),
        })
    }

    pub fn interpolate(&mut self, t: f64) -> Result<f64, DomainError> {
        let idx = self.cursor.seek(&self.time, t)?;
        Ok(interpolate_linear(&self.time, &self.deadc, idx, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::column::fake::FakeColumnReader;

    #[test]
    fn interpolates_dead_time_fraction() {
        let mut fake = FakeColumnReader::default();
        let hdu = hdu_name(1);
        fake.f64_cols.insert((hdu.clone(), "TIME".into()), vec![0.0, 100.0]);
        fake.f64_cols.insert((hdu, "DEADC".into()), vec![0.9, 0.95]);

        let mut dc = DeadCorTable::read(&mut fake, 1).unwrap();
        let v = dc.interpolate(50.0).unwrap();
        assert!((v - 0.925).abs() < 1e-9);
    }
}
