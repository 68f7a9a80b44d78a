// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The event list: one row per detected photon, filtered down to a single
//! telescope module, a PI (pulse invariant energy) band, and the good-time
//! intervals.

use crate::io::{ColumnReader, IoError};

use super::gti::GtiTable;

const HDU: &str = "EVENTS";

/// A photon event list. All columns stay the same length and move in
/// lockstep under every `filter_*` call.
#[derive(Clone, Debug, Default)]
pub struct EventTable {
    pub rawx: Vec<i16>,
    pub rawy: Vec<i16>,
    pub tm_nr: Vec<i16>,
    pub ra: Vec<f64>,
    pub dec: Vec<f64>,
    pub time: Vec<f64>,
    pub pi: Vec<f32>,
    pub subx: Vec<f32>,
    pub suby: Vec<f32>,
    pub ccdx: Vec<f32>,
    pub ccdy: Vec<f32>,
}

impl EventTable {
    /// Read the whole `EVENTS` HDU and keep only the rows matching
    /// telescope module `tm` (`TM_NR` column). Derives `ccdx`/`ccdy` as
    /// `rawx + subx`/`rawy + suby`.
    pub fn read(reader: &mut dyn ColumnReader, tm: u8) -> Result<Self, IoError> {
        let rawx = reader.read_i16(HDU, "RAWX")?;
        let rawy = reader.read_i16(HDU, "RAWY")?;
        let tm_nr = reader.read_i16(HDU, "TM_NR")?;
        let ra = reader.read_f64(HDU, "RA")?;
        let dec = reader.read_f64(HDU, "DEC")?;
        let time = reader.read_f64(HDU, "TIME")?;
        let pi = reader.read_f32(HDU, "PI")?;
        let subx = reader.read_f32(HDU, "SUBX")?;
        let suby = reader.read_f32(HDU, "SUBY")?;

        let ccdx: Vec<f32> = rawx.iter().zip(&subx).map(|(&x, &s)| x as f32 + s).collect();
        let ccdy: Vec<f32> = rawy.iter().zip(&suby).map(|(&y, &s)| y as f32 + s).collect();

        let mut table = Self {
            rawx,
            rawy,
            tm_nr,
            ra,
            dec,
            time,
            pi,
            subx,
            suby,
            ccdx,
            ccdy,
        };
        table.filter_tm(tm);
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn retain_indices(&mut self, keep: &[bool]) {
        fn apply<T>(v: &mut Vec<T>, keep: &[bool]) {
            let mut i = 0usize;
            v.retain(|_| {
                let k = keep[i];
                i += 1;
                k
            });
        }
        apply(&mut self.rawx, keep);
        apply(&mut self.rawy, keep);
        apply(&mut self.tm_nr, keep);
        apply(&mut self.ra, keep);
        apply(&mut self.dec, keep);
        apply(&mut self.time, keep);
        apply(&mut self.pi, keep);
        apply(&mut self.subx, keep);
        apply(&mut self.suby, keep);
        apply(&mut self.ccdx, keep);
        apply(&mut self.ccdy, keep);
    }

    /// Keep only events whose `TM_NR` matches telescope module `tm`.
    pub fn filter_tm(&mut self, tm: u8) {
        let keep: Vec<bool> = self.tm_nr.iter().map(|&n| n as u8 == tm).collect();
        self.retain_indices(&keep);
    }

    /// Keep only events with `pi` in `[lo, hi)`.
    pub fn filter_pi(&mut self, lo: f32, hi: f32) {
        let keep: Vec<bool> = self.pi.iter().map(|&p| p >= lo && p < hi).collect();
        self.retain_indices(&keep);
    }

    /// Keep only events whose time falls within one of `gti`'s intervals.
    pub fn filter_gti(&mut self, gti: &GtiTable) {
        let keep: Vec<bool> = self.time.iter().map(|&t| gti.contains(t)).collect();
        self.retain_indices(&keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::column::fake::FakeColumnReader;

    fn fixture() -> FakeColumnReader {
        let mut fake = FakeColumnReader::default();
        fake.i16_cols.insert((HDU.into(), "RAWX".into()), vec![10, 20, 30]);
        fake.i16_cols.insert((HDU.into(), "RAWY".into()), vec![1, 2, 3]);
        fake.i16_cols.insert((HDU.into(), "TM_NR".into()), vec![1, 2, 1]);
        fake.f64_cols.insert((HDU.into(), "RA".into()), vec![1.0, 2.0, 3.0]);
        fake.f64_cols.insert((HDU.into(), "DEC".into()), vec![1.0, 2.0, 3.0]);
        fake.f64_cols.insert((HDU.into(), "TIME".into()), vec![0.0, 5.0, 10.0]);
        fake.f32_cols.insert((HDU.into(), "PI".into()), vec![300.0, 500.0, 2000.0]);
        fake.f32_cols.insert((HDU.into(), "SUBX".into()), vec![0.1, 0.2, 0.3]);
        fake.f32_cols.insert((HDU.into(), "SUBY".into()), vec![0.1, 0.2, 0.3]);
        fake
    }

    #[test]
    fn filters_by_telescope_module_and_derives_ccd_coords() {
        let mut fake = fixture();
        let events = EventTable::read(&mut fake, 1).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events.rawx, vec![10, 30]);
        assert!((events.ccdx[0] - 10.1).abs() < 1e-6);
    }

    #[test]
    fn filter_pi_keeps_lockstep_columns() {
        let mut fake = fixture();
        let mut events = EventTable::read(&mut fake, 1).unwrap();
        events.filter_pi(300.0, 2300.0);
        assert_eq!(events.len(), 2);
        events.filter_pi(1000.0, 3000.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events.rawx, vec![30]);
    }

    #[test]
    fn filter_gti_drops_events_outside_good_time() {
        let mut fake = fixture();
        let mut events = EventTable::read(&mut fake, 1).unwrap();
        let gti = GtiTable {
            start: vec![0.0],
            stop: vec![1.0],
        };
        events.filter_gti(&gti);
        assert_eq!(events.len(), 1);
        assert_eq!(events.time, vec![0.0]);
    }
}
