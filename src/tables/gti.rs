// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Good-time intervals: the set of `[start, stop)` windows during which
//! the instrument was taking valid data.

use std::ops::BitAndAssign;

use crate::io::{ColumnReader, IoError};

fn hdu_name(tm: u8) -> String {
    format!("GTI{tm}")
}

/// A sorted, non-overlapping set of `[start, stop)` intervals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GtiTable {
    pub start: Vec<f64>,
    pub stop: Vec<f64>,
}

impl GtiTable {
    pub fn read(reader: &mut dyn ColumnReader, tm: u8) -> Result<Self, IoError> {
        let hdu = hdu_name(tm);
        let start = reader.read_f64(&hdu, "START")?;
        let stop = reader.read_f64(&hdu, "STOP")?;
        if stop.len() != start.len() {
            return Err(IoError::ColumnLengthMismatch("STOP".to_string(), stop.len(), start.len()));
        }
        Ok(Self { start, stop })
    }

    pub fn len(&self) -> usize {
        self.start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.start.iter().copied().zip(self.stop.iter().copied())
    }

    /// Does `t` fall in any interval?
    pub fn contains(&self, t: f64) -> bool {
        self.intervals().any(|(s, e)| t >= s && t < e)
    }

    /// The intersection of `self` and `other`: a sweep over both tables'
    /// start/stop events, counting how many tables currently consider the
    /// time "good". An output interval opens when the count first reaches
    /// 2 and closes when it drops below 2; touching endpoints collapse
    /// rather than leaving a zero-width gap.
    pub fn intersect(&self, other: &GtiTable) -> GtiTable {
        #[derive(Clone, Copy)]
        enum Kind {
            Stop,
            Start,
        }

        let mut events: Vec<(f64, Kind)> = Vec::with_capacity(2 * (self.len() + other.len()));
        for (s, e) in self.intervals().chain(other.intervals()) {
            events.push((s, Kind::Start));
            events.push((e, Kind::Stop));
        }
        // Process stops before starts at an equal timestamp so a pair of
        // intervals that exactly touch doesn't spuriously open a
        // zero-width window.
        events.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap()
                .then_with(|| matches!(a.1, Kind::Start).cmp(&matches!(b.1, Kind::Start)))
        });

        let mut out = GtiTable::default();
        let mut count = 0i32;
        let mut open_at: Option<f64> = None;
        for (t, kind) in events {
            match kind {
                Kind::Start => {
                    count += 1;
                    if count == 2 {
                        open_at = Some(t);
                    }
                }
                Kind::Stop => {
                    if count == 2 {
                        if let Some(s) = open_at.take() {
                            if let Some(&last_stop) = out.stop.last() {
                                if (last_stop - s).abs() < 1e-9 {
                                    *out.stop.last_mut().unwrap() = t;
                                    count -= 1;
                                    continue;
                                }
                            }
                            out.start.push(s);
                            out.stop.push(t);
                        }
                    }
                    count -= 1;
                }
            }
        }
        out
    }
}

impl BitAndAssign<&GtiTable> for GtiTable {
    fn bitand_assign(&mut self, rhs: &GtiTable) {
        *self = self.intersect(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_intervals() {
        let a = GtiTable {
            start: vec![0.0, 20.0],
            stop: vec![10.0, 30.0],
        };
        let b = GtiTable {
            start: vec![5.0],
            stop: vec![25.0],
        };
        let i = a.intersect(&b);
        assert_eq!(i.start, vec![5.0, 20.0]);
        assert_eq!(i.stop, vec![10.0, 25.0]);
    }

    #[test]
    fn disjoint_intervals_give_empty_intersection() {
        let a = GtiTable {
            start: vec![0.0],
            stop: vec![1.0],
        };
        let b = GtiTable {
            start: vec![2.0],
            stop: vec![3.0],
        };
        assert!(a.intersect(&b).is_empty());
    }

    #[test]
    fn bitand_assign_matches_intersect() {
        let mut a = GtiTable {
            start: vec![0.0],
            stop: vec![10.0],
        };
        let b = GtiTable {
            start: vec![3.0],
            stop: vec![7.0],
        };
        let expected = a.intersect(&b);
        a &= &b;
        assert_eq!(a, expected);
    }
}
