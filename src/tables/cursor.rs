// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A monotonic cached cursor over a sorted time array, shared by every
//! table that interpolates a value as a function of time (attitude,
//! dead-time correction). Callers are expected to query with
//! non-decreasing `t` most of the time (each worker walks its chunk of
//! events/time-segments in order); the cursor still works for occasional
//! backward jumps, just without the O(1) amortization.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("time {t} is out of range [{lo}, {hi}]")]
    OutOfRange { t: f64, lo: f64, hi: f64 },
    #[error("time table has fewer than two entries")]
    TooFewSamples,
}

/// Tracks a cached bracketing index `idx` such that `times[idx] <= t <=
/// times[idx + 1]`, walking forward or backward as needed to keep that
/// invariant for the most recently queried `t`.
#[derive(Clone, Debug)]
pub struct LinearCursor {
    idx: usize,
}

impl LinearCursor {
    pub fn new() -> Self {
        Self { idx: 0 }
    }

    /// Find (and cache) the index bracketing `t` in `times`. `times` must
    /// be sorted ascending and have at least two entries.
    pub fn seek(&mut self, times: &[f64], t: f64) -> Result<usize, DomainError> {
        if times.len() < 2 {
            return Err(DomainError::TooFewSamples);
        }
        let last = times.len() - 1;
        if self.idx >= last {
            self.idx = last - 1;
        }

        while self.idx > 0 && times[self.idx + 1] > t {
            self.idx -= 1;
        }
        while self.idx < last - 1 && t > times[self.idx + 1] {
            self.idx += 1;
        }

        if t < times[self.idx] || t > times[self.idx + 1] {
            return Err(DomainError::OutOfRange {
                t,
                lo: times[0],
                hi: times[last],
            });
        }
        Ok(self.idx)
    }
}

impl Default for LinearCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Linearly interpolate `values[idx]`..`values[idx+1]` at fractional
/// position `t` between `times[idx]` and `times[idx+1]`.
pub fn interpolate_linear(times: &[f64], values: &[f64], idx: usize, t: f64) -> f64 {
    let t0 = times[idx];
    let t1 = times[idx + 1];
    let frac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    values[idx] + frac * (values[idx + 1] - values[idx])
}

/// Interpolate an angle given in degrees, decomposing into `cos`/`sin`
/// before blending and recombining with `atan2` so the result doesn't break
/// across the +-180 degree wrap (plain linear interpolation of e.g. 179 and
/// -179 degrees would otherwise average to 0 instead of 180).
pub fn interpolate_angle_deg(times: &[f64], values_deg: &[f64], idx: usize, t: f64) -> f64 {
    let t0 = times[idx];
    let t1 = times[idx + 1];
    let frac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    let a0 = values_deg[idx].to_radians();
    let a1 = values_deg[idx + 1].to_radians();
    let cos = (1.0 - frac) * a0.cos() + frac * a1.cos();
    let sin = (1.0 - frac) * a0.sin() + frac * a1.sin();
    sin.atan2(cos).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeks_forward_and_backward() {
        let times = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let mut cur = LinearCursor::new();
        assert_eq!(cur.seek(&times, 0.5).unwrap(), 0);
        assert_eq!(cur.seek(&times, 3.5).unwrap(), 3);
        assert_eq!(cur.seek(&times, 1.2).unwrap(), 1);
    }

    #[test]
    fn out_of_range_errors() {
        let times = vec![0.0, 1.0, 2.0];
        let mut cur = LinearCursor::new();
        assert!(cur.seek(&times, -0.1).is_err());
        assert!(cur.seek(&times, 2.1).is_err());
    }

    #[test]
    fn interpolation_is_linear() {
        let times = vec![0.0, 10.0];
        let values = vec![0.0, 100.0];
        assert_eq!(interpolate_linear(&times, &values, 0, 2.5), 25.0);
    }

    #[test]
    fn angle_interpolation_crosses_the_180_wrap_the_short_way() {
        let times = vec![0.0, 10.0];
        let values = vec![179.0, -179.0];
        let mid = interpolate_angle_deg(&times, &values, 0, 5.0);
        assert!((mid.abs() - 180.0).abs() < 1e-6, "expected +-180, got {mid}");
    }

    #[test]
    fn angle_interpolation_matches_linear_away_from_the_wrap() {
        let times = vec![0.0, 10.0];
        let values = vec![10.0, 20.0];
        let mid = interpolate_angle_deg(&times, &values, 0, 5.0);
        assert!((mid - 15.0).abs() < 1e-6);
    }
}
