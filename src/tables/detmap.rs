// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time-varying bad-pixel map: a cached `CCD_XW`x`CCD_YW` mask (1 = good,
//! 0 = bad) rebuilt whenever the query time crosses into a new time bin.

use crate::constants::{CCD_XW, CCD_YW, SHADOW_ROWS};
use crate::geom::PolyVec;
use crate::image::Image;
use crate::io::{ColumnReader, IoError};
use crate::mask_poly::mask_to_polygons;

fn hdu_name(tm: u8) -> String {
    format!("BADPIX{tm}")
}

#[derive(Clone)]
struct BadPixEntry {
    rawx: i32,
    rawy: i32,
    yextent: i32,
    timemin: f64,
    timemax: f64,
}

/// Bad-pixel entries plus a per-time-bin rebuilt mask image.
#[derive(Clone)]
pub struct DetMap {
    init_map: Image<f32>,
    cache_map: Image<f32>,
    entries: Vec<BadPixEntry>,
    tedge: Vec<f64>,
    cache_bin: Option<usize>,
}

impl DetMap {
    /// `detmap_image`, if present, is the static CALDB `DETMAP` quantum-
    /// efficiency-style image multiplied into every rebuilt mask; it must
    /// be exactly `CCD_XW`x`CCD_YW`. `shadowmask` additionally zeroes the
    /// bottom [`SHADOW_ROWS`] rows (filter-wheel housing shadow).
    pub fn new(detmap_image: Option<&Image<f32>>, shadowmask: bool) -> Self {
        let mut init_map = match detmap_image {
            Some(img) => img.clone(),
            None => Image::filled(CCD_XW, CCD_YW, 1.0f32),
        };

        for x in 0..CCD_XW {
            init_map.set(x, 0, 0.0);
            init_map.set(x, CCD_YW - 1, 0.0);
        }
        for y in 0..CCD_YW {
            init_map.set(0, y, 0.0);
            init_map.set(CCD_XW - 1, y, 0.0);
        }

        if shadowmask {
            for y in (CCD_YW - SHADOW_ROWS)..CCD_YW {
                for x in 0..CCD_XW {
                    init_map.set(x, y, 0.0);
                }
            }
        }

        let cache_map = init_map.clone();
        Self {
            init_map,
            cache_map,
            entries: Vec::new(),
            tedge: Vec::new(),
            cache_bin: None,
        }
    }

    /// Append bad-pixel rows from one `BADPIX<tm>` HDU. Can be called more
    /// than once to accumulate entries from multiple input files.
    pub fn read(&mut self, reader: &mut dyn ColumnReader, tm: u8) -> Result<(), IoError> {
        let hdu = hdu_name(tm);
        let rawx = reader.read_i32(&hdu, "RAWX")?;
        let rawy = reader.read_i32(&hdu, "RAWY")?;
        let yextent = reader.read_i32(&hdu, "YEXTENT")?;
        let timemin = reader.read_f64(&hdu, "TIMEMIN")?;
        let timemax = reader.read_f64(&hdu, "TIMEMAX")?;

        let n = rawx.len();
        for name_len in [rawy.len(), yextent.len(), timemin.len(), timemax.len()] {
            if name_len != n {
                return Err(IoError::ColumnLengthMismatch("BADPIX row".to_string(), name_len, n));
            }
        }

        for i in 0..n {
            let tmin = if timemin[i].is_finite() { timemin[i] } else { f64::NEG_INFINITY };
            let tmax = if timemax[i].is_finite() { timemax[i] } else { f64::INFINITY };
            self.entries.push(BadPixEntry {
                rawx: rawx[i],
                rawy: rawy[i],
                yextent: yextent[i],
                timemin: tmin,
                timemax: tmax,
            });
        }

        self.rebuild_tedge();
        self.cache_bin = None;
        Ok(())
    }

    fn rebuild_tedge(&mut self) {
        let mut edges: Vec<f64> = vec![f64::NEG_INFINITY, f64::INFINITY];
        for e in &self.entries {
            edges.push(e.timemin);
            edges.push(e.timemax);
        }
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap());
        edges.dedup();
        self.tedge = edges;
    }

    /// The bad-pixel mask active at time `t` (1 = good, 0 = bad).
    pub fn get_map(&mut self, t: f64) -> &Image<f32> {
        self.check_cache(t);
        &self.cache_map
    }

    /// The bad-pixel regions active at time `t`, as boundary polygons
    /// traced off the same mask [`get_map`] returns.
    pub fn get_poly_mask(&mut self, t: f64) -> PolyVec {
        self.check_cache(t);
        mask_to_polygons(&self.cache_map, |v| v == 0.0)
    }

    fn check_cache(&mut self, t: f64) {
        let needs_rebuild = match self.cache_bin {
            None => true,
            Some(bin) => t < self.tedge[bin] || t >= self.tedge[bin + 1],
        };
        if !needs_rebuild {
            return;
        }

        let bin = if self.tedge.len() < 2 {
            0
        } else {
            let mut found = 0;
            for i in 0..self.tedge.len() - 1 {
                if t >= self.tedge[i] && t < self.tedge[i + 1] {
                    found = i;
                    break;
                }
            }
            found
        };
        self.cache_bin = Some(bin);
        self.build_map_image(t);
    }

    fn build_map_image(&mut self, t: f64) {
        self.cache_map = self.init_map.clone();

        for e in &self.entries {
            if t < e.timemin || t >= e.timemax {
                continue;
            }
            let x0 = e.rawx - 1;
            let y0 = e.rawy - 1;
            for dy in 0..e.yextent {
                let y = y0 + dy;
                zero_with_cross(&mut self.cache_map, x0, y);
            }
        }
    }
}

/// Zero pixel `(x, y)` plus its 4-connected neighbours (not the diagonals),
/// skipping any that fall outside the image.
fn zero_with_cross(img: &mut Image<f32>, x: i32, y: i32) {
    let candidates = [(x, y), (x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)];
    for (cx, cy) in candidates {
        if img.in_bounds(cx as i64, cy as i64) {
            img.set(cx as usize, cy as usize, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::column::fake::FakeColumnReader;

    #[test]
    fn outer_edge_is_always_zeroed() {
        let dm = DetMap::new(None, false);
        assert_eq!(dm.init_map.get(0, 0), 0.0);
        assert_eq!(dm.init_map.get(10, 10), 1.0);
    }

    #[test]
    fn shadowmask_zeroes_bottom_rows() {
        let dm = DetMap::new(None, true);
        assert_eq!(dm.init_map.get(200, CCD_YW - 1 - 1), 0.0);
        assert_eq!(dm.init_map.get(200, CCD_YW - SHADOW_ROWS - 2), 1.0);
    }

    #[test]
    fn badpix_entry_zeroes_cross_at_active_time() {
        let mut fake = FakeColumnReader::default();
        let hdu = hdu_name(1);
        fake.i32_cols.insert((hdu.clone(), "RAWX".into()), vec![100]);
        fake.i32_cols.insert((hdu.clone(), "RAWY".into()), vec![100]);
        fake.i32_cols.insert((hdu.clone(), "YEXTENT".into()), vec![1]);
        fake.f64_cols.insert((hdu.clone(), "TIMEMIN".into()), vec![0.0]);
        fake.f64_cols.insert((hdu, "TIMEMAX".into()), vec![100.0]);

        let mut dm = DetMap::new(None, false);
        dm.read(&mut fake, 1).unwrap();

        let map = dm.get_map(50.0);
        assert_eq!(map.get(99, 99), 0.0); // rawx-1, rawy-1
        assert_eq!(map.get(98, 99), 0.0); // left neighbour
        assert_eq!(map.get(99, 98), 0.0); // up neighbour

        let map_later = dm.get_map(150.0);
        assert_eq!(map_later.get(99, 99), 1.0);
    }

    #[test]
    fn get_poly_mask_traces_the_bad_pixel_regions() {
        let mut fake = FakeColumnReader::default();
        let hdu = hdu_name(1);
        fake.i32_cols.insert((hdu.clone(), "RAWX".into()), vec![100]);
        fake.i32_cols.insert((hdu.clone(), "RAWY".into()), vec![100]);
        fake.i32_cols.insert((hdu.clone(), "YEXTENT".into()), vec![1]);
        fake.f64_cols.insert((hdu.clone(), "TIMEMIN".into()), vec![0.0]);
        fake.f64_cols.insert((hdu, "TIMEMAX".into()), vec![100.0]);

        let mut dm = DetMap::new(None, false);
        dm.read(&mut fake, 1).unwrap();

        // The image border is always masked out, so both queries return at
        // least that boundary; the active one additionally traces the
        // bad-pixel cross around (99, 99).
        let polys = dm.get_poly_mask(50.0);
        let polys_later = dm.get_poly_mask(150.0);
        assert!(polys.len() > polys_later.len());
    }
}
