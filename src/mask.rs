// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sky-plane exclusion regions, read once from a mask image and
//! re-projected onto the detector for every attitude sample.

use crate::coord::CoordConv;
use crate::geom::{Point, Poly, PolyVec};
use crate::image::Image;

/// Converts pixel coordinates of a mask image into sky coordinates.
/// Parsing the mask's own WCS header is out of scope here; callers supply
/// a concrete implementation (ordinarily [`GnomonicWcs`] built from header
/// keywords read elsewhere).
pub trait Wcs {
    /// RA/Dec (degrees) of pixel `(x, y)`, 1-indexed pixel centre
    /// convention as used by the mask image.
    fn pix2sky(&self, x: f64, y: f64) -> (f64, f64);
}

/// A minimal gnomonic (tangent-plane) WCS, sufficient for the sky masks
/// this tool consumes.
#[derive(Clone, Copy, Debug)]
pub struct GnomonicWcs {
    pub crval1: f64,
    pub crval2: f64,
    pub crpix1: f64,
    pub crpix2: f64,
    pub cdelt1: f64,
    pub cdelt2: f64,
}

impl Wcs for GnomonicWcs {
    fn pix2sky(&self, x: f64, y: f64) -> (f64, f64) {
        const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

        let dx = (x - self.crpix1) * self.cdelt1 * DEG2RAD;
        let dy = (y - self.crpix2) * self.cdelt2 * DEG2RAD;

        let dec0 = self.crval2 * DEG2RAD;
        let rho = (dx * dx + dy * dy).sqrt();
        if rho < 1e-12 {
            return (self.crval1, self.crval2);
        }
        let c = rho.atan();
        let (sin_c, cos_c) = c.sin_cos();
        let dec = (cos_c * dec0.sin() + dy * sin_c * dec0.cos() / rho).asin();
        let ra = self.crval1 * DEG2RAD
            + (dx * sin_c).atan2(rho * dec0.cos() * cos_c - dy * dec0.sin() * sin_c);
        (ra / DEG2RAD, dec / DEG2RAD)
    }
}

/// Halve a polygon's vertex count by pairwise midpoint averaging. Mask
/// polygons traced off a bitmap are axis-aligned staircases where every
/// other vertex is geometric noise, so this is safe to apply unconditionally;
/// polygons with fewer than 6 vertices are left alone since there's nothing
/// meaningful left to drop.
fn simplify_polygon(verts: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if verts.len() < 6 {
        return verts.to_vec();
    }
    let mut out = Vec::with_capacity(verts.len() / 2 + 1);
    let mut i = 0;
    while i + 1 < verts.len() {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[i + 1];
        out.push(((x0 + x1) / 2.0, (y0 + y1) / 2.0));
        i += 2;
    }
    if verts.len() % 2 == 1 {
        out.push(verts[verts.len() - 1]);
    }
    out
}

/// A 32-vertex polygon approximating a circle of the given radius (CCD
/// pixels) around `centre`.
fn circle_poly(centre: Point, radius_px: f32) -> Poly {
    const N: usize = 32;
    let pts = (0..N)
        .map(|i| {
            let theta = std::f32::consts::TAU * i as f32 / N as f32;
            Point::new(centre.x + radius_px * theta.cos(), centre.y + radius_px * theta.sin())
        })
        .collect();
    Poly::from_points(pts)
}

/// Sky-plane polygons describing masked-out regions, lazily re-projected
/// onto the detector each time the attitude changes.
#[derive(Clone, Debug, Default)]
pub struct Mask {
    /// Each entry is one polygon's vertices, as (ra, dec) degrees.
    sky_polys: Vec<Vec<(f64, f64)>>,
    /// Extra circular source masks: (ra, dec) degrees plus radius in CCD
    /// pixels, appended as a 32-vertex circle every time the mask is
    /// re-projected onto the detector.
    mask_pts: Vec<(f64, f64, f32)>,
}

impl Mask {
    /// An empty mask — no excluded regions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a mask image where a zero pixel marks an excluded
    /// region (inverted sense, matching the convention of the mask FITS
    /// files this tool reads).
    pub fn from_image(img: &Image<i32>, wcs: &dyn Wcs) -> Self {
        let poly_pixels = crate::mask_poly::mask_to_polygons(img, |v| v == 0);
        let sky_polys = poly_pixels
            .iter()
            .map(|poly| {
                let verts: Vec<(f64, f64)> = poly
                    .pts
                    .iter()
                    .map(|p| wcs.pix2sky((p.x + 0.5) as f64, (p.y + 0.5) as f64))
                    .collect();
                simplify_polygon(&verts)
            })
            .collect();
        Self { sky_polys, mask_pts: Vec::new() }
    }

    /// Attach circular source masks: `(ra, dec)` degrees plus radius in CCD
    /// pixels.
    pub fn with_mask_pts(mut self, mask_pts: Vec<(f64, f64, f32)>) -> Self {
        self.mask_pts = mask_pts;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sky_polys.is_empty() && self.mask_pts.is_empty()
    }

    /// Re-project every stored sky polygon onto CCD pixel coordinates for
    /// the coordinate converter's current pointing, and append one
    /// 32-vertex circle per `mask_pts` entry. Not cached: the result
    /// changes with every attitude sample.
    pub fn as_ccd_poly(&self, cc: &CoordConv) -> PolyVec {
        let mut polys: PolyVec = self
            .sky_polys
            .iter()
            .map(|verts| {
                let pts = verts
                    .iter()
                    .map(|&(ra, dec)| {
                        let (x, y) = cc.radec2ccd(ra, dec);
                        Point::new(x as f32, y as f32)
                    })
                    .collect();
                Poly::from_points(pts)
            })
            .collect();

        for &(ra, dec, rad_px) in &self.mask_pts {
            let (x, y) = cc.radec2ccd(ra, dec);
            polys.push(circle_poly(Point::new(x as f32, y as f32), rad_px));
        }
        polys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gnomonic_round_trips_through_origin() {
        let wcs = GnomonicWcs {
            crval1: 150.0,
            crval2: -30.0,
            crpix1: 100.0,
            crpix2: 100.0,
            cdelt1: -1.0 / 3600.0,
            cdelt2: 1.0 / 3600.0,
        };
        let (ra, dec) = wcs.pix2sky(100.0, 100.0);
        assert!((ra - 150.0).abs() < 1e-9);
        assert!((dec - (-30.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_mask_has_no_polygons() {
        let m = Mask::empty();
        assert!(m.is_empty());
        let cc = CoordConv::new(9.6, 9.6, 192.0, 192.0);
        assert!(m.as_ccd_poly(&cc).is_empty());
    }

    #[test]
    fn mask_from_image_builds_one_polygon_per_zero_region() {
        let mut img: Image<i32> = Image::filled(10, 10, 1);
        img.set(5, 5, 0);
        let wcs = GnomonicWcs {
            crval1: 0.0,
            crval2: 0.0,
            crpix1: 5.0,
            crpix2: 5.0,
            cdelt1: 1.0 / 3600.0,
            cdelt2: 1.0 / 3600.0,
        };
        let mask = Mask::from_image(&img, &wcs);
        assert_eq!(mask.sky_polys.len(), 1);
    }

    #[test]
    fn mask_pts_append_a_32_vertex_circle_per_entry() {
        let mask = Mask::empty().with_mask_pts(vec![(10.0, -20.0, 5.0), (11.0, -21.0, 3.0)]);
        let cc = CoordConv::new(9.6, 9.6, 192.0, 192.0);
        let polys = mask.as_ccd_poly(&cc);
        assert_eq!(polys.len(), 2);
        for p in &polys {
            assert_eq!(p.len(), 32);
        }
    }

    #[test]
    fn mask_pts_make_a_nonempty_mask_even_without_sky_polygons() {
        let mask = Mask::empty().with_mask_pts(vec![(10.0, -20.0, 5.0)]);
        assert!(!mask.is_empty());
    }

    #[test]
    fn simplify_polygon_halves_long_runs_but_leaves_short_ones() {
        let verts: Vec<(f64, f64)> = (0..8).map(|i| (i as f64, 0.0)).collect();
        let simplified = simplify_polygon(&verts);
        assert_eq!(simplified.len(), 4);

        let short = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert_eq!(simplify_polygon(&short), short);
    }
}
