// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Projection modes: how a source position on the detector maps to the
//! output image's origin and orientation, and which detector region is
//! considered valid for a given source.

use crate::geom::{Matrix2, Point};

const CCD_CENTRE: Point = Point { x: 192.0, y: 192.0 };

/// Polymorphic per-source behaviour for one output mode. The default
/// `rotation_matrix`/`origin` are both identity, matching the
/// `AVERAGE_FOV`/`AVERAGE_FULL` family.
pub trait ProjMode: Send + Sync {
    /// Is `ccdpt` (the source's own detector position) a position this
    /// mode will actually produce output for? Sources outside this region
    /// are skipped entirely rather than erroring.
    fn source_valid(&self, ccdpt: Point) -> bool;

    /// The rotation applied before scaling into output pixels. `roll` is
    /// the spacecraft roll (degrees) at the current attitude sample,
    /// `delccd` is the source's CCD position relative to the instrument
    /// reference pixel.
    fn rotation_matrix(&self, _roll: f64, _delccd: Point) -> Matrix2 {
        Matrix2::IDENTITY
    }

    /// The detector-coordinate origin that maps to the output image's
    /// centre.
    fn origin(&self, ccdpt: Point) -> Point {
        ccdpt
    }
}

fn dist2_from_centre(p: Point) -> f32 {
    let dx = p.x - CCD_CENTRE.x;
    let dy = p.y - CCD_CENTRE.y;
    dx * dx + dy * dy
}

/// Source-relative, detector-aligned field of view: valid within the
/// circular field of view around the CCD centre, no rotation.
pub struct AverageFov;

impl ProjMode for AverageFov {
    fn source_valid(&self, ccdpt: Point) -> bool {
        dist2_from_centre(ccdpt) < 192.0 * 192.0
    }
}

/// As [`AverageFov`], but rotated so the output image is sky-aligned
/// rather than detector-aligned.
pub struct AverageFovSky;

impl ProjMode for AverageFovSky {
    fn source_valid(&self, ccdpt: Point) -> bool {
        dist2_from_centre(ccdpt) < 192.0 * 192.0
    }

    fn rotation_matrix(&self, roll: f64, _delccd: Point) -> Matrix2 {
        let theta = ((270.0 - roll) * std::f64::consts::PI / 180.0) as f32;
        Matrix2::rotation(theta)
    }
}

/// Unrestricted field of view, detector-aligned, no origin shift: the
/// whole CCD contributes regardless of where the source falls.
pub struct AverageFull;

impl ProjMode for AverageFull {
    fn source_valid(&self, _ccdpt: Point) -> bool {
        true
    }
}

/// Whole-detector mode: like [`AverageFull`], but the output image is
/// always centred on the CCD centre rather than the source position.
pub struct WholeDet;

impl ProjMode for WholeDet {
    fn source_valid(&self, _ccdpt: Point) -> bool {
        true
    }

    fn origin(&self, _ccdpt: Point) -> Point {
        CCD_CENTRE
    }
}

/// Valid within an annulus `[r_in, r_out)` around the CCD centre
/// (independent of the source's actual position), detector-aligned.
pub struct Radial {
    pub r_in: f32,
    pub r_out: f32,
}

impl ProjMode for Radial {
    fn source_valid(&self, ccdpt: Point) -> bool {
        let d = dist2_from_centre(ccdpt).sqrt();
        d >= self.r_in && d < self.r_out
    }
}

/// As [`Radial`], but rotates so the source always lies on the output
/// image's +x axis — useful for stacking radial profiles from many
/// sources.
pub struct RadialSym {
    pub r_in: f32,
    pub r_out: f32,
}

impl ProjMode for RadialSym {
    fn source_valid(&self, ccdpt: Point) -> bool {
        let d = dist2_from_centre(ccdpt).sqrt();
        d >= self.r_in && d < self.r_out
    }

    fn rotation_matrix(&self, _roll: f64, delccd: Point) -> Matrix2 {
        Matrix2::rotation(-delccd.y.atan2(delccd.x))
    }
}

/// Valid within an axis-aligned detector rectangle `[x1, x2) x [y1, y2)`.
pub struct Box {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl ProjMode for Box {
    fn source_valid(&self, ccdpt: Point) -> bool {
        ccdpt.x >= self.x1 && ccdpt.x < self.x2 && ccdpt.y >= self.y1 && ccdpt.y < self.y2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_fov_rejects_outside_circle() {
        let m = AverageFov;
        assert!(m.source_valid(Point::new(192.0, 192.0)));
        assert!(!m.source_valid(Point::new(0.0, 0.0)));
    }

    #[test]
    fn whole_det_always_valid_and_recentres() {
        let m = WholeDet;
        assert!(m.source_valid(Point::new(0.0, 0.0)));
        assert_eq!(m.origin(Point::new(10.0, 300.0)), CCD_CENTRE);
    }

    #[test]
    fn radial_sym_rotates_source_onto_x_axis() {
        let m = RadialSym { r_in: 0.0, r_out: 400.0 };
        let delccd = Point::new(0.0, 10.0);
        let mat = m.rotation_matrix(0.0, delccd);
        let rotated = mat.apply(delccd);
        assert!(rotated.y.abs() < 1e-4);
        assert!(rotated.x > 0.0);
    }

    #[test]
    fn box_mode_respects_half_open_bounds() {
        let m = Box { x1: 10.0, y1: 10.0, x2: 20.0, y2: 20.0 };
        assert!(m.source_valid(Point::new(10.0, 10.0)));
        assert!(!m.source_valid(Point::new(20.0, 20.0)));
    }
}
