// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simple polygons and the operations the reprojection pipeline needs on
//! them: signed area, bounding box, rotation, point-in-polygon and the
//! combined shift/rotate/shift used to carry a set of polygons from
//! detector into image-pixel coordinates in one pass.

use std::ops::{Add, Div, Mul, Sub};

use super::point::{Matrix2, Point, Rect};

/// An ordered sequence of vertices forming a simple polygon. By convention
/// vertices are wound counter-clockwise, giving a positive [`Poly::area`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Poly {
    pub pts: Vec<Point>,
}

/// A collection of polygons, e.g. the output of [`crate::mask_poly::mask_to_polygons`].
pub type PolyVec = Vec<Poly>;

impl Poly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(pts: Vec<Point>) -> Self {
        Self { pts }
    }

    pub fn push(&mut self, p: Point) {
        self.pts.push(p);
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Signed area (shoelace formula, halved). Positive for a
    /// counter-clockwise polygon. Zero for fewer than 3 vertices.
    pub fn area(&self) -> f32 {
        if self.pts.len() < 3 {
            return 0.0;
        }
        let mut a = 0.0f32;
        let n = self.pts.len();
        let mut j = n - 1;
        for i in 0..n {
            a += (self.pts[j].x + self.pts[i].x) * (self.pts[j].y - self.pts[i].y);
            j = i;
        }
        a * 0.5
    }

    /// The axis-aligned bounding box of the polygon's vertices.
    pub fn bounds(&self) -> Rect {
        let mut minx = f32::INFINITY;
        let mut miny = f32::INFINITY;
        let mut maxx = f32::NEG_INFINITY;
        let mut maxy = f32::NEG_INFINITY;
        for p in &self.pts {
            minx = minx.min(p.x);
            maxx = maxx.max(p.x);
            miny = miny.min(p.y);
            maxy = maxy.max(p.y);
        }
        Rect::new(Point::new(minx, miny), Point::new(maxx, maxy))
    }

    /// Rotate every vertex about the origin by `theta` radians.
    pub fn rotate(&mut self, theta: f32) {
        let (s, c) = theta.sin_cos();
        for p in &mut self.pts {
            let (tx, ty) = (p.x, p.y);
            p.x = tx * c - ty * s;
            p.y = tx * s + ty * c;
        }
    }

    /// Ray-casting point-in-polygon test, with a bounding-box early-out.
    /// Horizontal edges do not count as crossings.
    pub fn is_inside(&self, pt: Point) -> bool {
        if self.pts.len() < 3 {
            return false;
        }
        let b = self.bounds();
        if pt.x < b.tl.x || pt.y < b.tl.y || pt.x > b.br.x || pt.y > b.br.y {
            return false;
        }

        let n = self.pts.len();
        let mut count = 0u32;
        for i in 0..n {
            let p1 = self.pts[i];
            let p2 = self.pts[(i + 1) % n];

            if pt.y >= p1.y.min(p2.y) && pt.y <= p1.y.max(p2.y) {
                if pt.x < p1.x.min(p2.x) {
                    count += 1;
                } else if pt.x > p1.x.max(p2.x) {
                    // can't cross
                } else if (p1.y - p2.y).abs() > 1e-6 {
                    let grad = (p2.x - p1.x) / (p2.y - p1.y);
                    let lx = p1.x + grad * (pt.y - p1.y);
                    if lx > pt.x {
                        count += 1;
                    }
                }
            }
        }
        count % 2 != 0
    }
}

/// Is `pt` inside any polygon of `polys`?
pub fn is_inside_any(polys: &[Poly], pt: Point) -> bool {
    polys.iter().any(|p| p.is_inside(pt))
}

impl Add<Point> for Poly {
    type Output = Poly;
    fn add(mut self, rhs: Point) -> Poly {
        for p in &mut self.pts {
            *p = *p + rhs;
        }
        self
    }
}

impl Sub<Point> for Poly {
    type Output = Poly;
    fn sub(mut self, rhs: Point) -> Poly {
        for p in &mut self.pts {
            *p = *p - rhs;
        }
        self
    }
}

impl Mul<f32> for Poly {
    type Output = Poly;
    fn mul(mut self, rhs: f32) -> Poly {
        for p in &mut self.pts {
            *p = *p * rhs;
        }
        self
    }
}

impl Div<f32> for Poly {
    type Output = Poly;
    fn div(mut self, rhs: f32) -> Poly {
        for p in &mut self.pts {
            *p = *p / rhs;
        }
        self
    }
}

/// For each vertex `v` of each polygon, compute `M . (v - rot_origin) +
/// img_origin`. Used to map a set of detector-coordinate polygons into
/// image-pixel coordinates in a single pass (§4.A `applyShiftRotationShift`).
pub fn apply_shift_rotation_shift(polys: &mut [Poly], mat: &Matrix2, rot_origin: Point, img_origin: Point) {
    for poly in polys.iter_mut() {
        for p in poly.pts.iter_mut() {
            let d = *p - rot_origin;
            *p = mat.apply(d) + img_origin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(x0: f32, y0: f32, w: f32) -> Poly {
        Poly::from_points(vec![
            Point::new(x0, y0),
            Point::new(x0 + w, y0),
            Point::new(x0 + w, y0 + w),
            Point::new(x0, y0 + w),
        ])
    }

    #[test]
    fn bounds_contains_all_vertices() {
        let p = square(1.0, 2.0, 3.0);
        let b = p.bounds();
        for v in &p.pts {
            assert!(b.contains(*v));
        }
    }

    #[test]
    fn rotate_round_trip() {
        let mut p = square(1.0, 2.0, 3.0);
        let orig = p.clone();
        p.rotate(0.9);
        p.rotate(-0.9);
        for (a, b) in p.pts.iter().zip(orig.pts.iter()) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn area_invariant_under_translation() {
        let p = square(0.0, 0.0, 4.0);
        let shifted = p.clone() + Point::new(10.0, -3.0);
        assert_abs_diff_eq!(p.area(), shifted.area(), epsilon = 1e-5);
    }

    #[test]
    fn point_in_square() {
        let p = square(0.0, 0.0, 10.0);
        assert!(p.is_inside(Point::new(5.0, 5.0)));
        assert!(!p.is_inside(Point::new(15.0, 5.0)));
    }
}
