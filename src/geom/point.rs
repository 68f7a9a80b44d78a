// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point, rectangle and 2x2 matrix primitives shared by the geometry layer.

use std::ops::{Add, Div, Mul, Sub};

/// A 2-D point or vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;
    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// An axis-aligned bounding box, `tl` (top-left / min) and `br`
/// (bottom-right / max) corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub tl: Point,
    pub br: Point,
}

impl Rect {
    pub fn new(tl: Point, br: Point) -> Self {
        Self { tl, br }
    }

    /// Does this rectangle contain the point (inclusive of the boundary)?
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.tl.x && p.x <= self.br.x && p.y >= self.tl.y && p.y <= self.br.y
    }

    /// Do two rectangles, each given by inclusive integer bounds, overlap?
    #[allow(clippy::too_many_arguments)]
    pub fn overlap_i32(ax1: i32, ax2: i32, ay1: i32, ay2: i32, bx1: i32, bx2: i32, by1: i32, by2: i32) -> bool {
        ax1 <= bx2 && ax2 >= bx1 && ay2 >= by1 && ay1 <= by2
    }
}

/// A row-major 2x2 matrix, used for the projection-mode rotations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix2 {
    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,
}

impl Default for Matrix2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix2 {
    pub const IDENTITY: Matrix2 = Matrix2 {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
    };

    pub fn new(m00: f32, m01: f32, m10: f32, m11: f32) -> Self {
        Self { m00, m01, m10, m11 }
    }

    /// A pure rotation by `theta` radians.
    pub fn rotation(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(c, -s, s, c)
    }

    /// Apply the matrix to a point: `M * p`.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.m00 + p.y * self.m01,
            p.x * self.m10 + p.y * self.m11,
        )
    }

    /// Scale both axes in-place by `s`.
    pub fn scale(&mut self, s: f32) {
        self.m00 *= s;
        self.m01 *= s;
        self.m10 *= s;
        self.m11 *= s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matrix_rotation_round_trip() {
        let p = Point::new(3.0, -1.5);
        let fwd = Matrix2::rotation(0.7);
        let back = Matrix2::rotation(-0.7);
        let q = back.apply(fwd.apply(p));
        assert_abs_diff_eq!(q.x, p.x, epsilon = 1e-5);
        assert_abs_diff_eq!(q.y, p.y, epsilon = 1e-5);
    }

    #[test]
    fn rect_overlap() {
        assert!(Rect::overlap_i32(0, 10, 0, 10, 5, 15, 5, 15));
        assert!(!Rect::overlap_i32(0, 1, 0, 1, 5, 6, 5, 6));
    }
}
