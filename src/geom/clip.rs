// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sutherland-Hodgman polygon clipping against a convex clip polygon.

use super::point::Point;
use super::poly::Poly;

fn is_inside_edge(p1: Point, p2: Point, q: Point) -> bool {
    let r = (p2.x - p1.x) * (q.y - p1.y) - (p2.y - p1.y) * (q.x - p1.x);
    r <= 0.0
}

fn compute_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Point {
    let (x, y);
    if (p2.x - p1.x).abs() < 1e-5 {
        x = p1.x;
        let m2 = (p4.y - p3.y) / (p4.x - p3.x);
        let b2 = p3.y - m2 * p3.x;
        y = m2 * x + b2;
    } else if (p4.x - p3.x).abs() < 1e-5 {
        x = p3.x;
        let m1 = (p2.y - p1.y) / (p2.x - p1.x);
        let b1 = p1.y - m1 * p1.x;
        y = m1 * x + b1;
    } else {
        let m1 = (p2.y - p1.y) / (p2.x - p1.x);
        let b1 = p1.y - m1 * p1.x;
        let m2 = (p4.y - p3.y) / (p4.x - p3.x);
        let b2 = p3.y - m2 * p3.x;
        x = (b2 - b1) / (m1 - m2);
        y = m1 * x + b1;
    }
    Point::new(x, y)
}

/// Clip `subject` against the convex polygon `clip`. Both polygons must be
/// wound in the same (counter-clockwise) orientation. Returns an empty
/// polygon if nothing survives.
pub fn poly_clip(subject: &Poly, clip: &Poly) -> Poly {
    let mut output = subject.pts.clone();

    let cn = clip.pts.len();
    for i in 0..cn {
        if output.is_empty() {
            break;
        }
        let c1 = clip.pts[i];
        let c2 = clip.pts[(i + 1) % cn];

        let input = output;
        output = Vec::with_capacity(input.len());

        let n = input.len();
        for j in 0..n {
            let cur = input[j];
            let prev = input[(j + n - 1) % n];

            let cur_in = is_inside_edge(c1, c2, cur);
            let prev_in = is_inside_edge(c1, c2, prev);

            if cur_in {
                if !prev_in {
                    output.push(compute_intersection(prev, cur, c1, c2));
                }
                output.push(cur);
            } else if prev_in {
                output.push(compute_intersection(prev, cur, c1, c2));
            }
        }
    }

    Poly::from_points(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, w: f32) -> Poly {
        Poly::from_points(vec![
            Point::new(x0, y0),
            Point::new(x0 + w, y0),
            Point::new(x0 + w, y0 + w),
            Point::new(x0, y0 + w),
        ])
    }

    #[test]
    fn fully_inside_is_unchanged() {
        let subject = square(2.0, 2.0, 1.0);
        let clip = square(0.0, 0.0, 10.0);
        let clipped = poly_clip(&subject, &clip);
        assert!((clipped.area() - subject.area()).abs() < 1e-4);
    }

    #[test]
    fn fully_outside_is_empty() {
        let subject = square(20.0, 20.0, 1.0);
        let clip = square(0.0, 0.0, 10.0);
        let clipped = poly_clip(&subject, &clip);
        assert!(clipped.is_empty() || clipped.area().abs() < 1e-6);
    }

    #[test]
    fn partial_overlap_area_between_zero_and_subject() {
        let subject = square(5.0, 5.0, 10.0);
        let clip = square(0.0, 0.0, 10.0);
        let clipped = poly_clip(&subject, &clip);
        let a = clipped.area().abs();
        assert!(a > 0.0 && a < subject.area());
        assert!((a - 25.0).abs() < 1e-3);
    }
}
