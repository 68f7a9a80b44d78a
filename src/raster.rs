// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scanline polygon rasterization: write `val` into every pixel of `img`
//! whose centre falls inside `poly`.

use crate::geom::Poly;
use crate::image::Image;

struct Edge {
    /// y of the lower endpoint (smaller y).
    y0: f32,
    y1: f32,
    /// x at y0.
    x0: f32,
    /// dx/dy.
    dxdy: f32,
}

/// Sort a small slice of crossing x-coordinates. Uses explicit compare-swap
/// networks for the sizes that actually occur (a convex-ish polygon rarely
/// crosses a scanline more than a handful of times); falls back to the
/// standard sort for anything larger.
fn sort_small(xs: &mut [f32]) {
    fn order_pair(xs: &mut [f32], i: usize, j: usize) {
        if xs[i] > xs[j] {
            xs.swap(i, j);
        }
    }

    match xs.len() {
        0 | 1 => {}
        2 => order_pair(xs, 0, 1),
        3 => {
            order_pair(xs, 0, 1);
            order_pair(xs, 1, 2);
            order_pair(xs, 0, 1);
        }
        4 => {
            order_pair(xs, 0, 1);
            order_pair(xs, 2, 3);
            order_pair(xs, 0, 2);
            order_pair(xs, 1, 3);
            order_pair(xs, 1, 2);
        }
        5 => {
            order_pair(xs, 0, 1);
            order_pair(xs, 3, 4);
            order_pair(xs, 2, 4);
            order_pair(xs, 2, 3);
            order_pair(xs, 0, 3);
            order_pair(xs, 0, 2);
            order_pair(xs, 1, 4);
            order_pair(xs, 1, 3);
            order_pair(xs, 1, 2);
        }
        6 => {
            order_pair(xs, 0, 1);
            order_pair(xs, 2, 3);
            order_pair(xs, 4, 5);
            order_pair(xs, 0, 2);
            order_pair(xs, 1, 4);
            order_pair(xs, 3, 5);
            order_pair(xs, 0, 1);
            order_pair(xs, 2, 3);
            order_pair(xs, 4, 5);
            order_pair(xs, 1, 2);
            order_pair(xs, 3, 4);
            order_pair(xs, 2, 3);
        }
        _ => xs.sort_by(|a, b| a.partial_cmp(b).unwrap()),
    }
}

fn build_edges(poly: &Poly) -> Vec<Edge> {
    let n = poly.len();
    let mut edges = Vec::with_capacity(n);
    for i in 0..n {
        let p1 = poly.pts[i];
        let p2 = poly.pts[(i + 1) % n];
        if (p1.y - p2.y).abs() < 1e-9 {
            continue; // horizontal edges never produce a crossing
        }
        let (lo, hi) = if p1.y < p2.y { (p1, p2) } else { (p2, p1) };
        let dxdy = (hi.x - lo.x) / (hi.y - lo.y);
        edges.push(Edge {
            y0: lo.y,
            y1: hi.y,
            x0: lo.x,
            dxdy,
        });
    }
    edges
}

/// Fill every pixel of `img` whose integer centre lies inside `poly` with
/// `val`. Scans only the rows spanned by the polygon's bounding box.
pub fn fill_poly<T: Copy + Default>(poly: &Poly, img: &mut Image<T>, val: T) {
    if poly.len() < 3 {
        return;
    }
    let edges = build_edges(poly);
    let bounds = poly.bounds();

    let y_start = bounds.tl.y.ceil().max(0.0) as i64;
    let y_end = (bounds.br.y.floor() as i64).min(img.yw() as i64 - 1);

    let mut xs: Vec<f32> = Vec::new();
    for y in y_start..=y_end {
        let yf = y as f32;
        xs.clear();
        for e in &edges {
            if (e.y0 <= yf && e.y1 > yf) || (e.y0 > yf && e.y1 <= yf) {
                xs.push(e.x0 + e.dxdy * (yf - e.y0));
            }
        }
        if xs.is_empty() {
            continue;
        }
        sort_small(&mut xs);

        let mut i = 0;
        while i + 1 < xs.len() {
            let x0 = xs[i].ceil().max(0.0) as i64;
            let x1 = (xs[i + 1].floor() as i64).min(img.xw() as i64 - 1);
            for x in x0..=x1 {
                if x >= 0 {
                    img.set(x as usize, y as usize, val);
                }
            }
            i += 2;
        }
    }
}
