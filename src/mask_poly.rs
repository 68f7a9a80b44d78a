// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turn a binary pixel mask into the set of polygons tracing its boundary.
//!
//! Every foreground pixel contributes up to four unit-length boundary
//! edges — one per side that borders a background pixel (or the image
//! edge). Walking from edge to edge and merging runs of collinear edges
//! into a single vertex reconstructs the outline polygon(s) of each
//! connected region, including any interior holes as separate loops.

use std::collections::HashMap;

use crate::geom::{Point, Poly, PolyVec};
use crate::image::Image;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Down,
    Left,
    Up,
}

type GridPt = (i64, i64);

fn edge_endpoint(start: GridPt, dir: Direction) -> GridPt {
    match dir {
        Direction::Right => (start.0 + 1, start.1),
        Direction::Down => (start.0, start.1 + 1),
        Direction::Left => (start.0 - 1, start.1),
        Direction::Up => (start.0, start.1 - 1),
    }
}

/// Build the boundary polygons of the pixels for which `is_set` returns
/// true. `is_set` is called on in-bounds pixels only; out-of-bounds
/// neighbours are always treated as background, so a foreground region
/// touching the image edge gets a closed boundary there too.
pub fn mask_to_polygons<T, F>(img: &Image<T>, is_set: F) -> PolyVec
where
    T: Copy + Default,
    F: Fn(T) -> bool,
{
    let xw = img.xw() as i64;
    let yw = img.yw() as i64;

    let set_at = |x: i64, y: i64| -> bool {
        if x < 0 || y < 0 || x >= xw || y >= yw {
            false
        } else {
            is_set(img.get(x as usize, y as usize))
        }
    };

    // start -> (direction, end) for every boundary edge.
    let mut edges: HashMap<GridPt, Direction> = HashMap::new();

    for y in 0..yw {
        for x in 0..xw {
            if !set_at(x, y) {
                continue;
            }
            if !set_at(x, y - 1) {
                edges.insert((x, y), Direction::Right);
            }
            if !set_at(x + 1, y) {
                edges.insert((x + 1, y), Direction::Down);
            }
            if !set_at(x, y + 1) {
                edges.insert((x + 1, y + 1), Direction::Left);
            }
            if !set_at(x - 1, y) {
                edges.insert((x, y + 1), Direction::Up);
            }
        }
    }

    let mut polys = PolyVec::new();
    let mut visited: HashMap<GridPt, bool> = HashMap::new();

    let starts: Vec<GridPt> = edges.keys().copied().collect();
    for start in starts {
        if visited.contains_key(&start) {
            continue;
        }

        let mut poly = Poly::new();
        let mut cur = start;
        let mut run_dir: Option<Direction> = None;

        loop {
            let dir = match edges.get(&cur) {
                Some(d) => *d,
                None => break, // malformed/open boundary; stop rather than loop forever
            };
            if visited.contains_key(&cur) {
                break;
            }
            visited.insert(cur, true);

            if run_dir != Some(dir) {
                poly.push(Point::new(cur.0 as f32, cur.1 as f32));
                run_dir = Some(dir);
            }

            let next = edge_endpoint(cur, dir);
            if next == start {
                break;
            }
            cur = next;
        }

        if poly.len() >= 3 {
            polys.push(poly);
        }
    }

    polys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_yields_unit_square() {
        let mut img: Image<u8> = Image::new(3, 3);
        img.set(1, 1, 1);
        let polys = mask_to_polygons(&img, |v| v != 0);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
        assert!((polys[0].area().abs() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn block_of_pixels_yields_single_rectangle() {
        let mut img: Image<u8> = Image::new(5, 5);
        for y in 1..3 {
            for x in 1..4 {
                img.set(x, y, 1);
            }
        }
        let polys = mask_to_polygons(&img, |v| v != 0);
        assert_eq!(polys.len(), 1);
        assert!((polys[0].area().abs() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn empty_mask_yields_no_polygons() {
        let img: Image<u8> = Image::new(4, 4);
        let polys = mask_to_polygons(&img, |v| v != 0);
        assert!(polys.is_empty());
    }

    #[test]
    fn two_disjoint_pixels_yield_two_polygons() {
        let mut img: Image<u8> = Image::new(6, 6);
        img.set(0, 0, 1);
        img.set(5, 5, 1);
        let polys = mask_to_polygons(&img, |v| v != 0);
        assert_eq!(polys.len(), 2);
    }
}
