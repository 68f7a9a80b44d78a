// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A dense 2-D pixel grid, indexed `(x, y)` with `x` the fast axis, backed
//! by [`ndarray::Array2`].

use std::ops::AddAssign;

use ndarray::Array2;

/// A `xw`-by-`yw` grid of pixels. Indexing is `(x, y)`; internally this is
/// stored row-major as `ndarray` requires, i.e. `arr[[y, x]]`.
#[derive(Clone, Debug)]
pub struct Image<T> {
    arr: Array2<T>,
}

impl<T: Copy + Default> Image<T> {
    /// A new image of the given size, every pixel set to `T::default()`.
    pub fn new(xw: usize, yw: usize) -> Self {
        Self {
            arr: Array2::from_elem((yw, xw), T::default()),
        }
    }

    pub fn filled(xw: usize, yw: usize, value: T) -> Self {
        Self {
            arr: Array2::from_elem((yw, xw), value),
        }
    }

    pub fn xw(&self) -> usize {
        self.arr.ncols()
    }

    pub fn yw(&self) -> usize {
        self.arr.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.arr[[y, x]]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.arr[[y, x]] = value;
    }

    /// Is `(x, y)` within the image bounds? Takes signed coordinates since
    /// callers are usually testing a rounded floating-point pixel position.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.xw() && (y as usize) < self.yw()
    }

    pub fn as_array(&self) -> &Array2<T> {
        &self.arr
    }

    pub fn as_array_mut(&mut self) -> &mut Array2<T> {
        &mut self.arr
    }

    pub fn into_array(self) -> Array2<T> {
        self.arr
    }

    /// A copy of the `w`-by-`h` region starting at `(x0, y0)`, clipped to
    /// the image bounds. Returns a possibly-smaller image if the requested
    /// rectangle runs off the edge.
    pub fn subrect(&self, x0: usize, y0: usize, w: usize, h: usize) -> Image<T> {
        let x1 = (x0 + w).min(self.xw());
        let y1 = (y0 + h).min(self.yw());
        let x0 = x0.min(x1);
        let y0 = y0.min(y1);
        let mut out = Image::new(x1 - x0, y1 - y0);
        for y in y0..y1 {
            for x in x0..x1 {
                out.set(x - x0, y - y0, self.get(x, y));
            }
        }
        out
    }

    /// A new image with the `x`/`y` axes swapped.
    pub fn transpose(&self) -> Image<T> {
        let mut out = Image::new(self.yw(), self.xw());
        for y in 0..self.yw() {
            for x in 0..self.xw() {
                out.set(y, x, self.get(x, y));
            }
        }
        out
    }
}

impl<T: Copy + Default + PartialOrd> Image<T> {
    /// The smallest pixel value. `None` for an empty image.
    pub fn min(&self) -> Option<T> {
        self.arr.iter().copied().fold(None, |acc, v| match acc {
            None => Some(v),
            Some(m) if v < m => Some(v),
            Some(m) => Some(m),
        })
    }

    /// The largest pixel value. `None` for an empty image.
    pub fn max(&self) -> Option<T> {
        self.arr.iter().copied().fold(None, |acc, v| match acc {
            None => Some(v),
            Some(m) if v > m => Some(v),
            Some(m) => Some(m),
        })
    }
}

impl<T: Copy + Default + AddAssign> Image<T> {
    pub fn get_mut_incr(&mut self, x: usize, y: usize, delta: T) {
        self.arr[[y, x]] += delta;
    }

    /// Fold `other` into `self` elementwise, in place. Used to reduce a
    /// per-worker accumulator into the shared final image under a mutex.
    pub fn accumulate(&mut self, other: &Image<T>) {
        self.arr += &other.arr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_is_zeroed() {
        let img: Image<f64> = Image::new(4, 3);
        assert_eq!(img.xw(), 4);
        assert_eq!(img.yw(), 3);
        assert_eq!(img.get(1, 2), 0.0);
    }

    #[test]
    fn accumulate_sums_elementwise() {
        let mut a: Image<i32> = Image::new(2, 2);
        let mut b: Image<i32> = Image::new(2, 2);
        a.set(0, 0, 3);
        b.set(0, 0, 4);
        b.set(1, 1, 7);
        a.accumulate(&b);
        assert_eq!(a.get(0, 0), 7);
        assert_eq!(a.get(1, 1), 7);
    }

    #[test]
    fn bounds_check_rejects_negative_and_overflow() {
        let img: Image<u8> = Image::new(5, 5);
        assert!(img.in_bounds(0, 0));
        assert!(img.in_bounds(4, 4));
        assert!(!img.in_bounds(-1, 0));
        assert!(!img.in_bounds(5, 0));
    }

    #[test]
    fn subrect_extracts_clipped_region() {
        let mut img: Image<i32> = Image::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                img.set(x, y, (y * 4 + x) as i32);
            }
        }
        let r = img.subrect(2, 2, 10, 10);
        assert_eq!((r.xw(), r.yw()), (2, 2));
        assert_eq!(r.get(0, 0), img.get(2, 2));
        assert_eq!(r.get(1, 1), img.get(3, 3));
    }

    #[test]
    fn transpose_swaps_axes() {
        let mut img: Image<i32> = Image::new(3, 2);
        img.set(2, 0, 9);
        let t = img.transpose();
        assert_eq!((t.xw(), t.yw()), (2, 3));
        assert_eq!(t.get(0, 2), 9);
    }

    #[test]
    fn min_and_max_find_extremes() {
        let mut img: Image<i32> = Image::new(2, 2);
        img.set(0, 0, -5);
        img.set(1, 1, 9);
        assert_eq!(img.min(), Some(-5));
        assert_eq!(img.max(), Some(9));
    }
}
