// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point/rectangle/matrix primitives, polygons, and polygon clipping —
//! the shared vocabulary everything above it (mask-to-polygon building,
//! rasterization, projection modes) is built from.

mod clip;
mod point;
mod poly;

pub use clip::poly_clip;
pub use point::{Matrix2, Point, Rect};
pub use poly::{apply_shift_rotation_shift, is_inside_any, Poly, PolyVec};
