// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The FITS I/O seam: typed column reading behind a trait, and the leaf
//! error type for everything that can go wrong opening/reading files.

pub mod column;
pub mod error;

pub use column::{ColumnReader, FitsColumnReader};
pub use error::IoError;
