// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Source-relative image, exposure-map and event-list reprojection for a
//! single eROSITA-class CCD module.

pub mod build_info;
pub mod caldb;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod geom;
pub mod image;
pub mod io;
pub mod logging;
pub mod mask;
pub mod mask_poly;
pub mod modes;
pub mod output;
pub mod proj_mode;
pub mod raster;
pub mod tables;
pub mod worker;

pub use error::CoreError;
