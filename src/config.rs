// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The validated run configuration: everything the drivers in
//! [`crate::modes`] need, assembled from merged CLI/args-file input and
//! checked once before any file is opened.

use crate::error::ConfigError;
use crate::geom::Point;
use crate::proj_mode::{self, ProjMode};

/// Which output this run produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Image,
    Exposure,
    Event,
}

/// The seven projection-mode variants and the arguments each one needs.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjModeKind {
    AverageFov,
    AverageFovSky,
    AverageFull,
    WholeDet,
    Radial { r_in: f32, r_out: f32 },
    RadialSym { r_in: f32, r_out: f32 },
    Box { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl ProjModeKind {
    pub fn build(&self) -> Box<dyn ProjMode> {
        match *self {
            ProjModeKind::AverageFov => Box::new(proj_mode::AverageFov),
            ProjModeKind::AverageFovSky => Box::new(proj_mode::AverageFovSky),
            ProjModeKind::AverageFull => Box::new(proj_mode::AverageFull),
            ProjModeKind::WholeDet => Box::new(proj_mode::WholeDet),
            ProjModeKind::Radial { r_in, r_out } => Box::new(proj_mode::Radial { r_in, r_out }),
            ProjModeKind::RadialSym { r_in, r_out } => Box::new(proj_mode::RadialSym { r_in, r_out }),
            ProjModeKind::Box { x1, y1, x2, y2 } => Box::new(proj_mode::Box { x1, y1, x2, y2 }),
        }
    }
}

/// One source position to reproject onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Source {
    pub ra: f64,
    pub dec: f64,
}

/// `BITPIX` of the output image. Integer variants store scaled samples via
/// `BSCALE`/`BZERO`; see [`crate::output::write_fits_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Bitpix {
    #[default]
    Float32,
    Int8,
    Int16,
}

impl Bitpix {
    pub fn from_i32(v: i32) -> Result<Self, ConfigError> {
        match v {
            -32 => Ok(Bitpix::Float32),
            8 => Ok(Bitpix::Int8),
            16 => Ok(Bitpix::Int16),
            other => Err(ConfigError::Invalid {
                option: "--bitpix",
                reason: format!("unsupported bitpix {other}, expected one of -32, 8, 16"),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mode: OutputMode,
    pub tm: u8,
    pub sources: Vec<Source>,
    pub pi_min: f32,
    pub pi_max: f32,
    pub proj_mode: ProjModeKind,
    pub threads: usize,
    pub xw: usize,
    pub yw: usize,
    pub pixsize: f32,
    pub delta_t: f64,
    pub samples: usize,
    pub shadowmask: bool,
    pub use_detmap: bool,
    pub evt_fn: String,
    pub mask_fn: Option<String>,
    /// Circular source masks: `(ra, dec)` degrees plus radius in CCD pixels.
    pub mask_pts: Vec<(f64, f64, f32)>,
    pub out_fn: String,
    pub bitpix: Bitpix,
}

impl Config {
    /// Image centre in output-pixel coordinates, `(xw/2, yw/2)`.
    pub fn image_centre(&self) -> Point {
        Point::new((self.xw / 2) as f32, (self.yw / 2) as f32)
    }

    /// Cross-field validation that can't be expressed in the CLI parser
    /// itself: non-empty/consistent fields, sane ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evt_fn.is_empty() {
            return Err(ConfigError::Missing("--evt"));
        }
        if self.out_fn.is_empty() {
            return Err(ConfigError::Missing("--out"));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Missing("--sources"));
        }
        if self.pi_min >= self.pi_max {
            return Err(ConfigError::Invalid {
                option: "--pi-min/--pi-max",
                reason: format!("pi_min ({}) must be less than pi_max ({})", self.pi_min, self.pi_max),
            });
        }
        if self.xw == 0 || self.yw == 0 {
            return Err(ConfigError::Invalid {
                option: "--xw/--yw",
                reason: "image dimensions must be non-zero".to_string(),
            });
        }
        if self.pixsize <= 0.0 {
            return Err(ConfigError::Invalid {
                option: "--pixsize",
                reason: "must be positive".to_string(),
            });
        }
        if self.mode == OutputMode::Exposure && self.delta_t <= 0.0 {
            return Err(ConfigError::Invalid {
                option: "--delta-t",
                reason: "must be positive for exposure mode".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            mode: OutputMode::Image,
            tm: 1,
            sources: vec![Source { ra: 10.0, dec: -20.0 }],
            pi_min: 300.0,
            pi_max: 2300.0,
            proj_mode: ProjModeKind::AverageFov,
            threads: 1,
            xw: 512,
            yw: 512,
            pixsize: 1.0,
            delta_t: 0.01,
            samples: 0,
            shadowmask: false,
            use_detmap: true,
            evt_fn: "events.fits".to_string(),
            mask_fn: None,
            mask_pts: Vec::new(),
            out_fn: "out.fits".to_string(),
            bitpix: Bitpix::Float32,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_pi_range() {
        let mut c = base();
        c.pi_min = 3000.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn exposure_mode_requires_positive_delta_t() {
        let mut c = base();
        c.mode = OutputMode::Exposure;
        c.delta_t = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn bitpix_accepts_only_the_documented_values() {
        assert_eq!(Bitpix::from_i32(-32).unwrap(), Bitpix::Float32);
        assert_eq!(Bitpix::from_i32(8).unwrap(), Bitpix::Int8);
        assert_eq!(Bitpix::from_i32(16).unwrap(), Bitpix::Int16);
        assert!(Bitpix::from_i32(64).is_err());
    }

    #[test]
    fn image_centre_is_half_dimensions() {
        let c = base();
        let p = c.image_centre();
        assert_eq!(p.x, 256.0);
        assert_eq!(p.y, 256.0);
    }
}
