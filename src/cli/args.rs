// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line surface: three subcommands sharing a common set of
//! options, each optionally backed by a `--args-file` of the same fields.
//! CLI flags take precedence over the file, which takes precedence over
//! built-in defaults.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::config::{Bitpix, Config, OutputMode, ProjModeKind, Source};
use crate::error::ConfigError;

lazy_static! {
    static ref LONG_VERSION: String = crate::build_info::long_version();
}

#[derive(Parser, Debug)]
#[clap(
    name = "ero-recon",
    version,
    long_version = LONG_VERSION.as_str(),
    about = "Source-relative reprojection for one eROSITA-class CCD module"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Increase logging verbosity; may be repeated (-v, -vv, -vvv).
    #[clap(short, long, global = true, parse(from_occurrences))]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Produce a source-relative sky image.
    Image(SubArgs),
    /// Produce a source-relative exposure map.
    Expos(SubArgs),
    /// Produce a reprojected event list.
    Event(SubArgs),
}

/// Options shared by every subcommand. Every field that can also come from
/// an `--args-file` is `Option<T>` here so merging can tell "not supplied"
/// apart from "supplied as the default value".
#[derive(Args, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubArgs {
    /// Merge these options in from a TOML/YAML/JSON file before applying
    /// built-in defaults. CLI flags still take precedence over the file.
    #[clap(long)]
    #[serde(skip)]
    pub args_file: Option<PathBuf>,

    #[clap(long, help_heading = "INPUT")]
    pub evt: Option<String>,
    #[clap(long, help_heading = "INPUT")]
    pub mask: Option<String>,
    /// One or more `ra,dec,radius_px` circular source masks, applied on top
    /// of `--mask`.
    #[clap(long, help_heading = "INPUT")]
    pub mask_pts: Option<Vec<String>>,
    #[clap(long, help_heading = "INPUT")]
    pub gti: Option<String>,
    #[clap(long, help_heading = "OUTPUT")]
    pub out: Option<String>,
    /// Output `BITPIX`: -32 (float, default), 8, or 16 (scaled via
    /// `BSCALE`/`BZERO`).
    #[clap(long, help_heading = "OUTPUT")]
    pub bitpix: Option<i32>,

    #[clap(long, help_heading = "INSTRUMENT")]
    pub tm: Option<u8>,
    #[clap(long, help_heading = "INSTRUMENT")]
    pub detmap: Option<bool>,
    #[clap(long, help_heading = "INSTRUMENT")]
    pub shadowmask: Option<bool>,

    /// One or more `ra,dec` pairs (degrees).
    #[clap(long, help_heading = "SOURCE")]
    pub sources: Option<Vec<String>>,
    #[clap(long, help_heading = "SOURCE")]
    pub pi_min: Option<f32>,
    #[clap(long, help_heading = "SOURCE")]
    pub pi_max: Option<f32>,

    #[clap(long, help_heading = "PROJECTION")]
    pub proj_mode: Option<String>,
    #[clap(long, help_heading = "PROJECTION")]
    pub proj_args: Option<Vec<f32>>,

    #[clap(long, help_heading = "IMAGE")]
    pub xw: Option<usize>,
    #[clap(long, help_heading = "IMAGE")]
    pub yw: Option<usize>,
    #[clap(long, help_heading = "IMAGE")]
    pub pixsize: Option<f32>,

    #[clap(long, help_heading = "EXPOSURE")]
    pub delta_t: Option<f64>,
    #[clap(long, help_heading = "EXPOSURE")]
    pub samples: Option<usize>,

    #[clap(long, help_heading = "EXECUTION")]
    pub threads: Option<usize>,
}

impl SubArgs {
    /// CLI-supplied fields (`self`) win over file-supplied ones (`file`).
    pub fn merge(self, file: SubArgs) -> SubArgs {
        macro_rules! pick {
            ($field:ident) => {
                self.$field.or(file.$field)
            };
        }
        SubArgs {
            args_file: self.args_file,
            evt: pick!(evt),
            mask: pick!(mask),
            mask_pts: pick!(mask_pts),
            gti: pick!(gti),
            out: pick!(out),
            bitpix: pick!(bitpix),
            tm: pick!(tm),
            detmap: pick!(detmap),
            shadowmask: pick!(shadowmask),
            sources: pick!(sources),
            pi_min: pick!(pi_min),
            pi_max: pick!(pi_max),
            proj_mode: pick!(proj_mode),
            proj_args: pick!(proj_args),
            xw: pick!(xw),
            yw: pick!(yw),
            pixsize: pick!(pixsize),
            delta_t: pick!(delta_t),
            samples: pick!(samples),
            threads: pick!(threads),
        }
    }

    /// Load the `--args-file`, if one was given, and merge it in.
    pub fn merge_args_file(self) -> Result<SubArgs, ConfigError> {
        let Some(path) = self.args_file.clone() else {
            return Ok(self);
        };
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Invalid {
            option: "--args-file",
            reason: e.to_string(),
        })?;
        let file_args: SubArgs = parse_args_file(&path, &text)?;
        Ok(self.merge(file_args))
    }

    fn parse_source(s: &str) -> Result<Source, ConfigError> {
        let mut parts = s.split(',');
        let ra: f64 = parts
            .next()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ConfigError::Invalid {
                option: "--sources",
                reason: format!("couldn't parse ra from '{s}'"),
            })?;
        let dec: f64 = parts
            .next()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ConfigError::Invalid {
                option: "--sources",
                reason: format!("couldn't parse dec from '{s}'"),
            })?;
        Ok(Source { ra, dec })
    }

    fn parse_mask_pt(s: &str) -> Result<(f64, f64, f32), ConfigError> {
        let mut parts = s.split(',');
        let mut next = |what: &str| -> Result<f64, ConfigError> {
            parts
                .next()
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| ConfigError::Invalid {
                    option: "--mask-pts",
                    reason: format!("couldn't parse {what} from '{s}'"),
                })
        };
        let ra = next("ra")?;
        let dec = next("dec")?;
        let rad_px = next("radius")?;
        Ok((ra, dec, rad_px as f32))
    }

    fn parse_proj_mode(&self) -> Result<ProjModeKind, ConfigError> {
        let name = self.proj_mode.as_deref().unwrap_or("average-fov");
        let args = self.proj_args.clone().unwrap_or_default();
        let arg = |i: usize| args.get(i).copied().unwrap_or(0.0);

        Ok(match name {
            "average-fov" => ProjModeKind::AverageFov,
            "average-fov-sky" => ProjModeKind::AverageFovSky,
            "average-full" => ProjModeKind::AverageFull,
            "whole-det" => ProjModeKind::WholeDet,
            "radial" => ProjModeKind::Radial { r_in: arg(0), r_out: arg(1) },
            "radial-sym" => ProjModeKind::RadialSym { r_in: arg(0), r_out: arg(1) },
            "box" => ProjModeKind::Box {
                x1: arg(0),
                y1: arg(1),
                x2: arg(2),
                y2: arg(3),
            },
            other => {
                return Err(ConfigError::Invalid {
                    option: "--proj-mode",
                    reason: format!("unknown projection mode '{other}'"),
                })
            }
        })
    }

    /// Apply built-in defaults to anything still unset, parse, and build a
    /// validated [`Config`].
    pub fn into_config(self, mode: OutputMode) -> Result<Config, ConfigError> {
        let sources = self
            .sources
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|s| Self::parse_source(s))
            .collect::<Result<Vec<_>, _>>()?;

        let mask_pts = self
            .mask_pts
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|s| Self::parse_mask_pt(s))
            .collect::<Result<Vec<_>, _>>()?;

        let bitpix = match self.bitpix {
            Some(v) => Bitpix::from_i32(v)?,
            None => Bitpix::Float32,
        };

        let proj_mode = self.parse_proj_mode()?;

        let config = Config {
            mode,
            tm: self.tm.unwrap_or(1),
            sources,
            pi_min: self.pi_min.unwrap_or(300.0),
            pi_max: self.pi_max.unwrap_or(2300.0),
            proj_mode,
            threads: self.threads.unwrap_or(1),
            xw: self.xw.unwrap_or(512),
            yw: self.yw.unwrap_or(512),
            pixsize: self.pixsize.unwrap_or(1.0),
            delta_t: self.delta_t.unwrap_or(0.01),
            samples: self.samples.unwrap_or(0),
            shadowmask: self.shadowmask.unwrap_or(false),
            use_detmap: self.detmap.unwrap_or(true),
            evt_fn: self.evt.unwrap_or_default(),
            mask_fn: self.mask,
            mask_pts,
            out_fn: self.out.unwrap_or_default(),
            bitpix,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_args_file(path: &std::path::Path, text: &str) -> Result<SubArgs, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parsed = match ext {
        "yaml" | "yml" => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(text).map_err(|e| e.to_string()),
        _ => toml::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| ConfigError::Invalid { option: "--args-file", reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_fields_win_over_file_fields_in_merge() {
        let cli = SubArgs {
            tm: Some(2),
            ..Default::default()
        };
        let file = SubArgs {
            tm: Some(9),
            xw: Some(1024),
            ..Default::default()
        };
        let merged = cli.merge(file);
        assert_eq!(merged.tm, Some(2));
        assert_eq!(merged.xw, Some(1024));
    }

    #[test]
    fn parse_source_accepts_ra_dec_pair() {
        let src = SubArgs::parse_source("123.4, -45.6").unwrap();
        assert_eq!(src.ra, 123.4);
        assert_eq!(src.dec, -45.6);
    }

    #[test]
    fn unknown_projection_mode_is_rejected() {
        let args = SubArgs {
            proj_mode: Some("nonexistent".to_string()),
            ..Default::default()
        };
        assert!(args.parse_proj_mode().is_err());
    }

    #[test]
    fn parse_mask_pt_accepts_ra_dec_radius_triple() {
        let pt = SubArgs::parse_mask_pt("10.0, -20.0, 5.5").unwrap();
        assert_eq!(pt, (10.0, -20.0, 5.5));
    }

    #[test]
    fn parse_mask_pt_rejects_missing_radius() {
        assert!(SubArgs::parse_mask_pt("10.0, -20.0").is_err());
    }
}
