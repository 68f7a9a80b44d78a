// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The three output drivers (image, exposure, event) and the data-loading
//! glue they share: opening the event file's HDUs, resolving CALDB
//! instrument parameters, and reading an optional sky mask.

pub mod error;
pub mod event;
pub mod exposure;
pub mod image;

pub use error::ModesError;

use fitsio::images::ImageType;
use fitsio::FitsFile;

use crate::caldb::{lookup_cal, InstPar};
use crate::config::Config;
use crate::constants::{CCD_XW, CCD_YW};
use crate::error::CoreError;
use crate::image::Image as PixelImage;
use crate::io::{FitsColumnReader, IoError};
use crate::mask::{GnomonicWcs, Mask};
use crate::tables::{AttitudeTable, DeadCorTable, DetMap, EventTable, GtiTable};

/// Everything the three drivers need, loaded and filtered once up front.
pub struct LoadedData {
    pub instpar: InstPar,
    pub events: EventTable,
    pub gti: GtiTable,
    pub att: AttitudeTable,
    pub detmap: DetMap,
    pub deadc: DeadCorTable,
    pub mask: Mask,
}

pub fn load(config: &Config) -> Result<LoadedData, CoreError> {
    let instpar = InstPar::load(config.tm)?;

    let mut reader = FitsColumnReader::open(&config.evt_fn)?;

    let mut events = EventTable::read(&mut reader, config.tm)?;
    events.filter_pi(config.pi_min, config.pi_max);

    let gti = GtiTable::read(&mut reader, config.tm)?;
    events.filter_gti(&gti);

    let att = AttitudeTable::read(&mut reader, config.tm)?;
    let deadc = DeadCorTable::read(&mut reader, config.tm)?;

    let detmap_image = if config.use_detmap {
        Some(load_caldb_detmap_image(config.tm)?)
    } else {
        None
    };
    let mut detmap = DetMap::new(detmap_image.as_ref(), config.shadowmask);
    detmap.read(&mut reader, config.tm)?;

    let mask = match &config.mask_fn {
        Some(path) => load_mask(path)?,
        None => Mask::empty(),
    }
    .with_mask_pts(config.mask_pts.clone());

    Ok(LoadedData {
        instpar,
        events,
        gti,
        att,
        detmap,
        deadc,
        mask,
    })
}

fn load_caldb_detmap_image(tm: u8) -> Result<PixelImage<f32>, CoreError> {
    let path = lookup_cal(&format!("tm{tm}"), "DETMAP")?;
    let path_str = path.to_string_lossy().to_string();
    load_image_hdu(&path_str, CCD_XW, CCD_YW).map_err(CoreError::from)
}

fn load_image_hdu(path: &str, expect_xw: usize, expect_yw: usize) -> Result<PixelImage<f32>, IoError> {
    let mut file = FitsFile::open(path).map_err(|source| IoError::Open {
        path: path.to_string(),
        source,
    })?;
    let hdu = file.primary_hdu().map_err(|source| IoError::Open {
        path: path.to_string(),
        source,
    })?;

    let shape = match &hdu.info {
        fitsio::hdu::HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => Vec::new(),
    };
    if shape != [expect_yw, expect_xw] {
        return Err(IoError::ImageShapeMismatch(path.to_string(), shape, vec![expect_yw, expect_xw]));
    }

    let data: Vec<f32> = hdu
        .read_image(&mut file, ImageType::Float)
        .map_err(|source| IoError::Open {
            path: path.to_string(),
            source,
        })?;

    let mut img = PixelImage::new(expect_xw, expect_yw);
    for y in 0..expect_yw {
        for x in 0..expect_xw {
            img.set(x, y, data[y * expect_xw + x]);
        }
    }
    Ok(img)
}

fn load_mask(path: &str) -> Result<Mask, CoreError> {
    let mut file = FitsFile::open(path).map_err(|source| IoError::Open {
        path: path.to_string(),
        source,
    })?;
    let hdu = file.primary_hdu().map_err(|source| IoError::Open {
        path: path.to_string(),
        source,
    })?;

    let shape = match &hdu.info {
        fitsio::hdu::HduInfo::ImageInfo { shape, .. } => shape.clone(),
        _ => Vec::new(),
    };
    if shape.len() != 2 {
        return Err(CoreError::Other(format!("mask file '{path}' is not a 2-D image")));
    }
    let (yw, xw) = (shape[0], shape[1]);

    let data: Vec<i32> = hdu
        .read_image(&mut file, ImageType::Long)
        .map_err(|source| IoError::Open {
            path: path.to_string(),
            source,
        })?;

    let mut img: PixelImage<i32> = PixelImage::new(xw, yw);
    for y in 0..yw {
        for x in 0..xw {
            img.set(x, y, data[y * xw + x]);
        }
    }

    let read_key = |name: &str, default: f64| -> f64 {
        hdu.read_key(&mut file, name).unwrap_or(default)
    };
    let wcs = GnomonicWcs {
        crval1: read_key("CRVAL1", 0.0),
        crval2: read_key("CRVAL2", 0.0),
        crpix1: read_key("CRPIX1", (xw / 2) as f64),
        crpix2: read_key("CRPIX2", (yw / 2) as f64),
        cdelt1: read_key("CDELT1", -1.0 / 3600.0),
        cdelt2: read_key("CDELT2", 1.0 / 3600.0),
    };

    Ok(Mask::from_image(&img, &wcs))
}
