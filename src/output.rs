// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Output writers: a FITS image HDU for image/exposure mode, or an
//! `EROEVT` binary table for event mode.

use fitsio::images::{ImageDescription, ImageType};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;

use crate::config::Bitpix;
use crate::geom::Point;
use crate::image::Image;
use crate::io::IoError;

fn wrap_open(path: &str, source: fitsio::errors::Error) -> IoError {
    IoError::Open {
        path: path.to_string(),
        source,
    }
}

/// Write `img` as the primary HDU of a new FITS file, with a self-
/// referential pixel-grid WCS (`CRPIX`/`CDELT`/`CRVAL`/`CUNIT`) centred on
/// `centre`. `bitpix` picks the on-disk pixel representation: `Float32`
/// stores the samples as-is; `Int8`/`Int16` scale them into the integer
/// range via `BSCALE`/`BZERO`, with the scale derived from the image's own
/// peak value (`peak / 255` or `peak / 32767`).
pub fn write_fits_image(path: &str, img: &Image<f32>, centre: Point, pixsize: f32, bitpix: Bitpix) -> Result<(), IoError> {
    let data_type = match bitpix {
        Bitpix::Float32 => ImageType::Float,
        Bitpix::Int8 => ImageType::Byte,
        Bitpix::Int16 => ImageType::Short,
    };
    let description = ImageDescription {
        data_type,
        dimensions: &[img.yw(), img.xw()],
    };
    let mut file = FitsFile::create(path)
        .with_custom_primary(&description)
        .open()
        .map_err(|source| wrap_open(path, source))?;
    let hdu = file.primary_hdu().map_err(|source| wrap_open(path, source))?;

    let scale = match bitpix {
        Bitpix::Float32 => {
            hdu.write_image(&mut file, img.as_array().as_slice().unwrap_or(&[]))
                .map_err(|source| wrap_open(path, source))?;
            None
        }
        Bitpix::Int8 => {
            let scale = scale_factor(img, 255.0);
            let data: Vec<u8> = img.as_array().iter().map(|&v| (v / scale).round().clamp(0.0, 255.0) as u8).collect();
            hdu.write_image(&mut file, &data).map_err(|source| wrap_open(path, source))?;
            Some(scale)
        }
        Bitpix::Int16 => {
            let scale = scale_factor(img, 32767.0);
            let data: Vec<i16> = img
                .as_array()
                .iter()
                .map(|&v| (v / scale).round().clamp(0.0, 32767.0) as i16)
                .collect();
            hdu.write_image(&mut file, &data).map_err(|source| wrap_open(path, source))?;
            Some(scale)
        }
    };
    if let Some(scale) = scale {
        hdu.write_key(&mut file, "BSCALE", scale as f64).map_err(|source| wrap_open(path, source))?;
        hdu.write_key(&mut file, "BZERO", 0.0f64).map_err(|source| wrap_open(path, source))?;
    }

    let keys: &[(&str, f64)] = &[
        ("CRPIX1", centre.x as f64 + 1.0),
        ("CRPIX2", centre.y as f64 + 1.0),
        ("CDELT1", -(pixsize as f64)),
        ("CDELT2", pixsize as f64),
        ("CRVAL1", 0.0),
        ("CRVAL2", 0.0),
    ];
    for (key, value) in keys {
        hdu.write_key(&mut file, key, *value).map_err(|source| wrap_open(path, source))?;
    }
    hdu.write_key(&mut file, "CUNIT1", "pix").map_err(|source| wrap_open(path, source))?;
    hdu.write_key(&mut file, "CUNIT2", "pix").map_err(|source| wrap_open(path, source))?;

    Ok(())
}

/// The `BSCALE` mapping the image's peak pixel onto `max_code` (255 or
/// 32767), falling back to 1.0 for an all-zero image.
fn scale_factor(img: &Image<f32>, max_code: f32) -> f32 {
    let peak = img.max().unwrap_or(0.0).max(0.0);
    if peak > 0.0 {
        peak / max_code
    } else {
        1.0
    }
}

/// One reprojected photon, ready to be written to the `EROEVT` table.
#[derive(Clone, Copy, Debug)]
pub struct EventOut {
    pub dx: f32,
    pub dy: f32,
    pub pi: f32,
}

/// Write a reprojected event list as an `EROEVT` binary table (`DX`, `DY`,
/// `PI` columns, units `PIX`/`PIX`/none).
pub fn write_fits_events(path: &str, events: &[EventOut]) -> Result<(), IoError> {
    let mut file = FitsFile::create(path).open().map_err(|source| wrap_open(path, source))?;

    let columns = vec![
        ColumnDescription::new("DX").with_type(ColumnDataType::Float).create().unwrap(),
        ColumnDescription::new("DY").with_type(ColumnDataType::Float).create().unwrap(),
        ColumnDescription::new("PI").with_type(ColumnDataType::Float).create().unwrap(),
    ];

    let hdu = file
        .create_table("EROEVT".to_string(), &columns)
        .map_err(|source| wrap_open(path, source))?;

    let dx: Vec<f32> = events.iter().map(|e| e.dx).collect();
    let dy: Vec<f32> = events.iter().map(|e| e.dy).collect();
    let pi: Vec<f32> = events.iter().map(|e| e.pi).collect();

    hdu.write_col(&mut file, "DX", &dx).map_err(|source| wrap_open(path, source))?;
    hdu.write_col(&mut file, "DY", &dy).map_err(|source| wrap_open(path, source))?;
    hdu.write_col(&mut file, "PI", &pi).map_err(|source| wrap_open(path, source))?;

    hdu.write_key(&mut file, "TUNIT1", "PIX").map_err(|source| wrap_open(path, source))?;
    hdu.write_key(&mut file, "TUNIT2", "PIX").map_err(|source| wrap_open(path, source))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factor_divides_peak_by_the_code_range() {
        let mut img: Image<f32> = Image::new(2, 2);
        img.set(0, 0, 510.0);
        assert_eq!(scale_factor(&img, 255.0), 2.0);
    }

    #[test]
    fn scale_factor_falls_back_to_one_for_an_all_zero_image() {
        let img: Image<f32> = Image::new(2, 2);
        assert_eq!(scale_factor(&img, 255.0), 1.0);
    }
}
