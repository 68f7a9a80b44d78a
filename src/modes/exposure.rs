// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Exposure mode: accumulate, per output pixel, the dead-time-corrected
//! livetime the detector spent pointed such that pixel was valid,
//! subdividing each good-time interval into short time segments and
//! reprojecting the bad-pixel map once per segment.

use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::constants::{CCD_XW, CCD_YW};
use crate::coord::CoordConv;
use crate::error::CoreError;
use crate::geom::{apply_shift_rotation_shift, Point, Rect};
use crate::image::Image as PixelImage;
use crate::mask::Mask;
use crate::modes::error::ModesError;
use crate::output::write_fits_image;
use crate::proj_mode::ProjMode;
use crate::raster::fill_poly;
use crate::tables::{AttitudeTable, DeadCorTable, DetMap};
use crate::worker::run_pipeline;

use super::LoadedData;

#[derive(Clone, Debug, PartialEq)]
struct TimeSeg {
    src_ra: f64,
    src_dec: f64,
    t: f64,
    dt: f64,
}

/// If `samples > 0` and fewer than the number of slices already built,
/// replace `segs` with exactly `samples` uniformly-spaced draws along the
/// cumulative-exposure-time axis, each carrying `dt = total_time / samples`
/// and the drawn slice's own `(src_ra, src_dec, t)`.
fn resample_uniform(segs: Vec<TimeSeg>, samples: usize) -> Vec<TimeSeg> {
    if samples == 0 || samples >= segs.len() {
        return segs;
    }
    let total_time: f64 = segs.iter().map(|s| s.dt).sum();
    if total_time <= 0.0 {
        return segs;
    }

    let mut cumulative = Vec::with_capacity(segs.len());
    let mut acc = 0.0;
    for s in &segs {
        acc += s.dt;
        cumulative.push(acc);
    }

    let new_dt = total_time / samples as f64;
    let mut out = Vec::with_capacity(samples);
    let mut idx = 0;
    for k in 0..samples {
        let target = (k as f64 + 0.5) * new_dt;
        while idx + 1 < segs.len() && cumulative[idx] < target {
            idx += 1;
        }
        out.push(TimeSeg {
            src_ra: segs[idx].src_ra,
            src_dec: segs[idx].src_dec,
            t: segs[idx].t,
            dt: new_dt,
        });
    }
    out
}

/// Subdivide every good-time interval into segments no longer than
/// `delta_t`, keep only (time, source) pairs the projection mode accepts,
/// and weight each by the dead-time correction factor at that time.
fn build_time_segs(
    config: &Config,
    att: &mut AttitudeTable,
    deadc: &mut DeadCorTable,
    coordconv: &mut CoordConv,
    proj_mode: &dyn ProjMode,
    x_ref: f64,
    y_ref: f64,
    gti: &crate::tables::GtiTable,
) -> Result<Vec<TimeSeg>, CoreError> {
    let mut segs = Vec::new();

    for (index, (start, stop)) in gti.intervals().enumerate() {
        if stop <= start {
            return Err(ModesError::InvalidGti { index, start, stop }.into());
        }
        let numt = ((stop - start) / config.delta_t).ceil().max(1.0) as u64;
        let dt = (stop - start) / numt as f64;

        for i in 0..numt {
            let t = start + (i as f64 + 0.5) * dt;
            let (ra, dec, roll) = att.interpolate(t)?;
            coordconv.update_pointing(ra, dec, roll);

            let weighted_dt = dt * deadc.interpolate(t)?;

            for src in &config.sources {
                let (sx, sy) = coordconv.radec2ccd(src.ra, src.dec);
                let _ = (x_ref, y_ref);
                if !proj_mode.source_valid(Point::new(sx as f32, sy as f32)) {
                    continue;
                }
                segs.push(TimeSeg {
                    src_ra: src.ra,
                    src_dec: src.dec,
                    t,
                    dt: weighted_dt,
                });
            }
        }
    }

    if segs.is_empty() {
        return Err(ModesError::NoValidSources.into());
    }
    Ok(resample_uniform(segs, config.samples))
}

struct Acc {
    img: PixelImage<f64>,
    att: AttitudeTable,
    detmap: DetMap,
    coordconv: CoordConv,
}

pub fn run(config: &Config, data: LoadedData) -> Result<(), CoreError> {
    let proj_mode: Arc<dyn ProjMode> = Arc::from(config.proj_mode.build());
    let img_centre = config.image_centre();
    let instpar = data.instpar;

    let mut att_setup = data.att.clone();
    let mut deadc_setup = data.deadc.clone();
    let mut coordconv_setup = CoordConv::new(instpar.x_platescale, instpar.y_platescale, instpar.x_ref, instpar.y_ref);

    let mut segs = build_time_segs(
        config,
        &mut att_setup,
        &mut deadc_setup,
        &mut coordconv_setup,
        proj_mode.as_ref(),
        instpar.x_ref,
        instpar.y_ref,
        &data.gti,
    )?;

    info!("processing {} time segments", segs.len());
    segs.reverse();

    let mask = Arc::new(data.mask);
    let xw = config.xw;
    let yw = config.yw;
    let pixsize = config.pixsize;
    let x_ref = instpar.x_ref;
    let y_ref = instpar.y_ref;
    let x_platescale = instpar.x_platescale;
    let y_platescale = instpar.y_platescale;

    let att_proto = data.att;
    let detmap_proto = data.detmap;

    let mask_for_process = Arc::clone(&mask);
    let proj_mode_for_process = Arc::clone(&proj_mode);

    let total = run_pipeline(
        segs,
        config.threads,
        move || Acc {
            img: PixelImage::new(xw, yw),
            att: att_proto.clone(),
            detmap: detmap_proto.clone(),
            coordconv: CoordConv::new(x_platescale, y_platescale, x_ref, y_ref),
        },
        move |seg, acc: &mut Acc| {
            process_segment(
                &seg,
                &mask_for_process,
                proj_mode_for_process.as_ref(),
                x_ref,
                y_ref,
                pixsize,
                img_centre,
                acc,
            )
        },
        |total, local| total.img.accumulate(&local.img),
    )
    .map_err(CoreError::Worker)?;

    let mut out = PixelImage::<f32>::new(config.xw, config.yw);
    for y in 0..config.yw {
        for x in 0..config.xw {
            out.set(x, y, total.img.get(x, y) as f32);
        }
    }
    write_fits_image(&config.out_fn, &out, img_centre, config.pixsize, config.bitpix)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process_segment(
    seg: &TimeSeg,
    mask: &Mask,
    proj_mode: &dyn ProjMode,
    x_ref: f64,
    y_ref: f64,
    pixsize: f32,
    img_centre: Point,
    acc: &mut Acc,
) -> Result<(), String> {
    let (ra, dec, roll) = acc.att.interpolate(seg.t).map_err(|e| e.to_string())?;
    acc.coordconv.update_pointing(ra, dec, roll);

    let (src_ccdx, src_ccdy) = acc.coordconv.radec2ccd(seg.src_ra, seg.src_dec);
    let src_ccd = Point::new(src_ccdx as f32, src_ccdy as f32);
    let delpt = src_ccd - Point::new(x_ref as f32, y_ref as f32);
    let proj_origin = proj_mode.origin(src_ccd);

    let mut mat = proj_mode.rotation_matrix(roll, delpt);
    mat.scale(1.0 / pixsize);
    let mut matrev = proj_mode.rotation_matrix(-roll, delpt);
    matrev.scale(pixsize);

    let corners = [
        Point::new(0.0, 0.0),
        Point::new(CCD_XW as f32, 0.0),
        Point::new(0.0, CCD_YW as f32),
        Point::new(CCD_XW as f32, CCD_YW as f32),
    ];
    let mut x0 = f32::INFINITY;
    let mut x1 = f32::NEG_INFINITY;
    let mut y0 = f32::INFINITY;
    let mut y1 = f32::NEG_INFINITY;
    for c in corners {
        let out = mat.apply(c - proj_origin) + img_centre;
        x0 = x0.min(out.x);
        x1 = x1.max(out.x);
        y0 = y0.min(out.y);
        y1 = y1.max(out.y);
    }

    let ix0 = x0.floor().max(0.0) as i64;
    let ix1 = (x1.ceil() as i64).min(acc.img.xw() as i64 - 1);
    let iy0 = y0.floor().max(0.0) as i64;
    let iy1 = (y1.ceil() as i64).min(acc.img.yw() as i64 - 1);
    if !Rect::overlap_i32(0, acc.img.xw() as i32 - 1, 0, acc.img.yw() as i32 - 1, ix0 as i32, ix1 as i32, iy0 as i32, iy1 as i32)
        || ix0 > ix1
        || iy0 > iy1
    {
        return Ok(());
    }

    let dm = acc.detmap.get_map(seg.t).clone();

    // Work entirely in the output bounding box rather than a full xw-by-yw
    // buffer: both the per-pixel detmap sample and the final accumulate
    // only ever touch this window.
    let w = (ix1 - ix0 + 1) as usize;
    let h = (iy1 - iy0 + 1) as usize;
    let bbox_origin = Point::new(ix0 as f32, iy0 as f32);

    let mut segment_img: PixelImage<f32> = PixelImage::new(w, h);
    for ly in 0..h {
        for lx in 0..w {
            let outpt = Point::new((ix0 as usize + lx) as f32, (iy0 as usize + ly) as f32);
            let det = matrev.apply(outpt - img_centre) + proj_origin;
            let dx = det.x.round() as i64;
            let dy = det.y.round() as i64;
            let value = if dm.in_bounds(dx, dy) { dm.get(dx as usize, dy as usize) } else { 0.0 };
            segment_img.set(lx, ly, value);
        }
    }

    let mut masked_polys = mask.as_ccd_poly(&acc.coordconv);
    apply_shift_rotation_shift(&mut masked_polys, &mat, proj_origin, img_centre);
    let masked_polys: Vec<_> = masked_polys.into_iter().map(|p| p - bbox_origin).collect();
    for poly in &masked_polys {
        fill_poly(poly, &mut segment_img, 0.0);
    }

    let mut window = acc.img.subrect(ix0 as usize, iy0 as usize, w, h);
    for ly in 0..h {
        for lx in 0..w {
            let v = segment_img.get(lx, ly);
            if v != 0.0 {
                let prev = window.get(lx, ly);
                window.set(lx, ly, prev + v as f64 * seg.dt);
            }
        }
    }
    for ly in 0..h {
        for lx in 0..w {
            acc.img.set(ix0 as usize + lx, iy0 as usize + ly, window.get(lx, ly));
        }
    }

    Ok(())
}
