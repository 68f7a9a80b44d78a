// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image mode: bin reprojected photon positions into a source-relative
//! image, one pixel increment per surviving event.

use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::constants::EVENT_CHUNK_SIZE;
use crate::coord::CoordConv;
use crate::error::CoreError;
use crate::geom::{is_inside_any, Point};
use crate::image::Image as PixelImage;
use crate::mask::Mask;
use crate::output::write_fits_image;
use crate::proj_mode::ProjMode;
use crate::tables::{AttitudeTable, DetMap, EventTable};
use crate::worker::run_pipeline;

use super::LoadedData;

/// One unit of work: reproject events `[start, start + chunk_size)` for
/// one configured source.
struct WorkItem {
    src_ra: f64,
    src_dec: f64,
    start: usize,
}

struct Acc {
    img: PixelImage<i32>,
    att: AttitudeTable,
    detmap: DetMap,
    coordconv: CoordConv,
}

pub fn run(config: &Config, data: LoadedData) -> Result<(), CoreError> {
    let proj_mode: Arc<dyn ProjMode> = Arc::from(config.proj_mode.build());
    let img_centre = config.image_centre();
    let instpar = data.instpar;
    let events = Arc::new(data.events);
    let mask = Arc::new(data.mask);

    info!("building image ({} sources, {} events)", config.sources.len(), events.len());

    let mut items = Vec::new();
    let mut start = 0usize;
    while start < events.len() {
        for src in &config.sources {
            items.push(WorkItem {
                src_ra: src.ra,
                src_dec: src.dec,
                start,
            });
        }
        start += EVENT_CHUNK_SIZE;
    }

    let xw = config.xw;
    let yw = config.yw;
    let pixsize = config.pixsize;
    let x_ref = instpar.x_ref;
    let y_ref = instpar.y_ref;
    let x_platescale = instpar.x_platescale;
    let y_platescale = instpar.y_platescale;

    let att_proto = data.att.clone();
    let detmap_proto = data.detmap;

    let events_for_new = Arc::clone(&events);
    let mask_for_process = Arc::clone(&mask);
    let events_for_process = Arc::clone(&events);
    let proj_mode_for_process = Arc::clone(&proj_mode);

    let total = run_pipeline(
        items,
        config.threads,
        move || {
            let _ = &events_for_new;
            Acc {
                img: PixelImage::new(xw, yw),
                att: att_proto.clone(),
                detmap: detmap_proto.clone(),
                coordconv: CoordConv::new(x_platescale, y_platescale, x_ref, y_ref),
            }
        },
        move |item, acc: &mut Acc| {
            process_chunk(
                &item,
                &events_for_process,
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
fn process_chunk(
    item: &WorkItem,
    events: &EventTable,
    mask: &Mask,
    proj_mode: &dyn ProjMode,
    x_ref: f64,
    y_ref: f64,
    pixsize: f32,
    img_centre: Point,
    acc: &mut Acc,
) -> Result<(), String> {
    let end = (item.start + EVENT_CHUNK_SIZE).min(events.len());
    for i in item.start..end {
        let evtpt = Point::new(events.ccdx[i], events.ccdy[i]);

        let (att_ra, att_dec, att_roll) = acc
            .att
            .interpolate(events.time[i])
            .map_err(|e| e.to_string())?;
        acc.coordconv.update_pointing(att_ra, att_dec, att_roll);

        let dm = acc.detmap.get_map(events.time[i]);
        let (rx, ry) = (events.rawx[i] as i64 - 1, events.rawy[i] as i64 - 1);
        if !dm.in_bounds(rx, ry) || dm.get(rx as usize, ry as usize) == 0.0 {
            continue;
        }

        let ccd_masked = mask.as_ccd_poly(&acc.coordconv);
        if is_inside_any(&ccd_masked, evtpt) {
            continue;
        }

        let (src_ccdx, src_ccdy) = acc.coordconv.radec2ccd(item.src_ra, item.src_dec);
        let src_ccd = Point::new(src_ccdx as f32, src_ccdy as f32);
        if !proj_mode.source_valid(src_ccd) {
            continue;
        }

        let origin = proj_mode.origin(src_ccd);
        let relpt_raw = evtpt - origin;
        let delpt = src_ccd - Point::new(x_ref as f32, y_ref as f32);
        let mat = proj_mode.rotation_matrix(att_roll, delpt);
        let relpt = mat.apply(relpt_raw);

        let scalept = relpt / pixsize + img_centre;
        let px = scalept.x.round() as i64;
        let py = scalept.y.round() as i64;
        if acc.img.in_bounds(px, py) {
            acc.img.get_mut_incr(px as usize, py as usize, 1);
        }
    }
    Ok(())
}
