// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Event mode: emit a reprojected event list (source-relative `dx`/`dy`
//! plus the original `pi`) instead of binning into an image.

use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::constants::EVENT_CHUNK_SIZE;
use crate::coord::CoordConv;
use crate::error::CoreError;
use crate::geom::{is_inside_any, Point};
use crate::mask::Mask;
use crate::output::{write_fits_events, EventOut};
use crate::proj_mode::ProjMode;
use crate::tables::{AttitudeTable, DetMap, EventTable};
use crate::worker::run_pipeline;

use super::LoadedData;

struct WorkItem {
    src_ra: f64,
    src_dec: f64,
    start: usize,
}

struct Acc {
    out: Vec<EventOut>,
    att: AttitudeTable,
    detmap: DetMap,
    coordconv: CoordConv,
}

pub fn run(config: &Config, data: LoadedData) -> Result<(), CoreError> {
    let proj_mode: Arc<dyn ProjMode> = Arc::from(config.proj_mode.build());
    let instpar = data.instpar;
    let events = Arc::new(data.events);
    let mask = Arc::new(data.mask);

    info!("reprojecting {} events for {} sources", events.len(), config.sources.len());

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

    let x_ref = instpar.x_ref;
    let y_ref = instpar.y_ref;
    let x_platescale = instpar.x_platescale;
    let y_platescale = instpar.y_platescale;

    let att_proto = data.att;
    let detmap_proto = data.detmap;

    let mask_for_process = Arc::clone(&mask);
    let events_for_process = Arc::clone(&events);
    let proj_mode_for_process = Arc::clone(&proj_mode);

    let total = run_pipeline(
        items,
        config.threads,
        move || Acc {
            out: Vec::new(),
            att: att_proto.clone(),
            detmap: detmap_proto.clone(),
            coordconv: CoordConv::new(x_platescale, y_platescale, x_ref, y_ref),
        },
        move |item, acc: &mut Acc| {
            process_chunk(&item, &events_for_process, &mask_for_process, proj_mode_for_process.as_ref(), x_ref, y_ref, acc)
        },
        |total, mut local| total.out.append(&mut local.out),
    )
    .map_err(CoreError::Worker)?;

    write_fits_events(&config.out_fn, &total.out)?;
    Ok(())
}

fn process_chunk(
    item: &WorkItem,
    events: &EventTable,
    mask: &Mask,
    proj_mode: &dyn ProjMode,
    x_ref: f64,
    y_ref: f64,
    acc: &mut Acc,
) -> Result<(), String> {
    let end = (item.start + EVENT_CHUNK_SIZE).min(events.len());
    for i in item.start..end {
        let evtpt = Point::new(events.ccdx[i], events.ccdy[i]);

        let (att_ra, att_dec, att_roll) = acc.att.interpolate(events.time[i]).map_err(|e| e.to_string())?;
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

        acc.out.push(EventOut {
            dx: relpt.x,
            dy: relpt.y,
            pi: events.pi[i],
        });
    }
    Ok(())
}
