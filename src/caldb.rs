// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CALDB calibration-file lookup and the instrument geometry parameters
//! read from it.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::io::{ColumnReader, FitsColumnReader, IoError};

#[derive(Debug, Error)]
pub enum CaldbError {
    #[error("$CALDB is not set")]
    EnvNotSet,
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("no calibration file found for component '{component}' in '{subdir}'")]
    NotFound { subdir: String, component: String },
}

/// Find the path of the current (quality 0) calibration file for
/// `component` (e.g. `"GEOM"`, `"DETMAP"`) in CALDB subdirectory `subdir`
/// (e.g. `"tm1"`), by scanning that subdirectory's `CIF` index.
pub fn lookup_cal(subdir: &str, component: &str) -> Result<PathBuf, CaldbError> {
    let caldb = env::var("CALDB").map_err(|_| CaldbError::EnvNotSet)?;
    let index_path = format!("{caldb}/data/erosita/{subdir}/caldb.indx");

    // CAL_CNAM/CAL_FILE are string columns, read directly via fitsio rather
    // than through the numeric-only ColumnReader trait.
    find_current_file(&caldb, subdir, component, &index_path)
}

fn find_current_file(caldb: &str, subdir: &str, component: &str, index_path: &str) -> Result<PathBuf, CaldbError> {
    use fitsio::FitsFile;

    let mut file = FitsFile::open(index_path).map_err(|source| IoError::Open {
        path: index_path.to_string(),
        source,
    })?;
    let hdu = file.hdu("CIF").map_err(|source| IoError::Hdu {
        path: index_path.to_string(),
        hdu: "CIF".to_string(),
        source,
    })?;

    let cnam: Vec<String> = hdu.read_col(&mut file, "CAL_CNAM").map_err(|source| IoError::Column {
        hdu: "CIF".to_string(),
        column: "CAL_CNAM".to_string(),
        source,
    })?;
    let qual: Vec<i32> = hdu.read_col(&mut file, "CAL_QUAL").map_err(|source| IoError::Column {
        hdu: "CIF".to_string(),
        column: "CAL_QUAL".to_string(),
        source,
    })?;
    let cal_file: Vec<String> = hdu.read_col(&mut file, "CAL_FILE").map_err(|source| IoError::Column {
        hdu: "CIF".to_string(),
        column: "CAL_FILE".to_string(),
        source,
    })?;

    for i in 0..cnam.len() {
        if cnam[i].trim() == component && qual[i] == 0 {
            return Ok(PathBuf::from(format!("{caldb}/data/erosita/{subdir}/bcf/{}", cal_file[i].trim())));
        }
    }

    Err(CaldbError::NotFound {
        subdir: subdir.to_string(),
        component: component.to_string(),
    })
}

/// Instrument geometry parameters for one telescope module, read from the
/// CALDB `GEOM` file's `INSTPAR` HDU.
#[derive(Clone, Copy, Debug)]
pub struct InstPar {
    pub x_optax: f64,
    pub y_optax: f64,
    pub x_platescale: f64,
    pub y_platescale: f64,
    pub x_ccdpix: f64,
    pub y_ccdpix: f64,
    pub x_ref: f64,
    pub y_ref: f64,
}

impl InstPar {
    pub fn load(tm: u8) -> Result<Self, CaldbError> {
        let path = lookup_cal(&format!("tm{tm}"), "GEOM")?;
        let mut reader = FitsColumnReader::open(path.to_str().unwrap_or_default())?;
        Self::from_reader(&mut reader)
    }

    pub fn from_reader(reader: &mut dyn ColumnReader) -> Result<Self, CaldbError> {
        let hdu = "INSTPAR";
        let row0 = |v: Vec<f64>| v.first().copied().unwrap_or(0.0);
        Ok(Self {
            x_optax: row0(reader.read_f64(hdu, "X_OPTAX")?),
            y_optax: row0(reader.read_f64(hdu, "Y_OPTAX")?),
            x_platescale: row0(reader.read_f64(hdu, "X_PLATESCALE")?),
            y_platescale: row0(reader.read_f64(hdu, "Y_PLATESCALE")?),
            x_ccdpix: row0(reader.read_f64(hdu, "X_CCDPIX")?),
            y_ccdpix: row0(reader.read_f64(hdu, "Y_CCDPIX")?),
            x_ref: row0(reader.read_f64(hdu, "X_REF")?),
            y_ref: row0(reader.read_f64(hdu, "Y_REF")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::column::fake::FakeColumnReader;

    #[test]
    fn instpar_reads_first_row_of_each_column() {
        let mut fake = FakeColumnReader::default();
        let hdu = "INSTPAR".to_string();
        for (name, v) in [
            ("X_OPTAX", 1.0),
            ("Y_OPTAX", 2.0),
            ("X_PLATESCALE", 9.6),
            ("Y_PLATESCALE", 9.6),
            ("X_CCDPIX", 384.0),
            ("Y_CCDPIX", 384.0),
            ("X_REF", 192.0),
            ("Y_REF", 192.0),
        ] {
            fake.f64_cols.insert((hdu.clone(), name.to_string()), vec![v]);
        }
        let par = InstPar::from_reader(&mut fake).unwrap();
        assert_eq!(par.x_platescale, 9.6);
        assert_eq!(par.x_ref, 192.0);
    }
}
