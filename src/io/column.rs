// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A narrow seam between the table constructors (`tables::*`) and the
//! concrete FITS backend, so the former can be unit-tested against an
//! in-memory fake instead of real FITS fixtures.

use fitsio::hdu::FitsHdu;
use fitsio::FitsFile;

use super::error::IoError;

/// Something that can hand back whole typed columns by name, keyed to one
/// already-open HDU. The `fitsio`-backed implementation is [`FitsColumnReader`];
/// tests use [`FakeColumnReader`].
pub trait ColumnReader {
    fn read_f64(&mut self, hdu: &str, column: &str) -> Result<Vec<f64>, IoError>;
    fn read_f32(&mut self, hdu: &str, column: &str) -> Result<Vec<f32>, IoError>;
    fn read_i32(&mut self, hdu: &str, column: &str) -> Result<Vec<i32>, IoError>;
    fn read_i16(&mut self, hdu: &str, column: &str) -> Result<Vec<i16>, IoError>;
    fn num_rows(&mut self, hdu: &str) -> Result<usize, IoError>;
}

/// Reads columns straight out of an open FITS file via `fitsio`.
pub struct FitsColumnReader {
    file: FitsFile,
    path: String,
}

impl FitsColumnReader {
    pub fn open(path: &str) -> Result<Self, IoError> {
        let file = FitsFile::open(path).map_err(|source| IoError::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    fn hdu(&mut self, hdu: &str) -> Result<FitsHdu, IoError> {
        self.file.hdu(hdu).map_err(|source| IoError::Hdu {
            path: self.path.clone(),
            hdu: hdu.to_string(),
            source,
        })
    }
}

impl ColumnReader for FitsColumnReader {
    fn read_f64(&mut self, hdu: &str, column: &str) -> Result<Vec<f64>, IoError> {
        let h = self.hdu(hdu)?;
        h.read_col(&mut self.file, column).map_err(|source| IoError::Column {
            hdu: hdu.to_string(),
            column: column.to_string(),
            source,
        })
    }

    fn read_f32(&mut self, hdu: &str, column: &str) -> Result<Vec<f32>, IoError> {
        let h = self.hdu(hdu)?;
        h.read_col(&mut self.file, column).map_err(|source| IoError::Column {
            hdu: hdu.to_string(),
            column: column.to_string(),
            source,
        })
    }

    fn read_i32(&mut self, hdu: &str, column: &str) -> Result<Vec<i32>, IoError> {
        let h = self.hdu(hdu)?;
        h.read_col(&mut self.file, column).map_err(|source| IoError::Column {
            hdu: hdu.to_string(),
            column: column.to_string(),
            source,
        })
    }

    fn read_i16(&mut self, hdu: &str, column: &str) -> Result<Vec<i16>, IoError> {
        let h = self.hdu(hdu)?;
        h.read_col(&mut self.file, column).map_err(|source| IoError::Column {
            hdu: hdu.to_string(),
            column: column.to_string(),
            source,
        })
    }

    fn num_rows(&mut self, hdu: &str) -> Result<usize, IoError> {
        let h = self.hdu(hdu)?;
        match &h.info {
            fitsio::hdu::HduInfo::TableInfo { num_rows, .. } => Ok(*num_rows),
            _ => Ok(0),
        }
    }
}

/// An in-memory stand-in for tests: a named set of per-HDU named columns.
#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct FakeColumnReader {
        pub f64_cols: HashMap<(String, String), Vec<f64>>,
        pub f32_cols: HashMap<(String, String), Vec<f32>>,
        pub i32_cols: HashMap<(String, String), Vec<i32>>,
        pub i16_cols: HashMap<(String, String), Vec<i16>>,
        pub rows: HashMap<String, usize>,
    }

    impl ColumnReader for FakeColumnReader {
        fn read_f64(&mut self, hdu: &str, column: &str) -> Result<Vec<f64>, IoError> {
            self.f64_cols
                .get(&(hdu.to_string(), column.to_string()))
                .cloned()
                .ok_or_else(|| IoError::Column {
                    hdu: hdu.to_string(),
                    column: column.to_string(),
                    source: fitsio::errors::Error::Message("no such fake column".to_string()),
                })
        }

        fn read_f32(&mut self, hdu: &str, column: &str) -> Result<Vec<f32>, IoError> {
            self.f32_cols
                .get(&(hdu.to_string(), column.to_string()))
                .cloned()
                .ok_or_else(|| IoError::Column {
                    hdu: hdu.to_string(),
                    column: column.to_string(),
                    source: fitsio::errors::Error::Message("no such fake column".to_string()),
                })
        }

        fn read_i32(&mut self, hdu: &str, column: &str) -> Result<Vec<i32>, IoError> {
            self.i32_cols
                .get(&(hdu.to_string(), column.to_string()))
                .cloned()
                .ok_or_else(|| IoError::Column {
                    hdu: hdu.to_string(),
                    column: column.to_string(),
                    source: fitsio::errors::Error::Message("no such fake column".to_string()),
                })
        }

        fn read_i16(&mut self, hdu: &str, column: &str) -> Result<Vec<i16>, IoError> {
            self.i16_cols
                .get(&(hdu.to_string(), column.to_string()))
                .cloned()
                .ok_or_else(|| IoError::Column {
                    hdu: hdu.to_string(),
                    column: column.to_string(),
                    source: fitsio::errors::Error::Message("no such fake column".to_string()),
                })
        }

        fn num_rows(&mut self, hdu: &str) -> Result<usize, IoError> {
            Ok(*self.rows.get(hdu).unwrap_or(&0))
        }
    }
}
