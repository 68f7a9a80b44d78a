// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors raised while opening FITS files or reading typed columns out of
/// them. Kept distinct from [`crate::error::DomainError`] because these are
/// all about the *bytes on disk*, not what they mean astronomically.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to open FITS file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: fitsio::errors::Error,
    },

    #[error("failed to move to HDU '{hdu}' in '{path}': {source}")]
    Hdu {
        path: String,
        hdu: String,
        #[source]
        source: fitsio::errors::Error,
    },

    #[error("failed to read column '{column}' from HDU '{hdu}': {source}")]
    Column {
        hdu: String,
        column: String,
        #[source]
        source: fitsio::errors::Error,
    },

    #[error("column '{0}' has {1} rows, expected {2}")]
    ColumnLengthMismatch(String, usize, usize),

    #[error("image HDU '{0}' has shape {1:?}, expected {2:?}")]
    ImageShapeMismatch(String, Vec<usize>, Vec<usize>),
}
