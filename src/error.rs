// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single public error type. Every subsystem error folds into this
//! through a `From` impl; `main` only ever has to match on `CoreError`.

use thiserror::Error;

use crate::caldb::CaldbError;
use crate::io::IoError;
use crate::modes::error::ModesError;
use crate::tables::DomainError;
use crate::worker::WorkerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option: {0}")]
    Missing(&'static str),
    #[error("invalid value for {option}: {reason}")]
    Invalid { option: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Caldb(#[from] CaldbError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Modes(#[from] ModesError),

    #[error("{0}")]
    Other(String),
}
