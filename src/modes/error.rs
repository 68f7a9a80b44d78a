// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors specific to running an image/exposure/event driver, as opposed
/// to the lower-level table/coordinate/I/O errors they can also surface.
#[derive(Debug, Error)]
pub enum ModesError {
    #[error("good-time interval {index} has stop ({stop}) <= start ({start})")]
    InvalidGti { index: usize, start: f64, stop: f64 },

    #[error("no configured source falls within the active projection mode's valid region")]
    NoValidSources,
}
