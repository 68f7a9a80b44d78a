// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed dimensions and tuning constants for a single eROSITA-class CCD
//! module.

/// CCD width in raw pixels.
pub const CCD_XW: usize = 384;
/// CCD height in raw pixels.
pub const CCD_YW: usize = 384;

/// Number of bottom rows zeroed out when a "shadow mask" is requested
/// (the on-chip filter wheel housing shadows the lowest rows of the CCD).
pub const SHADOW_ROWS: usize = 15;

/// Event-index chunk size handed to each worker in image/event mode.
pub const EVENT_CHUNK_SIZE: usize = 400;
