// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time-keyed caches and row tables read out of the event file: attitude,
//! dead-time correction, good-time intervals, the bad-pixel/det-map cache,
//! and the event list itself.

pub mod attitude;
pub mod cursor;
pub mod deadcor;
pub mod detmap;
pub mod events;
pub mod gti;

pub use attitude::AttitudeTable;
pub use cursor::DomainError;
pub use deadcor::DeadCorTable;
pub use detmap::DetMap;
pub use events::EventTable;
pub use gti::GtiTable;
