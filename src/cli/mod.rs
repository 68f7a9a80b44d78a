// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line parsing and argument-file merging.

pub mod args;

pub use args::{Cli, Command, SubArgs};
