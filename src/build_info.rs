// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Build-time metadata (version, git commit, build timestamp), embedded by
//! `build.rs` via the `built` crate and surfaced through `--version`.

#![allow(dead_code, clippy::all)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// A one-line `--version` string: package version plus git commit hash
/// when available.
pub fn long_version() -> String {
    match built_info::GIT_COMMIT_HASH_SHORT {
        Some(hash) => format!("{} ({})", built_info::PKG_VERSION, hash),
        None => built_info::PKG_VERSION.to_string(),
    }
}
