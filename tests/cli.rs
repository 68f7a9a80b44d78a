// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end smoke tests that exercise the CLI binary itself, rather than
//! library internals: argument parsing, args-file merging and the
//! validation errors a misconfigured run should surface before any FITS
//! file is opened.

use std::io::Write;

use assert_cmd::Command;
use indoc::indoc;
use predicates::str::contains;
use tempfile::NamedTempFile;

fn bin() -> Command {
    Command::cargo_bin("ero-recon").unwrap()
}

#[test]
fn missing_evt_is_reported_before_any_file_is_opened() {
    bin()
        .args(["image", "--sources", "10.0,-20.0", "--out", "out.fits"])
        .assert()
        .failure()
        .stderr(contains("--evt"));
}

#[test]
fn missing_sources_is_reported() {
    bin()
        .args(["image", "--evt", "events.fits", "--out", "out.fits"])
        .assert()
        .failure()
        .stderr(contains("--sources"));
}

#[test]
fn unknown_projection_mode_is_rejected_before_any_file_is_opened() {
    bin()
        .args([
            "image",
            "--evt",
            "events.fits",
            "--sources",
            "10.0,-20.0",
            "--out",
            "out.fits",
            "--proj-mode",
            "not-a-real-mode",
        ])
        .assert()
        .failure()
        .stderr(contains("not-a-real-mode"));
}

#[test]
fn exposure_mode_without_positive_delta_t_is_rejected() {
    bin()
        .args([
            "expos",
            "--evt",
            "events.fits",
            "--sources",
            "10.0,-20.0",
            "--out",
            "out.fits",
            "--delta-t",
            "0",
        ])
        .assert()
        .failure()
        .stderr(contains("--delta-t"));
}

#[test]
fn cli_flags_win_over_args_file_flags() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        indoc! {r#"
            evt = "from_file.fits"
            out = "from_file_out.fits"
            sources = ["1.0,2.0"]
            xw = 128
            yw = 128
        "#}
    )
    .unwrap();

    // evt/sources/yw come from the file; out is overridden on the command
    // line. Parsing and validation both succeed, so the run gets as far as
    // resolving CALDB instrument parameters and fails there instead, with
    // no $CALDB set in the test environment - proof that the file's
    // "--sources"/"--evt" were accepted rather than rejected at parse time.
    bin()
        .env_remove("CALDB")
        .args([
            "image",
            "--args-file",
            file.path().to_str().unwrap(),
            "--out",
            "from_cli_out.fits",
        ])
        .assert()
        .failure()
        .stderr(contains("CALDB"));
}
