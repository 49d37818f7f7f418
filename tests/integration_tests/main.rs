// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod model;
mod no_stderr;
mod stream;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

fn stacker() -> Command {
    Command::cargo_bin("stacker").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// A small catalog with two sources near (RA 0°, Dec -27°) and one far away.
fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.yaml");
    let mut f = File::create(&path).unwrap();
    f.write_all(
        indoc! {"
            cluster_a:
            - ra: 0.0
              dec: -27.0
              flux: 1.0
            - ra: 0.2
              dec: -27.1
              flux: 0.5
              shape: disk
              size: 30.0
            cluster_b:
            - ra: 359.9
              dec: -26.9
              flux: 2.0
              shape: gaussian
              size: 10.0
            far_away:
            - ra: 180.0
              dec: 60.0
              flux: 10.0
        "}
        .as_bytes(),
    )
    .unwrap();
    path
}
