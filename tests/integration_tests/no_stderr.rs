// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, stacker, write_catalog};

#[test]
fn test_model_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("model.yaml");

    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "model",
            "--catalog", &format!("{}", catalog.display()),
            "--phase-centre", "0", "-27",
            "--beam-type", "gaussian",
            "--beam-fwhm", "10",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "model failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
