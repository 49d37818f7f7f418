// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, stacker};

#[test]
fn stream_dry_run() {
    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "stream",
            "--data", "input.ms",
            "--output-data", "output.ms",
            "--data-column", "corrected_data",
            "--align-pointings",
            "--chunk-size", "64",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "stream failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Column: CORRECTED_DATA"), "{stdout}");
    assert!(stdout.contains("Chunk capacity: 64 rows"), "{stdout}");
}

#[test]
fn stream_errors_are_displayed() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let missing = tmp_dir.path().join("missing.ms");

    let cmd = stacker()
        .args(["stream", "--data", &format!("{}", missing.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");

    let cmd = stacker()
        .args(["stream", "--data", "input.ms", "--data-column", "flag"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unrecognised data column 'flag'"), "{stderr}");
}
