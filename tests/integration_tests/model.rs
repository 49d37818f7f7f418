// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, stacker, write_catalog};

#[test]
fn model_with_a_gaussian_beam() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("model.json");

    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "model",
            "--catalog", &format!("{}", catalog.display()),
            "--phase-centre", "0", "-27",
            "--beam-type", "gaussian",
            "--beam-fwhm", "20",
            "-o", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "model failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Components per pointing: [3]"), "{stdout}");

    let model: serde_json::Value = serde_json::from_reader(File::open(&output).unwrap()).unwrap();
    assert_abs_diff_eq!(model["total_flux"].as_f64().unwrap(), 13.5);
    let points = model["points"][0].as_array().unwrap();
    assert_eq!(points.len(), 3);
    // The first component sits on the phase centre.
    assert_abs_diff_eq!(points[0]["dx"].as_f64().unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(points[0]["omega_x"].as_f64().unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(points[0]["omega_size"].as_f64().unwrap(), 0.0);
}

#[test]
fn model_without_a_beam_keeps_everything() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "model",
            "-c", &format!("{}", catalog.display()),
            "--phase-centre", "0", "-27",
            "--phase-centre", "180", "60",
            "--mode", "add",
        ])
        .ok();
    assert!(cmd.is_ok(), "model failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Components per pointing: [4, 4]"), "{stdout}");
    assert!(stdout.contains("Mode: add"), "{stdout}");
}

#[test]
fn model_args_can_come_from_a_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());
    let output = tmp_dir.path().join("model.yaml");
    let args_file = tmp_dir.path().join("args.toml");

    // Save the arguments with a dry run, then use them for a real run.
    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "model",
            "--catalog", &format!("{}", catalog.display()),
            "--phase-centre", "0", "-27",
            "-o", &format!("{}", output.display()),
            "--save-toml", &format!("{}", args_file.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "model failed: {}", cmd.err().unwrap());
    assert!(args_file.exists());
    assert!(!output.exists());

    let cmd = stacker()
        .args(["model", &format!("{}", args_file.display())])
        .ok();
    assert!(cmd.is_ok(), "model failed: {}", cmd.err().unwrap());
    assert!(output.exists());
}

#[test]
fn model_errors_are_displayed() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = write_catalog(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = stacker()
        .args([
            "model",
            "--catalog", &format!("{}", catalog.display()),
            "--phase-centre", "0", "-27",
            "--beam-type", "gaussian",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("full width at half maximum"), "{stderr}");

    let cmd = stacker()
        .args(["model", "--catalog", &format!("{}", catalog.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No phase centres"), "{stderr}");
}
