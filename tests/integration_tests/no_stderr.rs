// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, hera_parameters, skysim_config, TSYS_SWEEP};

#[test]
fn test_validate_no_stderr() {
    let cmd = skysim_config()
        .args(["validate", &hera_parameters().display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "validate failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_sweep_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    #[rustfmt::skip]
    let cmd = skysim_config()
        .args([
            "sweep",
            &hera_parameters().display().to_string(),
            TSYS_SWEEP,
            "--output-dir", &tmp_dir.path().display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "sweep failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
