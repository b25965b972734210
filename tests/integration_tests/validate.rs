// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indoc::indoc;
use tempfile::TempDir;

use crate::{
    get_cmd_output, hera_parameters, hera_parameters_replacing, skysim_config, write_file_in_dir,
};

#[test]
fn test_valid_parameters() {
    let cmd = skysim_config()
        .args(["validate", &hera_parameters().display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "validate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("figparameters_HERA.yaml is valid"), "{stdout}");
}

#[test]
fn test_array_file_and_layout() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let contents = hera_parameters_replacing("    file: null\n    layout:", "    file: 'layouts/hera_19.txt'\n    layout:");
    let params = write_file_in_dir("params.yaml", tmp_dir.path(), &contents);

    let cmd = skysim_config()
        .args(["validate", &params.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("array: exactly one of array.file, array.layout must be set (observed: {file: 'layouts/hera_19.txt', layout: 'HERA-19'})"),
        "{stderr}"
    );
}

#[test]
fn test_all_violations_are_reported() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let contents = hera_parameters_replacing("    t_obs: null", "    t_obs: '24h'")
        .replacen("    phased_array: false", "    phased_array: true", 1)
        .replacen("    Tsys: 85.0", "    Tsys: 'hot'", 1);
    let params = write_file_in_dir("params.yaml", tmp_dir.path(), &contents);

    let cmd = skysim_config()
        .args(["validate", &params.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("violations:"), "{stderr}");
    assert!(stderr.contains("telescope.Tsys: expected a number"), "{stderr}");
    assert!(
        stderr.contains("obsparm: exactly two of obsparm.t_obs, obsparm.n_acc, obsparm.t_acc must be set"),
        "{stderr}"
    );
    assert!(
        stderr.contains("phasedarray.nrand: required because antenna.phased_array is true (observed: null)"),
        "{stderr}"
    );
}

#[test]
fn test_minimal_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let params = write_file_in_dir(
        "params.toml",
        tmp_dir.path(),
        indoc! {r#"
            [telescope]
            id = "hera"
            latitude = -30.7224
            longitude = 21.4278
            Tsys = 85.0

            [array]
            layout = "HERA-19"

            [obsparm]
            freq = "150 MHz"
            freq_resolution = "97.65625 kHz"
            nchan = 256
            n_acc = 80
            t_acc = "18min"

            [pointing.drift_init]
            alt = 90.0
            az = 270.0
            lst = 0.0

            [fgparm]
            model = "usm"
            nside = 64
        "#},
    );

    let cmd = skysim_config()
        .args(["validate", &params.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "validate failed: {}", cmd.err().unwrap());
}

#[test]
fn test_bad_syntax() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let params = write_file_in_dir("params.json", tmp_dir.path(), "{\"telescope\": {\n\"id\": }");

    let cmd = skysim_config()
        .args(["validate", &params.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("params.json:2:"), "{stderr}");
}

#[test]
fn test_unknown_extension() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let params = write_file_in_dir("params.ini", tmp_dir.path(), "");

    let cmd = skysim_config()
        .args(["validate", &params.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Valid extensions are: yaml, json, toml"), "{stderr}");
}
