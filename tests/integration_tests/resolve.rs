// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::TempDir;

use skysim_config::{params::AccumulationField, RunConfig, RunConfigError};

use crate::{
    get_cmd_output, hera_parameters, hera_parameters_replacing, skysim_config, write_file_in_dir,
};

#[test]
fn test_resolve_and_save() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let yaml = tmp_dir.path().join("resolved.yaml");
    let json = tmp_dir.path().join("resolved.json");

    #[rustfmt::skip]
    let cmd = skysim_config()
        .args([
            "resolve",
            &hera_parameters().display().to_string(),
            "--save-yaml", &yaml.display().to_string(),
            "--save-json", &json.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "resolve failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Telescope: hera"), "{stdout}");
    assert!(stdout.contains("t_obs = 86400 s"), "{stdout}");

    // The saved parameters resolve to the same thing as the originals.
    let original = RunConfig::from_file(hera_parameters()).unwrap();
    for saved in [yaml, json] {
        let resolved = RunConfig::from_file(&saved).unwrap();
        assert_eq!(resolved.to_document(), original.to_document());
        assert_eq!(resolved.observation(), original.observation());
        assert_eq!(resolved.provenance().source, saved.display().to_string());
    }
}

#[test]
fn test_resolve_inconsistent_accumulations() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let contents = hera_parameters_replacing(
        "    t_obs: null\n    n_acc: 80\n    t_acc: 1080.0",
        "    t_obs: '1h'\n    n_acc: null\n    t_acc: 7.0",
    );
    let params = write_file_in_dir("params.yaml", tmp_dir.path(), &contents);

    match RunConfig::from_file(&params) {
        Err(RunConfigError::Derivation(e)) => {
            assert_abs_diff_eq!(e.t_obs, 3600.0);
            assert_abs_diff_eq!(e.t_acc, 7.0);
        }
        r => panic!("unexpected result {r:?}"),
    }

    let cmd = skysim_config()
        .args(["resolve", &params.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("is not a whole number of accumulations"), "{stderr}");
}

#[test]
fn test_template_preload() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let contents = std::fs::read_to_string(hera_parameters()).unwrap();
    write_file_in_dir("template.yaml", tmp_dir.path(), &contents);
    let params = write_file_in_dir(
        "params.yaml",
        tmp_dir.path(),
        indoc! {"
            preload:
                template: 'template.yaml'
            telescope:
                Tsys: 120.0
            obsparm:
                t_obs: '24h'
                n_acc: null
        "},
    );

    let config = RunConfig::from_file(&params).unwrap();
    assert_abs_diff_eq!(config.telescope().tsys, 120.0);
    let acc = config.observation().accumulation;
    assert_eq!(acc.n_acc, 80);
    assert_eq!(acc.derived, AccumulationField::NAcc);
    // Everything else comes from the template.
    assert_abs_diff_eq!(config.telescope().latitude, -30.7224);
}

#[test]
fn test_nested_template() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    write_file_in_dir("a.yaml", tmp_dir.path(), "preload: {template: 'b.yaml'}");
    let params = write_file_in_dir("params.yaml", tmp_dir.path(), "preload: {template: 'a.yaml'}");

    let result = RunConfig::from_file(&params);
    assert!(
        matches!(result, Err(RunConfigError::Load(_))),
        "unexpected result {result:?}"
    );
}
