// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indoc::indoc;
use tempfile::TempDir;

use skysim_config::{RawDocument, RunConfig, SweepTable};

use crate::{get_cmd_output, hera_parameters, skysim_config, write_file_in_dir, TSYS_SWEEP};

#[test]
fn test_tsys_sweep() {
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
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Tsys 89.0: ok"), "{stdout}");

    for id in ["85.0", "86.0", "87.0", "88.0", "89.0", "90.0"] {
        let path = tmp_dir
            .path()
            .join(format!("figparameters_HERA_Tsys{id}.yaml"));
        assert!(path.exists(), "{} wasn't written", path.display());
    }
    let row_89 = RunConfig::from_file(tmp_dir.path().join("figparameters_HERA_Tsys89.0.yaml")).unwrap();
    assert_eq!(row_89.regions().len(), 2);
    let row_90 = RunConfig::from_file(tmp_dir.path().join("figparameters_HERA_Tsys90.0.yaml")).unwrap();
    assert_eq!(row_90.regions().len(), 1);
}

#[test]
fn test_failing_rows() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file_in_dir(
        "sweep.yaml",
        tmp_dir.path(),
        indoc! {"
            label: Tsys
            rows:
              - id: 85.0
                overrides:
                  telescope: {Tsys: 85.0}
              - id: -1
                overrides:
                  telescope: {Tsys: -1.0}
        "},
    );

    let cmd = skysim_config()
        .args([
            "sweep",
            &hera_parameters().display().to_string(),
            &table.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("1 of 2 sweep rows failed"), "{stderr}");
    assert!(stdout.contains("Tsys -1: failed"), "{stdout}");
    assert!(stdout.contains("telescope.Tsys: must be > 0"), "{stdout}");

    // The library gives the failure of each row.
    let base = RawDocument::from_file(hera_parameters()).unwrap();
    let table = SweepTable::from_file(&table).unwrap();
    let outcomes = skysim_config::resolve_sweep(&base, &table);
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_err());
}
