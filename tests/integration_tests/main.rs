// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod no_stderr;
mod resolve;
mod sweep;
mod validate;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

const HERA_PARAMETERS: &str = "tests/data/figparameters_HERA.yaml";
const TSYS_SWEEP: &str = "tests/data/Tsys_sweep.txt";

fn skysim_config() -> Command {
    Command::cargo_bin("skysim-config").unwrap()
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

/// Get the path to the HERA parameters, making sure they're there.
fn hera_parameters() -> PathBuf {
    let pb = PathBuf::from(HERA_PARAMETERS);
    assert!(
        pb.exists(),
        "Could not find {}, which is required for this test",
        pb.display()
    );
    pb
}

/// Write `contents` into a new file called `filename` in `dir`.
fn write_file_in_dir<T: AsRef<Path>, U: AsRef<Path>>(
    filename: T,
    dir: U,
    contents: &str,
) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    f.write_all(contents.as_bytes()).unwrap();
    path
}

/// The HERA parameters with some of their text replaced.
fn hera_parameters_replacing(from: &str, to: &str) -> String {
    let contents = std::fs::read_to_string(hera_parameters()).unwrap();
    assert!(contents.contains(from), "HERA parameters don't contain '{from}'");
    contents.replacen(from, to, 1)
}
