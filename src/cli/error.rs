// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::RunConfigError;

/// Errors from running a `skysim-config` subcommand.
#[derive(Error, Debug)]
pub enum SkysimConfigError {
    #[error("{0}")]
    RunConfig(#[from] RunConfigError),

    #[error("{num_failed} of {num_rows} sweep rows failed")]
    SweepRowsFailed { num_failed: usize, num_rows: usize },

    #[error("Couldn't write '{path}': {err}")]
    Write {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

macro_rules! via_run_config_error {
    ($($t:ty),*) => {$(
        impl From<$t> for SkysimConfigError {
            fn from(e: $t) -> Self {
                Self::RunConfig(e.into())
            }
        }
    )*};
}

via_run_config_error!(
    crate::LoadError,
    crate::SchemaValidationError,
    crate::InconsistentDerivationError,
    crate::SweepError
);
