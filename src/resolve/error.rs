// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// The number of accumulations derived from `t_obs / t_acc` isn't a positive
/// whole number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{document}: obsparm.t_obs ({t_obs} s) is not a whole number of accumulations of obsparm.t_acc ({t_acc} s); t_obs / t_acc = {n_acc_exact}")]
pub struct InconsistentDerivationError {
    pub document: String,

    /// [seconds]
    pub t_obs: f64,

    /// [seconds]
    pub t_acc: f64,

    /// The unrounded `t_obs / t_acc`.
    pub n_acc_exact: f64,
}
