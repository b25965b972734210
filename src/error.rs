// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for everything that can go wrong between reading a parameter
//! file and producing a [`crate::RunConfig`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunConfigError {
    #[error("{0}")]
    Load(#[from] crate::load::LoadError),

    #[error("{0}")]
    Validation(#[from] crate::validate::SchemaValidationError),

    #[error("{0}")]
    Derivation(#[from] crate::resolve::InconsistentDerivationError),

    #[error("{0}")]
    Sweep(#[from] crate::sweep::SweepError),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

impl From<crate::load::ParseError> for RunConfigError {
    fn from(e: crate::load::ParseError) -> Self {
        Self::Load(e.into())
    }
}
