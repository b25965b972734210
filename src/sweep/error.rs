// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading sweep tables.

use std::path::PathBuf;

use thiserror::Error;

use crate::load::ParseError;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("{table}:{line}: row id '{id}' is not a number")]
    NonNumericId {
        table: String,
        line: usize,
        id: String,
    },

    #[error("{table}:{line}: row id '{id}' was already used on line {first_line}")]
    DuplicateId {
        table: String,
        line: usize,
        id: String,
        first_line: usize,
    },

    #[error("{table}:{line}: couldn't understand the region clause '{clause}': {reason}")]
    BadRegionClause {
        table: String,
        line: usize,
        clause: String,
        reason: String,
    },

    #[error("{table}: {message}")]
    BadTable { table: String, message: String },

    #[error("{0} has no rows")]
    Empty(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Couldn't read sweep table '{path}': {err}")]
    IO {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}
