// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use super::DOCUMENT_FORMATS_COMMA_SEPARATED;

/// The document's syntax is malformed. Nothing after loading is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The name of the document (usually its path).
    pub document: String,

    /// 1-based line number of the problem, if the parser reported one.
    pub line: Option<usize>,

    /// 1-based column of the problem, if the parser reported one.
    pub column: Option<usize>,

    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{}:{line}:{column}: {}", self.document, self.message)
            }
            (Some(line), None) => write!(f, "{}:{line}: {}", self.document, self.message),
            _ => write!(f, "{}: {}", self.document, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Parameter file '{path}' doesn't have a recognised file extension! Valid extensions are: {}", *DOCUMENT_FORMATS_COMMA_SEPARATED)]
    UnknownFormat { path: PathBuf },

    #[error("{document}: preload.template must be a path or null, but got {observed}")]
    BadPreload { document: String, observed: String },

    #[error("Template '{0}' itself preloads a template; only one level of preloading is supported")]
    NestedTemplate(PathBuf),

    #[error("Couldn't read '{path}': {err}")]
    IO {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}
