// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Loading of hierarchical parameter documents.
//!
//! Documents are kept as an ordered [`serde_yaml::Value`] tree so that the
//! validator can tell an explicit `null` apart from a key that was never
//! written, and so that list order (which ties parallel lists together) is
//! never disturbed.

mod error;
mod merge;

pub use error::{LoadError, ParseError};
pub use merge::merge_mappings;

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

lazy_static::lazy_static! {
    pub static ref DOCUMENT_FORMATS_COMMA_SEPARATED: String = DocumentFormat::iter().join(", ");
}

/// The section a document may use to pull in a template document.
const PRELOAD_SECTION: &str = "preload";

/// Supported parameter-file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum DocumentFormat {
    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,

    #[strum(serialize = "json")]
    Json,

    /// TOML has no null; keys can only be absent.
    #[strum(serialize = "toml")]
    Toml,
}

impl DocumentFormat {
    /// Work out the format of a file from its extension.
    pub fn from_path(path: &Path) -> Option<DocumentFormat> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| DocumentFormat::from_str(&e).ok())
    }
}

/// Identifies one row of a parameter sweep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RowTag {
    /// The label of the sweep table, e.g. "Tsys".
    pub label: String,

    /// The row identifier exactly as written in the table, e.g. "85.0".
    pub id: String,
}

impl fmt::Display for RowTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.id)
    }
}

/// Where a document came from. This is carried all the way through to the
/// resolved [`crate::RunConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// The file the document was read from, or a caller-supplied name.
    pub source: String,

    /// The sweep row this document was derived from, if any.
    pub row: Option<RowTag>,

    /// The dotted paths of every field overridden relative to the base
    /// document, in the order the overrides were applied.
    pub overridden: Vec<String>,
}

impl Provenance {
    pub fn new<S: Into<String>>(source: S) -> Provenance {
        Provenance {
            source: source.into(),
            row: None,
            overridden: vec![],
        }
    }
}

/// The result of looking up a field in a [`RawDocument`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The key was never written.
    Absent,

    /// The key was explicitly set to null.
    Null,

    Present(&'a Value),
}

impl<'a> Lookup<'a> {
    pub fn from_option(v: Option<&'a Value>) -> Lookup<'a> {
        match v {
            None => Lookup::Absent,
            Some(Value::Null) => Lookup::Null,
            Some(v) => Lookup::Present(v),
        }
    }

    /// Is this field set to something other than null?
    pub fn is_set(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Lookup::Present(v) => Some(v),
            Lookup::Absent | Lookup::Null => None,
        }
    }
}

/// A parsed, but not yet validated, parameter document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    root: Mapping,
    provenance: Provenance,
}

impl RawDocument {
    /// Read a document from a file. The format is determined by the file
    /// extension. If the document preloads a template, the template is read
    /// (relative to the document's directory) and the document is merged over
    /// it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RawDocument, LoadError> {
        let path = path.as_ref();
        debug!("Attempting to parse parameter file {}", path.display());
        let root = read_mapping(path)?;
        let root = apply_preload(root, path.parent(), &path.display().to_string())?;
        Ok(RawDocument {
            root,
            provenance: Provenance::new(path.display().to_string()),
        })
    }

    /// Parse a document from a string. Any template is resolved relative to
    /// the current directory.
    pub fn from_contents(
        contents: &str,
        format: DocumentFormat,
        source: &str,
    ) -> Result<RawDocument, LoadError> {
        let value = parse_contents(contents, format, source)?;
        let root = into_mapping(value, source)?;
        let root = apply_preload(root, None, source)?;
        Ok(RawDocument {
            root,
            provenance: Provenance::new(source),
        })
    }

    /// Wrap an already-parsed value. Template preloading is not performed.
    pub fn from_value(value: Value, provenance: Provenance) -> Result<RawDocument, LoadError> {
        let root = into_mapping(value, &provenance.source)?;
        Ok(RawDocument { root, provenance })
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn to_value(&self) -> Value {
        Value::Mapping(self.root.clone())
    }

    /// Look up a field by its path of keys, e.g. `["obsparm", "t_acc"]`.
    pub fn lookup(&self, path: &[&str]) -> Lookup<'_> {
        let (first, rest) = match path.split_first() {
            Some(p) => p,
            None => return Lookup::Absent,
        };
        let mut current = match self.root.get(*first) {
            Some(v) => v,
            None => return Lookup::Absent,
        };
        for key in rest {
            current = match current {
                Value::Mapping(m) => match m.get(*key) {
                    Some(v) => v,
                    None => return Lookup::Absent,
                },
                // A key can't be "inside" a null or scalar.
                _ => return Lookup::Absent,
            };
        }
        Lookup::from_option(Some(current))
    }
}

/// Render a mapping key as a string. YAML allows numbers and booleans as keys
/// (e.g. plot identifiers written as `2:`), so these are rendered too.
pub fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A one-line rendering of a value, used when reporting what was observed in
/// a document.
pub fn compact(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Sequence(seq) => format!("[{}]", seq.iter().map(compact).join(", ")),
        Value::Mapping(m) => format!(
            "{{{}}}",
            m.iter()
                .map(|(k, v)| format!(
                    "{}: {}",
                    key_to_string(k).unwrap_or_else(|| compact(k)),
                    compact(v)
                ))
                .join(", ")
        ),
        Value::Tagged(t) => format!("{} {}", t.tag, compact(&t.value)),
    }
}

fn read_mapping(path: &Path) -> Result<Mapping, LoadError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| LoadError::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    let contents = std::fs::read_to_string(path).map_err(|err| LoadError::IO {
        path: path.to_path_buf(),
        err,
    })?;
    let source = path.display().to_string();
    let value = parse_contents(&contents, format, &source)?;
    Ok(into_mapping(value, &source)?)
}

pub(crate) fn parse_contents(
    contents: &str,
    format: DocumentFormat,
    source: &str,
) -> Result<Value, ParseError> {
    let value = match format {
        DocumentFormat::Yaml => {
            debug!("Parsing yaml document...");
            serde_yaml::from_str::<Value>(contents).map_err(|err| {
                let location = err.location();
                ParseError {
                    document: source.to_string(),
                    line: location.as_ref().map(|l| l.line()),
                    column: location.as_ref().map(|l| l.column()),
                    message: err.to_string(),
                }
            })?
        }

        DocumentFormat::Json => {
            debug!("Parsing json document...");
            serde_json::from_str::<Value>(contents).map_err(|err| ParseError {
                document: source.to_string(),
                line: (err.line() > 0).then_some(err.line()),
                column: (err.column() > 0).then_some(err.column()),
                message: err.to_string(),
            })?
        }

        DocumentFormat::Toml => {
            debug!("Parsing toml document...");
            let table = toml::from_str::<toml::Value>(contents).map_err(|err| {
                let (line, column) = match err.span() {
                    Some(span) => {
                        let (line, column) = line_and_column(contents, span.start);
                        (Some(line), Some(column))
                    }
                    None => (None, None),
                };
                ParseError {
                    document: source.to_string(),
                    line,
                    column,
                    message: err.message().to_string(),
                }
            })?;
            toml_to_yaml(table)
        }
    };
    trace!("{source}: {}", compact(&value));
    Ok(value)
}

fn into_mapping(value: Value, source: &str) -> Result<Mapping, ParseError> {
    match value {
        Value::Mapping(m) => Ok(m),
        // An empty document.
        Value::Null => Ok(Mapping::new()),
        other => Err(ParseError {
            document: source.to_string(),
            line: None,
            column: None,
            message: format!(
                "the top level of a parameter document must be a mapping of sections, but got {}",
                compact(&other)
            ),
        }),
    }
}

/// Remove the preload section from the document and, if it names a template,
/// merge the document over the template.
fn apply_preload(
    mut root: Mapping,
    base_dir: Option<&Path>,
    source: &str,
) -> Result<Mapping, LoadError> {
    let template = match root.shift_remove(PRELOAD_SECTION) {
        None | Some(Value::Null) => return Ok(root),
        Some(Value::Mapping(preload)) => match preload.get("template") {
            None | Some(Value::Null) => return Ok(root),
            Some(Value::String(t)) => t.clone(),
            Some(other) => {
                return Err(LoadError::BadPreload {
                    document: source.to_string(),
                    observed: compact(other),
                })
            }
        },
        Some(other) => {
            return Err(LoadError::BadPreload {
                document: source.to_string(),
                observed: compact(&other),
            })
        }
    };

    let template_path = match base_dir {
        Some(dir) => dir.join(&template),
        None => PathBuf::from(&template),
    };
    debug!("{source} preloads template {}", template_path.display());
    let mut base = read_mapping(&template_path)?;
    match base.get(PRELOAD_SECTION) {
        None | Some(Value::Null) => (),
        Some(_) => return Err(LoadError::NestedTemplate(template_path)),
    }
    // Overrides relative to a template aren't interesting provenance; only
    // sweep rows record them.
    let mut ignored = vec![];
    merge_mappings(&mut base, root, "", &mut ignored);
    Ok(base)
}

fn toml_to_yaml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Value::Number(f.into()),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(a) => Value::Sequence(a.into_iter().map(toml_to_yaml).collect()),
        toml::Value::Table(t) => Value::Mapping(
            t.into_iter()
                .map(|(k, v)| (Value::String(k), toml_to_yaml(v)))
                .collect(),
        ),
    }
}

/// Convert a byte offset into a 1-based line and column.
fn line_and_column(contents: &str, offset: usize) -> (usize, usize) {
    let before = contents.get(..offset).unwrap_or(contents);
    let offset = before.len();
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(i) => offset - i,
        None => offset + 1,
    };
    (line, column)
}
