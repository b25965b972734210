// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameter sweeps.
//!
//! A sweep table lists variants of a base parameter document. Each row is
//! identified by a number (e.g. a system temperature) and carries a
//! description and a set of overrides in the same shape as the document. Each
//! row produces its own [`RunConfig`] (or its own error); rows never affect
//! one another.

mod error;
mod regions;
#[cfg(test)]
mod tests;

pub use error::SweepError;

use std::path::Path;

use log::{debug, trace};
use rayon::prelude::*;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::{
    constants::DEFAULT_SWEEP_LABEL,
    load::{compact, merge_mappings, parse_contents, DocumentFormat, Provenance, RowTag},
    RawDocument, RunConfig, RunConfigError,
};
use regions::RegionClause;

/// One variant of a base document.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    /// The row identifier exactly as written, e.g. "85.0".
    pub id: String,

    /// Free text describing the row. Only a region clause in this text has
    /// any effect; see [`SweepTable::from_text`].
    pub description: String,

    /// Fields to override in the base document. Empty if the row only
    /// documents the base.
    pub overrides: Mapping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    /// What the rows are identified by, e.g. "Tsys".
    pub label: String,

    pub rows: Vec<SweepRow>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableArgs {
    label: Option<String>,
    rows: Vec<RowArgs>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RowArgs {
    id: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    overrides: Option<Mapping>,
}

/// Collects rows, checking their ids as they arrive.
struct RowBuilder<'a> {
    table: &'a str,
    rows: Vec<SweepRow>,

    /// The numeric value of each id and the line it came from.
    seen: Vec<(f64, usize)>,
}

impl<'a> RowBuilder<'a> {
    fn new(table: &'a str) -> RowBuilder<'a> {
        RowBuilder {
            table,
            rows: vec![],
            seen: vec![],
        }
    }

    /// `line` is the line of a text table, or the 1-based row number of a
    /// structured table.
    fn push(
        &mut self,
        line: usize,
        id: &str,
        description: &str,
        mut overrides: Mapping,
    ) -> Result<(), SweepError> {
        let value = id
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SweepError::NonNumericId {
                table: self.table.to_string(),
                line,
                id: id.to_string(),
            })?;
        if let Some(&(_, first_line)) = self.seen.iter().find(|(v, _)| *v == value) {
            return Err(SweepError::DuplicateId {
                table: self.table.to_string(),
                line,
                id: id.to_string(),
                first_line,
            });
        }
        self.seen.push((value, line));

        let clause = RegionClause::find(description).map_err(|e| SweepError::BadRegionClause {
            table: self.table.to_string(),
            line,
            clause: e.clause,
            reason: e.reason,
        })?;
        if let Some(clause) = clause {
            if overrides.contains_key("beam_modification") {
                debug!(
                    "{}:{line}: row {id} overrides beam_modification explicitly; ignoring the region clause in its description",
                    self.table
                );
            } else {
                trace!("{}:{line}: row {id} regions: {clause:?}", self.table);
                overrides.insert(
                    "beam_modification".into(),
                    Value::Mapping(clause.to_fields()),
                );
            }
        }

        self.rows.push(SweepRow {
            id: id.to_string(),
            description: description.to_string(),
            overrides,
        });
        Ok(())
    }

    fn finish(self, label: Option<String>) -> Result<SweepTable, SweepError> {
        if self.rows.is_empty() {
            return Err(SweepError::Empty(self.table.to_string()));
        }
        Ok(SweepTable {
            label: label.unwrap_or_else(|| DEFAULT_SWEEP_LABEL.to_string()),
            rows: self.rows,
        })
    }
}

impl SweepTable {
    /// Read a sweep table from a file. Files with a parameter-document
    /// extension (e.g. `.yaml`) are read as structured tables, anything else
    /// as a text table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SweepTable, SweepError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| SweepError::IO {
            path: path.to_path_buf(),
            err,
        })?;
        let source = path.display().to_string();
        match DocumentFormat::from_path(path) {
            Some(format) => SweepTable::from_structured(&contents, format, &source),
            None => SweepTable::from_text(&contents, &source),
        }
    }

    /// Parse a text table.
    ///
    /// Blank lines and lines starting with `#` are ignored. If the first
    /// remaining line doesn't start with a number, it's a header, and its
    /// first word is the table's label. Every other line is a numeric row id
    /// followed by a free-text description.
    ///
    /// Descriptions are documentation, with one exception: a clause like
    /// "regions at (265,-20), (0,37.5) with angular radius (20, 12.5) on
    /// snapshots (0, 1) with factors (2, 2)" becomes a `beam_modification`
    /// override.
    pub fn from_text(contents: &str, source: &str) -> Result<SweepTable, SweepError> {
        let mut label = None;
        let mut builder = RowBuilder::new(source);
        for (i, line) in contents.lines().enumerate() {
            let line_num = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, description) = match line.split_once(char::is_whitespace) {
                Some((id, description)) => (id, description.trim()),
                None => (line, ""),
            };
            if label.is_none() && builder.rows.is_empty() && id.parse::<f64>().is_err() {
                debug!("{source}:{line_num}: table label is '{id}'");
                label = Some(id.to_string());
                continue;
            }
            builder.push(line_num, id, description, Mapping::new())?;
        }
        builder.finish(label)
    }

    /// Parse a YAML table, e.g.
    ///
    /// ```yaml
    /// label: Tsys
    /// rows:
    ///   - id: 85.0
    ///     description: baseline
    ///     overrides:
    ///       telescope: {Tsys: 85.0}
    /// ```
    pub fn from_yaml(contents: &str, source: &str) -> Result<SweepTable, SweepError> {
        SweepTable::from_structured(contents, DocumentFormat::Yaml, source)
    }

    fn from_structured(
        contents: &str,
        format: DocumentFormat,
        source: &str,
    ) -> Result<SweepTable, SweepError> {
        let value = parse_contents(contents, format, source)?;
        let args: TableArgs = serde_yaml::from_value(value).map_err(|e| SweepError::BadTable {
            table: source.to_string(),
            message: e.to_string(),
        })?;

        let mut builder = RowBuilder::new(source);
        for (i, row) in args.rows.into_iter().enumerate() {
            let id = match row.id {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(SweepError::NonNumericId {
                        table: source.to_string(),
                        line: i + 1,
                        id: compact(&other),
                    })
                }
            };
            builder.push(
                i + 1,
                &id,
                row.description.as_deref().unwrap_or_default(),
                row.overrides.unwrap_or_default(),
            )?;
        }
        builder.finish(args.label)
    }
}

/// Merge `fragment` over a copy of `base`, returning the merged document and
/// the dotted paths of every field the fragment set.
pub fn apply_overrides(base: &Mapping, fragment: &Mapping) -> (Value, Vec<String>) {
    let mut merged = base.clone();
    let mut overridden = vec![];
    merge_mappings(&mut merged, fragment.clone(), "", &mut overridden);
    (Value::Mapping(merged), overridden)
}

/// The result of resolving one row of a sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub tag: RowTag,
    pub result: Result<RunConfig, RunConfigError>,

    /// Non-fatal problems found while resolving this row. Empty if the row
    /// failed.
    pub warnings: Vec<String>,
}

/// Resolve every row of `table` against `base`. Rows are resolved in
/// parallel, but the outcomes are in table order.
pub fn resolve_sweep(base: &RawDocument, table: &SweepTable) -> Vec<SweepOutcome> {
    debug!(
        "Resolving {} {} rows against {}",
        table.rows.len(),
        table.label,
        base.provenance().source
    );
    table
        .rows
        .par_iter()
        .map(|row| {
            let tag = RowTag {
                label: table.label.clone(),
                id: row.id.clone(),
            };
            match resolve_row(base, row, &tag) {
                Ok((config, warnings)) => SweepOutcome {
                    tag,
                    result: Ok(config),
                    warnings,
                },
                Err(e) => {
                    debug!("{tag} failed: {e}");
                    SweepOutcome {
                        tag,
                        result: Err(e),
                        warnings: vec![],
                    }
                }
            }
        })
        .collect()
}

fn resolve_row(
    base: &RawDocument,
    row: &SweepRow,
    tag: &RowTag,
) -> Result<(RunConfig, Vec<String>), RunConfigError> {
    let (merged, overridden) = apply_overrides(base.root(), &row.overrides);
    trace!("{tag} overrides: {overridden:?}");
    let provenance = Provenance {
        source: base.provenance().source.clone(),
        row: Some(tag.clone()),
        overridden,
    };
    let raw = RawDocument::from_value(merged, provenance)?;
    let validated = crate::validate(raw)?;
    Ok(crate::resolve::resolve_with_warnings(&validated)?)
}
