// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validation of parameter documents.
//!
//! Every field is checked against its type (and allowed values), then every
//! group constraint between fields is checked. Violations are accumulated
//! rather than returned one at a time, so that all of a document's problems
//! (or the problems of many sweep rows) can be reported in one go. Only a
//! document with no violations at all becomes a [`ValidatedDocument`].

pub(crate) mod args;
mod groups;
mod schema;
#[cfg(test)]
mod tests;

pub(crate) use schema::parse_obs_date;

use std::fmt;

use itertools::Itertools;
use log::{debug, trace};
use serde_yaml::{Mapping, Value};
use vec1::Vec1;

use crate::load::{compact, Lookup, Provenance, RawDocument};
use args::DocumentArgs;

/// The constraint a [`Violation`] breaks.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// The key isn't part of the schema.
    UnknownKey,

    /// The field must be set to something other than null.
    Required,

    WrongType { expected: String },

    NotInSet { allowed: Vec<&'static str> },

    OutOfRange { bound: String },

    ExactlyOneOf { members: Vec<String> },

    AtMostOneOf { members: Vec<String> },

    /// Exactly two of the three members must be set; the third is derived.
    ExactlyTwoOfThree { members: Vec<String> },

    /// Parallel lists must all have the same length. Each member is listed
    /// with its length (null and absent lists have no elements).
    LengthMismatch { members: Vec<(String, usize)> },

    /// This field is one half of a pair; the other half isn't set.
    IncompletePair { partner: String },

    /// The field is required because of the value of another field.
    ConditionalRequirement { condition: String },

    Inconsistent { reason: String },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::UnknownKey => write!(f, "unknown key"),
            Rule::Required => write!(f, "required"),
            Rule::WrongType { expected } => write!(f, "expected {expected}"),
            Rule::NotInSet { allowed } => write!(f, "must be one of: {}", allowed.join(", ")),
            Rule::OutOfRange { bound } => write!(f, "must be {bound}"),
            Rule::ExactlyOneOf { members } => {
                write!(f, "exactly one of {} must be set", members.join(", "))
            }
            Rule::AtMostOneOf { members } => {
                write!(f, "at most one of {} may be set", members.join(", "))
            }
            Rule::ExactlyTwoOfThree { members } => write!(
                f,
                "exactly two of {} must be set; the third is derived",
                members.join(", ")
            ),
            Rule::LengthMismatch { members } => write!(
                f,
                "parallel lists have different lengths: {}",
                members
                    .iter()
                    .map(|(m, len)| format!("{m} ({len})"))
                    .join(", ")
            ),
            Rule::IncompletePair { partner } => write!(f, "must be set together with {partner}"),
            Rule::ConditionalRequirement { condition } => {
                write!(f, "required because {condition}")
            }
            Rule::Inconsistent { reason } => write!(f, "{reason}"),
        }
    }
}

/// What the validator found at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Absent,
    Null,

    /// A one-line rendering of the value.
    Value(String),
}

impl Observed {
    pub(crate) fn from_lookup(lookup: Lookup) -> Observed {
        match lookup {
            Lookup::Absent => Observed::Absent,
            Lookup::Null => Observed::Null,
            Lookup::Present(v) => Observed::Value(compact(v)),
        }
    }

    pub(crate) fn summary(value: &Value) -> Observed {
        match value {
            Value::Null => Observed::Null,
            v => Observed::Value(compact(v)),
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Absent => write!(f, "absent"),
            Observed::Null => write!(f, "null"),
            Observed::Value(v) => write!(f, "{v}"),
        }
    }
}

/// A single broken constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The dotted path of the offending field or group, e.g. `obsparm.t_acc`.
    pub path: String,
    pub rule: Rule,
    pub observed: Observed,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (observed: {})", self.path, self.rule, self.observed)
    }
}

/// A document broke one or more constraints. All of them are listed.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaValidationError {
    /// The name of the document (usually its path).
    pub document: String,

    pub violations: Vec1<Violation>,
}

impl SchemaValidationError {
    /// Get the violations at a path.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.path == path)
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = self.violations.len();
        write!(
            f,
            "{} failed validation with {num} violation{}:",
            self.document,
            if num == 1 { "" } else { "s" }
        )?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaValidationError {}

/// A document that broke no constraints. These can only be made by
/// [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    raw: RawDocument,
    args: DocumentArgs,
}

impl ValidatedDocument {
    pub fn raw(&self) -> &RawDocument {
        &self.raw
    }

    pub fn provenance(&self) -> &Provenance {
        self.raw.provenance()
    }

    pub(crate) fn args(&self) -> &DocumentArgs {
        &self.args
    }
}

/// Accumulates violations while walking a document.
pub(crate) struct Checker<'a> {
    pub(crate) doc: &'a RawDocument,
    violations: Vec<Violation>,
}

impl<'a> Checker<'a> {
    fn new(doc: &'a RawDocument) -> Checker<'a> {
        Checker {
            doc,
            violations: vec![],
        }
    }

    /// Look up a dotted path.
    pub(crate) fn get(&self, path: &str) -> Lookup<'a> {
        let keys: Vec<&str> = path.split('.').collect();
        self.doc.lookup(&keys)
    }

    pub(crate) fn push<S: Into<String>>(&mut self, path: S, rule: Rule, observed: Observed) {
        let v = Violation {
            path: path.into(),
            rule,
            observed,
        };
        trace!("{v}");
        self.violations.push(v);
    }

    /// Push a violation, observing whatever is at the path.
    pub(crate) fn push_at(&mut self, path: &str, rule: Rule) {
        let observed = Observed::from_lookup(self.get(path));
        self.push(path, rule, observed);
    }

    pub(crate) fn is_set(&self, path: &str) -> bool {
        self.get(path).is_set()
    }

    pub(crate) fn is_true(&self, path: &str) -> bool {
        matches!(self.get(path), Lookup::Present(Value::Bool(true)))
    }

    pub(crate) fn str_at(&self, path: &str) -> Option<&'a str> {
        self.get(path).value().and_then(|v| v.as_str())
    }

    pub(crate) fn f64_at(&self, path: &str) -> Option<f64> {
        self.get(path).value().and_then(|v| v.as_f64())
    }

    /// The length of a list; null and absent lists are empty. Anything that
    /// isn't a list gives `None`.
    pub(crate) fn len_at(&self, path: &str) -> Option<usize> {
        match self.get(path) {
            Lookup::Absent | Lookup::Null => Some(0),
            Lookup::Present(Value::Sequence(s)) => Some(s.len()),
            Lookup::Present(_) => None,
        }
    }

    pub(crate) fn seq_at(&self, path: &str) -> Option<&'a [Value]> {
        self.get(path)
            .value()
            .and_then(|v| v.as_sequence())
            .map(|s| s.as_slice())
    }

    /// Render several fields at once, e.g. `{file: 'a.txt', layout: 'HERA-19'}`.
    pub(crate) fn observe_group(&self, paths: &[&str]) -> Observed {
        let parts = paths
            .iter()
            .map(|p| {
                let name = p.rsplit('.').next().unwrap_or(p);
                format!("{name}: {}", Observed::from_lookup(self.get(p)))
            })
            .join(", ");
        Observed::Value(format!("{{{parts}}}"))
    }
}

/// Validate a document. All violations are returned together.
pub fn validate(doc: RawDocument) -> Result<ValidatedDocument, SchemaValidationError> {
    debug!("Validating {}", doc.provenance().source);
    let mut checker = Checker::new(&doc);
    schema::check_sections(&mut checker);
    groups::check_groups(&mut checker);
    let violations = checker.violations;

    if let Ok(violations) = Vec1::try_from_vec(violations) {
        return Err(SchemaValidationError {
            document: doc.provenance().source.clone(),
            violations,
        });
    }

    let args = deserialise_args(&doc)?;
    debug!("{} is valid", doc.provenance().source);
    Ok(ValidatedDocument { raw: doc, args })
}

/// Turn a document with no violations into typed arguments. Types have
/// already been checked, so this should only fail on something the rules
/// missed.
fn deserialise_args(doc: &RawDocument) -> Result<DocumentArgs, SchemaValidationError> {
    // Null sections are treated as empty sections.
    let root: Mapping = doc
        .root()
        .iter()
        .map(|(k, v)| match v {
            Value::Null => (k.clone(), Value::Mapping(Mapping::new())),
            v => (k.clone(), v.clone()),
        })
        .collect();
    serde_yaml::from_value(Value::Mapping(root)).map_err(|e| SchemaValidationError {
        document: doc.provenance().source.clone(),
        violations: Vec1::new(Violation {
            path: "<document>".to_string(),
            rule: Rule::WrongType {
                expected: e.to_string(),
            },
            observed: Observed::Absent,
        }),
    })
}
