// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Beam-modification regions written in a sweep row's description, e.g.
//!
//! ```text
//! pb modified by regions at (265,-20), (0,37.5) with angular radius (20, 12.5)
//! on snapshots (0, 1) with factors (2, 2) respectively
//! ```

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde_yaml::{Mapping, Value};

lazy_static! {
    /// Anything that starts like a region clause. If this matches but
    /// [`REGION_CLAUSE`] doesn't, the clause is malformed.
    static ref REGION_PREFIX: Regex = Regex::new(r"(?i)\bregions?\s+at\b").unwrap();

    static ref REGION_CLAUSE: Regex = Regex::new(
        r"(?ix)
        (?:pb\s+modified\s+by\s+)?
        regions?\s+at\s+(?P<positions>(?:\([^()]*\)[\s,]*)+?)
        \s*with\s+angular\s+radi(?:us|i)\s+(?P<radii>\([^()]*\))
        \s+on\s+snapshots?\s+(?P<snapshots>\([^()]*\))
        \s+with\s+factors?\s+(?P<factors>\([^()]*\))
        (?:\s+respectively)?"
    )
    .unwrap();

    static ref PAIR: Regex = Regex::new(r"\(([^(),]*),([^(),]*)\)").unwrap();
}

#[derive(Debug)]
pub(super) struct BadClause {
    pub(super) clause: String,
    pub(super) reason: String,
}

/// Parallel lists of regions, in the order they were written.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RegionClause {
    pub(super) positions: Vec<[f64; 2]>,
    pub(super) angular_radius: Vec<f64>,
    pub(super) snapshots: Vec<u64>,
    pub(super) factors: Vec<f64>,
}

impl RegionClause {
    /// Find and parse a region clause in free text. Text without a region
    /// clause gives `Ok(None)`.
    pub(super) fn find(description: &str) -> Result<Option<RegionClause>, BadClause> {
        let start = match REGION_PREFIX.find(description) {
            Some(m) => m.start(),
            None => return Ok(None),
        };
        let caps = REGION_CLAUSE
            .captures(&description[start..])
            .ok_or_else(|| BadClause {
                clause: description[start..].trim().to_string(),
                reason: "expected 'regions at (a, b), ... with angular radius (...) on snapshots (...) with factors (...)'".to_string(),
            })?;
        let clause = caps[0].trim().to_string();
        let bad = |reason: String| BadClause {
            clause: clause.clone(),
            reason,
        };

        let positions = parse_pairs(&caps["positions"]).map_err(bad)?;
        let angular_radius = parse_list(&caps["radii"], "angular radius").map_err(bad)?;
        let snapshots = parse_list(&caps["snapshots"], "snapshot").map_err(bad)?;
        let factors = parse_list(&caps["factors"], "factor").map_err(bad)?;

        Ok(Some(RegionClause {
            positions,
            angular_radius,
            snapshots,
            factors,
        }))
    }

    /// The `beam_modification` fields described by this clause. The
    /// coordinate system is left to the base document.
    pub(super) fn to_fields(&self) -> Mapping {
        let mut m = Mapping::new();
        m.insert(
            "positions".into(),
            Value::Sequence(
                self.positions
                    .iter()
                    .map(|p| Value::from(p.to_vec()))
                    .collect(),
            ),
        );
        m.insert(
            "angular_radius".into(),
            Value::from(self.angular_radius.clone()),
        );
        m.insert("snapshots".into(), Value::from(self.snapshots.clone()));
        m.insert("factors".into(), Value::from(self.factors.clone()));
        m
    }
}

fn parse_pairs(s: &str) -> Result<Vec<[f64; 2]>, String> {
    let mut pairs = vec![];
    for caps in PAIR.captures_iter(s) {
        let a = parse_number(&caps[1], "position")?;
        let b = parse_number(&caps[2], "position")?;
        pairs.push([a, b]);
    }
    // Anything left over (e.g. "(1, 2, 3)") isn't a pair.
    let leftover = PAIR.replace_all(s, "");
    if let Some(junk) = leftover
        .split(',')
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
    {
        return Err(format!("'{junk}' is not a position pair"));
    }
    Ok(pairs)
}

/// Parse a parenthesised, comma-separated list, e.g. "(20, 12.5)".
fn parse_list<T: FromStr>(s: &str, what: &str) -> Result<Vec<T>, String> {
    s.trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|s| parse_number(s, what))
        .collect()
}

fn parse_number<T: FromStr>(s: &str, what: &str) -> Result<T, String> {
    let s = s.trim();
    s.parse()
        .map_err(|_| format!("couldn't parse '{s}' as a {what}"))
}
