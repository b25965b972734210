// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sections and keys a parameter document may contain, and the checks on
//! individual fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde_yaml::Value;
use strum::VariantNames;

use super::{Checker, Observed, Rule};
use crate::{
    constants::MAX_NSIDE,
    load::{compact, key_to_string, Lookup},
    params::*,
    unit_parsing::{parse_freq, parse_time},
};

/// The section holding plot directives. Its keys are free-form plot
/// identifiers, so it isn't described by [`SECTIONS`].
pub(super) const PLOT_SECTION: &str = "plot";

#[derive(Debug, Clone, Copy)]
pub(super) enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

#[derive(Debug, Clone, Copy)]
pub(super) enum FieldKind {
    Bool,
    Int { min: Option<i64> },
    PowerOfTwo,
    Float { min: Bound, max: Bound },
    /// A duration; either a number of seconds or a string with a unit.
    Time,
    /// A frequency; either a number of Hz or a string with a unit.
    Freq,
    Str,
    Path,
    Enum(&'static [&'static str]),
    FloatList { len: Option<usize> },
    IntList { len: Option<usize> },
    /// Indices selecting things; an empty selection makes no sense.
    NonEmptyIntList,
    /// A list of two-number lists.
    PairList,
    StrOrStrList(&'static [&'static str]),
    Section(&'static [Field]),
    Date,
}

#[derive(Debug)]
pub(super) struct Field {
    pub(super) name: &'static str,
    pub(super) kind: FieldKind,
    pub(super) required: bool,
}

const fn opt(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: false,
    }
}

const fn req(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        required: true,
    }
}

const ANY_FLOAT: FieldKind = FieldKind::Float {
    min: Bound::Unbounded,
    max: Bound::Unbounded,
};
const NON_NEGATIVE: FieldKind = FieldKind::Float {
    min: Bound::Inclusive(0.0),
    max: Bound::Unbounded,
};
const POSITIVE: FieldKind = FieldKind::Float {
    min: Bound::Exclusive(0.0),
    max: Bound::Unbounded,
};
const COUNT: FieldKind = FieldKind::Int { min: Some(1) };
const ANY_LIST: FieldKind = FieldKind::FloatList { len: None };

#[derive(Debug)]
pub(super) struct SectionSchema {
    pub(super) name: &'static str,
    pub(super) fields: &'static [Field],
}

const DECLINATION: FieldKind = FieldKind::Float {
    min: Bound::Inclusive(-90.0),
    max: Bound::Inclusive(90.0),
};

const DRIFT_INIT_FIELDS: &[Field] = &[
    opt("alt", DECLINATION),
    opt("az", ANY_FLOAT),
    opt("ha", ANY_FLOAT),
    opt("dec", DECLINATION),
    opt(
        "lst",
        FieldKind::Float {
            min: Bound::Inclusive(0.0),
            max: Bound::Exclusive(24.0),
        },
    ),
];

const TRACK_INIT_FIELDS: &[Field] = &[
    opt("ra", ANY_FLOAT),
    opt("dec", DECLINATION),
    opt("ha", ANY_FLOAT),
    opt("epoch", FieldKind::Str),
];

pub(super) static SECTIONS: &[SectionSchema] = &[
    SectionSchema {
        name: "directory",
        fields: &[opt("rootdir", FieldKind::Path), opt("figdir", FieldKind::Path)],
    },
    SectionSchema {
        name: "project",
        fields: &[opt("name", FieldKind::Str), opt("simid", FieldKind::Str)],
    },
    SectionSchema {
        name: "telescope",
        fields: &[
            req("id", FieldKind::Enum(TelescopeId::VARIANTS)),
            req("latitude", DECLINATION),
            req(
                "longitude",
                FieldKind::Float {
                    min: Bound::Inclusive(-180.0),
                    max: Bound::Inclusive(360.0),
                },
            ),
            req("Tsys", POSITIVE),
            opt("pfb_method", FieldKind::Enum(PfbMethod::VARIANTS)),
        ],
    },
    SectionSchema {
        name: "array",
        fields: &[
            opt("file", FieldKind::Path),
            opt("layout", FieldKind::Enum(NamedLayout::VARIANTS)),
            opt("minR", NON_NEGATIVE),
            opt("maxR", NON_NEGATIVE),
            opt("redundant", FieldKind::Bool),
        ],
    },
    SectionSchema {
        name: "baseline",
        fields: &[
            opt("min", NON_NEGATIVE),
            opt("max", NON_NEGATIVE),
            opt(
                "direction",
                FieldKind::StrOrStrList(BaselineDirection::VARIANTS),
            ),
        ],
    },
    SectionSchema {
        name: "antenna",
        fields: &[
            opt("shape", FieldKind::Enum(ElementShape::VARIANTS)),
            opt("size", POSITIVE),
            opt("ocoords", FieldKind::Enum(OrientationCoords::VARIANTS)),
            opt("orientation", ANY_LIST),
            opt("ground_plane", POSITIVE),
            opt("phased_array", FieldKind::Bool),
        ],
    },
    SectionSchema {
        name: "phasedarray",
        fields: &[
            opt("file", FieldKind::Path),
            opt("delayerr", NON_NEGATIVE),
            opt("gainerr", NON_NEGATIVE),
            opt("nrand", COUNT),
        ],
    },
    SectionSchema {
        name: "achrmbeam",
        fields: &[
            opt("identifier", FieldKind::Str),
            opt("file", FieldKind::Path),
            opt("select_freq", FieldKind::Freq),
        ],
    },
    SectionSchema {
        name: "chrmbeam",
        fields: &[
            opt("identifier", FieldKind::Str),
            opt("file", FieldKind::Path),
            opt("spec_interp", FieldKind::Enum(SpecInterp::VARIANTS)),
        ],
    },
    SectionSchema {
        name: "obsparm",
        fields: &[
            req("freq", FieldKind::Freq),
            req("freq_resolution", FieldKind::Freq),
            req("nchan", COUNT),
            opt("obs_date", FieldKind::Date),
            opt("obs_mode", FieldKind::Enum(ObsMode::VARIANTS)),
            opt("t_obs", FieldKind::Time),
            opt("n_acc", COUNT),
            opt("t_acc", FieldKind::Time),
            opt("timeformat", FieldKind::Enum(TimestampFormat::VARIANTS)),
        ],
    },
    SectionSchema {
        name: "snapshot",
        fields: &[
            opt("all", FieldKind::Bool),
            opt("avg_drifts", FieldKind::Bool),
            opt("beam_switch", FieldKind::Bool),
            opt("pick", FieldKind::NonEmptyIntList),
            opt("range", FieldKind::IntList { len: Some(2) }),
        ],
    },
    SectionSchema {
        name: "pointing",
        fields: &[
            opt("file", FieldKind::Path),
            opt("drift_init", FieldKind::Section(DRIFT_INIT_FIELDS)),
            opt("track_init", FieldKind::Section(TRACK_INIT_FIELDS)),
        ],
    },
    SectionSchema {
        name: "fgparm",
        fields: &[
            req("model", FieldKind::Enum(FgModel::VARIANTS)),
            opt("nside", FieldKind::PowerOfTwo),
            opt("spindex", ANY_FLOAT),
            opt("spindex_rms", NON_NEGATIVE),
            opt("spindex_seed", FieldKind::Int { min: None }),
            opt("flux_unit", FieldKind::Enum(FluxUnit::VARIANTS)),
            opt("epoch", FieldKind::Str),
            opt("model_freq", FieldKind::Freq),
        ],
    },
    SectionSchema {
        name: "catalog",
        fields: &[
            opt("filepathtype", FieldKind::Enum(CatalogPathType::VARIANTS)),
            opt("DSM_file_prefix", FieldKind::Path),
            opt("SUMSS_file", FieldKind::Path),
            opt("NVSS_file", FieldKind::Path),
            opt("MWACS_file", FieldKind::Path),
            opt("GLEAM_file", FieldKind::Path),
            opt("custom_file", FieldKind::Path),
        ],
    },
    SectionSchema {
        name: "eorparm",
        fields: &[
            opt("model", FieldKind::Enum(EorModelKind::VARIANTS)),
            opt("nside", FieldKind::PowerOfTwo),
            opt("spindex", ANY_FLOAT),
            opt("spindex_rms", NON_NEGATIVE),
            opt("spindex_seed", FieldKind::Int { min: None }),
            opt("lidz", FieldKind::Bool),
            opt("21cmfast", FieldKind::Bool),
            opt("lidz_modelfile", FieldKind::Path),
            opt("21cmfast_modelfile", FieldKind::Path),
            opt("global_EoR_parms", FieldKind::FloatList { len: Some(3) }),
            opt("cube_freq", FieldKind::Freq),
        ],
    },
    SectionSchema {
        name: "processing",
        fields: &[
            opt("bl_chunk_size", COUNT),
            opt("n_bl_chunks", COUNT),
            opt("bl_chunk", FieldKind::NonEmptyIntList),
            opt("n_sky_sectors", COUNT),
            opt("bpass_shape", FieldKind::Enum(BandpassShape::VARIANTS)),
            opt("f_pad", NON_NEGATIVE),
            opt("memuse", POSITIVE),
        ],
    },
    SectionSchema {
        name: "clean",
        fields: &[
            opt("pad", NON_NEGATIVE),
            opt("clean_window_buffer", NON_NEGATIVE),
            opt(
                "tol",
                FieldKind::Float {
                    min: Bound::Exclusive(0.0),
                    max: Bound::Inclusive(1.0),
                },
            ),
            opt("maxiter", COUNT),
        ],
    },
    SectionSchema {
        name: "subband",
        fields: &[
            opt("freq_center", ANY_LIST),
            opt("bw_eff", ANY_LIST),
            opt("shape", FieldKind::Enum(BandpassShape::VARIANTS)),
            opt("fftpow", POSITIVE),
            opt("pad", NON_NEGATIVE),
        ],
    },
    SectionSchema {
        name: "reflectometry",
        fields: &[
            opt("action", FieldKind::Bool),
            opt("cable_length", POSITIVE),
            opt(
                "reflection_coefficient",
                FieldKind::Float {
                    min: Bound::Inclusive(0.0),
                    max: Bound::Inclusive(1.0),
                },
            ),
        ],
    },
    SectionSchema {
        name: "beam_modification",
        fields: &[
            opt("coords", FieldKind::Enum(RegionCoords::VARIANTS)),
            opt("positions", FieldKind::PairList),
            opt("angular_radius", ANY_LIST),
            opt("snapshots", FieldKind::IntList { len: None }),
            opt("factors", ANY_LIST),
        ],
    },
    // Normally removed by the loader, but documents made from values keep it.
    SectionSchema {
        name: "preload",
        fields: &[opt("template", FieldKind::Path)],
    },
];

/// Parse an observation date. Dates may be written as `YYYY/MM/DD`,
/// `YYYY-MM-DD` or as an ISO-8601 date-time.
pub(crate) fn parse_obs_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y/%m/%d", "%Y-%m-%d"]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| s.parse::<NaiveDateTime>().ok())
}

/// Check every section and every key in the document, then check that all
/// required keys are present.
pub(super) fn check_sections(checker: &mut Checker) {
    let doc = checker.doc;
    for (key, value) in doc.root() {
        let name = match key_to_string(key) {
            Some(n) => n,
            None => {
                checker.push(
                    compact(key),
                    Rule::UnknownKey,
                    Observed::Value(compact(value)),
                );
                continue;
            }
        };

        if name == PLOT_SECTION {
            check_plots(checker, value);
            continue;
        }

        match SECTIONS.iter().find(|s| s.name == name) {
            Some(section) => check_mapping(checker, &name, section.fields, value),
            None => checker.push(name, Rule::UnknownKey, Observed::summary(value)),
        }
    }

    for section in SECTIONS {
        for field in section.fields.iter().filter(|f| f.required) {
            let path = format!("{}.{}", section.name, field.name);
            let lookup = checker.get(&path);
            if !lookup.is_set() {
                checker.push(path, Rule::Required, Observed::from_lookup(lookup));
            }
        }
    }
}

/// Check a (possibly null) mapping against a set of fields.
fn check_mapping(checker: &mut Checker, path: &str, fields: &'static [Field], value: &Value) {
    let mapping = match value {
        // A null section is the same as an empty one.
        Value::Null => return,
        Value::Mapping(m) => m,
        other => {
            checker.push(
                path,
                Rule::WrongType {
                    expected: "a mapping".to_string(),
                },
                Observed::summary(other),
            );
            return;
        }
    };

    for (key, value) in mapping {
        let name = key_to_string(key).unwrap_or_else(|| compact(key));
        let field_path = format!("{path}.{name}");
        match fields.iter().find(|f| f.name == name) {
            Some(Field {
                kind: FieldKind::Section(subfields),
                ..
            }) => check_mapping(checker, &field_path, subfields, value),
            Some(field) => {
                if let Some(rule) = check_value(&field.kind, value) {
                    checker.push(field_path, rule, Observed::summary(value));
                }
            }
            None => checker.push(field_path, Rule::UnknownKey, Observed::summary(value)),
        }
    }
}

fn wrong_type(expected: &str) -> Option<Rule> {
    Some(Rule::WrongType {
        expected: expected.to_string(),
    })
}

fn check_bounds(x: f64, min: Bound, max: Bound) -> Option<Rule> {
    let below = match min {
        Bound::Unbounded => None,
        Bound::Inclusive(m) => (x < m).then(|| format!(">= {m}")),
        Bound::Exclusive(m) => (x <= m).then(|| format!("> {m}")),
    };
    let above = match max {
        Bound::Unbounded => None,
        Bound::Inclusive(m) => (x > m).then(|| format!("<= {m}")),
        Bound::Exclusive(m) => (x >= m).then(|| format!("< {m}")),
    };
    below.or(above).map(|bound| Rule::OutOfRange { bound })
}

fn is_non_negative_int(v: &Value) -> bool {
    v.as_u64().is_some()
}

/// Times and frequencies may be bare numbers or strings with units, and must
/// be positive either way.
fn check_quantity<F: Fn(&str) -> Option<f64>>(
    value: &Value,
    parse: F,
    expected: &str,
) -> Option<Rule> {
    let x = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse(s),
        _ => None,
    };
    match x {
        None => wrong_type(expected),
        Some(x) => check_bounds(x, Bound::Exclusive(0.0), Bound::Unbounded),
    }
}

/// Check a single value against its kind. Null always passes; whether a field
/// may be null is decided by other rules.
pub(super) fn check_value(kind: &FieldKind, value: &Value) -> Option<Rule> {
    if value.is_null() {
        return None;
    }

    match *kind {
        FieldKind::Bool if value.is_bool() => None,
        FieldKind::Bool => wrong_type("a boolean"),

        FieldKind::Int { min } => match value.as_i64() {
            None => wrong_type("an integer"),
            Some(i) => match min {
                Some(m) if i < m => Some(Rule::OutOfRange {
                    bound: format!(">= {m}"),
                }),
                _ => None,
            },
        },

        FieldKind::PowerOfTwo => match value.as_u64() {
            None => wrong_type("an integer"),
            Some(i) if !i.is_power_of_two() || i > u64::from(MAX_NSIDE) => {
                Some(Rule::OutOfRange {
                    bound: format!("a power of two <= {MAX_NSIDE}"),
                })
            }
            Some(_) => None,
        },

        FieldKind::Float { min, max } => match value.as_f64() {
            None => wrong_type("a number"),
            Some(x) => check_bounds(x, min, max),
        },

        FieldKind::Time => check_quantity(
            value,
            |s| parse_time(s).ok().map(|(n, _)| n),
            "a time, e.g. 1080 or '18min'",
        ),

        FieldKind::Freq => check_quantity(
            value,
            |s| parse_freq(s).ok().map(|(n, _)| n),
            "a frequency, e.g. 150e6 or '150MHz'",
        ),

        FieldKind::Str | FieldKind::Path if value.is_string() => None,
        FieldKind::Str | FieldKind::Path => wrong_type("a string"),

        FieldKind::Enum(allowed) => match value.as_str() {
            None => wrong_type("a string"),
            Some(s) if !allowed.contains(&s) => Some(Rule::NotInSet {
                allowed: allowed.to_vec(),
            }),
            Some(_) => None,
        },

        FieldKind::FloatList { len } => match value.as_sequence() {
            Some(seq) if seq.iter().all(|v| v.is_number()) => match len {
                Some(l) if seq.len() != l => wrong_type(&format!("a list of {l} numbers")),
                _ => None,
            },
            _ => wrong_type("a list of numbers"),
        },

        FieldKind::IntList { len } => match value.as_sequence() {
            Some(seq) if seq.iter().all(is_non_negative_int) => match len {
                Some(l) if seq.len() != l => {
                    wrong_type(&format!("a list of {l} non-negative integers"))
                }
                _ => None,
            },
            _ => wrong_type("a list of non-negative integers"),
        },

        FieldKind::NonEmptyIntList => match value.as_sequence() {
            Some(seq) if !seq.is_empty() && seq.iter().all(is_non_negative_int) => None,
            _ => wrong_type("a non-empty list of non-negative integers"),
        },

        FieldKind::PairList => match value.as_sequence() {
            Some(seq)
                if seq.iter().all(|p| {
                    p.as_sequence()
                        .map(|p| p.len() == 2 && p.iter().all(|v| v.is_number()))
                        .unwrap_or(false)
                }) =>
            {
                None
            }
            _ => wrong_type("a list of [number, number] pairs"),
        },

        FieldKind::StrOrStrList(allowed) => {
            let strings: Option<Vec<&str>> = match value {
                Value::String(s) => Some(vec![s.as_str()]),
                Value::Sequence(seq) => seq.iter().map(|v| v.as_str()).collect(),
                _ => None,
            };
            match strings {
                None => wrong_type("a string or a list of strings"),
                Some(strings) if strings.iter().any(|s| !allowed.contains(s)) => {
                    Some(Rule::NotInSet {
                        allowed: allowed.to_vec(),
                    })
                }
                Some(_) => None,
            }
        }

        FieldKind::Section(_) if value.is_mapping() => None,
        FieldKind::Section(_) => wrong_type("a mapping"),

        FieldKind::Date => match value.as_str() {
            Some(s) if parse_obs_date(s).is_some() => None,
            _ => wrong_type("a date, e.g. '2015/11/23' or '2015-11-23T12:00:00'"),
        },
    }
}

/// Every plot directive must be a mapping with a boolean `action`. The other
/// keys are passed through untouched.
fn check_plots(checker: &mut Checker, value: &Value) {
    let plots = match value {
        Value::Null => return,
        Value::Mapping(m) => m,
        other => {
            checker.push(
                PLOT_SECTION,
                Rule::WrongType {
                    expected: "a mapping of plot identifiers".to_string(),
                },
                Observed::summary(other),
            );
            return;
        }
    };

    for (id, directive) in plots {
        let id = key_to_string(id).unwrap_or_else(|| compact(id));
        let path = format!("{PLOT_SECTION}.{id}");
        match directive {
            Value::Mapping(m) => {
                let action_path = format!("{path}.action");
                match Lookup::from_option(m.get("action")) {
                    Lookup::Present(Value::Bool(_)) => (),
                    Lookup::Present(v) => checker.push(
                        action_path,
                        Rule::WrongType {
                            expected: "a boolean".to_string(),
                        },
                        Observed::summary(v),
                    ),
                    lookup => {
                        checker.push(action_path, Rule::Required, Observed::from_lookup(lookup))
                    }
                }
            }
            other => checker.push(
                path,
                Rule::WrongType {
                    expected: "a mapping with an 'action'".to_string(),
                },
                Observed::summary(other),
            ),
        }
    }
}
