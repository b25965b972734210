// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Constraints between fields.
//!
//! These only look at values that passed their type checks; a value of the
//! wrong type has already been reported, and is treated as "set" but
//! otherwise ignored here.

use std::str::FromStr;

use super::{Checker, Observed, Rule};
use crate::{
    load::compact,
    params::{EorModelKind, FgModel, TelescopeId},
};

pub(super) fn check_groups(c: &mut Checker) {
    check_array(c);
    check_baseline(c);
    check_pointing(c);
    check_accumulation(c);
    check_snapshots(c);
    check_antenna(c);
    check_phased_array(c);
    check_beams(c);
    check_foreground(c);
    check_eor(c);
    check_processing(c);
    check_parallel_lists(c);
    check_reflectometry(c);
}

fn members(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

fn exactly_one_of(c: &mut Checker, group: &str, paths: &[&str]) {
    let num_set = paths.iter().filter(|p| c.is_set(p)).count();
    if num_set != 1 {
        let observed = c.observe_group(paths);
        c.push(
            group,
            Rule::ExactlyOneOf {
                members: members(paths),
            },
            observed,
        );
    }
}

fn at_most_one_of(c: &mut Checker, group: &str, paths: &[&str], set: &[bool]) {
    if set.iter().filter(|&&s| s).count() > 1 {
        let observed = c.observe_group(paths);
        c.push(
            group,
            Rule::AtMostOneOf {
                members: members(paths),
            },
            observed,
        );
    }
}

/// Each of `paths` must be set, because of `condition`.
fn require_because(c: &mut Checker, paths: &[&str], condition: &str) {
    for path in paths {
        if !c.is_set(path) {
            c.push_at(
                path,
                Rule::ConditionalRequirement {
                    condition: condition.to_string(),
                },
            );
        }
    }
}

/// Two fields that are only meaningful together.
fn both_or_neither(c: &mut Checker, a: &str, b: &str) {
    match (c.is_set(a), c.is_set(b)) {
        (true, false) => c.push_at(
            b,
            Rule::IncompletePair {
                partner: a.to_string(),
            },
        ),
        (false, true) => c.push_at(
            a,
            Rule::IncompletePair {
                partner: b.to_string(),
            },
        ),
        _ => (),
    }
}

/// `upper` must not be less than `lower`.
fn ordered(c: &mut Checker, lower: &str, upper: &str) {
    if let (Some(l), Some(u)) = (c.f64_at(lower), c.f64_at(upper)) {
        if u < l {
            c.push_at(
                upper,
                Rule::Inconsistent {
                    reason: format!("must not be less than {lower} ({l})"),
                },
            );
        }
    }
}

fn check_array(c: &mut Checker) {
    exactly_one_of(c, "array", &["array.file", "array.layout"]);
    if c.str_at("array.layout") == Some("CIRC") {
        require_because(c, &["array.minR"], "array.layout is CIRC");
    }
    ordered(c, "array.minR", "array.maxR");
}

fn check_baseline(c: &mut Checker) {
    ordered(c, "baseline.min", "baseline.max");
}

fn check_pointing(c: &mut Checker) {
    exactly_one_of(
        c,
        "pointing",
        &["pointing.file", "pointing.drift_init", "pointing.track_init"],
    );

    let obs_mode = c.str_at("obsparm.obs_mode");

    if c.is_set("pointing.drift_init") {
        let altaz = ("pointing.drift_init.alt", "pointing.drift_init.az");
        let hadec = ("pointing.drift_init.ha", "pointing.drift_init.dec");
        let mut complete = 0;
        let mut incomplete = false;
        for (a, b) in [altaz, hadec] {
            match (c.is_set(a), c.is_set(b)) {
                (true, true) => complete += 1,
                (false, false) => (),
                _ => {
                    incomplete = true;
                    both_or_neither(c, a, b);
                }
            }
        }
        if complete != 1 && !incomplete {
            let observed = c.observe_group(&[altaz.0, altaz.1, hadec.0, hadec.1]);
            c.push(
                "pointing.drift_init",
                Rule::ExactlyOneOf {
                    members: members(&["alt/az", "ha/dec"]),
                },
                observed,
            );
        }
        if !c.is_set("pointing.drift_init.lst") {
            c.push_at("pointing.drift_init.lst", Rule::Required);
        }
        if let Some(mode) = obs_mode.filter(|&m| m != "drift") {
            c.push_at(
                "obsparm.obs_mode",
                Rule::Inconsistent {
                    reason: format!(
                        "pointing.drift_init is used, so obs_mode must be drift or null, not {mode}"
                    ),
                },
            );
        }
    }

    if c.is_set("pointing.track_init") {
        for path in ["pointing.track_init.ra", "pointing.track_init.dec"] {
            if !c.is_set(path) {
                c.push_at(path, Rule::Required);
            }
        }
        if let Some(mode) = obs_mode.filter(|&m| m != "track") {
            c.push_at(
                "obsparm.obs_mode",
                Rule::Inconsistent {
                    reason: format!(
                        "pointing.track_init is used, so obs_mode must be track or null, not {mode}"
                    ),
                },
            );
        }
    }

    if let Some(mode @ ("dns" | "lstbin")) = obs_mode {
        require_because(c, &["pointing.file"], &format!("obsparm.obs_mode is {mode}"));
    }
}

fn check_accumulation(c: &mut Checker) {
    let paths = ["obsparm.t_obs", "obsparm.n_acc", "obsparm.t_acc"];
    let num_set = paths.iter().filter(|p| c.is_set(p)).count();
    if num_set != 2 {
        let observed = c.observe_group(&paths);
        c.push(
            "obsparm",
            Rule::ExactlyTwoOfThree {
                members: members(&paths),
            },
            observed,
        );
    }
}

fn check_snapshots(c: &mut Checker) {
    let paths = [
        "snapshot.all",
        "snapshot.avg_drifts",
        "snapshot.beam_switch",
        "snapshot.pick",
        "snapshot.range",
    ];
    let set = [
        c.is_true(paths[0]),
        c.is_true(paths[1]),
        c.is_true(paths[2]),
        c.is_set(paths[3]),
        c.is_set(paths[4]),
    ];
    at_most_one_of(c, "snapshot", &paths, &set);

    let obs_mode = c.str_at("obsparm.obs_mode");
    for path in ["snapshot.avg_drifts", "snapshot.beam_switch"] {
        if c.is_true(path) && obs_mode != Some("dns") {
            c.push_at(
                "obsparm.obs_mode",
                Rule::ConditionalRequirement {
                    condition: format!("{path} is true (obs_mode must be dns)"),
                },
            );
        }
    }

    if let Some([first, last]) = c.seq_at("snapshot.range") {
        if let (Some(first), Some(last)) = (first.as_u64(), last.as_u64()) {
            if first > last {
                c.push_at(
                    "snapshot.range",
                    Rule::Inconsistent {
                        reason: "the first snapshot must not come after the last".to_string(),
                    },
                );
            }
        }
    }
}

fn check_antenna(c: &mut Checker) {
    let telescope = c
        .str_at("telescope.id")
        .and_then(|id| TelescopeId::from_str(id).ok());
    let fixed = telescope.and_then(|t| t.fixed_element()).is_some();
    if let Some(shape @ ("dish" | "dipole")) = c.str_at("antenna.shape") {
        if !fixed {
            require_because(c, &["antenna.size"], &format!("antenna.shape is {shape}"));
        }
    }

    if c.is_set("antenna.orientation") {
        require_because(c, &["antenna.ocoords"], "antenna.orientation is set");
        let ocoords = c.str_at("antenna.ocoords");
        let expected = match ocoords {
            Some("altaz") => 2,
            Some("dircos") => 3,
            _ => return,
        };
        if let Some(len) = c.seq_at("antenna.orientation").map(|s| s.len()) {
            if len != expected {
                c.push_at(
                    "antenna.orientation",
                    Rule::Inconsistent {
                        reason: format!(
                            "{} orientations have {expected} components",
                            ocoords.unwrap_or_default()
                        ),
                    },
                );
            }
        }
    }
}

fn check_phased_array(c: &mut Checker) {
    if c.is_true("antenna.phased_array") {
        require_because(
            c,
            &[
                "phasedarray.file",
                "phasedarray.delayerr",
                "phasedarray.gainerr",
                "phasedarray.nrand",
            ],
            "antenna.phased_array is true",
        );
    }
}

fn check_beams(c: &mut Checker) {
    both_or_neither(c, "achrmbeam.identifier", "achrmbeam.file");
    both_or_neither(c, "chrmbeam.identifier", "chrmbeam.file");
    if c.is_set("chrmbeam.file") {
        require_because(c, &["chrmbeam.spec_interp"], "chrmbeam.file is set");
    }
}

fn check_foreground(c: &mut Checker) {
    let model = match c
        .str_at("fgparm.model")
        .and_then(|m| FgModel::from_str(m).ok())
    {
        Some(m) => m,
        None => return,
    };
    let condition = format!("fgparm.model is {model}");
    let files: Vec<String> = model
        .required_catalog_files()
        .iter()
        .map(|f| format!("catalog.{f}"))
        .collect();
    let files: Vec<&str> = files.iter().map(|f| f.as_str()).collect();
    require_because(c, &files, &condition);
    if model.is_healpix() {
        require_because(c, &["fgparm.nside"], &condition);
    }
}

fn check_eor(c: &mut Checker) {
    let lidz = c.is_true("eorparm.lidz");
    let cmfast = c.is_true("eorparm.21cmfast");
    at_most_one_of(
        c,
        "eorparm",
        &["eorparm.lidz", "eorparm.21cmfast"],
        &[lidz, cmfast],
    );

    let model = match c
        .str_at("eorparm.model")
        .and_then(|m| EorModelKind::from_str(m).ok())
    {
        Some(m) => m,
        None => return,
    };
    let condition = format!("eorparm.model is {model}");
    require_because(c, &["eorparm.nside"], &condition);
    if model == EorModelKind::HiCube {
        let modelfile = if cmfast {
            "eorparm.21cmfast_modelfile"
        } else {
            "eorparm.lidz_modelfile"
        };
        require_because(c, &[modelfile], &condition);
    }
}

fn check_processing(c: &mut Checker) {
    let paths = ["processing.n_bl_chunks", "processing.bl_chunk"];
    let set = [c.is_set(paths[0]), c.is_set(paths[1])];
    at_most_one_of(c, "processing", &paths, &set);
}

/// Parallel lists must have equal lengths. Null and absent lists count as
/// empty, so either all of a group is given or none of it is.
fn equal_lengths(c: &mut Checker, group: &str, paths: &[&str]) {
    let lengths: Option<Vec<usize>> = paths.iter().map(|p| c.len_at(p)).collect();
    // Lists of the wrong type have already been reported.
    let lengths = match lengths {
        Some(l) => l,
        None => return,
    };
    if lengths.windows(2).any(|w| w[0] != w[1]) {
        let observed = c.observe_group(paths);
        c.push(
            group,
            Rule::LengthMismatch {
                members: paths
                    .iter()
                    .map(|p| p.to_string())
                    .zip(lengths.into_iter())
                    .collect(),
            },
            observed,
        );
    }
}

fn check_parallel_lists(c: &mut Checker) {
    equal_lengths(c, "subband", &["subband.freq_center", "subband.bw_eff"]);
    equal_lengths(
        c,
        "beam_modification",
        &[
            "beam_modification.positions",
            "beam_modification.angular_radius",
            "beam_modification.snapshots",
            "beam_modification.factors",
        ],
    );

    // Positions are (az, alt) or (ra, dec); the second component is always a
    // latitude-like angle.
    let positions = c.seq_at("beam_modification.positions").unwrap_or_default();
    for (i, pos) in positions.iter().enumerate() {
        if let Some(lat) = pos.get(1).and_then(|v| v.as_f64()) {
            if !(-90.0..=90.0).contains(&lat) {
                c.push(
                    format!("beam_modification.positions[{i}]"),
                    Rule::OutOfRange {
                        bound: "within [-90, 90] in its second component".to_string(),
                    },
                    Observed::Value(compact(pos)),
                );
            }
        }
    }
    let radii = c.seq_at("beam_modification.angular_radius").unwrap_or_default();
    for (i, r) in radii.iter().enumerate() {
        if let Some(r) = r.as_f64().filter(|&r| r <= 0.0) {
            c.push(
                format!("beam_modification.angular_radius[{i}]"),
                Rule::OutOfRange {
                    bound: "> 0".to_string(),
                },
                Observed::Value(r.to_string()),
            );
        }
    }
}

fn check_reflectometry(c: &mut Checker) {
    if c.is_true("reflectometry.action") {
        require_because(
            c,
            &[
                "reflectometry.cable_length",
                "reflectometry.reflection_coefficient",
            ],
            "reflectometry.action is true",
        );
    }
}
