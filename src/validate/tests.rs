// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use chrono::NaiveDate;
use indoc::indoc;

use super::*;
use crate::tests::{hera, hera_with, hera_without};

/// Validate a document that must fail, and get its violations.
fn violations(doc: RawDocument) -> SchemaValidationError {
    match validate(doc) {
        Ok(_) => panic!("expected validation to fail"),
        Err(e) => e,
    }
}

#[test]
fn test_hera_parameters_are_valid() {
    let validated = validate(hera()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(validated.provenance().source, "figparameters_HERA.yaml");
    assert_eq!(validated.args().obsparm.n_acc, Some(80));
    assert_eq!(validated.args().obsparm.t_obs, None);
}

#[test]
fn test_array_file_and_layout_both_set() {
    let e = violations(hera_with(indoc! {"
        array:
            file: 'layouts/hera_19.txt'
    "}));
    assert_eq!(e.violations.len(), 1);
    let v = e.at("array").next().unwrap();
    assert_eq!(
        v.rule,
        Rule::ExactlyOneOf {
            members: vec!["array.file".to_string(), "array.layout".to_string()]
        }
    );
    assert_eq!(
        v.observed,
        Observed::Value("{file: 'layouts/hera_19.txt', layout: 'HERA-19'}".to_string())
    );
}

#[test]
fn test_array_file_and_layout_neither_set() {
    let e = violations(hera_with("array: {layout: null}"));
    assert!(matches!(
        e.at("array").next().unwrap().rule,
        Rule::ExactlyOneOf { .. }
    ));
}

#[test]
fn test_phased_array_needs_all_fields() {
    let e = violations(hera_with(indoc! {"
        antenna:
            phased_array: true
        phasedarray:
            file: 'phasedarray_layout.txt'
            delayerr: 0.1
            gainerr: 0.0
            nrand: null
    "}));
    assert_eq!(e.violations.len(), 1);
    let v = e.at("phasedarray.nrand").next().unwrap();
    assert_eq!(
        v.rule,
        Rule::ConditionalRequirement {
            condition: "antenna.phased_array is true".to_string()
        }
    );
    assert_eq!(v.observed, Observed::Null);
}

#[test]
fn test_phased_array_false_needs_nothing() {
    assert!(validate(hera_with("antenna: {phased_array: false}")).is_ok());
}

#[test]
fn test_all_three_accumulation_fields_is_rejected() {
    // 80 * 1080 s = 86400 s, so these are consistent, but still over-specified.
    let e = violations(hera_with("obsparm: {t_obs: 86400.0}"));
    assert_eq!(e.violations.len(), 1);
    let v = e.at("obsparm").next().unwrap();
    assert_eq!(
        v.rule,
        Rule::ExactlyTwoOfThree {
            members: vec![
                "obsparm.t_obs".to_string(),
                "obsparm.n_acc".to_string(),
                "obsparm.t_acc".to_string()
            ]
        }
    );
}

#[test]
fn test_one_accumulation_field_is_rejected() {
    let e = violations(hera_with("obsparm: {n_acc: null}"));
    assert!(matches!(
        e.at("obsparm").next().unwrap().rule,
        Rule::ExactlyTwoOfThree { .. }
    ));
}

#[test]
fn test_accumulation_fields_accept_units() {
    let doc = hera_with("obsparm: {t_acc: '18min'}");
    assert!(validate(doc).is_ok());

    let e = violations(hera_with("obsparm: {t_acc: 'eventually'}"));
    assert!(matches!(
        e.at("obsparm.t_acc").next().unwrap().rule,
        Rule::WrongType { .. }
    ));

    let e = violations(hera_with("obsparm: {t_acc: 0}"));
    assert!(matches!(
        e.at("obsparm.t_acc").next().unwrap().rule,
        Rule::OutOfRange { .. }
    ));
}

#[test]
fn test_region_length_mismatch_names_all_lists() {
    let e = violations(hera_with(indoc! {"
        beam_modification:
            positions: [[265.0, -20.0], [0.0, 37.5]]
            angular_radius: [20.0, 12.5]
            snapshots: [0]
            factors: [2.0, 2.0]
    "}));
    assert_eq!(e.violations.len(), 1);
    let v = e.at("beam_modification").next().unwrap();
    assert_eq!(
        v.rule,
        Rule::LengthMismatch {
            members: vec![
                ("beam_modification.positions".to_string(), 2),
                ("beam_modification.angular_radius".to_string(), 2),
                ("beam_modification.snapshots".to_string(), 1),
                ("beam_modification.factors".to_string(), 2),
            ]
        }
    );
}

#[test]
fn test_region_lists_of_equal_length_are_valid() {
    let doc = hera_with(indoc! {"
        beam_modification:
            positions: [[265.0, -20.0], [0.0, 37.5]]
            angular_radius: [20.0, 12.5]
            snapshots: [0, 1]
            factors: [2.0, 2.0]
    "});
    assert!(validate(doc).is_ok());
}

#[test]
fn test_region_values_are_checked() {
    let e = violations(hera_with(indoc! {"
        beam_modification:
            positions: [[265.0, -95.0]]
            angular_radius: [0.0]
            snapshots: [0]
            factors: [2.0]
    "}));
    assert_eq!(e.violations.len(), 2);
    assert!(e.at("beam_modification.positions[0]").next().is_some());
    assert!(e.at("beam_modification.angular_radius[0]").next().is_some());
}

#[test]
fn test_subband_length_mismatch() {
    let e = violations(hera_with("subband: {bw_eff: [10000000.0]}"));
    let v = e.at("subband").next().unwrap();
    assert!(matches!(&v.rule, Rule::LengthMismatch { members } if members.len() == 2));
}

#[test]
fn test_violations_accumulate() {
    let e = violations(hera_with(indoc! {"
        telescope:
            colour: 'red'
        obsparm:
            nchan: 0
        fgparm:
            model: 'gsm'
    "}));
    assert_eq!(e.violations.len(), 3, "{e}");
    assert_eq!(e.at("telescope.colour").next().unwrap().rule, Rule::UnknownKey);
    assert!(matches!(
        e.at("obsparm.nchan").next().unwrap().rule,
        Rule::OutOfRange { .. }
    ));
    match &e.at("fgparm.model").next().unwrap().rule {
        Rule::NotInSet { allowed } => {
            assert!(allowed.contains(&"asm"));
            assert!(allowed.contains(&"HI_cube"));
        }
        r => panic!("unexpected rule {r:?}"),
    }

    let message = e.to_string();
    assert!(message.starts_with("figparameters_HERA.yaml failed validation with 3 violations:"));
    assert!(message.contains("telescope.colour: unknown key (observed: 'red')"));
}

#[test]
fn test_unknown_section() {
    let e = violations(hera_with("obsparms: {}"));
    let v = e.at("obsparms").next().unwrap();
    assert_eq!(v.rule, Rule::UnknownKey);
    assert_eq!(v.observed, Observed::Value("{}".to_string()));
}

#[test]
fn test_required_field_absent_or_null() {
    let e = violations(hera_without("telescope", "Tsys"));
    let v = e.at("telescope.Tsys").next().unwrap();
    assert_eq!(v.rule, Rule::Required);
    assert_eq!(v.observed, Observed::Absent);

    let e = violations(hera_with("telescope: {Tsys: null}"));
    let v = e.at("telescope.Tsys").next().unwrap();
    assert_eq!(v.rule, Rule::Required);
    assert_eq!(v.observed, Observed::Null);
}

#[test]
fn test_drift_init_incomplete_pair() {
    let e = violations(hera_with("pointing: {drift_init: {az: null}}"));
    assert_eq!(e.violations.len(), 1, "{e}");
    assert_eq!(
        e.at("pointing.drift_init.az").next().unwrap().rule,
        Rule::IncompletePair {
            partner: "pointing.drift_init.alt".to_string()
        }
    );
}

#[test]
fn test_drift_init_two_directions() {
    let e = violations(hera_with("pointing: {drift_init: {ha: 0.0, dec: -30.7}}"));
    assert!(matches!(
        e.at("pointing.drift_init").next().unwrap().rule,
        Rule::ExactlyOneOf { .. }
    ));
}

#[test]
fn test_pointing_must_match_obs_mode() {
    let e = violations(hera_with("obsparm: {obs_mode: 'track'}"));
    assert!(matches!(
        e.at("obsparm.obs_mode").next().unwrap().rule,
        Rule::Inconsistent { .. }
    ));

    // Tracking with the right mode is fine.
    let doc = hera_with(indoc! {"
        obsparm:
            obs_mode: 'track'
        pointing:
            drift_init: null
            track_init:
                ra: 0.0
                dec: -30.7
    "});
    assert!(validate(doc).is_ok());
}

#[test]
fn test_two_pointings() {
    let e = violations(hera_with("pointing: {file: 'pointings.txt'}"));
    assert!(matches!(
        e.at("pointing").next().unwrap().rule,
        Rule::ExactlyOneOf { .. }
    ));
}

#[test]
fn test_dns_needs_pointing_file() {
    let e = violations(hera_with(indoc! {"
        obsparm:
            obs_mode: 'dns'
        pointing:
            drift_init: null
    "}));
    assert!(e.at("pointing.file").next().is_some());
    assert!(e.at("pointing").next().is_some());
}

#[test]
fn test_snapshot_selections_are_exclusive() {
    let e = violations(hera_with("snapshot: {pick: [0, 2, 4]}"));
    assert!(matches!(
        e.at("snapshot").next().unwrap().rule,
        Rule::AtMostOneOf { .. }
    ));

    let e = violations(hera_with("snapshot: {all: false, range: [5, 2]}"));
    assert!(matches!(
        e.at("snapshot.range").next().unwrap().rule,
        Rule::Inconsistent { .. }
    ));

    let e = violations(hera_with("snapshot: {all: false, avg_drifts: true}"));
    assert!(matches!(
        e.at("obsparm.obs_mode").next().unwrap().rule,
        Rule::ConditionalRequirement { .. }
    ));
}

#[test]
fn test_selections_must_not_be_empty() {
    let e = violations(hera_with("snapshot: {all: false, pick: []}"));
    assert_eq!(e.violations.len(), 1, "{e}");
    assert!(matches!(
        e.at("snapshot.pick").next().unwrap().rule,
        Rule::WrongType { .. }
    ));

    let e = violations(hera_with("processing: {bl_chunk: []}"));
    assert_eq!(e.violations.len(), 1, "{e}");
    assert!(matches!(
        e.at("processing.bl_chunk").next().unwrap().rule,
        Rule::WrongType { .. }
    ));

    // Region lists may be empty; they mean the same as null.
    assert!(validate(hera_with(indoc! {"
        beam_modification:
            positions: []
            angular_radius: []
            snapshots: []
            factors: []
    "}))
    .is_ok());
}

#[test]
fn test_healpix_models_need_nside() {
    let e = violations(hera_with("fgparm: {nside: null}"));
    assert_eq!(
        e.at("fgparm.nside").next().unwrap().rule,
        Rule::ConditionalRequirement {
            condition: "fgparm.model is asm".to_string()
        }
    );

    let e = violations(hera_with("fgparm: {nside: 48}"));
    assert!(matches!(
        e.at("fgparm.nside").next().unwrap().rule,
        Rule::OutOfRange { .. }
    ));

    // Powers of two that don't fit in a u32 are caught against the field,
    // not when the document is deserialised.
    for nside in ["4294967296", "8589934592"] {
        let e = violations(hera_with(&format!("fgparm: {{nside: {nside}}}")));
        assert_eq!(e.violations.len(), 1, "{e}");
        assert_eq!(
            e.at("fgparm.nside").next().unwrap().rule,
            Rule::OutOfRange {
                bound: "a power of two <= 2147483648".to_string()
            }
        );
    }
    assert!(validate(hera_with("fgparm: {nside: 2147483648}")).is_ok());
}

#[test]
fn test_catalog_files_needed_by_model() {
    let e = violations(hera_with("fgparm: {model: 'gleam'}"));
    assert!(e.at("catalog.GLEAM_file").next().is_some());
}

#[test]
fn test_orientation_components() {
    let e = violations(hera_with("antenna: {ocoords: 'dircos'}"));
    assert!(matches!(
        e.at("antenna.orientation").next().unwrap().rule,
        Rule::Inconsistent { .. }
    ));

    let doc = hera_with("antenna: {ocoords: 'dircos', orientation: [0.0, 0.0, 1.0]}");
    assert!(validate(doc).is_ok());
}

#[test]
fn test_dipole_size_is_fixed_by_telescope() {
    // HERA fixes its element, so no size is needed.
    assert!(validate(hera_with("antenna: {size: null}")).is_ok());

    for id in ["custom", "paper_dipole"] {
        let e = violations(hera_with(&format!(
            "telescope: {{id: '{id}'}}\nantenna: {{shape: 'dipole', size: null}}"
        )));
        assert!(matches!(
            e.at("antenna.size").next().unwrap().rule,
            Rule::ConditionalRequirement { .. }
        ));
    }
}

#[test]
fn test_eor_model_file() {
    let e = violations(hera_with("eorparm: {model: 'HI_cube', nside: 64, lidz: true}"));
    assert_eq!(e.violations.len(), 1, "{e}");
    assert!(e.at("eorparm.lidz_modelfile").next().is_some());

    let e = violations(hera_with(
        "eorparm: {model: 'HI_cube', nside: 64, lidz: true, 21cmfast: true}",
    ));
    assert!(matches!(
        e.at("eorparm").next().unwrap().rule,
        Rule::AtMostOneOf { .. }
    ));
}

#[test]
fn test_beam_identifier_and_file_are_paired() {
    let e = violations(hera_with("chrmbeam: {identifier: 'HERA_CST'}"));
    assert_eq!(
        e.at("chrmbeam.file").next().unwrap().rule,
        Rule::IncompletePair {
            partner: "chrmbeam.identifier".to_string()
        }
    );
}

#[test]
fn test_plot_action_is_required() {
    let e = violations(hera_with(indoc! {"
        plot:
            '4':
                cmap: 'jet'
            '5':
                action: 'yes'
    "}));
    assert_eq!(e.violations.len(), 2);
    let v = e.at("plot.4.action").next().unwrap();
    assert_eq!(v.rule, Rule::Required);
    assert_eq!(v.observed, Observed::Absent);
    assert!(matches!(
        e.at("plot.5.action").next().unwrap().rule,
        Rule::WrongType { .. }
    ));
}

#[test]
fn test_obs_dates() {
    let expected = NaiveDate::from_ymd_opt(2015, 11, 23)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(parse_obs_date("2015/11/23"), Some(expected));
    assert_eq!(parse_obs_date("2015-11-23"), Some(expected));
    assert_eq!(
        parse_obs_date("2015-11-23T06:30:00"),
        expected.checked_add_signed(chrono::Duration::minutes(390))
    );
    assert_eq!(parse_obs_date("23rd November"), None);

    let e = violations(hera_with("obsparm: {obs_date: 'yesterday'}"));
    assert!(e.at("obsparm.obs_date").next().is_some());
}

#[test]
fn test_reflectometry_needs_cable() {
    let e = violations(hera_with("reflectometry: {action: true, cable_length: 150.0}"));
    assert_eq!(e.violations.len(), 1);
    assert!(e.at("reflectometry.reflection_coefficient").next().is_some());
}
