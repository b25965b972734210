// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use indoc::indoc;

use super::*;
use crate::{
    params::{Region, SkyPosition},
    tests::{hera, hera_with, HERA_PARAMETERS_NAME, TSYS_SWEEP},
};

fn tsys_table() -> SweepTable {
    SweepTable::from_text(TSYS_SWEEP, "Tsys_sweep.txt").unwrap()
}

#[test]
fn test_text_table() {
    let table = tsys_table();
    assert_eq!(table.label, "Tsys");
    assert_eq!(
        table.rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        ["85.0", "86.0", "87.0", "88.0", "89.0", "90.0"]
    );
    assert_eq!(
        table.rows[1].description,
        "100 ps jitter, no dipole, ground plane 0.3 m, array pattern"
    );
    // Only the rows with region clauses have overrides.
    assert!(table.rows[..4].iter().all(|r| r.overrides.is_empty()));
    assert!(table.rows[4].overrides.contains_key("beam_modification"));
    assert!(table.rows[5].overrides.contains_key("beam_modification"));
}

#[test]
fn test_text_table_without_header() {
    let table = SweepTable::from_text("\n# comment\n10  a\n20  b\n", "t.txt").unwrap();
    assert_eq!(table.label, DEFAULT_SWEEP_LABEL);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].description, "b");

    let table = SweepTable::from_text("Nchan  what\n128\n", "t.txt").unwrap();
    assert_eq!(table.label, "Nchan");
    assert_eq!(table.rows[0].description, "");
}

#[test]
fn test_bad_text_tables() {
    let result = SweepTable::from_text("Tsys  Description\n85.0  a\n85  b\n", "t.txt");
    match result {
        Err(SweepError::DuplicateId {
            line, first_line, ..
        }) => {
            assert_eq!(line, 3);
            assert_eq!(first_line, 2);
        }
        r => panic!("unexpected result {r:?}"),
    }

    let result = SweepTable::from_text("Tsys  Description\n85.0  a\nhot  b\n", "t.txt");
    assert!(matches!(
        result,
        Err(SweepError::NonNumericId { line: 3, .. })
    ));

    let result = SweepTable::from_text("# nothing here\nTsys  Description\n", "t.txt");
    assert!(matches!(result, Err(SweepError::Empty(_))));
}

#[test]
fn test_region_clause() {
    let table = tsys_table();
    let bm = &table.rows[4].overrides["beam_modification"];
    let expected: Value = serde_yaml::from_str(indoc! {"
        positions: [[265.0, -20.0], [0.0, 37.5]]
        angular_radius: [20.0, 12.5]
        snapshots: [0, 1]
        factors: [2.0, 2.0]
    "})
    .unwrap();
    assert_eq!(bm, &expected);

    let bm = &table.rows[5].overrides["beam_modification"];
    assert_eq!(bm["factors"], Value::from(vec![0.5]));
}

#[test]
fn test_bad_region_clause() {
    let result = SweepTable::from_text(
        "1  regions at (265,-20) with angular radius (twenty) on snapshots (0) with factors (2)",
        "t.txt",
    );
    match result {
        Err(SweepError::BadRegionClause { line, reason, .. }) => {
            assert_eq!(line, 1);
            assert!(reason.contains("twenty"), "{reason}");
        }
        r => panic!("unexpected result {r:?}"),
    }

    // The prefix is there, but the rest isn't.
    let result = SweepTable::from_text("1  regions at (265,-20) somewhere", "t.txt");
    assert!(matches!(result, Err(SweepError::BadRegionClause { .. })));

    let result = SweepTable::from_text(
        "1  regions at (265,-20,3) with angular radius (2) on snapshots (0) with factors (2)",
        "t.txt",
    );
    assert!(matches!(result, Err(SweepError::BadRegionClause { .. })));
}

#[test]
fn test_yaml_table() {
    let table = SweepTable::from_yaml(
        indoc! {"
            label: Tsys
            rows:
              - id: 85.0
                description: baseline
              - id: '95'
                description: regions at (10, 20) with angular radius (5) on snapshots (3) with factors (0.5)
                overrides:
                  telescope: {Tsys: 95.0}
              - id: 100
                overrides:
                  beam_modification: {positions: null}
                description: regions at (10, 20) with angular radius (5) on snapshots (3) with factors (0.5)
        "},
        "sweep.yaml",
    )
    .unwrap();
    assert_eq!(table.label, "Tsys");
    assert_eq!(table.rows[0].id, "85.0");
    assert_eq!(table.rows[1].id, "95");
    assert_eq!(table.rows[2].id, "100");
    assert_eq!(
        table.rows[1].overrides["telescope"]["Tsys"],
        Value::from(95.0)
    );
    assert!(table.rows[1].overrides.contains_key("beam_modification"));
    // Explicit overrides win over the description.
    assert_eq!(
        table.rows[2].overrides["beam_modification"]["positions"],
        Value::Null
    );

    let result = SweepTable::from_yaml("rows: [{id: [1]}]", "sweep.yaml");
    assert!(matches!(result, Err(SweepError::NonNumericId { .. })));
    let result = SweepTable::from_yaml("rows: [{id: 1, colour: red}]", "sweep.yaml");
    assert!(matches!(result, Err(SweepError::BadTable { .. })));
    let result = SweepTable::from_yaml("rows: [", "sweep.yaml");
    assert!(matches!(result, Err(SweepError::Parse(_))));
}

#[test]
fn test_apply_overrides() {
    let base: Mapping = serde_yaml::from_str("a: {b: 1, c: [1, 2]}\nd: 3").unwrap();
    let fragment: Mapping = serde_yaml::from_str("a: {c: [3]}\ne: {f: null}").unwrap();
    let (merged, overridden) = apply_overrides(&base, &fragment);
    let expected: Value = serde_yaml::from_str("a: {b: 1, c: [3]}\nd: 3\ne: {f: null}").unwrap();
    assert_eq!(merged, expected);
    assert_eq!(overridden, ["a.c", "e.f"]);
}

#[test]
fn test_tsys_sweep() {
    let outcomes = resolve_sweep(&hera(), &tsys_table());
    assert_eq!(outcomes.len(), 6);

    for (outcome, id) in outcomes
        .iter()
        .zip(["85.0", "86.0", "87.0", "88.0", "89.0", "90.0"])
    {
        assert_eq!(outcome.tag.label, "Tsys");
        assert_eq!(outcome.tag.id, id);
        let config = outcome
            .result
            .as_ref()
            .unwrap_or_else(|e| panic!("{}: {e}", outcome.tag));
        let provenance = config.provenance();
        assert_eq!(provenance.source, HERA_PARAMETERS_NAME);
        assert_eq!(provenance.row.as_ref(), Some(&outcome.tag));
    }

    let row_89 = outcomes[4].result.as_ref().unwrap();
    assert_eq!(
        row_89.regions(),
        &[
            Region {
                position: SkyPosition::AltAz {
                    az: 265.0,
                    alt: -20.0
                },
                angular_radius: 20.0,
                snapshot: 0,
                factor: 2.0,
            },
            Region {
                position: SkyPosition::AltAz { az: 0.0, alt: 37.5 },
                angular_radius: 12.5,
                snapshot: 1,
                factor: 2.0,
            },
        ]
    );
    assert_eq!(
        row_89.provenance().overridden,
        [
            "beam_modification.positions",
            "beam_modification.angular_radius",
            "beam_modification.snapshots",
            "beam_modification.factors",
        ]
    );
    assert!(outcomes[0].result.as_ref().unwrap().regions().is_empty());
    assert!(outcomes[0]
        .result
        .as_ref()
        .unwrap()
        .provenance()
        .overridden
        .is_empty());
}

#[test]
fn test_row_failures_are_isolated() {
    let table = SweepTable::from_yaml(
        indoc! {"
            label: Tsys
            rows:
              - id: 85
              - id: 86
                overrides:
                  obsparm: {t_obs: 3600.0}
              - id: 87
                overrides:
                  obsparm: {t_obs: 3600.0, n_acc: null, t_acc: 7.0}
              - id: 88
                overrides:
                  telescope: {Tsys: 88.0}
        "},
        "sweep.yaml",
    )
    .unwrap();
    let outcomes = resolve_sweep(&hera(), &table);

    assert!(outcomes[0].result.is_ok());
    match &outcomes[1].result {
        Err(RunConfigError::Validation(e)) => {
            assert_eq!(e.violations.len(), 1);
            assert_eq!(e.violations.first().path, "obsparm");
        }
        r => panic!("unexpected result {r:?}"),
    }
    assert!(matches!(
        outcomes[2].result,
        Err(RunConfigError::Derivation(_))
    ));
    let config = outcomes[3].result.as_ref().unwrap();
    assert_abs_diff_eq!(config.telescope().tsys, 88.0);
    assert_eq!(config.provenance().overridden, ["telescope.Tsys"]);
}

#[test]
fn test_row_warnings_stay_with_their_row() {
    let table = SweepTable::from_yaml(
        indoc! {"
            label: Tsys
            rows:
              - id: 50
              - id: 60
                overrides:
                  antenna: {shape: 'dipole', size: 2.0}
              - id: 70
                overrides:
                  obsparm: {t_obs: 3600.0}
        "},
        "sweep.yaml",
    )
    .unwrap();
    let outcomes = resolve_sweep(&hera(), &table);
    assert!(outcomes[0].warnings.is_empty());
    assert_eq!(outcomes[1].warnings.len(), 1);
    assert!(outcomes[1].warnings[0].contains("ignoring antenna.shape and antenna.size"));
    assert!(outcomes[2].result.is_err());
    assert!(outcomes[2].warnings.is_empty());

    // Resolving again gives the same warnings; nothing is carried between runs.
    let again = resolve_sweep(&hera(), &table);
    assert_eq!(again[1].warnings, outcomes[1].warnings);
}

#[test]
fn test_sweep_regions_use_base_coords() {
    let base = hera_with("beam_modification: {coords: 'radec'}");
    let table = SweepTable::from_text(
        "1  regions at (10, -30) with angular radius (5) on snapshots (2) with factors (0.5)",
        "t.txt",
    )
    .unwrap();
    let outcomes = resolve_sweep(&base, &table);
    let config = outcomes[0].result.as_ref().unwrap();
    assert_eq!(
        config.regions()[0].position,
        SkyPosition::RaDec {
            ra: 10.0,
            dec: -30.0
        }
    );
}
