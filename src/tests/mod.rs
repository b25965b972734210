// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests.

use serde_yaml::{Mapping, Value};

use crate::{
    load::{merge_mappings, Provenance},
    RawDocument,
};

/// A complete and valid set of HERA-19 parameters.
pub(crate) const HERA_PARAMETERS: &str = include_str!("../../tests/data/figparameters_HERA.yaml");

pub(crate) const HERA_PARAMETERS_NAME: &str = "figparameters_HERA.yaml";

/// A Tsys sweep over variants of [`HERA_PARAMETERS`].
pub(crate) const TSYS_SWEEP: &str = include_str!("../../tests/data/Tsys_sweep.txt");

/// The HERA parameters, with the fields in `overrides` (a YAML mapping)
/// merged over the top.
pub(crate) fn hera_with(overrides: &str) -> RawDocument {
    let mut base: Mapping = serde_yaml::from_str(HERA_PARAMETERS).unwrap();
    let overrides: Mapping = serde_yaml::from_str(overrides).unwrap();
    let mut overridden = vec![];
    merge_mappings(&mut base, overrides, "", &mut overridden);
    RawDocument::from_value(Value::Mapping(base), Provenance::new(HERA_PARAMETERS_NAME)).unwrap()
}

pub(crate) fn hera() -> RawDocument {
    hera_with("{}")
}

/// The HERA parameters with a key removed entirely (rather than set to null).
pub(crate) fn hera_without(section: &str, key: &str) -> RawDocument {
    let mut value = hera().to_value();
    value[section].as_mapping_mut().unwrap().remove(key);
    RawDocument::from_value(value, Provenance::new(HERA_PARAMETERS_NAME)).unwrap()
}
