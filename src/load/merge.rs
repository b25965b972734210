// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde_yaml::{Mapping, Value};

use super::{compact, key_to_string};

/// Merge `overrides` into `base`. Where the override holds a mapping, it is
/// merged key-by-key into the base (replacing whatever non-mapping value the
/// base had there); any other override value replaces the base value outright
/// (lists are never merged element-wise). The dotted path of every replaced or
/// added leaf is pushed onto `overridden`; an empty mapping that lands where
/// there was no mapping counts as a leaf.
pub fn merge_mappings(
    base: &mut Mapping,
    overrides: Mapping,
    prefix: &str,
    overridden: &mut Vec<String>,
) {
    for (key, value) in overrides {
        let key_str = key_to_string(&key).unwrap_or_else(|| compact(&key));
        let path = if prefix.is_empty() {
            key_str
        } else {
            format!("{prefix}.{key_str}")
        };

        match value {
            Value::Mapping(override_inner) => {
                if !matches!(base.get(&key), Some(Value::Mapping(_))) {
                    base.insert(key.clone(), Value::Mapping(Mapping::new()));
                    // An empty mapping has no leaves, but it still replaced
                    // (or added) something.
                    if override_inner.is_empty() {
                        overridden.push(path.clone());
                    }
                }
                if let Some(Value::Mapping(base_inner)) = base.get_mut(&key) {
                    merge_mappings(base_inner, override_inner, &path, overridden);
                }
            }

            value => {
                base.insert(key, value);
                overridden.push(path);
            }
        }
    }
}
