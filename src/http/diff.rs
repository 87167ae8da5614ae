//! Structural diff of two YAML mappings.

use serde_yaml::{Mapping, Value};

/// Keep the entries of `actual` that are missing from `defaults` or differ
/// from it. Nested mappings are compared key by key and kept only when
/// something inside them differs; any other value (scalars, sequences) is
/// compared as a whole.
pub fn diff_config(defaults: &Mapping, actual: &Mapping) -> Mapping {
    let mut output = Mapping::new();

    for (key, value) in actual {
        match (defaults.get(key), value) {
            (None, _) => {
                output.insert(key.clone(), value.clone());
            }
            (Some(Value::Mapping(default_map)), Value::Mapping(actual_map)) => {
                let nested = diff_config(default_map, actual_map);
                if !nested.is_empty() {
                    output.insert(key.clone(), Value::Mapping(nested));
                }
            }
            (Some(default_value), _) if default_value != value => {
                output.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }

    output
}
