//! Deep merge of raw layers
//!
//! Mappings are merged key by key, recursively. Everything else, sequences
//! and nulls included, is replaced wholesale by the later layer.

use crate::layer::RawLayer;
use serde_yaml::Value;

/// Merge `layer` into `base` in place
pub fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(a), Value::Mapping(b)) => {
            for (k, v) in b {
                if let Some(existing) = a.get_mut(&k) {
                    merge_values(existing, v);
                } else {
                    a.insert(k, v);
                }
            }
        }
        (a, b) => *a = b,
    }
}

/// Fold layers left to right into one; later layers win
pub fn merge_layers<I>(layers: I) -> RawLayer
where
    I: IntoIterator<Item = RawLayer>,
{
    let mut merged = RawLayer::empty().into_value();
    for layer in layers {
        merge_values(&mut merged, layer.into_value());
    }

    match merged {
        Value::Mapping(mapping) => RawLayer::from_mapping(mapping),
        // Layers are always mappings, so the accumulator stays one
        _ => RawLayer::empty(),
    }
}
