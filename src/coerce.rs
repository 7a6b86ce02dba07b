//! Per-key scalar coercion.
//!
//! The OSM/GPX vocabulary is closed enough that value types can be decided
//! by the attribute or element name alone. Keys absent from the table stay
//! plain strings.

use memchr::memchr;

use crate::datetime::DateParsers;
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
enum Scalarizer {
    Int,
    Float,
    Bool,
    Date,
    /// Integer unless the raw text carries a dot.
    Version,
}

// Must stay sorted by key; looked up by binary search.
const COERCIONS: &[(&str, Scalarizer)] = &[
    ("changes_count", Scalarizer::Int),
    ("changeset", Scalarizer::Int),
    ("closed_at", Scalarizer::Date),
    ("comments_count", Scalarizer::Int),
    ("created_at", Scalarizer::Date),
    ("date", Scalarizer::Date),
    ("ele", Scalarizer::Float),
    ("id", Scalarizer::Int),
    ("lat", Scalarizer::Float),
    ("lon", Scalarizer::Float),
    ("max_lat", Scalarizer::Float),
    ("max_lon", Scalarizer::Float),
    ("min_lat", Scalarizer::Float),
    ("min_lon", Scalarizer::Float),
    ("num_changes", Scalarizer::Int),
    ("open", Scalarizer::Bool),
    ("pending", Scalarizer::Bool),
    ("ref", Scalarizer::Int),
    ("time", Scalarizer::Date),
    ("timestamp", Scalarizer::Date),
    ("uid", Scalarizer::Int),
    ("updated_at", Scalarizer::Date),
    ("version", Scalarizer::Version),
    ("visible", Scalarizer::Bool),
];

/// Converts `raw` to the scalar declared for `key`, or `None` when the raw
/// text cannot be converted. Unknown keys pass through as [`Value::Str`].
pub(crate) fn coerce(key: &str, raw: &str, dates: &DateParsers) -> Option<Value> {
    let scalarizer = match COERCIONS.binary_search_by(|&(k, _)| k.cmp(key)) {
        Ok(index) => COERCIONS[index].1,
        Err(_) => return Some(Value::Str(raw.to_owned())),
    };
    match scalarizer {
        Scalarizer::Int => coerce_int(raw),
        Scalarizer::Float => coerce_float(raw),
        Scalarizer::Bool => match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        Scalarizer::Date => {
            let parse = if memchr(b' ', raw.as_bytes()).is_some() {
                dates.legacy
            } else {
                dates.iso
            };
            parse(raw).map(Value::Timestamp)
        }
        Scalarizer::Version => {
            if memchr(b'.', raw.as_bytes()).is_some() {
                coerce_float(raw)
            } else {
                coerce_int(raw)
            }
        }
    }
}

fn coerce_int(raw: &str) -> Option<Value> {
    raw.parse().ok().map(Value::Int)
}

fn coerce_float(raw: &str) -> Option<Value> {
    raw.parse().ok().map(Value::Float)
}
