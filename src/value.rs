//! The dynamically-typed tree produced by parsing and accepted by unparsing.

use std::mem;
use std::slice;

use chrono::{DateTime, FixedOffset};

/// Key under which an element's text content is stored in its [`Map`].
pub(crate) const TEXT_KEY: &str = "#text";

/// A node of the document tree.
///
/// Scalar variants are chosen per-key by the coercion table; container
/// variants mirror the two grouping modes of the parser. [`Value::Cdata`] is
/// only meaningful on the unparse side, where it requests a `<![CDATA[...]]>`
/// section instead of escaped text; the parser reads CDATA sections back as
/// ordinary [`Value::Str`] text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An absent value. Stringifies to the empty string.
    Null,
    /// A boolean, `"true"` or `"false"` in the document.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// An IEEE-754 double.
    Float(f64),
    /// UTF-8 text, the default scalar.
    Str(String),
    /// A point in time. Offsets other than UTC are representable but are
    /// rejected when the tree is written back to XML.
    Timestamp(DateTime<FixedOffset>),
    /// Text emitted as a raw character-data block.
    Cdata(String),
    /// An insertion-ordered mapping of attribute/child names to values.
    Map(Map),
    /// An ordered sequence of heterogeneous items.
    Seq(Vec<Item>),
}

/// One entry of a [`Value::Seq`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A bare value: a repeated child or a `FORCE_LIST` wrap.
    Value(Value),
    /// A `(childName, value)` tuple produced in items mode.
    Named(String, Value),
}

/// An insertion-ordered mapping of `String` keys to [`Value`]s.
///
/// Entries live in a vector; elements carry few keys, so lookups are linear
/// scans. Replacing an existing key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    /// Creates an empty map.
    pub fn new() -> Self {
        Map {
            entries: Vec::new(),
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the map holds `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Returns a mutable reference to the value stored under `key`, if any.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find_map(|(k, v)| (k.as_str() == key).then_some(v))
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present. Replacement keeps the entry's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }
}

/// Iterator over the entries of a [`Map`] in insertion order.
#[derive(Debug, Clone)]
pub struct Iter<'a>(slice::Iter<'a, (String, Value)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Str(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Value {
        Value::Timestamp(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Value {
        Value::Map(value)
    }
}

impl From<Vec<Item>> for Value {
    fn from(value: Vec<Item>) -> Value {
        Value::Seq(value)
    }
}

#[cfg(feature = "serialize")]
mod serialize {
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::{Item, Map, Value};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Int(n) => serializer.serialize_i64(*n),
                Value::Float(x) => serializer.serialize_f64(*x),
                Value::Str(s) | Value::Cdata(s) => serializer.serialize_str(s),
                Value::Timestamp(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                Value::Map(map) => map.serialize(serializer),
                Value::Seq(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
            }
        }
    }

    impl Serialize for Item {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Item::Value(value) => value.serialize(serializer),
                Item::Named(name, value) => {
                    let mut seq = serializer.serialize_seq(Some(2))?;
                    seq.serialize_element(name)?;
                    seq.serialize_element(value)?;
                    seq.end()
                }
            }
        }
    }

    impl Serialize for Map {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut map = Map::new();
        map.insert("b", Value::Int(1));
        map.insert("a", Value::Int(2));
        map.insert("c", Value::Int(3));

        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut map = Map::new();
        map.insert("a", Value::Int(1));
        map.insert("b", Value::Int(2));

        assert_eq!(map.insert("a", Value::Int(3)), Some(Value::Int(1)));
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(
            entries,
            [
                ("a".to_owned(), Value::Int(3)),
                ("b".to_owned(), Value::Int(2)),
            ]
        );
    }

    #[test]
    fn get_mut_finds_entry() {
        let mut map = Map::from_iter([("x", Value::Int(1))]);
        if let Some(slot) = map.get_mut("x") {
            *slot = Value::Int(5);
        }
        assert_eq!(map.get("x"), Some(&Value::Int(5)));
        assert_eq!(map.get("y"), None);
    }
}
