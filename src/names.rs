//! Name-policy tables and per-parse name caches.

use std::collections::HashMap;
use std::str::{self, Utf8Error};

/// Element names whose presence switches the parent into items mode: the
/// child is appended to the parent's sequence as a `(name, value)` tuple
/// instead of being merged under a map key.
// Must stay sorted; membership is a binary search.
pub(crate) const FORCE_ITEMS: &[&str] = &[
    "bounds", "create", "delete", "modify", "node", "relation", "way",
];

/// Element names that present as a sequence even when occurring once.
// Must stay sorted; membership is a binary search.
pub(crate) const FORCE_LIST: &[&str] = &[
    "comment",
    "gpx_file",
    "member",
    "nd",
    "note",
    "preference",
    "tag",
    "trk",
    "trkpt",
    "trkseg",
];

pub(crate) fn in_set(set: &[&str], name: &str) -> bool {
    set.binary_search(&name).is_ok()
}

/// Returns the key under which the attribute `name` is stored in a parsed
/// map: the name prefixed with `@`.
pub fn xattr(name: &str) -> String {
    format!("@{name}")
}

/// Memoizes decoded name keys across one parse, so that repeated occurrences
/// of the same element or attribute name skip re-validation and formatting.
///
/// Scoped to a single parser; never shared across calls.
#[derive(Debug, Default)]
pub(crate) struct NameCache {
    entries: HashMap<Vec<u8>, String>,
}

impl NameCache {
    pub(crate) fn new() -> Self {
        NameCache::default()
    }

    /// The decoded element name for the raw local-name bytes.
    pub(crate) fn tag(&mut self, raw: &[u8]) -> Result<String, Utf8Error> {
        if !self.entries.contains_key(raw) {
            let name = str::from_utf8(raw)?.to_owned();
            self.entries.insert(raw.to_vec(), name);
        }
        Ok(self.entries[raw].clone())
    }

    /// The `@`-prefixed map key for the raw attribute local-name bytes.
    pub(crate) fn attr_key(&mut self, raw: &[u8]) -> Result<String, Utf8Error> {
        if !self.entries.contains_key(raw) {
            let key = xattr(str::from_utf8(raw)?);
            self.entries.insert(raw.to_vec(), key);
        }
        Ok(self.entries[raw].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_are_sorted() {
        let mut sorted = FORCE_ITEMS.to_vec();
        sorted.sort_unstable();
        assert_eq!(FORCE_ITEMS, sorted);

        let mut sorted = FORCE_LIST.to_vec();
        sorted.sort_unstable();
        assert_eq!(FORCE_LIST, sorted);
    }

    #[test]
    fn membership() {
        assert!(in_set(FORCE_ITEMS, "node"));
        assert!(in_set(FORCE_ITEMS, "bounds"));
        assert!(!in_set(FORCE_ITEMS, "tag"));

        assert!(in_set(FORCE_LIST, "tag"));
        assert!(in_set(FORCE_LIST, "trkseg"));
        assert!(!in_set(FORCE_LIST, "node"));
    }

    #[test]
    fn cache_formats_attr_keys() {
        let mut cache = NameCache::new();
        assert_eq!(cache.attr_key(b"lat").unwrap(), "@lat");
        // second lookup hits the cache
        assert_eq!(cache.attr_key(b"lat").unwrap(), "@lat");
    }

    #[test]
    fn cache_rejects_invalid_utf8() {
        let mut cache = NameCache::new();
        assert!(cache.tag(b"\xff\xfe").is_err());
    }
}
