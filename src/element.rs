//! Typed element identifiers.
//!
//! OSM elements are addressed by a `(type, id)` pair. This module packs the
//! pair into a single 64-bit integer so element references can be keyed,
//! sorted and stored compactly, and parses the versioned reference strings
//! (`"123v4"`) that changeset payloads carry.

use std::fmt;

use crate::error::{Error, Result};

// Packed layout: [2 reserved][2 type][1 sign][3 reserved][56 id]
const SIGN_MASK: u64 = 1 << 59;
const ID_MASK: u64 = (1 << 56) - 1;
const TYPE_SHIFT: u32 = 60;

/// The kind of an OSM element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A single point.
    Node,
    /// An ordered list of node references.
    Way,
    /// A group of members with roles.
    Relation,
}

impl ElementType {
    /// Classifies an element type string by its first byte; `"n"`, `"node"`,
    /// `"w"`, `"way"`, `"r"`, `"relation"` all work.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.as_bytes().first() {
            Some(b'n') => Ok(ElementType::Node),
            Some(b'w') => Ok(ElementType::Way),
            Some(b'r') => Ok(ElementType::Relation),
            _ => Err(Error::UnknownElementType(name.to_owned())),
        }
    }

    /// The canonical element type name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementType::Node => "node",
            ElementType::Way => "way",
            ElementType::Relation => "relation",
        }
    }

    const fn type_num(self) -> u64 {
        match self {
            ElementType::Node => 0,
            ElementType::Way => 1,
            ElementType::Relation => 2,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packs an element type and id into a typed id.
///
/// The id's magnitude must fit 56 bits; the sign is recorded separately so
/// negative (locally allocated) ids survive the round trip.
pub fn typed_id(element_type: ElementType, id: i64) -> Result<u64> {
    let magnitude = id.unsigned_abs();
    if magnitude >= 1 << 56 {
        return Err(Error::ElementIdOverflow(id));
    }
    let mut packed = magnitude;
    if id < 0 {
        packed |= SIGN_MASK;
    }
    Ok(packed | (element_type.type_num() << TYPE_SHIFT))
}

/// Splits a typed id back into its element type and id.
pub fn split_typed_id(packed: u64) -> Result<(ElementType, i64)> {
    let mut id = (packed & ID_MASK) as i64;
    if packed & SIGN_MASK != 0 {
        id = -id;
    }
    let element_type = match (packed >> TYPE_SHIFT) & 0b11 {
        0 => ElementType::Node,
        1 => ElementType::Way,
        2 => ElementType::Relation,
        n => return Err(Error::UnknownElementType(n.to_string())),
    };
    Ok((element_type, id))
}

/// Parses a versioned element reference of the form `"IDvVERSION"` into a
/// `(typed id, version)` pair. The id must be non-zero and the version
/// positive.
pub fn versioned_typed_id(element_type: ElementType, reference: &str) -> Result<(u64, i64)> {
    let invalid = || Error::BadElementRef(reference.to_owned());
    // two 64-bit decimals, a sign and the separator
    if reference.is_empty() || reference.len() > 20 * 2 + 2 {
        return Err(invalid());
    }

    let (id, version) = reference.split_once('v').ok_or_else(invalid)?;
    let id: i64 = id.parse().map_err(|_| invalid())?;
    let version: i64 = version.parse().map_err(|_| invalid())?;
    if id == 0 || version <= 0 {
        return Err(invalid());
    }

    Ok((typed_id(element_type, id)?, version))
}
