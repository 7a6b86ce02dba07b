//! Bidirectional XML ↔ dictionary conversion for the OpenStreetMap / GPX
//! vocabulary.
//!
//! ## Description
//!
//! - [`parse`]: turns an in-memory XML document into a nested, dynamically
//!   typed [`Value`] tree. Scalars are typed per-key (`id` is an integer,
//!   `lat` a float, `timestamp` a timestamp, ...), repeated children upgrade
//!   to sequences, and a fixed set of element names is grouped as ordered
//!   `(name, value)` tuples so payloads like changeset diffs keep their
//!   document order.
//! - [`to_string`] / [`to_bytes`]: write such a tree back to XML, preserving
//!   attribute order, text, CDATA blocks and timestamp formatting.
//!
//! ## Examples
//!
//! ### Parsing
//!
//! ```
//! use osmdict::{parse, Item, Map, Value};
//!
//! let tree = parse(br#"<changeset open="true"><tag k="comment" v="hi"/></changeset>"#).unwrap();
//!
//! let expected = Value::Map(Map::from_iter([(
//!     "changeset",
//!     Value::Map(Map::from_iter([
//!         ("@open", Value::Bool(true)),
//!         (
//!             "tag",
//!             Value::Seq(vec![Item::Value(Value::Map(Map::from_iter([
//!                 ("@k", Value::from("comment")),
//!                 ("@v", Value::from("hi")),
//!             ])))]),
//!         ),
//!     ])),
//! )]));
//! assert_eq!(tree, expected);
//! ```
//!
//! ### Unparsing
//!
//! ```
//! use osmdict::{parse, to_string};
//!
//! let tree = parse(br#"<osm><node id="42" lat="1.5" lon="-0.5"/></osm>"#).unwrap();
//! let xml = to_string(&tree).unwrap();
//!
//! assert!(xml.contains(r#"<node id="42" lat="1.5" lon="-0.5"/>"#));
//! // writing and re-reading a parsed tree is lossless
//! assert_eq!(parse(xml.as_bytes()).unwrap(), tree);
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod de;
pub mod element;
pub mod se;

mod coerce;
mod datetime;
mod error;
mod names;
mod value;

pub use crate::datetime::{parse_isoformat, parse_legacy, DateFn, DateParsers};
pub use crate::de::{parse, parse_str, Parser};
pub use crate::error::{Error, Result};
pub use crate::names::xattr;
pub use crate::se::{to_bytes, to_string};
pub use crate::value::{Item, Iter, Map, Value};
