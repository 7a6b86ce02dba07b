//! Error management module

use std::fmt;
use std::io;
use std::str::Utf8Error;

use chrono::FixedOffset;
use quick_xml::events::attributes::AttrError;

use crate::de::MAX_DEPTH;

/// The error type used by this crate.
#[derive(Debug)]
pub enum Error {
    /// The tokenizer reported a parse error mid-stream.
    Xml(quick_xml::Error),
    /// An element name, attribute or text span is not valid UTF-8.
    Utf8(Utf8Error),
    /// The coercion table could not convert the raw text for the named key.
    BadValue {
        /// The attribute or element name the coercion was keyed by.
        key: String,
        /// The raw text that failed to convert.
        value: String,
    },
    /// The stream ended without producing a root element.
    EmptyDocument,
    /// Element nesting would exceed the fixed frame-stack capacity.
    NestingTooDeep,
    /// The tree handed to the emitter is not of the expected shape.
    BadRoot(&'static str),
    /// The emitter encountered a timestamp with a non-UTC offset.
    NonUtcTimestamp(FixedOffset),
    /// An element type string that does not start one of `node`, `way`,
    /// `relation`.
    UnknownElementType(String),
    /// An element id whose magnitude does not fit the 56-bit packed form.
    ElementIdOverflow(i64),
    /// A versioned element reference that is not of the `IDvVERSION` form.
    BadElementRef(String),
    /// An I/O error from the underlying writer.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Xml(e) => write!(f, "error parsing XML: {}", e),
            Error::Utf8(e) => write!(f, "UTF8 error: {}", e),
            Error::BadValue { key, value } => {
                write!(f, "failed to convert '{}' value: {}", key, value)
            }
            Error::EmptyDocument => write!(f, "document is empty"),
            Error::NestingTooDeep => {
                write!(f, "XML nesting depth exceeded limit of {}", MAX_DEPTH)
            }
            Error::BadRoot(msg) => write!(f, "invalid document structure: {}", msg),
            Error::NonUtcTimestamp(offset) => {
                write!(f, "timezone must be UTC, got {}", offset)
            }
            Error::UnknownElementType(name) => write!(f, "unknown element type '{}'", name),
            Error::ElementIdOverflow(id) => {
                write!(f, "element id {} is out of range for a typed id", id)
            }
            Error::BadElementRef(reference) => {
                write!(f, "element reference '{}' is invalid", reference)
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Xml(e) => Some(e),
            Error::Utf8(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for Error {
    /// Creates a new `Error::Xml` from the given error
    #[inline]
    fn from(error: quick_xml::Error) -> Error {
        Error::Xml(error)
    }
}

impl From<AttrError> for Error {
    /// Creates a new `Error::Xml` from an attribute syntax error
    #[inline]
    fn from(error: AttrError) -> Error {
        Error::Xml(error.into())
    }
}

impl From<Utf8Error> for Error {
    /// Creates a new `Error::Utf8` from the given error
    #[inline]
    fn from(error: Utf8Error) -> Error {
        Error::Utf8(error)
    }
}

impl From<io::Error> for Error {
    /// Creates a new `Error::Io` from the given error
    #[inline]
    fn from(error: io::Error) -> Error {
        Error::Io(error)
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
