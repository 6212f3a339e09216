//! Error types for CBOR encoding and decoding.
//!
//! Every failure mode visible at the public boundary is a distinct variant of
//! [`Error`], each with a human-readable message. Errors are fatal to the
//! top-level encode/decode call: after a decode error the stream position is
//! undefined and the caller must construct a fresh decoder to continue.
//!
//! ## Examples
//!
//! ```rust
//! use cbor_codec::{from_slice, Error};
//!
//! // 0x1C is a head with reserved additional information (28).
//! let result: Result<u64, Error> = from_slice(&[0x1C]);
//! assert!(matches!(result, Err(Error::Malformed(_))));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding
/// CBOR data.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte source was exhausted in the middle of an item.
    #[error("unexpected end of input")]
    Eof,

    /// The input is not well-formed CBOR: a reserved additional-information
    /// value (28..=30), a stray break code outside an indefinite-length
    /// container, a reserved simple value, or an ill-formed chunked string.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// A declared element count, pair count, or string length exceeds the
    /// corresponding configured maximum. Raised before any allocation
    /// proportional to the declared length.
    #[error("{what} length {len} exceeds the configured maximum of {max}")]
    LimitExceeded {
        what: &'static str,
        len: u64,
        max: usize,
    },

    /// The decoded item's kind is incompatible with the destination type
    /// (e.g. binding a map into a boolean).
    #[error("cannot decode {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An integer value does not fit the destination integer type.
    #[error("integer {value} does not fit the destination type")]
    IntegerOverflow { value: i128 },

    /// A fixed-length sequence destination was given the wrong number of
    /// elements.
    #[error("expected a sequence of length {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A well-known tag was applied to an item of the wrong shape, or the
    /// tagged payload failed to parse as the value the tag promises.
    #[error("tag {tag}: {reason}")]
    TagShapeMismatch { tag: u64, reason: String },

    /// A recognised construct whose semantics are deliberately unimplemented.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The encoder cannot represent this host type in CBOR.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The underlying byte source failed.
    #[error("read failed: {0}")]
    Read(io::Error),

    /// The underlying byte sink failed.
    #[error("write failed: {0}")]
    Write(io::Error),

    /// Generic message (serde compatibility).
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a malformed-input error with a description of the defect.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    /// Creates a type-mismatch error naming the destination category and the
    /// decoded item kind.
    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Error::TypeMismatch { expected, found }
    }

    /// Creates a limit-exceeded error for the named resource.
    pub fn limit(what: &'static str, len: u64, max: usize) -> Self {
        Error::LimitExceeded { what, len, max }
    }

    /// Creates a tag-shape-mismatch error for `tag`.
    pub fn tag_shape(tag: u64, reason: impl Into<String>) -> Self {
        Error::TagShapeMismatch {
            tag,
            reason: reason.into(),
        }
    }

    /// Creates an integer-overflow error for `value`.
    pub fn overflow(value: i128) -> Self {
        Error::IntegerOverflow { value }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Maps a source-side I/O failure, distinguishing a short read from other
    /// failures.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Eof
        } else {
            Error::Read(err)
        }
    }

    /// Maps a sink-side I/O failure.
    pub(crate) fn from_write(err: io::Error) -> Self {
        Error::Write(err)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
