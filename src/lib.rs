//! # cbor_codec
//!
//! A streaming encoder and decoder for the Concise Binary Object
//! Representation (CBOR, RFC 7049 / RFC 8949) with serde support.
//!
//! ## Key Features
//!
//! - **serde integration**: works with existing Rust types via
//!   `#[derive(Serialize, Deserialize)]`
//! - **Streaming**: encode to any [`std::io::Write`] sink, decode from any
//!   [`std::io::Read`] source, one item at a time
//! - **Resource limits**: every declared length is checked against
//!   configurable maximums before allocation, bounding hostile inputs
//! - **Semantic tags**: well-known tags (date-times, big integers, URIs,
//!   base-encoded data, regular expressions, MIME messages, and the 261+
//!   mirror range) decode into rich [`Value`] variants
//! - **Integer-keyed records**: CWT-style maps with integer keys bind to
//!   struct fields renamed to their decimal form
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cbor_codec = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic encoding and decoding
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use cbor_codec::{to_vec, from_slice};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice".to_string(),
//!     active: true,
//! };
//!
//! let bytes = to_vec(&user).unwrap();
//! let user_back: User = from_slice(&bytes).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Integer-keyed records
//!
//! CBOR protocols such as CWT key map entries by small integers. Rename the
//! fields to the decimal form of the key:
//!
//! ```rust
//! use serde::Deserialize;
//! use cbor_codec::from_slice;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Claims {
//!     #[serde(rename = "1", default)]
//!     iss: String,
//!     #[serde(rename = "4", default)]
//!     exp: u64,
//! }
//!
//! // {1: "acme", 4: 1444064944}
//! let bytes = [
//!     0xA2, 0x01, 0x64, 0x61, 0x63, 0x6D, 0x65, 0x04, 0x1A, 0x56, 0x12,
//!     0xAE, 0xB0,
//! ];
//! let claims: Claims = from_slice(&bytes).unwrap();
//! assert_eq!(claims.iss, "acme");
//! assert_eq!(claims.exp, 1_444_064_944);
//! ```
//!
//! ### Dynamic values
//!
//! ```rust
//! use cbor_codec::{cbor, to_vec, from_slice, Value};
//!
//! let value = cbor!({
//!     "name": "Alice",
//!     "scores": [1, 2, 3]
//! });
//! let bytes = to_vec(&value).unwrap();
//! let back: Value = from_slice(&bytes).unwrap();
//! assert_eq!(value, back);
//! ```
//!
//! ### Decode limits
//!
//! A three-byte input can declare a multi-terabyte array; the decoder
//! refuses it before allocating:
//!
//! ```rust
//! use cbor_codec::{from_slice, Error};
//!
//! // An array claiming 2^47 elements.
//! let hostile = [0x9B, 0x00, 0x00, 0x42, 0xFA, 0x42, 0xFA, 0x42, 0xFA];
//! let result: Result<Vec<u8>, Error> = from_slice(&hostile);
//! assert!(matches!(result, Err(Error::LimitExceeded { .. })));
//! ```

pub mod de;
pub mod error;
pub mod format;
pub mod limits;
pub mod macros;
pub mod map;
pub mod ser;
pub mod tags;
pub mod value;

pub use de::{Decoder, ValueDeserializer};
pub use error::{Error, Result};
pub use limits::{DecodeLimits, DEFAULT_MAX};
pub use map::{CborMap, Key};
pub use ser::{Encoder, ValueSerializer};
pub use tags::MimeMessage;
pub use value::{CborRegex, CborValue, RawCbor};

/// Alias for [`CborValue`].
pub type Value = CborValue;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io;

/// Serializes any `T: Serialize` to a CBOR byte vector.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::to_vec;
///
/// assert_eq!(to_vec(&true).unwrap(), vec![0xF5]);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented in CBOR
/// ([`Error::UnsupportedType`]).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.encode(value)?;
    Ok(buf)
}

/// Serializes any `T: Serialize` to a writer in CBOR format.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1u8, 2]).unwrap();
/// assert_eq!(buffer, vec![0x82, 0x01, 0x02]);
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut encoder = Encoder::new(writer);
    encoder.encode(value)
}

/// Converts any `T: Serialize` into a [`CborValue`].
///
/// Useful for inspecting or rearranging data generically before encoding.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_map());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented
/// ([`Error::UnsupportedType`]).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<CborValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Deserializes an instance of type `T` from CBOR bytes.
///
/// Exactly one item is decoded; trailing bytes are left unconsumed. Use a
/// [`Decoder`] to read several consecutive items from one buffer.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::from_slice;
///
/// let nums: Vec<u64> = from_slice(&[0x82, 0x01, 0x02]).unwrap();
/// assert_eq!(nums, vec![1, 2]);
/// ```
///
/// # Errors
///
/// Returns an error if the input is truncated, malformed, over the decode
/// limits, or incompatible with `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(bytes: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut decoder = Decoder::new(bytes);
    decoder.decode()
}

/// Deserializes an instance of type `T` from CBOR bytes with explicit
/// [`DecodeLimits`].
///
/// # Examples
///
/// ```rust
/// use cbor_codec::{from_slice_with_limits, DecodeLimits, Error};
///
/// let limits = DecodeLimits::new().with_max_array_elements(1);
/// let result: Result<Vec<u64>, Error> =
///     from_slice_with_limits(&[0x82, 0x01, 0x02], limits);
/// assert!(matches!(result, Err(Error::LimitExceeded { .. })));
/// ```
///
/// # Errors
///
/// As [`from_slice`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice_with_limits<'a, T>(bytes: &'a [u8], limits: DecodeLimits) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut decoder = Decoder::with_limits(bytes, limits);
    decoder.decode()
}

/// Deserializes an instance of type `T` from an I/O stream of CBOR.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::from_reader;
/// use std::io::Cursor;
///
/// let cursor = Cursor::new(vec![0x82u8, 0x01, 0x02]);
/// let nums: Vec<u64> = from_reader(cursor).unwrap();
/// assert_eq!(nums, vec![1, 2]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not well-formed CBOR, or
/// the data cannot be deserialized into `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut decoder = Decoder::new(reader);
    decoder.decode()
}

/// Binds an already-decoded [`CborValue`] into an instance of type `T`.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::{cbor, from_value};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// let value = cbor!({ "x": 1, "y": 2 });
/// let point: Point = from_value(value).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the value's shape is incompatible with `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: CborValue) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    #[test]
    fn round_trip_struct() {
        let user = User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
        };
        let bytes = to_vec(&user).unwrap();
        let back: User = from_slice(&bytes).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn round_trip_through_value() {
        let user = User {
            id: 7,
            name: "Bob".to_string(),
            active: false,
            tags: vec![],
        };
        let value = to_value(&user).unwrap();
        let back: User = from_value(value).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn streaming_round_trip() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &vec![1u64, 2, 3]).unwrap();
        let nums: Vec<u64> = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn trailing_bytes_are_left_alone() {
        // One item followed by another; from_slice decodes the first only.
        let n: u64 = from_slice(&[0x01, 0x02]).unwrap();
        assert_eq!(n, 1);
    }
}
