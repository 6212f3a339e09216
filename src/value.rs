//! Dynamic value representation for CBOR items.
//!
//! This module provides the [`CborValue`] enum which represents any decodable
//! CBOR item. It's useful for working with CBOR data when the structure isn't
//! known at compile time, and it is the "generic destination" of the decoder:
//! well-known semantic tags surface here as rich values (timestamps, big
//! integers, URLs, compiled regular expressions, MIME messages).
//!
//! ## Core Types
//!
//! - [`CborValue`] (aliased as [`Value`](crate::Value)): any CBOR item
//! - [`Key`](crate::Key): a generic map key (bool, integer, text, or bytes)
//! - [`CborRegex`]: a compiled regular expression produced by tag 35
//! - [`RawCbor`]: the raw encoded bytes of a single item, for types that
//!   encode and decode themselves
//!
//! ## Usage Patterns
//!
//! ### Decoding unknown structure
//!
//! ```rust
//! use cbor_codec::{from_slice, Value};
//!
//! // {"hello": "world"}
//! let bytes = [
//!     0xA1, 0x65, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x65, 0x77, 0x6F, 0x72,
//!     0x6C, 0x64,
//! ];
//! let value: Value = from_slice(&bytes).unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get_text("hello").and_then(|v| v.as_str()), Some("world"));
//! ```
//!
//! ### Creating values
//!
//! ```rust
//! use cbor_codec::{cbor, Value};
//!
//! let value = cbor!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["admin", "ops"]
//! });
//! assert!(value.is_map());
//! ```
//!
//! ### Extracting values
//!
//! ```rust
//! use cbor_codec::Value;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::map::{CborMap, Key};
use crate::tags::MimeMessage;

/// Private marker name used to route [`RawCbor`] through the serde data model.
pub(crate) const RAW_TOKEN: &str = "$cbor_codec::private::RawCbor";

/// A dynamically-typed representation of any decodable CBOR item.
///
/// The plain variants mirror the wire-level major types; the remaining
/// variants are produced by the semantic tag interpreter (tags 0-5, 21-36 and
/// their 261+ mirrors).
///
/// # Examples
///
/// ```rust
/// use cbor_codec::Value;
///
/// let null = Value::Null;
/// let num = Value::Integer(42);
/// let text = Value::Text("hello".to_string());
///
/// assert!(null.is_null());
/// assert!(num.is_integer());
/// assert!(text.is_text());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum CborValue {
    /// Null (and Undefined, which binds identically).
    #[default]
    Null,
    /// A boolean (major type 7, simple 20/21).
    Bool(bool),
    /// An integer (major types 0 and 1). `i128` holds the full wire range,
    /// -2^64 ..= 2^64-1.
    Integer(i128),
    /// A float (major type 7, ai 25/26/27), widened to `f64`.
    Float(f64),
    /// A byte string (major type 2).
    Bytes(Vec<u8>),
    /// A text string (major type 3).
    Text(String),
    /// An array (major type 4).
    Array(Vec<CborValue>),
    /// A map (major type 5), in wire order.
    Map(CborMap),
    /// A timestamp (tags 0, 1, 261, 262).
    Date(DateTime<Utc>),
    /// An arbitrary-precision integer (tags 2, 3, 263, 264, and exactly
    /// representable decimal fractions / bigfloats from tags 4 and 5).
    BigInt(BigInt),
    /// A parsed URI (tags 32, 270).
    Url(Url),
    /// A compiled regular expression (tags 35, 273).
    Regex(CborRegex),
    /// A parsed MIME message (tags 36, 274).
    Mime(MimeMessage),
}

/// A compiled regular expression carried by a decoded tag 35 item.
///
/// Wraps [`regex::Regex`] to give the value equality semantics (two values
/// are equal when their patterns are identical).
#[derive(Clone, Debug)]
pub struct CborRegex(pub regex::Regex);

impl CborRegex {
    /// The source pattern the expression was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for CborRegex {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

impl fmt::Display for CborRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl CborValue {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, CborValue::Null)
    }

    /// Returns `true` if the value is a boolean.
    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, CborValue::Bool(_))
    }

    /// Returns `true` if the value is an integer.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, CborValue::Integer(_))
    }

    /// Returns `true` if the value is a float.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, CborValue::Float(_))
    }

    /// Returns `true` if the value is a byte string.
    #[inline]
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        matches!(self, CborValue::Bytes(_))
    }

    /// Returns `true` if the value is a text string.
    #[inline]
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, CborValue::Text(_))
    }

    /// Returns `true` if the value is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, CborValue::Array(_))
    }

    /// Returns `true` if the value is a map.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, CborValue::Map(_))
    }

    /// Returns `true` if the value is a timestamp.
    #[inline]
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, CborValue::Date(_))
    }

    /// Returns `true` if the value is a big integer.
    #[inline]
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, CborValue::BigInt(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CborValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is an integer that fits `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbor_codec::Value;
    ///
    /// assert_eq!(Value::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Value::Float(42.0).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CborValue::Integer(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// If the value is an integer or a float, returns it as `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CborValue::Integer(i) => Some(*i as f64),
            CborValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a text string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CborValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a byte string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CborValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// If the value is an array, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<CborValue>> {
        match self {
            CborValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&CborMap> {
        match self {
            CborValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// If the value is a timestamp, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            CborValue::Date(dt) => Some(dt),
            _ => None,
        }
    }

    /// If the value is a big integer, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            CborValue::BigInt(bi) => Some(bi),
            _ => None,
        }
    }

    /// If the value is a parsed URI, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            CborValue::Url(u) => Some(u),
            _ => None,
        }
    }

    /// A short name for the value's kind, used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            CborValue::Null => "null",
            CborValue::Bool(_) => "boolean",
            CborValue::Integer(_) => "integer",
            CborValue::Float(_) => "float",
            CborValue::Bytes(_) => "byte string",
            CborValue::Text(_) => "text string",
            CborValue::Array(_) => "array",
            CborValue::Map(_) => "map",
            CborValue::Date(_) => "timestamp",
            CborValue::BigInt(_) => "big integer",
            CborValue::Url(_) => "URI",
            CborValue::Regex(_) => "regular expression",
            CborValue::Mime(_) => "MIME message",
        }
    }
}

impl fmt::Display for CborValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CborValue::Null => write!(f, "null"),
            CborValue::Bool(b) => write!(f, "{}", b),
            CborValue::Integer(i) => write!(f, "{}", i),
            CborValue::Float(x) => write!(f, "{}", x),
            CborValue::Bytes(b) => {
                write!(f, "h'")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            CborValue::Text(s) => write!(f, "{:?}", s),
            CborValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            CborValue::Map(map) => write!(f, "{{map of {} pairs}}", map.len()),
            CborValue::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
            CborValue::BigInt(bi) => write!(f, "{}", bi),
            CborValue::Url(u) => write!(f, "{}", u),
            CborValue::Regex(re) => write!(f, "/{}/", re),
            CborValue::Mime(m) => write!(f, "{}", m),
        }
    }
}

// From implementations for creating values from primitives.
impl From<bool> for CborValue {
    fn from(value: bool) -> Self {
        CborValue::Bool(value)
    }
}

impl From<i8> for CborValue {
    fn from(value: i8) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<i16> for CborValue {
    fn from(value: i16) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<i32> for CborValue {
    fn from(value: i32) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<i64> for CborValue {
    fn from(value: i64) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<u8> for CborValue {
    fn from(value: u8) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<u16> for CborValue {
    fn from(value: u16) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<u32> for CborValue {
    fn from(value: u32) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<u64> for CborValue {
    fn from(value: u64) -> Self {
        CborValue::Integer(value as i128)
    }
}

impl From<f32> for CborValue {
    fn from(value: f32) -> Self {
        CborValue::Float(value as f64)
    }
}

impl From<f64> for CborValue {
    fn from(value: f64) -> Self {
        CborValue::Float(value)
    }
}

impl From<String> for CborValue {
    fn from(value: String) -> Self {
        CborValue::Text(value)
    }
}

impl From<&str> for CborValue {
    fn from(value: &str) -> Self {
        CborValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for CborValue {
    fn from(value: Vec<u8>) -> Self {
        CborValue::Bytes(value)
    }
}

impl From<Vec<CborValue>> for CborValue {
    fn from(value: Vec<CborValue>) -> Self {
        CborValue::Array(value)
    }
}

impl From<CborMap> for CborValue {
    fn from(value: CborMap) -> Self {
        CborValue::Map(value)
    }
}

impl From<DateTime<Utc>> for CborValue {
    fn from(value: DateTime<Utc>) -> Self {
        CborValue::Date(value)
    }
}

impl From<BigInt> for CborValue {
    fn from(value: BigInt) -> Self {
        CborValue::BigInt(value)
    }
}

// TryFrom implementations for extracting values.
impl TryFrom<CborValue> for i64 {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Integer(i) => {
                i64::try_from(i).map_err(|_| crate::Error::overflow(i))
            }
            other => Err(crate::Error::type_mismatch("integer", other.kind_name())),
        }
    }
}

impl TryFrom<CborValue> for u64 {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Integer(i) => {
                u64::try_from(i).map_err(|_| crate::Error::overflow(i))
            }
            other => Err(crate::Error::type_mismatch("unsigned integer", other.kind_name())),
        }
    }
}

impl TryFrom<CborValue> for f64 {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Integer(i) => Ok(i as f64),
            CborValue::Float(f) => Ok(f),
            other => Err(crate::Error::type_mismatch("float", other.kind_name())),
        }
    }
}

impl TryFrom<CborValue> for bool {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("boolean", other.kind_name())),
        }
    }
}

impl TryFrom<CborValue> for String {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Text(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("text string", other.kind_name())),
        }
    }
}

impl TryFrom<CborValue> for Vec<u8> {
    type Error = crate::Error;

    fn try_from(value: CborValue) -> crate::Result<Self> {
        match value {
            CborValue::Bytes(b) => Ok(b),
            CborValue::Text(s) => Ok(s.into_bytes()),
            other => Err(crate::Error::type_mismatch("byte string", other.kind_name())),
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Integer(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            Key::Text(s) => serializer.serialize_str(s),
            Key::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean, integer, text, or byte string map key")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Key, E> {
                Ok(Key::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Key, E> {
                Ok(Key::Integer(value as i128))
            }

            fn visit_i128<E>(self, value: i128) -> Result<Key, E> {
                Ok(Key::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Key, E> {
                Ok(Key::Integer(value as i128))
            }

            fn visit_str<E>(self, value: &str) -> Result<Key, E> {
                Ok(Key::Text(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Key, E> {
                Ok(Key::Text(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<Key, E> {
                Ok(Key::Bytes(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Key, E> {
                Ok(Key::Bytes(value))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

impl Serialize for CborValue {
    /// Serializes the value in its natural untagged wire form.
    ///
    /// Rich tag values serialize as their textual projections (a timestamp as
    /// its RFC 3339 string, a big integer as its decimal string, a URI /
    /// regular expression / MIME message as its source text); the encoder
    /// deliberately never emits semantic tags.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CborValue::Null => serializer.serialize_unit(),
            CborValue::Bool(b) => serializer.serialize_bool(*b),
            CborValue::Integer(i) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_i128(*i)
                }
            }
            CborValue::Float(f) => serializer.serialize_f64(*f),
            CborValue::Bytes(b) => serializer.serialize_bytes(b),
            CborValue::Text(s) => serializer.serialize_str(s),
            CborValue::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            CborValue::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            CborValue::Date(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            CborValue::BigInt(bi) => serializer.serialize_str(&bi.to_string()),
            CborValue::Url(u) => serializer.serialize_str(u.as_str()),
            CborValue::Regex(re) => serializer.serialize_str(re.as_str()),
            CborValue::Mime(m) => serializer.serialize_str(m.source()),
        }
    }
}

impl<'de> Deserialize<'de> for CborValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

pub(crate) struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = CborValue;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any valid CBOR item")
    }

    fn visit_bool<E>(self, value: bool) -> Result<CborValue, E> {
        Ok(CborValue::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<CborValue, E> {
        Ok(CborValue::Integer(value as i128))
    }

    fn visit_i128<E>(self, value: i128) -> Result<CborValue, E> {
        Ok(CborValue::Integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<CborValue, E> {
        Ok(CborValue::Integer(value as i128))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<CborValue, E> {
        i128::try_from(value)
            .map(CborValue::Integer)
            .map_err(|_| E::custom("integer out of the representable CBOR range"))
    }

    fn visit_f32<E>(self, value: f32) -> Result<CborValue, E> {
        Ok(CborValue::Float(value as f64))
    }

    fn visit_f64<E>(self, value: f64) -> Result<CborValue, E> {
        Ok(CborValue::Float(value))
    }

    fn visit_char<E>(self, value: char) -> Result<CborValue, E> {
        Ok(CborValue::Text(value.to_string()))
    }

    fn visit_str<E>(self, value: &str) -> Result<CborValue, E> {
        Ok(CborValue::Text(value.to_string()))
    }

    fn visit_string<E>(self, value: String) -> Result<CborValue, E> {
        Ok(CborValue::Text(value))
    }

    fn visit_bytes<E>(self, value: &[u8]) -> Result<CborValue, E> {
        Ok(CborValue::Bytes(value.to_vec()))
    }

    fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<CborValue, E> {
        Ok(CborValue::Bytes(value))
    }

    fn visit_unit<E>(self) -> Result<CborValue, E> {
        Ok(CborValue::Null)
    }

    fn visit_none<E>(self) -> Result<CborValue, E> {
        Ok(CborValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<CborValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<CborValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<CborValue, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        // The hint is a declared count, not bytes in hand; cap the upfront
        // reservation so a short input cannot demand a large allocation.
        let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(elem) = seq.next_element()? {
            vec.push(elem);
        }
        Ok(CborValue::Array(vec))
    }

    fn visit_map<A>(self, mut map: A) -> Result<CborValue, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut values = CborMap::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = map.next_entry::<Key, CborValue>()? {
            values.insert(key, value);
        }
        Ok(CborValue::Map(values))
    }

    /// Tagged items arrive as an enum whose discriminant is the tag number
    /// and whose payload is the inner item; the tag interpreter turns the
    /// pair into a rich value (or unwraps an unknown tag transparently).
    fn visit_enum<A>(self, data: A) -> Result<CborValue, A::Error>
    where
        A: de::EnumAccess<'de>,
    {
        use serde::de::VariantAccess;

        let (tag, variant) = data.variant::<u64>()?;
        let inner = variant.newtype_variant::<CborValue>()?;
        crate::tags::interpret(tag, inner).map_err(de::Error::custom)
    }
}

/// The raw encoded bytes of exactly one CBOR item.
///
/// `RawCbor` is the escape hatch for types that encode and decode themselves:
/// on decode it captures the item's bytes verbatim (without interpreting
/// them), and on encode it splices previously encoded bytes into the output
/// stream unchanged.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::{from_slice, to_vec, RawCbor};
///
/// let bytes = to_vec(&vec![1u8, 2, 3]).unwrap();
/// let raw: RawCbor = from_slice(&bytes).unwrap();
/// assert_eq!(raw.0, bytes);
///
/// // Re-encoding splices the captured bytes back verbatim.
/// assert_eq!(to_vec(&raw).unwrap(), bytes);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCbor(pub Vec<u8>);

impl Serialize for RawCbor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        struct Verbatim<'a>(&'a [u8]);

        impl Serialize for Verbatim<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_bytes(self.0)
            }
        }

        serializer.serialize_newtype_struct(RAW_TOKEN, &Verbatim(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawCbor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = RawCbor;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a raw CBOR item")
            }

            fn visit_bytes<E>(self, value: &[u8]) -> Result<RawCbor, E> {
                Ok(RawCbor(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<RawCbor, E> {
                Ok(RawCbor(value))
            }
        }

        deserializer.deserialize_newtype_struct(RAW_TOKEN, RawVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tryfrom_i64() {
        let value = CborValue::Integer(42);
        assert_eq!(i64::try_from(value).unwrap(), 42);

        let too_big = CborValue::Integer(u64::MAX as i128);
        assert!(matches!(
            i64::try_from(too_big),
            Err(crate::Error::IntegerOverflow { .. })
        ));

        let text = CborValue::Text("nope".to_string());
        assert!(matches!(
            i64::try_from(text),
            Err(crate::Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn tryfrom_f64() {
        assert_eq!(f64::try_from(CborValue::Float(3.5)).unwrap(), 3.5);
        assert_eq!(f64::try_from(CborValue::Integer(42)).unwrap(), 42.0);
        assert!(f64::try_from(CborValue::Null).is_err());
    }

    #[test]
    fn tryfrom_bytes_accepts_text() {
        let bytes = Vec::<u8>::try_from(CborValue::Text("hi".to_string())).unwrap();
        assert_eq!(bytes, b"hi");
    }

    #[test]
    fn from_primitives() {
        assert_eq!(CborValue::from(true), CborValue::Bool(true));
        assert_eq!(CborValue::from(42i32), CborValue::Integer(42));
        assert_eq!(CborValue::from(3.5f64), CborValue::Float(3.5));
        assert_eq!(CborValue::from("test"), CborValue::Text("test".to_string()));
        assert_eq!(
            CborValue::from(vec![1u8, 2]),
            CborValue::Bytes(vec![1, 2])
        );
    }

    #[test]
    fn regex_equality_is_by_pattern() {
        let a = CborRegex(regex::Regex::new("^a+$").unwrap());
        let b = CborRegex(regex::Regex::new("^a+$").unwrap());
        let c = CborRegex(regex::Regex::new("^b+$").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_bytes_as_hex() {
        let v = CborValue::Bytes(vec![0x0B, 0x71]);
        assert_eq!(v.to_string(), "h'0b71'");
    }

    #[test]
    fn const_is_methods() {
        const fn check_null(v: &CborValue) -> bool {
            v.is_null()
        }
        assert!(check_null(&CborValue::Null));
    }
}
