//! CBOR deserialization.
//!
//! This module provides the [`Decoder`], a streaming serde
//! [`Deserializer`](serde::Deserializer) over any [`io::Read`] source, and
//! [`ValueDeserializer`], which binds an already-decoded
//! [`CborValue`] into a typed destination.
//!
//! ## Overview
//!
//! - **Streaming**: bytes are consumed strictly in wire order, with a single
//!   byte of lookahead (needed for break detection and null probing). After a
//!   successful decode the stream is positioned exactly past the item, so
//!   successive [`Decoder::decode`] calls return successive items.
//! - **Limits**: declared lengths are checked against [`DecodeLimits`] before
//!   any allocation proportional to them.
//! - **Tags**: typed destinations unwrap tags transparently after checking
//!   the inner item's wire shape; generic destinations receive interpreted
//!   rich values (see [`crate::tags`]).
//! - **Records**: map keys are stringified while binding a struct, so
//!   integer-keyed maps match fields renamed to their decimal form
//!   (`#[serde(rename = "1")]`).
//!
//! ## Usage
//!
//! Most users go through the crate-level functions:
//!
//! ```rust
//! use cbor_codec::from_slice;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! // {"x": 1, "y": 2}
//! let bytes = [0xA2, 0x61, 0x78, 0x01, 0x61, 0x79, 0x02];
//! let p: Point = from_slice(&bytes).unwrap();
//! assert_eq!(p, Point { x: 1, y: 2 });
//! ```

use std::io::Read;

use serde::de::{self, Deserialize, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::{Error, Result};
use crate::limits::DecodeLimits;
use crate::map::Key;
use crate::tags;
use crate::value::{CborValue, RAW_TOKEN};

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEFINED: u8 = 23;
const SIMPLE_EXTENSION: u8 = 24;
const FLOAT16: u8 = 25;
const FLOAT32: u8 = 26;
const FLOAT64: u8 = 27;
const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xFF;

/// A streaming CBOR decoder over any [`Read`] source.
///
/// Not safe for simultaneous use from multiple tasks; distinct decoders may
/// run in parallel on independent sources. After a decode error the stream
/// position is undefined.
pub struct Decoder<R: Read> {
    reader: R,
    peeked: Option<u8>,
    limits: DecodeLimits,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder reading from `reader`, with default limits.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            peeked: None,
            limits: DecodeLimits::default(),
        }
    }

    /// Creates a decoder with explicit limits.
    pub fn with_limits(reader: R, limits: DecodeLimits) -> Self {
        Decoder {
            reader,
            peeked: None,
            limits,
        }
    }

    /// Sets all four limits to `n`.
    pub fn set_max(&mut self, n: usize) {
        self.limits = self.limits.with_max(n);
    }

    /// Sets the maximum number of elements in an array.
    ///
    /// The default limit is 1,000,000.
    pub fn set_max_array_elements(&mut self, n: usize) {
        self.limits.max_array_elements = n;
    }

    /// Sets the maximum number of key/value pairs in a map.
    ///
    /// The default limit is 1,000,000.
    pub fn set_max_map_pairs(&mut self, n: usize) {
        self.limits.max_map_pairs = n;
    }

    /// Sets the maximum number of bytes in a text string.
    ///
    /// The default limit is 1,000,000.
    pub fn set_max_string_bytes(&mut self, n: usize) {
        self.limits.max_string_bytes = n;
    }

    /// Sets the maximum number of bytes in a byte string.
    ///
    /// The default limit is 1,000,000.
    pub fn set_max_bytes(&mut self, n: usize) {
        self.limits.max_bytes = n;
    }

    /// Decodes the next item from the stream into `T`.
    pub fn decode<'de, T: de::Deserialize<'de>>(&mut self) -> Result<T> {
        T::deserialize(self)
    }

    /// Reads a tag head (major type 6) and returns the tag number, leaving
    /// the tagged item unread.
    pub fn read_tag(&mut self) -> Result<u64> {
        let (major, info) = self.read_head()?;
        if major != MAJOR_TAG {
            return Err(Error::type_mismatch("tag", found_name(major, info)));
        }
        self.definite_arg(info, "a tag number")
    }

    fn read_u8(&mut self) -> Result<u8> {
        if let Some(byte) = self.peeked.take() {
            return Ok(byte);
        }
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf).map_err(Error::from_read)?;
        Ok(buf[0])
    }

    fn peek_u8(&mut self) -> Result<u8> {
        if let Some(byte) = self.peeked {
            return Ok(byte);
        }
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf).map_err(Error::from_read)?;
        self.peeked = Some(buf[0]);
        Ok(buf[0])
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            start = 1;
        }
        self.reader
            .read_exact(&mut buf[start..])
            .map_err(Error::from_read)
    }

    fn read_be_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_be_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn read_be_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact_into(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Reads the head byte and splits it into major type and additional
    /// information.
    fn read_head(&mut self) -> Result<(u8, u8)> {
        let byte = self.read_u8()?;
        Ok((byte >> 5, byte & 0x1F))
    }

    /// Resolves the argument for a head. `None` means indefinite length;
    /// the reserved values 28..=30 are malformed.
    fn read_arg(&mut self, info: u8) -> Result<Option<u64>> {
        match info {
            0..=23 => Ok(Some(info as u64)),
            24 => Ok(Some(self.read_u8()? as u64)),
            25 => Ok(Some(self.read_be_u16()? as u64)),
            26 => Ok(Some(self.read_be_u32()? as u64)),
            27 => Ok(Some(self.read_be_u64()?)),
            INDEFINITE => Ok(None),
            _ => Err(Error::malformed(format!(
                "reserved additional information {info}"
            ))),
        }
    }

    fn definite_arg(&mut self, info: u8, what: &'static str) -> Result<u64> {
        self.read_arg(info)?
            .ok_or_else(|| Error::malformed(format!("indefinite length is not valid for {what}")))
    }

    /// Reads heads until the first non-tag item, checking each known tag's
    /// expected wire shape against the following head.
    fn read_head_skipping_tags(&mut self) -> Result<(u8, u8)> {
        loop {
            let (major, info) = self.read_head()?;
            if major != MAJOR_TAG {
                return Ok((major, info));
            }
            let tag = self.definite_arg(info, "a tag number")?;
            self.check_tag_shape(tag)?;
        }
    }

    /// Verifies that the next item's head satisfies a known tag's expected
    /// shape. Unknown tags pass unconditionally.
    fn check_tag_shape(&mut self, tag: u64) -> Result<()> {
        if let Some(shape) = tags::expected_shape(tag) {
            let byte = self.peek_u8()?;
            let (major, info) = (byte >> 5, byte & 0x1F);
            if !shape.matches(major, info) {
                return Err(Error::tag_shape(
                    tag,
                    format!("expected {}, found {}", shape.name(), found_name(major, info)),
                ));
            }
        }
        Ok(())
    }

    /// Reads the payload of a byte or text string whose head was already
    /// consumed, enforcing the matching limit. Indefinite-length strings are
    /// the concatenation of definite-length chunks of the same major type.
    fn read_string_payload(&mut self, major: u8, info: u8) -> Result<Vec<u8>> {
        let (limit, what) = if major == MAJOR_TEXT {
            (self.limits.max_string_bytes, "text string")
        } else {
            (self.limits.max_bytes, "byte string")
        };
        match self.read_arg(info)? {
            Some(len) => {
                if len > limit as u64 {
                    return Err(Error::limit(what, len, limit));
                }
                let mut buf = vec![0u8; len as usize];
                self.read_exact_into(&mut buf)?;
                Ok(buf)
            }
            None => {
                let mut buf = Vec::new();
                loop {
                    if self.peek_u8()? == BREAK {
                        self.read_u8()?;
                        return Ok(buf);
                    }
                    let (chunk_major, chunk_info) = self.read_head()?;
                    if chunk_major != major {
                        return Err(Error::malformed(format!(
                            "indefinite-length {what} chunk is a {}",
                            found_name(chunk_major, chunk_info)
                        )));
                    }
                    let len = self.read_arg(chunk_info)?.ok_or_else(|| {
                        Error::malformed(format!("nested indefinite-length {what} chunk"))
                    })?;
                    let total = buf.len() as u64 + len;
                    if total > limit as u64 {
                        return Err(Error::limit(what, total, limit));
                    }
                    let start = buf.len();
                    buf.resize(start + len as usize, 0);
                    self.read_exact_into(&mut buf[start..])?;
                }
            }
        }
    }

    /// Reads an integer, float, or null-ish scalar after unwrapping tags.
    fn read_number(&mut self, expected: &'static str) -> Result<Num> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_UNSIGNED => Ok(Num::Int(self.definite_arg(info, "an integer")? as i128)),
            MAJOR_NEGATIVE => {
                let arg = self.definite_arg(info, "an integer")?;
                Ok(Num::Int(-1 - arg as i128))
            }
            MAJOR_SIMPLE => match info {
                SIMPLE_NULL | SIMPLE_UNDEFINED => Ok(Num::Null),
                FLOAT16 => Ok(Num::Float(half_to_double(self.read_be_u16()?))),
                FLOAT32 => Ok(Num::Float(f32::from_be_bytes(
                    self.read_be_u32()?.to_be_bytes(),
                ) as f64)),
                FLOAT64 => Ok(Num::Float(f64::from_be_bytes(
                    self.read_be_u64()?.to_be_bytes(),
                ))),
                _ => Err(Error::type_mismatch(expected, found_name(major, info))),
            },
            _ => Err(Error::type_mismatch(expected, found_name(major, info))),
        }
    }

    /// Stringifies the next map key for record-field matching, the way the
    /// field table is keyed: integers in decimal, text as-is, byte strings
    /// lossily, booleans and floats via their display forms.
    fn read_field_selector(&mut self) -> Result<String> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_UNSIGNED => Ok(self.definite_arg(info, "a map key")?.to_string()),
            MAJOR_NEGATIVE => {
                let arg = self.definite_arg(info, "a map key")?;
                Ok((-1 - arg as i128).to_string())
            }
            MAJOR_TEXT | MAJOR_BYTES => {
                let payload = self.read_string_payload(major, info)?;
                Ok(String::from_utf8_lossy(&payload).into_owned())
            }
            MAJOR_SIMPLE => match info {
                SIMPLE_FALSE => Ok("false".to_string()),
                SIMPLE_TRUE => Ok("true".to_string()),
                SIMPLE_NULL | SIMPLE_UNDEFINED => Ok("null".to_string()),
                FLOAT16 => Ok(half_to_double(self.read_be_u16()?).to_string()),
                FLOAT32 => {
                    Ok((f32::from_be_bytes(self.read_be_u32()?.to_be_bytes()) as f64).to_string())
                }
                FLOAT64 => Ok(f64::from_be_bytes(self.read_be_u64()?.to_be_bytes()).to_string()),
                _ => Err(Error::type_mismatch("a map key", found_name(major, info))),
            },
            _ => Err(Error::type_mismatch("a map key", found_name(major, info))),
        }
    }

    /// Consumes one complete item without materialising it. Used for unknown
    /// record fields and ignored values; allocation-free.
    fn skip_item(&mut self) -> Result<()> {
        let (major, info) = self.read_head()?;
        self.skip_body(major, info)
    }

    fn skip_body(&mut self, major: u8, info: u8) -> Result<()> {
        match major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => {
                self.definite_arg(info, "an integer")?;
                Ok(())
            }
            MAJOR_BYTES | MAJOR_TEXT => match self.read_arg(info)? {
                Some(len) => self.discard(len),
                None => loop {
                    if self.peek_u8()? == BREAK {
                        self.read_u8()?;
                        return Ok(());
                    }
                    let (chunk_major, chunk_info) = self.read_head()?;
                    if chunk_major != major {
                        return Err(Error::malformed("mixed chunk types in indefinite string"));
                    }
                    let len = self
                        .read_arg(chunk_info)?
                        .ok_or_else(|| Error::malformed("nested indefinite string chunk"))?;
                    self.discard(len)?;
                },
            },
            MAJOR_ARRAY => self.skip_container(info, 1),
            MAJOR_MAP => self.skip_container(info, 2),
            MAJOR_TAG => {
                self.definite_arg(info, "a tag number")?;
                self.skip_item()
            }
            _ => match info {
                0..=23 => Ok(()),
                SIMPLE_EXTENSION => self.discard(1),
                FLOAT16 => self.discard(2),
                FLOAT32 => self.discard(4),
                FLOAT64 => self.discard(8),
                INDEFINITE => Err(Error::malformed("unexpected break code")),
                _ => Err(Error::malformed(format!(
                    "reserved additional information {info}"
                ))),
            },
        }
    }

    fn skip_container(&mut self, info: u8, items_per_entry: u64) -> Result<()> {
        match self.read_arg(info)? {
            Some(n) => {
                for _ in 0..n.saturating_mul(items_per_entry) {
                    self.skip_item()?;
                }
                Ok(())
            }
            None => loop {
                if self.peek_u8()? == BREAK {
                    self.read_u8()?;
                    return Ok(());
                }
                for _ in 0..items_per_entry {
                    self.skip_item()?;
                }
            },
        }
    }

    fn discard(&mut self, mut n: u64) -> Result<()> {
        if n > 0 && self.peeked.take().is_some() {
            n -= 1;
        }
        if n == 0 {
            return Ok(());
        }
        let copied = std::io::copy(&mut (&mut self.reader).take(n), &mut std::io::sink())
            .map_err(Error::from_read)?;
        if copied < n {
            return Err(Error::Eof);
        }
        Ok(())
    }

    /// Reads one complete item, appending its exact wire bytes to `out`.
    /// Backs the [`RawCbor`](crate::RawCbor) capture channel.
    fn capture_item(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let byte = self.read_u8()?;
        out.push(byte);
        let (major, info) = (byte >> 5, byte & 0x1F);
        let arg = self.capture_arg(info, out)?;
        match major {
            MAJOR_UNSIGNED | MAJOR_NEGATIVE => match arg {
                Some(_) => Ok(()),
                None => Err(Error::malformed("indefinite length is not valid for an integer")),
            },
            MAJOR_BYTES | MAJOR_TEXT => match arg {
                Some(len) => self.capture_payload(len, major, out),
                None => loop {
                    let chunk = self.read_u8()?;
                    out.push(chunk);
                    if chunk == BREAK {
                        return Ok(());
                    }
                    if chunk >> 5 != major {
                        return Err(Error::malformed("mixed chunk types in indefinite string"));
                    }
                    let len = self
                        .capture_arg(chunk & 0x1F, out)?
                        .ok_or_else(|| Error::malformed("nested indefinite string chunk"))?;
                    self.capture_payload(len, major, out)?;
                },
            },
            MAJOR_ARRAY => self.capture_container(arg, 1, out),
            MAJOR_MAP => self.capture_container(arg, 2, out),
            MAJOR_TAG => match arg {
                Some(_) => self.capture_item(out),
                None => Err(Error::malformed("indefinite length is not valid for a tag number")),
            },
            // Simple values and floats: the payload, if any, was captured
            // with the argument bytes. A bare break is not an item.
            _ => match arg {
                Some(_) => Ok(()),
                None => Err(Error::malformed("unexpected break code")),
            },
        }
    }

    fn capture_arg(&mut self, info: u8, out: &mut Vec<u8>) -> Result<Option<u64>> {
        match info {
            0..=23 => Ok(Some(info as u64)),
            24 => {
                let b = self.read_u8()?;
                out.push(b);
                Ok(Some(b as u64))
            }
            25 => {
                let v = self.read_be_u16()?;
                out.extend_from_slice(&v.to_be_bytes());
                Ok(Some(v as u64))
            }
            26 => {
                let v = self.read_be_u32()?;
                out.extend_from_slice(&v.to_be_bytes());
                Ok(Some(v as u64))
            }
            27 => {
                let v = self.read_be_u64()?;
                out.extend_from_slice(&v.to_be_bytes());
                Ok(Some(v))
            }
            INDEFINITE => Ok(None),
            _ => Err(Error::malformed(format!(
                "reserved additional information {info}"
            ))),
        }
    }

    fn capture_payload(&mut self, len: u64, major: u8, out: &mut Vec<u8>) -> Result<()> {
        let (limit, what) = if major == MAJOR_TEXT {
            (self.limits.max_string_bytes, "text string")
        } else {
            (self.limits.max_bytes, "byte string")
        };
        if len > limit as u64 {
            return Err(Error::limit(what, len, limit));
        }
        let start = out.len();
        out.resize(start + len as usize, 0);
        self.read_exact_into(&mut out[start..])
    }

    fn capture_container(
        &mut self,
        arg: Option<u64>,
        items_per_entry: u64,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        match arg {
            Some(n) => {
                for _ in 0..n.saturating_mul(items_per_entry) {
                    self.capture_item(out)?;
                }
                Ok(())
            }
            None => loop {
                if self.peek_u8()? == BREAK {
                    out.push(self.read_u8()?);
                    return Ok(());
                }
                for _ in 0..items_per_entry {
                    self.capture_item(out)?;
                }
            },
        }
    }
}

enum Num {
    Int(i128),
    Float(f64),
    Null,
}

/// Decodes an IEEE 754 binary16 value, widening to `f64`: 1 sign bit, 5
/// exponent bits, 10 mantissa bits; subnormals, zeros, infinities, and NaN
/// all map onto their wider equivalents.
fn half_to_double(half: u16) -> f64 {
    let exponent = (half >> 10) & 0x1F;
    let mantissa = (half & 0x3FF) as f64;
    let value = match exponent {
        0 => mantissa * (-24f64).exp2(),
        31 => {
            if mantissa == 0.0 {
                f64::INFINITY
            } else {
                f64::NAN
            }
        }
        _ => (mantissa + 1024.0) * ((exponent as i32 - 25) as f64).exp2(),
    };
    if half & 0x8000 == 0 {
        value
    } else {
        -value
    }
}

fn found_name(major: u8, info: u8) -> &'static str {
    match major {
        MAJOR_UNSIGNED => "unsigned integer",
        MAJOR_NEGATIVE => "negative integer",
        MAJOR_BYTES => "byte string",
        MAJOR_TEXT => "text string",
        MAJOR_ARRAY => "array",
        MAJOR_MAP => "map",
        MAJOR_TAG => "tag",
        _ => match info {
            SIMPLE_FALSE | SIMPLE_TRUE => "boolean",
            SIMPLE_NULL => "null",
            SIMPLE_UNDEFINED => "undefined",
            FLOAT16 | FLOAT32 | FLOAT64 => "float",
            INDEFINITE => "break",
            _ => "simple value",
        },
    }
}

macro_rules! deserialize_integer {
    ($method:ident, $visit:ident, $ty:ty, $expected:literal) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            match self.read_number($expected)? {
                Num::Int(i) => {
                    let v = <$ty>::try_from(i).map_err(|_| Error::overflow(i))?;
                    visitor.$visit(v)
                }
                Num::Float(_) => Err(Error::type_mismatch($expected, "float")),
                Num::Null => visitor.$visit(0),
            }
        }
    };
}

impl<'de, R: Read> de::Deserializer<'de> for &mut Decoder<R> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head()?;
        match major {
            MAJOR_UNSIGNED => {
                let arg = self.definite_arg(info, "an integer")?;
                visitor.visit_u64(arg)
            }
            MAJOR_NEGATIVE => {
                let arg = self.definite_arg(info, "an integer")?;
                let value = -1 - arg as i128;
                match i64::try_from(value) {
                    Ok(v) => visitor.visit_i64(v),
                    Err(_) => visitor.visit_i128(value),
                }
            }
            MAJOR_BYTES | MAJOR_TEXT => {
                let payload = self.read_string_payload(major, info)?;
                if major == MAJOR_TEXT {
                    visitor.visit_string(String::from_utf8_lossy(&payload).into_owned())
                } else {
                    visitor.visit_byte_buf(payload)
                }
            }
            MAJOR_ARRAY => match self.read_arg(info)? {
                Some(n) => {
                    if n > self.limits.max_array_elements as u64 {
                        return Err(Error::limit("array", n, self.limits.max_array_elements));
                    }
                    visitor.visit_seq(SeqAccess {
                        de: self,
                        remaining: Some(n as usize),
                    })
                }
                None => visitor.visit_seq(SeqAccess {
                    de: self,
                    remaining: None,
                }),
            },
            MAJOR_MAP => match self.read_arg(info)? {
                Some(n) => {
                    if n > self.limits.max_map_pairs as u64 {
                        return Err(Error::limit("map", n, self.limits.max_map_pairs));
                    }
                    visitor.visit_map(MapAccess {
                        de: self,
                        remaining: Some(n as usize),
                        struct_keys: false,
                    })
                }
                None => visitor.visit_map(MapAccess {
                    de: self,
                    remaining: None,
                    struct_keys: false,
                }),
            },
            MAJOR_TAG => {
                // Interpret the tag on the generic path: decode the inner
                // item, run the interpreter, and rebind the result.
                let tag = self.definite_arg(info, "a tag number")?;
                self.check_tag_shape(tag)?;
                let inner = CborValue::deserialize(&mut *self)?;
                let value = tags::interpret(tag, inner)?;
                de::Deserializer::deserialize_any(ValueDeserializer::new(value), visitor)
            }
            _ => match info {
                SIMPLE_FALSE => visitor.visit_bool(false),
                SIMPLE_TRUE => visitor.visit_bool(true),
                SIMPLE_NULL | SIMPLE_UNDEFINED => visitor.visit_unit(),
                SIMPLE_EXTENSION => {
                    let v = self.read_u8()?;
                    if v < 32 {
                        Err(Error::malformed(format!("reserved simple value {v}")))
                    } else {
                        Err(Error::type_mismatch("a CBOR item", "simple value"))
                    }
                }
                FLOAT16 => visitor.visit_f64(half_to_double(self.read_be_u16()?)),
                FLOAT32 => {
                    visitor.visit_f32(f32::from_be_bytes(self.read_be_u32()?.to_be_bytes()))
                }
                FLOAT64 => {
                    visitor.visit_f64(f64::from_be_bytes(self.read_be_u64()?.to_be_bytes()))
                }
                INDEFINITE => Err(Error::malformed("unexpected break code")),
                _ => Err(Error::malformed(format!("reserved simple value {info}"))),
            },
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        if major == MAJOR_SIMPLE {
            match info {
                SIMPLE_FALSE => return visitor.visit_bool(false),
                SIMPLE_TRUE => return visitor.visit_bool(true),
                SIMPLE_NULL | SIMPLE_UNDEFINED => return visitor.visit_bool(false),
                _ => {}
            }
        }
        Err(Error::type_mismatch("boolean", found_name(major, info)))
    }

    deserialize_integer!(deserialize_i8, visit_i8, i8, "an 8-bit signed integer");
    deserialize_integer!(deserialize_i16, visit_i16, i16, "a 16-bit signed integer");
    deserialize_integer!(deserialize_i32, visit_i32, i32, "a 32-bit signed integer");
    deserialize_integer!(deserialize_i64, visit_i64, i64, "a 64-bit signed integer");
    deserialize_integer!(deserialize_i128, visit_i128, i128, "a 128-bit signed integer");
    deserialize_integer!(deserialize_u8, visit_u8, u8, "an 8-bit unsigned integer");
    deserialize_integer!(deserialize_u16, visit_u16, u16, "a 16-bit unsigned integer");
    deserialize_integer!(deserialize_u32, visit_u32, u32, "a 32-bit unsigned integer");
    deserialize_integer!(deserialize_u64, visit_u64, u64, "a 64-bit unsigned integer");
    deserialize_integer!(deserialize_u128, visit_u128, u128, "a 128-bit unsigned integer");

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.read_number("a 32-bit float")? {
            Num::Int(i) => visitor.visit_f32(i as f32),
            Num::Float(f) => visitor.visit_f32(f as f32),
            Num::Null => visitor.visit_f32(0.0),
        }
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.read_number("a 64-bit float")? {
            Num::Int(i) => visitor.visit_f64(i as f64),
            Num::Float(f) => visitor.visit_f64(f),
            Num::Null => visitor.visit_f64(0.0),
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        if major != MAJOR_TEXT {
            return Err(Error::type_mismatch("a single character", found_name(major, info)));
        }
        let payload = self.read_string_payload(major, info)?;
        let text = String::from_utf8_lossy(&payload);
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::type_mismatch("a single character", "text string")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            // A byte string binds to a text destination without UTF-8
            // validation; ill-formed sequences are replaced, not rejected.
            MAJOR_TEXT | MAJOR_BYTES => {
                let payload = self.read_string_payload(major, info)?;
                visitor.visit_string(String::from_utf8_lossy(&payload).into_owned())
            }
            MAJOR_SIMPLE if info == SIMPLE_NULL || info == SIMPLE_UNDEFINED => {
                visitor.visit_str("")
            }
            _ => Err(Error::type_mismatch("text string", found_name(major, info))),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_BYTES | MAJOR_TEXT => {
                let payload = self.read_string_payload(major, info)?;
                visitor.visit_byte_buf(payload)
            }
            MAJOR_SIMPLE if info == SIMPLE_NULL || info == SIMPLE_UNDEFINED => {
                visitor.visit_byte_buf(Vec::new())
            }
            _ => Err(Error::type_mismatch("byte string", found_name(major, info))),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.peek_u8()? {
            0xF6 | 0xF7 => {
                self.read_u8()?;
                visitor.visit_none()
            }
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        if major == MAJOR_SIMPLE && (info == SIMPLE_NULL || info == SIMPLE_UNDEFINED) {
            visitor.visit_unit()
        } else {
            Err(Error::type_mismatch("null", found_name(major, info)))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == RAW_TOKEN {
            let mut buf = Vec::new();
            self.capture_item(&mut buf)?;
            return visitor.visit_byte_buf(buf);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_ARRAY => match self.read_arg(info)? {
                Some(n) => {
                    if n > self.limits.max_array_elements as u64 {
                        return Err(Error::limit("array", n, self.limits.max_array_elements));
                    }
                    visitor.visit_seq(SeqAccess {
                        de: self,
                        remaining: Some(n as usize),
                    })
                }
                None => visitor.visit_seq(SeqAccess {
                    de: self,
                    remaining: None,
                }),
            },
            // Byte and text strings bind to sequence-of-byte destinations.
            MAJOR_BYTES | MAJOR_TEXT => {
                let payload = self.read_string_payload(major, info)?;
                visitor.visit_seq(ByteSeqAccess {
                    iter: payload.into_iter(),
                })
            }
            MAJOR_SIMPLE if info == SIMPLE_NULL || info == SIMPLE_UNDEFINED => {
                visitor.visit_seq(SeqAccess {
                    de: self,
                    remaining: Some(0),
                })
            }
            _ => Err(Error::type_mismatch("array", found_name(major, info))),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        if major != MAJOR_ARRAY {
            return Err(Error::type_mismatch("array", found_name(major, info)));
        }
        match self.read_arg(info)? {
            Some(n) => {
                if n as usize != len {
                    return Err(Error::LengthMismatch {
                        expected: len,
                        found: n as usize,
                    });
                }
                visitor.visit_seq(SeqAccess {
                    de: self,
                    remaining: Some(len),
                })
            }
            None => {
                let value = visitor.visit_seq(SeqAccess {
                    de: &mut *self,
                    remaining: None,
                })?;
                // The destination stops at `len` elements; anything left
                // before the break means the wire length did not match.
                let mut extra = 0usize;
                while self.peek_u8()? != BREAK {
                    self.skip_item()?;
                    extra += 1;
                }
                self.read_u8()?;
                if extra > 0 {
                    return Err(Error::LengthMismatch {
                        expected: len,
                        found: len + extra,
                    });
                }
                Ok(value)
            }
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_MAP => match self.read_arg(info)? {
                Some(n) => {
                    if n > self.limits.max_map_pairs as u64 {
                        return Err(Error::limit("map", n, self.limits.max_map_pairs));
                    }
                    visitor.visit_map(MapAccess {
                        de: self,
                        remaining: Some(n as usize),
                        struct_keys: false,
                    })
                }
                None => visitor.visit_map(MapAccess {
                    de: self,
                    remaining: None,
                    struct_keys: false,
                }),
            },
            MAJOR_SIMPLE if info == SIMPLE_NULL || info == SIMPLE_UNDEFINED => {
                visitor.visit_map(MapAccess {
                    de: self,
                    remaining: Some(0),
                    struct_keys: false,
                })
            }
            _ => Err(Error::type_mismatch("map", found_name(major, info))),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            MAJOR_MAP => match self.read_arg(info)? {
                Some(n) => {
                    if n > self.limits.max_map_pairs as u64 {
                        return Err(Error::limit("map", n, self.limits.max_map_pairs));
                    }
                    visitor.visit_map(MapAccess {
                        de: self,
                        remaining: Some(n as usize),
                        struct_keys: true,
                    })
                }
                None => visitor.visit_map(MapAccess {
                    de: self,
                    remaining: None,
                    struct_keys: true,
                }),
            },
            MAJOR_SIMPLE if info == SIMPLE_NULL || info == SIMPLE_UNDEFINED => {
                visitor.visit_map(MapAccess {
                    de: self,
                    remaining: Some(0),
                    struct_keys: true,
                })
            }
            _ => Err(Error::type_mismatch("map", found_name(major, info))),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let (major, info) = self.read_head_skipping_tags()?;
        match major {
            // A unit variant is encoded as its name.
            MAJOR_TEXT => {
                let payload = self.read_string_payload(major, info)?;
                let name = String::from_utf8_lossy(&payload).into_owned();
                visitor.visit_enum(name.into_deserializer())
            }
            // A variant with data is a single-entry map {variant: payload}.
            MAJOR_MAP => {
                match self.read_arg(info)? {
                    Some(1) => {}
                    Some(n) => {
                        return Err(Error::malformed(format!(
                            "enum variant map must have one entry, found {n}"
                        )))
                    }
                    None => {
                        return Err(Error::malformed(
                            "enum variant map must be definite-length",
                        ))
                    }
                }
                visitor.visit_enum(VariantAccess { de: self })
            }
            _ => Err(Error::type_mismatch("enum", found_name(major, info))),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.skip_item()?;
        visitor.visit_unit()
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

struct SeqAccess<'a, R: Read> {
    de: &'a mut Decoder<R>,
    remaining: Option<usize>,
}

impl<'de, R: Read> de::SeqAccess<'de> for SeqAccess<'_, R> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        match self.remaining {
            Some(0) => Ok(None),
            Some(ref mut n) => {
                *n -= 1;
                seed.deserialize(&mut *self.de).map(Some)
            }
            None => {
                if self.de.peek_u8()? == BREAK {
                    self.de.read_u8()?;
                    return Ok(None);
                }
                seed.deserialize(&mut *self.de).map(Some)
            }
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

/// Feeds the octets of a byte or text string as individual `u8` elements,
/// so byte strings bind to plain `Vec<u8>`-style destinations.
struct ByteSeqAccess {
    iter: std::vec::IntoIter<u8>,
}

impl<'de> de::SeqAccess<'de> for ByteSeqAccess {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(byte) => seed.deserialize(byte.into_deserializer()).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccess<'a, R: Read> {
    de: &'a mut Decoder<R>,
    remaining: Option<usize>,
    /// When binding a record, keys are stringified into field selectors.
    struct_keys: bool,
}

impl<'de, R: Read> de::MapAccess<'de> for MapAccess<'_, R> {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut n) => *n -= 1,
            None => {
                if self.de.peek_u8()? == BREAK {
                    self.de.read_u8()?;
                    return Ok(None);
                }
            }
        }
        if self.struct_keys {
            let selector = self.de.read_field_selector()?;
            seed.deserialize(selector.into_deserializer()).map(Some)
        } else {
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        self.remaining
    }
}

/// Enum access for data-carrying variants encoded as `{variant: payload}`.
struct VariantAccess<'a, R: Read> {
    de: &'a mut Decoder<R>,
}

impl<'de, 'a, R: Read> de::EnumAccess<'de> for VariantAccess<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: de::DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self)> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de, R: Read> de::VariantAccess<'de> for VariantAccess<'_, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Err(Error::custom("expected a variant payload"))
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(&mut *self.de, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(&mut *self.de, "", fields, visitor)
    }
}

/// Binds an already-decoded [`CborValue`] into a typed destination.
///
/// This is the bridge behind [`from_value`](crate::from_value), and the
/// rebinding step that generic tag interpretation goes through.
pub struct ValueDeserializer {
    value: CborValue,
}

impl ValueDeserializer {
    pub fn new(value: CborValue) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            CborValue::Null => visitor.visit_unit(),
            CborValue::Bool(b) => visitor.visit_bool(b),
            CborValue::Integer(i) => {
                if let Ok(v) = i64::try_from(i) {
                    visitor.visit_i64(v)
                } else if let Ok(v) = u64::try_from(i) {
                    visitor.visit_u64(v)
                } else {
                    visitor.visit_i128(i)
                }
            }
            CborValue::Float(f) => visitor.visit_f64(f),
            CborValue::Bytes(b) => visitor.visit_byte_buf(b),
            CborValue::Text(s) => visitor.visit_string(s),
            CborValue::Array(arr) => visitor.visit_seq(ValueSeqAccess {
                iter: arr.into_iter(),
            }),
            CborValue::Map(map) => visitor.visit_map(ValueMapAccess {
                iter: map.into_iter(),
                value: None,
            }),
            // Rich values travel as (tag, natural projection) pairs; the
            // generic visitor re-interprets them losslessly.
            CborValue::Date(dt) => visitor.visit_enum(ValueTagAccess {
                tag: tags::TAG_DATETIME_STRING,
                inner: CborValue::Text(dt.to_rfc3339()),
            }),
            CborValue::BigInt(big) => {
                use num_bigint::Sign;
                if big.sign() == Sign::Minus {
                    let magnitude = -big - 1i32;
                    visitor.visit_enum(ValueTagAccess {
                        tag: tags::TAG_NEGATIVE_BIGNUM,
                        inner: CborValue::Bytes(magnitude.to_bytes_be().1),
                    })
                } else {
                    visitor.visit_enum(ValueTagAccess {
                        tag: tags::TAG_POSITIVE_BIGNUM,
                        inner: CborValue::Bytes(big.to_bytes_be().1),
                    })
                }
            }
            CborValue::Url(url) => visitor.visit_enum(ValueTagAccess {
                tag: tags::TAG_URI,
                inner: CborValue::Text(url.to_string()),
            }),
            CborValue::Regex(re) => visitor.visit_enum(ValueTagAccess {
                tag: tags::TAG_REGEX,
                inner: CborValue::Text(re.as_str().to_string()),
            }),
            CborValue::Mime(m) => visitor.visit_enum(ValueTagAccess {
                tag: tags::TAG_MIME,
                inner: CborValue::Text(m.source().to_string()),
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            CborValue::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == RAW_TOKEN {
            let bytes = crate::to_vec(&self.value)?;
            return visitor.visit_byte_buf(bytes);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            CborValue::Text(s) => visitor.visit_enum(s.into_deserializer()),
            CborValue::Map(map) => {
                if map.len() != 1 {
                    return Err(Error::custom("enum variant map must have one entry"));
                }
                let (key, value) = map.into_iter().next().expect("single entry");
                let variant = match key {
                    Key::Text(s) => s,
                    other => {
                        return Err(Error::custom(format!(
                            "enum variant key must be text, found {other:?}"
                        )))
                    }
                };
                visitor.visit_enum(ValueEnumAccess { variant, value })
            }
            other => Err(Error::type_mismatch("enum", other.kind_name())),
        }
    }

    fn is_human_readable(&self) -> bool {
        false
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct ValueSeqAccess {
    iter: std::vec::IntoIter<CborValue>,
}

impl<'de> de::SeqAccess<'de> for ValueSeqAccess {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct ValueMapAccess {
    iter: indexmap::map::IntoIter<Key, CborValue>,
    value: Option<CborValue>,
}

impl<'de> de::MapAccess<'de> for ValueMapAccess {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("map value requested before its key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct KeyDeserializer {
    key: Key,
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.key {
            Key::Bool(b) => visitor.visit_bool(b),
            Key::Integer(i) => {
                if let Ok(v) = i64::try_from(i) {
                    visitor.visit_i64(v)
                } else if let Ok(v) = u64::try_from(i) {
                    visitor.visit_u64(v)
                } else {
                    visitor.visit_i128(i)
                }
            }
            Key::Text(s) => visitor.visit_string(s),
            Key::Bytes(b) => visitor.visit_byte_buf(b),
        }
    }

    /// Record field selectors match by their stringified form, whatever the
    /// wire key kind was.
    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.key {
            Key::Bool(b) => visitor.visit_string(b.to_string()),
            Key::Integer(i) => visitor.visit_string(i.to_string()),
            Key::Text(s) => visitor.visit_string(s),
            Key::Bytes(b) => visitor.visit_string(String::from_utf8_lossy(&b).into_owned()),
        }
    }

    fn is_human_readable(&self) -> bool {
        false
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum ignored_any
    }
}

/// Enum access over an already-decoded `{variant: payload}` map.
struct ValueEnumAccess {
    variant: String,
    value: CborValue,
}

impl<'de> de::EnumAccess<'de> for ValueEnumAccess {
    type Error = Error;
    type Variant = ValueVariantAccess;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((variant, ValueVariantAccess { value: self.value }))
    }
}

struct ValueVariantAccess {
    value: CborValue,
}

impl<'de> de::VariantAccess<'de> for ValueVariantAccess {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            CborValue::Null => Ok(()),
            other => Err(Error::type_mismatch("unit variant", other.kind_name())),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.value {
            CborValue::Array(arr) => visitor.visit_seq(ValueSeqAccess {
                iter: arr.into_iter(),
            }),
            other => Err(Error::type_mismatch("tuple variant", other.kind_name())),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            CborValue::Map(map) => visitor.visit_map(ValueMapAccess {
                iter: map.into_iter(),
                value: None,
            }),
            other => Err(Error::type_mismatch("struct variant", other.kind_name())),
        }
    }
}

/// Enum access carrying a tag number and the tagged item's projection, used
/// to move rich values through the generic visitor.
struct ValueTagAccess {
    tag: u64,
    inner: CborValue,
}

impl<'de> de::EnumAccess<'de> for ValueTagAccess {
    type Error = Error;
    type Variant = ValueTagVariant;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant)> {
        let tag = seed.deserialize(self.tag.into_deserializer())?;
        Ok((tag, ValueTagVariant { inner: self.inner }))
    }
}

struct ValueTagVariant {
    inner: CborValue,
}

impl<'de> de::VariantAccess<'de> for ValueTagVariant {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Err(Error::custom("tagged items carry a payload"))
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(ValueDeserializer::new(self.inner))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(Error::custom("tagged items carry a single payload"))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value> {
        Err(Error::custom("tagged items carry a single payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_slice;

    #[test]
    fn half_float_reference_values() {
        assert_eq!(half_to_double(0x0000), 0.0);
        assert_eq!(half_to_double(0x8000), -0.0);
        assert!(half_to_double(0x8000).is_sign_negative());
        assert_eq!(half_to_double(0x3C00), 1.0);
        assert_eq!(half_to_double(0x3E00), 1.5);
        assert_eq!(half_to_double(0x7BFF), 65504.0);
        assert_eq!(half_to_double(0x7C00), f64::INFINITY);
        assert_eq!(half_to_double(0xFC00), f64::NEG_INFINITY);
        assert!(half_to_double(0x7E00).is_nan());
        // Smallest subnormal: 2^-24.
        assert_eq!(half_to_double(0x0001), 5.960464477539063e-8);
    }

    #[test]
    fn reserved_additional_information_is_malformed() {
        for head in [0x1Cu8, 0x1D, 0x1E] {
            let result: Result<u64> = from_slice(&[head]);
            assert!(matches!(result, Err(Error::Malformed(_))), "head {head:#x}");
        }
    }

    #[test]
    fn truncated_argument_is_eof() {
        // 0x19 declares a 2-byte argument; only 1 byte follows.
        let result: Result<u64> = from_slice(&[0x19, 0x01]);
        assert!(matches!(result, Err(Error::Eof)));
    }

    #[test]
    fn stray_break_is_malformed() {
        let result: Result<CborValue> = from_slice(&[0xFF]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn reserved_simple_values_are_malformed() {
        // Immediate simple 0..=19 are reserved.
        let result: Result<CborValue> = from_slice(&[0xE0]);
        assert!(matches!(result, Err(Error::Malformed(_))));
        // Extension simple values below 32 are reserved.
        let result: Result<CborValue> = from_slice(&[0xF8, 0x10]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn float_into_integer_is_a_type_mismatch() {
        let bytes = [0xFB, 0x40, 0x09, 0x1E, 0xB8, 0x51, 0xEB, 0x85, 0x1F];
        let result: Result<i32> = from_slice(&bytes);
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn integer_narrowing_overflows() {
        let result: Result<i8> = from_slice(&[0x19, 0x01, 0x00]); // 256
        assert!(matches!(result, Err(Error::IntegerOverflow { .. })));

        // -1 does not fit any unsigned destination.
        let result: Result<u64> = from_slice(&[0x20]);
        assert!(matches!(result, Err(Error::IntegerOverflow { .. })));
    }

    #[test]
    fn null_zero_initialises_scalars() {
        assert_eq!(from_slice::<u32>(&[0xF6]).unwrap(), 0);
        assert_eq!(from_slice::<f64>(&[0xF6]).unwrap(), 0.0);
        assert!(!from_slice::<bool>(&[0xF6]).unwrap());
        assert_eq!(from_slice::<String>(&[0xF6]).unwrap(), "");
        assert_eq!(from_slice::<Vec<u32>>(&[0xF6]).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn undefined_binds_like_null() {
        assert_eq!(from_slice::<u32>(&[0xF7]).unwrap(), 0);
        assert_eq!(from_slice::<Option<u32>>(&[0xF7]).unwrap(), None);
    }

    #[test]
    fn skip_handles_nested_containers() {
        // {"a": [1, [2, 3]], "b": 4} decoded into a struct with no matching
        // fields exercises the skip path.
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Empty {}
        let bytes = [
            0xA2, 0x61, 0x61, 0x82, 0x01, 0x82, 0x02, 0x03, 0x61, 0x62, 0x04,
        ];
        let _: Empty = from_slice(&bytes).unwrap();
    }

    #[test]
    fn fixed_length_mismatch() {
        let result: Result<[u8; 3]> = from_slice(&[0x82, 0x01, 0x02]);
        assert!(matches!(
            result,
            Err(Error::LengthMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn tag_on_typed_destination_unwraps_transparently() {
        // Tag 0 around a text string still binds to String.
        let mut bytes = vec![0xC0, 0x74];
        bytes.extend_from_slice(b"2013-03-21T20:04:00Z");
        let s: String = from_slice(&bytes).unwrap();
        assert_eq!(s, "2013-03-21T20:04:00Z");
    }

    #[test]
    fn tag_with_wrong_shape_fails_on_typed_destination() {
        // Tag 0 (date-time) expects text; an integer payload is a shape
        // mismatch even when the destination would accept the integer.
        let result: Result<u64> = from_slice(&[0xC0, 0x01]);
        assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 0, .. })));
    }
}
