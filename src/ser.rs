//! CBOR serialization.
//!
//! This module provides the [`Encoder`], a single-pass serde
//! [`Serializer`](serde::Serializer) that writes CBOR to any
//! [`io::Write`] sink, and [`ValueSerializer`], which builds a
//! [`CborValue`] tree instead of bytes.
//!
//! ## Wire choices
//!
//! The encoder is deliberately minimal and non-canonical:
//!
//! - Integer and length heads use the shortest form that fits the argument.
//! - `f32` values are written as 4-byte floats, `f64` as 8-byte floats; no
//!   half-precision shortening is attempted.
//! - Structs are written as maps with the field name (or its rename) as a
//!   text key. Map key order is whatever the value's iteration order is.
//! - Semantic tags and indefinite-length containers are never emitted by the
//!   serde path; [`Encoder::write_tag`] and [`Encoder::write_break`] exist
//!   for callers that need them.
//!
//! ## Usage
//!
//! ```rust
//! use cbor_codec::to_vec;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let bytes = to_vec(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(bytes[0], 0xA2); // map of two pairs
//! ```

use std::io::Write;

use serde::{ser, Serialize};

use crate::error::{Error, Result};
use crate::map::{CborMap, Key};
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
const FLOAT32: u8 = 26;
const FLOAT64: u8 = 27;
const BREAK: u8 = 0xFF;

/// A streaming CBOR encoder over any [`Write`] sink.
///
/// Created via [`Encoder::new`]; most callers use the crate-level
/// [`to_vec`](crate::to_vec) / [`to_writer`](crate::to_writer) instead.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Creates an encoder that writes to `writer`.
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    /// Consumes the encoder and returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the CBOR encoding of `value` to the sink.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self)
    }

    /// Writes a tag head (major type 6). The caller must encode exactly one
    /// item after it.
    pub fn write_tag(&mut self, tag: u64) -> Result<()> {
        self.write_head(MAJOR_TAG, tag)
    }

    /// Writes a break stop code, terminating an indefinite-length container
    /// opened by hand.
    pub fn write_break(&mut self) -> Result<()> {
        self.write_all(&[BREAK])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).map_err(Error::from_write)
    }

    /// Writes a head with the shortest argument encoding that fits.
    fn write_head(&mut self, major: u8, arg: u64) -> Result<()> {
        if arg < 24 {
            self.write_all(&[(major << 5) | arg as u8])
        } else if arg <= u8::MAX as u64 {
            self.write_all(&[(major << 5) | 24, arg as u8])
        } else if arg <= u16::MAX as u64 {
            self.write_all(&[(major << 5) | 25])?;
            self.write_all(&(arg as u16).to_be_bytes())
        } else if arg <= u32::MAX as u64 {
            self.write_all(&[(major << 5) | 26])?;
            self.write_all(&(arg as u32).to_be_bytes())
        } else {
            self.write_all(&[(major << 5) | 27])?;
            self.write_all(&arg.to_be_bytes())
        }
    }

    fn write_simple(&mut self, value: u8) -> Result<()> {
        self.write_all(&[(MAJOR_SIMPLE << 5) | value])
    }
}

impl<'a, W: Write> ser::Serializer for &'a mut Encoder<W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Compound<'a, W>;
    type SerializeTupleVariant = Compound<'a, W>;
    type SerializeMap = Compound<'a, W>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Compound<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_simple(if v { SIMPLE_TRUE } else { SIMPLE_FALSE })
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        if v >= 0 {
            self.write_head(MAJOR_UNSIGNED, v as u64)
        } else {
            self.write_head(MAJOR_NEGATIVE, !(v as u64))
        }
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        if let Ok(u) = u64::try_from(v) {
            self.write_head(MAJOR_UNSIGNED, u)
        } else if let Ok(m) = u64::try_from(-1 - v) {
            self.write_head(MAJOR_NEGATIVE, m)
        } else {
            Err(Error::UnsupportedType(format!(
                "integer {v} outside the 65-bit CBOR range"
            )))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_head(MAJOR_UNSIGNED, v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        u64::try_from(v)
            .map_err(|_| {
                Error::UnsupportedType(format!("integer {v} outside the 64-bit CBOR range"))
            })
            .and_then(|u| self.write_head(MAJOR_UNSIGNED, u))
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.write_all(&[(MAJOR_SIMPLE << 5) | FLOAT32])?;
        self.write_all(&v.to_be_bytes())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_all(&[(MAJOR_SIMPLE << 5) | FLOAT64])?;
        self.write_all(&v.to_be_bytes())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_head(MAJOR_TEXT, v.len() as u64)?;
        self.write_all(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_head(MAJOR_BYTES, v.len() as u64)?;
        self.write_all(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.write_simple(SIMPLE_NULL)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.write_simple(SIMPLE_NULL)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        if name == RAW_TOKEN {
            return value.serialize(RawEmitter { enc: self });
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.write_head(MAJOR_MAP, 1)?;
        self.serialize_str(variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(len) => {
                self.write_head(MAJOR_ARRAY, len as u64)?;
                Ok(Compound::Direct { enc: self })
            }
            // Unknown length: buffer elements, then emit a definite head.
            None => Ok(Compound::Seq {
                enc: self,
                buffer: Vec::new(),
            }),
        }
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.write_head(MAJOR_MAP, 1)?;
        variant.serialize(&mut *self)?;
        self.write_head(MAJOR_ARRAY, len as u64)?;
        Ok(Compound::Direct { enc: self })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            Some(len) => {
                self.write_head(MAJOR_MAP, len as u64)?;
                Ok(Compound::Direct { enc: self })
            }
            // Unknown pair count (e.g. flattened structs): buffer pairs.
            None => Ok(Compound::Map {
                enc: self,
                buffer: Vec::new(),
                pending_key: None,
            }),
        }
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.write_head(MAJOR_MAP, 1)?;
        variant.serialize(&mut *self)?;
        self.write_head(MAJOR_MAP, len as u64)?;
        Ok(Compound::Direct { enc: self })
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Compound-value state for the encoder: either writing elements straight
/// through (length known up front) or buffering them until the count is
/// known.
pub enum Compound<'a, W: Write> {
    Direct {
        enc: &'a mut Encoder<W>,
    },
    Seq {
        enc: &'a mut Encoder<W>,
        buffer: Vec<Vec<u8>>,
    },
    Map {
        enc: &'a mut Encoder<W>,
        buffer: Vec<(Vec<u8>, Vec<u8>)>,
        pending_key: Option<Vec<u8>>,
    },
}

fn encode_to_buf<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut enc = Encoder::new(&mut buf);
    value.serialize(&mut enc)?;
    Ok(buf)
}

impl<W: Write> ser::SerializeSeq for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        match self {
            Compound::Direct { enc } => value.serialize(&mut **enc),
            Compound::Seq { buffer, .. } => {
                buffer.push(encode_to_buf(value)?);
                Ok(())
            }
            Compound::Map { .. } => Err(Error::custom("sequence element in map state")),
        }
    }

    fn end(self) -> Result<()> {
        match self {
            Compound::Direct { .. } => Ok(()),
            Compound::Seq { enc, buffer } => {
                enc.write_head(MAJOR_ARRAY, buffer.len() as u64)?;
                for element in buffer {
                    enc.write_all(&element)?;
                }
                Ok(())
            }
            Compound::Map { .. } => Err(Error::custom("sequence end in map state")),
        }
    }
}

impl<W: Write> ser::SerializeTuple for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeSeq::end(self)
    }
}

impl<W: Write> ser::SerializeTupleStruct for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeSeq::end(self)
    }
}

impl<W: Write> ser::SerializeTupleVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeSeq::end(self)
    }
}

impl<W: Write> ser::SerializeMap for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        match self {
            Compound::Direct { enc } => key.serialize(&mut **enc),
            Compound::Map { pending_key, .. } => {
                *pending_key = Some(encode_to_buf(key)?);
                Ok(())
            }
            Compound::Seq { .. } => Err(Error::custom("map key in sequence state")),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        match self {
            Compound::Direct { enc } => value.serialize(&mut **enc),
            Compound::Map {
                buffer,
                pending_key,
                ..
            } => {
                let key = pending_key
                    .take()
                    .ok_or_else(|| Error::custom("map value without a key"))?;
                buffer.push((key, encode_to_buf(value)?));
                Ok(())
            }
            Compound::Seq { .. } => Err(Error::custom("map value in sequence state")),
        }
    }

    fn end(self) -> Result<()> {
        match self {
            Compound::Direct { .. } => Ok(()),
            Compound::Map {
                enc,
                buffer,
                pending_key,
            } => {
                if pending_key.is_some() {
                    return Err(Error::custom("map key without a value"));
                }
                enc.write_head(MAJOR_MAP, buffer.len() as u64)?;
                for (key, value) in buffer {
                    enc.write_all(&key)?;
                    enc.write_all(&value)?;
                }
                Ok(())
            }
            Compound::Seq { .. } => Err(Error::custom("map end in sequence state")),
        }
    }
}

impl<W: Write> ser::SerializeStruct for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        ser::SerializeMap::serialize_key(self, key)?;
        ser::SerializeMap::serialize_value(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeMap::end(self)
    }
}

impl<W: Write> ser::SerializeStructVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        ser::SerializeMap::serialize_key(self, key)?;
        ser::SerializeMap::serialize_value(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeMap::end(self)
    }
}

/// Accepts exactly one `serialize_bytes` call and splices the bytes into the
/// output verbatim. This is the sink side of the [`RawCbor`](crate::RawCbor)
/// channel.
struct RawEmitter<'a, W: Write> {
    enc: &'a mut Encoder<W>,
}

impl<W: Write> ser::Serializer for RawEmitter<'_, W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = ser::Impossible<(), Error>;
    type SerializeTupleStruct = ser::Impossible<(), Error>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.enc.write_all(v)
    }

    fn serialize_bool(self, _: bool) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_i8(self, _: i8) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_i16(self, _: i16) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_i32(self, _: i32) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_i64(self, _: i64) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_u8(self, _: u8) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_u16(self, _: u16) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_u32(self, _: u32) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_u64(self, _: u64) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_f32(self, _: f32) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_f64(self, _: f64) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_char(self, _: char) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_str(self, _: &str) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_none(self) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_unit(self) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _: &'static str, _: &T) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<()> {
        Err(raw_only())
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(raw_only())
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple> {
        Err(raw_only())
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeTupleStruct> {
        Err(raw_only())
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(raw_only())
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap> {
        Err(raw_only())
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct> {
        Err(raw_only())
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(raw_only())
    }
}

fn raw_only() -> Error {
    Error::custom("raw CBOR payloads must serialize as bytes")
}

/// Serializes any `T: Serialize` into a [`CborValue`] tree instead of bytes.
///
/// This is the bridge behind [`to_value`](crate::to_value).
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = CborValue;
    type Error = Error;
    type SerializeSeq = ValueSeqSerializer;
    type SerializeTuple = ValueSeqSerializer;
    type SerializeTupleStruct = ValueSeqSerializer;
    type SerializeTupleVariant = ValueVariantSeqSerializer;
    type SerializeMap = ValueMapSerializer;
    type SerializeStruct = ValueMapSerializer;
    type SerializeStructVariant = ValueVariantMapSerializer;

    fn serialize_bool(self, v: bool) -> Result<CborValue> {
        Ok(CborValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_i16(self, v: i16) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_i32(self, v: i32) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_i64(self, v: i64) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_i128(self, v: i128) -> Result<CborValue> {
        Ok(CborValue::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_u16(self, v: u16) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_u32(self, v: u32) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_u64(self, v: u64) -> Result<CborValue> {
        Ok(CborValue::Integer(v as i128))
    }

    fn serialize_u128(self, v: u128) -> Result<CborValue> {
        i128::try_from(v)
            .map(CborValue::Integer)
            .map_err(|_| Error::UnsupportedType(format!("integer {v} outside the CBOR range")))
    }

    fn serialize_f32(self, v: f32) -> Result<CborValue> {
        Ok(CborValue::Float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<CborValue> {
        Ok(CborValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<CborValue> {
        Ok(CborValue::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<CborValue> {
        Ok(CborValue::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<CborValue> {
        Ok(CborValue::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<CborValue> {
        Ok(CborValue::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<CborValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<CborValue> {
        Ok(CborValue::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<CborValue> {
        Ok(CborValue::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<CborValue> {
        Ok(CborValue::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<CborValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<CborValue> {
        let mut map = CborMap::with_capacity(1);
        map.insert(Key::from(variant), value.serialize(ValueSerializer)?);
        Ok(CborValue::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(ValueSeqSerializer {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(ValueVariantSeqSerializer {
            variant,
            elements: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(ValueMapSerializer {
            map: CborMap::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(ValueVariantMapSerializer {
            variant,
            map: CborMap::with_capacity(len),
        })
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

pub struct ValueSeqSerializer {
    elements: Vec<CborValue>,
}

impl ser::SerializeSeq for ValueSeqSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CborValue> {
        Ok(CborValue::Array(self.elements))
    }
}

impl ser::SerializeTuple for ValueSeqSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<CborValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for ValueSeqSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<CborValue> {
        ser::SerializeSeq::end(self)
    }
}

pub struct ValueVariantSeqSerializer {
    variant: &'static str,
    elements: Vec<CborValue>,
}

impl ser::SerializeTupleVariant for ValueVariantSeqSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CborValue> {
        let mut map = CborMap::with_capacity(1);
        map.insert(Key::from(self.variant), CborValue::Array(self.elements));
        Ok(CborValue::Map(map))
    }
}

pub struct ValueMapSerializer {
    map: CborMap,
    pending_key: Option<Key>,
}

impl ser::SerializeMap for ValueMapSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::custom("map value without a key"))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CborValue> {
        Ok(CborValue::Map(self.map))
    }
}

impl ser::SerializeStruct for ValueMapSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.map
            .insert(Key::from(key), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CborValue> {
        Ok(CborValue::Map(self.map))
    }
}

pub struct ValueVariantMapSerializer {
    variant: &'static str,
    map: CborMap,
}

impl ser::SerializeStructVariant for ValueVariantMapSerializer {
    type Ok = CborValue;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.map
            .insert(Key::from(key), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<CborValue> {
        let mut outer = CborMap::with_capacity(1);
        outer.insert(Key::from(self.variant), CborValue::Map(self.map));
        Ok(CborValue::Map(outer))
    }
}

/// Serializes a single map key into a [`Key`]. Only scalar keys are
/// representable.
struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = Key;
    type Error = Error;
    type SerializeSeq = ser::Impossible<Key, Error>;
    type SerializeTuple = ser::Impossible<Key, Error>;
    type SerializeTupleStruct = ser::Impossible<Key, Error>;
    type SerializeTupleVariant = ser::Impossible<Key, Error>;
    type SerializeMap = ser::Impossible<Key, Error>;
    type SerializeStruct = ser::Impossible<Key, Error>;
    type SerializeStructVariant = ser::Impossible<Key, Error>;

    fn serialize_bool(self, v: bool) -> Result<Key> {
        Ok(Key::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_i16(self, v: i16) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_i32(self, v: i32) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_i64(self, v: i64) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_i128(self, v: i128) -> Result<Key> {
        Ok(Key::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_u16(self, v: u16) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_u32(self, v: u32) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_u64(self, v: u64) -> Result<Key> {
        Ok(Key::Integer(v as i128))
    }

    fn serialize_char(self, v: char) -> Result<Key> {
        Ok(Key::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Key> {
        Ok(Key::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Key> {
        Ok(Key::Bytes(v.to_vec()))
    }

    fn serialize_f32(self, _: f32) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_f64(self, _: f64) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_u128(self, _: u128) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_none(self) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_unit(self) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_unit_variant(self, _: &'static str, _: u32, variant: &'static str) -> Result<Key> {
        Ok(Key::Text(variant.to_string()))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Key> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Key> {
        Err(non_scalar_key())
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(non_scalar_key())
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple> {
        Err(non_scalar_key())
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeTupleStruct> {
        Err(non_scalar_key())
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(non_scalar_key())
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap> {
        Err(non_scalar_key())
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self::SerializeStruct> {
        Err(non_scalar_key())
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(non_scalar_key())
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

fn non_scalar_key() -> Error {
    Error::UnsupportedType("map keys must be booleans, integers, text, or bytes".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_vec;
    use std::collections::BTreeMap;

    #[test]
    fn integer_heads_are_shortest_form() {
        assert_eq!(to_vec(&0u8).unwrap(), vec![0x00]);
        assert_eq!(to_vec(&23u8).unwrap(), vec![0x17]);
        assert_eq!(to_vec(&24u8).unwrap(), vec![0x18, 0x18]);
        assert_eq!(to_vec(&255u32).unwrap(), vec![0x18, 0xFF]);
        assert_eq!(to_vec(&256u32).unwrap(), vec![0x19, 0x01, 0x00]);
        assert_eq!(to_vec(&65536u32).unwrap(), vec![0x1A, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            to_vec(&(u32::MAX as u64 + 1)).unwrap(),
            vec![0x1B, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn negative_integers_use_major_one() {
        assert_eq!(to_vec(&-1i64).unwrap(), vec![0x20]);
        assert_eq!(to_vec(&-24i64).unwrap(), vec![0x37]);
        assert_eq!(to_vec(&-25i64).unwrap(), vec![0x38, 0x18]);
        assert_eq!(to_vec(&-500i64).unwrap(), vec![0x39, 0x01, 0xF3]);
        assert_eq!(
            to_vec(&i64::MIN).unwrap(),
            vec![0x3B, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn floats_use_fixed_width() {
        assert_eq!(to_vec(&3.14f32).unwrap(), vec![0xFA, 0x40, 0x48, 0xF5, 0xC3]);
        assert_eq!(
            to_vec(&3.14f64).unwrap(),
            vec![0xFB, 0x40, 0x09, 0x1E, 0xB8, 0x51, 0xEB, 0x85, 0x1F]
        );
    }

    #[test]
    fn simple_values() {
        assert_eq!(to_vec(&true).unwrap(), vec![0xF5]);
        assert_eq!(to_vec(&false).unwrap(), vec![0xF4]);
        assert_eq!(to_vec(&Option::<u8>::None).unwrap(), vec![0xF6]);
        assert_eq!(to_vec(&()).unwrap(), vec![0xF6]);
    }

    #[test]
    fn text_and_array() {
        assert_eq!(
            to_vec(&"hello").unwrap(),
            vec![0x65, 0x68, 0x65, 0x6C, 0x6C, 0x6F]
        );
        assert_eq!(to_vec(&vec![1u8, 2]).unwrap(), vec![0x82, 0x01, 0x02]);
    }

    #[test]
    fn map_pair_count_matches() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u8);
        map.insert("b".to_string(), 2u8);
        let bytes = to_vec(&map).unwrap();
        assert_eq!(bytes[0], 0xA2);
    }

    #[test]
    fn out_of_range_integers_are_unsupported() {
        let v = u128::from(u64::MAX) + 1;
        assert!(matches!(
            to_vec(&v),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn write_tag_emits_major_six() {
        let mut buf = Vec::new();
        let mut enc = Encoder::new(&mut buf);
        enc.write_tag(32).unwrap();
        enc.encode(&"https://example.com").unwrap();
        assert_eq!(buf[0], 0xD8);
        assert_eq!(buf[1], 32);
    }
}
