//! Semantic tag numbers and the tag interpreter.
//!
//! A tag (major type 6) assigns meaning to the item that follows it. The
//! decoder checks the inner item's wire shape against the tag's expectation
//! (a mismatch is [`Error::TagShapeMismatch`]) and, when binding into a
//! generic [`CborValue`](crate::CborValue) destination, interprets the pair
//! into a richer value: timestamps, big integers, URLs, base-decoded bytes,
//! compiled regular expressions, MIME messages.
//!
//! Unknown tags are transparent: the tag number is discarded and the inner
//! item binds as if it were untagged.
//!
//! Tags 261..=274 are the CBOR-flavoured mirrors of the classic range and
//! interpret identically.

use std::fmt;

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, Sign};
use url::Url;

use crate::error::{Error, Result};
use crate::value::{CborRegex, CborValue};

/// Date/time string in RFC 3339 form (text).
pub const TAG_DATETIME_STRING: u64 = 0;
/// Seconds since the POSIX epoch (integer or float).
pub const TAG_EPOCH_DATETIME: u64 = 1;
/// Non-negative big integer (big-endian byte string).
pub const TAG_POSITIVE_BIGNUM: u64 = 2;
/// Negative big integer; value = -1 - magnitude (big-endian byte string).
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
/// Decimal fraction: [exponent, mantissa], value = mantissa * 10^exponent.
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// Bigfloat: [exponent, mantissa], value = mantissa * 2^exponent.
pub const TAG_BIGFLOAT: u64 = 5;
/// Byte string expected to be base64url-encoded on re-encode.
pub const TAG_EXPECT_BASE64URL: u64 = 21;
/// Byte string expected to be base64-encoded on re-encode.
pub const TAG_EXPECT_BASE64: u64 = 22;
/// Byte string expected to be base16-encoded on re-encode.
pub const TAG_EXPECT_BASE16: u64 = 23;
/// An embedded, separately encoded CBOR data item (byte string).
pub const TAG_EMBEDDED_CBOR: u64 = 24;
/// URI (text).
pub const TAG_URI: u64 = 32;
/// base64url-encoded data (text).
pub const TAG_BASE64URL: u64 = 33;
/// base64-encoded data (text).
pub const TAG_BASE64: u64 = 34;
/// Regular expression (text).
pub const TAG_REGEX: u64 = 35;
/// MIME message, headers and body (text).
pub const TAG_MIME: u64 = 36;
/// CBOR sequence (array).
pub const TAG_CBOR_SEQUENCE: u64 = 258;
/// CBOR map (map).
pub const TAG_CBOR_MAP: u64 = 259;
/// CBOR set (array of unique items).
pub const TAG_CBOR_SET: u64 = 260;
/// First tag of the CBOR-flavoured mirror range (261..=274).
pub const TAG_MIRROR_FIRST: u64 = 261;
/// Last tag of the CBOR-flavoured mirror range.
pub const TAG_MIRROR_LAST: u64 = 274;

/// Largest decimal-fraction / bigfloat exponent magnitude the interpreter
/// will expand exactly. Larger exponents would let a three-byte item demand
/// unbounded multiplication work.
const MAX_EXACT_EXPONENT: i128 = 1_000;

/// The wire shape a well-known tag expects for its inner item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shape {
    Text,
    Bytes,
    /// An integer or a float head.
    Number,
    Array,
    Map,
}

impl Shape {
    /// Whether a head `(major, info)` satisfies this shape. A nested tag is
    /// always accepted here; its own shape is checked when it is consumed.
    pub(crate) fn matches(self, major: u8, info: u8) -> bool {
        if major == 6 {
            return true;
        }
        match self {
            Shape::Text => major == 3,
            Shape::Bytes => major == 2,
            Shape::Number => major == 0 || major == 1 || (major == 7 && (25..=27).contains(&info)),
            Shape::Array => major == 4,
            Shape::Map => major == 5,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Shape::Text => "text string",
            Shape::Bytes => "byte string",
            Shape::Number => "integer or float",
            Shape::Array => "array",
            Shape::Map => "map",
        }
    }
}

/// Maps a mirror-range tag onto its classic counterpart; other tags are
/// returned unchanged.
fn canonical(tag: u64) -> u64 {
    const MIRRORS: [u64; 14] = [0, 1, 2, 3, 4, 5, 21, 22, 23, 32, 33, 34, 35, 36];
    if (TAG_MIRROR_FIRST..=TAG_MIRROR_LAST).contains(&tag) {
        MIRRORS[(tag - TAG_MIRROR_FIRST) as usize]
    } else {
        tag
    }
}

/// The expected inner shape for a well-known tag, or `None` when the tag is
/// unknown (and therefore transparent).
pub(crate) fn expected_shape(tag: u64) -> Option<Shape> {
    match canonical(tag) {
        TAG_DATETIME_STRING | TAG_URI | TAG_BASE64URL | TAG_BASE64 | TAG_REGEX | TAG_MIME => {
            Some(Shape::Text)
        }
        TAG_EPOCH_DATETIME => Some(Shape::Number),
        TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM | TAG_EXPECT_BASE64URL | TAG_EXPECT_BASE64
        | TAG_EXPECT_BASE16 | TAG_EMBEDDED_CBOR => Some(Shape::Bytes),
        TAG_DECIMAL_FRACTION | TAG_BIGFLOAT => Some(Shape::Array),
        _ if tag == TAG_CBOR_SEQUENCE || tag == TAG_CBOR_SET => Some(Shape::Array),
        _ if tag == TAG_CBOR_MAP => Some(Shape::Map),
        _ => None,
    }
}

/// Interprets a decoded `(tag, inner)` pair into a rich value.
///
/// Well-known tags whose inner item has the wrong shape fail with
/// [`Error::TagShapeMismatch`]; unknown tags return the inner item
/// unchanged.
pub(crate) fn interpret(tag: u64, inner: CborValue) -> Result<CborValue> {
    match canonical(tag) {
        TAG_DATETIME_STRING => match inner {
            CborValue::Text(s) => parse_rfc3339(tag, &s).map(CborValue::Date),
            other => Err(shape_err(tag, "text string", &other)),
        },
        TAG_EPOCH_DATETIME => match inner {
            CborValue::Integer(secs) => {
                let secs = i64::try_from(secs)
                    .map_err(|_| Error::tag_shape(tag, "epoch seconds out of range"))?;
                DateTime::from_timestamp(secs, 0)
                    .map(CborValue::Date)
                    .ok_or_else(|| Error::tag_shape(tag, "epoch seconds out of range"))
            }
            CborValue::Float(secs) => epoch_from_float(tag, secs).map(CborValue::Date),
            other => Err(shape_err(tag, "integer or float", &other)),
        },
        TAG_POSITIVE_BIGNUM => match inner {
            CborValue::Bytes(b) => Ok(CborValue::BigInt(BigInt::from_bytes_be(Sign::Plus, &b))),
            other => Err(shape_err(tag, "byte string", &other)),
        },
        TAG_NEGATIVE_BIGNUM => match inner {
            CborValue::Bytes(b) => {
                let magnitude = BigInt::from_bytes_be(Sign::Plus, &b);
                Ok(CborValue::BigInt(-magnitude - 1))
            }
            other => Err(shape_err(tag, "byte string", &other)),
        },
        TAG_DECIMAL_FRACTION => scaled_number(tag, inner, 10),
        TAG_BIGFLOAT => scaled_number(tag, inner, 2),
        TAG_EXPECT_BASE64URL | TAG_EXPECT_BASE64 | TAG_EXPECT_BASE16 => match inner {
            // The hint only affects a diagnostic re-encoding, which this
            // encoder never performs; the payload binds as plain bytes.
            bytes @ CborValue::Bytes(_) => Ok(bytes),
            other => Err(shape_err(tag, "byte string", &other)),
        },
        TAG_EMBEDDED_CBOR => match inner {
            CborValue::Bytes(b) => crate::from_slice(&b)
                .map_err(|e| Error::tag_shape(tag, format!("invalid embedded item: {e}"))),
            other => Err(shape_err(tag, "byte string", &other)),
        },
        TAG_URI => match inner {
            CborValue::Text(s) => Url::parse(&s)
                .map(CborValue::Url)
                .map_err(|e| Error::tag_shape(tag, format!("invalid URI: {e}"))),
            other => Err(shape_err(tag, "text string", &other)),
        },
        TAG_BASE64URL => match inner {
            CborValue::Text(s) => decode_base64(tag, &s, &URL_SAFE_NO_PAD).map(CborValue::Bytes),
            other => Err(shape_err(tag, "text string", &other)),
        },
        TAG_BASE64 => match inner {
            CborValue::Text(s) => decode_base64(tag, &s, &STANDARD_NO_PAD).map(CborValue::Bytes),
            other => Err(shape_err(tag, "text string", &other)),
        },
        TAG_REGEX => match inner {
            CborValue::Text(s) => regex::Regex::new(&s)
                .map(|re| CborValue::Regex(CborRegex(re)))
                .map_err(|e| Error::tag_shape(tag, format!("invalid regular expression: {e}"))),
            other => Err(shape_err(tag, "text string", &other)),
        },
        TAG_MIME => match inner {
            CborValue::Text(s) => MimeMessage::parse(&s)
                .map(CborValue::Mime)
                .map_err(|e| Error::tag_shape(tag, format!("invalid MIME message: {e}"))),
            other => Err(shape_err(tag, "text string", &other)),
        },
        _ if tag == TAG_CBOR_SEQUENCE => match inner {
            arr @ CborValue::Array(_) => Ok(arr),
            other => Err(shape_err(tag, "array", &other)),
        },
        _ if tag == TAG_CBOR_MAP => match inner {
            map @ CborValue::Map(_) => Ok(map),
            other => Err(shape_err(tag, "map", &other)),
        },
        _ if tag == TAG_CBOR_SET => match inner {
            CborValue::Array(items) => {
                let mut unique: Vec<CborValue> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                Ok(CborValue::Array(unique))
            }
            other => Err(shape_err(tag, "array", &other)),
        },
        _ => Ok(inner),
    }
}

fn shape_err(tag: u64, expected: &str, found: &CborValue) -> Error {
    Error::tag_shape(tag, format!("expected {expected}, found {}", found.kind_name()))
}

fn parse_rfc3339(tag: u64, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::tag_shape(tag, format!("invalid RFC 3339 date-time: {e}")))
}

fn epoch_from_float(tag: u64, secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(Error::tag_shape(tag, "non-finite epoch seconds"));
    }
    let whole = secs.floor();
    let mut seconds = whole as i64;
    let mut nanos = ((secs - whole) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        seconds += 1;
        nanos -= 1_000_000_000;
    }
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| Error::tag_shape(tag, "epoch seconds out of range"))
}

/// Interprets `[exponent, mantissa]` as `mantissa * base^exponent`.
///
/// A non-negative exponent within [`MAX_EXACT_EXPONENT`] produces an exact
/// `BigInt`; a negative exponent falls back to `f64`. A bignum mantissa
/// (nested tag 2/3) is the deliberately unfinished arithmetic shape.
fn scaled_number(tag: u64, inner: CborValue, base: u32) -> Result<CborValue> {
    let items = match inner {
        CborValue::Array(items) => items,
        other => return Err(shape_err(tag, "array", &other)),
    };
    let [exp_item, mant_item] = match <[CborValue; 2]>::try_from(items) {
        Ok(pair) => pair,
        Err(items) => {
            return Err(Error::tag_shape(
                tag,
                format!("expected [exponent, mantissa], found {} elements", items.len()),
            ))
        }
    };
    let exponent = match exp_item {
        CborValue::Integer(e) => e,
        other => return Err(shape_err(tag, "integer exponent", &other)),
    };
    let mantissa = match mant_item {
        CborValue::Integer(m) => m,
        CborValue::BigInt(_) => {
            return Err(Error::NotImplemented("bignum mantissa in a scaled number"))
        }
        other => return Err(shape_err(tag, "integer mantissa", &other)),
    };
    if exponent.unsigned_abs() > MAX_EXACT_EXPONENT as u128 {
        return Err(Error::tag_shape(tag, "exponent out of range"));
    }
    if exponent >= 0 {
        let scale = num_traits::pow(BigInt::from(base), exponent as usize);
        Ok(CborValue::BigInt(BigInt::from(mantissa) * scale))
    } else {
        let value = (mantissa as f64) * (base as f64).powi(exponent as i32);
        Ok(CborValue::Float(value))
    }
}

fn decode_base64(tag: u64, text: &str, engine: &impl Engine) -> Result<Vec<u8>> {
    // Accept both padded and unpadded encodings.
    let trimmed = text.trim_end_matches('=');
    engine
        .decode(trimmed)
        .map_err(|e| Error::tag_shape(tag, format!("invalid base64 payload: {e}")))
}

/// A MIME message split into header fields and a body, as carried by tag 36.
///
/// The original text is retained verbatim in [`MimeMessage::source`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MimeMessage {
    source: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl MimeMessage {
    /// Parses a message of the form `Header: value` lines, a blank line, and
    /// a body. At least one header field is required; header continuation
    /// lines (leading whitespace) fold into the preceding field.
    pub fn parse(text: &str) -> Result<Self> {
        let (head, body) = match text.split_once("\r\n\r\n") {
            Some((head, body)) => (head, body),
            None => text.split_once("\n\n").unwrap_or((text, "")),
        };

        let mut headers: Vec<(String, String)> = Vec::new();
        for line in head.lines() {
            if line.is_empty() {
                continue;
            }
            if line.starts_with(' ') || line.starts_with('\t') {
                match headers.last_mut() {
                    Some((_, value)) => {
                        value.push(' ');
                        value.push_str(line.trim());
                    }
                    None => return Err(Error::malformed("MIME continuation before any header")),
                }
                continue;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::malformed(format!("malformed MIME header line {line:?}")))?;
            if name.trim().is_empty() {
                return Err(Error::malformed("empty MIME header name"));
            }
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
        if headers.is_empty() {
            return Err(Error::malformed("MIME message has no header fields"));
        }

        Ok(MimeMessage {
            source: text.to_string(),
            headers,
            body: body.to_string(),
        })
    }

    /// The verbatim message text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed header fields, in order of appearance.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The first value of the named header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for MimeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
