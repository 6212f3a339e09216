use chrono::{DateTime, TimeZone, Utc};
use num_bigint::BigInt;

use cbor_codec::{from_slice, to_vec, Decoder, Encoder, Error, Value};

fn tagged(tag: u64, item_bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut enc = Encoder::new(&mut buf);
    enc.write_tag(tag).unwrap();
    drop(enc);
    buf.extend_from_slice(item_bytes);
    buf
}

fn text_item(s: &str) -> Vec<u8> {
    to_vec(&s).unwrap()
}

#[test]
fn tag_0_rfc3339_datetime() {
    let bytes = tagged(0, &text_item("2013-03-21T20:04:00Z"));
    let value: Value = from_slice(&bytes).unwrap();
    let expected: DateTime<Utc> = Utc.with_ymd_and_hms(2013, 3, 21, 20, 4, 0).unwrap();
    assert_eq!(value, Value::Date(expected));
}

#[test]
fn tag_0_with_offset_normalises_to_utc() {
    let bytes = tagged(0, &text_item("2013-03-21T22:04:00+02:00"));
    let value: Value = from_slice(&bytes).unwrap();
    let expected: DateTime<Utc> = Utc.with_ymd_and_hms(2013, 3, 21, 20, 4, 0).unwrap();
    assert_eq!(value, Value::Date(expected));
}

#[test]
fn tag_0_rejects_unparseable_text() {
    let bytes = tagged(0, &text_item("yesterday-ish"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 0, .. })));
}

#[test]
fn tag_0_rejects_non_text() {
    let bytes = tagged(0, &[0x01]);
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 0, .. })));
}

#[test]
fn tag_1_integer_epoch() {
    // 1(1363896240)
    let bytes = tagged(1, &to_vec(&1_363_896_240u64).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    let expected = DateTime::from_timestamp(1_363_896_240, 0).unwrap();
    assert_eq!(value, Value::Date(expected));
}

#[test]
fn tag_1_fractional_epoch() {
    let bytes = tagged(1, &to_vec(&1_363_896_240.5f64).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    let expected = DateTime::from_timestamp(1_363_896_240, 500_000_000).unwrap();
    assert_eq!(value, Value::Date(expected));
}

#[test]
fn tag_1_rejects_text() {
    let bytes = tagged(1, &text_item("1363896240"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 1, .. })));
}

#[test]
fn tag_2_positive_bignum() {
    // 2(h'010000000000000000') = 2^64
    let bytes = tagged(2, &to_vec(&cbor_bytes(&[1, 0, 0, 0, 0, 0, 0, 0, 0])).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::BigInt(BigInt::from(1u8) << 64));
}

#[test]
fn tag_3_negative_bignum() {
    // 3(h'010000000000000000') = -1 - 2^64
    let bytes = tagged(3, &to_vec(&cbor_bytes(&[1, 0, 0, 0, 0, 0, 0, 0, 0])).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::BigInt(-(BigInt::from(1u8) << 64u32) - 1i32));
}

#[test]
fn tag_4_decimal_fraction() {
    // 4([-2, 27315]) = 273.15
    let bytes = tagged(4, &to_vec(&(-2i64, 27315u64)).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    match value {
        Value::Float(f) => assert!((f - 273.15).abs() < 1e-9),
        other => panic!("expected float, got {other:?}"),
    }

    // 4([2, 3]) = 300, exact.
    let bytes = tagged(4, &to_vec(&(2u64, 3u64)).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::BigInt(BigInt::from(300)));
}

#[test]
fn tag_5_bigfloat() {
    // 5([-1, 3]) = 1.5
    let bytes = tagged(5, &to_vec(&(-1i64, 3u64)).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::Float(1.5));
}

#[test]
fn tag_5_bignum_mantissa_is_not_implemented() {
    // 5([0, 2(h'01')]): the mantissa is itself a bignum.
    let mut inner = vec![0x82, 0x00];
    inner.extend_from_slice(&tagged(2, &to_vec(&cbor_bytes(&[1])).unwrap()));
    let bytes = tagged(5, &inner);
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::NotImplemented(_))));
}

#[test]
fn tag_4_wrong_arity() {
    let bytes = tagged(4, &to_vec(&vec![1u64]).unwrap());
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 4, .. })));
}

#[test]
fn base_hint_tags_pass_bytes_through() {
    for tag in [21u64, 22, 23] {
        let bytes = tagged(tag, &to_vec(&cbor_bytes(&[1, 2, 3])).unwrap());
        let value: Value = from_slice(&bytes).unwrap();
        assert_eq!(value, Value::Bytes(vec![1, 2, 3]), "tag {tag}");
    }
}

#[test]
fn base_hint_tag_rejects_text() {
    let bytes = tagged(21, &text_item("AQID"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 21, .. })));
}

#[test]
fn tag_24_embedded_item() {
    // 24(h'83010203'): the payload is an encoded [1, 2, 3].
    let embedded = to_vec(&vec![1u64, 2, 3]).unwrap();
    let bytes = tagged(24, &to_vec(&cbor_bytes(&embedded)).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
    );
}

#[test]
fn tag_24_rejects_garbage_payload() {
    let bytes = tagged(24, &to_vec(&cbor_bytes(&[0xFF])).unwrap());
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 24, .. })));
}

#[test]
fn tag_32_uri() {
    let bytes = tagged(32, &text_item("https://example.com/path?q=1"));
    let value: Value = from_slice(&bytes).unwrap();
    let url = value.as_url().expect("URL value");
    assert_eq!(url.host_str(), Some("example.com"));
    assert_eq!(url.path(), "/path");
}

#[test]
fn tag_32_rejects_invalid_uri() {
    let bytes = tagged(32, &text_item("not a uri"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 32, .. })));
}

#[test]
fn tag_33_base64url() {
    // "_-8" is base64url for h'FFEF'.
    let bytes = tagged(33, &text_item("_-8"));
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::Bytes(vec![0xFF, 0xEF]));
}

#[test]
fn tag_34_base64() {
    let bytes = tagged(34, &text_item("aGVsbG8="));
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::Bytes(b"hello".to_vec()));
}

#[test]
fn tag_34_rejects_invalid_base64() {
    let bytes = tagged(34, &text_item("!!!"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 34, .. })));
}

#[test]
fn tag_35_regex() {
    let bytes = tagged(35, &text_item("^a+b*$"));
    let value: Value = from_slice(&bytes).unwrap();
    match value {
        Value::Regex(re) => {
            assert_eq!(re.as_str(), "^a+b*$");
            assert!(re.0.is_match("aaab"));
        }
        other => panic!("expected regex, got {other:?}"),
    }
}

#[test]
fn tag_35_rejects_invalid_pattern() {
    let bytes = tagged(35, &text_item("(unclosed"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 35, .. })));
}

#[test]
fn tag_36_mime_message() {
    let message = "Content-Type: text/plain\r\nSubject: greetings\r\n\r\nhello there";
    let bytes = tagged(36, &text_item(message));
    let value: Value = from_slice(&bytes).unwrap();
    match value {
        Value::Mime(m) => {
            assert_eq!(m.header("subject"), Some("greetings"));
            assert_eq!(m.body(), "hello there");
        }
        other => panic!("expected MIME message, got {other:?}"),
    }
}

#[test]
fn tag_36_rejects_headerless_text() {
    let bytes = tagged(36, &text_item("just some text"));
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 36, .. })));
}

#[test]
fn sequence_map_and_set_tags() {
    // 258([1, 2]) is a sequence.
    let bytes = tagged(258, &to_vec(&vec![1u64, 2]).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );

    // 259({"a": 1}) is a map.
    let bytes = tagged(259, &[0xA1, 0x61, 0x61, 0x01]);
    let value: Value = from_slice(&bytes).unwrap();
    assert!(value.is_map());

    // 260([1, 1, 2]) is a set; duplicates collapse.
    let bytes = tagged(260, &to_vec(&vec![1u64, 1, 2]).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );

    // 259 applied to an array is a shape mismatch.
    let bytes = tagged(259, &to_vec(&vec![1u64]).unwrap());
    let result: Result<Value, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 259, .. })));
}

#[test]
fn mirror_range_tags_interpret_like_the_classics() {
    // 262(1363896240) is the mirror of tag 1.
    let bytes = tagged(262, &to_vec(&1_363_896_240u64).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    let expected = DateTime::from_timestamp(1_363_896_240, 0).unwrap();
    assert_eq!(value, Value::Date(expected));

    // 270("https://example.com") is the mirror of tag 32.
    let bytes = tagged(270, &text_item("https://example.com"));
    let value: Value = from_slice(&bytes).unwrap();
    assert!(value.as_url().is_some());

    // 264 is the mirror of tag 3.
    let bytes = tagged(264, &to_vec(&cbor_bytes(&[2])).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::BigInt(BigInt::from(-3)));
}

#[test]
fn unknown_tags_are_transparent() {
    let bytes = tagged(1000, &to_vec(&42u64).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::Integer(42));

    // Typed destinations unwrap unknown tags too.
    let n: u64 = from_slice(&bytes).unwrap();
    assert_eq!(n, 42);
}

#[test]
fn nested_tags_interpret_inside_out() {
    // 1000(2(h'02')): the unknown outer tag is transparent, the inner
    // bignum is interpreted.
    let inner = tagged(2, &to_vec(&cbor_bytes(&[2])).unwrap());
    let bytes = tagged(1000, &inner);
    let value: Value = from_slice(&bytes).unwrap();
    assert_eq!(value, Value::BigInt(BigInt::from(2)));
}

#[test]
fn typed_destinations_unwrap_known_tags_after_shape_check() {
    // 32("https://example.com") into a plain String.
    let bytes = tagged(32, &text_item("https://example.com"));
    let s: String = from_slice(&bytes).unwrap();
    assert_eq!(s, "https://example.com");

    // 2(h'01') into Vec<u8> binds the raw magnitude bytes.
    let bytes = tagged(2, &to_vec(&cbor_bytes(&[1])).unwrap());
    let v: Vec<u8> = from_slice(&bytes).unwrap();
    assert_eq!(v, vec![1]);

    // 32(5) fails the wire-shape check before binding.
    let bytes = tagged(32, &[0x05]);
    let result: Result<u64, Error> = from_slice(&bytes);
    assert!(matches!(result, Err(Error::TagShapeMismatch { tag: 32, .. })));
}

#[test]
fn tagged_values_inside_containers() {
    // {"when": 1(1363896240)} into a generic value.
    let mut bytes = vec![0xA1, 0x64];
    bytes.extend_from_slice(b"when");
    bytes.extend_from_slice(&tagged(1, &to_vec(&1_363_896_240u64).unwrap()));
    let value: Value = from_slice(&bytes).unwrap();
    let when = value.as_map().unwrap().get_text("when").unwrap();
    assert!(when.is_date());
}

#[test]
fn read_tag_exposes_the_number() {
    let bytes = tagged(42, &text_item("payload"));
    let mut decoder = Decoder::new(bytes.as_slice());
    assert_eq!(decoder.read_tag().unwrap(), 42);
    let content: String = decoder.decode().unwrap();
    assert_eq!(content, "payload");
}

#[test]
fn rich_values_reencode_as_their_projections() {
    // A decoded big integer serializes back as its decimal text form (the
    // encoder never emits tags).
    let bytes = tagged(2, &to_vec(&cbor_bytes(&[1, 0])).unwrap());
    let value: Value = from_slice(&bytes).unwrap();
    let reencoded = to_vec(&value).unwrap();
    let text: String = from_slice(&reencoded).unwrap();
    assert_eq!(text, "256");
}

/// Builds a byte-string item for tests (`serde` treats `&[u8]` as a
/// sequence, so route through the dedicated bytes wrapper).
fn cbor_bytes(data: &[u8]) -> ByteString {
    ByteString(data.to_vec())
}

struct ByteString(Vec<u8>);

impl serde::Serialize for ByteString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}
