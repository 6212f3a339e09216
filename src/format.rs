//! CBOR Wire Format Notes
//!
//! This module documents the Concise Binary Object Representation wire
//! format (RFC 7049, revised by RFC 8949) as implemented by this library.
//! It contains no code.
//!
//! # Items and heads
//!
//! Every item begins with a one-byte *head*. The high three bits are the
//! *major type*; the low five bits are the *additional information* (ai):
//!
//! | Major | Meaning | Argument is |
//! |-------|------------------|---------------------------|
//! | 0 | unsigned integer | the value |
//! | 1 | negative integer | value = -1 - argument |
//! | 2 | byte string | payload length in bytes |
//! | 3 | text string | payload length in bytes |
//! | 4 | array | element count |
//! | 5 | map | pair count |
//! | 6 | tag | the tag number |
//! | 7 | simple / float | the simple value or float |
//!
//! The *argument* is resolved from the ai field:
//!
//! - `0..=23`: the argument is the ai value itself.
//! - `24`, `25`, `26`, `27`: the argument follows in 1, 2, 4, or 8 bytes,
//!   big-endian (network byte order).
//! - `28..=30`: reserved; such a head is malformed.
//! - `31`: indefinite length (strings, arrays, maps) or, for major type 7,
//!   the *break* stop code `0xFF`.
//!
//! A decoder accepts any argument width; an encoder here always emits the
//! shortest head that fits.
//!
//! # Simple values and floats (major type 7)
//!
//! | ai | Meaning |
//! |---------|-----------------------------------------------|
//! | 20 | false |
//! | 21 | true |
//! | 22 | null |
//! | 23 | undefined |
//! | 24 | extension simple value in the next byte (32..=255; lower values reserved) |
//! | 25 | IEEE 754 binary16, 2 bytes |
//! | 26 | IEEE 754 binary32, 4 bytes |
//! | 27 | IEEE 754 binary64, 8 bytes |
//! | 31 | break |
//!
//! Half-precision values are decoded (widened to `f64`); the encoder never
//! produces them.
//!
//! # Indefinite lengths
//!
//! An ai of 31 on a string, array, or map opens an indefinite-length item,
//! terminated by the break byte `0xFF`. Indefinite strings are the
//! concatenation of definite-length chunks of the same major type. The
//! decoder accepts all of these; the encoder emits only definite lengths.
//!
//! # Tags (major type 6)
//!
//! A tag wraps exactly one following item with a semantic meaning. The tags
//! this library interprets are listed in [`crate::tags`]; unknown tags are
//! transparent. Nested tagging is permitted.
//!
//! # Limits
//!
//! Declared lengths are validated against [`crate::DecodeLimits`] before any
//! proportional allocation, so a short hostile input cannot demand large
//! commitments. See the crate-level documentation for an example.
