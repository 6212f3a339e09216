//! Resource limits for the decoder.
//!
//! Every declared length in the input (array element counts, map pair counts,
//! text and byte string lengths) is checked against a configurable maximum
//! *before* any allocation proportional to it. This bounds the memory an
//! attacker can make the decoder commit with a short, hostile input.
//!
//! All four limits default to [`DEFAULT_MAX`] (1,000,000), which is generous
//! for typical payloads. Lower them to shrink the decoder's worst-case memory
//! footprint, or raise them individually for large inputs.
//!
//! ## Examples
//!
//! ```rust
//! use cbor_codec::{from_slice_with_limits, DecodeLimits};
//!
//! let limits = DecodeLimits::new().with_max_array_elements(16);
//! let bytes = [0x83, 0x01, 0x02, 0x03]; // [1, 2, 3]
//! let v: Vec<u64> = from_slice_with_limits(&bytes, limits).unwrap();
//! assert_eq!(v, vec![1, 2, 3]);
//! ```

/// The default maximum used for all four decode limits.
///
/// Generous enough for most use cases; decrease it to reduce the memory the
/// decoder may commit for a single hostile input.
pub const DEFAULT_MAX: usize = 1_000_000;

/// Per-decoder resource limits.
///
/// The four limits are independent; [`DecodeLimits::with_max`] sets all of
/// them to the same value in one call.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::DecodeLimits;
///
/// let limits = DecodeLimits::new()
///     .with_max_map_pairs(1024)
///     .with_max_string_bytes(65536);
/// assert_eq!(limits.max_map_pairs, 1024);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum number of elements in a single array.
    pub max_array_elements: usize,
    /// Maximum number of key/value pairs in a single map.
    pub max_map_pairs: usize,
    /// Maximum number of bytes in a single text string (including the total
    /// of an indefinite-length string's chunks).
    pub max_string_bytes: usize,
    /// Maximum number of bytes in a single byte string.
    pub max_bytes: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits {
            max_array_elements: DEFAULT_MAX,
            max_map_pairs: DEFAULT_MAX,
            max_string_bytes: DEFAULT_MAX,
            max_bytes: DEFAULT_MAX,
        }
    }
}

impl DecodeLimits {
    /// Creates the default limits (all four set to [`DEFAULT_MAX`]).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets all four limits to `n`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbor_codec::DecodeLimits;
    ///
    /// let limits = DecodeLimits::new().with_max(64);
    /// assert_eq!(limits.max_array_elements, 64);
    /// assert_eq!(limits.max_bytes, 64);
    /// ```
    #[must_use]
    pub fn with_max(mut self, n: usize) -> Self {
        self.max_array_elements = n;
        self.max_map_pairs = n;
        self.max_string_bytes = n;
        self.max_bytes = n;
        self
    }

    /// Sets the maximum number of elements in an array.
    #[must_use]
    pub fn with_max_array_elements(mut self, n: usize) -> Self {
        self.max_array_elements = n;
        self
    }

    /// Sets the maximum number of key/value pairs in a map.
    #[must_use]
    pub fn with_max_map_pairs(mut self, n: usize) -> Self {
        self.max_map_pairs = n;
        self
    }

    /// Sets the maximum number of bytes in a text string.
    #[must_use]
    pub fn with_max_string_bytes(mut self, n: usize) -> Self {
        self.max_string_bytes = n;
        self
    }

    /// Sets the maximum number of bytes in a byte string.
    #[must_use]
    pub fn with_max_bytes(mut self, n: usize) -> Self {
        self.max_bytes = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = DecodeLimits::new();
        assert_eq!(limits.max_array_elements, DEFAULT_MAX);
        assert_eq!(limits.max_map_pairs, DEFAULT_MAX);
        assert_eq!(limits.max_string_bytes, DEFAULT_MAX);
        assert_eq!(limits.max_bytes, DEFAULT_MAX);
    }

    #[test]
    fn with_max_sets_all_four() {
        let limits = DecodeLimits::new().with_max(7);
        assert_eq!(
            limits,
            DecodeLimits {
                max_array_elements: 7,
                max_map_pairs: 7,
                max_string_bytes: 7,
                max_bytes: 7,
            }
        );
    }

    #[test]
    fn individual_setters_are_independent() {
        let limits = DecodeLimits::new()
            .with_max_array_elements(1)
            .with_max_string_bytes(3);
        assert_eq!(limits.max_array_elements, 1);
        assert_eq!(limits.max_map_pairs, DEFAULT_MAX);
        assert_eq!(limits.max_string_bytes, 3);
    }
}
