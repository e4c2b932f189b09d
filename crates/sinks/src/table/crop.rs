//! Size-bounded string cropping
//!
//! The store measures strings in UTF-16 bytes (two per code unit). Cropping
//! keeps a prefix whose encoded size fits, and never cuts between the two
//! halves of a surrogate pair.

/// Largest string value the store accepts, in UTF-16 bytes
pub const MAX_STRING_BYTES: usize = 64 * 1024;

/// Encoded size of `s` in UTF-16 bytes
#[inline]
pub fn utf16_byte_len(s: &str) -> usize {
    s.encode_utf16().count() * 2
}

/// Longest prefix of `s` whose UTF-16 encoding fits in `max_bytes`
///
/// A character outside the basic multilingual plane occupies a surrogate
/// pair; it is either kept whole or dropped whole.
pub fn crop(s: &str, max_bytes: usize) -> &str {
    let max_units = max_bytes / 2;

    // UTF-8 length never undercounts UTF-16 units
    if s.len() <= max_units {
        return s;
    }

    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &s[..idx];
        }
    }
    s
}

/// The cropping rule applied directly to UTF-16 code units
///
/// This is the unit-level form of [`crop`] for callers that hold raw UTF-16,
/// such as text read from a UTF-16 source that may not be valid Unicode. The
/// cut lands at `max_bytes / 2` units and moves back one unit when it would
/// split a leading surrogate from the trailing surrogate after it. Unpaired
/// surrogates are treated as ordinary units. For valid text the result has
/// the same length as [`crop`] on the decoded string.
pub fn crop_utf16(units: &[u16], max_bytes: usize) -> &[u16] {
    let max_units = max_bytes / 2;
    if units.len() <= max_units {
        return units;
    }

    let mut end = max_units;
    if end > 0 && is_leading_surrogate(units[end - 1]) && is_trailing_surrogate(units[end]) {
        end -= 1;
    }
    &units[..end]
}

#[inline]
fn is_leading_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

#[inline]
fn is_trailing_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}
