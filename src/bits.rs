//! Bitstring helpers
//!
//! Bitstrings cross the public API as `"0"`/`"1"` text with position i
//! standing for qubit i. Internally they are `Vec<bool>`.

use crate::error::{Result, ValidationError};

/// Parse a `"0"`/`"1"` string into bits, naming `field` in any error.
pub fn parse_bits(text: &str, field: &'static str) -> Result<Vec<bool>> {
    text.chars()
        .enumerate()
        .map(|(position, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            found => Err(ValidationError::InvalidBit { field, position, found }.into()),
        })
        .collect()
}

/// Render bits as a `"0"`/`"1"` string.
pub fn to_bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Count of differing positions between two equal-length bitstrings.
pub fn hamming_distance(a: &str, b: &str) -> Result<usize> {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a != len_b {
        return Err(ValidationError::LengthMismatch {
            expected: len_b,
            actual: len_a,
        }
        .into());
    }
    Ok(a.chars().zip(b.chars()).filter(|(x, y)| x != y).count())
}

/// Stretch `key` to `len` bits, truncating or repeating it cyclically.
///
/// An empty key stretches to all zeros, so it flips nothing.
pub fn fit_key(key: &[bool], len: usize) -> Vec<bool> {
    if key.is_empty() {
        return vec![false; len];
    }
    key.iter().copied().cycle().take(len).collect()
}
