//! Variable-length integer decoding.
//!
//! EBML encodes both element IDs and data sizes as variable-length integers:
//! the number of leading zero bits in the first byte gives the total width.
//! IDs keep the length marker bit, sizes strip it. A size whose value bits
//! are all ones means the element size is unknown (live streams).

/// Longest element ID width EBML allows for Matroska.
pub const MAX_ID_LENGTH: usize = 4;

/// Longest data size width.
pub const MAX_SIZE_LENGTH: usize = 8;

/// Outcome of decoding a variable-length integer from a partial buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vint<T> {
    /// More input is needed before the value can be decoded.
    Incomplete,
    /// The leading byte does not describe a legal width.
    Invalid(u8),
    /// Decoded value and the number of bytes it occupied.
    Complete { value: T, len: usize },
}

/// Width of a variable-length integer from its first byte, if legal.
fn width(first: u8, max: usize) -> Option<usize> {
    if first == 0 {
        return None;
    }
    let len = first.leading_zeros() as usize + 1;
    (len <= max).then_some(len)
}

/// Decode an element ID (marker bit retained).
pub fn read_id(buf: &[u8]) -> Vint<u32> {
    let Some(&first) = buf.first() else {
        return Vint::Incomplete;
    };
    let Some(len) = width(first, MAX_ID_LENGTH) else {
        return Vint::Invalid(first);
    };
    if buf.len() < len {
        return Vint::Incomplete;
    }

    let value = buf[..len]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32);
    Vint::Complete { value, len }
}

/// Decode an element data size. `None` means unknown size.
pub fn read_size(buf: &[u8]) -> Vint<Option<u64>> {
    let Some(&first) = buf.first() else {
        return Vint::Incomplete;
    };
    let Some(len) = width(first, MAX_SIZE_LENGTH) else {
        return Vint::Invalid(first);
    };
    if buf.len() < len {
        return Vint::Incomplete;
    }

    let marker = 0x80u8 >> (len - 1);
    let mut value = (first & !marker) as u64;
    for &b in &buf[1..len] {
        value = (value << 8) | b as u64;
    }

    let all_ones = (1u64 << (7 * len)) - 1;
    let value = if value == all_ones { None } else { Some(value) };
    Vint::Complete { value, len }
}

/// Decode a big-endian unsigned integer whose width is the slice length.
///
/// Returns `None` for an empty slice or one wider than 8 bytes.
pub fn read_unsigned(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Encode an element ID. IDs are stored with their marker bit, so this is
/// the big-endian bytes without leading zero bytes.
pub fn encode_id(id: u32) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count().min(3);
    bytes[skip..].to_vec()
}

/// Encode a data size using the shortest width that can hold it.
pub fn encode_size(size: u64) -> Vec<u8> {
    // All-ones is reserved for "unknown", hence the strict comparison.
    let len = (1..=MAX_SIZE_LENGTH)
        .find(|&len| size < (1u64 << (7 * len)) - 1)
        .unwrap_or(MAX_SIZE_LENGTH);

    let marked = size | (1u64 << (7 * len));
    marked.to_be_bytes()[8 - len..].to_vec()
}

/// The 8-byte unknown-size marker used by live muxers.
pub const UNKNOWN_SIZE: [u8; 8] = [0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
