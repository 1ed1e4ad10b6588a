//! Packed byte arrays
//!
//! A Cairo `ByteArray` is serialized as
//! `[data_len, word_0 .. word_{data_len-1}, pending_word, pending_word_len]`
//! where every data word carries 31 bytes and the pending word carries
//! `pending_word_len` (0..=30) trailing bytes.

use crate::domain::abi::DecodeError;
use crate::domain::FieldElement;

/// Bytes carried by one full data word
pub const BYTES_PER_WORD: usize = 31;

/// A bare felt is only read as a byte array length up to this many words
pub const SHORT_BYTE_ARRAY_MAX_WORDS: usize = 10;

/// Upper bound accepted for `pending_word_len`
pub const MAX_PENDING_WORD_LEN: usize = 31;

/// Decide whether the felt at `offset` opens a packed byte array.
///
/// Returns the data word count when the value is at most
/// [`SHORT_BYTE_ARRAY_MAX_WORDS`], the whole layout fits in the buffer and
/// the pending length slot holds a value in `1..=MAX_PENDING_WORD_LEN`.
/// A zero pending length never matches, so short strings that happen to be
/// small numbers stay felts unless a partial word follows.
pub fn byte_array_candidate(buffer: &[FieldElement], offset: usize) -> Option<usize> {
    let data_len = buffer.get(offset)?.to_usize()?;
    if data_len > SHORT_BYTE_ARRAY_MAX_WORDS {
        return None;
    }
    let pending_len = buffer.get(offset + data_len + 2)?.to_usize()?;
    (1..=MAX_PENDING_WORD_LEN)
        .contains(&pending_len)
        .then_some(data_len)
}

/// Decode an explicitly typed `ByteArray` at `offset`.
///
/// Returns the hex string and the next unread offset. When the length
/// slot is implausible (over `max_words`), the buffer is too short for
/// the layout, or the pending length is over 31, the first slot is
/// returned as a plain hex felt instead.
pub fn read_byte_array(
    buffer: &[FieldElement],
    offset: usize,
    max_words: usize,
) -> Result<(String, usize), DecodeError> {
    let first = buffer
        .get(offset)
        .ok_or_else(|| DecodeError::InvalidByteArray("missing length".to_string()))?;

    match packed_layout(buffer, offset, max_words) {
        Some((data_len, pending_len)) => {
            let hex = layout_to_hex(buffer, offset, data_len, pending_len);
            Ok((hex, offset + data_len + 3))
        }
        None => {
            tracing::warn!(
                offset,
                value = %first,
                "ByteArray layout does not fit, falling back to felt"
            );
            Ok((first.to_hex(), offset + 1))
        }
    }
}

/// Decode a layout already vetted by [`byte_array_candidate`]
pub(crate) fn read_candidate(
    buffer: &[FieldElement],
    offset: usize,
    data_len: usize,
) -> Option<(String, usize)> {
    let pending_len = buffer.get(offset + data_len + 2)?.to_usize()?;
    let hex = layout_to_hex(buffer, offset, data_len, pending_len);
    Some((hex, offset + data_len + 3))
}

/// `(data_len, pending_len)` if the full layout is present and plausible
fn packed_layout(buffer: &[FieldElement], offset: usize, max_words: usize) -> Option<(usize, usize)> {
    let data_len = buffer
        .get(offset)?
        .to_usize()
        .filter(|len| *len <= max_words)?;
    let end = offset.checked_add(data_len)?.checked_add(3)?;
    if buffer.len() < end {
        return None;
    }
    let pending_len = buffer[end - 1]
        .to_usize()
        .filter(|len| *len <= MAX_PENDING_WORD_LEN)?;
    Some((data_len, pending_len))
}

fn layout_to_hex(buffer: &[FieldElement], offset: usize, data_len: usize, pending_len: usize) -> String {
    let words = &buffer[offset + 1..offset + 1 + data_len];
    let pending = buffer[offset + 1 + data_len];
    byte_array_to_hex(words, pending, pending_len)
}

/// Concatenate full words and the pending word into one `0x` hex string
pub fn byte_array_to_hex(words: &[FieldElement], pending: FieldElement, pending_len: usize) -> String {
    let mut bytes = Vec::with_capacity(words.len() * BYTES_PER_WORD + pending_len);
    for word in words {
        bytes.extend_from_slice(&word_bytes(*word, BYTES_PER_WORD));
    }
    if pending_len > 0 {
        bytes.extend_from_slice(&word_bytes(pending, pending_len));
    }
    format!("0x{}", hex::encode(bytes))
}

/// Low-order `len` bytes of a word, big-endian
fn word_bytes(word: FieldElement, len: usize) -> Vec<u8> {
    let be: [u8; 32] = word.value().to_be_bytes();
    be[32 - len.min(32)..].to_vec()
}

/// Render a decoded hex string as text when it is printable UTF-8
pub fn hex_to_utf8(hex_str: &str) -> Option<String> {
    let digits = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str);
    let bytes = hex::decode(digits).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let printable = !text.is_empty()
        && text
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\t');
    printable.then_some(text)
}
