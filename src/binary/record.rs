//! 128-byte record primitives shared by the message engine and the REP
//! writer.
//!
//! MESSAGES.DAT is a flat sequence of fixed-size 128-byte blocks: one
//! leading copyright block, then one header block per message followed by
//! its body blocks. This module owns the block-size constant and the
//! generic fixed-width field codec; the message header's specific field
//! *meanings* live in [`crate::message`].

/// Size, in bytes, of one MESSAGES.DAT block (and of one header record).
pub const RECORD_SIZE: usize = 128;

/// Byte used to pad a body to the next record boundary.
pub const BODY_PAD_BYTE: u8 = b' ';

/// Read a right-aligned ASCII field and parse it as a non-negative integer,
/// treating leading spaces (the header's padding convention) as blank and
/// any remaining non-digit content as unparseable.
pub fn parse_right_aligned_number(field: &[u8]) -> Option<i64> {
    let text = std::str::from_utf8(field).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<i64>().ok()
}

/// Format `value` right-aligned in a field of `width` ASCII bytes, padded
/// with leading spaces. Returns `None` if `value` doesn't fit.
pub fn format_right_aligned_number(value: i64, width: usize) -> Option<Vec<u8>> {
    let text = value.to_string();
    if text.len() > width {
        return None;
    }
    let mut out = vec![b' '; width - text.len()];
    out.extend_from_slice(text.as_bytes());
    Some(out)
}

/// Read a fixed-width field, trimming trailing spaces (the header string
/// padding convention) but preserving interior spaces.
pub fn trim_trailing_spaces(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|&b| b != b' ')
        .map(|i| i + 1)
        .unwrap_or(0);
    &field[..end]
}

/// Write `bytes` left-aligned into a field of `width`, padding with spaces
/// and truncating if `bytes` is longer than `width`.
pub fn write_padded_field(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![b' '; width];
    let n = bytes.len().min(width);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Pad `buf` with [`BODY_PAD_BYTE`] until its length is a multiple of
/// [`RECORD_SIZE`].
pub fn pad_to_record_boundary(buf: &mut Vec<u8>) {
    let remainder = buf.len() % RECORD_SIZE;
    if remainder != 0 {
        buf.resize(buf.len() + (RECORD_SIZE - remainder), BODY_PAD_BYTE);
    }
}

/// Number of 128-byte blocks needed to hold `len` bytes of body content,
/// i.e. `ceil(len / RECORD_SIZE)`.
pub fn blocks_for_len(len: usize) -> usize {
    (len + RECORD_SIZE - 1) / RECORD_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_right_aligned_handles_padding() {
        assert_eq!(parse_right_aligned_number(b"    123"), Some(123));
        assert_eq!(parse_right_aligned_number(b"       "), None);
        assert_eq!(parse_right_aligned_number(b"  abc  "), None);
    }

    #[test]
    fn format_right_aligned_round_trips() {
        let field = format_right_aligned_number(42, 7).unwrap();
        assert_eq!(field, b"     42");
        assert_eq!(parse_right_aligned_number(&field), Some(42));
    }

    #[test]
    fn format_right_aligned_rejects_overflow() {
        assert!(format_right_aligned_number(12345678, 6).is_none());
    }

    #[test]
    fn trim_trailing_preserves_interior_spaces() {
        assert_eq!(trim_trailing_spaces(b"Hello World   "), b"Hello World");
        assert_eq!(trim_trailing_spaces(b"      "), b"");
    }

    #[test]
    fn pad_to_record_boundary_rounds_up() {
        let mut buf = vec![0u8; 10];
        pad_to_record_boundary(&mut buf);
        assert_eq!(buf.len(), RECORD_SIZE);
        assert!(buf[10..].iter().all(|&b| b == BODY_PAD_BYTE));

        let mut exact = vec![0u8; RECORD_SIZE * 2];
        pad_to_record_boundary(&mut exact);
        assert_eq!(exact.len(), RECORD_SIZE * 2);
    }

    #[test]
    fn blocks_for_len_rounds_up() {
        assert_eq!(blocks_for_len(0), 0);
        assert_eq!(blocks_for_len(1), 1);
        assert_eq!(blocks_for_len(RECORD_SIZE), 1);
        assert_eq!(blocks_for_len(RECORD_SIZE + 1), 2);
    }
}
