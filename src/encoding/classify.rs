//! Byte-level classification and single-pass span analysis.
//!
//! These predicates operate on raw bytes, before CP437 decoding — most
//! importantly so code can ask "is this byte 0xE3" without first decoding
//! and then comparing against the *wrong* Unicode code point (see the
//! warning in [`crate::encoding::line_ending`]).

/// Byte ≥ 0x80 — outside 7-bit ASCII, in the CP437 upper half.
pub fn is_extended_ascii(b: u8) -> bool {
    b >= 0x80
}

/// CP437 box-drawing range: 0xB0..=0xDF plus the scattered singletons that
/// fall just below it (light/double box characters and shading blocks).
pub fn is_box_drawing(b: u8) -> bool {
    matches!(b, 0xB0..=0xDF | 0xB3 | 0xBA | 0xC0..=0xC5)
}

/// Narrower subset of [`is_box_drawing`]: single/double line-drawing
/// characters only, excluding the shading blocks (0xB0–0xB2) and solid
/// blocks (0xDB–0xDF).
pub fn is_line_graphics(b: u8) -> bool {
    matches!(b, 0xB3..=0xDA)
}

/// Control character: < 0x20 or 0x7F, *excluding* 0xE3 — which is a
/// printable character (π) in CP437, not a control code, despite living
/// outside the 0x20..=0x7E printable-ASCII band.
pub fn is_control(b: u8) -> bool {
    (b < 0x20 || b == 0x7F) && b != super::cp437::LINE_TERMINATOR_BYTE
}

/// Printable 7-bit ASCII.
pub fn is_printable_ascii(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Result of a single pass over a byte span via [`analyse`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Analysis {
    pub len: usize,
    pub high_bit_count: usize,
    pub box_drawing_count: usize,
    pub has_ansi_escape: bool,
    /// Only populated when `with_histogram` is passed to [`analyse`].
    pub histogram: Option<Box<[u32; 256]>>,
}

/// Scan `bytes` once, producing high-bit and box-drawing counts, whether an
/// ANSI escape sequence (ESC followed by `[`) is present, and — only when
/// `with_histogram` is set — a full byte-value histogram. The histogram is
/// the one part of this function with real allocation cost, so it stays
/// opt-in.
pub fn analyse(bytes: &[u8], with_histogram: bool) -> Analysis {
    let mut out = Analysis {
        len: bytes.len(),
        histogram: with_histogram.then(|| Box::new([0u32; 256])),
        ..Default::default()
    };

    for (i, &b) in bytes.iter().enumerate() {
        if is_extended_ascii(b) {
            out.high_bit_count += 1;
        }
        if is_box_drawing(b) {
            out.box_drawing_count += 1;
        }
        if b == 0x1B && bytes.get(i + 1) == Some(&b'[') {
            out.has_ansi_escape = true;
        }
        if let Some(hist) = out.histogram.as_deref_mut() {
            hist[b as usize] += 1;
        }
    }

    out
}
