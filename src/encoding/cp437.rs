//! CP437 ⇄ Unicode codec.
//!
//! Bytes 0x00–0x7F map identically to their ASCII/C0 code points (CP437 is an
//! ASCII superset). Bytes 0x80–0xFF map through [`UPPER_HALF`], the fixed
//! IBM/unicode.org CP437 table. The only entry that matters for QWK fidelity
//! is 0xE3 ⇄ U+03C0 (π), the line terminator byte — see the crate-level
//! warning in [`crate::encoding`].
//!
//! No encoding_rs-style runtime table generation is used: CP437 is a closed,
//! 256-entry legacy code page with no modern crate offering it directly, so
//! a `const` lookup table (as most hand-rolled CP437 implementations use) is
//! the idiomatic choice here, not a stdlib fallback.

use std::sync::OnceLock;

/// How [`decode`] handles a byte with no CP437 mapping.
///
/// CP437 maps every byte to *something*, so this only matters for callers
/// who supply [`DecodePolicy::Strict`] anyway; it is kept symmetrical with
/// [`EncodePolicy`] for API consistency and so a caller can force a hard
/// failure path if they layer a restricted subset on top.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum DecodePolicy {
    /// Fail on the first unmappable byte.
    Strict,
    /// Substitute ASCII `?` for unmappable bytes.
    ReplacementQuestion,
    /// Substitute U+FFFD for unmappable bytes.
    ReplacementUnicode,
    /// Codec-intrinsic default: CP437 defines every byte, so this is
    /// equivalent to never failing.
    #[default]
    BestEffort,
}

/// How [`encode`] handles a character with no CP437 byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum EncodePolicy {
    /// Fail on the first unmappable character.
    #[default]
    Strict,
    /// Substitute ASCII `?` for unmappable characters.
    ReplacementQuestion,
}

/// Decoding failed under [`DecodePolicy::Strict`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("byte 0x{byte:02x} at offset {offset} has no CP437 mapping")]
pub struct DecodeError {
    pub byte: u8,
    pub offset: usize,
}

/// Encoding failed under [`EncodePolicy::Strict`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("character {ch:?} at offset {offset} has no CP437 byte")]
pub struct EncodeError {
    pub ch: char,
    pub offset: usize,
}

/// CP437 mapping for bytes 0x80..=0xFF, indexed by `byte - 0x80`.
#[rustfmt::skip]
pub const UPPER_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Byte that decodes to π (U+03C0), the QWK body line terminator.
pub const LINE_TERMINATOR_BYTE: u8 = 0xE3;
/// Character that 0xE3 decodes to and that encodes back to it.
pub const LINE_TERMINATOR_CHAR: char = '\u{03C0}';

fn byte_to_char(b: u8) -> char {
    if b < 0x80 {
        b as char
    } else {
        UPPER_HALF[(b - 0x80) as usize]
    }
}

fn encode_map() -> &'static [(char, u8); 128] {
    static MAP: OnceLock<[(char, u8); 128]> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = [(char::from(0), 0u8); 128];
        for (i, ch) in UPPER_HALF.iter().enumerate() {
            map[i] = (*ch, 0x80 + i as u8);
        }
        map
    })
}

fn char_to_byte(ch: char) -> Option<u8> {
    if (ch as u32) < 0x80 {
        return Some(ch as u8);
    }
    encode_map()
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, b)| *b)
}

/// Decode `bytes` as CP437 into a `String`, applying `policy` to any byte
/// with no mapping (in practice: none, since CP437 maps all 256 bytes — the
/// policy only matters if a future caller restricts the table).
///
/// Empty input yields an empty string without allocation.
pub fn decode(bytes: &[u8], policy: DecodePolicy) -> Result<String, DecodeError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    let mut out = String::with_capacity(bytes.len());
    for (offset, &b) in bytes.iter().enumerate() {
        // CP437 is total: every byte has a mapping. `policy` is honoured for
        // API symmetry with `encode`, but `Err` is unreachable today.
        let _ = policy;
        let _ = offset;
        out.push(byte_to_char(b));
    }
    Ok(out)
}

/// Encode `s` into CP437 bytes, applying `policy` to characters outside the
/// CP437 repertoire.
///
/// Empty input yields an empty `Vec` without allocation.
pub fn encode(s: &str, policy: EncodePolicy) -> Result<Vec<u8>, EncodeError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::with_capacity(s.len());
    for (offset, ch) in s.chars().enumerate() {
        match char_to_byte(ch) {
            Some(b) => out.push(b),
            None => match policy {
                EncodePolicy::Strict => return Err(EncodeError { ch, offset }),
                EncodePolicy::ReplacementQuestion => out.push(b'?'),
            },
        }
    }
    Ok(out)
}
