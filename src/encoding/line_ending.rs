//! Line-terminator processing.
//!
//! QWK body text uses CP437 byte 0xE3 (decoded: U+03C0, π) as its line
//! separator. Consumers may additionally want LF/CRLF-normalised text for
//! display; this module keeps those two concerns — QWK's own separator vs.
//! "what does a text editor expect" — explicit and separate so neither
//! silently corrupts the other.
//!
//! Decoded text must never be searched for literal U+00E3 (small letter a
//! with tilde) when looking for a QWK terminator — that is a different code
//! point from π (U+03C0) and the two are easy to confuse by eye. All
//! terminator detection in this crate goes through [`LINE_TERMINATOR_CHAR`]
//! or operates on raw bytes before decoding.

use super::cp437::LINE_TERMINATOR_CHAR;

/// How a decoded QWK body is rendered for line splitting / re-joining.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum LineEndingMode {
    /// 0xE3 becomes the platform newline; any other CR/LF byte sequence
    /// already present in the text is left untouched.
    #[default]
    Preserve,
    /// 0xE3 and any CR/LF sequence becomes a single `\n`.
    NormaliseToLf,
    /// 0xE3 and any CR/LF sequence becomes `\r\n`.
    NormaliseToCrLf,
    /// Only 0xE3 is treated as a separator. Literal CR and LF bytes already
    /// present in the body survive untouched — this is what the message
    /// engine uses internally, since QWK bodies may legitimately contain
    /// stray CR/LF bytes from the original FidoNet/UUCP transport.
    StrictQwk,
}

#[cfg(unix)]
const PLATFORM_NEWLINE: &str = "\n";
#[cfg(windows)]
const PLATFORM_NEWLINE: &str = "\r\n";
#[cfg(not(any(unix, windows)))]
const PLATFORM_NEWLINE: &str = "\n";

/// Split CP437-decoded `text` into lines per `mode`, trimming no whitespace
/// (callers trim padding separately — see [`crate::message::body`]).
pub fn split_lines(text: &str, mode: LineEndingMode) -> Vec<String> {
    match mode {
        LineEndingMode::StrictQwk => text.split(LINE_TERMINATOR_CHAR).map(str::to_owned).collect(),
        LineEndingMode::Preserve => text
            .split(LINE_TERMINATOR_CHAR)
            .flat_map(|chunk| chunk.split(PLATFORM_NEWLINE))
            .map(str::to_owned)
            .collect(),
        LineEndingMode::NormaliseToLf | LineEndingMode::NormaliseToCrLf => {
            normalise(text, mode, true)
                .split('\n')
                .map(|l| l.trim_end_matches('\r').to_owned())
                .collect()
        }
    }
}

/// Replace every terminator variant (0xE3/π, CRLF, LF, CR, in that order so
/// a CRLF pair is never double-converted into two separators) with the
/// separator implied by `mode`. `target_is_cp437` only matters for
/// [`LineEndingMode::StrictQwk`] — encoding back to QWK format, §4.1 — where
/// it selects π (U+03C0) for a CP437 target or U+00E3 for a Unicode-native
/// one; the other modes target LF/CRLF/the platform newline and ignore it.
pub fn normalise(text: &str, mode: LineEndingMode, target_is_cp437: bool) -> String {
    let target = match mode {
        LineEndingMode::NormaliseToLf => "\n".to_string(),
        LineEndingMode::NormaliseToCrLf => "\r\n".to_string(),
        LineEndingMode::Preserve => PLATFORM_NEWLINE.to_string(),
        LineEndingMode::StrictQwk => {
            let terminator = if target_is_cp437 { LINE_TERMINATOR_CHAR } else { '\u{00E3}' };
            terminator.to_string()
        }
    };
    let text = text.replace(LINE_TERMINATOR_CHAR, "\n");
    let text = text.replace("\r\n", "\n");
    let text = text.replace('\r', "\n");
    text.replace('\n', &target)
}

/// Join `lines` back into QWK body text. Lines are joined with `\n` first,
/// then run through [`normalise`] in [`LineEndingMode::StrictQwk`] so any
/// CRLF/LF/CR sequence — whether it's the join separator or embedded inside
/// a line the caller passed in — collapses to the single separator
/// appropriate for the eventual byte encoding: U+03C0 when the text will be
/// CP437-encoded (QWK's own convention), U+00E3 otherwise (a literal small
/// a-with-tilde, for callers re-encoding to a Unicode-native transport).
pub fn join_lines_for_encoding(lines: &[String], target_is_cp437: bool) -> String {
    normalise(&lines.join("\n"), LineEndingMode::StrictQwk, target_is_cp437)
}
