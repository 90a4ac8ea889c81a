//! Message body assembly.

use crate::binary::RECORD_SIZE;
use crate::encoding::cp437::{self, DecodePolicy};
use crate::encoding::line_ending::{self, LineEndingMode};
use crate::validation::ValidationContext;

/// A message body in both its line-oriented and raw-text forms. Either view
/// round-trips: re-joining `lines` with the π separator and padding to the
/// next 128-byte boundary reproduces the original body blocks (modulo the
/// null-byte-as-space substitution documented on [`assemble`]).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MessageBody {
    pub lines: Vec<String>,
    /// CP437-decoded text with π (0xE3) terminators preserved, i.e. before
    /// line splitting and trailing-space trimming.
    pub raw_text: String,
}

impl MessageBody {
    pub fn from_lines(lines: Vec<String>) -> Self {
        let raw_text = line_ending::join_lines_for_encoding(&lines, true);
        Self { lines, raw_text }
    }
}

/// Read `max(0, block_count - 1)` body blocks of 128 bytes from the front of
/// `data`. A short read (fewer bytes remain than the declared block count
/// implies) terminates the message with a warning; whatever whole blocks
/// were read are accepted. Returns the assembled body and the number of
/// bytes actually consumed.
///
/// Null bytes (0x00) are treated as ASCII space once decoded — packets
/// commonly pad unused body space with nulls rather than spaces, and
/// without this substitution those nulls would show up as literal NUL
/// characters in every line.
pub fn assemble(data: &[u8], block_count: u32, ctx: &mut ValidationContext) -> (MessageBody, usize) {
    let declared_body_blocks = block_count.saturating_sub(1) as usize;
    let available_blocks = data.len() / RECORD_SIZE;

    let blocks_to_read = if available_blocks < declared_body_blocks {
        ctx.warning(format!(
            "message declared {declared_body_blocks} body blocks but only {available_blocks} remain; truncating"
        ));
        available_blocks
    } else {
        declared_body_blocks
    };

    let consumed = blocks_to_read * RECORD_SIZE;
    let mut raw_bytes = data[..consumed].to_vec();
    for b in raw_bytes.iter_mut() {
        if *b == 0x00 {
            *b = b' ';
        }
    }

    let raw_text = cp437::decode(&raw_bytes, DecodePolicy::BestEffort).unwrap_or_default();
    let lines: Vec<String> = line_ending::split_lines(&raw_text, LineEndingMode::StrictQwk)
        .into_iter()
        .map(|l| l.trim_end_matches(' ').to_string())
        .collect();

    (MessageBody { lines, raw_text }, consumed)
}

/// Encode a body's `lines` back into padded 128-byte blocks, as the REP
/// writer does: join with π, CP437-encode, pad with spaces to the next
/// record boundary.
pub fn encode(lines: &[String]) -> Vec<u8> {
    let text = line_ending::join_lines_for_encoding(lines, true);
    let mut bytes = cp437::encode(&text, cp437::EncodePolicy::ReplacementQuestion).unwrap_or_default();
    crate::binary::record::pad_to_record_boundary(&mut bytes);
    bytes
}
