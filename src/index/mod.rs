//! Index (.NDX) codec: parsing and validating `{conference}.NDX` files
//! against a MESSAGES.DAT size, and (re)building them from MESSAGES.DAT.

pub mod indexer;

use crate::binary::msbin;
use crate::binary::record::RECORD_SIZE;
use crate::validation::ValidationContext;

/// One index entry: a 1-based message number, the record offset it points
/// to (in 128-byte records, 1-based per the MSBIN value itself), and the
/// original 4 raw MSBIN bytes — preserved so a rewritten index is
/// byte-exact with its origin when the underlying messages didn't change.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexEntry {
    pub message_number: u32,
    pub record_offset: u32,
    pub raw_msbin: [u8; 4],
}

/// A parsed `.NDX` file for one conference.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexFile {
    pub conference_number: u16,
    pub entries: Vec<IndexEntry>,
    /// False whenever any entry triggered a warning or was skipped — see
    /// the "validity semantics" design note: this holds even though the
    /// surviving entries are still returned and usable.
    pub valid: bool,
    pub validated_against_file_size: Option<u64>,
}

/// Parse a `.NDX` file's bytes. `messages_dat_size`, if given, is used to
/// reject entries whose byte offset (`record_offset * 128`) falls at or
/// beyond the end of MESSAGES.DAT.
///
/// File size must be a multiple of 4; in Strict mode a non-multiple size is
/// an error, in Lenient/Salvage it's a warning and the trailing partial
/// slot is dropped. Message numbers are assigned sequentially (1-based) to
/// surviving entries, so numbering stays gap-free even when entries are
/// skipped.
pub fn parse(
    conference_number: u16,
    bytes: &[u8],
    messages_dat_size: Option<u64>,
    mode: crate::validation::ParseMode,
    ctx: &mut ValidationContext,
) -> IndexFile {
    let mut invalid = false;

    let remainder = bytes.len() % 4;
    let usable = if remainder != 0 {
        let message = format!(
            "{}.NDX size {} is not a multiple of 4; truncating trailing {remainder} byte(s)",
            conference_number,
            bytes.len()
        );
        if mode == crate::validation::ParseMode::Strict {
            ctx.error(message);
        } else {
            ctx.warning(message);
        }
        invalid = true;
        bytes.len() - remainder
    } else {
        bytes.len()
    };

    let mut entries = Vec::new();
    let mut next_number = 1u32;
    for chunk in usable_bytes(bytes, usable).chunks_exact(4) {
        let raw: [u8; 4] = chunk.try_into().unwrap();
        let value = msbin::decode(raw);
        if value < 0.0 {
            ctx.warning(format!("{conference_number}.NDX entry has a negative record offset ({value}), skipping"));
            invalid = true;
            continue;
        }
        let record_offset = value as u32;

        if let Some(size) = messages_dat_size {
            let byte_offset = record_offset as u64 * RECORD_SIZE as u64;
            if byte_offset >= size {
                ctx.warning(format!(
                    "{conference_number}.NDX entry offset {record_offset} (byte {byte_offset}) is beyond MESSAGES.DAT size {size}, skipping"
                ));
                invalid = true;
                continue;
            }
        }

        entries.push(IndexEntry {
            message_number: next_number,
            record_offset,
            raw_msbin: raw,
        });
        next_number += 1;
    }

    IndexFile {
        conference_number,
        entries,
        valid: !invalid,
        validated_against_file_size: messages_dat_size,
    }
}

fn usable_bytes(bytes: &[u8], usable: usize) -> &[u8] {
    &bytes[..usable]
}

/// Serialise an [`IndexFile`] back to `.NDX` bytes, using each entry's
/// preserved raw MSBIN bytes rather than re-deriving them from
/// `record_offset` — this is what keeps a rewritten index byte-exact with
/// its origin (testable property 4).
pub fn encode(index: &IndexFile) -> Vec<u8> {
    let mut out = Vec::with_capacity(index.entries.len() * 4);
    for entry in &index.entries {
        out.extend_from_slice(&entry.raw_msbin);
    }
    out
}
