//! Build `.NDX` index files directly from MESSAGES.DAT, for packets that
//! arrived without one (or whose index doesn't match) and for the REP
//! writer, which always (re)builds its own.

use std::collections::HashMap;

use super::{IndexEntry, IndexFile};
use crate::binary::msbin;
use crate::binary::record::RECORD_SIZE;
use crate::message::{discriminator, MessageHeader};
use crate::validation::ValidationContext;

/// Skip the leading copyright block, then walk MESSAGES.DAT the same way
/// [`crate::message::read_messages`] does (discriminator-driven, one block
/// of resync at a time on a rejection), recording `(message_number,
/// record_offset)` per conference as it goes. Produces one [`IndexFile`]
/// per conference encountered, in first-seen order.
pub fn build_indexes(data: &[u8], ctx: &mut ValidationContext) -> Vec<IndexFile> {
    let mut per_conference: HashMap<u16, Vec<IndexEntry>> = HashMap::new();
    let mut order: Vec<u16> = Vec::new();
    let mut next_number: HashMap<u16, u32> = HashMap::new();

    if data.len() < RECORD_SIZE {
        return Vec::new();
    }

    let mut pos = RECORD_SIZE; // skip copyright block
    while pos + RECORD_SIZE <= data.len() {
        let mut block = [0u8; RECORD_SIZE];
        block.copy_from_slice(&data[pos..pos + RECORD_SIZE]);

        if !discriminator::is_header_candidate(&block) {
            ctx.warning(format!("indexer: block at offset {pos} failed header validation, skipping"));
            pos += RECORD_SIZE;
            continue;
        }

        let header = MessageHeader::parse(block, ctx);
        let record_number = (pos / RECORD_SIZE) as u32 + 1;
        let conference = header.conference_number;

        let number = next_number.entry(conference).or_insert(0);
        *number += 1;
        let entry = IndexEntry {
            message_number: *number,
            record_offset: record_number,
            raw_msbin: msbin::encode(record_number as f32),
        };
        per_conference.entry(conference).or_insert_with(|| {
            order.push(conference);
            Vec::new()
        }).push(entry);

        let body_blocks = header.block_count.saturating_sub(1) as usize;
        let available = (data.len() - pos - RECORD_SIZE) / RECORD_SIZE;
        let consumed = body_blocks.min(available);
        pos += RECORD_SIZE + consumed * RECORD_SIZE;
    }

    order
        .into_iter()
        .map(|conference| IndexFile {
            conference_number: conference,
            entries: per_conference.remove(&conference).unwrap_or_default(),
            valid: true,
            validated_against_file_size: Some(data.len() as u64),
        })
        .collect()
}
