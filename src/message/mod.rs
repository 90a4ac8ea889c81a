//! Message engine: header discrimination, block-count-driven body assembly,
//! kludge extraction, status decoding, and the block-loop that ties them
//! together while resynchronising past corrupt records.

pub mod body;
pub mod discriminator;
pub mod doorid;
pub mod kludge;
pub mod status;

pub use body::MessageBody;
pub use doorid::DoorId;
pub use kludge::Kludge;
pub use status::StatusFlags;

use crate::binary::record::{parse_right_aligned_number, trim_trailing_spaces, RECORD_SIZE};
use crate::encoding::cp437::{self, DecodePolicy};
use crate::validation::ValidationContext;

/// Header byte offsets, per the on-disk layout (§6 of the format
/// specification).
mod offsets {
    pub const STATUS: usize = 0;
    pub const MESSAGE_NUMBER: std::ops::Range<usize> = 1..8;
    pub const DATE: std::ops::Range<usize> = 8..16;
    pub const TIME: std::ops::Range<usize> = 16..21;
    pub const TO: std::ops::Range<usize> = 21..46;
    pub const FROM: std::ops::Range<usize> = 46..71;
    pub const SUBJECT: std::ops::Range<usize> = 71..96;
    pub const PASSWORD: std::ops::Range<usize> = 96..108;
    pub const REFERENCE_NUMBER: std::ops::Range<usize> = 108..116;
    pub const BLOCK_COUNT: std::ops::Range<usize> = 116..122;
    pub const ALIVE: usize = 122;
    pub const CONFERENCE: std::ops::Range<usize> = 123..125;
}

/// Whether a message record is live or has been killed/deleted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AliveFlag {
    Alive,
    Killed,
}

impl AliveFlag {
    fn from_byte(b: u8) -> Self {
        if b == discriminator::KILLED {
            AliveFlag::Killed
        } else {
            AliveFlag::Alive
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            AliveFlag::Alive => discriminator::ALIVE,
            AliveFlag::Killed => discriminator::KILLED,
        }
    }
}

/// The parsed 128-byte message header. String fields are CP437-decoded with
/// trailing padding spaces trimmed; `raw` keeps the untouched bytes for
/// callers that need byte-exact access (e.g. a diagnostic dump).
#[derive(Clone, Debug, PartialEq)]
pub struct MessageHeader {
    pub status: u8,
    pub message_number_field: String,
    pub date_field: String,
    pub time_field: String,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub password: String,
    pub reference_number_field: String,
    /// Number of 128-byte blocks including the header itself; minimum 1 by
    /// convention but not enforced here — a corrupt value is exactly what
    /// the discriminator-driven resync in [`read_messages`] exists to
    /// survive.
    pub block_count: u32,
    pub alive: AliveFlag,
    pub conference_number: u16,
    pub raw: [u8; RECORD_SIZE],
}

fn decode_field(raw: &[u8]) -> String {
    let trimmed = trim_trailing_spaces(raw);
    cp437::decode(trimmed, DecodePolicy::BestEffort).unwrap_or_default()
}

impl MessageHeader {
    /// Parse a header from a validated 128-byte block. Callers are expected
    /// to have already run [`discriminator::is_header_candidate`] — this
    /// function trusts the layout and only defends against a block count
    /// outside `1..`, substituting 1 with a warning.
    pub fn parse(block: [u8; RECORD_SIZE], ctx: &mut ValidationContext) -> Self {
        let block_count = match parse_right_aligned_number(&block[offsets::BLOCK_COUNT]) {
            Some(n) if n >= 1 => n as u32,
            Some(n) => {
                ctx.warning(format!("message header block count {n} is below the minimum of 1, defaulting to 1"));
                1
            }
            None => {
                ctx.warning("message header block count field is unparseable, defaulting to 1".to_string());
                1
            }
        };

        MessageHeader {
            status: block[offsets::STATUS],
            message_number_field: decode_field(&block[offsets::MESSAGE_NUMBER]),
            date_field: decode_field(&block[offsets::DATE]),
            time_field: decode_field(&block[offsets::TIME]),
            to: decode_field(&block[offsets::TO]),
            from: decode_field(&block[offsets::FROM]),
            subject: decode_field(&block[offsets::SUBJECT]),
            password: decode_field(&block[offsets::PASSWORD]),
            reference_number_field: decode_field(&block[offsets::REFERENCE_NUMBER]),
            block_count,
            alive: AliveFlag::from_byte(block[offsets::ALIVE]),
            conference_number: u16::from_le_bytes([block[offsets::CONFERENCE.start], block[offsets::CONFERENCE.start + 1]]),
            raw: block,
        }
    }

    /// Encode a header back into a 128-byte block, as the REP writer does.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        message_number: &str,
        date_field: &str,
        time_field: &str,
        to: &str,
        from: &str,
        subject: &str,
        password: &str,
        reference_number_field: &str,
        block_count: u32,
        status: u8,
        alive: AliveFlag,
        conference_number: u16,
    ) -> [u8; RECORD_SIZE] {
        use crate::binary::record::write_padded_field;

        let mut block = [b' '; RECORD_SIZE];
        block[offsets::STATUS] = status;

        let field = |s: &str| cp437::encode(s, cp437::EncodePolicy::ReplacementQuestion).unwrap_or_default();

        block[offsets::MESSAGE_NUMBER].copy_from_slice(&write_padded_field(&field(message_number), 7));
        block[offsets::DATE].copy_from_slice(&write_padded_field(&field(date_field), 8));
        block[offsets::TIME].copy_from_slice(&write_padded_field(&field(time_field), 5));
        block[offsets::TO].copy_from_slice(&write_padded_field(&field(to), 25));
        block[offsets::FROM].copy_from_slice(&write_padded_field(&field(from), 25));
        block[offsets::SUBJECT].copy_from_slice(&write_padded_field(&field(subject), 25));
        block[offsets::PASSWORD].copy_from_slice(&write_padded_field(&field(password), 12));
        block[offsets::REFERENCE_NUMBER].copy_from_slice(&write_padded_field(&field(reference_number_field), 8));

        let count_field = crate::binary::record::format_right_aligned_number(block_count as i64, 6)
            .unwrap_or_else(|| vec![b' '; 6]);
        block[offsets::BLOCK_COUNT].copy_from_slice(&count_field);

        block[offsets::ALIVE] = alive.to_byte();
        block[offsets::CONFERENCE].copy_from_slice(&conference_number.to_le_bytes());

        block
    }
}

/// A single parsed message: position in the packet, decoded header fields,
/// body, and extracted kludges.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// 1-based position of this message within the packet's message list.
    pub number: u32,
    pub conference_number: u16,
    pub to: String,
    pub from: String,
    pub subject: String,
    /// Header date/time, parsed if it matched a recognised format; `None`
    /// (not a substituted sentinel) if it didn't, since a message header's
    /// date is advisory metadata, not a field that gates opening the
    /// packet.
    pub timestamp: Option<chrono::NaiveDateTime>,
    pub reference_number: Option<i64>,
    pub password: String,
    pub body: MessageBody,
    pub status: StatusFlags,
    pub kludges: Vec<Kludge>,
    pub header: MessageHeader,
}

fn parse_header_datetime(header: &MessageHeader) -> Option<chrono::NaiveDateTime> {
    let combined = format!("{},{}", header.date_field.trim(), header.time_field.trim());
    let mut scratch = ValidationContext::new(crate::validation::ParseMode::Salvage);
    crate::control::date::parse_creation_date(&combined, crate::validation::ParseMode::Strict, &mut scratch).ok()
}

/// Read one message starting at `block` (already validated by the
/// discriminator) followed by its body in `rest`. Returns the message and
/// the number of body bytes consumed from `rest`.
fn read_one(number: u32, block: [u8; RECORD_SIZE], rest: &[u8], ctx: &mut ValidationContext) -> (Message, usize) {
    let header = MessageHeader::parse(block, ctx);
    let (body, consumed) = body::assemble(rest, header.block_count, ctx);
    let (kludges, remaining_lines) = kludge::extract(body.lines.clone());
    let body = MessageBody {
        lines: remaining_lines,
        raw_text: body.raw_text,
    };

    let reference_number = parse_right_aligned_number(header.reference_number_field.as_bytes());
    let timestamp = parse_header_datetime(&header);
    let status = status::decode(header.status);

    let message = Message {
        number,
        conference_number: header.conference_number,
        to: header.to.clone(),
        from: header.from.clone(),
        subject: header.subject.clone(),
        timestamp,
        reference_number,
        password: header.password.clone(),
        body,
        status,
        kludges,
        header,
    };
    (message, consumed)
}

/// Drive the block-loop over `data` (MESSAGES.DAT bytes with the leading
/// copyright block already skipped): read one 128-byte block, and if the
/// discriminator rejects it, advance exactly one block and try again
/// (recording a warning) rather than trusting whatever the previous
/// message's block count said. This is what lets the engine resynchronise
/// after a corrupt `block_count` field (§4.2, scenario S3).
pub fn read_messages(data: &[u8], ctx: &mut ValidationContext) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut pos = 0;
    let mut number = 1u32;

    while pos + RECORD_SIZE <= data.len() {
        let mut block = [0u8; RECORD_SIZE];
        block.copy_from_slice(&data[pos..pos + RECORD_SIZE]);

        if !discriminator::is_header_candidate(&block) {
            ctx.warning(format!("block at offset {pos} failed header validation, skipping"));
            pos += RECORD_SIZE;
            continue;
        }

        let (message, consumed) = read_one(number, block, &data[pos + RECORD_SIZE..], ctx);
        pos += RECORD_SIZE + consumed;
        number += 1;
        messages.push(message);
    }

    messages
}
