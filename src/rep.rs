//! The REP writer (§4.7): builds a reply packet's MESSAGES.DAT, per-conference
//! index files, and CONTROL.DAT from a message list, then hands the file set
//! to an [`ArchiveWriter`].
//!
//! A [`RepWriter`] is single-threaded for its entire lifetime (§5): adding
//! messages is not safe to interleave with [`RepWriter::finalize`], and
//! calling either after finalisation is a misuse error rather than silently
//! ignored.

use crate::archive::ArchiveWriter;
use crate::binary::record::{self, RECORD_SIZE};
use crate::control::{self, ControlRecord};
use crate::error::{QwkError, Result};
use crate::index::{self, indexer};
use crate::message::{self, status, AliveFlag, MessageHeader, StatusFlags};
use crate::validation::{ParseMode, ValidationContext, ValidationReport};

/// One message queued for writing. Unlike [`crate::message::Message`] this
/// carries no raw header bytes or extracted kludges — a caller that wants
/// QWKE long headers or Synchronet kludges in the reply body includes them
/// directly in `body_lines`, the same as any other line.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMessage {
    pub conference_number: u16,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub password: String,
    pub reference_number: Option<i64>,
    pub status: StatusFlags,
    pub alive: AliveFlag,
    pub timestamp: chrono::NaiveDateTime,
    pub body_lines: Vec<String>,
}

/// Builds a single REP packet: one MESSAGES.DAT, one `.NDX` per conference
/// with at least one message, and a copy of the source CONTROL.DAT.
pub struct RepWriter {
    control: ControlRecord,
    messages: Vec<NewMessage>,
    finalized: bool,
}

impl RepWriter {
    /// `control` is typically the `ControlRecord` copied verbatim from the
    /// packet being replied to (§4.7).
    pub fn new(control: ControlRecord) -> Self {
        Self {
            control,
            messages: Vec::new(),
            finalized: false,
        }
    }

    /// Queue a message for writing, in the order it should appear in
    /// MESSAGES.DAT.
    pub fn add_message(&mut self, message: NewMessage) -> Result<()> {
        if self.finalized {
            return Err(QwkError::InvalidUsage(
                "add_message called after finalize".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    fn build_messages_dat(&self) -> Vec<u8> {
        let mut data = vec![b' '; RECORD_SIZE]; // copyright block
        for (i, msg) in self.messages.iter().enumerate() {
            let message_number = (i + 1).to_string();
            let date_field = msg.timestamp.format("%m-%d-%y").to_string();
            let time_field = msg.timestamp.format("%H:%M").to_string();
            let reference_field = msg
                .reference_number
                .map(|n| n.to_string())
                .unwrap_or_default();

            let mut body_bytes = message::body::encode(&msg.body_lines);
            record::pad_to_record_boundary(&mut body_bytes);
            let block_count = 1 + (body_bytes.len() / RECORD_SIZE) as u32;

            let header = MessageHeader::encode(
                &message_number,
                &date_field,
                &time_field,
                &msg.to,
                &msg.from,
                &msg.subject,
                &msg.password,
                &reference_field,
                block_count,
                status::encode(msg.status),
                msg.alive,
                msg.conference_number,
            );

            data.extend_from_slice(&header);
            data.extend_from_slice(&body_bytes);
        }
        data
    }

    /// Assemble MESSAGES.DAT and its indexes, write CONTROL.DAT /
    /// MESSAGES.DAT / `*.NDX` through `writer`, and finalise it into `out`.
    /// Returns the [`ValidationReport`] from re-walking the assembled
    /// MESSAGES.DAT while building indexes — empty on a correctly built
    /// packet, since the writer controls every byte it just produced.
    pub fn finalize(
        &mut self,
        writer: &mut dyn ArchiveWriter,
        out: &mut dyn std::io::Write,
    ) -> Result<ValidationReport> {
        if self.finalized {
            return Err(QwkError::InvalidUsage("finalize called twice".to_string()));
        }
        self.finalized = true;

        let messages_dat = self.build_messages_dat();

        let mut ctx = ValidationContext::new(ParseMode::Strict);
        let indexes = indexer::build_indexes(&messages_dat, &mut ctx);

        writer.add_file("CONTROL.DAT", &control::encode(&self.control))?;
        writer.add_file("MESSAGES.DAT", &messages_dat)?;
        for conference_index in &indexes {
            writer.add_file(
                &format!("{}.NDX", conference_index.conference_number),
                &index::encode(conference_index),
            )?;
        }
        writer.save(out)?;

        Ok(ctx.into_report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveReader, MemoryArchive};
    use crate::packet::Packet;
    use chrono::NaiveDate;

    fn control() -> ControlRecord {
        let mut record = ControlRecord::placeholder();
        record.bbs_name = "Reply BBS".to_string();
        record
    }

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(1995, 6, 15)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    fn message(body: Vec<&str>) -> NewMessage {
        NewMessage {
            conference_number: 1,
            to: "Sysop".to_string(),
            from: "Alice".to_string(),
            subject: "Re: Hello".to_string(),
            password: String::new(),
            reference_number: None,
            status: StatusFlags::empty(),
            alive: AliveFlag::Alive,
            timestamp: timestamp(),
            body_lines: body.into_iter().map(str::to_string).collect(),
        }
    }

    #[test]
    fn add_after_finalize_is_invalid_usage() {
        let mut rep = RepWriter::new(control());
        let mut archive = MemoryArchive::new();
        let mut out = Vec::new();
        rep.finalize(&mut archive, &mut out).unwrap();
        assert!(matches!(
            rep.add_message(message(vec!["hi"])),
            Err(QwkError::InvalidUsage(_))
        ));
        assert!(matches!(
            rep.finalize(&mut archive, &mut out),
            Err(QwkError::InvalidUsage(_))
        ));
    }

    #[test]
    fn property_3_round_trips_message_list_through_a_rep_packet() {
        let mut rep = RepWriter::new(control());
        rep.add_message(message(vec!["Hello", "World"])).unwrap();
        rep.add_message(message(vec!["Second message"])).unwrap();

        let mut archive = MemoryArchive::new();
        let mut out = Vec::new();
        let report = rep.finalize(&mut archive, &mut out).unwrap();
        assert!(report.is_valid());

        let packet = Packet::open(Box::new(archive), ParseMode::Strict).unwrap();
        assert_eq!(packet.messages().len(), 2);
        assert_eq!(packet.messages()[0].conference_number, 1);
        assert_eq!(packet.messages()[0].body.lines, vec!["Hello", "World"]);
        assert_eq!(packet.messages()[1].body.lines, vec!["Second message"]);
    }

    #[test]
    fn block_count_equals_one_plus_body_blocks() {
        let long_line = "x".repeat(300);
        let mut rep = RepWriter::new(control());
        rep.add_message(message(vec![long_line.as_str()])).unwrap();

        let mut archive = MemoryArchive::new();
        let mut out = Vec::new();
        rep.finalize(&mut archive, &mut out).unwrap();

        let bytes = archive.open_file("MESSAGES.DAT", 100).unwrap();
        let header = &bytes[RECORD_SIZE..RECORD_SIZE * 2];
        let mut block = [0u8; RECORD_SIZE];
        block.copy_from_slice(header);
        let mut ctx = ValidationContext::new(ParseMode::Strict);
        let parsed = MessageHeader::parse(block, &mut ctx);
        // 301 content bytes (300 + one terminator-free line, no trailing
        // separator) pad up to 3 blocks of 128.
        assert_eq!(parsed.block_count, 1 + 3);
    }

    #[test]
    fn produces_one_index_per_conference_with_messages() {
        let mut rep = RepWriter::new(control());
        let mut second_conference = message(vec!["one"]);
        second_conference.conference_number = 2;
        rep.add_message(message(vec!["one"])).unwrap();
        rep.add_message(second_conference).unwrap();

        let mut archive = MemoryArchive::new();
        let mut out = Vec::new();
        rep.finalize(&mut archive, &mut out).unwrap();

        assert!(archive.file_exists("1.NDX"));
        assert!(archive.file_exists("2.NDX"));
    }
}
