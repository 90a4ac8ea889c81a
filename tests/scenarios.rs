//! End-to-end scenarios (§8) exercised through the public facade:
//! `Packet::open` and `RepWriter`, backed by the in-memory archive test
//! double rather than a real ZIP file.

use chrono::{Datelike, NaiveDate};

use qwk_codec::archive::{ArchiveReader, ArchiveWriter};
use qwk_codec::control::ControlRecord;
use qwk_codec::message::{AliveFlag, MessageHeader, StatusFlags};
use qwk_codec::rep::{NewMessage, RepWriter};
use qwk_codec::testing::MemoryArchive;
use qwk_codec::validation::ParseMode;
use qwk_codec::Packet;

const RECORD_SIZE: usize = 128;

fn control_bytes() -> Vec<u8> {
    [
        "Sample BBS",
        "Anytown",
        "555-0100",
        "The Sysop",
        "1,SMPL",
        "01-01-91,23:59:59",
        "Reader Name",
        "MAIN",
        "0",
        "1",
        "0",
        "1",
        "General",
    ]
    .join("\r\n")
    .into_bytes()
}

fn header_block(
    message_number: &str,
    date: &str,
    time: &str,
    to: &str,
    from: &str,
    subject: &str,
    block_count: u32,
    conference: u16,
) -> [u8; RECORD_SIZE] {
    MessageHeader::encode(
        message_number,
        date,
        time,
        to,
        from,
        subject,
        "",
        "0",
        block_count,
        b' ',
        AliveFlag::Alive,
        conference,
    )
}

/// S1 — CONTROL.DAT's four date-format variants all normalise to the right
/// year, and an out-of-range month is rejected in Strict mode.
#[test]
fn s1_multi_variant_date_parsing() {
    for (line6, expected_year) in [
        ("01-01-91,23:59:59", 1991),
        ("01/01/1991,23:59:59", 1991),
        ("12-31-25,00:00:00", 2025),
        ("12/31/2025,00:00:00", 2025),
    ] {
        let mut lines: Vec<&str> = control_bytes_lines();
        lines[5] = line6;
        let bytes = lines.join("\r\n").into_bytes();

        let mut archive = MemoryArchive::new();
        archive.add_file("CONTROL.DAT", &bytes).unwrap();
        let packet = Packet::open(Box::new(archive), ParseMode::Strict).unwrap();
        assert_eq!(packet.control().created.year(), expected_year);
    }

    let mut lines = control_bytes_lines();
    lines[5] = "13-01-91,00:00:00";
    let bytes = lines.join("\r\n").into_bytes();
    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &bytes).unwrap();
    assert!(Packet::open(Box::new(archive), ParseMode::Strict).is_err());

    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &bytes).unwrap();
    let packet = Packet::open(Box::new(archive), ParseMode::Lenient).unwrap();
    assert!(!packet.report().warnings.is_empty());
}

fn control_bytes_lines() -> Vec<&'static str> {
    vec![
        "Sample BBS",
        "Anytown",
        "555-0100",
        "The Sysop",
        "1,SMPL",
        "01-01-91,23:59:59",
        "Reader Name",
        "MAIN",
        "0",
        "1",
        "0",
        "1",
        "General",
    ]
}

/// S2 — kludge extraction leaves reply attributions and quotes alone and
/// consumes no blank line when none was extracted first.
#[test]
fn s2_kludge_extraction_regression() {
    let body = "@VIA: VERT\u{03C0}@MSGID: <x.y@z>\u{03C0}Re: Subject\u{03C0}By: Author\u{03C0}> quote\u{03C0}body";
    let mut messages_dat = vec![0u8; RECORD_SIZE];
    let mut body_bytes = body.as_bytes().to_vec();
    body_bytes.resize(RECORD_SIZE, b' ');
    messages_dat.extend_from_slice(&header_block("1", "01-01-91", "12:00", "To", "From", "Subj", 2, 1));
    messages_dat.extend_from_slice(&body_bytes);

    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &control_bytes()).unwrap();
    archive.add_file("MESSAGES.DAT", &messages_dat).unwrap();

    let packet = Packet::open(Box::new(archive), ParseMode::Strict).unwrap();
    let message = &packet.messages()[0];
    assert_eq!(message.kludges.len(), 2);
    assert_eq!(message.kludges[0].key, "@VIA");
    assert_eq!(message.kludges[1].key, "@MSGID");
    assert_eq!(
        message.body.lines,
        vec!["Re: Subject", "By: Author", "> quote", "body"]
    );
}

/// S3 — a corrupt leading block-count field causes the engine to
/// resynchronise rather than lose the rest of the packet.
#[test]
fn s3_header_discriminator_recovery() {
    let mut messages_dat = vec![0u8; RECORD_SIZE];
    messages_dat.extend_from_slice(&header_block("1", "01-01-91", "12:00", "A", "B", "S", 99, 1));
    for _ in 0..98 {
        messages_dat.extend_from_slice(&[b'x'; RECORD_SIZE]);
    }
    for _ in 0..3 {
        messages_dat.extend_from_slice(&[b'g'; RECORD_SIZE]);
    }
    messages_dat.extend_from_slice(&header_block("2", "01-02-91", "13:00", "C", "D", "T", 1, 1));

    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &control_bytes()).unwrap();
    archive.add_file("MESSAGES.DAT", &messages_dat).unwrap();

    let packet = Packet::open(Box::new(archive), ParseMode::Lenient).unwrap();
    assert_eq!(packet.messages().len(), 2);
    assert_eq!(packet.messages()[1].to, "C");
    assert_eq!(packet.report().warnings.len(), 3);
}

/// S4 — a body containing the CP437 line separator round-trips through a
/// REP write and a subsequent QWK read.
#[test]
fn s4_cp437_preservation_through_rep_round_trip() {
    let mut control = ControlRecord::placeholder();
    control.bbs_name = "Sample BBS".to_string();

    let mut rep = RepWriter::new(control);
    rep.add_message(NewMessage {
        conference_number: 1,
        to: "To".to_string(),
        from: "From".to_string(),
        subject: "Subj".to_string(),
        password: String::new(),
        reference_number: None,
        status: StatusFlags::empty(),
        alive: AliveFlag::Alive,
        timestamp: NaiveDate::from_ymd_opt(1991, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        body_lines: vec!["Hello".to_string(), "World".to_string()],
    })
    .unwrap();

    let mut archive = MemoryArchive::new();
    let mut out = Vec::new();
    rep.finalize(&mut archive, &mut out).unwrap();

    let packet = Packet::open(Box::new(archive), ParseMode::Strict).unwrap();
    assert_eq!(packet.messages()[0].body.lines, vec!["Hello", "World"]);
}

/// S5 — an `.NDX` file with one out-of-bounds entry parses to two valid
/// entries and an invalid report, without the packet open itself failing.
#[test]
fn s5_index_validation_via_indexer() {
    use qwk_codec::binary::msbin;
    use qwk_codec::index;
    use qwk_codec::validation::ValidationContext;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&msbin::encode(1.0));
    bytes.extend_from_slice(&msbin::encode(2.0));
    bytes.extend_from_slice(&msbin::encode(10000.0));

    let mut ctx = ValidationContext::new(ParseMode::Lenient);
    let index_file = index::parse(1, &bytes, Some(5000), ParseMode::Lenient, &mut ctx);

    assert_eq!(index_file.entries.len(), 2);
    assert!(!index_file.valid);
}

/// S6 — an oversized archive entry fails before any body bytes are read.
#[test]
fn s6_size_limit_guard_fails_the_open() {
    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &control_bytes()).unwrap();
    archive
        .add_file("MESSAGES.DAT", &vec![0u8; RECORD_SIZE * 2])
        .unwrap();

    // Simulate a facade configured with a tiny per-entry limit by reading
    // directly through the archive contract, as `Packet::open` would if it
    // were handed a non-default limit.
    let err = archive.open_file("MESSAGES.DAT", 0).unwrap_err();
    assert!(matches!(err, qwk_codec::QwkError::LimitExceeded { .. }));
}

/// Property 6 — in Lenient mode, the message count never exceeds what the
/// file size could possibly contain, even across a resynchronisation.
#[test]
fn property_6_lenient_message_count_upper_bound() {
    let mut messages_dat = vec![0u8; RECORD_SIZE];
    messages_dat.extend_from_slice(&header_block("1", "01-01-91", "12:00", "A", "B", "S", 1, 1));
    messages_dat.extend_from_slice(&header_block("2", "01-01-91", "12:00", "A", "B", "S", 1, 1));

    let mut archive = MemoryArchive::new();
    archive.add_file("CONTROL.DAT", &control_bytes()).unwrap();
    archive.add_file("MESSAGES.DAT", &messages_dat).unwrap();

    let packet = Packet::open(Box::new(archive), ParseMode::Lenient).unwrap();
    let upper_bound = 1 + (messages_dat.len() - RECORD_SIZE) / RECORD_SIZE;
    assert!(packet.messages().len() <= upper_bound);
}
