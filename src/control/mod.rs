//! CONTROL.DAT parser.
//!
//! Eleven fixed-position leading lines, then `(number, name)` conference
//! pairs, then up to three optional trailing file names (welcome / news /
//! goodbye). The parser never fails outright: every field has a documented
//! default substituted in Lenient/Salvage mode (with a warning recorded),
//! and the original line sequence is always preserved verbatim in
//! [`ControlRecord::raw_lines`] regardless of how many fields parsed
//! successfully — this is what lets a caller round-trip a CONTROL.DAT whose
//! structured fields the parser couldn't make sense of.

pub mod date;

use crate::encoding::cp437::{self, DecodePolicy};
use crate::validation::{ParseMode, ValidationContext};
use chrono::NaiveDateTime;

/// One BBS conference, as listed in CONTROL.DAT.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConferenceInfo {
    pub number: u16,
    /// Original trailing whitespace is preserved verbatim — some doors pad
    /// conference names and downstream tools have come to depend on it.
    pub name: String,
}

/// The fully parsed CONTROL.DAT record.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlRecord {
    pub bbs_name: String,
    pub city: String,
    pub phone: String,
    pub sysop: String,
    pub registration_number: String,
    pub bbs_id: String,
    pub created: NaiveDateTime,
    pub user_name: String,
    pub menu_file: String,
    pub net_mail_conference: u16,
    pub total_messages: i32,
    pub conference_count_minus_one: i32,
    pub conferences: Vec<ConferenceInfo>,
    pub welcome_file: Option<String>,
    pub news_file: Option<String>,
    pub goodbye_file: Option<String>,
    /// The original ordered line sequence, decoded but otherwise untouched.
    /// Preserved even when individual field parses fell back to defaults.
    pub raw_lines: Vec<String>,
}

impl ControlRecord {
    /// A minimal record used when CONTROL.DAT is entirely absent
    /// (Lenient/Salvage only — Strict raises instead).
    pub fn placeholder() -> Self {
        Self {
            bbs_name: "Unknown BBS".to_string(),
            city: String::new(),
            phone: String::new(),
            sysop: String::new(),
            registration_number: String::new(),
            bbs_id: String::new(),
            created: date_epoch(),
            user_name: String::new(),
            menu_file: String::new(),
            net_mail_conference: 0,
            total_messages: 0,
            conference_count_minus_one: -1,
            conferences: Vec::new(),
            welcome_file: None,
            news_file: None,
            goodbye_file: None,
            raw_lines: Vec::new(),
        }
    }
}

fn date_epoch() -> NaiveDateTime {
    use chrono::NaiveDate;
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Split raw bytes into lines on `"\r\n"` or `"\n"` (a lone `"\r"` is not a
/// terminator). The terminator itself is stripped but line content is
/// otherwise untouched.
fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let end = if i > start && bytes[i - 1] == b'\r' {
                i - 1
            } else {
                i
            };
            lines.push(&bytes[start..end]);
            start = i + 1;
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&bytes[start..]);
    }
    lines
}

fn line_at<'a>(lines: &'a [String], idx: usize) -> Option<&'a str> {
    lines.get(idx).map(String::as_str)
}

fn parse_u16_field(text: &str, field: &str, ctx: &mut ValidationContext) -> u16 {
    match text.trim().parse::<u16>() {
        Ok(v) => v,
        Err(_) => {
            let message = format!("CONTROL.DAT field {field} {text:?} is not a valid u16, defaulting to 0");
            if ctx.mode() == ParseMode::Strict {
                ctx.error(message);
            } else {
                ctx.warning(message);
            }
            0
        }
    }
}

fn parse_i32_field(text: &str, field: &str, default: i32, ctx: &mut ValidationContext) -> i32 {
    match text.trim().parse::<i32>() {
        Ok(v) => v,
        Err(_) => {
            let message = format!(
                "CONTROL.DAT field {field} {text:?} is not a valid integer, defaulting to {default}"
            );
            if ctx.mode() == ParseMode::Strict {
                ctx.error(message);
            } else {
                ctx.warning(message);
            }
            default
        }
    }
}

/// Parse a CONTROL.DAT byte stream. Always produces a record — missing or
/// unparseable fields fall back to documented defaults with a warning
/// recorded in `ctx`; only the caller (the packet-open boundary) decides
/// whether a Strict-mode context error turns into a thrown error.
pub fn parse(bytes: &[u8], mode: ParseMode, ctx: &mut ValidationContext) -> ControlRecord {
    let raw_lines: Vec<String> = split_lines(bytes)
        .into_iter()
        .map(|l| cp437::decode(l, DecodePolicy::BestEffort).unwrap_or_default())
        .collect();

    let field = |idx: usize, name: &str, ctx: &mut ValidationContext| -> String {
        match line_at(&raw_lines, idx) {
            Some(s) => s.to_string(),
            None => {
                let message = format!("CONTROL.DAT is missing line {idx} ({name}), substituting empty string");
                if ctx.mode() == ParseMode::Strict {
                    ctx.error(message);
                } else {
                    ctx.warning(message);
                }
                String::new()
            }
        }
    };

    let bbs_name = field(0, "BBS name", ctx);
    let bbs_name = if bbs_name.is_empty() && line_at(&raw_lines, 0).is_none() {
        "Unknown BBS".to_string()
    } else {
        bbs_name
    };
    let city = field(1, "city", ctx);
    let phone = field(2, "phone", ctx);
    let sysop = field(3, "sysop", ctx);

    let registration_field = field(4, "registration,bbs-id", ctx);
    let (registration_number, bbs_id) = match registration_field.split_once(',') {
        Some((reg, id)) => (reg.to_string(), id.to_string()),
        None => {
            if !registration_field.is_empty() {
                ctx.warning(format!(
                    "CONTROL.DAT registration field {registration_field:?} has no comma, bbs-id defaults to empty"
                ));
            }
            (registration_field, String::new())
        }
    };

    let date_field = field(5, "creation date/time", ctx);
    let created = date::parse_creation_date(&date_field, mode, ctx).unwrap_or_else(|_| {
        ctx.error(format!(
            "CONTROL.DAT creation date {date_field:?} is unparseable or out of range"
        ));
        date_epoch()
    });

    let user_name = field(6, "user name", ctx);
    let menu_file = field(7, "menu file", ctx);

    let net_mail_conference = parse_u16_field(&field(8, "net-mail conference", ctx), "net-mail conference", ctx);
    let total_messages = parse_i32_field(&field(9, "total messages", ctx), "total messages", 0, ctx);
    let conference_count_minus_one =
        parse_i32_field(&field(10, "conference count minus one", ctx), "conference count minus one", -1, ctx);

    let expected_conferences = (conference_count_minus_one + 1).max(0) as usize;
    let mut conferences = Vec::with_capacity(expected_conferences);
    for i in 0..expected_conferences {
        let number_idx = 11 + 2 * i;
        let name_idx = 12 + 2 * i;
        let (Some(number_line), Some(name_line)) =
            (line_at(&raw_lines, number_idx), line_at(&raw_lines, name_idx))
        else {
            ctx.warning(format!(
                "CONTROL.DAT declared {expected_conferences} conferences but only {i} pairs are present"
            ));
            break;
        };
        let number = match number_line.trim().parse::<u16>() {
            Ok(n) => n,
            Err(_) => {
                let message = format!(
                    "conference entry {i} has an unparseable number {number_line:?}, defaulting to 0"
                );
                if ctx.mode() == ParseMode::Strict {
                    ctx.error(message);
                } else {
                    ctx.warning(message);
                }
                0
            }
        };
        conferences.push(ConferenceInfo {
            number,
            name: name_line.to_string(),
        });
    }

    let optional_start = 11 + 2 * conferences.len();
    let welcome_file = line_at(&raw_lines, optional_start).map(str::to_string).filter(|s| !s.is_empty());
    let news_file = line_at(&raw_lines, optional_start + 1).map(str::to_string).filter(|s| !s.is_empty());
    let goodbye_file = line_at(&raw_lines, optional_start + 2).map(str::to_string).filter(|s| !s.is_empty());

    ControlRecord {
        bbs_name,
        city,
        phone,
        sysop,
        registration_number,
        bbs_id,
        created,
        user_name,
        menu_file,
        net_mail_conference,
        total_messages,
        conference_count_minus_one,
        conferences,
        welcome_file,
        news_file,
        goodbye_file,
        raw_lines,
    }
}

/// Serialise a [`ControlRecord`] back to CONTROL.DAT bytes, CRLF-terminated.
/// Used by the REP writer, which copies the source packet's control record
/// verbatim rather than reconstructing one from scratch — this function
/// exists mainly so a caller that *did* edit the structured fields (e.g. to
/// bump `total_messages`) has a correct way to re-serialise them.
pub fn encode(record: &ControlRecord) -> Vec<u8> {
    let mut lines = vec![
        record.bbs_name.clone(),
        record.city.clone(),
        record.phone.clone(),
        record.sysop.clone(),
        format!("{},{}", record.registration_number, record.bbs_id),
        record.created.format("%m-%d-%Y,%H:%M:%S").to_string(),
        record.user_name.clone(),
        record.menu_file.clone(),
        record.net_mail_conference.to_string(),
        record.total_messages.to_string(),
        record.conference_count_minus_one.to_string(),
    ];
    for conf in &record.conferences {
        lines.push(conf.number.to_string());
        lines.push(conf.name.clone());
    }
    if let Some(f) = &record.welcome_file {
        lines.push(f.clone());
    }
    if let Some(f) = &record.news_file {
        lines.push(f.clone());
    }
    if let Some(f) = &record.goodbye_file {
        lines.push(f.clone());
    }

    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(&cp437::encode(&line, cp437::EncodePolicy::ReplacementQuestion).unwrap_or_default());
        out.extend_from_slice(b"\r\n");
    }
    out
}
