//! DOOR.ID parser — optional metadata about the door software that
//! produced a packet.

use crate::encoding::cp437::{self, DecodePolicy};

/// Parsed DOOR.ID contents. `name`/`version`/`capabilities` surface the
/// conventionally-named entries; `entries` keeps every `key=value` pair in
/// file order (including ones this parser doesn't specially recognise) so
/// callers that need a door-specific extension aren't blocked on this crate
/// knowing about it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DoorId {
    pub name: Option<String>,
    pub version: Option<String>,
    pub capabilities: Vec<String>,
    pub entries: Vec<(String, String)>,
}

/// Parse `DOOR.ID` bytes: `key=value` lines, CRLF- or LF-terminated.
/// Blank lines and lines without `=` are skipped.
pub fn parse(bytes: &[u8]) -> DoorId {
    let text = cp437::decode(bytes, DecodePolicy::BestEffort).unwrap_or_default();
    let mut door = DoorId::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        door.entries.push((key.to_string(), value.to_string()));

        match key.to_ascii_uppercase().as_str() {
            "NAME" | "DOOR" | "PROGRAM" => door.name = Some(value.to_string()),
            "VERSION" => door.version = Some(value.to_string()),
            "CAPABILITIES" | "CAPS" => {
                door.capabilities = value
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    door
}
