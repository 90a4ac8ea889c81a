//! TOREADER.EXT / TODOOR.EXT parsers: line-oriented command streams with no
//! semantic validation of command names — that's left to whatever consumes
//! the parsed commands.

use crate::encoding::cp437::{self, DecodePolicy};

/// One command line: `command` is everything before the first whitespace
/// run, `parameters` is everything after it (both trimmed); `raw_line`
/// keeps the original line for diagnostics.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtCommand {
    pub command: String,
    pub parameters: String,
    pub raw_line: String,
}

/// Parse a TOREADER.EXT/TODOOR.EXT byte stream. Blank and whitespace-only
/// lines are skipped; every other line is split on its first space or tab.
pub fn parse(bytes: &[u8]) -> Vec<ExtCommand> {
    let text = cp437::decode(bytes, DecodePolicy::BestEffort).unwrap_or_default();
    text.lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            let (command, parameters) = match trimmed.find(|c: char| c == ' ' || c == '\t') {
                Some(idx) => (&trimmed[..idx], trimmed[idx..].trim()),
                None => (trimmed, ""),
            };
            Some(ExtCommand {
                command: command.to_string(),
                parameters: parameters.to_string(),
                raw_line: line.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_whitespace() {
        let commands = parse(b"UPLOAD file.zip extra args\r\nHELLO\r\n\r\n  \r\nPING\tnow\r\n");
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].command, "UPLOAD");
        assert_eq!(commands[0].parameters, "file.zip extra args");
        assert_eq!(commands[1].command, "HELLO");
        assert_eq!(commands[1].parameters, "");
        assert_eq!(commands[2].command, "PING");
        assert_eq!(commands[2].parameters, "now");
    }

    #[test]
    fn raw_line_keeps_untrimmed_original() {
        let commands = parse(b"  PING now  \r\n");
        assert_eq!(commands[0].raw_line, "  PING now  ");
        assert_eq!(commands[0].command, "PING");
    }
}
