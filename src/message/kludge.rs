//! Kludge extraction.
//!
//! Scans from the top of a message body for two conventions: QWKE long
//! headers (`To:`/`From:`/`Subject:`) and Synchronet `@`-kludges
//! (`@MSGID:`, `@VIA:`, ...). Scanning stops at the first line matching
//! neither, which is what keeps a Synchronet reply attribution ("Re: ...",
//! "By: ...") or a URL containing a colon from being misread as a kludge.

/// One extracted kludge: its key, its value, and the original body line it
/// came from (kept for diagnostics and for writers that want to
/// re-serialise kludges byte-for-byte rather than reconstruct them).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Kludge {
    pub key: String,
    pub value: String,
    pub raw_line: String,
}

const QWKE_KEYS: [&str; 3] = ["To", "From", "Subject"];

fn strip_one_leading_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

fn try_qwke(line: &str) -> Option<Kludge> {
    let (key, rest) = line.split_once(':')?;
    let matched = QWKE_KEYS.iter().find(|k| k.eq_ignore_ascii_case(key))?;
    Some(Kludge {
        key: matched.to_string(),
        value: strip_one_leading_space(rest).to_string(),
        raw_line: line.to_string(),
    })
}

fn try_synchronet(line: &str) -> Option<Kludge> {
    let rest = line.strip_prefix('@')?;
    let colon = rest.find(':')?;
    let ident = &rest[..colon];
    if ident.is_empty() || ident.contains(char::is_whitespace) {
        return None;
    }
    let value = &rest[colon + 1..];
    Some(Kludge {
        key: format!("@{ident}"),
        value: strip_one_leading_space(value).to_string(),
        raw_line: line.to_string(),
    })
}

fn try_kludge(line: &str) -> Option<Kludge> {
    try_qwke(line).or_else(|| try_synchronet(line))
}

/// Extract leading kludges from `lines`, returning `(kludges, remaining
/// body)`. A blank line always stops scanning; it is additionally removed
/// from the body, but only if at least one kludge was already extracted —
/// a leading blank line in an otherwise kludge-free message is ordinary
/// content, not a kludge-block terminator.
pub fn extract(mut lines: Vec<String>) -> (Vec<Kludge>, Vec<String>) {
    let mut kludges = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        if line.is_empty() {
            if !kludges.is_empty() {
                idx += 1;
            }
            break;
        }
        match try_kludge(line) {
            Some(k) => {
                kludges.push(k);
                idx += 1;
            }
            None => break,
        }
    }

    let remaining = lines.split_off(idx);
    (kludges, remaining)
}
