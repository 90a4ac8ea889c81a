//! QWKE extensions: long in-body headers and the TOREADER.EXT/TODOOR.EXT
//! command files.

pub mod ext;

use crate::message::Kludge;

/// The QWKE "extended" To/From/Subject, read off a message's kludge
/// collection. These are advisory overrides — present only when the
/// corresponding kludge exists, never synthesised from the 25-byte fixed
/// header fields. "First wins": if a key appears more than once (callers
/// may legitimately duplicate kludges), the first occurrence is used.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtendedHeaders {
    pub to: Option<String>,
    pub from: Option<String>,
    pub subject: Option<String>,
}

fn first_value<'a>(kludges: &'a [Kludge], key: &str) -> Option<&'a str> {
    kludges.iter().find(|k| k.key == key).map(|k| k.value.as_str())
}

/// Extract the extended headers from a message's kludge list.
pub fn extract(kludges: &[Kludge]) -> ExtendedHeaders {
    ExtendedHeaders {
        to: first_value(kludges, "To").map(str::to_string),
        from: first_value(kludges, "From").map(str::to_string),
        subject: first_value(kludges, "Subject").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kludge(key: &str, value: &str) -> Kludge {
        Kludge {
            key: key.to_string(),
            value: value.to_string(),
            raw_line: format!("{key}: {value}"),
        }
    }

    #[test]
    fn surfaces_present_fields_only() {
        let kludges = vec![kludge("To", "Alice"), kludge("@MSGID", "<1@x>")];
        let headers = extract(&kludges);
        assert_eq!(headers.to.as_deref(), Some("Alice"));
        assert!(headers.from.is_none());
        assert!(headers.subject.is_none());
    }

    #[test]
    fn first_wins_on_duplicate_keys() {
        let kludges = vec![kludge("To", "Alice"), kludge("To", "Bob")];
        assert_eq!(extract(&kludges).to.as_deref(), Some("Alice"));
    }
}
