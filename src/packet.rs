//! The `Packet` facade: orchestrates an archive plus §§3–7 of the format
//! into one read-only value (§4.2, "Packet read orchestration").

use std::collections::HashMap;
use std::sync::Mutex;

use crate::archive::{self, ArchiveReader};
use crate::control::{self, ControlRecord};
use crate::encoding::cp437::{self, DecodePolicy};
use crate::error::{Location, QwkError, Result};
use crate::message::{self, DoorId, Message};
use crate::validation::{ParseMode, ValidationContext, ValidationReport};

const CONTROL_DAT: &str = "CONTROL.DAT";
const MESSAGES_DAT: &str = "MESSAGES.DAT";
const DOOR_ID: &str = "DOOR.ID";
const RECORD_SIZE: usize = crate::binary::record::RECORD_SIZE;

/// A fully opened QWK/QWKE packet. Construction (`Packet::open`) performs
/// all the work described in §4.2; afterwards a packet is immutable apart
/// from its optional-file cache, which several threads may read
/// concurrently (§5).
pub struct Packet {
    control: ControlRecord,
    conferences: Vec<control::ConferenceInfo>,
    messages: Vec<Message>,
    door_id: Option<DoorId>,
    report: ValidationReport,
    archive: Box<dyn ArchiveReader>,
    optional_cache: Mutex<HashMap<String, Option<String>>>,
}

impl Packet {
    /// Open a packet from an archive, per the orchestration in §4.2:
    /// require `CONTROL.DAT`, optionally read `DOOR.ID`, and if
    /// `MESSAGES.DAT` is present walk it via [`message::read_messages`].
    /// In [`ParseMode::Strict`], any error recorded in the validation
    /// context during this process is translated into a returned
    /// [`QwkError::Format`] instead of a successful (but invalid) packet.
    pub fn open(archive: Box<dyn ArchiveReader>, mode: ParseMode) -> Result<Self> {
        let mut ctx = ValidationContext::new(mode);
        let limit = archive::DEFAULT_MAX_ENTRY_SIZE_MB;

        let control = match archive.open_file(CONTROL_DAT, limit) {
            Ok(bytes) => control::parse(&bytes, mode, &mut ctx),
            Err(QwkError::MissingFile(_)) => {
                if mode == ParseMode::Strict {
                    return Err(QwkError::format_at(
                        "CONTROL.DAT is required but absent from the archive",
                        Location::file(CONTROL_DAT),
                    ));
                }
                ctx.error("CONTROL.DAT is required but absent from the archive");
                ControlRecord::placeholder()
            }
            Err(other) => return Err(other),
        };

        let door_id = if archive.file_exists(DOOR_ID) {
            Some(message::doorid::parse(&archive.open_file(DOOR_ID, limit)?))
        } else {
            None
        };

        let messages = if archive.file_exists(MESSAGES_DAT) {
            let bytes = archive.open_file(MESSAGES_DAT, limit)?;
            if bytes.len() < RECORD_SIZE {
                ctx.warning(format!(
                    "MESSAGES.DAT is {} bytes, too small to contain even the copyright block",
                    bytes.len()
                ));
                Vec::new()
            } else {
                message::read_messages(&bytes[RECORD_SIZE..], &mut ctx)
            }
        } else {
            Vec::new()
        };

        if mode == ParseMode::Strict {
            if let Some(issue) = ctx.first_error() {
                return Err(QwkError::format_at(issue.message.clone(), Location::file("packet")));
            }
        }

        let conferences = control.conferences.clone();

        Ok(Packet {
            control,
            conferences,
            messages,
            door_id,
            report: ctx.into_report(),
            archive,
            optional_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn control(&self) -> &ControlRecord {
        &self.control
    }

    pub fn conferences(&self) -> &[control::ConferenceInfo] {
        &self.conferences
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn door_id(&self) -> Option<&DoorId> {
        self.door_id.as_ref()
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Read an optional CP437 text file (welcome/news/goodbye banners,
    /// `TOREADER.EXT`, door-specific extras) by name, with the read-through
    /// caching described in §9 ("Lazy optional-file cache"): the first call
    /// for a given name reads through the archive and caches the result —
    /// including a `None` if the file is absent — so later calls, even for
    /// a file that doesn't exist, never touch the archive again.
    pub fn optional_file(&self, name: &str) -> Option<String> {
        let mut cache = self.optional_cache.lock().unwrap();
        if let Some(cached) = cache.get(name) {
            return cached.clone();
        }
        let value = if self.archive.file_exists(name) {
            self.archive
                .open_file(name, archive::DEFAULT_MAX_ENTRY_SIZE_MB)
                .ok()
                .map(|bytes| cp437::decode(&bytes, DecodePolicy::BestEffort).unwrap_or_default())
        } else {
            None
        };
        cache.insert(name.to_string(), value.clone());
        value
    }
}
