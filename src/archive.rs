//! Archive container interface.
//!
//! The ZIP/TAR container itself is out of scope (§1) — this module defines
//! the narrow trait boundary the rest of the crate consumes, a process-wide
//! registry so additional container formats can plug in without the codec
//! knowing about them, and (behind `#[cfg(test)]`, re-exported for
//! integration tests as [`MemoryArchive`]) an in-memory stand-in used to
//! exercise that boundary without a real ZIP dependency.

use std::sync::Mutex;

use crate::error::{QwkError, Result};

/// Default per-entry decompression guard, in megabytes.
pub const DEFAULT_MAX_ENTRY_SIZE_MB: u64 = 100;

/// Compute the per-entry size limit the facade passes to an archive reader:
/// `max(100, message_MB * 10)`.
pub fn entry_size_limit_mb(message_mb: u64) -> u64 {
    DEFAULT_MAX_ENTRY_SIZE_MB.max(message_mb.saturating_mul(10))
}

/// Read-only view over an archive's members. Implementations must tolerate
/// concurrent calls — a [`crate::packet::Packet`] may read its optional
/// files from multiple threads once opened.
pub trait ArchiveReader: Send + Sync {
    /// Member names, in archive order.
    fn list_files(&self) -> Vec<String>;

    /// Case-insensitive membership check.
    fn file_exists(&self, name: &str) -> bool;

    /// Read one member's full contents. Case-insensitive name match.
    /// Fails with [`QwkError::MissingFile`] if absent, or
    /// [`QwkError::LimitExceeded`] if its uncompressed size exceeds
    /// `max_entry_size_mb`.
    fn open_file(&self, name: &str, max_entry_size_mb: u64) -> Result<Vec<u8>>;
}

/// Write-only sink for a freshly built archive (e.g. a REP packet). Once
/// [`ArchiveWriter::save`] is called, further [`ArchiveWriter::add_file`]
/// calls must fail with [`QwkError::InvalidUsage`] — this is a
/// single-lifetime builder, not safe to reuse.
pub trait ArchiveWriter {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
    fn save(&mut self, out: &mut dyn std::io::Write) -> Result<()>;
}

/// A factory that attempts to construct a reader from a byte buffer known
/// to start with a registered magic signature. Returns `None` if the bytes
/// matched the signature but didn't otherwise parse as that format.
pub type ReaderFactory = fn(&[u8]) -> Option<Box<dyn ArchiveReader>>;

struct Registration {
    offset: usize,
    magic: Vec<u8>,
    factory: ReaderFactory,
}

static REGISTRY: Mutex<Vec<Registration>> = Mutex::new(Vec::new());

/// Register an archive format: `magic` must appear at `offset` bytes into
/// the stream for `factory` to be tried. No signature reflection or
/// auto-discovery — every format is registered explicitly by a caller.
pub fn register_format(offset: usize, magic: Vec<u8>, factory: ReaderFactory) {
    REGISTRY.lock().unwrap().push(Registration {
        offset,
        magic,
        factory,
    });
}

/// Try every registered format against `bytes`, in registration order,
/// returning the first reader a matching factory constructs.
pub fn detect(bytes: &[u8]) -> Option<Box<dyn ArchiveReader>> {
    let registry = REGISTRY.lock().unwrap();
    for reg in registry.iter() {
        if bytes.len() >= reg.offset + reg.magic.len()
            && bytes[reg.offset..reg.offset + reg.magic.len()] == reg.magic[..]
        {
            if let Some(reader) = (reg.factory)(bytes) {
                return Some(reader);
            }
        }
    }
    None
}

/// An in-memory archive, case-insensitive by member name. Used by this
/// crate's own test suite to exercise [`crate::packet::Packet`] without
/// pulling in a ZIP implementation, and re-exported (see
/// [`crate::testing`]) for integration tests that need the same thing.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    files: Vec<(String, Vec<u8>)>,
    saved: bool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, name: &str) -> Option<&(String, Vec<u8>)> {
        self.files.iter().find(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl ArchiveReader for MemoryArchive {
    fn list_files(&self) -> Vec<String> {
        self.files.iter().map(|(n, _)| n.clone()).collect()
    }

    fn file_exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn open_file(&self, name: &str, max_entry_size_mb: u64) -> Result<Vec<u8>> {
        let (found_name, bytes) = self
            .find(name)
            .ok_or_else(|| QwkError::MissingFile(name.to_string()))?;
        let limit = max_entry_size_mb * 1024 * 1024;
        if bytes.len() as u64 > limit {
            return Err(QwkError::LimitExceeded {
                entry: found_name.clone(),
                size: bytes.len() as u64,
                limit,
            });
        }
        Ok(bytes.clone())
    }
}

impl ArchiveWriter for MemoryArchive {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        if self.saved {
            return Err(QwkError::InvalidUsage(
                "add_file called after save".to_string(),
            ));
        }
        self.files.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn save(&mut self, out: &mut dyn std::io::Write) -> Result<()> {
        if self.saved {
            return Err(QwkError::InvalidUsage("save called twice".to_string()));
        }
        self.saved = true;
        // Not a real archive container format — this writes a simple
        // length-prefixed record stream, sufficient for round-tripping
        // through `MemoryArchive::new` in tests.
        for (name, bytes) in &self.files {
            let name_bytes = name.as_bytes();
            out.write_all(&(name_bytes.len() as u32).to_le_bytes())?;
            out.write_all(name_bytes)?;
            out.write_all(&(bytes.len() as u64).to_le_bytes())?;
            out.write_all(bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        let mut archive = MemoryArchive::new();
        archive.add_file("CONTROL.DAT", b"hello").unwrap();
        assert!(archive.file_exists("control.dat"));
        assert_eq!(archive.open_file("Control.Dat", 100).unwrap(), b"hello");
    }

    #[test]
    fn missing_file_errors() {
        let archive = MemoryArchive::new();
        assert!(matches!(
            archive.open_file("nope", 100),
            Err(QwkError::MissingFile(_))
        ));
    }

    #[test]
    fn s6_size_limit_guard_fails_before_reading_body() {
        let mut archive = MemoryArchive::new();
        archive.add_file("MESSAGES.DAT", &vec![0u8; 200]).unwrap();
        let err = archive.open_file("MESSAGES.DAT", 0).unwrap_err();
        assert!(matches!(err, QwkError::LimitExceeded { .. }));
    }

    #[test]
    fn add_after_save_is_invalid_usage() {
        let mut archive = MemoryArchive::new();
        let mut buf = Vec::new();
        archive.save(&mut buf).unwrap();
        assert!(matches!(
            archive.add_file("x", b"y"),
            Err(QwkError::InvalidUsage(_))
        ));
    }

    #[test]
    fn entry_size_limit_formula() {
        assert_eq!(entry_size_limit_mb(0), 100);
        assert_eq!(entry_size_limit_mb(5), 100);
        assert_eq!(entry_size_limit_mb(20), 200);
    }
}
