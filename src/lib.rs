//! A byte-exact codec for QWK, REP, and QWKE offline bulletin-board mail
//! packets.
//!
//! This crate covers the packet codec proper: the CONTROL.DAT parser, the
//! MESSAGES.DAT binary record engine (header discrimination, body assembly,
//! kludge extraction), the CP437/0xE3 encoding pipeline, the MSBIN `.NDX`
//! index codec, and the QWKE extensions, all threaded through a shared
//! [`validation::ValidationContext`] so a damaged packet degrades to a
//! diagnostic report rather than an opaque failure.
//!
//! The archive container (ZIP/TAR) is explicitly out of scope — see
//! [`archive`] for the trait boundary this crate consumes instead of
//! depending on a concrete archive implementation.
//!
//! Start at [`packet::Packet::open`] to read an existing packet, or
//! [`rep::RepWriter`] to build a reply.

pub mod archive;
pub mod binary;
pub mod control;
pub mod encoding;
pub mod error;
pub mod index;
pub mod message;
pub mod packet;
pub mod qwke;
pub mod rep;
pub mod validation;

pub use error::{QwkError, Result};
pub use packet::Packet;
pub use rep::RepWriter;
pub use validation::{ParseMode, ValidationReport};

/// Test-only helpers re-exported for integration tests (`tests/`), which
/// can't reach `#[cfg(test)]` items in library modules directly.
pub mod testing {
    pub use crate::archive::MemoryArchive;
}
