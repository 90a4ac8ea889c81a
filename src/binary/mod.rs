//! Binary record primitives: the MSBIN float codec and the 128-byte record
//! layer shared by the message engine, the index codec, and the REP writer.

pub mod msbin;
pub mod record;

pub use record::RECORD_SIZE;
