//! Typed records and their binary layout.
//!
//! This is the lowest layer of recframe. A [`Record`] is a validated
//! `(name, age)` pair; it enters the system either from a delimited text
//! line ([`parse_line`]) or from the field-tagged binary layout
//! ([`decode_record`]) that both framing strategies carry.

pub mod error;
pub mod layout;
pub mod parse;
pub mod record;

pub use error::{LayoutError, RecordError};
pub use layout::{decode_record, encode_record, encoded_len};
pub use parse::{parse_line, ParseOutcome, SkipReason};
pub use record::Record;
