//! Convert `(name, age)` text records to and from framed records.
//!
//! recframe turns delimited text lines into records framed either as
//! length-prefixed binary blocks or as base64 lines, and back again.
//!
//! # Crate Structure
//!
//! - [`record`] — The `Record` type, text line parsing, binary layout
//! - [`frame`] — Block and B64Line framing, stream reader/writer
//! - [`pipeline`] — Conversion stages, pipeline selection, local job runner

/// Re-export record types.
pub mod record {
    pub use recframe_record::*;
}

/// Re-export frame types.
pub mod frame {
    pub use recframe_frame::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use recframe_pipeline::*;
}
