//! Record framing for batch conversion.
//!
//! Two interchangeable strategies turn a [`Record`](recframe_record::Record)
//! into self-delimiting bytes and back:
//! - **Block**: a 4-byte little-endian length followed by the binary record
//!   layout. Frames pack back-to-back with no separator.
//! - **B64Line**: the binary record layout as one standard-base64 line.
//!
//! Bytes produced by one strategy are meaningless to the other.

pub mod codec;
pub mod error;
pub mod format;
pub mod reader;
#[cfg(feature = "async")]
pub mod tokio_codec;
pub mod writer;

pub use codec::{
    decode_b64_line, decode_block, encode_b64_line, encode_block, FrameCodec, FrameConfig,
    DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use format::FrameFormat;
pub use reader::{FrameReader, FramedUnit};
#[cfg(feature = "async")]
pub use tokio_codec::RecordCodec;
pub use writer::FrameWriter;
