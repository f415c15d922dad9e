//! `tokio_util::codec` integration for async streams.

use bytes::{Bytes, BytesMut};
use recframe_record::Record;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{
    block_frame_len, decode_block, max_line_len, strip_line_terminator, FrameCodec, HEADER_SIZE,
};
use crate::error::{FrameError, Result};
use crate::format::FrameFormat;

/// Splits a byte stream into framed units and encodes records into it.
///
/// Decoded items are raw units, the same as [`crate::FramedUnit::bytes`];
/// turn them into records with [`FrameCodec::decode`].
#[derive(Debug, Clone)]
pub struct RecordCodec {
    codec: FrameCodec,
    /// Prefix of the decode buffer already searched for a newline.
    scanned: usize,
}

impl RecordCodec {
    pub fn new(codec: FrameCodec) -> Self {
        Self { codec, scanned: 0 }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }
}

impl Decoder for RecordCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        match self.codec.format() {
            FrameFormat::Block => decode_block(src, self.codec.config().max_payload_size),
            FrameFormat::B64Line => {
                let start = self.scanned.min(src.len());
                let Some(newline) = src[start..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map(|pos| start + pos)
                else {
                    self.scanned = src.len();
                    let max_line = max_line_len(self.codec.config().max_payload_size);
                    if src.len() > max_line {
                        return Err(FrameError::PayloadTooLarge {
                            size: src.len(),
                            max: max_line,
                        });
                    }
                    return Ok(None);
                };
                self.scanned = 0;
                let raw = src.split_to(newline + 1).freeze();
                Ok(Some(raw.slice(..strip_line_terminator(&raw).len())))
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(unit) = self.decode(src)? {
            return Ok(Some(unit));
        }
        if src.is_empty() {
            return Ok(None);
        }
        match self.codec.format() {
            FrameFormat::Block => {
                let expected = block_frame_len(src, self.codec.config().max_payload_size)?
                    .unwrap_or(HEADER_SIZE);
                Err(FrameError::TruncatedFrame {
                    expected,
                    available: src.len(),
                })
            }
            FrameFormat::B64Line => {
                self.scanned = 0;
                let raw = src.split().freeze();
                Ok(Some(raw.slice(..strip_line_terminator(&raw).len())))
            }
        }
    }
}

impl<'a> Encoder<&'a Record> for RecordCodec {
    type Error = FrameError;

    fn encode(&mut self, record: &'a Record, dst: &mut BytesMut) -> Result<()> {
        let unit = self.codec.encode(record)?;
        dst.extend_from_slice(&unit);
        if self.codec.format() == FrameFormat::B64Line {
            dst.extend_from_slice(b"\n");
        }
        Ok(())
    }
}
