use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{BufMut, Bytes, BytesMut};
use recframe_record::{decode_record, encode_record, encoded_len, Record};

use crate::error::{FrameError, Result};
use crate::format::FrameFormat;

/// Block frame header: payload length (4 bytes, LE).
pub const HEADER_SIZE: usize = 4;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum record layout size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Encodes and decodes single records with one framing strategy.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    format: FrameFormat,
    config: FrameConfig,
}

impl FrameCodec {
    /// Create a codec with default configuration.
    pub fn new(format: FrameFormat) -> Self {
        Self::with_config(format, FrameConfig::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(format: FrameFormat, config: FrameConfig) -> Self {
        Self { format, config }
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Frame one record.
    ///
    /// Block output carries its length prefix. B64Line output is a single
    /// line without a terminator.
    pub fn encode(&self, record: &Record) -> Result<Bytes> {
        let size = encoded_len(record);
        if size > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size,
                max: self.config.max_payload_size,
            });
        }

        let mut dst = BytesMut::new();
        match self.format {
            FrameFormat::Block => encode_block(record, &mut dst)?,
            FrameFormat::B64Line => dst.put_slice(encode_b64_line(record).as_bytes()),
        }
        Ok(dst.freeze())
    }

    /// Decode exactly one framed unit.
    pub fn decode(&self, unit: &[u8]) -> Result<Record> {
        match self.format {
            FrameFormat::Block => decode_block_unit(unit, self.config.max_payload_size),
            FrameFormat::B64Line => decode_b64_line(unit),
        }
    }
}

/// Encode a record as a Block frame.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────────┐
/// │ Length (4B LE)│ Record layout (Length B) │
/// └──────────────┴──────────────────────────┘
/// ```
pub fn encode_block(record: &Record, dst: &mut BytesMut) -> Result<()> {
    let size = encoded_len(record);
    if size > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size,
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + size);
    dst.put_u32_le(size as u32);
    encode_record(record, dst);
    Ok(())
}

/// Split one Block frame off the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes (header included) from the buffer.
pub fn decode_block(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let Some(total) = block_frame_len(src, max_payload)? else {
        return Ok(None); // Need more data
    };
    if src.len() < total {
        return Ok(None); // Need more data
    }
    Ok(Some(src.split_to(total).freeze()))
}

/// Total wire size of the frame starting at `src`, once its header is
/// available.
pub(crate) fn block_frame_len(src: &[u8], max_payload: usize) -> Result<Option<usize>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }
    let payload_len = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }
    Ok(Some(HEADER_SIZE + payload_len))
}

fn decode_block_unit(unit: &[u8], max_payload: usize) -> Result<Record> {
    let Some(total) = block_frame_len(unit, max_payload)? else {
        return Err(FrameError::TruncatedFrame {
            expected: HEADER_SIZE,
            available: unit.len(),
        });
    };
    if unit.len() < total {
        return Err(FrameError::TruncatedFrame {
            expected: total,
            available: unit.len(),
        });
    }
    if unit.len() > total {
        return Err(FrameError::CorruptFrame(format!(
            "{} bytes after end of frame",
            unit.len() - total
        )));
    }
    Ok(decode_record(&unit[HEADER_SIZE..])?)
}

/// Encode a record as one base64 line, without a terminator.
pub fn encode_b64_line(record: &Record) -> String {
    let mut layout = BytesMut::new();
    encode_record(record, &mut layout);
    STANDARD.encode(&layout)
}

/// Decode one base64 line. A trailing `\n` or `\r\n` is ignored.
pub fn decode_b64_line(line: &[u8]) -> Result<Record> {
    let line = strip_line_terminator(line);
    let layout = STANDARD
        .decode(line)
        .map_err(|err| FrameError::CorruptFrame(format!("invalid base64: {err}")))?;
    Ok(decode_record(&layout)?)
}

/// Longest base64 line that can carry `max_payload` layout bytes, plus room
/// for a `\r\n` terminator.
pub(crate) fn max_line_len(max_payload: usize) -> usize {
    max_payload.div_ceil(3).saturating_mul(4).saturating_add(2)
}

pub(crate) fn strip_line_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
