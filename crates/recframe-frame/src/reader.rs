use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::codec::{
    block_frame_len, decode_block, max_line_len, strip_line_terminator, FrameConfig, HEADER_SIZE,
};
use crate::error::{FrameError, Result};
use crate::format::FrameFormat;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// One framed unit as it appeared in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedUnit {
    /// Byte offset of the unit within the stream.
    pub offset: u64,
    /// The unit bytes: a whole Block frame (header included) or one B64Line
    /// line without its terminator.
    pub bytes: Bytes,
}

/// Reads complete framed units from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete units.
pub struct FrameReader<T> {
    inner: T,
    format: FrameFormat,
    buf: BytesMut,
    config: FrameConfig,
    /// Stream offset of the first byte in `buf`.
    offset: u64,
    /// Prefix of `buf` already searched for a newline.
    scanned: usize,
    eof: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T, format: FrameFormat) -> Self {
        Self::with_config(inner, format, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, format: FrameFormat, config: FrameConfig) -> Self {
        Self {
            inner,
            format,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            offset: 0,
            scanned: 0,
            eof: false,
        }
    }

    /// Read the next complete unit (blocking).
    ///
    /// Returns `Ok(None)` at end of input. For Block streams end of input
    /// is only valid on a frame boundary; anything else is
    /// [`FrameError::TruncatedFrame`].
    pub fn read_unit(&mut self) -> Result<Option<FramedUnit>> {
        loop {
            if let Some(unit) = self.take_buffered()? {
                return Ok(Some(unit));
            }
            if self.eof {
                return self.take_remainder();
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
                continue;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn take_buffered(&mut self) -> Result<Option<FramedUnit>> {
        match self.format {
            FrameFormat::Block => {
                let Some(frame) = decode_block(&mut self.buf, self.config.max_payload_size)? else {
                    return Ok(None);
                };
                Ok(Some(self.unit(frame.len(), frame)))
            }
            FrameFormat::B64Line => {
                let Some(newline) = self.buf[self.scanned..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map(|pos| self.scanned + pos)
                else {
                    self.scanned = self.buf.len();
                    let max_line = max_line_len(self.config.max_payload_size);
                    if self.buf.len() > max_line {
                        return Err(FrameError::PayloadTooLarge {
                            size: self.buf.len(),
                            max: max_line,
                        });
                    }
                    return Ok(None);
                };
                self.scanned = 0;
                let raw = self.buf.split_to(newline + 1).freeze();
                let consumed = raw.len();
                let line = raw.slice(..strip_line_terminator(&raw).len());
                Ok(Some(self.unit(consumed, line)))
            }
        }
    }

    /// Handle whatever is buffered once the stream has ended.
    fn take_remainder(&mut self) -> Result<Option<FramedUnit>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        match self.format {
            FrameFormat::Block => {
                let expected = block_frame_len(&self.buf, self.config.max_payload_size)?
                    .unwrap_or(HEADER_SIZE);
                Err(FrameError::TruncatedFrame {
                    expected,
                    available: self.buf.len(),
                })
            }
            FrameFormat::B64Line => {
                self.scanned = 0;
                let raw = self.buf.split().freeze();
                let consumed = raw.len();
                let line = raw.slice(..strip_line_terminator(&raw).len());
                Ok(Some(self.unit(consumed, line)))
            }
        }
    }

    fn unit(&mut self, consumed: usize, bytes: Bytes) -> FramedUnit {
        let unit = FramedUnit {
            offset: self.offset,
            bytes,
        };
        self.offset += consumed as u64;
        unit
    }

    /// Framing strategy this reader splits on.
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
