use std::io::{ErrorKind, Write};

use recframe_record::Record;

use crate::codec::FrameCodec;
use crate::error::{FrameError, Result};
use crate::format::FrameFormat;

/// Writes framed units to any `Write` stream.
///
/// Block units are written back-to-back; B64Line units are each followed by
/// a newline.
pub struct FrameWriter<T> {
    inner: T,
    codec: FrameCodec,
    units_written: u64,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default codec configuration.
    pub fn new(inner: T, format: FrameFormat) -> Self {
        Self::with_codec(inner, FrameCodec::new(format))
    }

    /// Create a new frame writer around an explicit codec.
    pub fn with_codec(inner: T, codec: FrameCodec) -> Self {
        Self {
            inner,
            codec,
            units_written: 0,
        }
    }

    /// Encode and write one record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let unit = self.codec.encode(record)?;
        self.write_unit(&unit)
    }

    /// Write one already-encoded unit, as produced by [`FrameCodec::encode`].
    pub fn write_unit(&mut self, unit: &[u8]) -> Result<()> {
        self.write_all(unit)?;
        if self.codec.format() == FrameFormat::B64Line {
            self.write_all(b"\n")?;
        }
        self.units_written += 1;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Number of units written so far.
    pub fn units_written(&self) -> u64 {
        self.units_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
