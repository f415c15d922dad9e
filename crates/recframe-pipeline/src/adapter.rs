//! Input and output adapters at the batch framework boundary.
//!
//! Inputs yield `(offset, unit)` pairs, where `offset` is the unit's byte
//! position in its stream. Outputs persist items with no key.

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::Bytes;
use recframe_frame::{FrameCodec, FrameReader, FrameWriter, DEFAULT_MAX_PAYLOAD};
use tracing::warn;

use crate::error::Result;

/// Supplies input units one at a time.
pub trait InputAdapter {
    type Unit;

    /// Next unit and its positional key, or `None` once input is exhausted.
    fn next_unit(&mut self) -> Result<Option<(u64, Self::Unit)>>;
}

/// Persists emitted items.
pub trait OutputAdapter {
    type Item;

    fn emit(&mut self, item: Self::Item) -> Result<()>;

    /// Flush everything emitted so far.
    fn finish(&mut self) -> Result<()>;
}

/// Reads text lines, stripping `\n` or `\r\n`.
///
/// A line longer than `max_line_len` bytes (terminator included) is
/// discarded and yielded as an empty line, so it is skipped downstream
/// without buffering it whole.
pub struct TextLineInput<R> {
    inner: R,
    offset: u64,
    buf: Vec<u8>,
    max_line_len: usize,
}

impl<R: BufRead> TextLineInput<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_line_len(inner, DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_line_len(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            offset: 0,
            buf: Vec::new(),
            max_line_len,
        }
    }
}

impl<R: BufRead> InputAdapter for TextLineInput<R> {
    type Unit = String;

    fn next_unit(&mut self) -> Result<Option<(u64, String)>> {
        self.buf.clear();
        let mut read = 0usize;
        let mut oversized = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if available.is_empty() {
                break;
            }

            let (taken, done) = match available.iter().position(|b| *b == b'\n') {
                Some(newline) => (newline + 1, true),
                None => (available.len(), false),
            };
            if !oversized {
                if self.buf.len() + taken > self.max_line_len {
                    oversized = true;
                    self.buf.clear();
                } else {
                    self.buf.extend_from_slice(&available[..taken]);
                }
            }
            self.inner.consume(taken);
            read += taken;
            if done {
                break;
            }
        }

        if read == 0 {
            return Ok(None);
        }

        let key = self.offset;
        self.offset += read as u64;

        if oversized {
            warn!(key, len = read, max = self.max_line_len, "skipping oversized text line");
            return Ok(Some((key, String::new())));
        }

        let mut line = self.buf.as_slice();
        line = line.strip_suffix(b"\n").unwrap_or(line);
        line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(Some((key, String::from_utf8_lossy(line).into_owned())))
    }
}

/// Reads framed units (Block frames or B64Line lines).
pub struct FramedInput<R> {
    reader: FrameReader<R>,
}

impl<R: Read> FramedInput<R> {
    pub fn new(reader: FrameReader<R>) -> Self {
        Self { reader }
    }
}

impl<R: Read> InputAdapter for FramedInput<R> {
    type Unit = Bytes;

    fn next_unit(&mut self) -> Result<Option<(u64, Bytes)>> {
        Ok(self
            .reader
            .read_unit()?
            .map(|unit| (unit.offset, unit.bytes)))
    }
}

/// Writes one text line per item.
pub struct TextOutput<W> {
    inner: W,
}

impl<W: Write> TextOutput<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputAdapter for TextOutput<W> {
    type Item = String;

    fn emit(&mut self, line: String) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Writes framed units produced by [`FrameCodec::encode`].
pub struct FramedOutput<W> {
    writer: FrameWriter<W>,
}

impl<W: Write> FramedOutput<W> {
    pub fn new(inner: W, codec: FrameCodec) -> Self {
        Self {
            writer: FrameWriter::with_codec(inner, codec),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> OutputAdapter for FramedOutput<W> {
    type Item = Bytes;

    fn emit(&mut self, unit: Bytes) -> Result<()> {
        self.writer.write_unit(&unit)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use recframe_frame::FrameFormat;
    use recframe_record::Record;

    use super::*;

    #[test]
    fn text_input_yields_offsets_and_strips_terminators() {
        let mut input = TextLineInput::new(Cursor::new(b"a\t1\r\nb\t2\nc".to_vec()));

        assert_eq!(input.next_unit().unwrap(), Some((0, "a\t1".to_string())));
        assert_eq!(input.next_unit().unwrap(), Some((5, "b\t2".to_string())));
        assert_eq!(input.next_unit().unwrap(), Some((9, "c".to_string())));
        assert_eq!(input.next_unit().unwrap(), None);
    }

    #[test]
    fn text_input_discards_overlong_lines() {
        let mut wire = vec![b'x'; 100];
        wire.extend_from_slice(b"\nBob\t4\n");
        let mut input = TextLineInput::with_max_line_len(Cursor::new(wire), 16);

        assert_eq!(input.next_unit().unwrap(), Some((0, String::new())));
        assert_eq!(input.next_unit().unwrap(), Some((101, "Bob\t4".to_string())));
        assert_eq!(input.next_unit().unwrap(), None);
    }

    #[test]
    fn text_input_replaces_invalid_utf8() {
        let mut input = TextLineInput::new(Cursor::new(vec![b'x', 0xFF, b'\n']));
        let (_, line) = input.next_unit().unwrap().unwrap();
        assert_eq!(line, "x\u{FFFD}");
    }

    #[test]
    fn framed_output_feeds_framed_input() {
        let codec = FrameCodec::new(FrameFormat::Block);
        let alice = Record::new("Alice", 30).unwrap();

        let mut output = FramedOutput::new(Vec::<u8>::new(), codec.clone());
        output.emit(codec.encode(&alice).unwrap()).unwrap();
        output.emit(codec.encode(&alice).unwrap()).unwrap();
        output.finish().unwrap();
        let wire = output.into_inner();

        let mut input = FramedInput::new(FrameReader::new(Cursor::new(wire), FrameFormat::Block));
        let (k1, u1) = input.next_unit().unwrap().unwrap();
        let (k2, _) = input.next_unit().unwrap().unwrap();
        assert_eq!(k1, 0);
        assert_eq!(k2, u1.len() as u64);
        assert_eq!(codec.decode(&u1).unwrap(), alice);
        assert!(input.next_unit().unwrap().is_none());
    }

    #[test]
    fn text_output_writes_lines() {
        let mut output = TextOutput::new(Vec::<u8>::new());
        output.emit("Alice\t30".to_string()).unwrap();
        output.emit("Bob\t4".to_string()).unwrap();
        output.finish().unwrap();

        assert_eq!(output.into_inner(), b"Alice\t30\nBob\t4\n");
    }
}
