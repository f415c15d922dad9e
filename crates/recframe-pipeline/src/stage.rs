use bytes::Bytes;
use recframe_frame::{FrameCodec, FrameError};
use recframe_record::{parse_line, ParseOutcome};
use tracing::warn;

/// A per-unit record transformer.
///
/// `map` sees exactly one input unit and returns at most one output item.
/// Implementations hold no state between calls.
pub trait Stage {
    type Input: ?Sized;
    type Output;

    fn map(&self, input: &Self::Input) -> Result<Option<Self::Output>, FrameError>;
}

/// Parses text lines and frames the resulting records.
#[derive(Debug, Clone)]
pub struct TextToRecordStage {
    codec: FrameCodec,
}

impl TextToRecordStage {
    pub fn new(codec: FrameCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }
}

impl Stage for TextToRecordStage {
    type Input = str;
    type Output = Bytes;

    /// Malformed lines and records over the payload limit yield `Ok(None)`.
    fn map(&self, line: &str) -> Result<Option<Bytes>, FrameError> {
        let record = match parse_line(line) {
            ParseOutcome::Record(record) => record,
            ParseOutcome::Skip(_) => return Ok(None),
        };
        match self.codec.encode(&record) {
            Ok(unit) => Ok(Some(unit)),
            Err(err @ FrameError::PayloadTooLarge { .. }) => {
                warn!(error = %err, name_len = record.name().len(), "skipping oversized record");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Decodes framed records and renders them as `name<TAB>age`.
#[derive(Debug, Clone)]
pub struct RecordToTextStage {
    codec: FrameCodec,
}

impl RecordToTextStage {
    pub fn new(codec: FrameCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }
}

impl Stage for RecordToTextStage {
    type Input = [u8];
    type Output = String;

    /// Corrupt units are skipped; errors that lose stream alignment are
    /// returned.
    fn map(&self, unit: &[u8]) -> Result<Option<String>, FrameError> {
        match self.codec.decode(unit) {
            Ok(record) => Ok(Some(record.to_text_line())),
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, len = unit.len(), "skipping corrupt frame");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
