use recframe_record::LayoutError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The input ended before a complete length-prefixed frame was available.
    #[error("truncated frame (expected {expected} bytes, {available} available)")]
    TruncatedFrame { expected: usize, available: usize },

    /// A complete frame or line could not be decoded into a record.
    #[error("corrupt frame: {0}")]
    CorruptFrame(String),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True for errors confined to a single unit, after which the stream
    /// stays aligned.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::CorruptFrame(_))
    }
}

impl From<LayoutError> for FrameError {
    fn from(err: LayoutError) -> Self {
        FrameError::CorruptFrame(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
