use std::fmt;

use tracing::warn;

/// Framing strategy selected from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameFormat {
    /// Length-prefixed binary frames.
    Block,
    /// One base64 line per record.
    #[default]
    B64Line,
}

impl FrameFormat {
    /// Configuration spelling of this format.
    pub fn as_str(self) -> &'static str {
        match self {
            FrameFormat::Block => "Block",
            FrameFormat::B64Line => "B64Line",
        }
    }

    /// Resolve a `format` option value.
    ///
    /// Only the exact string `"Block"` selects [`FrameFormat::Block`]; any
    /// other value, or no value, selects [`FrameFormat::B64Line`].
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("Block") => FrameFormat::Block,
            Some("B64Line") | None => FrameFormat::B64Line,
            Some(other) => {
                warn!(value = other, "unrecognized frame format, using B64Line");
                FrameFormat::B64Line
            }
        }
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
