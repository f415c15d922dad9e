use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use recframe_frame::{FrameConfig, FrameFormat, DEFAULT_MAX_PAYLOAD};
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Option naming the framing strategy (`Block` or `B64Line`).
pub const FORMAT_KEY: &str = "format";
/// Option naming the conversion direction.
pub const MODE_KEY: &str = "mode";

/// Legacy spellings of [`FORMAT_KEY`] and [`MODE_KEY`].
const LEGACY_FORMAT_KEY: &str = "thrift.test.format";
const LEGACY_MODE_KEY: &str = "thrift.test";

/// String-keyed job options, as handed over by the batch framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobConfig {
    entries: BTreeMap<String, String>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Parse a `key=value` definition and set it.
    ///
    /// The value may itself contain `=`; the key may not be empty.
    pub fn parse_define(&mut self, definition: &str) -> Result<&mut Self> {
        match definition.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(self.set(key.trim(), value)),
            _ => Err(PipelineError::InvalidDefinition(definition.to_string())),
        }
    }

    /// Build from a sequence of `key=value` definitions.
    pub fn from_defines<I, S>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::new();
        for definition in definitions {
            config.parse_define(definition.as_ref())?;
        }
        Ok(config)
    }

    fn lookup(&self, key: &str, legacy: &str) -> Option<&str> {
        self.get(key).or_else(|| self.get(legacy))
    }
}

/// Conversion direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Direction {
    /// Text lines in, framed records out.
    TextToFramed,
    /// Framed records in, text lines out.
    #[default]
    FramedToText,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TextToFramed => "TextToFramed",
            Direction::FramedToText => "FramedToText",
        }
    }
}

impl FromStr for Direction {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TextToFramed" | "text-to-framed" | "lzoOut" => Ok(Direction::TextToFramed),
            "FramedToText" | "framed-to-text" | "lzoIn" => Ok(Direction::FramedToText),
            other => Err(PipelineError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved pipeline settings, fixed for the lifetime of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub direction: Direction,
    pub format: FrameFormat,
    /// Maximum record layout size accepted or produced. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            format: FrameFormat::default(),
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl PipelineConfig {
    /// Read `mode` and `format` once from job options.
    ///
    /// An unset mode means [`Direction::FramedToText`]; an unknown mode is
    /// an error. The format never fails: anything but `Block` is `B64Line`.
    pub fn from_job_config(job: &JobConfig) -> Result<Self> {
        let direction = match job.lookup(MODE_KEY, LEGACY_MODE_KEY) {
            Some(mode) => mode.parse()?,
            None => Direction::default(),
        };
        let format = FrameFormat::from_config(job.lookup(FORMAT_KEY, LEGACY_FORMAT_KEY));

        Ok(Self {
            direction,
            format,
            ..Self::default()
        })
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload_size,
        }
    }
}
