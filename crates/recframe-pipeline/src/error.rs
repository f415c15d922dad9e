use std::path::PathBuf;

/// Errors that can occur while configuring or running a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Frame-level error that could not be recovered by skipping.
    #[error("frame error: {0}")]
    Frame(#[from] recframe_frame::FrameError),

    /// The `mode` option named no known direction.
    #[error("unrecognized mode {0:?} (expected TextToFramed or FramedToText)")]
    InvalidMode(String),

    /// A `-D` style definition was not `key=value`.
    #[error("invalid definition {0:?} (expected key=value)")]
    InvalidDefinition(String),

    /// The input path does not exist.
    #[error("input path {0} does not exist")]
    InputMissing(PathBuf),

    /// The output directory already exists.
    #[error("output directory {0} already exists")]
    OutputExists(PathBuf),

    /// An I/O error on a named path.
    #[error("{path}: {source}")]
    Path {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error on a stream.
    #[error("pipeline I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A partition failed; the whole job fails with it.
    #[error("partition {path} failed: {source}")]
    Partition {
        path: PathBuf,
        source: Box<PipelineError>,
    },

    /// A partition worker panicked.
    #[error("partition worker for {0} panicked")]
    WorkerPanicked(PathBuf),
}

impl PipelineError {
    pub(crate) fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Path {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
