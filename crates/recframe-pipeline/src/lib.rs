//! Conversion pipelines between delimited text and framed records.
//!
//! A run is fixed to one of two shapes, chosen once from configuration by
//! [`PipelineSelector`]:
//! - text lines → [`TextToRecordStage`] → framed output
//! - framed input → [`RecordToTextStage`] → text lines
//!
//! Each stage maps one input unit to at most one output item and keeps no
//! state between units, so partitions can be processed in parallel.

pub mod adapter;
pub mod config;
pub mod error;
pub mod job;
pub mod selector;
pub mod stage;

pub use adapter::{FramedInput, FramedOutput, InputAdapter, OutputAdapter, TextLineInput, TextOutput};
pub use config::{Direction, JobConfig, PipelineConfig, FORMAT_KEY, MODE_KEY};
pub use error::{PipelineError, Result};
pub use job::{JobReport, LocalJob, PartitionReport, SUCCESS_MARKER};
pub use selector::{PartitionStats, Pipeline, PipelineSelector};
pub use stage::{RecordToTextStage, Stage, TextToRecordStage};
