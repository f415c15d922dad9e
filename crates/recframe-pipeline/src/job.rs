//! Local stand-in for the batch framework: one partition per input file.

use std::fs::{self, File};
use std::io::BufWriter;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Direction, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::selector::{PartitionStats, Pipeline, PipelineSelector};

/// Empty file written to the output directory once every partition succeeded.
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Outcome of one partition.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: PartitionStats,
}

/// Outcome of a whole job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub direction: Direction,
    pub format: &'static str,
    pub partitions: Vec<PartitionReport>,
    pub totals: PartitionStats,
}

/// Runs a pipeline over every file of an input path.
#[derive(Debug, Clone)]
pub struct LocalJob {
    config: PipelineConfig,
    input: PathBuf,
    output: PathBuf,
    parallelism: usize,
}

impl LocalJob {
    pub fn new(config: PipelineConfig, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let parallelism = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            config,
            input: input.into(),
            output: output.into(),
            parallelism,
        }
    }

    /// Maximum number of partitions processed at once (at least 1).
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every partition and write the success marker.
    ///
    /// Any partition failure fails the job; partial output is left in place
    /// without a marker.
    pub fn run(&self) -> Result<JobReport> {
        let inputs = list_inputs(&self.input)?;
        if self.output.exists() {
            return Err(PipelineError::OutputExists(self.output.clone()));
        }
        fs::create_dir_all(&self.output).map_err(|err| PipelineError::path(&self.output, err))?;

        let pipeline = PipelineSelector::select(&self.config);
        info!(
            direction = %pipeline.direction(),
            format = %pipeline.format(),
            partitions = inputs.len(),
            parallelism = self.parallelism,
            "starting job"
        );

        let mut partitions = Vec::with_capacity(inputs.len());
        for (wave, chunk) in inputs.chunks(self.parallelism).enumerate() {
            let first = wave * self.parallelism;
            let results = thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .enumerate()
                    .map(|(i, input)| {
                        let output = self.output.join(partition_name(first + i));
                        let pipeline = &pipeline;
                        scope.spawn(move || run_partition(pipeline, input, output))
                    })
                    .collect();
                handles
                    .into_iter()
                    .zip(chunk)
                    .map(|(handle, input)| {
                        handle
                            .join()
                            .unwrap_or_else(|_| Err(PipelineError::WorkerPanicked(input.clone())))
                    })
                    .collect::<Vec<_>>()
            });
            for result in results {
                partitions.push(result?);
            }
        }

        let path = self.output.join(SUCCESS_MARKER);
        File::create(&path).map_err(|err| PipelineError::path(&path, err))?;

        let mut totals = PartitionStats::default();
        for partition in &partitions {
            totals.merge(&partition.stats);
        }
        info!(
            units_read = totals.units_read,
            records_emitted = totals.records_emitted,
            units_skipped = totals.units_skipped,
            "job complete"
        );

        Ok(JobReport {
            direction: pipeline.direction(),
            format: pipeline.format().as_str(),
            partitions,
            totals,
        })
    }
}

/// Output file name of partition `index`.
pub fn partition_name(index: usize) -> String {
    format!("part-m-{index:05}")
}

fn run_partition(pipeline: &Pipeline, input: &Path, output: PathBuf) -> Result<PartitionReport> {
    let wrap = |source: PipelineError| PipelineError::Partition {
        path: input.to_path_buf(),
        source: Box::new(source),
    };

    let reader = File::open(input).map_err(|err| wrap(PipelineError::path(input, err)))?;
    let writer = File::create(&output).map_err(|err| wrap(PipelineError::path(&output, err)))?;
    let stats = pipeline
        .run_partition(reader, BufWriter::new(writer))
        .map_err(wrap)?;

    debug!(
        input = ?input,
        units_read = stats.units_read,
        records_emitted = stats.records_emitted,
        units_skipped = stats.units_skipped,
        "partition complete"
    );
    Ok(PartitionReport {
        input: input.to_path_buf(),
        output,
        stats,
    })
}

/// Input files under `path`, sorted by name.
///
/// A file path is a single partition. In a directory, subdirectories and
/// names starting with `_` or `.` are skipped.
fn list_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(PipelineError::InputMissing(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(path).map_err(|err| PipelineError::path(path, err))? {
        let entry = entry.map_err(|err| PipelineError::path(path, err))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('_') || name.starts_with('.') {
            continue;
        }
        let entry_path = entry.path();
        if entry_path.is_file() {
            inputs.push(entry_path);
        }
    }
    inputs.sort();
    Ok(inputs)
}
