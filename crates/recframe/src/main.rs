mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use recframe_pipeline::{JobConfig, LocalJob, PipelineConfig, FORMAT_KEY, MODE_KEY};

use crate::exit::{pipeline_error, CliResult, FAILURE, SUCCESS};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::{print_report, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "recframe",
    version,
    about = "Convert name/age text records to and from framed records"
)]
struct Cli {
    /// Input file or directory.
    input: PathBuf,

    /// Output directory (must not exist).
    output: PathBuf,

    /// Job option as KEY=VALUE; repeatable (e.g. -D format=Block).
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    define: Vec<String>,

    /// Framing strategy: Block or B64Line. Other values fall back to B64Line.
    #[arg(long, value_name = "FORMAT", env = "RECFRAME_FORMAT")]
    format: Option<String>,

    /// Conversion direction: TextToFramed or FramedToText (default).
    #[arg(long, value_name = "MODE", env = "RECFRAME_MODE")]
    mode: Option<String>,

    /// Maximum number of partitions converted at once.
    #[arg(long, value_name = "N")]
    parallelism: Option<usize>,

    /// Job report format (stdout).
    #[arg(long, value_name = "FORMAT")]
    report: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

impl Cli {
    /// Job options from `-D` definitions, overridden by `--format`/`--mode`.
    fn job_config(&self) -> CliResult<JobConfig> {
        let mut job = JobConfig::from_defines(&self.define)
            .map_err(|err| pipeline_error("invalid option", err))?;
        if let Some(format) = &self.format {
            job.set(FORMAT_KEY, format.as_str());
        }
        if let Some(mode) = &self.mode {
            job.set(MODE_KEY, mode.as_str());
        }
        Ok(job)
    }
}

fn run(cli: &Cli, format: OutputFormat) -> CliResult<i32> {
    let job = cli.job_config()?;
    let config = PipelineConfig::from_job_config(&job)
        .map_err(|err| pipeline_error("invalid configuration", err))?;

    let mut local = LocalJob::new(config, &cli.input, &cli.output);
    if let Some(parallelism) = cli.parallelism {
        local = local.with_parallelism(parallelism);
    }

    let report = local.run().map_err(|err| pipeline_error("job failed", err))?;
    print_report(&report, format);
    Ok(SUCCESS)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => SUCCESS,
                _ => FAILURE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.log_format, cli.log_level);

    let format = cli.report.unwrap_or_else(OutputFormat::default_for_stdout);
    match run(&cli, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
