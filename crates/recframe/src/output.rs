use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use recframe_pipeline::{JobReport, PartitionStats};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_report(report: &JobReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INPUT", "OUTPUT", "READ", "EMITTED", "SKIPPED"]);
            for partition in &report.partitions {
                table.add_row(stats_row(
                    partition.input.display().to_string(),
                    partition.output.display().to_string(),
                    &partition.stats,
                ));
            }
            table.add_row(stats_row(
                "TOTAL".to_string(),
                format!("{} / {}", report.direction, report.format),
                &report.totals,
            ));
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "direction={} format={} partitions={} read={} emitted={} skipped={}",
                report.direction,
                report.format,
                report.partitions.len(),
                report.totals.units_read,
                report.totals.records_emitted,
                report.totals.units_skipped
            );
        }
    }
}

fn stats_row(input: String, output: String, stats: &PartitionStats) -> Vec<String> {
    vec![
        input,
        output,
        stats.units_read.to_string(),
        stats.records_emitted.to_string(),
        stats.units_skipped.to_string(),
    ]
}
