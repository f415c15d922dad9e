use std::borrow::Borrow;
use std::io::{BufReader, Read, Write};

use recframe_frame::{FrameCodec, FrameFormat, FrameReader};
use serde::Serialize;
use tracing::trace;

use crate::adapter::{FramedInput, FramedOutput, InputAdapter, OutputAdapter, TextLineInput, TextOutput};
use crate::config::{Direction, PipelineConfig};
use crate::error::Result;
use crate::stage::{RecordToTextStage, Stage, TextToRecordStage};

/// Unit counts for one processed partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub units_read: u64,
    pub records_emitted: u64,
    pub units_skipped: u64,
}

impl PartitionStats {
    /// Add another partition's counts to this one.
    pub fn merge(&mut self, other: &PartitionStats) {
        self.units_read += other.units_read;
        self.records_emitted += other.records_emitted;
        self.units_skipped += other.units_skipped;
    }
}

/// One of the two run shapes.
#[derive(Debug, Clone)]
pub enum Pipeline {
    /// Text reader → [`TextToRecordStage`] → framed writer.
    TextToFramed(TextToRecordStage),
    /// Framed reader → [`RecordToTextStage`] → text writer.
    FramedToText(RecordToTextStage),
}

/// Builds the pipeline for a configuration.
pub struct PipelineSelector;

impl PipelineSelector {
    pub fn select(config: &PipelineConfig) -> Pipeline {
        let codec = FrameCodec::with_config(config.format, config.frame_config());
        match config.direction {
            Direction::TextToFramed => Pipeline::TextToFramed(TextToRecordStage::new(codec)),
            Direction::FramedToText => Pipeline::FramedToText(RecordToTextStage::new(codec)),
        }
    }
}

impl Pipeline {
    pub fn direction(&self) -> Direction {
        match self {
            Pipeline::TextToFramed(_) => Direction::TextToFramed,
            Pipeline::FramedToText(_) => Direction::FramedToText,
        }
    }

    pub fn format(&self) -> FrameFormat {
        self.codec().format()
    }

    fn codec(&self) -> &FrameCodec {
        match self {
            Pipeline::TextToFramed(stage) => stage.codec(),
            Pipeline::FramedToText(stage) => stage.codec(),
        }
    }

    /// Convert one partition from `input` into `output`.
    ///
    /// Stops at the first fatal error; skipped units are only counted.
    pub fn run_partition<R: Read, W: Write>(&self, input: R, output: W) -> Result<PartitionStats> {
        match self {
            Pipeline::TextToFramed(stage) => {
                let max_line_len = stage.codec().config().max_payload_size;
                let mut input = TextLineInput::with_max_line_len(BufReader::new(input), max_line_len);
                let mut output = FramedOutput::new(output, stage.codec().clone());
                drive(stage, &mut input, &mut output)
            }
            Pipeline::FramedToText(stage) => {
                let codec = stage.codec();
                let reader = FrameReader::with_config(input, codec.format(), codec.config().clone());
                let mut input = FramedInput::new(reader);
                let mut output = TextOutput::new(output);
                drive(stage, &mut input, &mut output)
            }
        }
    }
}

fn drive<S, I, O>(stage: &S, input: &mut I, output: &mut O) -> Result<PartitionStats>
where
    S: Stage,
    I: InputAdapter,
    I::Unit: Borrow<S::Input>,
    O: OutputAdapter<Item = S::Output>,
{
    let mut stats = PartitionStats::default();

    while let Some((key, unit)) = input.next_unit()? {
        stats.units_read += 1;
        match stage.map(<I::Unit as Borrow<S::Input>>::borrow(&unit))? {
            Some(item) => {
                output.emit(item)?;
                stats.records_emitted += 1;
            }
            None => {
                trace!(key, "unit produced no output");
                stats.units_skipped += 1;
            }
        }
    }

    output.finish()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use recframe_frame::FrameError;

    use super::*;
    use crate::error::PipelineError;

    fn pipeline(direction: Direction, format: FrameFormat) -> Pipeline {
        PipelineSelector::select(&PipelineConfig {
            direction,
            format,
            ..PipelineConfig::default()
        })
    }

    fn run(pipeline: &Pipeline, input: &[u8]) -> (Vec<u8>, PartitionStats) {
        let mut out = Vec::<u8>::new();
        let stats = pipeline.run_partition(Cursor::new(input), &mut out).unwrap();
        (out, stats)
    }

    #[test]
    fn selects_matching_stage() {
        let p = pipeline(Direction::TextToFramed, FrameFormat::Block);
        assert!(matches!(p, Pipeline::TextToFramed(_)));
        assert_eq!(p.format(), FrameFormat::Block);

        let p = pipeline(Direction::FramedToText, FrameFormat::B64Line);
        assert!(matches!(p, Pipeline::FramedToText(_)));
        assert_eq!(p.direction(), Direction::FramedToText);
    }

    #[test]
    fn alice_b64line_end_to_end() {
        let (framed, stats) = run(&pipeline(Direction::TextToFramed, FrameFormat::B64Line), b"Alice\t30\n");
        assert_eq!(stats.records_emitted, 1);
        assert_eq!(framed.iter().filter(|b| **b == b'\n').count(), 1);

        let (text, _) = run(&pipeline(Direction::FramedToText, FrameFormat::B64Line), &framed);
        assert_eq!(text, b"Alice\t30\n");
    }

    #[test]
    fn malformed_lines_emit_nothing() {
        for format in [FrameFormat::Block, FrameFormat::B64Line] {
            let (framed, stats) = run(
                &pipeline(Direction::TextToFramed, format),
                b"Bob\nCarol\tthirty\n",
            );
            assert!(framed.is_empty());
            assert_eq!(
                stats,
                PartitionStats {
                    units_read: 2,
                    records_emitted: 0,
                    units_skipped: 2
                }
            );
        }
    }

    #[test]
    fn mixed_input_roundtrips_valid_lines_in_order() {
        let input = b"Alice\t30\nBob\nDave\t-1\r\n\nEve\t7\textra\n";
        for format in [FrameFormat::Block, FrameFormat::B64Line] {
            let (framed, stats) = run(&pipeline(Direction::TextToFramed, format), input);
            assert_eq!(stats.units_read, 5);
            assert_eq!(stats.records_emitted, 3);

            let (text, _) = run(&pipeline(Direction::FramedToText, format), &framed);
            assert_eq!(text, b"Alice\t30\nDave\t-1\nEve\t7\n", "{format}");
        }
    }

    #[test]
    fn corrupt_b64_lines_are_skipped() {
        let (framed, _) = run(&pipeline(Direction::TextToFramed, FrameFormat::B64Line), b"Alice\t30\n");
        let mut input = b"@@garbage@@\n".to_vec();
        input.extend_from_slice(&framed);

        let (text, stats) = run(&pipeline(Direction::FramedToText, FrameFormat::B64Line), &input);
        assert_eq!(text, b"Alice\t30\n");
        assert_eq!(stats.units_skipped, 1);
    }

    #[test]
    fn oversized_text_lines_are_skipped_not_fatal() {
        let to_framed = PipelineSelector::select(&PipelineConfig {
            direction: Direction::TextToFramed,
            format: FrameFormat::B64Line,
            max_payload_size: 64,
        });
        // First line fits the line limit but not the payload limit; the
        // second exceeds the line limit outright.
        let mut input = format!("{}\t30\n", "a".repeat(55)).into_bytes();
        input.extend_from_slice(format!("{}\t30\n", "b".repeat(500)).as_bytes());
        input.extend_from_slice(b"Alice\t30\n");

        let (framed, stats) = run(&to_framed, &input);
        assert_eq!(
            stats,
            PartitionStats {
                units_read: 3,
                records_emitted: 1,
                units_skipped: 2
            }
        );

        let (text, _) = run(&pipeline(Direction::FramedToText, FrameFormat::B64Line), &framed);
        assert_eq!(text, b"Alice\t30\n");
    }

    #[test]
    fn truncated_block_stream_fails_partition() {
        let (mut framed, _) = run(
            &pipeline(Direction::TextToFramed, FrameFormat::Block),
            b"Alice\t30\nBob\t4\n",
        );
        framed.truncate(framed.len() - 1);

        let mut out = Vec::<u8>::new();
        let err = pipeline(Direction::FramedToText, FrameFormat::Block)
            .run_partition(Cursor::new(framed), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Frame(FrameError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn empty_partition_is_fine() {
        for direction in [Direction::TextToFramed, Direction::FramedToText] {
            let (out, stats) = run(&pipeline(direction, FrameFormat::Block), b"");
            assert!(out.is_empty());
            assert_eq!(stats, PartitionStats::default());
        }
    }

    #[test]
    fn merge_adds_counts() {
        let mut total = PartitionStats::default();
        total.merge(&PartitionStats {
            units_read: 3,
            records_emitted: 2,
            units_skipped: 1,
        });
        total.merge(&PartitionStats {
            units_read: 1,
            records_emitted: 1,
            units_skipped: 0,
        });
        assert_eq!(
            total,
            PartitionStats {
                units_read: 4,
                records_emitted: 3,
                units_skipped: 1
            }
        );
    }
}
