//! Delimited text line parsing.

use tracing::debug;

use crate::record::Record;

/// Characters that separate tokens in a text line.
pub const DELIMITERS: [char; 3] = ['\t', '\r', '\n'];

/// Why a text line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line holds no tokens at all.
    MissingName,
    /// The line holds a name but no second token.
    MissingAge,
    /// The second token is not a decimal `i32`.
    InvalidAge,
}

/// Result of parsing one text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Record(Record),
    Skip(SkipReason),
}

impl ParseOutcome {
    /// The parsed record, if any.
    pub fn into_record(self) -> Option<Record> {
        match self {
            ParseOutcome::Record(record) => Some(record),
            ParseOutcome::Skip(_) => None,
        }
    }
}

/// Parse `name<TAB>age` from a line.
///
/// Tokens are split on tab, carriage return and newline; runs of
/// delimiters collapse, and tokens past the second are ignored. Malformed
/// lines are skipped, never reported as errors.
pub fn parse_line(line: &str) -> ParseOutcome {
    let mut tokens = line.split(DELIMITERS).filter(|token| !token.is_empty());

    let Some(name) = tokens.next() else {
        return skip(line, SkipReason::MissingName);
    };
    let Some(age) = tokens.next() else {
        return skip(line, SkipReason::MissingAge);
    };
    let Ok(age) = age.parse::<i32>() else {
        return skip(line, SkipReason::InvalidAge);
    };

    // Tokens are non-empty, so construction cannot fail on the name.
    match Record::new(name, age) {
        Ok(record) => ParseOutcome::Record(record),
        Err(_) => skip(line, SkipReason::MissingName),
    }
}

fn skip(line: &str, reason: SkipReason) -> ParseOutcome {
    debug!(?reason, len = line.len(), "skipping malformed text line");
    ParseOutcome::Skip(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, age: i32) -> ParseOutcome {
        ParseOutcome::Record(Record::new(name, age).unwrap())
    }

    #[test]
    fn parses_name_and_age() {
        assert_eq!(parse_line("Alice\t30"), record("Alice", 30));
    }

    #[test]
    fn collapses_delimiter_runs() {
        assert_eq!(parse_line("\t\tAlice\t\r\n\t30\r\n"), record("Alice", 30));
    }

    #[test]
    fn ignores_extra_tokens() {
        assert_eq!(parse_line("Eve\t41\textra\t99"), record("Eve", 41));
    }

    #[test]
    fn keeps_spaces_inside_name() {
        assert_eq!(parse_line("Mary Ann\t52"), record("Mary Ann", 52));
    }

    #[test]
    fn accepts_signed_ages() {
        assert_eq!(parse_line("Neg\t-3"), record("Neg", -3));
        assert_eq!(parse_line("Pos\t+3"), record("Pos", 3));
    }

    #[test]
    fn skips_single_token() {
        assert_eq!(parse_line("Bob"), ParseOutcome::Skip(SkipReason::MissingAge));
    }

    #[test]
    fn skips_empty_and_delimiter_only_lines() {
        assert_eq!(parse_line(""), ParseOutcome::Skip(SkipReason::MissingName));
        assert_eq!(
            parse_line("\t\r\n"),
            ParseOutcome::Skip(SkipReason::MissingName)
        );
    }

    #[test]
    fn skips_non_integer_age() {
        assert_eq!(
            parse_line("Carol\tthirty"),
            ParseOutcome::Skip(SkipReason::InvalidAge)
        );
        assert_eq!(
            parse_line("Carol\t 30"),
            ParseOutcome::Skip(SkipReason::InvalidAge)
        );
    }

    #[test]
    fn skips_age_overflowing_i32() {
        assert_eq!(
            parse_line("Old\t2147483648"),
            ParseOutcome::Skip(SkipReason::InvalidAge)
        );
        assert_eq!(parse_line("Max\t2147483647"), record("Max", i32::MAX));
    }

    #[test]
    fn into_record_drops_skips() {
        assert!(parse_line("Bob").into_record().is_none());
        assert_eq!(
            parse_line("Bob\t5").into_record(),
            Some(Record::new("Bob", 5).unwrap())
        );
    }
}
