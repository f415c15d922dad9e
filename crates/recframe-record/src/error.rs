/// Errors raised when constructing a [`crate::Record`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The name field was empty.
    #[error("record name must not be empty")]
    EmptyName,
}

/// Errors raised while decoding the binary record layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The input ended before the layout was complete.
    #[error("unexpected end of record data (needed {needed} more bytes)")]
    UnexpectedEof { needed: usize },

    /// A field carried a type tag the layout cannot skip.
    #[error("unsupported field type {type_id} for field {field_id}")]
    UnsupportedType { field_id: i16, type_id: u8 },

    /// A known field carried the wrong type tag.
    #[error("field {field_id} has type {found}, expected {expected}")]
    TypeMismatch {
        field_id: i16,
        expected: u8,
        found: u8,
    },

    /// A required field never appeared before STOP.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A string length prefix was negative.
    #[error("negative string length {0}")]
    NegativeLength(i32),

    /// The name field was not valid UTF-8.
    #[error("name is not valid UTF-8")]
    InvalidUtf8,

    /// Bytes remained after the STOP marker.
    #[error("{0} trailing bytes after end of record")]
    TrailingBytes(usize),

    /// The decoded fields do not form a valid record.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] RecordError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
