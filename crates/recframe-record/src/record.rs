use std::fmt;

use crate::error::RecordError;

/// A single `(name, age)` record.
///
/// The name is never empty. The age is any `i32`; no domain bounds are
/// enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    name: String,
    age: i32,
}

impl Record {
    /// Create a record, rejecting an empty name.
    pub fn new(name: impl Into<String>, age: i32) -> Result<Self, RecordError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }
        Ok(Self { name, age })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    /// Render as `name<TAB>age`, without a line terminator.
    pub fn to_text_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.name, self.age)
    }
}
