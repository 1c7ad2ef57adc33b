//! All error types for the stringsgen crate.
//!
//! These are returned from all fallible operations (decoding, parsing, placeholder
//! extraction, context serialization).

use std::path::PathBuf;

use thiserror::Error;

use crate::types::PlaceholderType;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to parse `{}`: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid placeholder at position {position}: `{previous}` conflicts with `{new}`")]
    InvalidPlaceholder {
        position: usize,
        previous: PlaceholderType,
        new: PlaceholderType,
    },

    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new parse error located at a 1-based line and column.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Wraps an error with the path of the file being parsed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Returns the `(line, column)` of the innermost parse error, if any.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Error::Parse { line, column, .. } => Some((*line, *column)),
            Error::File { source, .. } => source.location(),
            _ => None,
        }
    }
}
