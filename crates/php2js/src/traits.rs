//! Reader trait and its error type.

use crate::ast::Program;

/// Error that can occur when reading source code into the AST.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to load grammar: {0}")]
    Language(String),

    #[error("parse error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("expected {expected}, got {got}")]
    UnexpectedNode { expected: String, got: String },
}

impl ReadError {
    /// One-based source position, when the error carries one.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ReadError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// A reader parses source code into the typed AST.
pub trait Reader: Send + Sync {
    /// Language identifier (e.g., "php").
    fn language(&self) -> &'static str;

    /// File extensions this reader handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse source code into the AST.
    fn read(&self, source: &str) -> Result<Program, ReadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_location() {
        let err = ReadError::Syntax {
            line: 3,
            column: 7,
            message: "unexpected `}`".into(),
        };
        assert_eq!(err.location(), Some((3, 7)));
        assert_eq!(
            err.to_string(),
            "parse error at line 3, column 7: unexpected `}`"
        );
        assert_eq!(ReadError::Parse("x".into()).location(), None);
    }
}
