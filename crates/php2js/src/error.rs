use crate::traits::ReadError;

/// Failure of a single `transpile` call.
#[derive(Debug, thiserror::Error)]
pub enum TranspileError {
    #[error("{file}: {source}")]
    Read {
        file: String,
        #[source]
        source: ReadError,
    },

    #[error("no reader available for PHP (built without the `read-php` feature)")]
    NoReader,
}

impl TranspileError {
    /// Line and column of a parse failure, if known.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            TranspileError::Read { source, .. } => source.location(),
            TranspileError::NoReader => None,
        }
    }
}
