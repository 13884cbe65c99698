//! Error types for algoscope-vis.

use thiserror::Error;

/// Result type for session and server operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Graph construction failed or the pairing was rejected.
    #[error(transparent)]
    Graph(#[from] algoscope_graph::Error),

    /// An externally supplied step stream was malformed.
    #[error("invalid step stream: {0}")]
    Stream(#[from] algoscope_steps::StreamError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller asked for something that cannot run, as opposed
    /// to an internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Graph(_) | Error::Stream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoscope_graph::{ensure_compatible, GeneratorType};

    #[test]
    fn incompatible_reason_is_shown_verbatim() {
        let err: Error = ensure_compatible("topological-sort", GeneratorType::Tree).unwrap_err().into();
        assert_eq!(err.to_string(), "tree graphs are incompatible with topological-sort");
        assert!(err.is_rejection());
    }

    #[test]
    fn io_is_not_a_rejection() {
        let err: Error = std::io::Error::other("boom").into();
        assert!(!err.is_rejection());
    }
}
