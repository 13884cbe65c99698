//! Error types for algoscope-graph.

use thiserror::Error;

use crate::model::NodeId;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or validating graphs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The algorithm key has no requirements entry.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The generator name does not match any topology.
    #[error("Unknown graph generator: {0}")]
    UnknownGenerator(String),

    /// The algorithm cannot run against graphs from this generator.
    #[error("{reason}")]
    Incompatible {
        algorithm: String,
        generator: String,
        reason: String,
    },

    /// An edge referenced a node that is not part of the graph.
    #[error("edge references missing node {node:?}")]
    MissingNode { node: NodeId },

    /// A node id was added twice.
    #[error("duplicate node {0:?}")]
    DuplicateNode(NodeId),
}
