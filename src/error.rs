use std::time::Duration;

use thiserror::Error;

use crate::model::NodeId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the closure engine and its collaborators.
///
/// Every mutation failure leaves the store in its prior consistent state;
/// only [`EngineError::Contention`] is transient and safe to retry.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced node or edge does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A node or edge already exists where the operation requires absence.
    #[error("{0} already exists")]
    AlreadyExists(&'static str),
    /// Inserting the edge would make a node its own ancestor.
    #[error("edge {descendant} -> {ancestor} would create a cycle")]
    CycleDetected {
        /// Child end of the rejected edge.
        descendant: NodeId,
        /// Parent end of the rejected edge.
        ancestor: NodeId,
    },
    /// The operation conflicts with the current state of a shared resource.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The engine could not acquire its write lock within the bounded wait.
    #[error("lock wait exceeded ({0:?})")]
    Contention(Duration),
    /// The closure table disagrees with the graph it is derived from.
    ///
    /// Fatal to the operation that detected it, not to the engine; requires
    /// operator intervention, typically a full [`rebuild`].
    ///
    /// [`rebuild`]: crate::ClosureEngine::rebuild
    #[error("closure corruption detected: {0}")]
    Corrupt(String),
}

impl EngineError {
    /// Whether the error is transient and the operation may be retried as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Contention(_))
    }
}
