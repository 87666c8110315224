//! Error types for round evaluation.

use crate::CallPath;
use thiserror::Error;

/// Misuse of explicit alignment scopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    /// `exit` was called with no open scope.
    #[error("Cannot exit alignment scope: already at the root call path")]
    ExitAtRoot,
}

/// Errors that abort a round. Nothing from an aborted round is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// The program left or closed scopes it did not open.
    #[error("Round ended with unbalanced alignment scopes at {path}")]
    UnbalancedScopes {
        /// Call path where the imbalance was detected.
        path: CallPath,
    },
}
