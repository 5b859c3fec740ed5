//! Error types for tree operations.

use thiserror::Error;

/// Result type alias using `TreeError`.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Outcomes of a single call that leave the tree unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("key already exists in the tree; use update to change its value")]
    DuplicateKey,

    #[error("key does not exist in the tree")]
    NotFound,
}
