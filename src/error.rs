// Error types shared by the pure grouping logic, the storage adapters
// and the organizer.

use thiserror::Error;

/// Rejections produced by organizer operations.
///
/// None of these are fatal: the caller keeps the previous state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrganizerError {
    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("component {component} is not in container {container}")]
    ComponentNotInContainer { component: String, container: String },

    #[error("group index {index} out of bounds (len {len})")]
    GroupIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
