//! Error types for the editor

use tessera_workspace::{ApiError, PreviewError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Container not found: {owner}/{slot}")]
    ContainerNotFound { owner: String, slot: String },

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Page root cannot be moved or removed: {0}")]
    PageRoot(String),

    #[error("Would create cycle: {0} cannot move into its own subtree")]
    CycleDetected(String),

    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

pub type MutationResult<T> = Result<T, MutationError>;
