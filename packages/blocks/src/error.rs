use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(String),

    #[error("Duplicate column slot '{slot}' in block {block_id}")]
    DuplicateSlot { block_id: String, slot: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
