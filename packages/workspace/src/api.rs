//! Content API boundary: the document store the admin tool persists through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tessera_blocks::{ContentDocument, PreviewId, PreviewRevision};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Save, upload or preview creation rejected by the store
    #[error("Persistence failed ({status}): {message}")]
    Persistence { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// `PUT /admin/content` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveContentRequest {
    pub content: ContentDocument,
}

/// `POST /admin/preview/create` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreviewRequest {
    pub preview_id: PreviewId,
    pub content: ContentDocument,
    pub page: String,
}

impl From<&PreviewRevision> for CreatePreviewRequest {
    fn from(revision: &PreviewRevision) -> Self {
        Self {
            preview_id: revision.id.clone(),
            content: revision.snapshot.clone(),
            page: revision.page.clone(),
        }
    }
}

/// `POST /admin/upload` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub url: String,
}

/// Structured failure body returned by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Document store behind the admin tool
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Canonical document for public rendering
    async fn fetch_public(&self) -> ApiResult<ContentDocument>;

    /// Canonical document for editing
    async fn fetch_admin(&self) -> ApiResult<ContentDocument>;

    /// Persist the full document; returns the stored copy
    async fn save(&self, document: &ContentDocument) -> ApiResult<ContentDocument>;

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadedAsset>;

    /// Store a preview revision, overwriting any with the same id
    async fn create_preview(&self, revision: &PreviewRevision) -> ApiResult<()>;

    /// Missing and expired revisions are both `NotFound`
    async fn load_preview(&self, id: &PreviewId) -> ApiResult<PreviewRevision>;
}
