//! In-process document store backing the HTTP server and tests.

use crate::api::{ApiError, ApiResult, ContentApi, UploadedAsset};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tessera_blocks::{ContentDocument, PreviewId, PreviewRevision};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct StoreState {
    document: ContentDocument,
    previews: HashMap<PreviewId, PreviewRevision>,
    assets: HashMap<String, StoredAsset>,
}

#[derive(Debug)]
pub struct MemoryContentStore {
    state: RwLock<StoreState>,
    preview_ttl: Duration,
    max_upload_bytes: usize,
}

impl MemoryContentStore {
    pub fn new(document: ContentDocument) -> Self {
        Self {
            state: RwLock::new(StoreState {
                document,
                ..StoreState::default()
            }),
            preview_ttl: Duration::days(1),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_preview_ttl(mut self, ttl: Duration) -> Self {
        self.preview_ttl = ttl;
        self
    }

    pub fn with_max_upload_bytes(mut self, max: usize) -> Self {
        self.max_upload_bytes = max;
        self
    }

    pub async fn asset(&self, name: &str) -> Option<StoredAsset> {
        self.state.read().await.assets.get(name).cloned()
    }

    /// Drop expired previews, returning how many were removed
    pub async fn prune_previews(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.write().await;
        prune_expired(&mut state.previews, now, self.preview_ttl)
    }

    pub async fn preview_count(&self) -> usize {
        self.state.read().await.previews.len()
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new(ContentDocument::new())
    }
}

#[async_trait]
impl ContentApi for MemoryContentStore {
    async fn fetch_public(&self) -> ApiResult<ContentDocument> {
        Ok(self.state.read().await.document.clone())
    }

    async fn fetch_admin(&self) -> ApiResult<ContentDocument> {
        Ok(self.state.read().await.document.clone())
    }

    async fn save(&self, document: &ContentDocument) -> ApiResult<ContentDocument> {
        document.validate().map_err(|e| ApiError::Persistence {
            status: 422,
            message: e.to_string(),
        })?;

        let mut state = self.state.write().await;
        state.document = document.clone();
        info!(pages = document.pages.len(), "content saved");
        Ok(state.document.clone())
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadedAsset> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ApiError::Persistence {
                status: 413,
                message: format!(
                    "Upload of {} bytes exceeds the {} byte limit",
                    bytes.len(),
                    self.max_upload_bytes
                ),
            });
        }

        let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(file_name));
        let asset = StoredAsset {
            name: name.clone(),
            content_type: content_type_for(&name).to_string(),
            bytes,
        };
        debug!(name = %name, size = asset.bytes.len(), "stored upload");
        self.state.write().await.assets.insert(name.clone(), asset);

        Ok(UploadedAsset {
            url: format!("/uploads/{}", name),
        })
    }

    async fn create_preview(&self, revision: &PreviewRevision) -> ApiResult<()> {
        let mut state = self.state.write().await;
        // expired revisions are dropped on every write
        prune_expired(&mut state.previews, Utc::now(), self.preview_ttl);
        if state
            .previews
            .insert(revision.id.clone(), revision.clone())
            .is_some()
        {
            debug!(preview_id = %revision.id, "overwrote preview revision");
        }
        Ok(())
    }

    async fn load_preview(&self, id: &PreviewId) -> ApiResult<PreviewRevision> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        match state.previews.get(id).cloned() {
            Some(revision) if !revision.is_expired(now, self.preview_ttl) => Ok(revision),
            Some(_) => {
                state.previews.remove(id);
                debug!(preview_id = %id, "preview expired");
                Err(ApiError::NotFound(format!("preview {}", id)))
            }
            None => Err(ApiError::NotFound(format!("preview {}", id))),
        }
    }
}

fn prune_expired(
    previews: &mut HashMap<PreviewId, PreviewRevision>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> usize {
    let before = previews.len();
    previews.retain(|_, revision| !revision.is_expired(now, ttl));
    let removed = before - previews.len();
    if removed > 0 {
        debug!(removed, "pruned expired previews");
    }
    removed
}

/// Keep the file name part, replacing anything outside `[A-Za-z0-9._-]`
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
