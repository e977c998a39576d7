//! # Preview Snapshot Service
//!
//! ```text
//! draft ──clone──► PreviewRevision{id, page, snapshot} ──► ContentApi
//!                                                            │
//! GET /{page}?preview={id} ◄── SiteRenderer ◄── load_preview ┘
//! ```
//!
//! A preview is an independent copy taken at creation time; later draft
//! edits never reach it. Every call to [`PreviewService::create_preview`]
//! mints a new id. Reads go through the same [`SiteRenderer`] as published
//! pages, and a missing or expired revision is `NotFound` before anything is
//! rendered.

use crate::api::{ApiError, ContentApi};
use crate::site::{SiteRenderer, HOME_PAGE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tessera_blocks::{ContentDocument, PreviewId, PreviewRevision};
use tessera_evaluator::{EvalError, RenderMode, VNode};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error("Preview not found: {0}")]
    NotFound(PreviewId),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error(transparent)]
    Api(ApiError),
}

impl From<EvalError> for PreviewError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::PageNotFound(page) => PreviewError::PageNotFound(page),
        }
    }
}

/// What the caller needs to open a freshly created preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHandle {
    pub preview_id: PreviewId,
    pub page: String,
    pub url: String,
}

impl PreviewHandle {
    pub fn new(preview_id: PreviewId, page: impl Into<String>) -> Self {
        let page = page.into();
        Self {
            url: preview_url(&page, &preview_id),
            preview_id,
            page,
        }
    }
}

/// `/{page}?preview={id}`, with the home page at `/`
pub fn preview_url(page: &str, id: &PreviewId) -> String {
    format!("{}?preview={}", page_path(page), id)
}

pub fn page_path(page: &str) -> String {
    if page == HOME_PAGE {
        "/".to_string()
    } else {
        format!("/{}", page.trim_start_matches('/'))
    }
}

#[derive(Clone)]
pub struct PreviewService {
    api: Arc<dyn ContentApi>,
    site: SiteRenderer,
}

impl PreviewService {
    pub fn new(api: Arc<dyn ContentApi>, site: SiteRenderer) -> Self {
        Self { api, site }
    }

    /// Snapshot `draft` and store it under a fresh id
    #[instrument(skip(self, draft))]
    pub async fn create_preview(
        &self,
        draft: &ContentDocument,
        page: &str,
    ) -> Result<PreviewHandle, PreviewError> {
        if draft.page(page).is_none() {
            return Err(PreviewError::PageNotFound(page.to_string()));
        }

        let revision = PreviewRevision::new(PreviewId::generate(), page, draft.clone());
        self.api
            .create_preview(&revision)
            .await
            .map_err(PreviewError::Api)?;

        info!(preview_id = %revision.id, "preview created");
        Ok(PreviewHandle::new(revision.id, page))
    }

    pub async fn load(&self, id: &PreviewId) -> Result<PreviewRevision, PreviewError> {
        self.api.load_preview(id).await.map_err(|e| match e {
            ApiError::NotFound(_) => PreviewError::NotFound(id.clone()),
            other => PreviewError::Api(other),
        })
    }

    /// Resolve `page` (default: the page the preview was made for) from the
    /// stored snapshot, exactly as a published page would be.
    pub async fn render(&self, id: &PreviewId, page: Option<&str>) -> Result<VNode, PreviewError> {
        let revision = self.load(id).await?;
        let page = page.unwrap_or(revision.page.as_str());

        self.site
            .render_page(&revision.snapshot, page, RenderMode::Public)
            .map_err(PreviewError::from)
    }

    pub async fn render_html(&self, id: &PreviewId, page: Option<&str>) -> Result<String, PreviewError> {
        let revision = self.load(id).await?;
        let page = page.unwrap_or(revision.page.as_str());

        self.site
            .render_page_html(&revision.snapshot, page)
            .map_err(PreviewError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_urls() {
        let id = PreviewId::new("abc");
        assert_eq!(preview_url("blog", &id), "/blog?preview=abc");
        assert_eq!(preview_url(HOME_PAGE, &id), "/?preview=abc");

        let handle = PreviewHandle::new(id, "about");
        assert_eq!(handle.url, "/about?preview=abc");
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["previewId"], "abc");
    }
}
