//! # Content Document
//!
//! Persisted site content: one page tree per page key plus site-wide
//! metadata. The same shape is used for canonical content, editing drafts
//! and preview snapshots.

use crate::error::{ModelError, ModelResult};
use crate::ids::{BlockId, PreviewId};
use crate::instance::BlockInstance;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub pages: BTreeMap<String, BlockInstance>,

    #[serde(default)]
    pub meta: SiteMeta,
}

/// Global metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    /// Active presentation template key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default)]
    pub typography: Typography,

    /// Named colors, e.g. "primary" → "#3366ff"
    #[serde(default)]
    pub palette: BTreeMap<String, String>,

    #[serde(default)]
    pub navigation: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub page: String,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        let doc: ContentDocument = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_page(mut self, key: impl Into<String>, root: BlockInstance) -> Self {
        self.pages.insert(key.into(), root);
        self
    }

    pub fn page(&self, key: &str) -> Option<&BlockInstance> {
        self.pages.get(key)
    }

    pub fn page_mut(&mut self, key: &str) -> Option<&mut BlockInstance> {
        self.pages.get_mut(key)
    }

    /// Locate a block anywhere in the document, returning its page key too
    pub fn find_block(&self, id: &BlockId) -> Option<(&str, &BlockInstance)> {
        self.pages
            .iter()
            .find_map(|(key, root)| root.find(id).map(|block| (key.as_str(), block)))
    }

    /// Every block id in document order (pages sorted by key)
    pub fn block_ids(&self) -> Vec<&BlockId> {
        let mut ids = Vec::new();
        for root in self.pages.values() {
            root.walk(&mut |block| ids.push(&block.id));
        }
        ids
    }

    /// Check the structural invariants: unique block ids across the whole
    /// document and unique slot names within each layout.
    pub fn validate(&self) -> ModelResult<()> {
        let mut seen = HashSet::new();
        let mut result = Ok(());

        for root in self.pages.values() {
            root.walk(&mut |block| {
                if result.is_err() {
                    return;
                }
                if !seen.insert(block.id.clone()) {
                    result = Err(ModelError::DuplicateBlockId(block.id.to_string()));
                    return;
                }
                let mut slots = HashSet::new();
                for column in &block.columns {
                    if !slots.insert(column.slot.as_str()) {
                        result = Err(ModelError::DuplicateSlot {
                            block_id: block.id.to_string(),
                            slot: column.slot.clone(),
                        });
                        return;
                    }
                }
            });
        }

        result
    }
}

/// Write-once snapshot of a draft, addressable by an opaque id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRevision {
    pub id: PreviewId,

    /// Page the preview was requested for
    pub page: String,

    pub snapshot: ContentDocument,

    pub created_at: DateTime<Utc>,
}

impl PreviewRevision {
    pub fn new(id: PreviewId, page: impl Into<String>, snapshot: ContentDocument) -> Self {
        Self {
            id,
            page: page.into(),
            snapshot,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }
}
