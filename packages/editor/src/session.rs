//! # Edit Session
//!
//! One admin user's editing state for a site: the canonical content last
//! loaded or saved, the draft being edited, undo history, and the save
//! status shown to the user.
//!
//! Edits only touch the draft. Nothing reaches the content store until an
//! explicit save, and only one save may be in flight at a time.

use crate::arena::ContainerRef;
use crate::document::Draft;
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::status::{SaveStatus, StatusIndicator, DEFAULT_CLEAR_AFTER};
use crate::undo_stack::UndoStack;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tessera_blocks::{BlockData, BlockId, ContentDocument};
use tessera_evaluator::{to_html, EvalError, HtmlOptions, RenderMode, VNode};
use tessera_workspace::{
    ApiError, Config, ContentApi, PreviewHandle, PreviewService, SiteRenderer, UploadedAsset,
};
use tracing::{error, info, instrument};

/// A save that has started but not finished
#[derive(Debug)]
pub struct PendingSave {
    version: u64,
    document: ContentDocument,
}

impl PendingSave {
    /// Draft version captured when the save started
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn document(&self) -> &ContentDocument {
        &self.document
    }
}

pub struct EditSession {
    api: Arc<dyn ContentApi>,
    site: SiteRenderer,
    previews: PreviewService,

    canonical: ContentDocument,
    draft: Draft,
    history: UndoStack,

    unsaved: bool,
    saving: bool,
    status: StatusIndicator,
}

impl EditSession {
    /// Start editing `canonical` without fetching it
    pub fn new(api: Arc<dyn ContentApi>, site: SiteRenderer, canonical: ContentDocument) -> Self {
        Self {
            previews: PreviewService::new(api.clone(), site.clone()),
            api,
            site,
            draft: Draft::new(canonical.clone()),
            canonical,
            history: UndoStack::new(),
            unsaved: false,
            saving: false,
            status: StatusIndicator::new(DEFAULT_CLEAR_AFTER),
        }
    }

    /// Fetch the editable document from the store and start a session on it
    pub async fn load(api: Arc<dyn ContentApi>, site: SiteRenderer) -> Result<Self, EditorError> {
        let canonical = api.fetch_admin().await?;
        info!(pages = canonical.pages.len(), "editing session loaded");
        Ok(Self::new(api, site, canonical))
    }

    /// Apply site settings that affect editing (`statusClearMs`)
    pub fn with_config(self, config: &Config) -> Self {
        self.with_status_clear_after(config.status_clear_after())
    }

    pub fn with_status_clear_after(mut self, clear_after: Duration) -> Self {
        self.status = StatusIndicator::new(clear_after);
        self
    }

    pub fn with_history_levels(mut self, max_levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(max_levels);
        self
    }

    pub fn draft(&self) -> &ContentDocument {
        self.draft.document()
    }

    pub fn canonical(&self) -> &ContentDocument {
        &self.canonical
    }

    pub fn version(&self) -> u64 {
        self.draft.version()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether the save trigger should be enabled
    pub fn can_save(&self) -> bool {
        self.unsaved && !self.saving
    }

    pub fn save_status(&self) -> SaveStatus {
        self.status.at(Instant::now())
    }

    pub fn save_status_at(&self, now: Instant) -> SaveStatus {
        self.status.at(now)
    }

    // ---- editing ----

    /// Apply one edit to the draft. Returns the new draft version.
    pub fn apply(&mut self, mutation: Mutation) -> Result<u64, EditorError> {
        self.apply_all(std::slice::from_ref(&mutation))
    }

    /// Apply several edits as one transaction and one undo step.
    ///
    /// Edits that change nothing (removing an absent block, moving a block
    /// to where it already is) leave history and the unsaved flag alone.
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> Result<u64, EditorError> {
        let before = self.draft.document().clone();
        let before_version = self.draft.version();
        let version = self.draft.apply_all(mutations)?;
        if version != before_version {
            self.history.record(before);
            self.unsaved = true;
        }
        Ok(version)
    }

    /// Add a new block of `block_type`; returns its id
    pub fn add_block(
        &mut self,
        container: &ContainerRef,
        block_type: &str,
        index: Option<usize>,
    ) -> Result<BlockId, EditorError> {
        let before = self.draft.document().clone();
        let id = self
            .draft
            .add_block(self.site.registry(), container, block_type, index)?;
        self.history.record(before);
        self.unsaved = true;
        Ok(id)
    }

    pub fn remove_block(&mut self, id: &BlockId) -> Result<u64, EditorError> {
        self.apply(Mutation::RemoveBlock { id: id.clone() })
    }

    pub fn update_block_data(&mut self, id: &BlockId, patch: BlockData) -> Result<u64, EditorError> {
        self.apply(Mutation::UpdateBlockData {
            id: id.clone(),
            patch,
        })
    }

    pub fn toggle_visibility(&mut self, id: &BlockId) -> Result<u64, EditorError> {
        self.apply(Mutation::ToggleVisibility { id: id.clone() })
    }

    /// Drop handler: move `id` to `index` of `to`
    pub fn move_block(&mut self, id: &BlockId, to: &ContainerRef, index: usize) -> Result<u64, EditorError> {
        self.apply(Mutation::MoveBlock {
            id: id.clone(),
            to: to.clone(),
            index,
        })
    }

    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Result<u64, EditorError> {
        let snapshot = self
            .history
            .undo(self.draft.document().clone())
            .ok_or(EditorError::NothingToUndo)?;
        self.unsaved = true;
        Ok(self.draft.replace(snapshot))
    }

    pub fn redo(&mut self) -> Result<u64, EditorError> {
        let snapshot = self
            .history
            .redo(self.draft.document().clone())
            .ok_or(EditorError::NothingToRedo)?;
        self.unsaved = true;
        Ok(self.draft.replace(snapshot))
    }

    /// Throw the draft away and go back to canonical content
    pub fn discard_changes(&mut self) {
        self.draft.replace(self.canonical.clone());
        self.history.clear();
        self.unsaved = false;
    }

    // ---- persistence ----

    /// Mark a save as started and capture what it will write.
    ///
    /// Fails with `SaveInProgress` while another save is pending.
    pub fn begin_save(&mut self) -> Result<PendingSave, EditorError> {
        if self.saving {
            return Err(EditorError::SaveInProgress);
        }
        self.saving = true;
        self.status.set(SaveStatus::Saving, Instant::now());

        Ok(PendingSave {
            version: self.draft.version(),
            document: self.draft.document().clone(),
        })
    }

    /// Record the outcome of a save started with [`Self::begin_save`].
    ///
    /// On success the stored copy becomes canonical. The unsaved flag clears
    /// only if the draft did not change while the save was in flight.
    /// On failure the draft is kept as is.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        result: Result<ContentDocument, ApiError>,
    ) -> Result<(), EditorError> {
        self.saving = false;
        let now = Instant::now();

        match result {
            Ok(stored) => {
                self.canonical = stored;
                if self.draft.version() == pending.version {
                    self.unsaved = false;
                }
                self.status.set(SaveStatus::Success, now);
                info!(version = pending.version, "content saved");
                Ok(())
            }
            Err(err) => {
                error!("save failed: {}", err);
                self.status.set(SaveStatus::Error(err.to_string()), now);
                Err(err.into())
            }
        }
    }

    /// Persist the draft as the new canonical content
    #[instrument(skip(self))]
    pub async fn save(&mut self) -> Result<(), EditorError> {
        let pending = self.begin_save()?;
        let result = self.api.save(pending.document()).await;
        self.finish_save(pending, result)
    }

    /// Fetch canonical content again, dropping the draft
    pub async fn reload(&mut self) -> Result<(), EditorError> {
        if self.saving {
            return Err(EditorError::SaveInProgress);
        }
        self.canonical = self.api.fetch_admin().await?;
        self.discard_changes();
        Ok(())
    }

    /// Upload an asset. The draft is not changed; callers put the returned
    /// url into block data themselves.
    pub async fn upload(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedAsset, EditorError> {
        match self.api.upload(file_name, bytes).await {
            Ok(asset) => Ok(asset),
            Err(err) => {
                error!(file_name, "upload failed: {}", err);
                self.status.set(SaveStatus::Error(err.to_string()), Instant::now());
                Err(err.into())
            }
        }
    }

    /// Snapshot the current draft for `page`
    pub async fn create_preview(&mut self, page: &str) -> Result<PreviewHandle, EditorError> {
        match self.previews.create_preview(self.draft.document(), page).await {
            Ok(handle) => Ok(handle),
            Err(err) => {
                error!(page, "preview failed: {}", err);
                self.status.set(SaveStatus::Error(err.to_string()), Instant::now());
                Err(err.into())
            }
        }
    }

    // ---- canvas ----

    /// Resolve `page` of the draft for the editing canvas (hidden blocks kept
    /// and marked)
    pub fn render(&self, page: &str) -> Result<VNode, EvalError> {
        self.site
            .render_page(self.draft.document(), page, RenderMode::Editing)
    }

    pub fn render_html(&self, page: &str) -> Result<String, EvalError> {
        Ok(to_html(&self.render(page)?, &HtmlOptions::default()))
    }
}
