//! # Undo/Redo Stack
//!
//! History of draft snapshots.
//!
//! - Before an edit lands, the session records the document it replaces
//! - Undo hands back the most recent snapshot and remembers the current
//!   document for redo
//! - A new edit clears the redo stack
//! - Edits made between `begin_batch` and `end_batch` undo as one step

use tessera_blocks::ContentDocument;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Document as it was before the step
    pub snapshot: ContentDocument,

    pub description: Option<String>,
}

#[derive(Debug)]
struct OpenBatch {
    entry: Option<HistoryEntry>,
    description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<OpenBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the document an edit is about to replace
    pub fn record(&mut self, before: ContentDocument) {
        match &mut self.current_batch {
            // only the state before the first edit in a batch matters
            Some(batch) => {
                if batch.entry.is_none() {
                    batch.entry = Some(HistoryEntry {
                        snapshot: before,
                        description: None,
                    });
                }
            }
            None => self.push_entry(HistoryEntry {
                snapshot: before,
                description: None,
            }),
        }
    }

    pub fn begin_batch(&mut self) {
        self.current_batch = Some(OpenBatch {
            entry: None,
            description: None,
        });
    }

    /// Close the current batch. An empty batch leaves no history.
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(mut entry) = batch.entry {
                entry.description = batch.description;
                self.push_entry(entry);
            }
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Step back. `current` is the document being replaced; the returned
    /// snapshot is what the draft should become.
    pub fn undo(&mut self, current: ContentDocument) -> Option<ContentDocument> {
        self.end_batch();
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn redo(&mut self, current: ContentDocument) -> Option<ContentDocument> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
