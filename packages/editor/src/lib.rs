//! # Tessera Editor
//!
//! Editing engine for tessera content documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ workspace: ContentApi (canonical content)   │
//! └─────────────────────────────────────────────┘
//!                     ↓ load / save
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Draft + Mutations (applied on an arena)  │
//! │  - Undo/redo history                        │
//! │  - Unsaved flag, save status, save guard    │
//! │  - Preview snapshots                        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: resolve draft → VNode (editing)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Draft vs canonical**: edits change the draft only; saving is explicit
//! 2. **All-or-nothing edits**: a rejected mutation leaves the draft untouched
//! 3. **Single writer**: edits apply in the order they are issued
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_editor::{ContainerRef, EditSession};
//!
//! let mut session = EditSession::load(api, site).await?;
//!
//! let left = ContainerRef::layout("home", "cols", "left");
//! let right = ContainerRef::layout("home", "cols", "right");
//! let id = session.add_block(&left, "h2", None)?;
//! session.move_block(&id, &right, 0)?;
//!
//! let preview = session.create_preview("home").await?;
//! session.save().await?;
//! ```
//!
//! For edits on standalone containers, see [`columns`].

mod arena;
pub mod columns;
mod document;
mod errors;
mod mutations;
mod session;
mod status;
mod undo_stack;

pub use arena::{BlockArena, ContainerRef};
pub use document::Draft;
pub use errors::{EditorError, MutationError, MutationResult};
pub use mutations::Mutation;
pub use session::{EditSession, PendingSave};
pub use status::{SaveStatus, StatusIndicator, DEFAULT_CLEAR_AFTER};
pub use undo_stack::{HistoryEntry, UndoStack};
