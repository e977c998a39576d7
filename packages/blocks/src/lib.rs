//! # Tessera Blocks
//!
//! Data model shared by every tessera crate.
//!
//! ```text
//! ContentDocument
//!  ├─ meta (template, typography, palette, navigation)
//!  └─ pages: page key → BlockInstance (page root)
//!                         └─ columns: ColumnContainer ("left", "right", ...)
//!                                        └─ blocks: BlockInstance ...
//! ```
//!
//! Block ids are unique per document and never change once assigned. Layout
//! blocks own their column containers directly, so a document is an owned
//! tree and cannot contain cycles.

pub mod document;
pub mod error;
pub mod ids;
pub mod instance;

pub use document::{ContentDocument, NavItem, PreviewRevision, SiteMeta, Typography};
pub use error::{ModelError, ModelResult};
pub use ids::{BlockId, PreviewId};
pub use instance::{merge_data, BlockData, BlockInstance, ColumnContainer};
