//! # Draft
//!
//! The in-memory, unsaved copy of a content document. Edits are applied as
//! [`Mutation`]s; a failed edit leaves the draft exactly as it was.
//!
//! ```text
//! canonical ──load──► Draft ──apply(mutation)──► Draft' ──save──► canonical'
//! ```

use crate::arena::{BlockArena, ContainerRef};
use crate::errors::MutationResult;
use crate::mutations::Mutation;
use tessera_blocks::{BlockId, ContentDocument};
use tessera_evaluator::BlockRegistry;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Draft {
    document: ContentDocument,

    /// Increments on every change, including undo/redo restores
    version: u64,
}

impl Draft {
    pub fn new(document: ContentDocument) -> Self {
        Self {
            document,
            version: 0,
        }
    }

    pub fn document(&self) -> &ContentDocument {
        &self.document
    }

    pub fn into_document(self) -> ContentDocument {
        self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply one mutation. Returns the new version.
    pub fn apply(&mut self, mutation: &Mutation) -> MutationResult<u64> {
        self.apply_all(std::slice::from_ref(mutation))
    }

    /// Apply `mutations` in order as one transaction: all of them land or
    /// none do. A batch that leaves the document as it was keeps the
    /// current version.
    pub fn apply_all(&mut self, mutations: &[Mutation]) -> MutationResult<u64> {
        let mut arena = BlockArena::from_document(&self.document)?;

        for mutation in mutations {
            if let Err(err) = mutation.apply(&mut arena) {
                warn!(
                    op = mutation.name(),
                    target = ?mutation.target().map(BlockId::as_str),
                    "mutation rejected: {}",
                    err
                );
                return Err(err);
            }
        }

        let document = arena.into_document();
        if document == self.document {
            debug!(count = mutations.len(), "mutations changed nothing");
            return Ok(self.version);
        }

        self.document = document;
        self.version += 1;
        debug!(version = self.version, count = mutations.len(), "draft updated");
        Ok(self.version)
    }

    /// Instantiate `block_type` from `registry` and insert it.
    /// Returns the new block's id.
    pub fn add_block(
        &mut self,
        registry: &BlockRegistry,
        container: &ContainerRef,
        block_type: &str,
        index: Option<usize>,
    ) -> MutationResult<BlockId> {
        let block = registry.instantiate(block_type, None)?;
        let id = block.id.clone();

        self.apply(&Mutation::InsertBlock {
            container: container.clone(),
            index,
            block,
        })?;
        Ok(id)
    }

    /// Swap in a whole document (undo, redo, discard)
    pub fn replace(&mut self, document: ContentDocument) -> u64 {
        self.document = document;
        self.version += 1;
        self.version
    }
}
