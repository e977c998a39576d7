//! # Document Mutations
//!
//! Serializable edit operations on a content document. Each one names its
//! targets by block id or [`ContainerRef`] and is applied to a
//! [`BlockArena`], which checks every precondition before changing anything.
//!
//! ## Semantics
//!
//! - `InsertBlock` places a ready-made instance (ids already assigned), so
//!   replaying a recorded mutation yields the same document.
//! - `RemoveBlock` drops the block and everything nested in it; removing an
//!   absent id is a no-op.
//! - `UpdateBlockData` is a shallow merge; id and type never change.
//! - `MoveBlock` is one splice, within or across containers. Moving a layout
//!   into its own subtree fails with `CycleDetected`.

use crate::arena::{BlockArena, ContainerRef};
use crate::errors::MutationResult;
use serde::{Deserialize, Serialize};
use tessera_blocks::{BlockData, BlockId, BlockInstance, SiteMeta};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    InsertBlock {
        container: ContainerRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        block: BlockInstance,
    },

    RemoveBlock {
        id: BlockId,
    },

    UpdateBlockData {
        id: BlockId,
        patch: BlockData,
    },

    ToggleVisibility {
        id: BlockId,
    },

    MoveBlock {
        id: BlockId,
        to: ContainerRef,
        index: usize,
    },

    /// Replace site-wide metadata (template, typography, palette, navigation)
    SetMeta {
        meta: SiteMeta,
    },
}

impl Mutation {
    pub fn apply(&self, arena: &mut BlockArena) -> MutationResult<()> {
        match self {
            Mutation::InsertBlock {
                container,
                index,
                block,
            } => arena.insert(container, *index, block),

            Mutation::RemoveBlock { id } => arena.remove(id).map(|_| ()),

            Mutation::UpdateBlockData { id, patch } => arena.update_data(id, patch),

            Mutation::ToggleVisibility { id } => arena.toggle_hidden(id).map(|_| ()),

            Mutation::MoveBlock { id, to, index } => arena.move_block(id, to, *index),

            Mutation::SetMeta { meta } => {
                arena.set_meta(meta.clone());
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "insertBlock",
            Mutation::RemoveBlock { .. } => "removeBlock",
            Mutation::UpdateBlockData { .. } => "updateBlockData",
            Mutation::ToggleVisibility { .. } => "toggleVisibility",
            Mutation::MoveBlock { .. } => "moveBlock",
            Mutation::SetMeta { .. } => "setMeta",
        }
    }

    /// Block the mutation is about, if any
    pub fn target(&self) -> Option<&BlockId> {
        match self {
            Mutation::InsertBlock { block, .. } => Some(&block.id),
            Mutation::RemoveBlock { id }
            | Mutation::UpdateBlockData { id, .. }
            | Mutation::ToggleVisibility { id }
            | Mutation::MoveBlock { id, .. } => Some(id),
            Mutation::SetMeta { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let mutation: Mutation = serde_json::from_value(json!({
            "op": "moveBlock",
            "id": "b2",
            "to": { "page": "home", "owner": "cols", "slot": "right" },
            "index": 1
        }))
        .unwrap();

        assert_eq!(
            mutation,
            Mutation::MoveBlock {
                id: BlockId::new("b2"),
                to: ContainerRef::layout("home", "cols", "right"),
                index: 1,
            }
        );
        assert_eq!(mutation.name(), "moveBlock");
        assert_eq!(mutation.target(), Some(&BlockId::new("b2")));
    }

    #[test]
    fn test_insert_without_index_or_owner() {
        let mutation: Mutation = serde_json::from_value(json!({
            "op": "insertBlock",
            "container": { "page": "home", "slot": "body" },
            "block": { "id": "new", "type": "spacer" }
        }))
        .unwrap();

        match mutation {
            Mutation::InsertBlock {
                container, index, ..
            } => {
                assert_eq!(container, ContainerRef::page("home", "body"));
                assert_eq!(index, None);
            }
            other => panic!("Expected insert, got {:?}", other),
        }
    }
}
