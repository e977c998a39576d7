//! # Block Arena
//!
//! Flat view of a [`ContentDocument`] used to apply document-level edits.
//! Every block lives in one map keyed by id; containers are ordered lists of
//! child ids, and each block remembers the container that holds it. A move
//! between any two containers is a single splice of two id lists.
//!
//! ```text
//! pages:  "home" → root
//! nodes:  root  { slots: [body: [cols, hero]] }
//!         cols  { slots: [left: [t1], right: []], parent: (root, body) }
//!         t1    { parent: (cols, left) }
//! ```

use crate::errors::{MutationError, MutationResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tessera_blocks::{
    merge_data, BlockData, BlockId, BlockInstance, ColumnContainer, ContentDocument, SiteMeta,
};

/// Address of one column container inside a document.
///
/// `owner` is the layout block owning the slot; `None` means the page root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub page: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<BlockId>,

    pub slot: String,
}

impl ContainerRef {
    /// A slot on the page root itself
    pub fn page(page: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            owner: None,
            slot: slot.into(),
        }
    }

    /// A slot of a layout block on `page`
    pub fn layout(page: impl Into<String>, owner: impl Into<BlockId>, slot: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            owner: Some(owner.into()),
            slot: slot.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    children: Vec<BlockId>,
}

#[derive(Debug, Clone)]
struct Node {
    block_type: String,
    data: BlockData,
    hidden: bool,
    slots: Vec<Slot>,
    /// Owning block and slot index; `None` for page roots
    parent: Option<(BlockId, usize)>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockArena {
    nodes: HashMap<BlockId, Node>,
    pages: BTreeMap<String, BlockId>,
    meta: SiteMeta,
}

impl BlockArena {
    pub fn from_document(document: &ContentDocument) -> MutationResult<Self> {
        let mut arena = Self {
            meta: document.meta.clone(),
            ..Self::default()
        };
        for (key, root) in &document.pages {
            arena.check_new_ids(root)?;
            arena.insert_subtree(root, None);
            arena.pages.insert(key.clone(), root.id.clone());
        }
        Ok(arena)
    }

    pub fn into_document(self) -> ContentDocument {
        let pages = self
            .pages
            .iter()
            .filter_map(|(key, root)| self.build(root).map(|block| (key.clone(), block)))
            .collect();

        ContentDocument {
            pages,
            meta: self.meta,
        }
    }

    /// Rebuild the owned block tree rooted at `id`
    pub fn build(&self, id: &BlockId) -> Option<BlockInstance> {
        let node = self.nodes.get(id)?;
        let columns = node
            .slots
            .iter()
            .map(|slot| {
                ColumnContainer::new(slot.name.clone())
                    .with_blocks(slot.children.iter().filter_map(|child| self.build(child)).collect())
            })
            .collect();

        Some(
            BlockInstance::new(id.clone(), node.block_type.clone(), node.data.clone())
                .with_hidden(node.hidden)
                .with_columns(columns),
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn page_root(&self, page: &str) -> Option<&BlockId> {
        self.pages.get(page)
    }

    pub fn meta(&self) -> &SiteMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: SiteMeta) {
        self.meta = meta;
    }

    /// Ids held by `container`, in order
    pub fn children(&self, container: &ContainerRef) -> MutationResult<&[BlockId]> {
        let (owner, slot) = self.locate(container)?;
        self.slot_children(&owner, slot).map(Vec::as_slice)
    }

    /// Container currently holding `id` and its index there
    pub fn location(&self, id: &BlockId) -> Option<(ContainerRef, usize)> {
        let (owner, slot) = self.nodes.get(id)?.parent.clone()?;
        let root = self.root_of(&owner)?;
        let page = self
            .pages
            .iter()
            .find_map(|(key, page_root)| (page_root == root).then(|| key.clone()))?;
        let owner_node = self.nodes.get(&owner)?;
        let slot = owner_node.slots.get(slot)?;
        let index = slot.children.iter().position(|child| child == id)?;

        let owner = if &owner == root { None } else { Some(owner) };
        Some((
            ContainerRef {
                page,
                owner,
                slot: slot.name.clone(),
            },
            index,
        ))
    }

    /// Insert `block` (and any blocks nested in it) into `container`.
    /// `index` defaults to the end.
    pub fn insert(
        &mut self,
        container: &ContainerRef,
        index: Option<usize>,
        block: &BlockInstance,
    ) -> MutationResult<()> {
        let (owner, slot) = self.locate(container)?;
        let len = self.slot_children(&owner, slot)?.len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(MutationError::IndexOutOfRange { index, len });
        }
        self.check_new_ids(block)?;

        self.insert_subtree(block, Some((owner.clone(), slot)));
        self.slot_children_mut(&owner, slot)?
            .insert(index, block.id.clone());
        Ok(())
    }

    /// Remove `id` and its subtree. Returns false when `id` was not present.
    pub fn remove(&mut self, id: &BlockId) -> MutationResult<bool> {
        let Some(node) = self.nodes.get(id) else {
            return Ok(false);
        };
        let (owner, slot) = node
            .parent
            .clone()
            .ok_or_else(|| MutationError::PageRoot(id.to_string()))?;

        self.slot_children_mut(&owner, slot)?.retain(|child| child != id);
        self.drop_subtree(id);
        Ok(true)
    }

    pub fn update_data(&mut self, id: &BlockId, patch: &BlockData) -> MutationResult<()> {
        let node = self.node_mut(id)?;
        node.data = merge_data(&node.data, patch);
        Ok(())
    }

    /// Flip `hidden`; returns the new value
    pub fn toggle_hidden(&mut self, id: &BlockId) -> MutationResult<bool> {
        let node = self.node_mut(id)?;
        node.hidden = !node.hidden;
        Ok(node.hidden)
    }

    /// Move `id` so it sits at `index` in `to`.
    ///
    /// Within one container `index` must be an existing position; across
    /// containers it may also be one past the end. Everything is checked
    /// before either list is touched.
    pub fn move_block(&mut self, id: &BlockId, to: &ContainerRef, index: usize) -> MutationResult<()> {
        let (from_owner, from_slot) = self
            .nodes
            .get(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?
            .parent
            .clone()
            .ok_or_else(|| MutationError::PageRoot(id.to_string()))?;
        let (to_owner, to_slot) = self.locate(to)?;

        if self.is_within(&to_owner, id) {
            return Err(MutationError::CycleDetected(id.to_string()));
        }

        let from_index = self
            .slot_children(&from_owner, from_slot)?
            .iter()
            .position(|child| child == id)
            .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?;

        let same_container = from_owner == to_owner && from_slot == to_slot;
        let len = self.slot_children(&to_owner, to_slot)?.len();
        let in_range = if same_container { index < len } else { index <= len };
        if !in_range {
            return Err(MutationError::IndexOutOfRange { index, len });
        }

        self.slot_children_mut(&from_owner, from_slot)?.remove(from_index);
        self.slot_children_mut(&to_owner, to_slot)?
            .insert(index, id.clone());
        self.node_mut(id)?.parent = Some((to_owner, to_slot));
        Ok(())
    }

    fn locate(&self, container: &ContainerRef) -> MutationResult<(BlockId, usize)> {
        let root = self
            .pages
            .get(&container.page)
            .ok_or_else(|| MutationError::PageNotFound(container.page.clone()))?;
        let owner = container.owner.as_ref().unwrap_or(root);
        let not_found = || MutationError::ContainerNotFound {
            owner: owner.to_string(),
            slot: container.slot.clone(),
        };

        if self.root_of(owner) != Some(root) {
            return Err(not_found());
        }
        let slot = self
            .nodes
            .get(owner)
            .and_then(|node| node.slots.iter().position(|slot| slot.name == container.slot))
            .ok_or_else(not_found)?;

        Ok((owner.clone(), slot))
    }

    fn root_of<'a>(&'a self, id: &'a BlockId) -> Option<&'a BlockId> {
        let mut current = id;
        loop {
            match &self.nodes.get(current)?.parent {
                Some((owner, _)) => current = owner,
                None => return Some(current),
            }
        }
    }

    /// True if `candidate` is `id` or nested somewhere under it
    fn is_within(&self, candidate: &BlockId, id: &BlockId) -> bool {
        let mut current = Some(candidate);
        while let Some(block) = current {
            if block == id {
                return true;
            }
            current = self
                .nodes
                .get(block)
                .and_then(|node| node.parent.as_ref())
                .map(|(owner, _)| owner);
        }
        false
    }

    fn node_mut(&mut self, id: &BlockId) -> MutationResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| MutationError::BlockNotFound(id.to_string()))
    }

    fn slot_children(&self, owner: &BlockId, slot: usize) -> MutationResult<&Vec<BlockId>> {
        self.nodes
            .get(owner)
            .and_then(|node| node.slots.get(slot))
            .map(|slot| &slot.children)
            .ok_or_else(|| MutationError::BlockNotFound(owner.to_string()))
    }

    fn slot_children_mut(&mut self, owner: &BlockId, slot: usize) -> MutationResult<&mut Vec<BlockId>> {
        self.nodes
            .get_mut(owner)
            .and_then(|node| node.slots.get_mut(slot))
            .map(|slot| &mut slot.children)
            .ok_or_else(|| MutationError::BlockNotFound(owner.to_string()))
    }

    /// Every id in `block`'s subtree must be new to the arena and unique
    fn check_new_ids(&self, block: &BlockInstance) -> MutationResult<()> {
        let mut seen = HashSet::new();
        let mut result = Ok(());
        block.walk(&mut |b| {
            if result.is_ok() && (self.nodes.contains_key(&b.id) || !seen.insert(&b.id)) {
                result = Err(MutationError::DuplicateBlockId(b.id.to_string()));
            }
        });
        result
    }

    fn insert_subtree(&mut self, block: &BlockInstance, parent: Option<(BlockId, usize)>) {
        let slots = block
            .columns
            .iter()
            .map(|column| Slot {
                name: column.slot.clone(),
                children: column.blocks.iter().map(|b| b.id.clone()).collect(),
            })
            .collect();

        self.nodes.insert(
            block.id.clone(),
            Node {
                block_type: block.block_type.clone(),
                data: block.data.clone(),
                hidden: block.hidden,
                slots,
                parent,
            },
        );

        for (index, column) in block.columns.iter().enumerate() {
            for child in &column.blocks {
                self.insert_subtree(child, Some((block.id.clone(), index)));
            }
        }
    }

    fn drop_subtree(&mut self, id: &BlockId) {
        if let Some(node) = self.nodes.remove(id) {
            for slot in node.slots {
                for child in slot.children {
                    self.drop_subtree(&child);
                }
            }
        }
    }
}
