//! Block instances and the column containers layout blocks own.

use crate::ids::BlockId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type-specific payload of a block. Opaque to everything but the block's
/// own renderer and adapter.
pub type BlockData = Map<String, Value>;

/// Shallow merge: top-level keys of `patch` replace those in `data`.
pub fn merge_data(data: &BlockData, patch: &BlockData) -> BlockData {
    let mut merged = data.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// One placed block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub block_type: String,

    #[serde(default)]
    pub data: BlockData,

    /// Rendering filter only; hidden blocks stay in the editing tree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,

    /// Column containers, present only on layout blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnContainer>,
}

impl BlockInstance {
    pub fn new(id: BlockId, block_type: impl Into<String>, data: BlockData) -> Self {
        Self {
            id,
            block_type: block_type.into(),
            data,
            hidden: false,
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnContainer>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn is_layout(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn column(&self, slot: &str) -> Option<&ColumnContainer> {
        self.columns.iter().find(|c| c.slot == slot)
    }

    pub fn column_mut(&mut self, slot: &str) -> Option<&mut ColumnContainer> {
        self.columns.iter_mut().find(|c| c.slot == slot)
    }

    /// String field from `data`
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Depth-first pre-order visit of this block and every descendant
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a BlockInstance)) {
        visit(self);
        for column in &self.columns {
            for child in &column.blocks {
                child.walk(visit);
            }
        }
    }

    /// Find this block or a descendant by id
    pub fn find(&self, id: &BlockId) -> Option<&BlockInstance> {
        if &self.id == id {
            return Some(self);
        }
        self.columns
            .iter()
            .flat_map(|c| c.blocks.iter())
            .find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &BlockId) -> Option<&mut BlockInstance> {
        if &self.id == id {
            return Some(self);
        }
        for column in &mut self.columns {
            for child in &mut column.blocks {
                if let Some(found) = child.find_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// True if `id` names this block or one nested inside it
    pub fn contains(&self, id: &BlockId) -> bool {
        self.find(id).is_some()
    }
}

/// Ordered sequence of blocks held under a named slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnContainer {
    pub slot: String,

    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
}

impl ColumnContainer {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<BlockInstance>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    pub fn get(&self, id: &BlockId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.position(id).is_some()
    }

    pub fn ids(&self) -> Vec<&BlockId> {
        self.blocks.iter().map(|b| &b.id).collect()
    }

    /// Blocks that survive the public-render filter
    pub fn visible(&self) -> impl Iterator<Item = &BlockInstance> {
        self.blocks.iter().filter(|b| !b.hidden)
    }
}
