//! # Block Registry
//!
//! Catalogue mapping a block type id to its descriptor.
//!
//! ## Lifecycle
//!
//! ```text
//! init:          BlockRegistry::new() → register()/install() per module
//! steady state:  Arc<BlockRegistry>, read-only, shared by every render
//! ```
//!
//! Registration order does not matter; registering a type twice replaces
//! the earlier descriptor (last write wins). Lookups of unknown types return
//! `None` and never fail.

use crate::vdom::VNode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tessera_blocks::{BlockData, BlockId, BlockInstance, ColumnContainer};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
}

/// Failure reported by a renderer for one block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("{0}")]
    Failed(String),
}

/// Whether hidden blocks are filtered (published output) or kept (editor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Public,
    Editing,
}

/// What a child block can see of the layout it sits in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentScope {
    pub layout_type: Option<String>,
    pub theme: Option<String>,
}

/// A resolved column, ready to be placed by a layout renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSlot {
    pub name: String,
    pub node: VNode,
}

/// Everything a renderer receives for one block
#[derive(Debug)]
pub struct RenderInput<'a> {
    pub id: &'a BlockId,
    pub block_type: &'a str,
    /// Adapted data view
    pub props: &'a BlockData,
    /// One entry per column container, in declaration order
    pub slots: &'a [RenderedSlot],
    pub mode: RenderMode,
    pub template: Option<&'a str>,
}

impl<'a> RenderInput<'a> {
    pub fn prop(&self, key: &str) -> Option<&'a Value> {
        self.props.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&'a str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &str) -> Result<&'a str, RenderError> {
        self.prop_str(key)
            .ok_or_else(|| RenderError::MissingField(key.to_string()))
    }

    pub fn slot(&self, name: &str) -> Option<&'a VNode> {
        self.slots.iter().find(|s| s.name == name).map(|s| &s.node)
    }

    /// All slot nodes in order
    pub fn slot_nodes(&self) -> Vec<VNode> {
        self.slots.iter().map(|s| s.node.clone()).collect()
    }
}

/// Turns one block into a node
pub trait BlockRenderer: Send + Sync {
    fn render(&self, input: &RenderInput<'_>) -> Result<VNode, RenderError>;
}

struct FnRenderer<F>(F);

impl<F> BlockRenderer for FnRenderer<F>
where
    F: Fn(&RenderInput<'_>) -> Result<VNode, RenderError> + Send + Sync,
{
    fn render(&self, input: &RenderInput<'_>) -> Result<VNode, RenderError> {
        (self.0)(input)
    }
}

/// Wrap a closure as a renderer
pub fn renderer_fn<F>(f: F) -> Arc<dyn BlockRenderer>
where
    F: Fn(&RenderInput<'_>) -> Result<VNode, RenderError> + Send + Sync + 'static,
{
    Arc::new(FnRenderer(f))
}

/// Per-type data adaptation, applied before rendering
pub trait DataAdapter: Send + Sync {
    fn adapt<'d>(&self, parent: &ParentScope, data: &'d BlockData) -> Cow<'d, BlockData>;
}

/// Admin-side editor for a block type, expressed as a form schema
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorSchema {
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    RichText,
    Image,
    Color,
    Toggle,
    Select { options: Vec<String> },
}

impl EditorSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, label: &str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            label: label.to_string(),
            kind,
        });
        self
    }
}

/// Registration record for one block type
#[derive(Clone)]
pub struct BlockDescriptor {
    pub block_type: String,
    pub renderer: Arc<dyn BlockRenderer>,
    pub editor: Option<EditorSchema>,
    pub default_data: BlockData,
    pub label: String,
    pub icon: Option<String>,
    pub category: Option<String>,
    /// Slot names owned by layout types, in order
    pub layout: Option<Vec<String>>,
    pub adapter: Option<Arc<dyn DataAdapter>>,
}

impl BlockDescriptor {
    pub fn new(block_type: impl Into<String>, renderer: Arc<dyn BlockRenderer>) -> Self {
        let block_type = block_type.into();
        Self {
            label: block_type.clone(),
            block_type,
            renderer,
            editor: None,
            default_data: BlockData::new(),
            icon: None,
            category: None,
            layout: None,
            adapter: None,
        }
    }

    pub fn from_fn<F>(block_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RenderInput<'_>) -> Result<VNode, RenderError> + Send + Sync + 'static,
    {
        Self::new(block_type, renderer_fn(f))
    }

    /// Non-object values are ignored
    pub fn with_default_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.default_data = map;
        }
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_layout(mut self, slots: &[&str]) -> Self {
        self.layout = Some(slots.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_editor(mut self, editor: EditorSchema) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn with_adapter(mut self, adapter: impl DataAdapter + 'static) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn is_layout(&self) -> bool {
        self.layout.is_some()
    }

    pub fn summary(&self) -> BlockSummary {
        BlockSummary {
            block_type: self.block_type.clone(),
            label: self.label.clone(),
            icon: self.icon.clone(),
            category: self.category_or_default().to_string(),
            slots: self.layout.clone().unwrap_or_default(),
            default_data: self.default_data.clone(),
            editor: self.editor.clone(),
        }
    }
}

impl fmt::Debug for BlockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDescriptor")
            .field("block_type", &self.block_type)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("layout", &self.layout)
            .field("has_editor", &self.editor.is_some())
            .field("has_adapter", &self.adapter.is_some())
            .finish()
    }
}

/// Serializable view of a descriptor for the block picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
    #[serde(rename = "type")]
    pub block_type: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub slots: Vec<String>,
    pub default_data: BlockData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorSchema>,
}

/// A group of block types declared together
pub trait BlockModule {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut BlockRegistry);
}

#[derive(Debug, Default, Clone)]
pub struct BlockRegistry {
    descriptors: HashMap<String, BlockDescriptor>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a descriptor. Returns the one it replaced.
    pub fn register(&mut self, descriptor: BlockDescriptor) -> Option<BlockDescriptor> {
        let block_type = descriptor.block_type.clone();
        let previous = self.descriptors.insert(block_type.clone(), descriptor);
        if previous.is_some() {
            debug!(block_type = %block_type, "replaced block descriptor");
        } else {
            debug!(block_type = %block_type, "registered block type");
        }
        previous
    }

    pub fn install(&mut self, module: &dyn BlockModule) -> &mut Self {
        debug!(module = module.name(), "installing block module");
        module.register(self);
        self
    }

    pub fn lookup(&self, block_type: &str) -> Option<&BlockDescriptor> {
        self.descriptors.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.descriptors.contains_key(block_type)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors sorted by type id
    pub fn list(&self) -> Vec<&BlockDescriptor> {
        let mut all: Vec<_> = self.descriptors.values().collect();
        all.sort_by(|a, b| a.block_type.cmp(&b.block_type));
        all
    }

    /// Descriptors grouped by category, each group sorted by type id
    pub fn list_by_category(&self) -> BTreeMap<String, Vec<&BlockDescriptor>> {
        let mut groups: BTreeMap<String, Vec<&BlockDescriptor>> = BTreeMap::new();
        for descriptor in self.list() {
            groups
                .entry(descriptor.category_or_default().to_string())
                .or_default()
                .push(descriptor);
        }
        groups
    }

    pub fn summaries(&self) -> Vec<BlockSummary> {
        self.list().into_iter().map(BlockDescriptor::summary).collect()
    }

    /// New instance of `block_type` with a copy of its default data and one
    /// empty container per declared slot.
    pub fn instantiate(
        &self,
        block_type: &str,
        id: Option<BlockId>,
    ) -> Result<BlockInstance, RegistryError> {
        let descriptor = self
            .lookup(block_type)
            .ok_or_else(|| RegistryError::UnknownBlockType(block_type.to_string()))?;

        let columns = descriptor
            .layout
            .iter()
            .flatten()
            .map(|slot| ColumnContainer::new(slot.clone()))
            .collect();

        Ok(BlockInstance::new(
            id.unwrap_or_else(BlockId::generate),
            block_type,
            descriptor.default_data.clone(),
        )
        .with_columns(columns))
    }
}
