//! # Composition Resolver
//!
//! Turns a stored block tree into a [`VNode`] tree.
//!
//! ## Contract
//!
//! `resolve(instance, ctx)` is a pure function of its arguments. Everything
//! it consults (registry, template overrides, active template, render mode,
//! parent scope) arrives through [`ResolveContext`]; a child context is
//! derived for each layout level.
//!
//! For each instance:
//!
//! 1. pick a renderer: template override → registry → fallback placeholder
//! 2. adapt the data with the type's registered adapter, if any
//! 3. for layouts, resolve every column in order into a slot element,
//!    skipping hidden children in public mode
//! 4. render, then attach the block identity to the resulting node
//!
//! ## Failure isolation
//!
//! A renderer that returns an error or panics is replaced by a placeholder
//! for that block only. Unknown block types become placeholders too. Nothing
//! below page level ever aborts the page.
//!
//! ## Hidden blocks
//!
//! Filtering happens at the parent while iterating a column, never inside
//! `resolve` itself. Editing mode keeps hidden blocks and marks them with
//! `data-hidden="true"`.

use crate::override_resolution::{OverrideResolver, RendererChoice, TemplateOverrides};
use crate::registry::{
    BlockRegistry, BlockRenderer, ParentScope, RenderError, RenderInput, RenderMode, RenderedSlot,
};
use crate::vdom::{NodeIdentity, PlaceholderReason, VNode};
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tessera_blocks::{BlockData, BlockInstance, ColumnContainer, ContentDocument};
use thiserror::Error;
use tracing::{instrument, warn};

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Page not found: {0}")]
    PageNotFound(String),
}

/// Reader context threaded through resolution
#[derive(Clone, Debug)]
pub struct ResolveContext<'a> {
    pub registry: &'a BlockRegistry,
    pub overrides: &'a TemplateOverrides,
    pub template: Option<String>,
    pub mode: RenderMode,
    pub parent: ParentScope,
}

impl<'a> ResolveContext<'a> {
    pub fn new(registry: &'a BlockRegistry, overrides: &'a TemplateOverrides) -> Self {
        Self {
            registry,
            overrides,
            template: None,
            mode: RenderMode::Public,
            parent: ParentScope::default(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn editing(self) -> Self {
        self.with_mode(RenderMode::Editing)
    }

    /// Context for the children of `layout`, whose adapted data is `props`.
    /// A layout without its own theme passes its parent's theme through.
    pub fn child(&self, layout: &BlockInstance, props: &BlockData) -> Self {
        let theme = match props.get("theme") {
            Some(Value::String(theme)) if !theme.is_empty() => Some(theme.clone()),
            _ => self.parent.theme.clone(),
        };

        Self {
            parent: ParentScope {
                layout_type: Some(layout.block_type.clone()),
                theme,
            },
            template: self.template.clone(),
            ..*self
        }
    }

    fn includes(&self, block: &BlockInstance) -> bool {
        self.mode == RenderMode::Editing || !block.hidden
    }
}

/// Resolve one block (and, for layouts, everything under it)
pub fn resolve(instance: &BlockInstance, ctx: &ResolveContext<'_>) -> VNode {
    let identity = NodeIdentity::of(instance);
    let resolver = OverrideResolver::new(ctx.overrides, ctx.registry);

    let renderer = match resolver.resolve(ctx.template.as_deref(), &instance.block_type) {
        RendererChoice::Override(r) | RendererChoice::Registry(r) => r,
        RendererChoice::Fallback => {
            warn!(
                block_id = %instance.id,
                block_type = %instance.block_type,
                "unsupported block type, rendering placeholder"
            );
            return unsupported(instance).with_identity(identity);
        }
    };

    let props = adapt(instance, ctx);
    let slots: Vec<RenderedSlot> = if instance.columns.is_empty() {
        Vec::new()
    } else {
        let child_ctx = ctx.child(instance, &props);
        instance
            .columns
            .iter()
            .map(|column| RenderedSlot {
                name: column.slot.clone(),
                node: resolve_container(column, &child_ctx),
            })
            .collect()
    };

    let input = RenderInput {
        id: &instance.id,
        block_type: &instance.block_type,
        props: &props,
        slots: &slots,
        mode: ctx.mode,
        template: ctx.template.as_deref(),
    };

    let node = match render_isolated(renderer, &input) {
        Ok(node) => node,
        Err(err) => {
            warn!(
                block_id = %instance.id,
                block_type = %instance.block_type,
                error = %err,
                "block renderer failed, rendering placeholder"
            );
            VNode::placeholder(
                PlaceholderReason::RenderFailed,
                format!("Block '{}' failed to render: {}", instance.block_type, err),
            )
        }
    };

    let node = node.with_identity(identity);
    if instance.hidden && ctx.mode == RenderMode::Editing {
        node.with_attr("data-hidden", "true")
    } else {
        node
    }
}

/// Resolve one column into its slot element. An empty column still yields
/// a valid (empty) slot.
pub fn resolve_container(container: &ColumnContainer, ctx: &ResolveContext<'_>) -> VNode {
    let children = container
        .blocks
        .iter()
        .filter(|block| ctx.includes(block))
        .map(|block| resolve(block, ctx))
        .collect();

    VNode::slot(&container.slot, children)
}

/// Resolve a page of `doc`. The document's template applies unless the
/// context already names one.
#[instrument(skip(doc, ctx), fields(mode = ?ctx.mode))]
pub fn resolve_page(
    doc: &ContentDocument,
    page: &str,
    ctx: &ResolveContext<'_>,
) -> EvalResult<VNode> {
    let root = doc
        .page(page)
        .ok_or_else(|| EvalError::PageNotFound(page.to_string()))?;

    let mut page_ctx = ctx.clone();
    if page_ctx.template.is_none() {
        page_ctx.template = doc.meta.template.clone();
    }

    Ok(resolve(root, &page_ctx))
}

fn adapt<'d>(instance: &'d BlockInstance, ctx: &ResolveContext<'_>) -> Cow<'d, BlockData> {
    match ctx
        .registry
        .lookup(&instance.block_type)
        .and_then(|d| d.adapter.as_ref())
    {
        Some(adapter) => adapter.adapt(&ctx.parent, &instance.data),
        None => Cow::Borrowed(&instance.data),
    }
}

fn unsupported(instance: &BlockInstance) -> VNode {
    VNode::placeholder(
        PlaceholderReason::UnsupportedType,
        format!("Unsupported block type: {}", instance.block_type),
    )
}

fn render_isolated(
    renderer: &Arc<dyn BlockRenderer>,
    input: &RenderInput<'_>,
) -> Result<VNode, RenderError> {
    match panic::catch_unwind(AssertUnwindSafe(|| renderer.render(input))) {
        Ok(result) => result,
        Err(payload) => Err(RenderError::Failed(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockDescriptor;
    use serde_json::json;
    use tessera_blocks::BlockId;

    fn data(value: Value) -> BlockData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry.register(BlockDescriptor::from_fn("content", |input| {
            Ok(VNode::element("p").with_child(VNode::text(input.prop_str("text").unwrap_or(""))))
        }));
        registry.register(
            BlockDescriptor::from_fn("stack", |input| {
                Ok(VNode::element("section").with_children(input.slot_nodes()))
            })
            .with_layout(&["main"]),
        );
        registry
    }

    #[test]
    fn test_resolve_attaches_identity() {
        let registry = registry();
        let overrides = TemplateOverrides::new();
        let ctx = ResolveContext::new(&registry, &overrides);
        let block = BlockInstance::new(BlockId::new("p1"), "content", data(json!({ "text": "Hi" })));

        let node = resolve(&block, &ctx);

        let identity = node.identity().unwrap();
        assert_eq!(identity.block_id.as_str(), "p1");
        assert_eq!(identity.block_type, "content");
        assert_eq!(node.text_content(), "Hi");
    }

    #[test]
    fn test_hidden_filtered_in_public_kept_in_editing() {
        let registry = registry();
        let overrides = TemplateOverrides::new();
        let stack = BlockInstance::new(BlockId::new("s"), "stack", BlockData::new()).with_columns(vec![
            ColumnContainer::new("main").with_blocks(vec![
                BlockInstance::new(BlockId::new("a"), "content", data(json!({ "text": "A" }))),
                BlockInstance::new(BlockId::new("b"), "content", data(json!({ "text": "B" })))
                    .with_hidden(true),
            ]),
        ]);

        let public = resolve(&stack, &ResolveContext::new(&registry, &overrides));
        let slot = public.find_slot("main").unwrap();
        assert_eq!(slot.children().len(), 1);
        assert!(public.find_block(&BlockId::new("b")).is_none());

        let editing = resolve(&stack, &ResolveContext::new(&registry, &overrides).editing());
        let hidden = editing.find_block(&BlockId::new("b")).unwrap();
        assert_eq!(hidden.attr("data-hidden"), Some("true"));
        assert_eq!(editing.find_slot("main").unwrap().children().len(), 2);
    }

    #[test]
    fn test_child_context_inherits_theme_through_plain_layouts() {
        let registry = registry();
        let overrides = TemplateOverrides::new();
        let ctx = ResolveContext::new(&registry, &overrides);

        let outer = BlockInstance::new(BlockId::new("o"), "stack", data(json!({ "theme": "dark" })));
        let inner = BlockInstance::new(BlockId::new("i"), "stack", BlockData::new());

        let outer_ctx = ctx.child(&outer, &outer.data);
        let inner_ctx = outer_ctx.child(&inner, &inner.data);

        assert_eq!(outer_ctx.parent.theme.as_deref(), Some("dark"));
        assert_eq!(inner_ctx.parent.theme.as_deref(), Some("dark"));
        assert_eq!(inner_ctx.parent.layout_type.as_deref(), Some("stack"));
    }

    #[test]
    fn test_missing_page() {
        let registry = registry();
        let overrides = TemplateOverrides::new();
        let ctx = ResolveContext::new(&registry, &overrides);

        assert_eq!(
            resolve_page(&ContentDocument::new(), "blog", &ctx),
            Err(EvalError::PageNotFound("blog".to_string()))
        );
    }
}
