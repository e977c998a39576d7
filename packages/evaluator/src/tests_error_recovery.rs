/// A failing block degrades to a placeholder; the rest of the page still renders.
use crate::evaluator::{resolve, ResolveContext};
use crate::html::{to_html, HtmlOptions};
use crate::override_resolution::TemplateOverrides;
use crate::registry::{BlockDescriptor, RenderError};
use crate::standard::standard_registry;
use crate::vdom::{PlaceholderReason, VNode};
use serde_json::{json, Value};
use tessera_blocks::{BlockId, BlockInstance, ColumnContainer};

fn block(id: &str, block_type: &str, data: Value) -> BlockInstance {
    BlockInstance::new(
        BlockId::new(id),
        block_type,
        data.as_object().cloned().unwrap_or_default(),
    )
}

fn page_with(children: Vec<BlockInstance>) -> BlockInstance {
    block("root", "page", json!({})).with_columns(vec![ColumnContainer::new("body").with_blocks(children)])
}

fn reason_of(node: &VNode) -> Option<PlaceholderReason> {
    match node {
        VNode::Placeholder { reason, .. } => Some(*reason),
        _ => None,
    }
}

#[test]
fn test_renderer_error_is_isolated() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    // image without a source
    let root = page_with(vec![
        block("a", "h1", json!({ "text": "Before" })),
        block("img", "image", json!({ "alt": "nothing" })),
        block("b", "content", json!({ "text": "After" })),
    ]);

    let node = resolve(&root, &ctx);

    let broken = node.find_block(&BlockId::new("img")).unwrap();
    assert_eq!(reason_of(broken), Some(PlaceholderReason::RenderFailed));
    assert!(broken.text_content().contains("Missing required field 'src'"));
    assert_eq!(node.find_block(&BlockId::new("a")).unwrap().text_content(), "Before");
    assert_eq!(node.find_block(&BlockId::new("b")).unwrap().text_content(), "After");
}

#[test]
fn test_renderer_panic_is_isolated() {
    let mut registry = standard_registry();
    registry.register(BlockDescriptor::from_fn("unstable", |input| {
        if input.prop_str("mode") == Some("explode") {
            panic!("renderer blew up");
        }
        Ok(VNode::element("div"))
    }));
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let root = page_with(vec![
        block("ok", "unstable", json!({})),
        block("boom", "unstable", json!({ "mode": "explode" })),
        block("tail", "content", json!({ "text": "Still here" })),
    ]);

    let node = resolve(&root, &ctx);

    assert_eq!(node.placeholders().len(), 1);
    let boom = node.find_block(&BlockId::new("boom")).unwrap();
    assert_eq!(reason_of(boom), Some(PlaceholderReason::RenderFailed));
    assert!(boom.text_content().contains("renderer blew up"));
    assert!(reason_of(node.find_block(&BlockId::new("ok")).unwrap()).is_none());
    assert_eq!(node.find_block(&BlockId::new("tail")).unwrap().text_content(), "Still here");
}

#[test]
fn test_failing_layout_keeps_identity() {
    let mut registry = standard_registry();
    registry.register(
        BlockDescriptor::from_fn("broken-columns", |_| Err(RenderError::Failed("no grid".to_string())))
            .with_layout(&["left", "right"]),
    );
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let layout = block("grid", "broken-columns", json!({})).with_columns(vec![
        ColumnContainer::new("left").with_blocks(vec![block("x", "h2", json!({ "text": "X" }))]),
        ColumnContainer::new("right"),
    ]);
    let root = page_with(vec![layout, block("after", "spacer", json!({}))]);

    let node = resolve(&root, &ctx);

    let grid = node.find_block(&BlockId::new("grid")).unwrap();
    assert_eq!(reason_of(grid), Some(PlaceholderReason::RenderFailed));
    assert_eq!(grid.identity().unwrap().block_type, "broken-columns");
    assert!(node.find_block(&BlockId::new("after")).is_some());
}

#[test]
fn test_invalid_field_reports_field_name() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let node = resolve(&block("s", "spacer", json!({ "height": "tall" })), &ctx);

    assert_eq!(reason_of(&node), Some(PlaceholderReason::RenderFailed));
    assert!(node.text_content().contains("Invalid field 'height'"));
}

#[test]
fn test_placeholders_survive_html_output() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let root = page_with(vec![
        block("q", "quote", json!({})),
        block("c", "content", json!({ "text": "Body" })),
    ]);
    let html = to_html(&resolve(&root, &ctx), &HtmlOptions::compact());

    assert!(html.contains(
        "<div class=\"tessera-placeholder\" data-reason=\"unsupported_type\" data-block-id=\"q\" data-block-type=\"quote\">Unsupported block type: quote</div>"
    ));
    assert!(html.contains("<p>Body</p>"));
}
