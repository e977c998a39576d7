/// End-to-end composition over the standard block set
use crate::evaluator::{resolve, resolve_page, ResolveContext};
use crate::override_resolution::TemplateOverrides;
use crate::registry::{BlockDescriptor, BlockRegistry};
use crate::standard::standard_registry;
use crate::vdom::{PlaceholderReason, VNode};
use serde_json::{json, Value};
use tessera_blocks::{BlockId, BlockInstance, ColumnContainer, ContentDocument};

fn block(id: &str, block_type: &str, data: Value) -> BlockInstance {
    BlockInstance::new(
        BlockId::new(id),
        block_type,
        data.as_object().cloned().unwrap_or_default(),
    )
}

fn two_column(left: Vec<BlockInstance>, right: Vec<BlockInstance>) -> BlockInstance {
    block("cols", "two-column", json!({})).with_columns(vec![
        ColumnContainer::new("left").with_blocks(left),
        ColumnContainer::new("right").with_blocks(right),
    ])
}

fn slot_block_ids(node: &VNode, slot: &str) -> Vec<String> {
    node.find_slot(slot)
        .map(|s| s.block_children())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| n.identity())
        .map(|i| i.block_id.to_string())
        .collect()
}

#[test]
fn test_two_column_with_empty_right_column() {
    let mut registry = BlockRegistry::new();
    let standard = standard_registry();
    for block_type in ["h2", "content", "image", "two-column"] {
        if let Some(descriptor) = standard.lookup(block_type) {
            registry.register(descriptor.clone());
        }
    }
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let layout = two_column(vec![block("t", "h2", json!({ "text": "Title" }))], vec![]);
    let node = resolve(&layout, &ctx);

    assert_eq!(slot_block_ids(&node, "left"), vec!["t"]);
    let right = node.find_slot("right").expect("right slot is rendered");
    assert!(right.children().is_empty());
    assert!(node.placeholders().is_empty());
    assert_eq!(node.find_block(&BlockId::new("t")).unwrap().text_content(), "Title");
}

#[test]
fn test_unregistered_type_becomes_single_placeholder_in_place() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let layout = two_column(
        vec![
            block("t", "h2", json!({ "text": "Title" })),
            block("q", "quote", json!({ "text": "Hello" })),
            block("c", "content", json!({ "text": "Body" })),
        ],
        vec![],
    );
    let node = resolve(&layout, &ctx);

    let placeholders = node.placeholders();
    assert_eq!(placeholders.len(), 1);
    match placeholders[0] {
        VNode::Placeholder {
            reason, message, ..
        } => {
            assert_eq!(*reason, PlaceholderReason::UnsupportedType);
            assert_eq!(message, "Unsupported block type: quote");
        }
        other => panic!("Expected placeholder, got {:?}", other),
    }

    assert_eq!(slot_block_ids(&node, "left"), vec!["t", "q", "c"]);
    assert_eq!(node.find_block(&BlockId::new("t")).unwrap().text_content(), "Title");
    assert_eq!(node.find_block(&BlockId::new("c")).unwrap().text_content(), "Body");
}

#[test]
fn test_hidden_blocks_only_in_editing_mode() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();

    let layout = two_column(
        vec![
            block("a", "content", json!({ "text": "A" })),
            block("b", "content", json!({ "text": "B" })).with_hidden(true),
        ],
        vec![block("r", "spacer", json!({})).with_hidden(true)],
    );

    let public = resolve(&layout, &ResolveContext::new(&registry, &overrides));
    assert_eq!(slot_block_ids(&public, "left"), vec!["a"]);
    assert!(slot_block_ids(&public, "right").is_empty());

    let editing = resolve(&layout, &ResolveContext::new(&registry, &overrides).editing());
    assert_eq!(slot_block_ids(&editing, "left"), vec!["a", "b"]);
    assert_eq!(
        editing.find_block(&BlockId::new("r")).unwrap().attr("data-hidden"),
        Some("true")
    );
    assert_eq!(editing.find_block(&BlockId::new("a")).unwrap().attr("data-hidden"), None);
}

#[test]
fn test_heading_inherits_layout_theme() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let mut layout = two_column(
        vec![block("t", "h2", json!({ "text": "Title" }))],
        vec![block("u", "h3", json!({ "text": "Sub", "theme": "light" }))],
    );
    layout.data.insert("theme".to_string(), json!("dark"));

    let node = resolve(&layout, &ctx);

    assert_eq!(node.attr("data-theme"), Some("dark"));
    assert_eq!(node.find_block(&BlockId::new("t")).unwrap().attr("data-theme"), Some("dark"));
    assert_eq!(node.find_block(&BlockId::new("u")).unwrap().attr("data-theme"), Some("light"));
}

#[test]
fn test_nested_image_source_is_flattened() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let image = block("img", "image", json!({ "image": { "src": "/uploads/a.png", "alt": "A" } }));
    let node = resolve(&image, &ctx);

    assert_eq!(node.tag(), Some("img"));
    assert_eq!(node.attr("src"), Some("/uploads/a.png"));
    assert_eq!(node.attr("alt"), Some("A"));
}

#[test]
fn test_nested_layouts_resolve_recursively() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let inner = block("inner", "three-column", json!({})).with_columns(vec![
        ColumnContainer::new("column1").with_blocks(vec![block("x", "content", json!({ "text": "X" }))]),
        ColumnContainer::new("column2"),
        ColumnContainer::new("column3"),
    ]);
    let outer = two_column(vec![inner], vec![]);

    let node = resolve(&outer, &ctx);
    let inner_node = node.find_block(&BlockId::new("inner")).unwrap();

    assert_eq!(slot_block_ids(inner_node, "column1"), vec!["x"]);
    assert!(inner_node.find_slot("column3").is_some());
}

#[test]
fn test_page_uses_document_template() {
    let mut registry = standard_registry();
    registry.register(BlockDescriptor::from_fn("banner", |input| {
        Ok(VNode::element("header").with_attr("data-template", input.template.unwrap_or("none")))
    }));
    let overrides = TemplateOverrides::new();

    let mut doc = ContentDocument::new().with_page(
        "home",
        block("root", "page", json!({ "title": "Home" })).with_columns(vec![
            ColumnContainer::new("body").with_blocks(vec![block("b", "banner", json!({}))]),
        ]),
    );
    doc.meta.template = Some("classic".to_string());

    let node = resolve_page(&doc, "home", &ResolveContext::new(&registry, &overrides)).unwrap();
    assert_eq!(
        node.find_block(&BlockId::new("b")).unwrap().attr("data-template"),
        Some("classic")
    );

    let explicit = ResolveContext::new(&registry, &overrides).with_template("bold");
    let node = resolve_page(&doc, "home", &explicit).unwrap();
    assert_eq!(
        node.find_block(&BlockId::new("b")).unwrap().attr("data-template"),
        Some("bold")
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let registry = standard_registry();
    let overrides = TemplateOverrides::new();
    let ctx = ResolveContext::new(&registry, &overrides);

    let layout = two_column(
        vec![block("t", "h2", json!({ "text": "Title" }))],
        vec![block("c", "content", json!({ "text": "one\n\ntwo" }))],
    );

    assert_eq!(resolve(&layout, &ctx), resolve(&layout, &ctx));
    let content = resolve(&layout, &ctx);
    assert_eq!(content.find_block(&BlockId::new("c")).unwrap().children().len(), 2);
}
