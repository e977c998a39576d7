use crate::evaluator::{resolve, resolve_page, ResolveContext};
use crate::override_resolution::TemplateOverrides;
use crate::registry::{renderer_fn, RenderMode};
use crate::standard::standard_registry;
use crate::vdom::VNode;
use serde_json::{json, Value};
use tessera_blocks::{BlockId, BlockInstance, ColumnContainer, ContentDocument};

fn block(id: &str, block_type: &str, data: Value) -> BlockInstance {
    BlockInstance::new(
        BlockId::new(id),
        block_type,
        data.as_object().cloned().unwrap_or_default(),
    )
}

fn bold_template() -> TemplateOverrides {
    TemplateOverrides::new()
        .with_override(
            "bold",
            "h2",
            renderer_fn(|input| {
                Ok(VNode::element("h2")
                    .with_attr("class", "bold-heading")
                    .with_child(VNode::text(input.prop_str("text").unwrap_or("").to_uppercase())))
            }),
        )
        .with_override(
            "bold",
            "two-column",
            renderer_fn(|input| {
                // columns swapped
                let mut slots = input.slot_nodes();
                slots.reverse();
                Ok(VNode::element("div").with_attr("class", "bold-columns").with_children(slots))
            }),
        )
}

#[test]
fn test_active_template_override_is_used() {
    let registry = standard_registry();
    let overrides = bold_template();
    let heading = block("t", "h2", json!({ "text": "Title" }));

    let plain = resolve(&heading, &ResolveContext::new(&registry, &overrides));
    let bold = resolve(&heading, &ResolveContext::new(&registry, &overrides).with_template("bold"));
    let other = resolve(&heading, &ResolveContext::new(&registry, &overrides).with_template("classic"));

    assert_eq!(plain.text_content(), "Title");
    assert_eq!(bold.text_content(), "TITLE");
    assert_eq!(bold.attr("class"), Some("bold-heading"));
    assert_eq!(other.text_content(), "Title");
}

#[test]
fn test_editing_and_public_choose_same_renderer() {
    let registry = standard_registry();
    let overrides = bold_template();
    let heading = block("t", "h2", json!({ "text": "Title" }));

    let public = resolve(&heading, &ResolveContext::new(&registry, &overrides).with_template("bold"));
    let editing = resolve(
        &heading,
        &ResolveContext::new(&registry, &overrides)
            .with_template("bold")
            .with_mode(RenderMode::Editing),
    );

    assert_eq!(public, editing);
}

#[test]
fn test_layout_override_receives_resolved_slots() {
    let registry = standard_registry();
    let overrides = bold_template();
    let layout = block("cols", "two-column", json!({})).with_columns(vec![
        ColumnContainer::new("left").with_blocks(vec![block("l", "h2", json!({ "text": "left" }))]),
        ColumnContainer::new("right").with_blocks(vec![block("r", "content", json!({ "text": "right" }))]),
    ]);

    let node = resolve(&layout, &ResolveContext::new(&registry, &overrides).with_template("bold"));

    assert_eq!(node.attr("class"), Some("bold-columns"));
    let order: Vec<_> = node.children().iter().filter_map(|s| s.attr("data-slot")).collect();
    assert_eq!(order, vec!["right", "left"]);
    // override applies to descendants too
    assert_eq!(node.find_block(&BlockId::new("l")).unwrap().text_content(), "LEFT");
}

#[test]
fn test_document_template_selects_overrides() {
    let registry = standard_registry();
    let overrides = bold_template();
    let mut doc = ContentDocument::new().with_page(
        "home",
        block("root", "page", json!({})).with_columns(vec![
            ColumnContainer::new("body").with_blocks(vec![block("t", "h2", json!({ "text": "Hi" }))]),
        ]),
    );
    doc.meta.template = Some("bold".to_string());

    let node = resolve_page(&doc, "home", &ResolveContext::new(&registry, &overrides)).unwrap();

    assert_eq!(node.find_block(&BlockId::new("t")).unwrap().text_content(), "HI");
}
