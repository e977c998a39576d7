//! Standard block set: page root, headings, text, media and column layouts,
//! plus the presentation templates that restyle some of them.

use crate::adapters::{FlattenImage, InheritTheme};
use crate::override_resolution::TemplateOverrides;
use crate::registry::{
    renderer_fn, BlockDescriptor, BlockModule, BlockRegistry, EditorSchema, FieldKind,
    RenderError, RenderInput,
};
use crate::vdom::VNode;
use serde_json::{json, Value};

pub struct StandardBlocks;

impl BlockModule for StandardBlocks {
    fn name(&self) -> &str {
        "standard"
    }

    fn register(&self, registry: &mut BlockRegistry) {
        registry.register(page());
        for level in ["h1", "h2", "h3"] {
            registry.register(heading(level));
        }
        registry.register(content());
        registry.register(image());
        registry.register(button());
        registry.register(spacer());
        registry.register(columns("two-column", "Two columns", &["left", "right"]));
        registry.register(columns(
            "three-column",
            "Three columns",
            &["column1", "column2", "column3"],
        ));
        registry.register(columns(
            "four-column",
            "Four columns",
            &["column1", "column2", "column3", "column4"],
        ));
    }
}

/// Registry pre-populated with the standard set
pub fn standard_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();
    registry.install(&StandardBlocks);
    registry
}

/// Template keys shipped by [`standard_templates`]
pub const CLASSIC_TEMPLATE: &str = "classic";
pub const BOLD_TEMPLATE: &str = "bold";

/// Overrides for the standard set.
///
/// - `classic`: headings sit in a `<header>` with a rule below
/// - `bold`: uppercase headings, buttons and column layouts get a bold variant
pub fn standard_templates() -> TemplateOverrides {
    let mut overrides = TemplateOverrides::new();

    for level in ["h1", "h2", "h3"] {
        overrides.insert(
            CLASSIC_TEMPLATE,
            level,
            renderer_fn(move |input| {
                let heading = VNode::element(level).with_child(VNode::text(input.prop_str("text").unwrap_or("")));
                let node = VNode::element("header")
                    .with_attr("class", "tessera-classic-heading")
                    .with_child(heading)
                    .with_child(VNode::element("hr"));
                Ok(with_theme(node, input))
            }),
        );

        overrides.insert(
            BOLD_TEMPLATE,
            level,
            renderer_fn(move |input| {
                let text = input.prop_str("text").unwrap_or("").to_uppercase();
                let node = VNode::element(level)
                    .with_attr("class", "tessera-bold-heading")
                    .with_child(VNode::element("strong").with_child(VNode::text(text)));
                Ok(with_theme(node, input))
            }),
        );
    }

    overrides.insert(
        BOLD_TEMPLATE,
        "button",
        renderer_fn(|input| {
            let label = input.require_str("label")?;
            Ok(VNode::element("a")
                .with_attr("class", "tessera-button tessera-button-bold")
                .with_attr("href", input.prop_str("href").unwrap_or("#"))
                .with_child(VNode::element("strong").with_child(VNode::text(label))))
        }),
    );

    for block_type in ["two-column", "three-column", "four-column"] {
        overrides.insert(
            BOLD_TEMPLATE,
            block_type,
            renderer_fn(|input| {
                let slots = input.slot_nodes();
                let node = VNode::element("section")
                    .with_attr(
                        "class",
                        format!("tessera-columns tessera-columns-{} tessera-columns-bold", slots.len()),
                    )
                    .with_children(slots);
                Ok(with_theme(node, input))
            }),
        );
    }

    overrides
}

fn theme_options() -> FieldKind {
    FieldKind::Select {
        options: vec!["light".to_string(), "dark".to_string()],
    }
}

fn with_theme(node: VNode, input: &RenderInput<'_>) -> VNode {
    match input.prop_str("theme").filter(|t| !t.is_empty()) {
        Some(theme) => node.with_attr("data-theme", theme),
        None => node,
    }
}

fn page() -> BlockDescriptor {
    BlockDescriptor::from_fn("page", |input| {
        let mut node = VNode::element("main")
            .with_attr("class", "tessera-page")
            .with_children(input.slot_nodes());
        if let Some(title) = input.prop_str("title") {
            node = node.with_attr("aria-label", title);
        }
        Ok(with_theme(node, input))
    })
    .with_label("Page")
    .with_category("layout")
    .with_layout(&["body"])
    .with_editor(
        EditorSchema::new()
            .field("title", "Title", FieldKind::Text)
            .field("theme", "Theme", theme_options()),
    )
}

fn heading(level: &'static str) -> BlockDescriptor {
    BlockDescriptor::from_fn(level, move |input| {
        let node = VNode::element(level).with_child(VNode::text(input.prop_str("text").unwrap_or("")));
        Ok(with_theme(node, input))
    })
    .with_label(format!("Heading {}", &level[1..]))
    .with_icon("heading")
    .with_category("text")
    .with_default_data(json!({ "text": "Heading" }))
    .with_adapter(InheritTheme)
    .with_editor(
        EditorSchema::new()
            .field("text", "Text", FieldKind::Text)
            .field("theme", "Theme", theme_options()),
    )
}

fn content() -> BlockDescriptor {
    BlockDescriptor::from_fn("content", |input| {
        let text = input.prop_str("text").unwrap_or("");
        let paragraphs = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| VNode::element("p").with_child(VNode::text(p)))
            .collect();

        Ok(VNode::element("div")
            .with_attr("class", "tessera-content")
            .with_children(paragraphs))
    })
    .with_label("Text")
    .with_icon("paragraph")
    .with_category("text")
    .with_default_data(json!({ "text": "" }))
    .with_editor(EditorSchema::new().field("text", "Text", FieldKind::RichText))
}

fn image() -> BlockDescriptor {
    BlockDescriptor::from_fn("image", |input| {
        let src = input.require_str("src")?;
        if src.is_empty() {
            return Ok(VNode::element("figure").with_attr("class", "tessera-image-empty"));
        }
        let img = VNode::element("img")
            .with_attr("src", src)
            .with_attr("alt", input.prop_str("alt").unwrap_or(""));

        Ok(match input.prop_str("caption").filter(|c| !c.is_empty()) {
            Some(caption) => VNode::element("figure")
                .with_child(img)
                .with_child(VNode::element("figcaption").with_child(VNode::text(caption))),
            None => img,
        })
    })
    .with_label("Image")
    .with_icon("image")
    .with_category("media")
    .with_default_data(json!({ "image": { "src": "", "alt": "" } }))
    .with_adapter(FlattenImage)
    .with_editor(
        EditorSchema::new()
            .field("image", "Image", FieldKind::Image)
            .field("alt", "Alt text", FieldKind::Text)
            .field("caption", "Caption", FieldKind::Text),
    )
}

fn button() -> BlockDescriptor {
    BlockDescriptor::from_fn("button", |input| {
        let label = input.require_str("label")?;
        Ok(VNode::element("a")
            .with_attr("class", "tessera-button")
            .with_attr("href", input.prop_str("href").unwrap_or("#"))
            .with_child(VNode::text(label)))
    })
    .with_label("Button")
    .with_icon("link")
    .with_category("media")
    .with_default_data(json!({ "label": "Learn more", "href": "#" }))
    .with_editor(
        EditorSchema::new()
            .field("label", "Label", FieldKind::Text)
            .field("href", "Link", FieldKind::Text),
    )
}

fn spacer() -> BlockDescriptor {
    BlockDescriptor::from_fn("spacer", |input| {
        let height = match input.prop("height") {
            None | Some(Value::Null) => 32,
            Some(value) => value.as_u64().ok_or_else(|| RenderError::InvalidField {
                field: "height".to_string(),
                message: "expected a non-negative integer".to_string(),
            })?,
        };

        Ok(VNode::element("div")
            .with_attr("class", "tessera-spacer")
            .with_attr("style", format!("height: {}px", height)))
    })
    .with_label("Spacer")
    .with_category("layout")
    .with_default_data(json!({ "height": 32 }))
}

fn columns(block_type: &str, label: &str, slots: &[&str]) -> BlockDescriptor {
    let count = slots.len();
    BlockDescriptor::from_fn(block_type, move |input| {
        let node = VNode::element("div")
            .with_attr("class", format!("tessera-columns tessera-columns-{}", count))
            .with_children(input.slot_nodes());
        Ok(with_theme(node, input))
    })
    .with_label(label)
    .with_icon("columns")
    .with_category("layout")
    .with_layout(slots)
    .with_editor(EditorSchema::new().field("theme", "Theme", theme_options()))
}
