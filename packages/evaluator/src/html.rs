//! HTML serialization for resolved node trees.

use crate::vdom::{NodeIdentity, PlaceholderReason, VNode};
use std::collections::BTreeMap;

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Emit `data-block-id` / `data-block-type` on block nodes
    pub identity_attributes: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
            identity_attributes: true,
        }
    }
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

struct Context<'o> {
    options: &'o HtmlOptions,
    depth: usize,
    buffer: String,
}

impl<'o> Context<'o> {
    fn new(options: &'o HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        self.add_indent();
        self.add(text);
        self.newline();
    }

    fn add_indent(&mut self) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.buffer.push_str(&self.options.indent);
            }
        }
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.buffer.push('\n');
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a node tree as an HTML fragment
pub fn to_html(node: &VNode, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    write_node(node, &mut ctx);
    ctx.get_output()
}

/// Serialize a resolved page as a complete HTML document
pub fn render_page_html(title: &str, body: &VNode, options: &HtmlOptions) -> String {
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.add_line(&format!("<title>{}</title>", escape_html(title)));
    ctx.dedent();
    ctx.add_line("</head>");

    ctx.add_line("<body>");
    ctx.indent();
    write_node(body, &mut ctx);
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");

    ctx.get_output()
}

fn write_node(node: &VNode, ctx: &mut Context<'_>) {
    match node {
        VNode::Element {
            tag,
            attributes,
            children,
            identity,
        } => write_element(tag, attributes, children, identity.as_ref(), ctx),

        VNode::Text { content } => {
            ctx.add_line(&escape_html(content));
        }

        VNode::Placeholder {
            reason,
            message,
            identity,
        } => {
            ctx.add_indent();
            ctx.add("<div class=\"tessera-placeholder\"");
            write_attribute("data-reason", reason_key(*reason), ctx);
            write_identity(identity.as_ref(), ctx);
            ctx.add(">");
            ctx.add(&escape_html(message));
            ctx.add("</div>");
            ctx.newline();
        }
    }
}

fn write_element(
    tag: &str,
    attributes: &BTreeMap<String, String>,
    children: &[VNode],
    identity: Option<&NodeIdentity>,
    ctx: &mut Context<'_>,
) {
    ctx.add_indent();
    ctx.add(&format!("<{}", tag));
    for (name, value) in attributes {
        write_attribute(name, value, ctx);
    }
    write_identity(identity, ctx);

    if children.is_empty() && is_self_closing(tag) {
        ctx.add(" />");
        ctx.newline();
        return;
    }

    ctx.add(">");

    // Text-only content stays on the tag's line
    if children.iter().all(|c| matches!(c, VNode::Text { .. })) {
        for child in children {
            if let VNode::Text { content } = child {
                ctx.add(&escape_html(content));
            }
        }
    } else {
        ctx.newline();
        ctx.indent();
        for child in children {
            write_node(child, ctx);
        }
        ctx.dedent();
        ctx.add_indent();
    }

    ctx.add(&format!("</{}>", tag));
    ctx.newline();
}

fn write_attribute(name: &str, value: &str, ctx: &mut Context<'_>) {
    ctx.add(&format!(" {}=\"{}\"", name, escape_html(value)));
}

fn write_identity(identity: Option<&NodeIdentity>, ctx: &mut Context<'_>) {
    if !ctx.options.identity_attributes {
        return;
    }
    if let Some(identity) = identity {
        write_attribute("data-block-id", identity.block_id.as_str(), ctx);
        write_attribute("data-block-type", &identity.block_type, ctx);
    }
}

fn reason_key(reason: PlaceholderReason) -> &'static str {
    match reason {
        PlaceholderReason::UnsupportedType => "unsupported_type",
        PlaceholderReason::RenderFailed => "render_failed",
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_blocks::BlockId;

    #[test]
    fn test_escapes_text_and_attributes() {
        let node = VNode::element("a")
            .with_attr("href", "/?q=\"x\"&y")
            .with_child(VNode::text("<b>bold</b>"));

        let html = to_html(&node, &HtmlOptions::compact());
        assert_eq!(
            html,
            "<a href=\"/?q=&quot;x&quot;&amp;y\">&lt;b&gt;bold&lt;/b&gt;</a>"
        );
    }

    #[test]
    fn test_identity_attributes() {
        let node = VNode::element("img")
            .with_attr("src", "/a.png")
            .with_identity(NodeIdentity {
                block_id: BlockId::new("img-1"),
                block_type: "image".to_string(),
            });

        let html = to_html(&node, &HtmlOptions::compact());
        assert_eq!(
            html,
            "<img src=\"/a.png\" data-block-id=\"img-1\" data-block-type=\"image\" />"
        );

        let bare = HtmlOptions {
            identity_attributes: false,
            ..HtmlOptions::compact()
        };
        assert_eq!(to_html(&node, &bare), "<img src=\"/a.png\" />");
    }

    #[test]
    fn test_placeholder_markup() {
        let node = VNode::placeholder(PlaceholderReason::UnsupportedType, "Unsupported block type: quote");
        let html = to_html(&node, &HtmlOptions::compact());
        assert_eq!(
            html,
            "<div class=\"tessera-placeholder\" data-reason=\"unsupported_type\">Unsupported block type: quote</div>"
        );
    }

    #[test]
    fn test_pretty_nesting() {
        let node = VNode::element("section").with_child(VNode::element("p").with_child(VNode::text("Hi")));
        let html = to_html(&node, &HtmlOptions::default());
        assert_eq!(html, "<section>\n  <p>Hi</p>\n</section>\n");
    }

    #[test]
    fn test_page_document() {
        let html = render_page_html("Home & Away", &VNode::element("main"), &HtmlOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Home &amp; Away</title>"));
        assert!(html.contains("    <main></main>\n"));
    }
}
