use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessera_blocks::{BlockId, BlockInstance};

/// Renderable node tree produced by the composition resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// Block identity for tooling (scroll-into-view, selection). Never
        /// read by rendering logic.
        #[serde(skip_serializing_if = "Option::is_none")]
        identity: Option<NodeIdentity>,
    },

    /// Text node
    Text { content: String },

    /// Stand-in for a block that could not be rendered. Siblings and the
    /// rest of the page render normally.
    Placeholder {
        reason: PlaceholderReason,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        identity: Option<NodeIdentity>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub block_id: BlockId,
    pub block_type: String,
}

impl NodeIdentity {
    pub fn of(instance: &BlockInstance) -> Self {
        Self {
            block_id: instance.id.clone(),
            block_type: instance.block_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    /// No template override and no registry entry for the block type
    UnsupportedType,
    /// The block's renderer returned an error or panicked
    RenderFailed,
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            identity: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn placeholder(reason: PlaceholderReason, message: impl Into<String>) -> Self {
        VNode::Placeholder {
            reason,
            message: message.into(),
            identity: None,
        }
    }

    /// Structurally valid column slot, possibly empty
    pub fn slot(name: &str, children: Vec<VNode>) -> Self {
        VNode::element("div")
            .with_attr("class", "tessera-slot")
            .with_attr("data-slot", name)
            .with_children(children)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    /// Attach block identity. Bare text is wrapped so the identity has an
    /// element to live on.
    pub fn with_identity(self, new_identity: NodeIdentity) -> Self {
        match self {
            VNode::Element {
                tag,
                attributes,
                children,
                ..
            } => VNode::Element {
                tag,
                attributes,
                children,
                identity: Some(new_identity),
            },
            VNode::Placeholder {
                reason, message, ..
            } => VNode::Placeholder {
                reason,
                message,
                identity: Some(new_identity),
            },
            text @ VNode::Text { .. } => VNode::element("div")
                .with_child(text)
                .with_identity(new_identity),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn identity(&self) -> Option<&NodeIdentity> {
        match self {
            VNode::Element { identity, .. } | VNode::Placeholder { identity, .. } => {
                identity.as_ref()
            }
            VNode::Text { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, VNode::Placeholder { .. })
    }

    /// Slot element by name among this node's descendants
    pub fn find_slot(&self, name: &str) -> Option<&VNode> {
        if self.attr("data-slot") == Some(name) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_slot(name))
    }

    /// Node carrying the given block identity
    pub fn find_block(&self, id: &BlockId) -> Option<&VNode> {
        if self.identity().map(|i| &i.block_id) == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_block(id))
    }

    /// Top-level block nodes under this node: descends through plain
    /// markup and stops at the first node carrying an identity.
    pub fn block_children(&self) -> Vec<&VNode> {
        let mut found = Vec::new();
        for child in self.children() {
            collect_blocks(child, &mut found);
        }
        found
    }

    /// Every placeholder in the subtree, in document order
    pub fn placeholders(&self) -> Vec<&VNode> {
        let mut found = Vec::new();
        collect_placeholders(self, &mut found);
        found
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content } => content.clone(),
            VNode::Placeholder { message, .. } => message.clone(),
            VNode::Element { children, .. } => {
                children.iter().map(VNode::text_content).collect()
            }
        }
    }
}

fn collect_blocks<'a>(node: &'a VNode, found: &mut Vec<&'a VNode>) {
    if node.identity().is_some() {
        found.push(node);
        return;
    }
    for child in node.children() {
        collect_blocks(child, found);
    }
}

fn collect_placeholders<'a>(node: &'a VNode, found: &mut Vec<&'a VNode>) {
    if node.is_placeholder() {
        found.push(node);
    }
    for child in node.children() {
        collect_placeholders(child, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_identity_is_wrapped() {
        let identity = NodeIdentity {
            block_id: BlockId::new("b1"),
            block_type: "content".to_string(),
        };
        let node = VNode::text("hello").with_identity(identity.clone());

        assert_eq!(node.tag(), Some("div"));
        assert_eq!(node.identity(), Some(&identity));
        assert_eq!(node.text_content(), "hello");
    }

    #[test]
    fn test_block_children_stop_at_identity() {
        let inner = VNode::element("p")
            .with_child(VNode::text("x"))
            .with_identity(NodeIdentity {
                block_id: BlockId::new("p1"),
                block_type: "content".to_string(),
            });
        let tree = VNode::element("div").with_child(VNode::slot("main", vec![inner]));

        let blocks = tree.block_children();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tag(), Some("p"));
        assert!(tree.find_slot("main").is_some());
        assert!(tree.find_block(&BlockId::new("p1")).is_some());
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let node = VNode::placeholder(PlaceholderReason::UnsupportedType, "Unsupported block type: quote");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Placeholder");
        assert_eq!(json["reason"], "unsupported_type");
    }
}
