use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::block_id::BlockId;
use super::mark::{Mark, MarkKind, canonical_marks};

/// Free-form per-node data, round-tripped through `data-meta-*` attributes.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Severity of a callout box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Safety,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Safety => "safety",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warning" => Ok(Severity::Warning),
            "safety" => Ok(Severity::Safety),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown callout severity: {other}")),
        }
    }
}

/// Attributes of an image node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Width as written in the markup (`"320"`, `"50%"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl ImageAttrs {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            ..Self::default()
        }
    }
}

/// The closed set of block kinds together with their typed attributes.
///
/// The document root is [`Document`](super::Document) itself and has no kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Heading {
        level: u8,
    },
    BulletList,
    OrderedList,
    ListItem,
    Table {
        /// Layout tables position content and render without borders
        #[serde(default)]
        layout: bool,
    },
    TableRow,
    TableCell {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rowspan: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        colspan: Option<u32>,
    },
    Image(ImageAttrs),
    CodeBlock {
        #[serde(default)]
        language: String,
    },
    Blockquote,
    HorizontalRule,
    Callout {
        severity: Severity,
    },
}

impl NodeKind {
    /// Kind name as used in logs, JSON and validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::BulletList => "bullet_list",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::ListItem => "list_item",
            NodeKind::Table { .. } => "table",
            NodeKind::TableRow => "table_row",
            NodeKind::TableCell { .. } => "table_cell",
            NodeKind::Image(_) => "image",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::Blockquote => "blockquote",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::Callout { .. } => "callout",
        }
    }

    /// Leaf kinds never have content.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Image(_) | NodeKind::HorizontalRule)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::BulletList | NodeKind::OrderedList)
    }

    /// Textblocks hold inline text only.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::Callout { .. }
        )
    }

    /// Flow containers hold a sequence of ordinary blocks.
    pub fn is_flow_container(&self) -> bool {
        matches!(
            self,
            NodeKind::ListItem | NodeKind::TableCell { .. } | NodeKind::Blockquote
        )
    }

    /// Kinds that may only appear inside a specific parent.
    pub fn is_structural_child(&self) -> bool {
        matches!(
            self,
            NodeKind::ListItem | NodeKind::TableRow | NodeKind::TableCell { .. }
        )
    }

    /// Whether `child` is allowed directly in this node's content.
    pub fn accepts(&self, child: &Content) -> bool {
        match (self, child) {
            (kind, _) if kind.is_leaf() => false,
            (NodeKind::CodeBlock { .. }, Content::Text(text)) => text.marks.is_empty(),
            (kind, Content::Text(_)) => kind.is_textblock(),
            (kind, Content::Node(node)) if kind.is_list() => node.kind == NodeKind::ListItem,
            (NodeKind::Table { .. }, Content::Node(node)) => node.kind == NodeKind::TableRow,
            (NodeKind::TableRow, Content::Node(node)) => {
                matches!(node.kind, NodeKind::TableCell { .. })
            }
            (kind, Content::Node(node)) => {
                kind.is_flow_container() && !node.kind.is_structural_child()
            }
        }
    }

    /// Whether two kinds are the same variant, ignoring attributes.
    pub fn same_variant(&self, other: &NodeKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A text leaf: literal text plus a set of marks in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Build a text node, deduplicating and ordering `marks`.
    pub fn with_marks(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: canonical_marks(marks),
        }
    }

    pub fn has_mark(&self, kind: MarkKind) -> bool {
        self.marks.iter().any(|m| m.kind() == kind)
    }

    pub fn mark(&self, kind: MarkKind) -> Option<&Mark> {
        self.marks.iter().find(|m| m.kind() == kind)
    }

    /// Length in characters, the unit selection offsets count in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A child of a block node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Node(Node),
    Text(TextNode),
}

impl Content {
    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Content::Node(_))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Content::Text(text) => Some(text),
            Content::Node(_) => None,
        }
    }
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<TextNode> for Content {
    fn from(text: TextNode) -> Self {
        Content::Text(text)
    }
}

/// A block node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlockId>,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Content>,
}

impl Node {
    /// A node without identity; see `factory` for constructors that assign one.
    pub fn new(kind: NodeKind, content: Vec<Content>) -> Self {
        Self {
            id: None,
            kind,
            metadata: Metadata::new(),
            content,
        }
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Concatenated text of every leaf below this node.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.content, &mut out);
        out
    }
}

fn collect_text(content: &[Content], out: &mut String) {
    for child in content {
        match child {
            Content::Text(text) => out.push_str(&text.text),
            Content::Node(node) => collect_text(&node.content, out),
        }
    }
}
