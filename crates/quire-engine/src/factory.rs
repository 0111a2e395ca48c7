//! # Document Factory
//!
//! Constructors that produce well-formed nodes. Every block constructor
//! assigns a freshly generated [`BlockId`], and container constructors
//! coerce their children into the kinds the container accepts, so the
//! result satisfies the tree invariants whatever it was given:
//!
//! - a non-`list_item` given to a list is wrapped in a `list_item`
//! - a non-row given to a table is wrapped in a row (and a cell)
//! - a non-cell given to a row is wrapped in a cell
//! - loose text in a flow container is grouped into a paragraph
//! - a table cell never ends up empty; it gets one empty paragraph
//!
//! ```
//! use quire_engine::factory::{bullet_list, paragraph, text};
//!
//! let list = bullet_list(vec![paragraph(vec![text("milk", []).into()]).into()]);
//! assert_eq!(list.content[0].as_node().unwrap().kind.name(), "list_item");
//! ```

use std::collections::HashSet;

use crate::models::{
    BlockId, Content, Document, ImageAttrs, Mark, MarkKind, Metadata, Node, NodeKind, Severity,
    TextNode, canonical_marks,
};

pub fn generate_block_id() -> BlockId {
    BlockId::generate()
}

fn block(kind: NodeKind, content: Vec<Content>) -> Node {
    let content = coerce_children(&kind, content);
    Node {
        id: Some(generate_block_id()),
        kind,
        metadata: Metadata::new(),
        content,
    }
}

pub fn text(value: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> TextNode {
    TextNode::with_marks(value, marks)
}

pub fn paragraph(content: Vec<Content>) -> Node {
    block(NodeKind::Paragraph, content)
}

/// Heading; `level` is clamped to 1..=6.
pub fn heading(level: u8, content: Vec<Content>) -> Node {
    block(
        NodeKind::Heading {
            level: level.clamp(1, 6),
        },
        content,
    )
}

pub fn bullet_list(items: Vec<Content>) -> Node {
    block(NodeKind::BulletList, items)
}

pub fn ordered_list(items: Vec<Content>) -> Node {
    block(NodeKind::OrderedList, items)
}

pub fn list_item(content: Vec<Content>) -> Node {
    block(NodeKind::ListItem, content)
}

pub fn table(rows: Vec<Content>, layout: bool) -> Node {
    block(NodeKind::Table { layout }, rows)
}

pub fn table_row(cells: Vec<Content>) -> Node {
    block(NodeKind::TableRow, cells)
}

pub fn table_cell(content: Vec<Content>) -> Node {
    spanning_cell(None, None, content)
}

pub fn spanning_cell(rowspan: Option<u32>, colspan: Option<u32>, content: Vec<Content>) -> Node {
    block(NodeKind::TableCell { rowspan, colspan }, content)
}

pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Node {
    image_with(ImageAttrs::new(src, alt))
}

pub fn image_with(attrs: ImageAttrs) -> Node {
    block(NodeKind::Image(attrs), Vec::new())
}

pub fn code_block(language: impl Into<String>, code: &str) -> Node {
    block(
        NodeKind::CodeBlock {
            language: language.into(),
        },
        vec![TextNode::new(code).into()],
    )
}

pub fn blockquote(content: Vec<Content>) -> Node {
    block(NodeKind::Blockquote, content)
}

pub fn horizontal_rule() -> Node {
    block(NodeKind::HorizontalRule, Vec::new())
}

pub fn callout(severity: Severity, content: Vec<Content>) -> Node {
    block(NodeKind::Callout { severity }, content)
}

/// Copy of `node` carrying `mark`, replacing any mark of the same kind.
pub fn add_mark(node: &TextNode, mark: Mark) -> TextNode {
    TextNode {
        text: node.text.clone(),
        marks: canonical_marks(node.marks.iter().cloned().chain([mark])),
    }
}

/// Copy of `node` without marks of `kind`.
pub fn remove_mark(node: &TextNode, kind: MarkKind) -> TextNode {
    TextNode {
        text: node.text.clone(),
        marks: node
            .marks
            .iter()
            .filter(|m| m.kind() != kind)
            .cloned()
            .collect(),
    }
}

/// Give `node` an identity if it lacks one. Children are left alone.
pub fn ensure_block_id(mut node: Node) -> Node {
    node.id.get_or_insert_with(generate_block_id);
    node
}

/// Give `node` and every block below it an identity where missing.
pub fn ensure_block_ids(mut node: Node) -> Node {
    backfill(&mut node);
    node
}

/// Give every block in the document a unique identity. Missing ids are
/// generated and repeats after the first occurrence are replaced.
///
/// Returns how many identities were generated.
pub fn ensure_document_ids(doc: &mut Document) -> usize {
    let mut taken = HashSet::new();
    doc.content
        .iter_mut()
        .map(|block| claim_block_ids(block, &mut taken))
        .sum()
}

fn backfill(node: &mut Node) -> usize {
    let mut generated = 0;
    if node.id.is_none() {
        node.id = Some(generate_block_id());
        generated += 1;
    }
    for child in &mut node.content {
        if let Content::Node(child) = child {
            generated += backfill(child);
        }
    }
    generated
}

/// Make every identity in `node` unique against `taken`, generating fresh
/// ones for missing or colliding identities. Claimed ids are added to `taken`.
///
/// Returns how many identities were generated.
pub(crate) fn claim_block_ids(node: &mut Node, taken: &mut HashSet<BlockId>) -> usize {
    let mut generated = 0;
    let needs_new = match &node.id {
        Some(id) => taken.contains(id),
        None => true,
    };
    if needs_new {
        node.id = Some(generate_block_id());
        generated += 1;
    }
    if let Some(id) = &node.id {
        taken.insert(id.clone());
    }
    for child in &mut node.content {
        if let Content::Node(child) = child {
            generated += claim_block_ids(child, taken);
        }
    }
    generated
}

/// Coerce `content` into children `kind` accepts.
pub fn coerce_children(kind: &NodeKind, content: Vec<Content>) -> Vec<Content> {
    match kind {
        k if k.is_leaf() => Vec::new(),
        NodeKind::CodeBlock { .. } => {
            let code: String = content.iter().map(content_text).collect();
            if code.is_empty() {
                Vec::new()
            } else {
                vec![TextNode::new(code).into()]
            }
        }
        k if k.is_textblock() => inline(content),
        k if k.is_list() => content
            .into_iter()
            .map(|child| match child {
                Content::Node(node) if node.kind == NodeKind::ListItem => Content::Node(node),
                other => list_item(vec![other]).into(),
            })
            .collect(),
        NodeKind::Table { .. } => content
            .into_iter()
            .map(|child| match child {
                Content::Node(node) if node.kind == NodeKind::TableRow => Content::Node(node),
                other => table_row(vec![other]).into(),
            })
            .collect(),
        NodeKind::TableRow => content
            .into_iter()
            .flat_map(|child| match child {
                Content::Node(node) if matches!(node.kind, NodeKind::TableCell { .. }) => {
                    vec![Content::Node(node)]
                }
                Content::Node(node) if node.kind == NodeKind::TableRow => node.content,
                other => vec![table_cell(vec![other]).into()],
            })
            .collect(),
        NodeKind::TableCell { .. } => {
            let mut blocks: Vec<Content> = flow(content).into_iter().map(Content::from).collect();
            if blocks.is_empty() {
                blocks.push(paragraph(Vec::new()).into());
            }
            blocks
        }
        _ => flow(content).into_iter().map(Content::from).collect(),
    }
}

/// Coerce content into blocks that may stand at the top level of a document.
pub fn coerce_top_level(content: Vec<Content>) -> Vec<Node> {
    flow(content)
}

/// Group loose text into paragraphs and wrap structural children in the
/// container they belong to.
fn flow(content: Vec<Content>) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut run: Vec<Content> = Vec::new();

    for child in content {
        match child {
            Content::Text(text) => run.push(text.into()),
            Content::Node(node) => {
                if !run.is_empty() {
                    blocks.push(paragraph(std::mem::take(&mut run)));
                }
                blocks.push(wrap_structural(node));
            }
        }
    }
    if !run.is_empty() {
        blocks.push(paragraph(run));
    }

    blocks
}

fn wrap_structural(node: Node) -> Node {
    match node.kind {
        NodeKind::ListItem => bullet_list(vec![node.into()]),
        NodeKind::TableRow | NodeKind::TableCell { .. } => table(vec![node.into()], false),
        _ => node,
    }
}

/// Flatten content to text leaves, tidied by [`normalize_text`].
fn inline(content: Vec<Content>) -> Vec<Content> {
    normalize_text(flatten(content))
        .into_iter()
        .map(Content::Text)
        .collect()
}

fn flatten(content: Vec<Content>) -> Vec<TextNode> {
    content
        .into_iter()
        .flat_map(|child| match child {
            Content::Text(text) => vec![text],
            Content::Node(node) => flatten(node.content),
        })
        .collect()
}

/// Join neighbouring leaves that carry identical marks and drop empty ones.
pub(crate) fn merge_text(leaves: impl IntoIterator<Item = TextNode>) -> Vec<TextNode> {
    let mut merged: Vec<TextNode> = Vec::new();
    for leaf in leaves {
        if leaf.text.is_empty() {
            continue;
        }
        if let Some(prev) = merged.last_mut()
            && prev.marks == leaf.marks
        {
            prev.text.push_str(&leaf.text);
        } else {
            merged.push(leaf);
        }
    }
    merged
}

/// Inline content in the shape it reads back from markup: merged as by
/// [`merge_text`], without blank leaves at either end.
pub(crate) fn normalize_text(leaves: impl IntoIterator<Item = TextNode>) -> Vec<TextNode> {
    let mut leaves = merge_text(leaves);
    let start = leaves
        .iter()
        .position(|t| !t.is_blank())
        .unwrap_or(leaves.len());
    leaves.drain(..start);
    while leaves.last().is_some_and(TextNode::is_blank) {
        leaves.pop();
    }
    leaves
}

fn content_text(content: &Content) -> String {
    match content {
        Content::Text(text) => text.text.clone(),
        Content::Node(node) => node.plain_text(),
    }
}
