use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::block_id::BlockId;
use super::mark::MarkKind;
use super::node::{Content, Node, TextNode};

/// Format version written into every document.
pub const DOCUMENT_VERSION: u32 = 1;

/// Child-index address of a node or text leaf, starting at the top-level
/// block list. `[2, 0, 1]` is the second child of the first child of the
/// third top-level block.
pub type Path = Vec<usize>;

/// The root of a document tree.
///
/// Documents are plain values. Edits produce a new `Document` which the
/// session swaps in whole, so a failed edit can never leave a half-applied
/// tree behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            content,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Path of the block carrying `id`.
    pub fn find(&self, id: &BlockId) -> Option<Path> {
        self.nodes()
            .into_iter()
            .find(|(_, node)| node.id.as_ref() == Some(id))
            .map(|(path, _)| path)
    }

    /// Block at `path`, `None` if the path is empty, out of range or ends on text.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get(*first)?;
        for &index in rest {
            node = node.content.get(index)?.as_node()?;
        }
        Some(node)
    }

    pub(crate) fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.content.get_mut(*first)?;
        for &index in rest {
            node = match node.content.get_mut(index)? {
                Content::Node(child) => child,
                Content::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Child content at a nested path.
    ///
    /// Top-level entries are blocks rather than content, so paths shorter
    /// than two return `None`; use [`Document::node_at`] for those.
    pub fn content_at(&self, path: &[usize]) -> Option<&Content> {
        let (last, parent) = path.split_last()?;
        self.node_at(parent)?.content.get(*last)
    }

    pub fn text_at(&self, path: &[usize]) -> Option<&TextNode> {
        self.content_at(path)?.as_text()
    }

    /// Every block in document order (pre-order) with its path.
    pub fn nodes(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        for (index, node) in self.content.iter().enumerate() {
            walk_nodes(node, vec![index], &mut out);
        }
        out
    }

    /// Every text leaf in document order with its path.
    pub fn text_leaves(&self) -> Vec<(Path, &TextNode)> {
        let mut out = Vec::new();
        for (index, node) in self.content.iter().enumerate() {
            walk_leaves(node, vec![index], &mut out);
        }
        out
    }

    /// Block identities in document order, skipping blocks without one.
    pub fn block_ids(&self) -> Vec<&BlockId> {
        self.nodes()
            .into_iter()
            .filter_map(|(_, node)| node.id.as_ref())
            .collect()
    }

    /// Check the tree invariants.
    ///
    /// Returns every violation found; an empty list means the document is
    /// well formed. Violations are reported, never raised.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for (index, node) in self.content.iter().enumerate() {
            if node.kind.is_structural_child() {
                violations.push(Violation::InvalidChild {
                    path: vec![index],
                    parent: "document",
                    child: node.kind.name().to_string(),
                });
            }
        }

        for (path, node) in self.nodes() {
            match &node.id {
                None => violations.push(Violation::MissingBlockId { path: path.clone() }),
                Some(id) => {
                    if !seen.insert(id) {
                        violations.push(Violation::DuplicateBlockId { id: id.clone() });
                    }
                }
            }

            for (index, child) in node.content.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(index);

                if !node.kind.accepts(child) {
                    let child_name = match child {
                        Content::Node(n) => n.kind.name().to_string(),
                        Content::Text(_) => "text".to_string(),
                    };
                    violations.push(Violation::InvalidChild {
                        path: child_path.clone(),
                        parent: node.kind.name(),
                        child: child_name,
                    });
                }

                if let Content::Text(text) = child
                    && let Some(kind) = duplicate_mark(text)
                {
                    violations.push(Violation::DuplicateMark {
                        path: child_path,
                        kind,
                    });
                }
            }
        }

        violations
    }
}

fn walk_nodes<'a>(node: &'a Node, path: Path, out: &mut Vec<(Path, &'a Node)>) {
    out.push((path.clone(), node));
    for (index, child) in node.content.iter().enumerate() {
        if let Content::Node(child) = child {
            let mut child_path = path.clone();
            child_path.push(index);
            walk_nodes(child, child_path, out);
        }
    }
}

fn walk_leaves<'a>(node: &'a Node, path: Path, out: &mut Vec<(Path, &'a TextNode)>) {
    for (index, child) in node.content.iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(index);
        match child {
            Content::Text(text) => out.push((child_path, text)),
            Content::Node(child) => walk_leaves(child, child_path, out),
        }
    }
}

fn duplicate_mark(text: &TextNode) -> Option<MarkKind> {
    let mut seen = HashSet::new();
    text.marks
        .iter()
        .map(|m| m.kind())
        .find(|kind| !seen.insert(*kind))
}

/// A broken tree invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("block at {path:?} has no identity")]
    MissingBlockId { path: Path },
    #[error("block identity {id} is used more than once")]
    DuplicateBlockId { id: BlockId },
    #[error("{parent} cannot contain {child} (at {path:?})")]
    InvalidChild {
        path: Path,
        parent: &'static str,
        child: String,
    },
    #[error("text at {path:?} carries more than one {kind} mark")]
    DuplicateMark { path: Path, kind: MarkKind },
}
