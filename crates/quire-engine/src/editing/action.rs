use serde::{Deserialize, Serialize};

use super::selection::Selection;
use crate::models::{BlockId, Mark, Node, NodeKind, Path};

/// One atomic edit intent.
///
/// Actions are plain data so they can be queued, logged and read from JSON:
///
/// ```
/// use quire_engine::editing::Action;
///
/// let action: Action =
///     serde_json::from_str(r#"{"type": "delete_block", "block_id": "blk-1"}"#).unwrap();
/// assert!(matches!(action, Action::DeleteBlock { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Add `mark` over the selection, or remove its kind when every selected
    /// segment already carries it.
    ToggleMark { mark: Mark, selection: Selection },
    /// Convert a block to another kind, or replace the attributes of a block
    /// of the same kind.
    SetBlockType { block_id: BlockId, kind: NodeKind },
    /// Insert `node` relative to a block, or at the end of the document.
    InsertBlock {
        node: Node,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<BlockPosition>,
    },
    DeleteBlock { block_id: BlockId },
    /// Replace the text of the leaf at `path` below the block. An empty text
    /// removes the leaf.
    UpdateText {
        block_id: BlockId,
        path: Path,
        text: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::ToggleMark { .. } => "toggle_mark",
            Action::SetBlockType { .. } => "set_block_type",
            Action::InsertBlock { .. } => "insert_block",
            Action::DeleteBlock { .. } => "delete_block",
            Action::UpdateText { .. } => "update_text",
        }
    }
}

/// Where an inserted block goes, relative to a reference block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "at", content = "block_id", rename_all = "snake_case")]
pub enum BlockPosition {
    Before(BlockId),
    After(BlockId),
    /// Appended as the last child of the reference block.
    Child(BlockId),
}

impl BlockPosition {
    pub fn reference(&self) -> &BlockId {
        match self {
            BlockPosition::Before(id) | BlockPosition::After(id) | BlockPosition::Child(id) => id,
        }
    }
}
