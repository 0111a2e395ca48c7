//! Pure application of [`Action`]s to a [`Document`].
//!
//! Every action is computed against a copy of the document. The copy is
//! only returned when the whole action succeeded, so a rejected action can
//! never leave a half-edited tree behind.

use std::collections::{BTreeSet, HashSet};

use super::action::{Action, BlockPosition};
use super::selection::Selection;
use crate::factory::{self, claim_block_ids, coerce_children, coerce_top_level};
use crate::models::{BlockId, Content, Document, Mark, Node, NodeKind, Path, TextNode};

/// Why an action could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("no block with id {0}")]
    UnknownBlock(BlockId),
    #[error("selection does not address text in the document")]
    InvalidSelection,
    #[error("selection covers no markable text")]
    EmptySelection,
    #[error("cannot convert {from} to {to}")]
    UnsupportedConversion {
        from: &'static str,
        to: &'static str,
    },
    #[error("{0} blocks cannot take child blocks")]
    InvalidTarget(&'static str),
    #[error("no text leaf at {path:?} in block {block_id}")]
    InvalidPath { block_id: BlockId, path: Path },
}

/// Apply `action`, returning the unchanged document when it does not apply.
///
/// Unknown block ids, stale paths and unsupported conversions are not
/// errors at this level; they are logged and ignored.
pub fn apply(doc: &Document, action: &Action) -> Document {
    match try_apply(doc, action) {
        Ok(next) => next,
        Err(e) => {
            log::debug!("ignoring {} action: {e}", action.name());
            doc.clone()
        }
    }
}

/// Apply `action`, reporting why it did not apply.
pub fn try_apply(doc: &Document, action: &Action) -> Result<Document, ApplyError> {
    let mut next = doc.clone();
    match action {
        Action::ToggleMark { mark, selection } => toggle_mark(&mut next, mark, selection)?,
        Action::SetBlockType { block_id, kind } => set_block_type(&mut next, block_id, kind)?,
        Action::InsertBlock { node, position } => {
            insert_block(&mut next, node.clone(), position.as_ref())?
        }
        Action::DeleteBlock { block_id } => delete_block(&mut next, block_id)?,
        Action::UpdateText {
            block_id,
            path,
            text,
        } => update_text(&mut next, block_id, path, text)?,
    }
    Ok(next)
}

fn locate(doc: &Document, id: &BlockId) -> Result<Path, ApplyError> {
    doc.find(id).ok_or_else(|| ApplyError::UnknownBlock(id.clone()))
}

/// One selected slice of a text leaf, in chars.
struct Segment {
    path: Path,
    from: usize,
    to: usize,
}

fn toggle_mark(doc: &mut Document, mark: &Mark, selection: &Selection) -> Result<(), ApplyError> {
    if selection.is_collapsed() {
        return Err(ApplyError::EmptySelection);
    }
    let (start, end) = selection.ordered();
    for position in [start, end] {
        let leaf = doc
            .text_at(&position.path)
            .ok_or(ApplyError::InvalidSelection)?;
        if position.offset > leaf.char_len() {
            return Err(ApplyError::InvalidSelection);
        }
    }

    let kind = mark.kind();
    let segments: Vec<Segment> = doc
        .text_leaves()
        .into_iter()
        .filter(|(path, _)| *path >= start.path && *path <= end.path)
        .filter(|(path, _)| {
            // Code blocks only hold unmarked text
            !matches!(
                doc.node_at(&path[..path.len() - 1]).map(|n| &n.kind),
                Some(NodeKind::CodeBlock { .. })
            )
        })
        .map(|(path, leaf)| {
            let from = if path == start.path { start.offset } else { 0 };
            let to = if path == end.path {
                end.offset
            } else {
                leaf.char_len()
            };
            Segment { path, from, to }
        })
        .filter(|s| s.from < s.to)
        .collect();

    if segments.is_empty() {
        return Err(ApplyError::EmptySelection);
    }

    let remove = segments.iter().all(|s| {
        doc.text_at(&s.path)
            .is_some_and(|leaf| leaf.has_mark(kind))
    });

    // Back to front so splitting a leaf never shifts a path still to visit
    let mut parents = BTreeSet::new();
    for segment in segments.iter().rev() {
        let Some((index, parent_path)) = segment.path.split_last() else {
            continue;
        };
        let Some(parent) = doc.node_at_mut(parent_path) else {
            continue;
        };
        let Some(Content::Text(leaf)) = parent.content.get(*index).cloned() else {
            continue;
        };

        let (before, middle, after) = split_chars(&leaf.text, segment.from, segment.to);
        let middle = TextNode {
            text: middle,
            marks: leaf.marks.clone(),
        };
        let middle = if remove {
            factory::remove_mark(&middle, kind)
        } else {
            factory::add_mark(&middle, mark.clone())
        };

        let pieces = [
            TextNode {
                text: before,
                marks: leaf.marks.clone(),
            },
            middle,
            TextNode {
                text: after,
                marks: leaf.marks,
            },
        ]
        .into_iter()
        .filter(|t| !t.text.is_empty())
        .map(Content::Text);

        parent.content.splice(*index..=*index, pieces);
        parents.insert(parent_path.to_vec());
    }

    for parent_path in parents {
        if let Some(parent) = doc.node_at_mut(&parent_path) {
            merge_adjacent_text(&mut parent.content);
        }
    }
    Ok(())
}

/// Split `text` at two char offsets.
fn split_chars(text: &str, from: usize, to: usize) -> (String, String, String) {
    let byte = |chars: usize| {
        text.char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let (from, to) = (byte(from), byte(to));
    (
        text[..from].to_string(),
        text[from..to].to_string(),
        text[to..].to_string(),
    )
}

/// Join neighbouring text leaves that carry identical marks.
fn merge_adjacent_text(content: &mut Vec<Content>) {
    // Textblocks hold only text; anything else is left as it is
    if !content.iter().all(Content::is_text) {
        return;
    }
    let leaves = std::mem::take(content).into_iter().filter_map(|c| match c {
        Content::Text(text) => Some(text),
        Content::Node(_) => None,
    });
    *content = factory::merge_text(leaves)
        .into_iter()
        .map(Content::Text)
        .collect();
}

fn set_block_type(doc: &mut Document, id: &BlockId, kind: &NodeKind) -> Result<(), ApplyError> {
    let path = locate(doc, id)?;
    let node = doc
        .node_at_mut(&path)
        .ok_or_else(|| ApplyError::UnknownBlock(id.clone()))?;

    let kind = match kind {
        NodeKind::Heading { level } => NodeKind::Heading {
            level: (*level).clamp(1, 6),
        },
        other => other.clone(),
    };

    if node.kind.same_variant(&kind) {
        node.kind = kind;
    } else if node.kind.is_textblock() && kind.is_textblock() {
        let content = std::mem::take(&mut node.content);
        node.content = coerce_children(&kind, content);
        node.kind = kind;
    } else if node.kind.is_list() && kind.is_list() {
        node.kind = kind;
    } else {
        return Err(ApplyError::UnsupportedConversion {
            from: node.kind.name(),
            to: kind.name(),
        });
    }
    Ok(())
}

fn insert_block(
    doc: &mut Document,
    mut node: Node,
    position: Option<&BlockPosition>,
) -> Result<(), ApplyError> {
    let content = std::mem::take(&mut node.content);
    node.content = coerce_children(&node.kind, content);

    let mut taken: HashSet<BlockId> = doc.block_ids().into_iter().cloned().collect();
    claim_block_ids(&mut node, &mut taken);

    let Some(position) = position else {
        doc.content.extend(coerce_top_level(vec![node.into()]));
        return Ok(());
    };

    let path = locate(doc, position.reference())?;

    if let BlockPosition::Child(id) = position {
        let target = doc
            .node_at_mut(&path)
            .ok_or_else(|| ApplyError::UnknownBlock(id.clone()))?;
        if target.kind.is_leaf() || target.kind.is_textblock() {
            return Err(ApplyError::InvalidTarget(target.kind.name()));
        }
        let children = coerce_children(&target.kind, vec![node.into()]);
        target.content.extend(children);
        return Ok(());
    }

    let Some((index, parent_path)) = path.split_last() else {
        return Err(ApplyError::UnknownBlock(position.reference().clone()));
    };
    let index = match position {
        BlockPosition::After(_) => index + 1,
        _ => *index,
    };

    if parent_path.is_empty() {
        let blocks = coerce_top_level(vec![node.into()]);
        doc.content.splice(index..index, blocks);
    } else {
        let parent = doc
            .node_at_mut(parent_path)
            .ok_or_else(|| ApplyError::UnknownBlock(position.reference().clone()))?;
        let children = coerce_children(&parent.kind, vec![node.into()]);
        parent.content.splice(index..index, children);
    }
    Ok(())
}

fn delete_block(doc: &mut Document, id: &BlockId) -> Result<(), ApplyError> {
    let path = locate(doc, id)?;
    let Some((index, parent_path)) = path.split_last() else {
        return Err(ApplyError::UnknownBlock(id.clone()));
    };

    if parent_path.is_empty() {
        doc.content.remove(*index);
        return Ok(());
    }

    let parent = doc
        .node_at_mut(parent_path)
        .ok_or_else(|| ApplyError::UnknownBlock(id.clone()))?;
    parent.content.remove(*index);
    if matches!(parent.kind, NodeKind::TableCell { .. }) && parent.content.is_empty() {
        parent.content.push(factory::paragraph(Vec::new()).into());
    }
    Ok(())
}

fn update_text(
    doc: &mut Document,
    id: &BlockId,
    path: &[usize],
    text: &str,
) -> Result<(), ApplyError> {
    let block_path = locate(doc, id)?;
    let invalid = || ApplyError::InvalidPath {
        block_id: id.clone(),
        path: path.to_vec(),
    };

    let Some((index, inner)) = path.split_last() else {
        return Err(invalid());
    };
    let full: Path = block_path.iter().chain(inner).copied().collect();
    let parent = doc.node_at_mut(&full).ok_or_else(invalid)?;
    let len = parent.content.len();
    let textblock = parent.kind.is_textblock();

    match parent.content.get(*index).map(Content::is_text) {
        Some(true) if text.is_empty() => {
            parent.content.remove(*index);
        }
        Some(true) => {
            if let Some(Content::Text(leaf)) = parent.content.get_mut(*index) {
                leaf.text = text.to_string();
            }
        }
        // One past the end appends a leaf to a textblock
        None if *index == len && textblock => {
            if !text.is_empty() {
                parent.content.push(TextNode::new(text).into());
            }
        }
        _ => return Err(invalid()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Position;
    use crate::factory::{
        bullet_list, code_block, heading, list_item, paragraph, table, table_cell, table_row, text,
    };
    use crate::models::{MarkKind, Severity};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn id(node: &Node) -> BlockId {
        node.id.clone().unwrap()
    }

    fn sample() -> Document {
        Document::new(vec![
            paragraph(vec![text("Hello world", []).into()]).with_id("p1"),
            bullet_list(vec![
                list_item(vec![paragraph(vec![text("item", []).into()]).with_id("p2").into()])
                    .with_id("li1")
                    .into(),
            ])
            .with_id("ul"),
        ])
    }

    fn leaves(doc: &Document) -> Vec<(String, Vec<MarkKind>)> {
        doc.text_leaves()
            .into_iter()
            .map(|(_, t)| (t.text.clone(), t.marks.iter().map(Mark::kind).collect()))
            .collect()
    }

    #[rstest]
    #[case::delete(Action::DeleteBlock { block_id: "nope".into() })]
    #[case::retype(Action::SetBlockType { block_id: "nope".into(), kind: NodeKind::Blockquote })]
    #[case::update(Action::UpdateText { block_id: "nope".into(), path: vec![0], text: "x".into() })]
    #[case::insert(Action::InsertBlock {
        node: paragraph(vec![]),
        position: Some(BlockPosition::After("nope".into())),
    })]
    #[case::mark(Action::ToggleMark {
        mark: Mark::Bold,
        selection: Selection::within(vec![9, 9], 0, 1),
    })]
    fn unknown_references_are_noops(#[case] action: Action) {
        let doc = sample();
        assert_eq!(apply(&doc, &action), doc);
        assert!(try_apply(&doc, &action).is_err());
    }

    #[test]
    fn toggle_mark_splits_the_leaf() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::ToggleMark {
                mark: Mark::Bold,
                selection: Selection::within(vec![0, 0], 6, 11),
            },
        );
        assert_eq!(
            leaves(&next)[..2],
            [
                ("Hello ".to_string(), vec![]),
                ("world".to_string(), vec![MarkKind::Bold]),
            ]
        );
    }

    #[test]
    fn toggle_mark_twice_restores_text() {
        let doc = sample();
        let action = Action::ToggleMark {
            mark: Mark::Italic,
            selection: Selection::within(vec![0, 0], 0, 5),
        };
        let once = apply(&doc, &action);
        let twice = apply(&once, &action);
        assert_eq!(twice, doc);
    }

    #[test]
    fn toggle_mark_spans_blocks() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::ToggleMark {
                mark: Mark::link("/x"),
                selection: Selection::new(
                    Position::new(vec![1, 0, 0, 0], 2),
                    Position::new(vec![0, 0], 6),
                ),
            },
        );
        assert_eq!(
            leaves(&next),
            vec![
                ("Hello ".to_string(), vec![]),
                ("world".to_string(), vec![MarkKind::Link]),
                ("it".to_string(), vec![MarkKind::Link]),
                ("em".to_string(), vec![]),
            ]
        );
        assert!(next.validate().is_empty());
    }

    #[test]
    fn toggle_mark_removes_when_all_marked() {
        let doc = Document::new(vec![
            paragraph(vec![
                text("ab", [Mark::Bold]).into(),
                text("cd", [Mark::Bold, Mark::Italic]).into(),
            ])
            .with_id("p"),
        ]);
        let next = apply(
            &doc,
            &Action::ToggleMark {
                mark: Mark::Bold,
                selection: Selection::new(Position::new(vec![0, 0], 0), Position::new(vec![0, 1], 2)),
            },
        );
        assert_eq!(
            leaves(&next),
            vec![
                ("ab".to_string(), vec![]),
                ("cd".to_string(), vec![MarkKind::Italic]),
            ]
        );
    }

    #[test]
    fn toggle_mark_handles_multibyte_text() {
        let doc = Document::new(vec![paragraph(vec![text("héllo", []).into()])]);
        let next = apply(
            &doc,
            &Action::ToggleMark {
                mark: Mark::Strike,
                selection: Selection::within(vec![0, 0], 1, 2),
            },
        );
        assert_eq!(
            leaves(&next),
            vec![
                ("h".to_string(), vec![]),
                ("é".to_string(), vec![MarkKind::Strike]),
                ("llo".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn toggle_mark_skips_code_blocks() {
        let doc = Document::new(vec![code_block("sh", "ls -la")]);
        let action = Action::ToggleMark {
            mark: Mark::Bold,
            selection: Selection::within(vec![0, 0], 0, 2),
        };
        assert_eq!(try_apply(&doc, &action), Err(ApplyError::EmptySelection));
    }

    #[test]
    fn collapsed_and_out_of_range_selections_are_noops() {
        let doc = sample();
        for selection in [
            Selection::within(vec![0, 0], 3, 3),
            Selection::within(vec![0, 0], 0, 99),
        ] {
            let action = Action::ToggleMark {
                mark: Mark::Bold,
                selection,
            };
            assert_eq!(apply(&doc, &action), doc);
        }
    }

    #[test]
    fn set_block_type_keeps_id_and_content() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::SetBlockType {
                block_id: "p1".into(),
                kind: NodeKind::Heading { level: 2 },
            },
        );
        let node = &next.content[0];
        assert_eq!(node.kind, NodeKind::Heading { level: 2 });
        assert_eq!(node.id, Some(BlockId::from("p1")));
        assert_eq!(node.plain_text(), "Hello world");
    }

    #[test]
    fn set_block_type_to_code_drops_marks() {
        let doc = Document::new(vec![
            heading(1, vec![text("a", [Mark::Bold]).into(), text("b", []).into()]).with_id("h"),
        ]);
        let next = apply(
            &doc,
            &Action::SetBlockType {
                block_id: "h".into(),
                kind: NodeKind::CodeBlock {
                    language: String::new(),
                },
            },
        );
        assert_eq!(leaves(&next), vec![("ab".to_string(), vec![])]);
        assert!(next.validate().is_empty());
    }

    #[test]
    fn set_block_type_swaps_lists_and_callouts() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::SetBlockType {
                block_id: "ul".into(),
                kind: NodeKind::OrderedList,
            },
        );
        assert_eq!(next.content[1].kind, NodeKind::OrderedList);

        let next = apply(
            &next,
            &Action::SetBlockType {
                block_id: "p1".into(),
                kind: NodeKind::Callout {
                    severity: Severity::Info,
                },
            },
        );
        assert_eq!(
            next.content[0].kind,
            NodeKind::Callout {
                severity: Severity::Info
            }
        );
    }

    #[test]
    fn set_block_type_rejects_structural_change() {
        let doc = sample();
        let action = Action::SetBlockType {
            block_id: "ul".into(),
            kind: NodeKind::Paragraph,
        };
        assert_eq!(
            try_apply(&doc, &action),
            Err(ApplyError::UnsupportedConversion {
                from: "bullet_list",
                to: "paragraph"
            })
        );
    }

    #[test]
    fn insert_block_positions() {
        let doc = sample();
        let new = paragraph(vec![text("new", []).into()]).with_id("new");

        let end = apply(
            &doc,
            &Action::InsertBlock {
                node: new.clone(),
                position: None,
            },
        );
        assert_eq!(end.content.last().map(id), Some(BlockId::from("new")));

        let before = apply(
            &doc,
            &Action::InsertBlock {
                node: new.clone(),
                position: Some(BlockPosition::Before("p1".into())),
            },
        );
        assert_eq!(before.content[0].id, Some(BlockId::from("new")));

        let after = apply(
            &doc,
            &Action::InsertBlock {
                node: new,
                position: Some(BlockPosition::After("p2".into())),
            },
        );
        let item = after.node_at(&[1, 0]).unwrap();
        assert_eq!(item.content.len(), 2);
        assert!(after.validate().is_empty());
    }

    #[test]
    fn inserted_node_is_coerced_into_its_parent() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::InsertBlock {
                node: paragraph(vec![text("second", []).into()]),
                position: Some(BlockPosition::Child("ul".into())),
            },
        );
        let list = &next.content[1];
        assert_eq!(list.content.len(), 2);
        assert_eq!(
            list.content[1].as_node().map(|n| &n.kind),
            Some(&NodeKind::ListItem)
        );
        assert!(next.validate().is_empty());
    }

    #[test]
    fn inserted_ids_never_collide() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::InsertBlock {
                node: paragraph(vec![]).with_id("p1"),
                position: None,
            },
        );
        assert_eq!(next.content.len(), 3);
        assert_ne!(next.content[2].id, Some(BlockId::from("p1")));
        assert!(next.validate().is_empty());
    }

    #[test]
    fn insert_into_textblock_is_rejected() {
        let doc = sample();
        let action = Action::InsertBlock {
            node: paragraph(vec![]),
            position: Some(BlockPosition::Child("p1".into())),
        };
        assert_eq!(
            try_apply(&doc, &action),
            Err(ApplyError::InvalidTarget("paragraph"))
        );
    }

    #[test]
    fn delete_block_removes_nested_node() {
        let doc = sample();
        let next = apply(
            &doc,
            &Action::DeleteBlock {
                block_id: "li1".into(),
            },
        );
        assert!(next.content[1].content.is_empty());
        assert!(next.find(&BlockId::from("p2")).is_none());
    }

    #[test]
    fn deleting_last_block_of_a_cell_leaves_empty_paragraph() {
        let para = paragraph(vec![text("x", []).into()]).with_id("only");
        let doc = Document::new(vec![table(
            vec![table_row(vec![table_cell(vec![para.into()]).into()]).into()],
            false,
        )]);
        let next = apply(
            &doc,
            &Action::DeleteBlock {
                block_id: "only".into(),
            },
        );
        let cell = next.node_at(&[0, 0, 0]).unwrap();
        assert_eq!(cell.content.len(), 1);
        assert_eq!(cell.content[0].as_node().map(|n| n.plain_text()), Some(String::new()));
    }

    #[test]
    fn update_text_replaces_appends_and_removes() {
        let doc = sample();
        let replaced = apply(
            &doc,
            &Action::UpdateText {
                block_id: "p1".into(),
                path: vec![0],
                text: "Goodbye".into(),
            },
        );
        assert_eq!(replaced.content[0].plain_text(), "Goodbye");

        let appended = apply(
            &doc,
            &Action::UpdateText {
                block_id: "p1".into(),
                path: vec![1],
                text: "!".into(),
            },
        );
        assert_eq!(appended.content[0].plain_text(), "Hello world!");

        let removed = apply(
            &doc,
            &Action::UpdateText {
                block_id: "p1".into(),
                path: vec![0],
                text: String::new(),
            },
        );
        assert!(removed.content[0].content.is_empty());

        let nested = apply(
            &doc,
            &Action::UpdateText {
                block_id: "li1".into(),
                path: vec![0, 0],
                text: "changed".into(),
            },
        );
        assert_eq!(nested.content[1].plain_text(), "changed");
    }

    #[test]
    fn update_text_rejects_block_paths() {
        let doc = sample();
        let action = Action::UpdateText {
            block_id: "li1".into(),
            path: vec![0],
            text: "x".into(),
        };
        assert!(matches!(
            try_apply(&doc, &action),
            Err(ApplyError::InvalidPath { .. })
        ));
    }
}
