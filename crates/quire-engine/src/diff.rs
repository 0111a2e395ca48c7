//! Text-level summary of what changed between two versions of a document.
//!
//! Both documents are flattened to their text leaves, ignoring block
//! structure, and the leaves are bucketed by text. Within a bucket, leaves
//! matching exactly on text and marks cancel out. The rest are paired in
//! order as formatting changes, and whatever is left over on one side is
//! reported as added or removed.
//!
//! This is a multiset comparison, not an edit script. Which occurrence of a
//! repeated text counts as added is not meaningful, and a leaf whose text
//! and marks both changed shows up as one removal plus one addition.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Document, Path, TextNode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatChange {
    pub before: TextNode,
    pub after: TextNode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentDiff {
    pub added: Vec<TextNode>,
    pub removed: Vec<TextNode>,
    pub changed: Vec<FormatChange>,
}

impl DocumentDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// One-line summary, e.g. `1 added, 0 removed, 2 changed`.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} removed, {} changed",
            self.added.len(),
            self.removed.len(),
            self.changed.len()
        )
    }
}

pub fn diff(before: &Document, after: &Document) -> DocumentDiff {
    let mut buckets: HashMap<&str, Bucket<'_>> = HashMap::new();
    for (path, leaf) in before.text_leaves() {
        buckets.entry(leaf.text.as_str()).or_default().before.push((path, leaf));
    }
    for (path, leaf) in after.text_leaves() {
        buckets.entry(leaf.text.as_str()).or_default().after.push((path, leaf));
    }

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut changed = Vec::new();

    for bucket in buckets.into_values() {
        let Bucket {
            before: mut old,
            after: new,
        } = bucket;

        // Exact matches cancel out
        let mut unmatched_new = Vec::new();
        for entry in new {
            match old.iter().position(|(_, leaf)| leaf.marks == entry.1.marks) {
                Some(index) => {
                    old.remove(index);
                }
                None => unmatched_new.push(entry),
            }
        }

        let mut old = old.into_iter();
        let mut new = unmatched_new.into_iter();
        loop {
            match (old.next(), new.next()) {
                (Some(b), Some(a)) => changed.push((
                    a.0,
                    FormatChange {
                        before: b.1.clone(),
                        after: a.1.clone(),
                    },
                )),
                (Some(b), None) => removed.push(b),
                (None, Some(a)) => added.push(a),
                (None, None) => break,
            }
        }
    }

    added.sort_by(|a, b| a.0.cmp(&b.0));
    removed.sort_by(|a, b| a.0.cmp(&b.0));
    changed.sort_by(|a, b| a.0.cmp(&b.0));

    DocumentDiff {
        added: added.into_iter().map(|(_, leaf)| leaf.clone()).collect(),
        removed: removed.into_iter().map(|(_, leaf)| leaf.clone()).collect(),
        changed: changed.into_iter().map(|(_, change)| change).collect(),
    }
}

#[derive(Default)]
struct Bucket<'a> {
    before: Vec<(Path, &'a TextNode)>,
    after: Vec<(Path, &'a TextNode)>,
}
