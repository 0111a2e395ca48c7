use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Inline formatting kinds.
///
/// The declaration order is the canonical mark order, innermost first: when a
/// text node carries several marks the renderer wraps the text in `Code`
/// first and `Link` last. `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Code,
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Comment,
    Link,
}

impl MarkKind {
    pub const ALL: [MarkKind; 8] = [
        MarkKind::Code,
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Underline,
        MarkKind::Strike,
        MarkKind::Highlight,
        MarkKind::Comment,
        MarkKind::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkKind::Code => "code",
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strike => "strike",
            MarkKind::Highlight => "highlight",
            MarkKind::Comment => "comment",
            MarkKind::Link => "link",
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown mark kind: {s}"))
    }
}

/// An inline formatting mark with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Code,
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Comment { note: String },
    Link { href: String },
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Code => MarkKind::Code,
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Strike => MarkKind::Strike,
            Mark::Highlight => MarkKind::Highlight,
            Mark::Comment { .. } => MarkKind::Comment,
            Mark::Link { .. } => MarkKind::Link,
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link { href: href.into() }
    }

    pub fn comment(note: impl Into<String>) -> Self {
        Mark::Comment { note: note.into() }
    }
}

/// Deduplicate marks by kind and sort them into canonical order.
///
/// When a kind appears more than once the last occurrence wins, matching
/// `add_mark`, which replaces a mark of the same kind.
pub fn canonical_marks(marks: impl IntoIterator<Item = Mark>) -> Vec<Mark> {
    marks
        .into_iter()
        .map(|mark| (mark.kind(), mark))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}
