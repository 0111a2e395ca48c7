use serde::{Deserialize, Serialize};

use crate::models::Path;

/// A caret position: a text leaf addressed from the document root and a
/// char offset into its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub path: Path,
    pub offset: usize,
}

impl Position {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// A range between two positions. The anchor is where the selection
/// started and may come after the focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Selection of `start..end` chars within one text leaf.
    pub fn within(path: impl Into<Path>, start: usize, end: usize) -> Self {
        let path = path.into();
        Self {
            anchor: Position::new(path.clone(), start),
            focus: Position::new(path, end),
        }
    }

    /// `(start, end)` in document order.
    ///
    /// Leaf paths compare lexicographically, which is document order.
    pub fn ordered(&self) -> (&Position, &Position) {
        if self.anchor <= self.focus {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}
