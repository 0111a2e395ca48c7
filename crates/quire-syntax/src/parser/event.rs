//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure.
//!
//! ```text
//! Start(ELEMENT)
//!   Start(START_TAG)
//!     Token(L_ANGLE)
//!     Token(NAME)
//!     Token(R_ANGLE)
//!   Finish
//!   Token(TEXT)        ← one composite token for a whole text run
//!   Start(END_TAG) ... Finish
//! Finish
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops. The `forward_parent` link in `Start` lets a
//! completed node be wrapped in a parent after the fact.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    ///
    /// If `forward_parent` is set it points to another `Start` event that
    /// becomes this node's parent.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Add a token to the current node.
    ///
    /// `n_raw_tokens` lexer tokens are glued into one tree token of `kind`.
    /// Text runs in element content routinely span many raw tokens.
    Token { kind: SyntaxKind, n_raw_tokens: u32 },

    /// Finish the current node.
    Finish,

    /// A placeholder that will be replaced by `Start`, or ignored if abandoned.
    Placeholder,
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
