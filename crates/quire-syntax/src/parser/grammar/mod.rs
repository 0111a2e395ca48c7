//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the current token (`p.current()`, `p.at()`, `p.nth()`)
//! 2. Consume tokens (`p.bump()`, `p.eat()`, `p.bump_n()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//!
//! ## Module Structure
//!
//! - [`element`] - Elements, their content and the implicit closing rules
//! - [`tag`] - Start tags, attributes and end tags
//!
//! ## Error Recovery
//!
//! Grammar functions never fail. Unexpected tokens inside a tag are wrapped
//! in ERROR nodes, an end tag with no matching open element becomes an ERROR
//! node, and elements left open at EOF are completed where the input ends.

mod element;
mod tag;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
///
/// Creates a ROOT node containing all top-level content.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    while !p.at_end() {
        element::content(p, None);
    }

    m.complete(p, SyntaxKind::ROOT);
}
