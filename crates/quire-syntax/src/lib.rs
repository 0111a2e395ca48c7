//! # quire-syntax
//!
//! A lossless syntax tree for tagged markup (the HTML subset rich-text
//! documents are stored in) using [Rowan] + [Logos], following the
//! [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree → ast
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! The tree keeps every byte of the input, including malformed tags and
//! stray end tags, so `tree.text()` always reproduces the source. Consumers
//! that only care about structure go through the typed [`ast`] views.
//!
//! ## Recovery Rules
//!
//! Real documents come from clipboards and other editors, so the grammar
//! never rejects input:
//!
//! - Void elements (`br`, `img`, `hr`, ...) and `/>` tags have no content
//! - An end tag closes the nearest open element with that name, implicitly
//!   closing anything opened inside it
//! - An end tag with no open element of that name becomes an ERROR node
//! - `<p>`, `<li>`, `<td>`, `<th>` and `<tr>` close implicitly the way
//!   browsers do
//! - `script` and `style` content is kept as a single raw TEXT token
//! - Everything still open at EOF is closed there
//! - Elements nested deeper than [`parser::MAX_DEPTH`] keep only their start
//!   tag, and what follows continues one level up
//!
//! ## Module Structure
//!
//! ```text
//! quire-syntax/
//! ├── lib.rs           # This file - public API and tree tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── ast.rs           # Typed Element/Attribute views
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs     # Root parsing
//!         ├── element.rs # Element content and implicit closing
//!         └── tag.rs     # Start tags, attributes, end tags
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use quire_syntax::ast::{Child, Root};
//! use quire_syntax::{SyntaxKind, parse};
//!
//! let tree = parse("<h1>Hello</h1>");
//! assert_eq!(tree.text().to_string(), "<h1>Hello</h1>");
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//!
//! let root = Root::cast(tree).unwrap();
//! let Some(Child::Element(h1)) = root.children().next() else {
//!     panic!("expected an element");
//! };
//! assert_eq!(h1.tag_name(), "h1");
//! assert_eq!(h1.text_content(), "Hello");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use parser::parse;
pub use syntax_kind::{MarkupLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
