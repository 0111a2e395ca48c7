//! # Parser
//!
//! Grammar rules walk the token stream and record what they see as a flat
//! list of [`Event`]s; the [`Sink`] replays that list into a Rowan tree once
//! the walk is over. Markup is frequently malformed, and with no tree under
//! construction an element that never sees its end tag is simply completed
//! wherever the grammar gives up on it.
//!
//! ## Markers
//!
//! [`Parser::start`] reserves a slot in the event list and hands back a
//! [`Marker`]. The grammar fills the slot by completing the marker with a
//! node kind, or clears it by abandoning the marker. A marker dropped any
//! other way panics.
//!
//! ```ignore
//! let m = p.start();
//! p.bump();                             // `</`
//! p.bump();                             // tag name
//! m.complete(p, SyntaxKind::END_TAG);
//! ```
//!
//! A completed marker can still be wrapped: [`CompletedMarker::precede`]
//! opens a parent around it, which is how an element gets built around a
//! start tag that was parsed first.
//!
//! ## Open Elements
//!
//! The parser also tracks the names of the elements currently open. End
//! tag recovery consults it, so `</div>` inside an unclosed `<span>` closes
//! the span instead of being discarded. The stack holds at most
//! [`MAX_DEPTH`] names; elements met beyond that are kept empty and their
//! content continues at the level of the innermost open element.
//!
//! ```
//! use quire_syntax::parse;
//!
//! let tree = parse("<p>Hello</p>");
//! assert_eq!(tree.text().to_string(), "<p>Hello</p>");
//! ```

pub mod event;
pub mod sink;

mod grammar;

use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// Deepest element nesting the tree records.
pub const MAX_DEPTH: usize = 128;

/// Token cursor, event list and open element stack for one parse.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    open: Vec<String>,
}

impl<'t, 'input> Parser<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Run the grammar over every token and build the tree.
    pub fn parse(mut self) -> SyntaxNode {
        grammar::root(&mut self);
        Sink::new(self.tokens).build(self.events)
    }

    /// Reserve an event slot for a node that has not been classified yet.
    pub fn start(&mut self) -> Marker {
        self.events.push(Event::Placeholder);
        Marker {
            pos: self.events.len() - 1,
            completed: false,
        }
    }

    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the token `n` ahead; EOF past the end.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    /// Text of the token `n` ahead; empty past the end.
    pub fn nth_text(&self, n: usize) -> &'input str {
        self.tokens.get(self.pos + n).map_or("", |t| t.text)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token when it is a `kind`.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        let found = self.at(kind);
        if found {
            self.bump();
        }
        found
    }

    pub fn bump(&mut self) {
        if !self.at_end() {
            self.events.push(Event::token(self.current()));
            self.pos += 1;
        }
    }

    /// Consume `n` raw tokens as one token of `kind`. Does nothing when
    /// fewer than `n` remain.
    pub fn bump_n(&mut self, n: usize, kind: SyntaxKind) {
        if n == 0 || self.pos + n > self.tokens.len() {
            return;
        }
        self.events.push(Event::Token {
            kind,
            n_raw_tokens: n as u32,
        });
        self.pos += n;
    }

    /// Whether another element may open inside the innermost open one.
    pub(crate) fn can_nest(&self) -> bool {
        self.open.len() < MAX_DEPTH
    }

    pub(crate) fn push_open(&mut self, name: String) {
        self.open.push(name);
    }

    pub(crate) fn pop_open(&mut self) {
        self.open.pop();
    }

    /// Whether an element named `name` is open at any depth.
    pub(crate) fn is_open(&self, name: &str) -> bool {
        self.open.iter().any(|open| open == name)
    }
}

/// An event slot waiting for its node kind.
#[must_use = "a marker must be completed or abandoned"]
pub struct Marker {
    pos: usize,
    completed: bool,
}

impl Marker {
    /// Close the node opened by this marker as a `kind` node.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let slot = &mut p.events[self.pos];
        assert!(matches!(slot, Event::Placeholder));
        *slot = Event::start(kind);
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Give up on the node. A slot with events after it is left in place
    /// and skipped by the sink.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos + 1 == p.events.len() {
            p.events.pop();
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("marker dropped without being completed or abandoned");
        }
    }
}

/// A finished node that can still be given a parent.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Open a new node that will enclose this one.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let parent = p.start();
        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(parent.pos);
        }
        parent
    }
}

/// Parse markup into a lossless syntax tree.
pub fn parse(source: &str) -> SyntaxNode {
    let tokens = lex(source);
    Parser::new(&tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_empty_input() {
        let tree = parse("");
        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 0);
    }

    #[test]
    fn parse_preserves_all_text() {
        let input = "<p>Hello, <b>world</b>!</p>";
        assert_eq!(parse(input).text(), input);
    }

    #[test]
    fn element_wraps_its_start_tag() {
        let tree = parse("<p>Hello</p>");

        let element = tree.children().next().unwrap();
        assert_eq!(element.kind(), SyntaxKind::ELEMENT);
        assert_eq!(element.first_child().unwrap().kind(), SyntaxKind::START_TAG);
    }

    #[test]
    fn marker_must_be_completed() {
        let result = std::panic::catch_unwind(|| {
            let tokens = lex("test");
            let mut parser = Parser::new(&tokens);
            let _marker = parser.start();
        });
        assert!(result.is_err());
    }

    #[test]
    fn abandoned_marker_leaves_no_event() {
        let tokens = lex("test");
        let mut parser = Parser::new(&tokens);
        let marker = parser.start();
        marker.abandon(&mut parser);
        assert!(parser.events.is_empty());
    }

    #[test]
    fn open_stack_tracks_names() {
        let tokens = lex("");
        let mut parser = Parser::new(&tokens);
        parser.push_open("ul".to_string());
        parser.push_open("li".to_string());
        assert!(parser.is_open("ul"));
        parser.pop_open();
        assert!(!parser.is_open("li"));
    }

    #[test]
    fn open_stack_is_bounded() {
        let tokens = lex("");
        let mut parser = Parser::new(&tokens);
        for _ in 0..MAX_DEPTH {
            assert!(parser.can_nest());
            parser.push_open("div".to_string());
        }
        assert!(!parser.can_nest());
    }
}
