//! Replays parser events into a Rowan green tree.
//!
//! The sink owns the raw token slice and hands out text as events consume
//! it. When the outermost node closes, any tokens the grammar left behind
//! are attached as one trailing TEXT token so the tree always covers the
//! whole input.

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    consumed: usize,
    depth: usize,
}

impl<'t, 'input> Sink<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            consumed: 0,
            depth: 0,
        }
    }

    /// Replay `events` and return the finished tree.
    pub fn build(mut self, mut events: Vec<Event>) -> SyntaxNode {
        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    // Preceding parents open before the node they wrap
                    for kind in precede_chain(&mut events, kind, forward_parent)
                        .into_iter()
                        .rev()
                    {
                        self.builder.start_node(kind.into());
                        self.depth += 1;
                    }
                }
                Event::Token { kind, n_raw_tokens } => self.token(kind, n_raw_tokens as usize),
                Event::Finish => self.finish_node(),
                Event::Placeholder => {}
            }
        }

        SyntaxNode::new_root(self.builder.finish())
    }

    fn finish_node(&mut self) {
        if self.depth == 1 {
            let rest = self.tokens.len().saturating_sub(self.consumed);
            self.token(SyntaxKind::TEXT, rest);
        }
        self.builder.finish_node();
        self.depth = self.depth.saturating_sub(1);
    }

    /// Glue the next `n` raw tokens into one token of `kind`.
    fn token(&mut self, kind: SyntaxKind, n: usize) {
        let end = (self.consumed + n).min(self.tokens.len());
        if end == self.consumed {
            return;
        }
        let text: String = self.tokens[self.consumed..end]
            .iter()
            .map(|t| t.text)
            .collect();
        self.consumed = end;
        self.builder.token(kind.into(), &text);
    }
}

/// Kinds of the node started at one event followed by every node preceding
/// it, innermost first. Visited events are cleared so they open only once.
fn precede_chain(
    events: &mut [Event],
    kind: SyntaxKind,
    mut next: Option<usize>,
) -> Vec<SyntaxKind> {
    let mut kinds = vec![kind];
    while let Some(idx) = next.take() {
        if let Event::Start {
            kind,
            forward_parent,
        } = std::mem::replace(&mut events[idx], Event::Placeholder)
        {
            kinds.push(kind);
            next = forward_parent;
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_tokens_are_glued_into_one() {
        let input = "a & b";
        let tokens = lex(input);
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::Token {
                kind: SyntaxKind::TEXT,
                n_raw_tokens: tokens.len() as u32,
            },
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).build(events);

        assert_eq!(tree.children_with_tokens().count(), 1);
        assert_eq!(tree.text().to_string(), input);
    }

    #[test]
    fn forward_parent_wraps_completed_node() {
        let tokens = lex("<b>");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::Start {
                kind: SyntaxKind::START_TAG,
                forward_parent: Some(4),
            },
            Event::Token {
                kind: SyntaxKind::TEXT,
                n_raw_tokens: tokens.len() as u32,
            },
            Event::Finish,
            Event::start(SyntaxKind::ELEMENT),
            Event::Finish,
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).build(events);

        let element = tree.first_child().unwrap();
        assert_eq!(element.kind(), SyntaxKind::ELEMENT);
        assert_eq!(element.first_child().unwrap().kind(), SyntaxKind::START_TAG);
        assert_eq!(tree.text().to_string(), "<b>");
    }

    #[test]
    fn unconsumed_tokens_stay_in_the_tree() {
        let input = "<p>left over";
        let tokens = lex(input);
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::token(SyntaxKind::L_ANGLE),
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).build(events);

        assert_eq!(tree.text().to_string(), input);
    }
}
