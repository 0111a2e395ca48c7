//! Start tags, attributes and end tags.

use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

/// Parse a start tag at `<name`.
///
/// Returns the completed START_TAG and whether it ended in `/>`.
pub(super) fn start_tag(p: &mut Parser<'_, '_>) -> (CompletedMarker, bool) {
    let m = p.start();
    p.bump(); // <
    p.bump(); // tag name

    let mut self_closed = false;
    loop {
        match p.current() {
            SyntaxKind::WHITESPACE => p.bump(),
            SyntaxKind::NAME => attribute(p),
            SyntaxKind::R_ANGLE => {
                p.bump();
                break;
            }
            SyntaxKind::SLASH_R_ANGLE => {
                p.bump();
                self_closed = true;
                break;
            }
            // Unterminated tag: let the next tag or EOF end it
            SyntaxKind::EOF | SyntaxKind::L_ANGLE | SyntaxKind::L_ANGLE_SLASH => break,
            _ => {
                let e = p.start();
                p.bump();
                e.complete(p, SyntaxKind::ERROR);
            }
        }
    }

    (m.complete(p, SyntaxKind::START_TAG), self_closed)
}

/// Parse `name`, `name=value` or `name = "value"`.
fn attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // attribute name

    let eq_at = if p.at(SyntaxKind::WHITESPACE) { 1 } else { 0 };
    if p.nth(eq_at) == SyntaxKind::EQ {
        p.eat(SyntaxKind::WHITESPACE);
        p.bump(); // =
        p.eat(SyntaxKind::WHITESPACE);
        attr_value(p);
    }

    m.complete(p, SyntaxKind::ATTRIBUTE);
}

fn attr_value(p: &mut Parser<'_, '_>) {
    if p.at(SyntaxKind::STRING) {
        let m = p.start();
        p.bump();
        m.complete(p, SyntaxKind::ATTR_VALUE);
        return;
    }

    let mut n = 0;
    while !matches!(
        p.nth(n),
        SyntaxKind::WHITESPACE
            | SyntaxKind::R_ANGLE
            | SyntaxKind::SLASH_R_ANGLE
            | SyntaxKind::L_ANGLE
            | SyntaxKind::L_ANGLE_SLASH
            | SyntaxKind::EOF
    ) {
        n += 1;
    }

    if n > 0 {
        let m = p.start();
        p.bump_n(n, SyntaxKind::TEXT);
        m.complete(p, SyntaxKind::ATTR_VALUE);
    }
}

/// Parse an end tag at `</`.
///
/// Anything between the name and `>` is kept inside the END_TAG node.
pub(super) fn end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // </
    p.eat(SyntaxKind::NAME);
    while !matches!(
        p.current(),
        SyntaxKind::R_ANGLE | SyntaxKind::L_ANGLE | SyntaxKind::L_ANGLE_SLASH | SyntaxKind::EOF
    ) {
        p.bump();
    }
    p.eat(SyntaxKind::R_ANGLE);
    m.complete(p, SyntaxKind::END_TAG);
}

/// Lowercased name of the end tag at the cursor, if the cursor is at one.
pub(super) fn end_tag_name(p: &Parser<'_, '_>) -> Option<String> {
    (p.at(SyntaxKind::L_ANGLE_SLASH) && p.nth(1) == SyntaxKind::NAME)
        .then(|| p.nth_text(1).to_ascii_lowercase())
}

/// Lowercased name of the start tag at the cursor, if the cursor is at one.
pub(super) fn start_tag_name(p: &Parser<'_, '_>) -> Option<String> {
    (p.at(SyntaxKind::L_ANGLE) && p.nth(1) == SyntaxKind::NAME)
        .then(|| p.nth_text(1).to_ascii_lowercase())
}
