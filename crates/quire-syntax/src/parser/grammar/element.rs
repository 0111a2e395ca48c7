//! Elements, element content and implicit closing.

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

use super::tag;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Start tags that end an open paragraph.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

/// Parents inside which table rows and cells nest legitimately.
const TABLE_STRUCTURE: &[&str] = &["table", "thead", "tbody", "tfoot", "tr"];

/// Parse one piece of content: an element, a text run, a comment or a stray end tag.
///
/// `parent` is the lowercased name of the enclosing element (`None` at the
/// root). Returns `false` without consuming anything when the cursor sits on
/// a tag that ends the parent, either its own end tag, an ancestor's end tag
/// or a start tag that closes it implicitly.
pub(super) fn content(p: &mut Parser<'_, '_>, parent: Option<&str>) -> bool {
    if let Some(closing) = tag::end_tag_name(p) {
        if parent == Some(closing.as_str()) || p.is_open(&closing) {
            return false;
        }
        stray_end_tag(p);
        return true;
    }

    if let Some(child) = tag::start_tag_name(p) {
        if let Some(parent) = parent
            && closes_implicitly(p, parent, &child)
        {
            return false;
        }
        element(p, child);
        return true;
    }

    match p.current() {
        SyntaxKind::COMMENT | SyntaxKind::DOCTYPE => p.bump(),
        _ => text(p),
    }
    true
}

/// Parse an element starting at `<name`.
///
/// Past the nesting limit the element keeps only its start tag.
fn element(p: &mut Parser<'_, '_>, name: String) {
    let (start, self_closed) = tag::start_tag(p);
    let m = start.precede(p);

    if self_closed || VOID_ELEMENTS.contains(&name.as_str()) || !p.can_nest() {
        m.complete(p, SyntaxKind::ELEMENT);
        return;
    }

    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
        raw_text(p, &name);
    } else {
        p.push_open(name.clone());
        while !p.at_end() && content(p, Some(&name)) {}
        p.pop_open();
    }

    if tag::end_tag_name(p).as_deref() == Some(name.as_str()) {
        tag::end_tag(p);
    }

    m.complete(p, SyntaxKind::ELEMENT);
}

/// Consume everything up to `</name` as one TEXT token.
fn raw_text(p: &mut Parser<'_, '_>, name: &str) {
    let mut n = 0;
    while p.nth(n) != SyntaxKind::EOF
        && !(p.nth(n) == SyntaxKind::L_ANGLE_SLASH
            && p.nth(n + 1) == SyntaxKind::NAME
            && p.nth_text(n + 1).eq_ignore_ascii_case(name))
    {
        n += 1;
    }
    p.bump_n(n, SyntaxKind::TEXT);
}

/// Consume a run of character data as one TEXT token.
///
/// The current token is known not to start a tag.
fn text(p: &mut Parser<'_, '_>) {
    let mut n = 1;
    loop {
        match p.nth(n) {
            SyntaxKind::EOF | SyntaxKind::COMMENT | SyntaxKind::DOCTYPE => break,
            SyntaxKind::L_ANGLE | SyntaxKind::L_ANGLE_SLASH
                if p.nth(n + 1) == SyntaxKind::NAME =>
            {
                break;
            }
            _ => n += 1,
        }
    }
    p.bump_n(n, SyntaxKind::TEXT);
}

fn stray_end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    tag::end_tag(p);
    m.complete(p, SyntaxKind::ERROR);
}

/// Whether a `<child>` start tag ends the open `parent` element.
fn closes_implicitly(p: &Parser<'_, '_>, parent: &str, child: &str) -> bool {
    if parent == "p" && CLOSES_PARAGRAPH.contains(&child) {
        return true;
    }

    match child {
        "li" => parent == "li" || (!matches!(parent, "ul" | "ol") && p.is_open("li")),
        "td" | "th" => {
            matches!(parent, "td" | "th")
                || (!TABLE_STRUCTURE.contains(&parent) && (p.is_open("td") || p.is_open("th")))
        }
        "tr" => {
            matches!(parent, "td" | "th" | "tr")
                || (!TABLE_STRUCTURE.contains(&parent) && p.is_open("tr"))
        }
        _ => false,
    }
}
