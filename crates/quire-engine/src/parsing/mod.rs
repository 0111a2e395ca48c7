//! # Markup → Model
//!
//! [`parse`] turns tagged markup into a [`Document`]. The markup is first
//! parsed into a lossless syntax tree by `quire-syntax`, then walked through
//! its typed `ast` views:
//!
//! - Block tags map onto node kinds through a dispatch on the tag name.
//! - Inline tags become marks. Nested inline tags compose, so
//!   `<strong><em>x</em></strong>` is one text node carrying bold and italic.
//! - Inline content found where blocks are expected is grouped into
//!   paragraphs. Whitespace-only text between blocks is dropped.
//! - Structural wrappers (`body`, `section`, a plain `div`, ...) are
//!   transparent. Unknown tags holding only inline content are spliced into
//!   the surrounding text; unknown tags holding blocks are opaque containers
//!   whose blocks are hoisted, or an empty paragraph when they hold nothing.
//! - `data-block-id` is kept when present, otherwise a fresh id is generated.
//!
//! Parsing never fails. Truncated or malformed markup degrades to the best
//! tree the syntax layer could recover.

pub mod style;

use quire_syntax::ast::{Child, Element, Root};
use std::collections::HashSet;
use std::iter;

use crate::factory::{claim_block_ids, normalize_text};
use crate::models::{
    BlockId, Content, Document, ImageAttrs, Mark, Metadata, Node, NodeKind, Severity, TextNode,
    canonical_marks,
};
use crate::vocabulary::{
    BLOCK_ID_ATTR, CALLOUT_ATTR, CALLOUT_LABEL_CLASS, COMMENT_ATTR, COMMENT_CLASS, LAYOUT_ATTR,
    META_JSON_PREFIX, META_PREFIX,
};

/// Options controlling how markup is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Read formatting and callouts from inline `style` attributes when no
    /// semantic tag or explicit attribute says so.
    pub sniff_styles: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { sniff_styles: true }
    }
}

/// Parse markup with default options.
pub fn parse(markup: &str) -> Document {
    parse_with(markup, &ParseOptions::default())
}

pub fn parse_with(markup: &str, options: &ParseOptions) -> Document {
    let Some(root) = Root::cast(quire_syntax::parse(markup)) else {
        return Document::default();
    };

    let builder = Builder { options };
    let mut blocks = Vec::new();
    builder.flow(root.children(), &mut blocks);

    // Pasted markup can repeat ids; the first occurrence keeps its id
    let mut taken = HashSet::new();
    for block in &mut blocks {
        claim_block_ids(block, &mut taken);
    }
    Document::new(blocks)
}

/// Tags that always produce inline content.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "del", "dfn", "em", "font", "i", "ins",
    "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup",
    "time", "tt", "u", "var", "wbr",
];

/// Tags with a dedicated block mapping.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "table",
    "img",
    "pre",
    "blockquote",
    "hr",
    "div",
];

/// Wrappers whose children are spliced into the parent.
///
/// List and table parts only land here when they appear outside their
/// list or table.
const TRANSPARENT_TAGS: &[&str] = &[
    "html",
    "body",
    "main",
    "article",
    "section",
    "header",
    "footer",
    "nav",
    "aside",
    "figure",
    "figcaption",
    "center",
    "form",
    "fieldset",
    "details",
    "summary",
    "address",
    "dl",
    "dt",
    "dd",
    "li",
    "tr",
    "td",
    "th",
    "thead",
    "tbody",
    "tfoot",
    "caption",
];

/// Tags whose content is never document text.
const SKIPPED_TAGS: &[&str] = &[
    "head", "title", "meta", "link", "script", "style", "template", "noscript",
];

fn is_known_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag) || TRANSPARENT_TAGS.contains(&tag) || SKIPPED_TAGS.contains(&tag)
}

fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn decode(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

/// Inline content collected from a subtree. Blocks met inside inline
/// content (an image inside a paragraph) are carried along in order.
enum Piece {
    Text(TextNode),
    Block(Node),
}

/// Identity and metadata read from a source element.
struct Header {
    id: BlockId,
    metadata: Metadata,
}

impl Header {
    fn fresh() -> Self {
        Self {
            id: BlockId::generate(),
            metadata: Metadata::new(),
        }
    }

    fn node(self, kind: NodeKind, content: Vec<Content>) -> Node {
        Node {
            id: Some(self.id),
            kind,
            metadata: self.metadata,
            content,
        }
    }
}

struct Builder<'o> {
    options: &'o ParseOptions,
}

impl Builder<'_> {
    fn header(&self, el: &Element) -> Header {
        let id = el
            .attr(BLOCK_ID_ATTR)
            .map(|raw| decode(&raw))
            .filter(|id| !id.trim().is_empty())
            .map(BlockId::from)
            .unwrap_or_else(BlockId::generate);

        Header {
            id,
            metadata: self.metadata(el),
        }
    }

    fn metadata(&self, el: &Element) -> Metadata {
        let mut metadata = Metadata::new();
        for attr in el.attributes() {
            let name = attr.name();
            let lower = name.to_ascii_lowercase();
            let value = decode(&attr.value().unwrap_or_default());

            if lower.starts_with(META_JSON_PREFIX) {
                let key = &name[META_JSON_PREFIX.len()..];
                if !key.is_empty() {
                    let json = serde_json::from_str(&value)
                        .unwrap_or(serde_json::Value::String(value));
                    metadata.insert(key.to_string(), json);
                }
            } else if lower.starts_with(META_PREFIX) {
                let key = &name[META_PREFIX.len()..];
                if !key.is_empty() {
                    metadata.insert(key.to_string(), serde_json::Value::String(value));
                }
            }
        }
        metadata
    }

    /// Whether `el` contributes inline content rather than blocks.
    fn is_inline(&self, el: &Element, tag: &str) -> bool {
        if INLINE_TAGS.contains(&tag) {
            return true;
        }
        if is_known_block(tag) {
            return false;
        }
        !el.descendants().any(|d| {
            let tag = d.tag_name();
            is_known_block(&tag) && !SKIPPED_TAGS.contains(&tag.as_str())
        })
    }

    /// Parse children where blocks are expected.
    fn flow(&self, children: impl Iterator<Item = Child>, out: &mut Vec<Node>) {
        let mut run = Vec::new();

        for child in children {
            match child {
                Child::Text(raw) => run.push(Piece::Text(TextNode::new(decode(&raw)))),
                Child::Comment(_) => {}
                Child::Element(el) => {
                    let tag = el.tag_name();
                    if self.is_inline(&el, &tag) {
                        self.inline_element(&el, &tag, &[], &mut run);
                    } else {
                        self.assemble(std::mem::take(&mut run), NodeKind::Paragraph, None, out);
                        self.block(&el, &tag, out);
                    }
                }
            }
        }

        self.assemble(run, NodeKind::Paragraph, None, out);
    }

    /// Turn collected pieces into blocks.
    ///
    /// Each run of text becomes one `kind` textblock, with equal-marked
    /// neighbours joined and blank text at both ends trimmed. The first textblock takes `header`; when nothing at all is
    /// produced and a header was given, an empty textblock keeps it.
    fn assemble(
        &self,
        pieces: Vec<Piece>,
        kind: NodeKind,
        mut header: Option<Header>,
        out: &mut Vec<Node>,
    ) {
        let start = out.len();
        let mut group = Vec::new();

        for piece in pieces {
            match piece {
                Piece::Text(text) => group.push(text),
                Piece::Block(node) => {
                    emit_group(std::mem::take(&mut group), &kind, &mut header, out);
                    out.push(node);
                }
            }
        }
        emit_group(group, &kind, &mut header, out);

        if out.len() == start
            && let Some(header) = header
        {
            out.push(header.node(kind, Vec::new()));
        }
    }

    fn block(&self, el: &Element, tag: &str, out: &mut Vec<Node>) {
        if (matches!(tag, "div" | "p") || TRANSPARENT_TAGS.contains(&tag))
            && let Some(severity) = self.callout_severity(el)
        {
            self.callout(el, severity, out);
            return;
        }

        match tag {
            "p" => self.textblock(el, NodeKind::Paragraph, out),
            "ul" | "ol" => out.push(self.list(el, tag)),
            "table" => out.push(self.table(el)),
            "img" => out.push(self.image(el)),
            "pre" => out.push(self.code_block(el)),
            "blockquote" => {
                let mut inner = Vec::new();
                self.flow(el.children(), &mut inner);
                out.push(self.header(el).node(NodeKind::Blockquote, into_content(inner)));
            }
            "hr" => out.push(self.header(el).node(NodeKind::HorizontalRule, Vec::new())),
            t if SKIPPED_TAGS.contains(&t) => {}
            t if t == "div" || TRANSPARENT_TAGS.contains(&t) => self.flow(el.children(), out),
            t => match heading_level(t) {
                Some(level) => self.textblock(el, NodeKind::Heading { level }, out),
                None => self.opaque(el, out),
            },
        }
    }

    fn callout_severity(&self, el: &Element) -> Option<Severity> {
        if let Some(explicit) = el.attr(CALLOUT_ATTR) {
            return explicit.parse().ok();
        }
        if !self.options.sniff_styles {
            return None;
        }
        el.attr("style").and_then(|s| style::sniff_callout(&s))
    }

    fn textblock(&self, el: &Element, kind: NodeKind, out: &mut Vec<Node>) {
        let mut pieces = Vec::new();
        self.inline_children(el.children(), &[], &mut pieces);
        self.assemble(pieces, kind, Some(self.header(el)), out);
    }

    /// A callout's content is the inline content of its paragraphs; the
    /// rendered label is skipped.
    fn callout(&self, el: &Element, severity: Severity, out: &mut Vec<Node>) {
        let mut pieces = Vec::new();
        for child in el.children() {
            match &child {
                Child::Element(inner) if inner.has_class(CALLOUT_LABEL_CLASS) => {}
                Child::Element(inner) if inner.tag_name() == "p" => {
                    self.inline_children(inner.children(), &[], &mut pieces);
                }
                _ => self.inline_child(child, &[], &mut pieces),
            }
        }
        self.assemble(
            pieces,
            NodeKind::Callout { severity },
            Some(self.header(el)),
            out,
        );
    }

    /// Unknown element holding blocks: its blocks are hoisted into the
    /// parent, or an empty paragraph stands in when it yields none.
    fn opaque(&self, el: &Element, out: &mut Vec<Node>) {
        let mut inner = Vec::new();
        self.flow(el.children(), &mut inner);
        if inner.is_empty() {
            out.push(self.header(el).node(NodeKind::Paragraph, Vec::new()));
        } else {
            out.extend(inner);
        }
    }

    fn list(&self, el: &Element, tag: &str) -> Node {
        let kind = if tag == "ol" {
            NodeKind::OrderedList
        } else {
            NodeKind::BulletList
        };

        let mut items: Vec<Node> = Vec::new();
        for child in el.children() {
            match child {
                Child::Element(li) if li.tag_name() == "li" => {
                    let mut inner = Vec::new();
                    self.flow(li.children(), &mut inner);
                    items.push(self.header(&li).node(NodeKind::ListItem, into_content(inner)));
                }
                Child::Comment(_) => {}
                // Stray content (a nested list placed directly in the list)
                // belongs to the item before it
                other => {
                    let mut blocks = Vec::new();
                    self.flow(iter::once(other), &mut blocks);
                    if blocks.is_empty() {
                        continue;
                    }
                    match items.last_mut() {
                        Some(item) => item.content.extend(into_content(blocks)),
                        None => items.push(
                            Header::fresh().node(NodeKind::ListItem, into_content(blocks)),
                        ),
                    }
                }
            }
        }

        self.header(el).node(kind, into_content(items))
    }

    fn table(&self, el: &Element) -> Node {
        let layout = el
            .attr(LAYOUT_ATTR)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
            || el
                .attr("role")
                .is_some_and(|v| v.eq_ignore_ascii_case("presentation"));

        let mut rows = Vec::new();
        let mut loose_cells = Vec::new();
        self.collect_rows(el, &mut rows, &mut loose_cells);
        if !loose_cells.is_empty() {
            rows.push(Header::fresh().node(NodeKind::TableRow, into_content(loose_cells)));
        }

        self.header(el)
            .node(NodeKind::Table { layout }, into_content(rows))
    }

    /// Rows of a table, looking through row groups but not into nested tables.
    fn collect_rows(&self, el: &Element, rows: &mut Vec<Node>, loose_cells: &mut Vec<Node>) {
        for child in el.child_elements() {
            match child.tag_name().as_str() {
                "tr" => {
                    if !loose_cells.is_empty() {
                        rows.push(
                            Header::fresh()
                                .node(NodeKind::TableRow, into_content(std::mem::take(loose_cells))),
                        );
                    }
                    rows.push(self.row(&child));
                }
                "thead" | "tbody" | "tfoot" => self.collect_rows(&child, rows, loose_cells),
                "td" | "th" => loose_cells.push(self.cell(&child)),
                _ => {}
            }
        }
    }

    fn row(&self, el: &Element) -> Node {
        let cells: Vec<Node> = el
            .child_elements()
            .filter(|c| matches!(c.tag_name().as_str(), "td" | "th"))
            .map(|c| self.cell(&c))
            .collect();
        self.header(el).node(NodeKind::TableRow, into_content(cells))
    }

    fn cell(&self, el: &Element) -> Node {
        let span = |name: &str| el.attr(name).and_then(|v| v.trim().parse::<u32>().ok());

        let mut inner = Vec::new();
        self.flow(el.children(), &mut inner);
        if inner.is_empty() {
            inner.push(Header::fresh().node(NodeKind::Paragraph, Vec::new()));
        }

        self.header(el).node(
            NodeKind::TableCell {
                rowspan: span("rowspan"),
                colspan: span("colspan"),
            },
            into_content(inner),
        )
    }

    fn image(&self, el: &Element) -> Node {
        let attr = |name: &str| el.attr(name).map(|v| decode(&v));
        let attrs = ImageAttrs {
            src: attr("src").unwrap_or_default(),
            alt: attr("alt").unwrap_or_default(),
            title: attr("title"),
            width: attr("width"),
            height: attr("height"),
        };
        self.header(el).node(NodeKind::Image(attrs), Vec::new())
    }

    fn code_block(&self, el: &Element) -> Node {
        let language = iter::once(el.clone())
            .chain(el.descendants().filter(|d| d.tag_name() == "code"))
            .flat_map(|e| e.classes())
            .find_map(|class| class.strip_prefix("language-").map(str::to_string))
            .unwrap_or_default();

        let code = decode(&el.text_content());
        let content = if code.is_empty() {
            Vec::new()
        } else {
            vec![TextNode::new(code).into()]
        };

        self.header(el)
            .node(NodeKind::CodeBlock { language }, content)
    }

    fn inline_children(
        &self,
        children: impl Iterator<Item = Child>,
        marks: &[Mark],
        out: &mut Vec<Piece>,
    ) {
        for child in children {
            self.inline_child(child, marks, out);
        }
    }

    fn inline_child(&self, child: Child, marks: &[Mark], out: &mut Vec<Piece>) {
        match child {
            Child::Text(raw) => out.push(Piece::Text(TextNode {
                text: decode(&raw),
                marks: marks.to_vec(),
            })),
            Child::Comment(_) => {}
            Child::Element(el) => {
                let tag = el.tag_name();
                if self.is_inline(&el, &tag) {
                    self.inline_element(&el, &tag, marks, out);
                } else {
                    let mut blocks = Vec::new();
                    self.block(&el, &tag, &mut blocks);
                    out.extend(blocks.into_iter().map(Piece::Block));
                }
            }
        }
    }

    fn inline_element(&self, el: &Element, tag: &str, marks: &[Mark], out: &mut Vec<Piece>) {
        match tag {
            "br" => out.push(Piece::Text(TextNode {
                text: "\n".to_string(),
                marks: marks.to_vec(),
            })),
            "wbr" => {}
            _ => {
                let marks = canonical_marks(
                    marks
                        .iter()
                        .cloned()
                        .chain(self.element_marks(el, tag)),
                );
                self.inline_children(el.children(), &marks, out);
            }
        }
    }

    /// Marks an inline element applies to its content.
    fn element_marks(&self, el: &Element, tag: &str) -> Vec<Mark> {
        let mut marks = Vec::new();

        match tag {
            "strong" | "b" => marks.push(Mark::Bold),
            "em" | "i" => marks.push(Mark::Italic),
            "u" | "ins" => marks.push(Mark::Underline),
            "s" | "strike" | "del" => marks.push(Mark::Strike),
            "code" | "tt" | "kbd" | "samp" => marks.push(Mark::Code),
            "mark" => marks.push(Mark::Highlight),
            "a" => {
                if let Some(href) = el.attr("href") {
                    marks.push(Mark::Link { href: decode(&href) });
                }
            }
            _ => {}
        }

        if el.has_class(COMMENT_CLASS) || el.has_attr(COMMENT_ATTR) {
            let note = el.attr(COMMENT_ATTR).map(|n| decode(&n)).unwrap_or_default();
            marks.push(Mark::Comment { note });
        }

        if self.options.sniff_styles
            && let Some(style) = el.attr("style")
        {
            marks.extend(style::sniff_marks(&style));
        }

        marks
    }
}

/// Emit one textblock for a run of text. Neighbours with equal marks are
/// joined and blank text at both ends is trimmed.
fn emit_group(
    group: Vec<TextNode>,
    kind: &NodeKind,
    header: &mut Option<Header>,
    out: &mut Vec<Node>,
) {
    let group = normalize_text(group);
    if group.is_empty() {
        return;
    }

    let content = group.into_iter().map(Content::Text).collect();
    let header = header.take().unwrap_or_else(Header::fresh);
    out.push(header.node(kind.clone(), content));
}

fn into_content(nodes: Vec<Node>) -> Vec<Content> {
    nodes.into_iter().map(Content::Node).collect()
}
