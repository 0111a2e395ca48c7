//! # Model → Markup
//!
//! [`render`] serialises a [`Document`] into the markup vocabulary the
//! parser reads. Output is compact, with no whitespace between tags, so a
//! rendered document parses back to the same tree and renders again to the
//! same string.
//!
//! Every block carries its id as `data-block-id`, followed by the attributes
//! of its kind and then its metadata. Text is escaped and wrapped in its
//! marks in canonical order, innermost first.

use html_escape::encode_quoted_attribute;
use std::fmt::Write;

use crate::models::{
    Content, Document, Mark, Metadata, Node, NodeKind, TextNode, canonical_marks,
};
use crate::vocabulary::{
    BLOCK_ID_ATTR, CALLOUT_ATTR, CALLOUT_LABEL_CLASS, COMMENT_ATTR, COMMENT_CLASS, LAYOUT_ATTR,
    META_JSON_PREFIX, META_PREFIX, callout_color, callout_label, is_metadata_key,
};

/// Cell style of a data table.
const DATA_CELL_STYLE: &str = "border:1px solid #ccc;padding:4px";
/// Cell style of a layout table.
const LAYOUT_CELL_STYLE: &str = "border:none;padding:0;vertical-align:top";

pub fn render(doc: &Document) -> String {
    let mut out = String::new();
    let ctx = RenderContext::default();
    for node in &doc.content {
        render_node(node, ctx, &mut out);
    }
    out
}

/// Render a single block and its descendants.
pub fn render_block(node: &Node) -> String {
    let mut out = String::new();
    render_node(node, RenderContext::default(), &mut out);
    out
}

/// State threaded down the render walk.
#[derive(Debug, Clone, Copy, Default)]
struct RenderContext {
    /// Inside a layout table; cells render without borders.
    layout: bool,
}

fn render_node(node: &Node, ctx: RenderContext, out: &mut String) {
    match &node.kind {
        NodeKind::Paragraph => element(out, "p", node, &[], |out| children(node, ctx, out)),
        NodeKind::Heading { level } => {
            let tag = format!("h{}", (*level).clamp(1, 6));
            element(out, &tag, node, &[], |out| children(node, ctx, out));
        }
        NodeKind::BulletList => element(out, "ul", node, &[], |out| children(node, ctx, out)),
        NodeKind::OrderedList => element(out, "ol", node, &[], |out| children(node, ctx, out)),
        NodeKind::ListItem => element(out, "li", node, &[], |out| children(node, ctx, out)),
        NodeKind::Table { layout } => {
            let attrs = if *layout {
                vec![(LAYOUT_ATTR, "true".to_string())]
            } else {
                Vec::new()
            };
            let inner = RenderContext { layout: *layout };
            element(out, "table", node, &attrs, |out| {
                out.push_str("<tbody>");
                children(node, inner, out);
                out.push_str("</tbody>");
            });
        }
        NodeKind::TableRow => element(out, "tr", node, &[], |out| children(node, ctx, out)),
        NodeKind::TableCell { rowspan, colspan } => {
            let mut attrs = Vec::new();
            if let Some(rowspan) = rowspan {
                attrs.push(("rowspan", rowspan.to_string()));
            }
            if let Some(colspan) = colspan {
                attrs.push(("colspan", colspan.to_string()));
            }
            let style = if ctx.layout {
                LAYOUT_CELL_STYLE
            } else {
                DATA_CELL_STYLE
            };
            attrs.push(("style", style.to_string()));
            element(out, "td", node, &attrs, |out| children(node, ctx, out));
        }
        NodeKind::Image(image) => {
            let mut attrs = vec![("src", image.src.clone()), ("alt", image.alt.clone())];
            let optional = [
                ("title", &image.title),
                ("width", &image.width),
                ("height", &image.height),
            ];
            for (name, value) in optional {
                if let Some(value) = value {
                    attrs.push((name, value.clone()));
                }
            }
            void_element(out, "img", node, &attrs);
        }
        NodeKind::CodeBlock { language } => element(out, "pre", node, &[], |out| {
            if language.is_empty() {
                out.push_str("<code>");
            } else {
                let _ = write!(
                    out,
                    r#"<code class="language-{}">"#,
                    encode_quoted_attribute(language)
                );
            }
            out.push_str(&encode_quoted_attribute(&node.plain_text()));
            out.push_str("</code>");
        }),
        NodeKind::Blockquote => {
            element(out, "blockquote", node, &[], |out| children(node, ctx, out))
        }
        NodeKind::HorizontalRule => void_element(out, "hr", node, &[]),
        NodeKind::Callout { severity } => {
            let attrs = [
                (CALLOUT_ATTR, severity.to_string()),
                ("class", format!("callout callout-{severity}")),
                ("style", format!("background-color:{}", callout_color(*severity))),
            ];
            element(out, "div", node, &attrs, |out| {
                let _ = write!(
                    out,
                    r#"<span class="{CALLOUT_LABEL_CLASS}">{}</span><p>"#,
                    encode_quoted_attribute(callout_label(*severity))
                );
                children(node, ctx, out);
                out.push_str("</p>");
            });
        }
    }
}

fn children(node: &Node, ctx: RenderContext, out: &mut String) {
    for child in &node.content {
        match child {
            Content::Node(child) => render_node(child, ctx, out),
            Content::Text(text) => render_text(text, out),
        }
    }
}

fn element(
    out: &mut String,
    tag: &str,
    node: &Node,
    attrs: &[(&str, String)],
    body: impl FnOnce(&mut String),
) {
    open_tag(out, tag, node, attrs);
    body(out);
    let _ = write!(out, "</{tag}>");
}

fn void_element(out: &mut String, tag: &str, node: &Node, attrs: &[(&str, String)]) {
    open_tag(out, tag, node, attrs);
}

fn open_tag(out: &mut String, tag: &str, node: &Node, attrs: &[(&str, String)]) {
    out.push('<');
    out.push_str(tag);
    if let Some(id) = &node.id {
        attr(out, BLOCK_ID_ATTR, id.as_str());
    }
    for (name, value) in attrs {
        attr(out, name, value);
    }
    metadata_attrs(out, &node.metadata);
    out.push('>');
}

fn attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, r#" {name}="{}""#, encode_quoted_attribute(value));
}

fn metadata_attrs(out: &mut String, metadata: &Metadata) {
    for (key, value) in metadata {
        if !is_metadata_key(key) {
            log::debug!("skipping metadata key {key:?}: not attribute-safe");
            continue;
        }
        match value {
            serde_json::Value::String(s) => attr(out, &format!("{META_PREFIX}{key}"), s),
            other => attr(out, &format!("{META_JSON_PREFIX}{key}"), &other.to_string()),
        }
    }
}

fn render_text(text: &TextNode, out: &mut String) {
    let mut html = encode_quoted_attribute(&text.text).into_owned();
    for mark in canonical_marks(text.marks.iter().cloned()) {
        html = wrap(&mark, &html);
    }
    out.push_str(&html);
}

fn wrap(mark: &Mark, inner: &str) -> String {
    match mark {
        Mark::Code => format!("<code>{inner}</code>"),
        Mark::Bold => format!("<strong>{inner}</strong>"),
        Mark::Italic => format!("<em>{inner}</em>"),
        Mark::Underline => format!("<u>{inner}</u>"),
        Mark::Strike => format!("<s>{inner}</s>"),
        Mark::Highlight => format!("<mark>{inner}</mark>"),
        Mark::Comment { note } => format!(
            r#"<span class="{COMMENT_CLASS}" {COMMENT_ATTR}="{}">{inner}</span>"#,
            encode_quoted_attribute(note)
        ),
        Mark::Link { href } => format!(r#"<a href="{}">{inner}</a>"#, encode_quoted_attribute(href)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::models::{BlockId, ImageAttrs, Severity};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn doc(nodes: Vec<Node>) -> Document {
        Document::new(nodes)
    }

    fn with_id(node: Node, id: &str) -> Node {
        Node {
            id: Some(BlockId::from(id)),
            ..node
        }
    }

    #[test]
    fn empty_document_renders_nothing() {
        assert_eq!(render(&Document::default()), "");
    }

    #[test]
    fn paragraph_text_is_escaped() {
        let p = with_id(
            factory::paragraph(vec![factory::text("a < b & \"c\"", []).into()]),
            "p1",
        );
        assert_eq!(
            render(&doc(vec![p])),
            r#"<p data-block-id="p1">a &lt; b &amp; &quot;c&quot;</p>"#
        );
    }

    #[rstest]
    #[case::bold(vec![Mark::Bold], "<strong>x</strong>")]
    #[case::code_inside_bold(vec![Mark::Bold, Mark::Code], "<strong><code>x</code></strong>")]
    #[case::link_outermost(
        vec![Mark::link("/a?b=1&c=2"), Mark::Italic],
        r#"<a href="/a?b=1&amp;c=2"><em>x</em></a>"#
    )]
    #[case::comment(
        vec![Mark::comment("why?")],
        r#"<span class="comment" data-comment="why?">x</span>"#
    )]
    #[case::all_simple(
        vec![Mark::Highlight, Mark::Strike, Mark::Underline],
        "<mark><s><u>x</u></s></mark>"
    )]
    fn marks_wrap_in_canonical_order(#[case] marks: Vec<Mark>, #[case] expected: &str) {
        let mut out = String::new();
        render_text(&TextNode { text: "x".into(), marks }, &mut out);
        assert_eq!(out, expected);
    }

    #[test]
    fn heading_and_list() {
        let list = with_id(
            factory::bullet_list(vec![
                with_id(
                    factory::list_item(vec![
                        with_id(factory::paragraph(vec![factory::text("one", []).into()]), "p")
                            .into(),
                    ]),
                    "li",
                )
                .into(),
            ]),
            "ul",
        );
        let heading = with_id(factory::heading(2, vec![factory::text("Title", []).into()]), "h");
        assert_eq!(
            render(&doc(vec![heading, list])),
            r#"<h2 data-block-id="h">Title</h2><ul data-block-id="ul"><li data-block-id="li"><p data-block-id="p">one</p></li></ul>"#
        );
    }

    #[test]
    fn layout_flag_reaches_cells() {
        let cell = |layout_id: &str| {
            with_id(
                factory::spanning_cell(Some(2), None, vec![
                    with_id(factory::paragraph(Vec::new()), "p").into(),
                ]),
                layout_id,
            )
        };
        let table = |layout: bool| {
            with_id(
                factory::table(
                    vec![with_id(factory::table_row(vec![cell("c").into()]), "r").into()],
                    layout,
                ),
                "t",
            )
        };

        assert_eq!(
            render_block(&table(true)),
            r#"<table data-block-id="t" data-layout="true"><tbody><tr data-block-id="r"><td data-block-id="c" rowspan="2" style="border:none;padding:0;vertical-align:top"><p data-block-id="p"></p></td></tr></tbody></table>"#
        );
        assert!(render_block(&table(false)).contains(DATA_CELL_STYLE));
    }

    #[test]
    fn image_attributes_in_order() {
        let mut attrs = ImageAttrs::new("a.png", "An \"A\"");
        attrs.width = Some("40".into());
        let img = with_id(factory::image_with(attrs), "i");
        assert_eq!(
            render_block(&img),
            r#"<img data-block-id="i" src="a.png" alt="An &quot;A&quot;" width="40">"#
        );
    }

    #[test]
    fn code_block_with_language() {
        let code = with_id(factory::code_block("rust", "if a < b {}\n"), "c");
        assert_eq!(
            render_block(&code),
            r#"<pre data-block-id="c"><code class="language-rust">if a &lt; b {}
</code></pre>"#
        );
    }

    #[test]
    fn callout_has_label_and_single_paragraph() {
        let callout = with_id(
            factory::callout(Severity::Warning, vec![factory::text("Hot", []).into()]),
            "w",
        );
        assert_eq!(
            render_block(&callout),
            "<div data-block-id=\"w\" data-callout=\"warning\" class=\"callout callout-warning\" style=\"background-color:#fff3cd\"><span class=\"callout-label\">\u{26a0} Warning</span><p>Hot</p></div>"
        );
    }

    #[test]
    fn metadata_is_type_tagged() {
        let p = with_id(factory::paragraph(Vec::new()), "p")
            .with_metadata("author", serde_json::json!("ann"))
            .with_metadata("score", serde_json::json!(3))
            .with_metadata("bad key", serde_json::json!("dropped"));
        assert_eq!(
            render_block(&p),
            r#"<p data-block-id="p" data-meta-author="ann" data-metajson-score="3"></p>"#
        );
    }

    #[test]
    fn horizontal_rule_is_void() {
        let hr = with_id(factory::horizontal_rule(), "hr");
        assert_eq!(render_block(&hr), r#"<hr data-block-id="hr">"#);
    }
}
