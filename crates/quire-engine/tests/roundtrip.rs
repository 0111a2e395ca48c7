use pretty_assertions::assert_eq;
use quire_engine::factory::{
    blockquote, bullet_list, callout, code_block, heading, horizontal_rule, image_with, list_item,
    ordered_list, paragraph, spanning_cell, table, table_row, text,
};
use quire_engine::{
    BlockId, Document, ImageAttrs, Mark, Node, NodeKind, Severity, TextNode, parse, render,
};
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.html",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

/// A document using every node kind and mark the markup vocabulary has.
fn kitchen_sink() -> Document {
    let mut image = ImageAttrs::new("diagram.png", "A \"diagram\"");
    image.title = Some("Flow".into());
    image.height = Some("240".into());

    Document::new(vec![
        heading(1, vec![text("Quarterly report", []).into()]),
        paragraph(vec![
            text("Revenue is ", []).into(),
            text("up", [Mark::Bold, Mark::Italic]).into(),
            text(" & costs < plan, see ", []).into(),
            text("the appendix", [Mark::link("/appendix?tab=1&view=full")]).into(),
            text(".\nSecond line", []).into(),
        ])
        .with_metadata("author", serde_json::json!("kim"))
        .with_metadata("priority", serde_json::json!(2)),
        paragraph(vec![
            text("code", [Mark::Code]).into(),
            text(" ", []).into(),
            text("under", [Mark::Underline]).into(),
            text(" ", []).into(),
            text("struck", [Mark::Strike]).into(),
            text(" ", []).into(),
            text("lit", [Mark::Highlight]).into(),
            text(" ", []).into(),
            text("noted", [Mark::comment("it's \"fine\"")]).into(),
        ]),
        bullet_list(vec![
            list_item(vec![paragraph(vec![text("first", []).into()]).into()]).into(),
            list_item(vec![
                paragraph(vec![text("second", []).into()]).into(),
                ordered_list(vec![
                    list_item(vec![paragraph(vec![text("nested", []).into()]).into()]).into(),
                ])
                .into(),
            ])
            .into(),
        ]),
        table(
            vec![
                table_row(vec![
                    spanning_cell(Some(2), None, vec![paragraph(vec![text("tall", []).into()]).into()])
                        .into(),
                    spanning_cell(None, None, vec![]).into(),
                ])
                .into(),
            ],
            false,
        ),
        table(
            vec![table_row(vec![spanning_cell(None, Some(3), vec![image_with(image).into()]).into()]).into()],
            true,
        ),
        code_block("rust", "fn main() {\n    println!(\"<hi>\");\n}\n"),
        code_block("", ""),
        blockquote(vec![paragraph(vec![text("Quoted", [Mark::Italic]).into()]).into()]),
        horizontal_rule(),
        callout(Severity::Warning, vec![text("Mind the ", []).into(), text("gap", [Mark::Bold]).into()]),
        callout(Severity::Safety, vec![]),
        paragraph(vec![]),
    ])
}

#[test]
fn factory_documents_round_trip() {
    let doc = kitchen_sink();
    assert!(doc.validate().is_empty(), "{:?}", doc.validate());

    let markup = render(&doc);
    let reparsed = parse(&markup);

    assert_eq!(reparsed, doc);
    assert_eq!(render(&reparsed), markup);
}

#[test]
fn generated_ids_settle_after_one_pass() {
    let markup = "<h2>Title</h2><p>Body with <b>bold</b></p><ul><li>item</li></ul>";
    let first = render(&parse(markup));
    let second = render(&parse(&first));
    assert_eq!(second, first);
}

#[rstest]
#[case("pasted_office")]
#[case("editor_export")]
#[case("truncated")]
fn fixtures_reach_a_fixed_point(#[case] name: &str) {
    let doc = parse(&fixture(name));
    assert!(doc.validate().is_empty(), "{:?}", doc.validate());

    let once = render(&doc);
    let twice = render(&parse(&once));
    assert_eq!(twice, once);
}

#[test]
fn editor_export_is_read_faithfully() {
    let doc = parse(&fixture("editor_export"));
    let kinds: Vec<&str> = doc.content.iter().map(|n| n.kind.name()).collect();
    assert_eq!(
        kinds,
        vec![
            "heading",
            "paragraph",
            "callout",
            "code_block",
            "blockquote",
            "horizontal_rule",
            "table",
            "ordered_list"
        ]
    );

    let intro = &doc.content[0];
    assert_eq!(intro.id, Some(BlockId::from("intro")));
    assert_eq!(intro.metadata["author"], serde_json::json!("sam"));
    assert_eq!(doc.content[1].metadata["reviewed"], serde_json::json!(true));

    let callout = &doc.content[2];
    assert_eq!(callout.plain_text(), "Downtime is under five minutes.");

    assert_eq!(
        doc.content[3].plain_text(),
        "./deploy --env=prod && echo \"done\"\n"
    );
    assert_eq!(
        doc.content[6].kind,
        NodeKind::Table { layout: true }
    );
}

#[test]
fn pasted_office_markup_is_cleaned_up() {
    let doc = parse(&fixture("pasted_office"));
    let kinds: Vec<&str> = doc.content.iter().map(|n| n.kind.name()).collect();
    assert_eq!(
        kinds,
        vec!["heading", "paragraph", "callout", "table", "bullet_list"]
    );

    let leaves: Vec<&TextNode> = doc.content[1]
        .content
        .iter()
        .filter_map(|c| c.as_text())
        .collect();
    assert_eq!(leaves[0].marks, vec![Mark::Bold]);
    assert!(leaves.iter().any(|t| t.text == "reception" && t.marks == vec![Mark::Highlight]));

    assert_eq!(
        doc.content[2].kind,
        NodeKind::Callout {
            severity: Severity::Safety
        }
    );

    let list = &doc.content[4];
    assert_eq!(list.content.len(), 2);
    let second = list.content[1].as_node().unwrap();
    assert_eq!(second.content.len(), 2);
    assert!(second.plain_text().ends_with("Including the side door"));
}

#[test]
fn empty_cell_has_one_empty_paragraph() {
    let doc = parse(&fixture("pasted_office"));
    let spanning = doc.node_at(&[3, 2, 0]).unwrap();
    assert_eq!(
        spanning.kind,
        NodeKind::TableCell {
            rowspan: None,
            colspan: Some(2)
        }
    );
    assert_eq!(spanning.content.len(), 1);
    let paragraph = spanning.content[0].as_node().unwrap();
    assert_eq!(paragraph.kind, NodeKind::Paragraph);
    assert!(paragraph.content.is_empty());
}

#[test]
fn truncated_markup_keeps_what_it_can() {
    let doc = parse(&fixture("truncated"));
    assert_eq!(doc.content[0].id, Some(BlockId::from("a")));
    assert!(doc.content[0].plain_text().starts_with("Stored before the quota ran out"));
}

#[rstest]
#[case(vec![Mark::Underline, Mark::Bold])]
#[case(vec![Mark::Bold, Mark::Underline])]
fn mark_order_does_not_change_output(#[case] marks: Vec<Mark>) {
    let node = TextNode {
        text: "x".into(),
        marks,
    };
    let doc = Document::new(vec![paragraph(vec![node.into()]).with_id("p")]);
    assert_eq!(
        render(&doc),
        r#"<p data-block-id="p"><u><strong>x</strong></u></p>"#
    );
}

#[test]
fn equal_marks_render_as_one_run() {
    let doc = Document::new(vec![
        paragraph(vec![
            text("a", []).into(),
            text("b", []).into(),
            text("c", [Mark::Bold]).into(),
            text("d", [Mark::Bold]).into(),
        ])
        .with_id("p"),
    ]);
    insta::assert_snapshot!(render(&doc), @r#"<p data-block-id="p">ab<strong>cd</strong></p>"#);
}

#[rstest]
#[case::equal_marks_join(paragraph(vec![text("a", []).into(), text("b", []).into()]))]
#[case::blank_only(paragraph(vec![text(" ", []).into()]))]
#[case::blank_edges(paragraph(vec![
    text(" ", []).into(),
    text("a", [Mark::Italic]).into(),
    text(" ", []).into(),
    text("b", [Mark::Bold]).into(),
    text("  ", []).into(),
]))]
#[case::empty_leaves(heading(2, vec![
    text("", [Mark::Code]).into(),
    text("t", [Mark::Code]).into(),
    text("", []).into(),
    text("u", [Mark::Code]).into(),
]))]
fn built_textblocks_read_back_unchanged(#[case] block: Node) {
    let doc = Document::new(vec![block]);
    assert_eq!(parse(&render(&doc)), doc);
}
