use pretty_assertions::assert_eq;
use quire_engine::editing::{Action, BlockPosition, MemorySurface, Selection, Session, Surface};
use quire_engine::factory::{paragraph, text};
use quire_engine::{BlockId, DocumentStore, Mark, MemoryStore, ParseOptions, diff, parse, render};
use std::cell::RefCell;
use std::rc::Rc;

const MARKUP: &str = concat!(
    r#"<h1 data-block-id="title">Packing list</h1>"#,
    r#"<ul data-block-id="list"><li data-block-id="i1"><p data-block-id="p1">Tent</p></li>"#,
    r#"<li data-block-id="i2"><p data-block-id="p2">Stove</p></li></ul>"#,
);

fn session() -> Session<MemorySurface> {
    let mut session = Session::new(MARKUP, ParseOptions::default());
    session.attach(MemorySurface::new()).unwrap();
    session
}

fn renders(session: &Session<MemorySurface>) -> usize {
    session.surface().unwrap().renders()
}

#[test]
fn delete_of_unknown_block_leaves_document_unchanged() {
    let mut session = session();
    let before = session.document().clone();

    session
        .apply_action(Action::DeleteBlock {
            block_id: BlockId::from("does-not-exist"),
        })
        .unwrap();

    assert_eq!(session.document(), &before);
}

#[test]
fn action_submitted_from_listener_renders_once_per_action() {
    let mut session = session();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();

    // Re-submits the action that triggered it; the repeat finds nothing to do
    session.subscribe(move |_, dispatch| {
        *counter.borrow_mut() += 1;
        dispatch.submit(Action::DeleteBlock {
            block_id: "i1".into(),
        });
    });

    session
        .apply_action(Action::DeleteBlock {
            block_id: "i1".into(),
        })
        .unwrap();

    assert_eq!(renders(&session), 2);
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(session.revision(), 1);
}

#[test]
fn editing_flow_matches_surface() {
    let mut session = session();
    let actions = [
        Action::InsertBlock {
            node: paragraph(vec![text("Matches", []).into()]).with_id("p3"),
            position: Some(BlockPosition::After("i2".into())),
        },
        Action::ToggleMark {
            mark: Mark::Bold,
            selection: Selection::within(vec![1, 0, 0, 0], 0, 4),
        },
        Action::UpdateText {
            block_id: "title".into(),
            path: vec![0],
            text: "Camping list".into(),
        },
    ];
    for action in actions {
        session.apply_action(action).unwrap();
    }

    assert_eq!(renders(&session), 4);
    let surface_markup = session.surface().unwrap().markup();
    assert_eq!(surface_markup, render(session.document()));

    let reparsed = parse(&surface_markup);
    assert_eq!(&reparsed, session.document());
    assert_eq!(session.document().content[1].content.len(), 3);
}

#[test]
fn surface_edit_round_trip_through_store() {
    let mut session = session();
    let mut store = MemoryStore::new();
    let original = session.document().clone();
    store
        .save("trip", session.revision(), &render(&original))
        .unwrap();

    let edited = MARKUP.replace("Stove", "<em>Stove</em>");
    session.surface_mut().unwrap().edit(edited);
    assert!(session.on_surface_mutation().unwrap());
    store
        .save("trip", session.revision(), &render(session.document()))
        .unwrap();

    let (revision, latest) = store.latest("trip").unwrap().unwrap();
    assert_eq!(revision, 1);
    let changes = diff(&original, &parse(&latest));
    assert_eq!(changes.summary(), "0 added, 0 removed, 1 changed");
    assert_eq!(changes.changed[0].after.marks, vec![Mark::Italic]);
}
