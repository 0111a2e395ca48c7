//! Subcommand bodies. Each takes its inputs as strings and returns what
//! should be printed, so they can be exercised without a terminal.

use anyhow::{Result, bail};
use quire_engine::editing::{MemorySurface, Session, Surface};
use quire_engine::factory::ensure_document_ids;
use quire_engine::{Action, Document, DocumentStore, ParseOptions, parse_with};
use serde::Deserialize;

/// An actions file holds either a single action or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActionFile {
    Many(Vec<Action>),
    One(Action),
}

impl ActionFile {
    fn into_actions(self) -> Vec<Action> {
        match self {
            ActionFile::Many(actions) => actions,
            ActionFile::One(action) => vec![action],
        }
    }
}

pub fn parse(markup: &str, options: &ParseOptions, compact: bool) -> Result<String> {
    let doc = parse_with(markup, options);
    let json = if compact {
        serde_json::to_string(&doc)?
    } else {
        serde_json::to_string_pretty(&doc)?
    };
    Ok(json)
}

pub fn render(json: &str) -> Result<String> {
    let mut doc: Document = serde_json::from_str(json)?;
    let generated = ensure_document_ids(&mut doc);
    if generated > 0 {
        log::info!("Generated {generated} missing block ids");
    }
    for violation in doc.validate() {
        log::warn!("{violation}");
    }
    Ok(quire_engine::render(&doc))
}

pub fn normalize(markup: &str, options: &ParseOptions) -> String {
    quire_engine::render(&parse_with(markup, options))
}

pub fn diff(before: &str, after: &str, options: &ParseOptions, json: bool) -> Result<String> {
    let changes = quire_engine::diff(&parse_with(before, options), &parse_with(after, options));
    if json {
        return Ok(serde_json::to_string_pretty(&changes)?);
    }

    let mut lines = vec![changes.summary()];
    lines.extend(changes.added.iter().map(|t| format!("+ {:?}", t.text)));
    lines.extend(changes.removed.iter().map(|t| format!("- {:?}", t.text)));
    lines.extend(changes.changed.iter().map(|c| {
        format!(
            "~ {:?}: {} -> {}",
            c.after.text,
            mark_names(&c.before),
            mark_names(&c.after)
        )
    }));
    Ok(lines.join("\n"))
}

fn mark_names(leaf: &quire_engine::TextNode) -> String {
    if leaf.marks.is_empty() {
        return "plain".to_string();
    }
    leaf.marks
        .iter()
        .map(|m| m.kind().as_str())
        .collect::<Vec<_>>()
        .join("+")
}

/// Run the actions through a session over an in-memory surface and return
/// what the surface ends up showing.
pub fn edit(markup: &str, actions: &str, options: ParseOptions) -> Result<String> {
    let actions = serde_json::from_str::<ActionFile>(actions)?.into_actions();

    let mut session = Session::new(markup, options);
    session.attach(MemorySurface::new())?;
    for action in actions {
        let name = action.name();
        let before = session.revision();
        session.apply_action(action)?;
        if session.revision() == before {
            log::info!("{name} changed nothing");
        } else {
            log::info!("{name} -> revision {}", session.revision());
        }
    }

    let Some(surface) = session.disconnect() else {
        bail!("Session lost its surface");
    };
    Ok(surface.markup())
}

/// Save markup, normalized, as the revision after the newest stored one.
pub fn save(
    store: &mut impl DocumentStore,
    doc_id: &str,
    markup: &str,
    options: &ParseOptions,
) -> Result<u64> {
    let revision = store.revisions(doc_id)?.last().map_or(1, |last| last + 1);
    store.save(doc_id, revision, &normalize(markup, options))?;
    Ok(revision)
}

pub fn show(store: &impl DocumentStore, doc_id: &str, revision: Option<u64>) -> Result<String> {
    let markup = match revision {
        Some(revision) => store.load(doc_id, revision)?,
        None => store.latest(doc_id)?.map(|(_, markup)| markup),
    };
    match markup {
        Some(markup) => Ok(markup),
        None => match revision {
            Some(revision) => bail!("No revision {revision} of {doc_id}"),
            None => bail!("Nothing stored for {doc_id}"),
        },
    }
}

pub fn history(store: &impl DocumentStore, doc_id: &str, options: &ParseOptions) -> Result<String> {
    let revisions = store.revisions(doc_id)?;
    if revisions.is_empty() {
        bail!("Nothing stored for {doc_id}");
    }

    let mut lines = Vec::new();
    let mut previous: Option<Document> = None;
    for revision in revisions {
        let Some(markup) = store.load(doc_id, revision)? else {
            continue;
        };
        let doc = parse_with(&markup, options);
        let line = match &previous {
            Some(prev) => format!("{revision}: {}", quire_engine::diff(prev, &doc).summary()),
            None => format!("{revision}: {} text leaves", doc.text_leaves().len()),
        };
        lines.push(line);
        previous = Some(doc);
    }
    Ok(lines.join("\n"))
}
