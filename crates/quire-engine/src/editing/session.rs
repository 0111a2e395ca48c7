use std::collections::VecDeque;

use super::action::Action;
use super::apply::apply;
use super::surface::{Surface, SurfaceError};
use crate::factory::ensure_document_ids;
use crate::models::Document;
use crate::parsing::{ParseOptions, parse_with};
use crate::render::render;

/// Upper bound on commits triggered by listeners from a single entry point.
const MAX_CASCADE: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no surface is attached")]
    NotObserving,
    #[error("session is disconnected")]
    Disconnected,
    #[error("a surface is already attached")]
    AlreadyAttached,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Observing,
    Disconnected,
}

/// Handle given to listeners while a change is being committed.
///
/// Listeners cannot reach the session itself. Actions they submit run once
/// the current commit has finished, each with its own render.
#[derive(Debug, Default)]
pub struct Dispatch {
    queued: Vec<Action>,
    ignored_notifications: usize,
}

impl Dispatch {
    pub fn submit(&mut self, action: Action) {
        self.queued.push(action);
    }

    /// Report a surface change seen during a commit. Such changes are the
    /// session's own render echoing back and are ignored.
    pub fn surface_changed(&mut self) {
        self.ignored_notifications += 1;
    }
}

pub type Listener = Box<dyn FnMut(&Document, &mut Dispatch)>;

/// Owns a [`Document`] and keeps a live [`Surface`] in sync with it.
///
/// Edits flow both ways. Actions and [`Session::update_model`] change the
/// document, which is rendered into the surface. Edits made directly on the
/// surface are reported with [`Session::on_surface_mutation`] and the
/// surface markup is parsed back into the document.
///
/// ```
/// use quire_engine::editing::{Action, MemorySurface, Session};
/// use quire_engine::parsing::ParseOptions;
///
/// let mut session = Session::new(
///     r#"<p data-block-id="a">one</p><p data-block-id="b">two</p>"#,
///     ParseOptions::default(),
/// );
/// session.attach(MemorySurface::new()).unwrap();
/// session
///     .apply_action(Action::DeleteBlock { block_id: "a".into() })
///     .unwrap();
/// assert_eq!(session.document().content.len(), 1);
/// assert_eq!(session.revision(), 1);
/// ```
pub struct Session<S: Surface> {
    document: Document,
    options: ParseOptions,
    surface: Option<S>,
    state: SessionState,
    listeners: Vec<Listener>,
    revision: u64,
}

impl<S: Surface> Session<S> {
    pub fn new(markup: &str, options: ParseOptions) -> Self {
        Self::with_document(parse_with(markup, &options), options)
    }

    pub fn with_document(mut document: Document, options: ParseOptions) -> Self {
        ensure_document_ids(&mut document);
        Self {
            document,
            options,
            surface: None,
            state: SessionState::Uninitialized,
            listeners: Vec::new(),
            revision: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of commits so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Register a listener called with the new document after every commit.
    pub fn subscribe(&mut self, listener: impl FnMut(&Document, &mut Dispatch) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Attach `surface` and render the current document into it.
    pub fn attach(&mut self, mut surface: S) -> Result<(), SessionError> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Observing => return Err(SessionError::AlreadyAttached),
            SessionState::Disconnected => return Err(SessionError::Disconnected),
        }

        surface.render(&render(&self.document))?;
        surface.take_records();
        self.surface = Some(surface);
        self.state = SessionState::Observing;
        log::debug!("surface attached");
        Ok(())
    }

    /// Stop observing and hand the surface back. Later calls fail with
    /// [`SessionError::Disconnected`].
    pub fn disconnect(&mut self) -> Option<S> {
        self.state = SessionState::Disconnected;
        self.listeners.clear();
        self.surface.take()
    }

    /// Apply `action`, render the result and notify listeners.
    ///
    /// An action that leaves the document unchanged is dropped without a
    /// render.
    pub fn apply_action(&mut self, action: Action) -> Result<(), SessionError> {
        self.ensure_observing()?;
        self.drain(VecDeque::from([action]))
    }

    /// Replace the document wholesale, for example when loading content.
    pub fn update_model(&mut self, mut document: Document) -> Result<(), SessionError> {
        self.ensure_observing()?;
        ensure_document_ids(&mut document);
        self.render_and_swap(document)?;
        let queue = self.notify();
        self.drain(queue)
    }

    /// Adopt an edit the host made directly on the surface.
    ///
    /// Returns whether there was anything to adopt. Change records produced
    /// by the session's own renders have already been drained, so a
    /// notification with no pending records is ignored.
    pub fn on_surface_mutation(&mut self) -> Result<bool, SessionError> {
        self.ensure_observing()?;
        let surface = self.surface.as_mut().ok_or(SessionError::NotObserving)?;

        let records = surface.take_records();
        if records == 0 {
            log::debug!("ignoring surface notification without change records");
            return Ok(false);
        }

        let mut document = parse_with(&surface.markup(), &self.options);
        let generated = ensure_document_ids(&mut document);
        if generated > 0 {
            log::debug!("backfilled {generated} block ids from surface markup");
        }

        self.document = document;
        self.revision += 1;
        log::trace!("adopted surface edit as revision {}", self.revision);

        let queue = self.notify();
        self.drain(queue)?;
        Ok(true)
    }

    fn ensure_observing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Observing => Ok(()),
            SessionState::Uninitialized => Err(SessionError::NotObserving),
            SessionState::Disconnected => Err(SessionError::Disconnected),
        }
    }

    /// Apply queued actions one by one, each with its own render, until the
    /// queue is empty or the cascade limit is hit.
    fn drain(&mut self, mut queue: VecDeque<Action>) -> Result<(), SessionError> {
        let mut cascaded = 0;
        while let Some(action) = queue.pop_front() {
            if cascaded == MAX_CASCADE {
                log::warn!(
                    "dropping {} queued actions after {MAX_CASCADE} cascaded commits",
                    queue.len() + 1
                );
                break;
            }
            cascaded += 1;

            let next = apply(&self.document, &action);
            if next == self.document {
                continue;
            }
            self.render_and_swap(next)?;
            queue.extend(self.notify());
        }
        Ok(())
    }

    /// Render `next` and make it current. On failure the current document
    /// is kept.
    fn render_and_swap(&mut self, next: Document) -> Result<(), SessionError> {
        let surface = self.surface.as_mut().ok_or(SessionError::NotObserving)?;
        let markup = render(&next);
        if let Err(e) = surface.render(&markup) {
            log::warn!("surface render failed, keeping revision {}: {e}", self.revision);
            return Err(e.into());
        }
        surface.take_records();

        self.document = next;
        self.revision += 1;
        log::trace!("rendered revision {} ({} bytes)", self.revision, markup.len());
        Ok(())
    }

    fn notify(&mut self) -> VecDeque<Action> {
        let mut dispatch = Dispatch::default();
        for listener in &mut self.listeners {
            listener(&self.document, &mut dispatch);
        }
        if dispatch.ignored_notifications > 0 {
            log::debug!(
                "ignored {} surface notifications raised during commit",
                dispatch.ignored_notifications
            );
        }
        dispatch.queued.into()
    }
}
