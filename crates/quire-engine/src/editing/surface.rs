//! The live editable surface a [`Session`](super::Session) keeps in sync.
//!
//! A surface is anything that displays markup and can be edited directly by
//! its host, for example a `contenteditable` element or a terminal buffer.
//! The session writes full renders into it and is told, through
//! [`Session::on_surface_mutation`](super::Session::on_surface_mutation),
//! when the host changed it.

/// Failure reported by a surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface is detached")]
    Detached,
    #[error("surface rejected the render: {0}")]
    Rejected(String),
}

pub trait Surface {
    /// Replace the whole content of the surface with `markup`.
    fn render(&mut self, markup: &str) -> Result<(), SurfaceError>;

    /// Current content, in the same markup vocabulary.
    fn markup(&self) -> String;

    /// Drain pending structural-change records and return how many there
    /// were. Records caused by the session's own renders are drained this
    /// way so they are not mistaken for host edits.
    fn take_records(&mut self) -> usize;
}

/// A surface held in memory, for tests and headless use.
#[derive(Debug, Default)]
pub struct MemorySurface {
    content: String,
    renders: usize,
    pending: usize,
    fail_next: Option<SurfaceError>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful renders so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Simulate a host edit: replace the content and queue a change record.
    pub fn edit(&mut self, markup: impl Into<String>) {
        self.content = markup.into();
        self.pending += 1;
    }

    /// Make the next render fail with `error`.
    pub fn fail_next_render(&mut self, error: SurfaceError) {
        self.fail_next = Some(error);
    }
}

impl Surface for MemorySurface {
    fn render(&mut self, markup: &str) -> Result<(), SurfaceError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.content = markup.to_string();
        self.renders += 1;
        self.pending += 1;
        Ok(())
    }

    fn markup(&self) -> String {
        self.content.clone()
    }

    fn take_records(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }
}
