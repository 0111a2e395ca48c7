/*!
 * # Editing
 *
 * Edits are expressed as [`Action`]s, plain records describing one intent
 * each. [`apply`] turns a document and an action into a new document and
 * never mutates its input; an action that does not apply (an unknown block
 * id, a stale path) returns the document unchanged.
 *
 * A [`Session`] owns the current document and keeps a live [`Surface`] in
 * step with it:
 *
 * - Controlled edits go through [`Session::apply_action`]. The new document
 *   is rendered into the surface and listeners are notified.
 * - Uncontrolled edits happen on the surface itself. The host reports them
 *   with [`Session::on_surface_mutation`], and the surface markup is parsed
 *   back and adopted as the document.
 *
 * Listeners get a [`Dispatch`] rather than the session, so they can queue
 * follow-up actions but cannot re-enter a commit in progress. Change
 * records caused by the session's own renders are drained right after each
 * render, so a render never comes back as an uncontrolled edit.
 *
 * ## Addressing
 *
 * Blocks are addressed by [`BlockId`](crate::models::BlockId). Text leaves
 * are addressed by child-index paths: a [`Selection`] uses paths from the
 * document root, `update_text` uses a path relative to its block.
 */

pub mod action;
pub mod apply;
pub mod selection;
pub mod session;
pub mod surface;

pub use action::{Action, BlockPosition};
pub use apply::{ApplyError, apply, try_apply};
pub use selection::{Position, Selection};
pub use session::{Dispatch, Listener, Session, SessionError, SessionState};
pub use surface::{MemorySurface, Surface, SurfaceError};
