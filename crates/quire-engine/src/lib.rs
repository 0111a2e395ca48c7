pub mod diff;
pub mod editing;
pub mod factory;
pub mod io;
pub mod models;
pub mod parsing;
pub mod render;
pub mod vocabulary;

// Re-export key types for easier usage
pub use diff::{DocumentDiff, FormatChange, diff};
pub use editing::{Action, BlockPosition, Position, Selection, Session, SessionError};
pub use io::{DocumentStore, FsStore, MemoryStore, StoreError};
pub use models::*;
pub use parsing::{ParseOptions, parse, parse_with};
pub use render::render;
