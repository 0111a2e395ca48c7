pub mod block_id;
pub mod document;
pub mod mark;
pub mod node;

pub use block_id::BlockId;
pub use document::{DOCUMENT_VERSION, Document, Path, Violation};
pub use mark::{Mark, MarkKind, canonical_marks};
pub use node::{Content, ImageAttrs, Metadata, Node, NodeKind, Severity, TextNode};
