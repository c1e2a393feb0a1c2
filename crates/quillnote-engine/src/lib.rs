pub mod editing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{
    BlockKind, Cmd, Document, FormatError, ListKind, Node, NodeId, NodeKind, Patch, Position,
    Selection, Snapshot, StyleKind,
};
pub use io::*;
pub use models::{Note, NoteFile, NoteFormat};
pub use parsing::{ParseError, parse_html, parse_markdown, to_html};
pub use session::{EditSession, ToggleOutcome};
