use log::{debug, warn};

use crate::editing::formatting::{block, inline, list};
use crate::editing::{BlockKind, Document, FormatError, ListKind, Patch, Selection, StyleKind};

/// Formatting commands that can be applied to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    ToggleInlineStyle(StyleKind),
    ToggleBlockFormat(BlockKind),
    ToggleList(ListKind),
}

impl Document {
    /// Apply a formatting command to the current selection.
    ///
    /// The document itself is never modified: the result comes back as a [`Patch`]
    /// holding the new document and selection. A no-op (collapsed selection for an
    /// inline style, a format that is already in place) is an unchanged patch, not an
    /// error.
    ///
    /// ```rust
    /// # use quillnote_engine::editing::{Cmd, Document, Node, Position, Selection, StyleKind};
    /// let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("hello world")])]).unwrap();
    /// let leaf = doc.text_leaves(doc.root())[0];
    /// let selection = Selection::new(Position::new(leaf, 0), Position::new(leaf, 5));
    ///
    /// let patch = doc.apply(Cmd::ToggleInlineStyle(StyleKind::Bold), &selection).unwrap();
    /// assert_eq!(patch.version, doc.version() + 1);
    /// assert_eq!(patch.document.plain_text(), "hello world");
    /// ```
    pub fn apply(&self, cmd: Cmd, selection: &Selection) -> Result<Patch, FormatError> {
        let result = apply_command(self, cmd, selection);
        match &result {
            Ok(patch) if patch.is_noop() => debug!("{cmd:?}: no change"),
            Ok(patch) => debug!(
                "{cmd:?}: version {} -> {}, {} node(s) changed",
                self.version(),
                patch.version,
                patch.changed.len()
            ),
            Err(err) if err.is_invalid_selection() => warn!("{cmd:?} rejected: {err}"),
            Err(err) => warn!("{cmd:?} failed: {err}"),
        }
        result
    }
}

/// Dispatch a command to its toggle algorithm
pub(crate) fn apply_command(
    document: &Document,
    cmd: Cmd,
    selection: &Selection,
) -> Result<Patch, FormatError> {
    match cmd {
        Cmd::ToggleInlineStyle(style) => inline::toggle_inline_style(document, style, selection),
        Cmd::ToggleBlockFormat(kind) => block::toggle_block_format(document, kind, selection),
        Cmd::ToggleList(kind) => list::toggle_list(document, kind, selection),
    }
}
