//! Host-side binding of a note to the formatting engine.
//!
//! An [`EditSession`] owns the current document and selection for one note, serialises
//! every edit through [`EditSession::toggle`] and writes the markup back into the note.

use std::path::Path;

use chrono::Utc;
use log::{debug, warn};

use crate::editing::{Cmd, Document, FormatError, NodeId, Position, Selection, Snapshot};
use crate::io::{self, IoError};
use crate::models::{Note, NoteFile};
use crate::parsing::ParseError;

/// What a successful toggle did
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub changed: Vec<NodeId>,
    pub version: u64,
}

impl ToggleOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EditSession {
    note: Note,
    document: Document,
    selection: Selection,
    dirty: bool,
}

impl EditSession {
    /// Parse a note and place the cursor at the end of its content
    pub fn open(note: Note) -> Result<Self, ParseError> {
        let document = note.parse()?;
        let selection = Selection::collapsed(end_of_document(&document));
        debug!(
            "opened {} with {} blocks",
            note.file.relative_path(),
            document.blocks().len()
        );
        Ok(Self {
            note,
            document,
            selection,
            dirty: false,
        })
    }

    /// Read and open a note from the notes directory
    pub fn load(file: &NoteFile, notes_root: &Path) -> Result<Self, IoError> {
        let note = io::read_note(file, notes_root)?;
        Ok(Self::open(note)?)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the selection after checking it against the current document
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), FormatError> {
        selection.validate(&self.document)?;
        self.selection = selection;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.document.snapshot()
    }

    /// Apply a formatting command to the current selection.
    ///
    /// A rejected selection is logged and returned as an error with the session left
    /// as it was.
    pub fn toggle(&mut self, cmd: Cmd) -> Result<ToggleOutcome, FormatError> {
        let patch = match self.document.apply(cmd, &self.selection) {
            Ok(patch) => patch,
            Err(err) => {
                if err.is_invalid_selection() {
                    warn!(
                        "{}: selection rejected for {cmd:?}: {err}",
                        self.note.file.relative_path()
                    );
                }
                return Err(err);
            }
        };

        self.selection = patch.new_selection;
        if !patch.is_noop() {
            self.document = patch.document;
            self.note.store(&self.document, Utc::now());
            self.dirty = true;
        }
        Ok(ToggleOutcome {
            changed: patch.changed,
            version: patch.version,
        })
    }

    /// True when there are edits not yet written with [`EditSession::save`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn into_note(self) -> Note {
        self.note
    }

    /// Write the note's markup to its editable file.
    ///
    /// A successful write also compacts the document so slots freed by the toggles since
    /// the last save are released; the selection is carried over to the new ids.
    pub fn save(&mut self, notes_root: &Path) -> Result<(), IoError> {
        if !self.dirty {
            return Ok(());
        }
        io::write_note(&self.note, notes_root)?;
        self.dirty = false;
        self.compact();
        Ok(())
    }

    fn compact(&mut self) {
        let (document, ids) = self.document.compacted();
        let remap = |position: Position| {
            ids.get(&position.node)
                .map(|&node| Position::new(node, position.offset))
        };
        self.selection = match (remap(self.selection.anchor), remap(self.selection.focus)) {
            (Some(anchor), Some(focus)) => Selection::new(anchor, focus),
            _ => Selection::collapsed(end_of_document(&document)),
        };
        debug!(
            "compacted {}: {} slots",
            self.note.file.relative_path(),
            document.slots.len()
        );
        self.document = document;
    }
}

fn end_of_document(document: &Document) -> Position {
    match document.blocks().last() {
        Some(&block) => document.end_of(block),
        None => Position::new(document.root(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{BlockKind, ListKind, Node, StyleKind};
    use crate::models::NoteFormat;
    use crate::tests::{create_test_file, create_test_notes_dir};
    use pretty_assertions::assert_eq;

    fn note(content: &str) -> Note {
        Note::new(NoteFile::from("note.html"), content, Utc::now() - chrono::Duration::days(1))
    }

    #[test]
    fn test_open_places_cursor_at_end() {
        let session = EditSession::open(note("<p>one</p><ul><li>two</li></ul>")).unwrap();
        let leaf = session.document().text_leaves(session.document().root())[1];
        assert_eq!(*session.selection(), Selection::collapsed(Position::new(leaf, 3)));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_toggle_updates_note_content() {
        let mut session = EditSession::open(note("<p>hello world</p>")).unwrap();
        let before = session.note().updated_at;
        let leaf = session.document().text_leaves(session.document().root())[0];
        session
            .set_selection(Selection::new(Position::new(leaf, 0), Position::new(leaf, 5)))
            .unwrap();

        let outcome = session.toggle(Cmd::ToggleInlineStyle(StyleKind::Bold)).unwrap();
        assert!(!outcome.is_noop());
        assert_eq!(outcome.version, 1);
        assert_eq!(session.note().content, "<p><b>hello</b> world</p>\n");
        assert!(session.note().updated_at > before);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_noop_keeps_session_clean() {
        let mut session = EditSession::open(note("<p>text</p>")).unwrap();
        let outcome = session.toggle(Cmd::ToggleInlineStyle(StyleKind::Italic)).unwrap();
        assert!(outcome.is_noop());
        assert!(!session.is_dirty());
        assert_eq!(session.note().content, "<p>text</p>");
    }

    #[test]
    fn test_rejected_selection_leaves_state_untouched() {
        let mut session = EditSession::open(note("<p>text</p>")).unwrap();
        let other = Document::from_nodes(vec![Node::paragraph(vec![Node::text("x")])]).unwrap();
        let foreign = Selection::collapsed(Position::new(other.text_leaves(other.root())[0], 0));

        let err = session.set_selection(foreign).unwrap_err();
        assert!(err.is_invalid_selection());
        assert_ne!(*session.selection(), foreign);
    }

    #[test]
    fn test_stale_selection_after_toggle_is_rejected() {
        let mut session = EditSession::open(note("<p>abc</p>")).unwrap();
        let original = *session.selection();
        let old_block = session.document().blocks()[0];
        session.toggle(Cmd::ToggleBlockFormat(BlockKind::Heading1)).unwrap();

        // The text node moves into the heading; the paragraph itself is gone.
        assert!(session.set_selection(original).is_ok());
        let stale = Selection::collapsed(Position::new(old_block, 0));
        let err = session.set_selection(stale).unwrap_err();
        assert!(err.is_invalid_selection());
        assert_eq!(*session.selection(), original);
    }

    #[test]
    fn test_load_markdown_and_save_as_html() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "todo.md", "- milk\n- eggs\n");

        let file = NoteFile::from("todo.md");
        let mut session = EditSession::load(&file, notes_dir.path()).unwrap();
        session.toggle(Cmd::ToggleList(ListKind::Ordered)).unwrap();
        session.save(notes_dir.path()).unwrap();

        assert!(!session.is_dirty());
        let note = session.into_note();
        assert_eq!(note.file.format(), NoteFormat::Html);
        let saved = std::fs::read_to_string(notes_dir.path().join("todo.html")).unwrap();
        assert_eq!(saved, "<ol>\n<li>milk</li>\n<li>eggs</li>\n</ol>\n");
        let original = std::fs::read_to_string(notes_dir.path().join("todo.md")).unwrap();
        assert_eq!(original, "- milk\n- eggs\n");
    }

    #[test]
    fn test_save_compacts_document_and_keeps_selection() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "draft.html", "<p>plain <b>bold</b> text</p>");

        let file = NoteFile::from("draft.html");
        let mut session = EditSession::load(&file, notes_dir.path()).unwrap();
        let bold = session.document().text_leaves(session.document().root())[1];
        session
            .set_selection(Selection::new(Position::new(bold, 0), Position::new(bold, 4)))
            .unwrap();
        session.toggle(Cmd::ToggleInlineStyle(StyleKind::Bold)).unwrap();
        assert!(session.document().slots.iter().any(Option::is_none));
        let before = session.document().to_nodes();
        let selected = session.document().text_offset_in(
            session.document().root(),
            &session.selection().focus,
        );

        session.save(notes_dir.path()).unwrap();

        let document = session.document();
        assert!(document.slots.iter().all(Option::is_some));
        assert_eq!(document.to_nodes(), before);
        assert!(session.selection().validate(document).is_ok());
        assert_eq!(
            document.text_offset_in(document.root(), &session.selection().focus),
            selected
        );

        let outcome = session.toggle(Cmd::ToggleInlineStyle(StyleKind::Italic)).unwrap();
        assert_eq!(outcome.version, 2);
        assert_eq!(session.note().content, "<p>plain <i>bold</i> text</p>\n");
    }
}
