use chrono::{DateTime, Utc};

use crate::editing::Document;
use crate::models::{NoteFile, NoteFormat};
use crate::parsing::{self, ParseError};

/// A note as stored: its file, its content in the file's format and when it last changed
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub file: NoteFile,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(file: NoteFile, content: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            file,
            content: content.into(),
            updated_at,
        }
    }

    /// Parse the content according to the file's format
    pub fn parse(&self) -> Result<Document, ParseError> {
        match self.file.format() {
            NoteFormat::Html => parsing::parse_html(&self.content),
            NoteFormat::Markdown => parsing::parse_markdown(&self.content),
        }
    }

    /// Replace the content with the markup of `document`, moving an imported note onto
    /// its editable file, and stamp the edit time
    pub fn store(&mut self, document: &Document, at: DateTime<Utc>) {
        self.file = self.file.editable();
        self.content = parsing::to_html(document);
        self.updated_at = at;
    }

    pub fn title(&self) -> &str {
        self.file.display_name()
    }
}
