//! Reading and writing the persisted forms of a note.
//!
//! Notes are stored as a small subset of HTML (`html`), and Markdown files can be
//! imported (`markdown`). Both front ends produce the same [`builder::Element`] tree,
//! which `builder` flattens into a valid [`Document`](crate::editing::Document).

pub mod builder;
pub mod cursor;
pub mod html;
pub mod markdown;

use crate::editing::FormatError;

pub use html::{parse_html, to_html};
pub use markdown::parse_markdown;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },
    #[error("markup does not describe a valid document: {0}")]
    Structure(#[from] FormatError),
}
