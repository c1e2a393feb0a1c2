use relative_path::{RelativePath, RelativePathBuf};

/// How a note file's content is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFormat {
    /// Note markup; the editable form
    Html,
    /// Imported on open and saved back as a sibling `.html` file
    Markdown,
}

impl NoteFormat {
    /// Format for a file name, or `None` when the file is not a note
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(NoteFormat::Html),
            "md" | "markdown" => Some(NoteFormat::Markdown),
            _ => None,
        }
    }
}

/// A note file with a path relative to the notes directory and display-friendly names
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFile {
    relative_path: RelativePathBuf,
    format: NoteFormat,
    display_name: String,
    display_path: String,
}

impl NoteFile {
    /// Create from a relative path; files without a note extension are treated as markup
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let format = relative_path
            .file_name()
            .and_then(NoteFormat::from_file_name)
            .unwrap_or(NoteFormat::Html);
        let display_path = strip_extension(relative_path.as_str()).to_string();
        let display_name = relative_path
            .file_name()
            .map(strip_extension)
            .unwrap_or("Untitled")
            .to_string();

        Self {
            relative_path,
            format,
            display_name,
            display_path,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    pub fn format(&self) -> NoteFormat {
        self.format
    }

    /// File name without its extension
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Relative path without the extension, for titles
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// The markup file this note is saved to: itself, or the `.html` sibling of an
    /// imported Markdown file
    pub fn editable(&self) -> NoteFile {
        match self.format {
            NoteFormat::Html => self.clone(),
            NoteFormat::Markdown => NoteFile::new(self.relative_path.with_extension("html")),
        }
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && NoteFormat::from_file_name(name).is_some() => stem,
        _ => name,
    }
}

impl From<RelativePathBuf> for NoteFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for NoteFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ideas.html", Some(NoteFormat::Html))]
    #[case("Ideas.HTM", Some(NoteFormat::Html))]
    #[case("journal.md", Some(NoteFormat::Markdown))]
    #[case("image.png", None)]
    #[case("README", None)]
    fn test_format_from_file_name(#[case] name: &str, #[case] expected: Option<NoteFormat>) {
        assert_eq!(NoteFormat::from_file_name(name), expected);
    }

    #[test]
    fn test_display_names_strip_extension() {
        let file = NoteFile::from("projects/plan.html");
        assert_eq!(file.display_name(), "plan");
        assert_eq!(file.display_path(), "projects/plan");
        assert_eq!(file.relative_path().as_str(), "projects/plan.html");
        assert_eq!(file.format(), NoteFormat::Html);
    }

    #[test]
    fn test_markdown_notes_save_to_html_sibling() {
        let file = NoteFile::from("daily/2024-05-01.md");
        assert_eq!(file.format(), NoteFormat::Markdown);
        assert_eq!(file.display_name(), "2024-05-01");

        let editable = file.editable();
        assert_eq!(editable.relative_path().as_str(), "daily/2024-05-01.html");
        assert_eq!(editable.format(), NoteFormat::Html);
        assert_eq!(editable.display_path(), file.display_path());
    }

    #[test]
    fn test_dotfile_keeps_its_name() {
        let file = NoteFile::from(".html");
        assert_eq!(file.display_name(), ".html");
    }
}
