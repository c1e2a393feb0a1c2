use crate::models::{Note, NoteFile, NoteFormat};
use crate::parsing::ParseError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("Could not read note: {0}")]
    Parse(#[from] ParseError),
}

/// Read a file under the notes directory
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write a file under the notes directory, creating parent directories as needed
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Scan for note files in the notes directory.
///
/// A Markdown file whose `.html` sibling exists has already been imported and is left
/// out in favour of the sibling.
pub fn scan_note_files(notes_root: &Path) -> Result<Vec<NoteFile>, IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(
            "notes directory not found".to_string(),
        ));
    }

    let mut paths = Vec::new();
    scan_directory_recursive(notes_root, notes_root, &mut paths)?;
    paths.sort();

    let files: Vec<NoteFile> = paths
        .iter()
        .map(|path| NoteFile::new(path.clone()))
        .filter(|file| {
            file.format() != NoteFormat::Markdown
                || !paths.contains(&file.editable().relative_path().to_relative_path_buf())
        })
        .collect();
    debug!("found {} notes under {}", files.len(), notes_root.display());
    Ok(files)
}

fn scan_directory_recursive(
    notes_root: &Path,
    dir: &Path,
    files: &mut Vec<RelativePathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(notes_root, &path, files)?;
        } else if let Some(name) = path.file_name().and_then(|name| name.to_str())
            && NoteFormat::from_file_name(name).is_some()
            && let Ok(relative) = path.strip_prefix(notes_root)
            && let Ok(relative) = RelativePathBuf::from_path(relative)
        {
            files.push(relative);
        }
    }

    Ok(())
}

/// Load a note with its modification time
pub fn read_note(file: &NoteFile, notes_root: &Path) -> Result<Note, IoError> {
    let content = read_file(file.relative_path(), notes_root)?;
    let modified = fs::metadata(file.relative_path().to_path(notes_root))?.modified()?;
    info!("loaded note {}", file.relative_path());
    Ok(Note::new(
        file.clone(),
        content,
        DateTime::<Utc>::from(modified),
    ))
}

/// Save a note's content to its file
pub fn write_note(note: &Note, notes_root: &Path) -> Result<(), IoError> {
    write_file(note.file.relative_path(), notes_root, &note.content)?;
    info!("saved note {}", note.file.relative_path());
    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_file, create_test_notes_dir};

    #[test]
    fn test_scan_finds_note_files() {
        // Given a notes directory with markup, markdown and other files
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "b.html", "<p>b</p>");
        create_test_file(&notes_dir, "a.md", "# a");
        create_test_file(&notes_dir, "image.png", "fake image data");

        // When scanning for notes
        let files = scan_note_files(notes_dir.path()).unwrap();

        // Then only notes are found, in path order
        let names: Vec<&str> = files.iter().map(|f| f.relative_path().as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.html"]);
    }

    #[test]
    fn test_scan_nested_directories() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "root.html", "<p>root</p>");
        std::fs::create_dir(notes_dir.path().join("sub")).unwrap();
        create_test_file(&notes_dir, "sub/nested.html", "<p>nested</p>");

        let files = scan_note_files(notes_dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.relative_path().as_str()).collect();
        assert_eq!(names, vec!["root.html", "sub/nested.html"]);
        assert_eq!(files[1].display_path(), "sub/nested");
    }

    #[test]
    fn test_imported_markdown_is_hidden_by_its_html_sibling() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "plan.md", "# Plan");
        create_test_file(&notes_dir, "plan.html", "<h1>Plan</h1>");

        let files = scan_note_files(notes_dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].format(), NoteFormat::Html);
    }

    #[test]
    fn test_handle_invalid_notes_directory() {
        let result = scan_note_files(Path::new("/this/path/does/not/exist"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("notes directory"));
    }

    #[test]
    fn test_validate_notes_dir() {
        let notes_dir = create_test_notes_dir();
        assert!(validate_notes_dir(notes_dir.path()).is_ok());
        assert!(matches!(
            validate_notes_dir(Path::new("/nonexistent/path")),
            Err(IoError::InvalidNotesDir(_))
        ));
    }

    #[test]
    fn test_read_note_carries_modification_time() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "note.html", "<p>hello</p>");

        let before = Utc::now() - chrono::Duration::minutes(1);
        let note = read_note(&NoteFile::from("note.html"), notes_dir.path()).unwrap();
        assert_eq!(note.content, "<p>hello</p>");
        assert!(note.updated_at > before);
    }

    #[test]
    fn test_read_note_not_found() {
        let notes_dir = create_test_notes_dir();
        let result = read_note(&NoteFile::from("missing.html"), notes_dir.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_note_creates_parent_directories() {
        let notes_dir = create_test_notes_dir();
        let note = Note::new(NoteFile::from("folder/sub/new.html"), "<p>x</p>\n", Utc::now());

        write_note(&note, notes_dir.path()).unwrap();

        let written = read_file(note.file.relative_path(), notes_dir.path()).unwrap();
        assert_eq!(written, "<p>x</p>\n");
        assert!(notes_dir.path().join("folder").join("sub").is_dir());
    }
}
