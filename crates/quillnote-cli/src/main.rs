use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, error};
use quillnote_config::Config;
use quillnote_engine::editing::{RenderBlock, Snapshot};
use quillnote_engine::{BlockKind, Cmd, EditSession, ListKind, NoteFile, Selection, StyleKind, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

/// Flat `(block index, byte offset)` point in the rendered note
type Point = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Notes,
    Editor,
}

struct App {
    notes_path: PathBuf,
    files: Vec<NoteFile>,
    file_list_state: ListState,
    pane: Pane,
    session: Option<EditSession>,
    anchor: Point,
    cursor: Point,
    status: String,
}

impl App {
    fn new(notes_path: PathBuf) -> Result<Self> {
        let files = io::scan_note_files(&notes_path)?;

        let mut app = Self {
            notes_path,
            files,
            file_list_state: ListState::default(),
            pane: Pane::Notes,
            session: None,
            anchor: (0, 0),
            cursor: (0, 0),
            status: String::new(),
        };

        if !app.files.is_empty() {
            app.file_list_state.select(Some(0));
        }

        Ok(app)
    }

    fn next_file(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.files.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
    }

    fn previous_file(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(i) => i - 1,
        };
        self.file_list_state.select(Some(i));
    }

    /// Open the highlighted note, saving pending edits of the current one first
    fn open_selected_note(&mut self) {
        let Some(file) = self
            .file_list_state
            .selected()
            .and_then(|index| self.files.get(index))
            .cloned()
        else {
            return;
        };
        if !self.save() {
            return;
        }

        match EditSession::load(&file, &self.notes_path) {
            Ok(session) => {
                let snapshot = session.snapshot();
                let end = snapshot
                    .locate(&session.selection().focus)
                    .unwrap_or((0, 0));
                self.anchor = end;
                self.cursor = end;
                self.status = format!("Opened {}", file.display_path());
                self.session = Some(session);
                self.pane = Pane::Editor;
            }
            Err(e) => {
                error!("failed to open {}: {e}", file.relative_path());
                self.status = format!("Error opening note: {e}");
            }
        }
    }

    /// Write unsaved edits; false when the write failed
    fn save(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return true;
        };
        if !session.is_dirty() {
            return true;
        }
        match session.save(&self.notes_path) {
            Ok(()) => {
                let saved = session.note().file.clone();
                self.status = format!("Saved {}", saved.display_path());
                // An imported Markdown note is saved under a new name
                if !self.files.contains(&saved) {
                    self.refresh_files(&saved);
                }
                true
            }
            Err(e) => {
                error!("failed to save: {e}");
                self.status = format!("Error saving note: {e}");
                false
            }
        }
    }

    fn refresh_files(&mut self, keep_selected: &NoteFile) {
        match io::scan_note_files(&self.notes_path) {
            Ok(files) => {
                self.files = files;
                let index = self.files.iter().position(|file| file == keep_selected);
                self.file_list_state.select(index.or(Some(0)));
            }
            Err(e) => self.status = format!("Error scanning notes: {e}"),
        }
    }

    fn move_cursor(&mut self, step: impl Fn(&Snapshot, Point) -> Point, extend: bool) {
        let Some(session) = &self.session else {
            return;
        };
        self.cursor = step(&session.snapshot(), self.cursor);
        if !extend {
            self.anchor = self.cursor;
        }
    }

    fn toggle(&mut self, cmd: Cmd) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let snapshot = session.snapshot();
        if let Some(selection) = engine_selection(&snapshot, self.anchor, self.cursor)
            && let Err(e) = session.set_selection(selection)
        {
            self.status = format!("Selection rejected: {e}");
            return;
        }

        match session.toggle(cmd) {
            Ok(outcome) => {
                debug!("{cmd:?} changed {} nodes", outcome.changed.len());
                let snapshot = session.snapshot();
                let selection = *session.selection();
                self.anchor = snapshot
                    .locate(&selection.anchor)
                    .unwrap_or_else(|| clamp_point(&snapshot, self.anchor));
                self.cursor = snapshot
                    .locate(&selection.focus)
                    .unwrap_or_else(|| clamp_point(&snapshot, self.cursor));
                self.status = if outcome.is_noop() {
                    format!("{} unchanged", describe(cmd))
                } else {
                    format!("{} (unsaved)", describe(cmd))
                };
            }
            Err(e) => self.status = format!("Error: {e}"),
        }
    }

    /// Dispatch a key press; true when the app should exit.
    ///
    /// Quitting saves first and is refused while the save fails, leaving the error in
    /// the status line.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (self.pane, key.code) {
            (_, KeyCode::Char('q')) => return self.save(),
            (_, KeyCode::Tab) => {
                self.pane = match self.pane {
                    Pane::Notes if self.session.is_some() => Pane::Editor,
                    _ => Pane::Notes,
                };
            }
            (_, KeyCode::Char('w')) => {
                if self.session.as_ref().is_some_and(|s| !s.is_dirty()) {
                    self.status = "Nothing to save".to_string();
                } else {
                    self.save();
                }
            }
            (Pane::Notes, KeyCode::Down | KeyCode::Char('j')) => self.next_file(),
            (Pane::Notes, KeyCode::Up | KeyCode::Char('k')) => self.previous_file(),
            (Pane::Notes, KeyCode::Enter) => self.open_selected_note(),
            (Pane::Editor, _) => self.handle_editor_key(key),
            _ => {}
        }
        false
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Left => self.move_cursor(step_left, extend),
            KeyCode::Right => self.move_cursor(step_right, extend),
            KeyCode::Up => self.move_cursor(step_up, extend),
            KeyCode::Down => self.move_cursor(step_down, extend),
            KeyCode::Char('b') => self.toggle(Cmd::ToggleInlineStyle(StyleKind::Bold)),
            KeyCode::Char('i') => self.toggle(Cmd::ToggleInlineStyle(StyleKind::Italic)),
            KeyCode::Char('u') => self.toggle(Cmd::ToggleInlineStyle(StyleKind::Underline)),
            KeyCode::Char('s') => self.toggle(Cmd::ToggleInlineStyle(StyleKind::Strikethrough)),
            KeyCode::Char('1') => self.toggle(Cmd::ToggleBlockFormat(BlockKind::Heading1)),
            KeyCode::Char('2') => self.toggle(Cmd::ToggleBlockFormat(BlockKind::Heading2)),
            KeyCode::Char('3') => self.toggle(Cmd::ToggleBlockFormat(BlockKind::Heading3)),
            KeyCode::Char('>') => self.toggle(Cmd::ToggleBlockFormat(BlockKind::Blockquote)),
            KeyCode::Char('-') => self.toggle(Cmd::ToggleList(ListKind::Unordered)),
            KeyCode::Char('o') => self.toggle(Cmd::ToggleList(ListKind::Ordered)),
            _ => {}
        }
    }
}

fn describe(cmd: Cmd) -> String {
    match cmd {
        Cmd::ToggleInlineStyle(style) => format!("{style:?}"),
        Cmd::ToggleBlockFormat(kind) => format!("{kind:?}"),
        Cmd::ToggleList(kind) => format!("{kind:?} list"),
    }
}

/// Selection between two flat points, `None` for a note with no blocks
fn engine_selection(snapshot: &Snapshot, anchor: Point, focus: Point) -> Option<Selection> {
    let anchor = snapshot.position_at(anchor.0, anchor.1)?;
    let focus = snapshot.position_at(focus.0, focus.1)?;
    Some(Selection::new(anchor, focus))
}

fn block_len(snapshot: &Snapshot, block: usize) -> usize {
    snapshot.blocks.get(block).map_or(0, |b| b.content.len())
}

/// Keep a point inside the note and on a char boundary
fn clamp_point(snapshot: &Snapshot, (block, offset): Point) -> Point {
    let Some(last) = snapshot.blocks.len().checked_sub(1) else {
        return (0, 0);
    };
    let block = block.min(last);
    let content = &snapshot.blocks[block].content;
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }
    (block, offset)
}

fn step_left(snapshot: &Snapshot, point: Point) -> Point {
    let (block, offset) = clamp_point(snapshot, point);
    match snapshot.blocks.get(block) {
        Some(b) if offset > 0 => {
            let previous = b.content[..offset]
                .char_indices()
                .next_back()
                .map_or(0, |(i, _)| i);
            (block, previous)
        }
        _ if block > 0 => (block - 1, block_len(snapshot, block - 1)),
        _ => (block, offset),
    }
}

fn step_right(snapshot: &Snapshot, point: Point) -> Point {
    let (block, offset) = clamp_point(snapshot, point);
    match snapshot.blocks.get(block) {
        Some(b) if offset < b.content.len() => {
            let width = b.content[offset..].chars().next().map_or(0, char::len_utf8);
            (block, offset + width)
        }
        _ if block + 1 < snapshot.blocks.len() => (block + 1, 0),
        _ => (block, offset),
    }
}

fn step_up(snapshot: &Snapshot, (block, offset): Point) -> Point {
    clamp_point(snapshot, (block.saturating_sub(1), offset))
}

fn step_down(snapshot: &Snapshot, (block, offset): Point) -> Point {
    clamp_point(snapshot, (block + 1, offset))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Determine notes path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let notes_path;
    let from_config;

    if args.len() == 2 {
        notes_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                notes_path = config.notes_path;
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No notes path provided and no config file found");
                eprintln!("Usage: {} <notes-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <notes-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [notes-folder-path]", args[0]);
        process::exit(1);
    };

    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }

    let mut app = App::new(notes_path)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.handle_key(key) {
            return Ok(());
        }
    }
}

fn pane_border(app: &App, pane: Pane) -> Style {
    if app.pane == pane {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let file_items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| ListItem::new(Line::from(format!("📄 {}", file.display_path()))))
        .collect();

    let files_list = List::new(file_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_border(app, Pane::Notes))
                .title("Notes"),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, chunks[0], &mut app.file_list_state);

    let (title, content_text) = match &app.session {
        Some(session) => {
            let marker = if session.is_dirty() { " *" } else { "" };
            (
                format!("{}{marker}", session.note().title()),
                render_note(&session.snapshot(), app.anchor, app.cursor),
            )
        }
        None => (
            "Note".to_string(),
            vec![Line::from("Select a note and press Enter to open it")],
        ),
    };

    let content = Paragraph::new(content_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(pane_border(app, Pane::Editor))
                .title(title),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    let help = Line::from(
        "q quit | Tab pane | Enter open | ←→↑↓ move, Shift extends | b i u s style | 1 2 3 heading | > quote | - o list | w save",
    );
    let status = Line::from(Span::styled(
        app.status.clone(),
        Style::default().fg(Color::Cyan),
    ));
    f.render_widget(Paragraph::new(vec![status, help]), rows[1]);
}

fn render_note(snapshot: &Snapshot, anchor: Point, cursor: Point) -> Vec<Line<'static>> {
    let (start, end) = if anchor <= cursor {
        (anchor, cursor)
    } else {
        (cursor, anchor)
    };

    let mut lines = Vec::new();
    for (index, block) in snapshot.blocks.iter().enumerate() {
        let selected = if index < start.0 || index > end.0 {
            None
        } else {
            let from = if index == start.0 { start.1 } else { 0 };
            let to = if index == end.0 { end.1 } else { block.content.len() };
            Some(from..to)
        };
        let caret = (cursor.0 == index).then_some(cursor.1);
        lines.push(render_block(block, selected, caret));

        let next_in_same_list = snapshot
            .blocks
            .get(index + 1)
            .is_some_and(|next| block.list.is_some() && next.list.is_some_and(|m| m.number > 1));
        if !next_in_same_list {
            lines.push(Line::default());
        }
    }
    lines
}

fn block_style(kind: BlockKind) -> Style {
    match kind {
        BlockKind::Heading1 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockKind::Heading2 => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        BlockKind::Heading3 => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        BlockKind::Blockquote => Style::default().fg(Color::Gray),
        BlockKind::Paragraph | BlockKind::ListItem => Style::default(),
    }
}

fn style_modifier(style: StyleKind) -> Modifier {
    match style {
        StyleKind::Bold => Modifier::BOLD,
        StyleKind::Italic => Modifier::ITALIC,
        StyleKind::Underline => Modifier::UNDERLINED,
        StyleKind::Strikethrough => Modifier::CROSSED_OUT,
    }
}

/// One line per block: prefix, then runs of text sharing a style
fn render_block(
    block: &RenderBlock,
    selected: Option<std::ops::Range<usize>>,
    caret: Option<usize>,
) -> Line<'static> {
    let base = block_style(block.kind);
    let prefix = match (block.kind, block.list) {
        (_, Some(marker)) if marker.kind == ListKind::Ordered => format!("{}. ", marker.number),
        (_, Some(_)) => "• ".to_string(),
        (BlockKind::Blockquote, None) => "│ ".to_string(),
        _ => String::new(),
    };

    let mut spans = vec![Span::styled(prefix, Style::default().fg(Color::DarkGray))];
    let mut run = String::new();
    let mut run_style = base;
    for (offset, ch) in block.content.char_indices() {
        let mut style = block
            .styles_at(offset)
            .iter()
            .fold(base, |style, &s| style.add_modifier(style_modifier(s)));
        if selected.as_ref().is_some_and(|range| range.contains(&offset)) {
            style = style.bg(Color::DarkGray);
        }
        if caret == Some(offset) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    if caret == Some(block.content.len()) {
        spans.push(Span::styled(" ", base.add_modifier(Modifier::REVERSED)));
    }
    Line::from(spans)
}
