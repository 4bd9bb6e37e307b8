use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::debounce::RescanScheduler;
use crate::io::vault_io::Vault;
use crate::io::watcher::{VaultEvent, VaultWatcher};
use crate::model::intent::Intent;
use crate::model::task::task_key;
use crate::model::view::{CollapseSet, ViewMode, ViewState};
use crate::ops::navigate::EditorCommand;
use crate::ops::session::{Outcome, Session};
use crate::ops::views::{
    FileGroup, FolderGroup, MainView, RenderModel, file_key, folder_key, heading_key,
    hidden_key, tag_key, task_collapse_key,
};
use crate::ops::visibility::{NodeKind, ViewTask};

use super::input;
use super::render;
use super::theme::Theme;

/// Upper bound on how long the loop blocks waiting for input
const TICK: Duration = Duration::from_millis(250);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the filter box
    Filter,
}

/// A task as shown on one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub file_path: String,
    pub line: usize,
    pub text_ch: usize,
    pub text: String,
    pub done: bool,
    /// Some ancestor in the shown subtree is done
    pub parent_done: bool,
    /// Context-only copy inside the hidden section
    pub shell: bool,
    pub tags: Vec<String>,
}

impl TaskRow {
    pub fn key(&self) -> String {
        task_key(&self.file_path, &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Folder { folder: String },
    File { path: String, name: String },
    Heading { heading: String },
    Tag { label: String },
    Task(TaskRow),
    /// Header of the hidden section
    HiddenHeader { count: usize },
    /// Placeholder shown when a view has nothing to list
    Empty(String),
}

/// One line of the flattened task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub kind: RowKind,
    pub depth: usize,
    /// Key in the collapse set, for rows that can fold
    pub collapse_key: Option<String>,
    pub collapsed: bool,
    /// Done/total badge
    pub badge: Option<String>,
    /// Row belongs to the hidden section
    pub hidden: bool,
}

impl Row {
    fn plain(kind: RowKind, depth: usize, hidden: bool) -> Self {
        Row {
            kind,
            depth,
            collapse_key: None,
            collapsed: false,
            badge: None,
            hidden,
        }
    }

    /// Stable identity used to keep the cursor in place across rebuilds
    pub fn identity(&self) -> String {
        let base = match &self.kind {
            RowKind::Task(t) => format!("task:{}:{}", t.file_path, t.line),
            RowKind::HiddenHeader { .. } => "hidden-header".to_string(),
            RowKind::Empty(_) => "empty".to_string(),
            _ => self.collapse_key.clone().unwrap_or_default(),
        };
        if self.hidden { hidden_key(&base) } else { base }
    }
}

// ---------------------------------------------------------------------------
// Row building
// ---------------------------------------------------------------------------

/// Wraps collapse keys for the section a row lives in
struct Section<'c> {
    collapsed: &'c CollapseSet,
    hidden: bool,
}

impl Section<'_> {
    fn key(&self, key: String) -> String {
        if self.hidden { hidden_key(&key) } else { key }
    }

    fn group(&self, kind: RowKind, depth: usize, key: String, badge: String) -> Row {
        let key = self.key(key);
        Row {
            collapsed: self.collapsed.is_collapsed(&key),
            kind,
            depth,
            collapse_key: Some(key),
            badge: Some(badge),
            hidden: self.hidden,
        }
    }
}

fn push_task(rows: &mut Vec<Row>, node: &ViewTask, depth: usize, section: &Section) {
    let task = node.task;
    let has_children = !node.children.is_empty();
    let key = section.key(task_collapse_key(task));
    let collapsed = has_children && section.collapsed.is_collapsed(&key);

    rows.push(Row {
        kind: RowKind::Task(TaskRow {
            file_path: task.file_path.clone(),
            line: task.line,
            text_ch: task.text_ch,
            text: task.text.clone(),
            done: task.done,
            parent_done: node.parent_done,
            shell: node.kind == NodeKind::Shell,
            tags: task.tags.clone(),
        }),
        depth,
        collapse_key: has_children.then_some(key),
        collapsed,
        badge: (!task.children.is_empty()).then(|| node.count().badge()),
        hidden: section.hidden,
    });

    if !collapsed {
        for child in &node.children {
            push_task(rows, child, depth + 1, section);
        }
    }
}

fn push_file(rows: &mut Vec<Row>, group: &FileGroup, depth: usize, section: &Section) {
    let row = section.group(
        RowKind::File {
            path: group.path.clone(),
            name: group.file_name.clone(),
        },
        depth,
        file_key(&group.path),
        group.count.badge(),
    );
    let collapsed = row.collapsed;
    rows.push(row);
    if collapsed {
        return;
    }

    for task in &group.ungrouped {
        push_task(rows, task, depth + 1, section);
    }
    for heading in &group.headings {
        let row = section.group(
            RowKind::Heading {
                heading: heading.heading.clone(),
            },
            depth + 1,
            heading_key(&group.path, &heading.heading),
            heading.count.badge(),
        );
        let collapsed = row.collapsed;
        rows.push(row);
        if !collapsed {
            for task in &heading.tasks {
                push_task(rows, task, depth + 2, section);
            }
        }
    }
}

fn push_folders(rows: &mut Vec<Row>, groups: &[FolderGroup], section: &Section) {
    for group in groups {
        let row = section.group(
            RowKind::Folder {
                folder: group.folder.clone(),
            },
            0,
            folder_key(&group.folder),
            group.count.badge(),
        );
        let collapsed = row.collapsed;
        rows.push(row);
        if !collapsed {
            for file in &group.files {
                push_file(rows, file, 1, section);
            }
        }
    }
}

/// Flatten a render model into display rows, honoring the collapse set.
pub fn build_rows(
    model: &RenderModel,
    view: &ViewState,
    collapsed: &CollapseSet,
    hidden_open: bool,
) -> Vec<Row> {
    let mut rows = Vec::new();
    let main = Section {
        collapsed,
        hidden: false,
    };

    match &model.main {
        MainView::Files(groups) => push_folders(&mut rows, groups, &main),
        MainView::Focus(files) => {
            for file in files {
                push_file(&mut rows, file, 0, &main);
            }
        }
        MainView::Tags(groups) => {
            for group in groups {
                let row = main.group(
                    RowKind::Tag {
                        label: group.key.label().to_string(),
                    },
                    0,
                    tag_key(&group.key),
                    group.count.badge(),
                );
                let collapsed = row.collapsed;
                rows.push(row);
                if collapsed {
                    continue;
                }
                for flat in &group.tasks {
                    let node = ViewTask {
                        task: flat.task,
                        kind: flat.kind,
                        parent_done: flat.parent_done,
                        children: Vec::new(),
                    };
                    push_task(&mut rows, &node, 1, &main);
                }
            }
        }
    }

    if model.main.is_empty() {
        let message = match (view.mode, view.active_document.as_deref()) {
            (ViewMode::Focus, None) => "No active document. Open a task to focus its folder.",
            (ViewMode::Focus, Some(_)) => "No tasks in this folder",
            _ if !view.filter_text.trim().is_empty() => "No tasks match the filter",
            _ => "No tasks",
        };
        rows.push(Row::plain(RowKind::Empty(message.to_string()), 0, false));
    }

    if model.hidden_count > 0 {
        let mut header = Row::plain(
            RowKind::HiddenHeader {
                count: model.hidden_count,
            },
            0,
            true,
        );
        header.collapsed = !hidden_open;
        rows.push(header);
        if hidden_open {
            let hidden = Section {
                collapsed,
                hidden: true,
            };
            push_folders(&mut rows, &model.hidden, &hidden);
        }
    }

    rows
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Main application state
pub struct App {
    pub session: Session,
    pub view: ViewState,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub rows: Vec<Row>,
    /// Cursor index into `rows`
    pub cursor: usize,
    /// First visible row
    pub scroll_offset: usize,
    /// Hidden section expanded
    pub hidden_open: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// Byte offset of the cursor in the filter text
    pub filter_cursor: usize,
    /// Transient message for the status row
    pub notice: Option<String>,
    /// Editor to launch once the terminal is released
    pub pending_editor: Option<EditorCommand>,
    pub scheduler: RescanScheduler,
}

impl App {
    pub fn new(session: Session) -> Self {
        let theme = Theme::from_settings(&session.settings().ui);
        let view = ViewState {
            show_done: session.default_show_done(),
            ..Default::default()
        };
        let mut app = App {
            session,
            view,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            hidden_open: false,
            show_help: false,
            filter_cursor: 0,
            notice: None,
            pending_editor: None,
            scheduler: RescanScheduler::default(),
        };
        app.rebuild_rows();
        app
    }

    /// Recompute rows from the cached corpus, keeping the cursor on the same
    /// row when it still exists.
    pub fn rebuild_rows(&mut self) {
        let anchor = self.rows.get(self.cursor).map(Row::identity);
        let model = self.session.render(&self.view);
        self.rows = build_rows(&model, &self.view, &self.session.collapsed, self.hidden_open);

        if let Some(anchor) = anchor
            && let Some(idx) = self.rows.iter().position(|r| r.identity() == anchor)
        {
            self.cursor = idx;
        }
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    pub fn current_row(&self) -> Option<&Row> {
        self.rows.get(self.cursor)
    }

    pub fn current_task(&self) -> Option<&TaskRow> {
        match &self.current_row()?.kind {
            RowKind::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let max = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    pub fn jump_top(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    /// Fold or unfold the row under the cursor
    pub fn toggle_collapse(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        if matches!(row.kind, RowKind::HiddenHeader { .. }) {
            self.hidden_open = !self.hidden_open;
        } else if let Some(key) = row.collapse_key.clone() {
            self.session.collapsed.toggle(&key);
        } else {
            return;
        }
        self.rebuild_rows();
    }

    /// Fold (`expand == false`) or unfold the current row if it is not already
    pub fn set_collapsed(&mut self, expand: bool) {
        if let Some(row) = self.current_row()
            && row.collapsed == expand
        {
            self.toggle_collapse();
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == ViewMode::Focus && self.view.active_document.is_none() {
            self.view.active_document = self.current_document();
        }
        self.view.mode = mode;
        self.cursor = 0;
        self.scroll_offset = 0;
        self.rebuild_rows();
    }

    pub fn cycle_view_mode(&mut self) {
        let next = match self.view.mode {
            ViewMode::Files => ViewMode::Focus,
            ViewMode::Focus => ViewMode::Tags,
            ViewMode::Tags => ViewMode::Files,
        };
        self.set_view_mode(next);
    }

    /// Document of the row under the cursor
    fn current_document(&self) -> Option<String> {
        let row = self.current_row()?;
        match &row.kind {
            RowKind::Task(t) => Some(t.file_path.clone()),
            RowKind::File { path, .. } => Some(path.clone()),
            _ => None,
        }
    }

    pub fn toggle_show_done(&mut self) {
        self.view.show_done = !self.view.show_done;
        self.rebuild_rows();
    }

    pub fn set_filter(&mut self, text: String) {
        self.filter_cursor = text.len();
        self.view.filter_text = text;
        self.cursor = 0;
        self.rebuild_rows();
    }

    /// Enter on a row: fold groups, open tasks
    pub fn activate(&mut self) {
        if self.current_task().is_some() {
            self.open_current();
        } else {
            self.toggle_collapse();
        }
    }

    pub fn toggle_current(&mut self) {
        let Some(task) = self.current_task() else {
            return;
        };
        let intent = Intent::ToggleDone {
            file_path: task.file_path.clone(),
            line: task.line,
            text: task.text.clone(),
            done: task.done,
        };
        self.apply(intent);
    }

    pub fn open_current(&mut self) {
        let Some(task) = self.current_task() else {
            return;
        };
        let intent = Intent::Navigate {
            file_path: task.file_path.clone(),
            line: task.line,
            ch: task.text_ch,
        };
        self.apply(intent);
    }

    /// Hide the task, file or folder under the cursor, or unhide it when the
    /// row is in the hidden section.
    pub fn hide_or_unhide_current(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        let hidden = row.hidden;
        let intent = match (&row.kind, hidden) {
            (RowKind::Task(t), false) => Intent::HideTask { key: t.key() },
            (RowKind::Task(t), true) => Intent::UnhideTask {
                file_path: t.file_path.clone(),
                key: t.key(),
            },
            (RowKind::File { path, .. }, false) => Intent::HideFile {
                file_path: path.clone(),
            },
            (RowKind::File { path, .. }, true) => Intent::UnhideFile {
                file_path: path.clone(),
            },
            (RowKind::Folder { folder }, false) => Intent::HideFolder {
                folder: folder.clone(),
            },
            (RowKind::Folder { folder }, true) => Intent::UnhideFolder {
                folder: folder.clone(),
            },
            _ => {
                self.notice = Some("Only tasks, files and folders can be hidden".into());
                return;
            }
        };
        self.apply(intent);
    }

    /// Run an intent through the session and react to its outcome.
    pub fn apply(&mut self, intent: Intent) {
        match self.session.apply(intent) {
            Ok(Outcome::Rerender) => self.rebuild_rows(),
            Ok(Outcome::Toggled { done }) => {
                self.notice = Some(if done { "Completed" } else { "Reopened" }.into());
                // the watcher reports the write too; this covers vaults it cannot see
                self.scheduler.notify(Instant::now());
            }
            Ok(Outcome::Open { command, file_path }) => {
                self.view.active_document = Some(file_path);
                self.pending_editor = Some(command);
                if self.view.mode == ViewMode::Focus {
                    self.rebuild_rows();
                }
            }
            Ok(Outcome::Notice(message)) => self.notice = Some(message),
            Ok(Outcome::Unchanged) => {}
            Err(e) => {
                tracing::error!(error = %e, "action failed");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Replace the corpus with a fresh scan and re-render.
    pub fn rescan(&mut self) {
        if let Err(e) = self.session.rescan() {
            tracing::warn!(error = %e, "rescan failed");
            self.notice = Some(format!("Rescan failed: {}", e));
        }
        self.rebuild_rows();
    }
}

// ---------------------------------------------------------------------------
// Terminal lifecycle
// ---------------------------------------------------------------------------

/// Run the TUI application
pub fn run(vault_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let vault = Vault::locate(vault_dir)?;
    let root = vault.root.clone();
    let session = Session::open(vault)?;
    let mut app = App::new(session);

    let watcher = match VaultWatcher::start(&root) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "file watching unavailable");
            app.notice = Some("Live updates unavailable; press r to rescan".into());
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&VaultWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        let timeout = app
            .scheduler
            .time_until_due(Instant::now())
            .map_or(TICK, |d| d.min(TICK));
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(watcher) = watcher {
            for VaultEvent::Changed(kind, paths) in watcher.poll() {
                tracing::debug!(?kind, count = paths.len(), "change notification");
                app.scheduler.notify(Instant::now());
            }
        }

        if app.scheduler.take_due(Instant::now()) {
            app.rescan();
            app.scheduler.finish();
        }

        if let Some(command) = app.pending_editor.take() {
            launch_editor(terminal, app, &command)?;
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Hand the terminal to the editor and take it back afterwards.
fn launch_editor(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    command: &EditorCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let status = command.to_command().status();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => app.notice = Some(format!("{} exited with {}", command.program, s)),
        Err(e) => {
            tracing::warn!(program = %command.program, error = %e, "editor failed to start");
            app.notice = Some(format!("Could not start {}: {}", command.program, e));
        }
    }
    Ok(())
}
