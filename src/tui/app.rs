use std::error::Error;
use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::load_config;
use crate::io::storage::Storage;
use crate::model::prefs::UiPrefs;
use crate::model::task::Task;
use crate::store::{StoreEvent, TaskStore};

use super::form::TaskForm;
use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Form,
    Confirm,
}

/// Pending confirmation popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    /// Delete one task (id, title, descendant count)
    Delete(String, String, usize),
    /// Delete every task
    ClearAll,
    /// Replace the forest with the sample tree
    Sample,
}

/// One visible row of the sidebar tree
#[derive(Debug, Clone)]
pub struct FlatRow {
    pub id: String,
    pub depth: usize,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_last_sibling: bool,
    /// For tree continuation lines: whether each ancestor is a last sibling
    pub ancestor_last: Vec<bool>,
}

/// Main application state
pub struct App {
    pub store: TaskStore,
    pub store_events: mpsc::Receiver<StoreEvent>,
    pub storage: Storage,
    pub theme: Theme,
    pub mode: Mode,
    pub form: Option<TaskForm>,
    pub confirm: Option<Confirm>,
    /// Cursor index into the flat visible row list
    pub cursor: usize,
    /// First visible row of the sidebar
    pub scroll_offset: usize,
    pub sidebar_collapsed: bool,
    pub sidebar_width: u16,
    pub show_help: bool,
    pub help_scroll: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(mut store: TaskStore, storage: Storage, theme: Theme, prefs: UiPrefs) -> App {
        let store_events = store.subscribe();
        App {
            store,
            store_events,
            storage,
            theme,
            mode: Mode::Navigate,
            form: None,
            confirm: None,
            cursor: 0,
            scroll_offset: 0,
            sidebar_collapsed: prefs.is_sidebar_collapsed,
            sidebar_width: UiPrefs::clamp_width(prefs.sidebar_width),
            show_help: false,
            help_scroll: 0,
            should_quit: false,
        }
    }

    /// Build the flat list of visible sidebar rows from the forest and the
    /// store's expansion set
    pub fn visible_rows(&self) -> Vec<FlatRow> {
        let mut rows = Vec::new();
        flatten_tasks(self.store.tasks(), &self.store, 0, &[], &mut rows);
        rows
    }

    /// Id of the task under the cursor, if any
    pub fn cursor_task_id(&self) -> Option<String> {
        self.visible_rows().get(self.cursor).map(|row| row.id.clone())
    }

    /// Select a task, expand its ancestors, and move the cursor onto it
    pub fn focus_task(&mut self, id: &str) {
        self.store.navigate_to_task(id);
        if let Some(idx) = self.visible_rows().iter().position(|row| row.id == id) {
            self.cursor = idx;
        }
    }

    /// Persist the sidebar preferences (best effort; the status row shows
    /// store errors, prefs are not worth interrupting the user over)
    pub fn save_prefs(&self) {
        let _ = self.storage.save_prefs(&UiPrefs {
            is_sidebar_collapsed: self.sidebar_collapsed,
            sidebar_width: self.sidebar_width,
        });
    }
}

/// Recursively flatten tasks into visible rows based on the expansion set
fn flatten_tasks(
    tasks: &[Task],
    store: &TaskStore,
    depth: usize,
    ancestor_last: &[bool],
    rows: &mut Vec<FlatRow>,
) {
    let count = tasks.len();
    for (i, task) in tasks.iter().enumerate() {
        let is_last = i == count - 1;
        let has_children = task.has_children();
        let is_expanded = has_children && store.is_expanded(&task.id);

        rows.push(FlatRow {
            id: task.id.clone(),
            depth,
            has_children,
            is_expanded,
            is_last_sibling: is_last,
            ancestor_last: ancestor_last.to_vec(),
        });

        if is_expanded {
            let mut next_ancestor_last = ancestor_last.to_vec();
            next_ancestor_last.push(is_last);
            flatten_tasks(&task.children, store, depth + 1, &next_ancestor_last, rows);
        }
    }
}

/// Run the TUI application against the given data directory
pub fn run(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(data_dir)?;
    let config = load_config(data_dir);
    let prefs = storage.load_prefs();
    let store = TaskStore::load(storage.clone());
    let theme = Theme::from_config(&config.ui);

    let mut app = App::new(store, storage, theme, prefs);

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

    let result = run_event_loop(&mut terminal, &mut app);

    // Persist sidebar preferences on the way out
    app.save_prefs();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        // Drain change notifications; the draw at the top of the loop picks
        // up whatever state they announced.
        while app.store_events.try_recv().is_ok() {}

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
