use crossterm::event::{KeyCode, KeyEvent};

use crate::model::prefs::UiPrefs;
use crate::ops::forest;

use super::app::{App, Confirm, Mode};
use super::form::{FormTarget, TaskForm};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts everything
    if app.show_help {
        match key.code {
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
                app.show_help = false;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                app.help_scroll = app.help_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            _ => {}
        }
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Form => handle_form(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}

// ---------------------------------------------------------------------------
// Navigate mode
// ---------------------------------------------------------------------------

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::Esc => app.store.clear_error(),

        // Cursor movement
        KeyCode::Char('j') | KeyCode::Down => move_cursor(app, 1),
        KeyCode::Char('k') | KeyCode::Up => move_cursor(app, -1),
        KeyCode::Char('g') => app.cursor = 0,
        KeyCode::Char('G') => {
            app.cursor = app.visible_rows().len().saturating_sub(1);
        }

        // Selection
        KeyCode::Enter => {
            if let Some(id) = app.cursor_task_id() {
                app.focus_task(&id);
            }
        }
        // Jump to the nth subtask of the selected task (detail pane list)
        KeyCode::Char(c @ '1'..='9') => {
            let nth = c as usize - '1' as usize;
            let child = app
                .store
                .selected_task()
                .and_then(|task| task.children.get(nth))
                .map(|child| child.id.clone());
            if let Some(id) = child {
                app.focus_task(&id);
            }
        }

        // Completion / status / priority
        KeyCode::Char(' ') => {
            if let Some(id) = app.cursor_task_id() {
                app.store.toggle_task(&id);
            }
        }
        KeyCode::Char('s') => {
            if let Some(id) = app.cursor_task_id() {
                app.store.cycle_completion_status(&id);
            }
        }
        KeyCode::Char('p') => {
            if let Some(id) = app.cursor_task_id() {
                app.store.cycle_priority(&id);
            }
        }

        // Expansion
        KeyCode::Tab => {
            if let Some(row) = app.visible_rows().get(app.cursor).cloned()
                && row.has_children
            {
                app.store.toggle_expansion(&row.id);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(row) = app.visible_rows().get(app.cursor).cloned()
                && row.has_children
                && !row.is_expanded
            {
                app.store.toggle_expansion(&row.id);
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(row) = app.visible_rows().get(app.cursor).cloned()
                && row.is_expanded
            {
                app.store.toggle_expansion(&row.id);
            }
        }

        // Forms
        KeyCode::Char('a') => {
            app.form = Some(TaskForm::new_root());
            app.mode = Mode::Form;
        }
        KeyCode::Char('A') => {
            if let Some(id) = app.cursor_task_id() {
                app.form = Some(TaskForm::new_child(&id));
                app.mode = Mode::Form;
            }
        }
        KeyCode::Char('e') => {
            let form = app
                .cursor_task_id()
                .and_then(|id| app.store.find_task(&id))
                .map(TaskForm::edit);
            if let Some(form) = form {
                app.form = Some(form);
                app.mode = Mode::Form;
            }
        }

        // Destructive actions go through a confirmation popup
        KeyCode::Char('d') => {
            let confirm = app.cursor_task_id().and_then(|id| {
                app.store.find_task(&id).map(|task| {
                    let mut descendants = 0usize;
                    forest::for_each_task(&task.children, &mut |_| descendants += 1);
                    Confirm::Delete(id.clone(), task.title.clone(), descendants)
                })
            });
            if let Some(confirm) = confirm {
                app.confirm = Some(confirm);
                app.mode = Mode::Confirm;
            }
        }
        KeyCode::Char('D') => {
            if !app.store.tasks().is_empty() {
                app.confirm = Some(Confirm::ClearAll);
                app.mode = Mode::Confirm;
            }
        }
        KeyCode::Char('m') => {
            if app.store.tasks().is_empty() {
                app.store.populate_sample();
                app.cursor = 0;
            } else {
                app.confirm = Some(Confirm::Sample);
                app.mode = Mode::Confirm;
            }
        }

        // Sidebar
        KeyCode::Char('b') => {
            app.sidebar_collapsed = !app.sidebar_collapsed;
            app.save_prefs();
        }
        KeyCode::Char('[') => {
            app.sidebar_width = UiPrefs::clamp_width(app.sidebar_width.saturating_sub(2));
            app.save_prefs();
        }
        KeyCode::Char(']') => {
            app.sidebar_width = UiPrefs::clamp_width(app.sidebar_width.saturating_add(2));
            app.save_prefs();
        }

        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: i64) {
    let len = app.visible_rows().len();
    if len == 0 {
        app.cursor = 0;
        return;
    }
    let max = len - 1;
    let next = app.cursor as i64 + delta;
    app.cursor = next.clamp(0, max as i64) as usize;
}

// ---------------------------------------------------------------------------
// Form mode
// ---------------------------------------------------------------------------

fn handle_form(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.form = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => submit_form(app),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = &mut app.form {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = &mut app.form {
                form.prev_field();
            }
        }
        KeyCode::Left => {
            if let Some(form) = &mut app.form {
                form.handle_left_right(false);
            }
        }
        KeyCode::Right => {
            if let Some(form) = &mut app.form {
                form.handle_left_right(true);
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = &mut app.form
                && let Some(input) = form.focused_input()
            {
                input.backspace();
            }
        }
        KeyCode::Delete => {
            if let Some(form) = &mut app.form
                && let Some(input) = form.focused_input()
            {
                input.delete();
            }
        }
        KeyCode::Home => {
            if let Some(form) = &mut app.form
                && let Some(input) = form.focused_input()
            {
                input.move_home();
            }
        }
        KeyCode::End => {
            if let Some(form) = &mut app.form
                && let Some(input) = form.focused_input()
            {
                input.move_end();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = &mut app.form
                && let Some(input) = form.focused_input()
            {
                input.insert_char(c);
            }
        }
        _ => {}
    }
}

fn submit_form(app: &mut App) {
    let Some(mut form) = app.form.take() else {
        return;
    };

    let outcome = match &form.target {
        FormTarget::NewRoot => form.draft().map(|draft| {
            let id = app.store.add_task(draft, None);
            app.focus_task(&id);
        }),
        FormTarget::NewChild(parent_id) => {
            let parent_id = parent_id.clone();
            form.draft().map(|draft| {
                let id = app.store.add_task(draft, Some(parent_id.as_str()));
                app.store.expand(&parent_id);
                app.focus_task(&id);
            })
        }
        FormTarget::Edit(id) => {
            let id = id.clone();
            form.patch().map(|patch| {
                app.store.update_task(&id, patch);
            })
        }
    };

    match outcome {
        Ok(()) => {
            app.mode = Mode::Navigate;
        }
        Err(message) => {
            form.error = Some(message);
            app.form = Some(form);
        }
    }
}

// ---------------------------------------------------------------------------
// Confirm mode
// ---------------------------------------------------------------------------

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(confirm) = app.confirm.take() {
                match confirm {
                    Confirm::Delete(id, _, _) => {
                        app.store.delete_task(&id);
                        let len = app.visible_rows().len();
                        app.cursor = app.cursor.min(len.saturating_sub(1));
                    }
                    Confirm::ClearAll => {
                        app.store.clear_all();
                        app.cursor = 0;
                    }
                    Confirm::Sample => {
                        app.store.populate_sample();
                        app.cursor = 0;
                    }
                }
            }
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::Storage;
    use crate::model::task::TaskDraft;
    use crate::store::TaskStore;
    use crate::tui::theme::Theme;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_tasks(titles: &[&str]) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let mut store = TaskStore::load(storage.clone());
        for title in titles {
            store.add_task(
                TaskDraft {
                    title: (*title).into(),
                    ..Default::default()
                },
                None,
            );
        }
        let app = App::new(store, storage, Theme::default(), UiPrefs::default());
        (dir, app)
    }

    #[test]
    fn test_space_toggles_cursor_task() {
        let (_dir, mut app) = app_with_tasks(&["One", "Two"]);
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert!(app.store.tasks()[0].completed);
        assert!(!app.store.tasks()[1].completed);

        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert!(app.store.tasks()[1].completed);
    }

    #[test]
    fn test_cursor_clamps_at_ends() {
        let (_dir, mut app) = app_with_tasks(&["One", "Two"]);
        handle_key(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.cursor, 0);
        for _ in 0..5 {
            handle_key(&mut app, key(KeyCode::Char('j')));
        }
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_form_flow_adds_task() {
        let (_dir, mut app) = app_with_tasks(&[]);
        handle_key(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::Form);
        for c in "New task".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.store.tasks().len(), 1);
        assert_eq!(app.store.tasks()[0].title, "New task");
        // The new task is selected
        assert!(app.store.selected_task().is_some());
    }

    #[test]
    fn test_form_keeps_error_on_empty_title() {
        let (_dir, mut app) = app_with_tasks(&[]);
        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Form);
        let form = app.form.as_ref().unwrap();
        assert!(form.error.is_some());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (_dir, mut app) = app_with_tasks(&["Victim"]);
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(app.store.tasks().len(), 1);

        // Decline → nothing happens
        handle_key(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.store.tasks().len(), 1);

        // Accept → gone
        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn test_sidebar_toggle_and_resize_clamp() {
        let (_dir, mut app) = app_with_tasks(&["One"]);
        assert!(!app.sidebar_collapsed);
        handle_key(&mut app, key(KeyCode::Char('b')));
        assert!(app.sidebar_collapsed);

        for _ in 0..100 {
            handle_key(&mut app, key(KeyCode::Char(']')));
        }
        assert_eq!(app.sidebar_width, crate::model::prefs::MAX_SIDEBAR_WIDTH);
        for _ in 0..100 {
            handle_key(&mut app, key(KeyCode::Char('[')));
        }
        assert_eq!(app.sidebar_width, crate::model::prefs::MIN_SIDEBAR_WIDTH);
    }
}
