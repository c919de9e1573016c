//! State for the add/edit task modal: two single-line text inputs plus two
//! wrap-around selectors, with Tab-order focus.

use unicode_segmentation::UnicodeSegmentation;

use crate::model::task::{CompletionStatus, Priority, Task, TaskDraft, TaskPatch};

/// A single-line text input with a grapheme-aware cursor (byte offset)
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        InputField::default()
    }

    pub fn with_value(value: &str) -> Self {
        InputField {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    /// Byte offset of the start of the grapheme before the cursor
    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Byte offset just past the grapheme at the cursor
    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let start = self.prev_boundary();
            self.value.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            let end = self.next_boundary();
            self.value.replace_range(self.cursor..end, "");
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.prev_boundary();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.next_boundary();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }
}

/// What submitting the form does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    NewRoot,
    NewChild(String),
    Edit(String),
}

/// Focusable form fields, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Title,
    Description,
    Priority,
    Status,
}

impl FormFocus {
    pub fn next(self) -> FormFocus {
        match self {
            FormFocus::Title => FormFocus::Description,
            FormFocus::Description => FormFocus::Priority,
            FormFocus::Priority => FormFocus::Status,
            FormFocus::Status => FormFocus::Title,
        }
    }

    pub fn prev(self) -> FormFocus {
        match self {
            FormFocus::Title => FormFocus::Status,
            FormFocus::Description => FormFocus::Title,
            FormFocus::Priority => FormFocus::Description,
            FormFocus::Status => FormFocus::Priority,
        }
    }
}

pub struct TaskForm {
    pub target: FormTarget,
    pub title: InputField,
    pub description: InputField,
    pub priority_idx: usize,
    pub status_idx: usize,
    pub focus: FormFocus,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn new_root() -> Self {
        TaskForm {
            target: FormTarget::NewRoot,
            title: InputField::new(),
            description: InputField::new(),
            priority_idx: default_priority_idx(),
            status_idx: 0,
            focus: FormFocus::Title,
            error: None,
        }
    }

    pub fn new_child(parent_id: &str) -> Self {
        TaskForm {
            target: FormTarget::NewChild(parent_id.to_string()),
            ..TaskForm::new_root()
        }
    }

    pub fn edit(task: &Task) -> Self {
        TaskForm {
            target: FormTarget::Edit(task.id.clone()),
            title: InputField::with_value(&task.title),
            description: InputField::with_value(task.description.as_deref().unwrap_or("")),
            priority_idx: Priority::ALL
                .iter()
                .position(|p| *p == task.priority)
                .unwrap_or(default_priority_idx()),
            status_idx: CompletionStatus::ALL
                .iter()
                .position(|s| *s == task.completion_status)
                .unwrap_or(0),
            focus: FormFocus::Title,
            error: None,
        }
    }

    pub fn title_label(&self) -> &'static str {
        match self.target {
            FormTarget::NewRoot => "Add Task",
            FormTarget::NewChild(_) => "Add Subtask",
            FormTarget::Edit(_) => "Edit Task",
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::ALL[self.priority_idx]
    }

    pub fn status(&self) -> CompletionStatus {
        CompletionStatus::ALL[self.status_idx]
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn focused_input(&mut self) -> Option<&mut InputField> {
        match self.focus {
            FormFocus::Title => Some(&mut self.title),
            FormFocus::Description => Some(&mut self.description),
            _ => None,
        }
    }

    /// Left/right on a selector field cycles through its values with
    /// wrap-around; on a text field it moves the cursor.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.focus {
            FormFocus::Title | FormFocus::Description => {
                if let Some(input) = self.focused_input() {
                    if right {
                        input.move_right();
                    } else {
                        input.move_left();
                    }
                }
            }
            FormFocus::Priority => {
                self.priority_idx = cycle_index(self.priority_idx, Priority::ALL.len(), right);
            }
            FormFocus::Status => {
                self.status_idx =
                    cycle_index(self.status_idx, CompletionStatus::ALL.len(), right);
            }
        }
    }

    /// Validate the form as a creation draft. Empty titles are rejected
    /// here, before the store is ever involved.
    pub fn draft(&self) -> Result<TaskDraft, String> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Err("title cannot be empty".to_string());
        }
        let description = self.description.value.trim();
        Ok(TaskDraft {
            title: title.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            priority: self.priority(),
            completion_status: self.status(),
        })
    }

    /// Validate the form as an edit patch. The status selector writes both
    /// the status and the matching `completed` flag (blind merge; the store
    /// does not propagate on `update_task`).
    pub fn patch(&self) -> Result<TaskPatch, String> {
        let title = self.title.value.trim();
        if title.is_empty() {
            return Err("title cannot be empty".to_string());
        }
        Ok(TaskPatch {
            title: Some(title.to_string()),
            description: Some(self.description.value.trim().to_string()),
            priority: Some(self.priority()),
            completion_status: Some(self.status()),
            completed: Some(self.status() == CompletionStatus::Completed),
        })
    }
}

fn default_priority_idx() -> usize {
    Priority::ALL
        .iter()
        .position(|p| *p == Priority::default())
        .unwrap_or(0)
}

fn cycle_index(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else if idx == 0 {
        len - 1
    } else {
        idx - 1
    }
}
