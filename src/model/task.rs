use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// All priorities in cycle order
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Advance one step: low → medium → high → urgent → low
    pub fn cycle(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Urgent,
            Priority::Urgent => Priority::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Workflow state of a task. Kept in lockstep with `completed`:
/// a task is completed iff its status is `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Paused,
}

impl CompletionStatus {
    /// All statuses in cycle order
    pub const ALL: [CompletionStatus; 4] = [
        CompletionStatus::Todo,
        CompletionStatus::InProgress,
        CompletionStatus::Paused,
        CompletionStatus::Completed,
    ];

    /// Advance one step: todo → in-progress → paused → completed → todo
    pub fn cycle(self) -> CompletionStatus {
        match self {
            CompletionStatus::Todo => CompletionStatus::InProgress,
            CompletionStatus::InProgress => CompletionStatus::Paused,
            CompletionStatus::Paused => CompletionStatus::Completed,
            CompletionStatus::Completed => CompletionStatus::Todo,
        }
    }

    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            CompletionStatus::Todo => ' ',
            CompletionStatus::InProgress => '>',
            CompletionStatus::Paused => '~',
            CompletionStatus::Completed => 'x',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompletionStatus::Todo => "todo",
            CompletionStatus::InProgress => "in-progress",
            CompletionStatus::Paused => "paused",
            CompletionStatus::Completed => "completed",
        }
    }
}

/// One node in the task forest. A task exclusively owns its subtasks;
/// `parent_id` is a redundant back-reference that must match the actual
/// container (see `ops::forest::fix_parent_references`).
///
/// Serialized as camelCase JSON with RFC 3339 timestamps — the on-disk
/// format of `tasks.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completion_status: CompletionStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task from a draft. `completed` is derived from the draft's
    /// status so the completed⇔status bijection holds from birth.
    pub fn new(
        id: String,
        draft: TaskDraft,
        parent_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Task {
        let completed = draft.completion_status == CompletionStatus::Completed;
        Task {
            id,
            title: draft.title,
            description: draft.description,
            completed,
            priority: draft.priority,
            completion_status: draft.completion_status,
            children: Vec::new(),
            parent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children that are completed (for the n/N summary)
    pub fn completed_children(&self) -> usize {
        self.children.iter().filter(|c| c.completed).count()
    }

    /// Merge a partial update into this task and refresh `updated_at`.
    /// Blind merge: completion fields are written as given, with no
    /// propagation — callers that change completion route through
    /// `TaskStore::toggle_task` / `cycle_completion_status` instead.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            // An empty string clears the description
            self.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.completion_status {
            self.completion_status = status;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }
}

/// Payload for creating a task (the add form / `cn add` arguments)
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completion_status: CompletionStatus,
}

/// Partial update for `TaskStore::update_task`. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completion_status: Option<CompletionStatus>,
    pub completed: Option<bool>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
