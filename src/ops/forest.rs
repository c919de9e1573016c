use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::{CompletionStatus, Task};

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a task anywhere in the forest. Pre-order depth-first: a parent is
/// visited before its children, siblings in insertion order, so with unique
/// ids the match is deterministic.
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_task(&task.children, id) {
            return Some(found);
        }
    }
    None
}

/// Find a task anywhere in the forest, returning a mutable reference.
pub fn find_task_mut<'a>(tasks: &'a mut [Task], id: &str) -> Option<&'a mut Task> {
    for task in tasks.iter_mut() {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_task_mut(&mut task.children, id) {
            return Some(found);
        }
    }
    None
}

/// Id path from a root down to `target` (inclusive), first pre-order match.
pub fn find_path(tasks: &[Task], target: &str) -> Option<Vec<String>> {
    for task in tasks {
        if task.id == target {
            return Some(vec![task.id.clone()]);
        }
        if let Some(mut path) = find_path(&task.children, target) {
            path.insert(0, task.id.clone());
            return Some(path);
        }
    }
    None
}

/// Iterate over every task in the forest, parents before children.
pub fn for_each_task(tasks: &[Task], f: &mut dyn FnMut(&Task)) {
    for task in tasks {
        f(task);
        for_each_task(&task.children, f);
    }
}

// ---------------------------------------------------------------------------
// Structural mutation
// ---------------------------------------------------------------------------

/// Remove the task with the given id (and its entire subtree) from wherever
/// it occurs in the forest. Returns whether anything was removed.
pub fn remove_task(tasks: &mut Vec<Task>, id: &str) -> bool {
    if let Some(idx) = tasks.iter().position(|t| t.id == id) {
        tasks.remove(idx);
        return true;
    }
    for task in tasks.iter_mut() {
        if remove_task(&mut task.children, id) {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Completion propagation
// ---------------------------------------------------------------------------

/// Force every task in the given subtrees to the same completion value.
/// Completing maps to `completed` status; un-completing maps to
/// `in-progress` (work is assumed to resume, not reset to `todo`).
pub fn cascade_completion(tasks: &mut [Task], completed: bool, now: DateTime<Utc>) {
    for task in tasks.iter_mut() {
        task.completed = completed;
        task.completion_status = if completed {
            CompletionStatus::Completed
        } else {
            CompletionStatus::InProgress
        };
        task.updated_at = now;
        cascade_completion(&mut task.children, completed, now);
    }
}

/// Bottom-up reconciliation after a bulk load: a task with children is
/// completed iff all of its children are. Leaves are left untouched, and
/// timestamps are not refreshed — this restores an invariant rather than
/// recording a user edit.
pub fn recalculate_completion_states(tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        recalculate_completion_states(&mut task.children);
        if !task.children.is_empty() {
            let all_done = task.children.iter().all(|c| c.completed);
            if task.completed != all_done {
                task.completed = all_done;
                task.completion_status = if all_done {
                    CompletionStatus::Completed
                } else {
                    CompletionStatus::InProgress
                };
            }
        }
    }
}

/// Top-down pass that overwrites every task's `parent_id` to match its
/// actual container. Used after loading data whose back-references may be
/// stale or missing.
pub fn fix_parent_references(tasks: &mut [Task], parent_id: Option<&str>) {
    for task in tasks.iter_mut() {
        task.parent_id = parent_id.map(str::to_string);
        let id = task.id.clone();
        fix_parent_references(&mut task.children, Some(&id));
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Per-status task counts over a whole forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub paused: usize,
    pub completed: usize,
}

pub fn count_statuses(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for_each_task(tasks, &mut |task| {
        counts.total += 1;
        match task.completion_status {
            CompletionStatus::Todo => counts.todo += 1,
            CompletionStatus::InProgress => counts.in_progress += 1,
            CompletionStatus::Paused => counts.paused += 1,
            CompletionStatus::Completed => counts.completed += 1,
        }
    });
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
