use crate::model::task::{CompletionStatus, Priority, Task};

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary:
/// `[>] Update install docs !high (<id>)`
pub fn format_task_line(task: &Task) -> String {
    let checkbox = task.completion_status.checkbox_char();
    let priority = match task.priority {
        Priority::Medium => String::new(),
        other => format!(" !{}", other.label()),
    };
    format!("[{}] {}{} ({})", checkbox, task.title, priority, task.id)
}

/// Format a task with its subtasks, indented two spaces per level
pub fn format_task_tree(task: &Task, indent: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let prefix = "  ".repeat(indent);
    lines.push(format!("{}{}", prefix, format_task_line(task)));
    for child in &task.children {
        lines.extend(format_task_tree(child, indent + 1));
    }
    lines
}

/// Format every root with its subtree
pub fn format_forest(tasks: &[Task]) -> Vec<String> {
    let mut lines = Vec::new();
    for task in tasks {
        lines.extend(format_task_tree(task, 0));
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "[{}] {}",
        task.completion_status.checkbox_char(),
        task.title
    ));
    lines.push(format!("id: {}", task.id));
    lines.push(format!("status: {}", task.completion_status.label()));
    lines.push(format!("priority: {}", task.priority.label()));
    if let Some(parent) = &task.parent_id {
        lines.push(format!("parent: {}", parent));
    }
    lines.push(format!("created: {}", task.created_at.format("%Y-%m-%d %H:%M")));
    lines.push(format!("updated: {}", task.updated_at.format("%Y-%m-%d %H:%M")));

    if let Some(description) = &task.description {
        lines.push("description:".to_string());
        for line in description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if task.has_children() {
        lines.push(String::new());
        lines.push(format!(
            "subtasks ({}/{} completed):",
            task.completed_children(),
            task.children.len()
        ));
        for child in &task.children {
            for line in format_task_tree(child, 1) {
                lines.push(line);
            }
        }
    }

    lines
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "urgent" => Ok(Priority::Urgent),
        _ => Err(format!(
            "unknown priority '{}' (expected: low, medium, high, urgent)",
            s
        )),
    }
}

pub fn parse_status(s: &str) -> Result<CompletionStatus, String> {
    match s {
        "todo" => Ok(CompletionStatus::Todo),
        "in-progress" => Ok(CompletionStatus::InProgress),
        "paused" => Ok(CompletionStatus::Paused),
        "completed" => Ok(CompletionStatus::Completed),
        _ => Err(format!(
            "unknown status '{}' (expected: todo, in-progress, paused, completed)",
            s
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
