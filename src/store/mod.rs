//! The task tree store: the authoritative in-memory forest plus the
//! transient session state around it (selection, expansion, last error).
//!
//! Every public mutation runs to completion synchronously, persists the
//! whole forest to the storage slot, and then notifies subscribers once.
//! Lookups on unknown ids are silent no-ops; persistence failures are
//! recorded in a single user-visible error string, never thrown.

use std::sync::mpsc;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;

use crate::io::storage::Storage;
use crate::model::task::{CompletionStatus, Priority, Task, TaskDraft, TaskPatch};
use crate::ops::forest;
use crate::util::id::new_task_id;

/// Notification sent to subscribers after each public mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed,
}

pub struct TaskStore {
    tasks: Vec<Task>,
    selected_task_id: Option<String>,
    expanded: IndexSet<String>,
    error: Option<String>,
    storage: Storage,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
}

impl TaskStore {
    /// Load the forest from the slot. A missing key yields an empty forest;
    /// a read/parse failure yields an empty forest plus the error flag.
    /// Parent back-references are repaired on every load — the JSON files
    /// are user-editable and may arrive without them wired.
    pub fn load(storage: Storage) -> TaskStore {
        let (tasks, error) = match storage.load_tasks() {
            Ok(Some(mut tasks)) => {
                forest::fix_parent_references(&mut tasks, None);
                (tasks, None)
            }
            Ok(None) => (Vec::new(), None),
            Err(_) => (Vec::new(), Some("Failed to load tasks".to_string())),
        };
        TaskStore {
            tasks,
            selected_task_id: None,
            expanded: IndexSet::new(),
            error,
            storage,
            subscribers: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The root tasks, in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id
            .as_deref()
            .and_then(|id| forest::find_task(&self.tasks, id))
    }

    pub fn find_task(&self, id: &str) -> Option<&Task> {
        forest::find_task(&self.tasks, id)
    }

    /// Ordered id path from a root down to the task, or `None` if unknown
    pub fn find_task_path(&self, id: &str) -> Option<Vec<String>> {
        forest::find_path(&self.tasks, id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Subscribe to change notifications. One `Changed` event is sent per
    /// public mutation, after invariants are restored and the forest has
    /// been persisted. Dropped receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Create a task from the draft and append it under `parent_id`, or as a
    /// new root when no parent is given. An unresolvable parent falls back
    /// to root insertion rather than erroring. Returns the new task's id.
    pub fn add_task(&mut self, draft: TaskDraft, parent_id: Option<&str>) -> String {
        let now = Utc::now();
        let resolved_parent = parent_id
            .and_then(|pid| forest::find_task(&self.tasks, pid))
            .map(|parent| parent.id.clone());

        let task = Task::new(new_task_id(), draft, resolved_parent.clone(), now);
        let id = task.id.clone();

        match resolved_parent {
            Some(pid) => {
                if let Some(parent) = forest::find_task_mut(&mut self.tasks, &pid) {
                    parent.children.push(task);
                }
            }
            None => self.tasks.push(task),
        }

        self.persist();
        self.notify();
        id
    }

    /// Merge the patch into the task and refresh its `updated_at`. No
    /// completion propagation runs here — callers changing completion go
    /// through `toggle_task` / `cycle_completion_status`. Unknown id → no-op.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) {
        let now = Utc::now();
        let Some(task) = forest::find_task_mut(&mut self.tasks, id) else {
            return;
        };
        task.apply(patch, now);
        self.persist();
        self.notify();
    }

    /// Remove the task and its entire subtree from wherever it occurs.
    /// Clears the selection if it pointed at the deleted task.
    pub fn delete_task(&mut self, id: &str) {
        if !forest::remove_task(&mut self.tasks, id) {
            return;
        }
        if self.selected_task_id.as_deref() == Some(id) {
            self.selected_task_id = None;
        }
        self.persist();
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Flip the task's completion. Completing forces every descendant to
    /// completed; un-completing forces every descendant to in-progress (a
    /// deliberate asymmetry: resumed work is not reset to todo). Ancestors
    /// are then recomputed up to the root.
    pub fn toggle_task(&mut self, id: &str) {
        let now = Utc::now();
        let Some(task) = forest::find_task_mut(&mut self.tasks, id) else {
            return;
        };
        let completed = !task.completed;
        task.completed = completed;
        task.completion_status = if completed {
            CompletionStatus::Completed
        } else {
            CompletionStatus::InProgress
        };
        task.updated_at = now;
        forest::cascade_completion(&mut task.children, completed, now);

        self.propagate_completion_upward(id, now);
        self.persist();
        self.notify();
    }

    /// Advance the status cycle (todo → in-progress → paused → completed →
    /// todo) and recompute `completed`. Only when the flag actually flips
    /// does the toggle cascade/propagation machinery run.
    pub fn cycle_completion_status(&mut self, id: &str) {
        let now = Utc::now();
        let Some(task) = forest::find_task_mut(&mut self.tasks, id) else {
            return;
        };
        let next = task.completion_status.cycle();
        task.completion_status = next;
        task.updated_at = now;

        let completed = next == CompletionStatus::Completed;
        let flipped = task.completed != completed;
        if flipped {
            task.completed = completed;
            forest::cascade_completion(&mut task.children, completed, now);
        }

        if flipped {
            self.propagate_completion_upward(id, now);
        }
        self.persist();
        self.notify();
    }

    /// Advance the priority cycle. No propagation.
    pub fn cycle_priority(&mut self, id: &str) {
        let now = Utc::now();
        let Some(task) = forest::find_task_mut(&mut self.tasks, id) else {
            return;
        };
        task.priority = task.priority.cycle();
        task.updated_at = now;
        self.persist();
        self.notify();
    }

    /// Walk from the changed task to its root. Each ancestor with children
    /// becomes completed iff all of its children are; the status and
    /// timestamp are only written when the computed value differs, to avoid
    /// needless churn. The walk always continues to the root.
    fn propagate_completion_upward(&mut self, id: &str, now: DateTime<Utc>) {
        let mut current = forest::find_task(&self.tasks, id).and_then(|t| t.parent_id.clone());
        while let Some(parent_id) = current {
            let Some(parent) = forest::find_task_mut(&mut self.tasks, &parent_id) else {
                break;
            };
            let computed =
                !parent.children.is_empty() && parent.children.iter().all(|c| c.completed);
            if parent.completed != computed {
                parent.completed = computed;
                parent.completion_status = if computed {
                    CompletionStatus::Completed
                } else {
                    CompletionStatus::InProgress
                };
                parent.updated_at = now;
            }
            current = parent.parent_id.clone();
        }
    }

    // -----------------------------------------------------------------------
    // Invariant repair
    // -----------------------------------------------------------------------

    /// Bottom-up batch reconciliation of `completed` over the whole forest
    pub fn recalculate_completion_states(&mut self) {
        forest::recalculate_completion_states(&mut self.tasks);
        self.persist();
        self.notify();
    }

    /// Overwrite every `parent_id` to match the actual containing parent
    pub fn fix_parent_references(&mut self) {
        forest::fix_parent_references(&mut self.tasks, None);
        self.persist();
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Selection, navigation, expansion
    // -----------------------------------------------------------------------

    pub fn select_task(&mut self, id: Option<&str>) {
        self.selected_task_id = id.map(str::to_string);
        self.notify();
    }

    /// Select the task and expand every ancestor on its path (excluding the
    /// task itself) so the selection is visible in the tree. Unknown id →
    /// no-op.
    pub fn navigate_to_task(&mut self, id: &str) {
        let Some(path) = forest::find_path(&self.tasks, id) else {
            return;
        };
        for ancestor in &path[..path.len() - 1] {
            self.expanded.insert(ancestor.clone());
        }
        self.selected_task_id = Some(id.to_string());
        self.notify();
    }

    pub fn toggle_expansion(&mut self, id: &str) {
        if !self.expanded.shift_remove(id) {
            self.expanded.insert(id.to_string());
        }
        self.notify();
    }

    /// Expand a single task (used after adding a subtask so it is visible)
    pub fn expand(&mut self, id: &str) {
        if self.expanded.insert(id.to_string()) {
            self.notify();
        }
    }

    // -----------------------------------------------------------------------
    // Bulk operations
    // -----------------------------------------------------------------------

    /// Delete every task. Confirmation happens at the UI boundary.
    pub fn clear_all(&mut self) {
        self.tasks.clear();
        self.selected_task_id = None;
        self.expanded.clear();
        self.persist();
        self.notify();
    }

    /// Replace the forest with a small demonstration tree
    pub fn populate_sample(&mut self) {
        let now = Utc::now();
        self.tasks = sample_forest(now);
        forest::fix_parent_references(&mut self.tasks, None);
        forest::recalculate_completion_states(&mut self.tasks);
        self.selected_task_id = None;
        self.expanded.clear();
        self.persist();
        self.notify();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Synchronous full-forest write after every mutation. A failure is
    /// recorded for the UI but does not roll back the in-memory change; the
    /// next successful persist simply overwrites. The flag stays set until
    /// `clear_error`.
    fn persist(&mut self) {
        if self.storage.save_tasks(&self.tasks).is_err() {
            self.error = Some("Failed to save tasks".to_string());
        }
    }

    fn notify(&mut self) {
        self.subscribers
            .retain(|tx| tx.send(StoreEvent::Changed).is_ok());
    }
}

/// The demonstration forest behind `populate_sample`
fn sample_forest(now: DateTime<Utc>) -> Vec<Task> {
    fn task(title: &str, status: CompletionStatus, priority: Priority, now: DateTime<Utc>) -> Task {
        Task::new(
            new_task_id(),
            TaskDraft {
                title: title.into(),
                description: None,
                priority,
                completion_status: status,
            },
            None,
            now,
        )
    }

    let mut release = task(
        "Plan spring release",
        CompletionStatus::InProgress,
        Priority::High,
        now,
    );
    release.description = Some("Everything needed to get 1.4 out the door.".into());
    release.children = vec![
        task("Write changelog", CompletionStatus::Completed, Priority::Medium, now),
        task("Cut release branch", CompletionStatus::Todo, Priority::Medium, now),
        task("Update install docs", CompletionStatus::InProgress, Priority::High, now),
    ];

    let mut flicker = task(
        "Fix sidebar flicker",
        CompletionStatus::Todo,
        Priority::Urgent,
        now,
    );
    let mut repro = task(
        "Reproduce on Linux",
        CompletionStatus::Completed,
        Priority::Medium,
        now,
    );
    repro.children = vec![task(
        "Capture a trace",
        CompletionStatus::Completed,
        Priority::Low,
        now,
    )];
    flicker.children = vec![
        repro,
        task("Bisect the regression", CompletionStatus::InProgress, Priority::High, now),
    ];

    let triage = task(
        "Triage community issues",
        CompletionStatus::Paused,
        Priority::Low,
        now,
    );

    vec![release, flicker, triage]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        (dir, TaskStore::load(storage))
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    /// parent → [a, b]; a → [leaf]
    fn seeded() -> (TempDir, TaskStore, String, String, String, String) {
        let (dir, mut store) = store();
        let parent = store.add_task(draft("Parent"), None);
        let a = store.add_task(draft("Child a"), Some(parent.as_str()));
        let b = store.add_task(draft("Child b"), Some(parent.as_str()));
        let leaf = store.add_task(draft("Leaf"), Some(a.as_str()));
        (dir, store, parent, a, b, leaf)
    }

    #[test]
    fn test_add_task_roots_and_children() {
        let (_dir, mut store) = store();
        let root = store.add_task(draft("Root"), None);
        let child = store.add_task(draft("Child"), Some(root.as_str()));

        assert_eq!(store.tasks().len(), 1);
        let found = store.find_task(&child).unwrap();
        assert_eq!(found.parent_id.as_deref(), Some(root.as_str()));
        assert_eq!(store.find_task(&root).unwrap().children.len(), 1);
    }

    #[test]
    fn test_add_task_with_unknown_parent_falls_back_to_root() {
        let (_dir, mut store) = store();
        let id = store.add_task(draft("Orphan"), Some("no-such-task"));
        assert_eq!(store.tasks().len(), 1);
        let task = store.find_task(&id).unwrap();
        assert!(task.parent_id.is_none());
    }

    #[test]
    fn test_update_task_merges_without_propagation() {
        let (_dir, mut store, parent, a, _b, _leaf) = seeded();
        store.update_task(
            &a,
            TaskPatch {
                title: Some("Renamed".into()),
                completed: Some(true),
                completion_status: Some(CompletionStatus::Completed),
                ..Default::default()
            },
        );
        assert_eq!(store.find_task(&a).unwrap().title, "Renamed");
        // No upward propagation from update_task
        assert!(!store.find_task(&parent).unwrap().completed);
    }

    #[test]
    fn test_update_unknown_id_is_a_noop() {
        let (_dir, mut store, ..) = seeded();
        let before: Vec<Task> = store.tasks().to_vec();
        store.update_task(
            "missing",
            TaskPatch {
                title: Some("x".into()),
                ..Default::default()
            },
        );
        assert_eq!(store.tasks(), &before[..]);
    }

    #[test]
    fn test_delete_removes_subtree_everywhere() {
        let (_dir, mut store, _parent, a, b, leaf) = seeded();
        store.delete_task(&a);
        assert!(store.find_task(&a).is_none());
        assert!(store.find_task(&leaf).is_none());
        assert!(store.find_task(&b).is_some());
        assert!(store.find_task_path(&leaf).is_none());
    }

    #[test]
    fn test_delete_clears_selection() {
        let (_dir, mut store, _parent, a, _b, _leaf) = seeded();
        store.select_task(Some(a.as_str()));
        store.delete_task(&a);
        assert!(store.selected_task_id().is_none());
        assert!(store.selected_task().is_none());
    }

    #[test]
    fn test_toggle_cascades_down_to_every_depth() {
        let (_dir, mut store, parent, a, b, leaf) = seeded();
        store.toggle_task(&parent);
        for id in [&parent, &a, &b, &leaf] {
            let task = store.find_task(id).unwrap();
            assert!(task.completed, "{id} should be completed");
            assert_eq!(task.completion_status, CompletionStatus::Completed);
        }

        store.toggle_task(&parent);
        for id in [&parent, &a, &b, &leaf] {
            let task = store.find_task(id).unwrap();
            assert!(!task.completed);
            assert_eq!(task.completion_status, CompletionStatus::InProgress);
        }
    }

    #[test]
    fn test_toggle_propagates_up_when_all_children_complete() {
        let (_dir, mut store, parent, a, b, _leaf) = seeded();
        store.toggle_task(&a); // completes a and its leaf
        assert!(!store.find_task(&parent).unwrap().completed);

        store.toggle_task(&b);
        assert!(store.find_task(&parent).unwrap().completed);
        assert_eq!(
            store.find_task(&parent).unwrap().completion_status,
            CompletionStatus::Completed
        );

        // Un-completing either child immediately un-completes the parent
        store.toggle_task(&b);
        let parent_task = store.find_task(&parent).unwrap();
        assert!(!parent_task.completed);
        assert_eq!(parent_task.completion_status, CompletionStatus::InProgress);
    }

    #[test]
    fn test_propagation_reaches_grandparents() {
        let (_dir, mut store, parent, a, b, leaf) = seeded();
        store.toggle_task(&leaf);
        // a has exactly one child → completes; parent still has b open
        assert!(store.find_task(&a).unwrap().completed);
        assert!(!store.find_task(&parent).unwrap().completed);

        store.toggle_task(&b);
        assert!(store.find_task(&parent).unwrap().completed);
    }

    #[test]
    fn test_status_cycle_closed_and_consistent() {
        let (_dir, mut store) = store();
        let id = store.add_task(draft("Solo"), None);
        let original = store.find_task(&id).unwrap().completion_status;

        for _ in 0..4 {
            store.cycle_completion_status(&id);
            let task = store.find_task(&id).unwrap();
            assert_eq!(
                task.completed,
                task.completion_status == CompletionStatus::Completed
            );
        }
        let task = store.find_task(&id).unwrap();
        assert_eq!(task.completion_status, original);
        assert!(!task.completed);
    }

    #[test]
    fn test_cycle_into_completed_cascades() {
        let (_dir, mut store, parent, a, b, leaf) = seeded();
        // todo → in-progress → paused → completed
        store.cycle_completion_status(&parent);
        store.cycle_completion_status(&parent);
        assert!(!store.find_task(&leaf).unwrap().completed);

        store.cycle_completion_status(&parent);
        for id in [&parent, &a, &b, &leaf] {
            assert!(store.find_task(id).unwrap().completed);
        }

        // completed → todo flips the flag again: descendants forced to
        // in-progress while the parent itself reads todo
        store.cycle_completion_status(&parent);
        let parent_task = store.find_task(&parent).unwrap();
        assert_eq!(parent_task.completion_status, CompletionStatus::Todo);
        assert!(!parent_task.completed);
        assert_eq!(
            store.find_task(&leaf).unwrap().completion_status,
            CompletionStatus::InProgress
        );
    }

    #[test]
    fn test_priority_cycle_closed() {
        let (_dir, mut store) = store();
        let id = store.add_task(draft("Solo"), None);
        let original = store.find_task(&id).unwrap().priority;
        for _ in 0..4 {
            store.cycle_priority(&id);
        }
        assert_eq!(store.find_task(&id).unwrap().priority, original);
    }

    #[test]
    fn test_find_task_path_and_navigate() {
        let (_dir, mut store, parent, a, _b, leaf) = seeded();
        let deep = store.add_task(draft("Depth three"), Some(leaf.as_str()));

        // A task at depth 3 has a four-id path from its root
        let path = store.find_task_path(&deep).unwrap();
        assert_eq!(path, vec![parent.clone(), a.clone(), leaf.clone(), deep.clone()]);

        store.navigate_to_task(&deep);
        assert_eq!(store.selected_task_id(), Some(deep.as_str()));
        // Exactly the three ancestors are expanded, not the target itself
        assert!(store.is_expanded(&parent));
        assert!(store.is_expanded(&a));
        assert!(store.is_expanded(&leaf));
        assert!(!store.is_expanded(&deep));
    }

    #[test]
    fn test_toggle_expansion() {
        let (_dir, mut store, parent, ..) = seeded();
        assert!(!store.is_expanded(&parent));
        store.toggle_expansion(&parent);
        assert!(store.is_expanded(&parent));
        store.toggle_expansion(&parent);
        assert!(!store.is_expanded(&parent));
    }

    #[test]
    fn test_mutations_persist_immediately() {
        let (dir, mut store) = store();
        let id = store.add_task(draft("Durable"), None);
        store.toggle_task(&id);
        drop(store);

        let reloaded = TaskStore::load(Storage::open(dir.path()).unwrap());
        assert!(reloaded.error().is_none());
        let task = reloaded.find_task(&id).unwrap();
        assert_eq!(task.title, "Durable");
        assert!(task.completed);
    }

    #[test]
    fn test_load_failure_degrades_to_empty_forest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "{broken").unwrap();
        let store = TaskStore::load(Storage::open(dir.path()).unwrap());
        assert!(store.tasks().is_empty());
        assert_eq!(store.error(), Some("Failed to load tasks"));
    }

    #[test]
    fn test_load_repairs_parent_references() {
        let dir = TempDir::new().unwrap();
        // Hand-written file with no parentId wiring at all
        std::fs::write(
            dir.path().join("tasks.json"),
            r#"[{
                "id": "p",
                "title": "Parent",
                "completed": false,
                "children": [{
                    "id": "c",
                    "title": "Child",
                    "completed": false,
                    "createdAt": "2026-08-01T10:00:00Z",
                    "updatedAt": "2026-08-01T10:00:00Z"
                }],
                "createdAt": "2026-08-01T10:00:00Z",
                "updatedAt": "2026-08-01T10:00:00Z"
            }]"#,
        )
        .unwrap();

        let store = TaskStore::load(Storage::open(dir.path()).unwrap());
        assert_eq!(
            store.find_task("c").unwrap().parent_id.as_deref(),
            Some("p")
        );
        assert!(store.find_task("p").unwrap().parent_id.is_none());
    }

    #[test]
    fn test_notifies_once_per_mutation() {
        let (_dir, mut store) = store();
        let rx = store.subscribe();

        let id = store.add_task(draft("One"), None);
        assert_eq!(rx.try_iter().count(), 1);

        store.toggle_task(&id);
        assert_eq!(rx.try_iter().count(), 1);

        // Unknown id: silent no-op, no event
        store.toggle_task("missing");
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_repair_wrappers_are_idempotent_and_persist() {
        let (dir, mut store, _parent, a, _b, _leaf) = seeded();
        store.update_task(
            &a,
            TaskPatch {
                completed: Some(true),
                ..Default::default()
            },
        );

        store.fix_parent_references();
        store.recalculate_completion_states();
        let once = store.tasks().to_vec();

        store.fix_parent_references();
        store.recalculate_completion_states();
        assert_eq!(store.tasks(), &once[..]);

        drop(store);
        let reloaded = TaskStore::load(Storage::open(dir.path()).unwrap());
        assert_eq!(reloaded.tasks(), &once[..]);
    }

    #[test]
    fn test_clear_all() {
        let (_dir, mut store, parent, a, ..) = seeded();
        store.select_task(Some(a.as_str()));
        store.toggle_expansion(&parent);
        store.clear_all();
        assert!(store.tasks().is_empty());
        assert!(store.selected_task_id().is_none());
        assert!(!store.is_expanded(&parent));
    }

    #[test]
    fn test_populate_sample_satisfies_invariants() {
        let (_dir, mut store) = store();
        store.populate_sample();
        assert!(!store.tasks().is_empty());

        // Bijection and parent wiring hold everywhere
        fn check(tasks: &[Task], parent: Option<&str>) {
            for task in tasks {
                assert_eq!(
                    task.completed,
                    task.completion_status == CompletionStatus::Completed,
                    "bijection broken on {}",
                    task.title
                );
                assert_eq!(task.parent_id.as_deref(), parent);
                check(&task.children, Some(&task.id));
            }
        }
        check(store.tasks(), None);
    }
}
