use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::cli::commands::{
    AddArgs, Cli, ClearArgs, Commands, DeleteArgs, EditArgs, IdArg, SampleArgs, SubArgs,
};
use crate::cli::output;
use crate::io::storage::{self, Storage};
use crate::model::task::{TaskDraft, TaskPatch};
use crate::ops::forest;
use crate::store::TaskStore;

/// Dispatch a parsed CLI invocation against the data directory
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let dir = storage::resolve_data_dir(cli.data_dir.as_deref());
    let storage = Storage::open(&dir)?;
    let mut store = TaskStore::load(storage);

    // A corrupt tasks.json degrades to an empty tree; warn, because the
    // next mutation will overwrite the slot with the current state.
    if let Some(err) = store.error().map(str::to_string) {
        eprintln!("warning: {} (starting from an empty tree)", err);
        store.clear_error();
    }

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Add(args) => cmd_add(&mut store, args),
        Commands::Sub(args) => cmd_sub(&mut store, args),
        Commands::List => cmd_list(&store, cli.json),
        Commands::Show(args) => cmd_show(&store, args, cli.json),
        Commands::Toggle(args) => cmd_toggle(&mut store, args),
        Commands::Status(args) => cmd_status(&mut store, args),
        Commands::Priority(args) => cmd_priority(&mut store, args),
        Commands::Edit(args) => cmd_edit(&mut store, args),
        Commands::Delete(args) => cmd_delete(&mut store, args),
        Commands::Path(args) => cmd_path(&store, args),
        Commands::Stats => cmd_stats(&store, cli.json),
        Commands::Sample(args) => cmd_sample(&mut store, args),
        Commands::Clear(args) => cmd_clear(&mut store, args),
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(store: &mut TaskStore, args: AddArgs) -> Result<(), Box<dyn Error>> {
    let draft = build_draft(args.title, args.description, args.priority, args.status)?;
    if let Some(parent) = &args.parent {
        require_task(store, parent)?;
    }
    let id = store.add_task(draft, args.parent.as_deref());
    ensure_persisted(store)?;
    println!("added {}", id);
    Ok(())
}

fn cmd_sub(store: &mut TaskStore, args: SubArgs) -> Result<(), Box<dyn Error>> {
    let draft = build_draft(args.title, args.description, args.priority, args.status)?;
    require_task(store, &args.parent)?;
    let id = store.add_task(draft, Some(args.parent.as_str()));
    ensure_persisted(store)?;
    println!("added {}", id);
    Ok(())
}

fn cmd_toggle(store: &mut TaskStore, args: IdArg) -> Result<(), Box<dyn Error>> {
    require_task(store, &args.id)?;
    store.toggle_task(&args.id);
    ensure_persisted(store)?;
    if let Some(task) = store.find_task(&args.id) {
        println!("{}", output::format_task_line(task));
    }
    Ok(())
}

fn cmd_status(store: &mut TaskStore, args: IdArg) -> Result<(), Box<dyn Error>> {
    require_task(store, &args.id)?;
    store.cycle_completion_status(&args.id);
    ensure_persisted(store)?;
    if let Some(task) = store.find_task(&args.id) {
        println!("status: {}", task.completion_status.label());
    }
    Ok(())
}

fn cmd_priority(store: &mut TaskStore, args: IdArg) -> Result<(), Box<dyn Error>> {
    require_task(store, &args.id)?;
    store.cycle_priority(&args.id);
    ensure_persisted(store)?;
    if let Some(task) = store.find_task(&args.id) {
        println!("priority: {}", task.priority.label());
    }
    Ok(())
}

fn cmd_edit(store: &mut TaskStore, args: EditArgs) -> Result<(), Box<dyn Error>> {
    require_task(store, &args.id)?;
    if args.title.is_none() && args.description.is_none() && args.priority.is_none() {
        return Err("nothing to edit (use --title / --description / --priority)".into());
    }
    if let Some(title) = &args.title
        && title.trim().is_empty()
    {
        return Err("title cannot be empty".into());
    }
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        priority: args.priority.as_deref().map(output::parse_priority).transpose()?,
        ..Default::default()
    };
    store.update_task(&args.id, patch);
    ensure_persisted(store)?;
    if let Some(task) = store.find_task(&args.id) {
        println!("{}", output::format_task_line(task));
    }
    Ok(())
}

fn cmd_delete(store: &mut TaskStore, args: DeleteArgs) -> Result<(), Box<dyn Error>> {
    let task = require_task(store, &args.id)?;
    let title = task.title.clone();
    let mut descendants = 0usize;
    forest::for_each_task(&task.children, &mut |_| descendants += 1);

    if !args.yes {
        let prompt = if descendants > 0 {
            format!("delete '{}' and {} subtask(s)?", title, descendants)
        } else {
            format!("delete '{}'?", title)
        };
        if !confirm(&prompt)? {
            println!("aborted");
            return Ok(());
        }
    }

    store.delete_task(&args.id);
    ensure_persisted(store)?;
    println!("deleted {}", args.id);
    Ok(())
}

fn cmd_sample(store: &mut TaskStore, args: SampleArgs) -> Result<(), Box<dyn Error>> {
    if !store.tasks().is_empty() && !args.force {
        return Err("refusing to overwrite existing tasks (use --force)".into());
    }
    store.populate_sample();
    ensure_persisted(store)?;
    let counts = forest::count_statuses(store.tasks());
    println!("seeded {} sample tasks", counts.total);
    Ok(())
}

fn cmd_clear(store: &mut TaskStore, args: ClearArgs) -> Result<(), Box<dyn Error>> {
    if store.tasks().is_empty() {
        println!("no tasks");
        return Ok(());
    }
    if !args.yes && !confirm("delete ALL tasks? This cannot be undone.")? {
        println!("aborted");
        return Ok(());
    }
    store.clear_all();
    ensure_persisted(store)?;
    println!("cleared");
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(store: &TaskStore, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(store.tasks())?);
        return Ok(());
    }
    if store.tasks().is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for line in output::format_forest(store.tasks()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(store: &TaskStore, args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let task = require_task(store, &args.id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
        return Ok(());
    }
    for line in output::format_task_detail(task) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_path(store: &TaskStore, args: IdArg) -> Result<(), Box<dyn Error>> {
    let path = store
        .find_task_path(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    for id in path {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_stats(store: &TaskStore, json: bool) -> Result<(), Box<dyn Error>> {
    let counts = forest::count_statuses(store.tasks());
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }
    println!("total:       {}", counts.total);
    println!("todo:        {}", counts.todo);
    println!("in-progress: {}", counts.in_progress);
    println!("paused:      {}", counts.paused);
    println!("completed:   {}", counts.completed);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_draft(
    title: String,
    description: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> Result<TaskDraft, Box<dyn Error>> {
    if title.trim().is_empty() {
        return Err("title cannot be empty".into());
    }
    Ok(TaskDraft {
        title,
        description: description.filter(|d| !d.is_empty()),
        priority: priority
            .as_deref()
            .map(output::parse_priority)
            .transpose()?
            .unwrap_or_default(),
        completion_status: status
            .as_deref()
            .map(output::parse_status)
            .transpose()?
            .unwrap_or_default(),
    })
}

/// Boundary validation: the store itself no-ops on unknown ids, the CLI
/// reports them.
fn require_task<'a>(
    store: &'a TaskStore,
    id: &str,
) -> Result<&'a crate::model::task::Task, Box<dyn Error>> {
    store
        .find_task(id)
        .ok_or_else(|| format!("task not found: {}", id).into())
}

/// A persist failure means the command's effect was not durably recorded;
/// surface it as a hard error at the CLI boundary.
fn ensure_persisted(store: &TaskStore) -> Result<(), Box<dyn Error>> {
    match store.error() {
        Some(err) => Err(err.to_string().into()),
        None => Ok(()),
    }
}

fn confirm(prompt: &str) -> Result<bool, Box<dyn Error>> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
