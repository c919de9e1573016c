use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cn", about = concat!("[/\\] canopy v", env!("CARGO_PKG_VERSION"), " - tasks all the way down"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a root task
    Add(AddArgs),
    /// Add a subtask under an existing task
    Sub(SubArgs),
    /// List the whole task tree
    List,
    /// Show task details
    Show(IdArg),
    /// Toggle a task's completion (cascades to its subtasks)
    Toggle(IdArg),
    /// Cycle a task's status (todo → in-progress → paused → completed)
    Status(IdArg),
    /// Cycle a task's priority (low → medium → high → urgent)
    Priority(IdArg),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Delete a task and its whole subtree
    Delete(DeleteArgs),
    /// Print the id path from a root down to a task
    Path(IdArg),
    /// Show per-status task counts
    Stats,
    /// Replace the current tasks with a small sample tree
    Sample(SampleArgs),
    /// Delete all tasks
    Clear(ClearArgs),
}

// ---------------------------------------------------------------------------
// Command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long)]
    pub description: Option<String>,
    /// Priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<String>,
    /// Initial status (todo, in-progress, paused, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Add under this parent task instead of as a root
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task id
    pub parent: String,
    /// Subtask title
    pub title: String,
    /// Longer description
    #[arg(long)]
    pub description: Option<String>,
    /// Priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<String>,
    /// Initial status (todo, in-progress, paused, completed)
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args)]
pub struct IdArg {
    /// Task id
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description (empty string clears it)
    #[arg(long)]
    pub description: Option<String>,
    /// New priority (low, medium, high, urgent)
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Task id
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct SampleArgs {
    /// Overwrite existing tasks
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}
