use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

const VERSION: &str = env!("DOT_TASKS_VERSION");

#[derive(Parser)]
#[command(
    name = "dot-tasks",
    version = VERSION,
    about = "Markdown task tracker stored in a .tasks directory",
    after_help = "\
LAYOUT:
  <root>/todo|doing|done|trash/<YYYY-MM-DD>-<task-name>/task.md
  The nearest .tasks directory above the current directory is used unless
  --tasks-root is given. Run `dot-tasks init` to create one.

EXIT CODES:
  0  Success
  1  Error (validation, not found, conflict, I/O)

SELECTORS:
  Commands taking <TASK> accept a task name, a task id, or the task's
  directory name.

DIAGNOSTICS:
  Set DOT_TASKS_LOG (e.g. DOT_TASKS_LOG=debug) to trace store operations on stderr."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Explicit .tasks directory
    #[arg(long, global = true, value_name = "PATH")]
    pub tasks_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the .tasks directory layout and config
    Init(InitArgs),

    /// Create a task in todo
    Create {
        /// Unique kebab-case task name
        name: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, default_value = "p2")]
        priority: String,
        #[arg(long, default_value = "m")]
        effort: String,
        #[arg(long)]
        owner: Option<String>,
        /// Can be repeated
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Task name or task id; can be repeated
        #[arg(long)]
        depends_on: Vec<String>,
    },

    /// Move a task to doing and initialize plan.md
    Start {
        /// Task name or task id
        task: String,
        /// Ignore unmet dependencies
        #[arg(long)]
        force: bool,
    },

    /// Mark a task completed and move it to done
    Complete {
        /// Task name or task id
        task: String,
    },

    /// List tasks sorted by status, priority, creation date and name
    List(ListArgs),

    /// Show task counts grouped by tag
    Tags(TagsArgs),

    /// Show a detailed view of one task
    View {
        /// Task name or task id
        task: String,
    },

    /// Update task metadata and append activity
    #[command(after_help = "\
NOTE:
  --tag adds to the existing tags unless --replace-tags is given.
  --depends-on adds to the existing dependencies unless --clear-depends-on
  is given, which replaces them (or empties them with no --depends-on).
  --owner \"\" clears the owner.")]
    Update(UpdateArgs),

    /// Append a note to a task's activity log
    Log {
        /// Task name or task id
        task: String,
        note: String,
        #[arg(long, default_value = "unknown")]
        actor: String,
    },

    /// Rename a task, keeping its id
    Rename {
        /// Task name or task id
        task: String,
        /// New unique kebab-case task name
        new_name: String,
    },

    /// Delete a task (soft-delete to trash by default)
    Delete {
        /// Task name or task id
        task: String,
        /// Permanently remove the task folder
        #[arg(long)]
        hard: bool,
    },
}

#[derive(Args)]
pub struct InitArgs {
    /// Write settings.interactive_enabled
    #[arg(long, value_name = "BOOL")]
    pub interactive_enabled: Option<bool>,

    /// Write settings.show_banner
    #[arg(long, value_name = "BOOL")]
    pub show_banner: Option<bool>,

    /// List columns to write, e.g. task_name,status,deps
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Optional status filter: todo, doing, done
    pub status: Option<String>,
    /// Can be repeated
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Can be repeated
    #[arg(long = "exclude-tag")]
    pub exclude_tags: Vec<String>,
    /// Require every --tag instead of any
    #[arg(long)]
    pub all_tags: bool,
    /// Only tasks without tags
    #[arg(long)]
    pub untagged: bool,
}

#[derive(Args)]
pub struct TagsArgs {
    /// Optional status filter: todo, doing, done
    pub status: Option<String>,
    /// count or name
    #[arg(long, default_value = "count")]
    pub sort: String,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,
    /// Leave out the (untagged) row
    #[arg(long)]
    pub no_untagged: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Task name or task id
    pub task: String,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub effort: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long)]
    pub replace_tags: bool,
    #[arg(long)]
    pub depends_on: Vec<String>,
    #[arg(long)]
    pub clear_depends_on: bool,
    /// Activity note recorded instead of the default
    #[arg(long)]
    pub note: Option<String>,
}
