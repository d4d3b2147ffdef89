use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Track research and day-to-day tasks from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to the local data directory
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// CLI profile name for sync configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Quick capture: keel "buy stamps"
    #[arg(trailing_var_arg = true)]
    pub task: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new to-do task
    #[command(alias = "new")]
    Add {
        /// Task title
        title: Vec<String>,
        /// Optional due day (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
    },
    /// List to-do tasks
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a to-do task as done
    Done {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Delete a task (to-do or research)
    Delete {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Manage research tasks
    Research {
        #[command(subcommand)]
        command: ResearchCommands,
    },
    /// Manage the My Day view
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    /// Sync local collections with the remote store
    Sync {
        /// Allow pushing into a currently-empty remote partition
        #[arg(long)]
        bootstrap: bool,
    },
    /// Inspect or switch the remote owner namespace
    Namespace {
        #[command(subcommand)]
        command: NamespaceCommands,
    },
    /// Export tasks
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI sync profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ResearchCommands {
    /// Create a new research task
    Add {
        /// Task title
        title: Vec<String>,
    },
    /// List research tasks
    List {
        /// Filter by tag name
        #[arg(long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a research task to Active
    Start {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Move a research task to Done
    Finish {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Append a line to a research task's notes
    Note {
        /// Task ID or unique ID prefix
        id: String,
        /// Note text
        text: Vec<String>,
    },
    /// Add a step to a research task
    Step {
        /// Task ID or unique ID prefix
        id: String,
        /// Step title
        title: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum DayCommands {
    /// Pin a task to today's My Day view
    Pin {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Unpin a task from today's My Day view
    Unpin {
        /// Task ID or unique ID prefix
        id: String,
    },
    /// Show today's My Day view
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum NamespaceCommands {
    /// Show the active owner namespace
    Show,
    /// Check how many records a candidate namespace holds, without switching
    Verify {
        /// Candidate owner id
        owner: String,
    },
    /// Switch to another owner namespace and pull its collections
    Switch {
        /// Next owner id
        owner: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Remote API base URL
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Remote API key
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
        /// Owner namespace override
        #[arg(long, value_name = "OWNER")]
        owner: Option<String>,
        /// My Day pull window in days (minimum 2)
        #[arg(long, value_name = "DAYS")]
        day_window: Option<u32>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show resolved profile config
    Show,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
