use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "th", about = concat!("[x] taskhub v", env!("CARGO_PKG_VERSION"), " - every checkbox in your notes, in one place"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different vault directory
    #[arg(short = 'C', long = "vault-dir", global = true)]
    pub vault_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .taskhub/settings.toml in the current directory
    Init(InitArgs),
    /// Show the task hub
    List(ListArgs),
    /// Show hidden tasks, files and folders
    Hidden(HiddenArgs),
    /// Flip a task's checkbox
    Toggle(ToggleArgs),
    /// Hide a task, file or folder from the main list
    Hide(HideCmd),
    /// Unhide a task, file or folder
    Unhide(HideCmd),
    /// Stop scanning a folder
    Exclude(FolderArg),
    /// Scan a previously excluded folder again
    Include(FolderArg),
    /// Re-print the list whenever documents change
    Watch(ListArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing settings file
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Clone)]
pub struct ListArgs {
    /// View mode (files, focus, tags)
    #[arg(long, default_value = "files")]
    pub view: String,
    /// Include completed tasks (default: show_done from settings)
    #[arg(long, conflicts_with = "no_done")]
    pub done: bool,
    /// Exclude completed tasks
    #[arg(long)]
    pub no_done: bool,
    /// Keep only tasks matching this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,
    /// Active document, which decides the folder in focus view
    #[arg(long)]
    pub active: Option<String>,
}

#[derive(Args)]
pub struct HiddenArgs {
    /// Include completed tasks
    #[arg(long)]
    pub done: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ToggleArgs {
    /// Document path, relative to the vault root
    pub file: String,
    /// Line number (1-based, as shown by `list`)
    pub line: usize,
}

#[derive(Args)]
pub struct HideCmd {
    #[command(subcommand)]
    pub target: HideTarget,
}

#[derive(Subcommand)]
pub enum HideTarget {
    /// A single task, by file and line
    Task {
        file: String,
        /// Line number (1-based)
        line: usize,
    },
    /// A whole document
    File { file: String },
    /// A top-level folder ("" or "/" for the vault root)
    Folder { folder: String },
}

#[derive(Args)]
pub struct FolderArg {
    pub folder: String,
}
