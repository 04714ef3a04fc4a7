use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(about = "Track offline record sync, progress, and conflicts from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the ledger state file
    #[arg(long, global = true, value_name = "PATH")]
    pub state_path: Option<PathBuf>,

    /// Optional path to the ledger config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue a record for synchronization
    #[command(alias = "new")]
    Add {
        /// Item ID (generated when omitted)
        id: Option<String>,
        /// Record type, e.g. customer or receipt
        #[arg(long = "type", value_name = "TYPE")]
        item_type: String,
        /// Human-readable label
        #[arg(short, long)]
        description: String,
        /// Payload size in bytes
        #[arg(long, value_name = "BYTES")]
        size: Option<u64>,
    },
    /// Report a status change for an item
    Update {
        /// Item ID
        id: String,
        /// New status: pending, syncing, completed, or failed
        status: String,
        /// Transfer progress percentage (syncing only)
        #[arg(short, long)]
        progress: Option<u8>,
        /// Failure message (failed only)
        #[arg(short, long)]
        error: Option<String>,
    },
    /// List tracked items
    List {
        /// Status filter: all, pending, syncing, completed, failed, or conflict
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop tracking an item
    #[command(alias = "rm")]
    Remove {
        /// Item ID
        id: String,
    },
    /// Show aggregate progress and session state
    Progress {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Control the sync session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Flag, resolve, and inspect field conflicts
    Conflict {
        #[command(subcommand)]
        command: ConflictCommands,
    },
    /// Return failed items to pending
    Retry {
        /// Also return in-flight items to pending
        #[arg(long)]
        all: bool,
    },
    /// Export ledger state
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
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
    /// Inspect ledger configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
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
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ResolutionChoice {
    KeepLocal,
    KeepServer,
    Merge,
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Begin a sync session
    Start,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Cancel the session and return in-flight items to pending
    Cancel,
    /// Mark the session as failed
    Fail {
        /// Failure reason
        #[arg(short, long)]
        reason: String,
    },
}

#[derive(Subcommand)]
pub enum ConflictCommands {
    /// Record a divergent field for an item
    Flag {
        /// Item ID
        id: String,
        /// Entity label, e.g. the customer name
        #[arg(long)]
        entity: String,
        /// Field that diverged
        #[arg(long)]
        field: String,
        /// Value edited on this device
        #[arg(long)]
        local: String,
        /// Value currently on the server
        #[arg(long)]
        server: String,
        /// Author of the local edit
        #[arg(long, value_name = "NAME")]
        local_author: Option<String>,
        /// Author of the server edit
        #[arg(long, value_name = "NAME")]
        server_author: Option<String>,
    },
    /// Resolve an open conflict
    Resolve {
        /// Item ID
        id: String,
        /// Which value to keep
        #[arg(value_enum)]
        choice: ResolutionChoice,
        /// Merged value (required with `merge`)
        #[arg(long)]
        value: Option<String>,
    },
    /// List open conflicts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recently resolved conflicts
    History {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration and file locations
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
