use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::Filter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tally",
    version,
    about = "A keyboard-first local task tracker.",
    after_help = "Examples:\n  tally                 Launch the TUI (same as `tally tui`)\n  tally add Buy milk\n  tally list --filter active --search milk\n  tally clear-done"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the keyboard-first terminal UI (default command)
    Tui,
    /// Add a task without entering the TUI
    Add(AddArgs),
    /// Print tasks, optionally narrowing the persisted filter and search
    List(ListArgs),
    /// Delete every completed task
    ClearDone,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task text; multiple words are joined with spaces
    #[arg(value_name = "TEXT", required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Set and persist the visible filter before listing
    #[arg(long, value_enum)]
    pub filter: Option<Filter>,

    /// Set and persist the search query before listing
    #[arg(long, value_name = "QUERY")]
    pub search: Option<String>,
}
