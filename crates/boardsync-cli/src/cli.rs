//! CLI argument definitions for boardsync.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "boardsync",
    version,
    about = "Reconcile board records into validated entities",
    long_about = "Import records from a board export into a typed entity store.\n\n\
                  Columns are matched to fields by title, declared type, and id\n\
                  pattern; values are converted per field; duplicates are skipped\n\
                  against what the store already holds. Entities can be pushed\n\
                  back to their board records."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (text for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record field values in log output (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the field mapping rules for an entity kind.
    Fields(FieldsArgs),

    /// Resolve board records and report what a commit would do.
    Preview(PreviewArgs),

    /// Import board records into the entity store.
    Commit(CommitArgs),

    /// Push entity fields back to their board records.
    SyncBack(SyncBackArgs),
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Mapping rules JSON file.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: PathBuf,
}

#[derive(Parser)]
pub struct PreviewArgs {
    /// Mapping rules JSON file.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: PathBuf,

    /// Board export JSON file.
    #[arg(long = "board", value_name = "FILE")]
    pub board: PathBuf,

    /// Entity store JSON file (created on first commit).
    #[arg(long = "store", value_name = "FILE")]
    pub store: PathBuf,

    /// Record ids to preview (default: every record in the board file).
    #[arg(value_name = "IDS")]
    pub ids: Vec<String>,

    /// Emit the preview report as JSON on stdout.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CommitArgs {
    /// Mapping rules JSON file.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: PathBuf,

    /// Board export JSON file.
    #[arg(long = "board", value_name = "FILE")]
    pub board: PathBuf,

    /// Entity store JSON file (created on first commit).
    #[arg(long = "store", value_name = "FILE")]
    pub store: PathBuf,

    /// Record ids to commit (default: every record in the board file).
    #[arg(value_name = "IDS")]
    pub ids: Vec<String>,

    /// JSON file of completion values per record id:
    /// {"99": {"coach": "A. Lee"}}.
    #[arg(long = "overrides", value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Drop invalid candidates instead of reporting them as failures.
    #[arg(long = "valid-only")]
    pub valid_only: bool,

    /// Emit the batch result as JSON on stdout.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct SyncBackArgs {
    /// Mapping rules JSON file.
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: PathBuf,

    /// Board export JSON file.
    #[arg(long = "board", value_name = "FILE")]
    pub board: PathBuf,

    /// Entity store JSON file.
    #[arg(long = "store", value_name = "FILE")]
    pub store: PathBuf,

    /// Entities to push back to the board.
    #[arg(value_name = "ENTITY_IDS", required = true)]
    pub entity_ids: Vec<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}
