//! boardsync CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod logging;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_commit, run_fields, run_preview, run_sync_back};
use crate::logging::{LogConfig, LogFormat, init_logging};
use crate::summary::{print_batch, print_preview, print_sync};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Fields(args) => match run_fields(args) {
            Ok(()) => 0,
            Err(error) => report_error(&error),
        },
        Command::Preview(args) => match run_preview(args) {
            Ok(report) => {
                if args.json {
                    emit_json(serde_json::to_string_pretty(&report))
                } else {
                    print_preview(&report);
                    0
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Commit(args) => match run_commit(args) {
            Ok(result) => {
                let rendered = if args.json {
                    emit_json(serde_json::to_string_pretty(&result))
                } else {
                    print_batch(&result);
                    0
                };
                if rendered != 0 || result.has_failures() { 1 } else { 0 }
            }
            Err(error) => report_error(&error),
        },
        Command::SyncBack(args) => match run_sync_back(args) {
            Ok(rows) => {
                print_sync(&rows);
                if rows.iter().any(|row| row.error.is_some()) {
                    1
                } else {
                    0
                }
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

fn emit_json(json: serde_json::Result<String>) -> i32 {
    match json {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Text => LogFormat::Text,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
