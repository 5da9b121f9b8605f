// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Sewa CLI
//!
//! The `sewa` binary drives the application wizard from the terminal.
//!
//! ## Commands
//!
//! - `sewa apply <job|service> --target <ID|FILE> --script <FILE>` - Submit an application
//! - `sewa fee --target <ID|FILE> --script <FILE>` - Preview the fee for a set of answers
//! - `sewa config show|validate|generate` - Configuration management
//! - `sewa notifications watch` - Follow the unread-notification count

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sewa_cli::commands::{self, ApplyArgs, ConfigCommand, FeeArgs, NotificationsCommand};

/// Sewa - apply for jobs and citizen services
#[derive(Parser)]
#[command(name = "sewa")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SEWA_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SEWA_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an application wizard from a script
    #[command(name = "apply")]
    Apply(ApplyArgs),

    /// Preview the fee for scripted answers
    #[command(name = "fee")]
    Fee(FeeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Notification badge
    #[command(name = "notifications")]
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Apply(args) => commands::apply::execute(args, cli.config).await,
        Commands::Fee(args) => commands::fee::execute(args, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Notifications { command } => {
            commands::notifications::handle_command(command, cli.config).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
