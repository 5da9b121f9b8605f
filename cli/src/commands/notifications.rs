// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Notification badge commands
//!
//! Commands: watch

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use sewa_core::application::badge_poller::BadgePoller;

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// Poll the unread-notification count and print every change
    Watch {
        /// Stop after this many changes (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
    },
}

pub async fn handle_command(
    command: NotificationsCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        NotificationsCommand::Watch { ticks } => watch(config_override, ticks).await,
    }
}

async fn watch(config_override: Option<PathBuf>, ticks: Option<u64>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let gateway = Arc::new(super::rest_gateway(&config)?);

    let poller = BadgePoller::spawn(gateway, config.spec.polling.badge_interval());
    let mut counts = poller.subscribe();

    println!(
        "{}",
        format!(
            "Watching notifications every {}s (Ctrl-C to stop)",
            config.spec.polling.badge_interval_secs
        )
        .dimmed()
    );

    let mut seen = 0;
    loop {
        tokio::select! {
            changed = counts.changed() => {
                changed.context("Badge poller stopped unexpectedly")?;
                let unread = counts.borrow_and_update().unread;
                println!("{} {}", "●".cyan(), format!("{} unread", unread).bold());

                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.stop();
    Ok(())
}
