// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Sewa CLI

pub mod apply;
pub mod config;
pub mod fee;
pub mod notifications;

pub use self::apply::ApplyArgs;
pub use self::config::ConfigCommand;
pub use self::fee::FeeArgs;
pub use self::notifications::NotificationsCommand;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use sewa_core::domain::client_config::ClientConfigManifest;
use sewa_core::domain::gateway::ApplicationGateway;
use sewa_core::domain::target::{ApplicationTarget, TargetId, WizardVariant};
use sewa_core::infrastructure::rest_gateway::RestApplicationGateway;

/// Load and validate the client configuration.
pub(crate) fn load_config(config_override: Option<PathBuf>) -> Result<ClientConfigManifest> {
    let config = ClientConfigManifest::load_or_default(config_override)
        .context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

pub(crate) fn rest_gateway(config: &ClientConfigManifest) -> Result<RestApplicationGateway> {
    RestApplicationGateway::new(&config.spec.api).context("Failed to create HTTP client")
}

/// `target` is either a path to a JSON file or a backend id.
pub(crate) async fn load_target(
    target: &str,
    variant: WizardVariant,
    gateway: &dyn ApplicationGateway,
) -> Result<ApplicationTarget> {
    let path = Path::new(target);
    if path.is_file() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read target {:?}", path))?;
        return serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse target {:?}", path));
    }

    gateway
        .fetch_target(variant, &TargetId::new(target))
        .await
        .with_context(|| format!("Failed to fetch {} '{}'", variant, target))
}
