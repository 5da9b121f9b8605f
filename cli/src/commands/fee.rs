// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fee preview command
//!
//! Prints the fee an application would be charged for the scripted answers
//! without starting a session.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use sewa_core::domain::fee::FeeQuote;
use sewa_core::domain::form::FormAnswers;
use sewa_core::domain::target::WizardVariant;

use crate::script::ApplicationScript;

#[derive(Args)]
pub struct FeeArgs {
    /// Target id, or path to a target JSON file
    #[arg(short, long, value_name = "ID|FILE.json")]
    pub target: String,

    /// Script with the answers to price
    #[arg(short, long, value_name = "FILE.yaml")]
    pub script: PathBuf,

    /// Wizard the target belongs to, when fetching by id
    #[arg(long, value_name = "KIND", default_value = "job")]
    pub kind: WizardVariant,

    /// Print the quote as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: FeeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let gateway = super::rest_gateway(&config)?;

    let script = ApplicationScript::from_yaml_file(&args.script)?;
    let target = super::load_target(&args.target, args.kind, &gateway).await?;

    let answers: FormAnswers = script.answers()?.into_iter().collect();
    let quote = FeeQuote::compute(&target, &answers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else {
        super::apply::print_fee(&quote);
    }
    Ok(())
}
