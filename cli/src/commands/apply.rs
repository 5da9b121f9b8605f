// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Scripted application command
//!
//! Walks one wizard session from Instructions to Success using the answers
//! and documents from a script file.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use sewa_core::application::wizard_session::{ApplicationWizard, SubmitOutcome};
use sewa_core::domain::document::UploadedDocument;
use sewa_core::domain::events::WizardEvent;
use sewa_core::domain::fee::FeeQuote;
use sewa_core::domain::submission::{SubmissionResult, SubmissionStatus};
use sewa_core::domain::target::{ApplicationTarget, WizardVariant};
use sewa_core::domain::wizard::WizardStep;
use sewa_core::infrastructure::event_bus::{EventBus, SessionEventReceiver};
use sewa_core::infrastructure::storage::MultipartObjectStorage;

use crate::script::{ApplicationScript, DocumentSource};

#[derive(Args)]
pub struct ApplyArgs {
    /// Wizard to run (job or service)
    #[arg(value_name = "KIND")]
    pub variant: WizardVariant,

    /// Target id, or path to a target JSON file
    #[arg(short, long, value_name = "ID|FILE.json")]
    pub target: String,

    /// Script with answers, documents and slot
    #[arg(short, long, value_name = "FILE.yaml")]
    pub script: PathBuf,
}

pub async fn execute(args: ApplyArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let gateway = Arc::new(super::rest_gateway(&config)?);
    let storage = Arc::new(
        MultipartObjectStorage::new(&config.spec.storage).context("Failed to create upload client")?,
    );

    let script = ApplicationScript::from_yaml_file(&args.script)?;
    let target = super::load_target(&args.target, args.variant, gateway.as_ref()).await?;
    print_target(&target);

    let event_bus = Arc::new(EventBus::with_default_capacity());
    let wizard = ApplicationWizard::new(args.variant, target, gateway, storage, event_bus.clone());
    info!(session_id = %wizard.id(), "Starting scripted application");

    let spinner = ProgressBar::new_spinner();
    let renderer = tokio::spawn(render_events(event_bus.subscribe_session(wizard.id()), spinner.clone()));

    let result = run(&wizard, &script, &spinner).await;

    spinner.finish_and_clear();
    wizard.close();
    renderer.abort();

    let result = result?;
    print_result(&result);
    Ok(())
}

async fn run(
    wizard: &ApplicationWizard,
    script: &ApplicationScript,
    spinner: &ProgressBar,
) -> Result<SubmissionResult> {
    let prefilled = wizard.prefill_saved_documents().await?;
    if prefilled > 0 {
        println!("{}", format!("Using {} saved document(s) from your profile", prefilled).dimmed());
    }

    let step = wizard.begin().await?;

    for (label, value) in script.answers()? {
        wizard.set_answer(label, value)?;
    }
    if step == WizardStep::Form {
        wizard.continue_to_documents()?;
    }

    for (name, source) in &script.documents {
        match source {
            DocumentSource::Saved => {
                if !wizard.documents().get(name).is_some_and(UploadedDocument::is_hosted) {
                    bail!("No saved document '{}' on your profile", name);
                }
            }
            DocumentSource::Local(path) => {
                if !path.is_file() {
                    bail!("Document '{}' not found at {}", name, path.display());
                }
                wizard.pick_document(name, UploadedDocument::local(path, None))?;
            }
        }
    }

    print_fee(&wizard.fee_quote());

    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Searching for an available agent...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    match wizard.submit().await? {
        SubmitOutcome::Submitted(result) => Ok(result),
        SubmitOutcome::SlotBookingRequired { time_slots } => {
            spinner.suspend(|| {
                println!("{}", "No agent is available right now.".yellow());
                if !time_slots.is_empty() {
                    println!("  Available times: {}", time_slots.join(", "));
                }
            });

            let Some(slot) = &script.slot else {
                bail!("Slot booking was offered but the script has no 'slot' section");
            };
            spinner.set_message(format!("Booking {}...", slot.date));

            match wizard.book_slot(&slot.date, slot.time.as_deref()).await? {
                SubmitOutcome::Submitted(result) => Ok(result),
                other => bail!("Unexpected slot booking outcome: {:?}", other),
            }
        }
        SubmitOutcome::AlreadySubmitted => bail!("Application was already submitted"),
    }
}

async fn render_events(mut events: SessionEventReceiver, spinner: ProgressBar) {
    while let Ok(event) = events.recv().await {
        match event {
            WizardEvent::DocumentUploadFailed { doc_name, reason, .. } => {
                spinner.println(format!(
                    "{} {} could not be uploaded ({})",
                    "!".yellow(),
                    doc_name,
                    reason
                ));
            }
            WizardEvent::SubmissionFailed { message, .. } => {
                spinner.println(format!("{} {}", "✗".red(), message));
            }
            WizardEvent::StepChanged { to, .. } => {
                spinner.println(format!("{} {}", "→".dimmed(), to.as_str().dimmed()));
            }
            _ => {}
        }
    }
}

fn print_target(target: &ApplicationTarget) {
    println!("{}", target.title.bold());
    if let Some(org) = &target.organization {
        println!("  {}", org);
    }
    if let Some(instructions) = target.instructions() {
        println!();
        println!("{}", instructions);
    }
    println!();
}

pub(crate) fn print_fee(quote: &FeeQuote) {
    println!("{}", "Fees:".bold());
    println!("  Official fee: ₹{}", quote.official_fee);
    println!("  Service fee:  ₹{}", quote.service_fee);
    println!("  {}", format!("Total:        ₹{}", quote.total_amount).bold());
}

fn print_result(result: &SubmissionResult) {
    println!();
    match result.status {
        SubmissionStatus::Assigned => {
            println!("{}", "✓ Application submitted and assigned".green());
            if let Some(agent) = &result.agent_name {
                println!("  Agent: {}", agent);
            }
        }
        SubmissionStatus::Queued => {
            println!("{}", "✓ Application submitted".green());
            println!("  {}", "An agent will be assigned shortly.".dimmed());
        }
    }
    println!("  Tracking ID: {}", result.tracking_id.bold());
}
