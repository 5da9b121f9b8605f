// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod schema_resolver;
pub mod document_coordinator;
pub mod wizard_session;
pub mod badge_poller;

// Re-export services for convenience
pub use schema_resolver::SchemaResolver;
pub use document_coordinator::DocumentUploadCoordinator;
pub use wizard_session::{ApplicationWizard, SubmitOutcome};
pub use badge_poller::{BadgeCounts, BadgePoller};
