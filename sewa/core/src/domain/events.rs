// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::fee::FeeQuote;
use crate::domain::target::{TargetId, WizardVariant};
use crate::domain::wizard::{SessionId, WizardStep};

/// Wizard session lifecycle events
///
/// Published for every transition and every network outcome so front ends
/// can render progress without polling the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WizardEvent {
    StepChanged {
        session_id: SessionId,
        from: WizardStep,
        to: WizardStep,
        changed_at: DateTime<Utc>,
    },
    FeeRecalculated {
        session_id: SessionId,
        quote: FeeQuote,
        calculated_at: DateTime<Utc>,
    },
    DocumentUploadFailed {
        session_id: SessionId,
        doc_name: String,
        reason: String,
        failed_at: DateTime<Utc>,
    },
    SubmissionStarted {
        session_id: SessionId,
        target_id: TargetId,
        variant: WizardVariant,
        started_at: DateTime<Utc>,
    },
    DuplicateSubmissionBlocked {
        session_id: SessionId,
        step: WizardStep,
        blocked_at: DateTime<Utc>,
    },
    AgentAssigned {
        session_id: SessionId,
        tracking_id: String,
        agent_name: Option<String>,
        assigned_at: DateTime<Utc>,
    },
    ApplicationQueued {
        session_id: SessionId,
        tracking_id: String,
        queued_at: DateTime<Utc>,
    },
    SlotBookingOffered {
        session_id: SessionId,
        time_slots: Vec<String>,
        /// True when offered because the backend was unreachable
        after_network_failure: bool,
        offered_at: DateTime<Utc>,
    },
    SubmissionFailed {
        session_id: SessionId,
        message: String,
        rolled_back_to: WizardStep,
        failed_at: DateTime<Utc>,
    },
    SessionClosed {
        session_id: SessionId,
        closed_at: DateTime<Utc>,
    },
}

impl WizardEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            WizardEvent::StepChanged { session_id, .. }
            | WizardEvent::FeeRecalculated { session_id, .. }
            | WizardEvent::DocumentUploadFailed { session_id, .. }
            | WizardEvent::SubmissionStarted { session_id, .. }
            | WizardEvent::DuplicateSubmissionBlocked { session_id, .. }
            | WizardEvent::AgentAssigned { session_id, .. }
            | WizardEvent::ApplicationQueued { session_id, .. }
            | WizardEvent::SlotBookingOffered { session_id, .. }
            | WizardEvent::SubmissionFailed { session_id, .. }
            | WizardEvent::SessionClosed { session_id, .. } => *session_id,
        }
    }
}
