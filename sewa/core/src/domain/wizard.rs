// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wizard Step Machine
//!
//! The wizard moves through `Instructions → Form → Documents → Searching →
//! Success`, with a `SlotBooking` detour for the job wizard. The current step
//! lives in a single atomic cell; every transition is a compare-and-swap from
//! the step the caller observed, so two racing callers can never both leave
//! the same step.
//!
//! The submission latch is not a separate flag. It is held exactly while the
//! step is one of `Searching`, `SlotBooking`, `BookingSlot` or `Success`:
//! entering `Searching` sets it, rolling back to `Documents` clears it, and
//! success keeps it.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Step enumeration, atomic step guard, wizard errors

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of one wizard session (one mount of the wizard screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum WizardStep {
    Instructions = 0,
    Form = 1,
    Documents = 2,
    Searching = 3,
    Success = 4,
    /// Job wizard only: waiting for the applicant to pick a slot
    SlotBooking = 5,
    /// Job wizard only: slot submission in flight
    BookingSlot = 6,
}

impl WizardStep {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WizardStep::Instructions,
            1 => WizardStep::Form,
            2 => WizardStep::Documents,
            3 => WizardStep::Searching,
            4 => WizardStep::Success,
            5 => WizardStep::SlotBooking,
            _ => WizardStep::BookingSlot,
        }
    }

    /// Position shown in the progress indicator. The slot-booking modal
    /// sits on top of the Searching screen.
    pub fn position(&self) -> u8 {
        match self {
            WizardStep::SlotBooking | WizardStep::BookingSlot => 3,
            other => *other as u8,
        }
    }

    /// Whether the submission latch is held in this step.
    pub fn holds_latch(&self) -> bool {
        matches!(
            self,
            WizardStep::Searching
                | WizardStep::SlotBooking
                | WizardStep::BookingSlot
                | WizardStep::Success
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Instructions => "instructions",
            WizardStep::Form => "form",
            WizardStep::Documents => "documents",
            WizardStep::Searching => "searching",
            WizardStep::Success => "success",
            WizardStep::SlotBooking => "slot_booking",
            WizardStep::BookingSlot => "booking_slot",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder of the current step.
#[derive(Debug)]
pub struct StepGuard {
    step: AtomicU8,
}

impl StepGuard {
    pub fn new(initial: WizardStep) -> Self {
        Self {
            step: AtomicU8::new(initial as u8),
        }
    }

    pub fn current(&self) -> WizardStep {
        WizardStep::from_u8(self.step.load(Ordering::Acquire))
    }

    /// Move `from → to` only if the step is still `from`. On failure the
    /// actual step is returned and nothing changes.
    pub fn advance(&self, from: WizardStep, to: WizardStep) -> Result<(), WizardStep> {
        self.step
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(WizardStep::from_u8)
    }

    pub fn latch_held(&self) -> bool {
        self.current().holds_latch()
    }
}

impl Default for StepGuard {
    fn default() -> Self {
        Self::new(WizardStep::Instructions)
    }
}

/// Why a wizard operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Please fill in '{label}'")]
    MissingField { label: String },

    #[error("Please upload: {}", .names.join(", "))]
    MissingDocuments { names: Vec<String> },

    #[error("Please select a date for your appointment")]
    MissingSlotDate,

    #[error("Cannot {action} from the {from} step")]
    InvalidTransition { from: WizardStep, action: &'static str },

    #[error("'{name}' is not a required document for this application")]
    UnknownDocument { name: String },

    /// Server rejection or hard failure; the wizard has already rolled back
    #[error("{message}")]
    SubmissionFailed { message: String },

    #[error("Wizard session is closed")]
    SessionClosed,
}
