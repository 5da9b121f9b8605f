// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application Wizard Session
//!
//! One [`ApplicationWizard`] drives one applicant through
//! `Instructions → Form → Documents → Searching → Success` for a single
//! target. Every transition goes through the session's [`StepGuard`], so the
//! submission latch and the step can never disagree: entering `Searching` is
//! the check-and-set, and a second submit while it is held is a no-op.
//!
//! Network results are applied only while the session is alive. After
//! [`ApplicationWizard::close`] a late response is dropped and the caller gets
//! [`WizardError::SessionClosed`]. A `submit` or `book_slot` future dropped
//! before its response arrives (timeout, `select!`, aborted task) releases
//! the step it took, so the applicant can retry.
//!
//! Fallback policy when no agent is matched:
//!
//! | Outcome                     | Job wizard        | Service wizard     |
//! |-----------------------------|-------------------|--------------------|
//! | `ASSIGNED`                  | Success           | Success            |
//! | other 2xx status            | SlotBooking       | Success (queued)   |
//! | transport failure           | SlotBooking       | back to Documents  |
//! | HTTP rejection / bad body   | back to Documents | back to Documents  |

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::document_coordinator::DocumentUploadCoordinator;
use crate::application::schema_resolver::SchemaResolver;
use crate::domain::document::{DocumentResolution, DocumentSelection, UploadedDocument};
use crate::domain::events::WizardEvent;
use crate::domain::fee::FeeQuote;
use crate::domain::form::{FormAnswers, ResolvedSchema};
use crate::domain::gateway::{ApplicationGateway, GatewayError};
use crate::domain::storage::DocumentStorage;
use crate::domain::submission::{
    SelectedSlot, SubmissionPayload, SubmissionResult, SubmissionStatus, ANY_TIME,
};
use crate::domain::target::{ApplicationTarget, WizardVariant};
use crate::domain::wizard::{SessionId, StepGuard, WizardError, WizardStep};
use crate::infrastructure::event_bus::EventBus;

/// What a submit or slot confirmation led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session reached Success
    Submitted(SubmissionResult),
    /// Job wizard only: pick a date (and optionally a time) and call
    /// [`ApplicationWizard::book_slot`]
    SlotBookingRequired { time_slots: Vec<String> },
    /// A submission is already in flight or done; nothing was sent
    AlreadySubmitted,
}

/// Live payload kept for the slot-booking fallback.
#[derive(Debug, Clone)]
struct PendingSlotBooking {
    payload: SubmissionPayload,
    resolution: DocumentResolution,
}

#[derive(Debug, Default)]
struct SessionState {
    schema: Option<ResolvedSchema>,
    answers: FormAnswers,
    documents: DocumentSelection,
    pending: Option<PendingSlotBooking>,
    result: Option<SubmissionResult>,
    last_error: Option<String>,
}

/// Releases a held step if the call holding it is dropped mid-request.
///
/// Armed right after the step guard is taken and disarmed once the last
/// response is in hand, so a cancelled `submit` or `book_slot` cannot leave
/// the session parked in an in-flight step.
struct InFlight<'a> {
    wizard: &'a ApplicationWizard,
    held: WizardStep,
    release_to: WizardStep,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(wizard: &'a ApplicationWizard, held: WizardStep, release_to: WizardStep) -> Self {
        Self {
            wizard,
            held,
            release_to,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed || !self.wizard.is_alive() {
            return;
        }
        if self.wizard.step.advance(self.held, self.release_to).is_ok() {
            warn!(
                session_id = %self.wizard.id,
                from = %self.held,
                to = %self.release_to,
                "Request abandoned before a response; releasing step"
            );
            self.wizard.step_changed(self.held, self.release_to);
        }
    }
}

pub struct ApplicationWizard {
    id: SessionId,
    variant: WizardVariant,
    target: ApplicationTarget,
    gateway: Arc<dyn ApplicationGateway>,
    resolver: SchemaResolver,
    coordinator: DocumentUploadCoordinator,
    event_bus: Arc<EventBus>,
    step: StepGuard,
    alive: AtomicBool,
    state: Mutex<SessionState>,
}

impl ApplicationWizard {
    pub fn new(
        variant: WizardVariant,
        target: ApplicationTarget,
        gateway: Arc<dyn ApplicationGateway>,
        storage: Arc<dyn DocumentStorage>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let id = SessionId::new();
        info!(session_id = %id, target_id = %target.id, variant = %variant, "Wizard session created");
        Self {
            id,
            variant,
            target,
            resolver: SchemaResolver::new(gateway.clone()),
            gateway,
            coordinator: DocumentUploadCoordinator::new(storage),
            event_bus,
            step: StepGuard::default(),
            alive: AtomicBool::new(true),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> WizardVariant {
        self.variant
    }

    pub fn target(&self) -> &ApplicationTarget {
        &self.target
    }

    pub fn step(&self) -> WizardStep {
        self.step.current()
    }

    pub fn latch_held(&self) -> bool {
        self.step.latch_held()
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Resolved schema, once [`begin`](Self::begin) has run.
    pub fn schema(&self) -> Option<ResolvedSchema> {
        self.state.lock().schema.clone()
    }

    pub fn answers(&self) -> FormAnswers {
        self.state.lock().answers.clone()
    }

    pub fn documents(&self) -> DocumentSelection {
        self.state.lock().documents.clone()
    }

    pub fn result(&self) -> Option<SubmissionResult> {
        self.state.lock().result.clone()
    }

    /// Message of the most recent failed submission attempt.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Current fee, derived from the answers as they stand.
    pub fn fee_quote(&self) -> FeeQuote {
        FeeQuote::compute(&self.target, &self.state.lock().answers)
    }

    /// Leave the Instructions step.
    ///
    /// Resolves the form schema on first use and moves to Form, or straight
    /// to Documents when there is nothing to fill in.
    pub async fn begin(&self) -> Result<WizardStep, WizardError> {
        self.require_alive()?;
        let current = self.step.current();
        if current != WizardStep::Instructions {
            return Err(WizardError::InvalidTransition { from: current, action: "begin" });
        }

        let cached = self.state.lock().schema.clone();
        let schema = match cached {
            Some(schema) => schema,
            None => {
                let schema = self.resolver.resolve(&self.target, self.variant).await;
                self.require_alive()?;
                self.state.lock().schema = Some(schema.clone());
                schema
            }
        };

        let to = if schema.has_no_fields() {
            debug!(session_id = %self.id, "No form fields resolved; skipping to documents");
            WizardStep::Documents
        } else {
            WizardStep::Form
        };
        self.transition(WizardStep::Instructions, to, "begin")?;
        Ok(to)
    }

    /// Record an answer and return the recalculated fee.
    pub fn set_answer(
        &self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<FeeQuote, WizardError> {
        self.require_alive()?;
        self.require_unlatched("edit answers")?;

        let quote = {
            let mut state = self.state.lock();
            state.answers.set(label, value);
            FeeQuote::compute(&self.target, &state.answers)
        };

        self.publish(WizardEvent::FeeRecalculated {
            session_id: self.id,
            quote,
            calculated_at: Utc::now(),
        });
        Ok(quote)
    }

    /// Form → Documents, once every required field has a non-blank answer.
    pub fn continue_to_documents(&self) -> Result<(), WizardError> {
        self.require_alive()?;
        let current = self.step.current();
        if current != WizardStep::Form {
            return Err(WizardError::InvalidTransition { from: current, action: "continue to documents" });
        }

        {
            let state = self.state.lock();
            if let Some(field) = state
                .schema
                .as_ref()
                .and_then(|schema| schema.first_missing(&state.answers))
            {
                return Err(WizardError::MissingField { label: field.label.clone() });
            }
        }

        self.transition(WizardStep::Form, WizardStep::Documents, "continue to documents")
    }

    /// Pick a document for a required name, returning the pick it replaced.
    pub fn pick_document(
        &self,
        doc_name: &str,
        document: UploadedDocument,
    ) -> Result<Option<UploadedDocument>, WizardError> {
        self.require_alive()?;
        self.require_unlatched("change documents")?;
        if !self.target.required_documents.iter().any(|name| name == doc_name) {
            return Err(WizardError::UnknownDocument { name: doc_name.to_string() });
        }

        Ok(self.state.lock().documents.pick(doc_name, document))
    }

    /// Fill unpicked required documents from the profile's saved documents.
    ///
    /// Existing picks are kept. A failed profile fetch is logged and leaves
    /// the selection unchanged. Returns the number of documents filled in.
    pub async fn prefill_saved_documents(&self) -> Result<usize, WizardError> {
        self.require_alive()?;

        let profile = match self.gateway.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Failed to fetch saved documents");
                return Ok(0);
            }
        };
        self.require_alive()?;
        if self.step.latch_held() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        let mut filled = 0;
        for name in &self.target.required_documents {
            if state.documents.contains(name) {
                continue;
            }
            if let Some(url) = profile.saved_documents.get(name) {
                state.documents.pick(name.clone(), UploadedDocument::saved(url.clone(), name.clone()));
                filled += 1;
            }
        }

        debug!(session_id = %self.id, filled, "Prefilled saved documents");
        Ok(filled)
    }

    /// Submit the application.
    ///
    /// Only the caller that moves the session from Documents to Searching
    /// sends the live request. Any other caller gets
    /// [`SubmitOutcome::AlreadySubmitted`] while the latch is held.
    pub async fn submit(&self) -> Result<SubmitOutcome, WizardError> {
        self.require_alive()?;
        let current = self.step.current();
        if current.holds_latch() {
            return Ok(self.block_duplicate(current));
        }
        if current != WizardStep::Documents {
            return Err(WizardError::InvalidTransition { from: current, action: "submit" });
        }

        let (selection, answers) = {
            let state = self.state.lock();
            let missing = state.documents.missing(&self.target.required_documents);
            if !missing.is_empty() {
                return Err(WizardError::MissingDocuments { names: missing });
            }
            (state.documents.clone(), state.answers.clone())
        };

        if let Err(actual) = self.step.advance(WizardStep::Documents, WizardStep::Searching) {
            if actual.holds_latch() {
                return Ok(self.block_duplicate(actual));
            }
            return Err(WizardError::InvalidTransition { from: actual, action: "submit" });
        }
        let in_flight = InFlight::arm(self, WizardStep::Searching, WizardStep::Documents);
        self.step_changed(WizardStep::Documents, WizardStep::Searching);
        self.publish(WizardEvent::SubmissionStarted {
            session_id: self.id,
            target_id: self.target.id.clone(),
            variant: self.variant,
            started_at: Utc::now(),
        });

        let resolution = self
            .coordinator
            .resolve(&self.target.required_documents, &selection)
            .await;
        for failure in &resolution.failed {
            self.publish(WizardEvent::DocumentUploadFailed {
                session_id: self.id,
                doc_name: failure.doc_name.clone(),
                reason: failure.reason.clone(),
                failed_at: Utc::now(),
            });
        }

        let quote = FeeQuote::compute(&self.target, &answers);
        let payload = SubmissionPayload::new(
            self.variant,
            self.target.id.clone(),
            resolution.for_live_submission(),
            answers,
            quote,
        );

        info!(
            session_id = %self.id,
            target_id = %self.target.id,
            variant = %self.variant,
            documents = payload.uploaded_documents.len(),
            total_amount = quote.total_amount,
            "Submitting application"
        );
        let response = self.gateway.submit_live(self.variant, &payload).await;
        in_flight.disarm();

        if !self.is_alive() {
            debug!(session_id = %self.id, "Session closed during submission; discarding response");
            return Err(WizardError::SessionClosed);
        }

        match response {
            Ok(response) if response.is_assigned() => match response.tracking_id {
                Some(tracking_id) => self.finish(
                    WizardStep::Searching,
                    SubmissionResult {
                        tracking_id,
                        status: SubmissionStatus::Assigned,
                        agent_name: response.agent_name,
                    },
                ),
                None => self.roll_back(&GatewayError::Decode("response is missing trackingId".to_string())),
            },
            Ok(response) => match self.variant {
                WizardVariant::Job => Ok(self.offer_slot_booking(payload, resolution, false)),
                WizardVariant::Service => match response.tracking_id {
                    Some(tracking_id) => self.finish(
                        WizardStep::Searching,
                        SubmissionResult {
                            tracking_id,
                            status: SubmissionStatus::Queued,
                            agent_name: None,
                        },
                    ),
                    None => self.roll_back(&GatewayError::Decode("response is missing trackingId".to_string())),
                },
            },
            Err(e) if e.is_transport() && self.variant.offers_slot_booking() => {
                warn!(session_id = %self.id, error = %e, "Live submission unreachable; offering slot booking");
                Ok(self.offer_slot_booking(payload, resolution, true))
            }
            Err(e) => self.roll_back(&e),
        }
    }

    /// Confirm the slot-booking fallback with a date and optional time.
    pub async fn book_slot(&self, date: &str, time: Option<&str>) -> Result<SubmitOutcome, WizardError> {
        self.require_alive()?;
        let current = self.step.current();
        match current {
            WizardStep::SlotBooking => {}
            WizardStep::BookingSlot | WizardStep::Success => return Ok(self.block_duplicate(current)),
            other => return Err(WizardError::InvalidTransition { from: other, action: "book a slot" }),
        }

        let date = date.trim();
        if date.is_empty() {
            return Err(WizardError::MissingSlotDate);
        }
        let time = time
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(ANY_TIME);

        if let Err(actual) = self.step.advance(WizardStep::SlotBooking, WizardStep::BookingSlot) {
            if actual.holds_latch() {
                return Ok(self.block_duplicate(actual));
            }
            return Err(WizardError::InvalidTransition { from: actual, action: "book a slot" });
        }
        let in_flight = InFlight::arm(self, WizardStep::BookingSlot, WizardStep::SlotBooking);
        self.step_changed(WizardStep::SlotBooking, WizardStep::BookingSlot);

        let Some(pending) = self.state.lock().pending.clone() else {
            in_flight.disarm();
            let _ = self.step.advance(WizardStep::BookingSlot, WizardStep::SlotBooking);
            return Err(WizardError::InvalidTransition { from: WizardStep::SlotBooking, action: "book a slot" });
        };

        let payload = pending.payload.with_slot(
            pending.resolution.for_slot_submission(&self.target.required_documents),
            SelectedSlot {
                date: date.to_string(),
                time: time.to_string(),
            },
        );

        info!(session_id = %self.id, target_id = %self.target.id, date, time, "Booking slot");
        let response = self.gateway.submit_slot(&payload).await;
        in_flight.disarm();

        if !self.is_alive() {
            debug!(session_id = %self.id, "Session closed during slot booking; discarding response");
            return Err(WizardError::SessionClosed);
        }

        match response {
            Ok(response) => self.finish(
                WizardStep::BookingSlot,
                SubmissionResult {
                    tracking_id: response.tracking_id,
                    status: SubmissionStatus::Queued,
                    agent_name: None,
                },
            ),
            Err(e) => {
                let message = e.user_message();
                warn!(session_id = %self.id, error = %e, "Slot booking failed");
                if self.step.advance(WizardStep::BookingSlot, WizardStep::SlotBooking).is_ok() {
                    self.step_changed(WizardStep::BookingSlot, WizardStep::SlotBooking);
                }
                self.record_failure(message, WizardStep::SlotBooking)
            }
        }
    }

    /// Step back one screen. Not possible once a submission has started.
    pub fn go_back(&self) -> Result<WizardStep, WizardError> {
        self.require_alive()?;
        let current = self.step.current();
        let to = match current {
            WizardStep::Form => WizardStep::Instructions,
            WizardStep::Documents => {
                let has_fields = self
                    .state
                    .lock()
                    .schema
                    .as_ref()
                    .is_some_and(|schema| !schema.has_no_fields());
                if has_fields {
                    WizardStep::Form
                } else {
                    WizardStep::Instructions
                }
            }
            other => return Err(WizardError::InvalidTransition { from: other, action: "go back" }),
        };

        self.transition(current, to, "go back")?;
        Ok(to)
    }

    /// Mark the session dead. Responses still in flight are discarded.
    pub fn close(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            info!(session_id = %self.id, step = %self.step.current(), "Wizard session closed");
            self.publish(WizardEvent::SessionClosed {
                session_id: self.id,
                closed_at: Utc::now(),
            });
        }
    }

    fn require_alive(&self) -> Result<(), WizardError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(WizardError::SessionClosed)
        }
    }

    fn require_unlatched(&self, action: &'static str) -> Result<(), WizardError> {
        let current = self.step.current();
        if current.holds_latch() {
            return Err(WizardError::InvalidTransition { from: current, action });
        }
        Ok(())
    }

    fn transition(&self, from: WizardStep, to: WizardStep, action: &'static str) -> Result<(), WizardError> {
        self.step
            .advance(from, to)
            .map_err(|actual| WizardError::InvalidTransition { from: actual, action })?;
        self.step_changed(from, to);
        Ok(())
    }

    fn step_changed(&self, from: WizardStep, to: WizardStep) {
        debug!(session_id = %self.id, from = %from, to = %to, "Wizard step changed");
        self.publish(WizardEvent::StepChanged {
            session_id: self.id,
            from,
            to,
            changed_at: Utc::now(),
        });
    }

    fn block_duplicate(&self, step: WizardStep) -> SubmitOutcome {
        metrics::counter!("sewa_duplicate_submissions_blocked_total").increment(1);
        debug!(session_id = %self.id, step = %step, "Duplicate submission ignored");
        self.publish(WizardEvent::DuplicateSubmissionBlocked {
            session_id: self.id,
            step,
            blocked_at: Utc::now(),
        });
        SubmitOutcome::AlreadySubmitted
    }

    fn finish(&self, from: WizardStep, result: SubmissionResult) -> Result<SubmitOutcome, WizardError> {
        self.state.lock().result = Some(result.clone());
        self.step
            .advance(from, WizardStep::Success)
            .map_err(|actual| WizardError::InvalidTransition { from: actual, action: "complete submission" })?;
        self.step_changed(from, WizardStep::Success);

        match result.status {
            SubmissionStatus::Assigned => {
                metrics::counter!("sewa_submissions_total", "variant" => self.variant.as_str(), "outcome" => "assigned")
                    .increment(1);
                info!(
                    session_id = %self.id,
                    tracking_id = %result.tracking_id,
                    agent_name = ?result.agent_name,
                    "Application assigned to agent"
                );
                self.publish(WizardEvent::AgentAssigned {
                    session_id: self.id,
                    tracking_id: result.tracking_id.clone(),
                    agent_name: result.agent_name.clone(),
                    assigned_at: Utc::now(),
                });
            }
            SubmissionStatus::Queued => {
                metrics::counter!("sewa_submissions_total", "variant" => self.variant.as_str(), "outcome" => "queued")
                    .increment(1);
                info!(session_id = %self.id, tracking_id = %result.tracking_id, "Application queued");
                self.publish(WizardEvent::ApplicationQueued {
                    session_id: self.id,
                    tracking_id: result.tracking_id.clone(),
                    queued_at: Utc::now(),
                });
            }
        }

        Ok(SubmitOutcome::Submitted(result))
    }

    fn offer_slot_booking(
        &self,
        payload: SubmissionPayload,
        resolution: DocumentResolution,
        after_network_failure: bool,
    ) -> SubmitOutcome {
        self.state.lock().pending = Some(PendingSlotBooking { payload, resolution });
        if self.step.advance(WizardStep::Searching, WizardStep::SlotBooking).is_ok() {
            self.step_changed(WizardStep::Searching, WizardStep::SlotBooking);
        }

        metrics::counter!("sewa_submissions_total", "variant" => self.variant.as_str(), "outcome" => "slot_booking_offered")
            .increment(1);
        info!(session_id = %self.id, after_network_failure, "No agent available; offering slot booking");
        self.publish(WizardEvent::SlotBookingOffered {
            session_id: self.id,
            time_slots: self.target.time_slots.clone(),
            after_network_failure,
            offered_at: Utc::now(),
        });

        SubmitOutcome::SlotBookingRequired {
            time_slots: self.target.time_slots.clone(),
        }
    }

    /// Release the latch by returning to Documents.
    fn roll_back(&self, error: &GatewayError) -> Result<SubmitOutcome, WizardError> {
        warn!(session_id = %self.id, error = %error, "Submission failed; returning to documents");
        if self.step.advance(WizardStep::Searching, WizardStep::Documents).is_ok() {
            self.step_changed(WizardStep::Searching, WizardStep::Documents);
        }
        metrics::counter!("sewa_submissions_total", "variant" => self.variant.as_str(), "outcome" => "failed")
            .increment(1);
        self.record_failure(error.user_message(), WizardStep::Documents)
    }

    fn record_failure(&self, message: String, rolled_back_to: WizardStep) -> Result<SubmitOutcome, WizardError> {
        self.state.lock().last_error = Some(message.clone());
        self.publish(WizardEvent::SubmissionFailed {
            session_id: self.id,
            message: message.clone(),
            rolled_back_to,
            failed_at: Utc::now(),
        });
        Err(WizardError::SubmissionFailed { message })
    }

    fn publish(&self, event: WizardEvent) {
        self.event_bus.publish(event);
    }
}
