// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Submission payloads and results
//!
//! Wire types for the live-submission, service-apply and slot-booking
//! endpoints, plus the [`SubmissionResult`] that ends a wizard session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::document::ResolvedDocument;
use crate::domain::fee::FeeQuote;
use crate::domain::form::FormAnswers;
use crate::domain::target::{TargetId, WizardVariant};

/// Live-submission status meaning an agent was matched synchronously.
pub const STATUS_ASSIGNED: &str = "ASSIGNED";

/// Time recorded when the applicant does not choose one.
pub const ANY_TIME: &str = "Any Time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub official_fee: u64,
    pub service_fee: u64,
    pub total_amount: u64,
    pub is_paid: bool,
}

impl From<FeeQuote> for PaymentDetails {
    fn from(quote: FeeQuote) -> Self {
        Self {
            official_fee: quote.official_fee,
            service_fee: quote.service_fee,
            total_amount: quote.total_amount,
            is_paid: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSlot {
    pub date: String,
    pub time: String,
}

/// Request body shared by all submission endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<TargetId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<TargetId>,
    pub uploaded_documents: Vec<ResolvedDocument>,
    pub application_data: FormAnswers,
    pub payment_details: PaymentDetails,
    pub is_service: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_slot: Option<SelectedSlot>,
}

impl SubmissionPayload {
    pub fn new(
        variant: WizardVariant,
        target_id: TargetId,
        uploaded_documents: Vec<ResolvedDocument>,
        application_data: FormAnswers,
        quote: FeeQuote,
    ) -> Self {
        let (job_id, service_id) = match variant {
            WizardVariant::Job => (Some(target_id), None),
            WizardVariant::Service => (None, Some(target_id)),
        };
        Self {
            job_id,
            service_id,
            uploaded_documents,
            application_data,
            payment_details: quote.into(),
            is_service: variant == WizardVariant::Service,
            selected_slot: None,
        }
    }

    /// Same application re-sent to the slot-booking endpoint.
    pub fn with_slot(mut self, documents: Vec<ResolvedDocument>, slot: SelectedSlot) -> Self {
        self.uploaded_documents = documents;
        self.selected_slot = Some(slot);
        self
    }
}

/// Response of `submit-live` and `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSubmissionResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default, alias = "assignedAgent")]
    pub agent_name: Option<String>,
}

impl LiveSubmissionResponse {
    pub fn is_assigned(&self) -> bool {
        self.status == STATUS_ASSIGNED
    }
}

/// Response of `submit-slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSubmissionResponse {
    pub tracking_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Assigned,
    Queued,
}

/// Terminal outcome of a wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub tracking_id: String,
    pub status: SubmissionStatus,
    pub agent_name: Option<String>,
}

/// Subset of `GET /auth/me` the wizard needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfile {
    #[serde(default)]
    pub saved_documents: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_payload_shape() {
        let answers: FormAnswers = [("Full Name", "Asha")].into_iter().collect();
        let payload = SubmissionPayload::new(
            WizardVariant::Job,
            TargetId::new("job-1"),
            vec![ResolvedDocument::new("Photo", "https://cdn/p.jpg")],
            answers,
            FeeQuote::new(70, 50),
        );

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "jobId": "job-1",
                "uploadedDocuments": [{"docName": "Photo", "url": "https://cdn/p.jpg"}],
                "applicationData": {"Full Name": "Asha"},
                "paymentDetails": {"officialFee": 70, "serviceFee": 50, "totalAmount": 120, "isPaid": false},
                "isService": false
            })
        );
    }

    #[test]
    fn test_service_payload_with_slot() {
        let payload = SubmissionPayload::new(
            WizardVariant::Service,
            TargetId::new("svc-9"),
            Vec::new(),
            FormAnswers::new(),
            FeeQuote::new(0, 50),
        )
        .with_slot(
            Vec::new(),
            SelectedSlot { date: "12/12/2025".into(), time: ANY_TIME.into() },
        );

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["serviceId"], "svc-9");
        assert!(value.get("jobId").is_none());
        assert_eq!(value["isService"], true);
        assert_eq!(value["selectedSlot"], json!({"date": "12/12/2025", "time": "Any Time"}));
    }

    #[test]
    fn test_live_response_agent_aliases() {
        let assigned: LiveSubmissionResponse =
            serde_json::from_str(r#"{"status": "ASSIGNED", "trackingId": "SEWA-1", "agentName": "Ravi"}"#).unwrap();
        assert!(assigned.is_assigned());
        assert_eq!(assigned.agent_name.as_deref(), Some("Ravi"));

        let service: LiveSubmissionResponse =
            serde_json::from_str(r#"{"status": "QUEUED", "trackingId": "SEWA-2", "assignedAgent": "Meena"}"#).unwrap();
        assert!(!service.is_assigned());
        assert_eq!(service.agent_name.as_deref(), Some("Meena"));

        let lowercase: LiveSubmissionResponse = serde_json::from_str(r#"{"status": "assigned"}"#).unwrap();
        assert!(!lowercase.is_assigned());
    }
}
