// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application Target Domain Model
//!
//! A target is the Job or Service a citizen applies to. Targets are fetched
//! once from the backend and are immutable for the lifetime of a wizard
//! session.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Wire-compatible representation of jobs and services

use serde::{Deserialize, Serialize};

use crate::domain::fee::FeeRule;
use crate::domain::form::FormField;

/// Service charge applied when the backend does not send one.
pub const DEFAULT_SERVICE_CHARGE: u64 = 50;

/// Backend identifier of a job or service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which wizard drives the application.
///
/// The two variants share the step sequence but differ in their fallback
/// policy when no agent is available or the network drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardVariant {
    Job,
    Service,
}

impl WizardVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardVariant::Job => "job",
            WizardVariant::Service => "service",
        }
    }

    /// Only the service wizard falls back to a built-in applicant section.
    pub fn uses_default_section(&self) -> bool {
        matches!(self, WizardVariant::Service)
    }

    /// Only the job wizard negotiates a time slot when no agent is free.
    pub fn offers_slot_booking(&self) -> bool {
        matches!(self, WizardVariant::Job)
    }
}

impl std::fmt::Display for WizardVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WizardVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "job" | "jobs" => Ok(WizardVariant::Job),
            "service" | "services" => Ok(WizardVariant::Service),
            other => Err(format!("unknown wizard variant '{}'", other)),
        }
    }
}

/// A field declared directly on a service (`requiredFields`).
///
/// Uses `required` where linked templates use `isRequired`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredField {
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<crate::domain::form::FieldOption>,
}

fn default_field_type() -> String {
    "text".to_string()
}

/// Job or Service as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTarget {
    #[serde(alias = "_id")]
    pub id: TargetId,

    #[serde(default)]
    pub organization: Option<String>,

    pub title: String,

    /// Legacy flat field list (jobs only)
    #[serde(default)]
    pub form_schema: Vec<FormField>,

    #[serde(default)]
    pub required_fields: Vec<RequiredField>,

    #[serde(default)]
    pub linked_form_id: Option<String>,

    /// Ordered fee rules; order matters only within a tie-break tier
    #[serde(default)]
    pub fee_structure: Vec<FeeRule>,

    #[serde(default)]
    pub required_documents: Vec<String>,

    #[serde(default)]
    pub time_slots: Vec<String>,

    #[serde(default = "default_service_charge")]
    pub service_charge: u64,

    #[serde(default)]
    pub process_instructions: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_service_charge() -> u64 {
    DEFAULT_SERVICE_CHARGE
}

impl ApplicationTarget {
    /// Minimal target with no schema, fees or documents.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: TargetId::new(id),
            organization: None,
            title: title.into(),
            form_schema: Vec::new(),
            required_fields: Vec::new(),
            linked_form_id: None,
            fee_structure: Vec::new(),
            required_documents: Vec::new(),
            time_slots: Vec::new(),
            service_charge: DEFAULT_SERVICE_CHARGE,
            process_instructions: None,
            description: None,
        }
    }

    /// Text shown on the Instructions step.
    pub fn instructions(&self) -> Option<&str> {
        self.process_instructions
            .as_deref()
            .or(self.description.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Linked template id, ignoring blank values.
    pub fn linked_form(&self) -> Option<&str> {
        self.linked_form_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_charge_defaults_to_fifty() {
        let target: ApplicationTarget =
            serde_json::from_str(r#"{"_id": "svc-1", "title": "Income Certificate"}"#).unwrap();
        assert_eq!(target.id.as_str(), "svc-1");
        assert_eq!(target.service_charge, 50);
        assert!(target.required_documents.is_empty());
        assert!(target.linked_form().is_none());
    }

    #[test]
    fn test_camel_case_fields() {
        let target: ApplicationTarget = serde_json::from_str(
            r#"{
                "id": "job-7",
                "title": "Clerk",
                "organization": "District Office",
                "linkedFormId": "  ",
                "requiredFields": [{"label": "Aadhaar", "type": "number", "required": true}],
                "feeStructure": [{"category": "Gen", "gender": "Any", "amount": 100}],
                "requiredDocuments": ["Photo", "Signature"],
                "timeSlots": ["10AM", "2PM"],
                "serviceCharge": 30,
                "processInstructions": "Bring originals"
            }"#,
        )
        .unwrap();

        assert_eq!(target.organization.as_deref(), Some("District Office"));
        assert!(target.linked_form().is_none());
        assert_eq!(target.required_fields.len(), 1);
        assert!(target.required_fields[0].required);
        assert_eq!(target.fee_structure[0].amount, 100);
        assert_eq!(target.required_documents, vec!["Photo", "Signature"]);
        assert_eq!(target.service_charge, 30);
        assert_eq!(target.instructions(), Some("Bring originals"));
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("Job".parse::<WizardVariant>().unwrap(), WizardVariant::Job);
        assert_eq!("services".parse::<WizardVariant>().unwrap(), WizardVariant::Service);
        assert!("tender".parse::<WizardVariant>().is_err());
        assert!(WizardVariant::Job.offers_slot_booking());
        assert!(!WizardVariant::Job.uses_default_section());
    }
}
