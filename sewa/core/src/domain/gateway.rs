// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Backend Gateway Port
//!
//! Outbound REST contract the wizard depends on. The infrastructure layer
//! provides the reqwest implementation; tests provide in-memory fakes.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Ports for the application backend and badge counters

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::form::FormTemplate;
use crate::domain::submission::{
    LiveSubmissionResponse, SavedProfile, SlotSubmissionResponse, SubmissionPayload,
};
use crate::domain::target::{ApplicationTarget, TargetId, WizardVariant};

/// Message shown when a rejection carries no usable error text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Submission failed. Please try again.";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response at all: DNS, connect, timeout, reset
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status
    #[error("Request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A 2xx response whose body could not be used
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The configured base URL cannot carry path segments
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }

    /// Text to surface to the applicant.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            GatewayError::Decode(detail) => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Rejected {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            }
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// REST backend used by the application wizard.
#[async_trait]
pub trait ApplicationGateway: Send + Sync {
    /// `GET {API}/jobs/{id}` or `GET {API}/services/{id}`
    async fn fetch_target(
        &self,
        variant: WizardVariant,
        id: &TargetId,
    ) -> Result<ApplicationTarget, GatewayError>;

    /// `GET {API}/forms/{id}`
    async fn fetch_form_template(&self, form_id: &str) -> Result<FormTemplate, GatewayError>;

    /// `GET {API}/auth/me`
    async fn fetch_profile(&self) -> Result<SavedProfile, GatewayError>;

    /// `POST {API}/applications/submit-live` for jobs,
    /// `POST {API}/applications/apply` for services
    async fn submit_live(
        &self,
        variant: WizardVariant,
        payload: &SubmissionPayload,
    ) -> Result<LiveSubmissionResponse, GatewayError>;

    /// `POST {API}/applications/submit-slot`
    async fn submit_slot(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SlotSubmissionResponse, GatewayError>;
}

/// Source of the unread-notification badge count.
#[async_trait]
pub trait BadgeSource: Send + Sync {
    async fn unread_count(&self) -> Result<u64, GatewayError>;
}
