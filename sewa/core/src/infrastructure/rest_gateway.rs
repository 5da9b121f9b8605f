// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! REST Application Gateway
//!
//! reqwest adapter for the citizen-services backend. Implements
//! [`ApplicationGateway`] and [`BadgeSource`] as an Anti-Corruption Layer.
//!
//! # API Endpoints
//!
//! - `GET /jobs/{id}`, `GET /services/{id}` - Fetch the application target
//! - `GET /forms/{id}` - Fetch a linked form template
//! - `GET /auth/me` - Profile with saved documents
//! - `POST /applications/submit-live` - Job live submission
//! - `POST /applications/apply` - Service submission
//! - `POST /applications/submit-slot` - Job slot-booking fallback
//! - `GET /notifications/unread-count` - Badge counter

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::client_config::ApiConfig;
use crate::domain::form::FormTemplate;
use crate::domain::gateway::{ApplicationGateway, BadgeSource, GatewayError, GENERIC_FAILURE_MESSAGE};
use crate::domain::submission::{
    LiveSubmissionResponse, SavedProfile, SlotSubmissionResponse, SubmissionPayload,
};
use crate::domain::target::{ApplicationTarget, TargetId, WizardVariant};

pub struct RestApplicationGateway {
    client: Client,
    /// `{API}` prefix (e.g. "http://localhost:5000/api")
    base_url: Url,
    auth_token: Option<String>,
}

impl RestApplicationGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Build full URL for API endpoint. Each segment is percent-encoded, so
    /// ids containing `/`, `?` or `#` stay inside their segment.
    fn build_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, GatewayError> {
        let url = self.build_url(segments);
        debug!(url = %url, "GET");
        let response = self.authorized(self.client.get(url)).send().await?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        payload: &SubmissionPayload,
    ) -> Result<T, GatewayError> {
        let url = self.build_url(segments);
        debug!(url = %url, "POST");
        let response = self.authorized(self.client.post(url)).json(payload).send().await?;
        decode(response).await
    }
}

/// Error body shape used by the backend: `{message}` or `{error}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        return Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Serialize, Deserialize)]
struct UnreadCount {
    #[serde(default)]
    count: u64,
}

#[async_trait]
impl ApplicationGateway for RestApplicationGateway {
    async fn fetch_target(
        &self,
        variant: WizardVariant,
        id: &TargetId,
    ) -> Result<ApplicationTarget, GatewayError> {
        let collection = match variant {
            WizardVariant::Job => "jobs",
            WizardVariant::Service => "services",
        };
        self.get_json(&[collection, id.as_str()]).await
    }

    async fn fetch_form_template(&self, form_id: &str) -> Result<FormTemplate, GatewayError> {
        self.get_json(&["forms", form_id]).await
    }

    async fn fetch_profile(&self) -> Result<SavedProfile, GatewayError> {
        self.get_json(&["auth", "me"]).await
    }

    async fn submit_live(
        &self,
        variant: WizardVariant,
        payload: &SubmissionPayload,
    ) -> Result<LiveSubmissionResponse, GatewayError> {
        let action = match variant {
            WizardVariant::Job => "submit-live",
            WizardVariant::Service => "apply",
        };
        self.post_json(&["applications", action], payload).await
    }

    async fn submit_slot(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<SlotSubmissionResponse, GatewayError> {
        self.post_json(&["applications", "submit-slot"], payload).await
    }
}

#[async_trait]
impl BadgeSource for RestApplicationGateway {
    async fn unread_count(&self) -> Result<u64, GatewayError> {
        let body: UnreadCount = self.get_json(&["notifications", "unread-count"]).await?;
        Ok(body.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "Already applied", "error": "conflict"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Already applied"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "", "error": "Job closed"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Job closed"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.into_message().is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:5000/api/".to_string(),
            ..ApiConfig::default()
        };
        let gateway = RestApplicationGateway::new(&config).unwrap();
        assert_eq!(
            gateway.build_url(&["auth", "me"]).as_str(),
            "http://localhost:5000/api/auth/me"
        );
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        let gateway = RestApplicationGateway::new(&ApiConfig::default()).unwrap();
        let url = gateway.build_url(&["forms", "a/b?c#d"]);
        assert_eq!(url.path(), "/api/forms/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_host_only_base_url() {
        let config = ApiConfig {
            base_url: "http://localhost:5000".to_string(),
            ..ApiConfig::default()
        };
        let gateway = RestApplicationGateway::new(&config).unwrap();
        assert_eq!(
            gateway.build_url(&["jobs", "job-42"]).as_str(),
            "http://localhost:5000/jobs/job-42"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            RestApplicationGateway::new(&config),
            Err(GatewayError::InvalidUrl(_))
        ));
    }
}
