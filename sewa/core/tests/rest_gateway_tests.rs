// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use mockito::{Matcher, Server};
use serde_json::json;
use sewa_core::domain::client_config::{ApiConfig, StorageConfig};
use sewa_core::domain::document::{ResolvedDocument, UploadedDocument};
use sewa_core::domain::fee::FeeQuote;
use sewa_core::domain::form::{FieldType, FormAnswers};
use sewa_core::domain::gateway::{ApplicationGateway, BadgeSource, GatewayError, GENERIC_FAILURE_MESSAGE};
use sewa_core::domain::storage::{DocumentStorage, StorageError};
use sewa_core::domain::submission::{SelectedSlot, SubmissionPayload};
use sewa_core::domain::target::{TargetId, WizardVariant};
use sewa_core::infrastructure::rest_gateway::RestApplicationGateway;
use sewa_core::infrastructure::storage::MultipartObjectStorage;
use std::io::Write;

fn gateway(server: &Server, token: Option<&str>) -> RestApplicationGateway {
    RestApplicationGateway::new(&ApiConfig {
        base_url: format!("{}/api", server.url()),
        timeout_secs: 5,
        auth_token: token.map(str::to_string),
    })
    .unwrap()
}

fn job_payload() -> SubmissionPayload {
    let answers: FormAnswers = [("Full Name", "Asha")].into_iter().collect();
    SubmissionPayload::new(
        WizardVariant::Job,
        TargetId::new("job-1"),
        vec![ResolvedDocument::new("Photo", "https://cdn.example/p.jpg")],
        answers,
        FeeQuote::new(70, 50),
    )
}

#[tokio::test]
async fn test_live_submission_sends_bearer_and_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/applications/submit-live")
        .match_header("authorization", "Bearer citizen-token")
        .match_body(Matcher::PartialJson(json!({
            "jobId": "job-1",
            "isService": false,
            "paymentDetails": {"officialFee": 70, "serviceFee": 50, "totalAmount": 120, "isPaid": false},
            "uploadedDocuments": [{"docName": "Photo", "url": "https://cdn.example/p.jpg"}],
            "applicationData": {"Full Name": "Asha"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "ASSIGNED", "trackingId": "SEWA-1", "agentName": "Ravi"}"#)
        .expect(1)
        .create_async()
        .await;

    let response = gateway(&server, Some("citizen-token"))
        .submit_live(WizardVariant::Job, &job_payload())
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(response.is_assigned());
    assert_eq!(response.tracking_id.as_deref(), Some("SEWA-1"));
    assert_eq!(response.agent_name.as_deref(), Some("Ravi"));
}

#[tokio::test]
async fn test_service_submission_uses_apply_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/applications/apply")
        .match_body(Matcher::PartialJson(json!({"serviceId": "svc-1", "isService": true})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "QUEUED", "trackingId": "SEWA-5", "assignedAgent": "Meena"}"#)
        .create_async()
        .await;

    let payload = SubmissionPayload::new(
        WizardVariant::Service,
        TargetId::new("svc-1"),
        Vec::new(),
        FormAnswers::new(),
        FeeQuote::new(0, 50),
    );
    let response = gateway(&server, None)
        .submit_live(WizardVariant::Service, &payload)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(!response.is_assigned());
    assert_eq!(response.agent_name.as_deref(), Some("Meena"));
}

#[tokio::test]
async fn test_slot_submission_carries_selected_slot() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/applications/submit-slot")
        .match_body(Matcher::PartialJson(json!({
            "jobId": "job-1",
            "selectedSlot": {"date": "12/12/2025", "time": "10AM"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"trackingId": "SEWA-SLOT-1"}"#)
        .create_async()
        .await;

    let payload = job_payload().with_slot(
        Vec::new(),
        SelectedSlot {
            date: "12/12/2025".to_string(),
            time: "10AM".to_string(),
        },
    );
    let response = gateway(&server, None).submit_slot(&payload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.tracking_id, "SEWA-SLOT-1");
}

#[tokio::test]
async fn test_rejection_message_is_taken_from_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/applications/submit-live")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "You have already applied for this job"}"#)
        .create_async()
        .await;

    let err = gateway(&server, None)
        .submit_live(WizardVariant::Job, &job_payload())
        .await
        .unwrap_err();

    assert!(!err.is_transport());
    match err {
        GatewayError::Rejected { status, ref message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "You have already applied for this job");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejection_without_json_body_uses_generic_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/applications/apply")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let payload = SubmissionPayload::new(
        WizardVariant::Service,
        TargetId::new("svc-1"),
        Vec::new(),
        FormAnswers::new(),
        FeeQuote::new(0, 50),
    );
    let err = gateway(&server, None)
        .submit_live(WizardVariant::Service, &payload)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let err = RestApplicationGateway::new(&ApiConfig {
        // Port 9 (discard) is not listening in test environments
        base_url: "http://127.0.0.1:9/api".to_string(),
        timeout_secs: 2,
        auth_token: None,
    })
    .unwrap()
    .submit_live(WizardVariant::Job, &job_payload())
    .await
    .unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn test_fetch_form_template_and_target() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/forms/form-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "sections": [{
                    "heading": "Education",
                    "fields": [
                        {"label": "Board", "type": "dropdown", "isRequired": true, "options": ["CBSE", "State"]},
                        {"label": "Percentage", "type": "number", "isRequired": false}
                    ]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/services/svc-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "_id": "svc-1",
                "title": "Income Certificate",
                "linkedFormId": "form-7",
                "requiredDocuments": ["Photo"],
                "feeStructure": [{"category": "Any", "gender": "Any", "amount": 30}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let gateway = gateway(&server, None);

    let template = gateway.fetch_form_template("form-7").await.unwrap();
    let fields = &template.sections[0].fields;
    assert_eq!(fields[0].field_type, FieldType::Choice);
    assert_eq!(fields[0].options.len(), 2);
    assert_eq!(fields[1].field_type, FieldType::Number);

    let target = gateway
        .fetch_target(WizardVariant::Service, &TargetId::new("svc-1"))
        .await
        .unwrap();
    assert_eq!(target.linked_form(), Some("form-7"));
    assert_eq!(target.service_charge, 50);
    assert_eq!(target.fee_structure[0].amount, 30);
}

#[tokio::test]
async fn test_profile_and_unread_count() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/auth/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"name": "Asha", "savedDocuments": {"Photo": "https://cdn.example/photo.jpg"}}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/notifications/unread-count")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"count": 4}"#)
        .create_async()
        .await;

    let gateway = gateway(&server, Some("t"));
    let profile = gateway.fetch_profile().await.unwrap();
    assert_eq!(
        profile.saved_documents.get("Photo").map(String::as_str),
        Some("https://cdn.example/photo.jpg")
    );
    assert_eq!(gateway.unread_count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/applications/submit-slot")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;

    let err = gateway(&server, None).submit_slot(&job_payload()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn test_multipart_upload_returns_secure_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="marksheet.pdf""#.to_string()),
            Matcher::Regex(r#"name="upload_preset""#.to_string()),
            Matcher::Regex("sewa_docs".to_string()),
            Matcher::Regex("MARKSHEET-CONTENT".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"secure_url": "https://cdn.example/v1/marksheet.pdf"}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("marksheet.pdf");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"MARKSHEET-CONTENT").unwrap();

    let storage = MultipartObjectStorage::new(&StorageConfig {
        upload_url: format!("{}/upload", server.url()),
        upload_preset: Some("sewa_docs".to_string()),
        timeout_secs: 5,
    })
    .unwrap();

    let url = storage
        .upload(&UploadedDocument::local(&path, Some("application/pdf".to_string())))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(url, "https://cdn.example/v1/marksheet.pdf");
}

#[tokio::test]
async fn test_multipart_upload_rejection() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/upload")
        .with_status(400)
        .with_body("Invalid upload preset")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.jpg");
    std::fs::write(&path, b"jpeg").unwrap();

    let storage = MultipartObjectStorage::new(&StorageConfig {
        upload_url: format!("{}/upload", server.url()),
        upload_preset: None,
        timeout_secs: 5,
    })
    .unwrap();

    let err = storage
        .upload(&UploadedDocument::local(&path, None))
        .await
        .unwrap_err();
    match err {
        StorageError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid upload preset");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_form_id_with_reserved_characters_stays_in_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/forms/2024%2Fbatch%3Fv=2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"sections": []}).to_string())
        .expect(1)
        .create_async()
        .await;

    let template = gateway(&server, None)
        .fetch_form_template("2024/batch?v=2")
        .await
        .unwrap();
    assert!(template.sections.is_empty());
    mock.assert_async().await;
}
