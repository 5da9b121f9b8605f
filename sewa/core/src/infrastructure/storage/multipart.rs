// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Multipart Object Storage Implementation
//!
//! Uploads applicant documents to a hosted media service with a single
//! multipart `POST`. The service answers with `{"secure_url": "..."}`.
//!
//! # Request
//!
//! - `file` - document bytes with file name and MIME type
//! - `upload_preset` - optional unsigned-upload preset

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::client_config::StorageConfig;
use crate::domain::document::UploadedDocument;
use crate::domain::storage::{DocumentStorage, StorageError};

pub struct MultipartObjectStorage {
    client: Client,
    upload_url: String,
    upload_preset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl MultipartObjectStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            upload_preset: config.upload_preset.clone(),
        })
    }
}

/// MIME type from the file extension, for pickers that do not report one.
fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(name).first_or_octet_stream().to_string()
}

#[async_trait]
impl DocumentStorage for MultipartObjectStorage {
    async fn upload(&self, document: &UploadedDocument) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(&document.uri)
            .await
            .map_err(|e| StorageError::Unreadable {
                path: document.uri.clone(),
                reason: e.to_string(),
            })?;

        let mime_type = document
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_mime_type(&document.name));
        let part = Part::bytes(bytes)
            .file_name(document.name.clone())
            .mime_str(&mime_type)?;

        let mut form = Form::new().part("file", part);
        if let Some(preset) = &self.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let body: UploadResponse = response.json().await?;
                tracing::debug!(name = %document.name, url = %body.secure_url, "Document stored");
                Ok(body.secure_url)
            }
            status => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(StorageError::Rejected {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("photo.JPG"), "image/jpeg");
        assert_eq!(guess_mime_type("marksheet.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("selfie.webp"), "image/webp");
        assert_eq!(guess_mime_type("scan.tiff"), "image/tiff");
        assert_eq!(guess_mime_type("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported() {
        let storage = MultipartObjectStorage::new(&StorageConfig::default()).unwrap();
        let document = UploadedDocument::local("/nonexistent/sewa/photo.jpg", None);

        let err = storage.upload(&document).await.unwrap_err();
        assert!(matches!(err, StorageError::Unreadable { .. }));
    }
}
