// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Document Storage Trait - Anti-Corruption Layer for object storage
//!
//! Isolates the wizard from the concrete hosting service that receives
//! document uploads. The only contract is "give me a local document, get
//! back a publicly reachable secure URL".

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::document::UploadedDocument;

/// Object storage for applicant documents
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Upload a local document
    ///
    /// # Arguments
    /// * `document` - A document with [`Provenance::Local`](crate::domain::document::Provenance::Local)
    ///
    /// # Returns
    /// * `Ok(String)` - Secure URL of the hosted copy
    /// * `Err(StorageError)` if the upload failed
    async fn upload(&self, document: &UploadedDocument) -> Result<String, StorageError>;
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot read document {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout while uploading document")]
    Timeout,

    #[error("Upload rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown storage error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::Timeout
        } else if err.is_connect() {
            StorageError::Network(err.to_string())
        } else if err.is_decode() {
            StorageError::Serialization(err.to_string())
        } else {
            StorageError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
