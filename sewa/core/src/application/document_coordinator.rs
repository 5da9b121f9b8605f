// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Document Upload Coordinator
//!
//! Turns the applicant's picks into hosted URLs right before submission.
//! Saved and already-hosted documents pass through untouched; local files
//! are uploaded concurrently. A failed upload is recorded and left out of
//! the live payload; it is never retried here.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::document::{DocumentResolution, DocumentSelection, FailedUpload, ResolvedDocument};
use crate::domain::storage::DocumentStorage;

pub struct DocumentUploadCoordinator {
    storage: Arc<dyn DocumentStorage>,
}

enum Outcome {
    Resolved(ResolvedDocument),
    Failed(FailedUpload),
}

impl DocumentUploadCoordinator {
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self { storage }
    }

    /// Resolve every required document that has a pick.
    ///
    /// Results keep the order of `required`, whatever order the uploads
    /// finish in.
    pub async fn resolve(&self, required: &[String], selection: &DocumentSelection) -> DocumentResolution {
        let uploads = required
            .iter()
            .filter_map(|name| selection.get(name).map(|doc| (name, doc)))
            .map(|(name, doc)| async move {
                if doc.is_hosted() {
                    debug!(doc_name = %name, "Reusing hosted document");
                    return Outcome::Resolved(ResolvedDocument::new(name.clone(), doc.uri.clone()));
                }

                match self.storage.upload(doc).await {
                    Ok(url) => {
                        metrics::counter!("sewa_document_uploads_total", "outcome" => "uploaded").increment(1);
                        debug!(doc_name = %name, url = %url, "Document uploaded");
                        Outcome::Resolved(ResolvedDocument::new(name.clone(), url))
                    }
                    Err(e) => {
                        metrics::counter!("sewa_document_uploads_total", "outcome" => "failed").increment(1);
                        warn!(doc_name = %name, error = %e, "Document upload failed; omitting from submission");
                        Outcome::Failed(FailedUpload {
                            doc_name: name.clone(),
                            reason: e.to_string(),
                        })
                    }
                }
            });

        let mut resolution = DocumentResolution::default();
        for outcome in join_all(uploads).await {
            match outcome {
                Outcome::Resolved(doc) => resolution.resolved.push(doc),
                Outcome::Failed(failure) => resolution.failed.push(failure),
            }
        }

        info!(
            resolved = resolution.resolved.len(),
            failed = resolution.failed.len(),
            "Documents resolved"
        );
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::UploadedDocument;
    use crate::domain::storage::StorageError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    // Mock storage that fails for any path containing "broken"
    struct MockStorage {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentStorage for MockStorage {
        async fn upload(&self, document: &UploadedDocument) -> Result<String, StorageError> {
            self.uploads.lock().push(document.uri.clone());
            if document.uri.contains("broken") {
                return Err(StorageError::Timeout);
            }
            Ok(format!("https://cdn.example/{}", document.name))
        }
    }

    fn required(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_hosted_documents_are_not_uploaded() {
        let storage = Arc::new(MockStorage { uploads: Mutex::new(Vec::new()) });
        let coordinator = DocumentUploadCoordinator::new(storage.clone());

        let mut selection = DocumentSelection::new();
        selection.pick("Photo", UploadedDocument::saved("https://profile.example/photo.jpg", "photo.jpg"));
        selection.pick("Id", UploadedDocument::local("https://cdn.example/id.pdf", None));

        let resolution = coordinator.resolve(&required(&["Photo", "Id"]), &selection).await;

        assert!(storage.uploads.lock().is_empty());
        assert_eq!(
            resolution.resolved,
            vec![
                ResolvedDocument::new("Photo", "https://profile.example/photo.jpg"),
                ResolvedDocument::new("Id", "https://cdn.example/id.pdf"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_upload_is_omitted_not_fatal() {
        let storage = Arc::new(MockStorage { uploads: Mutex::new(Vec::new()) });
        let coordinator = DocumentUploadCoordinator::new(storage.clone());

        let mut selection = DocumentSelection::new();
        selection.pick("Photo", UploadedDocument::local("/tmp/photo.jpg", None));
        selection.pick("Marksheet", UploadedDocument::local("/tmp/broken.pdf", None));

        let resolution = coordinator
            .resolve(&required(&["Photo", "Marksheet", "Unpicked"]), &selection)
            .await;

        assert_eq!(storage.uploads.lock().len(), 2);
        assert_eq!(resolution.resolved, vec![ResolvedDocument::new("Photo", "https://cdn.example/photo.jpg")]);
        assert_eq!(resolution.failed.len(), 1);
        assert_eq!(resolution.failed[0].doc_name, "Marksheet");
    }
}
