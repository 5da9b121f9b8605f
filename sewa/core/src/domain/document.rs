// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Supporting Documents
//!
//! A picked document is either a fresh local file that still has to be
//! uploaded, or a reference to a URL already hosted on the applicant's
//! profile. The distinction decides whether the upload coordinator touches
//! object storage at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// URL placeholder sent for a document whose upload failed, accepted by the
/// slot-booking endpoint.
pub const PENDING_UPLOAD_RETRY: &str = "pending_upload_retry";

/// Where a picked document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Picked from the device, pending upload
    Local,
    /// Reused from the profile's saved documents
    Saved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub provenance: Provenance,
}

impl UploadedDocument {
    pub fn local(path: impl Into<PathBuf>, mime_type: Option<String>) -> Self {
        let path: PathBuf = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Self {
            uri: path.to_string_lossy().into_owned(),
            name,
            mime_type,
            provenance: Provenance::Local,
        }
    }

    pub fn saved(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: url.into(),
            name: name.into(),
            mime_type: None,
            provenance: Provenance::Saved,
        }
    }

    /// Already reachable over HTTP(S); must not be uploaded again.
    pub fn is_hosted(&self) -> bool {
        if self.provenance == Provenance::Saved {
            return true;
        }
        let uri = self.uri.trim_start();
        starts_with_ignore_case(uri, "http://") || starts_with_ignore_case(uri, "https://")
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Picked documents keyed by required-document name. Last pick wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSelection(BTreeMap<String, UploadedDocument>);

impl DocumentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pick, returning the document it replaced.
    pub fn pick(&mut self, doc_name: impl Into<String>, document: UploadedDocument) -> Option<UploadedDocument> {
        self.0.insert(doc_name.into(), document)
    }

    pub fn remove(&mut self, doc_name: &str) -> Option<UploadedDocument> {
        self.0.remove(doc_name)
    }

    pub fn get(&self, doc_name: &str) -> Option<&UploadedDocument> {
        self.0.get(doc_name)
    }

    pub fn contains(&self, doc_name: &str) -> bool {
        self.0.contains_key(doc_name)
    }

    /// Required names with no pick of any provenance, in required order.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of the `uploadedDocuments` payload array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDocument {
    pub doc_name: String,
    pub url: String,
}

impl ResolvedDocument {
    pub fn new(doc_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            doc_name: doc_name.into(),
            url: url.into(),
        }
    }
}

/// A local document that could not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub doc_name: String,
    pub reason: String,
}

/// Outcome of resolving every picked document to a hosted URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentResolution {
    /// Hosted documents, in required-document order
    pub resolved: Vec<ResolvedDocument>,
    /// Failed uploads, in required-document order
    pub failed: Vec<FailedUpload>,
}

impl DocumentResolution {
    /// Documents for the live submission: failed uploads are omitted.
    pub fn for_live_submission(&self) -> Vec<ResolvedDocument> {
        self.resolved.clone()
    }

    /// Documents for the slot-booking submission: failed uploads are
    /// carried with the retry placeholder.
    pub fn for_slot_submission(&self, required: &[String]) -> Vec<ResolvedDocument> {
        required
            .iter()
            .filter_map(|name| {
                if let Some(doc) = self.resolved.iter().find(|d| &d.doc_name == name) {
                    Some(doc.clone())
                } else if self.failed.iter().any(|f| &f.doc_name == name) {
                    Some(ResolvedDocument::new(name.clone(), PENDING_UPLOAD_RETRY))
                } else {
                    None
                }
            })
            .collect()
    }
}
