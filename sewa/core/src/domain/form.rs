// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Form Schema and Answers
//!
//! Field definitions arrive from three different backend shapes (linked form
//! templates, service `requiredFields`, legacy job `formSchema`). They are
//! normalised here into [`FormSection`]s of [`FormField`]s with a tagged
//! [`FieldType`], so a front end dispatches on the enum once per field
//! instead of on raw type strings.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Schema value objects and the answer map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input widget a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    /// Numeric keyboard hint only; no numeric validation
    Number,
    /// `dropdown` or `select`
    Choice,
}

/// Keyboard a text-entry widget should request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardHint {
    Default,
    Numeric,
}

impl FieldType {
    /// Parse a backend type string. Unknown types render as text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "number" => FieldType::Number,
            "dropdown" | "select" => FieldType::Choice,
            _ => FieldType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Choice => "dropdown",
        }
    }

    pub fn keyboard_hint(&self) -> KeyboardHint {
        match self {
            FieldType::Number => KeyboardHint::Numeric,
            _ => KeyboardHint::Default,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Choice)
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        FieldType::parse(&raw)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// One enumerated choice of a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Options are sent either as `{label, value}` objects or bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Bare(String),
    Labelled {
        label: String,
        #[serde(default)]
        value: Option<serde_json::Value>,
    },
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Bare(s) => FieldOption::new(s.clone(), s),
            RawOption::Labelled { label, value } => {
                let value = match value {
                    Some(serde_json::Value::String(s)) => s,
                    Some(serde_json::Value::Null) | None => label.clone(),
                    Some(other) => other.to_string(),
                };
                FieldOption { label, value }
            }
        }
    }
}

/// A single form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default, alias = "required")]
    pub is_required: bool,

    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl FormField {
    pub fn new(label: impl Into<String>, field_type: FieldType, is_required: bool) -> Self {
        Self {
            label: label.into(),
            field_type,
            is_required,
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }
}

/// Titled group of fields. Legacy job schemas have no heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormSection {
    pub fn new(heading: Option<String>, fields: Vec<FormField>) -> Self {
        Self { heading, fields }
    }

    /// Built-in section used by the service wizard when a target declares
    /// no fields at all.
    pub fn default_applicant_details() -> Self {
        Self::new(
            Some("Applicant Details".to_string()),
            vec![
                FormField::new("Full Name", FieldType::Text, true),
                FormField::new("Father Name", FieldType::Text, true),
                FormField::new("Date of Birth", FieldType::Text, true),
            ],
        )
    }
}

/// Linked form template as served by `GET /forms/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTemplate {
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

/// Where a resolved schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    LinkedTemplate,
    RequiredFields,
    LegacyFormSchema,
    Default,
    /// Nothing to render; the Form step is skipped
    Empty,
}

/// Ordered sections the Form step renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    pub source: SchemaSource,
    pub sections: Vec<FormSection>,
}

impl ResolvedSchema {
    pub fn new(source: SchemaSource, sections: Vec<FormSection>) -> Self {
        Self { source, sections }
    }

    pub fn empty() -> Self {
        Self::new(SchemaSource::Empty, Vec::new())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// True when there is no field to render.
    pub fn has_no_fields(&self) -> bool {
        self.fields().next().is_none()
    }

    /// First required field, in render order, without a non-blank answer.
    pub fn first_missing<'a>(&'a self, answers: &FormAnswers) -> Option<&'a FormField> {
        self.fields()
            .find(|field| field.is_required && !answers.is_answered(&field.label))
    }
}

/// Answers keyed by field label (case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormAnswers(BTreeMap<String, String>);

impl FormAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, returning the previous value for that label.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(label.into(), value.into())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    /// Answer whose label equals `key` after trimming, ignoring ASCII case.
    pub fn lookup_loose(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.0
            .iter()
            .find(|(label, _)| label.trim().eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_answered(&self, label: &str) -> bool {
        self.get(label).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormAnswers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
