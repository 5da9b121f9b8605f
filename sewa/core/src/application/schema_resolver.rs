// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Schema Resolver
//!
//! Picks the form structure for a target from the first source that has
//! something to offer, without merging sources:
//!
//! 1. linked form template (`linkedFormId`, fetched from the backend)
//! 2. service `requiredFields`, as one "Basic Details" section
//! 3. legacy job `formSchema`, as one untitled section
//! 4. the built-in "Applicant Details" section (service wizard only)
//!
//! A failed template fetch resolves to an empty schema so the applicant is
//! never blocked on the Form step.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::form::{FieldType, FormField, FormSection, ResolvedSchema, SchemaSource};
use crate::domain::gateway::ApplicationGateway;
use crate::domain::target::{ApplicationTarget, RequiredField, WizardVariant};

pub const BASIC_DETAILS_HEADING: &str = "Basic Details";

pub struct SchemaResolver {
    gateway: Arc<dyn ApplicationGateway>,
}

impl SchemaResolver {
    pub fn new(gateway: Arc<dyn ApplicationGateway>) -> Self {
        Self { gateway }
    }

    pub async fn resolve(&self, target: &ApplicationTarget, variant: WizardVariant) -> ResolvedSchema {
        if let Some(form_id) = target.linked_form() {
            return match self.gateway.fetch_form_template(form_id).await {
                Ok(template) => {
                    debug!(
                        target_id = %target.id,
                        form_id = form_id,
                        sections = template.sections.len(),
                        "Resolved schema from linked form template"
                    );
                    ResolvedSchema::new(SchemaSource::LinkedTemplate, template.sections)
                }
                Err(e) => {
                    warn!(
                        target_id = %target.id,
                        form_id = form_id,
                        error = %e,
                        "Failed to fetch linked form template; continuing without extra fields"
                    );
                    ResolvedSchema::empty()
                }
            };
        }

        resolve_local(target, variant)
    }
}

/// Resolution for targets without a linked template.
pub fn resolve_local(target: &ApplicationTarget, variant: WizardVariant) -> ResolvedSchema {
    if !target.required_fields.is_empty() {
        let fields = target.required_fields.iter().map(to_form_field).collect();
        return ResolvedSchema::new(
            SchemaSource::RequiredFields,
            vec![FormSection::new(Some(BASIC_DETAILS_HEADING.to_string()), fields)],
        );
    }

    if !target.form_schema.is_empty() {
        return ResolvedSchema::new(
            SchemaSource::LegacyFormSchema,
            vec![FormSection::new(None, target.form_schema.clone())],
        );
    }

    if variant.uses_default_section() {
        return ResolvedSchema::new(
            SchemaSource::Default,
            vec![FormSection::default_applicant_details()],
        );
    }

    ResolvedSchema::empty()
}

fn to_form_field(field: &RequiredField) -> FormField {
    FormField::new(
        field.label.clone(),
        FieldType::parse(&field.field_type),
        field.required,
    )
    .with_options(field.options.clone())
}
