//! Form schema: ordered sections of fields.
//!
//! Section order is navigation order. `FormSchema::check` enforces the
//! configuration invariants (at least one section, no empty section,
//! form-wide unique field ids) before a schema is handed to `FormState`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::Field;

/// One navigation step: a titled group of fields shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<serde_json::Value>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<Field>,
}

impl Section {
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            section_id: None,
            title: title.into(),
            description: String::new(),
            fields,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

/// Declarative description of a whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    #[serde(rename = "formTitle")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub sections: Vec<Section>,
}

/// Response body of the form service's `get-form` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FormEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub form: FormSchema,
}

impl FormSchema {
    pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            title: title.into(),
            form_id: None,
            version: None,
            sections,
        }
    }

    /// Fail fast on configuration errors.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.sections.is_empty() {
            return Err(SchemaError::NoSections);
        }

        let mut seen = HashSet::new();
        for (index, section) in self.sections.iter().enumerate() {
            if section.fields.is_empty() {
                return Err(SchemaError::EmptySection {
                    index,
                    title: section.title.clone(),
                });
            }
            for field in &section.fields {
                if !seen.insert(field.field_id.as_str()) {
                    return Err(SchemaError::DuplicateFieldId {
                        field_id: field.field_id.clone(),
                    });
                }
                // Decoded fields are already checked; built ones may not be.
                if field.kind.is_choice() && field.kind.options().is_empty() {
                    return Err(SchemaError::MissingOptions {
                        field_id: field.field_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Find a field anywhere in the form by its id.
    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| f.field_id == field_id)
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }
}
