//! Field model: one input descriptor and the value it holds.
//!
//! - `FieldKind`  : closed set of input kinds, plus a terminal `Unsupported` case
//! - `Field`      : kind + constraints + display text for one input
//! - `FieldValue` : what the user entered (text, a set of strings, or a flag)
//!
//! Fields arrive as camelCase JSON from the form service. Decoding goes through
//! `RawField` so that choice fields without options are rejected up front and
//! unknown `type` strings survive as `FieldKind::Unsupported` instead of
//! failing the whole form.
//!
//! See also:
//! - `schema.rs`     : groups fields into sections and a `FormSchema`
//! - `validation.rs` : rules evaluated against a `FieldValue`
//! - `state.rs`      : values keyed by `Field::field_id`

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One selectable entry of a dropdown or radio group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_test_id: Option<String>,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            data_test_id: None,
        }
    }
}

/// Input kind of a field.
///
/// Notes:
/// - Text / Tel / Email / Date / Textarea hold a `FieldValue::Text`
/// - Dropdown / Radio hold the `value` of the chosen option as text
/// - Checkbox holds a `FieldValue::Flag`
/// - Unsupported keeps the wire name so renderers can show a visible marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Tel,
    Email,
    Date,
    Textarea,
    Dropdown { options: Vec<FieldOption> },
    Radio { options: Vec<FieldOption> },
    Checkbox,
    Unsupported { type_name: String },
}

impl FieldKind {
    /// Build a kind from its wire name. `options` are kept for choice kinds
    /// and dropped for everything else.
    pub fn from_wire(
        field_id: &str,
        type_name: &str,
        options: Option<Vec<FieldOption>>,
    ) -> Result<Self, SchemaError> {
        let choice_options = |options: Option<Vec<FieldOption>>| match options {
            Some(options) if !options.is_empty() => Ok(options),
            _ => Err(SchemaError::MissingOptions {
                field_id: field_id.to_string(),
            }),
        };

        Ok(match type_name {
            "text" => FieldKind::Text,
            "tel" => FieldKind::Tel,
            "email" => FieldKind::Email,
            "date" => FieldKind::Date,
            "textarea" => FieldKind::Textarea,
            "dropdown" => FieldKind::Dropdown {
                options: choice_options(options)?,
            },
            "radio" => FieldKind::Radio {
                options: choice_options(options)?,
            },
            "checkbox" => FieldKind::Checkbox,
            other => FieldKind::Unsupported {
                type_name: other.to_string(),
            },
        })
    }

    /// Wire name of the kind (`"text"`, `"dropdown"`, ...).
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Tel => "tel",
            FieldKind::Email => "email",
            FieldKind::Date => "date",
            FieldKind::Textarea => "textarea",
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Unsupported { type_name } => type_name,
        }
    }

    /// True for kinds edited through a free-text editor.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Tel
                | FieldKind::Email
                | FieldKind::Date
                | FieldKind::Textarea
        )
    }

    /// True for dropdown and radio fields.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldKind::Dropdown { .. } | FieldKind::Radio { .. })
    }

    /// Options of a choice field; empty for every other kind.
    pub fn options(&self) -> &[FieldOption] {
        match self {
            FieldKind::Dropdown { options } | FieldKind::Radio { options } => options,
            _ => &[],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Optional overrides for validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Replaces the default "required" message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Declarative description of a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub struct Field {
    /// Form-wide unique key for values and errors.
    pub field_id: String,
    pub kind: FieldKind,
    pub label: String,
    pub placeholder: Option<String>,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub validation: Option<FieldValidation>,
    pub data_test_id: Option<String>,
}

impl Field {
    /// Create an optional field without constraints.
    pub fn new(field_id: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field_id: field_id.into(),
            kind,
            label: label.into(),
            placeholder: None,
            required: false,
            min_length: None,
            max_length: None,
            validation: None,
            data_test_id: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n).filter(|n| *n > 0);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n).filter(|n| *n > 0);
        self
    }

    /// Override the message reported when a required value is missing.
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.validation = Some(FieldValidation {
            message: Some(message.into()),
        });
        self
    }

    /// Configured "required" message, if any.
    pub fn custom_required_message(&self) -> Option<&str> {
        self.validation.as_ref()?.message.as_deref()
    }
}

/// Wire shape of a field as sent by the form service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    field_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_test_id: Option<String>,
}

impl TryFrom<RawField> for Field {
    type Error = SchemaError;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let kind = FieldKind::from_wire(&raw.field_id, &raw.kind, raw.options)?;
        Ok(Field {
            field_id: raw.field_id,
            kind,
            label: raw.label,
            placeholder: raw.placeholder,
            required: raw.required,
            // A zero bound means "no bound" on the wire.
            min_length: raw.min_length.filter(|n| *n > 0),
            max_length: raw.max_length.filter(|n| *n > 0),
            validation: raw.validation,
            data_test_id: raw.data_test_id,
        })
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let options = field.kind.is_choice().then(|| field.kind.options().to_vec());
        RawField {
            kind: field.kind.type_name().to_string(),
            field_id: field.field_id,
            label: field.label,
            placeholder: field.placeholder,
            required: field.required,
            min_length: field.min_length,
            max_length: field.max_length,
            validation: field.validation,
            options,
            data_test_id: field.data_test_id,
        }
    }
}

/// Value entered for a field.
///
/// Serialized untagged so a submission is plain JSON (strings, arrays, booleans).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Multi-select; no field kind produces it yet.
    Many(BTreeSet<String>),
    Flag(bool),
}

impl FieldValue {
    /// Value a field starts with the first time it is displayed.
    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Empty text, an empty set and an unchecked flag all count as "no answer".
    /// An unchecked box is empty on purpose, so a required checkbox must end up ticked.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Many(set) => set.is_empty(),
            FieldValue::Flag(checked) => !checked,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_text_field_with_bounds() {
        let field: Field = serde_json::from_value(json!({
            "fieldId": "name",
            "type": "text",
            "label": "Full name",
            "placeholder": "Jane Doe",
            "required": true,
            "minLength": 2,
            "maxLength": 40,
            "validation": { "message": "Name please" },
            "dataTestId": "name-input"
        }))
        .unwrap();

        assert_eq!(field.field_id, "name");
        assert_eq!(field.kind, FieldKind::Text);
        assert!(field.required);
        assert_eq!(field.min_length, Some(2));
        assert_eq!(field.max_length, Some(40));
        assert_eq!(field.custom_required_message(), Some("Name please"));
        assert_eq!(field.data_test_id.as_deref(), Some("name-input"));
    }

    #[test]
    fn dropdown_without_options_is_a_schema_error() {
        let err = serde_json::from_value::<Field>(json!({
            "fieldId": "city",
            "type": "dropdown",
            "label": "City"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("city"), "{err}");
    }

    #[test]
    fn options_on_non_choice_fields_are_dropped() {
        let field: Field = serde_json::from_value(json!({
            "fieldId": "note",
            "type": "textarea",
            "label": "Note",
            "options": [{ "label": "A", "value": "a" }]
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Textarea);
        assert!(field.kind.options().is_empty());
    }

    #[test]
    fn unknown_type_becomes_unsupported() {
        let field: Field = serde_json::from_value(json!({
            "fieldId": "volume",
            "type": "slider",
            "label": "Volume"
        }))
        .unwrap();
        assert_eq!(
            field.kind,
            FieldKind::Unsupported {
                type_name: "slider".into()
            }
        );
        assert_eq!(field.kind.to_string(), "slider");
    }

    #[test]
    fn zero_bounds_mean_unbounded() {
        let field: Field = serde_json::from_value(json!({
            "fieldId": "x",
            "type": "text",
            "label": "X",
            "minLength": 0,
            "maxLength": 0
        }))
        .unwrap();
        assert_eq!(field.min_length, None);
        assert_eq!(field.max_length, None);
    }

    #[test]
    fn radio_keeps_option_order() {
        let field: Field = serde_json::from_value(json!({
            "fieldId": "gender",
            "type": "radio",
            "label": "Gender",
            "options": [
                { "label": "Male", "value": "male" },
                { "label": "Female", "value": "female" },
                { "label": "Other", "value": "other" }
            ]
        }))
        .unwrap();
        let values: Vec<_> = field.kind.options().iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, ["male", "female", "other"]);
    }

    #[test]
    fn encodes_back_to_wire_shape() {
        let field = Field::new(
            "plan",
            "Plan",
            FieldKind::Dropdown {
                options: vec![FieldOption::new("Basic", "basic")],
            },
        )
        .required();
        let v = serde_json::to_value(&field).unwrap();
        assert_eq!(v["fieldId"], "plan");
        assert_eq!(v["type"], "dropdown");
        assert_eq!(v["options"][0]["value"], "basic");
        assert!(v.get("minLength").is_none());
    }

    #[test]
    fn defaults_and_emptiness() {
        assert_eq!(
            FieldValue::default_for(&FieldKind::Checkbox),
            FieldValue::Flag(false)
        );
        assert_eq!(
            FieldValue::default_for(&FieldKind::Email),
            FieldValue::Text(String::new())
        );
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from(" ").is_empty());
        assert!(FieldValue::Flag(false).is_empty());
        assert!(!FieldValue::Flag(true).is_empty());
        assert!(FieldValue::Many(BTreeSet::new()).is_empty());
    }

    #[test]
    fn values_serialize_untagged() {
        assert_eq!(serde_json::to_value(FieldValue::from("a")).unwrap(), json!("a"));
        assert_eq!(serde_json::to_value(FieldValue::Flag(true)).unwrap(), json!(true));
        let many: BTreeSet<String> = ["x".to_string(), "y".to_string()].into();
        assert_eq!(
            serde_json::to_value(FieldValue::Many(many)).unwrap(),
            json!(["x", "y"])
        );
    }
}
