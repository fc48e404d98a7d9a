//! Form runtime state.
//!
//! `FormState` is the single owner of everything that changes while a form is
//! filled in:
//!   * the loaded sections and the active section index
//!   * entered values, keyed form-wide by field id
//!   * the committed error snapshot from the last Next / Submit attempt
//!   * the load status of the remote schema fetch
//!
//! Two error views exist side by side. `computed_errors()` re-validates the
//! active section on every call and feeds the live gate (`can_proceed`).
//! `committed_errors()` only changes on an explicit transition attempt (see
//! `navigation.rs`) or when an edit clears a field's entry, so messages never
//! show up while the user is still typing.
//!
//! Values are never removed. Navigating back and forth keeps earlier answers.

use tracing::debug;

use crate::error::SchemaError;
use crate::field::{Field, FieldValue};
use crate::navigation::Phase;
use crate::progress::Progress;
use crate::schema::{FormSchema, Section};
use crate::validation::{ErrorMap, FormValues, is_section_valid, validate_section};

/// Status of the external schema fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    title: String,
    form_id: Option<String>,
    sections: Vec<Section>,
    current: usize,
    values: FormValues,
    errors: ErrorMap,
    status: LoadStatus,
    pub(crate) phase: Phase,
}

impl FormState {
    /// State before the schema has arrived.
    pub fn loading() -> Self {
        Self::default()
    }

    /// Convenience: a ready state for an already available schema.
    pub fn from_schema(schema: FormSchema) -> Result<Self, SchemaError> {
        let mut state = Self::loading();
        state.initialize_form(schema)?;
        Ok(state)
    }

    /// Replace the form, reset navigation, values and errors.
    ///
    /// The schema is checked first; on a configuration error the state is
    /// left untouched.
    pub fn initialize_form(&mut self, schema: FormSchema) -> Result<(), SchemaError> {
        schema.check()?;
        debug!(
            title = %schema.title,
            sections = schema.sections.len(),
            fields = schema.field_count(),
            "form initialized"
        );
        self.title = schema.title;
        self.form_id = schema.form_id;
        self.sections = schema.sections;
        self.current = 0;
        self.values.clear();
        self.errors.clear();
        self.status = LoadStatus::Ready;
        self.phase = Phase::Editing;
        self.materialize_defaults();
        Ok(())
    }

    /// Record a failed schema fetch.
    pub fn fail_loading(&mut self, message: impl Into<String>) {
        self.status = LoadStatus::Failed(message.into());
    }

    /// Merge a value and drop any committed error for that field.
    /// No validation happens here.
    pub fn set_field_value(&mut self, field_id: &str, value: impl Into<FieldValue>) {
        self.values.insert(field_id.to_string(), value.into());
        self.errors.remove(field_id);
    }

    /// Give every field of the active section its start value, unless it
    /// already has one.
    pub fn materialize_defaults(&mut self) {
        let Some(section) = self.sections.get(self.current) else {
            return;
        };
        for field in &section.fields {
            self.values
                .entry(field.field_id.clone())
                .or_insert_with(|| FieldValue::default_for(&field.kind));
        }
    }

    /// Stored value, or the kind's start value if none was entered yet.
    pub fn display_value(&self, field: &Field) -> FieldValue {
        self.values
            .get(&field.field_id)
            .cloned()
            .unwrap_or_else(|| FieldValue::default_for(&field.kind))
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    // --- Read model ----------------------------------------------------------------------------

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.sections.get(self.current)
    }

    pub fn is_first_section(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_section(&self) -> bool {
        self.current + 1 >= self.sections.len()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Snapshot taken at the last Next / Submit attempt.
    pub fn committed_errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    /// Live validation of the active section; always current.
    pub fn computed_errors(&self) -> ErrorMap {
        self.current_section()
            .map(|section| validate_section(&section.fields, &self.values))
            .unwrap_or_default()
    }

    /// The gate for Next / Submit, recomputed from the current values.
    pub fn can_proceed(&self) -> bool {
        self.status == LoadStatus::Ready && is_section_valid(&self.computed_errors())
    }

    pub fn progress(&self) -> Progress {
        Progress::new(self.current, self.sections.len())
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // --- Crate-internal mutation used by the navigation reducer ---------------------------------

    pub(crate) fn commit_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        let last = self.sections.len().saturating_sub(1);
        self.current = index.min(last);
        self.materialize_defaults();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use crate::validation::REQUIRED_MESSAGE;

    fn schema() -> FormSchema {
        FormSchema::new(
            "Profile",
            vec![
                Section::new(
                    "About",
                    vec![
                        Field::new("name", "Name", FieldKind::Text).required(),
                        Field::new("newsletter", "Newsletter", FieldKind::Checkbox),
                    ],
                ),
                Section::new(
                    "Contact",
                    vec![Field::new("phone", "Phone", FieldKind::Tel)],
                ),
            ],
        )
    }

    #[test]
    fn starts_loading() {
        let state = FormState::loading();
        assert_eq!(state.status(), &LoadStatus::Loading);
        assert!(!state.can_proceed());
        assert!(state.current_section().is_none());
        assert!(state.computed_errors().is_empty());
    }

    #[test]
    fn initialize_resets_everything() {
        let mut state = FormState::from_schema(schema()).unwrap();
        state.set_field_value("name", "Ada");
        state.commit_errors([("phone".to_string(), "x".to_string())].into());
        state.set_current(1);

        state.initialize_form(schema()).unwrap();
        assert_eq!(state.current_index(), 0);
        assert!(state.committed_errors().is_empty());
        assert_eq!(state.value("name"), Some(&FieldValue::from("")));
        assert_eq!(state.value("phone"), None);
        assert_eq!(state.status(), &LoadStatus::Ready);
    }

    #[test]
    fn initialize_rejects_bad_schema_without_touching_state() {
        let mut state = FormState::from_schema(schema()).unwrap();
        state.set_field_value("name", "Ada");
        let err = state
            .initialize_form(FormSchema::new("Empty", vec![]))
            .unwrap_err();
        assert_eq!(err, SchemaError::NoSections);
        assert_eq!(state.title(), "Profile");
        assert_eq!(state.value("name"), Some(&FieldValue::from("Ada")));
    }

    #[test]
    fn defaults_appear_for_active_section_only() {
        let state = FormState::from_schema(schema()).unwrap();
        assert_eq!(state.value("name"), Some(&FieldValue::from("")));
        assert_eq!(state.value("newsletter"), Some(&FieldValue::Flag(false)));
        assert_eq!(state.value("phone"), None);

        let phone = &state.sections()[1].fields[0];
        assert_eq!(state.display_value(phone), FieldValue::from(""));
    }

    #[test]
    fn defaults_never_overwrite() {
        let mut state = FormState::from_schema(schema()).unwrap();
        state.set_field_value("newsletter", true);
        state.materialize_defaults();
        assert_eq!(state.value("newsletter"), Some(&FieldValue::Flag(true)));
    }

    #[test]
    fn edit_clears_only_its_own_error() {
        let mut state = FormState::from_schema(schema()).unwrap();
        state.commit_errors(
            [
                ("name".to_string(), REQUIRED_MESSAGE.to_string()),
                ("phone".to_string(), "bad".to_string()),
            ]
            .into(),
        );
        state.set_field_value("name", "A");
        assert_eq!(state.error_for("name"), None);
        assert_eq!(state.error_for("phone"), Some("bad"));
    }

    #[test]
    fn live_gate_follows_values_without_committing() {
        let mut state = FormState::from_schema(schema()).unwrap();
        assert!(!state.can_proceed());
        assert_eq!(state.computed_errors().len(), 1);
        assert!(state.committed_errors().is_empty());

        state.set_field_value("name", "Ada");
        assert!(state.can_proceed());
    }

    #[test]
    fn index_is_clamped() {
        let mut state = FormState::from_schema(schema()).unwrap();
        state.set_current(9);
        assert_eq!(state.current_index(), 1);
        assert!(state.is_last_section());
        assert_eq!(state.progress().label(), "Section 2 of 2");
    }

    #[test]
    fn failed_load_is_recorded() {
        let mut state = FormState::loading();
        state.fail_loading("Failed to load the form. Please try again.");
        assert!(matches!(state.status(), LoadStatus::Failed(m) if m.contains("Failed")));
    }
}
