//! Section navigation state machine.
//!
//! One state per section index plus the terminal `Phase::Submitted`, reached
//! only from the last section. Transitions:
//!
//! | intent     | available when        | gate                 | on success          |
//! |------------|-----------------------|----------------------|---------------------|
//! | `Next`     | index < last          | active section valid | index + 1           |
//! | `Previous` | index > 0             | none                 | index - 1           |
//! | `Submit`   | index == last         | active section valid | `Phase::Submitted`  |
//!
//! A gated attempt always commits the section's error map as the new snapshot
//! (replacing the previous one), so a successful attempt commits an empty map
//! and a repeated failed attempt commits the same map again. There is no
//! error state: a failed gate leaves the index where it was.
//!
//! `reduce` is the single entry point used by hosts. It maps an `Intent` onto
//! one of the `apply_*` transition functions and returns the declarative
//! effects the host has to carry out (reset scrolling, deliver a submission).
//! The functions themselves never perform I/O.

use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::field::FieldValue;
use crate::state::{FormState, LoadStatus};
use crate::validation::{FormValues, is_section_valid, validate_section};

/// Coarse lifecycle of a loaded form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Editing,
    Submitted,
}

/// User intents understood by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Edit { field_id: String, value: FieldValue },
    Next,
    Previous,
    Submit,
}

/// Answers collected at submission time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    pub values: FormValues,
}

/// Result of a single transition function.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Edited,
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// Gate failed; `errors` fields of the active section were committed.
    Blocked { errors: usize },
    Submitted(Submission),
    /// Intent not available in the current state; nothing changed.
    Unavailable,
}

/// Declarative instruction for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The active section changed; show it from the top.
    ResetViewport,
    /// Deliver the submission (one-shot).
    Submit(Submission),
    Log(String),
}

fn accepts_intents(state: &FormState) -> bool {
    state.status() == &LoadStatus::Ready && state.phase == Phase::Editing
}

/// Validate the active section and commit the result as the error snapshot.
/// `Err` carries the number of failing fields.
fn commit_gate(state: &mut FormState) -> Result<(), usize> {
    let errors = match state.current_section() {
        Some(section) => validate_section(&section.fields, state.values()),
        None => Default::default(),
    };
    let gate = if is_section_valid(&errors) {
        Ok(())
    } else {
        Err(errors.len())
    };
    state.commit_errors(errors);
    gate
}

/// Apply a user edit: merge the value and clear that field's committed error.
pub fn apply_edit(state: &mut FormState, field_id: &str, value: FieldValue) -> Outcome {
    if !accepts_intents(state) {
        return Outcome::Unavailable;
    }
    state.set_field_value(field_id, value);
    Outcome::Edited
}

pub fn apply_next(state: &mut FormState) -> Outcome {
    if !accepts_intents(state) || state.is_last_section() {
        return Outcome::Unavailable;
    }
    let from = state.current_index();
    match commit_gate(state) {
        Ok(()) => {
            state.set_current(from + 1);
            debug!(from, to = from + 1, "advanced to next section");
            Outcome::Advanced { from, to: from + 1 }
        }
        Err(errors) => Outcome::Blocked { errors },
    }
}

/// Unconditional step back; no validation.
pub fn apply_previous(state: &mut FormState) -> Outcome {
    if !accepts_intents(state) || state.is_first_section() {
        return Outcome::Unavailable;
    }
    let from = state.current_index();
    state.set_current(from - 1);
    debug!(from, to = from - 1, "went back to previous section");
    Outcome::Retreated { from, to: from - 1 }
}

pub fn apply_submit(state: &mut FormState) -> Outcome {
    if !accepts_intents(state) || !state.is_last_section() {
        return Outcome::Unavailable;
    }
    match commit_gate(state) {
        Ok(()) => {
            state.phase = Phase::Submitted;
            let submission = Submission {
                form_id: state.form_id().map(str::to_string),
                values: state.values().clone(),
            };
            info!(fields = submission.values.len(), "form submitted");
            Outcome::Submitted(submission)
        }
        Err(errors) => Outcome::Blocked { errors },
    }
}

/// Reduce one intent into state changes plus effects for the host.
pub fn reduce(state: &mut FormState, intent: Intent) -> Vec<Effect> {
    let outcome = match intent {
        Intent::Edit { field_id, value } => apply_edit(state, &field_id, value),
        Intent::Next => apply_next(state),
        Intent::Previous => apply_previous(state),
        Intent::Submit => apply_submit(state),
    };

    match outcome {
        Outcome::Edited | Outcome::Unavailable => Vec::new(),
        Outcome::Advanced { .. } | Outcome::Retreated { .. } => vec![Effect::ResetViewport],
        Outcome::Blocked { errors } => vec![Effect::Log(format!(
            "section {} has {errors} invalid field(s)",
            state.current_index() + 1
        ))],
        Outcome::Submitted(submission) => vec![Effect::Submit(submission)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldKind};
    use crate::schema::{FormSchema, Section};
    use crate::validation::{EMAIL_MESSAGE, REQUIRED_MESSAGE};
    use pretty_assertions::assert_eq;

    fn three_sections() -> FormState {
        let schema = FormSchema::new(
            "Trip",
            vec![
                Section::new("Who", vec![Field::new("name", "Name", FieldKind::Text).required()]),
                Section::new(
                    "Where",
                    vec![Field::new("city", "City", FieldKind::Text).required().min_length(2)],
                ),
                Section::new(
                    "Contact",
                    vec![Field::new("email", "Email", FieldKind::Email).required()],
                ),
            ],
        );
        FormState::from_schema(schema).unwrap()
    }

    fn edit(state: &mut FormState, id: &str, value: &str) {
        reduce(
            state,
            Intent::Edit {
                field_id: id.into(),
                value: value.into(),
            },
        );
    }

    #[test]
    fn previous_is_noop_on_first_section() {
        let mut state = three_sections();
        assert_eq!(apply_previous(&mut state), Outcome::Unavailable);
        assert_eq!(state.current_index(), 0);
        assert!(reduce(&mut state, Intent::Previous).is_empty());
    }

    #[test]
    fn next_blocks_on_invalid_section_and_commits_errors() {
        let mut state = three_sections();
        assert_eq!(apply_next(&mut state), Outcome::Blocked { errors: 1 });
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.error_for("name"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn failed_next_is_idempotent() {
        let mut state = three_sections();
        reduce(&mut state, Intent::Next);
        let first = state.committed_errors().clone();
        reduce(&mut state, Intent::Next);
        assert_eq!(state.committed_errors(), &first);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn next_advances_when_valid() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        let effects = reduce(&mut state, Intent::Next);
        assert_eq!(effects, vec![Effect::ResetViewport]);
        assert_eq!(state.current_index(), 1);
        assert!(state.committed_errors().is_empty());
    }

    #[test]
    fn next_is_unavailable_on_last_section() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        apply_next(&mut state);
        edit(&mut state, "city", "Rome");
        apply_next(&mut state);
        assert_eq!(state.current_index(), 2);
        assert_eq!(apply_next(&mut state), Outcome::Unavailable);
        // unavailable means no validation pass either
        assert!(state.committed_errors().is_empty());
    }

    #[test]
    fn submit_is_unavailable_before_last_section() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        assert_eq!(apply_submit(&mut state), Outcome::Unavailable);
        assert_eq!(state.phase(), Phase::Editing);
    }

    #[test]
    fn values_survive_back_and_forth() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        reduce(&mut state, Intent::Next);
        edit(&mut state, "city", "Oslo");
        reduce(&mut state, Intent::Previous);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.value("name"), Some(&FieldValue::from("Ada")));
        reduce(&mut state, Intent::Next);
        assert_eq!(state.value("city"), Some(&FieldValue::from("Oslo")));
    }

    #[test]
    fn stale_errors_are_replaced_by_the_next_attempt() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        reduce(&mut state, Intent::Next);
        edit(&mut state, "city", "X");
        reduce(&mut state, Intent::Next);
        assert_eq!(
            state.error_for("city"),
            Some("Minimum 2 characters required")
        );

        // Going back keeps the snapshot; the next attempt replaces it.
        reduce(&mut state, Intent::Previous);
        assert!(state.error_for("city").is_some());
        reduce(&mut state, Intent::Next);
        assert!(state.committed_errors().is_empty());
    }

    #[test]
    fn submit_blocks_then_succeeds_once() {
        let mut state = three_sections();
        edit(&mut state, "name", "Ada");
        reduce(&mut state, Intent::Next);
        edit(&mut state, "city", "Oslo");
        reduce(&mut state, Intent::Next);

        edit(&mut state, "email", "ada");
        let effects = reduce(&mut state, Intent::Submit);
        assert!(matches!(effects.as_slice(), [Effect::Log(_)]));
        assert_eq!(state.error_for("email"), Some(EMAIL_MESSAGE));
        assert_eq!(state.phase(), Phase::Editing);

        edit(&mut state, "email", "ada@example.com");
        assert_eq!(state.error_for("email"), None);
        let effects = reduce(&mut state, Intent::Submit);
        let [Effect::Submit(submission)] = effects.as_slice() else {
            panic!("expected a submission, got {effects:?}");
        };
        assert_eq!(submission.values["email"], FieldValue::from("ada@example.com"));
        assert_eq!(submission.values.len(), 3);
        assert_eq!(state.phase(), Phase::Submitted);

        // terminal
        assert!(reduce(&mut state, Intent::Submit).is_empty());
        assert_eq!(apply_previous(&mut state), Outcome::Unavailable);
        assert_eq!(apply_edit(&mut state, "email", "x".into()), Outcome::Unavailable);
    }

    #[test]
    fn intents_are_ignored_while_loading() {
        let mut state = FormState::loading();
        assert_eq!(apply_next(&mut state), Outcome::Unavailable);
        assert_eq!(apply_submit(&mut state), Outcome::Unavailable);
        assert_eq!(apply_edit(&mut state, "a", "b".into()), Outcome::Unavailable);
    }

    #[test]
    fn submission_serializes_as_plain_json() {
        let submission = Submission {
            form_id: Some("f-1".into()),
            values: [
                ("name".to_string(), FieldValue::from("Ada")),
                ("agree".to_string(), FieldValue::Flag(true)),
            ]
            .into(),
        };
        let v = serde_json::to_value(&submission).unwrap();
        assert_eq!(v["formId"], "f-1");
        assert_eq!(v["values"]["name"], "Ada");
        assert_eq!(v["values"]["agree"], true);
    }
}
