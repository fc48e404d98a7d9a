//! Validation engine.
//!
//! Pure functions only: a field plus its current value yields at most one
//! message, and a section yields an `ErrorMap` of its failing fields. Rules are
//! checked in a fixed order and the first failing rule wins:
//!
//! 1. optional + empty          -> valid
//! 2. required + empty          -> custom message or `REQUIRED_MESSAGE`
//! 3. text shorter than min     -> "Minimum {n} characters required"
//!    text longer than max      -> "Maximum {n} characters allowed"
//! 4. email not `local@domain.tld`
//! 5. tel not exactly ten digits
//!
//! Lengths count Unicode scalar values, not bytes.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::field::{Field, FieldKind, FieldValue};

/// Failing fields of one validation pass, keyed by field id.
pub type ErrorMap = HashMap<String, String>;

/// Entered values keyed by field id.
pub type FormValues = HashMap<String, FieldValue>;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const TEL_MESSAGE: &str = "Please enter a valid 10-digit phone number";

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

pub fn min_length_message(n: usize) -> String {
    format!("Minimum {n} characters required")
}

pub fn max_length_message(n: usize) -> String {
    format!("Maximum {n} characters allowed")
}

/// Validate one field. `None` means the value is acceptable.
///
/// `_all_values` is the whole form's value map; no rule looks across fields
/// yet, but callers pass it so cross-field rules can be added without
/// changing every call site.
pub fn validate_field(
    field: &Field,
    value: Option<&FieldValue>,
    _all_values: &FormValues,
) -> Option<String> {
    let is_empty = value.map_or(true, FieldValue::is_empty);

    if is_empty {
        if !field.required {
            return None;
        }
        return Some(
            field
                .custom_required_message()
                .unwrap_or(REQUIRED_MESSAGE)
                .to_string(),
        );
    }

    let text = value?.as_text()?;

    let len = text.chars().count();
    if let Some(min) = field.min_length {
        if len < min {
            return Some(min_length_message(min));
        }
    }
    if let Some(max) = field.max_length {
        if len > max {
            return Some(max_length_message(max));
        }
    }

    match field.kind {
        FieldKind::Email if !EMAIL_PATTERN.is_match(text) => Some(EMAIL_MESSAGE.to_string()),
        FieldKind::Tel if !is_ten_digits(text) => Some(TEL_MESSAGE.to_string()),
        _ => None,
    }
}

fn is_ten_digits(text: &str) -> bool {
    text.len() == 10 && text.bytes().all(|b| b.is_ascii_digit())
}

/// Validate every field of a section against `values`; only failures are kept.
pub fn validate_section(fields: &[Field], values: &FormValues) -> ErrorMap {
    fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.field_id), values)
                .map(|msg| (field.field_id.clone(), msg))
        })
        .collect()
}

/// The gate: a section may be left forward only with an empty error map.
pub fn is_section_valid(errors: &ErrorMap) -> bool {
    errors.is_empty()
}
