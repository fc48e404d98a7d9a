//! Login draft validation and the session-scoped identity store.
//!
//! The form flow is only entered with an identity in the session. The login
//! page validates a `LoginDraft`, registers the identity with the form
//! service and stores it; the form page reads it once on entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IdentityError;

/// Session key the identity is stored under.
pub const IDENTITY_KEY: &str = "userData";

/// The authenticated user the form is fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub roll_number: String,
    pub name: String,
}

/// Per-field login errors keyed `rollNumber` / `name`.
pub type LoginErrors = HashMap<&'static str, &'static str>;

/// Login inputs as typed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginDraft {
    pub roll_number: String,
    pub name: String,
    errors: LoginErrors,
}

impl LoginDraft {
    pub fn new(roll_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_number: roll_number.into(),
            name: name.into(),
            errors: LoginErrors::new(),
        }
    }

    pub fn set_roll_number(&mut self, value: impl Into<String>) {
        self.roll_number = value.into();
        self.errors.remove("rollNumber");
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.name = value.into();
        self.errors.remove("name");
    }

    pub fn errors(&self) -> &LoginErrors {
        &self.errors
    }

    pub fn error_for(&self, key: &str) -> Option<&'static str> {
        self.errors.get(key).copied()
    }

    /// Check both inputs; on success the trimmed identity is returned.
    pub fn validate(&mut self) -> Result<Identity, LoginErrors> {
        let mut errors = LoginErrors::new();
        if self.roll_number.trim().is_empty() {
            errors.insert("rollNumber", "Roll number is required");
        }
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        self.errors = errors.clone();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Identity {
            roll_number: self.roll_number.trim().to_string(),
            name: self.name.trim().to_string(),
        })
    }
}

/// Session-scoped key-value storage (lives as long as the process).
#[derive(Debug, Clone, Default)]
pub struct Session {
    entries: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn store_identity(&mut self, identity: &Identity) -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(identity)?;
        self.set(IDENTITY_KEY, json);
        Ok(())
    }

    pub fn clear_identity(&mut self) {
        self.remove(IDENTITY_KEY);
    }

    /// Identity for entering the form flow.
    pub fn require_identity(&self) -> Result<Identity, IdentityError> {
        let raw = self.get(IDENTITY_KEY).ok_or(IdentityError::Missing)?;
        serde_json::from_str(raw).map_err(|e| {
            warn!("stored identity is unreadable: {e}");
            IdentityError::Corrupt(e.to_string())
        })
    }

    pub fn identity(&self) -> Option<Identity> {
        self.require_identity().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_both_inputs() {
        let mut draft = LoginDraft::new("  ", "");
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get("rollNumber"), Some(&"Roll number is required"));
        assert_eq!(errors.get("name"), Some(&"Name is required"));
        assert_eq!(draft.error_for("name"), Some("Name is required"));
    }

    #[test]
    fn editing_clears_that_inputs_error() {
        let mut draft = LoginDraft::default();
        let _ = draft.validate();
        draft.set_name("Ada");
        assert_eq!(draft.error_for("name"), None);
        assert!(draft.error_for("rollNumber").is_some());
    }

    #[test]
    fn valid_draft_yields_trimmed_identity() {
        let mut draft = LoginDraft::new(" RA2211003 ", "Ada Lovelace ");
        let identity = draft.validate().unwrap();
        assert_eq!(identity.roll_number, "RA2211003");
        assert_eq!(identity.name, "Ada Lovelace");
        assert!(draft.errors().is_empty());
    }

    #[test]
    fn session_round_trips_identity() {
        let mut session = Session::new();
        assert_eq!(session.require_identity(), Err(IdentityError::Missing));

        let identity = Identity {
            roll_number: "42".into(),
            name: "Ada".into(),
        };
        session.store_identity(&identity).unwrap();
        assert!(session.get(IDENTITY_KEY).unwrap().contains("rollNumber"));
        assert_eq!(session.identity(), Some(identity));

        session.clear_identity();
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn corrupt_identity_is_reported() {
        let mut session = Session::new();
        session.set(IDENTITY_KEY, "{not json");
        assert!(matches!(
            session.require_identity(),
            Err(IdentityError::Corrupt(_))
        ));
    }
}
