//! Server-described multi-section forms.
//!
//! The crate holds everything a renderer needs to walk a user through a form
//! section by section without owning any of the logic itself:
//!
//! - `field`      : `Field`, `FieldKind`, `FieldValue` (the per-input schema)
//! - `schema`     : `Section`, `FormSchema` and the configuration checks
//! - `validation` : pure per-field / per-section validation
//! - `state`      : `FormState` (values, committed errors, active section)
//! - `navigation` : the Next / Previous / Submit state machine as reducer functions
//! - `progress`   : "Section n of N" bookkeeping
//! - `session`    : login draft validation and the session-scoped identity
//! - `service`    : contract for the remote form service plus HTTP and file backends
//!
//! Nothing in here performs terminal I/O; the only suspension points are the
//! two calls on `FormService`.

pub mod error;
pub mod field;
pub mod navigation;
pub mod progress;
pub mod schema;
pub mod service;
pub mod session;
pub mod state;
pub mod validation;

pub use error::{IdentityError, SchemaError, ServiceError};
pub use field::{Field, FieldKind, FieldOption, FieldValidation, FieldValue};
pub use navigation::{
    Effect, Intent, Outcome, Phase, Submission, apply_edit, apply_next, apply_previous,
    apply_submit, reduce,
};
pub use progress::{Progress, StepStatus};
pub use schema::{FormEnvelope, FormSchema, Section};
pub use service::{FileFormService, FormService, HttpFormService, RegisterOutcome, decode_form};
pub use session::{Identity, LoginDraft, LoginErrors, Session};
pub use state::{FormState, LoadStatus};
pub use validation::{
    ErrorMap, FormValues, REQUIRED_MESSAGE, is_section_valid, validate_field, validate_section,
};
