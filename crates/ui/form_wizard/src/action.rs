use forms::{FormSchema, Identity, RegisterOutcome, Submission};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),

    /// Login inputs were valid; register the identity.
    Login(Identity),
    Registered(RegisterOutcome),
    RegistrationFailed(String),

    FormLoaded(FormSchema),
    FormFailed(String),
    /// Leave the form flow (recovery path, or the user pressed Esc).
    BackToLogin,
    Submitted(Submission),
}
