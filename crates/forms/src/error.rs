use thiserror::Error;

/// Malformed form description. These are configuration errors: the form is
/// rejected as a whole instead of rendering broken controls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("form has no sections")]
    NoSections,

    #[error("section {index} ({title:?}) has no fields")]
    EmptySection { index: usize, title: String },

    #[error("field id {field_id:?} is used more than once")]
    DuplicateFieldId { field_id: String },

    #[error("choice field {field_id:?} has no options")]
    MissingOptions { field_id: String },
}

/// Errors from the remote form service (or its offline stand-in).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// No form exists for the given identity.
    #[error("no form found for {0:?}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    /// The decoded form failed the configuration checks.
    #[error("invalid form schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// The form flow was entered without an authenticated identity.
///
/// Hosts route back to the entry point on this error; it is never shown to
/// the user as a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("no identity in session")]
    Missing,

    #[error("stored identity is unreadable: {0}")]
    Corrupt(String),
}
