//! Contract for the remote form service and two implementations.
//!
//! - `HttpFormService` talks to the real service:
//!     * `POST {base}/create-user`            body `{"rollNumber", "name"}`
//!     * `GET  {base}/get-form?rollNumber=..` body `{"message", "form": {...}}`
//! - `FileFormService` reads a schema from a local JSON file (offline use,
//!   demos, tests); registration always succeeds.
//!
//! Both calls are single attempts. Retrying is left to the user (the host
//! offers a way back to the login page), and no timeout is applied unless
//! the host configures one.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use strum::Display;
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::schema::{FormEnvelope, FormSchema};
use crate::session::Identity;

/// Result of registering a user. Both variants let the user continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RegisterOutcome {
    Created,
    AlreadyExists,
}

/// The two external calls the form flow depends on.
pub trait FormService: Send + Sync {
    fn register_user(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<RegisterOutcome, ServiceError>> + Send;

    fn fetch_form(
        &self,
        roll_number: &str,
    ) -> impl Future<Output = Result<FormSchema, ServiceError>> + Send;
}

/// Decode a form body: either the service envelope or a bare form object.
/// The decoded schema is checked before it is returned.
pub fn decode_form(body: &str, source: &str) -> Result<FormSchema, ServiceError> {
    let decode_err = |source_err| ServiceError::Decode {
        endpoint: source.to_string(),
        source: source_err,
    };
    let value: serde_json::Value = serde_json::from_str(body).map_err(decode_err)?;
    let schema = if value.get("form").is_some() {
        serde_json::from_value::<FormEnvelope>(value)
            .map_err(decode_err)?
            .form
    } else {
        serde_json::from_value::<FormSchema>(value).map_err(decode_err)?
    };
    schema.check()?;
    Ok(schema)
}

#[derive(Debug, Clone)]
pub struct HttpFormService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFormService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ServiceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ServiceError::InvalidBaseUrl {
                url: base_url,
                reason: "expected an http:// or https:// url".into(),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| ServiceError::Http {
            endpoint: base_url.clone(),
            source,
        })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn read_body(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<(StatusCode, String), ServiceError> {
        let status = resp.status();
        let body = resp.text().await.map_err(|source| ServiceError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok((status, body))
    }
}

impl FormService for HttpFormService {
    #[instrument(skip(self, identity), fields(roll_number = %identity.roll_number))]
    async fn register_user(&self, identity: &Identity) -> Result<RegisterOutcome, ServiceError> {
        let endpoint = self.endpoint("create-user");
        let resp = self
            .client
            .post(&endpoint)
            .json(identity)
            .send()
            .await
            .map_err(|source| ServiceError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        let (status, body) = Self::read_body(&endpoint, resp).await?;

        if status.is_success() {
            info!("user registered");
            return Ok(RegisterOutcome::Created);
        }
        if body.to_ascii_lowercase().contains("already exists") {
            info!("user already registered, continuing");
            return Ok(RegisterOutcome::AlreadyExists);
        }
        Err(ServiceError::Api {
            endpoint,
            status: status.as_u16(),
            body,
        })
    }

    #[instrument(skip(self))]
    async fn fetch_form(&self, roll_number: &str) -> Result<FormSchema, ServiceError> {
        let endpoint = self.endpoint("get-form");
        let resp = self
            .client
            .get(&endpoint)
            .query(&[("rollNumber", roll_number)])
            .send()
            .await
            .map_err(|source| ServiceError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;
        let (status, body) = Self::read_body(&endpoint, resp).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(roll_number.to_string()));
        }
        if !status.is_success() {
            return Err(ServiceError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        let schema = decode_form(&body, &endpoint)?;
        debug!(title = %schema.title, sections = schema.sections.len(), "form fetched");
        Ok(schema)
    }
}

/// Serves one schema file for every identity.
#[derive(Debug, Clone)]
pub struct FileFormService {
    path: PathBuf,
}

impl FileFormService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl FormService for FileFormService {
    async fn register_user(&self, identity: &Identity) -> Result<RegisterOutcome, ServiceError> {
        debug!(roll_number = %identity.roll_number, "offline registration");
        Ok(RegisterOutcome::Created)
    }

    async fn fetch_form(&self, _roll_number: &str) -> Result<FormSchema, ServiceError> {
        let body = tokio::fs::read_to_string(&self.path).await?;
        decode_form(&body, &self.path.display().to_string())
    }
}
