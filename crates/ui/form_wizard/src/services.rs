//! Picks the form service the app talks to.

use forms::{
    FileFormService, FormSchema, FormService, HttpFormService, Identity, RegisterOutcome,
    ServiceError,
};

use crate::{cli::RunArgs, config::Config};

/// Either the remote service or an offline schema file.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(HttpFormService),
    File(FileFormService),
}

impl Backend {
    /// Command line wins over the config file; a schema file wins over a url.
    pub fn select(args: &RunArgs, config: &Config) -> Result<Self, ServiceError> {
        if let Some(path) = &args.schema {
            return Ok(Backend::File(FileFormService::new(path)));
        }
        if let Some(url) = &args.api {
            return HttpFormService::with_timeout(url, config.request_timeout()).map(Backend::Http);
        }
        if let Some(path) = &config.schema_file {
            return Ok(Backend::File(FileFormService::new(path)));
        }
        HttpFormService::with_timeout(&config.api_base_url, config.request_timeout())
            .map(Backend::Http)
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Http(svc) => svc.base_url().to_string(),
            Backend::File(svc) => svc.path().display().to_string(),
        }
    }
}

impl FormService for Backend {
    async fn register_user(&self, identity: &Identity) -> Result<RegisterOutcome, ServiceError> {
        match self {
            Backend::Http(svc) => svc.register_user(identity).await,
            Backend::File(svc) => svc.register_user(identity).await,
        }
    }

    async fn fetch_form(&self, roll_number: &str) -> Result<FormSchema, ServiceError> {
        match self {
            Backend::Http(svc) => svc.fetch_form(roll_number).await,
            Backend::File(svc) => svc.fetch_form(roll_number).await,
        }
    }
}
