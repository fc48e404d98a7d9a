use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use config::{ConfigBuilder, builder::DefaultState};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,

    /// Base url of the form service (`/create-user`, `/get-form`).
    pub api_base_url: String,
    /// Per-request timeout; unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Ticks per second.
    pub tick_rate: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// Serve the form from this JSON file instead of the service.
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Defaults, then the config files, then `FORM_WIZARD_*` variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = Self::file_layers(&get_config_dir(), &get_data_dir())?
            .add_source(config::Environment::with_prefix(PROJECT_NAME.as_str()).try_parsing(true));
        builder.build()?.try_deserialize()
    }

    /// Defaults and config files from `config_dir` only.
    pub fn from_dir(config_dir: &Path, data_dir: &Path) -> Result<Self, config::ConfigError> {
        Self::file_layers(config_dir, data_dir)?
            .build()?
            .try_deserialize()
    }

    fn file_layers(
        config_dir: &Path,
        data_dir: &Path,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("config_dir", config_dir.to_string_lossy().as_ref())?
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("tick_rate", 4.0)?
            .set_default("frame_rate", 30.0)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            warn!("No configuration file found, using defaults");
        }
        Ok(builder)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "forms", env!("CARGO_PKG_NAME"))
}
