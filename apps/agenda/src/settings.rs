use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use shared::protocol::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:9000/api";
const ENV_PREFIX: &str = "AGENDA";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Settings {
    /// Defaults, then `agenda.toml` (or `path`), then `AGENDA__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(
            path,
            Environment::with_prefix(ENV_PREFIX).prefix_separator("__"),
        )
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("agenda").required(false),
        };
        let settings: Settings = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("request_timeout_secs", 10)?
            .add_source(file)
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        if settings.page_size == 0 {
            return Err(ConfigError::Message("page_size must be at least 1".into()));
        }
        if settings.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(settings)
    }
}
