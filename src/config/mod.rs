#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::http::DEFAULT_API_URL;
use crate::core::request_builder::RequestBuilder;
use crate::core::{ConfigProvider, RawProjectionParams};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use std::env;
use std::time::Duration;
use toml_config::TomlConfig;

pub const API_URL_ENV: &str = "PROJECTION_API_URL";

/// Settings after merging flags, the config file and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub timeout_seconds: Option<u64>,
    pub defaults: RawProjectionParams,
}

impl ClientSettings {
    /// Base URL precedence: flag, config file, `PROJECTION_API_URL`, then the
    /// local development endpoint.
    pub fn resolve(
        api_url: Option<&str>,
        timeout_seconds: Option<u64>,
        file: Option<&TomlConfig>,
    ) -> Self {
        let file_api = file.and_then(|f| f.api.as_ref());

        let api_base_url = api_url
            .map(str::to_string)
            .or_else(|| file_api.and_then(|a| a.base_url.clone()))
            .or_else(|| env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_seconds = timeout_seconds.or_else(|| file_api.and_then(|a| a.timeout_seconds));

        let defaults = file
            .and_then(|f| f.defaults.as_ref())
            .map(|d| d.to_params())
            .unwrap_or_else(RequestBuilder::baseline_params);

        Self {
            api_base_url,
            timeout_seconds,
            defaults,
        }
    }

    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.defaults.clone())
    }
}

impl ConfigProvider for ClientSettings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
