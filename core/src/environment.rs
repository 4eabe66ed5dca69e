//! Named environment files under a config directory.
//!
//! Each environment is one TOML file, `<dir>/<name>.toml`. The
//! `CONFIG_FILE` variable picks the environment; `qa` is used when it is
//! unset or names a file that does not exist.
//!
//! ```toml
//! env = "qa"
//! base_url = "https://fakestoreapi.com"
//! base_url2 = "https://dummyjson.com"
//! timeout_ms = 10000
//! retries = 3
//!
//! [headers]
//! Content-Type = "application/json"
//!
//! [endpoints]
//! singleProduct = "/products/:id"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::{default_headers, ClientConfig, Headers, RetryPolicy, DEFAULT_RETRY_BACKOFF};
use crate::endpoint;
use crate::error::ConfigError;

/// Variable naming the environment file to load.
pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";
pub const DEFAULT_ENVIRONMENT: &str = "qa";

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF.as_millis() as u64
}

/// One environment file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub env: String,
    pub base_url: String,
    /// Second target for suites that talk to another API.
    #[serde(default)]
    pub base_url2: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after a request got no response.
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_headers")]
    pub headers: Headers,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default)]
    pub dummy_endpoints: BTreeMap<String, String>,
}

impl EnvironmentConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EnvironmentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `<dir>/<name>.toml`, falling back to the `qa` file when the
    /// named one does not exist.
    pub fn load(dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let path = environment_path(dir, name);
        if path.exists() {
            tracing::info!(config = %path.display(), "using environment config");
            return Self::load_file(&path);
        }
        let fallback = environment_path(dir, DEFAULT_ENVIRONMENT);
        tracing::warn!(
            requested = %path.display(),
            fallback = %fallback.display(),
            "environment config not found, using default"
        );
        Self::load_file(&fallback)
    }

    /// Loads the environment named by `CONFIG_FILE`, or `qa`.
    pub fn load_selected(dir: &Path) -> Result<Self, ConfigError> {
        let name = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
        Self::load(dir, &name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("base_url must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms must be greater than zero"));
        }
        if matches!(&self.base_url2, Some(url) if url.trim().is_empty()) {
            return Err(ConfigError::invalid("base_url2 must not be empty when set"));
        }
        for (name, template) in self.endpoints.iter().chain(&self.dummy_endpoints) {
            if endpoint::placeholders(template).iter().any(|param| param.is_empty()) {
                return Err(ConfigError::invalid(format!(
                    "endpoint '{name}' has an unnamed placeholder: {template}"
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_backoff_ms))
    }

    /// Client settings for `base_url`.
    pub fn client_config(&self) -> ClientConfig {
        self.client_config_for(&self.base_url)
    }

    /// Client settings for `base_url2`, when configured.
    pub fn alternate_client_config(&self) -> Option<ClientConfig> {
        self.base_url2.as_deref().map(|url| self.client_config_for(url))
    }

    fn client_config_for(&self, base_url: &str) -> ClientConfig {
        ClientConfig::new(base_url)
            .with_timeout(self.timeout())
            .with_headers(self.headers.clone())
            .with_retry(self.retry_policy())
    }

    pub fn endpoint(&self, name: &str) -> Result<&str, ConfigError> {
        self.endpoints
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))
    }

    pub fn dummy_endpoint(&self, name: &str) -> Result<&str, ConfigError> {
        self.dummy_endpoints
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))
    }

    /// Looks up `name` in `endpoints` and fills its placeholders.
    pub fn endpoint_path<V: ToString>(&self, name: &str, params: &[(&str, V)]) -> Result<String, ConfigError> {
        endpoint::resolve(self.endpoint(name)?, params)
    }
}

fn environment_path(dir: &Path, name: &str) -> PathBuf {
    let name = name.strip_suffix(".toml").unwrap_or(name);
    dir.join(format!("{name}.toml"))
}
