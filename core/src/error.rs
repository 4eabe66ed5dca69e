//! Error types for client construction and environment configuration.
//!
//! # Design
//! Neither enum is ever produced by a verb call. Request outcomes, including
//! transport failures, live in `RequestResult`; these errors only surface
//! while a suite is being set up, where failing fast is what the caller
//! wants.

use std::path::PathBuf;

use thiserror::Error;

/// Faults detected while building an `HttpClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("unsupported scheme '{scheme}' in base URL '{url}' (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid default header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for default header '{0}'")]
    InvalidHeaderValue(String),

    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Faults in environment files and endpoint templates.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("template '{template}' needs a value for ':{param}'")]
    MissingTemplateParam { template: String, param: String },
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
