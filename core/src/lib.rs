//! HTTP client core for API test suites.
//!
//! # Overview
//! `HttpClient` wraps a `reqwest` transport bound to a base URL, a timeout
//! and a set of default headers. Its five verb methods (`get`, `post`,
//! `put`, `patch`, `delete`) always return a `RequestResult`. A 404, a
//! refused connection and a timeout all arrive through the same return
//! value, so suites assert on `status()` / `data()` / `error()` without
//! ever handling an `Err`.
//!
//! # Design
//! - Configuration is typed: `ClientConfig` for one client,
//!   `EnvironmentConfig` for a named TOML environment file that can produce
//!   several client configs and holds endpoint templates.
//! - Request construction (`build_request`) is separated from I/O
//!   (`execute`) so URL resolution and header merging are testable without
//!   a server.
//! - Bounded retry with exponential backoff applies only to requests that
//!   got no response, and is off unless configured.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod environment;
pub mod error;
pub mod http;
pub mod result;

pub use client::HttpClient;
pub use config::{default_headers, ClientConfig, Headers, RetryPolicy};
pub use environment::EnvironmentConfig;
pub use error::{ClientError, ConfigError};
pub use http::{HttpMethod, HttpRequest};
pub use result::{FailureKind, ReceivedResponse, RequestResult, TransportFailure, NO_RESPONSE};
